//! Code generation: lower the parsed AST into x86-64 assembly.
//!
//! The emitter uses a simple stack machine: every expression leaves a single
//! value on the stack. `rax` and `rdi` are the only scratch registers; a binary
//! node pops its right operand into `rdi`, its left operand into `rax`,
//! combines them into `rax` and pushes the result back.
//!
//! Building the instruction list and printing it are separate steps so the
//! stack discipline can be inspected without going through text.

use crate::config::{Options, Syntax};
use crate::parser::{AstNode, BinaryOp};

/// Registers the generator touches.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reg {
  /// Primary slot: left operand and result.
  Rax,
  /// Secondary slot: right operand.
  Rdi,
  /// Low byte of `rax`, target of `set<cc>`.
  Al,
}

impl Reg {
  fn name(self) -> &'static str {
    match self {
      Reg::Rax => "rax",
      Reg::Rdi => "rdi",
      Reg::Al => "al",
    }
  }
}

/// Condition codes used by comparisons. `>` and `>=` reuse `L`/`Le` with the
/// compared operands swapped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cond {
  E,
  Ne,
  L,
  Le,
}

impl Cond {
  fn suffix(self) -> &'static str {
    match self {
      Cond::E => "e",
      Cond::Ne => "ne",
      Cond::L => "l",
      Cond::Le => "le",
    }
  }

  /// Whether the condition holds after comparing `lhs` against `rhs`.
  pub fn holds(self, lhs: i64, rhs: i64) -> bool {
    match self {
      Cond::E => lhs == rhs,
      Cond::Ne => lhs != rhs,
      Cond::L => lhs < rhs,
      Cond::Le => lhs <= rhs,
    }
  }
}

/// One line of the listing. Two-operand forms are `(dst, src)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Instr {
  /// Push a constant that fits a sign-extended 32-bit immediate.
  PushImm(i64),
  Push(Reg),
  Pop(Reg),
  /// Load a full 64-bit constant.
  MovImm(Reg, i64),
  Add(Reg, Reg),
  Sub(Reg, Reg),
  Imul(Reg, Reg),
  /// Sign-extend `rax` into `rdx:rax` ahead of `idiv`.
  Cqo,
  /// Signed divide `rdx:rax`, quotient to `rax`.
  Idiv(Reg),
  /// Set flags from `lhs - rhs`.
  Cmp(Reg, Reg),
  Set(Cond, Reg),
  /// Zero-extend a byte register into a full register.
  Movzb(Reg, Reg),
  Ret,
}

impl Instr {
  /// Render a single instruction in the requested dialect.
  pub fn render(&self, syntax: Syntax) -> String {
    let reg = |r: Reg| match syntax {
      Syntax::Intel => r.name().to_string(),
      Syntax::Att => format!("%{}", r.name()),
    };
    let imm = |v: i64| match syntax {
      Syntax::Intel => v.to_string(),
      Syntax::Att => format!("${v}"),
    };
    let two = |mnemonic: &str, dst: String, src: String| match syntax {
      Syntax::Intel => format!("{mnemonic} {dst}, {src}"),
      Syntax::Att => format!("{mnemonic} {src}, {dst}"),
    };

    match *self {
      Instr::PushImm(value) => format!("push {}", imm(value)),
      Instr::Push(r) => format!("push {}", reg(r)),
      Instr::Pop(r) => format!("pop {}", reg(r)),
      Instr::MovImm(r, value) => two("movabs", reg(r), imm(value)),
      Instr::Add(dst, src) => two("add", reg(dst), reg(src)),
      Instr::Sub(dst, src) => two("sub", reg(dst), reg(src)),
      Instr::Imul(dst, src) => two("imul", reg(dst), reg(src)),
      Instr::Cqo => "cqo".to_string(),
      Instr::Idiv(r) => format!("idiv {}", reg(r)),
      Instr::Cmp(lhs, rhs) => two("cmp", reg(lhs), reg(rhs)),
      Instr::Set(cond, r) => format!("set{} {}", cond.suffix(), reg(r)),
      Instr::Movzb(dst, src) => match syntax {
        Syntax::Intel => format!("movzb {}, {}", reg(dst), reg(src)),
        Syntax::Att => format!("movzbq {}, {}", reg(src), reg(dst)),
      },
      Instr::Ret => "ret".to_string(),
    }
  }
}

/// Lower an expression into the full instruction sequence, epilogue included.
pub fn generate(node: &AstNode) -> Vec<Instr> {
  let mut codegen = Codegen::default();
  codegen.emit_expr(node);
  debug_assert_eq!(codegen.depth, 1, "expression must leave exactly one value");

  codegen.pop(Reg::Rax);
  codegen.code.push(Instr::Ret);

  tracing::debug!(
    instructions = codegen.code.len(),
    max_stack_depth = codegen.max_depth,
    "generated code"
  );
  codegen.code
}

/// Print the listing: directive, global entry, label, then one instruction per line.
pub fn render(code: &[Instr], options: &Options) -> String {
  let mut asm = String::new();
  match options.syntax {
    Syntax::Intel => asm.push_str(".intel_syntax noprefix\n"),
    Syntax::Att => asm.push_str(".att_syntax prefix\n"),
  }
  asm.push_str(&format!(".global {}\n", options.entry));
  asm.push_str(&format!("{}:\n", options.entry));

  for instr in code {
    asm.push_str(&format!("  {}\n", instr.render(options.syntax)));
  }
  asm
}

#[derive(Default)]
struct Codegen {
  code: Vec<Instr>,
  depth: usize,
  max_depth: usize,
}

impl Codegen {
  fn push(&mut self, instr: Instr) {
    self.code.push(instr);
    self.depth += 1;
    self.max_depth = self.max_depth.max(self.depth);
  }

  fn pop(&mut self, reg: Reg) {
    self.code.push(Instr::Pop(reg));
    self.depth -= 1;
  }

  /// Emit stack-based code for a single expression node.
  fn emit_expr(&mut self, node: &AstNode) {
    match node {
      AstNode::Num { value } => {
        if i32::try_from(*value).is_ok() {
          self.push(Instr::PushImm(*value));
        } else {
          self.code.push(Instr::MovImm(Reg::Rax, *value));
          self.push(Instr::Push(Reg::Rax));
        }
      }
      AstNode::Binary { op, lhs, rhs } => {
        self.emit_expr(lhs);
        self.emit_expr(rhs);
        self.pop(Reg::Rdi);
        self.pop(Reg::Rax);
        self.emit_op(*op);
        self.push(Instr::Push(Reg::Rax));
      }
    }
  }

  /// Combine `rax` (left) and `rdi` (right) into `rax`.
  fn emit_op(&mut self, op: BinaryOp) {
    match op {
      BinaryOp::Add => self.code.push(Instr::Add(Reg::Rax, Reg::Rdi)),
      BinaryOp::Sub => self.code.push(Instr::Sub(Reg::Rax, Reg::Rdi)),
      BinaryOp::Mul => self.code.push(Instr::Imul(Reg::Rax, Reg::Rdi)),
      BinaryOp::Div => {
        self.code.push(Instr::Cqo);
        self.code.push(Instr::Idiv(Reg::Rdi));
      }
      BinaryOp::Eq => self.emit_compare(Reg::Rax, Reg::Rdi, Cond::E),
      BinaryOp::Ne => self.emit_compare(Reg::Rax, Reg::Rdi, Cond::Ne),
      BinaryOp::Lt => self.emit_compare(Reg::Rax, Reg::Rdi, Cond::L),
      BinaryOp::Le => self.emit_compare(Reg::Rax, Reg::Rdi, Cond::Le),
      BinaryOp::Gt => self.emit_compare(Reg::Rdi, Reg::Rax, Cond::L),
      BinaryOp::Ge => self.emit_compare(Reg::Rdi, Reg::Rax, Cond::Le),
    }
  }

  /// Leave 1 in `rax` if `cond` holds for `lhs` against `rhs`, else 0.
  fn emit_compare(&mut self, lhs: Reg, rhs: Reg, cond: Cond) {
    self.code.push(Instr::Cmp(lhs, rhs));
    self.code.push(Instr::Set(cond, Reg::Al));
    self.code.push(Instr::Movzb(Reg::Rax, Reg::Al));
  }
}
