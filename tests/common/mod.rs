#![allow(dead_code)]

use stackcc::codegen::{self, Instr, Reg};
use stackcc::{AstNode, BinaryOp};

/// Register file and operand stack of the simulated machine.
#[derive(Default)]
struct Machine {
  rax: i64,
  rdi: i64,
  rdx: i64,
  flags: (i64, i64),
  stack: Vec<i64>,
}

impl Machine {
  fn read(&self, reg: Reg) -> i64 {
    match reg {
      Reg::Rax => self.rax,
      Reg::Rdi => self.rdi,
      Reg::Al => self.rax & 0xff,
    }
  }

  fn write(&mut self, reg: Reg, value: i64) {
    match reg {
      Reg::Rax => self.rax = value,
      Reg::Rdi => self.rdi = value,
      Reg::Al => self.rax = (self.rax & !0xff) | (value & 0xff),
    }
  }
}

/// Execute a listing and return `rax` at `ret`.
///
/// `None` means the program would fault: a divide error, a stack underflow,
/// or values left behind on the stack at `ret`.
pub fn execute(code: &[Instr]) -> Option<i64> {
  let mut m = Machine::default();

  for instr in code {
    match *instr {
      Instr::PushImm(value) => m.stack.push(value),
      Instr::Push(reg) => {
        let value = m.read(reg);
        m.stack.push(value);
      }
      Instr::Pop(reg) => {
        let value = m.stack.pop()?;
        m.write(reg, value);
      }
      Instr::MovImm(reg, value) => m.write(reg, value),
      Instr::Add(dst, src) => m.write(dst, m.read(dst).wrapping_add(m.read(src))),
      Instr::Sub(dst, src) => m.write(dst, m.read(dst).wrapping_sub(m.read(src))),
      Instr::Imul(dst, src) => m.write(dst, m.read(dst).wrapping_mul(m.read(src))),
      Instr::Cqo => m.rdx = if m.rax < 0 { -1 } else { 0 },
      Instr::Idiv(reg) => {
        let divisor = m.read(reg);
        let quotient = m.rax.checked_div(divisor)?;
        m.rdx = m.rax.checked_rem(divisor)?;
        m.rax = quotient;
      }
      Instr::Cmp(lhs, rhs) => m.flags = (m.read(lhs), m.read(rhs)),
      Instr::Set(cond, reg) => {
        let (lhs, rhs) = m.flags;
        m.write(reg, i64::from(cond.holds(lhs, rhs)));
      }
      Instr::Movzb(dst, src) => m.write(dst, m.read(src) & 0xff),
      Instr::Ret => return m.stack.is_empty().then_some(m.rax),
    }
  }
  None
}

/// Reference semantics: wrapping arithmetic, truncating division, 0/1 comparisons.
pub fn evaluate(node: &AstNode) -> Option<i64> {
  match node {
    AstNode::Num { value } => Some(*value),
    AstNode::Binary { op, lhs, rhs } => {
      let l = evaluate(lhs)?;
      let r = evaluate(rhs)?;
      let value = match op {
        BinaryOp::Add => l.wrapping_add(r),
        BinaryOp::Sub => l.wrapping_sub(r),
        BinaryOp::Mul => l.wrapping_mul(r),
        BinaryOp::Div => l.checked_div(r)?,
        BinaryOp::Eq => i64::from(l == r),
        BinaryOp::Ne => i64::from(l != r),
        BinaryOp::Lt => i64::from(l < r),
        BinaryOp::Le => i64::from(l <= r),
        BinaryOp::Gt => i64::from(l > r),
        BinaryOp::Ge => i64::from(l >= r),
      };
      Some(value)
    }
  }
}

/// Fully parenthesised source text for a tree of non-negative literals.
pub fn source_of(node: &AstNode) -> String {
  match node {
    AstNode::Num { value } => value.to_string(),
    AstNode::Binary { op, lhs, rhs } => {
      format!("({}{}{})", source_of(lhs), op.symbol(), source_of(rhs))
    }
  }
}

/// Compile `expr` and run the result on the simulator.
pub fn run(expr: &str) -> Option<i64> {
  let node = stackcc::parse_expression(expr).unwrap();
  execute(&codegen::generate(&node))
}
