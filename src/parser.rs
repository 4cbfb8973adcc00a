//! Recursive-descent parser producing the expression AST.
//!
//! The parser mirrors the classic chibicc structure: one helper per
//! precedence level, each delegating to the next tighter-binding level before
//! consuming its own operators in a loop. Left-associativity falls out of the
//! loop building a left-leaning chain.

use std::fmt;

use crate::error::{CompileError, CompileResult, Expected};
use crate::tokenizer::{Token, TokenKind, describe_token};

/// Most parentheses that may be open at once. Each level costs a full pass
/// through the precedence chain on the call stack.
pub const MAX_NESTING: usize = 256;

/// Binary operators recognised by the language.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOp {
  Add,
  Sub,
  Mul,
  Div,
  Eq,
  Ne,
  Lt,
  Le,
  Gt,
  Ge,
}

impl BinaryOp {
  /// Source spelling of the operator.
  pub fn symbol(self) -> &'static str {
    match self {
      BinaryOp::Add => "+",
      BinaryOp::Sub => "-",
      BinaryOp::Mul => "*",
      BinaryOp::Div => "/",
      BinaryOp::Eq => "==",
      BinaryOp::Ne => "!=",
      BinaryOp::Lt => "<",
      BinaryOp::Le => "<=",
      BinaryOp::Gt => ">",
      BinaryOp::Ge => ">=",
    }
  }
}

impl fmt::Display for BinaryOp {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    let name = match self {
      BinaryOp::Add => "ADD",
      BinaryOp::Sub => "SUB",
      BinaryOp::Mul => "MUL",
      BinaryOp::Div => "DIV",
      BinaryOp::Eq => "EQ",
      BinaryOp::Ne => "NE",
      BinaryOp::Lt => "LT",
      BinaryOp::Le => "LE",
      BinaryOp::Gt => "GT",
      BinaryOp::Ge => "GE",
    };
    f.write_str(name)
  }
}

/// Expression tree produced by the parser.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AstNode {
  Num {
    value: i64,
  },
  Binary {
    op: BinaryOp,
    lhs: Box<AstNode>,
    rhs: Box<AstNode>,
  },
}

impl AstNode {
  pub fn number(value: i64) -> Self {
    Self::Num { value }
  }

  pub fn binary(op: BinaryOp, lhs: AstNode, rhs: AstNode) -> Self {
    Self::Binary {
      op,
      lhs: Box::new(lhs),
      rhs: Box::new(rhs),
    }
  }

  /// `-x` has no node of its own; it is `0 - x`.
  pub fn negate(operand: AstNode) -> Self {
    Self::binary(BinaryOp::Sub, Self::number(0), operand)
  }

  /// Number of nested levels, counting the root.
  pub fn depth(&self) -> usize {
    match self {
      AstNode::Num { .. } => 1,
      AstNode::Binary { lhs, rhs, .. } => 1 + lhs.depth().max(rhs.depth()),
    }
  }
}

/// Prefix rendering, e.g. `ADD(1, MUL(2, 3))`.
impl fmt::Display for AstNode {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      AstNode::Num { value } => write!(f, "{value}"),
      AstNode::Binary { op, lhs, rhs } => write!(f, "{op}({lhs}, {rhs})"),
    }
  }
}

/// Parse a complete expression from the token stream.
///
/// Every token up to `Eof` must be consumed; leftovers such as the `2` in
/// `1 2` are reported rather than silently dropped.
pub fn parse(tokens: Vec<Token>, source: &str) -> CompileResult<AstNode> {
  let mut stream = TokenStream::new(tokens, source);

  let node = parse_expr(&mut stream)?;

  if !stream.is_eof() {
    return Err(stream.error(Expected::EndOfInput));
  }

  tracing::debug!(depth = node.depth(), "parsed expression");
  Ok(node)
}

fn parse_expr(stream: &mut TokenStream) -> CompileResult<AstNode> {
  parse_equality(stream)
}

fn parse_equality(stream: &mut TokenStream) -> CompileResult<AstNode> {
  let mut node = parse_relational(stream)?;

  loop {
    let op = match stream.peek_kind() {
      TokenKind::Eq => BinaryOp::Eq,
      TokenKind::Ne => BinaryOp::Ne,
      _ => break,
    };
    stream.advance();
    let rhs = parse_relational(stream)?;
    node = AstNode::binary(op, node, rhs);
  }

  Ok(node)
}

fn parse_relational(stream: &mut TokenStream) -> CompileResult<AstNode> {
  let mut node = parse_add(stream)?;

  loop {
    let op = match stream.peek_kind() {
      TokenKind::Lt => BinaryOp::Lt,
      TokenKind::Le => BinaryOp::Le,
      TokenKind::Gt => BinaryOp::Gt,
      TokenKind::Ge => BinaryOp::Ge,
      _ => break,
    };
    stream.advance();
    let rhs = parse_add(stream)?;
    node = AstNode::binary(op, node, rhs);
  }

  Ok(node)
}

fn parse_add(stream: &mut TokenStream) -> CompileResult<AstNode> {
  let mut node = parse_mul(stream)?;

  loop {
    let op = match stream.peek_kind() {
      TokenKind::Plus => BinaryOp::Add,
      TokenKind::Minus => BinaryOp::Sub,
      _ => break,
    };
    stream.advance();
    let rhs = parse_mul(stream)?;
    node = AstNode::binary(op, node, rhs);
  }

  Ok(node)
}

fn parse_mul(stream: &mut TokenStream) -> CompileResult<AstNode> {
  let mut node = parse_unary(stream)?;

  loop {
    let op = match stream.peek_kind() {
      TokenKind::Star => BinaryOp::Mul,
      TokenKind::Slash => BinaryOp::Div,
      _ => break,
    };
    stream.advance();
    let rhs = parse_unary(stream)?;
    node = AstNode::binary(op, node, rhs);
  }

  Ok(node)
}

// A single sign only: `--1` is rejected by `parse_primary`.
fn parse_unary(stream: &mut TokenStream) -> CompileResult<AstNode> {
  if stream.consume(TokenKind::Plus) {
    return parse_primary(stream);
  }

  if stream.consume(TokenKind::Minus) {
    let operand = parse_primary(stream)?;
    return Ok(AstNode::negate(operand));
  }

  parse_primary(stream)
}

fn parse_primary(stream: &mut TokenStream) -> CompileResult<AstNode> {
  if stream.peek_kind() == TokenKind::LParen {
    if stream.nesting == MAX_NESTING {
      return Err(stream.error(Expected::ShallowerNesting));
    }
    stream.advance();
    stream.nesting += 1;
    let node = parse_expr(stream)?;
    stream.expect(TokenKind::RParen, Expected::ClosingParen)?;
    stream.nesting -= 1;
    return Ok(node);
  }

  let value = stream.get_number()?;
  Ok(AstNode::number(value))
}

/// Lightweight cursor over the token vector.
struct TokenStream<'a> {
  tokens: Vec<Token>,
  source: &'a str,
  pos: usize,
  /// Currently open parentheses.
  nesting: usize,
}

impl<'a> TokenStream<'a> {
  /// Take ownership of the token stream; the parser will advance `pos` as it consumes input.
  fn new(tokens: Vec<Token>, source: &'a str) -> Self {
    Self {
      tokens,
      source,
      pos: 0,
      nesting: 0,
    }
  }

  fn peek(&self) -> Option<&Token> {
    self.tokens.get(self.pos)
  }

  /// A missing token reads as `Eof` so a stream without its marker still terminates.
  fn peek_kind(&self) -> TokenKind {
    self.peek().map_or(TokenKind::Eof, |token| token.kind)
  }

  fn advance(&mut self) {
    if self.pos < self.tokens.len() {
      self.pos += 1;
    }
  }

  /// Consume the current token if it has the given kind.
  fn consume(&mut self, kind: TokenKind) -> bool {
    if self.peek_kind() == kind && kind != TokenKind::Eof {
      self.advance();
      return true;
    }
    false
  }

  fn expect(&mut self, kind: TokenKind, expected: Expected) -> CompileResult<()> {
    if self.consume(kind) {
      Ok(())
    } else {
      Err(self.error(expected))
    }
  }

  /// Parse the current token as an integer literal.
  fn get_number(&mut self) -> CompileResult<i64> {
    if let Some(token) = self.peek()
      && token.kind == TokenKind::Num
      && let Some(value) = token.value
    {
      self.advance();
      return Ok(value);
    }
    Err(self.error(Expected::NumberOrParen))
  }

  fn is_eof(&self) -> bool {
    self.peek_kind() == TokenKind::Eof
  }

  /// Syntax error anchored at the current token.
  fn error(&self, expected: Expected) -> CompileError {
    let loc = self.peek().map_or(self.source.len(), |token| token.loc);
    let got = describe_token(self.peek(), self.source);
    CompileError::syntax(self.source, loc, expected, got)
  }
}
