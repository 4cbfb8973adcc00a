mod common;

use common::{evaluate, execute, run, source_of};
use quickcheck::{Arbitrary, Gen, TestResult, quickcheck};
use stackcc::codegen::generate;
use stackcc::tokenizer::tokenize;
use stackcc::{AstNode, BinaryOp, parse_expression};

const OPS: [BinaryOp; 10] = [
  BinaryOp::Add,
  BinaryOp::Sub,
  BinaryOp::Mul,
  BinaryOp::Div,
  BinaryOp::Eq,
  BinaryOp::Ne,
  BinaryOp::Lt,
  BinaryOp::Le,
  BinaryOp::Gt,
  BinaryOp::Ge,
];

/// Random expression tree over small non-negative literals.
#[derive(Debug, Clone)]
struct Expr(AstNode);

impl Arbitrary for Expr {
  fn arbitrary(g: &mut Gen) -> Self {
    Expr(random_node(g, 5))
  }
}

fn random_node(g: &mut Gen, depth: u32) -> AstNode {
  if depth == 0 || u8::arbitrary(g) % 3 == 0 {
    return AstNode::number(i64::from(u16::arbitrary(g)));
  }
  let op = *g.choose(&OPS).unwrap();
  AstNode::binary(op, random_node(g, depth - 1), random_node(g, depth - 1))
}

#[test]
fn prop_parse_recovers_tree() {
  fn prop(expr: Expr) -> bool {
    parse_expression(&source_of(&expr.0)).unwrap() == expr.0
  }
  quickcheck(prop as fn(Expr) -> bool);
}

#[test]
fn prop_generated_code_matches_evaluation() {
  fn prop(expr: Expr) -> bool {
    execute(&generate(&expr.0)) == evaluate(&expr.0)
  }
  quickcheck(prop as fn(Expr) -> bool);
}

#[test]
fn prop_tokenizing_is_deterministic() {
  fn prop(expr: Expr) -> bool {
    let source = source_of(&expr.0);
    tokenize(&source).unwrap() == tokenize(&source).unwrap()
  }
  quickcheck(prop as fn(Expr) -> bool);
}

#[test]
fn prop_negated_division_truncates_toward_zero() {
  fn prop(a: u32, b: u32) -> TestResult {
    if b == 0 {
      return TestResult::discard();
    }
    let expected = -i64::from(a) / i64::from(b);
    TestResult::from_bool(run(&format!("-{a}/{b}")) == Some(expected))
  }
  quickcheck(prop as fn(u32, u32) -> TestResult);
}
