//! Crate root: wires together the compilation pipeline.
//!
//! The stages are small and composable:
//! - `tokenizer` performs lexical analysis and produces a flat token stream.
//! - `parser` owns all syntactic knowledge and returns the expression AST.
//! - `codegen` lowers the AST into stack-machine instructions and prints them.
//! - `error` centralises the diagnostics shared by the other modules.
//! - `config` holds the output options.

pub mod codegen;
pub mod config;
pub mod error;
pub mod parser;
pub mod tokenizer;

pub use config::{Options, Syntax};
pub use error::{CompileError, CompileResult, Expected};
pub use parser::{AstNode, BinaryOp};

/// Compile a source string into Intel-syntax assembly with a `main` entry.
pub fn generate_assembly(expr: &str) -> CompileResult<String> {
  generate_assembly_with(expr, &Options::default())
}

/// Compile a source string into assembly using the given output options.
pub fn generate_assembly_with(expr: &str, options: &Options) -> CompileResult<String> {
  let program = parse_expression(expr)?;
  let code = codegen::generate(&program);
  Ok(codegen::render(&code, options))
}

/// Run the front-end only: tokenize and parse.
pub fn parse_expression(expr: &str) -> CompileResult<AstNode> {
  let tokens = tokenizer::tokenize(expr)?;
  parser::parse(tokens, expr)
}
