//! Shared error utilities used across the compilation pipeline.
//!
//! Diagnostics are kept lightweight on purpose: the input line is echoed and
//! a caret on the next line points at the offending character, followed by a
//! short message naming what was expected there.

use std::fmt;

use snafu::Snafu;

pub type CompileResult<T> = Result<T, CompileError>;

/// The construct a grammar rule required but did not find.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Expected {
  /// `primary` saw neither a number nor `(`.
  NumberOrParen,
  /// A parenthesised expression was not followed by `)`.
  ClosingParen,
  /// A complete expression was followed by more tokens.
  EndOfInput,
  /// A `(` would exceed `parser::MAX_NESTING` open parentheses.
  ShallowerNesting,
}

impl fmt::Display for Expected {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Expected::NumberOrParen => f.write_str("expected number or parenthesis"),
      Expected::ClosingParen => f.write_str("unclosed parenthesis"),
      Expected::EndOfInput => f.write_str("unexpected trailing token"),
      Expected::ShallowerNesting => f.write_str("parentheses nested too deeply"),
    }
  }
}

#[derive(Debug, Snafu)]
#[snafu(visibility(pub))]
pub enum CompileError {
  #[snafu(display("{}", caret_report(input, *loc, message)))]
  Lex {
    input: String,
    loc: usize,
    message: String,
  },

  #[snafu(display("{}", caret_report(input, *loc, &format!("{expected}: got \"{got}\""))))]
  Syntax {
    input: String,
    loc: usize,
    expected: Expected,
    got: String,
  },

  #[snafu(display("failed to write output: {source}"))]
  Output { source: std::io::Error },
}

impl CompileError {
  /// Construct a lexical error anchored at a byte offset in the source.
  pub fn lex(input: &str, loc: usize, message: impl Into<String>) -> Self {
    LexSnafu {
      input,
      loc,
      message: message.into(),
    }
    .build()
  }

  /// Construct a syntax error anchored at the token where the mismatch was found.
  pub fn syntax(input: &str, loc: usize, expected: Expected, got: impl Into<String>) -> Self {
    SyntaxSnafu {
      input,
      loc,
      expected,
      got: got.into(),
    }
    .build()
  }

  /// Byte offset of the failure, if the error points into the source.
  pub fn loc(&self) -> Option<usize> {
    match self {
      CompileError::Lex { loc, .. } | CompileError::Syntax { loc, .. } => Some(*loc),
      CompileError::Output { .. } => None,
    }
  }

  pub fn is_lex(&self) -> bool {
    matches!(self, CompileError::Lex { .. })
  }

  pub fn is_syntax(&self) -> bool {
    matches!(self, CompileError::Syntax { .. })
  }

  /// The missing construct for syntax errors.
  pub fn expected(&self) -> Option<Expected> {
    match self {
      CompileError::Syntax { expected, .. } => Some(*expected),
      _ => None,
    }
  }
}

/// Echo `input` and draw a caret under the character starting at byte `loc`.
fn caret_report(input: &str, loc: usize, message: &str) -> String {
  let mut safe_loc = loc.min(input.len());
  while !input.is_char_boundary(safe_loc) {
    safe_loc -= 1;
  }
  let column = input[..safe_loc].chars().count();
  format!("{input}\n{}^ {message}", " ".repeat(column))
}
