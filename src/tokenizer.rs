//! Lexical analysis: turns the raw input string into a vector of tokens.
//!
//! The tokenizer knows nothing about semantics beyond recognising operators
//! and numeric literals. Two-character punctuators are matched before the
//! single-character ones so `<=` never lexes as `<` followed by `=`.

use std::fmt;

use crate::error::{CompileError, CompileResult};

/// Kinds of tokens recognised by the front-end.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
  Num,
  Plus,
  Minus,
  Star,
  Slash,
  LParen,
  RParen,
  Lt,
  Le,
  Gt,
  Ge,
  Eq,
  Ne,
  Eof,
}

impl fmt::Display for TokenKind {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    let name = match self {
      TokenKind::Num => "NUMBER",
      TokenKind::Plus => "PLUS",
      TokenKind::Minus => "MINUS",
      TokenKind::Star => "STAR",
      TokenKind::Slash => "SLASH",
      TokenKind::LParen => "LPAREN",
      TokenKind::RParen => "RPAREN",
      TokenKind::Lt => "LT",
      TokenKind::Le => "LE",
      TokenKind::Gt => "GT",
      TokenKind::Ge => "GE",
      TokenKind::Eq => "EQ",
      TokenKind::Ne => "NE",
      TokenKind::Eof => "EOF",
    };
    f.write_str(name)
  }
}

const TWO_CHAR_PUNCTUATORS: [(&str, TokenKind); 4] = [
  ("==", TokenKind::Eq),
  ("!=", TokenKind::Ne),
  ("<=", TokenKind::Le),
  (">=", TokenKind::Ge),
];

/// Thin wrapper for lexical information needed by later stages.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
  pub kind: TokenKind,
  pub value: Option<i64>,
  pub loc: usize,
  pub len: usize,
}

impl Token {
  /// Convenience constructor to keep the `tokenize` loop readable.
  pub fn new(kind: TokenKind, loc: usize, len: usize, value: Option<i64>) -> Self {
    Self {
      kind,
      value,
      loc,
      len,
    }
  }
}

impl fmt::Display for Token {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self.value {
      Some(value) => write!(f, "{}({value})@{}", self.kind, self.loc),
      None => write!(f, "{}@{}", self.kind, self.loc),
    }
  }
}

/// Lex the input into a flat vector of tokens terminated by an `Eof` marker.
pub fn tokenize(input: &str) -> CompileResult<Vec<Token>> {
  let mut tokens = Vec::new();
  let bytes = input.as_bytes();
  let mut i = 0;

  while i < bytes.len() {
    let c = bytes[i];
    // `is_ascii_whitespace` leaves out vertical tab.
    if c.is_ascii_whitespace() || c == b'\x0b' {
      i += 1;
      continue;
    }

    if c.is_ascii_digit() {
      let start = i;
      i += 1;
      while i < bytes.len() && bytes[i].is_ascii_digit() {
        i += 1;
      }
      let text = &input[start..i];
      let value = text
        .parse::<i64>()
        .map_err(|_| CompileError::lex(input, start, "number literal out of range"))?;
      tokens.push(Token::new(TokenKind::Num, start, i - start, Some(value)));
      continue;
    }

    if let Some((op, kind)) = TWO_CHAR_PUNCTUATORS
      .into_iter()
      .find(|(op, _)| input[i..].starts_with(op))
    {
      tokens.push(Token::new(kind, i, op.len(), None));
      i += op.len();
      continue;
    }

    let single = match c {
      b'+' => Some(TokenKind::Plus),
      b'-' => Some(TokenKind::Minus),
      b'*' => Some(TokenKind::Star),
      b'/' => Some(TokenKind::Slash),
      b'(' => Some(TokenKind::LParen),
      b')' => Some(TokenKind::RParen),
      b'<' => Some(TokenKind::Lt),
      b'>' => Some(TokenKind::Gt),
      _ => None,
    };
    if let Some(kind) = single {
      tokens.push(Token::new(kind, i, 1, None));
      i += 1;
      continue;
    }

    let invalid_char = input[i..].chars().next().unwrap_or('\0');
    return Err(CompileError::lex(
      input,
      i,
      format!("invalid token: '{invalid_char}'"),
    ));
  }

  tokens.push(Token::new(TokenKind::Eof, input.len(), 0, None));
  tracing::debug!(count = tokens.len(), "tokenized input");
  Ok(tokens)
}

/// Return the slice from the source that produced this token.
pub fn token_text<'a>(token: &Token, source: &'a str) -> &'a str {
  let end = token.loc + token.len;
  &source[token.loc..end]
}

/// Human-friendly description used in diagnostics.
pub fn describe_token(token: Option<&Token>, source: &str) -> String {
  match token {
    Some(t) => match t.kind {
      TokenKind::Eof => "EOF".to_string(),
      _ => token_text(t, source).to_string(),
    },
    None => "EOF".to_string(),
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn kinds(input: &str) -> Vec<TokenKind> {
    tokenize(input)
      .unwrap()
      .into_iter()
      .map(|token| token.kind)
      .collect()
  }

  #[test]
  fn tokenizes_arithmetic() {
    let tokens = tokenize("1+2*3").unwrap();
    let rendered: Vec<String> = tokens.iter().map(ToString::to_string).collect();
    assert_eq!(
      rendered,
      ["NUMBER(1)@0", "PLUS@1", "NUMBER(2)@2", "STAR@3", "NUMBER(3)@4", "EOF@5"]
    );
    assert_eq!(tokens, tokenize("1+2*3").unwrap());
  }

  #[test]
  fn two_char_operators_win() {
    assert_eq!(
      kinds("1<=2>=3==4!=5<6>7"),
      [
        TokenKind::Num,
        TokenKind::Le,
        TokenKind::Num,
        TokenKind::Ge,
        TokenKind::Num,
        TokenKind::Eq,
        TokenKind::Num,
        TokenKind::Ne,
        TokenKind::Num,
        TokenKind::Lt,
        TokenKind::Num,
        TokenKind::Gt,
        TokenKind::Num,
        TokenKind::Eof,
      ]
    );
  }

  #[test]
  fn whitespace_is_skipped_and_offsets_kept() {
    let tokens = tokenize("  12 \t( 3 )").unwrap();
    let locs: Vec<usize> = tokens.iter().map(|token| token.loc).collect();
    assert_eq!(locs, [2, 6, 8, 10, 11]);
    assert_eq!(tokens[0].value, Some(12));
    assert_eq!(tokens[0].len, 2);
  }

  #[test]
  fn vertical_tab_is_whitespace() {
    assert_eq!(
      kinds("1+\x0b2\x0c"),
      [TokenKind::Num, TokenKind::Plus, TokenKind::Num, TokenKind::Eof]
    );
  }

  #[test]
  fn digits_form_one_literal() {
    let tokens = tokenize("007 42").unwrap();
    assert_eq!(tokens[0].value, Some(7));
    assert_eq!(tokens[1].value, Some(42));
    assert_eq!(token_text(&tokens[0], "007 42"), "007");
  }

  #[test]
  fn empty_input_is_only_eof() {
    let tokens = tokenize("").unwrap();
    assert_eq!(tokens, [Token::new(TokenKind::Eof, 0, 0, None)]);
    assert_eq!(describe_token(tokens.first(), ""), "EOF");
  }

  #[test]
  fn rejects_unknown_character() {
    let err = tokenize("1&2").unwrap_err();
    assert!(err.is_lex());
    assert_eq!(err.loc(), Some(1));
  }

  #[test]
  fn rejects_lone_bang_and_assignment() {
    assert_eq!(tokenize("1!2").unwrap_err().loc(), Some(1));
    assert_eq!(tokenize("1=2").unwrap_err().loc(), Some(1));
  }

  #[test]
  fn rejects_oversized_literal() {
    let err = tokenize("1+99999999999999999999").unwrap_err();
    assert!(err.is_lex());
    assert_eq!(err.loc(), Some(2));
  }
}
