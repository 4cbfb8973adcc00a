//! Output options shared by the library entry points and the CLI.

use std::fmt;
use std::str::FromStr;

/// Assembler dialect of the emitted listing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Syntax {
  /// `.intel_syntax noprefix`, destination operand first.
  #[default]
  Intel,
  /// AT&T with `%` registers and `$` immediates, destination operand last.
  Att,
}

impl fmt::Display for Syntax {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Syntax::Intel => f.write_str("intel"),
      Syntax::Att => f.write_str("att"),
    }
  }
}

impl FromStr for Syntax {
  type Err = String;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    match s {
      "intel" => Ok(Syntax::Intel),
      "att" => Ok(Syntax::Att),
      other => Err(format!("unknown syntax \"{other}\" (expected intel or att)")),
    }
  }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Options {
  pub syntax: Syntax,
  /// Global symbol and label the listing starts at.
  pub entry: String,
}

impl Default for Options {
  fn default() -> Self {
    Self {
      syntax: Syntax::Intel,
      entry: "main".to_string(),
    }
  }
}

/// Check that `name` can be used verbatim as an assembler symbol.
pub fn validate_symbol(name: &str) -> Result<String, String> {
  let mut chars = name.chars();
  let Some(first) = chars.next() else {
    return Err("symbol name is empty".to_string());
  };
  if !(first.is_ascii_alphabetic() || first == '_' || first == '.') {
    return Err(format!("symbol \"{name}\" must start with a letter, '_' or '.'"));
  }
  if let Some(bad) = chars.find(|c| !(c.is_ascii_alphanumeric() || matches!(c, '_' | '.' | '$'))) {
    return Err(format!("symbol \"{name}\" contains invalid character '{bad}'"));
  }
  Ok(name.to_string())
}
