//! Closed set of case commands understood by the importer.

use std::fmt;

/// A case command, as named in the `cmd` column.
///
/// Commands outside the lifecycle set are kept verbatim in [`Command::Other`]
/// and forwarded unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Command {
  New,
  Edit,
  Assign,
  Resolve,
  Close,
  Reopen,
  Reactivate,
  Other(String),
}

impl Command {
  /// Parse a `cmd` value. Known commands match case-insensitively.
  pub fn parse(raw: &str) -> Self {
    let trimmed = raw.trim();
    match trimmed.to_ascii_lowercase().as_str() {
      "new" => Self::New,
      "edit" => Self::Edit,
      "assign" => Self::Assign,
      "resolve" => Self::Resolve,
      "close" => Self::Close,
      "reopen" => Self::Reopen,
      "reactivate" => Self::Reactivate,
      _ => Self::Other(trimmed.to_string()),
    }
  }

  pub fn as_str(&self) -> &str {
    match self {
      Self::New => "new",
      Self::Edit => "edit",
      Self::Assign => "assign",
      Self::Resolve => "resolve",
      Self::Close => "close",
      Self::Reopen => "reopen",
      Self::Reactivate => "reactivate",
      Self::Other(name) => name,
    }
  }

  /// Whether the service answers this command with the affected case.
  pub fn returns_case(&self) -> bool {
    !matches!(self, Self::Other(_))
  }
}

impl fmt::Display for Command {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

impl From<&str> for Command {
  fn from(raw: &str) -> Self {
    Self::parse(raw)
  }
}

#[cfg(test)]
mod tests {
  use test_case::test_case;

  use super::*;

  #[test_case("new", Command::New ; "new")]
  #[test_case("Close", Command::Close ; "mixed case")]
  #[test_case(" reopen ", Command::Reopen ; "padded")]
  #[test_case("REACTIVATE", Command::Reactivate ; "upper case")]
  #[test_case("sendEmail", Command::Other("sendEmail".to_string()) ; "unknown")]
  fn test_parse(raw: &str, expected: Command) {
    assert_eq!(Command::parse(raw), expected);
  }

  #[test]
  fn test_other_commands_keep_their_spelling() {
    let command = Command::parse("  forward ");
    assert_eq!(command.as_str(), "forward");
    assert!(!command.returns_case());
  }

  #[test]
  fn test_lifecycle_commands_return_case() {
    for raw in ["new", "edit", "assign", "resolve", "close", "reopen", "reactivate"] {
      let command = Command::parse(raw);
      assert!(command.returns_case(), "{raw} should return a case");
      assert_eq!(command.to_string(), raw);
    }
  }
}
