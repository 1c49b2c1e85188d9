//! # Case Lifecycle
//!
//! Per-file state machine that keeps the remote case valid while rows are
//! replayed. FogBugz refuses to close an unresolved case and refuses to
//! `reopen` a case that was never closed, so the importer inserts or rewrites
//! calls based on what it has already sent for the current case.

use std::fmt;
use std::str::FromStr;

use thiserror::Error;

use crate::command::Command;

/// FogBugz case number (`ixBug`)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CaseId(pub u64);

impl fmt::Display for CaseId {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}", self.0)
  }
}

impl FromStr for CaseId {
  type Err = std::num::ParseIntError;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    s.trim().parse().map(CaseId)
  }
}

/// Errors raised when a row does not fit the current case state
#[derive(Debug, Error, PartialEq, Eq)]
pub enum LifecycleError {
  #[error("'{command}' needs an open case, but no 'new' row has created one (possibly invalid tickets file)")]
  NoOpenCase { command: String },
  #[error("'new' succeeded but the response carried no case number")]
  MissingCaseId,
}

/// Lifecycle state of the case a file is currently replaying.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CaseState {
  #[default]
  NoCase,
  Open {
    case_id: CaseId,
    resolved: bool,
    closed: bool,
  },
}

impl CaseState {
  pub fn case_id(&self) -> Option<CaseId> {
    match self {
      Self::NoCase => None,
      Self::Open { case_id, .. } => Some(*case_id),
    }
  }

  /// Ordered calls needed to carry out `command` from this state.
  ///
  /// `close` on an unresolved case is preceded by a `resolve`, and `reopen`
  /// on a case that was never closed becomes `reactivate`. The requested
  /// command (or its rewrite) is always the last call.
  pub fn plan(&self, command: &Command) -> Result<Vec<Command>, LifecycleError> {
    let (resolved, closed) = match (command, self) {
      (Command::New, _) => return Ok(vec![Command::New]),
      (_, Self::NoCase) => {
        return Err(LifecycleError::NoOpenCase {
          command: command.to_string(),
        });
      }
      (_, Self::Open { resolved, closed, .. }) => (*resolved, *closed),
    };

    let calls = match command {
      Command::Close if !resolved => vec![Command::Resolve, Command::Close],
      Command::Reopen if !closed => vec![Command::Reactivate],
      other => vec![other.clone()],
    };
    Ok(calls)
  }

  /// State after `executed` succeeded with the case number the service
  /// returned, if any.
  pub fn advance(self, executed: &Command, returned: Option<CaseId>) -> Result<Self, LifecycleError> {
    if *executed == Command::New {
      let case_id = returned.ok_or(LifecycleError::MissingCaseId)?;
      return Ok(Self::Open {
        case_id,
        resolved: false,
        closed: false,
      });
    }

    let Self::Open {
      case_id,
      resolved,
      closed,
    } = self
    else {
      return Err(LifecycleError::NoOpenCase {
        command: executed.to_string(),
      });
    };

    let (resolved, closed) = match executed {
      Command::Resolve => (true, closed),
      Command::Close => (true, true),
      Command::Reopen | Command::Reactivate => (false, false),
      _ => (resolved, closed),
    };
    Ok(Self::Open {
      case_id,
      resolved,
      closed,
    })
  }
}

#[cfg(test)]
mod tests {
  use test_case::test_case;

  use super::*;

  const fn open(resolved: bool, closed: bool) -> CaseState {
    CaseState::Open {
      case_id: CaseId(12),
      resolved,
      closed,
    }
  }

  #[test_case(CaseState::NoCase ; "without case")]
  #[test_case(open(true, true) ; "closed case")]
  fn test_new_is_always_one_call(state: CaseState) {
    assert_eq!(state.plan(&Command::New).unwrap(), vec![Command::New]);
    assert_eq!(
      state.advance(&Command::New, Some(CaseId(40))).unwrap(),
      CaseState::Open {
        case_id: CaseId(40),
        resolved: false,
        closed: false
      }
    );
  }

  #[test_case(Command::Resolve ; "resolve")]
  #[test_case(Command::Close ; "close")]
  #[test_case(Command::Edit ; "edit")]
  #[test_case(Command::Other("forward".to_string()) ; "other")]
  fn test_commands_without_case_are_rejected(command: Command) {
    let err = CaseState::NoCase.plan(&command).unwrap_err();
    assert_eq!(
      err,
      LifecycleError::NoOpenCase {
        command: command.to_string()
      }
    );
  }

  #[test]
  fn test_close_unresolved_inserts_resolve() {
    assert_eq!(
      open(false, false).plan(&Command::Close).unwrap(),
      vec![Command::Resolve, Command::Close]
    );
    assert_eq!(open(true, false).plan(&Command::Close).unwrap(), vec![Command::Close]);
  }

  #[test]
  fn test_reopen_unclosed_becomes_reactivate() {
    assert_eq!(
      open(true, false).plan(&Command::Reopen).unwrap(),
      vec![Command::Reactivate]
    );
    assert_eq!(open(true, true).plan(&Command::Reopen).unwrap(), vec![Command::Reopen]);
  }

  #[test_case(open(false, false), Command::Resolve, open(true, false) ; "resolve")]
  #[test_case(open(false, false), Command::Close, open(true, true) ; "close")]
  #[test_case(open(true, true), Command::Reopen, open(false, false) ; "reopen")]
  #[test_case(open(true, false), Command::Reactivate, open(false, false) ; "reactivate")]
  #[test_case(open(true, false), Command::Edit, open(true, false) ; "edit keeps flags")]
  #[test_case(open(true, true), Command::Assign, open(true, true) ; "assign keeps flags")]
  fn test_advance(start: CaseState, executed: Command, expected: CaseState) {
    assert_eq!(start.advance(&executed, Some(CaseId(99))).unwrap(), expected);
  }

  #[test]
  fn test_new_without_case_id_fails() {
    assert_eq!(
      open(false, false).advance(&Command::New, None).unwrap_err(),
      LifecycleError::MissingCaseId
    );
  }

  #[test]
  fn test_full_lifecycle_keeps_case_id() {
    let mut state = CaseState::NoCase;
    for (command, returned) in [
      (Command::New, Some(CaseId(7))),
      (Command::Resolve, None),
      (Command::Close, Some(CaseId(7))),
      (Command::Reopen, None),
    ] {
      for call in state.plan(&command).unwrap() {
        state = state.advance(&call, returned).unwrap();
      }
    }
    assert_eq!(state.case_id(), Some(CaseId(7)));
    assert_eq!(
      state,
      CaseState::Open {
        case_id: CaseId(7),
        resolved: false,
        closed: false
      }
    );
  }
}
