//! # Command Translator
//!
//! Replays the rows of one tickets file against the service, keeping the
//! remote case in a state where every requested transition is legal. A
//! `close` on an unresolved case is preceded by a `resolve` built from the
//! same row, and a `reopen` of a case that was never closed is sent as
//! `reactivate`.
//!
//! Each file gets its own translator; the person directory and the service
//! session are shared read-only.

use std::future::Future;
use std::path::PathBuf;

use anyhow::{Context, Result};
use fogbugz_api::{CommandOutcome, FogBugzClient};
use fogbugz_core::row::fields;
use fogbugz_core::{
  AttachmentFile, CaseId, CaseRow, CaseState, Command, FieldMap, PersonDirectory, PreparedRow, load_attachments,
  prepare_row,
};
use tracing::{debug, info};

/// Something that can execute a single case command
pub trait CaseService {
  fn execute(&self, values: &FieldMap, attachments: &[AttachmentFile]) -> impl Future<Output = Result<CommandOutcome>>;
}

impl CaseService for FogBugzClient {
  fn execute(&self, values: &FieldMap, attachments: &[AttachmentFile]) -> impl Future<Output = Result<CommandOutcome>> {
    self.execute_command(values, attachments)
  }
}

/// What one input row turned into
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RowOutcome {
  /// Commands actually sent, in order
  pub calls: Vec<Command>,
  pub case_id: Option<CaseId>,
  pub warnings: Vec<String>,
}

/// Per-file replay state
pub struct CaseTranslator<'a, S> {
  service: &'a S,
  people: &'a PersonDirectory,
  media_dir: PathBuf,
  state: CaseState,
  calls: usize,
  responses: Vec<String>,
}

impl<'a, S: CaseService> CaseTranslator<'a, S> {
  pub fn new(service: &'a S, people: &'a PersonDirectory, media_dir: impl Into<PathBuf>) -> Self {
    Self {
      service,
      people,
      media_dir: media_dir.into(),
      state: CaseState::default(),
      calls: 0,
      responses: Vec::new(),
    }
  }

  pub fn state(&self) -> CaseState {
    self.state
  }

  /// Total calls issued so far
  pub fn call_count(&self) -> usize {
    self.calls
  }

  /// Raw replies of every successful call, in order
  pub fn responses(&self) -> &[String] {
    &self.responses
  }

  /// Plan and execute one row.
  ///
  /// Errors leave the state as it was after the last successful call.
  pub async fn process_row(&mut self, row: &CaseRow) -> Result<RowOutcome> {
    let prepared = prepare_row(row, self.people)?;
    let plan = self.state.plan(&prepared.command)?;

    let attachments = if prepared.attachments.is_empty() {
      Vec::new()
    } else {
      load_attachments(&self.media_dir, &prepared.attachments)
        .await
        .context("Failed to load attachments")?
    };

    let last = plan.len().saturating_sub(1);
    let mut calls = Vec::with_capacity(plan.len());
    for (index, call) in plan.into_iter().enumerate() {
      let values = self.call_values(&call, &prepared);
      let files: &[AttachmentFile] = if index == last { &attachments } else { &[] };

      if call != prepared.command {
        debug!("'{}' sent as '{call}'", prepared.command);
      }
      let outcome = self.service.execute(&values, files).await?;
      self.calls += 1;
      self.responses.push(outcome.response);
      self.state = self.state.advance(&call, outcome.case_id)?;
      calls.push(call);
    }

    info!(
      "{} -> {} (case {})",
      prepared.command,
      calls.iter().map(Command::as_str).collect::<Vec<_>>().join(", "),
      self
        .state
        .case_id()
        .map_or_else(|| "none".to_string(), |case_id| case_id.to_string())
    );

    Ok(RowOutcome {
      calls,
      case_id: self.state.case_id(),
      warnings: prepared.warnings,
    })
  }

  /// Fields for one call: `cmd`, the current case for anything but `new`,
  /// then the row's own fields in column order.
  fn call_values(&self, call: &Command, prepared: &PreparedRow) -> FieldMap {
    let mut values = FieldMap::new();
    values.insert(fields::CMD, call.as_str());

    let case_id = match call {
      Command::New => None,
      _ => self.state.case_id(),
    };
    if let Some(case_id) = case_id {
      values.insert(fields::IX_BUG, case_id.to_string());
    }

    for (name, value) in prepared.fields.iter() {
      if case_id.is_some() && name == fields::IX_BUG {
        continue;
      }
      values.insert(name, value);
    }
    values
  }
}
