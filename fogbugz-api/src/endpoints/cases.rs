//! # Case Command Endpoints
//!
//! Executes one logical case command (`new`, `edit`, `resolve`, ...) with its
//! fields and optional file attachments.

use anyhow::{Context, Result};
use fogbugz_core::row::fields;
use fogbugz_core::{AttachmentFile, CaseId, Command, FieldMap};
use tracing::debug;

use crate::client::FogBugzClient;
use crate::error::FogBugzError;

/// Result of one executed command
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandOutcome {
  /// `response/case/@ixBug` for lifecycle commands, when present and numeric
  pub case_id: Option<CaseId>,
  /// Raw XML reply
  pub response: String,
}

impl FogBugzClient {
  /// Execute the command named by the `cmd` field.
  ///
  /// The session token is injected; any `token` or `nFileCount` in `values`
  /// is replaced. Files are sent as `File1..FileN`.
  pub async fn execute_command(&self, values: &FieldMap, attachments: &[AttachmentFile]) -> Result<CommandOutcome> {
    let command = values
      .get(fields::CMD)
      .map(Command::parse)
      .ok_or(FogBugzError::MissingCommand)?;
    let token = self.require_token()?;

    let mut form = self
      .form()
      .text(fields::CMD, command.as_str())
      .text(fields::TOKEN, token);
    for (name, value) in values.iter() {
      if matches!(name, fields::CMD | fields::TOKEN | fields::N_FILE_COUNT) {
        continue;
      }
      form.push_text(name, value);
    }

    let file_count = attachments.len().to_string();
    if !attachments.is_empty() {
      form.push_text(fields::N_FILE_COUNT, file_count.as_str());
      for file in attachments {
        form.push_file(file.display_name.as_str(), file.content_type, file.data.as_slice());
      }
    }

    let reply = self
      .send(&form)
      .await
      .with_context(|| format!("FogBugz '{command}' call failed"))?;

    let case_id = if command.returns_case() {
      reply.response.case_id()
    } else {
      None
    };
    debug!(command = %command, case = ?case_id, files = attachments.len(), "Executed command");

    Ok(CommandOutcome {
      case_id,
      response: reply.body,
    })
  }
}
