//! # Importer
//!
//! Runs whole tickets files through the translator. Files are independent:
//! each gets its own case state, they run concurrently on the current task,
//! and one file failing never cancels the others.

use std::fs::File;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use fogbugz_core::consts::RESPONSES_SUFFIX;
use fogbugz_core::{CaseId, PersonDirectory};
use futures::future::join_all;
use tracing::{error, info};

use crate::rows::read_rows;
use crate::translator::{CaseService, CaseTranslator};

/// Options shared by every file of a run
#[derive(Debug, Clone)]
pub struct ImportOptions {
  /// Attachment directory, relative to each tickets file unless absolute
  pub media_dir: PathBuf,
  /// Write each file's raw replies next to it
  pub save_responses: bool,
}

/// Summary of one imported file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileReport {
  pub path: PathBuf,
  pub rows: usize,
  pub calls: usize,
  pub warnings: Vec<String>,
  pub last_case: Option<CaseId>,
}

/// Outcome of one file in a multi-file run
#[derive(Debug)]
pub struct FileResult {
  pub path: PathBuf,
  pub result: Result<FileReport>,
}

/// Attachment directory for a tickets file
pub fn media_dir_for(input: &Path, media_dir: &Path) -> PathBuf {
  match input.parent() {
    Some(parent) => parent.join(media_dir),
    None => media_dir.to_path_buf(),
  }
}

/// `<stem>.responses.xml` beside the tickets file
pub fn responses_path(input: &Path) -> PathBuf {
  let stem = input
    .file_stem()
    .map(|stem| stem.to_string_lossy().into_owned())
    .unwrap_or_else(|| "tickets".to_string());
  input.with_file_name(format!("{stem}.{RESPONSES_SUFFIX}"))
}

/// Input files that are missing, not regular files or not readable, with
/// the reason
pub fn check_input_files(paths: &[PathBuf]) -> Vec<(PathBuf, String)> {
  paths
    .iter()
    .filter_map(|path| {
      let reason = match std::fs::metadata(path) {
        Ok(metadata) if !metadata.is_file() => "not a regular file".to_string(),
        Ok(_) => match File::open(path) {
          Ok(_) => return None,
          Err(e) => e.to_string(),
        },
        Err(e) => e.to_string(),
      };
      Some((path.clone(), reason))
    })
    .collect()
}

/// Import one tickets file, rows strictly in order.
///
/// The first failing row aborts the rest of the file. Replies gathered up to
/// that point are still saved when requested; a failure to save them is
/// logged and the row error is returned.
pub async fn import_file<S: CaseService>(
  service: &S,
  people: &PersonDirectory,
  path: &Path,
  options: &ImportOptions,
) -> Result<FileReport> {
  let rows = read_rows(path).await?;
  let media_dir = media_dir_for(path, &options.media_dir);
  info!("Importing {} rows from {}", rows.len(), path.display());

  let mut translator = CaseTranslator::new(service, people, media_dir);
  let mut warnings = Vec::new();
  let mut result = Ok(());
  for source in &rows {
    match translator.process_row(&source.row).await {
      Ok(outcome) => warnings.extend(outcome.warnings),
      Err(e) => {
        result = Err(e.context(format!("Row {} of {}", source.line, path.display())));
        break;
      }
    }
  }

  let report = FileReport {
    path: path.to_path_buf(),
    rows: rows.len(),
    calls: translator.call_count(),
    warnings,
    last_case: translator.state().case_id(),
  };

  let saved = if options.save_responses {
    save_responses(path, translator.responses()).await
  } else {
    Ok(())
  };

  match (result, saved) {
    (Ok(()), saved) => saved.map(|()| report),
    (Err(e), Err(save_error)) => {
      error!("{save_error:#}");
      Err(e)
    }
    (Err(e), Ok(())) => Err(e),
  }
}

async fn save_responses(input: &Path, responses: &[String]) -> Result<()> {
  let log_path = responses_path(input);
  let mut log = String::new();
  for response in responses {
    log.push_str(response.trim_end());
    log.push('\n');
  }

  tokio::fs::write(&log_path, log)
    .await
    .with_context(|| format!("Failed to write responses to {}", log_path.display()))?;
  info!("Saved {} responses to {}", responses.len(), log_path.display());
  Ok(())
}

/// Import every file concurrently and wait for all of them.
pub async fn import_files<S: CaseService>(
  service: &S,
  people: &PersonDirectory,
  paths: &[PathBuf],
  options: &ImportOptions,
) -> Vec<FileResult> {
  let imports = paths.iter().map(|path| async move {
    let result = import_file(service, people, path, options).await;
    match &result {
      Ok(report) => {
        info!(
          "Imported {} ({} rows, {} calls)",
          path.display(),
          report.rows,
          report.calls
        );
      }
      Err(e) => error!("Import of {} failed: {e:#}", path.display()),
    }
    FileResult {
      path: path.clone(),
      result,
    }
  });

  join_all(imports).await
}
