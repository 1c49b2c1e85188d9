//! # Command Line Interface
//!
//! Argument parsing, settings resolution and the top-level import run.

use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::builder::Styles;
use clap::builder::styling::AnsiColor;
use clap::{ArgAction, Parser};
use fogbugz_api::{ClientOptions, Credentials, FogBugzClient};
use fogbugz_core::consts::{ENV_FOGBUGZ_EMAIL, ENV_FOGBUGZ_TOKEN, ENV_FOGBUGZ_URL};
use fogbugz_core::output::format_path;
use fogbugz_core::url::normalize_api_url;
use fogbugz_core::{ConfigDirs, FileEncoding, Settings, print_error, print_info, print_success, print_warning};
use thiserror::Error;
use tokio::runtime::Runtime;
use tracing::debug;

use crate::importer::{FileResult, ImportOptions, check_input_files, import_files};

/// Replay ticket exports against FogBugz
#[derive(Parser, Debug)]
#[command(name = "fogbugz-import")]
#[command(author = env!("CARGO_PKG_AUTHORS"))]
#[command(about = "Imports ticket CSV exports into FogBugz")]
#[command(
  long_about = "Replays ticket CSV exports against the FogBugz XML API.\n\n\
        Every row is one command (new, edit, assign, resolve, close, reopen, ...) against\n\
        the case created by the most recent 'new' row of the same file. Attachments are\n\
        read from a media directory next to each tickets file."
)]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(max_term_width = 120)]
#[command(styles = Styles::styled()
    .header(AnsiColor::BrightGreen.on_default().bold().underline())
    .usage(AnsiColor::Green.on_default().bold())
    .literal(AnsiColor::BrightGreen.on_default().bold())
    .placeholder(AnsiColor::BrightWhite.on_default().italic())
    .valid(AnsiColor::Green.on_default())
    .invalid(AnsiColor::BrightRed.on_default().bold())
)]
pub struct Cli {
  /// Sets the level of verbosity (can be used multiple times)
  #[arg(
    short = 'v',
    long = "verbose",
    action = ArgAction::Count,
    long_help = "Sets the level of verbosity for tracing and logging output.\n\n\
             -v: Show info level messages\n\
             -vv: Show debug level messages\n\
             -vvv: Show trace level messages"
  )]
  pub verbose: u8,

  /// FogBugz API URL, e.g. https://example.fogbugz.com/api.asp
  #[arg(short = 'u', long = "api-url", value_name = "URL")]
  pub api_url: Option<String>,

  /// FogBugz API token (recommended)
  #[arg(short = 't', long, value_name = "TOKEN", conflicts_with = "password")]
  pub token: Option<String>,

  /// FogBugz logon email address
  #[arg(short = 'e', long, value_name = "EMAIL")]
  pub email: Option<String>,

  /// FogBugz logon password
  #[arg(short = 'p', long, value_name = "PASSWORD")]
  pub password: Option<String>,

  /// Tickets CSV file to import (repeatable)
  #[arg(short = 'i', long = "import", value_name = "FILE", required = true, num_args = 1..)]
  pub imports: Vec<PathBuf>,

  /// Skip missing or unreadable tickets files instead of stopping
  #[arg(short = 'f', long)]
  pub force: bool,

  /// Attachment directory, relative to each tickets file
  #[arg(long, value_name = "DIR")]
  pub media_dir: Option<PathBuf>,

  /// Per-request timeout in seconds
  #[arg(long, value_name = "SECONDS")]
  pub timeout: Option<u64>,

  /// Save every raw response to <tickets>.responses.xml
  #[arg(long)]
  pub save_responses: bool,

  /// Send attachment bytes as-is instead of base64
  #[arg(long)]
  pub raw_attachments: bool,
}

/// Problems with the combined CLI, environment and config settings
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
  #[error("no FogBugz API URL; pass --api-url, set $FOGBUGZ_URL or add api_url to config.toml")]
  MissingApiUrl,
  #[error("either --token (or $FOGBUGZ_TOKEN) or --email and --password is required")]
  MissingCredentials,
}

/// Everything a run needs, after layering flags over environment over
/// `config.toml`
#[derive(Debug, Clone)]
pub struct RunConfig {
  pub api_url: String,
  pub credentials: Credentials,
  pub client: ClientOptions,
  pub import: ImportOptions,
  pub inputs: Vec<PathBuf>,
  pub force: bool,
}

fn non_blank(value: Option<String>) -> Option<String> {
  value.filter(|value| !value.trim().is_empty())
}

/// Non-empty environment variable
pub fn env_var(name: &str) -> Option<String> {
  non_blank(std::env::var(name).ok())
}

/// Combine flags, environment (via `env`) and settings.
pub fn resolve_config(cli: &Cli, settings: &Settings, env: impl Fn(&str) -> Option<String>) -> Result<RunConfig> {
  let api_url = non_blank(cli.api_url.clone())
    .or_else(|| env(ENV_FOGBUGZ_URL))
    .or_else(|| non_blank(settings.api_url.clone()))
    .ok_or(ConfigError::MissingApiUrl)?;
  let api_url = normalize_api_url(&api_url)?;

  let token = non_blank(cli.token.clone()).or_else(|| env(ENV_FOGBUGZ_TOKEN));
  let email = non_blank(cli.email.clone()).or_else(|| env(ENV_FOGBUGZ_EMAIL));
  let password = non_blank(cli.password.clone());
  let credentials = match (token, email, password) {
    // An explicit password means logon, even if a token is in the environment
    (_, Some(email), Some(password)) if cli.token.is_none() => Credentials::Password { email, password },
    (Some(token), _, _) => Credentials::Token(token),
    _ => return Err(ConfigError::MissingCredentials.into()),
  };

  let file_encoding = if cli.raw_attachments {
    FileEncoding::Binary
  } else {
    settings.file_encoding
  };
  let timeout = cli.timeout.or(settings.timeout_secs).map(Duration::from_secs);
  let media_dir = cli
    .media_dir
    .clone()
    .unwrap_or_else(|| PathBuf::from(&settings.media_dir));

  Ok(RunConfig {
    api_url,
    credentials,
    client: ClientOptions { timeout, file_encoding },
    import: ImportOptions {
      media_dir,
      save_responses: cli.save_responses,
    },
    inputs: cli.imports.clone(),
    force: cli.force,
  })
}

/// Handle the parsed command line
pub fn handle_cli(cli: Cli) -> Result<()> {
  let config_dirs = ConfigDirs::new()?;
  let settings = config_dirs.load_settings()?;
  let config = resolve_config(&cli, &settings, env_var)?;
  debug!("Resolved configuration: {config:?}");

  let inputs = usable_inputs(&config)?;

  let rt = Runtime::new().context("Failed to create tokio runtime")?;
  let results = rt.block_on(run_import(&config, &inputs))?;
  summarize(&results)
}

/// Drop unusable input files, or stop when `--force` was not given.
fn usable_inputs(config: &RunConfig) -> Result<Vec<PathBuf>> {
  let problems = check_input_files(&config.inputs);
  for (path, reason) in &problems {
    let message = format!("Tickets file {} unavailable: {reason}", format_path(&path.display().to_string()));
    if config.force {
      print_warning(&message);
    } else {
      print_error(&message);
    }
  }

  if !problems.is_empty() && !config.force {
    return Err(anyhow::anyhow!(
      "{} tickets file(s) unavailable; use --force to skip them",
      problems.len()
    ));
  }

  let inputs: Vec<PathBuf> = config
    .inputs
    .iter()
    .filter(|path| !problems.iter().any(|(problem, _)| problem == *path))
    .cloned()
    .collect();
  if inputs.is_empty() {
    return Err(anyhow::anyhow!("No tickets files left to import"));
  }
  Ok(inputs)
}

/// Connect once, then import every file concurrently.
pub async fn run_import(config: &RunConfig, inputs: &[PathBuf]) -> Result<Vec<FileResult>> {
  let mut client = FogBugzClient::with_options(&config.api_url, config.client)?;
  let people = client
    .connect(&config.credentials)
    .await
    .context("Unable to connect to FogBugz")?;
  print_info(&format!(
    "Connected to {} ({} people)",
    config.api_url,
    people.len()
  ));

  for input in inputs {
    print_info(&format!("Processing {}", format_path(&input.display().to_string())));
  }
  Ok(import_files(&client, &people, inputs, &config.import).await)
}

fn summarize(results: &[FileResult]) -> Result<()> {
  let mut failed = 0;
  for FileResult { path, result } in results {
    let path = format_path(&path.display().to_string());
    match result {
      Ok(report) => {
        let case = report
          .last_case
          .map_or_else(String::new, |case_id| format!(", last case {case_id}"));
        print_success(&format!(
          "Imported {path}: {} rows, {} calls{case}",
          report.rows, report.calls
        ));
        if !report.warnings.is_empty() {
          print_warning(&format!("{path}: {} field(s) omitted", report.warnings.len()));
        }
      }
      Err(e) => {
        failed += 1;
        print_error(&format!("Import of {path} failed: {e:#}"));
      }
    }
  }

  if failed > 0 {
    return Err(anyhow::anyhow!("{failed} of {} tickets file(s) failed", results.len()));
  }
  Ok(())
}
