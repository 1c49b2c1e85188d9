//! # Row Source
//!
//! Reads a tickets CSV export into ordered case rows: one row per data
//! record, keyed by the header row, with blank cells left out.

use std::io::Read;
use std::path::Path;

use anyhow::{Context, Result};
use csv::{ReaderBuilder, StringRecord, Trim};
use fogbugz_core::CaseRow;
use tracing::debug;

/// A case row and the CSV line its record starts on
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceRow {
  pub line: u64,
  pub row: CaseRow,
}

/// Parse CSV text into case rows. Fully blank records are skipped.
pub fn parse_rows<R: Read>(reader: R) -> Result<Vec<SourceRow>> {
  let mut reader = ReaderBuilder::new()
    .has_headers(true)
    .flexible(true)
    .trim(Trim::Headers)
    .from_reader(reader);

  let headers = reader.headers().context("Failed to read CSV header row")?.clone();

  let mut rows = Vec::new();
  let mut record = StringRecord::new();
  while reader.read_record(&mut record).context("Failed to read CSV record")? {
    let row = CaseRow::from_cells(headers.iter().zip(record.iter()));
    if row.is_empty() {
      continue;
    }
    let line = record.position().map_or(0, |position| position.line());
    rows.push(SourceRow { line, row });
  }

  Ok(rows)
}

/// Read every case row from a tickets file
pub async fn read_rows(path: &Path) -> Result<Vec<SourceRow>> {
  let data = tokio::fs::read(path)
    .await
    .with_context(|| format!("Failed to read tickets file {}", path.display()))?;

  let rows = parse_rows(data.as_slice()).with_context(|| format!("Failed to parse tickets file {}", path.display()))?;
  debug!("Read {} rows from {}", rows.len(), path.display());
  Ok(rows)
}
