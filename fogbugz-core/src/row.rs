//! # Case Rows
//!
//! The loosely typed input record: an order-preserving map from column name
//! to value, plus the closed set of column names the importer understands.
//! Unknown columns are carried through to the API untouched.

use thiserror::Error;
use tracing::{debug, warn};

use crate::attachments::{AttachmentDescriptor, parse_descriptors};
use crate::command::Command;
use crate::people::PersonDirectory;

/// Well-known field names, shared by the row source and the API client.
pub mod fields {
  pub const CMD: &str = "cmd";
  pub const TOKEN: &str = "token";
  pub const IX_BUG: &str = "ixBug";
  pub const N_FILE_COUNT: &str = "nFileCount";
  pub const ATTACHMENTS: &str = "attachments";
  pub const DT: &str = "dt";
  pub const S_TITLE: &str = "sTitle";
  pub const S_PROJECT: &str = "sProject";
  pub const S_AREA: &str = "sArea";
  pub const S_FIX_FOR: &str = "sFixFor";
  pub const IX_PRIORITY: &str = "ixPriority";
  pub const DT_DUE: &str = "dtDue";
  pub const S_EVENT: &str = "sEvent";
  pub const IX_PERSON_ASSIGNED_TO: &str = "ixPersonAssignedTo";
  pub const IX_PERSON_EDITED_BY: &str = "ixPersonEditedBy";
}

/// Ordered string map. Inserting an existing key replaces its value in place.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldMap {
  entries: Vec<(String, String)>,
}

/// One input record describing one desired command against one case.
pub type CaseRow = FieldMap;

impl FieldMap {
  pub fn new() -> Self {
    Self::default()
  }

  /// Build a row from header/value cells, omitting blank and
  /// whitespace-only values.
  pub fn from_cells<'a, I>(cells: I) -> Self
  where
    I: IntoIterator<Item = (&'a str, &'a str)>,
  {
    cells
      .into_iter()
      .filter(|(name, value)| !name.trim().is_empty() && !value.trim().is_empty())
      .map(|(name, value)| (name.trim(), value))
      .collect()
  }

  /// Insert a value, returning the previous one if the key was present.
  pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) -> Option<String> {
    let key = key.into();
    let value = value.into();
    match self.entries.iter_mut().find(|(k, _)| *k == key) {
      Some((_, existing)) => Some(std::mem::replace(existing, value)),
      None => {
        self.entries.push((key, value));
        None
      }
    }
  }

  pub fn get(&self, key: &str) -> Option<&str> {
    self
      .entries
      .iter()
      .find(|(k, _)| k == key)
      .map(|(_, v)| v.as_str())
  }

  pub fn remove(&mut self, key: &str) -> Option<String> {
    let index = self.entries.iter().position(|(k, _)| k == key)?;
    Some(self.entries.remove(index).1)
  }

  pub fn contains_key(&self, key: &str) -> bool {
    self.entries.iter().any(|(k, _)| k == key)
  }

  pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
    self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
  }

  pub fn len(&self) -> usize {
    self.entries.len()
  }

  pub fn is_empty(&self) -> bool {
    self.entries.is_empty()
  }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for FieldMap {
  fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
    let mut map = FieldMap::new();
    for (key, value) in iter {
      map.insert(key, value);
    }
    map
  }
}

/// Fields that name a person and are resolved through the person directory.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PersonField {
  AssignedTo,
  EditedBy,
}

impl PersonField {
  /// Match a column name, including the spreadsheet-friendly aliases.
  pub fn from_column(column: &str) -> Option<Self> {
    match column {
      fields::IX_PERSON_ASSIGNED_TO | "sPersonAssignedTo" | "assignedTo" => Some(Self::AssignedTo),
      fields::IX_PERSON_EDITED_BY | "reporter" | "editedBy" => Some(Self::EditedBy),
      _ => None,
    }
  }

  /// The name the API expects once the value is an identifier.
  pub fn api_name(self) -> &'static str {
    match self {
      Self::AssignedTo => fields::IX_PERSON_ASSIGNED_TO,
      Self::EditedBy => fields::IX_PERSON_EDITED_BY,
    }
  }
}

/// Errors raised while turning a raw row into request fields
#[derive(Debug, Error)]
pub enum RowError {
  #[error("row has no '{}' value", fields::CMD)]
  MissingCommand,
  #[error(transparent)]
  Attachments(#[from] crate::attachments::AttachmentError),
}

/// A row split into its command, its pass-through fields and its attachments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreparedRow {
  pub command: Command,
  pub fields: FieldMap,
  pub attachments: Vec<AttachmentDescriptor>,
  pub warnings: Vec<String>,
}

/// Extract the command, resolve person columns and parse attachments.
///
/// Unresolvable people are dropped from the fields and reported through
/// `warnings`; they never reject the row.
pub fn prepare_row(row: &CaseRow, people: &PersonDirectory) -> Result<PreparedRow, RowError> {
  let command = row
    .get(fields::CMD)
    .map(Command::parse)
    .ok_or(RowError::MissingCommand)?;

  let attachments = match row.get(fields::ATTACHMENTS) {
    Some(raw) => parse_descriptors(raw)?,
    None => Vec::new(),
  };

  let mut prepared = FieldMap::new();
  let mut warnings = Vec::new();
  for (name, value) in row.iter() {
    if name == fields::CMD || name == fields::ATTACHMENTS {
      continue;
    }

    match PersonField::from_column(name) {
      Some(person_field) => match people.resolve(value) {
        Some(id) => {
          prepared.insert(person_field.api_name(), id);
        }
        None => {
          let warning = format!("no person named '{value}' for column '{name}'; field omitted");
          warn!("{warning}");
          warnings.push(warning);
        }
      },
      None => {
        prepared.insert(name, value);
      }
    }
  }

  debug!(
    "Prepared '{}' row with {} fields and {} attachments",
    command,
    prepared.len(),
    attachments.len()
  );

  Ok(PreparedRow {
    command,
    fields: prepared,
    attachments,
    warnings,
  })
}
