//! # Person Directory
//!
//! Maps FogBugz display names to person identifiers. Built once from the
//! `listPeople` response when a session connects and read-only afterwards, so
//! concurrent file imports can share it by reference.

use std::collections::HashMap;

use tracing::debug;

/// A FogBugz person as listed by the service
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Person {
  pub id: String,
  pub full_name: String,
}

impl Person {
  pub fn new(id: impl Into<String>, full_name: impl Into<String>) -> Self {
    Self {
      id: id.into(),
      full_name: full_name.into(),
    }
  }
}

/// Immutable lookup from full display name to person identifier
#[derive(Debug, Clone, Default)]
pub struct PersonDirectory {
  ids_by_name: HashMap<String, String>,
}

impl PersonDirectory {
  /// Build the directory. When two people share a display name the first
  /// listed one wins.
  pub fn from_people<I>(people: I) -> Self
  where
    I: IntoIterator<Item = Person>,
  {
    let mut ids_by_name = HashMap::new();
    for person in people {
      if person.full_name.is_empty() || person.id.is_empty() {
        debug!("Skipping incomplete person entry: {:?}", person);
        continue;
      }
      if let Some(existing) = ids_by_name.get(&person.full_name) {
        debug!(
          "Duplicate person name '{}' ({} and {}), keeping {}",
          person.full_name, existing, person.id, existing
        );
        continue;
      }
      ids_by_name.insert(person.full_name, person.id);
    }
    Self { ids_by_name }
  }

  /// Exact-match lookup by display name.
  pub fn lookup(&self, full_name: &str) -> Option<&str> {
    self.ids_by_name.get(full_name).map(String::as_str)
  }

  /// Resolve a person column value to an identifier.
  ///
  /// All-digit values are already identifiers and pass through trimmed;
  /// anything else must match a display name exactly.
  pub fn resolve(&self, value: &str) -> Option<String> {
    let trimmed = value.trim();
    if !trimmed.is_empty() && trimmed.bytes().all(|b| b.is_ascii_digit()) {
      return Some(trimmed.to_string());
    }
    self.lookup(value).map(str::to_string)
  }

  pub fn len(&self) -> usize {
    self.ids_by_name.len()
  }

  pub fn is_empty(&self) -> bool {
    self.ids_by_name.is_empty()
  }
}
