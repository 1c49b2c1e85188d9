//! XML response models and session credentials.
//!
//! Every API reply is a `<response>` document; only the handful of elements
//! the importer needs are modelled and everything else is ignored.

use fogbugz_core::{CaseId, Person};
use serde::Deserialize;

use crate::error::FogBugzError;

/// How a session authenticates
#[derive(Clone)]
pub enum Credentials {
  /// A pre-issued API token, used as-is
  Token(String),
  /// Email and password exchanged for a token via `logon`
  Password { email: String, password: String },
}

impl std::fmt::Debug for Credentials {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    match self {
      Self::Token(_) => f.write_str("Credentials::Token(..)"),
      Self::Password { email, .. } => write!(f, "Credentials::Password {{ email: {email:?}, .. }}"),
    }
  }
}

/// The `<response>` document
#[derive(Debug, Default, Deserialize)]
pub struct ApiResponse {
  pub token: Option<String>,
  pub case: Option<CaseElement>,
  pub people: Option<PeopleElement>,
  pub error: Option<ErrorElement>,
}

/// `<case ixBug="..."/>`
#[derive(Debug, Deserialize)]
pub struct CaseElement {
  #[serde(rename = "@ixBug")]
  pub ix_bug: Option<String>,
}

/// `<people>` wrapper
#[derive(Debug, Default, Deserialize)]
pub struct PeopleElement {
  #[serde(rename = "person", default)]
  pub people: Vec<PersonElement>,
}

/// One `<person>` entry of `listPeople`
#[derive(Debug, Deserialize)]
pub struct PersonElement {
  #[serde(rename = "ixPerson", default)]
  pub id: String,
  #[serde(rename = "sFullName", default)]
  pub full_name: String,
}

/// `<error code="N">message</error>`
#[derive(Debug, Deserialize)]
pub struct ErrorElement {
  #[serde(rename = "@code")]
  pub code: Option<String>,
  #[serde(rename = "$text", default)]
  pub message: String,
}

impl ApiResponse {
  /// Parse a response body
  pub fn parse(xml: &str) -> Result<Self, FogBugzError> {
    quick_xml::de::from_str(xml).map_err(|e| FogBugzError::InvalidResponse(e.to_string()))
  }

  /// The session token; an absent or blank token is an error.
  pub fn token(&self) -> Result<&str, FogBugzError> {
    self
      .token
      .as_deref()
      .map(str::trim)
      .filter(|token| !token.is_empty())
      .ok_or(FogBugzError::MissingToken)
  }

  /// `response/case/@ixBug`, when present and numeric
  pub fn case_id(&self) -> Option<CaseId> {
    self.case.as_ref()?.ix_bug.as_deref()?.parse().ok()
  }

  /// Every `response/people/person` entry
  pub fn people(&self) -> Vec<Person> {
    self
      .people
      .iter()
      .flat_map(|people| &people.people)
      .map(|person| Person::new(person.id.trim(), person.full_name.trim()))
      .collect()
  }

  /// The `<error>` element as an error value, if the service reported one
  pub fn service_error(&self) -> Option<FogBugzError> {
    self.error.as_ref().map(|error| FogBugzError::Service {
      code: error.code.clone().unwrap_or_else(|| "?".to_string()),
      message: error.message.trim().to_string(),
    })
  }
}
