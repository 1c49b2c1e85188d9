//! # FogBugz API Client
//!
//! Drives the FogBugz XML API (`api.asp`) over multipart/form-data POSTs:
//! session logon, the people list, and case commands with file attachments.

mod client;
pub mod consts;
mod endpoints;
pub mod error;
pub mod models;
pub mod multipart;

// Re-export the client
pub use client::{ApiReply, ClientOptions, FogBugzClient};
pub use endpoints::cases::CommandOutcome;
pub use error::FogBugzError;
// Re-export models
pub use models::{ApiResponse, CaseElement, Credentials, ErrorElement, PeopleElement, PersonElement};
pub use multipart::{EncodedForm, FilePart, MultipartForm, random_boundary};
