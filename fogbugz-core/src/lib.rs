//! # FogBugz Import Core Library
//!
//! Shared building blocks for replaying ticket exports against FogBugz: the
//! ordered row model, the closed set of case commands, the per-file case
//! lifecycle state machine, person name resolution, attachment descriptors,
//! and configuration handling.

pub mod attachments;
pub mod command;
pub mod config;
pub mod consts;
pub mod lifecycle;
pub mod mime;
pub mod output;
pub mod people;
pub mod row;
pub mod url;

// Re-export main types for the API client and CLI
pub use attachments::{AttachmentDescriptor, AttachmentError, AttachmentFile, load_attachments, parse_descriptors};
pub use command::Command;
pub use config::{ConfigDirs, FileEncoding, Settings};
pub use lifecycle::{CaseId, CaseState, LifecycleError};
pub use output::{print_error, print_info, print_success, print_warning};
pub use people::{Person, PersonDirectory};
pub use row::{CaseRow, FieldMap, PersonField, PreparedRow, RowError, prepare_row};
