//! Test utilities shared across the fogbugz-import workspace
//!
//! This crate provides common testing infrastructure including:
//! - Temporary tickets/media directories ([`ImportDirGuard`])
//! - A wiremock-backed FogBugz API stub ([`FogBugzStub`])
//!
//! The clippy dead_code lint is disabled for this crate because test utilities
//! may not be used by all tests, and the compiler cannot detect usage across
//! crate boundaries in development dependencies.

#![allow(dead_code)]

pub mod fogbugz;
pub mod import_dir;

// Re-export commonly used items
pub use fogbugz::{DecodedFile, DecodedForm, FogBugzStub, decode_body, decode_form, form_value};
pub use import_dir::ImportDirGuard;
