//! Constants shared by the importer crates
//!
//! Environment variable names and file naming conventions.

/// Environment variable for the FogBugz API URL
pub const ENV_FOGBUGZ_URL: &str = "FOGBUGZ_URL";

/// Environment variable for a pre-issued FogBugz API token
pub const ENV_FOGBUGZ_TOKEN: &str = "FOGBUGZ_TOKEN";

/// Environment variable for the FogBugz logon email
pub const ENV_FOGBUGZ_EMAIL: &str = "FOGBUGZ_EMAIL";

/// Suffix of the per-file raw response log written with `--save-responses`
pub const RESPONSES_SUFFIX: &str = "responses.xml";
