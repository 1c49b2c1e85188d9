//! Constants for the FogBugz API client.

/// User-Agent header value for the FogBugz API client
pub const USER_AGENT: &str = concat!("fogbugz-import/", env!("CARGO_PKG_VERSION"));

/// Attempts at drawing a multipart boundary that does not occur in the payload
pub const MAX_BOUNDARY_ATTEMPTS: usize = 8;
