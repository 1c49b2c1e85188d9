use thiserror::Error;

/// Errors reported by the FogBugz client
#[derive(Debug, Error)]
pub enum FogBugzError {
  /// The service answered with an `<error>` element
  #[error("FogBugz error {code}: {message}")]
  Service { code: String, message: String },
  #[error("logon response did not contain a token")]
  MissingToken,
  #[error("no session token; connect before sending commands")]
  NotConnected,
  #[error("request fields have no 'cmd'")]
  MissingCommand,
  #[error("no multipart boundary absent from the payload after {attempts} attempts")]
  BoundaryCollision { attempts: usize },
  #[error("unreadable FogBugz response: {0}")]
  InvalidResponse(String),
  #[error("authentication failed (HTTP {status}). Please check your FogBugz credentials.")]
  Unauthorized { status: u16 },
  #[error("unexpected error: HTTP {status} - {body}")]
  Http { status: u16, body: String },
}
