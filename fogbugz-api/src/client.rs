use std::time::Duration;

use anyhow::{Context, Result};
use fogbugz_core::FileEncoding;
use reqwest::header::CONTENT_TYPE;
use reqwest::{Client, StatusCode};
use tracing::{debug, trace};

use crate::consts::USER_AGENT;
use crate::error::FogBugzError;
use crate::models::ApiResponse;
use crate::multipart::MultipartForm;

/// Transport options for a FogBugz client
#[derive(Debug, Clone, Copy, Default)]
pub struct ClientOptions {
  /// Per-request timeout; requests wait indefinitely when unset
  pub timeout: Option<Duration>,
  pub file_encoding: FileEncoding,
}

/// A parsed reply together with the raw body it came from
#[derive(Debug)]
pub struct ApiReply {
  pub body: String,
  pub response: ApiResponse,
}

/// Represents a FogBugz API session
pub struct FogBugzClient {
  pub(crate) client: Client,
  pub(crate) api_url: String,
  pub(crate) token: Option<String>,
  pub(crate) file_encoding: FileEncoding,
}

impl FogBugzClient {
  /// Create a client for the given `api.asp` URL with default options
  pub fn new(api_url: &str) -> Result<Self> {
    Self::with_options(api_url, ClientOptions::default())
  }

  pub fn with_options(api_url: &str, options: ClientOptions) -> Result<Self> {
    let mut builder = Client::builder().user_agent(USER_AGENT);
    if let Some(timeout) = options.timeout {
      builder = builder.timeout(timeout);
    }
    let client = builder.build().context("Failed to build HTTP client")?;

    Ok(Self {
      client,
      api_url: api_url.to_string(),
      token: None,
      file_encoding: options.file_encoding,
    })
  }

  /// Use a pre-issued token instead of logging on
  pub fn with_token(mut self, token: impl Into<String>) -> Self {
    self.token = Some(token.into());
    self
  }

  pub fn token(&self) -> Option<&str> {
    self.token.as_deref()
  }

  pub(crate) fn require_token(&self) -> Result<&str, FogBugzError> {
    self.token.as_deref().ok_or(FogBugzError::NotConnected)
  }

  /// An empty form using this session's file encoding
  pub(crate) fn form<'a>(&self) -> MultipartForm<'a> {
    MultipartForm::new(self.file_encoding)
  }

  /// POST one encoded form and parse the XML reply.
  ///
  /// Non-success statuses and `<error>` replies are errors.
  pub(crate) async fn send(&self, form: &MultipartForm<'_>) -> Result<ApiReply> {
    let encoded = form.encode()?;
    debug!(
      url = %self.api_url,
      fields = form.field_count(),
      files = form.file_count(),
      content_length = encoded.content_length(),
      "Sending FogBugz request"
    );

    let response = self
      .client
      .post(&self.api_url)
      .header(CONTENT_TYPE, encoded.content_type())
      .body(encoded.into_body())
      .send()
      .await
      .context("Failed to connect to FogBugz")?;

    let status = response.status();
    let body = response.text().await.context("Failed to read FogBugz response")?;
    trace!("FogBugz response ({status}): {body}");

    match status {
      StatusCode::OK => {}
      StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
        return Err(FogBugzError::Unauthorized { status: status.as_u16() }.into());
      }
      _ if status.is_success() => {}
      _ => {
        return Err(
          FogBugzError::Http {
            status: status.as_u16(),
            body,
          }
          .into(),
        );
      }
    }

    let response = ApiResponse::parse(&body)?;
    if let Some(error) = response.service_error() {
      return Err(error.into());
    }

    Ok(ApiReply { body, response })
  }
}
