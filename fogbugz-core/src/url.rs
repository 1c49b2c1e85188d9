//! API URL normalisation.

use anyhow::{Context, Result};
use url::Url;

/// Ensure the API URL has an `http` or `https` scheme, assuming `https://`
/// when none is given.
pub fn normalize_api_url(input: &str) -> Result<String> {
  let trimmed = input.trim();
  if trimmed.is_empty() {
    return Err(anyhow::anyhow!("API URL cannot be empty"));
  }

  let candidate = if trimmed.contains("://") {
    trimmed.to_string()
  } else {
    format!("https://{trimmed}")
  };

  let url = Url::parse(&candidate).with_context(|| format!("Failed to parse API URL: '{input}'"))?;
  match url.scheme() {
    "http" | "https" => {}
    other => {
      return Err(anyhow::anyhow!(
        "Unsupported scheme '{other}' in API URL '{input}'; expected http or https"
      ));
    }
  }
  if url.host_str().is_none() {
    return Err(anyhow::anyhow!("API URL '{input}' has no host"));
  }

  Ok(url.to_string())
}

#[cfg(test)]
mod tests {
  use test_case::test_case;

  use super::*;

  #[test_case("https://example.fogbugz.com/api.asp", "https://example.fogbugz.com/api.asp" ; "full url")]
  #[test_case("example.fogbugz.com/api.asp", "https://example.fogbugz.com/api.asp" ; "no scheme")]
  #[test_case("  http://localhost:8080/api.asp  ", "http://localhost:8080/api.asp" ; "padded http")]
  #[test_case("https://example.fogbugz.com", "https://example.fogbugz.com/" ; "bare host")]
  fn test_normalize_api_url(input: &str, expected: &str) {
    assert_eq!(normalize_api_url(input).unwrap(), expected);
  }

  #[test_case("" ; "empty")]
  #[test_case("   " ; "blank")]
  #[test_case("ftp://example.com/api.asp" ; "wrong scheme")]
  fn test_normalize_api_url_rejects(input: &str) {
    assert!(normalize_api_url(input).is_err());
  }
}
