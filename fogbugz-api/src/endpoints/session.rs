//! # Session Endpoints
//!
//! Logon and the one-time people listing that seeds the person directory.

use anyhow::{Context, Result};
use fogbugz_core::{Person, PersonDirectory};
use tracing::{debug, info};

use crate::client::FogBugzClient;
use crate::models::Credentials;

impl FogBugzClient {
  /// Exchange email and password for a session token
  pub async fn logon(&mut self, email: &str, password: &str) -> Result<()> {
    let form = self
      .form()
      .text("cmd", "logon")
      .text("email", email)
      .text("password", password);

    let reply = self.send(&form).await.context("FogBugz logon failed")?;
    let token = reply.response.token()?.to_string();

    debug!("Logged on to {} as {email}", self.api_url);
    self.token = Some(token);
    Ok(())
  }

  /// Every person the service knows about
  pub async fn list_people(&self) -> Result<Vec<Person>> {
    let token = self.require_token()?;
    let form = self.form().text("cmd", "listPeople").text("token", token);

    let reply = self.send(&form).await.context("Failed to list FogBugz people")?;
    Ok(reply.response.people())
  }

  /// Authenticate (unless a token is already held) and build the person
  /// directory. Any failure here is fatal for the run.
  pub async fn connect(&mut self, credentials: &Credentials) -> Result<PersonDirectory> {
    match credentials {
      Credentials::Token(token) => {
        let token = token.trim();
        if token.is_empty() {
          return Err(crate::error::FogBugzError::MissingToken.into());
        }
        self.token = Some(token.to_string());
      }
      Credentials::Password { email, password } => self.logon(email, password).await?,
    }

    let directory = PersonDirectory::from_people(self.list_people().await?);
    info!("Connected to {} ({} people)", self.api_url, directory.len());
    Ok(directory)
  }
}

#[cfg(test)]
mod tests {
  use fogbugz_test_utils::FogBugzStub;
  use wiremock::matchers::{method, path};
  use wiremock::{Mock, MockServer, ResponseTemplate};

  use super::*;
  use crate::error::FogBugzError;

  #[tokio::test]
  async fn test_connect_with_password() -> anyhow::Result<()> {
    let stub = FogBugzStub::start(&[("5", "Jane Doe"), ("7", "John Roe")]).await;
    let mut client = FogBugzClient::new(&stub.api_url())?;

    let people = client
      .connect(&Credentials::Password {
        email: "admin@example.com".to_string(),
        password: "secret".to_string(),
      })
      .await?;

    assert_eq!(client.token(), Some(FogBugzStub::TOKEN));
    assert_eq!(people.len(), 2);
    assert_eq!(people.lookup("Jane Doe"), Some("5"));

    let requests = stub.requests().await?;
    assert_eq!(requests.len(), 2);
    assert_eq!(requests[0].get("cmd"), Some("logon"));
    assert_eq!(requests[0].get("email"), Some("admin@example.com"));
    assert_eq!(requests[0].get("password"), Some("secret"));
    assert_eq!(requests[1].get("cmd"), Some("listPeople"));
    assert_eq!(requests[1].get("token"), Some(FogBugzStub::TOKEN));
    Ok(())
  }

  #[tokio::test]
  async fn test_connect_with_token_skips_logon() -> anyhow::Result<()> {
    let stub = FogBugzStub::start(&[("5", "Jane Doe")]).await;
    let mut client = FogBugzClient::new(&stub.api_url())?;

    let people = client
      .connect(&Credentials::Token(FogBugzStub::TOKEN.to_string()))
      .await?;

    assert_eq!(people.lookup("Jane Doe"), Some("5"));
    let requests = stub.requests().await?;
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].get("cmd"), Some("listPeople"));
    Ok(())
  }

  #[tokio::test]
  async fn test_connect_with_wrong_token_fails() -> anyhow::Result<()> {
    let stub = FogBugzStub::start(&[]).await;
    let mut client = FogBugzClient::new(&stub.api_url())?;

    let err = client
      .connect(&Credentials::Token("not-the-token".to_string()))
      .await
      .unwrap_err();

    assert!(matches!(
      err.downcast_ref::<FogBugzError>(),
      Some(FogBugzError::Service { code, .. }) if code == "3"
    ));
    Ok(())
  }

  #[tokio::test]
  async fn test_connect_with_blank_token_fails() -> anyhow::Result<()> {
    let mut client = FogBugzClient::new("http://127.0.0.1:9/api.asp")?;

    let err = client.connect(&Credentials::Token("  ".to_string())).await.unwrap_err();
    assert!(matches!(
      err.downcast_ref::<FogBugzError>(),
      Some(FogBugzError::MissingToken)
    ));
    Ok(())
  }

  #[tokio::test]
  async fn test_logon_bad_password() -> anyhow::Result<()> {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
      .and(path("/api.asp"))
      .respond_with(
        ResponseTemplate::new(200)
          .set_body_string(r#"<response><error code="1"><![CDATA[Incorrect password or username]]></error></response>"#),
      )
      .mount(&server)
      .await;

    let mut client = FogBugzClient::new(&format!("{}/api.asp", server.uri()))?;
    let err = client.logon("admin@example.com", "wrong").await.unwrap_err();

    assert!(err.to_string().contains("FogBugz logon failed"));
    assert!(client.token().is_none());
    Ok(())
  }

  #[tokio::test]
  async fn test_logon_empty_token() -> anyhow::Result<()> {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
      .and(path("/api.asp"))
      .respond_with(ResponseTemplate::new(200).set_body_string("<response><token></token></response>"))
      .mount(&server)
      .await;

    let mut client = FogBugzClient::new(&format!("{}/api.asp", server.uri()))?;
    let err = client.logon("admin@example.com", "secret").await.unwrap_err();

    assert!(matches!(
      err.downcast_ref::<FogBugzError>(),
      Some(FogBugzError::MissingToken)
    ));
    assert!(client.token().is_none());
    Ok(())
  }

  #[tokio::test]
  async fn test_list_people_requires_token() -> anyhow::Result<()> {
    let client = FogBugzClient::new("http://127.0.0.1:9/api.asp")?;

    let err = client.list_people().await.unwrap_err();
    assert!(matches!(
      err.downcast_ref::<FogBugzError>(),
      Some(FogBugzError::NotConnected)
    ));
    Ok(())
  }
}
