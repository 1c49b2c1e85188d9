//! FogBugz API stub for testing
//!
//! A wiremock server that answers the XML API the way FogBugz does: `logon`
//! hands out a token, `listPeople` lists the configured people, `new` returns
//! incrementing case numbers and every other command echoes the `ixBug` it
//! was sent. Requests are recorded so tests can decode the multipart bodies
//! that were actually sent.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use anyhow::{Context, anyhow};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, Request, Respond, ResponseTemplate};

/// A running FogBugz stub
pub struct FogBugzStub {
  pub server: MockServer,
}

impl FogBugzStub {
  pub const API_PATH: &'static str = "/api.asp";
  pub const TOKEN: &'static str = "stub-token-0123456789";
  pub const FIRST_CASE: u64 = 1;

  /// Start a stub that knows the given `(ixPerson, sFullName)` pairs
  pub async fn start(people: &[(&str, &str)]) -> Self {
    Self::start_failing(people, &[]).await
  }

  /// Start a stub that answers HTTP 500 to the listed commands
  pub async fn start_failing(people: &[(&str, &str)], failing_commands: &[&str]) -> Self {
    let server = MockServer::start().await;
    let responder = StubResponder {
      token: Self::TOKEN.to_string(),
      people: people
        .iter()
        .map(|(id, name)| (id.to_string(), name.to_string()))
        .collect(),
      next_case: Arc::new(AtomicU64::new(Self::FIRST_CASE)),
      failing_commands: failing_commands.iter().map(|cmd| cmd.to_string()).collect(),
    };

    Mock::given(method("POST"))
      .and(path(Self::API_PATH))
      .respond_with(responder)
      .mount(&server)
      .await;

    Self { server }
  }

  /// Full API URL, including the `api.asp` path
  pub fn api_url(&self) -> String {
    format!("{}{}", self.server.uri(), Self::API_PATH)
  }

  /// Every request received so far, decoded, in arrival order
  pub async fn requests(&self) -> anyhow::Result<Vec<DecodedForm>> {
    let requests = self
      .server
      .received_requests()
      .await
      .context("request recording is disabled")?;

    let mut forms = Vec::with_capacity(requests.len());
    for request in &requests {
      forms.push(decode_form(request).await?);
    }
    Ok(forms)
  }

  /// Decoded case commands, leaving out `logon` and `listPeople`
  pub async fn case_requests(&self) -> anyhow::Result<Vec<DecodedForm>> {
    Ok(
      self
        .requests()
        .await?
        .into_iter()
        .filter(|form| !matches!(form.get("cmd"), Some("logon" | "listPeople")))
        .collect(),
    )
  }
}

struct StubResponder {
  token: String,
  people: Vec<(String, String)>,
  next_case: Arc<AtomicU64>,
  failing_commands: Vec<String>,
}

impl Respond for StubResponder {
  fn respond(&self, request: &Request) -> ResponseTemplate {
    let Some(cmd) = form_value(&request.body, "cmd") else {
      return xml_response(r#"<response><error code="0"><![CDATA[No command given]]></error></response>"#);
    };

    if self.failing_commands.contains(&cmd) {
      return ResponseTemplate::new(500).set_body_string("Internal Server Error");
    }

    if cmd == "logon" {
      return xml_response(&format!(
        "<response><token><![CDATA[{}]]></token></response>",
        self.token
      ));
    }

    if form_value(&request.body, "token").as_deref() != Some(self.token.as_str()) {
      return xml_response(r#"<response><error code="3"><![CDATA[Not logged on]]></error></response>"#);
    }

    match cmd.as_str() {
      "listPeople" => {
        let people: String = self
          .people
          .iter()
          .map(|(id, name)| {
            format!("<person><ixPerson>{id}</ixPerson><sFullName><![CDATA[{name}]]></sFullName><fAdministrator>false</fAdministrator></person>")
          })
          .collect();
        xml_response(&format!("<response><people>{people}</people></response>"))
      }
      "new" => {
        let case = self.next_case.fetch_add(1, Ordering::SeqCst);
        xml_response(&format!(
          r#"<response><case ixBug="{case}" operations="edit,assign,resolve,email,remind"></case></response>"#
        ))
      }
      _ => match form_value(&request.body, "ixBug") {
        Some(case) => xml_response(&format!(
          r#"<response><case ixBug="{case}" operations="edit,reopen,email,remind"></case></response>"#
        )),
        None => xml_response("<response></response>"),
      },
    }
  }
}

fn xml_response(body: &str) -> ResponseTemplate {
  ResponseTemplate::new(200).set_body_raw(
    format!("<?xml version=\"1.0\" encoding=\"UTF-8\"?>{body}"),
    "text/xml",
  )
}

/// Pull a text field out of a raw multipart body without a full parse.
pub fn form_value(body: &[u8], name: &str) -> Option<String> {
  let body = String::from_utf8_lossy(body);
  let marker = format!("name=\"{name}\"\r\n\r\n");
  let start = body.find(&marker)? + marker.len();
  let rest = &body[start..];
  let end = rest.find("\r\n--")?;
  Some(rest[..end].to_string())
}

/// A file part decoded from a multipart body
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedFile {
  pub name: String,
  pub file_name: String,
  pub content_type: Option<String>,
  pub data: Vec<u8>,
}

/// A multipart body decoded with a standard parser
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DecodedForm {
  pub fields: Vec<(String, String)>,
  pub files: Vec<DecodedFile>,
}

impl DecodedForm {
  pub fn get(&self, name: &str) -> Option<&str> {
    self
      .fields
      .iter()
      .find(|(field, _)| field == name)
      .map(|(_, value)| value.as_str())
  }

  /// Text fields other than the listed names, in order
  pub fn fields_except(&self, names: &[&str]) -> Vec<(String, String)> {
    self
      .fields
      .iter()
      .filter(|(field, _)| !names.contains(&field.as_str()))
      .cloned()
      .collect()
  }
}

/// Decode a recorded request's multipart body
pub async fn decode_form(request: &Request) -> anyhow::Result<DecodedForm> {
  let content_type = request
    .headers
    .get("content-type")
    .ok_or_else(|| anyhow!("request has no content type"))?
    .to_str()?;
  decode_body(content_type, &request.body).await
}

/// Decode a multipart body given its `Content-Type` header value
pub async fn decode_body(content_type: &str, body: &[u8]) -> anyhow::Result<DecodedForm> {
  let boundary = multer::parse_boundary(content_type)?;
  let mut multipart = multer::Multipart::with_reader(body, boundary);

  let mut form = DecodedForm::default();
  while let Some(field) = multipart.next_field().await? {
    let name = field.name().unwrap_or_default().to_string();
    let file_name = field.file_name().map(str::to_string);
    let content_type = field.content_type().map(|mime| mime.to_string());
    let data = field.bytes().await?.to_vec();

    match file_name {
      Some(file_name) => form.files.push(DecodedFile {
        name,
        file_name,
        content_type,
        data,
      }),
      None => form.fields.push((name, String::from_utf8(data)?)),
    }
  }
  Ok(form)
}
