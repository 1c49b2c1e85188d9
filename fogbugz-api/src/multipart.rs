//! # Multipart Encoder
//!
//! Builds the `multipart/form-data` bodies the FogBugz API accepts: one
//! `text/plain; charset="utf-8"` part per field followed by `File1..FileN`
//! parts. The boundary is random per request and is re-drawn whenever it
//! occurs anywhere in the payload.

use std::borrow::Cow;

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use fogbugz_core::FileEncoding;
use uuid::Uuid;

use crate::consts::MAX_BOUNDARY_ATTEMPTS;
use crate::error::FogBugzError;

const CRLF: &[u8] = b"\r\n";

/// One file part of a form
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilePart<'a> {
  pub file_name: Cow<'a, str>,
  pub content_type: Cow<'a, str>,
  pub data: Cow<'a, [u8]>,
}

/// Text fields and files to send in one request
#[derive(Debug, Clone, Default)]
pub struct MultipartForm<'a> {
  fields: Vec<(Cow<'a, str>, Cow<'a, str>)>,
  files: Vec<FilePart<'a>>,
  encoding: FileEncoding,
}

/// An encoded body with the boundary it was written with
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodedForm {
  boundary: String,
  body: Vec<u8>,
}

impl EncodedForm {
  pub fn boundary(&self) -> &str {
    &self.boundary
  }

  /// Value for the `Content-Type` request header
  pub fn content_type(&self) -> String {
    format!("multipart/form-data; boundary={}", self.boundary)
  }

  pub fn content_length(&self) -> usize {
    self.body.len()
  }

  pub fn body(&self) -> &[u8] {
    &self.body
  }

  pub fn into_body(self) -> Vec<u8> {
    self.body
  }
}

/// 32 random alphanumeric characters
pub fn random_boundary() -> String {
  Uuid::new_v4().simple().to_string()
}

impl<'a> MultipartForm<'a> {
  pub fn new(encoding: FileEncoding) -> Self {
    Self {
      fields: Vec::new(),
      files: Vec::new(),
      encoding,
    }
  }

  /// Add a text field (builder style)
  pub fn text(mut self, name: impl Into<Cow<'a, str>>, value: impl Into<Cow<'a, str>>) -> Self {
    self.push_text(name, value);
    self
  }

  pub fn push_text(&mut self, name: impl Into<Cow<'a, str>>, value: impl Into<Cow<'a, str>>) {
    self.fields.push((name.into(), value.into()));
  }

  /// Add a file; it is sent as `File<n>` in the order added.
  pub fn push_file(
    &mut self,
    file_name: impl Into<Cow<'a, str>>,
    content_type: impl Into<Cow<'a, str>>,
    data: impl Into<Cow<'a, [u8]>>,
  ) {
    self.files.push(FilePart {
      file_name: file_name.into(),
      content_type: content_type.into(),
      data: data.into(),
    });
  }

  pub fn field_count(&self) -> usize {
    self.fields.len()
  }

  pub fn file_count(&self) -> usize {
    self.files.len()
  }

  /// Encode with a random boundary
  pub fn encode(&self) -> Result<EncodedForm, FogBugzError> {
    self.encode_with(random_boundary)
  }

  /// Encode, drawing candidate boundaries from `next_boundary` until one
  /// does not occur in any header value or payload.
  pub fn encode_with<F>(&self, mut next_boundary: F) -> Result<EncodedForm, FogBugzError>
  where
    F: FnMut() -> String,
  {
    let payloads: Vec<Cow<'_, [u8]>> = self
      .files
      .iter()
      .map(|file| match self.encoding {
        FileEncoding::Base64 => Cow::Owned(STANDARD.encode(&file.data).into_bytes()),
        FileEncoding::Binary => Cow::Borrowed(&file.data[..]),
      })
      .collect();

    let boundary = (0..MAX_BOUNDARY_ATTEMPTS)
      .map(|_| next_boundary())
      .find(|candidate| !self.collides(candidate, &payloads))
      .ok_or(FogBugzError::BoundaryCollision {
        attempts: MAX_BOUNDARY_ATTEMPTS,
      })?;

    let delimiter = format!("--{boundary}");
    let mut body = Vec::with_capacity(self.estimated_len(&payloads, delimiter.len()));

    for (name, value) in &self.fields {
      body.extend_from_slice(delimiter.as_bytes());
      body.extend_from_slice(CRLF);
      body.extend_from_slice(b"Content-Type: text/plain; charset=\"utf-8\"\r\n");
      body.extend_from_slice(format!("Content-Disposition: form-data; name=\"{}\"\r\n", header_safe(name)).as_bytes());
      body.extend_from_slice(CRLF);
      body.extend_from_slice(value.as_bytes());
      body.extend_from_slice(CRLF);
    }

    for (index, (file, payload)) in self.files.iter().zip(&payloads).enumerate() {
      body.extend_from_slice(delimiter.as_bytes());
      body.extend_from_slice(CRLF);
      body.extend_from_slice(
        format!(
          "Content-Disposition: form-data; name=\"File{}\"; filename=\"{}\"\r\n",
          index + 1,
          header_safe(&file.file_name)
        )
        .as_bytes(),
      );
      if self.encoding == FileEncoding::Base64 {
        body.extend_from_slice(b"Content-Transfer-Encoding: base64\r\n");
      }
      body.extend_from_slice(format!("Content-Type: {}\r\n", header_safe(&file.content_type)).as_bytes());
      body.extend_from_slice(CRLF);
      body.extend_from_slice(payload);
      body.extend_from_slice(CRLF);
    }

    body.extend_from_slice(delimiter.as_bytes());
    body.extend_from_slice(b"--");
    body.extend_from_slice(CRLF);

    Ok(EncodedForm { boundary, body })
  }

  fn collides(&self, boundary: &str, payloads: &[Cow<'_, [u8]>]) -> bool {
    let needle = boundary.as_bytes();
    if needle.is_empty() {
      return true;
    }

    self
      .fields
      .iter()
      .flat_map(|(name, value)| [name.as_bytes(), value.as_bytes()])
      .chain(
        self
          .files
          .iter()
          .flat_map(|file| [file.file_name.as_bytes(), file.content_type.as_bytes()]),
      )
      .chain(payloads.iter().map(|payload| &payload[..]))
      .any(|haystack| contains(haystack, needle))
  }

  fn estimated_len(&self, payloads: &[Cow<'_, [u8]>], delimiter_len: usize) -> usize {
    let fields: usize = self
      .fields
      .iter()
      .map(|(name, value)| delimiter_len + 100 + name.len() + value.len())
      .sum();
    let files: usize = payloads.iter().map(|payload| delimiter_len + 200 + payload.len()).sum();
    fields + files + delimiter_len + 4
  }
}

fn contains(haystack: &[u8], needle: &[u8]) -> bool {
  needle.len() <= haystack.len() && haystack.windows(needle.len()).any(|window| window == needle)
}

/// Keep quoted header parameters on one line and inside their quotes.
fn header_safe(value: &str) -> Cow<'_, str> {
  if value.contains(['"', '\r', '\n']) {
    Cow::Owned(value.replace('"', "%22").replace(['\r', '\n'], " "))
  } else {
    Cow::Borrowed(value)
  }
}

#[cfg(test)]
mod tests {
  use fogbugz_test_utils::decode_body;

  use super::*;

  fn fixed(boundary: &'static str) -> impl FnMut() -> String {
    move || boundary.to_string()
  }

  #[test]
  fn test_text_fields_layout() {
    let form = MultipartForm::new(FileEncoding::Base64)
      .text("cmd", "new")
      .text("sTitle", "Bug");

    let encoded = form.encode_with(fixed("BOUNDARY0123456789abcdefghijklmn")).unwrap();

    let expected = "--BOUNDARY0123456789abcdefghijklmn\r\n\
      Content-Type: text/plain; charset=\"utf-8\"\r\n\
      Content-Disposition: form-data; name=\"cmd\"\r\n\
      \r\n\
      new\r\n\
      --BOUNDARY0123456789abcdefghijklmn\r\n\
      Content-Type: text/plain; charset=\"utf-8\"\r\n\
      Content-Disposition: form-data; name=\"sTitle\"\r\n\
      \r\n\
      Bug\r\n\
      --BOUNDARY0123456789abcdefghijklmn--\r\n";
    assert_eq!(String::from_utf8(encoded.body().to_vec()).unwrap(), expected);
    assert_eq!(encoded.content_length(), expected.len());
    assert_eq!(
      encoded.content_type(),
      "multipart/form-data; boundary=BOUNDARY0123456789abcdefghijklmn"
    );
  }

  #[tokio::test]
  async fn test_text_fields_reparse() -> anyhow::Result<()> {
    let form = MultipartForm::new(FileEncoding::Base64)
      .text("cmd", "new")
      .text("sTitle", "Bug");
    let encoded = form.encode()?;

    let decoded = decode_body(&encoded.content_type(), encoded.body()).await?;

    assert_eq!(
      decoded.fields,
      vec![
        ("cmd".to_string(), "new".to_string()),
        ("sTitle".to_string(), "Bug".to_string())
      ]
    );
    assert!(decoded.files.is_empty());
    Ok(())
  }

  #[tokio::test]
  async fn test_utf8_values_survive() -> anyhow::Result<()> {
    let form = MultipartForm::new(FileEncoding::Base64).text("sEvent", "Überprüfung fehlgeschlagen ✓\r\nzweite Zeile");
    let encoded = form.encode()?;

    let decoded = decode_body(&encoded.content_type(), encoded.body()).await?;
    assert_eq!(
      decoded.get("sEvent"),
      Some("Überprüfung fehlgeschlagen ✓\r\nzweite Zeile")
    );
    Ok(())
  }

  #[tokio::test]
  async fn test_base64_file_parts() -> anyhow::Result<()> {
    let data = vec![0u8, 159, 146, 150, b'\r', b'\n', b'-', b'-'];
    let mut form = MultipartForm::new(FileEncoding::Base64).text("cmd", "edit");
    form.push_file("Spec.pdf", "application/pdf", data.as_slice());
    form.push_file("Image.png", "image/png", b"png".as_slice());
    let encoded = form.encode()?;

    let text = String::from_utf8_lossy(encoded.body());
    assert!(text.contains("Content-Disposition: form-data; name=\"File1\"; filename=\"Spec.pdf\"\r\n"));
    assert!(text.contains("Content-Disposition: form-data; name=\"File2\"; filename=\"Image.png\"\r\n"));
    assert_eq!(text.matches("Content-Transfer-Encoding: base64\r\n").count(), 2);

    let decoded = decode_body(&encoded.content_type(), encoded.body()).await?;
    assert_eq!(decoded.files.len(), 2);
    assert_eq!(decoded.files[0].name, "File1");
    assert_eq!(decoded.files[0].file_name, "Spec.pdf");
    assert_eq!(decoded.files[0].content_type.as_deref(), Some("application/pdf"));
    assert_eq!(STANDARD.decode(&decoded.files[0].data)?, data);
    assert_eq!(STANDARD.decode(&decoded.files[1].data)?, b"png");
    Ok(())
  }

  #[tokio::test]
  async fn test_binary_file_parts_have_no_transfer_encoding() -> anyhow::Result<()> {
    let data = vec![0u8, 1, 2, 255, 254];
    let mut form = MultipartForm::new(FileEncoding::Binary);
    form.push_file("blob.bin", "application/octet-stream", data.clone());
    let encoded = form.encode()?;

    assert!(!String::from_utf8_lossy(encoded.body()).contains("Content-Transfer-Encoding"));

    let decoded = decode_body(&encoded.content_type(), encoded.body()).await?;
    assert_eq!(decoded.files[0].data, data);
    Ok(())
  }

  #[test]
  fn test_colliding_boundary_is_redrawn() {
    let form = MultipartForm::new(FileEncoding::Base64).text("sEvent", "quoting --collidingboundary0123456789 here");

    let mut candidates = vec![
      "uniqueboundary0123456789abcdefgh".to_string(),
      "collidingboundary0123456789".to_string(),
    ];
    let encoded = form.encode_with(|| candidates.pop().unwrap_or_default()).unwrap();

    assert_eq!(encoded.boundary(), "uniqueboundary0123456789abcdefgh");
  }

  #[test]
  fn test_binary_payload_collision_is_detected() {
    let mut form = MultipartForm::new(FileEncoding::Binary);
    form.push_file("a.txt", "text/plain", b"xx--sameboundaryeverytime0123456789--".as_slice());

    let err = form.encode_with(fixed("sameboundaryeverytime0123456789")).unwrap_err();
    assert!(matches!(
      err,
      FogBugzError::BoundaryCollision {
        attempts: MAX_BOUNDARY_ATTEMPTS
      }
    ));
  }

  #[test]
  fn test_random_boundary_shape() {
    let first = random_boundary();
    let second = random_boundary();

    assert!(first.len() >= 30);
    assert!(first.chars().all(|c| c.is_ascii_alphanumeric()));
    assert_ne!(first, second);
  }

  #[test]
  fn test_file_name_quotes_are_escaped() {
    let mut form = MultipartForm::new(FileEncoding::Base64);
    form.push_file("say \"hi\"\r\n.txt", "text/plain", b"hi".as_slice());

    let encoded = form.encode().unwrap();
    let text = String::from_utf8_lossy(encoded.body());
    assert!(text.contains("filename=\"say %22hi%22  .txt\""));
  }
}
