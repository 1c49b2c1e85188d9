//! # Attachments
//!
//! Parses the `attachments` column and loads the referenced files from the
//! media directory next to the tickets file.
//!
//! The column lists alternating display names and on-disk names separated by
//! `;`, e.g. `Spec.pdf;spec_v2.pdf;Image.png;img1.png`.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use thiserror::Error;
use tracing::debug;

use crate::mime::content_type_for;

/// Separator between descriptor tokens
pub const DESCRIPTOR_SEPARATOR: char = ';';

/// Errors raised while parsing or loading attachments
#[derive(Debug, Error)]
pub enum AttachmentError {
  #[error("attachment list has {count} entries; expected display name / file name pairs")]
  OddTokenCount { count: usize },
  #[error("attachment '{display_name}' has no file name in '{token}'")]
  EmptyFileName { display_name: String, token: String },
  #[error("attachment file not found: {}", path.display())]
  Missing { path: PathBuf },
}

/// A (display name, on-disk name) pair from the `attachments` column
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttachmentDescriptor {
  pub display_name: String,
  /// File name component only; directories in the source token are dropped.
  pub file_name: String,
}

impl AttachmentDescriptor {
  /// Content type from the display name's extension, falling back to the
  /// on-disk name.
  pub fn content_type(&self) -> &'static str {
    content_type_for(&self.display_name)
      .or_else(|| content_type_for(&self.file_name))
      .unwrap_or(crate::mime::DEFAULT_CONTENT_TYPE)
  }
}

/// An attachment ready to upload
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttachmentFile {
  pub display_name: String,
  pub content_type: &'static str,
  pub data: Vec<u8>,
}

/// Split a descriptor string into pairs. Empty tokens are discarded before
/// pairing; a dangling display name is an error.
pub fn parse_descriptors(raw: &str) -> Result<Vec<AttachmentDescriptor>, AttachmentError> {
  let tokens: Vec<&str> = raw
    .split(DESCRIPTOR_SEPARATOR)
    .map(str::trim)
    .filter(|token| !token.is_empty())
    .collect();

  if tokens.len() % 2 != 0 {
    return Err(AttachmentError::OddTokenCount { count: tokens.len() });
  }

  tokens
    .chunks_exact(2)
    .map(|pair| {
      let (display_name, token) = (pair[0], pair[1]);
      let file_name = file_name_component(token);
      if file_name.is_empty() {
        return Err(AttachmentError::EmptyFileName {
          display_name: display_name.to_string(),
          token: token.to_string(),
        });
      }
      Ok(AttachmentDescriptor {
        display_name: display_name.to_string(),
        file_name: file_name.to_string(),
      })
    })
    .collect()
}

/// Last path component, treating both `/` and `\` as separators so exports
/// made on Windows resolve the same way everywhere.
fn file_name_component(token: &str) -> &str {
  token.rsplit(['/', '\\']).next().unwrap_or(token).trim()
}

/// Read every descriptor's file from `media_dir`, in order.
pub async fn load_attachments(media_dir: &Path, descriptors: &[AttachmentDescriptor]) -> Result<Vec<AttachmentFile>> {
  let mut files = Vec::with_capacity(descriptors.len());
  for descriptor in descriptors {
    let path = media_dir.join(&descriptor.file_name);
    let data = match tokio::fs::read(&path).await {
      Ok(data) => data,
      Err(e) if e.kind() == ErrorKind::NotFound => {
        return Err(AttachmentError::Missing { path }.into());
      }
      Err(e) => {
        return Err(e).with_context(|| format!("Failed to read attachment {}", path.display()));
      }
    };

    debug!(
      "Loaded attachment '{}' from {} ({} bytes)",
      descriptor.display_name,
      path.display(),
      data.len()
    );
    files.push(AttachmentFile {
      display_name: descriptor.display_name.clone(),
      content_type: descriptor.content_type(),
      data,
    });
  }
  Ok(files)
}
