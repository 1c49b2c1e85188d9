//! Temporary import directories
//!
//! Lays out a tickets file with its sibling `media/` directory the way the
//! importer expects to find them.

use std::fs;
use std::path::{Path, PathBuf};

use tempfile::TempDir;

/// A temporary directory holding tickets files and their media directory
pub struct ImportDirGuard {
  pub temp_dir: TempDir,
}

impl ImportDirGuard {
  pub const MEDIA_DIR: &'static str = "media";

  /// Create an empty import directory with a `media/` subdirectory
  pub fn new() -> anyhow::Result<Self> {
    let temp_dir = TempDir::new()?;
    fs::create_dir_all(temp_dir.path().join(Self::MEDIA_DIR))?;
    Ok(Self { temp_dir })
  }

  pub fn path(&self) -> &Path {
    self.temp_dir.path()
  }

  pub fn media_dir(&self) -> PathBuf {
    self.temp_dir.path().join(Self::MEDIA_DIR)
  }

  /// Write a tickets CSV and return its path
  pub fn write_tickets(&self, name: &str, csv: &str) -> anyhow::Result<PathBuf> {
    let path = self.temp_dir.path().join(name);
    fs::write(&path, csv)?;
    Ok(path)
  }

  /// Write an attachment into the media directory and return its path
  pub fn write_media(&self, name: &str, data: &[u8]) -> anyhow::Result<PathBuf> {
    let path = self.media_dir().join(name);
    fs::write(&path, data)?;
    Ok(path)
  }
}
