//! Destination directory and file lifecycle.
//!
//! Every download is written to a unique `.part` file next to its final
//! name and renamed into place only after the whole body arrived. Renames
//! are atomic, so two downloads with the same final name never interleave
//! bytes: the last one to finish wins with a complete file.

mod async_writer;
mod writer;

pub use async_writer::AsyncPartFile;
pub use writer::PartFile;

use anyhow::{Context, Result};
use std::io;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};

use crate::error::FetchError;
use crate::url_model;

/// Temporary file suffix used before atomic rename.
pub const TEMP_SUFFIX: &str = ".part";

static PART_SEQ: AtomicU64 = AtomicU64::new(0);

/// Path for a temp file unique to this process and call:
/// `pic.jpg` → `pic.jpg.<pid>-<seq>.part`.
pub fn temp_path(final_path: &Path) -> PathBuf {
    let seq = PART_SEQ.fetch_add(1, Ordering::Relaxed);
    let mut o = final_path.as_os_str().to_owned();
    o.push(format!(".{}-{}{}", std::process::id(), seq, TEMP_SUFFIX));
    PathBuf::from(o)
}

/// The directory all strategies write into.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Destination {
    dir: PathBuf,
}

impl Destination {
    /// Creates the directory (and parents) if missing. Called once per run,
    /// before any strategy starts; failure is fatal.
    pub fn create(dir: impl Into<PathBuf>) -> Result<Self> {
        let dir = dir.into();
        std::fs::create_dir_all(&dir)
            .with_context(|| format!("create destination directory {}", dir.display()))?;
        Ok(Self { dir })
    }

    /// Wraps a directory that must already exist (process workers). A
    /// missing directory is a per-URL filesystem failure, same as a failed
    /// temp file create in the in-process strategies.
    pub fn existing(dir: impl Into<PathBuf>) -> Result<Self, FetchError> {
        let dir = dir.into();
        if !dir.is_dir() {
            return Err(FetchError::filesystem(
                &dir,
                io::Error::new(io::ErrorKind::NotFound, "destination directory does not exist"),
            ));
        }
        Ok(Self { dir })
    }

    pub fn path(&self) -> &Path {
        &self.dir
    }

    /// Final path for `url`: `<dir>/<last segment>`.
    pub fn file_for(&self, url: &str) -> Result<PathBuf, FetchError> {
        let name = url_model::last_segment(url).ok_or_else(|| {
            FetchError::filesystem(
                &self.dir,
                io::Error::new(io::ErrorKind::InvalidInput, format!("no filename in URL {}", url)),
            )
        })?;
        Ok(self.dir.join(name))
    }
}

/// Owns a reserved temp path; removes the temp file on drop unless committed.
#[derive(Debug)]
pub(crate) struct PartPath {
    temp: PathBuf,
    final_path: PathBuf,
    committed: bool,
}

impl PartPath {
    pub(crate) fn reserve(final_path: &Path) -> Self {
        Self {
            temp: temp_path(final_path),
            final_path: final_path.to_path_buf(),
            committed: false,
        }
    }

    pub(crate) fn temp(&self) -> &Path {
        &self.temp
    }

    pub(crate) fn final_path(&self) -> &Path {
        &self.final_path
    }

    pub(crate) fn rename_into_place(&mut self) -> Result<(), FetchError> {
        std::fs::rename(&self.temp, &self.final_path)
            .map_err(|e| FetchError::filesystem(&self.final_path, e))?;
        self.committed = true;
        Ok(())
    }

    pub(crate) async fn rename_into_place_async(&mut self) -> Result<(), FetchError> {
        tokio::fs::rename(&self.temp, &self.final_path)
            .await
            .map_err(|e| FetchError::filesystem(&self.final_path, e))?;
        self.committed = true;
        Ok(())
    }
}

impl Drop for PartPath {
    fn drop(&mut self) {
        if !self.committed {
            let _ = std::fs::remove_file(&self.temp);
        }
    }
}
