//! Sequential writer for one download's temp file.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use super::PartPath;
use crate::error::FetchError;

/// Buffered writer over a unique `.part` file. `commit` flushes and renames
/// it onto the final path; dropping it uncommitted deletes the temp file.
#[derive(Debug)]
pub struct PartFile {
    path: PartPath,
    file: BufWriter<File>,
    bytes: u64,
}

impl PartFile {
    /// Creates the temp file for `final_path`. The final file is untouched until `commit`.
    pub fn create(final_path: &Path) -> Result<Self, FetchError> {
        let path = PartPath::reserve(final_path);
        let file = File::options()
            .write(true)
            .create(true)
            .truncate(true)
            .open(path.temp())
            .map_err(|e| FetchError::filesystem(path.temp(), e))?;
        Ok(Self {
            path,
            file: BufWriter::new(file),
            bytes: 0,
        })
    }

    pub fn write_chunk(&mut self, data: &[u8]) -> Result<(), FetchError> {
        self.file
            .write_all(data)
            .map_err(|e| FetchError::filesystem(self.path.temp(), e))?;
        self.bytes += data.len() as u64;
        Ok(())
    }

    pub fn bytes(&self) -> u64 {
        self.bytes
    }

    /// Flushes, closes and renames into place (overwriting any existing file).
    /// Returns the number of bytes written.
    pub fn commit(self) -> Result<u64, FetchError> {
        let PartFile {
            mut path,
            file,
            bytes,
        } = self;
        let file = file
            .into_inner()
            .map_err(|e| FetchError::filesystem(path.temp(), e.into_error()))?;
        drop(file);
        path.rename_into_place()?;
        tracing::debug!(path = %path.final_path().display(), bytes, "file committed");
        Ok(bytes)
    }
}
