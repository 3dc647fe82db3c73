//! `tokio::fs` variant of [`super::PartFile`] for offloaded disk writes.

use std::path::Path;
use tokio::io::AsyncWriteExt;

use super::PartPath;
use crate::error::FetchError;

/// Same lifecycle as `PartFile`, but every write is awaited on the runtime's
/// blocking pool instead of running on the event-loop thread.
#[derive(Debug)]
pub struct AsyncPartFile {
    path: PartPath,
    file: tokio::fs::File,
    bytes: u64,
}

impl AsyncPartFile {
    pub async fn create(final_path: &Path) -> Result<Self, FetchError> {
        let path = PartPath::reserve(final_path);
        let file = tokio::fs::File::create(path.temp())
            .await
            .map_err(|e| FetchError::filesystem(path.temp(), e))?;
        Ok(Self {
            path,
            file,
            bytes: 0,
        })
    }

    pub async fn write_chunk(&mut self, data: &[u8]) -> Result<(), FetchError> {
        self.file
            .write_all(data)
            .await
            .map_err(|e| FetchError::filesystem(self.path.temp(), e))?;
        self.bytes += data.len() as u64;
        Ok(())
    }

    pub async fn commit(self) -> Result<u64, FetchError> {
        let AsyncPartFile {
            mut path,
            mut file,
            bytes,
        } = self;
        file.flush()
            .await
            .map_err(|e| FetchError::filesystem(path.temp(), e))?;
        drop(file);
        path.rename_into_place_async().await?;
        Ok(bytes)
    }
}
