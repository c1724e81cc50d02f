use std::path::{Path, PathBuf};

use crate::FlagMap;

use super::Transport;

/// Reads a snapshot of the endpoint's response from disk, for static
/// builds and local development.
#[derive(Clone, Debug)]
pub struct FileTransport {
    path: PathBuf,
}

impl FileTransport {
    pub(crate) fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Transport for FileTransport {
    type Error = FileTransportError;

    #[cfg_attr(feature = "tracing-instrument", tracing::instrument(skip_all, ret(level = tracing::Level::TRACE)))]
    async fn fetch_flags(&self) -> Result<FlagMap, Self::Error> {
        let buffer = tokio::fs::read(&self.path)
            .await
            .map_err(|e| FileTransportError::Read(self.path.clone(), e))?;

        Ok(serde_json::from_slice(&buffer)?)
    }
}

#[derive(thiserror::Error, Debug)]
pub enum FileTransportError {
    #[error("Failure reading the feature flag snapshot at '{0}': {1}")]
    Read(PathBuf, std::io::Error),

    #[error(transparent)]
    Serde(#[from] serde_json::Error),
}
