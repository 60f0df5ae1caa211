use std::path::PathBuf;

use thiserror::Error;

/// Failure raised while executing a loader chain.
#[derive(Error, Debug)]
pub enum ChainError {
    /// The resource could not be read before the first loader ran.
    #[error("Cannot read '{}': {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A loader in the chain failed. Displays as the underlying message so
    /// embedders report the loader's own words per file.
    #[error("{source}")]
    Loader { loader: String, source: anyhow::Error },
}

impl ChainError {
    /// Name of the loader that failed, if the failure came from one.
    pub fn loader_name(&self) -> Option<&str> {
        match self {
            ChainError::Loader { loader, .. } => Some(loader),
            ChainError::Io { .. } => None,
        }
    }
}
