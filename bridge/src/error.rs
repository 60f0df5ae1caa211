use std::path::PathBuf;

use thiserror::Error;

/// Failures raised by the bridge itself.
///
/// Loader-chain failures surface separately through [`runner::ChainError`]
/// and are converted into per-file load results at the load hook boundary
/// rather than returned through this type.
#[derive(Error, Debug)]
pub enum BridgeError {
    /// Malformed configuration. Raised at plugin construction, before any
    /// file is processed.
    #[error("Invalid configuration: {0}")]
    Config(String),

    /// The request relies on a feature the bridge does not support, such as
    /// an inline loader override.
    #[error("Unsupported: {0}")]
    Unsupported(String),

    /// The request could not be resolved under the configured strategy.
    #[error("Cannot resolve '{request}' from '{}'", .dir.display())]
    Resolution { request: String, dir: PathBuf },

    /// Writing an emitted asset failed.
    #[error("Cannot emit '{name}': {source}")]
    Emission {
        name: String,
        #[source]
        source: std::io::Error,
    },
}
