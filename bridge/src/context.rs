use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;
use serde_json::Value;
use tracing::debug;

use runner::ChainContext;

use crate::config::ResolveOptions;
use crate::error::BridgeError;
use crate::resolve::{resolve_request, ResolveEngine};

/// Read access to the filesystem for loaders that inspect files beyond the
/// resolved entry.
#[async_trait]
pub trait FileSystem: Send + Sync {
    async fn read(&self, path: &Path) -> std::io::Result<Vec<u8>>;
}

/// Default passthrough to the host filesystem.
#[derive(Debug, Default)]
pub struct OsFs;

#[async_trait]
impl FileSystem for OsFs {
    async fn read(&self, path: &Path) -> std::io::Result<Vec<u8>> {
        tokio::fs::read(path).await
    }
}

/// The capability object a legacy loader chain executes against.
///
/// Built fresh for every load invocation. A rule loaded concurrently for
/// many files gets one context per file, each carrying its own root path and
/// options slot; nothing request-scoped lives on the shared rule.
pub struct TransformContext {
    /// Absolute path of the file currently being loaded.
    pub root_context: PathBuf,
    /// Filesystem passthrough.
    pub fs: Arc<dyn FileSystem>,
    output_path: Option<PathBuf>,
    engine: Arc<dyn ResolveEngine>,
    current_options: Mutex<Option<Value>>,
}

impl TransformContext {
    pub(crate) fn new(
        root_context: PathBuf,
        output_path: Option<PathBuf>,
        engine: Arc<dyn ResolveEngine>,
        fs: Arc<dyn FileSystem>,
    ) -> Self {
        Self {
            root_context,
            fs,
            output_path,
            engine,
            current_options: Mutex::new(None),
        }
    }

    /// Returns a resolver scoped to the given options.
    ///
    /// The returned value performs a single async resolution; callers that
    /// need a callback-style entry point wrap it at their own boundary.
    pub fn get_resolve(&self, options: ResolveOptions) -> ContextResolver {
        ContextResolver {
            engine: Arc::clone(&self.engine),
            options,
        }
    }

    /// Options configured for the loader currently executing.
    pub fn get_options(&self) -> Option<Value> {
        self.current_options.lock().clone()
    }

    /// Writes a side-effect asset under the configured output directory,
    /// creating missing intermediate directories first.
    pub async fn emit_file(&self, name: &str, content: &[u8]) -> Result<(), BridgeError> {
        let Some(output) = &self.output_path else {
            return Err(BridgeError::Emission {
                name: name.to_string(),
                source: std::io::Error::other("no output directory configured"),
            });
        };

        let target = output.join(name);
        if let Some(parent) = target.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|source| BridgeError::Emission {
                    name: name.to_string(),
                    source,
                })?;
        }
        tokio::fs::write(&target, content)
            .await
            .map_err(|source| BridgeError::Emission {
                name: name.to_string(),
                source,
            })?;

        debug!("emitted {}", target.display());
        Ok(())
    }
}

impl ChainContext for TransformContext {
    fn set_current_options(&self, options: Option<Value>) {
        *self.current_options.lock() = options;
    }
}

/// Async resolver handed to loaders via [`TransformContext::get_resolve`].
pub struct ContextResolver {
    engine: Arc<dyn ResolveEngine>,
    options: ResolveOptions,
}

impl ContextResolver {
    pub async fn resolve(&self, base_dir: &Path, request: &str) -> Result<PathBuf, BridgeError> {
        resolve_request(
            self.engine.as_ref(),
            request,
            base_dir,
            &self.options.modules,
        )
        .await
    }
}
