use std::path::PathBuf;
use std::sync::Arc;

use async_trait::async_trait;
use regex::Regex;

use crate::error::BridgeError;

/// Arguments the host passes to a resolve hook: the raw request string and
/// the absolute directory it was requested from.
#[derive(Debug, Clone)]
pub struct OnResolveArgs {
    pub path: String,
    pub resolve_dir: PathBuf,
}

/// Successful resolution: the absolute file path plus the namespace routing
/// the subsequent load back to the owning rule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedPath {
    pub path: PathBuf,
    pub namespace: String,
}

/// Arguments the host passes to a load hook.
#[derive(Debug, Clone)]
pub struct OnLoadArgs {
    pub path: PathBuf,
    pub namespace: String,
}

/// One per-file diagnostic in a load result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildMessage {
    pub text: String,
    pub detail: String,
}

/// What a load hook hands back to the host: either content plus the working
/// directory for any further relative resolution the host performs on it, or
/// per-file errors. Never both.
#[derive(Debug, Default)]
pub struct OnLoadResult {
    pub content: Option<Vec<u8>>,
    pub resolve_dir: Option<PathBuf>,
    /// Output-format tag telling the host how to interpret the content.
    pub loader: Option<String>,
    pub errors: Vec<BuildMessage>,
}

impl OnLoadResult {
    pub fn failure(message: BuildMessage) -> Self {
        Self {
            errors: vec![message],
            ..Default::default()
        }
    }
}

#[async_trait]
pub trait ResolveHandler: Send + Sync {
    async fn resolve(&self, args: OnResolveArgs) -> Result<ResolvedPath, BridgeError>;
}

#[async_trait]
pub trait LoadHandler: Send + Sync {
    async fn load(&self, args: OnLoadArgs) -> OnLoadResult;
}

/// Registration surface of the host bundler's plugin mechanism.
///
/// Hooks are consulted in registration order: the first resolve hook whose
/// filter matches a request wins, and a load hook only sees paths tagged
/// with its namespace.
pub trait PluginBuild {
    fn on_resolve(&mut self, filter: Regex, handler: Arc<dyn ResolveHandler>);

    fn on_load(&mut self, filter: Regex, namespace: &str, handler: Arc<dyn LoadHandler>);
}
