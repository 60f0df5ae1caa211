use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use tracing::debug;

use runner::run_loaders;

use crate::context::{FileSystem, TransformContext};
use crate::error::BridgeError;
use crate::host::{
    BuildMessage, LoadHandler, OnLoadArgs, OnLoadResult, OnResolveArgs, ResolveHandler,
    ResolvedPath,
};
use crate::resolve::{resolve_request, ResolveEngine};
use crate::rule::Rule;

/// Resolve-phase handler for one rule: re-resolves matching requests and
/// tags them with the rule's namespace.
pub(crate) struct RuleResolveHandler {
    rule: Arc<Rule>,
    engine: Arc<dyn ResolveEngine>,
    search_paths: Arc<Vec<PathBuf>>,
}

impl RuleResolveHandler {
    pub(crate) fn new(
        rule: Arc<Rule>,
        engine: Arc<dyn ResolveEngine>,
        search_paths: Arc<Vec<PathBuf>>,
    ) -> Self {
        Self {
            rule,
            engine,
            search_paths,
        }
    }
}

#[async_trait]
impl ResolveHandler for RuleResolveHandler {
    async fn resolve(&self, args: OnResolveArgs) -> Result<ResolvedPath, BridgeError> {
        debug!("resolving {} under {}", args.path, self.rule.namespace);

        let path = resolve_request(
            self.engine.as_ref(),
            &args.path,
            &args.resolve_dir,
            &self.search_paths,
        )
        .await?;

        Ok(ResolvedPath {
            path,
            namespace: self.rule.namespace.clone(),
        })
    }
}

/// Load-phase handler for one rule: runs the loader chain against the
/// resolved file and translates the outcome into the host's result shape.
pub(crate) struct RuleLoadHandler {
    rule: Arc<Rule>,
    engine: Arc<dyn ResolveEngine>,
    fs: Arc<dyn FileSystem>,
    output_path: Option<PathBuf>,
}

impl RuleLoadHandler {
    pub(crate) fn new(
        rule: Arc<Rule>,
        engine: Arc<dyn ResolveEngine>,
        fs: Arc<dyn FileSystem>,
        output_path: Option<PathBuf>,
    ) -> Self {
        Self {
            rule,
            engine,
            fs,
            output_path,
        }
    }
}

#[async_trait]
impl LoadHandler for RuleLoadHandler {
    async fn load(&self, args: OnLoadArgs) -> OnLoadResult {
        debug!(
            "running loaders for {} under {}",
            args.path.display(),
            self.rule.namespace
        );

        // One context per invocation; concurrent loads of the same rule must
        // not see each other's state.
        let ctx = TransformContext::new(
            args.path.clone(),
            self.output_path.clone(),
            Arc::clone(&self.engine),
            Arc::clone(&self.fs),
        );

        match run_loaders(&args.path, &self.rule.loaders, &ctx).await {
            Ok(outcome) => OnLoadResult {
                content: Some(outcome.content.into_bytes()),
                resolve_dir: args.path.parent().map(Path::to_path_buf),
                loader: self.rule.format.clone(),
                errors: Vec::new(),
            },
            Err(err) => {
                debug!("loader chain failed for {}: {err}", args.path.display());
                OnLoadResult::failure(BuildMessage {
                    text: err.to_string(),
                    detail: format!("{err:?}"),
                })
            }
        }
    }
}
