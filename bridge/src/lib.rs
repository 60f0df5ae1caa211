mod config;
mod context;
mod dispatch;
mod error;
mod host;
mod resolve;
mod rule;

use std::path::PathBuf;
use std::sync::Arc;

use lazy_static::lazy_static;
use regex::Regex;
use tracing::{debug, info};

pub use config::{
    BuildOptions, ModuleOptions, OutputOptions, RawRule, ResolveOptions, RuleLoaderSpec,
    TestCondition,
};
pub use context::{ContextResolver, FileSystem, OsFs, TransformContext};
pub use error::BridgeError;
pub use host::{
    BuildMessage, LoadHandler, OnLoadArgs, OnLoadResult, OnResolveArgs, PluginBuild,
    ResolveHandler, ResolvedPath,
};
pub use resolve::{resolve_request, FsResolver, ResolveEngine};
pub use rule::Rule;

pub use runner::{ChainError, Content, Loader, LoaderSpec};

use crate::dispatch::{RuleLoadHandler, RuleResolveHandler};
use crate::rule::RuleCompiler;

lazy_static! {
    // Load hooks match every path routed to their namespace.
    static ref MATCH_ALL: Regex = Regex::new(".*").unwrap();
}

/// Bridges `{test, use}` transform rules onto a host bundler's two-phase
/// resolve/load plugin surface.
pub struct RulePlugin {
    rules: Vec<Arc<Rule>>,
    output_path: Option<PathBuf>,
    search_paths: Arc<Vec<PathBuf>>,
    engine: Arc<dyn ResolveEngine>,
    fs: Arc<dyn FileSystem>,
}

impl std::fmt::Debug for RulePlugin {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RulePlugin")
            .field("rules", &self.rules)
            .field("output_path", &self.output_path)
            .field("search_paths", &self.search_paths)
            .finish_non_exhaustive()
    }
}

impl RulePlugin {
    /// Validates the configuration and compiles every rule. Fails fast,
    /// before any file is touched.
    pub fn new(options: BuildOptions) -> Result<Self, BridgeError> {
        Self::with_engine(options, Arc::new(FsResolver))
    }

    /// Same as [`RulePlugin::new`] with a custom resolution engine.
    pub fn with_engine(
        options: BuildOptions,
        engine: Arc<dyn ResolveEngine>,
    ) -> Result<Self, BridgeError> {
        let BuildOptions {
            output,
            resolve,
            module,
        } = options;

        let mut compiler = RuleCompiler::new();
        let rules = module
            .rules
            .into_iter()
            .map(|raw| compiler.compile(raw).map(Arc::new))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            rules,
            output_path: output.map(|o| o.path),
            search_paths: Arc::new(resolve.map(|r| r.modules).unwrap_or_default()),
            engine,
            fs: Arc::new(OsFs),
        })
    }

    pub fn name(&self) -> &'static str {
        "rule-bridge"
    }

    pub fn rules(&self) -> impl Iterator<Item = &Rule> {
        self.rules.iter().map(Arc::as_ref)
    }

    /// Registers one resolve hook and one load hook per rule, in
    /// configuration order. Registration order is what gives earlier rules
    /// precedence when several patterns match the same request.
    pub fn setup(&self, build: &mut dyn PluginBuild) {
        info!("setup, {} rules found", self.rules.len());

        for rule in &self.rules {
            debug!("registering hooks for {}", rule.namespace);

            build.on_resolve(
                rule.test.clone(),
                Arc::new(RuleResolveHandler::new(
                    Arc::clone(rule),
                    Arc::clone(&self.engine),
                    Arc::clone(&self.search_paths),
                )),
            );

            build.on_load(
                MATCH_ALL.clone(),
                &rule.namespace,
                Arc::new(RuleLoadHandler::new(
                    Arc::clone(rule),
                    Arc::clone(&self.engine),
                    Arc::clone(&self.fs),
                    self.output_path.clone(),
                )),
            );
        }
    }
}
