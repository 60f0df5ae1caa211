use std::path::PathBuf;

use regex::Regex;
use runner::LoaderSpec;

use crate::context::TransformContext;

/// Loader descriptors in this crate are bound to the transform context built
/// per load invocation.
pub type RuleLoaderSpec = LoaderSpec<TransformContext>;

/// Root build configuration. Constructed once per build, validated by
/// [`crate::RulePlugin::new`], immutable afterwards.
#[derive(Debug, Default)]
pub struct BuildOptions {
    pub output: Option<OutputOptions>,
    pub resolve: Option<ResolveOptions>,
    pub module: ModuleOptions,
}

#[derive(Debug, Clone)]
pub struct OutputOptions {
    /// Directory emitted assets are written under.
    pub path: PathBuf,
}

#[derive(Debug, Default, Clone)]
pub struct ResolveOptions {
    /// Search roots consulted for bare module specifiers.
    pub modules: Vec<PathBuf>,
}

#[derive(Debug, Default)]
pub struct ModuleOptions {
    pub rules: Vec<RawRule>,
}

/// Matcher form a rule was configured with.
///
/// Only patterns are supported. The literal form exists so configurations
/// carrying one fail with a clear error when the rule is compiled, instead of
/// misbehaving per request.
#[derive(Debug, Clone)]
pub enum TestCondition {
    Pattern(Regex),
    Literal(String),
}

impl TestCondition {
    pub fn pattern(pattern: &str) -> Result<Self, regex::Error> {
        Ok(TestCondition::Pattern(Regex::new(pattern)?))
    }
}

/// A rule as configured, before compilation.
///
/// `use_` and `loader` are alternative ways to declare the chain; `loader` is
/// shorthand for a single-step `use_`. Exactly one of the two must be set.
#[derive(Debug)]
pub struct RawRule {
    pub test: TestCondition,
    pub use_: Vec<RuleLoaderSpec>,
    pub loader: Option<RuleLoaderSpec>,
    /// Output-format tag passed through to the host's load result.
    pub format: Option<String>,
}

impl RawRule {
    pub fn with_chain(test: TestCondition, chain: Vec<RuleLoaderSpec>) -> Self {
        Self {
            test,
            use_: chain,
            loader: None,
            format: None,
        }
    }

    pub fn with_loader(test: TestCondition, loader: RuleLoaderSpec) -> Self {
        Self {
            test,
            use_: Vec::new(),
            loader: Some(loader),
            format: None,
        }
    }

    pub fn format(mut self, tag: impl Into<String>) -> Self {
        self.format = Some(tag.into());
        self
    }
}
