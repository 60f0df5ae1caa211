use std::fmt;
use std::path::Path;
use std::sync::Arc;

use serde_json::Value;
use tracing::debug;

use crate::{ChainError, Content, Loader};

/// One configured step of a chain: the loader implementation plus the
/// options payload it should see while it runs.
pub struct LoaderSpec<Ctx: Send + Sync> {
    pub loader: Arc<dyn Loader<Ctx>>,
    pub options: Option<Value>,
}

impl<Ctx: Send + Sync> LoaderSpec<Ctx> {
    pub fn new(loader: Arc<dyn Loader<Ctx>>) -> Self {
        Self {
            loader,
            options: None,
        }
    }

    pub fn with_options(loader: Arc<dyn Loader<Ctx>>, options: Value) -> Self {
        Self {
            loader,
            options: Some(options),
        }
    }

    pub fn name(&self) -> &str {
        self.loader.name()
    }
}

impl<Ctx: Send + Sync> Clone for LoaderSpec<Ctx> {
    fn clone(&self) -> Self {
        Self {
            loader: Arc::clone(&self.loader),
            options: self.options.clone(),
        }
    }
}

impl<Ctx: Send + Sync> fmt::Debug for LoaderSpec<Ctx> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoaderSpec")
            .field("loader", &self.name())
            .field("options", &self.options)
            .finish()
    }
}

/// Capability the runner needs from the execution context: between steps it
/// publishes the next loader's options so option accessors on the context
/// stay in sync with the step that is actually executing.
pub trait ChainContext: Send + Sync {
    fn set_current_options(&self, options: Option<Value>);
}

/// Final outcome of a chain run: the single primary content item.
#[derive(Debug)]
pub struct ChainOutcome {
    pub content: Content,
}

/// Runs a loader chain against a resource file.
///
/// The resource bytes are the chain's initial content. Loaders apply in
/// reverse declaration order (the last configured loader sees the raw file),
/// matching the chain contract legacy transform rules were written against.
pub async fn run_loaders<Ctx>(
    resource: &Path,
    chain: &[LoaderSpec<Ctx>],
    ctx: &Ctx,
) -> Result<ChainOutcome, ChainError>
where
    Ctx: ChainContext,
{
    let raw = tokio::fs::read(resource)
        .await
        .map_err(|source| ChainError::Io {
            path: resource.to_path_buf(),
            source,
        })?;

    let mut content = Content::Raw(raw);
    for spec in chain.iter().rev() {
        debug!("running loader {} on {}", spec.name(), resource.display());
        ctx.set_current_options(spec.options.clone());
        content = spec
            .loader
            .run(content, ctx)
            .await
            .map_err(|source| ChainError::Loader {
                loader: spec.name().to_string(),
                source,
            })?;
    }
    ctx.set_current_options(None);

    Ok(ChainOutcome { content })
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::{bail, Result};
    use async_trait::async_trait;
    use serde_json::json;
    use std::sync::Mutex;

    #[derive(Default)]
    struct TestContext {
        options_log: Mutex<Vec<Option<Value>>>,
    }

    impl ChainContext for TestContext {
        fn set_current_options(&self, options: Option<Value>) {
            self.options_log.lock().unwrap().push(options);
        }
    }

    struct TagLoader(&'static str);

    #[async_trait]
    impl Loader<TestContext> for TagLoader {
        fn name(&self) -> &str {
            self.0
        }

        async fn run(&self, content: Content, _ctx: &TestContext) -> Result<Content> {
            let text = content.try_into_string()?;
            Ok(Content::Text(format!("{text}+{}", self.0)))
        }
    }

    struct FailingLoader;

    #[async_trait]
    impl Loader<TestContext> for FailingLoader {
        fn name(&self) -> &str {
            "failing-loader"
        }

        async fn run(&self, _content: Content, _ctx: &TestContext) -> Result<Content> {
            bail!("boom")
        }
    }

    fn write_fixture(content: &str) -> (tempfile::TempDir, std::path::PathBuf) {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("input.txt");
        std::fs::write(&path, content).unwrap();
        (dir, path)
    }

    #[tokio::test]
    async fn chain_applies_loaders_last_to_first() {
        let (_dir, path) = write_fixture("base");
        let chain = vec![
            LoaderSpec::new(Arc::new(TagLoader("a")) as Arc<dyn Loader<TestContext>>),
            LoaderSpec::new(Arc::new(TagLoader("b"))),
        ];
        let ctx = TestContext::default();

        let outcome = run_loaders(&path, &chain, &ctx).await.unwrap();
        assert_eq!(outcome.content, Content::from("base+b+a"));
    }

    #[tokio::test]
    async fn empty_chain_returns_the_raw_bytes() {
        let (_dir, path) = write_fixture("untouched");
        let chain: Vec<LoaderSpec<TestContext>> = vec![];
        let ctx = TestContext::default();

        let outcome = run_loaders(&path, &chain, &ctx).await.unwrap();
        assert_eq!(outcome.content, Content::Raw(b"untouched".to_vec()));
    }

    #[tokio::test]
    async fn failing_loader_reports_its_own_message() {
        let (_dir, path) = write_fixture("base");
        let chain = vec![LoaderSpec::new(
            Arc::new(FailingLoader) as Arc<dyn Loader<TestContext>>
        )];
        let ctx = TestContext::default();

        let err = run_loaders(&path, &chain, &ctx).await.unwrap_err();
        assert_eq!(err.to_string(), "boom");
        assert_eq!(err.loader_name(), Some("failing-loader"));
    }

    #[tokio::test]
    async fn missing_resource_is_an_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let chain: Vec<LoaderSpec<TestContext>> = vec![];
        let ctx = TestContext::default();

        let err = run_loaders(&dir.path().join("nope.txt"), &chain, &ctx)
            .await
            .unwrap_err();
        assert!(matches!(err, ChainError::Io { .. }));
    }

    #[tokio::test]
    async fn options_follow_the_running_loader() {
        let (_dir, path) = write_fixture("base");
        let chain = vec![
            LoaderSpec::with_options(
                Arc::new(TagLoader("a")) as Arc<dyn Loader<TestContext>>,
                json!({"for": "a"}),
            ),
            LoaderSpec::with_options(Arc::new(TagLoader("b")), json!({"for": "b"})),
        ];
        let ctx = TestContext::default();

        run_loaders(&path, &chain, &ctx).await.unwrap();

        // Reverse declaration order, then the trailing reset.
        let log = ctx.options_log.lock().unwrap();
        assert_eq!(
            *log,
            vec![Some(json!({"for": "b"})), Some(json!({"for": "a"})), None]
        );
    }
}
