mod chain;
mod content;
mod error;

use anyhow::Result;
use async_trait::async_trait;

pub use chain::{run_loaders, ChainContext, ChainOutcome, LoaderSpec};
pub use content::Content;
pub use error::ChainError;

/// A single transform step in a loader chain.
///
/// A loader receives the previous step's content together with the execution
/// context the embedder built for this invocation, and produces the content
/// handed to the next step.
#[async_trait]
pub trait Loader<Ctx: Send + Sync>: Send + Sync {
    fn name(&self) -> &str;

    async fn run(&self, content: Content, ctx: &Ctx) -> Result<Content>;
}
