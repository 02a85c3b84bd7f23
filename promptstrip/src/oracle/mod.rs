//! Oracle adapter: text completion and embedding behind one trait.
//!
//! The search engine treats both capabilities as pure but costly, networked,
//! potentially-failing functions. Implementations: [`OpenAiOracle`] (real API,
//! OpenRouter or OpenAI) and [`MockOracle`] (scripted, for tests).
//!
//! Neither call is retried here; a failed call is fatal for the analysis run
//! that issued it.

mod mock;
mod openai;

pub use mock::MockOracle;
pub use openai::{OpenAiOracle, DEFAULT_COMPLETION_MODEL, DEFAULT_EMBEDDING_MODEL};

use async_trait::async_trait;

use crate::error::AnalysisError;

/// Black-box text generator + embedder.
///
/// Both methods accept an optional per-call credential; when absent, the
/// implementation's process-default credential is used. Implementations must
/// be `Send + Sync` so one oracle can serve concurrent analysis runs.
///
/// **Interaction**: Driven by `StripeEngine` in a strict sequential loop.
#[async_trait]
pub trait Oracle: Send + Sync {
    /// Sends a prompt to the completion oracle and returns the generated text.
    /// An oracle that returns no content yields an empty string, not an error.
    async fn complete(
        &self,
        prompt: &str,
        credential: Option<&str>,
    ) -> Result<String, AnalysisError>;

    /// Returns the embedding vector for `text`.
    async fn embed(
        &self,
        text: &str,
        credential: Option<&str>,
    ) -> Result<Vec<f32>, AnalysisError>;
}
