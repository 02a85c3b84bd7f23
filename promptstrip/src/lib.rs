//! # promptstrip
//!
//! Analyze an instruction prompt for over-engineering: which of its component
//! sentences, clauses, and list items are causally necessary for the output a
//! model produces, and which are redundant additions.
//!
//! The analysis is a black-box search. A text-completion oracle and an
//! embedding oracle are probed with variations of the prompt; embedding-space
//! cosine similarity against the full prompt's baseline output decides which
//! components can be removed without materially changing behavior. The search
//! is greedy and bounded (roughly two oracle round-trips per component plus a
//! small recovery overhead), not an exhaustive subset search.
//!
//! ## Main modules
//!
//! - [`parser`]: [`parse_components`] — split a prompt into ordered [`Component`]s.
//! - [`oracle`]: [`Oracle`] trait, [`OpenAiOracle`] (OpenRouter/OpenAI), [`MockOracle`].
//! - [`similarity`]: [`cosine_similarity`] between embedding vectors.
//! - [`prompts`]: the execution-task wrapper applied before every completion call.
//! - [`engine`]: [`StripeEngine`] — the three-phase redundancy search;
//!   [`AnalysisReport`], [`AnalyzeRequest`].
//! - [`error`]: [`AnalysisError`] taxonomy (validation / credential / oracle / internal).
//!
//! ## Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use promptstrip::{OpenAiOracle, StripeEngine};
//!
//! # async fn run() -> Result<(), promptstrip::AnalysisError> {
//! let engine = StripeEngine::new(Arc::new(OpenAiOracle::new()));
//! let report = engine
//!     .analyze("Be concise. Always use bullet points.", None, None)
//!     .await?;
//! println!("redundancy score: {}", report.over_engineered_score);
//! # Ok(())
//! # }
//! ```
//!
//! Configuration is environment-driven (`SIMILARITY_THRESHOLD`,
//! `OPENROUTER_API_KEY` / `OPENAI_API_KEY`); use the workspace `config` crate's
//! `load_and_apply` to fill the environment from `.env` / XDG config first.

pub mod engine;
pub mod error;
pub mod oracle;
pub mod parser;
pub mod prompts;
pub mod similarity;

pub use engine::{AnalysisReport, AnalyzeRequest, StripeEngine};
pub use error::AnalysisError;
pub use oracle::{MockOracle, OpenAiOracle, Oracle};
pub use parser::{parse_components, Component};
pub use prompts::build_execution_task;
pub use similarity::cosine_similarity;
