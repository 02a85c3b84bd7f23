//! Redundancy search engine: decide which prompt components are causally
//! necessary for the oracle's output and which are over-engineered additions.
//!
//! Exhaustive subset search is exponential and every trial costs a completion
//! plus an embedding round-trip, so the engine runs a bounded three-phase
//! greedy search (roughly `2N + recovery` round-trips for `N` components):
//!
//! 1. **Reverse sequential cumulative removal** — probe each component from
//!    last to first against the prompt as already pruned; auxiliary and
//!    formatting instructions cluster at the end, so pruning compounds.
//! 2. **Whole-prompt validation** — one probe of the pruned prompt catches
//!    compounding drift that single-removal tests missed.
//! 3. **Greedy recovery** — when validation fails, restore removed components
//!    earliest-first (core task instructions cluster at the start), stopping
//!    as soon as the whole prompt validates again.
//!
//! Calls within one analysis are strictly sequential: each phase-1 probe
//! depends on the active set left by the previous one. Any oracle failure
//! aborts the run; there are no partial reports.
//!
//! **Interaction**: Drives an injected [`Oracle`], [`parse_components`],
//! [`build_execution_task`], and [`cosine_similarity`].

use std::collections::BTreeSet;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::AnalysisError;
use crate::oracle::Oracle;
use crate::parser::{parse_components, Component};
use crate::prompts::build_execution_task;
use crate::similarity::cosine_similarity;

/// Final output of one analysis run. Constructed once, never mutated.
///
/// Field names are the external contract of the analysis API.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisReport {
    /// `removed / total`, rounded to 2 decimals; higher means more redundancy.
    pub over_engineered_score: f64,
    /// Kept components joined by single spaces, or the original prompt
    /// verbatim when nothing was kept.
    pub improved_prompt: String,
    /// Redundant component texts, in original parse order.
    pub components_removed: Vec<String>,
    /// Essential component texts, in original parse order.
    pub components_kept: Vec<String>,
    /// Number of components parsed from the prompt.
    pub total_components: usize,
}

impl AnalysisReport {
    fn assemble(
        score: f64,
        improved_prompt: String,
        components_removed: Vec<String>,
        components_kept: Vec<String>,
        total_components: usize,
    ) -> Self {
        Self {
            over_engineered_score: round2(score),
            improved_prompt,
            components_removed,
            components_kept,
            total_components,
        }
    }

    /// Report for a prompt with no parseable components: zero score, the
    /// original prompt unchanged, no oracle calls made.
    fn zero(prompt: &str) -> Self {
        Self::assemble(0.0, prompt.to_string(), Vec::new(), Vec::new(), 0)
    }
}

/// Rounds to 2 decimals with ties to even, so exact midpoints like 0.125
/// do not drift upward.
fn round2(value: f64) -> f64 {
    let scaled = value * 100.0;
    let rounded = if scaled.fract() == 0.5 {
        let floor = scaled.floor();
        if floor % 2.0 == 0.0 {
            floor
        } else {
            floor + 1.0
        }
    } else {
        scaled.round()
    };
    rounded / 100.0
}

/// Validated analysis input: a non-empty prompt plus optional user input and
/// per-call credential. Blank user input or credential is normalized to absent.
#[derive(Debug, Clone)]
pub struct AnalyzeRequest {
    prompt: String,
    user_input: Option<String>,
    credential: Option<String>,
}

impl AnalyzeRequest {
    /// Builds a request, rejecting an empty or whitespace-only prompt.
    pub fn new(prompt: impl Into<String>) -> Result<Self, AnalysisError> {
        let prompt = prompt.into();
        if prompt.trim().is_empty() {
            return Err(AnalysisError::Validation(
                "prompt must not be empty".to_string(),
            ));
        }
        Ok(Self {
            prompt,
            user_input: None,
            credential: None,
        })
    }

    /// Sample input the prompt should respond to (e.g. a user message).
    pub fn with_user_input(mut self, user_input: impl Into<String>) -> Self {
        let user_input = user_input.into();
        self.user_input = (!user_input.trim().is_empty()).then_some(user_input);
        self
    }

    /// Per-call oracle credential; blank strings are treated as absent.
    pub fn with_credential(mut self, credential: impl Into<String>) -> Self {
        let credential = credential.into().trim().to_string();
        self.credential = (!credential.is_empty()).then_some(credential);
        self
    }

    pub fn prompt(&self) -> &str {
        &self.prompt
    }

    pub fn user_input(&self) -> Option<&str> {
        self.user_input.as_deref()
    }

    pub fn credential(&self) -> Option<&str> {
        self.credential.as_deref()
    }
}

/// The component-pruning engine ("stripe" search).
///
/// Holds an injected oracle and an optional explicit similarity threshold;
/// without one, the `SIMILARITY_THRESHOLD` env value (default 0.92) is used.
/// Stateless across runs: each call to [`StripeEngine::analyze`] is
/// independent and safe to run concurrently with others.
pub struct StripeEngine {
    oracle: Arc<dyn Oracle>,
    threshold: Option<f32>,
}

impl StripeEngine {
    pub fn new(oracle: Arc<dyn Oracle>) -> Self {
        Self {
            oracle,
            threshold: None,
        }
    }

    /// Fixes the similarity threshold for this engine, clamped to `[0, 1]`.
    pub fn with_threshold(mut self, threshold: f32) -> Self {
        self.threshold = Some(env_config::clamp_threshold(threshold));
        self
    }

    fn resolve_threshold(&self) -> f32 {
        self.threshold
            .unwrap_or_else(env_config::similarity_threshold)
    }

    /// Renders the active set back to prompt text, always in original index
    /// order regardless of removal or restoration order.
    fn render_active(components: &[Component], active: &BTreeSet<usize>) -> String {
        active
            .iter()
            .map(|&i| components[i].text.as_str())
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// One probe: wrap the candidate in the execution task, ask the completion
    /// oracle for a sample response, and embed that response.
    async fn sample_embedding(
        &self,
        candidate: &str,
        user_input: Option<&str>,
        credential: Option<&str>,
    ) -> Result<Vec<f32>, AnalysisError> {
        let task = build_execution_task(candidate, user_input);
        let output = self.oracle.complete(&task, credential).await?;
        self.oracle.embed(&output, credential).await
    }

    /// Analyzes a validated request. See [`StripeEngine::analyze`].
    pub async fn analyze_request(
        &self,
        request: &AnalyzeRequest,
    ) -> Result<AnalysisReport, AnalysisError> {
        self.analyze(request.prompt(), request.user_input(), request.credential())
            .await
    }

    /// Runs the full three-phase analysis of `prompt`.
    ///
    /// A prompt that parses to zero components returns a zero-score report
    /// without touching the oracle. Any oracle failure aborts the run.
    pub async fn analyze(
        &self,
        prompt: &str,
        user_input: Option<&str>,
        credential: Option<&str>,
    ) -> Result<AnalysisReport, AnalysisError> {
        let credential = credential.map(str::trim).filter(|c| !c.is_empty());

        let components = parse_components(prompt);
        let total = components.len();
        if total == 0 {
            return Ok(AnalysisReport::zero(prompt));
        }

        let threshold = self.resolve_threshold();
        debug!(total_components = total, threshold, "analysis start");

        // Baseline: the full, unmodified prompt through the same pipeline as
        // every candidate. Fixed for the rest of the run.
        let baseline = self
            .sample_embedding(prompt, user_input, credential)
            .await?;

        // Phase 1: reverse sequential cumulative removal. The active set is
        // external to the fixed iteration range; each accepted removal changes
        // the candidate for the next (earlier) index under test.
        let mut active: BTreeSet<usize> = (0..total).collect();
        for i in (0..total).rev() {
            let mut candidate = active.clone();
            candidate.remove(&i);

            // Removing the only remaining component leaves nothing to probe;
            // similarity is defined as 0.0 without an oracle call.
            let similarity = if candidate.is_empty() {
                0.0
            } else {
                let rendered = Self::render_active(&components, &candidate);
                let embedding = self
                    .sample_embedding(&rendered, user_input, credential)
                    .await?;
                cosine_similarity(&baseline, &embedding)
            };

            // Inclusive comparison: exactly-at-threshold counts as redundant.
            if similarity >= threshold {
                active.remove(&i);
                debug!(component = i, similarity, "phase 1: removed");
            } else {
                debug!(component = i, similarity, "phase 1: kept");
            }
        }

        // Phase 2: validate the pruned prompt as a whole. Individually
        // redundant-looking removals can combine into meaningful drift.
        let improved = if active.is_empty() {
            prompt.to_string()
        } else {
            Self::render_active(&components, &active)
        };
        let embedding = self
            .sample_embedding(&improved, user_input, credential)
            .await?;
        let mut validation = cosine_similarity(&baseline, &embedding);
        debug!(
            similarity = validation,
            kept = active.len(),
            removed = total - active.len(),
            "phase 2: whole-prompt validation"
        );

        // Phase 3: greedy recovery, earliest removed component first.
        if validation < threshold && active.len() < total {
            for i in 0..total {
                if active.contains(&i) {
                    continue;
                }
                active.insert(i);
                let rendered = Self::render_active(&components, &active);
                let embedding = self
                    .sample_embedding(&rendered, user_input, credential)
                    .await?;
                validation = cosine_similarity(&baseline, &embedding);
                debug!(restored = i, similarity = validation, "phase 3: restored");
                if validation >= threshold {
                    break;
                }
            }
        }

        let components_kept: Vec<String> = components
            .iter()
            .filter(|c| active.contains(&c.index))
            .map(|c| c.text.clone())
            .collect();
        let components_removed: Vec<String> = components
            .iter()
            .filter(|c| !active.contains(&c.index))
            .map(|c| c.text.clone())
            .collect();

        let improved_prompt = if components_kept.is_empty() {
            prompt.to_string()
        } else {
            components_kept.join(" ")
        };
        let score = components_removed.len() as f64 / total as f64;
        debug!(
            removed = components_removed.len(),
            kept = components_kept.len(),
            "analysis complete"
        );

        Ok(AnalysisReport::assemble(
            score,
            improved_prompt,
            components_removed,
            components_kept,
            total,
        ))
    }
}
