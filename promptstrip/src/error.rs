//! Error taxonomy for prompt analysis.
//!
//! One enum covers the whole run: boundary validation, credential resolution,
//! oracle round-trips, and anything unexpected in between. An analysis that
//! fails returns an error and no report; there are no partial results.

use thiserror::Error;

/// Error returned by analysis entry points and oracle calls.
#[derive(Debug, Error)]
pub enum AnalysisError {
    /// The request failed boundary validation (e.g. empty prompt).
    #[error("invalid request: {0}")]
    Validation(String),

    /// No usable oracle credential could be resolved.
    #[error("no usable oracle credential: {0}")]
    Credential(String),

    /// A completion or embedding oracle call failed (network, provider, rate limit).
    /// Not retried here; retries, if wanted, belong in the oracle implementation.
    #[error("oracle call failed: {0}")]
    Oracle(String),

    /// Unexpected orchestration failure.
    #[error("internal error: {0}")]
    Internal(String),
}
