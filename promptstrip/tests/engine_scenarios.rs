//! Scenario tests for the three-phase redundancy search.
//!
//! The mock oracle scripts embeddings in call order; the engine's probe order
//! is deterministic (baseline, then phase 1 last-to-first, then the phase-2
//! validation, then any phase-3 restorations), so each script line corresponds
//! to exactly one probe. Similarity vectors: `HI` scores 1.0 against the
//! baseline, `LO` scores 0.0.


use std::sync::Arc;

use async_trait::async_trait;
use promptstrip::{AnalysisError, AnalyzeRequest, MockOracle, Oracle, StripeEngine};

const HI: [f32; 2] = [1.0, 0.0];
const LO: [f32; 2] = [0.0, 1.0];

fn hi() -> Vec<f32> {
    HI.to_vec()
}

fn lo() -> Vec<f32> {
    LO.to_vec()
}

/// Embedding that scores ~0.93 against the baseline `HI`.
fn near_threshold() -> Vec<f32> {
    vec![0.93, (1.0f32 - 0.93 * 0.93).sqrt()]
}

/// Scenario: one trailing component is redundant, the other is essential.
/// Reverse order tests the trailing component first.
#[tokio::test]
async fn removes_redundant_component_keeps_essential() {
    // baseline, probe without "Always use bullet points." (essential),
    // probe without "Be concise." (redundant), phase-2 validation.
    let oracle = Arc::new(MockOracle::scripted(vec![hi(), lo(), hi(), hi()]));
    let engine = StripeEngine::new(oracle.clone()).with_threshold(0.92);

    let report = engine
        .analyze("Be concise. Always use bullet points.", None, None)
        .await
        .unwrap();

    assert_eq!(report.components_removed, vec!["Be concise."]);
    assert_eq!(report.components_kept, vec!["Always use bullet points."]);
    assert_eq!(report.over_engineered_score, 0.5);
    assert_eq!(report.improved_prompt, "Always use bullet points.");
    assert_eq!(report.total_components, 2);
    assert_eq!(oracle.embedding_calls(), 4);
    assert_eq!(oracle.completion_calls(), 4);

    // The first phase-1 probe renders the candidate without the last component.
    let prompts = oracle.seen_prompts();
    assert!(prompts[1].contains("Be concise."));
    assert!(!prompts[1].contains("Always use bullet points."));
}

/// Scenario: cumulative pruning overshoots. D alone is redundant, but B and C
/// also look redundant in the shrinking phase-1 context; whole-prompt
/// validation fails and greedy recovery restores B, then C, in original order,
/// leaving only D removed.
#[tokio::test]
async fn recovery_restores_overpruned_components_front_first() {
    let oracle = Arc::new(MockOracle::scripted(vec![
        hi(), // baseline "A. B. C. D."
        hi(), // phase 1, i=3: "A. B. C." -> remove D
        hi(), // phase 1, i=2: "A. B."    -> remove C
        hi(), // phase 1, i=1: "A."       -> remove B
        // phase 1, i=0: candidate empty, no call, A kept
        lo(), // phase 2: "A." drifted
        lo(), // phase 3: restore B, "A. B." still drifted
        hi(), // phase 3: restore C, "A. B. C." validates; D stays removed
    ]));
    let engine = StripeEngine::new(oracle.clone()).with_threshold(0.92);

    let report = engine.analyze("A. B. C. D.", None, None).await.unwrap();

    assert_eq!(report.components_removed, vec!["D."]);
    assert_eq!(report.components_kept, vec!["A.", "B.", "C."]);
    assert_eq!(report.over_engineered_score, 0.25);
    assert_eq!(report.improved_prompt, "A. B. C.");
    assert_eq!(report.total_components, 4);
    assert_eq!(oracle.embedding_calls(), 7);

    // Recovery probes grow front-first: "A. B." before "A. B. C.".
    let prompts = oracle.seen_prompts();
    assert!(prompts[5].contains("A. B."));
    assert!(!prompts[5].contains("C."));
    assert!(prompts[6].contains("A. B. C."));
}

/// Scenario: similarity ~0.93 is redundant under the default-style threshold
/// 0.92 but essential under an overridden threshold 0.95.
#[tokio::test]
async fn threshold_override_flips_classification() {
    let oracle = Arc::new(
        MockOracle::scripted(vec![hi()]).with_fallback_embedding(near_threshold()),
    );
    let engine = StripeEngine::new(oracle).with_threshold(0.92);
    let report = engine.analyze("First. Second.", None, None).await.unwrap();
    assert_eq!(report.components_removed, vec!["Second."]);
    assert_eq!(report.components_kept, vec!["First."]);
    assert_eq!(report.over_engineered_score, 0.5);

    let oracle = Arc::new(
        MockOracle::scripted(vec![hi()]).with_fallback_embedding(near_threshold()),
    );
    let engine = StripeEngine::new(oracle).with_threshold(0.95);
    let report = engine.analyze("First. Second.", None, None).await.unwrap();
    assert!(report.components_removed.is_empty());
    assert_eq!(report.components_kept, vec!["First.", "Second."]);
    assert_eq!(report.over_engineered_score, 0.0);
    assert_eq!(report.improved_prompt, "First. Second.");
}

/// Scenario: one of three components is redundant; the score rounds to 0.33.
#[tokio::test]
async fn score_rounds_to_two_decimals() {
    let oracle = Arc::new(MockOracle::scripted(vec![
        hi(), // baseline
        hi(), // i=2: "Third." removed
        lo(), // i=1: kept
        lo(), // i=0: kept
        hi(), // phase 2
    ]));
    let engine = StripeEngine::new(oracle).with_threshold(0.92);

    let report = engine
        .analyze("First. Second. Third.", None, None)
        .await
        .unwrap();

    assert_eq!(report.over_engineered_score, 0.33);
    assert_eq!(report.total_components, 3);
    assert_eq!(
        report.components_kept.len() + report.components_removed.len(),
        report.total_components
    );
}

/// Scenario: empty and whitespace-only prompts produce a zero report with no
/// oracle calls.
#[tokio::test]
async fn empty_prompt_is_zero_report_without_calls() {
    let oracle = Arc::new(MockOracle::fixed(hi()));
    let engine = StripeEngine::new(oracle.clone()).with_threshold(0.92);

    let report = engine.analyze("", None, None).await.unwrap();
    assert_eq!(report.over_engineered_score, 0.0);
    assert_eq!(report.improved_prompt, "");
    assert!(report.components_removed.is_empty());
    assert!(report.components_kept.is_empty());
    assert_eq!(report.total_components, 0);

    let report = engine.analyze("   \n\n  ", None, None).await.unwrap();
    assert_eq!(report.total_components, 0);
    assert_eq!(report.improved_prompt, "   \n\n  ");

    assert_eq!(oracle.completion_calls(), 0);
    assert_eq!(oracle.embedding_calls(), 0);
}

/// Scenario: with a threshold clamped to 0.0 everything is removable,
/// including the final component through the defined empty-candidate edge;
/// the improved prompt falls back to the original verbatim.
#[tokio::test]
async fn empty_kept_set_falls_back_to_original_prompt() {
    let oracle = Arc::new(MockOracle::fixed(hi()));
    let engine = StripeEngine::new(oracle.clone()).with_threshold(0.0);

    let report = engine.analyze("Alpha. Beta.", None, None).await.unwrap();

    assert!(report.components_kept.is_empty());
    assert_eq!(report.components_removed, vec!["Alpha.", "Beta."]);
    assert_eq!(report.over_engineered_score, 1.0);
    assert_eq!(report.improved_prompt, "Alpha. Beta.");
    // baseline + one real phase-1 probe + phase-2 validation; the
    // empty-candidate test made no call.
    assert_eq!(oracle.embedding_calls(), 3);
}

/// Scenario: a single component survives the empty-candidate edge (similarity
/// defined 0.0, below any sane threshold) and is kept.
#[tokio::test]
async fn single_component_is_never_removed_under_sane_threshold() {
    let oracle = Arc::new(MockOracle::fixed(hi()));
    let engine = StripeEngine::new(oracle.clone()).with_threshold(0.92);

    let report = engine
        .analyze("no punctuation here", None, None)
        .await
        .unwrap();

    assert_eq!(report.components_kept, vec!["no punctuation here"]);
    assert!(report.components_removed.is_empty());
    assert_eq!(report.over_engineered_score, 0.0);
    assert_eq!(report.improved_prompt, "no punctuation here");
    // baseline + phase-2 validation only.
    assert_eq!(oracle.embedding_calls(), 2);
}

/// Scenario: user input is wrapped into every probe, baseline and candidates.
#[tokio::test]
async fn user_input_flows_into_every_probe() {
    let oracle = Arc::new(MockOracle::fixed(hi()));
    let engine = StripeEngine::new(oracle.clone()).with_threshold(0.92);

    engine
        .analyze("Summarize briefly.", Some("My custom input"), None)
        .await
        .unwrap();

    let prompts = oracle.seen_prompts();
    assert!(!prompts.is_empty());
    for prompt in &prompts {
        assert!(prompt.contains("User input:\nMy custom input"), "got: {}", prompt);
        assert!(!prompt.contains("What can you help me with?"));
    }
}

/// Scenario: a per-call credential is forwarded to both oracle methods on
/// every call; a blank credential is treated as absent.
#[tokio::test]
async fn credential_override_is_forwarded() {
    let oracle = Arc::new(MockOracle::fixed(hi()));
    let engine = StripeEngine::new(oracle.clone()).with_threshold(0.92);

    engine
        .analyze("Be concise.", None, Some("sk-override"))
        .await
        .unwrap();
    for credential in oracle.seen_credentials() {
        assert_eq!(credential.as_deref(), Some("sk-override"));
    }

    let oracle = Arc::new(MockOracle::fixed(hi()));
    let engine = StripeEngine::new(oracle.clone()).with_threshold(0.92);
    engine.analyze("Be concise.", None, Some("   ")).await.unwrap();
    for credential in oracle.seen_credentials() {
        assert_eq!(credential, None);
    }
}

/// Scenario: the request boundary validates the prompt and normalizes blanks,
/// then produces the same report as the positional API.
#[tokio::test]
async fn analyze_request_matches_positional_analyze() {
    let oracle = Arc::new(MockOracle::fixed(hi()));
    let engine = StripeEngine::new(oracle).with_threshold(0.92);

    let request = AnalyzeRequest::new("Be concise. Always use bullet points.")
        .unwrap()
        .with_credential("  ")
        .with_user_input("");
    let via_request = engine.analyze_request(&request).await.unwrap();

    let oracle = Arc::new(MockOracle::fixed(hi()));
    let engine = StripeEngine::new(oracle).with_threshold(0.92);
    let positional = engine
        .analyze("Be concise. Always use bullet points.", None, None)
        .await
        .unwrap();

    assert_eq!(via_request, positional);
}

/// Oracle whose embedding calls start failing after a given number of
/// successes; completions always succeed.
struct FlakyOracle {
    healthy_embeds: std::sync::atomic::AtomicUsize,
}

#[async_trait]
impl Oracle for FlakyOracle {
    async fn complete(
        &self,
        _prompt: &str,
        _credential: Option<&str>,
    ) -> Result<String, AnalysisError> {
        Ok("sample output".to_string())
    }

    async fn embed(
        &self,
        _text: &str,
        _credential: Option<&str>,
    ) -> Result<Vec<f32>, AnalysisError> {
        use std::sync::atomic::Ordering;
        if self.healthy_embeds.fetch_sub(1, Ordering::SeqCst) == 0 {
            return Err(AnalysisError::Oracle("rate limited".to_string()));
        }
        Ok(hi())
    }
}

/// Scenario: an oracle failure mid-run aborts the analysis with an Oracle
/// error and yields no partial report.
#[tokio::test]
async fn oracle_failure_aborts_without_partial_report() {
    // Baseline succeeds, the first phase-1 probe fails.
    let oracle = Arc::new(FlakyOracle {
        healthy_embeds: std::sync::atomic::AtomicUsize::new(1),
    });
    let engine = StripeEngine::new(oracle).with_threshold(0.92);

    let result = engine.analyze("A. B. C.", None, None).await;
    assert!(matches!(result, Err(AnalysisError::Oracle(_))));
}

/// Scenario: without an explicit engine threshold, SIMILARITY_THRESHOLD from
/// the environment decides classification.
#[tokio::test]
async fn env_threshold_is_used_when_not_set_explicitly() {
    // Only this test touches the var in this binary.
    let prev = std::env::var(env_config::SIMILARITY_THRESHOLD_VAR).ok();
    std::env::set_var(env_config::SIMILARITY_THRESHOLD_VAR, "0.95");

    let oracle = Arc::new(
        MockOracle::scripted(vec![hi()]).with_fallback_embedding(near_threshold()),
    );
    let engine = StripeEngine::new(oracle);
    let report = engine.analyze("First. Second.", None, None).await.unwrap();

    match prev {
        Some(v) => std::env::set_var(env_config::SIMILARITY_THRESHOLD_VAR, v),
        None => std::env::remove_var(env_config::SIMILARITY_THRESHOLD_VAR),
    }

    // 0.93 similarity is below the 0.95 env threshold: nothing removed.
    assert!(report.components_removed.is_empty());
    assert_eq!(report.over_engineered_score, 0.0);
}
