//! Mock oracle for tests and examples.
//!
//! Completions return a fixed text; embeddings are scripted in call order
//! (the search engine's probe order is deterministic), with an optional fixed
//! fallback once the script runs out. Records the prompts and credentials it
//! was called with so tests can assert on the wrapped candidate prompts.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;

use crate::error::AnalysisError;
use crate::oracle::Oracle;

/// Scripted oracle: fixed completion text, embeddings popped from a queue.
///
/// When the queue is empty the fallback embedding is returned if one is set;
/// otherwise the call fails, so a miscounted script surfaces as a test failure
/// instead of a silently wrong similarity.
pub struct MockOracle {
    completion: String,
    scripted: Mutex<VecDeque<Vec<f32>>>,
    fallback: Option<Vec<f32>>,
    completion_calls: AtomicUsize,
    embedding_calls: AtomicUsize,
    seen_prompts: Mutex<Vec<String>>,
    seen_credentials: Mutex<Vec<Option<String>>>,
}

impl MockOracle {
    /// Mock whose embeddings are returned in call order from `embeddings`.
    pub fn scripted(embeddings: Vec<Vec<f32>>) -> Self {
        Self {
            completion: "sample output".to_string(),
            scripted: Mutex::new(embeddings.into()),
            fallback: None,
            completion_calls: AtomicUsize::new(0),
            embedding_calls: AtomicUsize::new(0),
            seen_prompts: Mutex::new(Vec::new()),
            seen_credentials: Mutex::new(Vec::new()),
        }
    }

    /// Mock that returns the same embedding for every call.
    pub fn fixed(embedding: Vec<f32>) -> Self {
        Self::scripted(Vec::new()).with_fallback_embedding(embedding)
    }

    /// Sets the embedding returned once the script is exhausted.
    pub fn with_fallback_embedding(mut self, embedding: Vec<f32>) -> Self {
        self.fallback = Some(embedding);
        self
    }

    /// Sets the completion text (default: "sample output").
    pub fn with_completion(mut self, text: impl Into<String>) -> Self {
        self.completion = text.into();
        self
    }

    /// Prompts passed to `complete`, in call order.
    pub fn seen_prompts(&self) -> Vec<String> {
        self.seen_prompts.lock().expect("mock lock").clone()
    }

    /// Credentials passed to either method, in call order.
    pub fn seen_credentials(&self) -> Vec<Option<String>> {
        self.seen_credentials.lock().expect("mock lock").clone()
    }

    pub fn completion_calls(&self) -> usize {
        self.completion_calls.load(Ordering::SeqCst)
    }

    pub fn embedding_calls(&self) -> usize {
        self.embedding_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Oracle for MockOracle {
    async fn complete(
        &self,
        prompt: &str,
        credential: Option<&str>,
    ) -> Result<String, AnalysisError> {
        self.completion_calls.fetch_add(1, Ordering::SeqCst);
        self.seen_prompts
            .lock()
            .expect("mock lock")
            .push(prompt.to_string());
        self.seen_credentials
            .lock()
            .expect("mock lock")
            .push(credential.map(str::to_string));
        Ok(self.completion.clone())
    }

    async fn embed(&self, _text: &str, credential: Option<&str>) -> Result<Vec<f32>, AnalysisError> {
        self.embedding_calls.fetch_add(1, Ordering::SeqCst);
        self.seen_credentials
            .lock()
            .expect("mock lock")
            .push(credential.map(str::to_string));
        let next = self.scripted.lock().expect("mock lock").pop_front();
        next.or_else(|| self.fallback.clone()).ok_or_else(|| {
            AnalysisError::Internal("mock embedding script exhausted".to_string())
        })
    }
}
