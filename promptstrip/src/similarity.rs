//! Cosine similarity between embedding vectors.

/// Computes cosine similarity between two vectors.
///
/// Returns 0.0 if either vector has zero magnitude. The output is not clamped:
/// cosine can range over `[-1, 1]` and the search engine treats it purely as a
/// monotonic closeness measure. Vectors must have equal length.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    debug_assert_eq!(a.len(), b.len(), "embedding dimensions must match");

    let dot_product: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();

    if norm_a == 0.0 || norm_b == 0.0 {
        0.0
    } else {
        dot_product / (norm_a * norm_b)
    }
}
