//! Similarity computation for embeddings.

use ordered_float::OrderedFloat;
use serde::{Deserialize, Serialize};

use crate::Embedding;
use crate::error::{EmbeddingError, Result};

/// Compute the cosine similarity between two embeddings.
///
/// Returns a value between -1.0 and 1.0. When either vector has zero
/// magnitude the similarity is defined as 0.0 rather than dividing by zero.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> Result<f32> {
    if a.len() != b.len() {
        return Err(EmbeddingError::DimensionMismatch {
            expected: a.len(),
            actual: b.len(),
        });
    }

    let dot_product: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let magnitude_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let magnitude_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();

    if magnitude_a == 0.0 || magnitude_b == 0.0 {
        return Ok(0.0);
    }

    Ok(dot_product / (magnitude_a * magnitude_b))
}

/// A similarity search result.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimilarityResult {
    /// ID of the matched item.
    pub id: String,

    /// Similarity score.
    pub score: f32,
}

impl SimilarityResult {
    /// Create a new similarity result.
    pub fn new(id: impl Into<String>, score: f32) -> Self {
        Self {
            id: id.into(),
            score,
        }
    }
}

/// Find the top-k most similar embeddings.
///
/// Results are sorted descending by score. The sort is stable, so candidates
/// with equal scores keep their original order — this is the documented
/// tie-break and tests rely on it.
pub fn find_top_k(
    query: &Embedding,
    candidates: &[(String, Embedding)],
    k: usize,
    min_score: f32,
) -> Result<Vec<SimilarityResult>> {
    let mut scores: Vec<(OrderedFloat<f32>, &str)> = Vec::with_capacity(candidates.len());

    for (id, embedding) in candidates {
        let score = cosine_similarity(query, embedding)?;
        if score >= min_score {
            scores.push((OrderedFloat(score), id.as_str()));
        }
    }

    // Stable sort by score descending.
    scores.sort_by(|a, b| b.0.cmp(&a.0));

    let results: Vec<SimilarityResult> = scores
        .into_iter()
        .take(k)
        .map(|(score, id)| SimilarityResult::new(id, score.0))
        .collect();

    Ok(results)
}

/// Normalize an embedding to unit length.
///
/// Zero vectors are left untouched.
pub fn normalize(embedding: &mut Embedding) {
    let magnitude: f32 = embedding.iter().map(|x| x * x).sum::<f32>().sqrt();
    if magnitude > 0.0 {
        for x in embedding.iter_mut() {
            *x /= magnitude;
        }
    }
}
