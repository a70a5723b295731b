//! Deterministic hash-based text embeddings.
//!
//! The embedder maps text to a fixed-length vector using a stable polynomial
//! hash per word and dimension. There is no trained model behind it: vectors
//! only agree when the underlying word sets overlap.

use std::collections::{BTreeMap, HashSet};

use tracing::debug;

use crate::Embedding;
use crate::similarity::normalize;

/// Dimensions reserved at the tail of each vector for statistical features
/// (average word length, distinct word count).
pub const RESERVED_DIMS: usize = 2;

/// Multiplier applied to words found in the domain vocabulary.
const DOMAIN_BOOST: f32 = 2.0;

/// Scale for the average-word-length feature.
const AVG_WORD_LEN_SCALE: f32 = 0.1;

/// Scale for the distinct-word-count feature.
const DISTINCT_WORDS_SCALE: f32 = 0.01;

/// Curated organization-specific terms that receive a fixed boost.
///
/// The list mirrors the vocabulary of the intranet it indexes: employee
/// directory and announcement board terms, in Portuguese and English.
const DEFAULT_VOCABULARY: &[&str] = &[
    "funcionário",
    "funcionario",
    "colaborador",
    "employee",
    "ramal",
    "departamento",
    "department",
    "cargo",
    "setor",
    "equipe",
    "team",
    "comunicado",
    "announcement",
    "aviso",
    "notícia",
    "noticia",
    "reunião",
    "reuniao",
    "meeting",
    "empresa",
    "company",
    "intranet",
];

/// Deterministic hash embedder.
///
/// `embed` is pure: the same text always yields the same vector, there are no
/// side effects and no external calls. Output vectors are L2-normalized
/// unless the input contains no words, in which case the zero vector is
/// returned.
#[derive(Debug, Clone)]
pub struct HashEmbedder {
    /// Output dimension, including the reserved statistical dimensions.
    dimension: usize,

    /// Words that receive the domain boost.
    vocabulary: HashSet<String>,

    /// Boost applied to vocabulary words.
    domain_boost: f32,
}

impl HashEmbedder {
    /// Create an embedder with the default dimension and vocabulary.
    pub fn new() -> Self {
        Self::with_dimension(crate::DEFAULT_DIMENSION)
    }

    /// Create an embedder with a custom dimension.
    ///
    /// Dimensions smaller than `RESERVED_DIMS + 1` are rounded up so the
    /// statistical features always have room.
    pub fn with_dimension(dimension: usize) -> Self {
        Self {
            dimension: dimension.max(RESERVED_DIMS + 1),
            vocabulary: DEFAULT_VOCABULARY.iter().map(|s| s.to_string()).collect(),
            domain_boost: DOMAIN_BOOST,
        }
    }

    /// Replace the domain vocabulary.
    pub fn with_vocabulary<I, S>(mut self, terms: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.vocabulary = terms.into_iter().map(|t| t.into().to_lowercase()).collect();
        self
    }

    /// Set the boost applied to vocabulary words.
    pub fn with_domain_boost(mut self, boost: f32) -> Self {
        self.domain_boost = boost;
        self
    }

    /// Get the output dimension.
    pub fn dimension(&self) -> usize {
        self.dimension
    }

    /// Embed text into a fixed-length vector.
    ///
    /// Empty or whitespace-only text produces the zero vector; every other
    /// input produces a unit-length vector.
    pub fn embed(&self, text: &str) -> Embedding {
        let mut vector = vec![0.0f32; self.dimension];

        let lowered = text.to_lowercase();
        let words: Vec<&str> = lowered.split_whitespace().collect();
        if words.is_empty() {
            debug!("embedding degenerate input, returning zero vector");
            return vector;
        }

        // BTreeMap keeps accumulation order stable so float rounding is
        // reproducible across calls.
        let mut frequencies: BTreeMap<&str, f32> = BTreeMap::new();
        for word in &words {
            *frequencies.entry(word).or_insert(0.0) += 1.0;
        }

        let feature_dims = self.dimension - RESERVED_DIMS;
        for (word, frequency) in &frequencies {
            let weight = if self.vocabulary.contains(*word) {
                frequency * self.domain_boost
            } else {
                *frequency
            };

            for (dim, slot) in vector.iter_mut().enumerate().take(feature_dims) {
                *slot += dimension_hash(word, dim) * weight;
            }
        }

        let total_chars: usize = words.iter().map(|w| w.chars().count()).sum();
        let avg_word_len = total_chars as f32 / words.len() as f32;
        vector[feature_dims] = avg_word_len * AVG_WORD_LEN_SCALE;
        vector[feature_dims + 1] = frequencies.len() as f32 * DISTINCT_WORDS_SCALE;

        normalize(&mut vector);
        vector
    }
}

impl Default for HashEmbedder {
    fn default() -> Self {
        Self::new()
    }
}

/// Stable per-word, per-dimension hash contribution in `[-1.0, 1.0]`.
///
/// A polynomial rolling hash over the word bytes, seeded by the dimension
/// index so each dimension sees an independent pseudo-random value.
fn dimension_hash(word: &str, dim: usize) -> f32 {
    const PRIME: u64 = 1_000_000_007;

    let mut hash: u64 = dim as u64 + 1;
    for byte in word.bytes() {
        hash = (hash.wrapping_mul(31).wrapping_add(u64::from(byte))) % PRIME;
    }

    // Map into [-1.0, 1.0].
    (hash % 2001) as f32 / 1000.0 - 1.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn magnitude(v: &[f32]) -> f32 {
        v.iter().map(|x| x * x).sum::<f32>().sqrt()
    }

    #[test]
    fn test_embed_deterministic() {
        let embedder = HashEmbedder::new();
        let a = embedder.embed("qual o ramal do João");
        let b = embedder.embed("qual o ramal do João");
        assert_eq!(a, b);
    }

    #[test]
    fn test_embed_unit_norm() {
        let embedder = HashEmbedder::new();
        let v = embedder.embed("novo comunicado da empresa sobre a reunião");
        assert!((magnitude(&v) - 1.0).abs() < 1e-4);
    }

    #[test]
    fn test_embed_empty_is_zero_vector() {
        let embedder = HashEmbedder::new();
        assert_eq!(embedder.embed(""), vec![0.0; embedder.dimension()]);
        assert_eq!(embedder.embed("   \t\n"), vec![0.0; embedder.dimension()]);
    }

    #[test]
    fn test_embed_dimension_override() {
        let embedder = HashEmbedder::with_dimension(16);
        assert_eq!(embedder.dimension(), 16);
        assert_eq!(embedder.embed("hello world").len(), 16);
    }

    #[test]
    fn test_dimension_rounds_up_for_reserved_dims() {
        let embedder = HashEmbedder::with_dimension(1);
        assert_eq!(embedder.dimension(), RESERVED_DIMS + 1);
    }

    #[test]
    fn test_vocabulary_boost_changes_vector() {
        let boosted = HashEmbedder::new();
        let plain = HashEmbedder::new().with_vocabulary(Vec::<String>::new());

        // "ramal comunicado" is pure vocabulary, "caderno janela" is not.
        assert_ne!(
            boosted.embed("ramal comunicado caderno"),
            plain.embed("ramal comunicado caderno")
        );
        assert_eq!(boosted.embed("caderno janela"), plain.embed("caderno janela"));
    }

    #[test]
    fn test_identical_content_identical_vectors() {
        let embedder = HashEmbedder::new();
        let a = embedder.embed("Maria Souza departamento financeiro");
        let b = embedder.embed("maria souza DEPARTAMENTO financeiro");
        // Lowercasing happens before hashing.
        assert_eq!(a, b);
    }

    #[test]
    fn test_dimension_hash_is_stable_and_bounded() {
        for dim in 0..64 {
            let value = dimension_hash("ramal", dim);
            assert_eq!(value, dimension_hash("ramal", dim));
            assert!((-1.0..=1.0).contains(&value));
        }
    }
}
