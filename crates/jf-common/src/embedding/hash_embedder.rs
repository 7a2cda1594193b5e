//! Feature-hashing embedder: deterministic, training-free, O(token count).
//!
//! SipHash13 with fixed seeds keeps vectors stable across Rust versions.
//! Changing the seeds or the tokenization changes every stored vector, so
//! the vector index would need a rebuild.

use std::hash::{Hash, Hasher};

use siphasher::sip::SipHasher13;

use super::{EmbeddingError, EmbeddingService, EMBEDDING_DIMENSION};

const HASH_SEED_K0: u64 = 0x0f0e_0d0c_0b0a_0908;
const HASH_SEED_K1: u64 = 0x0706_0504_0302_0100;

pub struct HashEmbedder {
    dimension: usize,
}

impl Default for HashEmbedder {
    fn default() -> Self {
        Self::new(EMBEDDING_DIMENSION)
    }
}

impl HashEmbedder {
    pub fn new(dimension: usize) -> Self {
        Self {
            dimension: dimension.max(1),
        }
    }

    fn hash_token(&self, token: &str) -> usize {
        let mut hasher = SipHasher13::new_with_keys(HASH_SEED_K0, HASH_SEED_K1);
        token.hash(&mut hasher);
        (hasher.finish() as usize) % self.dimension
    }

    fn embed_tokens<'a>(&self, tokens: impl Iterator<Item = (&'a str, f32)>) -> Vec<f32> {
        let mut vector = vec![0.0f32; self.dimension];

        for (token, weight) in tokens {
            let idx = self.hash_token(token);
            // Sign hashing keeps collisions from only ever adding up.
            let sign = if self.hash_token(&format!("{token}#sign")) % 2 == 0 {
                1.0
            } else {
                -1.0
            };
            vector[idx] += sign * weight;
        }

        let norm: f32 = vector.iter().map(|x| x * x).sum::<f32>().sqrt();
        if norm > 0.0 {
            for v in &mut vector {
                *v /= norm;
            }
        }

        vector
    }
}

impl EmbeddingService for HashEmbedder {
    fn dimension(&self) -> usize {
        self.dimension
    }

    async fn embed(&self, text: &str) -> Result<Vec<f32>, EmbeddingError> {
        let lower = text.to_lowercase();
        let words: Vec<&str> = lower
            .split(|c: char| !c.is_alphanumeric())
            .filter(|w| !w.is_empty())
            .collect();

        if words.is_empty() {
            return Err(EmbeddingError::EmptyInput);
        }

        // Unigrams carry full weight; adjacent-word bigrams add phrase
        // signal at half weight.
        let bigrams: Vec<String> = words
            .windows(2)
            .map(|pair| format!("{} {}", pair[0], pair[1]))
            .collect();

        let tokens = words
            .iter()
            .map(|w| (*w, 1.0f32))
            .chain(bigrams.iter().map(|b| (b.as_str(), 0.5f32)));

        Ok(self.embed_tokens(tokens))
    }
}
