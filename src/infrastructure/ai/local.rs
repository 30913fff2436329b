//! Offline embedder for tests and keyless development.
//!
//! Hashes each lower-cased word into a signed bucket (feature hashing) and
//! L2-normalizes the result, so texts sharing words score higher under cosine
//! similarity. No network.

use super::Embedder;
use crate::core::errors::IntelliTaskError;
use async_trait::async_trait;

const FNV_OFFSET: u64 = 0xcbf2_9ce4_8422_2325;
const FNV_PRIME: u64 = 0x0000_0100_0000_01b3;

pub struct LocalEmbedder {
    dimensions: usize,
}

impl LocalEmbedder {
    pub fn new(dimensions: usize) -> Self {
        LocalEmbedder {
            dimensions: dimensions.max(1),
        }
    }
}

fn fnv1a(word: &str) -> u64 {
    word.bytes()
        .fold(FNV_OFFSET, |hash, byte| (hash ^ byte as u64).wrapping_mul(FNV_PRIME))
}

/// Unit-length vector, or all zeros when `text` has no words.
pub fn embed(text: &str, dimensions: usize) -> Vec<f32> {
    let mut vector = vec![0.0f32; dimensions];
    if dimensions == 0 {
        return vector;
    }

    for word in text
        .split(|c: char| !c.is_alphanumeric())
        .filter(|w| !w.is_empty())
    {
        let hash = fnv1a(&word.to_lowercase());
        let bucket = (hash % dimensions as u64) as usize;
        // High bit picks the sign so collisions tend to cancel rather than pile up.
        let sign = if hash >> 63 == 0 { 1.0 } else { -1.0 };
        vector[bucket] += sign;
    }

    let norm = vector.iter().map(|v| v * v).sum::<f32>().sqrt();
    if norm > 0.0 {
        vector.iter_mut().for_each(|v| *v /= norm);
    }
    vector
}

#[async_trait]
impl Embedder for LocalEmbedder {
    async fn embed(&self, text: &str) -> Result<Vec<f32>, IntelliTaskError> {
        Ok(embed(text, self.dimensions))
    }
}
