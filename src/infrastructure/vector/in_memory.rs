use super::{VectorIndex, VectorMatch, VectorRecord};
use crate::core::errors::IntelliTaskError;
use async_trait::async_trait;
use std::collections::HashMap;
use tokio::sync::RwLock;

/// Brute-force cosine similarity over every record of the owner.
#[derive(Default)]
pub struct InMemoryVectorIndex {
    records: RwLock<HashMap<String, VectorRecord>>,
}

impl InMemoryVectorIndex {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn len(&self) -> usize {
        self.records.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.records.read().await.is_empty()
    }
}

pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }
    let dot: f32 = a.iter().zip(b).map(|(x, y)| x * y).sum();
    let norm_a = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b = b.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }
    dot / (norm_a * norm_b)
}

#[async_trait]
impl VectorIndex for InMemoryVectorIndex {
    async fn upsert(&self, record: VectorRecord) -> Result<(), IntelliTaskError> {
        self.records.write().await.insert(record.id.clone(), record);
        Ok(())
    }

    async fn delete(&self, id: &str) -> Result<(), IntelliTaskError> {
        self.records.write().await.remove(id);
        Ok(())
    }

    async fn query(&self, vector: &[f32], top_k: usize, owner_id: &str) -> Result<Vec<VectorMatch>, IntelliTaskError> {
        let records = self.records.read().await;
        let mut matches: Vec<VectorMatch> = records
            .values()
            .filter(|r| r.metadata.user_id == owner_id)
            .map(|r| VectorMatch {
                id: r.id.clone(),
                score: cosine_similarity(vector, &r.values),
                metadata: r.metadata.clone(),
            })
            .collect();
        matches.sort_by(|a, b| b.score.total_cmp(&a.score));
        matches.truncate(top_k);
        Ok(matches)
    }
}
