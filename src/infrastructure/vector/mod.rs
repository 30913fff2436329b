pub mod in_memory;
pub mod pinecone;

use crate::core::errors::IntelliTaskError;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Metadata stored beside each todo vector. `user_id` is the filter key for every query.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TodoMetadata {
    pub user_id: String,
    pub email: String,
    pub title: String,
    pub description: String,
}

#[derive(Debug, Clone)]
pub struct VectorRecord {
    pub id: String,
    pub values: Vec<f32>,
    pub metadata: TodoMetadata,
}

#[derive(Debug, Clone)]
pub struct VectorMatch {
    pub id: String,
    pub score: f32,
    pub metadata: TodoMetadata,
}

#[async_trait]
pub trait VectorIndex: Send + Sync {
    /// Inserts or replaces the record with the same id.
    async fn upsert(&self, record: VectorRecord) -> Result<(), IntelliTaskError>;
    async fn delete(&self, id: &str) -> Result<(), IntelliTaskError>;
    /// Nearest neighbours among records whose metadata `user_id` equals `owner_id`, best first.
    async fn query(&self, vector: &[f32], top_k: usize, owner_id: &str) -> Result<Vec<VectorMatch>, IntelliTaskError>;
}
