//! Pinecone data-plane client (upsert, query with metadata filter, delete).

use super::{TodoMetadata, VectorIndex, VectorMatch, VectorRecord};
use crate::core::errors::IntelliTaskError;
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

const API_VERSION: &str = "2024-07";

#[derive(Serialize)]
struct PineconeVector<'a> {
    id: &'a str,
    values: &'a [f32],
    metadata: &'a TodoMetadata,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct QueryRequest<'a> {
    vector: &'a [f32],
    top_k: usize,
    include_metadata: bool,
    filter: Value,
}

#[derive(Deserialize)]
struct QueryResponse {
    #[serde(default)]
    matches: Vec<PineconeMatch>,
}

#[derive(Deserialize)]
struct PineconeMatch {
    id: String,
    #[serde(default)]
    score: f32,
    metadata: Option<TodoMetadata>,
}

pub struct PineconeIndex {
    client: Client,
    host: String,
    api_key: String,
}

impl PineconeIndex {
    /// `host` is the index host shown in the Pinecone console, with or without scheme.
    pub fn new(client: Client, host: &str, api_key: &str) -> Self {
        let host = host.trim_end_matches('/');
        let host = if host.starts_with("http://") || host.starts_with("https://") {
            host.to_string()
        } else {
            format!("https://{}", host)
        };
        PineconeIndex {
            client,
            host,
            api_key: api_key.to_string(),
        }
    }

    async fn post(&self, path: &str, body: &impl Serialize) -> Result<reqwest::Response, IntelliTaskError> {
        let resp = self
            .client
            .post(format!("{}{}", self.host, path))
            .header("Api-Key", &self.api_key)
            .header("X-Pinecone-API-Version", API_VERSION)
            .json(body)
            .send()
            .await?;

        if !resp.status().is_success() {
            let status = resp.status();
            let body = resp.text().await.unwrap_or_else(|_| "<no body>".to_string());
            return Err(IntelliTaskError::UpstreamError(format!(
                "Pinecone {} failed: {} {}",
                path, status, body
            )));
        }
        Ok(resp)
    }
}

fn owner_filter(owner_id: &str) -> Value {
    json!({ "userId": { "$eq": owner_id } })
}

#[async_trait]
impl VectorIndex for PineconeIndex {
    async fn upsert(&self, record: VectorRecord) -> Result<(), IntelliTaskError> {
        let vector = PineconeVector {
            id: &record.id,
            values: &record.values,
            metadata: &record.metadata,
        };
        let body = json!({ "vectors": [vector] });
        self.post("/vectors/upsert", &body).await?;
        Ok(())
    }

    async fn delete(&self, id: &str) -> Result<(), IntelliTaskError> {
        self.post("/vectors/delete", &json!({ "ids": [id] })).await?;
        Ok(())
    }

    async fn query(&self, vector: &[f32], top_k: usize, owner_id: &str) -> Result<Vec<VectorMatch>, IntelliTaskError> {
        let resp = self
            .post(
                "/query",
                &QueryRequest {
                    vector,
                    top_k,
                    include_metadata: true,
                    filter: owner_filter(owner_id),
                },
            )
            .await?;

        let parsed: QueryResponse = resp
            .json()
            .await
            .map_err(|e| IntelliTaskError::UpstreamError(format!("Pinecone query parse error: {}", e)))?;

        // Re-check ownership locally; a match without metadata cannot be attributed.
        Ok(parsed
            .matches
            .into_iter()
            .filter_map(|m| {
                let metadata = m.metadata?;
                (metadata.user_id == owner_id).then_some(VectorMatch {
                    id: m.id,
                    score: m.score,
                    metadata,
                })
            })
            .collect())
    }
}
