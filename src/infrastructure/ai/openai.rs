//! OpenAI embeddings and chat completions over plain HTTPS.
//!
//! Single attempt per call; failures surface as `UpstreamError`.

use super::{ChatMessage, ChatModel, Embedder};
use crate::core::errors::IntelliTaskError;
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";

#[derive(Serialize)]
struct EmbeddingRequest<'a> {
    model: &'a str,
    input: &'a str,
    dimensions: usize,
}

#[derive(Deserialize)]
struct EmbeddingResponse {
    data: Vec<EmbeddingData>,
}

#[derive(Deserialize)]
struct EmbeddingData {
    embedding: Vec<f32>,
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: &'a [ChatMessage],
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatChoiceMessage,
}

#[derive(Deserialize)]
struct ChatChoiceMessage {
    content: Option<String>,
}

/// Shared connection settings for both OpenAI endpoints.
#[derive(Clone)]
pub struct OpenAiClient {
    client: Client,
    base_url: String,
    api_key: String,
}

impl OpenAiClient {
    pub fn new(client: Client, base_url: &str, api_key: &str) -> Self {
        OpenAiClient {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
        }
    }

    async fn post<B: Serialize + ?Sized, R: for<'de> Deserialize<'de>>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<R, IntelliTaskError> {
        let resp = self
            .client
            .post(format!("{}{}", self.base_url, path))
            .bearer_auth(&self.api_key)
            .json(body)
            .send()
            .await?;

        if !resp.status().is_success() {
            let status = resp.status();
            let body = resp.text().await.unwrap_or_else(|_| "<no body>".to_string());
            return Err(IntelliTaskError::UpstreamError(format!(
                "OpenAI {} failed: {} {}",
                path, status, body
            )));
        }

        resp.json::<R>()
            .await
            .map_err(|e| IntelliTaskError::UpstreamError(format!("OpenAI {} response parse error: {}", path, e)))
    }
}

pub struct OpenAiEmbedder {
    client: OpenAiClient,
    model: String,
    dimensions: usize,
}

impl OpenAiEmbedder {
    pub fn new(client: OpenAiClient, model: &str, dimensions: usize) -> Self {
        OpenAiEmbedder {
            client,
            model: model.to_string(),
            dimensions,
        }
    }
}

#[async_trait]
impl Embedder for OpenAiEmbedder {
    async fn embed(&self, text: &str) -> Result<Vec<f32>, IntelliTaskError> {
        let response: EmbeddingResponse = self
            .client
            .post(
                "/embeddings",
                &EmbeddingRequest {
                    model: &self.model,
                    input: text,
                    dimensions: self.dimensions,
                },
            )
            .await?;

        response
            .data
            .into_iter()
            .next()
            .map(|d| d.embedding)
            .ok_or_else(|| IntelliTaskError::UpstreamError("OpenAI returned empty embedding data".to_string()))
    }
}

pub struct OpenAiChatModel {
    client: OpenAiClient,
    model: String,
}

impl OpenAiChatModel {
    pub fn new(client: OpenAiClient, model: &str) -> Self {
        OpenAiChatModel {
            client,
            model: model.to_string(),
        }
    }
}

#[async_trait]
impl ChatModel for OpenAiChatModel {
    async fn complete(&self, messages: &[ChatMessage]) -> Result<String, IntelliTaskError> {
        let response: ChatResponse = self
            .client
            .post(
                "/chat/completions",
                &ChatRequest {
                    model: &self.model,
                    messages,
                },
            )
            .await?;

        response
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .ok_or_else(|| IntelliTaskError::UpstreamError("OpenAI returned no completion".to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::ai::ChatRole;

    #[test]
    fn test_chat_request_serializes_roles_in_lowercase() {
        let messages = vec![ChatMessage::system("sys"), ChatMessage::user("hi")];
        let body = serde_json::to_value(ChatRequest {
            model: "gpt-4o-mini",
            messages: &messages,
        })
        .unwrap();
        assert_eq!(body["messages"][0]["role"], "system");
        assert_eq!(body["messages"][1]["role"], "user");
        assert_eq!(body["messages"][1]["content"], "hi");
        assert_eq!(messages[0].role, ChatRole::System);
    }

    #[test]
    fn test_chat_response_tolerates_null_content() {
        let parsed: ChatResponse =
            serde_json::from_str(r#"{"choices":[{"message":{"role":"assistant","content":null}}]}"#).unwrap();
        assert!(parsed.choices[0].message.content.is_none());
    }

    #[test]
    fn test_base_url_trailing_slash_is_trimmed() {
        let client = OpenAiClient::new(Client::new(), "https://example.test/v1/", "key");
        assert_eq!(client.base_url, "https://example.test/v1");
    }
}
