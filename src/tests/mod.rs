mod auth_tests;
mod chat_tests;

use crate::auth::jwt::Claims;
use crate::core::assistant::RetrievalAssistant;
use crate::core::errors::IntelliTaskError;
use crate::core::models::user::RegistrationForm;
use crate::core::services::IntelliTaskService;
use crate::infrastructure::ai::{ChatMessage, ChatModel, Embedder, local::LocalEmbedder};
use crate::infrastructure::storage::{Storage, in_memory::InMemoryStorage};
use crate::infrastructure::vector::in_memory::InMemoryVectorIndex;
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;

pub const TEST_SECRET: &str = "test-secret";
pub const TEST_BCRYPT_COST: u32 = 4;
pub const PASSWORD: &str = "Aa1!aaaa";

/// Replies with the user prompt it was given so tests can inspect the retrieved context.
pub struct EchoChatModel;

#[async_trait]
impl ChatModel for EchoChatModel {
    async fn complete(&self, messages: &[ChatMessage]) -> Result<String, IntelliTaskError> {
        Ok(messages.last().map(|m| m.content.clone()).unwrap_or_default())
    }
}

/// Offline embedder that stalls on texts containing `slow_on`.
pub struct SlowEmbedder {
    inner: LocalEmbedder,
    slow_on: &'static str,
    delay: Duration,
}

#[async_trait]
impl Embedder for SlowEmbedder {
    async fn embed(&self, text: &str) -> Result<Vec<f32>, IntelliTaskError> {
        if text.contains(self.slow_on) {
            tokio::time::sleep(self.delay).await;
        }
        self.inner.embed(text).await
    }
}

pub fn create_test_service() -> IntelliTaskService {
    create_test_service_with_storage(Arc::new(InMemoryStorage::new()))
}

pub fn create_test_service_with_storage(storage: Arc<dyn Storage>) -> IntelliTaskService {
    IntelliTaskService::new(storage, TEST_SECRET).with_bcrypt_cost(TEST_BCRYPT_COST)
}

/// Service wired to an offline retrieval assistant; the index is returned for inspection.
pub fn create_test_service_with_assistant() -> (IntelliTaskService, Arc<InMemoryVectorIndex>) {
    create_test_service_with_embedder(Arc::new(LocalEmbedder::new(64)))
}

pub fn create_test_service_with_embedder(embedder: Arc<dyn Embedder>) -> (IntelliTaskService, Arc<InMemoryVectorIndex>) {
    let index = Arc::new(InMemoryVectorIndex::new());
    let assistant = RetrievalAssistant::new(embedder, index.clone(), Arc::new(EchoChatModel), 5);
    (create_test_service().with_assistant(assistant), index)
}

pub fn slow_embedder(slow_on: &'static str, delay: Duration) -> Arc<dyn Embedder> {
    Arc::new(SlowEmbedder {
        inner: LocalEmbedder::new(64),
        slow_on,
        delay,
    })
}

pub fn registration(email: &str, phone_number: &str) -> RegistrationForm {
    RegistrationForm {
        full_name: Some("Test User".to_string()),
        date_of_birth: Some("1990-01-01".to_string()),
        phone_number: Some(phone_number.to_string()),
        email: Some(email.to_string()),
        password: Some(PASSWORD.to_string()),
    }
}

/// Registers a user and returns the claims of the issued token.
pub async fn signed_up(service: &IntelliTaskService, email: &str, phone_number: &str) -> Claims {
    let session = service.register(registration(email, phone_number)).await.unwrap();
    service.validate_token(&session.token).unwrap()
}
