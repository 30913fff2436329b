use serde::Serialize;
use thiserror::Error;

#[derive(Debug, Serialize, Clone, PartialEq)]
pub struct FieldError {
    pub field: String,
    pub title: String,
    pub description: String,
}

impl FieldError {
    pub fn new(field: &str, title: &str, description: impl Into<String>) -> Self {
        FieldError {
            field: field.to_string(),
            title: title.to_string(),
            description: description.into(),
        }
    }
}

#[derive(Error, Debug, Serialize)]
pub enum IntelliTaskError {
    /// One or more required fields are absent or blank
    #[error("{0}")]
    MissingFields(String),

    /// Field-level validation failure
    #[error("Invalid input for field `{0}`: {1:?}")]
    InvalidInput(String, FieldError),

    /// Body is not valid JSON or has the wrong shape
    #[error("Malformed request body: {0}")]
    MalformedBody(String),

    /// Path id is not a well-formed todo id
    #[error("Invalid todo ID format: {0}")]
    InvalidTodoId(String),

    #[error("Email {0} already registered")]
    EmailAlreadyRegistered(String),

    #[error("Phone number {0} already registered")]
    PhoneAlreadyRegistered(String),

    /// Unknown email or wrong password, deliberately indistinguishable
    #[error("Invalid credentials")]
    InvalidCredentials,

    /// Missing, malformed, tampered or expired bearer token
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// Todo does not exist or belongs to someone else
    #[error("Todo {0} not found")]
    TodoNotFound(String),

    #[error("User {0} not found")]
    UserNotFound(String),

    #[error("Chat assistant is not configured")]
    AssistantNotConfigured,

    /// Embedding, vector index or language model call failed
    #[error("Upstream error: {0}")]
    UpstreamError(String),

    #[error("Token error: {0}")]
    TokenError(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Storage error: {0}")]
    StorageError(String),

    #[error("Database error: {0}")]
    DatabaseError(String),

    #[error("Internal server error: {0}")]
    InternalServerError(String),
}

impl From<sqlx::Error> for IntelliTaskError {
    fn from(err: sqlx::Error) -> Self {
        IntelliTaskError::DatabaseError(err.to_string())
    }
}

impl From<reqwest::Error> for IntelliTaskError {
    fn from(err: reqwest::Error) -> Self {
        IntelliTaskError::UpstreamError(err.to_string())
    }
}
