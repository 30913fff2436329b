use axum::{
    Json,
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};
use tracing::error;
use utoipa::ToSchema;

use crate::config::CONFIG;
use crate::core::errors::IntelliTaskError;
use crate::core::models::{
    todo::Todo,
    user::{RegistrationForm, UserProfile},
};
use crate::core::services::AuthSession;

// Request structs for JSON payloads. Fields stay optional so a missing field
// reaches validation and gets the domain's 400 message.
#[derive(Deserialize, ToSchema, Default)]
#[serde(rename_all = "camelCase")]
pub struct SignUpRequest {
    pub full_name: Option<String>,
    /// `YYYY-MM-DD` or RFC 3339
    pub date_of_birth: Option<String>,
    pub phone_number: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
}

impl core::fmt::Debug for SignUpRequest {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("SignUpRequest")
            .field("full_name", &self.full_name)
            .field("date_of_birth", &self.date_of_birth)
            .field("phone_number", &self.phone_number)
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .finish()
    }
}

impl From<SignUpRequest> for RegistrationForm {
    fn from(req: SignUpRequest) -> Self {
        RegistrationForm {
            full_name: req.full_name,
            date_of_birth: req.date_of_birth,
            phone_number: req.phone_number,
            email: req.email,
            password: req.password,
        }
    }
}

#[derive(Deserialize, ToSchema, Default)]
pub struct SignInRequest {
    pub email: Option<String>,
    pub password: Option<String>,
}

impl core::fmt::Debug for SignInRequest {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("SignInRequest")
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .finish()
    }
}

#[derive(Debug, Deserialize, ToSchema, Default)]
pub struct TodoRequest {
    pub title: Option<String>,
    pub description: Option<String>,
}

#[derive(Debug, Deserialize, ToSchema, Default)]
pub struct ChatRequest {
    pub message: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct AuthResponse {
    pub success: bool,
    pub message: String,
    pub user: UserProfile,
    pub token: String,
}

impl AuthResponse {
    pub fn new(session: AuthSession, message: &str) -> Self {
        AuthResponse {
            success: true,
            message: message.to_string(),
            user: session.user,
            token: session.token,
        }
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct TodoListResponse {
    pub todos: Vec<Todo>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct TodoResponse {
    pub todo: Todo,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct DeleteTodoResponse {
    pub message: String,
    pub todo: Todo,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ChatResponse {
    pub message: String,
}

// Error response struct
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ErrorResponse {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
    /// Diagnostic text, omitted in production
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

// Newtype wrapper for IntelliTaskError to implement IntoResponse
pub struct ApiError(pub IntelliTaskError);

impl From<IntelliTaskError> for ApiError {
    fn from(err: IntelliTaskError) -> Self {
        ApiError(err)
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError(IntelliTaskError::MalformedBody(rejection.body_text()))
    }
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match &self.0 {
            IntelliTaskError::MissingFields(_)
            | IntelliTaskError::InvalidInput(..)
            | IntelliTaskError::MalformedBody(_)
            | IntelliTaskError::InvalidTodoId(_) => StatusCode::BAD_REQUEST,
            IntelliTaskError::InvalidCredentials | IntelliTaskError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            IntelliTaskError::TodoNotFound(_) | IntelliTaskError::UserNotFound(_) => StatusCode::NOT_FOUND,
            IntelliTaskError::EmailAlreadyRegistered(_) | IntelliTaskError::PhoneAlreadyRegistered(_) => {
                StatusCode::CONFLICT
            }
            IntelliTaskError::AssistantNotConfigured
            | IntelliTaskError::UpstreamError(_)
            | IntelliTaskError::TokenError(_)
            | IntelliTaskError::ConfigError(_)
            | IntelliTaskError::StorageError(_)
            | IntelliTaskError::DatabaseError(_)
            | IntelliTaskError::InternalServerError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn body(&self, expose_details: bool) -> ErrorResponse {
        let (error, field) = match &self.0 {
            IntelliTaskError::MissingFields(msg) => (msg.clone(), None),
            IntelliTaskError::InvalidInput(field, detail) => (detail.description.clone(), Some(field.clone())),
            IntelliTaskError::MalformedBody(_) => ("Invalid request body".to_string(), None),
            IntelliTaskError::InvalidTodoId(_) => ("Invalid todo ID format".to_string(), None),
            IntelliTaskError::EmailAlreadyRegistered(_) => ("Email already registered".to_string(), None),
            IntelliTaskError::PhoneAlreadyRegistered(_) => ("Phone number already registered".to_string(), None),
            IntelliTaskError::InvalidCredentials => ("Invalid email or password".to_string(), None),
            IntelliTaskError::Unauthorized(_) => ("Authentication required".to_string(), None),
            IntelliTaskError::TodoNotFound(_) => ("Todo not found".to_string(), None),
            IntelliTaskError::UserNotFound(_) => ("User not found".to_string(), None),
            IntelliTaskError::AssistantNotConfigured => ("Chat assistant is not configured".to_string(), None),
            IntelliTaskError::UpstreamError(_) => ("Failed to process chat".to_string(), None),
            IntelliTaskError::TokenError(_)
            | IntelliTaskError::ConfigError(_)
            | IntelliTaskError::StorageError(_)
            | IntelliTaskError::DatabaseError(_)
            | IntelliTaskError::InternalServerError(_) => ("Internal server error".to_string(), None),
        };

        let details = match &self.0 {
            _ if !expose_details => None,
            IntelliTaskError::MalformedBody(msg) => Some(msg.clone()),
            _ if self.status().is_server_error() => Some(self.0.to_string()),
            _ => None,
        };

        ErrorResponse { error, field, details }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            error!(error = %self.0, "request failed");
        }
        let body = self.body(!CONFIG.is_production());
        (status, Json(body)).into_response()
    }
}
