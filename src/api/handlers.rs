use crate::{
    api::models::*,
    auth::jwt::Claims,
    core::{errors::IntelliTaskError, services::IntelliTaskService},
};
use axum::{
    Extension, Json, Router,
    extract::{Path, Request, State, rejection::JsonRejection},
    http::StatusCode,
    middleware::{self, Next},
    response::Response,
    routing::{get, post, put},
};
use std::sync::Arc;

pub type SharedService = Arc<IntelliTaskService>;

/// Rejects the request with 401 unless it carries a valid bearer token;
/// otherwise hands the decoded `Claims` to the handler as an extension.
async fn require_auth(State(service): State<SharedService>, mut req: Request, next: Next) -> Result<Response, ApiError> {
    let claims = service
        .identify(req.headers())
        .ok_or_else(|| IntelliTaskError::Unauthorized("Missing, invalid or expired token".to_string()))?;
    req.extensions_mut().insert(claims);
    Ok(next.run(req).await)
}

// Define API routes
pub fn api_routes(service: SharedService) -> Router {
    let protected_routes = Router::new()
        .route("/todos", get(list_todos).post(create_todo))
        .route("/todos/{id}", put(update_todo).delete(delete_todo))
        .route("/chat", post(chat))
        .route_layer(middleware::from_fn_with_state(service.clone(), require_auth));

    Router::new()
        .route("/auth/signup", post(sign_up))
        .route("/auth/signin", post(sign_in))
        .merge(protected_routes)
        .with_state(service)
}

#[utoipa::path(
    post,
    path = "/api/auth/signup",
    request_body = SignUpRequest,
    responses(
        (status = 201, description = "User created successfully", body = AuthResponse),
        (status = 400, description = "Missing or invalid fields", body = ErrorResponse),
        (status = 409, description = "Email or phone number already registered", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
pub async fn sign_up(
    State(service): State<SharedService>,
    payload: Result<Json<SignUpRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<AuthResponse>), ApiError> {
    let Json(req) = payload?;
    let session = service.register(req.into()).await?;
    Ok((
        StatusCode::CREATED,
        Json(AuthResponse::new(session, "User created successfully")),
    ))
}

#[utoipa::path(
    post,
    path = "/api/auth/signin",
    request_body = SignInRequest,
    responses(
        (status = 200, description = "Login successful", body = AuthResponse),
        (status = 400, description = "Email and password are required", body = ErrorResponse),
        (status = 401, description = "Invalid email or password", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    )
)]
pub async fn sign_in(
    State(service): State<SharedService>,
    payload: Result<Json<SignInRequest>, JsonRejection>,
) -> Result<Json<AuthResponse>, ApiError> {
    let Json(req) = payload?;
    let session = service
        .authenticate(req.email.as_deref(), req.password.as_deref())
        .await?;
    Ok(Json(AuthResponse::new(session, "Login successful")))
}

#[utoipa::path(
    get,
    path = "/api/todos",
    responses(
        (status = 200, description = "Caller's todos, newest first", body = TodoListResponse),
        (status = 401, description = "Authentication required", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    security(("bearer_auth" = []))
)]
pub async fn list_todos(
    State(service): State<SharedService>,
    Extension(identity): Extension<Claims>,
) -> Result<Json<TodoListResponse>, ApiError> {
    let todos = service.list_todos(&identity).await?;
    Ok(Json(TodoListResponse { todos }))
}

#[utoipa::path(
    post,
    path = "/api/todos",
    request_body = TodoRequest,
    responses(
        (status = 201, description = "Todo created", body = TodoResponse),
        (status = 400, description = "Title and description are required", body = ErrorResponse),
        (status = 401, description = "Authentication required", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    security(("bearer_auth" = []))
)]
pub async fn create_todo(
    State(service): State<SharedService>,
    Extension(identity): Extension<Claims>,
    payload: Result<Json<TodoRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<TodoResponse>), ApiError> {
    let Json(req) = payload?;
    let todo = service
        .create_todo(&identity, req.title.as_deref(), req.description.as_deref())
        .await?;
    Ok((StatusCode::CREATED, Json(TodoResponse { todo })))
}

#[utoipa::path(
    put,
    path = "/api/todos/{id}",
    params(
        ("id" = String, Path, description = "ID of the todo to update")
    ),
    request_body = TodoRequest,
    responses(
        (status = 200, description = "Todo updated", body = TodoResponse),
        (status = 400, description = "Invalid id or missing fields", body = ErrorResponse),
        (status = 401, description = "Authentication required", body = ErrorResponse),
        (status = 404, description = "Todo not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    security(("bearer_auth" = []))
)]
pub async fn update_todo(
    State(service): State<SharedService>,
    Extension(identity): Extension<Claims>,
    Path(id): Path<String>,
    payload: Result<Json<TodoRequest>, JsonRejection>,
) -> Result<Json<TodoResponse>, ApiError> {
    let Json(req) = payload?;
    let todo = service
        .update_todo(&identity, &id, req.title.as_deref(), req.description.as_deref())
        .await?;
    Ok(Json(TodoResponse { todo }))
}

#[utoipa::path(
    delete,
    path = "/api/todos/{id}",
    params(
        ("id" = String, Path, description = "ID of the todo to delete")
    ),
    responses(
        (status = 200, description = "Todo deleted", body = DeleteTodoResponse),
        (status = 400, description = "Invalid todo ID format", body = ErrorResponse),
        (status = 401, description = "Authentication required", body = ErrorResponse),
        (status = 404, description = "Todo not found", body = ErrorResponse),
        (status = 500, description = "Internal server error", body = ErrorResponse)
    ),
    security(("bearer_auth" = []))
)]
pub async fn delete_todo(
    State(service): State<SharedService>,
    Extension(identity): Extension<Claims>,
    Path(id): Path<String>,
) -> Result<Json<DeleteTodoResponse>, ApiError> {
    let todo = service.delete_todo(&identity, &id).await?;
    Ok(Json(DeleteTodoResponse {
        message: "Todo deleted successfully".to_string(),
        todo,
    }))
}

#[utoipa::path(
    post,
    path = "/api/chat",
    request_body = ChatRequest,
    responses(
        (status = 200, description = "Assistant reply", body = ChatResponse),
        (status = 400, description = "Message is required", body = ErrorResponse),
        (status = 401, description = "Authentication required", body = ErrorResponse),
        (status = 500, description = "Assistant unavailable or upstream failure", body = ErrorResponse)
    ),
    security(("bearer_auth" = []))
)]
pub async fn chat(
    State(service): State<SharedService>,
    Extension(identity): Extension<Claims>,
    payload: Result<Json<ChatRequest>, JsonRejection>,
) -> Result<Json<ChatResponse>, ApiError> {
    let Json(req) = payload?;
    let message = service.chat(&identity, req.message.as_deref()).await?;
    Ok(Json(ChatResponse { message }))
}
