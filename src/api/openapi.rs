use utoipa::{
    Modify, OpenApi,
    openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme},
};

use crate::{
    api::models::{
        AuthResponse, ChatRequest, ChatResponse, DeleteTodoResponse, ErrorResponse, SignInRequest, SignUpRequest,
        TodoListResponse, TodoRequest, TodoResponse,
    },
    core::models::{todo::Todo, user::UserProfile},
};

struct BearerSecurity;

impl Modify for BearerSecurity {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            );
        }
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(
        super::handlers::sign_up,
        super::handlers::sign_in,
        super::handlers::list_todos,
        super::handlers::create_todo,
        super::handlers::update_todo,
        super::handlers::delete_todo,
        super::handlers::chat
    ),
    components(schemas(
        SignUpRequest,
        SignInRequest,
        TodoRequest,
        ChatRequest,
        AuthResponse,
        TodoListResponse,
        TodoResponse,
        DeleteTodoResponse,
        ChatResponse,
        ErrorResponse,
        UserProfile,
        Todo
    )),
    modifiers(&BearerSecurity),
    info(
        title = "IntelliTask API",
        description = "Todo lists with email/password accounts and a retrieval-backed chat assistant",
        version = "0.1.0"
    )
)]
pub struct ApiDoc;
