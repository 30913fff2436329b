use crate::auth::jwt::{Claims, JwtService};
use crate::auth::password::{self, BCRYPT_COST};
use crate::core::assistant::RetrievalAssistant;
use crate::core::errors::IntelliTaskError;
use crate::core::models::{
    todo::Todo,
    user::{RegistrationForm, User, UserProfile},
};
use crate::core::validation;
use crate::infrastructure::storage::Storage;
use chrono::Utc;
use http::HeaderMap;
use std::sync::Arc;
use tokio::sync::OnceCell;
use tracing::{debug, info, warn};
use uuid::Uuid;

const DUMMY_PASSWORD: &str = "intellitask-timing-equalizer";

/// Outcome of a successful registration or sign-in.
#[derive(Debug, Clone)]
pub struct AuthSession {
    pub user: UserProfile,
    pub token: String,
}

pub struct IntelliTaskService {
    storage: Arc<dyn Storage>,
    jwt_service: JwtService,
    assistant: Option<RetrievalAssistant>,
    bcrypt_cost: u32,
    /// Hash at `bcrypt_cost` verified against when the email is unknown.
    dummy_hash: OnceCell<String>,
}

impl IntelliTaskService {
    pub fn new(storage: Arc<dyn Storage>, jwt_secret: &str) -> Self {
        IntelliTaskService {
            storage,
            jwt_service: JwtService::new(jwt_secret),
            assistant: None,
            bcrypt_cost: BCRYPT_COST,
            dummy_hash: OnceCell::new(),
        }
    }

    pub fn with_assistant(mut self, assistant: RetrievalAssistant) -> Self {
        self.assistant = Some(assistant);
        self
    }

    /// Lower costs are only meant for tests.
    pub fn with_bcrypt_cost(mut self, cost: u32) -> Self {
        self.bcrypt_cost = cost;
        self
    }

    pub fn assistant_enabled(&self) -> bool {
        self.assistant.is_some()
    }

    pub fn validate_token(&self, token: &str) -> Result<Claims, IntelliTaskError> {
        self.jwt_service.validate_token(token)
    }

    /// Caller identity from the request headers, `None` if unauthenticated.
    pub fn identify(&self, headers: &HeaderMap) -> Option<Claims> {
        crate::auth::identify(&self.jwt_service, headers)
    }

    pub async fn register(&self, form: RegistrationForm) -> Result<AuthSession, IntelliTaskError> {
        let new_user = validation::validate_registration(&form, Utc::now().date_naive())?;

        let password_hash = self.hash_password(new_user.password).await?;
        let now = Utc::now();
        let user = User {
            id: Uuid::new_v4().to_string(),
            full_name: new_user.full_name,
            date_of_birth: new_user.date_of_birth,
            phone_number: new_user.phone_number,
            email: new_user.email,
            password_hash,
            created_at: now,
            updated_at: now,
        };

        let user = self.storage.create_user(user).await.inspect_err(|e| {
            if matches!(
                e,
                IntelliTaskError::EmailAlreadyRegistered(_) | IntelliTaskError::PhoneAlreadyRegistered(_)
            ) {
                warn!("registration rejected: duplicate email or phone");
            }
        })?;
        info!(user_id = %user.id, "user registered");

        self.issue_session(&user)
    }

    /// Unknown email and wrong password fail identically.
    pub async fn authenticate(
        &self,
        email: Option<&str>,
        password: Option<&str>,
    ) -> Result<AuthSession, IntelliTaskError> {
        let (Some(email), Some(password)) = (
            validation::present(email),
            password.filter(|p| !p.is_empty()),
        ) else {
            return Err(IntelliTaskError::MissingFields(
                "Email and password are required".to_string(),
            ));
        };

        let email = validation::normalize_email(email);
        let Some(user) = self.storage.get_user_by_email(&email).await? else {
            // Pay for a full verify so unknown emails cost as much as wrong passwords.
            let dummy = self.dummy_hash().await?.to_string();
            let _ = self.verify_password(password.to_string(), dummy).await?;
            debug!(reason = "unknown email");
            warn!("sign-in rejected: invalid credentials");
            return Err(IntelliTaskError::InvalidCredentials);
        };

        if !self.verify_password(password.to_string(), user.password_hash.clone()).await? {
            debug!(user_id = %user.id, reason = "wrong password");
            warn!("sign-in rejected: invalid credentials");
            return Err(IntelliTaskError::InvalidCredentials);
        }

        if password::needs_rehash(&user.password_hash, self.bcrypt_cost) {
            self.upgrade_hash(&user.id, password.to_string()).await;
        }

        info!(user_id = %user.id, "user signed in");
        self.issue_session(&user)
    }

    pub async fn get_user(&self, user_id: &str) -> Result<Option<User>, IntelliTaskError> {
        self.storage.get_user(user_id).await
    }

    pub async fn list_todos(&self, identity: &Claims) -> Result<Vec<Todo>, IntelliTaskError> {
        self.storage.list_todos(&identity.user_id).await
    }

    pub async fn create_todo(
        &self,
        identity: &Claims,
        title: Option<&str>,
        description: Option<&str>,
    ) -> Result<Todo, IntelliTaskError> {
        let (title, description) = validation::validate_todo_fields(title, description)?;
        let now = Utc::now();
        let todo = self
            .storage
            .create_todo(Todo {
                id: Uuid::new_v4().to_string(),
                title,
                description,
                user_id: identity.user_id.clone(),
                email: identity.email.clone(),
                created_at: now,
                updated_at: now,
            })
            .await?;
        info!(user_id = %identity.user_id, todo_id = %todo.id, "todo created");

        self.sync_index(&todo).await;
        Ok(todo)
    }

    /// A todo the caller does not own is reported as not found.
    pub async fn update_todo(
        &self,
        identity: &Claims,
        todo_id: &str,
        title: Option<&str>,
        description: Option<&str>,
    ) -> Result<Todo, IntelliTaskError> {
        let todo_id = validation::parse_todo_id(todo_id)?;
        let (title, description) = validation::validate_todo_fields(title, description)?;

        let todo = self
            .storage
            .update_todo(&identity.user_id, &todo_id, &title, &description)
            .await?
            .ok_or_else(|| IntelliTaskError::TodoNotFound(todo_id.clone()))?;
        info!(user_id = %identity.user_id, todo_id = %todo.id, "todo updated");

        self.sync_index(&todo).await;
        Ok(todo)
    }

    pub async fn delete_todo(&self, identity: &Claims, todo_id: &str) -> Result<Todo, IntelliTaskError> {
        let todo_id = validation::parse_todo_id(todo_id)?;
        let todo = self
            .storage
            .delete_todo(&identity.user_id, &todo_id)
            .await?
            .ok_or_else(|| IntelliTaskError::TodoNotFound(todo_id.clone()))?;
        info!(user_id = %identity.user_id, todo_id = %todo.id, "todo deleted");

        if let Some(assistant) = &self.assistant {
            if let Err(e) = assistant.forget_todo(&todo.id).await {
                warn!(todo_id = %todo.id, error = %e, "failed to remove todo from retrieval index");
            }
        }
        Ok(todo)
    }

    pub async fn chat(&self, identity: &Claims, message: Option<&str>) -> Result<String, IntelliTaskError> {
        let message = validation::validate_chat_message(message)?;
        let assistant = self
            .assistant
            .as_ref()
            .ok_or(IntelliTaskError::AssistantNotConfigured)?;
        assistant.answer(&identity.user_id, &message).await
    }

    fn issue_session(&self, user: &User) -> Result<AuthSession, IntelliTaskError> {
        let token = self.jwt_service.generate_token(&user.id, &user.email)?;
        Ok(AuthSession {
            user: UserProfile::from(user),
            token,
        })
    }

    /// Index failures never fail the todo request.
    async fn sync_index(&self, todo: &Todo) {
        let Some(assistant) = &self.assistant else {
            return;
        };
        if let Err(e) = assistant.index_todo(todo).await {
            warn!(todo_id = %todo.id, error = %e, "failed to sync todo to retrieval index");
            return;
        }

        // A delete may have finished while the embedding was in flight.
        match self.storage.get_todo(&todo.user_id, &todo.id).await {
            Ok(Some(_)) => {}
            Ok(None) => {
                debug!(todo_id = %todo.id, "todo deleted during index sync");
                if let Err(e) = assistant.forget_todo(&todo.id).await {
                    warn!(todo_id = %todo.id, error = %e, "failed to remove todo from retrieval index");
                }
            }
            Err(e) => warn!(todo_id = %todo.id, error = %e, "failed to re-check todo after index sync"),
        }
    }

    async fn dummy_hash(&self) -> Result<&str, IntelliTaskError> {
        self.dummy_hash
            .get_or_try_init(|| self.hash_password(DUMMY_PASSWORD.to_string()))
            .await
            .map(String::as_str)
    }

    /// Re-hashes at the configured cost. Failure leaves the old hash in place.
    async fn upgrade_hash(&self, user_id: &str, plain: String) {
        let result = match self.hash_password(plain).await {
            Ok(hash) => self.storage.update_password_hash(user_id, &hash).await,
            Err(e) => Err(e),
        };
        match result {
            Ok(()) => info!(user_id, cost = self.bcrypt_cost, "password hash upgraded"),
            Err(e) => warn!(user_id, error = %e, "failed to upgrade password hash"),
        }
    }

    // bcrypt is CPU-bound; keep it off the async workers.
    async fn hash_password(&self, plain: String) -> Result<String, IntelliTaskError> {
        let cost = self.bcrypt_cost;
        tokio::task::spawn_blocking(move || password::hash_password_with_cost(&plain, cost))
            .await
            .map_err(|e| IntelliTaskError::InternalServerError(format!("Hashing task failed: {}", e)))?
    }

    async fn verify_password(&self, plain: String, hash: String) -> Result<bool, IntelliTaskError> {
        tokio::task::spawn_blocking(move || password::verify_password(&plain, &hash))
            .await
            .map_err(|e| IntelliTaskError::InternalServerError(format!("Verification task failed: {}", e)))?
    }
}
