use crate::core::errors::IntelliTaskError;
use crate::core::models::{todo::Todo, user::User};
use async_trait::async_trait;

/// Record store for users and todos.
///
/// Every todo operation takes the owner's user id and only ever touches
/// records owned by it; a todo owned by someone else behaves as absent.
#[async_trait]
pub trait Storage: Send + Sync {
    /// Inserts the user unless the email or phone number is already taken.
    /// The check and insert are atomic with respect to other registrations.
    async fn create_user(&self, user: User) -> Result<User, IntelliTaskError>;
    async fn get_user(&self, user_id: &str) -> Result<Option<User>, IntelliTaskError>;
    /// Lookup by normalized email, including the password hash.
    async fn get_user_by_email(&self, email: &str) -> Result<Option<User>, IntelliTaskError>;
    async fn update_password_hash(&self, user_id: &str, password_hash: &str) -> Result<(), IntelliTaskError>;

    /// Owner's todos, newest first.
    async fn list_todos(&self, owner_id: &str) -> Result<Vec<Todo>, IntelliTaskError>;
    async fn get_todo(&self, owner_id: &str, todo_id: &str) -> Result<Option<Todo>, IntelliTaskError>;
    async fn create_todo(&self, todo: Todo) -> Result<Todo, IntelliTaskError>;
    async fn update_todo(
        &self,
        owner_id: &str,
        todo_id: &str,
        title: &str,
        description: &str,
    ) -> Result<Option<Todo>, IntelliTaskError>;
    async fn delete_todo(&self, owner_id: &str, todo_id: &str) -> Result<Option<Todo>, IntelliTaskError>;
}

pub mod in_memory;
pub mod sqlite;
