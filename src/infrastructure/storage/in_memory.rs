use crate::core::errors::IntelliTaskError;
use crate::core::models::{todo::Todo, user::User};
use crate::infrastructure::storage::Storage;
use async_trait::async_trait;
use chrono::Utc;
use std::collections::HashMap;
use tokio::sync::Mutex;

#[derive(Default)]
struct UserTable {
    users: HashMap<String, User>,
    emails: HashMap<String, String>, // email -> user_id
    phones: HashMap<String, String>, // phone -> user_id
}

#[derive(Default)]
pub struct InMemoryStorage {
    users: Mutex<UserTable>,
    todos: Mutex<HashMap<String, Todo>>,
}

impl InMemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl Storage for InMemoryStorage {
    async fn create_user(&self, user: User) -> Result<User, IntelliTaskError> {
        let mut table = self.users.lock().await;
        if table.emails.contains_key(&user.email) {
            return Err(IntelliTaskError::EmailAlreadyRegistered(user.email));
        }
        if table.phones.contains_key(&user.phone_number) {
            return Err(IntelliTaskError::PhoneAlreadyRegistered(user.phone_number));
        }
        table.emails.insert(user.email.clone(), user.id.clone());
        table.phones.insert(user.phone_number.clone(), user.id.clone());
        table.users.insert(user.id.clone(), user.clone());
        Ok(user)
    }

    async fn get_user(&self, user_id: &str) -> Result<Option<User>, IntelliTaskError> {
        Ok(self.users.lock().await.users.get(user_id).cloned())
    }

    async fn get_user_by_email(&self, email: &str) -> Result<Option<User>, IntelliTaskError> {
        let table = self.users.lock().await;
        Ok(table.emails.get(email).and_then(|id| table.users.get(id)).cloned())
    }

    async fn update_password_hash(&self, user_id: &str, password_hash: &str) -> Result<(), IntelliTaskError> {
        let mut table = self.users.lock().await;
        let user = table
            .users
            .get_mut(user_id)
            .ok_or_else(|| IntelliTaskError::UserNotFound(user_id.to_string()))?;
        user.password_hash = password_hash.to_string();
        user.updated_at = Utc::now();
        Ok(())
    }

    async fn list_todos(&self, owner_id: &str) -> Result<Vec<Todo>, IntelliTaskError> {
        let mut todos: Vec<Todo> = self
            .todos
            .lock()
            .await
            .values()
            .filter(|todo| todo.user_id == owner_id)
            .cloned()
            .collect();
        todos.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(todos)
    }

    async fn get_todo(&self, owner_id: &str, todo_id: &str) -> Result<Option<Todo>, IntelliTaskError> {
        Ok(self
            .todos
            .lock()
            .await
            .get(todo_id)
            .filter(|todo| todo.user_id == owner_id)
            .cloned())
    }

    async fn create_todo(&self, todo: Todo) -> Result<Todo, IntelliTaskError> {
        let mut todos = self.todos.lock().await;
        if todos.contains_key(&todo.id) {
            return Err(IntelliTaskError::StorageError(format!("Duplicate todo id {}", todo.id)));
        }
        todos.insert(todo.id.clone(), todo.clone());
        Ok(todo)
    }

    async fn update_todo(
        &self,
        owner_id: &str,
        todo_id: &str,
        title: &str,
        description: &str,
    ) -> Result<Option<Todo>, IntelliTaskError> {
        let mut todos = self.todos.lock().await;
        Ok(todos
            .get_mut(todo_id)
            .filter(|todo| todo.user_id == owner_id)
            .map(|todo| {
                todo.title = title.to_string();
                todo.description = description.to_string();
                todo.updated_at = Utc::now();
                todo.clone()
            }))
    }

    async fn delete_todo(&self, owner_id: &str, todo_id: &str) -> Result<Option<Todo>, IntelliTaskError> {
        let mut todos = self.todos.lock().await;
        if todos.get(todo_id).is_some_and(|todo| todo.user_id == owner_id) {
            Ok(todos.remove(todo_id))
        } else {
            Ok(None)
        }
    }
}
