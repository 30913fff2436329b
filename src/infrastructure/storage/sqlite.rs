use crate::core::errors::IntelliTaskError;
use crate::core::models::{todo::Todo, user::User};
use crate::infrastructure::storage::Storage;
use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use sqlx::FromRow;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use std::str::FromStr;
use std::time::Duration;
use tracing::debug;

const SCHEMA: [&str; 3] = [
    "CREATE TABLE IF NOT EXISTS users (
        id TEXT PRIMARY KEY NOT NULL,
        full_name TEXT NOT NULL,
        date_of_birth TEXT NOT NULL,
        email TEXT NOT NULL UNIQUE,
        phone_number TEXT NOT NULL UNIQUE,
        password_hash TEXT NOT NULL,
        created_at TEXT NOT NULL,
        updated_at TEXT NOT NULL
    )",
    "CREATE TABLE IF NOT EXISTS todos (
        id TEXT PRIMARY KEY NOT NULL,
        title TEXT NOT NULL,
        description TEXT NOT NULL,
        user_id TEXT NOT NULL REFERENCES users (id),
        email TEXT NOT NULL,
        created_at TEXT NOT NULL,
        updated_at TEXT NOT NULL
    )",
    "CREATE INDEX IF NOT EXISTS idx_todos_owner_created ON todos (user_id, created_at DESC)",
];

const TODO_COLUMNS: &str = "id, title, description, user_id, email, created_at, updated_at";

#[derive(FromRow)]
struct UserRow {
    id: String,
    full_name: String,
    date_of_birth: NaiveDate,
    phone_number: String,
    email: String,
    password_hash: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<UserRow> for User {
    fn from(row: UserRow) -> Self {
        User {
            id: row.id,
            full_name: row.full_name,
            date_of_birth: row.date_of_birth,
            phone_number: row.phone_number,
            email: row.email,
            password_hash: row.password_hash,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

#[derive(FromRow)]
struct TodoRow {
    id: String,
    title: String,
    description: String,
    user_id: String,
    email: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<TodoRow> for Todo {
    fn from(row: TodoRow) -> Self {
        Todo {
            id: row.id,
            title: row.title,
            description: row.description,
            user_id: row.user_id,
            email: row.email,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

/// SQLite-backed store. Uniqueness of email and phone is enforced by the schema.
pub struct SqliteStorage {
    pool: SqlitePool,
}

impl SqliteStorage {
    pub async fn connect(database_url: &str) -> Result<Self, IntelliTaskError> {
        let options = SqliteConnectOptions::from_str(database_url)?
            .create_if_missing(true)
            .foreign_keys(true)
            .busy_timeout(Duration::from_secs(5));

        // Every connection to `:memory:` opens its own database, so keep exactly one alive.
        let in_memory = database_url.contains(":memory:") || database_url.contains("mode=memory");
        let pool_options = if in_memory {
            SqlitePoolOptions::new()
                .max_connections(1)
                .min_connections(1)
                .idle_timeout(None::<Duration>)
                .max_lifetime(None::<Duration>)
        } else {
            SqlitePoolOptions::new().max_connections(5)
        };

        let pool = pool_options.connect_with(options).await?;
        let storage = SqliteStorage { pool };
        storage.init_schema().await?;
        Ok(storage)
    }

    async fn init_schema(&self) -> Result<(), IntelliTaskError> {
        for statement in SCHEMA {
            sqlx::query(statement).execute(&self.pool).await?;
        }
        debug!("sqlite schema ready");
        Ok(())
    }
}

fn map_user_insert_error(err: sqlx::Error, user: &User) -> IntelliTaskError {
    if let sqlx::Error::Database(db_err) = &err {
        if db_err.is_unique_violation() {
            let message = db_err.message();
            if message.contains("users.email") {
                return IntelliTaskError::EmailAlreadyRegistered(user.email.clone());
            }
            if message.contains("users.phone_number") {
                return IntelliTaskError::PhoneAlreadyRegistered(user.phone_number.clone());
            }
        }
    }
    err.into()
}

#[async_trait]
impl Storage for SqliteStorage {
    async fn create_user(&self, user: User) -> Result<User, IntelliTaskError> {
        // One statement; the UNIQUE constraints decide conflicts.
        sqlx::query(
            "INSERT INTO users (id, full_name, date_of_birth, email, phone_number, password_hash, created_at, updated_at)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(&user.id)
        .bind(&user.full_name)
        .bind(user.date_of_birth)
        .bind(&user.email)
        .bind(&user.phone_number)
        .bind(&user.password_hash)
        .bind(user.created_at)
        .bind(user.updated_at)
        .execute(&self.pool)
        .await
        .map_err(|e| map_user_insert_error(e, &user))?;
        Ok(user)
    }

    async fn get_user(&self, user_id: &str) -> Result<Option<User>, IntelliTaskError> {
        let row: Option<UserRow> = sqlx::query_as("SELECT * FROM users WHERE id = ?")
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.map(User::from))
    }

    async fn get_user_by_email(&self, email: &str) -> Result<Option<User>, IntelliTaskError> {
        let row: Option<UserRow> = sqlx::query_as("SELECT * FROM users WHERE email = ?")
            .bind(email)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.map(User::from))
    }

    async fn update_password_hash(&self, user_id: &str, password_hash: &str) -> Result<(), IntelliTaskError> {
        let result = sqlx::query("UPDATE users SET password_hash = ?, updated_at = ? WHERE id = ?")
            .bind(password_hash)
            .bind(Utc::now())
            .bind(user_id)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(IntelliTaskError::UserNotFound(user_id.to_string()));
        }
        Ok(())
    }

    async fn list_todos(&self, owner_id: &str) -> Result<Vec<Todo>, IntelliTaskError> {
        let rows: Vec<TodoRow> = sqlx::query_as(&format!(
            "SELECT {} FROM todos WHERE user_id = ? ORDER BY created_at DESC, rowid DESC",
            TODO_COLUMNS
        ))
        .bind(owner_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.into_iter().map(Todo::from).collect())
    }

    async fn get_todo(&self, owner_id: &str, todo_id: &str) -> Result<Option<Todo>, IntelliTaskError> {
        let row: Option<TodoRow> = sqlx::query_as(&format!(
            "SELECT {} FROM todos WHERE id = ? AND user_id = ?",
            TODO_COLUMNS
        ))
        .bind(todo_id)
        .bind(owner_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.map(Todo::from))
    }

    async fn create_todo(&self, todo: Todo) -> Result<Todo, IntelliTaskError> {
        sqlx::query(
            "INSERT INTO todos (id, title, description, user_id, email, created_at, updated_at)
             VALUES (?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(&todo.id)
        .bind(&todo.title)
        .bind(&todo.description)
        .bind(&todo.user_id)
        .bind(&todo.email)
        .bind(todo.created_at)
        .bind(todo.updated_at)
        .execute(&self.pool)
        .await?;
        Ok(todo)
    }

    async fn update_todo(
        &self,
        owner_id: &str,
        todo_id: &str,
        title: &str,
        description: &str,
    ) -> Result<Option<Todo>, IntelliTaskError> {
        let row: Option<TodoRow> = sqlx::query_as(&format!(
            "UPDATE todos SET title = ?, description = ?, updated_at = ? WHERE id = ? AND user_id = ? RETURNING {}",
            TODO_COLUMNS
        ))
        .bind(title)
        .bind(description)
        .bind(Utc::now())
        .bind(todo_id)
        .bind(owner_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.map(Todo::from))
    }

    async fn delete_todo(&self, owner_id: &str, todo_id: &str) -> Result<Option<Todo>, IntelliTaskError> {
        let row: Option<TodoRow> = sqlx::query_as(&format!(
            "DELETE FROM todos WHERE id = ? AND user_id = ? RETURNING {}",
            TODO_COLUMNS
        ))
        .bind(todo_id)
        .bind(owner_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.map(Todo::from))
    }
}
