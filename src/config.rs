use crate::core::errors::IntelliTaskError;
use dotenv::dotenv;
use once_cell::sync::Lazy;
use std::env;

const DEV_JWT_SECRET: &str = "intellitask-dev-secret";

pub struct Config {
    pub host: String,
    pub port: u16,
    pub database_url: String,
    pub log_level: String,
    pub app_env: String,
    pub jwt_secret: Option<String>,
    pub openai_api_key: Option<String>,
    pub openai_base_url: String,
    pub chat_model: String,
    pub embedding_model: String,
    pub embedding_dimensions: usize,
    pub retrieval_top_k: usize,
    pub pinecone_api_key: Option<String>,
    pub pinecone_host: Option<String>,
    /// Variables that were set but did not parse; `validate` rejects them.
    pub invalid_vars: Vec<String>,
}

impl core::fmt::Debug for Config {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Config")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("database_url", &"<redacted>")
            .field("log_level", &self.log_level)
            .field("app_env", &self.app_env)
            .field("jwt_secret", &"<redacted>")
            .field("openai_api_key", &self.openai_api_key.as_ref().map(|_| "<redacted>"))
            .field("openai_base_url", &self.openai_base_url)
            .field("chat_model", &self.chat_model)
            .field("embedding_model", &self.embedding_model)
            .field("embedding_dimensions", &self.embedding_dimensions)
            .field("retrieval_top_k", &self.retrieval_top_k)
            .field("pinecone_api_key", &self.pinecone_api_key.as_ref().map(|_| "<redacted>"))
            .field("pinecone_host", &self.pinecone_host)
            .field("invalid_vars", &self.invalid_vars)
            .finish()
    }
}

fn non_empty(key: &str) -> Option<String> {
    env::var(key).ok().map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}

/// Absent or blank means `default`; anything else must parse or `key` is recorded as invalid.
fn parse_or<T: std::str::FromStr>(key: &str, raw: Option<String>, default: T, invalid: &mut Vec<String>) -> T {
    match raw.as_deref().map(str::trim).filter(|v| !v.is_empty()) {
        None => default,
        Some(value) => value.parse().unwrap_or_else(|_| {
            invalid.push(format!("{}={}", key, value));
            default
        }),
    }
}

impl Config {
    pub fn from_env() -> Self {
        dotenv().ok();

        let mut invalid_vars = Vec::new();
        let port = parse_or("PORT", env::var("PORT").ok(), 3000u16, &mut invalid_vars);
        let embedding_dimensions = parse_or(
            "EMBEDDING_DIMENSIONS",
            env::var("EMBEDDING_DIMENSIONS").ok(),
            1536usize,
            &mut invalid_vars,
        );
        let retrieval_top_k = parse_or(
            "RETRIEVAL_TOP_K",
            env::var("RETRIEVAL_TOP_K").ok(),
            crate::core::assistant::DEFAULT_TOP_K,
            &mut invalid_vars,
        );

        Self {
            host: non_empty("HOST").unwrap_or_else(|| "127.0.0.1".to_string()),
            port,
            database_url: non_empty("DATABASE_URL").unwrap_or_else(|| "sqlite::memory:".to_string()),
            log_level: non_empty("LOG_LEVEL").unwrap_or_else(|| "info".to_string()),
            app_env: non_empty("APP_ENV").unwrap_or_else(|| "development".to_string()),
            jwt_secret: non_empty("JWT_SECRET"),
            openai_api_key: non_empty("OPENAI_API_KEY"),
            openai_base_url: non_empty("OPENAI_BASE_URL")
                .unwrap_or_else(|| crate::infrastructure::ai::openai::DEFAULT_BASE_URL.to_string()),
            chat_model: non_empty("CHAT_MODEL").unwrap_or_else(|| "gpt-4o-mini".to_string()),
            embedding_model: non_empty("EMBEDDING_MODEL").unwrap_or_else(|| "text-embedding-3-small".to_string()),
            embedding_dimensions,
            retrieval_top_k,
            pinecone_api_key: non_empty("PINECONE_API_KEY"),
            pinecone_host: non_empty("PINECONE_HOST"),
            invalid_vars,
        }
    }

    pub fn is_production(&self) -> bool {
        self.app_env.eq_ignore_ascii_case("production")
    }

    /// `DATABASE_URL=memory` selects the in-process store.
    pub fn uses_in_memory_storage(&self) -> bool {
        self.database_url.eq_ignore_ascii_case("memory")
    }

    pub fn chat_enabled(&self) -> bool {
        self.openai_api_key.is_some()
    }

    pub fn pinecone(&self) -> Option<(&str, &str)> {
        match (&self.pinecone_host, &self.pinecone_api_key) {
            (Some(host), Some(key)) => Some((host.as_str(), key.as_str())),
            _ => None,
        }
    }

    /// Production refuses to start without an explicit signing secret.
    pub fn validate(&self) -> Result<(), IntelliTaskError> {
        if !self.invalid_vars.is_empty() {
            return Err(IntelliTaskError::ConfigError(format!(
                "Malformed environment variables: {}",
                self.invalid_vars.join(", ")
            )));
        }
        if self.is_production() && self.jwt_secret.is_none() {
            return Err(IntelliTaskError::ConfigError(
                "JWT_SECRET must be set when APP_ENV=production".to_string(),
            ));
        }
        if self.embedding_dimensions == 0 {
            return Err(IntelliTaskError::ConfigError(
                "EMBEDDING_DIMENSIONS must be positive".to_string(),
            ));
        }
        Ok(())
    }

    pub fn jwt_secret(&self) -> &str {
        self.jwt_secret.as_deref().unwrap_or(DEV_JWT_SECRET)
    }
}

// Global static accessible everywhere
pub static CONFIG: Lazy<Config> = Lazy::new(Config::from_env);
