use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Stored user record. `password_hash` never leaves the process.
#[derive(Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: String,
    pub full_name: String,
    pub date_of_birth: NaiveDate,
    pub phone_number: String,
    pub email: String,
    #[serde(skip_serializing, default)]
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl core::fmt::Debug for User {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("User")
            .field("id", &self.id)
            .field("full_name", &self.full_name)
            .field("date_of_birth", &self.date_of_birth)
            .field("phone_number", &self.phone_number)
            .field("email", &self.email)
            .field("password_hash", &"<redacted>")
            .field("created_at", &self.created_at)
            .field("updated_at", &self.updated_at)
            .finish()
    }
}

/// Fields accepted at registration once validated and normalized.
#[derive(Clone)]
pub struct NewUser {
    pub full_name: String,
    pub date_of_birth: NaiveDate,
    pub phone_number: String,
    pub email: String,
    pub password: String,
}

impl core::fmt::Debug for NewUser {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("NewUser")
            .field("full_name", &self.full_name)
            .field("date_of_birth", &self.date_of_birth)
            .field("phone_number", &self.phone_number)
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Public view of a user returned by the auth endpoints.
#[derive(Clone, Debug, Serialize, Deserialize, ToSchema, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub id: String,
    pub full_name: String,
    pub email: String,
    pub phone_number: String,
    #[schema(value_type = String, format = Date)]
    pub date_of_birth: NaiveDate,
}

impl From<&User> for UserProfile {
    fn from(user: &User) -> Self {
        UserProfile {
            id: user.id.clone(),
            full_name: user.full_name.clone(),
            email: user.email.clone(),
            phone_number: user.phone_number.clone(),
            date_of_birth: user.date_of_birth,
        }
    }
}

/// Raw sign-up input; every field is optional until validated.
#[derive(Clone, Default)]
pub struct RegistrationForm {
    pub full_name: Option<String>,
    pub date_of_birth: Option<String>,
    pub phone_number: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
}

impl core::fmt::Debug for RegistrationForm {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("RegistrationForm")
            .field("full_name", &self.full_name)
            .field("date_of_birth", &self.date_of_birth)
            .field("phone_number", &self.phone_number)
            .field("email", &self.email)
            .field("password", &self.password.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}
