use chrono::{DateTime, Months, NaiveDate};
use once_cell::sync::Lazy;
use regex::Regex;
use uuid::Uuid;

use crate::core::errors::{FieldError, IntelliTaskError};
use crate::core::models::user::{NewUser, RegistrationForm};

pub const MIN_FULL_NAME_LENGTH: usize = 3;
pub const MAX_FULL_NAME_LENGTH: usize = 100;
pub const MIN_PASSWORD_LENGTH: usize = 8;
pub const MAX_PASSWORD_LENGTH: usize = 72; // bcrypt truncates beyond this
pub const MAX_EMAIL_LENGTH: usize = 254;
pub const MAX_TITLE_LENGTH: usize = 200;
pub const MAX_DESCRIPTION_LENGTH: usize = 2000;
pub const MAX_CHAT_MESSAGE_LENGTH: usize = 2000;

const PASSWORD_SPECIALS: &str = "@$!%*?&";
const DISPOSABLE_EMAILS: [&str; 2] = ["test@mailinator.com", "test@tempmail.com"];

static PHONE_REGEX: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\+\d{7,15}$").expect("valid phone regex"));
static EMAIL_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]{2,}$").expect("valid email regex"));
static PASSWORD_CHARSET_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z\d@$!%*?&]+$").expect("valid password regex"));

/// Returns the trimmed value, or `None` when absent or blank.
pub fn present(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

/// Emails are matched case-insensitively and without surrounding whitespace.
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

pub fn validate_full_name(full_name: &str) -> Result<String, IntelliTaskError> {
    let name = full_name.trim();
    let length = name.chars().count();
    if length < MIN_FULL_NAME_LENGTH {
        return Err(invalid(
            "fullName",
            "Invalid full name",
            format!("Full name must be at least {} characters", MIN_FULL_NAME_LENGTH),
        ));
    }
    if length > MAX_FULL_NAME_LENGTH {
        return Err(invalid(
            "fullName",
            "Full name too long",
            format!("Full name cannot exceed {} characters", MAX_FULL_NAME_LENGTH),
        ));
    }
    if name.chars().any(char::is_control) {
        return Err(invalid(
            "fullName",
            "Invalid full name",
            "Full name contains invalid characters",
        ));
    }
    Ok(name.to_string())
}

/// Accepts `YYYY-MM-DD` or an RFC 3339 timestamp (date part is used).
pub fn parse_date_of_birth(value: &str, today: NaiveDate) -> Result<NaiveDate, IntelliTaskError> {
    let value = value.trim();
    let date = NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .ok()
        .or_else(|| DateTime::parse_from_rfc3339(value).ok().map(|dt| dt.date_naive()))
        .ok_or_else(|| invalid("dateOfBirth", "Invalid date of birth", "Date of birth must be a valid date"))?;

    if date > today {
        return Err(invalid(
            "dateOfBirth",
            "Invalid date of birth",
            "Date of birth cannot be in the future",
        ));
    }
    let one_year_ago = today.checked_sub_months(Months::new(12)).unwrap_or(today);
    if date > one_year_ago {
        return Err(invalid(
            "dateOfBirth",
            "Invalid date of birth",
            "You must be at least 1 year old",
        ));
    }
    Ok(date)
}

pub fn validate_phone_number(phone_number: &str) -> Result<String, IntelliTaskError> {
    let phone = phone_number.trim();
    if !PHONE_REGEX.is_match(phone) {
        return Err(invalid(
            "phoneNumber",
            "Invalid phone number",
            "Phone number must include a country code, e.g. +15551234567",
        ));
    }
    Ok(phone.to_string())
}

/// Validates format and returns the normalized address.
pub fn validate_email(email: &str) -> Result<String, IntelliTaskError> {
    let email = normalize_email(email);
    if email.len() > MAX_EMAIL_LENGTH || !EMAIL_REGEX.is_match(&email) {
        return Err(invalid("email", "Invalid email", "Email must include a valid domain"));
    }
    if DISPOSABLE_EMAILS.contains(&email.as_str()) {
        return Err(invalid("email", "Invalid email", "Disposable emails are not allowed"));
    }
    Ok(email)
}

pub fn validate_password(password: &str) -> Result<(), IntelliTaskError> {
    let rules = format!(
        "Password must contain at least {} characters, one lowercase letter, one uppercase letter, one digit and one of {}",
        MIN_PASSWORD_LENGTH, PASSWORD_SPECIALS
    );
    if password.len() < MIN_PASSWORD_LENGTH
        || !PASSWORD_CHARSET_REGEX.is_match(password)
        || !password.chars().any(|c| c.is_ascii_lowercase())
        || !password.chars().any(|c| c.is_ascii_uppercase())
        || !password.chars().any(|c| c.is_ascii_digit())
        || !password.chars().any(|c| PASSWORD_SPECIALS.contains(c))
    {
        return Err(invalid("password", "Weak password", rules));
    }
    if password.len() > MAX_PASSWORD_LENGTH {
        return Err(invalid(
            "password",
            "Password too long",
            format!("Password cannot exceed {} characters", MAX_PASSWORD_LENGTH),
        ));
    }
    Ok(())
}

/// Presence first ("All fields are required"), then per-field rules.
pub fn validate_registration(form: &RegistrationForm, today: NaiveDate) -> Result<NewUser, IntelliTaskError> {
    let (Some(full_name), Some(date_of_birth), Some(phone_number), Some(email), Some(password)) = (
        present(form.full_name.as_deref()),
        present(form.date_of_birth.as_deref()),
        present(form.phone_number.as_deref()),
        present(form.email.as_deref()),
        form.password.as_deref().filter(|p| !p.is_empty()),
    ) else {
        return Err(IntelliTaskError::MissingFields("All fields are required".to_string()));
    };

    let full_name = validate_full_name(full_name)?;
    let date_of_birth = parse_date_of_birth(date_of_birth, today)?;
    let phone_number = validate_phone_number(phone_number)?;
    let email = validate_email(email)?;
    validate_password(password)?;

    Ok(NewUser {
        full_name,
        date_of_birth,
        phone_number,
        email,
        password: password.to_string(),
    })
}

/// Returns trimmed `(title, description)`.
pub fn validate_todo_fields(
    title: Option<&str>,
    description: Option<&str>,
) -> Result<(String, String), IntelliTaskError> {
    let (Some(title), Some(description)) = (present(title), present(description)) else {
        return Err(IntelliTaskError::MissingFields(
            "Title and description are required".to_string(),
        ));
    };
    if title.chars().count() > MAX_TITLE_LENGTH {
        return Err(invalid(
            "title",
            "Title too long",
            format!("Title cannot exceed {} characters", MAX_TITLE_LENGTH),
        ));
    }
    if description.chars().count() > MAX_DESCRIPTION_LENGTH {
        return Err(invalid(
            "description",
            "Description too long",
            format!("Description cannot exceed {} characters", MAX_DESCRIPTION_LENGTH),
        ));
    }
    Ok((title.to_string(), description.to_string()))
}

pub fn parse_todo_id(id: &str) -> Result<String, IntelliTaskError> {
    Uuid::parse_str(id)
        .map(|uuid| uuid.to_string())
        .map_err(|_| IntelliTaskError::InvalidTodoId(id.to_string()))
}

pub fn validate_chat_message(message: Option<&str>) -> Result<String, IntelliTaskError> {
    let message = present(message).ok_or_else(|| IntelliTaskError::MissingFields("Message is required".to_string()))?;
    if message.chars().count() > MAX_CHAT_MESSAGE_LENGTH {
        return Err(invalid(
            "message",
            "Message too long",
            format!("Message cannot exceed {} characters", MAX_CHAT_MESSAGE_LENGTH),
        ));
    }
    Ok(message.to_string())
}

fn invalid(field: &str, title: &str, description: impl Into<String>) -> IntelliTaskError {
    IntelliTaskError::InvalidInput(field.to_string(), FieldError::new(field, title, description))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 6, 15).unwrap()
    }

    #[test]
    fn test_phone_number_requires_plus_and_digits() {
        assert_eq!(validate_phone_number("+10000000000").unwrap(), "+10000000000");
        assert!(validate_phone_number("10000000000").is_err());
        assert!(validate_phone_number("+123456").is_err());
        assert!(validate_phone_number("+1234567890123456").is_err());
        assert!(validate_phone_number("+1 555 123 4567").is_err());
    }

    #[test]
    fn test_email_is_normalized_and_checked() {
        assert_eq!(validate_email("  A@X.com ").unwrap(), "a@x.com");
        assert!(validate_email("a@x").is_err());
        assert!(validate_email("a@x.c").is_err());
        assert!(validate_email("no-at-sign.com").is_err());
        assert!(validate_email("Test@Mailinator.com").is_err());
    }

    #[test]
    fn test_password_rules() {
        assert!(validate_password("Aa1!aaaa").is_ok());
        assert!(validate_password("Aa1!aaa").is_err());
        assert!(validate_password("aa1!aaaa").is_err());
        assert!(validate_password("AA1!AAAA").is_err());
        assert!(validate_password("Aaa!aaaa").is_err());
        assert!(validate_password("Aa1aaaaa").is_err());
        assert!(validate_password("Aa1!aaaa#").is_err());
    }

    #[test]
    fn test_date_of_birth_formats_and_bounds() {
        let expected = NaiveDate::from_ymd_opt(1990, 5, 1).unwrap();
        assert_eq!(parse_date_of_birth("1990-05-01", today()).unwrap(), expected);
        assert_eq!(
            parse_date_of_birth("1990-05-01T00:00:00.000Z", today()).unwrap(),
            expected
        );
        assert!(parse_date_of_birth("2030-01-01", today()).is_err());
        assert!(parse_date_of_birth("2025-01-01", today()).is_err());
        assert!(parse_date_of_birth("2024-06-15", today()).is_ok());
        assert!(parse_date_of_birth("not a date", today()).is_err());
    }

    #[test]
    fn test_full_name_is_trimmed() {
        assert_eq!(validate_full_name("  Ada Lovelace ").unwrap(), "Ada Lovelace");
        assert!(validate_full_name("  Al ").is_err());
    }

    fn form() -> RegistrationForm {
        RegistrationForm {
            full_name: Some("Ada Lovelace".to_string()),
            date_of_birth: Some("1990-05-01".to_string()),
            phone_number: Some("+10000000000".to_string()),
            email: Some("Ada@X.com".to_string()),
            password: Some("Aa1!aaaa".to_string()),
        }
    }

    #[test]
    fn test_registration_normalizes_fields() {
        let user = validate_registration(&form(), today()).unwrap();
        assert_eq!(user.email, "ada@x.com");
        assert_eq!(user.full_name, "Ada Lovelace");
        assert_eq!(user.password, "Aa1!aaaa");
    }

    #[test]
    fn test_registration_requires_every_field() {
        let mut missing_phone = form();
        missing_phone.phone_number = None;
        let mut blank_name = form();
        blank_name.full_name = Some("   ".to_string());
        for form in [missing_phone, blank_name] {
            match validate_registration(&form, today()) {
                Err(IntelliTaskError::MissingFields(msg)) => assert_eq!(msg, "All fields are required"),
                other => panic!("expected MissingFields, got {:?}", other),
            }
        }
    }

    #[test]
    fn test_registration_reports_first_invalid_field() {
        let mut bad = form();
        bad.phone_number = Some("555-1234".to_string());
        assert!(matches!(
            validate_registration(&bad, today()),
            Err(IntelliTaskError::InvalidInput(field, _)) if field == "phoneNumber"
        ));
    }

    #[test]
    fn test_todo_fields() {
        assert_eq!(
            validate_todo_fields(Some(" Buy milk "), Some("2 liters")).unwrap(),
            ("Buy milk".to_string(), "2 liters".to_string())
        );
        assert!(matches!(
            validate_todo_fields(Some("   "), Some("x")),
            Err(IntelliTaskError::MissingFields(_))
        ));
        assert!(matches!(
            validate_todo_fields(Some("x"), None),
            Err(IntelliTaskError::MissingFields(_))
        ));
        let long_title = "t".repeat(MAX_TITLE_LENGTH + 1);
        assert!(matches!(
            validate_todo_fields(Some(&long_title), Some("x")),
            Err(IntelliTaskError::InvalidInput(field, _)) if field == "title"
        ));
    }

    #[test]
    fn test_todo_id_must_be_uuid() {
        let id = Uuid::new_v4().to_string();
        assert_eq!(parse_todo_id(&id).unwrap(), id);
        assert!(matches!(parse_todo_id("123"), Err(IntelliTaskError::InvalidTodoId(_))));
    }
}
