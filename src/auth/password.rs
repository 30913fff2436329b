//! Password hashing via bcrypt.

use crate::core::errors::IntelliTaskError;

/// bcrypt cost factor.
pub const BCRYPT_COST: u32 = 10;

/// Hash with a fresh random salt.
pub fn hash_password(password: &str) -> Result<String, IntelliTaskError> {
    hash_password_with_cost(password, BCRYPT_COST)
}

pub fn hash_password_with_cost(password: &str, cost: u32) -> Result<String, IntelliTaskError> {
    bcrypt::hash(password, cost)
        .map_err(|e| IntelliTaskError::InternalServerError(format!("Password hashing error: {}", e)))
}

/// Constant-time comparison against a stored hash.
pub fn verify_password(password: &str, hash: &str) -> Result<bool, IntelliTaskError> {
    bcrypt::verify(password, hash)
        .map_err(|e| IntelliTaskError::InternalServerError(format!("Password verification error: {}", e)))
}

/// True when `hash` was produced with a cost other than `cost`.
/// Unparseable hashes are left alone; verification already failed for them.
pub fn needs_rehash(hash: &str, cost: u32) -> bool {
    hash.split('$')
        .nth(2)
        .and_then(|c| c.parse::<u32>().ok())
        .is_some_and(|current| current != cost)
}
