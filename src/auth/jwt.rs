use crate::core::errors::IntelliTaskError;
use chrono::{Duration, Utc};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Session lifetime: 7 days.
pub const SESSION_TTL_SECS: i64 = 7 * 24 * 60 * 60;

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Claims {
    pub user_id: String,
    pub email: String,
    pub iat: i64,
    pub exp: i64,
    /// Random per-token id so two tokens minted in the same second differ.
    pub jti: String,
}

pub struct JwtService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    ttl: Duration,
}

impl JwtService {
    pub fn new(secret: &str) -> Self {
        Self::with_ttl(secret, Duration::seconds(SESSION_TTL_SECS))
    }

    pub fn with_ttl(secret: &str, ttl: Duration) -> Self {
        JwtService {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            ttl,
        }
    }

    pub fn generate_token(&self, user_id: &str, email: &str) -> Result<String, IntelliTaskError> {
        let now = Utc::now();
        let claims = Claims {
            user_id: user_id.to_string(),
            email: email.to_string(),
            iat: now.timestamp(),
            exp: (now + self.ttl).timestamp(),
            jti: Uuid::new_v4().to_string(),
        };

        encode(&Header::default(), &claims, &self.encoding_key)
            .map_err(|e| IntelliTaskError::TokenError(format!("JWT encoding error: {}", e)))
    }

    /// Returns the claims of a token whose signature and expiry both check out.
    pub fn validate_token(&self, token: &str) -> Result<Claims, IntelliTaskError> {
        let mut validation = Validation::default();
        validation.leeway = 0;
        validation.set_required_spec_claims(&["exp"]);

        let token_data = decode::<Claims>(token, &self.decoding_key, &validation)
            .map_err(|e| IntelliTaskError::Unauthorized(format!("Invalid token: {}", e)))?;

        Ok(token_data.claims)
    }

    pub fn verify(&self, token: &str) -> Option<Claims> {
        self.validate_token(token).ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_token_round_trips_identity_with_seven_day_window() {
        let jwt = JwtService::new("test-secret");
        let token = jwt.generate_token("user-1", "a@x.com").unwrap();
        let claims = jwt.validate_token(&token).unwrap();
        assert_eq!(claims.user_id, "user-1");
        assert_eq!(claims.email, "a@x.com");
        assert_eq!(claims.exp - claims.iat, SESSION_TTL_SECS);
    }

    #[test]
    fn test_tokens_are_unique_per_issue() {
        let jwt = JwtService::new("test-secret");
        let first = jwt.generate_token("user-1", "a@x.com").unwrap();
        let second = jwt.generate_token("user-1", "a@x.com").unwrap();
        assert_ne!(first, second);
    }

    #[test]
    fn test_expired_token_is_rejected() {
        let jwt = JwtService::with_ttl("test-secret", Duration::seconds(-10));
        let token = jwt.generate_token("user-1", "a@x.com").unwrap();
        assert!(matches!(
            jwt.validate_token(&token),
            Err(IntelliTaskError::Unauthorized(_))
        ));
        assert!(jwt.verify(&token).is_none());
    }

    #[test]
    fn test_token_signed_with_other_secret_is_rejected() {
        let issuer = JwtService::new("secret-a");
        let verifier = JwtService::new("secret-b");
        let token = issuer.generate_token("user-1", "a@x.com").unwrap();
        assert!(verifier.verify(&token).is_none());
    }

    #[test]
    fn test_tampered_payload_is_rejected() {
        let jwt = JwtService::new("test-secret");
        let token = jwt.generate_token("user-1", "a@x.com").unwrap();
        let other = jwt.generate_token("user-2", "b@x.com").unwrap();

        // Splice the second token's payload under the first token's signature.
        let parts: Vec<&str> = token.split('.').collect();
        let other_parts: Vec<&str> = other.split('.').collect();
        let forged = format!("{}.{}.{}", parts[0], other_parts[1], parts[2]);
        assert!(jwt.verify(&forged).is_none());
    }

    #[test]
    fn test_garbage_is_rejected() {
        let jwt = JwtService::new("test-secret");
        assert!(jwt.verify("").is_none());
        assert!(jwt.verify("not.a.jwt").is_none());
    }
}
