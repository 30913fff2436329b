pub mod jwt;
pub mod password;

use http::HeaderMap;
use http::header::AUTHORIZATION;

use jwt::{Claims, JwtService};

/// Pulls the token out of `Authorization: Bearer <token>`.
pub fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .and_then(|h| h.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|t| !t.is_empty())
}

/// Identity of the caller, or `None` for an absent, malformed, invalid or expired token.
pub fn identify(jwt: &JwtService, headers: &HeaderMap) -> Option<Claims> {
    bearer_token(headers).and_then(|token| jwt.verify(token))
}
