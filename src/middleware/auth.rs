use axum::{async_trait, extract::FromRequestParts, http::request::Parts, http::HeaderMap};

use crate::auth;
use crate::error::ApiError;

/// Authenticated user context extracted from the bearer token. The email is
/// whatever the token asserts; it is not re-checked against the users table.
///
/// Used as a handler argument to protect a route. Any failure (missing
/// header, malformed header, bad signature, missing claim) rejects with 401
/// and a `WWW-Authenticate: Bearer` challenge.
#[derive(Clone, Debug)]
pub struct AuthUser {
    pub email: String,
}

#[async_trait]
impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let token = extract_bearer_token(&parts.headers).map_err(ApiError::unauthorized)?;

        let email = auth::verify_token(&token)
            .map_err(|_| ApiError::unauthorized("Could not validate credentials"))?;

        Ok(AuthUser { email })
    }
}

/// Extract the token from the Authorization header
fn extract_bearer_token(headers: &HeaderMap) -> Result<String, String> {
    let auth_header = headers
        .get("authorization")
        .or_else(|| headers.get("Authorization"))
        .ok_or_else(|| "Missing Authorization header".to_string())?;

    let auth_str = auth_header
        .to_str()
        .map_err(|_| "Invalid Authorization header format".to_string())?;

    if let Some(token) = auth_str.strip_prefix("Bearer ") {
        if token.trim().is_empty() {
            return Err("Empty bearer token".to_string());
        }
        Ok(token.to_string())
    } else {
        Err("Authorization header must use Bearer token format".to_string())
    }
}
