pub mod password;

use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use crate::config;

/// Claims carried by every issued token. The email is the only identity
/// claim; callers treat it as an opaque current-user value and never
/// re-check it against the users table.
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub email: String,
    pub iat: i64,
    pub exp: i64,
}

impl Claims {
    pub fn new(email: String, expiry_hours: u64) -> Self {
        let now = Utc::now();
        let exp = (now + Duration::hours(expiry_hours as i64)).timestamp();

        Self {
            email,
            iat: now.timestamp(),
            exp,
        }
    }
}

#[derive(Debug)]
pub enum TokenError {
    MissingSecret,
    Generation(String),
    Invalid,
}

impl std::fmt::Display for TokenError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TokenError::MissingSecret => write!(f, "JWT secret not configured"),
            TokenError::Generation(msg) => write!(f, "JWT generation error: {}", msg),
            TokenError::Invalid => write!(f, "Invalid JWT token"),
        }
    }
}

impl std::error::Error for TokenError {}

/// Issue a signed token asserting the given email.
pub fn issue_token(email: &str) -> Result<String, TokenError> {
    let security = &config::config().security;
    issue_with_secret(email, &security.jwt_secret, security.jwt_expiry_hours)
}

/// Verify a token and return the embedded email claim.
pub fn verify_token(token: &str) -> Result<String, TokenError> {
    verify_with_secret(token, &config::config().security.jwt_secret)
}

fn issue_with_secret(email: &str, secret: &str, expiry_hours: u64) -> Result<String, TokenError> {
    if secret.is_empty() {
        return Err(TokenError::MissingSecret);
    }

    let claims = Claims::new(email.to_string(), expiry_hours);
    let encoding_key = EncodingKey::from_secret(secret.as_bytes());

    encode(&Header::default(), &claims, &encoding_key)
        .map_err(|e| TokenError::Generation(e.to_string()))
}

fn verify_with_secret(token: &str, secret: &str) -> Result<String, TokenError> {
    if secret.is_empty() {
        return Err(TokenError::MissingSecret);
    }

    let decoding_key = DecodingKey::from_secret(secret.as_bytes());
    let validation = Validation::default();

    // A payload without the email claim fails deserialization into Claims,
    // which is the required behavior for structurally valid foreign tokens.
    let token_data =
        decode::<Claims>(token, &decoding_key, &validation).map_err(|_| TokenError::Invalid)?;

    Ok(token_data.claims.email)
}
