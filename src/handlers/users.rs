use std::collections::HashMap;

use axum::{Form, Json};
use serde::{Deserialize, Serialize};

use crate::auth;
use crate::auth::password;
use crate::database::manager::DatabaseManager;
use crate::database::models::{User, UserResponse};
use crate::error::ApiError;

// Credential failures must be indistinguishable between unknown email and
// wrong password.
const INVALID_CREDENTIALS: &str = "Invalid email or password";

#[derive(Debug, Deserialize)]
pub struct UserCreate {
    pub name: String,
    pub email: String,
    pub password: String,
    pub phone: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct Token {
    pub token: String,
}

#[derive(Debug, Deserialize)]
pub struct LoginForm {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct AccessToken {
    pub access_token: String,
    pub token_type: String,
}

/// POST /register - create a user and issue a token
pub async fn register_user(Json(user): Json<UserCreate>) -> Result<Json<Token>, ApiError> {
    if !is_valid_email(&user.email) {
        let mut field_errors = HashMap::new();
        field_errors.insert("email".to_string(), "invalid email address".to_string());
        return Err(ApiError::unprocessable_entity(
            "Invalid registration fields",
            field_errors,
        ));
    }

    let pool = DatabaseManager::pool().await?;

    let existing = sqlx::query("SELECT 1 FROM users WHERE email = $1")
        .bind(&user.email)
        .fetch_optional(&pool)
        .await?;

    if existing.is_some() {
        return Err(ApiError::bad_request("Email already exists"));
    }

    let password_hash = password::hash_password(&user.password)
        .map_err(|e| ApiError::internal_server_error(e.to_string()))?;

    let insert = sqlx::query("INSERT INTO users (name, email, password, phone) VALUES ($1, $2, $3, $4)")
        .bind(&user.name)
        .bind(&user.email)
        .bind(&password_hash)
        .bind(&user.phone)
        .execute(&pool)
        .await;

    if let Err(e) = insert {
        // Concurrent registration can still hit the unique constraint
        if e.as_database_error()
            .map(|db| db.is_unique_violation())
            .unwrap_or(false)
        {
            return Err(ApiError::bad_request("Email already exists"));
        }
        return Err(e.into());
    }

    tracing::info!(email = %user.email, "user registered");

    let token = auth::issue_token(&user.email)?;
    Ok(Json(Token { token }))
}

/// GET /users - list users without password hashes
pub async fn list_users() -> Result<Json<Vec<UserResponse>>, ApiError> {
    let pool = DatabaseManager::pool().await?;

    let users =
        sqlx::query_as::<_, UserResponse>("SELECT id, name, email, phone FROM users")
            .fetch_all(&pool)
            .await?;

    Ok(Json(users))
}

/// POST /login - authenticate with form credentials and issue a token
pub async fn login(Form(form): Form<LoginForm>) -> Result<Json<AccessToken>, ApiError> {
    let pool = DatabaseManager::pool().await?;

    let user = sqlx::query_as::<_, User>(
        "SELECT id, name, email, password, phone FROM users WHERE email = $1",
    )
    .bind(&form.username)
    .fetch_optional(&pool)
    .await?
    .ok_or_else(|| ApiError::bad_request(INVALID_CREDENTIALS))?;

    if !password::verify_password(&form.password, &user.password) {
        return Err(ApiError::bad_request(INVALID_CREDENTIALS));
    }

    let token = auth::issue_token(&user.email)?;
    Ok(Json(AccessToken {
        access_token: token,
        token_type: "bearer".to_string(),
    }))
}

/// Minimal syntactic email check: one '@' with a dotted, non-empty domain.
fn is_valid_email(email: &str) -> bool {
    if email.contains(char::is_whitespace) {
        return false;
    }
    let mut parts = email.splitn(2, '@');
    let local = parts.next().unwrap_or("");
    let domain = parts.next().unwrap_or("");

    !local.is_empty()
        && !domain.is_empty()
        && !domain.contains('@')
        && domain.contains('.')
        && !domain.starts_with('.')
        && !domain.ends_with('.')
}
