use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Full user row. The password column holds an argon2 PHC hash, never
/// plaintext; it is excluded from every response shape via `UserResponse`.
#[derive(Debug, Clone, Deserialize, FromRow)]
pub struct User {
    pub id: i32,
    pub name: String,
    pub email: String,
    pub password: String,
    pub phone: Option<String>,
}

/// Public projection of a user row.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct UserResponse {
    pub id: i32,
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            name: user.name,
            email: user.email,
            phone: user.phone,
        }
    }
}
