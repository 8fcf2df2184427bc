use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Payment row. The table exists in the schema but no endpoint creates or
/// mutates payments yet; M-Pesa style checkout integration would land here.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Payment {
    pub id: i32,
    pub sale_id: i32,
    pub phone_number: String,
    pub amount: f64,
    pub status: String,
    pub checkout_request_id: Option<String>,
    pub created_at: DateTime<Utc>,
}
