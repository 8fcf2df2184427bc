use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Sale {
    pub id: i32,
    pub product_id: i32,
    pub quantity: i32,
    pub sale_date: DateTime<Utc>,
}

/// Sale joined with the product's display fields, the shape returned by the
/// sales endpoints.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct SaleResponse {
    pub id: i32,
    pub product_id: i32,
    pub quantity: i32,
    pub sale_date: DateTime<Utc>,
    pub productname: String,
    pub productprice: f64,
}
