use std::collections::HashMap;

use axum::Json;
use chrono::{DateTime, Utc};
use serde::Deserialize;
use sqlx::Row;

use crate::database::manager::DatabaseManager;
use crate::database::models::SaleResponse;
use crate::error::ApiError;
use crate::middleware::auth::AuthUser;

#[derive(Debug, Deserialize)]
pub struct SaleData {
    pub product_id: i32,
    pub quantity: i32,
}

/// POST /sales - record a sale against product stock
///
/// The stock check and decrement are a single conditional UPDATE, so two
/// concurrent sales cannot both pass the check and drive stock negative.
pub async fn record_sale(Json(sale): Json<SaleData>) -> Result<Json<SaleResponse>, ApiError> {
    if sale.quantity < 1 {
        let mut field_errors = HashMap::new();
        field_errors.insert(
            "quantity".to_string(),
            "must be a positive integer".to_string(),
        );
        return Err(ApiError::unprocessable_entity(
            "Invalid sale quantity",
            field_errors,
        ));
    }

    let pool = DatabaseManager::pool().await?;

    // Decrement only when enough stock remains; returns nothing otherwise.
    let decremented = sqlx::query(
        "UPDATE products \
         SET stockquantity = stockquantity - $1 \
         WHERE id = $2 AND stockquantity >= $1 \
         RETURNING productname, productprice",
    )
    .bind(sale.quantity)
    .bind(sale.product_id)
    .fetch_optional(&pool)
    .await?;

    let product_row = match decremented {
        Some(row) => row,
        None => {
            // Distinguish a missing product from insufficient stock
            let exists = sqlx::query("SELECT 1 FROM products WHERE id = $1")
                .bind(sale.product_id)
                .fetch_optional(&pool)
                .await?;

            return Err(match exists {
                Some(_) => ApiError::bad_request("Not enough stock"),
                None => ApiError::not_found("Product not found"),
            });
        }
    };

    let productname: String = product_row.try_get("productname")?;
    let productprice: f64 = product_row.try_get("productprice")?;

    let sale_row = sqlx::query(
        "INSERT INTO sales (product_id, quantity) VALUES ($1, $2) RETURNING id, sale_date",
    )
    .bind(sale.product_id)
    .bind(sale.quantity)
    .fetch_one(&pool)
    .await?;

    let id: i32 = sale_row.try_get("id")?;
    let sale_date: DateTime<Utc> = sale_row.try_get("sale_date")?;

    tracing::info!(sale_id = id, product_id = sale.product_id, quantity = sale.quantity, "sale recorded");

    Ok(Json(SaleResponse {
        id,
        product_id: sale.product_id,
        quantity: sale.quantity,
        sale_date,
        productname,
        productprice,
    }))
}

/// GET /sales - list sales with denormalized product fields (protected)
pub async fn list_sales(_user: AuthUser) -> Result<Json<Vec<SaleResponse>>, ApiError> {
    let pool = DatabaseManager::pool().await?;

    // Inner join: the RESTRICT foreign key guarantees the product row is
    // still present for every sale, so nothing is dropped here.
    let sales = sqlx::query_as::<_, SaleResponse>(
        "SELECT s.id, s.product_id, s.quantity, s.sale_date, \
                p.productname, p.productprice \
         FROM sales s \
         JOIN products p ON p.id = s.product_id \
         ORDER BY s.id",
    )
    .fetch_all(&pool)
    .await?;

    Ok(Json(sales))
}
