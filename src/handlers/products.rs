use axum::{http::StatusCode, Json};
use serde::Deserialize;

use crate::database::manager::DatabaseManager;
use crate::database::models::Product;
use crate::error::ApiError;
use crate::middleware::auth::AuthUser;

#[derive(Debug, Deserialize)]
pub struct ProductData {
    pub productname: String,
    pub productprice: f64,
    pub stockquantity: i32,
}

/// GET /products - list all products
pub async fn list_products() -> Result<Json<Vec<Product>>, ApiError> {
    let pool = DatabaseManager::pool().await?;

    let products = sqlx::query_as::<_, Product>(
        "SELECT id, productname, productprice, stockquantity FROM products",
    )
    .fetch_all(&pool)
    .await?;

    Ok(Json(products))
}

/// POST /products - create a product (protected)
pub async fn create_product(
    user: AuthUser,
    Json(prod): Json<ProductData>,
) -> Result<(StatusCode, Json<Product>), ApiError> {
    let pool = DatabaseManager::pool().await?;

    let product = sqlx::query_as::<_, Product>(
        "INSERT INTO products (productname, productprice, stockquantity) \
         VALUES ($1, $2, $3) \
         RETURNING id, productname, productprice, stockquantity",
    )
    .bind(&prod.productname)
    .bind(prod.productprice)
    .bind(prod.stockquantity)
    .fetch_one(&pool)
    .await?;

    tracing::info!(user = %user.email, product_id = product.id, "product created");

    Ok((StatusCode::CREATED, Json(product)))
}
