use axum::{
    routing::{get, post},
    Router,
};
use serde_json::{json, Value};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use duka_api::database::manager::DatabaseManager;
use duka_api::database::schema;
use duka_api::handlers::{products, sales, users};

#[tokio::main]
async fn main() {
    // Load .env if present so cargo run picks up DATABASE_URL and DUKA_JWT_SECRET
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt::init();

    let config = duka_api::config::config();
    tracing::info!("Starting Duka API in {:?} mode", config.environment);

    // Apply the schema up front; a missing database degrades to per-request
    // errors and a failing /health rather than refusing to start.
    match DatabaseManager::pool().await {
        Ok(pool) => {
            if let Err(e) = schema::ensure_schema(&pool).await {
                tracing::warn!("schema setup failed: {}", e);
            }
        }
        Err(e) => tracing::warn!("database unavailable at startup: {}", e),
    }

    let app = app();

    // Allow tests or deployments to override port via env
    let port = std::env::var("DUKA_API_PORT")
        .ok()
        .or_else(|| std::env::var("PORT").ok())
        .and_then(|s| s.parse::<u16>().ok())
        .unwrap_or(3000);

    let bind_addr = format!("0.0.0.0:{}", port);
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .unwrap_or_else(|e| panic!("failed to bind {}: {}", bind_addr, e));

    tracing::info!("Duka API listening on http://{}", bind_addr);

    axum::serve(listener, app).await.expect("server");
}

fn app() -> Router {
    Router::new()
        .route("/", get(root))
        .route("/health", get(health))
        .route(
            "/products",
            get(products::list_products).post(products::create_product),
        )
        .route("/sales", post(sales::record_sale).get(sales::list_sales))
        .route("/register", post(users::register_user))
        .route("/users", get(users::list_users))
        .route("/login", post(users::login))
        // Global middleware
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
}

async fn root() -> axum::response::Json<Value> {
    axum::response::Json(json!({ "Duka FastAPI": "1.0" }))
}

async fn health() -> impl axum::response::IntoResponse {
    let now = chrono::Utc::now();

    match DatabaseManager::health_check().await {
        Ok(_) => (
            axum::http::StatusCode::OK,
            axum::response::Json(json!({
                "status": "ok",
                "timestamp": now,
                "database": "ok"
            })),
        ),
        Err(e) => (
            axum::http::StatusCode::SERVICE_UNAVAILABLE,
            axum::response::Json(json!({
                "status": "degraded",
                "timestamp": now,
                "database_error": e.to_string()
            })),
        ),
    }
}
