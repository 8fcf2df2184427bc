mod common;

use anyhow::Result;
use reqwest::StatusCode;
use serde_json::json;

async fn create_product(
    base_url: &str,
    token: &str,
    name: &str,
    price: f64,
    stock: i64,
) -> Result<i64> {
    let client = reqwest::Client::new();
    let res = client
        .post(format!("{}/products", base_url))
        .bearer_auth(token)
        .json(&json!({"productname": name, "productprice": price, "stockquantity": stock}))
        .send()
        .await?;
    anyhow::ensure!(res.status() == StatusCode::CREATED);
    let body = res.json::<serde_json::Value>().await?;
    body["id"].as_i64().ok_or_else(|| anyhow::anyhow!("no id"))
}

async fn stock_of(base_url: &str, product_id: i64) -> Result<i64> {
    let client = reqwest::Client::new();
    let products = client
        .get(format!("{}/products", base_url))
        .send()
        .await?
        .json::<Vec<serde_json::Value>>()
        .await?;
    products
        .iter()
        .find(|p| p["id"] == product_id)
        .and_then(|p| p["stockquantity"].as_i64())
        .ok_or_else(|| anyhow::anyhow!("product {} not in list", product_id))
}

#[tokio::test]
async fn sale_decrements_stock_and_snapshots_product() -> Result<()> {
    if !common::database_available() {
        eprintln!("skipping: DATABASE_URL not set");
        return Ok(());
    }

    let server = common::ensure_server().await?;
    let client = reqwest::Client::new();
    let token = common::register_for_token(&server.base_url).await?;
    let product_id = create_product(&server.base_url, &token, "Chai Bora", 85.0, 10).await?;

    let res = client
        .post(format!("{}/sales", server.base_url))
        .json(&json!({"product_id": product_id, "quantity": 3}))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::OK);

    let sale = res.json::<serde_json::Value>().await?;
    assert_eq!(sale["product_id"], product_id);
    assert_eq!(sale["quantity"], 3);
    assert_eq!(sale["productname"], "Chai Bora");
    assert_eq!(sale["productprice"], 85.0);
    assert!(sale["sale_date"].as_str().is_some());

    assert_eq!(stock_of(&server.base_url, product_id).await?, 7);

    // Recorded sale appears in the protected listing with the denormalized
    // product fields
    let res = client
        .get(format!("{}/sales", server.base_url))
        .bearer_auth(&token)
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::OK);
    let sales = res.json::<Vec<serde_json::Value>>().await?;
    let found = sales
        .iter()
        .find(|s| s["id"] == sale["id"])
        .expect("sale missing from list");
    assert_eq!(found["productname"], "Chai Bora");
    Ok(())
}

#[tokio::test]
async fn oversold_sale_fails_and_leaves_stock_unchanged() -> Result<()> {
    if !common::database_available() {
        eprintln!("skipping: DATABASE_URL not set");
        return Ok(());
    }

    let server = common::ensure_server().await?;
    let client = reqwest::Client::new();
    let token = common::register_for_token(&server.base_url).await?;
    let product_id = create_product(&server.base_url, &token, "Mafuta", 320.0, 5).await?;

    let res = client
        .post(format!("{}/sales", server.base_url))
        .json(&json!({"product_id": product_id, "quantity": 6}))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);

    assert_eq!(stock_of(&server.base_url, product_id).await?, 5);
    Ok(())
}

#[tokio::test]
async fn sale_against_unknown_product_is_not_found() -> Result<()> {
    if !common::database_available() {
        eprintln!("skipping: DATABASE_URL not set");
        return Ok(());
    }

    let server = common::ensure_server().await?;
    let client = reqwest::Client::new();

    let res = client
        .post(format!("{}/sales", server.base_url))
        .json(&json!({"product_id": 999_999_99, "quantity": 1}))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
    Ok(())
}

#[tokio::test]
async fn list_sales_requires_auth() -> Result<()> {
    let server = common::ensure_server().await?;
    let client = reqwest::Client::new();

    let res = client
        .get(format!("{}/sales", server.base_url))
        .send()
        .await?;
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(
        res.headers()
            .get("www-authenticate")
            .and_then(|v| v.to_str().ok()),
        Some("Bearer")
    );
    Ok(())
}

/// The stock decrement is a single conditional UPDATE, so concurrent sales
/// against the last unit must produce exactly one winner.
#[tokio::test]
async fn concurrent_sales_never_oversell() -> Result<()> {
    if !common::database_available() {
        eprintln!("skipping: DATABASE_URL not set");
        return Ok(());
    }

    let server = common::ensure_server().await?;
    let token = common::register_for_token(&server.base_url).await?;
    let product_id = create_product(&server.base_url, &token, "Mkate", 65.0, 1).await?;

    let mut tasks = Vec::new();
    for _ in 0..8 {
        let url = format!("{}/sales", server.base_url);
        tasks.push(tokio::spawn(async move {
            let client = reqwest::Client::new();
            client
                .post(url)
                .json(&json!({"product_id": product_id, "quantity": 1}))
                .send()
                .await
                .map(|r| r.status())
        }));
    }

    let mut wins = 0;
    for task in tasks {
        if task.await?? == StatusCode::OK {
            wins += 1;
        }
    }

    assert_eq!(wins, 1, "exactly one concurrent sale may succeed");
    assert_eq!(stock_of(&server.base_url, product_id).await?, 0);
    Ok(())
}
