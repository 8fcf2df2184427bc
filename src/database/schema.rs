//! The single source of truth for the relational schema.
//!
//! Every handler path depends on these four tables; the DDL is idempotent
//! and applied once at startup. Foreign keys use the default RESTRICT
//! behavior, so a product referenced by sales cannot be deleted out from
//! under the sales list.

use sqlx::PgPool;

use super::manager::DatabaseError;

const DDL: &[&str] = &[
    r#"
    CREATE TABLE IF NOT EXISTS products (
        id            SERIAL PRIMARY KEY,
        productname   VARCHAR(100) NOT NULL,
        productprice  DOUBLE PRECISION NOT NULL,
        stockquantity INTEGER NOT NULL
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS sales (
        id         SERIAL PRIMARY KEY,
        product_id INTEGER NOT NULL REFERENCES products(id),
        quantity   INTEGER NOT NULL,
        sale_date  TIMESTAMPTZ NOT NULL DEFAULT now()
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS users (
        id       SERIAL PRIMARY KEY,
        name     VARCHAR(100) NOT NULL,
        email    VARCHAR(120) NOT NULL UNIQUE,
        password VARCHAR(128) NOT NULL,
        phone    VARCHAR(15)
    )
    "#,
    // Declared for schema completeness; no handler reads or writes payments.
    r#"
    CREATE TABLE IF NOT EXISTS payments (
        id                  SERIAL PRIMARY KEY,
        sale_id             INTEGER NOT NULL REFERENCES sales(id),
        phone_number        VARCHAR(20) NOT NULL,
        amount              DOUBLE PRECISION NOT NULL,
        status              VARCHAR(50) NOT NULL DEFAULT 'PENDING',
        checkout_request_id VARCHAR(100),
        created_at          TIMESTAMPTZ NOT NULL DEFAULT now()
    )
    "#,
];

/// Apply the schema. Safe to run on every startup.
pub async fn ensure_schema(pool: &PgPool) -> Result<(), DatabaseError> {
    for statement in DDL {
        sqlx::query(statement).execute(pool).await?;
    }
    Ok(())
}
