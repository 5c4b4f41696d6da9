//! Idempotent schema bootstrap.
//!
//! The service does not ship migration tooling: on startup it creates the
//! three tables it needs if they are missing and leaves existing ones alone.

use std::time::Instant;

use sqlx::{Pool, Postgres};
use tracing::info;

use stockmark_core::{Error, Result};

/// Table creation statements, in dependency order.
pub const SCHEMA_STATEMENTS: [&str; 3] = [
    r#"
    CREATE TABLE IF NOT EXISTS stocks (
        id SERIAL PRIMARY KEY,
        symbol TEXT NOT NULL,
        notes TEXT,
        watchlist BOOLEAN NOT NULL DEFAULT false,
        created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
        updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS tags (
        id SERIAL PRIMARY KEY,
        name TEXT UNIQUE NOT NULL,
        created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS stock_tags (
        stock_id INT NOT NULL REFERENCES stocks(id) ON DELETE CASCADE,
        tag_id INT NOT NULL REFERENCES tags(id) ON DELETE CASCADE,
        PRIMARY KEY (stock_id, tag_id)
    )
    "#,
];

/// Ensure the `stocks`, `tags` and `stock_tags` tables exist.
///
/// Safe to run on every startup; all statements run in one transaction.
pub async fn ensure_schema(pool: &Pool<Postgres>) -> Result<()> {
    let start = Instant::now();
    let mut tx = pool.begin().await.map_err(Error::Database)?;

    for statement in SCHEMA_STATEMENTS {
        sqlx::query(statement)
            .execute(&mut *tx)
            .await
            .map_err(Error::Database)?;
    }

    tx.commit().await.map_err(Error::Database)?;

    info!(
        subsystem = "database",
        component = "schema",
        op = "bootstrap",
        table_count = SCHEMA_STATEMENTS.len(),
        duration_ms = start.elapsed().as_millis() as u64,
        "Database schema ensured"
    );
    Ok(())
}
