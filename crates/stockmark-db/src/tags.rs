//! Tag repository implementation and the transaction-scoped tag resolver.

use async_trait::async_trait;
use sqlx::{PgExecutor, Pool, Postgres, Transaction};
use tracing::{debug, trace, warn};

use stockmark_core::{Error, Result, Tag, TagRepository};

/// Resolve a tag name to its id inside the caller's transaction, creating the
/// tag if it does not exist yet.
///
/// Names are matched exactly (case-sensitive) and stored as given, the empty
/// string included. The lookup and the insert run on `tx`, so a tag created
/// here becomes visible to others only when the caller commits.
///
/// If another transaction commits the same name between the lookup and the
/// insert, the insert is skipped by `ON CONFLICT` and the name is looked up
/// once more. Any storage error is returned unchanged; the caller is expected
/// to abandon its transaction.
pub async fn resolve_tag_tx(tx: &mut Transaction<'_, Postgres>, name: &str) -> Result<i32> {
    if let Some(id) = find_tag_id(&mut **tx, name).await? {
        trace!(tag_id = id, tag = name, "Resolved existing tag");
        return Ok(id);
    }

    let inserted: Option<i32> = sqlx::query_scalar(
        "INSERT INTO tags (name) VALUES ($1) ON CONFLICT (name) DO NOTHING RETURNING id",
    )
    .bind(name)
    .fetch_optional(&mut **tx)
    .await
    .map_err(Error::Database)?;

    if let Some(id) = inserted {
        debug!(
            subsystem = "database",
            component = "tags",
            op = "create",
            tag_id = id,
            tag = name,
            "Created tag"
        );
        return Ok(id);
    }

    // Lost the insert race to a transaction that committed first.
    warn!(
        subsystem = "database",
        component = "tags",
        op = "resolve",
        tag = name,
        "Tag inserted concurrently, retrying lookup"
    );
    find_tag_id(&mut **tx, name)
        .await?
        .ok_or_else(|| Error::Conflict(format!("tag '{}' was created concurrently", name)))
}

/// Link a tag to a stock. Linking the same pair twice is a no-op.
pub async fn link_tag_tx(
    tx: &mut Transaction<'_, Postgres>,
    stock_id: i32,
    tag_id: i32,
) -> Result<()> {
    sqlx::query(
        "INSERT INTO stock_tags (stock_id, tag_id) VALUES ($1, $2)
         ON CONFLICT (stock_id, tag_id) DO NOTHING",
    )
    .bind(stock_id)
    .bind(tag_id)
    .execute(&mut **tx)
    .await
    .map_err(Error::Database)?;
    Ok(())
}

/// Fetch the tags attached to a stock, ordered by name.
///
/// Accepts either a pool or a transaction so transactional writers can read
/// their own uncommitted associations.
pub async fn fetch_tags_for_stock<'e, E>(executor: E, stock_id: i32) -> Result<Vec<Tag>>
where
    E: PgExecutor<'e>,
{
    sqlx::query_as::<_, Tag>(
        r#"
        SELECT t.id, t.name, t.created_at
        FROM tags t
        JOIN stock_tags st ON t.id = st.tag_id
        WHERE st.stock_id = $1
        ORDER BY t.name
        "#,
    )
    .bind(stock_id)
    .fetch_all(executor)
    .await
    .map_err(Error::Database)
}

async fn find_tag_id<'e, E>(executor: E, name: &str) -> Result<Option<i32>>
where
    E: PgExecutor<'e>,
{
    sqlx::query_scalar("SELECT id FROM tags WHERE name = $1")
        .bind(name)
        .fetch_optional(executor)
        .await
        .map_err(Error::Database)
}

/// PostgreSQL implementation of TagRepository.
#[derive(Clone)]
pub struct PgTagRepository {
    pool: Pool<Postgres>,
}

impl PgTagRepository {
    /// Create a new PgTagRepository with the given connection pool.
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl TagRepository for PgTagRepository {
    async fn list(&self) -> Result<Vec<Tag>> {
        let tags = sqlx::query_as::<_, Tag>("SELECT id, name, created_at FROM tags ORDER BY name")
            .fetch_all(&self.pool)
            .await
            .map_err(Error::Database)?;

        debug!(
            subsystem = "database",
            component = "tags",
            op = "list",
            result_count = tags.len(),
            "Listed tags"
        );
        Ok(tags)
    }

    async fn list_for_stock(&self, stock_id: i32) -> Result<Vec<Tag>> {
        fetch_tags_for_stock(&self.pool, stock_id).await
    }

    async fn resolve(&self, name: &str) -> Result<i32> {
        let mut tx = self.pool.begin().await.map_err(Error::Database)?;
        let id = resolve_tag_tx(&mut tx, name).await?;
        tx.commit().await.map_err(Error::Database)?;
        Ok(id)
    }
}
