//! Postgres admin store.
//!
//! Plain admin handles live in the `admin_users` table (see `migrations/`),
//! keyed by the normalized handle.

use super::AdminStore;
use crate::errors::RosterError;
use common::types::Handle;
use sqlx::PgPool;
use tracing::warn;

/// Get every stored admin handle, sorted.
///
/// Rows that no longer parse as a handle (edited by hand) are skipped.
pub async fn load_all(pool: &PgPool) -> Result<Vec<Handle>, RosterError> {
    let rows: Vec<(String,)> = sqlx::query_as(
        r#"
        SELECT handle
        FROM admin_users
        ORDER BY handle
        "#,
    )
    .fetch_all(pool)
    .await
    .map_err(|e| {
        RosterError::ExternalStoreUnavailable(format!("Failed to load admin handles: {e}"))
    })?;

    Ok(rows
        .into_iter()
        .filter_map(|(raw,)| match Handle::parse(&raw) {
            Ok(handle) => Some(handle),
            Err(e) => {
                warn!(target: "roster.store", error = %e, "Skipping malformed admin handle row");
                None
            }
        })
        .collect())
}

/// Insert an admin handle. Ignores duplicates.
pub async fn upsert(pool: &PgPool, handle: &Handle) -> Result<(), RosterError> {
    sqlx::query(
        r#"
        INSERT INTO admin_users (handle)
        VALUES ($1)
        ON CONFLICT (handle) DO NOTHING
        "#,
    )
    .bind(handle.as_str())
    .execute(pool)
    .await
    .map_err(|e| {
        RosterError::ExternalStoreUnavailable(format!("Failed to upsert admin handle: {e}"))
    })?;

    Ok(())
}

/// Delete an admin handle. Missing handles are not an error.
pub async fn remove(pool: &PgPool, handle: &Handle) -> Result<(), RosterError> {
    sqlx::query(
        r#"
        DELETE FROM admin_users
        WHERE handle = $1
        "#,
    )
    .bind(handle.as_str())
    .execute(pool)
    .await
    .map_err(|e| {
        RosterError::ExternalStoreUnavailable(format!("Failed to remove admin handle: {e}"))
    })?;

    Ok(())
}

/// [`AdminStore`] over a Postgres pool.
#[derive(Debug, Clone)]
pub struct PgAdminStore {
    pool: PgPool,
}

impl PgAdminStore {
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait::async_trait]
impl AdminStore for PgAdminStore {
    async fn load_all(&self) -> Result<Vec<Handle>, RosterError> {
        load_all(&self.pool).await
    }

    async fn upsert(&self, handle: &Handle) -> Result<(), RosterError> {
        upsert(&self.pool, handle).await
    }

    async fn remove(&self, handle: &Handle) -> Result<(), RosterError> {
        remove(&self.pool, handle).await
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    fn handle(raw: &str) -> Handle {
        Handle::parse(raw).unwrap()
    }

    #[sqlx::test(migrations = "../../migrations")]
    async fn test_upsert_and_load(pool: PgPool) -> Result<(), RosterError> {
        let store = PgAdminStore::new(pool);

        store.upsert(&handle("zed")).await?;
        store.upsert(&handle("amy")).await?;
        // Duplicate is ignored.
        store.upsert(&handle("@Zed")).await?;

        let admins = store.load_all().await?;
        assert_eq!(admins, vec![handle("amy"), handle("zed")]);

        Ok(())
    }

    #[sqlx::test(migrations = "../../migrations")]
    async fn test_remove(pool: PgPool) -> Result<(), RosterError> {
        upsert(&pool, &handle("coach")).await?;

        remove(&pool, &handle("coach")).await?;
        remove(&pool, &handle("never_there")).await?;

        assert!(load_all(&pool).await?.is_empty());
        Ok(())
    }

    #[sqlx::test(migrations = "../../migrations")]
    async fn test_load_skips_malformed_rows(pool: PgPool) -> Result<(), RosterError> {
        sqlx::query("INSERT INTO admin_users (handle) VALUES ('has space'), ('valid_one')")
            .execute(&pool)
            .await
            .expect("Should insert rows");

        let admins = load_all(&pool).await?;
        assert_eq!(admins, vec![handle("valid_one")]);
        Ok(())
    }

    #[sqlx::test(migrations = "../../migrations")]
    async fn test_closed_pool_reports_unavailable(pool: PgPool) {
        pool.close().await;

        let result = load_all(&pool).await;
        assert!(matches!(
            result,
            Err(RosterError::ExternalStoreUnavailable(_))
        ));
    }
}
