//! Schema setup and teardown from the SQL files shipped with the crate.
//!
//! `migrations/` is applied in ascending file order, `cleanup/` in
//! descending order. Both sets are written to be re-runnable.

use sqlx::PgPool;
use std::fs;
use std::path::Path;
use tracing::debug;

/// Creates the billing schema.
///
/// # Example
///
/// ```rust,no_run
/// use dorm_billing_postgres::{repository::db_init::init_database, DatabaseConfig};
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let pool = DatabaseConfig::from_env().connect().await?;
/// init_database(&pool).await?;
/// # Ok(())
/// # }
/// ```
pub async fn init_database(pool: &PgPool) -> Result<(), sqlx::Error> {
    let migrations_dir = Path::new(env!("CARGO_MANIFEST_DIR")).join("migrations");
    execute_sql_files_in_order(pool, &migrations_dir, true).await
}

/// Drops every billing table and type.
pub async fn cleanup_database(pool: &PgPool) -> Result<(), sqlx::Error> {
    let cleanup_dir = Path::new(env!("CARGO_MANIFEST_DIR")).join("cleanup");
    execute_sql_files_in_order(pool, &cleanup_dir, false).await
}

async fn execute_sql_files_in_order(
    pool: &PgPool,
    dir: &Path,
    ascending: bool,
) -> Result<(), sqlx::Error> {
    let mut entries: Vec<_> = fs::read_dir(dir)
        .map_err(sqlx::Error::Io)?
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.path().extension().and_then(|s| s.to_str()) == Some("sql"))
        .collect();

    entries.sort_by(|a, b| {
        let ordering = a.file_name().cmp(&b.file_name());
        if ascending {
            ordering
        } else {
            ordering.reverse()
        }
    });

    for entry in entries {
        let path = entry.path();
        let sql = fs::read_to_string(&path).map_err(sqlx::Error::Io)?;
        debug!(file = %path.display(), "executing sql file");
        sqlx::raw_sql(&sql).execute(pool).await?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DatabaseConfig;

    #[tokio::test]
    #[ignore]
    #[serial_test::serial]
    async fn test_init_and_cleanup() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        let pool = DatabaseConfig::from_env().with_max_connections(1).connect().await?;

        init_database(&pool).await?;
        // Re-running is harmless.
        init_database(&pool).await?;

        cleanup_database(&pool).await?;
        let remaining: (i64,) = sqlx::query_as(
            "SELECT COUNT(*) FROM information_schema.tables WHERE table_name IN ('room', 'invoice', 'rate_config')",
        )
        .fetch_one(&pool)
        .await?;
        assert_eq!(remaining.0, 0);

        // Leave the schema in place for the other database tests.
        init_database(&pool).await?;

        Ok(())
    }
}
