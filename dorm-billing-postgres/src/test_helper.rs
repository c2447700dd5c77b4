//! Test helper module for transaction-based test isolation
//!
//! Repository tests run inside a transaction that is rolled back when the
//! context is dropped, so they need no cleanup.

use crate::config::DatabaseConfig;
use crate::postgres_repositories::{BillingRepositories, PostgresRepositories};
use crate::repository::db_init::init_database;
use std::sync::Arc;

pub struct TestContext {
    pub repos: BillingRepositories,
}

impl TestContext {
    pub fn repos(&self) -> &BillingRepositories {
        &self.repos
    }
}

/// Connects with `DATABASE_URL`, makes sure the schema exists and opens a
/// transaction that is rolled back when the returned context is dropped.
pub async fn setup_test_context() -> Result<TestContext, Box<dyn std::error::Error + Send + Sync>> {
    let repos = setup_shared_repos(1).await?;
    Ok(TestContext {
        repos: repos.begin().await?,
    })
}

/// Pool-level access for tests that commit, such as the billing service
/// tests. Data written through it persists.
pub async fn setup_shared_repos(
    max_connections: u32,
) -> Result<PostgresRepositories, Box<dyn std::error::Error + Send + Sync>> {
    let pool = DatabaseConfig::from_env()
        .with_max_connections(max_connections)
        .connect()
        .await?;

    init_database(&pool).await?;

    Ok(PostgresRepositories::new(Arc::new(pool)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::room_repository::test_utils::create_test_room;
    use dorm_billing_db::repository::{create_batch::CreateBatch, load_batch::LoadBatch};

    #[tokio::test]
    #[ignore]
    #[serial_test::serial]
    async fn test_transaction_rollback() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        let room = create_test_room("Z901");
        {
            let ctx = setup_test_context().await?;
            ctx.repos().room_repository.create_batch(vec![room.clone()]).await?;

            let loaded = ctx.repos().room_repository.load_batch(&[room.id]).await?;
            assert!(loaded[0].is_some());
        } // Transaction is rolled back here when ctx is dropped

        {
            let ctx = setup_test_context().await?;
            let loaded = ctx.repos().room_repository.load_batch(&[room.id]).await?;
            assert!(loaded[0].is_none());
        }

        Ok(())
    }

    #[tokio::test]
    #[ignore]
    #[serial_test::serial]
    async fn test_consumed_transaction_is_reported() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        let ctx = setup_test_context().await?;
        ctx.repos().executor.rollback().await?;

        let err = ctx
            .repos()
            .room_repository
            .load_batch(&[uuid::Uuid::new_v4()])
            .await
            .expect_err("no transaction left");
        assert_eq!(err.to_string(), "Transaction has been consumed");
        assert!(matches!(
            ctx.repos().executor.commit().await,
            Err(crate::executor::TransactionError::Consumed)
        ));

        Ok(())
    }
}
