use sqlx::PgPool;
use std::sync::Arc;

use crate::executor::{Executor, TransactionResult};
use crate::repository::{InvoiceRepositoryImpl, RateConfigRepositoryImpl, RoomRepositoryImpl};

#[derive(Clone)]
pub struct PostgresRepositories {
    pool: Arc<PgPool>,
}

impl PostgresRepositories {
    pub fn new(pool: Arc<PgPool>) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &Arc<PgPool> {
        &self.pool
    }

    /// Create all repositories sharing a single transaction
    pub async fn begin(&self) -> TransactionResult<BillingRepositories> {
        let tx = self.pool.begin().await?;
        let executor = Executor::new(tx);

        Ok(BillingRepositories {
            invoice_repository: Arc::new(InvoiceRepositoryImpl::new(executor.clone())),
            room_repository: Arc::new(RoomRepositoryImpl::new(executor.clone())),
            rate_config_repository: Arc::new(RateConfigRepositoryImpl::new(executor.clone())),
            executor,
        })
    }
}

/// Repositories of one unit of work. Nothing is visible to other sessions
/// until `executor.commit()`; dropping without commit rolls back.
pub struct BillingRepositories {
    pub executor: Executor,
    pub invoice_repository: Arc<InvoiceRepositoryImpl>,
    pub room_repository: Arc<RoomRepositoryImpl>,
    pub rate_config_repository: Arc<RateConfigRepositoryImpl>,
}
