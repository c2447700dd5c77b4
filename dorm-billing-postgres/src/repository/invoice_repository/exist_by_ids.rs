use async_trait::async_trait;
use dorm_billing_db::repository::exist_by_ids::ExistByIds;
use sqlx::Postgres;
use std::collections::HashSet;
use std::error::Error;
use uuid::Uuid;

use super::repo_impl::InvoiceRepositoryImpl;

impl InvoiceRepositoryImpl {
    pub(super) async fn exist_by_ids_impl(
        repo: &InvoiceRepositoryImpl,
        ids: &[Uuid],
    ) -> Result<Vec<(Uuid, bool)>, Box<dyn Error + Send + Sync>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let found_ids: Vec<(Uuid,)> = {
            let mut tx = repo.executor.tx.lock().await;
            let transaction = tx.as_mut().ok_or("Transaction has been consumed")?;
            sqlx::query_as("SELECT id FROM invoice WHERE id = ANY($1)")
                .bind(ids)
                .fetch_all(&mut **transaction)
                .await?
        };

        let found_ids_set: HashSet<Uuid> = found_ids.into_iter().map(|(id,)| id).collect();
        Ok(ids.iter().map(|id| (*id, found_ids_set.contains(id))).collect())
    }
}

#[async_trait]
impl ExistByIds<Postgres> for InvoiceRepositoryImpl {
    async fn exist_by_ids(&self, ids: &[Uuid]) -> Result<Vec<(Uuid, bool)>, Box<dyn Error + Send + Sync>> {
        Self::exist_by_ids_impl(self, ids).await
    }
}

#[cfg(test)]
mod tests {
    use crate::repository::invoice_repository::test_utils::create_test_invoice;
    use crate::repository::room_repository::test_utils::create_test_room;
    use crate::test_helper::setup_test_context;
    use dorm_billing_api::{BillingPeriod, Invoice};
    use dorm_billing_db::repository::{create_batch::CreateBatch, exist_by_ids::ExistByIds};

    #[tokio::test]
    #[ignore]
    #[serial_test::serial]
    async fn test_exist_by_ids_uses_deterministic_ids() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        let ctx = setup_test_context().await?;
        let invoice_repo = &ctx.repos().invoice_repository;
        let february = BillingPeriod::new(2, 2025)?;
        let march = BillingPeriod::new(3, 2025)?;

        let room = create_test_room("E101");
        ctx.repos().room_repository.create_batch(vec![room.clone()]).await?;
        invoice_repo.create_batch(vec![create_test_invoice(&room, february)]).await?;

        let ids = [Invoice::id_for(room.id, february), Invoice::id_for(room.id, march)];
        let result = invoice_repo.exist_by_ids(&ids).await?;

        assert_eq!(result, vec![(ids[0], true), (ids[1], false)]);

        Ok(())
    }
}
