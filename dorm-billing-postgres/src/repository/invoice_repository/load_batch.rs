use async_trait::async_trait;
use dorm_billing_db::models::InvoiceModel;
use dorm_billing_db::repository::load_batch::LoadBatch;
use sqlx::Postgres;
use std::collections::HashMap;
use std::error::Error;
use uuid::Uuid;

use super::repo_impl::{rows_to_models, InvoiceRepositoryImpl, INVOICE_COLUMNS};

impl InvoiceRepositoryImpl {
    pub(super) async fn load_batch_impl(
        repo: &InvoiceRepositoryImpl,
        ids: &[Uuid],
    ) -> Result<Vec<Option<InvoiceModel>>, Box<dyn Error + Send + Sync>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let rows = {
            let mut tx = repo.executor.tx.lock().await;
            let transaction = tx.as_mut().ok_or("Transaction has been consumed")?;
            sqlx::query(&format!("SELECT {INVOICE_COLUMNS} FROM invoice WHERE id = ANY($1)"))
                .bind(ids)
                .fetch_all(&mut **transaction)
                .await?
        };

        let items_map: HashMap<Uuid, InvoiceModel> = rows_to_models(&rows)?
            .into_iter()
            .map(|item| (item.id, item))
            .collect();
        Ok(ids.iter().map(|id| items_map.get(id).cloned()).collect())
    }
}

#[async_trait]
impl LoadBatch<Postgres, InvoiceModel> for InvoiceRepositoryImpl {
    async fn load_batch(
        &self,
        ids: &[Uuid],
    ) -> Result<Vec<Option<InvoiceModel>>, Box<dyn Error + Send + Sync>> {
        Self::load_batch_impl(self, ids).await
    }
}
