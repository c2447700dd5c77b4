use async_trait::async_trait;
use dorm_billing_db::models::RoomModel;
use dorm_billing_db::repository::load_batch::LoadBatch;
use sqlx::Postgres;
use std::collections::HashMap;
use std::error::Error;
use uuid::Uuid;

use super::repo_impl::{rows_to_models, RoomRepositoryImpl, ROOM_COLUMNS};

impl RoomRepositoryImpl {
    pub(super) async fn load_batch_impl(
        repo: &RoomRepositoryImpl,
        ids: &[Uuid],
    ) -> Result<Vec<Option<RoomModel>>, Box<dyn Error + Send + Sync>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let rows = {
            let mut tx = repo.executor.tx.lock().await;
            let transaction = tx.as_mut().ok_or("Transaction has been consumed")?;
            sqlx::query(&format!("SELECT {ROOM_COLUMNS} FROM room WHERE id = ANY($1)"))
                .bind(ids)
                .fetch_all(&mut **transaction)
                .await?
        };

        let items_map: HashMap<Uuid, RoomModel> = rows_to_models(&rows)?
            .into_iter()
            .map(|item| (item.id, item))
            .collect();
        Ok(ids.iter().map(|id| items_map.get(id).cloned()).collect())
    }
}

#[async_trait]
impl LoadBatch<Postgres, RoomModel> for RoomRepositoryImpl {
    async fn load_batch(
        &self,
        ids: &[Uuid],
    ) -> Result<Vec<Option<RoomModel>>, Box<dyn Error + Send + Sync>> {
        Self::load_batch_impl(self, ids).await
    }
}
