use async_trait::async_trait;
use dorm_billing_api::round_money;
use dorm_billing_db::models::RoomModel;
use dorm_billing_db::repository::update_batch::UpdateBatch;
use sqlx::Postgres;
use std::error::Error;
use tracing::warn;

use super::repo_impl::RoomRepositoryImpl;
use crate::error::StaleWriteError;

impl RoomRepositoryImpl {
    pub(super) async fn update_batch_impl(
        repo: &RoomRepositoryImpl,
        items: Vec<RoomModel>,
    ) -> Result<Vec<RoomModel>, Box<dyn Error + Send + Sync>> {
        if items.is_empty() {
            return Ok(Vec::new());
        }

        let mut saved_items = Vec::new();

        let mut tx = repo.executor.tx.lock().await;
        let transaction = tx.as_mut().ok_or("Transaction has been consumed")?;

        for mut item in items {
            let previous_hash = item.hash;
            item.price = round_money(item.price);

            let computed_hash = item.compute_hash()?;
            if computed_hash == previous_hash {
                saved_items.push(item);
                continue;
            }
            item.hash = computed_hash;

            let rows_affected = sqlx::query(
                r#"
                UPDATE room SET
                number = $2,
                floor = $3,
                price = $4,
                status = $5,
                last_meter_water = $6,
                last_meter_elec = $7,
                hash = $8
                WHERE id = $1 AND hash = $9
                "#,
            )
            .bind(item.id)
            .bind(item.number.as_str())
            .bind(item.floor)
            .bind(item.price)
            .bind(item.status)
            .bind(item.last_meter_water)
            .bind(item.last_meter_elec)
            .bind(item.hash)
            .bind(previous_hash)
            .execute(&mut **transaction)
            .await?
            .rows_affected();

            if rows_affected == 0 {
                warn!(room_id = %item.id, "stale room row, update rejected");
                return Err(Box::new(StaleWriteError {
                    entity: "room",
                    id: item.id,
                }));
            }

            saved_items.push(item);
        }

        Ok(saved_items)
    }
}

#[async_trait]
impl UpdateBatch<Postgres, RoomModel> for RoomRepositoryImpl {
    async fn update_batch(
        &self,
        items: Vec<RoomModel>,
    ) -> Result<Vec<RoomModel>, Box<dyn Error + Send + Sync>> {
        Self::update_batch_impl(self, items).await
    }
}
