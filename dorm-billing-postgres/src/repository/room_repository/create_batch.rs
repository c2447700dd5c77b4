use async_trait::async_trait;
use dorm_billing_api::round_money;
use dorm_billing_db::models::RoomModel;
use dorm_billing_db::repository::create_batch::CreateBatch;
use sqlx::Postgres;
use std::error::Error;

use super::repo_impl::RoomRepositoryImpl;

impl RoomRepositoryImpl {
    pub(super) async fn create_batch_impl(
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
            // Stored at money scale, so hash the value as it will read back.
            item.price = round_money(item.price);
            item.hash = item.compute_hash()?;

            sqlx::query(
                r#"
                INSERT INTO room
                (id, number, floor, price, status, last_meter_water, last_meter_elec, hash)
                VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
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
            .execute(&mut **transaction)
            .await?;

            saved_items.push(item);
        }

        Ok(saved_items)
    }
}

#[async_trait]
impl CreateBatch<Postgres, RoomModel> for RoomRepositoryImpl {
    async fn create_batch(
        &self,
        items: Vec<RoomModel>,
    ) -> Result<Vec<RoomModel>, Box<dyn Error + Send + Sync>> {
        Self::create_batch_impl(self, items).await
    }
}
