use async_trait::async_trait;
use dorm_billing_db::models::InvoiceModel;
use dorm_billing_db::repository::create_batch::CreateBatch;
use sqlx::Postgres;
use std::error::Error;
use tracing::debug;

use super::repo_impl::InvoiceRepositoryImpl;

impl InvoiceRepositoryImpl {
    pub(super) async fn create_batch_impl(
        repo: &InvoiceRepositoryImpl,
        items: Vec<InvoiceModel>,
    ) -> Result<Vec<InvoiceModel>, Box<dyn Error + Send + Sync>> {
        if items.is_empty() {
            return Ok(Vec::new());
        }

        let mut saved_items = Vec::new();

        let mut tx = repo.executor.tx.lock().await;
        let transaction = tx.as_mut().ok_or("Transaction has been consumed")?;

        for mut item in items {
            item.hash = 0;
            item.hash = item.compute_hash()?;

            // A concurrent generation run may have billed the room already;
            // the unique (room, period) key turns that into a no-op.
            let rows_affected = sqlx::query(
                r#"
                INSERT INTO invoice
                (id, room_id, room_number, period_year, period_month,
                 prev_water, curr_water, prev_elec, curr_elec, water_units, elec_units,
                 rent_price, water_charge, elec_charge, total, is_paid, due_date, hash)
                VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, $17, $18)
                ON CONFLICT DO NOTHING
                "#,
            )
            .bind(item.id)
            .bind(item.room_id)
            .bind(item.room_number.as_str())
            .bind(item.period_year)
            .bind(item.period_month)
            .bind(item.prev_water)
            .bind(item.curr_water)
            .bind(item.prev_elec)
            .bind(item.curr_elec)
            .bind(item.water_units)
            .bind(item.elec_units)
            .bind(item.rent_price)
            .bind(item.water_charge)
            .bind(item.elec_charge)
            .bind(item.total)
            .bind(item.is_paid)
            .bind(item.due_date)
            .bind(item.hash)
            .execute(&mut **transaction)
            .await?
            .rows_affected();

            if rows_affected == 0 {
                debug!(
                    room_id = %item.room_id,
                    period_year = item.period_year,
                    period_month = item.period_month,
                    "invoice already stored for room and period"
                );
                continue;
            }

            saved_items.push(item);
        }

        Ok(saved_items)
    }
}

#[async_trait]
impl CreateBatch<Postgres, InvoiceModel> for InvoiceRepositoryImpl {
    async fn create_batch(
        &self,
        items: Vec<InvoiceModel>,
    ) -> Result<Vec<InvoiceModel>, Box<dyn Error + Send + Sync>> {
        Self::create_batch_impl(self, items).await
    }
}
