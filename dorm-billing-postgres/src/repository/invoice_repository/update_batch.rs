use async_trait::async_trait;
use dorm_billing_db::models::InvoiceModel;
use dorm_billing_db::repository::update_batch::UpdateBatch;
use sqlx::Postgres;
use std::error::Error;
use tracing::warn;

use super::repo_impl::InvoiceRepositoryImpl;
use crate::error::StaleWriteError;

impl InvoiceRepositoryImpl {
    pub(super) async fn update_batch_impl(
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
            // 1. The hash the caller loaded
            let previous_hash = item.hash;

            // 2. Unchanged content hashes back to it
            let computed_hash = item.compute_hash()?;
            if computed_hash == previous_hash {
                saved_items.push(item);
                continue;
            }
            item.hash = computed_hash;

            // 3. A paid row is never rewritten
            let rows_affected = sqlx::query(
                r#"
                UPDATE invoice SET
                room_number = $2,
                prev_water = $3,
                curr_water = $4,
                prev_elec = $5,
                curr_elec = $6,
                water_units = $7,
                elec_units = $8,
                rent_price = $9,
                water_charge = $10,
                elec_charge = $11,
                total = $12,
                is_paid = $13,
                due_date = $14,
                hash = $15
                WHERE id = $1 AND hash = $16 AND is_paid = FALSE
                "#,
            )
            .bind(item.id)
            .bind(item.room_number.as_str())
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
            .bind(previous_hash)
            .execute(&mut **transaction)
            .await?
            .rows_affected();

            if rows_affected == 0 {
                warn!(invoice_id = %item.id, "stale or closed invoice, update rejected");
                return Err(Box::new(StaleWriteError {
                    entity: "invoice",
                    id: item.id,
                }));
            }

            saved_items.push(item);
        }

        Ok(saved_items)
    }
}

#[async_trait]
impl UpdateBatch<Postgres, InvoiceModel> for InvoiceRepositoryImpl {
    async fn update_batch(
        &self,
        items: Vec<InvoiceModel>,
    ) -> Result<Vec<InvoiceModel>, Box<dyn Error + Send + Sync>> {
        Self::update_batch_impl(self, items).await
    }
}
