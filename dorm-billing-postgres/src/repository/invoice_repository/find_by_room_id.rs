use dorm_billing_db::models::InvoiceModel;
use std::error::Error;
use uuid::Uuid;

use super::repo_impl::{rows_to_models, InvoiceRepositoryImpl, INVOICE_COLUMNS};

impl InvoiceRepositoryImpl {
    /// Invoices of one room, newest period first.
    pub async fn find_by_room_id(
        &self,
        room_id: Uuid,
    ) -> Result<Vec<InvoiceModel>, Box<dyn Error + Send + Sync>> {
        let mut tx = self.executor.tx.lock().await;
        let transaction = tx.as_mut().ok_or("Transaction has been consumed")?;

        let rows = sqlx::query(&format!(
            "SELECT {INVOICE_COLUMNS} FROM invoice WHERE room_id = $1 \
             ORDER BY period_year DESC, period_month DESC"
        ))
        .bind(room_id)
        .fetch_all(&mut **transaction)
        .await?;

        rows_to_models(&rows)
    }
}
