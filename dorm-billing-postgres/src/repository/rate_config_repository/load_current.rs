use dorm_billing_db::models::RateConfigModel;
use std::error::Error;

use super::repo_impl::RateConfigRepositoryImpl;

impl RateConfigRepositoryImpl {
    /// The rates in effect now, or `None` before they were first saved.
    pub async fn load_current(&self) -> Result<Option<RateConfigModel>, Box<dyn Error + Send + Sync>> {
        let mut tx = self.executor.tx.lock().await;
        let transaction = tx.as_mut().ok_or("Transaction has been consumed")?;

        let item: Option<RateConfigModel> = sqlx::query_as(
            r#"
            SELECT id, water_rate_per_unit, elec_rate_per_unit, common_fee, updated_at, hash
            FROM rate_config
            WHERE id = $1
            "#,
        )
        .bind(RateConfigModel::CURRENT_ID)
        .fetch_optional(&mut **transaction)
        .await?;

        Ok(item)
    }
}
