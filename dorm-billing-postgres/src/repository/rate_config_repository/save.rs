use chrono::{SubsecRound, Utc};
use dorm_billing_api::RateConfig;
use dorm_billing_db::models::RateConfigModel;
use std::error::Error;
use tracing::info;

use super::repo_impl::RateConfigRepositoryImpl;

impl RateConfigRepositoryImpl {
    /// Replaces the current rates. Invoices already computed keep the
    /// charges they were computed with.
    pub async fn save(&self, rates: &RateConfig) -> Result<RateConfigModel, Box<dyn Error + Send + Sync>> {
        let rates = RateConfig::new(rates.water_rate_per_unit, rates.elec_rate_per_unit, rates.common_fee)?;

        // TIMESTAMPTZ keeps microseconds; hash what will be read back.
        let mut item = RateConfigModel::from_rates(&rates, Utc::now().trunc_subsecs(6));
        item.hash = item.compute_hash()?;

        let mut tx = self.executor.tx.lock().await;
        let transaction = tx.as_mut().ok_or("Transaction has been consumed")?;

        sqlx::query(
            r#"
            INSERT INTO rate_config
            (id, water_rate_per_unit, elec_rate_per_unit, common_fee, updated_at, hash)
            VALUES ($1, $2, $3, $4, $5, $6)
            ON CONFLICT (id) DO UPDATE SET
            water_rate_per_unit = EXCLUDED.water_rate_per_unit,
            elec_rate_per_unit = EXCLUDED.elec_rate_per_unit,
            common_fee = EXCLUDED.common_fee,
            updated_at = EXCLUDED.updated_at,
            hash = EXCLUDED.hash
            "#,
        )
        .bind(item.id)
        .bind(item.water_rate_per_unit)
        .bind(item.elec_rate_per_unit)
        .bind(item.common_fee)
        .bind(item.updated_at)
        .bind(item.hash)
        .execute(&mut **transaction)
        .await?;

        info!(
            water_rate = %item.water_rate_per_unit,
            elec_rate = %item.elec_rate_per_unit,
            common_fee = %item.common_fee,
            "rate configuration saved"
        );
        Ok(item)
    }
}
