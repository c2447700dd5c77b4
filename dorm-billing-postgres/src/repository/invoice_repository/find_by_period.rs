use dorm_billing_api::BillingPeriod;
use dorm_billing_db::models::InvoiceModel;
use dorm_billing_db::repository::pagination::{Page, PageRequest};
use sqlx::Row;
use std::error::Error;
use uuid::Uuid;

use super::repo_impl::{rows_to_models, InvoiceRepositoryImpl, INVOICE_COLUMNS};
use crate::utils::to_i64;

impl InvoiceRepositoryImpl {
    /// Invoices of `period` ordered by room number.
    pub async fn find_by_period(
        &self,
        period: BillingPeriod,
        page: PageRequest,
    ) -> Result<Page<InvoiceModel>, Box<dyn Error + Send + Sync>> {
        let limit = to_i64(page.limit, "limit")?;
        let offset = to_i64(page.offset, "offset")?;
        let month = period.month() as i32;

        let mut tx = self.executor.tx.lock().await;
        let transaction = tx.as_mut().ok_or("Transaction has been consumed")?;

        let total: i64 = sqlx::query(
            "SELECT COUNT(*) AS total FROM invoice WHERE period_year = $1 AND period_month = $2",
        )
        .bind(period.year())
        .bind(month)
        .fetch_one(&mut **transaction)
        .await?
        .try_get("total")?;

        let rows = sqlx::query(&format!(
            "SELECT {INVOICE_COLUMNS} FROM invoice \
             WHERE period_year = $1 AND period_month = $2 \
             ORDER BY room_number, id LIMIT $3 OFFSET $4"
        ))
        .bind(period.year())
        .bind(month)
        .bind(limit)
        .bind(offset)
        .fetch_all(&mut **transaction)
        .await?;

        let total = usize::try_from(total).map_err(|_| format!("invalid invoice count {total}"))?;
        Ok(Page::new(rows_to_models(&rows)?, total, page))
    }

    /// Every invoice of `period`, without paging.
    pub async fn find_all_by_period(
        &self,
        period: BillingPeriod,
    ) -> Result<Vec<InvoiceModel>, Box<dyn Error + Send + Sync>> {
        let mut tx = self.executor.tx.lock().await;
        let transaction = tx.as_mut().ok_or("Transaction has been consumed")?;

        let rows = sqlx::query(&format!(
            "SELECT {INVOICE_COLUMNS} FROM invoice \
             WHERE period_year = $1 AND period_month = $2 ORDER BY room_number, id"
        ))
        .bind(period.year())
        .bind(period.month() as i32)
        .fetch_all(&mut **transaction)
        .await?;

        rows_to_models(&rows)
    }

    /// Ids of the rooms that already have an invoice for `period`.
    pub async fn find_billed_room_ids(
        &self,
        period: BillingPeriod,
    ) -> Result<Vec<Uuid>, Box<dyn Error + Send + Sync>> {
        let mut tx = self.executor.tx.lock().await;
        let transaction = tx.as_mut().ok_or("Transaction has been consumed")?;

        let ids: Vec<(Uuid,)> = sqlx::query_as(
            "SELECT room_id FROM invoice WHERE period_year = $1 AND period_month = $2",
        )
        .bind(period.year())
        .bind(period.month() as i32)
        .fetch_all(&mut **transaction)
        .await?;

        Ok(ids.into_iter().map(|(id,)| id).collect())
    }

    /// For every room, its newest invoice with a period before `period`.
    pub async fn find_latest_before(
        &self,
        period: BillingPeriod,
    ) -> Result<Vec<InvoiceModel>, Box<dyn Error + Send + Sync>> {
        let mut tx = self.executor.tx.lock().await;
        let transaction = tx.as_mut().ok_or("Transaction has been consumed")?;

        let rows = sqlx::query(&format!(
            "SELECT DISTINCT ON (room_id) {INVOICE_COLUMNS} FROM invoice \
             WHERE (period_year, period_month) < ($1, $2) \
             ORDER BY room_id, period_year DESC, period_month DESC"
        ))
        .bind(period.year())
        .bind(period.month() as i32)
        .fetch_all(&mut **transaction)
        .await?;

        rows_to_models(&rows)
    }
}

#[cfg(test)]
mod tests {
    use crate::repository::invoice_repository::test_utils::create_test_invoice;
    use crate::repository::room_repository::test_utils::create_test_room;
    use crate::test_helper::setup_test_context;
    use dorm_billing_api::BillingPeriod;
    use dorm_billing_db::repository::create_batch::CreateBatch;
    use dorm_billing_db::repository::pagination::PageRequest;

    #[tokio::test]
    #[ignore]
    #[serial_test::serial]
    async fn test_find_by_period_pages_in_room_order() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        let ctx = setup_test_context().await?;
        let invoice_repo = &ctx.repos().invoice_repository;
        let period = BillingPeriod::new(7, 2301)?;
        let other = BillingPeriod::new(8, 2301)?;

        let mut invoices = Vec::new();
        for number in ["F103", "F101", "F102"] {
            let room = create_test_room(number);
            ctx.repos().room_repository.create_batch(vec![room.clone()]).await?;
            invoices.push(create_test_invoice(&room, period));
            invoices.push(create_test_invoice(&room, other));
        }
        invoice_repo.create_batch(invoices).await?;

        let first = invoice_repo.find_by_period(period, PageRequest::new(2, 0)).await?;
        assert_eq!(first.total, 3);
        assert!(first.has_more());
        assert!(first.items[0].room_number.starts_with("F101"));
        assert!(first.items[1].room_number.starts_with("F102"));

        let second = invoice_repo.find_by_period(period, PageRequest::new(2, 2)).await?;
        assert_eq!(second.items.len(), 1);
        assert!(second.items[0].room_number.starts_with("F103"));
        assert!(!second.has_more());

        assert_eq!(invoice_repo.find_all_by_period(period).await?.len(), 3);

        Ok(())
    }

    #[tokio::test]
    #[ignore]
    #[serial_test::serial]
    async fn test_find_billed_room_ids() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        let ctx = setup_test_context().await?;
        let invoice_repo = &ctx.repos().invoice_repository;
        let period = BillingPeriod::new(9, 2301)?;

        let billed = create_test_room("G101");
        let unbilled = create_test_room("G102");
        ctx.repos()
            .room_repository
            .create_batch(vec![billed.clone(), unbilled.clone()])
            .await?;
        invoice_repo.create_batch(vec![create_test_invoice(&billed, period)]).await?;

        let ids = invoice_repo.find_billed_room_ids(period).await?;
        assert_eq!(ids, vec![billed.id]);

        Ok(())
    }

    #[tokio::test]
    #[ignore]
    #[serial_test::serial]
    async fn test_find_latest_before() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        let ctx = setup_test_context().await?;
        let invoice_repo = &ctx.repos().invoice_repository;

        let room = create_test_room("K101");
        let fresh = create_test_room("K102");
        ctx.repos()
            .room_repository
            .create_batch(vec![room.clone(), fresh.clone()])
            .await?;
        invoice_repo
            .create_batch(vec![
                create_test_invoice(&room, BillingPeriod::new(11, 2302)?),
                create_test_invoice(&room, BillingPeriod::new(12, 2302)?),
                create_test_invoice(&room, BillingPeriod::new(2, 2303)?),
                create_test_invoice(&fresh, BillingPeriod::new(2, 2303)?),
            ])
            .await?;

        let found = invoice_repo.find_latest_before(BillingPeriod::new(2, 2303)?).await?;
        let ours: Vec<(i32, i32)> = found
            .iter()
            .filter(|i| i.room_id == room.id || i.room_id == fresh.id)
            .map(|i| (i.period_year, i.period_month))
            .collect();
        assert_eq!(ours, vec![(2302, 12)]);

        Ok(())
    }
}
