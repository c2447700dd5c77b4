use async_trait::async_trait;
use sqlx::Database;
use uuid::Uuid;

/// Checks which of the given ids are present in storage.
///
/// The result keeps the order of `ids`, pairing each id with its existence flag.
///
/// # Example
/// ```ignore
/// let ids = [invoice.id()];
/// let found = invoice_repo.exist_by_ids(&ids).await?;
/// assert_eq!(found, vec![(ids[0], true)]);
/// ```
#[async_trait]
pub trait ExistByIds<DB: Database>: Send + Sync {
    async fn exist_by_ids(&self, ids: &[Uuid]) -> Result<Vec<(Uuid, bool)>, Box<dyn std::error::Error + Send + Sync>>;
}
