use async_trait::async_trait;
use sqlx::Database;

use crate::models::identifiable::Identifiable;

/// Generic repository trait for updating multiple entities in a batch
///
/// Each item carries the hash it was loaded with. Items whose content still
/// hashes to that value are returned untouched. Changed items are written
/// only if the stored hash still matches, otherwise the whole call fails with
/// a concurrent update error.
///
/// # Type Parameters
/// * `DB` - The database type (must implement sqlx::Database)
/// * `T` - The entity type that must implement Identifiable trait
///
/// # Example
/// ```ignore
/// impl UpdateBatch<Postgres, RoomModel> for RoomRepositoryImpl {
///     async fn update_batch(&self, items: Vec<RoomModel>) -> Result<Vec<RoomModel>, Box<dyn Error + Send + Sync>> {
///         // Implementation
///     }
/// }
/// ```
#[async_trait]
pub trait UpdateBatch<DB: Database, T: Identifiable>: Send + Sync {
    /// Update multiple items in the current transaction
    ///
    /// # Arguments
    /// * `items` - A vector of entities to update
    ///
    /// # Returns
    /// * `Ok(Vec<T>)` - The entities as stored, with their new hash
    /// * `Err` - An error if a statement failed or a stale hash was detected
    async fn update_batch(
        &self,
        items: Vec<T>,
    ) -> Result<Vec<T>, Box<dyn std::error::Error + Send + Sync>>;
}
