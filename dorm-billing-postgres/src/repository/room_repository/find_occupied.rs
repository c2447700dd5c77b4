use dorm_billing_db::models::RoomModel;
use std::error::Error;

use super::repo_impl::{rows_to_models, RoomRepositoryImpl, ROOM_COLUMNS};

impl RoomRepositoryImpl {
    /// Rooms with status `OCCUPIED`, ordered by room number.
    pub async fn find_occupied(&self) -> Result<Vec<RoomModel>, Box<dyn Error + Send + Sync>> {
        let mut tx = self.executor.tx.lock().await;
        let transaction = tx.as_mut().ok_or("Transaction has been consumed")?;

        let rows = sqlx::query(&format!(
            "SELECT {ROOM_COLUMNS} FROM room WHERE status = 'OCCUPIED' ORDER BY number"
        ))
        .fetch_all(&mut **transaction)
        .await?;

        rows_to_models(&rows)
    }
}

#[cfg(test)]
mod tests {
    use crate::repository::room_repository::test_utils::create_test_room;
    use crate::test_helper::setup_test_context;
    use dorm_billing_db::models::RoomStatus;
    use dorm_billing_db::repository::create_batch::CreateBatch;

    #[tokio::test]
    #[ignore]
    #[serial_test::serial]
    async fn test_find_occupied_skips_other_statuses() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        let ctx = setup_test_context().await?;
        let room_repo = &ctx.repos().room_repository;

        let occupied = create_test_room("U101");
        let mut vacant = create_test_room("U102");
        vacant.status = RoomStatus::Vacant;
        let mut maintenance = create_test_room("U103");
        maintenance.status = RoomStatus::Maintenance;
        room_repo
            .create_batch(vec![occupied.clone(), vacant.clone(), maintenance.clone()])
            .await?;

        let found = room_repo.find_occupied().await?;
        assert!(found.iter().any(|room| room.id == occupied.id));
        assert!(found.iter().all(|room| room.id != vacant.id && room.id != maintenance.id));
        assert!(found.iter().all(|room| room.status == RoomStatus::Occupied));

        Ok(())
    }
}
