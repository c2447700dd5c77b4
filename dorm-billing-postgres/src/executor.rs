use sqlx::{Postgres, Transaction};
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::Mutex;

#[derive(Error, Debug)]
pub enum TransactionError {
    #[error("Transaction has been consumed")]
    Consumed,

    #[error(transparent)]
    Database(#[from] sqlx::Error),
}

pub type TransactionResult<T> = Result<T, TransactionError>;

/// Shared handle on one database transaction.
///
/// Every repository built for a unit of work clones the same executor, so all
/// their statements run in a single transaction. Statements lock `tx`, take
/// `as_mut()` and fail once the transaction was committed or rolled back.
/// Dropping the last clone without committing rolls the transaction back.
#[derive(Clone)]
pub struct Executor {
    pub tx: Arc<Mutex<Option<Transaction<'static, Postgres>>>>,
}

impl Executor {
    pub fn new(tx: Transaction<'static, Postgres>) -> Self {
        Self {
            tx: Arc::new(Mutex::new(Some(tx))),
        }
    }

    pub async fn commit(&self) -> TransactionResult<()> {
        let tx = self.tx.lock().await.take().ok_or(TransactionError::Consumed)?;
        tx.commit().await?;
        Ok(())
    }

    pub async fn rollback(&self) -> TransactionResult<()> {
        let tx = self.tx.lock().await.take().ok_or(TransactionError::Consumed)?;
        tx.rollback().await?;
        Ok(())
    }
}
