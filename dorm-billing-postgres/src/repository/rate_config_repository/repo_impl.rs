use crate::executor::Executor;

pub struct RateConfigRepositoryImpl {
    pub(super) executor: Executor,
}

impl RateConfigRepositoryImpl {
    pub fn new(executor: Executor) -> Self {
        Self { executor }
    }
}
