mod repo_impl;
mod create_batch;
mod load_batch;
mod update_batch;
mod find_occupied;
#[cfg(test)]
pub(crate) mod test_utils;

pub use repo_impl::RoomRepositoryImpl;
