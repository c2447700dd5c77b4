mod repo_impl;
mod create_batch;
mod load_batch;
mod update_batch;
mod exist_by_ids;
mod find_by_period;
mod find_by_room_id;
#[cfg(test)]
pub(crate) mod test_utils;

pub use repo_impl::InvoiceRepositoryImpl;
