mod repo_impl;
mod load_current;
mod save;

pub use repo_impl::RateConfigRepositoryImpl;
