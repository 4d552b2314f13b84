//! Infrastructure Layer
//!
//! Database implementations and local document storage.

pub mod file_store;
pub mod postgres;

pub use file_store::LocalFileStore;
pub use postgres::PgAccountsRepository;
