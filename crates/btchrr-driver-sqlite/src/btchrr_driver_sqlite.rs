//! SQLite executor for btchrr

mod executor;

pub use executor::SqliteExecutor;
