//! btchrr core - types and traits shared by the batching engine and drivers
//!
//! This crate defines:
//!
//! - `StatementExecutor` - the narrow contract a database layer implements
//! - `ExecutionContext` - cancellation and deadline threaded through execution
//! - `Value` and `BindItem` - bind values and how items flatten into them
//! - `BtchrrError` - the error type every crate propagates

mod context;
mod error;
mod executor;
mod types;

pub use context::*;
pub use error::*;
pub use executor::*;
pub use types::*;
