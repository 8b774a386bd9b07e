//! Error types for btchrr

use thiserror::Error;

/// Core error type for batching and execution
#[derive(Error, Debug)]
pub enum BtchrrError {
    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),

    #[error("No items received, batch is empty")]
    EmptyInput,

    #[error("Cannot detect placeholder in statement")]
    PlaceholderDetection,

    #[error("VALUES clause not found in statement")]
    ValuesClauseNotFound,

    #[error("VALUES clause contains no placeholders")]
    EmptyValuesClause,

    #[error("Unsupported placeholder dialect: {0}")]
    UnsupportedDialect(String),

    #[error("Statement is invalid: {0}")]
    StatementInvalid(String),

    #[error("Execution failed: {0}")]
    Execution(String),

    #[error("Timeout: {0}")]
    Timeout(String),

    #[error("Cancelled")]
    Cancelled,
}

/// Result type alias for btchrr operations
pub type Result<T> = std::result::Result<T, BtchrrError>;
