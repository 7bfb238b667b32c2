use thiserror::Error;

/// Error types for the trading layer.
///
/// The first four variants are expected outcomes of user input and are shown
/// to the user; the rest are failures of the store or of the environment.
#[derive(Error, Debug)]
pub enum TradingError {
    /// Missing or malformed input
    #[error("{0}")]
    Validation(String),

    /// Bad credentials
    #[error("{0}")]
    Auth(String),

    /// Insufficient funds, oversell, duplicate username
    #[error("{0}")]
    BusinessRule(String),

    /// Unknown symbol or no quote available
    #[error("{0}")]
    NotFound(String),

    /// Error from the database operations
    #[error("Database error: {0}")]
    Database(#[from] sea_orm::DbErr),

    /// Hashing or parsing a stored password hash failed
    #[error("Password hash error: {0}")]
    PasswordHash(String),
}

impl TradingError {
    pub fn validation(message: impl Into<String>) -> Self {
        TradingError::Validation(message.into())
    }

    pub fn business_rule(message: impl Into<String>) -> Self {
        TradingError::BusinessRule(message.into())
    }
}

/// Type alias for Result with TradingError
pub type Result<T> = std::result::Result<T, TradingError>;
