/// Core error taxonomy
///
/// Every operation of the access-control evaluator, the task mutation engine,
/// the filter engine and the entity stores reports failures through
/// [`CoreError`]. Errors are terminal for the current request: nothing in the
/// core retries them, and the transport maps each kind to a status code.
///
/// # Kinds
///
/// - [`CoreError::Validation`]: malformed or rule-violating input
/// - [`CoreError::NotFound`]: entity absent *or* not visible to the principal
/// - [`CoreError::Forbidden`]: principal lacks the required role
/// - [`CoreError::Conflict`]: uniqueness violation (duplicate membership, email)
/// - [`CoreError::Database`]: persistence failure

/// Result alias used throughout the core
pub type CoreResult<T> = Result<T, CoreError>;

/// Unified error type for core operations
#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    /// Input violates a business rule (400)
    #[error("{0}")]
    Validation(String),

    /// Entity is absent or hidden from the principal (404)
    #[error("{0}")]
    NotFound(String),

    /// Principal is authenticated but lacks the required role (403)
    #[error("{0}")]
    Forbidden(String),

    /// Uniqueness violation (409)
    #[error("{0}")]
    Conflict(String),

    /// Persistence failure
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl CoreError {
    pub fn validation(message: impl Into<String>) -> Self {
        CoreError::Validation(message.into())
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        CoreError::NotFound(message.into())
    }

    pub fn forbidden(message: impl Into<String>) -> Self {
        CoreError::Forbidden(message.into())
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        CoreError::Conflict(message.into())
    }

    /// Short machine-readable code for logs and responses
    pub fn code(&self) -> &'static str {
        match self {
            CoreError::Validation(_) => "validation_error",
            CoreError::NotFound(_) => "not_found",
            CoreError::Forbidden(_) => "forbidden",
            CoreError::Conflict(_) => "conflict",
            CoreError::Database(_) => "database_error",
        }
    }
}
