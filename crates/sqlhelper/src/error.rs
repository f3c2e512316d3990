//! Error types for sqlhelper

use thiserror::Error;

/// Result type alias for sqlhelper operations
pub type SqlResult<T> = Result<T, SqlError>;

/// Error types for statement pooling and SQL generation
#[derive(Debug, Error)]
pub enum SqlError {
    /// Every handle is checked out and the pool is at its ceiling
    #[error("Statement nesting level is too deep (max {max_size}, likely a bug)")]
    NestingTooDeep { max_size: usize },

    /// A handle that this pool did not issue, or that is not checked out
    #[error("Statement handle is not owned by this pool")]
    NotOwned,

    /// The pool was used after `close`
    #[error("Statement pool is closed")]
    PoolClosed,

    /// A value kind with no SQL formatting rule
    #[error("Unsupported value type: {0}")]
    UnsupportedType(String),

    /// Semicolon or comment marker outside of a quoted span
    #[error("Possible SQL injection: {0}")]
    InjectionRisk(String),

    /// Quote character left over after stripping closed literals
    #[error("Unclosed quotation mark: {0}")]
    UnterminatedLiteral(String),

    /// The connection failed to create a statement handle
    #[error("Driver error: {0}")]
    Driver(#[source] Box<dyn std::error::Error + Send + Sync>),

    /// One or more handles failed to close while closing the pool
    #[error("Failed to close {failed} statement handle(s)")]
    CloseFailed { failed: usize },
}

impl SqlError {
    /// Create an unsupported type error
    pub fn unsupported(kind: impl Into<String>) -> Self {
        Self::UnsupportedType(kind.into())
    }

    /// Wrap a driver error
    pub fn driver(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Driver(Box::new(err))
    }

    /// Check if this is a nesting limit error
    pub fn is_nesting_too_deep(&self) -> bool {
        matches!(self, Self::NestingTooDeep { .. })
    }

    /// Check if this error was raised by the SQL safety check
    pub fn is_rejected_sql(&self) -> bool {
        matches!(self, Self::InjectionRisk(_) | Self::UnterminatedLiteral(_))
    }

    /// Check if this is an unsupported type error
    pub fn is_unsupported(&self) -> bool {
        matches!(self, Self::UnsupportedType(_))
    }
}
