//! Core error types for veld.

use thiserror::Error;

/// Result type alias using `VeldError`.
pub type VeldResult<T> = std::result::Result<T, VeldError>;

/// Generic boxed error for external error sources.
pub type GenericError = Box<dyn std::error::Error + Send + Sync>;

/// Core error type for veld operations.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum VeldError {
    /// Type mismatch or invalid type operation.
    #[error("TypeError: {0}")]
    TypeError(String),

    /// Invalid value provided.
    #[error("ValueError: {0}")]
    ValueError(String),

    /// Schema-related error (row-type mismatch, arity mismatch, etc.).
    #[error("SchemaError: {0}")]
    SchemaError(String),

    /// Column not found in a row type.
    #[error("ColumnNotFound: {0}")]
    ColumnNotFound(String),

    /// Ambiguous column reference.
    #[error("AmbiguousColumn: {0}")]
    AmbiguousColumn(String),

    /// Plan construction or rewriting error.
    #[error("PlanError: {0}")]
    PlanError(String),

    /// Search converged but no alternative satisfies the required traits.
    #[error("NoPlanFound: {0}")]
    NoPlanFound(String),

    /// A planning pass was cancelled before convergence.
    #[error("Cancelled: {0}")]
    Cancelled(String),

    /// View resolution or expansion error.
    #[error("ViewExpansion: {0}")]
    ViewExpansion(String),

    /// Feature not yet implemented.
    #[error("NotImplemented: {0}")]
    NotImplemented(String),

    /// Internal error (bug in veld).
    #[error("InternalError: {0}")]
    InternalError(String),

    /// IO error.
    #[error("IoError: {0}")]
    IoError(#[from] std::io::Error),

    /// JSON serialization error.
    #[error("SerdeJsonError: {0}")]
    SerdeJsonError(#[from] serde_json::Error),

    /// External error from third-party libraries.
    #[error("ExternalError: {0}")]
    ExternalError(GenericError),

    /// Invalid parameter provided.
    #[error("InvalidParameter: {0}")]
    InvalidParameter(String),
}

impl VeldError {
    /// Create a new `TypeError`.
    pub fn type_error<S: Into<String>>(msg: S) -> Self {
        Self::TypeError(msg.into())
    }

    /// Create a new `ValueError`.
    pub fn value_error<S: Into<String>>(msg: S) -> Self {
        Self::ValueError(msg.into())
    }

    /// Create a new `SchemaError`.
    pub fn schema_error<S: Into<String>>(msg: S) -> Self {
        Self::SchemaError(msg.into())
    }

    /// Create a new `PlanError`.
    pub fn plan<S: Into<String>>(msg: S) -> Self {
        Self::PlanError(msg.into())
    }

    /// Create a new `NoPlanFound` error.
    pub fn no_plan<S: Into<String>>(msg: S) -> Self {
        Self::NoPlanFound(msg.into())
    }

    /// Create a new `Cancelled` error.
    pub fn cancelled<S: Into<String>>(msg: S) -> Self {
        Self::Cancelled(msg.into())
    }

    /// Create a new `ViewExpansion` error.
    pub fn view_expansion<S: Into<String>>(msg: S) -> Self {
        Self::ViewExpansion(msg.into())
    }

    /// Create a new `NotImplemented` error.
    pub fn not_implemented<S: Into<String>>(msg: S) -> Self {
        Self::NotImplemented(msg.into())
    }

    /// Create a new `InternalError`.
    pub fn internal<S: Into<String>>(msg: S) -> Self {
        Self::InternalError(msg.into())
    }

    /// Create a new `InvalidParameter` error.
    pub fn invalid_parameter<S: Into<String>>(msg: S) -> Self {
        Self::InvalidParameter(msg.into())
    }
}

/// Ensure a condition holds, returning the given error variant if not.
#[macro_export]
macro_rules! ensure {
    ($cond:expr, $msg:expr) => {
        if !$cond {
            return Err($crate::VeldError::PlanError($msg.to_string()));
        }
    };
    ($cond:expr, $variant:ident: $($msg:tt)*) => {
        if !$cond {
            return Err($crate::VeldError::$variant(format!($($msg)*)));
        }
    };
}

/// Return early with a `PlanError`.
#[macro_export]
macro_rules! plan_err {
    ($($arg:tt)*) => {
        return Err($crate::VeldError::PlanError(format!($($arg)*)))
    };
}

/// Return early with a `TypeError`.
#[macro_export]
macro_rules! type_err {
    ($($arg:tt)*) => {
        return Err($crate::VeldError::TypeError(format!($($arg)*)))
    };
}

/// Return early with a `SchemaError`.
#[macro_export]
macro_rules! schema_err {
    ($($arg:tt)*) => {
        return Err($crate::VeldError::SchemaError(format!($($arg)*)))
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = VeldError::type_error("expected Int64, got String");
        assert_eq!(err.to_string(), "TypeError: expected Int64, got String");
    }

    #[test]
    fn test_error_constructors() {
        let _ = VeldError::value_error("invalid value");
        let _ = VeldError::schema_error("column not found");
        let _ = VeldError::no_plan("no alternative satisfies [Batch]");
        let _ = VeldError::cancelled("flag raised after 17 rule applications");
        let _ = VeldError::internal("unexpected state");
    }

    #[test]
    fn test_distinguished_outcomes() {
        assert!(matches!(VeldError::no_plan("x"), VeldError::NoPlanFound(_)));
        assert!(matches!(VeldError::cancelled("x"), VeldError::Cancelled(_)));
    }
}
