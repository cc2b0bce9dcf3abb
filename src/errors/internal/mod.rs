use thiserror::Error;

pub mod database;
pub mod identity;
pub mod token;

pub use database::DatabaseError;
pub use identity::IdentityError;
pub use token::{TokenDecodeError, TokenError, TokenFailClass};

/// Internal error type for store, provider and coordinator operations
///
/// Infrastructure errors are shared; domain errors are grouped per concern.
/// Never returned to callers directly - coordinators convert to `AuthError`.
#[derive(Error, Debug)]
pub enum InternalError {
    #[error(transparent)]
    Database(#[from] DatabaseError),

    #[error("Parse error: failed to parse {value_type}: {message}")]
    Parse {
        value_type: String,
        message: String,
    },

    #[error("Expiry {ttl} from now is outside the representable time range")]
    ExpiryOutOfRange { ttl: chrono::Duration },

    #[error(transparent)]
    Token(#[from] TokenError),

    #[error(transparent)]
    Identity(#[from] IdentityError),
}

impl InternalError {
    pub fn database(operation: &str, source: sea_orm::DbErr) -> InternalError {
        InternalError::Database(DatabaseError::Operation {
            operation: operation.to_string(),
            source,
        })
    }

    pub fn transaction_begin(source: sea_orm::DbErr) -> InternalError {
        InternalError::Database(DatabaseError::TransactionBegin { source })
    }

    pub fn transaction_commit(source: sea_orm::DbErr) -> InternalError {
        InternalError::Database(DatabaseError::TransactionCommit { source })
    }

    pub fn transaction_rollback(source: sea_orm::DbErr) -> InternalError {
        InternalError::Database(DatabaseError::TransactionRollback { source })
    }

    pub fn parse(value_type: &str, message: impl Into<String>) -> InternalError {
        InternalError::Parse {
            value_type: value_type.to_string(),
            message: message.into(),
        }
    }

    pub fn expiry_out_of_range(ttl: chrono::Duration) -> InternalError {
        InternalError::ExpiryOutOfRange { ttl }
    }

    /// True when a database write was rejected by a unique constraint
    pub fn is_unique_violation(&self) -> bool {
        match self {
            InternalError::Database(DatabaseError::Operation { source, .. }) => matches!(
                source.sql_err(),
                Some(sea_orm::SqlErr::UniqueConstraintViolation(_))
            ),
            _ => false,
        }
    }
}

