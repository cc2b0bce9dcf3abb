use thiserror::Error;

/// Storage failures; all of them surface to callers as `Unavailable`
#[derive(Error, Debug)]
pub enum DatabaseError {
    #[error("Database error: {operation} failed: {source}")]
    Operation {
        operation: String,
        #[source]
        source: sea_orm::DbErr,
    },

    #[error("Starting transaction failed: {source}")]
    TransactionBegin {
        #[source]
        source: sea_orm::DbErr,
    },

    #[error("Committing transaction failed: {source}")]
    TransactionCommit {
        #[source]
        source: sea_orm::DbErr,
    },

    /// Rolling back a savepoint failed; the enclosing transaction is unusable
    #[error("Rolling back transaction failed: {source}")]
    TransactionRollback {
        #[source]
        source: sea_orm::DbErr,
    },
}
