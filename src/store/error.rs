//! Store Errors
//!
//! Error types for user and history persistence.

/// Classification of a store failure.
///
/// Survives any number of wrapping layers; see [`StoreError::kind`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// A uniqueness constraint rejected the insert
    AlreadyExists,
    /// The requested record does not exist
    NotFound,
    /// Any other driver, decode or serialization failure
    Persistence,
    /// Begin, commit or rollback failed
    Transaction,
}

/// Transaction lifecycle step that failed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TxOp {
    Begin,
    Commit,
    Rollback,
}

impl std::fmt::Display for TxOp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let op = match self {
            TxOp::Begin => "begin",
            TxOp::Commit => "commit",
            TxOp::Rollback => "rollback",
        };
        f.write_str(op)
    }
}

/// Errors that can occur in the store
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// Duplicate natural key
    #[error("already exists ({0})")]
    AlreadyExists(#[source] sqlx::Error),

    /// Record not found
    #[error("not found: {0}")]
    NotFound(String),

    /// Database error with the failing operation
    #[error("{context}: {source}")]
    Database {
        context: &'static str,
        #[source]
        source: sqlx::Error,
    },

    /// User state could not be encoded or decoded
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// A stored row violated a domain invariant
    #[error("invalid row: {0}")]
    InvalidRow(String),

    /// Transaction lifecycle failure
    #[error("failed to {op} transaction: {source}")]
    Transaction {
        op: TxOp,
        #[source]
        source: sqlx::Error,
    },

    /// Another error with layer context attached
    #[error("{context}: {source}")]
    Context {
        context: &'static str,
        #[source]
        source: Box<StoreError>,
    },

    /// The unit of work failed and so did its rollback
    #[error("{source} (rollback also failed: {rollback})")]
    RollbackFailed {
        #[source]
        source: Box<StoreError>,
        rollback: Box<StoreError>,
    },
}

pub type StoreResult<T> = Result<T, StoreError>;

impl StoreError {
    pub fn database(context: &'static str, source: sqlx::Error) -> Self {
        Self::Database { context, source }
    }

    /// Attach layer context, keeping the kind of `self`
    pub fn context(self, context: &'static str) -> Self {
        Self::Context {
            context,
            source: Box::new(self),
        }
    }

    /// Classify this error, looking through every wrapping layer
    pub fn kind(&self) -> ErrorKind {
        match self {
            StoreError::AlreadyExists(_) => ErrorKind::AlreadyExists,
            StoreError::NotFound(_) => ErrorKind::NotFound,
            StoreError::Database { .. }
            | StoreError::Serialization(_)
            | StoreError::InvalidRow(_) => ErrorKind::Persistence,
            StoreError::Transaction { .. } => ErrorKind::Transaction,
            StoreError::Context { source, .. } | StoreError::RollbackFailed { source, .. } => {
                source.kind()
            }
        }
    }

    /// Check if this error is a duplicate key
    pub fn is_already_exists(&self) -> bool {
        self.kind() == ErrorKind::AlreadyExists
    }
}
