#![forbid(unsafe_code)]

use dt_core::ids::DocumentId;

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("io: {0}")]
    Io(#[from] std::io::Error),
    #[error("sqlite: {0}")]
    Sql(#[from] rusqlite::Error),
    #[error("invalid input: {0}")]
    InvalidInput(&'static str),
    /// No row matches id and owner. Deliberately does not say which.
    #[error("document not found")]
    NotFound,
    #[error("parent document not found")]
    UnknownParent,
    #[error("parent document is in trash")]
    ParentInTrash,
    #[error("document is in trash")]
    InTrash,
    #[error("document is not in trash")]
    NotInTrash,
    #[error("document {document_id} cannot move under its own descendant {parent_id}")]
    Cycle {
        document_id: DocumentId,
        parent_id: DocumentId,
    },
    #[error("document tree depth exceeded")]
    DepthExceeded,
    #[error("revision mismatch (expected={expected}, actual={actual})")]
    RevisionMismatch { expected: i64, actual: i64 },
    #[error("transaction {op} failed: {source}")]
    TransactionFailed {
        op: &'static str,
        #[source]
        source: rusqlite::Error,
    },
}

impl StoreError {
    pub fn code(&self) -> &'static str {
        match self {
            Self::Io(_) => "IO",
            Self::Sql(_) => "STORAGE",
            Self::InvalidInput(message) if message.starts_with("RESET_REQUIRED") => {
                "RESET_REQUIRED"
            }
            Self::InvalidInput(_)
            | Self::UnknownParent
            | Self::ParentInTrash
            | Self::InTrash
            | Self::NotInTrash
            | Self::Cycle { .. }
            | Self::DepthExceeded => "VALIDATION_FAILED",
            Self::NotFound => "NOT_FOUND",
            Self::RevisionMismatch { .. } => "CONFLICT",
            Self::TransactionFailed { .. } => "TRANSACTION_FAILED",
        }
    }

    /// Folds raw SQLite failures raised inside a transaction into
    /// `TransactionFailed`; domain errors pass through unchanged.
    pub(crate) fn in_transaction(self, op: &'static str) -> Self {
        match self {
            Self::Sql(source) => Self::TransactionFailed { op, source },
            other => other,
        }
    }
}
