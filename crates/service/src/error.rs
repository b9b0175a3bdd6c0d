#![forbid(unsafe_code)]

use dt_storage::StoreError;

#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    /// Missing document or one owned by someone else.
    #[error("document not found")]
    NotFound,
    #[error("validation failed: {0}")]
    ValidationFailed(String),
    #[error("revision conflict (expected={expected}, actual={actual})")]
    Conflict { expected: i64, actual: i64 },
    #[error("transaction failed: {0}")]
    TransactionFailed(#[source] StoreError),
    #[error(transparent)]
    Storage(StoreError),
}

impl ServiceError {
    pub fn code(&self) -> &'static str {
        match self {
            Self::NotFound => "NOT_FOUND",
            Self::ValidationFailed(_) => "VALIDATION_FAILED",
            Self::Conflict { .. } => "CONFLICT",
            Self::TransactionFailed(_) => "TRANSACTION_FAILED",
            Self::Storage(err) => err.code(),
        }
    }

    pub fn recovery(&self) -> Option<&'static str> {
        match self {
            Self::NotFound => Some("List the document tree to pick an existing document."),
            Self::Conflict { .. } => {
                Some("Reopen the document to get the current revision, then retry.")
            }
            Self::TransactionFailed(_) => {
                Some("Reopen the document before retrying; nothing from the failed call was kept.")
            }
            Self::ValidationFailed(_) | Self::Storage(_) => None,
        }
    }

    pub(crate) fn invalid(message: impl Into<String>) -> Self {
        Self::ValidationFailed(message.into())
    }
}

impl From<StoreError> for ServiceError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound => Self::NotFound,
            StoreError::RevisionMismatch { expected, actual } => {
                Self::Conflict { expected, actual }
            }
            StoreError::TransactionFailed { .. } => Self::TransactionFailed(err),
            StoreError::UnknownParent
            | StoreError::ParentInTrash
            | StoreError::InTrash
            | StoreError::NotInTrash
            | StoreError::Cycle { .. }
            | StoreError::DepthExceeded => Self::ValidationFailed(err.to_string()),
            StoreError::InvalidInput(_) if err.code() == "VALIDATION_FAILED" => {
                Self::ValidationFailed(err.to_string())
            }
            other => Self::Storage(other),
        }
    }
}
