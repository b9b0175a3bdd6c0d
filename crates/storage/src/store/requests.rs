#![forbid(unsafe_code)]

use dt_core::ids::{DocumentId, OwnerId};
use dt_core::model::NewBlock;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CreateDocumentRequest {
    pub owner_id: OwnerId,
    pub parent_id: Option<DocumentId>,
    pub title: String,
    pub content: String,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct UpdateDocumentRequest {
    pub owner_id: OwnerId,
    pub document_id: DocumentId,
    pub title: String,
    pub content: String,
    pub expected_revision: Option<i64>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct UpdateDocumentWithBlocksRequest {
    pub owner_id: OwnerId,
    pub document_id: DocumentId,
    pub title: String,
    pub content: String,
    pub blocks: Vec<NewBlock>,
    pub expected_revision: Option<i64>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MoveDocumentRequest {
    pub owner_id: OwnerId,
    pub document_id: DocumentId,
    pub new_parent_id: Option<DocumentId>,
    /// Explicit position among the new siblings; `None` appends.
    pub sort_order: Option<i64>,
    pub expected_revision: Option<i64>,
}
