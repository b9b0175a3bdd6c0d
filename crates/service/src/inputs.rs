#![forbid(unsafe_code)]

use dt_core::ids::DocumentId;
use dt_core::model::NewBlock;
use serde::Deserialize;

#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateDocumentInput {
    #[serde(default)]
    pub parent_id: Option<DocumentId>,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub content: String,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateDocumentInput {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub blocks: Vec<NewBlock>,
    #[serde(default)]
    pub expected_revision: Option<i64>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MoveDocumentInput {
    /// `None` makes the document a root.
    #[serde(default)]
    pub parent_id: Option<DocumentId>,
    #[serde(default)]
    pub sort_order: Option<i64>,
    #[serde(default)]
    pub expected_revision: Option<i64>,
}
