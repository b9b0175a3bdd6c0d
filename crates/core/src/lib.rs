#![forbid(unsafe_code)]

pub mod fields;
pub mod tree;

pub use tree::{Forest, TreeNode, build_forest};

pub mod ids {
    use serde::{Deserialize, Serialize};

    #[derive(Clone, Copy, Debug, PartialEq, Eq)]
    pub enum IdError {
        NotPositive,
    }

    impl IdError {
        pub fn message(&self) -> &'static str {
            match self {
                Self::NotPositive => "id must be a positive integer",
            }
        }
    }

    impl std::fmt::Display for IdError {
        fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            f.write_str(self.message())
        }
    }

    macro_rules! row_id {
        ($(#[$meta:meta])* $name:ident) => {
            $(#[$meta])*
            #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
            #[serde(try_from = "i64", into = "i64")]
            pub struct $name(i64);

            impl $name {
                pub fn try_new(value: i64) -> Result<Self, IdError> {
                    if value <= 0 {
                        return Err(IdError::NotPositive);
                    }
                    Ok(Self(value))
                }

                pub fn get(self) -> i64 {
                    self.0
                }
            }

            impl TryFrom<i64> for $name {
                type Error = IdError;

                fn try_from(value: i64) -> Result<Self, Self::Error> {
                    Self::try_new(value)
                }
            }

            impl From<$name> for i64 {
                fn from(id: $name) -> Self {
                    id.0
                }
            }

            impl std::fmt::Display for $name {
                fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                    write!(f, "{}", self.0)
                }
            }
        };
    }

    row_id!(
        /// Authenticated user identity supplied by the caller.
        OwnerId
    );
    row_id!(DocumentId);
    row_id!(BlockId);
}

pub mod model {
    use crate::ids::{BlockId, DocumentId, OwnerId};
    use serde::{Deserialize, Serialize};

    /// Lifecycle state derived from `is_deleted`; the terminal deleted state has no row.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
    #[serde(rename_all = "snake_case")]
    pub enum DocumentState {
        Active,
        Trashed,
    }

    impl DocumentState {
        pub fn as_str(self) -> &'static str {
            match self {
                DocumentState::Active => "active",
                DocumentState::Trashed => "trashed",
            }
        }
    }

    #[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct Document {
        pub id: DocumentId,
        pub user_id: OwnerId,
        pub parent_id: Option<DocumentId>,
        pub title: String,
        pub content: String,
        pub tree_path: String,
        pub level: i64,
        pub sort_order: i64,
        pub is_deleted: bool,
        pub deleted_at_ms: Option<i64>,
        pub revision: i64,
        pub created_at_ms: i64,
        pub updated_at_ms: i64,
    }

    impl Document {
        pub fn state(&self) -> DocumentState {
            if self.is_deleted {
                DocumentState::Trashed
            } else {
                DocumentState::Active
            }
        }

        pub fn is_root(&self) -> bool {
            self.parent_id.is_none()
        }

        /// Ancestor ids recorded in the materialized path, root first, excluding self.
        pub fn ancestor_ids(&self) -> Vec<DocumentId> {
            self.tree_path
                .split('/')
                .filter(|segment| !segment.is_empty())
                .filter_map(|segment| segment.parse::<i64>().ok())
                .filter_map(|raw| DocumentId::try_new(raw).ok())
                .filter(|id| *id != self.id)
                .collect()
        }
    }

    #[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct Block {
        pub id: BlockId,
        pub document_id: DocumentId,
        #[serde(rename = "type")]
        pub block_type: String,
        pub content: String,
        pub position: i64,
        pub created_at_ms: i64,
    }

    /// Block payload before it is assigned an id. `content` is stored verbatim.
    #[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct NewBlock {
        #[serde(rename = "type")]
        pub block_type: String,
        pub content: String,
        pub position: Option<i64>,
    }

    impl NewBlock {
        pub fn at(position: i64, block_type: impl Into<String>, content: impl Into<String>) -> Self {
            Self {
                block_type: block_type.into(),
                content: content.into(),
                position: Some(position),
            }
        }
    }

    #[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
    #[serde(rename_all = "camelCase")]
    pub struct DocumentWithBlocks {
        #[serde(flatten)]
        pub document: Document,
        pub blocks: Vec<Block>,
    }

    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
    pub struct TrashPurge {
        pub documents: usize,
        pub blocks: usize,
    }
}
