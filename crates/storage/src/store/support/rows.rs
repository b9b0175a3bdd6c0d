#![forbid(unsafe_code)]

use super::super::StoreError;
use dt_core::ids::{BlockId, DocumentId, OwnerId};
use dt_core::model::{Block, Document};
use rusqlite::{Connection, OptionalExtension, Params, Row, params};

pub(in crate::store) const DOCUMENT_COLUMNS: &str = "id, user_id, parent_id, title, content, tree_path, level, sort_order, \
     is_deleted, deleted_at_ms, revision, created_at_ms, updated_at_ms";

pub(in crate::store) const BLOCK_COLUMNS: &str =
    "id, document_id, type, content, position, created_at_ms";

pub(in crate::store) struct DocumentRow {
    id: i64,
    user_id: i64,
    parent_id: Option<i64>,
    title: String,
    content: String,
    tree_path: String,
    level: i64,
    sort_order: i64,
    is_deleted: bool,
    deleted_at_ms: Option<i64>,
    revision: i64,
    created_at_ms: i64,
    updated_at_ms: i64,
}

impl DocumentRow {
    pub(in crate::store) fn read(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            user_id: row.get(1)?,
            parent_id: row.get(2)?,
            title: row.get(3)?,
            content: row.get(4)?,
            tree_path: row.get(5)?,
            level: row.get(6)?,
            sort_order: row.get(7)?,
            is_deleted: row.get(8)?,
            deleted_at_ms: row.get(9)?,
            revision: row.get(10)?,
            created_at_ms: row.get(11)?,
            updated_at_ms: row.get(12)?,
        })
    }

    pub(in crate::store) fn into_document(self) -> Result<Document, StoreError> {
        let invalid = |_| StoreError::InvalidInput("invalid document row");
        Ok(Document {
            id: DocumentId::try_new(self.id).map_err(invalid)?,
            user_id: OwnerId::try_new(self.user_id).map_err(invalid)?,
            parent_id: self
                .parent_id
                .map(DocumentId::try_new)
                .transpose()
                .map_err(invalid)?,
            title: self.title,
            content: self.content,
            tree_path: self.tree_path,
            level: self.level,
            sort_order: self.sort_order,
            is_deleted: self.is_deleted,
            deleted_at_ms: self.deleted_at_ms,
            revision: self.revision,
            created_at_ms: self.created_at_ms,
            updated_at_ms: self.updated_at_ms,
        })
    }
}

pub(in crate::store) struct BlockRow {
    id: i64,
    document_id: i64,
    block_type: String,
    content: String,
    position: i64,
    created_at_ms: i64,
}

impl BlockRow {
    pub(in crate::store) fn read(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            document_id: row.get(1)?,
            block_type: row.get(2)?,
            content: row.get(3)?,
            position: row.get(4)?,
            created_at_ms: row.get(5)?,
        })
    }

    pub(in crate::store) fn into_block(self) -> Result<Block, StoreError> {
        let invalid = |_| StoreError::InvalidInput("invalid block row");
        Ok(Block {
            id: BlockId::try_new(self.id).map_err(invalid)?,
            document_id: DocumentId::try_new(self.document_id).map_err(invalid)?,
            block_type: self.block_type,
            content: self.content,
            position: self.position,
            created_at_ms: self.created_at_ms,
        })
    }
}

/// Reads documents matching `filter`, a SQL fragment following `WHERE`.
pub(in crate::store) fn select_documents<P: Params>(
    conn: &Connection,
    filter: &str,
    params: P,
) -> Result<Vec<Document>, StoreError> {
    let sql = format!("SELECT {DOCUMENT_COLUMNS} FROM documents WHERE {filter}");
    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt.query_map(params, DocumentRow::read)?;

    let mut out = Vec::new();
    for row in rows {
        out.push(row?.into_document()?);
    }
    Ok(out)
}

/// Ownership-scoped lookup. Trashed rows are returned; callers decide.
pub(in crate::store) fn document_tx(
    conn: &Connection,
    owner: OwnerId,
    id: DocumentId,
) -> Result<Option<Document>, StoreError> {
    let sql = format!("SELECT {DOCUMENT_COLUMNS} FROM documents WHERE id=?1 AND user_id=?2");
    let row = conn
        .query_row(&sql, params![id.get(), owner.get()], DocumentRow::read)
        .optional()?;
    row.map(DocumentRow::into_document).transpose()
}

pub(in crate::store) fn require_document_tx(
    conn: &Connection,
    owner: OwnerId,
    id: DocumentId,
) -> Result<Document, StoreError> {
    document_tx(conn, owner, id)?.ok_or(StoreError::NotFound)
}

pub(in crate::store) fn document_exists_tx(
    conn: &Connection,
    id: DocumentId,
) -> Result<bool, StoreError> {
    Ok(conn
        .query_row(
            "SELECT 1 FROM documents WHERE id=?1",
            params![id.get()],
            |row| row.get::<_, i64>(0),
        )
        .optional()?
        .is_some())
}

pub(in crate::store) fn ensure_revision(
    document: &Document,
    expected: Option<i64>,
) -> Result<(), StoreError> {
    match expected {
        Some(expected) if expected != document.revision => Err(StoreError::RevisionMismatch {
            expected,
            actual: document.revision,
        }),
        _ => Ok(()),
    }
}
