#![forbid(unsafe_code)]

use super::*;
use dt_core::ids::{DocumentId, OwnerId};
use dt_core::model::{Document, DocumentWithBlocks};
use rusqlite::params;

impl SqliteStore {
    /// Inserts a document for `owner_id`. A parent must be an active document
    /// owned by the same user.
    pub fn create_document(
        &mut self,
        request: CreateDocumentRequest,
    ) -> Result<Document, StoreError> {
        let now_ms = now_ms();
        let max_level = to_sqlite_i64(self.config.max_tree_depth)?;
        let owner = request.owner_id;

        let document = self.write_tx("create_document", |tx| {
            let parent = request
                .parent_id
                .map(|parent_id| ensure_parent_tx(tx, owner, parent_id))
                .transpose()?;

            let level = parent.as_ref().map_or(0, |parent| parent.level + 1);
            if level > max_level {
                return Err(StoreError::DepthExceeded);
            }
            let sort_order = next_sort_order_tx(tx, owner, request.parent_id)?;

            tx.execute(
                "INSERT INTO documents(user_id, parent_id, title, content, tree_path, level, sort_order, \
                 is_deleted, revision, created_at_ms, updated_at_ms) \
                 VALUES (?1, ?2, ?3, ?4, '', ?5, ?6, 0, 0, ?7, ?7)",
                params![
                    owner.get(),
                    request.parent_id.map(DocumentId::get),
                    request.title,
                    request.content,
                    level,
                    sort_order,
                    now_ms,
                ],
            )?;

            let id = DocumentId::try_new(tx.last_insert_rowid())
                .map_err(|_| StoreError::InvalidInput("invalid document id"))?;
            let tree_path = match parent.as_ref() {
                Some(parent) => child_path(parent, id),
                None => root_path(id),
            };
            tx.execute(
                "UPDATE documents SET tree_path=?2 WHERE id=?1",
                params![id.get(), tree_path],
            )?;

            require_document_tx(tx, owner, id)
        })?;

        tracing::debug!(
            owner = %owner,
            document = %document.id,
            parent = ?document.parent_id.map(DocumentId::get),
            "document created"
        );
        Ok(document)
    }

    /// Fails with `NotFound` both for a missing id and for another owner's document.
    pub fn get_document(&self, owner: OwnerId, id: DocumentId) -> Result<Document, StoreError> {
        require_document_tx(&self.conn, owner, id)
    }

    /// Rewrites title and content of an active document.
    pub fn update_document(
        &mut self,
        request: UpdateDocumentRequest,
    ) -> Result<Document, StoreError> {
        let now_ms = now_ms();
        let document = self.write_tx("update_document", |tx| {
            update_document_tx(
                tx,
                request.owner_id,
                request.document_id,
                &request.title,
                &request.content,
                request.expected_revision,
                now_ms,
            )
        })?;

        tracing::debug!(
            owner = %request.owner_id,
            document = %document.id,
            revision = document.revision,
            "document updated"
        );
        Ok(document)
    }

    /// Updates the document row and replaces its block set in one transaction.
    pub fn update_document_with_blocks(
        &mut self,
        request: UpdateDocumentWithBlocksRequest,
    ) -> Result<DocumentWithBlocks, StoreError> {
        let now_ms = now_ms();
        let updated = self.write_tx("update_document_with_blocks", |tx| {
            let document = update_document_tx(
                tx,
                request.owner_id,
                request.document_id,
                &request.title,
                &request.content,
                request.expected_revision,
                now_ms,
            )?;
            let blocks = replace_blocks_tx(tx, document.id, &request.blocks, now_ms)?;
            Ok(DocumentWithBlocks { document, blocks })
        })?;

        tracing::debug!(
            owner = %request.owner_id,
            document = %updated.document.id,
            revision = updated.document.revision,
            blocks = updated.blocks.len(),
            "document and blocks updated"
        );
        Ok(updated)
    }

    /// Active documents of `owner`, shallowest first, siblings in `sort_order`.
    pub fn list_all_documents(&self, owner: OwnerId) -> Result<Vec<Document>, StoreError> {
        select_documents(
            &self.conn,
            "user_id=?1 AND is_deleted=0 ORDER BY level ASC, sort_order ASC, id ASC",
            params![owner.get()],
        )
    }
}

fn update_document_tx(
    tx: &rusqlite::Connection,
    owner: OwnerId,
    id: DocumentId,
    title: &str,
    content: &str,
    expected_revision: Option<i64>,
    now_ms: i64,
) -> Result<Document, StoreError> {
    let current = require_document_tx(tx, owner, id)?;
    if current.is_deleted {
        return Err(StoreError::InTrash);
    }
    ensure_revision(&current, expected_revision)?;

    let changed = tx.execute(
        "UPDATE documents SET title=?3, content=?4, revision=revision + 1, updated_at_ms=?5 \
         WHERE id=?1 AND user_id=?2 AND is_deleted=0",
        params![
            id.get(),
            owner.get(),
            title,
            content,
            now_ms.max(current.updated_at_ms),
        ],
    )?;
    if changed == 0 {
        return Err(StoreError::NotFound);
    }

    require_document_tx(tx, owner, id)
}
