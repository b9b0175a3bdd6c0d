#![forbid(unsafe_code)]

use super::*;
use dt_core::ids::{DocumentId, OwnerId};
use dt_core::model::{Document, TrashPurge};
use rusqlite::{OptionalExtension, params};

impl SqliteStore {
    /// Active -> Trashed for the document and every active descendant.
    pub fn soft_delete(&mut self, owner: OwnerId, id: DocumentId) -> Result<Document, StoreError> {
        let now_ms = now_ms();
        let (document, trashed) = self.write_tx("soft_delete", |tx| {
            let current = require_document_tx(tx, owner, id)?;
            if current.is_deleted {
                return Err(StoreError::InTrash);
            }

            let trashed = tx.execute(
                "UPDATE documents \
                 SET is_deleted=1, trash_root_id=?3, deleted_at_ms=?4, revision=revision + 1, \
                     updated_at_ms=MAX(updated_at_ms, ?4) \
                 WHERE user_id=?1 AND is_deleted=0 AND substr(tree_path, 1, length(?2)) = ?2",
                params![owner.get(), current.tree_path, id.get(), now_ms],
            )?;
            if trashed == 0 {
                return Err(StoreError::NotFound);
            }

            Ok((require_document_tx(tx, owner, id)?, trashed))
        })?;

        tracing::debug!(
            owner = %owner,
            document = %id,
            cascaded = trashed.saturating_sub(1),
            "document moved to trash"
        );
        Ok(document)
    }

    /// Trashed -> Active for the document and the descendants trashed with it.
    ///
    /// When the parent is no longer active the document comes back as a root.
    pub fn restore(&mut self, owner: OwnerId, id: DocumentId) -> Result<Document, StoreError> {
        let now_ms = now_ms();
        let (document, restored, detached) = self.write_tx("restore", |tx| {
            let current = require_document_tx(tx, owner, id)?;
            if !current.is_deleted {
                return Err(StoreError::NotInTrash);
            }
            let trash_root = trash_root_tx(tx, id)?.unwrap_or(id.get());

            let restored = tx.execute(
                "UPDATE documents \
                 SET is_deleted=0, trash_root_id=NULL, deleted_at_ms=NULL, revision=revision + 1, \
                     updated_at_ms=MAX(updated_at_ms, ?4) \
                 WHERE user_id=?1 AND is_deleted=1 AND substr(tree_path, 1, length(?2)) = ?2 \
                   AND (trash_root_id=?3 OR id=?5)",
                params![owner.get(), current.tree_path, trash_root, now_ms, id.get()],
            )?;
            if restored == 0 {
                return Err(StoreError::NotFound);
            }

            let parent_active = match current.parent_id {
                Some(parent_id) => document_tx(tx, owner, parent_id)?
                    .is_some_and(|parent| !parent.is_deleted),
                None => true,
            };
            if !parent_active {
                let sort_order = next_sort_order_tx(tx, owner, None)?;
                tx.execute(
                    "UPDATE documents SET parent_id=NULL, sort_order=?3 WHERE id=?1 AND user_id=?2",
                    params![id.get(), owner.get(), sort_order],
                )?;
                rewrite_subtree_paths_tx(
                    tx,
                    owner,
                    &current.tree_path,
                    &root_path(id),
                    -current.level,
                )?;
            }

            Ok((require_document_tx(tx, owner, id)?, restored, !parent_active))
        })?;

        tracing::debug!(
            owner = %owner,
            document = %id,
            restored,
            detached,
            "document restored from trash"
        );
        Ok(document)
    }

    /// Trashed -> Deleted for the document and its trashed subtree, blocks first.
    pub fn permanent_delete(
        &mut self,
        owner: OwnerId,
        id: DocumentId,
    ) -> Result<TrashPurge, StoreError> {
        let purge = self.write_tx("permanent_delete", |tx| {
            let current = require_document_tx(tx, owner, id)?;
            if !current.is_deleted {
                return Err(StoreError::NotInTrash);
            }

            let doomed = subtree_ids_tx(tx, owner, &current.tree_path, true)?;
            let mut blocks = 0usize;
            for document_id in &doomed {
                blocks += delete_blocks_tx(tx, *document_id)?;
            }

            let documents = tx.execute(
                "DELETE FROM documents \
                 WHERE user_id=?1 AND is_deleted=1 AND substr(tree_path, 1, length(?2)) = ?2",
                params![owner.get(), current.tree_path],
            )?;
            if documents == 0 {
                return Err(StoreError::NotFound);
            }

            Ok(TrashPurge { documents, blocks })
        })?;

        tracing::debug!(
            owner = %owner,
            document = %id,
            documents = purge.documents,
            blocks = purge.blocks,
            "document permanently deleted"
        );
        Ok(purge)
    }

    /// Trashed documents of `owner`, most recently trashed first.
    pub fn list_trashed(&self, owner: OwnerId) -> Result<Vec<Document>, StoreError> {
        select_documents(
            &self.conn,
            "user_id=?1 AND is_deleted=1 ORDER BY deleted_at_ms DESC, id ASC",
            params![owner.get()],
        )
    }

    /// Permanently deletes every trashed document of `owner`. Empty trash is a no-op.
    pub fn empty_trash(&mut self, owner: OwnerId) -> Result<TrashPurge, StoreError> {
        let purge = self.write_tx("empty_trash", |tx| {
            let doomed = {
                let mut stmt =
                    tx.prepare("SELECT id FROM documents WHERE user_id=?1 AND is_deleted=1")?;
                let rows = stmt.query_map(params![owner.get()], |row| row.get::<_, i64>(0))?;
                rows.collect::<Result<Vec<i64>, _>>()?
            };

            let mut blocks = 0usize;
            for raw in &doomed {
                let document_id = DocumentId::try_new(*raw)
                    .map_err(|_| StoreError::InvalidInput("invalid document row"))?;
                blocks += delete_blocks_tx(tx, document_id)?;
            }

            let documents = tx.execute(
                "DELETE FROM documents WHERE user_id=?1 AND is_deleted=1",
                params![owner.get()],
            )?;

            Ok(TrashPurge { documents, blocks })
        })?;

        tracing::debug!(
            owner = %owner,
            documents = purge.documents,
            blocks = purge.blocks,
            "trash emptied"
        );
        Ok(purge)
    }
}

fn trash_root_tx(conn: &rusqlite::Connection, id: DocumentId) -> Result<Option<i64>, StoreError> {
    Ok(conn
        .query_row(
            "SELECT trash_root_id FROM documents WHERE id=?1",
            params![id.get()],
            |row| row.get::<_, Option<i64>>(0),
        )
        .optional()?
        .flatten())
}
