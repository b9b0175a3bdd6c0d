#![forbid(unsafe_code)]

use super::*;
use dt_core::ids::{DocumentId, OwnerId};
use dt_core::model::Document;
use dt_core::tree::{TreeNode, build_forest};
use rusqlite::params;

impl SqliteStore {
    /// Forest of the owner's active documents.
    pub fn get_document_tree(&self, owner: OwnerId) -> Result<Vec<TreeNode>, StoreError> {
        let rows = self.list_all_documents(owner)?;
        let total = rows.len();
        let forest = build_forest(rows);

        if !forest.unreachable.is_empty() {
            tracing::warn!(
                owner = %owner,
                total,
                unreachable = ?forest.unreachable.iter().map(|id| id.get()).collect::<Vec<_>>(),
                "documents unreachable from any root were left out of the tree"
            );
        }
        Ok(forest.roots)
    }

    /// Reparents a document (and its subtree) under `new_parent_id`, or makes it a root.
    ///
    /// The ancestor chain of the new parent is walked first; moving a document
    /// under itself or one of its descendants fails with `Cycle`.
    pub fn move_document(&mut self, request: MoveDocumentRequest) -> Result<Document, StoreError> {
        let now_ms = now_ms();
        let max_depth = self.config.max_tree_depth;
        let max_level = to_sqlite_i64(max_depth)?;
        let owner = request.owner_id;
        let id = request.document_id;

        let moved = self.write_tx("move_document", |tx| {
            let current = require_document_tx(tx, owner, id)?;
            if current.is_deleted {
                return Err(StoreError::InTrash);
            }
            ensure_revision(&current, request.expected_revision)?;

            let parent = match request.new_parent_id {
                Some(parent_id) if parent_id == id => {
                    return Err(StoreError::Cycle {
                        document_id: id,
                        parent_id,
                    });
                }
                Some(parent_id) => {
                    let parent = ensure_parent_tx(tx, owner, parent_id)?;
                    ensure_acyclic_move_tx(tx, owner, id, parent_id, max_depth)?;
                    Some(parent)
                }
                None => None,
            };

            let new_level = parent.as_ref().map_or(0, |parent| parent.level + 1);
            let subtree_height = subtree_max_level_tx(tx, owner, &current.tree_path)? - current.level;
            if new_level + subtree_height > max_level {
                return Err(StoreError::DepthExceeded);
            }

            let sort_order = match request.sort_order {
                Some(sort_order) => sort_order,
                None if request.new_parent_id == current.parent_id => current.sort_order,
                None => next_sort_order_tx(tx, owner, request.new_parent_id)?,
            };

            let changed = tx.execute(
                "UPDATE documents SET parent_id=?3, sort_order=?4, revision=revision + 1, updated_at_ms=?5 \
                 WHERE id=?1 AND user_id=?2 AND is_deleted=0",
                params![
                    id.get(),
                    owner.get(),
                    request.new_parent_id.map(DocumentId::get),
                    sort_order,
                    now_ms.max(current.updated_at_ms),
                ],
            )?;
            if changed == 0 {
                return Err(StoreError::NotFound);
            }

            let new_path = match parent.as_ref() {
                Some(parent) => child_path(parent, id),
                None => root_path(id),
            };
            if new_path != current.tree_path {
                rewrite_subtree_paths_tx(
                    tx,
                    owner,
                    &current.tree_path,
                    &new_path,
                    new_level - current.level,
                )?;
            }

            require_document_tx(tx, owner, id)
        })?;

        tracing::debug!(
            owner = %owner,
            document = %moved.id,
            parent = ?moved.parent_id.map(DocumentId::get),
            level = moved.level,
            "document moved"
        );
        Ok(moved)
    }

    /// Root-first ancestor chain of a document, ending with the document itself.
    pub fn document_path(
        &self,
        owner: OwnerId,
        id: DocumentId,
    ) -> Result<Vec<Document>, StoreError> {
        let document = self.get_document(owner, id)?;
        let mut chain = Vec::with_capacity(document.ancestor_ids().len() + 1);
        for ancestor_id in document.ancestor_ids() {
            match document_tx(&self.conn, owner, ancestor_id)? {
                Some(ancestor) => chain.push(ancestor),
                None => {
                    tracing::warn!(
                        owner = %owner,
                        document = %id,
                        ancestor = %ancestor_id,
                        "materialized path names a missing ancestor"
                    );
                }
            }
        }
        chain.push(document);
        Ok(chain)
    }
}
