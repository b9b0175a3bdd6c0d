#![forbid(unsafe_code)]

use super::super::StoreError;
use super::rows::document_tx;
use dt_core::ids::{DocumentId, OwnerId};
use dt_core::model::Document;
use rusqlite::{Connection, OptionalExtension, params};
use std::collections::BTreeSet;

pub(in crate::store) fn root_path(id: DocumentId) -> String {
    format!("/{id}/")
}

pub(in crate::store) fn child_path(parent: &Document, id: DocumentId) -> String {
    format!("{}{id}/", parent.tree_path)
}

/// A parent must be owned by the same user and active.
pub(in crate::store) fn ensure_parent_tx(
    conn: &Connection,
    owner: OwnerId,
    parent_id: DocumentId,
) -> Result<Document, StoreError> {
    let Some(parent) = document_tx(conn, owner, parent_id)? else {
        return Err(StoreError::UnknownParent);
    };
    if parent.is_deleted {
        return Err(StoreError::ParentInTrash);
    }
    Ok(parent)
}

/// Walks from `new_parent_id` up to a root and fails if `document_id` is met.
pub(in crate::store) fn ensure_acyclic_move_tx(
    conn: &Connection,
    owner: OwnerId,
    document_id: DocumentId,
    new_parent_id: DocumentId,
    max_depth: usize,
) -> Result<(), StoreError> {
    let mut current = Some(new_parent_id.get());
    let mut seen = BTreeSet::new();
    let mut steps = 0usize;

    while let Some(id) = current {
        if id == document_id.get() {
            return Err(StoreError::Cycle {
                document_id,
                parent_id: new_parent_id,
            });
        }
        if !seen.insert(id) {
            // A stored loop that does not pass through document_id.
            return Err(StoreError::DepthExceeded);
        }

        current = conn
            .query_row(
                "SELECT parent_id FROM documents WHERE id=?1 AND user_id=?2",
                params![id, owner.get()],
                |row| row.get::<_, Option<i64>>(0),
            )
            .optional()?
            .flatten();

        steps = steps.saturating_add(1);
        if steps > max_depth.saturating_add(1) {
            return Err(StoreError::DepthExceeded);
        }
    }

    Ok(())
}

pub(in crate::store) fn next_sort_order_tx(
    conn: &Connection,
    owner: OwnerId,
    parent_id: Option<DocumentId>,
) -> Result<i64, StoreError> {
    Ok(conn.query_row(
        "SELECT COALESCE(MAX(sort_order), -1) + 1 FROM documents \
         WHERE user_id=?1 AND parent_id IS ?2 AND is_deleted=0",
        params![owner.get(), parent_id.map(DocumentId::get)],
        |row| row.get::<_, i64>(0),
    )?)
}

/// Deepest level found in the subtree rooted at `tree_path`, the root included.
pub(in crate::store) fn subtree_max_level_tx(
    conn: &Connection,
    owner: OwnerId,
    tree_path: &str,
) -> Result<i64, StoreError> {
    Ok(conn.query_row(
        "SELECT COALESCE(MAX(level), 0) FROM documents \
         WHERE user_id=?1 AND substr(tree_path, 1, length(?2)) = ?2",
        params![owner.get(), tree_path],
        |row| row.get::<_, i64>(0),
    )?)
}

/// Re-roots every materialized path under `old_path` at `new_path` and shifts levels.
pub(in crate::store) fn rewrite_subtree_paths_tx(
    conn: &Connection,
    owner: OwnerId,
    old_path: &str,
    new_path: &str,
    level_delta: i64,
) -> Result<usize, StoreError> {
    Ok(conn.execute(
        "UPDATE documents \
         SET tree_path = ?3 || substr(tree_path, length(?2) + 1), level = level + ?4 \
         WHERE user_id=?1 AND substr(tree_path, 1, length(?2)) = ?2",
        params![owner.get(), old_path, new_path, level_delta],
    )?)
}

pub(in crate::store) fn subtree_ids_tx(
    conn: &Connection,
    owner: OwnerId,
    tree_path: &str,
    trashed: bool,
) -> Result<Vec<DocumentId>, StoreError> {
    let mut stmt = conn.prepare(
        "SELECT id FROM documents \
         WHERE user_id=?1 AND is_deleted=?3 AND substr(tree_path, 1, length(?2)) = ?2 \
         ORDER BY level DESC, id ASC",
    )?;
    let rows = stmt.query_map(params![owner.get(), tree_path, trashed], |row| {
        row.get::<_, i64>(0)
    })?;

    let mut out = Vec::new();
    for raw in rows {
        let id = DocumentId::try_new(raw?)
            .map_err(|_| StoreError::InvalidInput("invalid document row"))?;
        out.push(id);
    }
    Ok(out)
}
