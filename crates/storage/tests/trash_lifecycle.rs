#![forbid(unsafe_code)]

use dt_core::ids::{DocumentId, OwnerId};
use dt_core::model::{Document, NewBlock, TrashPurge};
use dt_core::tree::TreeNode;
use dt_storage::{CreateDocumentRequest, SqliteStore, StoreError};
use rusqlite::Connection;
use tempfile::TempDir;

fn open_store() -> (TempDir, SqliteStore) {
    let dir = tempfile::tempdir().expect("temp dir");
    let store = SqliteStore::open(dir.path()).expect("open store");
    (dir, store)
}

fn owner() -> OwnerId {
    OwnerId::try_new(11).expect("owner id")
}

fn create(store: &mut SqliteStore, parent: Option<&Document>, title: &str) -> Document {
    store
        .create_document(CreateDocumentRequest {
            owner_id: owner(),
            parent_id: parent.map(|p| p.id),
            title: title.to_string(),
            content: String::new(),
        })
        .expect("create document")
}

fn with_blocks(store: &mut SqliteStore, doc: &Document, count: i64) {
    let blocks = (0..count)
        .map(|position| NewBlock::at(position, "text", format!("b{position}")))
        .collect();
    store.replace_blocks(doc.id, blocks).expect("seed blocks");
}

fn tree_ids(store: &SqliteStore) -> Vec<DocumentId> {
    let tree = store.get_document_tree(owner()).expect("tree");
    let mut out = Vec::new();
    let mut pending: Vec<&TreeNode> = tree.iter().collect();
    while let Some(node) = pending.pop() {
        out.push(node.id());
        pending.extend(node.children.iter());
    }
    out.sort();
    out
}

fn side_connection(dir: &TempDir) -> Connection {
    Connection::open(dir.path().join("documents.db")).expect("side connection")
}

/// Installs a trigger that aborts every delete of a document row.
fn arm_document_delete_failure(dir: &TempDir) {
    side_connection(dir)
        .execute_batch(
            "CREATE TRIGGER fail_document_delete BEFORE DELETE ON documents \
             BEGIN SELECT RAISE(ABORT, 'document delete rejected'); END;",
        )
        .expect("install trigger");
}

fn trashed_ids(store: &SqliteStore) -> Vec<DocumentId> {
    let mut ids: Vec<DocumentId> = store
        .list_trashed(owner())
        .expect("list trashed")
        .into_iter()
        .map(|d| d.id)
        .collect();
    ids.sort();
    ids
}

#[test]
fn soft_delete_hides_from_tree_and_lists_in_trash() {
    let (_dir, mut store) = open_store();
    let keep = create(&mut store, None, "Keep");
    let doc = create(&mut store, None, "Toss");

    let trashed = store.soft_delete(owner(), doc.id).expect("soft delete");
    assert!(trashed.is_deleted);
    assert!(trashed.deleted_at_ms.is_some());
    assert_eq!(tree_ids(&store), vec![keep.id]);
    assert_eq!(trashed_ids(&store), vec![doc.id]);

    let err = store.soft_delete(owner(), doc.id).expect_err("already trashed");
    assert!(matches!(err, StoreError::InTrash));
}

#[test]
fn restore_brings_document_back() {
    let (_dir, mut store) = open_store();
    let doc = create(&mut store, None, "Oops");
    store.soft_delete(owner(), doc.id).unwrap();

    let restored = store.restore(owner(), doc.id).expect("restore");
    assert!(!restored.is_deleted);
    assert!(restored.deleted_at_ms.is_none());
    assert_eq!(tree_ids(&store), vec![doc.id]);
    assert!(trashed_ids(&store).is_empty());

    let err = store.restore(owner(), doc.id).expect_err("not in trash");
    assert!(matches!(err, StoreError::NotInTrash));
}

#[test]
fn lifecycle_mutations_report_foreign_documents_as_missing() {
    let (_dir, mut store) = open_store();
    let doc = create(&mut store, None, "Mine");
    let stranger = OwnerId::try_new(12).unwrap();

    assert!(matches!(
        store.soft_delete(stranger, doc.id),
        Err(StoreError::NotFound)
    ));
    store.soft_delete(owner(), doc.id).unwrap();
    assert!(matches!(
        store.restore(stranger, doc.id),
        Err(StoreError::NotFound)
    ));
    assert!(matches!(
        store.permanent_delete(stranger, doc.id),
        Err(StoreError::NotFound)
    ));
    assert_eq!(trashed_ids(&store), vec![doc.id]);
}

#[test]
fn soft_delete_cascades_and_restore_follows_the_same_batch() {
    let (_dir, mut store) = open_store();
    let parent = create(&mut store, None, "Parent");
    let child = create(&mut store, Some(&parent), "Child");
    let grandchild = create(&mut store, Some(&child), "Grandchild");

    store.soft_delete(owner(), parent.id).unwrap();
    assert!(tree_ids(&store).is_empty());
    assert_eq!(
        trashed_ids(&store),
        vec![parent.id, child.id, grandchild.id]
    );

    store.restore(owner(), parent.id).unwrap();
    assert_eq!(tree_ids(&store), vec![parent.id, child.id, grandchild.id]);
    let tree = store.get_document_tree(owner()).unwrap();
    assert_eq!(tree.len(), 1);
    assert_eq!(tree[0].size(), 3);
}

#[test]
fn separately_trashed_descendant_stays_in_trash_on_restore() {
    let (_dir, mut store) = open_store();
    let parent = create(&mut store, None, "Parent");
    let early = create(&mut store, Some(&parent), "Early");
    let late = create(&mut store, Some(&parent), "Late");

    store.soft_delete(owner(), early.id).unwrap();
    store.soft_delete(owner(), parent.id).unwrap();
    store.restore(owner(), parent.id).unwrap();

    assert_eq!(tree_ids(&store), vec![parent.id, late.id]);
    assert_eq!(trashed_ids(&store), vec![early.id]);
}

#[test]
fn restoring_a_child_of_a_trashed_parent_detaches_it() {
    let (_dir, mut store) = open_store();
    let parent = create(&mut store, None, "Parent");
    let child = create(&mut store, Some(&parent), "Child");
    let leaf = create(&mut store, Some(&child), "Leaf");
    store.soft_delete(owner(), parent.id).unwrap();

    let restored = store.restore(owner(), child.id).expect("restore child");
    assert!(restored.is_root());
    assert_eq!(restored.level, 0);
    assert_eq!(restored.tree_path, format!("/{}/", child.id));

    let leaf_now = store.get_document(owner(), leaf.id).unwrap();
    assert!(!leaf_now.is_deleted);
    assert_eq!(leaf_now.level, 1);
    assert_eq!(leaf_now.tree_path, format!("/{}/{}/", child.id, leaf.id));

    assert_eq!(tree_ids(&store), vec![child.id, leaf.id]);
    assert_eq!(trashed_ids(&store), vec![parent.id]);

    let purge = store.permanent_delete(owner(), parent.id).expect("purge parent");
    assert_eq!(purge.documents, 1);
    assert_eq!(tree_ids(&store), vec![child.id, leaf.id]);
}

#[test]
fn permanent_delete_removes_document_and_blocks() {
    let (_dir, mut store) = open_store();
    let doc = create(&mut store, None, "Gone");
    let child = create(&mut store, Some(&doc), "Gone too");
    with_blocks(&mut store, &doc, 3);
    with_blocks(&mut store, &child, 2);
    store.soft_delete(owner(), doc.id).unwrap();

    let purge = store.permanent_delete(owner(), doc.id).expect("purge");
    assert_eq!(
        purge,
        TrashPurge {
            documents: 2,
            blocks: 5
        }
    );
    assert!(trashed_ids(&store).is_empty());
    assert!(store.get_blocks(doc.id).unwrap().is_empty());
    assert!(store.get_blocks(child.id).unwrap().is_empty());
    assert!(matches!(
        store.get_document(owner(), doc.id),
        Err(StoreError::NotFound)
    ));
}

#[test]
fn permanent_delete_requires_trashed_state() {
    let (_dir, mut store) = open_store();
    let doc = create(&mut store, None, "Active");
    with_blocks(&mut store, &doc, 1);

    let err = store
        .permanent_delete(owner(), doc.id)
        .expect_err("active documents cannot be purged");
    assert!(matches!(err, StoreError::NotInTrash));
    assert_eq!(err.code(), "VALIDATION_FAILED");
    assert_eq!(store.get_blocks(doc.id).unwrap().len(), 1);
    assert_eq!(tree_ids(&store), vec![doc.id]);
}

#[test]
fn empty_trash_purges_everything_once() {
    let (_dir, mut store) = open_store();
    let survivor = create(&mut store, None, "Survivor");
    with_blocks(&mut store, &survivor, 2);
    let mut doomed = Vec::new();
    for title in ["One", "Two", "Three"] {
        let doc = create(&mut store, None, title);
        with_blocks(&mut store, &doc, 2);
        store.soft_delete(owner(), doc.id).unwrap();
        doomed.push(doc);
    }

    let other_owner = OwnerId::try_new(12).unwrap();
    let foreign = store
        .create_document(CreateDocumentRequest {
            owner_id: other_owner,
            parent_id: None,
            title: "Foreign".to_string(),
            content: String::new(),
        })
        .unwrap();
    store.soft_delete(other_owner, foreign.id).unwrap();

    let purge = store.empty_trash(owner()).expect("empty trash");
    assert_eq!(
        purge,
        TrashPurge {
            documents: 3,
            blocks: 6
        }
    );
    assert!(trashed_ids(&store).is_empty());
    for doc in &doomed {
        assert!(store.get_blocks(doc.id).unwrap().is_empty());
    }
    assert_eq!(store.get_blocks(survivor.id).unwrap().len(), 2);
    assert_eq!(store.list_trashed(other_owner).unwrap().len(), 1);

    let again = store.empty_trash(owner()).expect("second empty is a no-op");
    assert_eq!(again, TrashPurge::default());
}

#[test]
fn trashed_documents_refuse_edits_and_children() {
    let (_dir, mut store) = open_store();
    let doc = create(&mut store, None, "Binned");
    store.soft_delete(owner(), doc.id).unwrap();

    let err = store
        .update_document(dt_storage::UpdateDocumentRequest {
            owner_id: owner(),
            document_id: doc.id,
            title: "Edit".to_string(),
            content: String::new(),
            expected_revision: None,
        })
        .expect_err("trashed documents are read-only");
    assert!(matches!(err, StoreError::InTrash));

    let err = store
        .create_document(CreateDocumentRequest {
            owner_id: owner(),
            parent_id: Some(doc.id),
            title: "Child".to_string(),
            content: String::new(),
        })
        .expect_err("no children under trashed parent");
    assert!(matches!(err, StoreError::ParentInTrash));
}

#[test]
fn trash_is_listed_most_recent_first_with_id_tie_break() {
    let (dir, mut store) = open_store();
    let first = create(&mut store, None, "First");
    let second = create(&mut store, None, "Second");
    let third = create(&mut store, None, "Third");
    for doc in [&first, &second, &third] {
        store.soft_delete(owner(), doc.id).unwrap();
    }

    let conn = side_connection(&dir);
    for (doc, deleted_at_ms) in [(&first, 1_000i64), (&second, 5_000), (&third, 5_000)] {
        conn.execute(
            "UPDATE documents SET deleted_at_ms=?2 WHERE id=?1",
            rusqlite::params![doc.id.get(), deleted_at_ms],
        )
        .expect("pin deletion time");
    }
    drop(conn);

    let listed: Vec<DocumentId> = store
        .list_trashed(owner())
        .expect("list trashed")
        .into_iter()
        .map(|d| d.id)
        .collect();
    assert_eq!(listed, vec![second.id, third.id, first.id]);
}

#[test]
fn failed_purges_keep_trash_and_blocks() {
    let (dir, mut store) = open_store();
    let mut binned = Vec::new();
    for title in ["One", "Two"] {
        let doc = create(&mut store, None, title);
        with_blocks(&mut store, &doc, 1);
        store.soft_delete(owner(), doc.id).unwrap();
        binned.push(doc);
    }
    arm_document_delete_failure(&dir);

    let err = store.empty_trash(owner()).expect_err("trigger aborts the delete");
    assert!(matches!(
        err,
        StoreError::TransactionFailed {
            op: "empty_trash",
            ..
        }
    ));
    assert_eq!(err.code(), "TRANSACTION_FAILED");

    let err = store
        .permanent_delete(owner(), binned[0].id)
        .expect_err("trigger aborts the delete");
    assert!(matches!(
        err,
        StoreError::TransactionFailed {
            op: "permanent_delete",
            ..
        }
    ));
    assert_eq!(err.code(), "TRANSACTION_FAILED");

    for doc in &binned {
        assert_eq!(store.get_blocks(doc.id).unwrap().len(), 1);
    }
    assert_eq!(
        trashed_ids(&store),
        binned.iter().map(|d| d.id).collect::<Vec<_>>()
    );
}
