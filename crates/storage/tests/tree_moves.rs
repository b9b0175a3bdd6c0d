#![forbid(unsafe_code)]

use dt_core::ids::{DocumentId, OwnerId};
use dt_core::model::Document;
use dt_core::tree::TreeNode;
use dt_storage::{
    CreateDocumentRequest, MoveDocumentRequest, SqliteStore, StoreConfig, StoreError,
};
use tempfile::TempDir;

fn open_store_with_depth(depth: usize) -> (TempDir, SqliteStore) {
    let dir = tempfile::tempdir().expect("temp dir");
    let config = StoreConfig::new(dir.path()).with_max_tree_depth(depth);
    let store = SqliteStore::open_with_config(config).expect("open store");
    (dir, store)
}

fn open_store() -> (TempDir, SqliteStore) {
    open_store_with_depth(128)
}

fn owner() -> OwnerId {
    OwnerId::try_new(3).expect("owner id")
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

fn move_to(
    store: &mut SqliteStore,
    doc: &Document,
    parent: Option<&Document>,
) -> Result<Document, StoreError> {
    store.move_document(MoveDocumentRequest {
        owner_id: owner(),
        document_id: doc.id,
        new_parent_id: parent.map(|p| p.id),
        sort_order: None,
        expected_revision: None,
    })
}

fn child_ids(node: &TreeNode) -> Vec<DocumentId> {
    node.children.iter().map(TreeNode::id).collect()
}

#[test]
fn root_with_one_child_builds_one_tree() {
    let (_dir, mut store) = open_store();
    let a = create(&mut store, None, "Root");
    let b = create(&mut store, Some(&a), "Child");

    let tree = store.get_document_tree(owner()).expect("tree");
    assert_eq!(tree.len(), 1);
    assert_eq!(tree[0].id(), a.id);
    assert_eq!(tree[0].document.title, "Root");
    assert_eq!(child_ids(&tree[0]), vec![b.id]);
    assert_eq!(tree[0].children[0].document.title, "Child");
    assert!(tree[0].children[0].children.is_empty());
}

#[test]
fn move_reparents_and_rewrites_subtree_paths() {
    let (_dir, mut store) = open_store();
    let left = create(&mut store, None, "Left");
    let right = create(&mut store, None, "Right");
    let branch = create(&mut store, Some(&left), "Branch");
    let leaf = create(&mut store, Some(&branch), "Leaf");

    let moved = move_to(&mut store, &branch, Some(&right)).expect("move");
    assert_eq!(moved.parent_id, Some(right.id));
    assert_eq!(moved.level, 1);
    assert_eq!(moved.revision, branch.revision + 1);
    assert_eq!(moved.tree_path, format!("/{}/{}/", right.id, branch.id));

    let leaf_now = store.get_document(owner(), leaf.id).unwrap();
    assert_eq!(leaf_now.level, 2);
    assert_eq!(
        leaf_now.tree_path,
        format!("/{}/{}/{}/", right.id, branch.id, leaf.id)
    );

    let tree = store.get_document_tree(owner()).unwrap();
    let left_node = tree.iter().find(|n| n.id() == left.id).unwrap();
    let right_node = tree.iter().find(|n| n.id() == right.id).unwrap();
    assert!(left_node.children.is_empty());
    assert_eq!(child_ids(right_node), vec![branch.id]);
    assert_eq!(child_ids(&right_node.children[0]), vec![leaf.id]);
}

#[test]
fn move_to_root_and_explicit_sort_order() {
    let (_dir, mut store) = open_store();
    let top = create(&mut store, None, "Top");
    let other = create(&mut store, None, "Other");
    let child = create(&mut store, Some(&top), "Child");

    let promoted = store
        .move_document(MoveDocumentRequest {
            owner_id: owner(),
            document_id: child.id,
            new_parent_id: None,
            sort_order: Some(-1),
            expected_revision: Some(child.revision),
        })
        .expect("promote to root");
    assert!(promoted.is_root());
    assert_eq!(promoted.level, 0);
    assert_eq!(promoted.tree_path, format!("/{}/", child.id));

    let roots: Vec<DocumentId> = store
        .get_document_tree(owner())
        .unwrap()
        .iter()
        .map(TreeNode::id)
        .collect();
    assert_eq!(roots, vec![child.id, top.id, other.id]);
}

#[test]
fn moving_under_own_descendant_is_rejected() {
    let (_dir, mut store) = open_store();
    let a = create(&mut store, None, "A");
    let b = create(&mut store, Some(&a), "B");
    let c = create(&mut store, Some(&b), "C");

    let err = move_to(&mut store, &a, Some(&c)).expect_err("cycle");
    assert!(matches!(
        err,
        StoreError::Cycle { document_id, parent_id } if document_id == a.id && parent_id == c.id
    ));
    assert_eq!(err.code(), "VALIDATION_FAILED");

    let err = move_to(&mut store, &b, Some(&b)).expect_err("self parent");
    assert!(matches!(err, StoreError::Cycle { .. }));

    let untouched = store.get_document(owner(), a.id).unwrap();
    assert!(untouched.is_root());
    assert_eq!(store.get_document_tree(owner()).unwrap()[0].size(), 3);
}

#[test]
fn move_rejects_foreign_and_trashed_parents() {
    let (_dir, mut store) = open_store();
    let doc = create(&mut store, None, "Doc");
    let bin = create(&mut store, None, "Bin");
    store.soft_delete(owner(), bin.id).unwrap();

    let err = move_to(&mut store, &doc, Some(&bin)).expect_err("trashed parent");
    assert!(matches!(err, StoreError::ParentInTrash));

    let foreign = store
        .create_document(CreateDocumentRequest {
            owner_id: OwnerId::try_new(99).unwrap(),
            parent_id: None,
            title: "Foreign".to_string(),
            content: String::new(),
        })
        .unwrap();
    let err = move_to(&mut store, &doc, Some(&foreign)).expect_err("foreign parent");
    assert!(matches!(err, StoreError::UnknownParent));
}

#[test]
fn move_with_stale_revision_conflicts() {
    let (_dir, mut store) = open_store();
    let a = create(&mut store, None, "A");
    let b = create(&mut store, None, "B");

    let err = store
        .move_document(MoveDocumentRequest {
            owner_id: owner(),
            document_id: b.id,
            new_parent_id: Some(a.id),
            sort_order: None,
            expected_revision: Some(b.revision + 3),
        })
        .expect_err("stale revision");
    assert_eq!(err.code(), "CONFLICT");
    assert!(store.get_document(owner(), b.id).unwrap().is_root());
}

#[test]
fn depth_limit_applies_to_create_and_move() {
    let (_dir, mut store) = open_store_with_depth(2);
    let l0 = create(&mut store, None, "L0");
    let l1 = create(&mut store, Some(&l0), "L1");
    let l2 = create(&mut store, Some(&l1), "L2");

    let err = store
        .create_document(CreateDocumentRequest {
            owner_id: owner(),
            parent_id: Some(l2.id),
            title: "L3".to_string(),
            content: String::new(),
        })
        .expect_err("too deep");
    assert!(matches!(err, StoreError::DepthExceeded));

    let other = create(&mut store, None, "Other");
    let nested = create(&mut store, Some(&other), "Nested");
    let err = move_to(&mut store, &l1, Some(&nested)).expect_err("subtree would be too deep");
    assert!(matches!(err, StoreError::DepthExceeded));
    let moved = move_to(&mut store, &l2, Some(&nested)).expect("single node fits");
    assert_eq!(moved.level, 2);
}

#[test]
fn document_path_lists_ancestors_root_first() {
    let (_dir, mut store) = open_store();
    let a = create(&mut store, None, "A");
    let b = create(&mut store, Some(&a), "B");
    let c = create(&mut store, Some(&b), "C");

    let titles: Vec<String> = store
        .document_path(owner(), c.id)
        .unwrap()
        .into_iter()
        .map(|d| d.title)
        .collect();
    assert_eq!(titles, vec!["A", "B", "C"]);

    let err = store
        .document_path(OwnerId::try_new(4).unwrap(), c.id)
        .expect_err("foreign owner");
    assert!(matches!(err, StoreError::NotFound));
}
