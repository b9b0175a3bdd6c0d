#![forbid(unsafe_code)]

use crate::ids::DocumentId;
use crate::model::Document;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TreeNode {
    #[serde(flatten)]
    pub document: Document,
    pub children: Vec<TreeNode>,
}

impl TreeNode {
    fn leaf(document: Document, capacity: usize) -> Self {
        Self {
            document,
            children: Vec::with_capacity(capacity),
        }
    }

    pub fn id(&self) -> DocumentId {
        self.document.id
    }

    pub fn find(&self, id: DocumentId) -> Option<&TreeNode> {
        let mut pending = vec![self];
        while let Some(node) = pending.pop() {
            if node.id() == id {
                return Some(node);
            }
            pending.extend(node.children.iter());
        }
        None
    }

    /// Number of nodes in this subtree, including the node itself.
    pub fn size(&self) -> usize {
        1 + self.children.iter().map(TreeNode::size).sum::<usize>()
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Forest {
    pub roots: Vec<TreeNode>,
    /// Rows whose parent chain never reaches a root: the parent is absent from
    /// the input or the rows form a cycle.
    pub unreachable: Vec<DocumentId>,
}

impl Forest {
    pub fn find(&self, id: DocumentId) -> Option<&TreeNode> {
        self.roots.iter().find_map(|root| root.find(id))
    }

    pub fn size(&self) -> usize {
        self.roots.iter().map(TreeNode::size).sum()
    }
}

struct Frame {
    node: TreeNode,
    pending: std::vec::IntoIter<Document>,
}

impl Frame {
    fn open(document: Document, children: &mut HashMap<DocumentId, Vec<Document>>) -> Self {
        let kids = children.remove(&document.id).unwrap_or_default();
        Self {
            node: TreeNode::leaf(document, kids.len()),
            pending: kids.into_iter(),
        }
    }
}

fn sibling_order(a: &Document, b: &Document) -> std::cmp::Ordering {
    a.sort_order.cmp(&b.sort_order).then(a.id.cmp(&b.id))
}

/// Assembles a forest from flat rows in a single grouping pass.
///
/// Rows are grouped by `parent_id`, siblings ordered by `(sort_order, id)`,
/// and every reachable row is visited exactly once. Assembly uses an explicit
/// stack, so neither deep chains nor cyclic parent links can overflow it.
pub fn build_forest(rows: Vec<Document>) -> Forest {
    let mut roots = Vec::new();
    let mut children: HashMap<DocumentId, Vec<Document>> = HashMap::new();

    for row in rows {
        match row.parent_id {
            None => roots.push(row),
            Some(parent) => children.entry(parent).or_default().push(row),
        }
    }

    roots.sort_by(sibling_order);
    for siblings in children.values_mut() {
        siblings.sort_by(sibling_order);
    }

    let mut assembled = Vec::with_capacity(roots.len());
    for root in roots {
        let mut stack = vec![Frame::open(root, &mut children)];
        while let Some(frame) = stack.last_mut() {
            if let Some(next) = frame.pending.next() {
                let opened = Frame::open(next, &mut children);
                stack.push(opened);
                continue;
            }
            if let Some(finished) = stack.pop() {
                match stack.last_mut() {
                    Some(parent) => parent.node.children.push(finished.node),
                    None => assembled.push(finished.node),
                }
            }
        }
    }

    let mut unreachable: Vec<DocumentId> = children
        .into_values()
        .flatten()
        .map(|row| row.id)
        .collect();
    unreachable.sort();

    Forest {
        roots: assembled,
        unreachable,
    }
}
