use std::cmp::{max, Ordering};
use tracing::trace;

use crate::store::types::Keyed;

type Link<R> = Option<Box<Node<R>>>;

#[derive(Debug)]
struct Node<R> {
    record: R,
    left: Link<R>,
    right: Link<R>,
    height: usize,
}

impl<R> Node<R> {
    fn new(record: R) -> Self {
        Self {
            record,
            left: None,
            right: None,
            height: 1,
        }
    }

    fn update_height(&mut self) {
        self.height = 1 + max(height(&self.left), height(&self.right));
    }

    fn balance(&self) -> isize {
        height(&self.left) as isize - height(&self.right) as isize
    }
}

fn height<R>(link: &Link<R>) -> usize {
    link.as_ref().map_or(0, |node| node.height)
}

fn balance<R>(link: &Link<R>) -> isize {
    link.as_ref().map_or(0, |node| node.balance())
}

/// Height-balanced binary search tree keyed by [`Keyed::key`].
///
/// Structural changes are followed by a single balance check at the root;
/// nodes below the root are not rebalanced. The root therefore stays close
/// to balanced while deep subtrees may drift, which is observable through
/// [`AvlTree::traverse`].
#[derive(Debug)]
pub struct AvlTree<R> {
    root: Link<R>,
    len: usize,
}

impl<R> AvlTree<R> {
    pub fn new() -> Self {
        Self { root: None, len: 0 }
    }

    /// Number of records in the tree
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.root.is_none()
    }

    /// Height of the whole tree, 0 when empty
    pub fn height(&self) -> usize {
        height(&self.root)
    }

    /// Left height minus right height at the root
    pub fn root_balance(&self) -> isize {
        balance(&self.root)
    }

    /// In-order walk yielding records in ascending key order.
    ///
    /// The iterator borrows the tree, so each call starts a fresh walk.
    pub fn traverse(&self) -> InOrder<'_, R> {
        InOrder::new(&self.root)
    }

    /// Records in ascending key order
    pub fn iter(&self) -> impl Iterator<Item = &R> {
        self.traverse().map(|entry| entry.record)
    }

    fn rotate_right(mut node: Box<Node<R>>) -> Box<Node<R>> {
        let Some(mut pivot) = node.left.take() else {
            return node;
        };
        node.left = pivot.right.take();
        node.update_height();
        pivot.right = Some(node);
        pivot.update_height();
        pivot
    }

    fn rotate_left(mut node: Box<Node<R>>) -> Box<Node<R>> {
        let Some(mut pivot) = node.right.take() else {
            return node;
        };
        node.right = pivot.left.take();
        node.update_height();
        pivot.left = Some(node);
        pivot.update_height();
        pivot
    }

    /// Single balance check at the root, run once per insert/delete
    fn rebalance_root(&mut self) {
        let Some(mut root) = self.root.take() else {
            return;
        };

        let root_balance = root.balance();
        if root_balance > 1 {
            if balance(&root.left) < 0 {
                trace!("left-right case at root");
                root.left = root.left.take().map(Self::rotate_left);
            }
            root = Self::rotate_right(root);
        } else if root_balance < -1 {
            if balance(&root.right) > 0 {
                trace!("right-left case at root");
                root.right = root.right.take().map(Self::rotate_right);
            }
            root = Self::rotate_left(root);
        }

        self.root = Some(root);
    }
}

impl<R: Keyed> AvlTree<R> {
    /// Insert a record whose key is not yet present.
    ///
    /// Keys are not deduplicated here: an equal key descends to the right
    /// and produces a second node. Callers check [`AvlTree::contains`] first.
    pub fn insert(&mut self, record: R) {
        let root = self.root.take();
        self.root = Some(Self::insert_at(root, record));
        self.len += 1;
        self.rebalance_root();
    }

    fn insert_at(link: Link<R>, record: R) -> Box<Node<R>> {
        match link {
            None => Box::new(Node::new(record)),
            Some(mut node) => {
                if record.key() < node.record.key() {
                    node.left = Some(Self::insert_at(node.left.take(), record));
                } else {
                    node.right = Some(Self::insert_at(node.right.take(), record));
                }
                node.update_height();
                node
            }
        }
    }

    /// Remove the record stored under `key`, returning it.
    ///
    /// An absent key leaves the tree untouched, including its shape.
    pub fn delete(&mut self, key: &str) -> Option<R> {
        let (root, removed) = Self::delete_at(self.root.take(), key);
        self.root = root;

        let removed = removed?;
        self.len -= 1;
        self.rebalance_root();
        Some(removed)
    }

    fn delete_at(link: Link<R>, key: &str) -> (Link<R>, Option<R>) {
        let Some(mut node) = link else {
            return (None, None);
        };

        let removed = match key.cmp(node.record.key()) {
            Ordering::Equal => {
                if node.left.is_none() {
                    let Node { record, right, .. } = *node;
                    return (right, Some(record));
                }
                if node.right.is_none() {
                    let Node { record, left, .. } = *node;
                    return (left, Some(record));
                }

                // Both children: the in-order successor takes this node's place
                // in the ordering and is removed from the right subtree, where
                // it has no left child.
                let successor_key = node
                    .right
                    .as_deref()
                    .map(|right| leftmost(right).record.key().to_owned());
                let Some(successor_key) = successor_key else {
                    return (Some(node), None);
                };
                let (right, successor) = Self::delete_at(node.right.take(), &successor_key);
                node.right = right;
                successor.map(|successor| std::mem::replace(&mut node.record, successor))
            }
            Ordering::Less => {
                let (left, removed) = Self::delete_at(node.left.take(), key);
                node.left = left;
                removed
            }
            Ordering::Greater => {
                let (right, removed) = Self::delete_at(node.right.take(), key);
                node.right = right;
                removed
            }
        };

        node.update_height();
        (Some(node), removed)
    }

    /// Find the record stored under `key`, visiting at most `height` nodes
    pub fn search(&self, key: &str) -> Option<&R> {
        let mut current = self.root.as_deref();
        while let Some(node) = current {
            match key.cmp(node.record.key()) {
                Ordering::Equal => return Some(&node.record),
                Ordering::Less => current = node.left.as_deref(),
                Ordering::Greater => current = node.right.as_deref(),
            }
        }
        None
    }

    /// Mutable access for in-place updates that leave the key unchanged
    pub fn search_mut(&mut self, key: &str) -> Option<&mut R> {
        let mut current = self.root.as_deref_mut();
        while let Some(node) = current {
            match key.cmp(node.record.key()) {
                Ordering::Equal => return Some(&mut node.record),
                Ordering::Less => current = node.left.as_deref_mut(),
                Ordering::Greater => current = node.right.as_deref_mut(),
            }
        }
        None
    }

    pub fn contains(&self, key: &str) -> bool {
        self.search(key).is_some()
    }
}

fn leftmost<R>(mut node: &Node<R>) -> &Node<R> {
    while let Some(left) = node.left.as_deref() {
        node = left;
    }
    node
}

impl<R> Default for AvlTree<R> {
    fn default() -> Self {
        Self::new()
    }
}

// Root-only rebalancing lets the tree degenerate into long spines, so
// dropping must not recurse through the boxes.
impl<R> Drop for AvlTree<R> {
    fn drop(&mut self) {
        let mut pending: Vec<Box<Node<R>>> = self.root.take().into_iter().collect();
        while let Some(mut node) = pending.pop() {
            pending.extend(node.left.take());
            pending.extend(node.right.take());
        }
    }
}

/// One node as seen by an in-order walk
#[derive(Debug, PartialEq)]
pub struct TreeEntry<'a, R> {
    /// Distance from the root, which has depth 0
    pub depth: usize,
    /// Cached height of the node's subtree
    pub height: usize,
    /// Left height minus right height at this node
    pub balance: isize,
    pub record: &'a R,
}

/// Lazy in-order iterator over an [`AvlTree`]
pub struct InOrder<'a, R> {
    stack: Vec<(&'a Node<R>, usize)>,
}

impl<'a, R> InOrder<'a, R> {
    fn new(root: &'a Link<R>) -> Self {
        let mut iter = Self { stack: Vec::new() };
        iter.push_left_spine(root.as_deref(), 0);
        iter
    }

    fn push_left_spine(&mut self, mut next: Option<&'a Node<R>>, mut depth: usize) {
        while let Some(node) = next {
            self.stack.push((node, depth));
            next = node.left.as_deref();
            depth += 1;
        }
    }
}

impl<'a, R> Iterator for InOrder<'a, R> {
    type Item = TreeEntry<'a, R>;

    fn next(&mut self) -> Option<Self::Item> {
        let (node, depth) = self.stack.pop()?;
        self.push_left_spine(node.right.as_deref(), depth + 1);

        Some(TreeEntry {
            depth,
            height: node.height,
            balance: node.balance(),
            record: &node.record,
        })
    }
}
