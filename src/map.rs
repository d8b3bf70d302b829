//! An ordered map implemented with an AVL tree.

use std::borrow::Borrow;
use std::cmp::{self, Ordering};
use std::fmt;
use std::iter::FromIterator;
use std::str::FromStr;

use log::trace;

use crate::error::{Error, Result};

/// An ordered map implemented with an AVL tree.
///
/// Nodes are kept in an arena owned by the tree. Child and parent links are
/// indices into that arena, so dropping the tree releases every node at once.
///
/// ```
/// use avl_wordfreq::BalancedTree;
/// let mut tree = BalancedTree::new();
/// tree.insert(10, "ten");
/// tree.insert(20, "twenty");
/// tree.insert(30, "thirty");
/// assert_eq!(tree.pre_order(), vec![&20, &10, &30]);
/// assert_eq!(tree.find(&10).ok(), Some(&"ten"));
/// assert!(tree.find(&40).is_err());
/// ```
#[derive(Clone)]
pub struct BalancedTree<K, V> {
    nodes: Vec<Node<K, V>>,
    root: Link,
}

#[derive(Clone)]
struct Node<K, V> {
    key: K,
    value: V,
    left: Link,
    right: Link,
    parent: Link,
    height: usize,
}

/// Position of a node in the arena.
type NodeIdx = usize;
type Link = Option<NodeIdx>;

#[derive(Clone, Copy)]
enum Side {
    Left,
    Right,
}

/// Outcome of descending the tree looking for a key.
enum Slot {
    Occupied(NodeIdx),
    Vacant(Link, Side),
}

#[allow(clippy::enum_variant_names)]
enum Direction {
    FromParent,
    FromLeft,
    FromRight,
}

/// Order in which a traversal visits the keys of a tree.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Order {
    /// Node, then left subtree, then right subtree.
    Pre,
    /// Left subtree, then node, then right subtree. Yields keys sorted ascending.
    In,
    /// Left subtree, then right subtree, then node.
    Post,
}

impl FromStr for Order {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "pre" | "preorder" | "pre-order" => Ok(Order::Pre),
            "in" | "inorder" | "in-order" => Ok(Order::In),
            "post" | "postorder" | "post-order" => Ok(Order::Post),
            _ => Err(Error::UnknownOrder(s.to_string())),
        }
    }
}

impl fmt::Display for Order {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Order::Pre => "pre-order",
            Order::In => "in-order",
            Order::Post => "post-order",
        })
    }
}

impl<K, V> BalancedTree<K, V> {
    /// Creates an empty tree.
    /// No memory is allocated until the first item is inserted.
    pub fn new() -> Self {
        Self {
            nodes: Vec::new(),
            root: None,
        }
    }

    /// Returns true if the tree contains no elements.
    pub fn is_empty(&self) -> bool {
        self.root.is_none()
    }

    /// Returns the number of distinct keys in the tree.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Returns the height of the root node, or `None` for an empty tree.
    /// A tree holding a single key has height 0.
    pub fn height(&self) -> Option<usize> {
        self.root.map(|root_idx| self.nodes[root_idx].height)
    }

    /// Clears the tree, deallocating all nodes.
    pub fn clear(&mut self) {
        self.nodes.clear();
        self.root = None;
    }

    /// Returns the keys in pre-order (node, left, right).
    pub fn pre_order(&self) -> Vec<&K> {
        let nodes = &self.nodes;
        let mut keys = Vec::with_capacity(nodes.len());
        self.traverse(|node_idx| keys.push(&nodes[node_idx].key), |_| {}, |_| {});
        keys
    }

    /// Returns the keys in in-order (left, node, right), i.e. sorted ascending.
    pub fn in_order(&self) -> Vec<&K> {
        let nodes = &self.nodes;
        let mut keys = Vec::with_capacity(nodes.len());
        self.traverse(|_| {}, |node_idx| keys.push(&nodes[node_idx].key), |_| {});
        keys
    }

    /// Returns the keys in post-order (left, right, node).
    pub fn post_order(&self) -> Vec<&K> {
        let nodes = &self.nodes;
        let mut keys = Vec::with_capacity(nodes.len());
        self.traverse(|_| {}, |_| {}, |node_idx| keys.push(&nodes[node_idx].key));
        keys
    }

    /// Returns the keys in the given traversal order.
    pub fn traverse_keys(&self, order: Order) -> Vec<&K> {
        match order {
            Order::Pre => self.pre_order(),
            Order::In => self.in_order(),
            Order::Post => self.post_order(),
        }
    }

    // Walks the tree along child and parent links without recursion,
    // calling the matching callback when a node is entered, passed from the
    // left and left for the last time.
    fn traverse<Pre, In, Post>(&self, mut preorder: Pre, mut inorder: In, mut postorder: Post)
    where
        Pre: FnMut(NodeIdx),
        In: FnMut(NodeIdx),
        Post: FnMut(NodeIdx),
    {
        if let Some(mut node_idx) = self.root {
            let mut dir = Direction::FromParent;
            loop {
                let node = &self.nodes[node_idx];
                match dir {
                    Direction::FromParent => {
                        preorder(node_idx);
                        if let Some(left_idx) = node.left {
                            node_idx = left_idx;
                        } else {
                            dir = Direction::FromLeft;
                        }
                    }
                    Direction::FromLeft => {
                        inorder(node_idx);
                        if let Some(right_idx) = node.right {
                            node_idx = right_idx;
                            dir = Direction::FromParent;
                        } else {
                            dir = Direction::FromRight;
                        }
                    }
                    Direction::FromRight => {
                        postorder(node_idx);
                        match node.parent {
                            Some(parent_idx) => {
                                if self.nodes[parent_idx].left == Some(node_idx) {
                                    dir = Direction::FromLeft;
                                } else {
                                    dir = Direction::FromRight;
                                }
                                node_idx = parent_idx;
                            }
                            None => break,
                        }
                    }
                }
            }
        }
    }

    fn left_height(&self, node_idx: NodeIdx) -> usize {
        match self.nodes[node_idx].left {
            None => 0,
            Some(left_idx) => self.nodes[left_idx].height + 1,
        }
    }

    fn right_height(&self, node_idx: NodeIdx) -> usize {
        match self.nodes[node_idx].right {
            None => 0,
            Some(right_idx) => self.nodes[right_idx].height + 1,
        }
    }

    fn adjust_height(&mut self, node_idx: NodeIdx) {
        self.nodes[node_idx].height =
            cmp::max(self.left_height(node_idx), self.right_height(node_idx));
    }

    fn set_child(&mut self, parent_idx: NodeIdx, side: Side, child: Link) {
        let parent = &mut self.nodes[parent_idx];
        match side {
            Side::Left => parent.left = child,
            Side::Right => parent.right = child,
        }
    }
}

impl<K: Ord, V> BalancedTree<K, V> {
    /// Returns true if the tree contains the key.
    pub fn contains<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        self.find_node(key).is_some()
    }

    /// Returns a reference to the value stored for the key.
    pub fn get<Q>(&self, key: &Q) -> Option<&V>
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        self.find_node(key).map(|node_idx| &self.nodes[node_idx].value)
    }

    /// Returns a mutable reference to the value stored for the key.
    /// Keys are never handed out mutably, so the ordering cannot be broken.
    pub fn get_mut<Q>(&mut self, key: &Q) -> Option<&mut V>
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        self.find_node(key)
            .map(move |node_idx| &mut self.nodes[node_idx].value)
    }

    /// Returns a reference to the value stored for the key.
    ///
    /// Fails with [`Error::ElementNotFound`] if the key is absent.
    pub fn find<Q>(&self, key: &Q) -> Result<&V>
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        self.get(key).ok_or(Error::ElementNotFound)
    }

    /// Returns a mutable reference to the value stored for the key.
    ///
    /// Fails with [`Error::ElementNotFound`] if the key is absent.
    pub fn find_mut<Q>(&mut self, key: &Q) -> Result<&mut V>
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        self.get_mut(key).ok_or(Error::ElementNotFound)
    }

    /// Inserts a key-value pair into the tree.
    /// Returns false, leaving the tree untouched, if the key is already present.
    pub fn insert(&mut self, key: K, value: V) -> bool {
        match self.find_slot(&key) {
            Slot::Occupied(_) => false,
            Slot::Vacant(parent, side) => {
                self.attach(parent, side, key, value);
                true
            }
        }
    }

    /// Inserts `value` for an absent key, or applies `f` to the value already
    /// stored for it. Returns whether a new key was inserted.
    ///
    /// ```
    /// use avl_wordfreq::BalancedTree;
    /// let mut counts = BalancedTree::new();
    /// counts.upsert("the", 1, |n| *n += 1);
    /// counts.upsert("the", 1, |n| *n += 1);
    /// assert_eq!(counts.get("the"), Some(&2));
    /// ```
    pub fn upsert<F>(&mut self, key: K, value: V, f: F) -> bool
    where
        F: FnOnce(&mut V),
    {
        match self.find_slot(&key) {
            Slot::Occupied(node_idx) => {
                f(&mut self.nodes[node_idx].value);
                false
            }
            Slot::Vacant(parent, side) => {
                self.attach(parent, side, key, value);
                true
            }
        }
    }

    /// Asserts that the internal tree structure is consistent.
    #[cfg(any(test, feature = "consistency_check"))]
    pub fn check_consistency(&self) {
        // Check root link
        match self.root {
            Some(root_idx) => assert!(self.nodes[root_idx].parent.is_none()),
            None => assert!(self.nodes.is_empty()),
        }

        // Check tree nodes
        let mut num_nodes = 0;
        let mut visited = vec![false; self.nodes.len()];
        self.traverse(
            |node_idx| {
                let node = &self.nodes[node_idx];
                assert!(!visited[node_idx]);
                visited[node_idx] = true;

                let mut height = 0;
                let mut left_height = 0;
                let mut right_height = 0;

                // Check link for left child node
                if let Some(left_idx) = node.left {
                    let left = &self.nodes[left_idx];
                    assert_eq!(left.parent, Some(node_idx));
                    assert!(left.key < node.key);
                    left_height = left.height + 1;
                    height = cmp::max(height, left_height);
                }

                // Check link for right child node
                if let Some(right_idx) = node.right {
                    let right = &self.nodes[right_idx];
                    assert_eq!(right.parent, Some(node_idx));
                    assert!(right.key > node.key);
                    right_height = right.height + 1;
                    height = cmp::max(height, right_height);
                }

                // Check height
                assert_eq!(node.height, height);

                // Check AVL condition (nearly balance)
                assert!(left_height <= right_height + 1);
                assert!(right_height <= left_height + 1);

                num_nodes += 1;
            },
            |_| {},
            |_| {},
        );

        // Check number of nodes, every arena slot must be reachable
        assert_eq!(num_nodes, self.nodes.len());

        // Check global key order
        let keys = self.in_order();
        assert!(keys.windows(2).all(|pair| pair[0] < pair[1]));
    }

    fn find_node<Q>(&self, key: &Q) -> Link
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        let mut current = self.root;
        while let Some(node_idx) = current {
            let node = &self.nodes[node_idx];
            current = match key.cmp(node.key.borrow()) {
                Ordering::Equal => break,
                Ordering::Less => node.left,
                Ordering::Greater => node.right,
            };
        }
        current
    }

    fn find_slot(&self, key: &K) -> Slot {
        let mut parent: Link = None;
        let mut side = Side::Left;
        let mut current = self.root;
        while let Some(node_idx) = current {
            let node = &self.nodes[node_idx];
            match key.cmp(&node.key) {
                Ordering::Equal => return Slot::Occupied(node_idx),
                Ordering::Less => {
                    side = Side::Left;
                    current = node.left;
                }
                Ordering::Greater => {
                    side = Side::Right;
                    current = node.right;
                }
            }
            parent = Some(node_idx);
        }
        Slot::Vacant(parent, side)
    }

    fn attach(&mut self, parent: Link, side: Side, key: K, value: V) {
        let node_idx = self.nodes.len();
        self.nodes.push(Node::new(parent, key, value));
        match parent {
            None => self.root = Some(node_idx),
            Some(parent_idx) => self.set_child(parent_idx, side, Some(node_idx)),
        }
        self.rebalance_once(node_idx);
    }

    /// Lifts the right child of the node into its place.
    fn rotate_left(&mut self, node_idx: NodeIdx) {
        if let Some(right_idx) = self.nodes[node_idx].right {
            let right_left = self.nodes[right_idx].left;
            self.nodes[node_idx].right = right_left;
            if let Some(right_left_idx) = right_left {
                self.nodes[right_left_idx].parent = Some(node_idx);
            }

            let parent = self.nodes[node_idx].parent;
            self.nodes[right_idx].left = Some(node_idx);
            self.nodes[node_idx].parent = Some(right_idx);
            self.replace_in_parent(parent, right_idx);
        }
    }

    /// Lifts the left child of the node into its place.
    fn rotate_right(&mut self, node_idx: NodeIdx) {
        if let Some(left_idx) = self.nodes[node_idx].left {
            let left_right = self.nodes[left_idx].right;
            self.nodes[node_idx].left = left_right;
            if let Some(left_right_idx) = left_right {
                self.nodes[left_right_idx].parent = Some(node_idx);
            }

            let parent = self.nodes[node_idx].parent;
            self.nodes[left_idx].right = Some(node_idx);
            self.nodes[node_idx].parent = Some(left_idx);
            self.replace_in_parent(parent, left_idx);
        }
    }

    // Hangs a rotated-up node where its former parent used to be. The side
    // under the parent comes from key order, not from the old link.
    fn replace_in_parent(&mut self, parent: Link, node_idx: NodeIdx) {
        self.nodes[node_idx].parent = parent;
        match parent {
            None => self.root = Some(node_idx),
            Some(parent_idx) => {
                let side = if self.nodes[node_idx].key < self.nodes[parent_idx].key {
                    Side::Left
                } else {
                    Side::Right
                };
                self.set_child(parent_idx, side, Some(node_idx));
            }
        }
    }

    /// Adjusts heights from the parent of the inserted node up to the root.
    /// Stops after the first rebalance operation.
    /// This is enough to restore balance after a single insert operation.
    fn rebalance_once(&mut self, inserted_idx: NodeIdx) {
        let mut current = self.nodes[inserted_idx].parent;
        while let Some(node_idx) = current {
            let parent = self.nodes[node_idx].parent;
            if self.rebalance_node(node_idx, inserted_idx) {
                break;
            }
            current = parent;
        }
    }

    /// Restores the AVL condition at the given node if necessary, otherwise adjusts its height.
    /// The rotation case is picked by comparing the inserted key against the heavy child.
    /// Returns whether rebalancing had been necessary.
    fn rebalance_node(&mut self, node_idx: NodeIdx, inserted_idx: NodeIdx) -> bool {
        let left_height = self.left_height(node_idx);
        let right_height = self.right_height(node_idx);
        debug_assert!(left_height <= right_height + 2);
        debug_assert!(right_height <= left_height + 2);

        let node = &self.nodes[node_idx];
        match (node.left, node.right) {
            (Some(left_idx), _) if left_height > right_height + 1 => {
                if self.nodes[inserted_idx].key < self.nodes[left_idx].key {
                    trace!("rebalance: left-left");
                } else {
                    trace!("rebalance: left-right");
                    self.rotate_left(left_idx);
                }
                self.rotate_right(node_idx);
                self.adjust_rotated(node_idx);
                true
            }
            (_, Some(right_idx)) if right_height > left_height + 1 => {
                if self.nodes[inserted_idx].key > self.nodes[right_idx].key {
                    trace!("rebalance: right-right");
                } else {
                    trace!("rebalance: right-left");
                    self.rotate_right(right_idx);
                }
                self.rotate_left(node_idx);
                self.adjust_rotated(node_idx);
                true
            }
            _ => {
                self.adjust_height(node_idx);
                false
            }
        }
    }

    // After a rotation the formerly unbalanced node hangs below the new
    // subtree root; both children of that root are recomputed before it.
    fn adjust_rotated(&mut self, unbalanced_idx: NodeIdx) {
        if let Some(subtree_idx) = self.nodes[unbalanced_idx].parent {
            let subtree = &self.nodes[subtree_idx];
            let (left, right) = (subtree.left, subtree.right);
            if let Some(left_idx) = left {
                self.adjust_height(left_idx);
            }
            if let Some(right_idx) = right {
                self.adjust_height(right_idx);
            }
            self.adjust_height(subtree_idx);
        }
    }
}

impl<K, V> Default for BalancedTree<K, V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: fmt::Debug, V: fmt::Debug> fmt::Debug for BalancedTree<K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut map = f.debug_map();
        self.traverse(
            |_| {},
            |node_idx| {
                let node = &self.nodes[node_idx];
                map.entry(&node.key, &node.value);
            },
            |_| {},
        );
        map.finish()
    }
}

impl<K: Ord, V> FromIterator<(K, V)> for BalancedTree<K, V> {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut tree = Self::new();
        tree.extend(iter);
        tree
    }
}

impl<K: Ord, V> Extend<(K, V)> for BalancedTree<K, V> {
    fn extend<I: IntoIterator<Item = (K, V)>>(&mut self, iter: I) {
        for (key, value) in iter {
            self.insert(key, value);
        }
    }
}

impl<K, V> Node<K, V> {
    fn new(parent: Link, key: K, value: V) -> Self {
        Node {
            key,
            value,
            parent,
            left: None,
            right: None,
            height: 0,
        }
    }
}
