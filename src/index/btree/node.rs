//! B+ tree nodes.
//!
//! A [`Node`] is either a [`LeafNode`] (keys with value lists) or an
//! [`InternalNode`] (separator keys with owned child subtrees). Splitting
//! consumes a node and hands back a [`Split`]: two fresh siblings plus the
//! separator key for the caller to install.
//!
//! # Split layout
//! ```text
//! order = 4, mid = order / 2 - 1 = 1
//!
//!   leaf  [a b c d]             (full: separator at mid)
//!   left  [a]   separator b   right [c d]
//!
//!   leaf  [a b c d e]           (overfull: separator at mid + 1)
//!   left  [a b] separator c   right [d e]
//! ```

use std::borrow::Borrow;

/// Split point `order / 2 - 1`, shared by leaf and internal splits.
#[inline]
pub(crate) fn split_index(order: usize) -> usize {
    order / 2 - 1
}

/// Result of splitting a node: two siblings and the key that separates them.
///
/// Every key in `left` is below `separator`; every key in `right` is at or
/// above it.
#[derive(Debug)]
pub struct Split<K, V> {
    pub separator: K,
    pub left: Node<K, V>,
    pub right: Node<K, V>,
}

/// A node in the tree.
#[derive(Debug, Clone)]
pub enum Node<K, V> {
    Leaf(LeafNode<K, V>),
    Internal(InternalNode<K, V>),
}

impl<K, V> Node<K, V> {
    /// Create an empty leaf.
    pub fn new_leaf(order: usize) -> Self {
        Node::Leaf(LeafNode::new(order))
    }

    /// Keys stored in this node.
    #[inline]
    pub fn keys(&self) -> &[K] {
        match self {
            Node::Leaf(leaf) => leaf.keys(),
            Node::Internal(internal) => internal.keys(),
        }
    }

    /// Maximum number of keys this node may hold.
    #[inline]
    pub fn order(&self) -> usize {
        match self {
            Node::Leaf(leaf) => leaf.order,
            Node::Internal(internal) => internal.order,
        }
    }

    #[inline]
    pub fn is_leaf(&self) -> bool {
        matches!(self, Node::Leaf(_))
    }

    /// Number of keys in this node.
    #[inline]
    pub fn len(&self) -> usize {
        self.keys().len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.keys().is_empty()
    }

    /// Check if the node holds exactly `order` keys.
    #[inline]
    pub fn is_full(&self) -> bool {
        self.len() == self.order()
    }

    /// Child subtrees in key order (empty for a leaf).
    pub fn children(&self) -> &[Node<K, V>] {
        match self {
            Node::Leaf(_) => &[],
            Node::Internal(internal) => internal.children(),
        }
    }

    pub fn as_leaf(&self) -> Option<&LeafNode<K, V>> {
        match self {
            Node::Leaf(leaf) => Some(leaf),
            Node::Internal(_) => None,
        }
    }

    pub fn as_internal(&self) -> Option<&InternalNode<K, V>> {
        match self {
            Node::Leaf(_) => None,
            Node::Internal(internal) => Some(internal),
        }
    }

    /// Depth-first, pre-order walk over this subtree.
    ///
    /// Yields `(depth, node)` with this node at depth 0. The walk is lazy and
    /// holds no state in the tree, so it can be restarted at any time.
    pub fn traverse(&self) -> Traverse<'_, K, V> {
        Traverse {
            stack: vec![(0, self)],
        }
    }
}

// ============================================================================
// Leaf nodes
// ============================================================================

/// A leaf: sorted keys, each with the values inserted under it.
#[derive(Debug, Clone)]
pub struct LeafNode<K, V> {
    order: usize,
    keys: Vec<K>,
    /// `values[i]` belongs to `keys[i]`, in insertion order.
    values: Vec<Vec<V>>,
}

impl<K, V> LeafNode<K, V> {
    /// Create an empty leaf with the given capacity.
    pub fn new(order: usize) -> Self {
        Self {
            order,
            keys: Vec::with_capacity(order + 1),
            values: Vec::with_capacity(order + 1),
        }
    }

    #[inline]
    pub fn keys(&self) -> &[K] {
        &self.keys
    }

    #[inline]
    pub fn values(&self) -> &[Vec<V>] {
        &self.values
    }

    #[inline]
    pub fn order(&self) -> usize {
        self.order
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.keys.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    /// Check if the leaf holds exactly `order` keys.
    #[inline]
    pub fn is_full(&self) -> bool {
        self.keys.len() == self.order
    }

    /// Check if the leaf went past capacity and must be split.
    #[inline]
    pub fn is_overfull(&self) -> bool {
        self.keys.len() > self.order
    }

    /// Values stored under `key`, in insertion order.
    pub fn get<Q>(&self, key: &Q) -> Option<&[V]>
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        self.keys
            .binary_search_by(|k| key.cmp(k.borrow()).reverse())
            .ok()
            .map(|i| self.values[i].as_slice())
    }

    /// Insert `value` under `key`, keeping keys sorted.
    ///
    /// An existing key gets the value appended to its list. There is no
    /// capacity check here: a full leaf may go one key over `order`, and the
    /// caller must split it right away.
    pub fn add(&mut self, key: K, value: V)
    where
        K: Ord,
    {
        match self.keys.binary_search(&key) {
            Ok(i) => self.values[i].push(value),
            Err(i) => {
                self.keys.insert(i, key);
                self.values.insert(i, vec![value]);
            }
        }
    }

    /// Split into two leaves, promoting the first key of the right half.
    ///
    /// The separator sits at `mid` for a full leaf and at `mid + 1` for an
    /// overfull one. The left leaf keeps every key before it; the separator
    /// is dropped from the right leaf together with its values.
    ///
    /// # Panics
    /// Panics if the leaf holds fewer than `order` keys.
    pub fn split(mut self) -> Split<K, V> {
        let at = self.separator_index();

        let mut right_keys = self.keys.split_off(at);
        let mut right_values = self.values.split_off(at);
        let separator = right_keys.remove(0);
        right_values.remove(0);

        self.into_split(separator, right_keys, right_values)
    }

    /// Split into two leaves, copying the separator up.
    ///
    /// Same layout as [`split`](Self::split), except the separator's entry
    /// stays as the first entry of the right leaf, so no value is lost.
    ///
    /// # Panics
    /// Panics if the leaf holds fewer than `order` keys.
    pub fn split_retaining(mut self) -> Split<K, V>
    where
        K: Clone,
    {
        let at = self.separator_index();

        let right_keys = self.keys.split_off(at);
        let right_values = self.values.split_off(at);
        let separator = right_keys[0].clone();

        self.into_split(separator, right_keys, right_values)
    }

    /// Move the contents out, leaving an empty leaf of the same order.
    pub(crate) fn take(&mut self) -> Self {
        let order = self.order;
        std::mem::replace(self, LeafNode::new(order))
    }

    /// Position of the separator: `mid` plus however far past `order` the
    /// leaf has grown.
    fn separator_index(&self) -> usize {
        assert!(
            self.keys.len() >= self.order,
            "leaf split needs at least {} keys, has {}",
            self.order,
            self.keys.len()
        );
        split_index(self.order) + (self.keys.len() - self.order)
    }

    fn into_split(self, separator: K, right_keys: Vec<K>, right_values: Vec<Vec<V>>) -> Split<K, V> {
        let right = LeafNode {
            order: self.order,
            keys: right_keys,
            values: right_values,
        };
        Split {
            separator,
            left: Node::Leaf(self),
            right: Node::Leaf(right),
        }
    }
}

// ============================================================================
// Internal nodes
// ============================================================================

/// An internal node: separator keys and the subtrees between them.
///
/// `children[i]` covers keys in `[keys[i - 1], keys[i])`, with open ends at
/// the first and last child.
#[derive(Debug, Clone)]
pub struct InternalNode<K, V> {
    order: usize,
    keys: Vec<K>,
    children: Vec<Node<K, V>>,
}

impl<K, V> InternalNode<K, V> {
    /// Build the one-key parent of a freshly split node.
    pub fn from_split(order: usize, split: Split<K, V>) -> Self {
        let mut keys = Vec::with_capacity(order + 1);
        keys.push(split.separator);
        let mut children = Vec::with_capacity(order + 2);
        children.push(split.left);
        children.push(split.right);
        Self {
            order,
            keys,
            children,
        }
    }

    #[inline]
    pub fn keys(&self) -> &[K] {
        &self.keys
    }

    #[inline]
    pub fn children(&self) -> &[Node<K, V>] {
        &self.children
    }

    #[inline]
    pub fn order(&self) -> usize {
        self.order
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.keys.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    #[inline]
    pub fn is_full(&self) -> bool {
        self.keys.len() == self.order
    }

    #[inline]
    pub fn is_overfull(&self) -> bool {
        self.keys.len() > self.order
    }

    /// Index of the child whose range contains `key`: the first `i` with
    /// `key < keys[i]`, or `keys.len()` if there is none.
    ///
    /// # Panics
    /// Panics if the node has no keys.
    pub fn locate_index<Q>(&self, key: &Q) -> usize
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        assert!(!self.keys.is_empty(), "locate on internal node with no keys");
        self.keys.partition_point(|k| key.cmp(k.borrow()).is_ge())
    }

    /// The child covering `key` and its index.
    ///
    /// # Panics
    /// Panics if the node has no keys.
    pub fn locate<Q>(&self, key: &Q) -> (&Node<K, V>, usize)
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        let index = self.locate_index(key);
        (&self.children[index], index)
    }

    /// Mutable variant of [`locate`](Self::locate).
    pub fn locate_mut<Q>(&mut self, key: &Q) -> (&mut Node<K, V>, usize)
    where
        K: Borrow<Q>,
        Q: Ord + ?Sized,
    {
        let index = self.locate_index(key);
        (&mut self.children[index], index)
    }

    /// Fold a split child back into this node.
    ///
    /// Drops the stale slot at `index` and splices the separator plus both
    /// halves in at the separator's sorted position.
    pub fn promote(&mut self, index: usize, split: Split<K, V>)
    where
        K: Ord,
    {
        let Split {
            separator,
            left,
            right,
        } = split;

        self.children.remove(index);
        let pos = self.keys.partition_point(|k| *k < separator);
        debug_assert_eq!(pos, index, "separator landed outside its slot");

        self.keys.insert(pos, separator);
        self.children.insert(pos, right);
        self.children.insert(pos, left);
    }

    /// Replace the child at `index` with a one-key internal node built from
    /// `split`, leaving this node's keys untouched.
    pub fn install_split(&mut self, index: usize, split: Split<K, V>) {
        self.children[index] = Node::Internal(InternalNode::from_split(self.order, split));
    }

    /// Move the contents out, leaving a node with no keys or children.
    pub(crate) fn take(&mut self) -> Self {
        Self {
            order: self.order,
            keys: std::mem::take(&mut self.keys),
            children: std::mem::take(&mut self.children),
        }
    }

    /// Split into two internal nodes, moving the middle key up.
    ///
    /// Left keeps `keys[..=mid]` and `children[..=mid + 1]`; `keys[mid + 1]`
    /// becomes the separator; right takes the rest.
    ///
    /// # Panics
    /// Panics if the node holds fewer than `mid + 2` keys.
    pub fn split(mut self) -> Split<K, V> {
        let mid = split_index(self.order);
        assert!(
            self.keys.len() >= mid + 2,
            "internal split needs at least {} keys, has {}",
            mid + 2,
            self.keys.len()
        );

        let mut right_keys = self.keys.split_off(mid + 1);
        let separator = right_keys.remove(0);
        let right_children = self.children.split_off(mid + 2);

        let right = InternalNode {
            order: self.order,
            keys: right_keys,
            children: right_children,
        };
        Split {
            separator,
            left: Node::Internal(self),
            right: Node::Internal(right),
        }
    }
}

// ============================================================================
// Traversal
// ============================================================================

/// Pre-order iterator returned by [`Node::traverse`].
pub struct Traverse<'a, K, V> {
    stack: Vec<(usize, &'a Node<K, V>)>,
}

impl<'a, K, V> Iterator for Traverse<'a, K, V> {
    type Item = (usize, &'a Node<K, V>);

    fn next(&mut self) -> Option<Self::Item> {
        let (depth, node) = self.stack.pop()?;
        // Reverse so the leftmost child is visited first.
        for child in node.children().iter().rev() {
            self.stack.push((depth + 1, child));
        }
        Some((depth, node))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn leaf_with(order: usize, keys: &[&'static str]) -> LeafNode<&'static str, usize> {
        let mut leaf = LeafNode::new(order);
        for (i, key) in keys.iter().enumerate() {
            leaf.add(*key, i);
        }
        leaf
    }

    #[test]
    fn test_add_to_empty_leaf() {
        let mut leaf = LeafNode::new(4);
        leaf.add("a", "alpha");

        assert_eq!(leaf.keys(), &["a"]);
        assert_eq!(leaf.get("a"), Some(&["alpha"][..]));
        assert!(!leaf.is_full());
    }

    #[test]
    fn test_add_keeps_keys_sorted() {
        let leaf = leaf_with(8, &["d", "b", "e", "a", "c"]);
        assert_eq!(leaf.keys(), &["a", "b", "c", "d", "e"]);
        // Values follow their keys through the shifts.
        assert_eq!(leaf.get("d"), Some(&[0][..]));
        assert_eq!(leaf.get("a"), Some(&[3][..]));
    }

    #[test]
    fn test_add_duplicate_appends() {
        let mut leaf = LeafNode::new(4);
        leaf.add("a", 1);
        leaf.add("b", 2);
        leaf.add("a", 3);

        assert_eq!(leaf.len(), 2);
        assert_eq!(leaf.get("a"), Some(&[1, 3][..]));
    }

    #[test]
    fn test_is_full_and_overfull() {
        let mut leaf = leaf_with(4, &["a", "b", "c"]);
        assert!(!leaf.is_full());

        leaf.add("d", 3);
        assert!(leaf.is_full());
        assert!(!leaf.is_overfull());

        // Capacity is checked after insertion, so a fifth key is accepted.
        leaf.add("e", 4);
        assert!(!leaf.is_full());
        assert!(leaf.is_overfull());
    }

    #[test]
    fn test_leaf_split_drops_separator() {
        let leaf = leaf_with(4, &["a", "b", "c", "d", "e"]);
        let split = leaf.split();

        assert_eq!(split.separator, "c");
        assert_eq!(split.left.keys(), &["a", "b"]);
        assert_eq!(split.right.keys(), &["d", "e"]);
        assert!(split.left.is_leaf());
        assert!(split.right.is_leaf());
    }

    #[test]
    fn test_leaf_split_at_capacity() {
        let leaf = leaf_with(4, &["a", "b", "c", "d"]);
        let split = leaf.split();

        // Full leaf: one key left, separator dropped from a right of three.
        assert_eq!(split.separator, "b");
        assert_eq!(split.left.keys(), &["a"]);
        assert_eq!(split.right.keys(), &["c", "d"]);
        let right = split.right.as_leaf().unwrap();
        assert_eq!(right.get("c"), Some(&[2][..]));
        assert_eq!(right.get("b"), None);
    }

    #[test]
    fn test_leaf_split_full_order_two() {
        let leaf = leaf_with(2, &["a", "b"]);
        let split = leaf.split();

        assert_eq!(split.separator, "a");
        assert!(split.left.is_empty());
        assert_eq!(split.right.keys(), &["b"]);
    }

    #[test]
    fn test_leaf_split_retaining_at_capacity() {
        let leaf = leaf_with(4, &["a", "b", "c", "d"]);
        let split = leaf.split_retaining();

        assert_eq!(split.separator, "b");
        assert_eq!(split.left.keys(), &["a"]);
        assert_eq!(split.right.keys(), &["b", "c", "d"]);
    }

    #[test]
    fn test_leaf_split_order_two() {
        let leaf = leaf_with(2, &["a", "b", "c"]);
        let split = leaf.split();

        assert_eq!(split.separator, "b");
        assert_eq!(split.left.keys(), &["a"]);
        assert_eq!(split.right.keys(), &["c"]);
    }

    #[test]
    fn test_leaf_split_retaining_keeps_separator_entry() {
        let leaf = leaf_with(4, &["a", "b", "c", "d", "e"]);
        let split = leaf.split_retaining();

        assert_eq!(split.separator, "c");
        assert_eq!(split.left.keys(), &["a", "b"]);
        assert_eq!(split.right.keys(), &["c", "d", "e"]);
        let right = split.right.as_leaf().unwrap();
        assert_eq!(right.get("c"), Some(&[2][..]));
    }

    #[test]
    #[should_panic(expected = "leaf split needs")]
    fn test_leaf_split_underfilled_panics() {
        let leaf = leaf_with(4, &["a", "b", "c"]);
        let _ = leaf.split();
    }

    #[test]
    fn test_from_split_arity() {
        let split = leaf_with(4, &["a", "b", "c", "d", "e"]).split();
        let node = InternalNode::from_split(4, split);

        assert_eq!(node.keys(), &["c"]);
        assert_eq!(node.children().len(), node.keys().len() + 1);
    }

    #[test]
    fn test_locate() {
        let split = leaf_with(4, &["a", "b", "c", "d", "e"]).split();
        let node = InternalNode::from_split(4, split);

        assert_eq!(node.locate_index("a"), 0);
        assert_eq!(node.locate_index("bb"), 0);
        // Equal to the separator goes right.
        assert_eq!(node.locate_index("c"), 1);
        assert_eq!(node.locate_index("z"), 1);

        let (child, index) = node.locate("e");
        assert_eq!(index, 1);
        assert_eq!(child.keys(), &["d", "e"]);
    }

    #[test]
    #[should_panic(expected = "locate on internal node with no keys")]
    fn test_locate_empty_internal_panics() {
        let node: InternalNode<&str, usize> = InternalNode {
            order: 4,
            keys: Vec::new(),
            children: vec![Node::new_leaf(4)],
        };
        node.locate_index("a");
    }

    #[test]
    fn test_promote_middle_and_end() {
        // Root [c] over [a b] | [d e]
        let split = leaf_with(4, &["a", "b", "c", "d", "e"]).split();
        let mut root = InternalNode::from_split(4, split);

        // Right child grows and splits: [d e f g h] -> [d e] f [g h]
        let right = leaf_with(4, &["d", "e", "f", "g", "h"]).split();
        root.promote(1, right);
        assert_eq!(root.keys(), &["c", "f"]);
        let child_keys: Vec<_> = root.children().iter().map(|c| c.keys().to_vec()).collect();
        assert_eq!(child_keys, vec![vec!["a", "b"], vec!["d", "e"], vec!["g", "h"]]);

        // Left child splits: separator lands before "c".
        let left = leaf_with(2, &["a", "aa", "b"]).split();
        root.promote(0, left);
        assert_eq!(root.keys(), &["aa", "c", "f"]);
        assert_eq!(root.children().len(), 4);
        assert_eq!(root.children()[0].keys(), &["a"]);
        assert_eq!(root.children()[1].keys(), &["b"]);
    }

    #[test]
    fn test_install_split() {
        let split = leaf_with(4, &["a", "b", "c", "d", "e"]).split();
        let mut root = InternalNode::from_split(4, split);

        let right = leaf_with(4, &["d", "e", "f", "g", "h"]).split();
        root.install_split(1, right);

        assert_eq!(root.keys(), &["c"]);
        let nested = root.children()[1].as_internal().unwrap();
        assert_eq!(nested.keys(), &["f"]);
        assert_eq!(nested.children()[0].keys(), &["d", "e"]);
    }

    #[test]
    fn test_internal_split() {
        // Five separators, six leaves.
        let node = InternalNode::<u32, u32> {
            order: 4,
            keys: vec![10, 20, 30, 40, 50],
            children: (0..6).map(|_| Node::new_leaf(4)).collect(),
        };
        assert!(node.is_overfull());

        let split = node.split();
        assert_eq!(split.separator, 30);
        assert_eq!(split.left.keys(), &[10, 20]);
        assert_eq!(split.left.children().len(), 3);
        assert_eq!(split.right.keys(), &[40, 50]);
        assert_eq!(split.right.children().len(), 3);
    }

    #[test]
    fn test_traverse_pre_order() {
        let split = leaf_with(4, &["a", "b", "c", "d", "e"]).split();
        let root = Node::Internal(InternalNode::from_split(4, split));

        let dump: Vec<(usize, Vec<&str>)> = root
            .traverse()
            .map(|(depth, node)| (depth, node.keys().to_vec()))
            .collect();
        assert_eq!(
            dump,
            vec![(0, vec!["c"]), (1, vec!["a", "b"]), (1, vec!["d", "e"])]
        );

        // Restartable: a second walk yields the same sequence.
        assert_eq!(root.traverse().count(), 3);
    }
}
