//! An unbalanced BST whose nodes keep a pointer back to their parent. Nodes are only ever added;
//! the shape of the tree is decided purely by insertion order until [`OrderedTree::balance`] is
//! called to rebuild it.
//!
//! # Examples
//!
//! ```
//! use ordered_tree::OrderedTree;
//!
//! let mut tree = OrderedTree::from_keys("T", [5, 3, 8, 1, 4]);
//!
//! assert!(tree.contains(&4));
//! assert!(!tree.contains(&9));
//! assert_eq!(tree.in_order_view(), "T: 1 3 4 5 8");
//!
//! // The successor of 4 is found by walking back up through its parents.
//! let four = tree.get_by_key(&4);
//! assert_eq!(tree.successor(four).map(|n| *n.key()), Some(5));
//!
//! tree.mirror().unwrap();
//! assert_eq!(tree.in_order_view(), "T: 8 5 4 3 1");
//! ```

use std::cmp::Ordering;
use std::fmt;
use std::ptr::NonNull;

use tracing::{debug, trace};

use crate::error::{TreeError, TreeResult};

/// A Binary Search Tree that allows duplicate keys. Keys that compare equal to an existing key
/// are placed in its right subtree.
pub struct OrderedTree<E> {
    // A `Link` instead of an `Option<Box<Node>>` so that the tree can be moved around without the
    // children's parent pointers breaking.
    root: Link<E>,
    label: String,
    len: usize,
}

impl<E> Default for OrderedTree<E> {
    fn default() -> Self {
        Self::new("")
    }
}

impl<E> Drop for OrderedTree<E> {
    fn drop(&mut self) {
        let mut stack: Vec<_> = self.root.take().0.into_iter().collect();
        while let Some(ptr) = stack.pop() {
            // SAFETY: Every node was allocated with `Box::new` in `Node::new_leaked` and is owned
            // by exactly one link. We took the root link above and each child is pushed exactly
            // once, by its parent, so no node is freed twice.
            let node = unsafe { Box::from_raw(ptr.as_ptr()) };
            stack.extend(node.left.0);
            stack.extend(node.right.0);
        }
    }
}

impl<E> Clone for OrderedTree<E>
where
    E: Clone,
{
    // TODO stack based Clone
    fn clone(&self) -> Self {
        Self {
            root: self
                .root()
                .map_or_else(Link::none, |root| root.clone_leaked(Link::none())),
            label: self.label.clone(),
            len: self.len,
        }
    }
}

impl<E> fmt::Debug for OrderedTree<E>
where
    E: fmt::Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OrderedTree")
            .field("label", &self.label)
            .field("root", &self.root())
            .finish()
    }
}

impl<E> Extend<E> for OrderedTree<E>
where
    E: Ord,
{
    fn extend<I: IntoIterator<Item = E>>(&mut self, keys: I) {
        for key in keys {
            self.insert(key);
        }
    }
}

impl<E> OrderedTree<E> {
    /// Generates a new, empty tree with the given label.
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            root: Link::none(),
            label: label.into(),
            len: 0,
        }
    }

    /// Builds a tree by inserting each key in turn. The keys are not sorted first so the shape of
    /// the tree follows their order.
    ///
    /// # Examples
    ///
    /// ```
    /// use ordered_tree::OrderedTree;
    ///
    /// // Ascending keys make a chain leaning right.
    /// let tree = OrderedTree::from_keys("chain", 1..=4);
    /// assert_eq!(tree.height(), 4);
    /// ```
    pub fn from_keys<I>(label: impl Into<String>, keys: I) -> Self
    where
        I: IntoIterator<Item = E>,
        E: Ord,
    {
        let mut tree = Self::new(label);
        tree.extend(keys);
        tree
    }

    /// The display label of this tree.
    pub fn label(&self) -> &str {
        &self.label
    }

    /// Number of keys in the tree, duplicates included.
    pub fn len(&self) -> usize {
        self.len
    }

    /// Whether the tree has no nodes at all.
    pub fn is_empty(&self) -> bool {
        self.root.0.is_none()
    }

    /// The root node, if there is one.
    pub fn root(&self) -> Option<&Node<E>> {
        self.root.get()
    }

    /// Number of levels in the tree. An empty tree has height 0 and a lone root has height 1.
    pub fn height(&self) -> usize {
        self.root().map_or(0, Node::height)
    }

    /// Inserts the key into the tree. Keys less than a node go left and everything else,
    /// including an equal key, goes right. The tree is never rebalanced here.
    ///
    /// # Examples
    ///
    /// ```
    /// use ordered_tree::OrderedTree;
    ///
    /// let mut tree = OrderedTree::new("dups");
    /// tree.insert(1);
    /// tree.insert(1);
    ///
    /// assert_eq!(tree.len(), 2);
    /// assert_eq!(tree.in_order_view(), "dups: 1 1");
    /// ```
    pub fn insert(&mut self, key: E)
    where
        E: Ord,
    {
        let mut parent = Link::none();
        let mut side = Side::Left;
        let mut current = self.root;
        while let Some(node) = current.get() {
            let (next_side, next) = match key.cmp(&node.key) {
                Ordering::Less => (Side::Left, node.left),
                Ordering::Equal | Ordering::Greater => (Side::Right, node.right),
            };
            parent = current;
            side = next_side;
            current = next;
        }

        let leaf = Node::new_leaked(key, parent);
        if parent.0.is_none() {
            self.root = leaf;
        } else {
            // SAFETY: `parent` is a live node of this tree and the shared borrow used to read it
            // ended with the loop. We hold the tree mutably so nothing else references it.
            unsafe { parent.set_child(side, leaf) };
        }
        self.len += 1;
        trace!(len = self.len, "inserted key");
    }

    /// Whether some node holds a key equal to `key`, found by descending the tree with the same
    /// routing as [`insert`][Self::insert]. The search stops at the first equal key it meets.
    pub fn contains(&self, key: &E) -> bool
    where
        E: Ord,
    {
        self.root().is_some_and(|root| root.contains(key))
    }

    /// Finds a node whose key is `==` to `key` by searching every node: the node itself, then its
    /// left subtree, then its right subtree. Ordering is never consulted, so this still finds keys
    /// after the tree has been [mirrored][Self::mirror].
    ///
    /// # Examples
    ///
    /// ```
    /// use ordered_tree::OrderedTree;
    ///
    /// let mut tree = OrderedTree::from_keys("T", [2, 1, 3]);
    /// tree.mirror().unwrap();
    ///
    /// // An ordered descent would look for 1 on the left and miss it.
    /// assert!(!tree.contains(&1));
    /// assert_eq!(tree.get_by_key(&1).map(|n| *n.key()), Some(1));
    /// ```
    pub fn get_by_key(&self, key: &E) -> Option<&Node<E>>
    where
        E: PartialEq,
    {
        self.root().and_then(|root| root.find_equal(key))
    }

    /// The in-order successor of `node`. Passing `None` yields `None`, which makes it easy to
    /// chain with [`get_by_key`][Self::get_by_key]. See [`Node::successor`].
    pub fn successor<'a>(&self, node: Option<&'a Node<E>>) -> Option<&'a Node<E>>
    where
        E: Ord,
    {
        node.and_then(|n| n.successor())
    }

    /// Swaps the left and right children of every node. Parent links are left alone, so every
    /// node keeps the same parent. Mirroring twice restores the original tree.
    ///
    /// # Errors
    ///
    /// [`TreeError::Empty`] when the tree has no root.
    pub fn mirror(&mut self) -> TreeResult<()> {
        if self.is_empty() {
            return Err(TreeError::Empty {
                label: self.label.clone(),
            });
        }

        let mut stack: Vec<_> = self.root.0.into_iter().collect();
        while let Some(ptr) = stack.pop() {
            let node = ptr.as_ptr();
            // SAFETY: `ptr` is a live node of this tree and we hold the tree mutably, so no
            // reference into it exists. The swap goes through the owning pointer itself.
            let (left, right) = unsafe {
                let (left, right) = ((*node).left, (*node).right);
                (*node).left = right;
                (*node).right = left;
                (left, right)
            };
            stack.extend(left.0);
            stack.extend(right.0);
        }
        debug!(label = %self.label, len = self.len, "mirrored tree");
        Ok(())
    }

    /// Counts the nodes at exactly `level` edges below the root. Negative levels and levels past
    /// the bottom of the tree have no nodes.
    ///
    /// # Examples
    ///
    /// ```
    /// use ordered_tree::OrderedTree;
    ///
    /// let tree = OrderedTree::from_keys("T", [5, 3, 8, 1, 4]);
    /// assert_eq!(tree.nodes_at_level(0), 1);
    /// assert_eq!(tree.nodes_at_level(2), 2);
    /// assert_eq!(tree.nodes_at_level(-1), 0);
    /// ```
    pub fn nodes_at_level(&self, level: isize) -> usize {
        let Ok(depth) = usize::try_from(level) else {
            return 0;
        };
        self.root().map_or(0, |root| root.count_at_depth(depth))
    }

    /// Counts the nodes whose subtree is, on its own, a strict BST: every key on the left is
    /// smaller and every key on the right is larger. Each node is judged independently of its
    /// ancestors.
    pub fn count_embedded_bsts(&self) -> usize
    where
        E: Ord,
    {
        self.root().map_or(0, Node::count_embedded_bsts)
    }

    /// Rebuilds the tree so that, for distinct keys, its height is as small as possible. The keys
    /// are taken in order, every existing node is freed, and then the middle key (index
    /// `len / 2`) is inserted before the lower and upper halves are handled the same way.
    ///
    /// # Examples
    ///
    /// ```
    /// use ordered_tree::OrderedTree;
    ///
    /// let mut tree = OrderedTree::from_keys("chain", 1..=7);
    /// assert_eq!(tree.height(), 7);
    ///
    /// tree.balance();
    /// assert_eq!(tree.height(), 3);
    /// assert_eq!(tree.root().map(|n| *n.key()), Some(4));
    /// ```
    pub fn balance(&mut self)
    where
        E: Ord,
    {
        let old_height = self.height();
        let mut keys: Vec<_> = self.take_keys_in_order().into_iter().map(Some).collect();
        self.len = 0;
        self.insert_medians(&mut keys);
        debug!(
            label = %self.label,
            len = self.len,
            old_height,
            height = self.height(),
            "balanced tree"
        );
    }

    /// All keys in in-order order (left, node, right).
    pub fn in_order(&self) -> Vec<&E> {
        let mut keys = Vec::with_capacity(self.len);
        if let Some(root) = self.root() {
            root.collect_in_order(&mut keys);
        }
        keys
    }

    /// Frees every node and returns their keys in in-order order, leaving the tree empty.
    fn take_keys_in_order(&mut self) -> Vec<E> {
        let mut ordered = Vec::with_capacity(self.len);
        let mut stack = Vec::new();
        let mut current = self.root.take().0;
        loop {
            while let Some(ptr) = current {
                stack.push(ptr);
                // SAFETY: `ptr` came from a live link and nothing is freed until every node has
                // been visited.
                current = unsafe { ptr.as_ref() }.left.0;
            }
            let Some(ptr) = stack.pop() else {
                break;
            };
            ordered.push(ptr);
            // SAFETY: As above.
            current = unsafe { ptr.as_ref() }.right.0;
        }

        ordered
            .into_iter()
            .map(|ptr| {
                // SAFETY: Each node appears exactly once in `ordered` and the root link was taken,
                // so after this nothing can reach the node again. It was allocated with
                // `Box::new` in `Node::new_leaked`.
                let node = unsafe { Box::from_raw(ptr.as_ptr()) };
                let Node { key, .. } = *node;
                key
            })
            .collect()
    }

    /// Recursive helper for [`balance`][Self::balance].
    fn insert_medians(&mut self, keys: &mut [Option<E>])
    where
        E: Ord,
    {
        if keys.is_empty() {
            return;
        }
        let mid = keys.len() / 2;
        let (lower, upper) = keys.split_at_mut(mid);
        if let Some(key) = upper[0].take() {
            self.insert(key);
        }
        self.insert_medians(lower);
        self.insert_medians(&mut upper[1..]);
    }
}

/// A possibly missing pointer to a heap allocated [`Node`]. Links stored in `left` and `right`
/// own the node they point to; a `parent` link only borrows it.
struct Link<E>(Option<NonNull<Node<E>>>);

impl<E> Clone for Link<E> {
    fn clone(&self) -> Self {
        *self
    }
}
impl<E> Copy for Link<E> {}

impl<E> Link<E> {
    const fn none() -> Self {
        Link(None)
    }

    fn get(&self) -> Option<&Node<E>> {
        // SAFETY: If the pointer is not `None` then it is a valid `Node`; nodes are only freed by
        // `OrderedTree::drop` and `OrderedTree::balance`, which both hold the tree mutably. The
        // returned reference is tied to `&self` which is itself borrowed from the tree.
        unsafe { self.0.as_ref().map(|ptr| ptr.as_ref()) }
    }

    /// Replaces one child link of the node this link points at. The write goes through the
    /// stored pointer and never through a `&mut Node`: children keep copies of that same pointer
    /// as their parent link, and a fresh `&mut` would invalidate them.
    ///
    /// # Safety
    ///
    /// `self` must point at a live node and no reference into that node may be alive.
    unsafe fn set_child(self, side: Side, child: Link<E>) {
        if let Some(ptr) = self.0 {
            let node = ptr.as_ptr();
            match side {
                Side::Left => (*node).left = child,
                Side::Right => (*node).right = child,
            }
        }
    }

    fn take(&mut self) -> Self {
        Link(self.0.take())
    }
}

/// Which child link of a node to follow or replace.
#[derive(Clone, Copy)]
enum Side {
    Left,
    Right,
}

/// A single entry of an [`OrderedTree`]. Nodes can only be reached by borrowing the tree, so
/// holding one keeps the tree from changing underneath it.
pub struct Node<E> {
    key: E,
    left: Link<E>,
    right: Link<E>,
    parent: Link<E>,
}

impl<E> fmt::Debug for Node<E>
where
    E: fmt::Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Node")
            .field("key", &self.key)
            .field("left", &self.left())
            .field("right", &self.right())
            .finish()
    }
}

impl<E> Node<E> {
    /// Allocates a childless node and leaks it into a link. Ownership passes to whichever link
    /// stores the result.
    fn new_leaked(key: E, parent: Link<E>) -> Link<E> {
        let node = Box::new(Node {
            key,
            left: Link::none(),
            right: Link::none(),
            parent,
        });
        Link(Some(NonNull::from(Box::leak(node))))
    }

    /// The key stored in this node.
    pub fn key(&self) -> &E {
        &self.key
    }

    /// The left child.
    pub fn left(&self) -> Option<&Self> {
        self.left.get()
    }

    /// The right child.
    pub fn right(&self) -> Option<&Self> {
        self.right.get()
    }

    /// The node this one hangs from. Only the root has no parent.
    pub fn parent(&self) -> Option<&Self> {
        self.parent.get()
    }

    /// Whether this node has no children.
    pub fn is_leaf(&self) -> bool {
        self.left.0.is_none() && self.right.0.is_none()
    }

    /// The in-order successor of this node.
    ///
    /// With a right child this is the leftmost node of the right subtree. Otherwise the parents
    /// are walked upwards until one has a key strictly greater than this node's key; if the walk
    /// runs past the root there is no successor.
    ///
    /// # Examples
    ///
    /// ```
    /// use ordered_tree::OrderedTree;
    ///
    /// let tree = OrderedTree::from_keys("T", [5, 3, 8, 1, 4]);
    /// let next = |k| tree.get_by_key(&k).and_then(|n| n.successor()).map(|n| *n.key());
    ///
    /// assert_eq!(next(3), Some(4));
    /// assert_eq!(next(4), Some(5));
    /// assert_eq!(next(8), None);
    /// ```
    pub fn successor(&self) -> Option<&Self>
    where
        E: Ord,
    {
        if let Some(right) = self.right() {
            return Some(right.leftmost());
        }

        let mut ancestor = self.parent();
        while let Some(node) = ancestor {
            if node.key > self.key {
                return Some(node);
            }
            ancestor = node.parent();
        }
        None
    }

    fn leftmost(&self) -> &Self {
        let mut node = self;
        while let Some(left) = node.left() {
            node = left;
        }
        node
    }

    fn height(&self) -> usize {
        let left_height = self.left().map_or(0, Node::height);
        let right_height = self.right().map_or(0, Node::height);
        left_height.max(right_height) + 1
    }

    fn contains(&self, key: &E) -> bool
    where
        E: Ord,
    {
        match key.cmp(&self.key) {
            Ordering::Less => self.left().is_some_and(|n| n.contains(key)),
            Ordering::Equal => true,
            Ordering::Greater => self.right().is_some_and(|n| n.contains(key)),
        }
    }

    fn find_equal(&self, key: &E) -> Option<&Self>
    where
        E: PartialEq,
    {
        if self.key == *key {
            return Some(self);
        }
        self.left()
            .and_then(|n| n.find_equal(key))
            .or_else(|| self.right().and_then(|n| n.find_equal(key)))
    }

    fn count_at_depth(&self, depth: usize) -> usize {
        if depth == 0 {
            return 1;
        }
        self.left().map_or(0, |n| n.count_at_depth(depth - 1))
            + self.right().map_or(0, |n| n.count_at_depth(depth - 1))
    }

    fn count_embedded_bsts(&self) -> usize
    where
        E: Ord,
    {
        usize::from(self.is_bst_within(None, None))
            + self.left().map_or(0, Node::count_embedded_bsts)
            + self.right().map_or(0, Node::count_embedded_bsts)
    }

    /// Whether every key in this subtree lies strictly between `min` and `max` and the subtree is
    /// ordered. A missing bound is unbounded.
    fn is_bst_within(&self, min: Option<&E>, max: Option<&E>) -> bool
    where
        E: Ord,
    {
        let above_min = min.is_none_or(|min| self.key > *min);
        let below_max = max.is_none_or(|max| self.key < *max);
        above_min
            && below_max
            && self
                .left()
                .is_none_or(|n| n.is_bst_within(min, Some(&self.key)))
            && self
                .right()
                .is_none_or(|n| n.is_bst_within(Some(&self.key), max))
    }

    fn collect_in_order<'a>(&'a self, keys: &mut Vec<&'a E>) {
        if let Some(left) = self.left() {
            left.collect_in_order(keys);
        }
        keys.push(&self.key);
        if let Some(right) = self.right() {
            right.collect_in_order(keys);
        }
    }

    /// Deep copies this subtree into freshly leaked nodes hanging from `parent`.
    fn clone_leaked(&self, parent: Link<E>) -> Link<E>
    where
        E: Clone,
    {
        let link = Node::new_leaked(self.key.clone(), parent);
        let left = self
            .left()
            .map_or_else(Link::none, |left| left.clone_leaked(link));
        let right = self
            .right()
            .map_or_else(Link::none, |right| right.clone_leaked(link));
        // SAFETY: `link` was just allocated and only its children's parent links point at it.
        unsafe {
            link.set_child(Side::Left, left);
            link.set_child(Side::Right, right);
        }
        link
    }
}
