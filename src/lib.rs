//! This crate exposes an order-based Binary Search Tree (BST) whose nodes know their parent,
//! along with a handful of structural queries and transformations on it.
//!
//! ## Binary Search Tree
//!
//! A Binary Search Tree stores keys in `Node`s. Each `Node` has a key and up to two child
//! `Node`s. The ordering invariants are:
//!
//! 1. For every `Node`, all the `Node`s in its left subtree have a key less than its own key.
//! 2. For every `Node`, all the `Node`s in its right subtree have a key greater than or equal to
//!    its own key. Equal keys are kept, not merged.
//!
//! > Note that some `Node`s have no children. These `Node`s are called "leaf nodes".
//!
//! Searching takes `O(height)` where `height` is the number of levels between the root and the
//! deepest leaf. [`OrderedTree`] never rebalances on its own: inserting sorted keys builds a
//! chain. Calling [`OrderedTree::balance`] rebuilds the tree so that its height is `O(lg N)`.
//!
//! The invariants only hold until [`OrderedTree::mirror`] swaps every left and right child. Some
//! operations, like [`OrderedTree::get_by_key`] and [`OrderedTree::count_embedded_bsts`], make no
//! assumption about order at all and are still meaningful on a mirrored tree.
//!
//! ## Logging
//!
//! Operations emit [`tracing`] events (`trace` per insert, `debug` for `balance` and `mirror`).
//! Install a subscriber in the application to see them.

#![deny(missing_docs, clippy::clone_on_ref_ptr)]

mod error;
mod tree;
mod view;


pub use error::{TreeError, TreeResult};
pub use tree::{Node, OrderedTree};
pub use view::ShapeOptions;
