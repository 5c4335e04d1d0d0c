//! Errors returned by [`OrderedTree`][crate::OrderedTree] operations.

use thiserror::Error;

/// The ways a tree operation can fail. Lookups that simply miss (an absent key, a node with no
/// successor, a level deeper than the tree) are not errors and return `None` or `0` instead.
#[derive(Error, Debug)]
pub enum TreeError {
    /// The operation needs a root node but the tree has none.
    #[error("tree `{label}` is empty")]
    Empty {
        /// Label of the tree the operation was called on.
        label: String,
    },

    /// Writing the textual output of an operation failed.
    #[error("failed to write tree output: {0}")]
    Io(#[from] std::io::Error),
}

/// Convenience alias for results of tree operations.
pub type TreeResult<T> = Result<T, TreeError>;
