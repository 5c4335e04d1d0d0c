//! Text renderings of an [`OrderedTree`]: the sideways shape, the single line in-order listing,
//! and the root-to-leaf paths.

use std::fmt;
use std::io;

use crate::error::{TreeError, TreeResult};
use crate::tree::{Node, OrderedTree};

/// Settings for [`OrderedTree::shape_view_with`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ShapeOptions {
    /// Spaces of indentation added per level of depth.
    pub indent: usize,
    /// Printed in place of the parent's key for the root.
    pub root_marker: String,
}

impl Default for ShapeOptions {
    fn default() -> Self {
        Self {
            indent: 2,
            root_marker: String::from("no parent"),
        }
    }
}

/// Renders the tree turned 90° counter-clockwise so the largest keys are at the top.
struct Shape<'a, E> {
    tree: &'a OrderedTree<E>,
    options: &'a ShapeOptions,
}

impl<E> fmt::Display for Shape<'_, E>
where
    E: fmt::Display,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let Some(root) = self.tree.root() else {
            return f.write_str("Empty Tree");
        };
        writeln!(f, "{}", self.tree.label())?;
        self.write_node(f, root, 0)
    }
}

impl<E> Shape<'_, E>
where
    E: fmt::Display,
{
    /// Right subtree, then the node, then the left subtree.
    fn write_node(&self, f: &mut fmt::Formatter<'_>, node: &Node<E>, depth: usize) -> fmt::Result {
        if let Some(right) = node.right() {
            self.write_node(f, right, depth + 1)?;
        }

        let indent = depth * self.options.indent;
        write!(f, "{:indent$}{}[", "", node.key())?;
        match node.parent() {
            Some(parent) => write!(f, "{}", parent.key())?,
            None => f.write_str(&self.options.root_marker)?,
        }
        writeln!(f, "]")?;

        if let Some(left) = node.left() {
            self.write_node(f, left, depth + 1)?;
        }
        Ok(())
    }
}

impl<E> fmt::Display for OrderedTree<E>
where
    E: fmt::Display,
{
    /// Same as [`OrderedTree::shape_view`].
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let options = ShapeOptions::default();
        let shape = Shape {
            tree: self,
            options: &options,
        };
        fmt::Display::fmt(&shape, f)
    }
}

impl<E> fmt::Display for Node<E>
where
    E: fmt::Display,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Node:{}<", self.key())?;
        if let Some(parent) = self.parent() {
            write!(f, "{}", parent.key())?;
        }
        f.write_str(">")
    }
}

impl<E> OrderedTree<E>
where
    E: fmt::Display,
{
    /// A multi-line picture of the tree: the label, then one line per node with its parent's key
    /// in brackets, indented two spaces per level. Larger keys are printed above smaller ones.
    ///
    /// # Examples
    ///
    /// ```
    /// use ordered_tree::OrderedTree;
    ///
    /// let tree = OrderedTree::from_keys("T", [2, 1, 3]);
    /// assert_eq!(tree.shape_view(), "T\n  3[2]\n2[no parent]\n  1[2]\n");
    /// ```
    pub fn shape_view(&self) -> String {
        self.to_string()
    }

    /// Like [`shape_view`][Self::shape_view] with custom indentation and root marker.
    pub fn shape_view_with(&self, options: &ShapeOptions) -> String {
        Shape {
            tree: self,
            options,
        }
        .to_string()
    }

    /// The label followed by every key in in-order order, separated by spaces.
    pub fn in_order_view(&self) -> String {
        let keys: Vec<_> = self.in_order().iter().map(ToString::to_string).collect();
        format!("{}: {}", self.label(), keys.join(" "))
    }

    /// Writes one line per root-to-leaf path, left paths first. Every key on a line is followed
    /// by a space.
    ///
    /// # Errors
    ///
    /// [`TreeError::Empty`] when the tree has no root and [`TreeError::Io`] when writing fails.
    ///
    /// # Examples
    ///
    /// ```
    /// use ordered_tree::OrderedTree;
    ///
    /// let tree = OrderedTree::from_keys("T", [5, 3, 8]);
    /// let mut out = Vec::new();
    /// tree.write_all_paths(&mut out).unwrap();
    ///
    /// assert_eq!(String::from_utf8(out).unwrap(), "5 3 \n5 8 \n");
    /// ```
    pub fn write_all_paths<W>(&self, mut out: W) -> TreeResult<()>
    where
        W: io::Write,
    {
        let root = self.root_or_empty()?;
        visit_paths(root, &mut String::new(), &mut |path: &str| writeln!(out, "{path}"))?;
        Ok(())
    }

    /// [`write_all_paths`][Self::write_all_paths] to stdout.
    pub fn print_all_paths(&self) -> TreeResult<()> {
        self.write_all_paths(io::stdout().lock())
    }

    /// The lines [`write_all_paths`][Self::write_all_paths] would write, without line endings.
    pub fn all_paths(&self) -> TreeResult<Vec<String>> {
        let root = self.root_or_empty()?;
        let mut lines = Vec::new();
        visit_paths(root, &mut String::new(), &mut |path: &str| {
            lines.push(path.to_owned());
            Ok(())
        })?;
        Ok(lines)
    }

    fn root_or_empty(&self) -> TreeResult<&Node<E>> {
        self.root().ok_or_else(|| TreeError::Empty {
            label: self.label().to_owned(),
        })
    }
}

/// Depth first walk that hands every complete root-to-leaf path to `visit`.
fn visit_paths<E, F>(node: &Node<E>, path: &mut String, visit: &mut F) -> io::Result<()>
where
    E: fmt::Display,
    F: FnMut(&str) -> io::Result<()>,
{
    let prefix_len = path.len();
    path.push_str(&node.key().to_string());
    path.push(' ');

    if node.is_leaf() {
        visit(path.as_str())?;
    } else {
        for child in [node.left(), node.right()].into_iter().flatten() {
            visit_paths(child, path, visit)?;
        }
    }

    path.truncate(prefix_len);
    Ok(())
}
