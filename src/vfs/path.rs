//! Path resolution: absolute path validation against a tree and
//! normalization of relative path expressions.
//!
//! An absolute path is the root marker followed by zero or more segments,
//! joined by the delimiter (`"."`, `"./docs"`, `"./docs/a.txt"` with the
//! default syntax). Segment matching is case-insensitive everywhere.

use crate::config::PathSyntax;
use crate::core::utils;
use crate::vfs::entry::Node;

/// Which node kinds may terminate a lookup.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Lookup {
    /// The last segment may name a file or a directory.
    Any,
    /// Every segment, the last one included, must name a directory.
    DirsOnly,
}

/// Segment chain after the root marker. An empty chain is the root itself.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct AbsolutePath {
    segments: Vec<String>,
}

impl AbsolutePath {
    pub fn root() -> Self {
        Self::default()
    }

    /// Splits `path` on the delimiter. The first token must be the root
    /// marker; every following token is taken literally.
    pub fn parse(syntax: &PathSyntax, path: &str) -> Option<Self> {
        let mut tokens = path.split(syntax.delimiter.as_str());
        if tokens.next() != Some(syntax.root.as_str()) {
            return None;
        }
        Some(Self {
            segments: tokens.map(str::to_string).collect(),
        })
    }

    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    pub fn is_root(&self) -> bool {
        self.segments.is_empty()
    }

    /// Path of the child `name` of this path.
    pub fn join(&self, name: &str) -> Self {
        let mut segments = self.segments.clone();
        segments.push(name.to_string());
        Self { segments }
    }

    /// Splits into (parent, leaf name). The root has no leaf.
    pub fn split_leaf(&self) -> Option<(AbsolutePath, &str)> {
        let (leaf, parent) = self.segments.split_last()?;
        Some((
            AbsolutePath {
                segments: parent.to_vec(),
            },
            leaf.as_str(),
        ))
    }

    /// True if `self` is `ancestor` or lies anywhere below it.
    pub fn is_within(&self, ancestor: &AbsolutePath) -> bool {
        self.segments.len() >= ancestor.segments.len()
            && self
                .segments
                .iter()
                .zip(&ancestor.segments)
                .all(|(a, b)| utils::same_name(a, b))
    }

    /// Case-insensitive equality.
    pub fn same_as(&self, other: &AbsolutePath) -> bool {
        self.segments.len() == other.segments.len() && self.is_within(other)
    }

    /// Canonical string form, e.g. `"./docs/a.txt"`.
    pub fn render(&self, syntax: &PathSyntax) -> String {
        let mut out = syntax.root.clone();
        for segment in &self.segments {
            out.push_str(&syntax.delimiter);
            out.push_str(segment);
        }
        out
    }
}

fn admits(node: &Node, is_last: bool, lookup: Lookup) -> bool {
    match node {
        Node::Directory(_) => true,
        Node::File(_) => is_last && lookup == Lookup::Any,
    }
}

/// Walks `path` from `root`. Every intermediate segment must name a
/// directory; a file may only match the last segment, and only with
/// [`Lookup::Any`]. There are no partial results.
pub fn resolve<'a>(root: &'a Node, path: &AbsolutePath, lookup: Lookup) -> Option<&'a Node> {
    let count = path.segments.len();
    let mut current = root;
    for (i, segment) in path.segments.iter().enumerate() {
        let is_last = i + 1 == count;
        current = current
            .contents()?
            .iter()
            .find(|child| child.is_named(segment) && admits(child, is_last, lookup))?;
    }
    Some(current)
}

/// Mutable counterpart of [`resolve`].
pub fn resolve_mut<'a>(
    root: &'a mut Node,
    path: &AbsolutePath,
    lookup: Lookup,
) -> Option<&'a mut Node> {
    let count = path.segments.len();
    let mut current = root;
    for (i, segment) in path.segments.iter().enumerate() {
        let is_last = i + 1 == count;
        let contents = match current {
            Node::Directory(dir) => &mut dir.contents,
            Node::File(_) => return None,
        };
        current = contents
            .iter_mut()
            .find(|child| child.is_named(segment) && admits(child, is_last, lookup))?;
    }
    Some(current)
}

/// Applies the relative expression `expr` to `current`.
///
/// One trailing delimiter is ignored. The root marker resets to the root, the
/// parent marker drops the last segment (saturating at the root), any other
/// token is appended as is. The result is returned only if it resolves to an
/// existing node; otherwise `current` comes back unchanged.
pub fn normalize(
    syntax: &PathSyntax,
    root: &Node,
    current: &AbsolutePath,
    expr: &str,
) -> AbsolutePath {
    let expr = expr.strip_suffix(syntax.delimiter.as_str()).unwrap_or(expr);
    let mut segments = current.segments.clone();
    for token in expr.split(syntax.delimiter.as_str()) {
        if token == syntax.root {
            segments.clear();
        } else if token == syntax.parent {
            segments.pop();
        } else {
            segments.push(token.to_string());
        }
    }
    let candidate = AbsolutePath { segments };
    if resolve(root, &candidate, Lookup::Any).is_some() {
        candidate
    } else {
        current.clone()
    }
}
