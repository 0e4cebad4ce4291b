//! Serializable tree description, as handed over by a front-end.
//!
//! ```json
//! {
//!   "file_path": "src/Foo.java",
//!   "root": {
//!     "kind": "Block", "start_line": 3, "end_line": 6,
//!     "children": [
//!       { "kind": "ReturnStatement", "start_line": 4, "end_line": 4, "children": [
//!         { "kind": "SimpleName", "label": "x" }
//!       ] }
//!     ]
//!   }
//! }
//! ```
//!
//! Kinds use the front-end's names (see [`AstKind::name`](crate::AstKind::name)).
//! Hash, height and size are always recomputed.

use facet::Facet;

/// One node and its subtree.
#[derive(Debug, Clone, Default, Facet)]
pub struct AstNode {
    /// Front-end kind name.
    pub kind: String,
    /// Identifier, literal or operator text.
    #[facet(default)]
    pub label: Option<String>,
    /// Name other descriptions can use to refer to this node.
    #[facet(default)]
    pub tag: Option<String>,
    /// First line (1-based).
    #[facet(default)]
    pub start_line: u32,
    /// Last line (1-based, inclusive).
    #[facet(default)]
    pub end_line: u32,
    /// Byte offset of the first character.
    #[facet(default)]
    pub start_offset: usize,
    /// Byte offset right after the last character.
    #[facet(default)]
    pub end_offset: usize,
    /// Children, in source order.
    #[facet(default)]
    pub children: Vec<AstNode>,
}

impl AstNode {
    /// A node without label or position.
    pub fn new(kind: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            ..Self::default()
        }
    }

    /// Set the label.
    pub fn labeled(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    /// Set the line range.
    pub fn lines(mut self, start: u32, end: u32) -> Self {
        self.start_line = start;
        self.end_line = end;
        self
    }

    /// Append a child.
    pub fn child(mut self, child: AstNode) -> Self {
        self.children.push(child);
        self
    }
}

/// A whole file's tree.
#[derive(Debug, Clone, Default, Facet)]
pub struct TreeDescription {
    /// Path of the file the tree was parsed from.
    pub file_path: String,
    /// Root node, usually a `CompilationUnit`.
    pub root: AstNode,
}

impl TreeDescription {
    /// Parse a description from JSON.
    pub fn from_json(json: &str) -> Result<Self, crate::MapperError> {
        facet_json::from_str(json).map_err(|e| crate::MapperError::InvalidDescription {
            message: e.to_string(),
        })
    }
}
