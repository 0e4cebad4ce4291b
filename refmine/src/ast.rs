//! Program syntax trees as seen by the matcher.

use gumnut::indextree::NodeId;
use gumnut::{DiffTree, NodeData, NodeHash, Position, Span, Tree, TreeTypes};
use rapidhash::RapidHashMap as HashMap;

use crate::description::{AstNode, TreeDescription};
use crate::error::MapperError;
use crate::kind::AstKind;
use crate::location::LocationInfo;

/// Tree types for program syntax trees.
pub struct AstTypes;

impl TreeTypes for AstTypes {
    type Kind = AstKind;
    type Label = String;
}

/// The syntax tree of one file.
pub struct AstTree {
    tree: Tree<AstTypes>,
    file_path: String,
    tags: HashMap<String, NodeId>,
}

impl AstTree {
    /// Build a tree from a front-end description.
    pub fn from_description(description: &TreeDescription) -> Result<Self, MapperError> {
        let root = &description.root;
        let mut tree = Tree::new(node_data(root)?);
        let mut tags = HashMap::default();
        if let Some(tag) = &root.tag {
            tags.insert(tag.clone(), tree.root);
        }

        let mut stack: Vec<(&AstNode, NodeId)> = root
            .children
            .iter()
            .rev()
            .map(|child| (child, tree.root))
            .collect();
        while let Some((node, parent)) = stack.pop() {
            let id = tree.add_child(parent, node_data(node)?);
            if let Some(tag) = &node.tag {
                tags.insert(tag.clone(), id);
            }
            stack.extend(node.children.iter().rev().map(|child| (child, id)));
        }
        tree.compute_metrics();

        Ok(Self {
            tree,
            file_path: description.file_path.clone(),
            tags,
        })
    }

    /// Parse a JSON description and build the tree.
    pub fn from_json(json: &str) -> Result<Self, MapperError> {
        Self::from_description(&TreeDescription::from_json(json)?)
    }

    /// Path of the file this tree was parsed from.
    pub fn file_path(&self) -> &str {
        &self.file_path
    }

    /// The underlying arena tree.
    pub fn tree(&self) -> &Tree<AstTypes> {
        &self.tree
    }

    /// The node carrying `tag`.
    pub fn tagged(&self, tag: &str) -> Result<NodeId, MapperError> {
        self.tags
            .get(tag)
            .copied()
            .ok_or_else(|| MapperError::UnknownTag {
                tag: tag.to_string(),
            })
    }

    /// First node in preorder with the given kind and label.
    pub fn find(&self, kind: AstKind, label: Option<&str>) -> Option<NodeId> {
        self.iter()
            .find(|&id| *self.kind(id) == kind && self.label(id).map(String::as_str) == label)
    }

    /// Location of `id` in its file.
    pub fn location(&self, id: NodeId) -> LocationInfo {
        LocationInfo {
            file_path: self.file_path.clone(),
            span: self.span(id),
            kind: *self.kind(id),
        }
    }

    /// Whether `id` is `ancestor` or lies below it.
    pub fn is_within(&self, id: NodeId, ancestor: NodeId) -> bool {
        id == ancestor || self.ancestors(id).any(|a| a == ancestor)
    }
}

fn node_data(node: &AstNode) -> Result<NodeData<AstTypes>, MapperError> {
    let kind = AstKind::from_name(&node.kind)?;
    let span = Span::new(
        Position {
            offset: node.start_offset,
            line: node.start_line,
            column: 0,
        },
        Position {
            offset: node.end_offset,
            line: node.end_line,
            column: 0,
        },
    );
    let data = match &node.label {
        Some(label) => NodeData::labeled(kind, label.clone()),
        None => NodeData::new(kind),
    };
    Ok(data.with_span(span))
}

impl DiffTree for AstTree {
    type Types = AstTypes;

    fn root(&self) -> NodeId {
        self.tree.root
    }

    fn node_count(&self) -> usize {
        self.tree.node_count()
    }

    fn hash(&self, id: NodeId) -> NodeHash {
        self.tree.hash(id)
    }

    fn height(&self, id: NodeId) -> usize {
        self.tree.height(id)
    }

    fn size(&self, id: NodeId) -> usize {
        self.tree.size(id)
    }

    fn kind(&self, id: NodeId) -> &AstKind {
        self.tree.kind(id)
    }

    fn label(&self, id: NodeId) -> Option<&String> {
        self.tree.label(id)
    }

    fn span(&self, id: NodeId) -> Span {
        self.tree.span(id)
    }

    fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.tree.parent(id)
    }

    fn children(&self, id: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        self.tree.children(id)
    }

    fn position(&self, id: NodeId) -> usize {
        self.tree.position(id)
    }

    fn subtree(&self, id: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        self.tree.subtree(id)
    }

    fn contains(&self, id: NodeId) -> bool {
        self.tree.contains(id)
    }
}

/// Builds an [`AstTree`] node by node, in source order.
///
/// Lines are taken as given. Offsets are synthetic: every node takes the next
/// offset when it is added and ends once its last descendant is added, so
/// spans nest and follow source order.
///
/// ```
/// use refmine::{AstBuilder, AstKind};
///
/// let mut b = AstBuilder::new("Foo.java", AstKind::Block, 1, 3);
/// b.open(AstKind::ReturnStatement, 2, 2);
/// b.leaf(AstKind::SimpleName, "x", 2);
/// b.close();
/// let tree = b.finish();
/// assert_eq!(tree.tree().arena.count(), 3);
/// ```
pub struct AstBuilder {
    tree: Tree<AstTypes>,
    file_path: String,
    tags: HashMap<String, NodeId>,
    stack: Vec<NodeId>,
    offset: usize,
}

impl AstBuilder {
    /// Start a tree whose root has `kind` and spans `start_line..=end_line`.
    pub fn new(file_path: impl Into<String>, kind: AstKind, start_line: u32, end_line: u32) -> Self {
        let mut builder = Self {
            tree: Tree::new(NodeData::new(kind)),
            file_path: file_path.into(),
            tags: HashMap::default(),
            stack: Vec::new(),
            offset: 0,
        };
        let root = builder.tree.root;
        let span = builder.span(start_line, end_line);
        if let Some(node) = builder.tree.arena.get_mut(root) {
            node.get_mut().span = span;
        }
        builder.stack.push(root);
        builder
    }

    fn span(&mut self, start_line: u32, end_line: u32) -> Span {
        let start = self.offset;
        self.offset += 1;
        let end = self.offset;
        Span::new(
            Position {
                offset: start,
                line: start_line,
                column: 0,
            },
            Position {
                offset: end,
                line: end_line,
                column: 0,
            },
        )
    }

    fn current(&self) -> NodeId {
        self.stack.last().copied().unwrap_or(self.tree.root)
    }

    fn push(&mut self, data: NodeData<AstTypes>, start_line: u32, end_line: u32) -> NodeId {
        let span = self.span(start_line, end_line);
        let parent = self.current();
        self.tree.add_child(parent, data.with_span(span))
    }

    /// Open an unlabeled node; following nodes become its children until
    /// [`close`](Self::close).
    pub fn open(&mut self, kind: AstKind, start_line: u32, end_line: u32) -> NodeId {
        let id = self.push(NodeData::new(kind), start_line, end_line);
        self.stack.push(id);
        id
    }

    /// Open a labeled node.
    pub fn open_labeled(
        &mut self,
        kind: AstKind,
        label: impl Into<String>,
        start_line: u32,
        end_line: u32,
    ) -> NodeId {
        let id = self.push(NodeData::labeled(kind, label.into()), start_line, end_line);
        self.stack.push(id);
        id
    }

    /// Add a labeled leaf on a single line.
    pub fn leaf(&mut self, kind: AstKind, label: impl Into<String>, line: u32) -> NodeId {
        self.push(NodeData::labeled(kind, label.into()), line, line)
    }

    /// Add an unlabeled leaf on a single line.
    pub fn empty(&mut self, kind: AstKind, line: u32) -> NodeId {
        self.push(NodeData::new(kind), line, line)
    }

    /// Close the innermost open node. The root is never closed.
    pub fn close(&mut self) {
        if self.stack.len() > 1
            && let Some(id) = self.stack.pop()
        {
            self.seal(id);
        }
    }

    /// Stretch the span of `id` over everything added since it was opened.
    fn seal(&mut self, id: NodeId) {
        let end = self.offset;
        if let Some(node) = self.tree.arena.get_mut(id) {
            node.get_mut().span.end.offset = end;
        }
    }

    /// Give `id` a tag for [`AstTree::tagged`].
    pub fn tag(&mut self, tag: impl Into<String>, id: NodeId) {
        self.tags.insert(tag.into(), id);
    }

    /// Root of the tree under construction.
    pub fn root(&self) -> NodeId {
        self.tree.root
    }

    /// Compute the metrics and hand the tree over.
    pub fn finish(mut self) -> AstTree {
        while let Some(id) = self.stack.pop() {
            self.seal(id);
        }
        self.tree.compute_metrics();
        AstTree {
            tree: self.tree,
            file_path: self.file_path,
            tags: self.tags,
        }
    }
}
