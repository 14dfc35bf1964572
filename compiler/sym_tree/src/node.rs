//! Symbol nodes.
//!
//! A [`Node`] is a kind, an optional literal payload and an ordered list of
//! children. Child order is positional: a `Function` node is always
//! `context, name, [label list], type`, and consumers address children by
//! index only.
//!
//! Nodes are reference-counted and cheap to clone. The demangler pushes the
//! same substitution into many places of one tree, so trees are really DAGs;
//! copying on every back-reference would let a short name expand
//! exponentially. Mutation goes through `Arc::make_mut`, which only copies
//! when the node is actually shared.

use std::fmt;
use std::hash::{Hash, Hasher};
use std::ops::{Deref, DerefMut};
use std::sync::Arc;

use sym_stack::ensure_sufficient_stack;

use crate::predicates;
use crate::Kind;

/// Literal payload of a node.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub enum Contents {
    #[default]
    None,
    Index(u64),
    Text(String),
}

#[derive(Clone)]
struct NodeData {
    kind: Kind,
    contents: Contents,
    children: Vec<Node>,
    /// Longest path down to a leaf, counting this node.
    height: usize,
}

fn height_of(children: &[Node]) -> usize {
    1 + children.iter().map(Node::height).max().unwrap_or(0)
}

impl NodeData {
    fn refresh_height(&mut self) {
        self.height = height_of(&self.children);
    }
}

// Unlinks uniquely owned descendants one at a time so deep chains drop
// without recursing.
impl Drop for NodeData {
    fn drop(&mut self) {
        let mut pending = std::mem::take(&mut self.children);
        while let Some(node) = pending.pop() {
            if let Some(mut data) = Arc::into_inner(node.0) {
                pending.append(&mut data.children);
            }
        }
    }
}

/// One node of a symbol tree.
///
/// Equality and hashing are structural. Both recurse into the children on a
/// growable stack, so arbitrarily deep trees compare without overflowing.
#[derive(Clone)]
pub struct Node(Arc<NodeData>);

impl Node {
    fn from_parts(kind: Kind, contents: Contents, children: Vec<Node>) -> Self {
        let height = height_of(&children);
        Node(Arc::new(NodeData {
            kind,
            contents,
            children,
            height,
        }))
    }

    /// A leaf with no payload.
    pub fn new(kind: Kind) -> Self {
        Node::from_parts(kind, Contents::None, Vec::new())
    }

    pub fn with_text(kind: Kind, text: impl Into<String>) -> Self {
        Node::from_parts(kind, Contents::Text(text.into()), Vec::new())
    }

    pub fn with_index(kind: Kind, index: u64) -> Self {
        Node::from_parts(kind, Contents::Index(index), Vec::new())
    }

    pub fn with_child(kind: Kind, child: Node) -> Self {
        Node::from_parts(kind, Contents::None, vec![child])
    }

    pub fn with_children(kind: Kind, children: impl IntoIterator<Item = Node>) -> Self {
        Node::from_parts(kind, Contents::None, children.into_iter().collect())
    }

    #[inline]
    pub fn kind(&self) -> Kind {
        self.0.kind
    }

    #[inline]
    pub fn contents(&self) -> &Contents {
        &self.0.contents
    }

    /// Text payload, if any.
    pub fn text(&self) -> Option<&str> {
        match &self.0.contents {
            Contents::Text(text) => Some(text),
            _ => None,
        }
    }

    /// Integer payload, if any.
    pub fn index(&self) -> Option<u64> {
        match self.0.contents {
            Contents::Index(index) => Some(index),
            _ => None,
        }
    }

    #[inline]
    pub fn children(&self) -> &[Node] {
        &self.0.children
    }

    #[inline]
    pub fn child(&self, index: usize) -> Option<&Node> {
        self.0.children.get(index)
    }

    #[inline]
    pub fn first_child(&self) -> Option<&Node> {
        self.0.children.first()
    }

    #[inline]
    pub fn last_child(&self) -> Option<&Node> {
        self.0.children.last()
    }

    #[inline]
    pub fn num_children(&self) -> usize {
        self.0.children.len()
    }

    /// Number of nodes on the longest path from here down to a leaf.
    /// A leaf has height 1.
    #[inline]
    pub fn height(&self) -> usize {
        self.0.height
    }

    /// Kind of the child at `index`, if present.
    pub fn child_kind(&self, index: usize) -> Option<Kind> {
        self.child(index).map(Node::kind)
    }

    /// Whether two handles point at the very same node.
    pub fn ptr_eq(&self, other: &Node) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }

    /// Protocol nodes, looking through a `Type` wrapper.
    pub fn is_protocol(&self) -> bool {
        match self.kind() {
            Kind::Type => self.first_child().is_some_and(Node::is_protocol),
            kind => predicates::is_protocol_kind(kind),
        }
    }

    /// Whether this is an `Identifier` spelling `name`.
    pub fn is_identifier(&self, name: &str) -> bool {
        self.kind() == Kind::Identifier && self.text() == Some(name)
    }

    /// Same payload and children under a different kind.
    #[must_use]
    pub fn changing_kind(&self, kind: Kind) -> Node {
        Node::from_parts(kind, self.0.contents.clone(), self.0.children.clone())
    }

    // =========================================================================
    // Copy-on-Write Edits
    // =========================================================================

    fn data_mut(&mut self) -> &mut NodeData {
        Arc::make_mut(&mut self.0)
    }

    pub fn add_child(&mut self, child: Node) {
        self.children_mut().push(child);
    }

    pub fn add_children(&mut self, children: impl IntoIterator<Item = Node>) {
        self.children_mut().extend(children);
    }

    /// Builder form of [`add_child`](Self::add_child).
    #[must_use]
    pub fn adding_child(mut self, child: Node) -> Node {
        self.add_child(child);
        self
    }

    /// Insert at `index`, clamped to the current child count.
    pub fn insert_child(&mut self, index: usize, child: Node) {
        let mut children = self.children_mut();
        let index = index.min(children.len());
        children.insert(index, child);
    }

    /// Replace the child at `index`. Out-of-range indices are ignored.
    pub fn replace_child(&mut self, index: usize, child: Node) {
        if let Some(slot) = self.children_mut().get_mut(index) {
            *slot = child;
        }
    }

    /// Mutable access to the children for late annotation passes.
    ///
    /// The height is brought up to date when the returned guard drops.
    pub fn children_mut(&mut self) -> ChildrenMut<'_> {
        ChildrenMut {
            data: self.data_mut(),
        }
    }
}

/// Guard returned by [`Node::children_mut`].
pub struct ChildrenMut<'a> {
    data: &'a mut NodeData,
}

impl Deref for ChildrenMut<'_> {
    type Target = Vec<Node>;

    fn deref(&self) -> &Vec<Node> {
        &self.data.children
    }
}

impl DerefMut for ChildrenMut<'_> {
    fn deref_mut(&mut self) -> &mut Vec<Node> {
        &mut self.data.children
    }
}

impl Drop for ChildrenMut<'_> {
    fn drop(&mut self) {
        self.data.refresh_height();
    }
}

impl PartialEq for Node {
    fn eq(&self, other: &Node) -> bool {
        if self.ptr_eq(other) {
            return true;
        }
        let (a, b) = (&*self.0, &*other.0);
        a.kind == b.kind
            && a.height == b.height
            && a.contents == b.contents
            && ensure_sufficient_stack(|| a.children == b.children)
    }
}

impl Eq for Node {}

impl Hash for Node {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.0.kind.hash(state);
        self.0.contents.hash(state);
        ensure_sufficient_stack(|| self.0.children.hash(state));
    }
}

impl fmt::Debug for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        ensure_sufficient_stack(|| self.fmt_fields(f))
    }
}

impl Node {
    fn fmt_fields(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut s = f.debug_struct("Node");
        s.field("kind", &self.kind());
        match self.contents() {
            Contents::None => {}
            Contents::Index(index) => {
                s.field("index", index);
            }
            Contents::Text(text) => {
                s.field("text", text);
            }
        }
        if !self.children().is_empty() {
            s.field("children", &self.children());
        }
        s.finish()
    }
}

/// Indented tree dump, one node per line:
///
/// ```text
/// kind=Global
///   kind=Function
///     kind=Module, text="main"
/// ```
impl fmt::Display for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut stack = vec![(self, 0usize)];
        while let Some((node, depth)) = stack.pop() {
            write!(f, "{:indent$}kind={}", "", node.kind(), indent = depth * 2)?;
            match node.contents() {
                Contents::None => {}
                Contents::Index(index) => write!(f, ", index={index}")?,
                Contents::Text(text) => write!(f, ", text=\"{text}\"")?,
            }
            writeln!(f)?;
            stack.extend(node.children().iter().rev().map(|child| (child, depth + 1)));
        }
        Ok(())
    }
}
