//! Document tree for the Arbor parser.
//!
//! This crate provides the arena-based tree a parse produces: [`Document`] owns
//! every [`Node`], and nodes refer to each other through [`NodeId`] indices.
//!
//! # Design
//!
//! The `children` list of a node is the owning relation; `parent` is a plain
//! index and never implies ownership. Nodes are only ever appended, so a child
//! always has a higher [`NodeId`] than its parent. Teardown relies on that
//! ordering: releasing the arena back to front frees every child before its
//! parent.

use std::mem;

/// A type-safe index into a [`Document`]'s node arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub usize);

impl NodeId {
    /// The root node is always at index 0.
    pub const ROOT: Self = Self(0);
}

/// A `key="value"` pair declared on a tag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attribute {
    key: String,
    value: String,
}

impl Attribute {
    /// Create a new attribute with the given key and value.
    #[must_use]
    pub const fn new(key: String, value: String) -> Self {
        Self { key, value }
    }

    /// The attribute key, exactly as written.
    #[must_use]
    pub fn key(&self) -> &str {
        &self.key
    }

    /// The attribute value without its surrounding quotes.
    #[must_use]
    pub fn value(&self) -> &str {
        &self.value
    }
}

/// A tagged node in the document tree.
///
/// The root node has no tag, no parent and (usually) no text; every other node
/// receives its tag as soon as its header has been classified.
#[derive(Debug, Clone, Default)]
pub struct Node {
    tag: Option<String>,
    text: Option<String>,
    parent: Option<NodeId>,
    attributes: Vec<Attribute>,
    children: Vec<NodeId>,
}

impl Node {
    fn with_parent(parent: Option<NodeId>) -> Self {
        Self {
            parent,
            ..Self::default()
        }
    }

    /// The tag name, if one has been assigned.
    #[must_use]
    pub fn tag(&self) -> Option<&str> {
        self.tag.as_deref()
    }

    /// Text content directly inside this node, trailing whitespace removed.
    #[must_use]
    pub fn text(&self) -> Option<&str> {
        self.text.as_deref()
    }

    /// The enclosing node, or `None` for the root.
    #[must_use]
    pub const fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    /// Attributes in declaration order. Duplicate keys are kept.
    #[must_use]
    pub fn attributes(&self) -> &[Attribute] {
        &self.attributes
    }

    /// Child ids in document order.
    #[must_use]
    pub fn children(&self) -> &[NodeId] {
        &self.children
    }

    /// Value of the first attribute whose key matches `key` exactly.
    #[must_use]
    pub fn get_attr_val(&self, key: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|attr| attr.key == key)
            .map(Attribute::value)
    }

    /// Assign the tag name. A node's tag is set once, when its header is read.
    ///
    /// Returns `false` and leaves the node untouched if it already has a tag.
    pub fn set_tag(&mut self, tag: String) -> bool {
        if self.tag.is_some() {
            return false;
        }
        self.tag = Some(tag);
        true
    }

    /// Assign the text content.
    ///
    /// Returns `false` and leaves the node untouched if it already has text.
    pub fn set_text(&mut self, text: String) -> bool {
        if self.text.is_some() {
            return false;
        }
        self.text = Some(text);
        true
    }

    /// Append an attribute after the ones already declared.
    pub fn push_attribute(&mut self, attr: Attribute) {
        self.attributes.push(attr);
    }

    /// Move the value of the first attribute named `key` out of this node.
    ///
    /// The attribute itself stays in place with an empty value.
    pub fn take_attr_val(&mut self, key: &str) -> Option<String> {
        self.attributes
            .iter_mut()
            .find(|attr| attr.key == key)
            .map(|attr| mem::take(&mut attr.value))
    }
}

/// A parsed document: the node arena plus declaration metadata.
#[derive(Debug, Clone)]
pub struct Document {
    /// All nodes, indexed by `NodeId`. The root is always at index 0.
    nodes: Vec<Node>,
    version: Option<String>,
    encoding: Option<String>,
}

impl Document {
    /// Create a document holding only an empty root node.
    #[must_use]
    pub fn new() -> Self {
        Self {
            nodes: vec![Node::with_parent(None)],
            version: None,
            encoding: None,
        }
    }

    /// The root node ID.
    #[must_use]
    pub const fn root(&self) -> NodeId {
        NodeId::ROOT
    }

    /// The root node.
    #[must_use]
    pub fn root_node(&self) -> &Node {
        &self.nodes[NodeId::ROOT.0]
    }

    /// Get a node by its ID.
    #[must_use]
    pub fn get(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id.0)
    }

    /// Get a mutable reference to a node by its ID.
    pub fn get_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        self.nodes.get_mut(id.0)
    }

    /// Number of nodes, root included.
    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Always `false`: a document has at least its root.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Version from the `<?xml ...?>` declaration, if one was present.
    #[must_use]
    pub fn version(&self) -> Option<&str> {
        self.version.as_deref()
    }

    /// Encoding label from the `<?xml ...?>` declaration. Never interpreted.
    #[must_use]
    pub fn encoding(&self) -> Option<&str> {
        self.encoding.as_deref()
    }

    /// Record the declared version.
    pub fn set_version(&mut self, version: String) {
        self.version = Some(version);
    }

    /// Record the declared encoding label.
    pub fn set_encoding(&mut self, encoding: String) {
        self.encoding = Some(encoding);
    }

    /// Allocate an empty node and append it to `parent`'s children.
    ///
    /// The node is reachable from its parent before its tag or text are filled
    /// in, so a tree abandoned halfway through a parse is still consistent.
    ///
    /// # Panics
    /// Panics if `parent` does not belong to this document.
    pub fn new_node(&mut self, parent: NodeId) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes[parent.0].children.push(id);
        self.nodes.push(Node::with_parent(Some(parent)));
        id
    }

    /// Remove the most recently created node and hand it back.
    ///
    /// This is not a general deletion API: it exists so the parser can drop
    /// the declaration and processing-instruction pseudo-nodes it creates.
    /// Only the last node in the arena can be discarded; it is necessarily a
    /// leaf and the last child of its parent. Returns `None` for the root or
    /// for any other node.
    pub fn discard(&mut self, id: NodeId) -> Option<Node> {
        if id == NodeId::ROOT || id.0 + 1 != self.nodes.len() {
            return None;
        }
        let node = self.nodes.pop()?;
        if let Some(parent) = node.parent {
            let popped = self.nodes[parent.0].children.pop();
            debug_assert_eq!(popped, Some(id));
        }
        Some(node)
    }

    /// Tear the document down, releasing every node before its parent.
    pub fn destroy(mut self) {
        // Children always have higher ids than their parent.
        while let Some(node) = self.nodes.pop() {
            drop(node);
        }
    }

    /// Get the parent of a node.
    #[must_use]
    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.get(id).and_then(Node::parent)
    }

    /// Get all children of a node.
    #[must_use]
    pub fn children(&self, id: NodeId) -> &[NodeId] {
        self.get(id).map(Node::children).unwrap_or(&[])
    }

    /// The child at `index` in document order, or `None` if out of range.
    #[must_use]
    pub fn get_child(&self, id: NodeId, index: usize) -> Option<NodeId> {
        self.children(id).get(index).copied()
    }

    /// Value of the first attribute on `id` whose key matches `key` exactly.
    #[must_use]
    pub fn get_attr_val(&self, id: NodeId, key: &str) -> Option<&str> {
        self.get(id).and_then(|node| node.get_attr_val(key))
    }

    /// Iterate over all ancestors of a node, from parent to root.
    #[must_use]
    pub fn ancestors(&self, id: NodeId) -> AncestorIterator<'_> {
        AncestorIterator {
            doc: self,
            current: self.parent(id),
        }
    }

    /// Iterate over a node and everything below it, in document order.
    #[must_use]
    pub fn descendants(&self, id: NodeId) -> DescendantIterator<'_> {
        let stack = if self.get(id).is_some() {
            vec![id]
        } else {
            Vec::new()
        };
        DescendantIterator { doc: self, stack }
    }
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

/// Iterator over ancestors of a node.
pub struct AncestorIterator<'a> {
    doc: &'a Document,
    current: Option<NodeId>,
}

impl Iterator for AncestorIterator<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<Self::Item> {
        let id = self.current?;
        self.current = self.doc.parent(id);
        Some(id)
    }
}

/// Pre-order iterator over a subtree.
pub struct DescendantIterator<'a> {
    doc: &'a Document,
    stack: Vec<NodeId>,
}

impl Iterator for DescendantIterator<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<Self::Item> {
        let id = self.stack.pop()?;
        self.stack.extend(self.doc.children(id).iter().rev().copied());
        Some(id)
    }
}
