// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

/*!
Represents an SVG document as an owned, editable tree.

`svgtree` uses [`roxmltree`](https://github.com/RazrFalcon/roxmltree) for parsing,
but unlike it, the resulting tree can be modified: nodes can be created, moved,
removed and copied between documents, and the tree can be written back to SVG.

Only element and non-blank text nodes are preserved.
*/

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(missing_debug_implementations)]

use std::num::NonZeroU32;

mod parse;
mod writer;

pub use roxmltree;
pub use writer::WriteOptions;
pub use xmlwriter::Indent;

/// The SVG namespace.
pub const SVG_NS: &str = "http://www.w3.org/2000/svg";
/// The XLink namespace.
pub const XLINK_NS: &str = "http://www.w3.org/1999/xlink";

/// A list of supported errors.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Not an UTF-8 data.
    #[error("provided data has not an UTF-8 encoding")]
    NotAnUtf8Str,

    /// The root element is not `svg`.
    #[error("the root element is not 'svg'")]
    NotAnSvg,

    /// Document nesting or size limits were exceeded.
    #[error("elements limit reached")]
    ElementsLimitReached,

    /// An XML parsing error.
    #[error("SVG data parsing failed cause {0}")]
    ParsingFailed(#[from] roxmltree::Error),
}

/// A qualified name of an element or an attribute.
#[derive(Clone, PartialEq, Eq, Hash, Debug)]
pub struct QName {
    /// Namespace prefix, if any.
    pub prefix: Option<String>,
    /// Local part of the name.
    pub local: String,
}

impl QName {
    /// Splits `prefix:local` into a qualified name.
    pub fn parse(name: &str) -> Self {
        match name.split_once(':') {
            Some((prefix, local)) => QName {
                prefix: Some(prefix.to_string()),
                local: local.to_string(),
            },
            None => QName {
                prefix: None,
                local: name.to_string(),
            },
        }
    }

    /// Checks that the name is equal to `prefix:local` or to an unprefixed `local`.
    pub fn matches(&self, name: &str) -> bool {
        match name.split_once(':') {
            Some((prefix, local)) => self.prefix.as_deref() == Some(prefix) && self.local == local,
            None => self.prefix.is_none() && self.local == name,
        }
    }
}

impl std::fmt::Display for QName {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self.prefix {
            Some(ref prefix) => write!(f, "{}:{}", prefix, self.local),
            None => write!(f, "{}", self.local),
        }
    }
}

/// An attribute.
#[derive(Clone, PartialEq, Debug)]
pub struct Attribute {
    /// Attribute's name.
    pub name: QName,
    /// Attribute's value.
    pub value: String,
}

/// A namespace declaration.
#[derive(Clone, PartialEq, Debug)]
pub struct Namespace {
    /// Prefix. `None` for the default namespace.
    pub prefix: Option<String>,
    /// Namespace URI.
    pub uri: String,
}

/// A node handle.
///
/// Valid only for the [`Document`] that created it.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub struct NodeId(NonZeroU32);

impl NodeId {
    #[inline]
    fn new(id: u32) -> Self {
        debug_assert!(id < u32::MAX);

        // We are using `NonZeroU32` to reduce overhead of `Option<NodeId>`.
        NodeId(NonZeroU32::new(id + 1).unwrap_or(NonZeroU32::MIN))
    }

    #[inline]
    fn get_usize(self) -> usize {
        (self.0.get() - 1) as usize
    }
}

impl From<usize> for NodeId {
    #[inline]
    fn from(id: usize) -> Self {
        debug_assert!(id <= u32::MAX as usize);
        NodeId::new(id as u32)
    }
}

#[derive(Clone, Debug)]
enum NodeKind {
    Root,
    Element {
        name: QName,
        // The URI of a non-SVG default namespace, like XHTML inside `foreignObject`.
        namespace: Option<String>,
        attributes: Vec<Attribute>,
    },
    Text(String),
}

#[derive(Clone, Debug)]
struct NodeData {
    parent: Option<NodeId>,
    prev_sibling: Option<NodeId>,
    next_sibling: Option<NodeId>,
    children: Option<(NodeId, NodeId)>,
    kind: NodeKind,
}

/// An SVG tree container.
///
/// Nodes are stored in an arena. Removed nodes are only unlinked from the tree,
/// their storage is reclaimed when the document is dropped.
#[derive(Clone)]
pub struct Document {
    nodes: Vec<NodeData>,
    namespaces: Vec<Namespace>,
}

impl Document {
    /// Creates a new document with a single root element.
    pub fn new(root_tag: &str) -> Self {
        let mut doc = Document {
            nodes: vec![NodeData {
                parent: None,
                prev_sibling: None,
                next_sibling: None,
                children: None,
                kind: NodeKind::Root,
            }],
            namespaces: Vec::new(),
        };

        let root = doc.root().id();
        let element = doc.create_element(root_tag);
        doc.append(root, element);
        doc
    }

    /// Returns the root node.
    #[inline]
    pub fn root(&self) -> Node {
        self.get(NodeId::new(0))
    }

    /// Returns the root element.
    #[inline]
    pub fn root_element(&self) -> Node {
        // `Document` is guarantee to have at least one element.
        self.root().first_element_child().unwrap_or_else(|| self.root())
    }

    /// Returns a node by handle.
    #[inline]
    pub fn get(&self, id: NodeId) -> Node {
        Node {
            id,
            d: &self.nodes[id.get_usize()],
            doc: self,
        }
    }

    /// Returns an iterator over document's descendant nodes.
    ///
    /// Shorthand for `doc.root().descendants()`.
    #[inline]
    pub fn descendants(&self) -> Descendants {
        self.root().descendants()
    }

    /// Returns the first attached element with a specified `id` attribute.
    pub fn element_by_id(&self, id: &str) -> Option<Node> {
        self.descendants().find(|n| n.element_id() == Some(id))
    }

    /// Returns declared namespaces.
    pub fn namespaces(&self) -> &[Namespace] {
        &self.namespaces
    }

    /// Declares a namespace, unless its prefix is already declared.
    pub fn declare_namespace(&mut self, prefix: Option<&str>, uri: &str) {
        if self.namespaces.iter().any(|ns| ns.prefix.as_deref() == prefix) {
            return;
        }

        self.namespaces.push(Namespace {
            prefix: prefix.map(str::to_string),
            uri: uri.to_string(),
        });
    }

    fn push(&mut self, kind: NodeKind) -> NodeId {
        let id = NodeId::from(self.nodes.len());
        self.nodes.push(NodeData {
            parent: None,
            prev_sibling: None,
            next_sibling: None,
            children: None,
            kind,
        });
        id
    }

    /// Creates a new detached element.
    pub fn create_element(&mut self, tag_name: &str) -> NodeId {
        self.push(NodeKind::Element {
            name: QName::parse(tag_name),
            namespace: None,
            attributes: Vec::new(),
        })
    }

    /// Creates a new detached text node.
    pub fn create_text(&mut self, text: &str) -> NodeId {
        self.push(NodeKind::Text(text.to_string()))
    }

    /// Appends `child` as the last child of `parent`.
    ///
    /// `child` is detached first, if needed.
    pub fn append(&mut self, parent: NodeId, child: NodeId) {
        self.detach(child);

        let last_child = self.nodes[parent.get_usize()].children.map(|(_, id)| id);
        {
            let d = &mut self.nodes[child.get_usize()];
            d.parent = Some(parent);
            d.prev_sibling = last_child;
        }

        if let Some(id) = last_child {
            self.nodes[id.get_usize()].next_sibling = Some(child);
        }

        let children = &mut self.nodes[parent.get_usize()].children;
        *children = Some(match *children {
            Some((first, _)) => (first, child),
            None => (child, child),
        });
    }

    /// Inserts `child` as the first child of `parent`.
    ///
    /// `child` is detached first, if needed.
    pub fn prepend(&mut self, parent: NodeId, child: NodeId) {
        self.detach(child);

        let first_child = self.nodes[parent.get_usize()].children.map(|(id, _)| id);
        {
            let d = &mut self.nodes[child.get_usize()];
            d.parent = Some(parent);
            d.next_sibling = first_child;
        }

        if let Some(id) = first_child {
            self.nodes[id.get_usize()].prev_sibling = Some(child);
        }

        let children = &mut self.nodes[parent.get_usize()].children;
        *children = Some(match *children {
            Some((_, last)) => (child, last),
            None => (child, child),
        });
    }

    /// Unlinks a node, together with its subtree, from its parent.
    pub fn detach(&mut self, id: NodeId) {
        let (parent, prev, next) = {
            let d = &self.nodes[id.get_usize()];
            (d.parent, d.prev_sibling, d.next_sibling)
        };

        let parent = match parent {
            Some(v) => v,
            None => return,
        };

        if let Some(prev) = prev {
            self.nodes[prev.get_usize()].next_sibling = next;
        }

        if let Some(next) = next {
            self.nodes[next.get_usize()].prev_sibling = prev;
        }

        let children = &mut self.nodes[parent.get_usize()].children;
        *children = match (prev, next, *children) {
            (None, None, _) => None,
            (None, Some(next), Some((_, last))) => Some((next, last)),
            (Some(prev), None, Some((first, _))) => Some((first, prev)),
            (_, _, children) => children,
        };

        let d = &mut self.nodes[id.get_usize()];
        d.parent = None;
        d.prev_sibling = None;
        d.next_sibling = None;
    }

    /// Removes a node, together with its subtree, from the tree.
    ///
    /// The root node cannot be removed.
    pub fn remove(&mut self, id: NodeId) {
        self.detach(id);
    }

    /// Sets an attribute value, replacing an existing one.
    ///
    /// Does nothing for non-element nodes.
    pub fn set_attribute(&mut self, id: NodeId, name: &str, value: &str) {
        if let NodeKind::Element {
            ref mut attributes, ..
        } = self.nodes[id.get_usize()].kind
        {
            match attributes.iter_mut().find(|a| a.name.matches(name)) {
                Some(attr) => attr.value = value.to_string(),
                None => attributes.push(Attribute {
                    name: QName::parse(name),
                    value: value.to_string(),
                }),
            }
        }
    }

    /// Removes an attribute and returns its value.
    pub fn remove_attribute(&mut self, id: NodeId, name: &str) -> Option<String> {
        match self.nodes[id.get_usize()].kind {
            NodeKind::Element {
                ref mut attributes, ..
            } => {
                let idx = attributes.iter().position(|a| a.name.matches(name))?;
                Some(attributes.remove(idx).value)
            }
            _ => None,
        }
    }

    /// Copies a node with all its descendants from another document.
    ///
    /// The copy is detached. Namespaces of the source document are declared
    /// in this one when missing.
    pub fn import(&mut self, source: &Document, node: NodeId) -> NodeId {
        for ns in &source.namespaces {
            self.declare_namespace(ns.prefix.as_deref(), &ns.uri);
        }

        self.import_impl(source.get(node))
    }

    fn import_impl(&mut self, node: Node) -> NodeId {
        let kind = match node.d.kind {
            // A document root is copied as a plain container of its children.
            NodeKind::Root => NodeKind::Element {
                name: QName::parse("g"),
                namespace: None,
                attributes: Vec::new(),
            },
            ref kind => kind.clone(),
        };

        let id = self.push(kind);
        for child in node.children() {
            let child_id = self.import_impl(child);
            self.append(id, child_id);
        }

        id
    }
}

impl std::fmt::Debug for Document {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> Result<(), std::fmt::Error> {
        if !self.root().has_children() {
            return write!(f, "Document []");
        }

        macro_rules! writeln_indented {
            ($depth:expr, $f:expr, $fmt:expr) => {
                for _ in 0..$depth { write!($f, "    ")?; }
                writeln!($f, $fmt)?;
            };
            ($depth:expr, $f:expr, $fmt:expr, $($arg:tt)*) => {
                for _ in 0..$depth { write!($f, "    ")?; }
                writeln!($f, $fmt, $($arg)*)?;
            };
        }

        fn print_children(
            parent: Node,
            depth: usize,
            f: &mut std::fmt::Formatter,
        ) -> Result<(), std::fmt::Error> {
            for child in parent.children() {
                if child.is_element() {
                    writeln_indented!(depth, f, "Element {{");
                    writeln_indented!(depth, f, "    tag_name: {:?}", child.tag_name());

                    if !child.attributes().is_empty() {
                        writeln_indented!(depth + 1, f, "attributes: [");
                        for attr in child.attributes() {
                            writeln_indented!(depth + 2, f, "{}={:?}", attr.name, attr.value);
                        }
                        writeln_indented!(depth + 1, f, "]");
                    }

                    if child.has_children() {
                        writeln_indented!(depth, f, "    children: [");
                        print_children(child, depth + 2, f)?;
                        writeln_indented!(depth, f, "    ]");
                    }

                    writeln_indented!(depth, f, "}}");
                } else {
                    writeln_indented!(depth, f, "{:?}", child);
                }
            }

            Ok(())
        }

        writeln!(f, "Document [")?;
        print_children(self.root(), 1, f)?;
        writeln!(f, "]")?;

        Ok(())
    }
}

/// An SVG node.
#[derive(Clone, Copy)]
pub struct Node<'a> {
    id: NodeId,
    doc: &'a Document,
    d: &'a NodeData,
}

impl Eq for Node<'_> {}

impl PartialEq for Node<'_> {
    #[inline]
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id && std::ptr::eq(self.doc, other.doc)
    }
}

impl<'a> Node<'a> {
    /// Returns node's handle.
    #[inline]
    pub fn id(&self) -> NodeId {
        self.id
    }

    /// Returns node's document.
    #[inline]
    pub fn document(&self) -> &'a Document {
        self.doc
    }

    /// Checks if the current node is an element.
    #[inline]
    pub fn is_element(&self) -> bool {
        matches!(self.d.kind, NodeKind::Element { .. })
    }

    /// Checks if the current node is a text.
    #[inline]
    pub fn is_text(&self) -> bool {
        matches!(self.d.kind, NodeKind::Text(_))
    }

    /// Returns element's qualified name, unless the current node is not an element.
    #[inline]
    pub fn name(&self) -> Option<&'a QName> {
        match self.d.kind {
            NodeKind::Element { ref name, .. } => Some(name),
            _ => None,
        }
    }

    /// Returns element's namespace URI, unless the current node is not an element.
    ///
    /// Unprefixed elements are in the SVG namespace unless parsed with another default one.
    pub fn namespace(&self) -> Option<&'a str> {
        let (name, namespace) = match self.d.kind {
            NodeKind::Element {
                ref name,
                ref namespace,
                ..
            } => (name, namespace),
            _ => return None,
        };

        if let Some(ref uri) = namespace {
            return Some(uri);
        }

        match name.prefix {
            Some(ref prefix) => self
                .doc
                .namespaces
                .iter()
                .find(|ns| ns.prefix.as_deref() == Some(prefix.as_str()))
                .map(|ns| ns.uri.as_str()),
            None => Some(SVG_NS),
        }
    }

    /// Returns element's local tag name, unless the current node is not an element.
    #[inline]
    pub fn tag_name(&self) -> Option<&'a str> {
        self.name().map(|name| name.local.as_str())
    }

    /// Checks that the current node is an element with a specified local tag name.
    ///
    /// The comparison is ASCII case-insensitive, like `foreignObject` vs `foreignobject`.
    #[inline]
    pub fn has_tag_name(&self, tag_name: &str) -> bool {
        self.tag_name()
            .map(|name| name.eq_ignore_ascii_case(tag_name))
            .unwrap_or(false)
    }

    /// Returns element's `id` attribute value.
    #[inline]
    pub fn element_id(&self) -> Option<&'a str> {
        self.attribute("id")
    }

    /// Returns an attribute value.
    ///
    /// `name` can be either `local` or `prefix:local`.
    #[inline]
    pub fn attribute(&self, name: &str) -> Option<&'a str> {
        self.attributes()
            .iter()
            .find(|a| a.name.matches(name))
            .map(|a| a.value.as_str())
    }

    /// Returns `href` or `xlink:href` attribute value.
    #[inline]
    pub fn href(&self) -> Option<&'a str> {
        self.attribute("href").or_else(|| {
            self.attributes()
                .iter()
                .find(|a| a.name.local == "href" && a.name.prefix.is_some())
                .map(|a| a.value.as_str())
        })
    }

    /// Checks if an attribute is present.
    #[inline]
    pub fn has_attribute(&self, name: &str) -> bool {
        self.attribute(name).is_some()
    }

    /// Returns a list of all element's attributes.
    #[inline]
    pub fn attributes(&self) -> &'a [Attribute] {
        match self.d.kind {
            NodeKind::Element { ref attributes, .. } => attributes,
            _ => &[],
        }
    }

    /// Returns node's text data.
    ///
    /// For text nodes returns its content. For elements returns the first child node text.
    #[inline]
    pub fn text(&self) -> &'a str {
        match self.d.kind {
            NodeKind::Element { .. } => match self.first_child() {
                Some(child) if child.is_text() => child.text(),
                _ => "",
            },
            NodeKind::Text(ref text) => text,
            NodeKind::Root => "",
        }
    }

    /// Returns a parent node.
    #[inline]
    pub fn parent(&self) -> Option<Self> {
        self.d.parent.map(|id| self.doc.get(id))
    }

    /// Returns the parent element.
    #[inline]
    pub fn parent_element(&self) -> Option<Self> {
        self.ancestors().skip(1).find(|n| n.is_element())
    }

    /// Returns the previous sibling.
    #[inline]
    pub fn prev_sibling(&self) -> Option<Self> {
        self.d.prev_sibling.map(|id| self.doc.get(id))
    }

    /// Returns the next sibling.
    #[inline]
    pub fn next_sibling(&self) -> Option<Self> {
        self.d.next_sibling.map(|id| self.doc.get(id))
    }

    /// Returns the first child.
    #[inline]
    pub fn first_child(&self) -> Option<Self> {
        self.d.children.map(|(id, _)| self.doc.get(id))
    }

    /// Returns the first child element.
    #[inline]
    pub fn first_element_child(&self) -> Option<Self> {
        self.children().find(|n| n.is_element())
    }

    /// Returns the last child.
    #[inline]
    pub fn last_child(&self) -> Option<Self> {
        self.d.children.map(|(_, id)| self.doc.get(id))
    }

    /// Checks if the node has child nodes.
    #[inline]
    pub fn has_children(&self) -> bool {
        self.d.children.is_some()
    }

    /// Returns an iterator over ancestor nodes starting at this node.
    #[inline]
    pub fn ancestors(&self) -> Ancestors<'a> {
        Ancestors(Some(*self))
    }

    /// Returns an iterator over children nodes.
    #[inline]
    pub fn children(&self) -> Children<'a> {
        Children {
            front: self.first_child(),
            back: self.last_child(),
        }
    }

    #[inline]
    fn traverse(&self) -> Traverse<'a> {
        Traverse {
            root: *self,
            edge: None,
        }
    }

    /// Returns an iterator over this node and its descendants.
    #[inline]
    pub fn descendants(&self) -> Descendants<'a> {
        Descendants(self.traverse())
    }
}

impl std::fmt::Debug for Node<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> Result<(), std::fmt::Error> {
        match self.d.kind {
            NodeKind::Root => write!(f, "Root"),
            NodeKind::Element {
                ref name,
                ref attributes,
                ..
            } => {
                write!(
                    f,
                    "Element {{ tag_name: {}, attributes: {:?} }}",
                    name, attributes
                )
            }
            NodeKind::Text(ref text) => write!(f, "Text({:?})", text),
        }
    }
}

/// An iterator over ancestor nodes.
#[derive(Clone, Debug)]
pub struct Ancestors<'a>(Option<Node<'a>>);

impl<'a> Iterator for Ancestors<'a> {
    type Item = Node<'a>;

    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        let node = self.0.take();
        self.0 = node.as_ref().and_then(Node::parent);
        node
    }
}

/// An iterator over children nodes.
#[derive(Clone, Debug)]
pub struct Children<'a> {
    front: Option<Node<'a>>,
    back: Option<Node<'a>>,
}

impl<'a> Iterator for Children<'a> {
    type Item = Node<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        let node = self.front.take();
        if self.front == self.back {
            self.back = None;
        } else {
            self.front = node.as_ref().and_then(Node::next_sibling);
        }
        node
    }
}

#[derive(Clone, Copy, PartialEq, Debug)]
enum Edge<'a> {
    Open(Node<'a>),
    Close(Node<'a>),
}

#[derive(Clone, Debug)]
struct Traverse<'a> {
    root: Node<'a>,
    edge: Option<Edge<'a>>,
}

impl<'a> Iterator for Traverse<'a> {
    type Item = Edge<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        match self.edge {
            Some(Edge::Open(node)) => {
                self.edge = Some(match node.first_child() {
                    Some(first_child) => Edge::Open(first_child),
                    None => Edge::Close(node),
                });
            }
            Some(Edge::Close(node)) => {
                if node == self.root {
                    self.edge = None;
                } else if let Some(next_sibling) = node.next_sibling() {
                    self.edge = Some(Edge::Open(next_sibling));
                } else {
                    self.edge = node.parent().map(Edge::Close);
                }
            }
            None => {
                self.edge = Some(Edge::Open(self.root));
            }
        }

        self.edge
    }
}

/// A descendants iterator.
#[derive(Clone, Debug)]
pub struct Descendants<'a>(Traverse<'a>);

impl<'a> Iterator for Descendants<'a> {
    type Item = Node<'a>;

    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        for edge in &mut self.0 {
            if let Edge::Open(node) = edge {
                return Some(node);
            }
        }

        None
    }
}
