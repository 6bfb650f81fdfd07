// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

use crate::{Attribute, Document, Error, NodeData, NodeId, NodeKind, QName, SVG_NS};

const XML_NAMESPACE_NS: &str = "http://www.w3.org/XML/1998/namespace";

impl Document {
    /// Parses a [`Document`] from a string.
    pub fn parse_str(text: &str) -> Result<Document, Error> {
        let xml_opt = roxmltree::ParsingOptions {
            allow_dtd: true,
            ..Default::default()
        };

        let xml = roxmltree::Document::parse_with_options(text, xml_opt)?;
        Self::parse_tree(&xml)
    }

    /// Parses a [`Document`] from raw bytes.
    pub fn parse_data(data: &[u8]) -> Result<Document, Error> {
        let text = std::str::from_utf8(data).map_err(|_| Error::NotAnUtf8Str)?;
        Self::parse_str(text)
    }

    /// Parses a [`Document`] from a [`roxmltree::Document`].
    pub fn parse_tree(xml: &roxmltree::Document) -> Result<Document, Error> {
        parse(xml)
    }
}

fn parse(xml: &roxmltree::Document) -> Result<Document, Error> {
    let root_element = xml.root_element();
    if root_element.tag_name().name() != "svg" {
        return Err(Error::NotAnSvg);
    }

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

    // Prefixed namespaces are hoisted to the root element on write,
    // so collect declarations from the whole document.
    // Nested default namespaces stay on their elements.
    for node in xml.descendants().filter(|n| n.is_element()) {
        for ns in node.namespaces() {
            if ns.uri() == XML_NAMESPACE_NS {
                continue;
            }

            if ns.name().is_none() && node != root_element {
                continue;
            }

            doc.declare_namespace(ns.name(), ns.uri());
        }
    }

    let root_id = doc.root().id();
    parse_xml_node(root_element, root_id, 0, &mut doc)?;

    Ok(doc)
}

fn parse_xml_node(
    node: roxmltree::Node,
    parent_id: NodeId,
    depth: u32,
    doc: &mut Document,
) -> Result<(), Error> {
    if depth > 1024 {
        return Err(Error::ElementsLimitReached);
    }

    if doc.nodes.len() > 1_000_000 {
        return Err(Error::ElementsLimitReached);
    }

    if node.is_text() {
        let text = node.text().unwrap_or_default();
        if !text.trim().is_empty() {
            let id = doc.create_text(text);
            doc.append(parent_id, id);
        }

        return Ok(());
    }

    // Comments and processing instructions are not preserved.
    if !node.is_element() {
        return Ok(());
    }

    let name = qualified_name(node, node.tag_name().namespace(), node.tag_name().name());
    let namespace = match node.tag_name().namespace() {
        Some(uri) if name.prefix.is_none() && uri != SVG_NS => Some(uri.to_string()),
        _ => None,
    };

    let mut attributes = Vec::new();
    for attr in node.attributes() {
        attributes.push(Attribute {
            name: qualified_name(node, attr.namespace(), attr.name()),
            value: attr.value().to_string(),
        });
    }

    let id = doc.push(NodeKind::Element {
        name,
        namespace,
        attributes,
    });
    doc.append(parent_id, id);

    for child in node.children() {
        parse_xml_node(child, id, depth + 1, doc)?;
    }

    Ok(())
}

fn qualified_name(node: roxmltree::Node, namespace: Option<&str>, local: &str) -> QName {
    let prefix = match namespace {
        Some(XML_NAMESPACE_NS) => Some("xml"),
        Some(uri) => node.lookup_prefix(uri),
        None => None,
    };

    QName {
        prefix: prefix.map(str::to_string),
        local: local.to_string(),
    }
}
