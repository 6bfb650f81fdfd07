// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

use xmlwriter::{Indent, XmlWriter};

use crate::{Document, Node, NodeKind, SVG_NS, XLINK_NS};

/// XML writing options.
#[derive(Clone, Copy, Debug)]
pub struct WriteOptions {
    /// Use single quote marks instead of double quote.
    ///
    /// Default: disabled
    pub use_single_quote: bool,

    /// Set XML nodes indention.
    ///
    /// `Indent::None` writes the whole document on a single line.
    ///
    /// Default: 4 spaces
    pub indent: Indent,

    /// Set XML attributes indention.
    ///
    /// Default: `None`
    pub attributes_indent: Indent,
}

impl Default for WriteOptions {
    fn default() -> Self {
        Self {
            use_single_quote: false,
            indent: Indent::Spaces(4),
            attributes_indent: Indent::None,
        }
    }
}

impl Document {
    /// Writes the document back to SVG.
    pub fn to_string(&self, opt: &WriteOptions) -> String {
        let mut xml = XmlWriter::new(xmlwriter::Options {
            use_single_quote: opt.use_single_quote,
            indent: opt.indent,
            attributes_indent: opt.attributes_indent,
        });

        let default_ns = self
            .namespaces()
            .iter()
            .find(|ns| ns.prefix.is_none())
            .map(|ns| ns.uri.as_str())
            .unwrap_or(SVG_NS);

        write_element(self.root_element(), default_ns, true, &mut xml);
        xml.end_document()
    }
}

/// `default_ns` is the default namespace in scope of the parent element.
fn write_element(node: Node, default_ns: &str, is_root: bool, xml: &mut XmlWriter) {
    let name = match node.d.kind {
        NodeKind::Element { ref name, .. } => name,
        NodeKind::Text(ref text) => {
            xml.write_text(text);
            return;
        }
        NodeKind::Root => return,
    };

    xml.start_element(&name.to_string());

    let mut default_ns = default_ns;
    if is_root {
        write_namespaces(node.document(), xml);
    } else if name.prefix.is_none() {
        let ns = node.namespace().unwrap_or(SVG_NS);
        if ns != default_ns {
            xml.write_attribute("xmlns", ns);
            default_ns = ns;
        }
    }

    for attr in node.attributes() {
        // Declarations are written by `write_namespaces`.
        if is_root && (attr.name.prefix.as_deref() == Some("xmlns") || attr.name.matches("xmlns")) {
            continue;
        }

        xml.write_attribute(&attr.name.to_string(), &attr.value);
    }

    // Indentation inside mixed content would change the text.
    let has_text = node.children().any(|n| n.is_text());
    if has_text {
        xml.set_preserve_whitespaces(true);
    }

    for child in node.children() {
        write_element(child, default_ns, false, xml);
    }

    xml.end_element();

    if has_text {
        xml.set_preserve_whitespaces(false);
    }
}

fn write_namespaces(doc: &Document, xml: &mut XmlWriter) {
    let namespaces = doc.namespaces();
    if !namespaces.iter().any(|ns| ns.prefix.is_none()) {
        xml.write_attribute("xmlns", SVG_NS);
    }

    for ns in namespaces {
        match ns.prefix {
            Some(ref prefix) => xml.write_attribute(&format!("xmlns:{}", prefix), &ns.uri),
            None => xml.write_attribute("xmlns", &ns.uri),
        }
    }

    // Imported nodes may use `xlink:href` without a declaration.
    let has_xlink_decl = namespaces
        .iter()
        .any(|ns| ns.prefix.as_deref() == Some("xlink"));
    if !has_xlink_decl && uses_prefix(doc, "xlink") {
        xml.write_attribute("xmlns:xlink", XLINK_NS);
    }
}

fn uses_prefix(doc: &Document, prefix: &str) -> bool {
    doc.root_element().descendants().any(|n| {
        n.attributes()
            .iter()
            .any(|a| a.name.prefix.as_deref() == Some(prefix))
    })
}
