// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

use svgtree::{Document, Node, NodeId};
use svgtypes::TransformListToken;

use crate::geom::{BBox, Offset, ViewBox};
use crate::shapes::ShapeKind;

/// `data-element-type` values of editor-only elements.
const TRANSIENT_TYPES: &[&str] = &["transient-container", "btns-group"];

/// Group attributes left by the layout engine.
const GROUP_GEOMETRY_ATTRIBUTES: &[&str] = &["x", "y", "width", "height"];

/// Removes editor-only elements and stray group geometry.
///
/// Returns the number of removed elements.
pub fn cleanup(doc: &mut Document) -> usize {
    let groups: Vec<NodeId> = doc
        .root_element()
        .descendants()
        .filter(|n| n.has_tag_name("g"))
        .map(|n| n.id())
        .collect();

    for id in groups {
        for name in GROUP_GEOMETRY_ATTRIBUTES {
            doc.remove_attribute(id, name);
        }
    }

    let transient: Vec<NodeId> = doc
        .root_element()
        .descendants()
        .filter(is_transient)
        .map(|n| n.id())
        .collect();

    // Nested transient elements are removed together with their ancestor,
    // so count only the outermost ones.
    let mut removed = 0;
    for id in transient {
        let is_nested = doc
            .get(id)
            .ancestors()
            .skip(1)
            .any(|n| is_transient(&n));
        doc.remove(id);
        if !is_nested {
            removed += 1;
        }
    }

    if removed != 0 {
        log::debug!("{} transient element(s) removed.", removed);
    }

    removed
}

fn is_transient(node: &Node) -> bool {
    node.attribute("data-element-type")
        .map(|v| TRANSIENT_TYPES.contains(&v))
        .unwrap_or(false)
}

/// Calculates a bounding box of the root element's content.
///
/// `defs` subtrees are skipped. Only translations are taken into account.
pub fn calculate_bbox(doc: &Document) -> BBox {
    let mut bbox = BBox::default();
    for child in doc.root_element().children() {
        calc_node_bbox(child, Offset::default(), &mut bbox);
    }

    bbox
}

fn calc_node_bbox(node: Node, offset: Offset, bbox: &mut BBox) {
    if !node.is_element() || node.has_tag_name("defs") {
        return;
    }

    let offset = match node.attribute("transform") {
        Some(value) => apply_translations(value, offset),
        None => offset,
    };

    ShapeKind::from_node(node).contribute(node, offset, bbox);

    for child in node.children() {
        calc_node_bbox(child, offset, bbox);
    }
}

/// Adds translation parts of a transform list to an offset.
///
/// `translate` and the translation of `matrix` are summed, everything else is ignored.
/// Parsing stops at the first malformed transform.
fn apply_translations(value: &str, mut offset: Offset) -> Offset {
    for token in svgtypes::TransformListParser::from(value) {
        match token {
            Ok(TransformListToken::Translate { tx, ty }) => offset = offset.then(tx, ty),
            Ok(TransformListToken::Matrix { e, f, .. }) => offset = offset.then(e, f),
            Ok(_) => {}
            Err(e) => {
                log::warn!("Failed to parse a transform '{}' cause {}.", value, e);
                break;
            }
        }
    }

    offset
}

/// Rewrites the root `viewBox` to fit the content.
///
/// The padding of an existing `viewBox` is preserved. Otherwise, `default_padding` is used.
/// When there is nothing to measure, the document stays untouched and `None` is returned.
pub fn recalculate_view_box(doc: &mut Document, default_padding: f64) -> Option<ViewBox> {
    let bbox = calculate_bbox(doc);
    if !bbox.is_valid() {
        log::debug!("Nothing to measure. The viewBox is left as is.");
        return None;
    }

    let svg = doc.root_element();
    let padding = svg
        .attribute("viewBox")
        .and_then(ViewBox::parse)
        .map(|vb| vb.x.abs())
        .unwrap_or(default_padding);

    let view_box = bbox.to_view_box(padding)?;
    let svg_id = svg.id();
    doc.set_attribute(svg_id, "viewBox", &view_box.to_string());
    log::debug!("viewBox set to '{}'.", view_box);

    Some(view_box)
}

/// Runs [`cleanup`] followed by [`recalculate_view_box`].
pub fn finalize_geometry(doc: &mut Document, default_padding: f64) -> Option<ViewBox> {
    cleanup(doc);
    recalculate_view_box(doc, default_padding)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(text: &str) -> Document {
        Document::parse_str(text).unwrap()
    }

    #[test]
    fn cleanup_group_attributes() {
        let mut doc = parse(
            "<svg xmlns='http://www.w3.org/2000/svg'>
                <g x='1' y='2' width='3' height='4' fill='red'><rect x='1' width='2'/></g>
            </svg>",
        );

        assert_eq!(cleanup(&mut doc), 0);

        let g = doc.root_element().first_element_child().unwrap();
        assert_eq!(g.attributes().len(), 1);
        assert_eq!(g.attribute("fill"), Some("red"));

        let rect = g.first_element_child().unwrap();
        assert_eq!(rect.attribute("x"), Some("1"));
    }

    #[test]
    fn cleanup_transient_elements() {
        let mut doc = parse(
            "<svg xmlns='http://www.w3.org/2000/svg'>
                <g data-element-type='transient-container'>
                    <g data-element-type='btns-group'/>
                </g>
                <g data-element-type='btns-group'/>
                <g data-element-type='shape' id='kept'/>
            </svg>",
        );

        assert_eq!(cleanup(&mut doc), 2);
        assert_eq!(doc.root_element().children().count(), 1);
        assert!(doc.element_by_id("kept").is_some());
    }

    #[test]
    fn translations_accumulate() {
        assert_eq!(
            apply_translations("translate(5, 5) translate(1)", Offset::default()),
            Offset::new(6.0, 5.0)
        );
        assert_eq!(
            apply_translations("matrix(2 0 0 2 10 20) rotate(45) scale(3)", Offset::new(1.0, 1.0)),
            Offset::new(11.0, 21.0)
        );
        assert_eq!(
            apply_translations("translate(3 4) oops translate(5 5)", Offset::default()),
            Offset::new(3.0, 4.0)
        );
    }

    #[test]
    fn nested_translations() {
        let doc = parse(
            "<svg xmlns='http://www.w3.org/2000/svg'>
                <g transform='translate(10 0)'>
                    <g transform='translate(0 10)'>
                        <circle cx='0' cy='0' r='5'/>
                    </g>
                </g>
            </svg>",
        );

        let bbox = calculate_bbox(&doc);
        assert_eq!((bbox.min_x, bbox.min_y, bbox.max_x, bbox.max_y), (5.0, 5.0, 15.0, 15.0));
    }

    #[test]
    fn defs_are_skipped_everywhere() {
        let doc = parse(
            "<svg xmlns='http://www.w3.org/2000/svg'>
                <defs><rect width='1000' height='1000'/></defs>
                <g><defs><circle r='500'/></defs><line x1='0' y1='0' x2='10' y2='20'/></g>
            </svg>",
        );

        let bbox = calculate_bbox(&doc);
        assert_eq!((bbox.min_x, bbox.min_y, bbox.max_x, bbox.max_y), (0.0, 0.0, 10.0, 20.0));
    }

    #[test]
    fn shapes_recurse_into_children() {
        let doc = parse(
            "<svg xmlns='http://www.w3.org/2000/svg'>
                <foreignObject x='0' y='0' width='10' height='10'>
                    <rect x='50' y='50' width='10' height='10'/>
                </foreignObject>
            </svg>",
        );

        let bbox = calculate_bbox(&doc);
        assert_eq!((bbox.max_x, bbox.max_y), (60.0, 60.0));
    }

    #[test]
    fn path_and_ellipse() {
        let doc = parse(
            "<svg xmlns='http://www.w3.org/2000/svg'>
                <path d='M 10 10 L 30 -5 L 50'/>
                <ellipse cx='0' cy='0' rx='4' ry='2'/>
                <path d='M 7'/>
            </svg>",
        );

        let bbox = calculate_bbox(&doc);
        assert_eq!((bbox.min_x, bbox.min_y, bbox.max_x, bbox.max_y), (-4.0, -5.0, 30.0, 10.0));
    }

    #[test]
    fn default_padding_without_view_box() {
        let mut doc = parse(
            "<svg xmlns='http://www.w3.org/2000/svg'><rect width='10' height='10'/></svg>",
        );

        let vb = recalculate_view_box(&mut doc, 20.0).unwrap();
        assert_eq!(vb.to_string(), "-20 -20 50 50");
        assert_eq!(doc.root_element().attribute("viewBox"), Some("-20 -20 50 50"));
    }

    #[test]
    fn malformed_view_box_uses_default_padding() {
        let mut doc = parse(
            "<svg xmlns='http://www.w3.org/2000/svg' viewBox='-5 0 100'>
                <rect width='10' height='10'/>
            </svg>",
        );

        assert_eq!(recalculate_view_box(&mut doc, 8.0).unwrap().to_string(), "-8 -8 26 26");
    }

    #[test]
    fn finalize_removes_transient_geometry() {
        let mut doc = parse(
            "<svg xmlns='http://www.w3.org/2000/svg' viewBox='0 0 10 10'>
                <rect width='10' height='10'/>
                <g data-element-type='btns-group'><rect x='500' width='10' height='10'/></g>
            </svg>",
        );

        let vb = finalize_geometry(&mut doc, 20.0).unwrap();
        assert_eq!(vb.to_string(), "0 0 10 10");
    }
}
