// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

use std::str::FromStr;
use std::sync::LazyLock;

use regex::Regex;

use svgtree::Node;

use crate::geom::{BBox, Offset};

/// Element kinds that contribute to the drawing bounding box.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum ShapeKind {
    /// `rect`
    Rect,
    /// `foreignObject` and `image`
    EmbeddedBox,
    /// `use`
    UseSite,
    /// `ellipse`
    Ellipse,
    /// `circle`
    Circle,
    /// `line`
    Line,
    /// `path`, approximated by its numbers.
    Path,
    /// Any other element. Contributes nothing by itself.
    Container,
}

impl ShapeKind {
    /// Classifies an element by its local tag name, ignoring ASCII case.
    pub fn from_node(node: Node) -> Self {
        let name = match node.tag_name() {
            Some(name) => name,
            None => return ShapeKind::Container,
        };

        match name.to_ascii_lowercase().as_str() {
            "rect" => ShapeKind::Rect,
            "foreignobject" | "image" => ShapeKind::EmbeddedBox,
            "use" => ShapeKind::UseSite,
            "ellipse" => ShapeKind::Ellipse,
            "circle" => ShapeKind::Circle,
            "line" => ShapeKind::Line,
            "path" => ShapeKind::Path,
            _ => ShapeKind::Container,
        }
    }

    /// Adds the element's own geometry, shifted by `offset`, to `bbox`.
    ///
    /// Children are not visited.
    pub fn contribute(self, node: Node, offset: Offset, bbox: &mut BBox) {
        match self {
            ShapeKind::Rect | ShapeKind::EmbeddedBox | ShapeKind::UseSite => {
                let width = number_attr(node, "width");
                let height = number_attr(node, "height");
                if width > 0.0 && height > 0.0 {
                    let (x, y) = offset.apply(number_attr(node, "x"), number_attr(node, "y"));
                    bbox.add_point(x, y);
                    bbox.add_point(x + width, y + height);
                }
            }
            ShapeKind::Ellipse => {
                let (cx, cy) = offset.apply(number_attr(node, "cx"), number_attr(node, "cy"));
                let rx = number_attr(node, "rx");
                let ry = number_attr(node, "ry");
                bbox.add_point(cx - rx, cy - ry);
                bbox.add_point(cx + rx, cy + ry);
            }
            ShapeKind::Circle => {
                let (cx, cy) = offset.apply(number_attr(node, "cx"), number_attr(node, "cy"));
                let r = number_attr(node, "r");
                bbox.add_point(cx - r, cy - r);
                bbox.add_point(cx + r, cy + r);
            }
            ShapeKind::Line => {
                let (x1, y1) = offset.apply(number_attr(node, "x1"), number_attr(node, "y1"));
                let (x2, y2) = offset.apply(number_attr(node, "x2"), number_attr(node, "y2"));
                bbox.add_point(x1, y1);
                bbox.add_point(x2, y2);
            }
            ShapeKind::Path => {
                if let Some(d) = node.attribute("d") {
                    let numbers: Vec<f64> = path_numbers(d).collect();
                    // An odd trailing number has no pair and is ignored.
                    for pair in numbers.chunks_exact(2) {
                        let (x, y) = offset.apply(pair[0], pair[1]);
                        bbox.add_point(x, y);
                    }
                }
            }
            ShapeKind::Container => {}
        }
    }
}

/// Parses a numeric attribute. Missing and malformed values are zero.
pub(crate) fn number_attr(node: Node, name: &str) -> f64 {
    node.attribute(name)
        .and_then(|v| svgtypes::Length::from_str(v).ok())
        .map(|len| len.number)
        .filter(|n| n.is_finite())
        .unwrap_or(0.0)
}

static PATH_NUMBER_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"[-+]?[0-9]*\.?[0-9]+").expect("BUG: invalid PATH_NUMBER_RE regex literal")
});

/// Returns plain numbers of a path data string.
///
/// Commands and separators are skipped. An exponent is not a part of a number,
/// so `1e5` yields `1` and `5`. This is a coarse approximation: arcs flags,
/// relative coordinates and control points are treated as regular coordinates.
pub(crate) fn path_numbers(text: &str) -> impl Iterator<Item = f64> + '_ {
    PATH_NUMBER_RE
        .find_iter(text)
        .filter_map(|m| m.as_str().parse::<f64>().ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn numbers(d: &str) -> Vec<f64> {
        path_numbers(d).collect()
    }

    #[test]
    fn path_data_numbers() {
        assert_eq!(numbers("M10 20L30,40"), [10.0, 20.0, 30.0, 40.0]);
        assert_eq!(numbers("m-5-5h.5"), [-5.0, -5.0, 0.5]);
        assert_eq!(numbers("M1.5.5"), [1.5, 0.5]);
        assert_eq!(numbers("M+1 -.25"), [1.0, -0.25]);
        assert_eq!(numbers("M1e5"), [1.0, 5.0]);
        assert_eq!(numbers("M1. 2"), [1.0, 2.0]);
        assert_eq!(numbers("Z"), Vec::<f64>::new());
        assert_eq!(numbers("M+-3"), [-3.0]);
        assert_eq!(numbers("M\u{0661} 2"), [2.0]);
    }

    #[test]
    fn classification() {
        let doc = svgtree::Document::parse_str(
            "<svg xmlns='http://www.w3.org/2000/svg'>
                <rect/><foreignObject/><image/><use/><ellipse/>
                <circle/><line/><path/><g/><text>A</text>
            </svg>",
        )
        .unwrap();

        let kinds: Vec<_> = doc
            .root_element()
            .children()
            .map(ShapeKind::from_node)
            .collect();

        assert_eq!(
            kinds,
            [
                ShapeKind::Rect,
                ShapeKind::EmbeddedBox,
                ShapeKind::EmbeddedBox,
                ShapeKind::UseSite,
                ShapeKind::Ellipse,
                ShapeKind::Circle,
                ShapeKind::Line,
                ShapeKind::Path,
                ShapeKind::Container,
                ShapeKind::Container,
            ]
        );
    }

    #[test]
    fn number_attributes() {
        let doc = svgtree::Document::parse_str(
            "<svg xmlns='http://www.w3.org/2000/svg' x='10px' y='abc' width='-2.5e1' height='50%'/>",
        )
        .unwrap();

        let svg = doc.root_element();
        assert_eq!(number_attr(svg, "x"), 10.0);
        assert_eq!(number_attr(svg, "y"), 0.0);
        assert_eq!(number_attr(svg, "width"), -25.0);
        assert_eq!(number_attr(svg, "height"), 50.0);
        assert_eq!(number_attr(svg, "cx"), 0.0);
    }

    #[test]
    fn degenerate_boxes_are_skipped() {
        let doc = svgtree::Document::parse_str(
            "<svg xmlns='http://www.w3.org/2000/svg'>
                <rect width='0' height='10'/>
                <use x='5' y='5' width='10'/>
            </svg>",
        )
        .unwrap();

        let mut bbox = BBox::default();
        for node in doc.root_element().children() {
            ShapeKind::from_node(node).contribute(node, Offset::default(), &mut bbox);
        }
        assert!(!bbox.is_valid());
    }
}
