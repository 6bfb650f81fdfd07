// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! 2D geometric primitives.

use std::fmt;

/// An accumulated translation.
#[derive(Clone, Copy, PartialEq, Default, Debug)]
pub struct Offset {
    /// Horizontal offset.
    pub tx: f64,
    /// Vertical offset.
    pub ty: f64,
}

impl Offset {
    /// Creates a new offset.
    #[inline]
    pub fn new(tx: f64, ty: f64) -> Self {
        Offset { tx, ty }
    }

    /// Returns a sum of two offsets.
    #[inline]
    #[must_use]
    pub fn then(&self, tx: f64, ty: f64) -> Self {
        Offset::new(self.tx + tx, self.ty + ty)
    }

    /// Applies the offset to a point.
    #[inline]
    pub fn apply(&self, x: f64, y: f64) -> (f64, f64) {
        (x + self.tx, y + self.ty)
    }
}

/// A bounding box accumulator.
///
/// Starts empty, i.e. invalid, and becomes valid after the first point.
#[derive(Clone, Copy, PartialEq, Debug)]
pub struct BBox {
    /// Left edge.
    pub min_x: f64,
    /// Top edge.
    pub min_y: f64,
    /// Right edge.
    pub max_x: f64,
    /// Bottom edge.
    pub max_y: f64,
}

impl Default for BBox {
    fn default() -> Self {
        Self {
            min_x: f64::INFINITY,
            min_y: f64::INFINITY,
            max_x: f64::NEG_INFINITY,
            max_y: f64::NEG_INFINITY,
        }
    }
}

impl BBox {
    /// Checks that at least one point was added.
    pub fn is_valid(&self) -> bool {
        self.min_x.is_finite()
            && self.min_y.is_finite()
            && self.max_x.is_finite()
            && self.max_y.is_finite()
    }

    /// Expands the bounding box to include a point.
    ///
    /// Non-finite coordinates are ignored.
    pub fn add_point(&mut self, x: f64, y: f64) {
        if !(x.is_finite() && y.is_finite()) {
            return;
        }

        self.min_x = self.min_x.min(x);
        self.min_y = self.min_y.min(y);
        self.max_x = self.max_x.max(x);
        self.max_y = self.max_y.max(y);
    }

    /// Returns the width. Zero for an invalid box.
    pub fn width(&self) -> f64 {
        if self.is_valid() {
            self.max_x - self.min_x
        } else {
            0.0
        }
    }

    /// Returns the height. Zero for an invalid box.
    pub fn height(&self) -> f64 {
        if self.is_valid() {
            self.max_y - self.min_y
        } else {
            0.0
        }
    }

    /// Converts the box into a view box, expanded by `padding` on each side.
    pub fn to_view_box(&self, padding: f64) -> Option<ViewBox> {
        if !self.is_valid() {
            return None;
        }

        Some(ViewBox {
            x: self.min_x - padding,
            y: self.min_y - padding,
            width: self.width() + padding * 2.0,
            height: self.height() + padding * 2.0,
        })
    }
}

/// A `viewBox` attribute value.
#[derive(Clone, Copy, PartialEq, Debug)]
pub struct ViewBox {
    /// Left edge.
    pub x: f64,
    /// Top edge.
    pub y: f64,
    /// Width.
    pub width: f64,
    /// Height.
    pub height: f64,
}

impl ViewBox {
    /// Parses a `viewBox` attribute value.
    ///
    /// Returns `None` unless the value contains exactly four numbers.
    pub fn parse(text: &str) -> Option<Self> {
        let mut numbers = Vec::with_capacity(4);
        for n in svgtypes::NumberListParser::from(text) {
            numbers.push(n.ok()?);
        }

        match numbers.as_slice() {
            &[x, y, width, height] => Some(ViewBox {
                x,
                y,
                width,
                height,
            }),
            _ => None,
        }
    }
}

impl fmt::Display for ViewBox {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "{} {} {} {}",
            Num(self.x),
            Num(self.y),
            Num(self.width),
            Num(self.height)
        )
    }
}

/// Shortest round-trip number formatting, without a negative zero.
struct Num(f64);

impl fmt::Display for Num {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        if self.0 == 0.0 {
            f.write_str("0")
        } else {
            write!(f, "{}", self.0)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_bbox_is_invalid() {
        let bbox = BBox::default();
        assert!(!bbox.is_valid());
        assert_eq!(bbox.to_view_box(20.0), None);
        assert_eq!(bbox.width(), 0.0);
    }

    #[test]
    fn single_point_is_valid() {
        let mut bbox = BBox::default();
        bbox.add_point(5.0, -3.0);
        assert!(bbox.is_valid());
        assert_eq!(
            bbox.to_view_box(1.0),
            Some(ViewBox {
                x: 4.0,
                y: -4.0,
                width: 2.0,
                height: 2.0
            })
        );
    }

    #[test]
    fn non_finite_points_are_ignored() {
        let mut bbox = BBox::default();
        bbox.add_point(f64::NAN, 1.0);
        bbox.add_point(1.0, f64::INFINITY);
        assert!(!bbox.is_valid());
    }

    #[test]
    fn offsets_accumulate() {
        let offset = Offset::default().then(5.0, 5.0).then(-1.0, 2.5);
        assert_eq!(offset.apply(10.0, 10.0), (14.0, 17.5));
    }

    #[test]
    fn view_box_parsing() {
        assert_eq!(
            ViewBox::parse("-20 -20 140 140"),
            Some(ViewBox {
                x: -20.0,
                y: -20.0,
                width: 140.0,
                height: 140.0
            })
        );
        assert_eq!(ViewBox::parse("0,0,10,10").map(|v| v.width), Some(10.0));
        assert_eq!(ViewBox::parse("0 0 10"), None);
        assert_eq!(ViewBox::parse("0 0 10 10 10"), None);
        assert_eq!(ViewBox::parse("a b c d"), None);
        assert_eq!(ViewBox::parse(""), None);
    }

    #[test]
    fn view_box_formatting() {
        let vb = ViewBox {
            x: -0.0,
            y: -10.5,
            width: 0.1 + 0.2,
            height: 140.0,
        };
        assert_eq!(vb.to_string(), "0 -10.5 0.30000000000000004 140");
    }
}
