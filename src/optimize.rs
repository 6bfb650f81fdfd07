// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

use svgtree::{Document, Indent, WriteOptions};

use crate::Error;

/// An output size optimizer.
pub trait Optimizer: Send + Sync {
    /// Returns an optimized copy of a serialized SVG.
    fn optimize(&self, svg: &str) -> Result<String, Error>;
}

/// A whitespace-stripping optimizer.
///
/// Comments and blank text nodes are dropped and indentation is removed.
/// The result is never longer than the input.
#[derive(Clone, Copy, Default, Debug)]
pub struct Minifier;

impl Optimizer for Minifier {
    fn optimize(&self, svg: &str) -> Result<String, Error> {
        let doc = Document::parse_str(svg).map_err(|e| Error::Optimize(e.to_string()))?;
        let minified = doc.to_string(&WriteOptions {
            use_single_quote: false,
            indent: Indent::None,
            attributes_indent: Indent::None,
        });

        if minified.len() < svg.len() {
            Ok(minified)
        } else {
            Ok(svg.to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_indentation() {
        let svg = "<svg xmlns=\"http://www.w3.org/2000/svg\">\n    <!-- c -->\n    <rect width=\"1\"/>\n</svg>\n";
        assert_eq!(
            Minifier.optimize(svg).unwrap(),
            "<svg xmlns=\"http://www.w3.org/2000/svg\"><rect width=\"1\"/></svg>"
        );
    }

    #[test]
    fn never_grows() {
        let svg = "<svg xmlns='http://www.w3.org/2000/svg'/>";
        assert_eq!(Minifier.optimize(svg).unwrap(), svg);
    }

    #[test]
    fn invalid_input() {
        match Minifier.optimize("<svg") {
            Err(Error::Optimize(msg)) => assert!(msg.starts_with("SVG data parsing failed")),
            _ => panic!("expected an optimization error"),
        }
    }
}
