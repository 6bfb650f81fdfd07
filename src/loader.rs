// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

use std::str::FromStr;
use std::sync::Arc;

use svgfetch::{ResourceKey, Resolver};
use svgtree::Document;

use crate::SymbolRegistry;

/// Loads fragments requested by a rendering engine into a [`SymbolRegistry`].
#[derive(Clone, Debug)]
pub struct ResourceLoader {
    resolver: Option<Resolver>,
    registry: Arc<SymbolRegistry>,
}

impl ResourceLoader {
    /// Creates a new loader with an empty registry.
    pub fn new(resolver: Resolver) -> Self {
        ResourceLoader {
            resolver: Some(resolver),
            registry: Arc::new(SymbolRegistry::new()),
        }
    }

    /// Creates a loader that never fetches anything.
    ///
    /// Only definitions inserted into the registry directly are available.
    pub fn offline() -> Self {
        ResourceLoader {
            resolver: None,
            registry: Arc::new(SymbolRegistry::new()),
        }
    }

    /// Replaces the registry, allowing several loaders to share one.
    pub fn with_registry(mut self, registry: Arc<SymbolRegistry>) -> Self {
        self.registry = registry;
        self
    }

    /// Returns the registry.
    pub fn registry(&self) -> &Arc<SymbolRegistry> {
        &self.registry
    }

    /// Starts loading a fragment in background.
    ///
    /// Must be called inside a Tokio runtime.
    pub fn request(&self, key: ResourceKey, symbol_id: impl Into<String>) {
        let symbol_id = symbol_id.into();
        if self.registry.contains(&symbol_id) {
            return;
        }

        let loader = self.clone();
        tokio::spawn(async move {
            loader.load(&key, &symbol_id).await;
        });
    }

    /// Loads a fragment and registers it as a `symbol` with the given id.
    ///
    /// Returns `true` when the symbol is available afterwards.
    pub async fn load(&self, key: &ResourceKey, symbol_id: &str) -> bool {
        if self.registry.contains(symbol_id) {
            return true;
        }

        let resolver = match self.resolver {
            Some(ref resolver) => resolver,
            None => {
                log::debug!("'{}' was not loaded in offline mode.", key);
                return false;
            }
        };

        let text = match resolver.resolve(key).await {
            Some(text) => text,
            None => return false,
        };

        match fragment_to_symbol(&text, symbol_id) {
            Ok(symbol) => {
                self.registry.insert(symbol_id, symbol);
                true
            }
            Err(e) => {
                log::warn!("Failed to parse '{}' cause {}.", key, e);
                false
            }
        }
    }
}

/// Converts a standalone SVG fragment into a `symbol` element.
///
/// The `viewBox` is kept. A fragment without one gets `0 0 width height`, when possible.
pub fn fragment_to_symbol(text: &str, symbol_id: &str) -> Result<Document, svgtree::Error> {
    let fragment = Document::parse_str(text)?;
    let svg = fragment.root_element();

    let mut symbol = Document::new("symbol");
    let root = symbol.root_element().id();
    symbol.set_attribute(root, "id", symbol_id);

    let view_box = match svg.attribute("viewBox") {
        Some(vb) => Some(vb.to_string()),
        None => match (length_attr(&fragment, "width"), length_attr(&fragment, "height")) {
            (Some(w), Some(h)) => Some(format!("0 0 {} {}", w, h)),
            _ => None,
        },
    };

    if let Some(ref vb) = view_box {
        symbol.set_attribute(root, "viewBox", vb);
    }

    if let Some(aspect) = svg.attribute("preserveAspectRatio") {
        symbol.set_attribute(root, "preserveAspectRatio", aspect);
    }

    for child in svg.children() {
        let node = symbol.import(&fragment, child.id());
        symbol.append(root, node);
    }

    Ok(symbol)
}

fn length_attr(doc: &Document, name: &str) -> Option<f64> {
    let value = doc.root_element().attribute(name)?;
    let length = svgtypes::Length::from_str(value).ok()?;
    if length.unit == svgtypes::LengthUnit::Percent || length.number <= 0.0 {
        return None;
    }

    Some(length.number)
}

#[cfg(test)]
mod tests {
    use super::*;
    use svgtree::{Indent, WriteOptions};

    fn compact(doc: &Document) -> String {
        doc.to_string(&WriteOptions {
            indent: Indent::None,
            ..WriteOptions::default()
        })
    }

    #[test]
    fn fragment_with_view_box() {
        let symbol = fragment_to_symbol(
            "<svg xmlns='http://www.w3.org/2000/svg' width='1em' height='1em' viewBox='0 0 24 24'>\
             <path fill='currentColor' d='M0 0h24v24H0z'/></svg>",
            "icon-1",
        )
        .unwrap();

        assert_eq!(
            compact(&symbol),
            "<symbol xmlns=\"http://www.w3.org/2000/svg\" id=\"icon-1\" viewBox=\"0 0 24 24\">\
             <path fill=\"currentColor\" d=\"M0 0h24v24H0z\"/></symbol>"
        );
    }

    #[test]
    fn fragment_without_view_box() {
        let symbol = fragment_to_symbol(
            "<svg xmlns='http://www.w3.org/2000/svg' width='48' height='32px'><rect/></svg>",
            "s",
        )
        .unwrap();
        assert_eq!(symbol.root_element().attribute("viewBox"), Some("0 0 48 32"));

        let symbol = fragment_to_symbol(
            "<svg xmlns='http://www.w3.org/2000/svg' width='100%' height='32'><rect/></svg>",
            "s",
        )
        .unwrap();
        assert_eq!(symbol.root_element().attribute("viewBox"), None);
    }

    #[test]
    fn malformed_fragment() {
        assert!(fragment_to_symbol("<svg", "s").is_err());
    }

    #[tokio::test]
    async fn offline_loader() {
        let loader = ResourceLoader::offline();
        assert!(!loader.load(&ResourceKey::new("icon", "a"), "a").await);

        loader.registry().insert("a", Document::new("symbol"));
        assert!(loader.load(&ResourceKey::new("icon", "a"), "a").await);
    }
}
