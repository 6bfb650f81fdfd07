// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use svgtree::Document;
use tokio::sync::watch;

use crate::embed::DefinitionSource;

/// A shared storage of loaded definitions, keyed by id.
///
/// Entries are never replaced. Every insertion bumps a generation counter
/// that waiting embedders can subscribe to.
#[derive(Debug)]
pub struct SymbolRegistry {
    symbols: Mutex<HashMap<String, Arc<Document>>>,
    generation: watch::Sender<u64>,
}

impl SymbolRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        let (generation, _) = watch::channel(0);
        SymbolRegistry {
            symbols: Mutex::new(HashMap::new()),
            generation,
        }
    }

    fn symbols(&self) -> MutexGuard<HashMap<String, Arc<Document>>> {
        self.symbols.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Adds a definition, unless the id is already taken.
    ///
    /// Returns `true` when the definition was added.
    pub fn insert(&self, id: impl Into<String>, symbol: Document) -> bool {
        let id = id.into();
        {
            let mut symbols = self.symbols();
            if symbols.contains_key(&id) {
                return false;
            }

            symbols.insert(id, Arc::new(symbol));
        }

        self.generation.send_modify(|n| *n += 1);
        true
    }

    /// Returns a definition.
    pub fn get(&self, id: &str) -> Option<Arc<Document>> {
        self.symbols().get(id).cloned()
    }

    /// Checks that a definition is present.
    pub fn contains(&self, id: &str) -> bool {
        self.symbols().contains_key(id)
    }

    /// Returns the number of definitions.
    pub fn len(&self) -> usize {
        self.symbols().len()
    }

    /// Checks that the registry is empty.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for SymbolRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl DefinitionSource for SymbolRegistry {
    fn lookup(&self, id: &str) -> Option<Arc<Document>> {
        self.get(id)
    }

    fn subscribe(&self) -> Option<watch::Receiver<u64>> {
        Some(self.generation.subscribe())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_insert_wins() {
        let registry = SymbolRegistry::new();
        assert!(registry.insert("a", Document::new("symbol")));
        assert!(!registry.insert("a", Document::new("g")));
        assert_eq!(registry.len(), 1);
        assert_eq!(
            registry.get("a").map(|d| d.root_element().tag_name() == Some("symbol")),
            Some(true)
        );
    }

    #[test]
    fn inserts_are_published() {
        let registry = SymbolRegistry::new();
        let rx = registry.subscribe().unwrap();
        assert!(!rx.has_changed().unwrap());

        registry.insert("a", Document::new("symbol"));
        assert!(rx.has_changed().unwrap());
        assert_eq!(*rx.borrow(), 1);

        registry.insert("a", Document::new("symbol"));
        assert_eq!(*rx.borrow(), 1);
    }
}
