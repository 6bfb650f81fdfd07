// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

use std::collections::HashSet;
use std::sync::Arc;

use svgtree::{Document, NodeId};
use tokio::sync::watch;
use tokio::time::Instant;

use crate::Options;

/// A provider of definitions referenced by a document.
pub trait DefinitionSource: Send + Sync {
    /// Returns a definition by `id`.
    ///
    /// The definition is the root element of the returned document.
    fn lookup(&self, id: &str) -> Option<Arc<Document>>;

    /// Returns a channel that changes each time a definition is added.
    ///
    /// Sources without one are polled.
    fn subscribe(&self) -> Option<watch::Receiver<u64>> {
        None
    }
}

/// Returns distinct local ids referenced via `href` or `xlink:href`, in document order.
///
/// External references are ignored.
pub fn referenced_ids(doc: &Document) -> Vec<String> {
    let mut ids: Vec<String> = Vec::new();
    for node in doc.root_element().descendants() {
        let id = match node.href().and_then(|href| href.strip_prefix('#')) {
            Some(id) if !id.is_empty() => id,
            _ => continue,
        };

        if !ids.iter().any(|v| v == id) {
            ids.push(id.to_string());
        }
    }

    ids
}

/// Returns referenced ids without a local definition.
fn missing_ids(doc: &Document) -> Vec<String> {
    referenced_ids(doc)
        .into_iter()
        .filter(|id| doc.element_by_id(id).is_none())
        .collect()
}

/// Copies definitions of all unresolved references into the document's `defs`.
///
/// Definitions that reference other definitions are resolved as well.
/// Ids that are already defined in the document are never copied again,
/// so the operation is idempotent.
///
/// Returns the number of embedded definitions.
pub fn embed_definitions(doc: &mut Document, source: &dyn DefinitionSource) -> usize {
    let mut embedded = 0;
    let mut unavailable = HashSet::new();
    loop {
        let mut found = Vec::new();
        for id in missing_ids(doc) {
            match source.lookup(&id) {
                Some(def) => found.push((id, def)),
                None => {
                    if unavailable.insert(id.clone()) {
                        log::debug!("Definition '{}' is not available.", id);
                    }
                }
            }
        }

        if found.is_empty() {
            break;
        }

        let defs = definitions_container(doc);
        for (id, def) in found {
            let node = doc.import(&def, def.root_element().id());
            // The copy must be findable by the id it was requested with.
            doc.set_attribute(node, "id", &id);
            doc.append(defs, node);
            embedded += 1;
        }
    }

    if embedded != 0 {
        log::debug!("{} definition(s) embedded.", embedded);
    }

    embedded
}

/// Returns the first `defs` child of the root element, making it the first child.
///
/// A new one is created when missing. Nested `defs` are left where they are.
fn definitions_container(doc: &mut Document) -> NodeId {
    let svg = doc.root_element();
    let svg_id = svg.id();

    let existing = svg.children().find(|n| n.has_tag_name("defs")).map(|n| n.id());
    let defs = match existing {
        Some(id) => id,
        None => doc.create_element("defs"),
    };

    if doc.get(svg_id).first_child().map(|n| n.id()) != Some(defs) {
        doc.prepend(svg_id, defs);
    }

    defs
}

/// Waits until every missing definition is available and embeds them.
///
/// Waits no longer than [`Options::max_wait`]. After that, whatever is available
/// is embedded and the rest is left dangling. Documents without local references
/// are not waited for at all.
///
/// Returns the number of embedded definitions.
pub async fn wait_and_embed(
    doc: &mut Document,
    source: &dyn DefinitionSource,
    options: &Options,
) -> usize {
    let required = missing_ids(doc);
    if required.is_empty() {
        return 0;
    }

    let deadline = Instant::now() + options.max_wait;
    let mut changes = source.subscribe();
    loop {
        if required.iter().all(|id| source.lookup(id).is_some()) {
            break;
        }

        let now = Instant::now();
        if now >= deadline {
            log::debug!(
                "Stopped waiting for definitions after {}ms.",
                options.max_wait.as_millis()
            );
            break;
        }

        let closed = match changes {
            Some(ref mut rx) => {
                let res = tokio::time::timeout_at(deadline, rx.changed()).await;
                matches!(res, Ok(Err(_)))
            }
            None => {
                let delay = options.poll_interval.min(deadline - now);
                tokio::time::sleep(delay).await;
                false
            }
        };

        if closed {
            // Nothing will be published anymore, but lookups may still change.
            changes = None;
        }
    }

    embed_definitions(doc, source)
}
