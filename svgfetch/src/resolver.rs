// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

use std::sync::Arc;

use crate::{CacheScope, Fetcher, ResourceKey, SceneMap};

/// Checks that a text looks like an SVG document.
///
/// Leading whitespace is ignored.
pub fn is_svg_markup(text: &str) -> bool {
    text.trim_start().starts_with("<svg")
}

/// Resolves fragment keys into SVG markup.
///
/// Never fails: any failure collapses into `None` and is not cached,
/// so the next call will try again.
#[derive(Clone)]
pub struct Resolver {
    fetcher: Arc<dyn Fetcher>,
    scenes: SceneMap,
    scope: CacheScope,
}

impl std::fmt::Debug for Resolver {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        f.debug_struct("Resolver")
            .field("scenes", &self.scenes)
            .field("scope", &self.scope)
            .finish_non_exhaustive()
    }
}

impl Resolver {
    /// Creates a new resolver with the default scenes.
    pub fn new(fetcher: Arc<dyn Fetcher>, scope: CacheScope) -> Self {
        Resolver {
            fetcher,
            scenes: SceneMap::default(),
            scope,
        }
    }

    /// Replaces the scene map.
    pub fn with_scenes(mut self, scenes: SceneMap) -> Self {
        self.scenes = scenes;
        self
    }

    /// Returns the cache scope.
    pub fn scope(&self) -> &CacheScope {
        &self.scope
    }

    /// Returns an already resolved fragment without fetching.
    pub fn cached(&self, key: &ResourceKey) -> Option<Arc<str>> {
        self.scope.cache().get(key)
    }

    /// Resolves a key.
    ///
    /// Concurrent calls with the same key share a single fetch.
    pub async fn resolve(&self, key: &ResourceKey) -> Option<Arc<str>> {
        if let Some(text) = self.cached(key) {
            log::debug!("'{}' is cached.", key);
            return Some(text);
        }

        let url = match self.scenes.url(key) {
            Some(url) => url,
            None => {
                log::warn!("'{}' has an unknown scene. Skipped.", key);
                return None;
            }
        };

        let (flight, is_owner) = self.scope.in_flight().join(key);
        if !is_owner {
            log::debug!("Waiting for '{}' already in flight.", key);
        }

        let text = flight
            .get_or_init(|| async {
                // A previous flight could have finished between the cache check and the join.
                if let Some(text) = self.cached(key) {
                    return Some(text);
                }

                self.fetch(key, &url).await
            })
            .await
            .clone();

        self.scope.in_flight().finish(key, &flight);
        text
    }

    async fn fetch(&self, key: &ResourceKey, url: &str) -> Option<Arc<str>> {
        let text = match self.fetcher.fetch(url).await {
            Ok(text) => text,
            Err(e) => {
                log::warn!("Failed to fetch '{}' cause {}.", key, e);
                return None;
            }
        };

        if !is_svg_markup(&text) {
            log::warn!("'{}' is not an SVG. Skipped.", url);
            return None;
        }

        let text: Arc<str> = Arc::from(text);
        self.scope.cache().insert(key.clone(), text.clone());
        Some(text)
    }
}
