// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tokio::sync::OnceCell;

use crate::ResourceKey;

/// A pending resolution shared by all requesters of the same key.
pub(crate) type Flight = OnceCell<Option<Arc<str>>>;

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<T> {
    // Entries are inserted and removed atomically, so a poisoned map is still consistent.
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// An append-only storage of successfully resolved fragments.
#[derive(Default, Debug)]
pub struct FragmentCache {
    entries: Mutex<HashMap<ResourceKey, Arc<str>>>,
}

impl FragmentCache {
    /// Returns a cached fragment.
    pub fn get(&self, key: &ResourceKey) -> Option<Arc<str>> {
        lock(&self.entries).get(key).cloned()
    }

    /// Stores a fragment, unless the key is already present.
    ///
    /// Entries are immutable once written.
    pub fn insert(&self, key: ResourceKey, text: Arc<str>) {
        lock(&self.entries).entry(key).or_insert(text);
    }

    /// Checks if a key is cached.
    pub fn contains(&self, key: &ResourceKey) -> bool {
        lock(&self.entries).contains_key(key)
    }

    /// Returns the number of cached fragments.
    pub fn len(&self) -> usize {
        lock(&self.entries).len()
    }

    /// Checks if the cache is empty.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Outstanding fetches, at most one per key.
#[derive(Default, Debug)]
pub struct InFlightTable {
    flights: Mutex<HashMap<ResourceKey, Arc<Flight>>>,
}

impl InFlightTable {
    /// Returns a pending resolution for a key, registering a new one when missing.
    ///
    /// The flag is `true` when the resolution was created by this call.
    pub(crate) fn join(&self, key: &ResourceKey) -> (Arc<Flight>, bool) {
        let mut flights = lock(&self.flights);
        if let Some(flight) = flights.get(key) {
            return (flight.clone(), false);
        }

        let flight = Arc::new(Flight::new());
        flights.insert(key.clone(), flight.clone());
        (flight, true)
    }

    /// Removes a completed resolution.
    ///
    /// A newer resolution registered under the same key is left untouched.
    pub(crate) fn finish(&self, key: &ResourceKey, flight: &Arc<Flight>) {
        let mut flights = lock(&self.flights);
        if flights.get(key).map_or(false, |f| Arc::ptr_eq(f, flight)) {
            flights.remove(key);
        }
    }

    /// Checks if a fetch for a key is outstanding.
    pub fn contains(&self, key: &ResourceKey) -> bool {
        lock(&self.flights).contains_key(key)
    }

    /// Returns the number of outstanding fetches.
    pub fn len(&self) -> usize {
        lock(&self.flights).len()
    }

    /// Checks if there are no outstanding fetches.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// A lifetime-scoped pair of a fragment cache and an in-flight table.
///
/// Clones share the same storage. Independent scopes never see each other entries.
#[derive(Clone, Default, Debug)]
pub struct CacheScope {
    cache: Arc<FragmentCache>,
    in_flight: Arc<InFlightTable>,
}

impl CacheScope {
    /// Creates a new, empty scope.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the fragment cache.
    pub fn cache(&self) -> &FragmentCache {
        &self.cache
    }

    /// Returns the in-flight table.
    pub fn in_flight(&self) -> &InFlightTable {
        &self.in_flight
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cache_entries_are_immutable() {
        let cache = FragmentCache::default();
        let key = ResourceKey::new("icon", "a");
        cache.insert(key.clone(), Arc::from("<svg/>"));
        cache.insert(key.clone(), Arc::from("<svg><g/></svg>"));
        assert_eq!(cache.get(&key).as_deref(), Some("<svg/>"));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn join_is_shared_per_key() {
        let table = InFlightTable::default();
        let key = ResourceKey::new("icon", "a");

        let (first, is_owner) = table.join(&key);
        assert!(is_owner);

        let (second, is_owner) = table.join(&key);
        assert!(!is_owner);
        assert!(Arc::ptr_eq(&first, &second));

        let (_, is_owner) = table.join(&ResourceKey::new("icon", "b"));
        assert!(is_owner);
        assert_eq!(table.len(), 2);
    }

    #[test]
    fn finish_ignores_stale_flights() {
        let table = InFlightTable::default();
        let key = ResourceKey::new("icon", "a");

        let (old, _) = table.join(&key);
        table.finish(&key, &old);
        assert!(!table.contains(&key));

        let (new, _) = table.join(&key);
        table.finish(&key, &old);
        assert!(table.contains(&key));

        table.finish(&key, &new);
        assert!(table.is_empty());
    }

    #[test]
    fn scope_clones_share_storage() {
        let scope = CacheScope::new();
        let clone = scope.clone();
        let key = ResourceKey::new("icon", "a");
        clone.cache().insert(key.clone(), Arc::from("<svg/>"));
        assert!(scope.cache().contains(&key));
        assert!(CacheScope::new().cache().is_empty());
    }
}
