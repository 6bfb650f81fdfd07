// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

use std::collections::HashMap;

/// Base location of the `icon` scene.
pub const ICON_URL_PREFIX: &str = "https://api.iconify.design/";

/// Base location of the `illus` scene.
pub const ILLUS_URL_PREFIX: &str =
    "https://raw.githubusercontent.com/nicepkg/gpt-vis/refs/heads/master/src/assets/illus/";

/// A fragment identity.
///
/// `scene` is a category tag, like `icon` or `illus`,
/// and `identifier` is an opaque name inside that category.
#[derive(Clone, PartialEq, Eq, Hash, Debug)]
pub struct ResourceKey {
    /// A category tag.
    pub scene: String,
    /// An opaque identifier.
    pub identifier: String,
}

impl ResourceKey {
    /// Creates a new key.
    pub fn new(scene: impl Into<String>, identifier: impl Into<String>) -> Self {
        ResourceKey {
            scene: scene.into(),
            identifier: identifier.into(),
        }
    }
}

impl std::fmt::Display for ResourceKey {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "{}::{}", self.scene, self.identifier)
    }
}

/// A fixed mapping from a scene to its base location.
#[derive(Clone, Debug)]
pub struct SceneMap {
    bases: HashMap<String, String>,
}

impl SceneMap {
    /// Creates an empty map. Every scene is unrecognized.
    pub fn empty() -> Self {
        SceneMap {
            bases: HashMap::new(),
        }
    }

    /// Adds or replaces a scene base location.
    pub fn with_scene(mut self, scene: impl Into<String>, base: impl Into<String>) -> Self {
        self.bases.insert(scene.into(), base.into());
        self
    }

    /// Returns a fragment location or `None` for an unrecognized scene.
    pub fn url(&self, key: &ResourceKey) -> Option<String> {
        let base = self.bases.get(&key.scene)?;
        Some(format!("{}{}.svg", base, key.identifier))
    }
}

impl Default for SceneMap {
    fn default() -> Self {
        SceneMap::empty()
            .with_scene("icon", ICON_URL_PREFIX)
            .with_scene("illus", ILLUS_URL_PREFIX)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_scenes() {
        let scenes = SceneMap::default();
        assert_eq!(
            scenes.url(&ResourceKey::new("icon", "mingcute/code-fill")).as_deref(),
            Some("https://api.iconify.design/mingcute/code-fill.svg")
        );
        assert_eq!(
            scenes.url(&ResourceKey::new("illus", "creativity")),
            Some(format!("{}creativity.svg", ILLUS_URL_PREFIX))
        );
        assert_eq!(scenes.url(&ResourceKey::new("photo", "cat")), None);
    }

    #[test]
    fn overridden_scene() {
        let scenes = SceneMap::default().with_scene("icon", "http://localhost/icons/");
        assert_eq!(
            scenes.url(&ResourceKey::new("icon", "a")).as_deref(),
            Some("http://localhost/icons/a.svg")
        );
    }

    #[test]
    fn key_display() {
        assert_eq!(ResourceKey::new("icon", "a/b").to_string(), "icon::a/b");
    }
}
