// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

use async_trait::async_trait;
use svgfetch::ResourceKey;
use svgtree::Document;

use crate::embed::{self, DefinitionSource};
use crate::optimize::{Minifier, Optimizer};
use crate::{viewbox, Error, Options, ResourceLoader, ViewBox};

/// A scene renderer.
///
/// Fragments are requested via the loader while rendering
/// and embedded into the result afterwards.
#[async_trait]
pub trait RenderEngine: Send + Sync {
    /// Renders a scene into an SVG document.
    async fn render(&self, loader: &ResourceLoader) -> Result<Document, Error>;
}

/// An already rendered scene.
///
/// Elements with `data-scene` and `data-resource` attributes and a local reference
/// request the `scene`/`resource` fragment as the referenced id.
///
/// ```text
/// <use href="#icon-0" data-scene="icon" data-resource="mingcute/code-fill"/>
/// ```
#[derive(Clone, Debug)]
pub struct PrerenderedScene {
    text: String,
}

impl PrerenderedScene {
    /// Creates a scene from SVG text.
    pub fn new(text: impl Into<String>) -> Self {
        PrerenderedScene { text: text.into() }
    }

    /// Creates a scene from raw bytes.
    pub fn from_data(data: &[u8]) -> Result<Self, Error> {
        let text = std::str::from_utf8(data).map_err(|_| svgtree::Error::NotAnUtf8Str)?;
        Ok(Self::new(text))
    }
}

#[async_trait]
impl RenderEngine for PrerenderedScene {
    async fn render(&self, loader: &ResourceLoader) -> Result<Document, Error> {
        let doc = Document::parse_str(&self.text)?;

        for node in doc.root_element().descendants() {
            let scene = node.attribute("data-scene");
            let resource = node.attribute("data-resource");
            let (scene, resource) = match (scene, resource) {
                (Some(scene), Some(resource)) => (scene, resource),
                _ => continue,
            };

            match node.href().and_then(|href| href.strip_prefix('#')) {
                Some(id) if !id.is_empty() => loader.request(ResourceKey::new(scene, resource), id),
                _ => log::warn!("A '{}' resource without a local reference. Skipped.", resource),
            }
        }

        Ok(doc)
    }
}

/// Finalizes a rendered document.
///
/// Waits for and embeds referenced definitions, removes editor-only elements
/// and recalculates the `viewBox`, in that order.
pub async fn finalize(
    doc: &mut Document,
    source: &dyn DefinitionSource,
    options: &Options,
) -> Option<ViewBox> {
    embed::wait_and_embed(doc, source, options).await;
    viewbox::finalize_geometry(doc, options.default_padding)
}

/// Renders and finalizes a scene.
pub async fn render_to_document(
    engine: &dyn RenderEngine,
    loader: &ResourceLoader,
    options: &Options,
) -> Result<Document, Error> {
    let mut doc = engine.render(loader).await?;
    finalize(&mut doc, loader.registry().as_ref(), options).await;
    Ok(doc)
}

/// Renders, finalizes and serializes a scene.
///
/// The output is minified when [`Options::optimize`] is set.
pub async fn render_to_string(
    engine: &dyn RenderEngine,
    loader: &ResourceLoader,
    options: &Options,
) -> Result<String, Error> {
    if options.optimize {
        render_to_string_with(engine, loader, options, &Minifier).await
    } else {
        let doc = render_to_document(engine, loader, options).await?;
        Ok(doc.to_string(&options.write))
    }
}

/// Renders, finalizes, serializes and optimizes a scene with a custom optimizer.
pub async fn render_to_string_with(
    engine: &dyn RenderEngine,
    loader: &ResourceLoader,
    options: &Options,
    optimizer: &dyn Optimizer,
) -> Result<String, Error> {
    let doc = render_to_document(engine, loader, options).await?;
    optimizer.optimize(&doc.to_string(&options.write))
}
