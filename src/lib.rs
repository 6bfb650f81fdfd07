// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

/*!
`finsvg` finalizes rendered SVG documents into standalone files.

A rendering engine produces a document that references external fragments,
like icons, by local ids. The finalizer loads those fragments, embeds them
into the document's `defs`, removes editor-only elements and shrinks
the `viewBox` to the actual content.

```no_run
use std::sync::Arc;
use finsvg::svgfetch::{CacheScope, HttpFetcher, Resolver};

# async fn example() -> Result<(), finsvg::Error> {
let resolver = Resolver::new(Arc::new(HttpFetcher::new()), CacheScope::new());
let loader = finsvg::ResourceLoader::new(resolver);
let scene = finsvg::PrerenderedScene::new(std::fs::read_to_string("scene.svg")?);
let svg = finsvg::render_to_string(&scene, &loader, &finsvg::Options::default()).await?;
# Ok(())
# }
```
*/

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub use svgfetch;
pub use svgtree;

mod embed;
mod error;
mod geom;
mod loader;
mod optimize;
mod options;
mod registry;
mod render;
mod shapes;
mod viewbox;

pub use embed::{embed_definitions, referenced_ids, wait_and_embed, DefinitionSource};
pub use error::Error;
pub use geom::{BBox, Offset, ViewBox};
pub use loader::{fragment_to_symbol, ResourceLoader};
pub use optimize::{Minifier, Optimizer};
pub use options::Options;
pub use registry::SymbolRegistry;
pub use render::{
    finalize, render_to_document, render_to_string, render_to_string_with, PrerenderedScene,
    RenderEngine,
};
pub use shapes::ShapeKind;
pub use viewbox::{calculate_bbox, cleanup, finalize_geometry, recalculate_view_box};
