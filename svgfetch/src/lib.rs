// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

/*!
`svgfetch` turns symbolic SVG fragment references, like an icon name, into SVG markup.

Resolved fragments are memoized in a [`CacheScope`] and concurrent requests
for the same [`ResourceKey`] share a single fetch.

```no_run
use std::sync::Arc;
use svgfetch::{CacheScope, HttpFetcher, ResourceKey, Resolver};

# async fn example() {
let resolver = Resolver::new(Arc::new(HttpFetcher::new()), CacheScope::new());
let key = ResourceKey::new("icon", "mingcute/code-fill");
if let Some(svg) = resolver.resolve(&key).await {
    println!("{}", svg);
}
# }
```
*/

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(missing_debug_implementations)]

mod cache;
mod fetch;
mod key;
mod resolver;

pub use cache::{CacheScope, FragmentCache, InFlightTable};
pub use fetch::{FetchError, Fetcher, HttpFetcher};
pub use key::{ResourceKey, SceneMap, ICON_URL_PREFIX, ILLUS_URL_PREFIX};
pub use resolver::{is_svg_markup, Resolver};
