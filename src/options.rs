// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

use std::time::Duration;

use svgtree::WriteOptions;

/// Finalization options.
#[derive(Clone, Debug)]
pub struct Options {
    /// A `viewBox` padding used when the document has no valid `viewBox`.
    ///
    /// Default: 20
    pub default_padding: f64,

    /// How long to wait for referenced definitions.
    ///
    /// Default: 5s
    pub max_wait: Duration,

    /// How often to check for definitions when a source cannot notify about changes.
    ///
    /// Default: 100ms
    pub poll_interval: Duration,

    /// Minify the output.
    ///
    /// Default: disabled
    pub optimize: bool,

    /// Output formatting.
    pub write: WriteOptions,
}

impl Default for Options {
    fn default() -> Options {
        Options {
            default_padding: 20.0,
            max_wait: Duration::from_millis(5000),
            poll_interval: Duration::from_millis(100),
            optimize: false,
            write: WriteOptions::default(),
        }
    }
}
