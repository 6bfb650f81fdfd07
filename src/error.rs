// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

/// A list of finalization errors.
///
/// Unavailable fragments and dangling references are not errors.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Failed to parse an SVG document.
    #[error(transparent)]
    Parse(#[from] svgtree::Error),

    /// A rendering engine error.
    #[error("rendering failed cause {0}")]
    Render(Box<dyn std::error::Error + Send + Sync>),

    /// An output optimizer error.
    #[error("optimization failed cause {0}")]
    Optimize(String),

    /// An I/O error.
    #[error(transparent)]
    Io(#[from] std::io::Error),
}
