// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;

/// A fetch failure.
#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    /// A transport error.
    #[error("request failed cause {0}")]
    Http(#[from] reqwest::Error),

    /// A non-2xx response.
    #[error("server responded with status {0}")]
    Status(u16),

    /// A response larger than allowed.
    #[error("response is larger than {0} bytes")]
    TooLarge(usize),

    /// Any other source-specific error.
    #[error("{0}")]
    Unavailable(String),
}

/// A source of fragment markup.
///
/// Implementations must be `Send + Sync`, since a resolver can be shared between tasks.
#[async_trait]
pub trait Fetcher: Send + Sync {
    /// Fetches a text document from the given URL.
    async fn fetch(&self, url: &str) -> Result<String, FetchError>;
}

#[async_trait]
impl<T: Fetcher + ?Sized> Fetcher for Arc<T> {
    async fn fetch(&self, url: &str) -> Result<String, FetchError> {
        (**self).fetch(url).await
    }
}

/// An HTTP(S) fetcher.
///
/// # Example
///
/// ```
/// use std::time::Duration;
/// use svgfetch::HttpFetcher;
///
/// let fetcher = HttpFetcher::new()
///     .with_timeout(Duration::from_secs(10))
///     .with_user_agent("my-app/1.0");
/// ```
#[derive(Clone, Debug)]
pub struct HttpFetcher {
    client: reqwest::Client,
    timeout: Duration,
    user_agent: String,
    max_size: usize,
}

impl HttpFetcher {
    /// Creates a new fetcher with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the request timeout.
    ///
    /// This is the only bound on how long a fragment may stay in flight.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Sets the `User-Agent` header.
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    /// Sets the maximum response size in bytes.
    pub fn with_max_size(mut self, max_size: usize) -> Self {
        self.max_size = max_size;
        self
    }
}

impl Default for HttpFetcher {
    fn default() -> Self {
        HttpFetcher {
            client: reqwest::Client::new(),
            timeout: Duration::from_secs(30),
            user_agent: concat!("finsvg/", env!("CARGO_PKG_VERSION")).to_string(),
            max_size: 8 * 1024 * 1024,
        }
    }
}

#[async_trait]
impl Fetcher for HttpFetcher {
    async fn fetch(&self, url: &str) -> Result<String, FetchError> {
        log::debug!("Fetching '{}'.", url);

        let response = self
            .client
            .get(url)
            .timeout(self.timeout)
            .header(reqwest::header::USER_AGENT, self.user_agent.as_str())
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status(status.as_u16()));
        }

        if let Some(len) = response.content_length() {
            if len > self.max_size as u64 {
                return Err(FetchError::TooLarge(self.max_size));
            }
        }

        let text = response.text().await?;
        if text.len() > self.max_size {
            return Err(FetchError::TooLarge(self.max_size));
        }

        Ok(text)
    }
}
