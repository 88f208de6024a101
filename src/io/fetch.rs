//! The request-issuing capability used by [`RemoteSource`](super::RemoteSource).
//!
//! Any HTTP client can back a remote source by implementing [`Fetch`].
//! With the `http` feature enabled, [`ReqwestFetch`] provides one.

use std::collections::BTreeMap;

use anyhow::Result;
use async_trait::async_trait;
use bytes::Bytes;

/// Request method understood by a [`Fetch`] implementation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Head,
}

/// Method and extra headers for a single request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchOptions {
    pub method: Method,
    pub headers: BTreeMap<String, String>,
}

impl FetchOptions {
    pub fn head() -> Self {
        Self {
            method: Method::Head,
            headers: BTreeMap::new(),
        }
    }

    pub fn get() -> Self {
        Self {
            method: Method::Get,
            headers: BTreeMap::new(),
        }
    }

    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }
}

/// A response returned by [`Fetch::fetch`]
#[async_trait]
pub trait FetchResponse: Send {
    /// HTTP status code
    fn status(&self) -> u16;

    /// Case-insensitive header lookup
    fn header(&self, name: &str) -> Option<String>;

    /// Consume the response and collect its body
    async fn bytes(self: Box<Self>) -> Result<Bytes>;
}

/// Issues a single request for `url`
#[async_trait]
pub trait Fetch: Send + Sync {
    async fn fetch(&self, url: &str, options: FetchOptions) -> Result<Box<dyn FetchResponse>>;
}

#[cfg(feature = "http")]
pub use self::reqwest_fetch::ReqwestFetch;

#[cfg(feature = "http")]
mod reqwest_fetch {
    use std::time::Duration;

    use anyhow::Result;
    use async_trait::async_trait;
    use bytes::Bytes;
    use reqwest::Client;

    use super::{Fetch, FetchOptions, FetchResponse, Method};

    const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

    /// [`Fetch`] backed by a `reqwest` client
    #[derive(Debug, Clone)]
    pub struct ReqwestFetch {
        client: Client,
    }

    impl ReqwestFetch {
        /// Build a client with a 30 second request timeout
        pub fn new() -> Result<Self> {
            let client = Client::builder().timeout(DEFAULT_TIMEOUT).build()?;
            Ok(Self { client })
        }

        /// Use a preconfigured client (timeouts, proxies, TLS roots)
        pub fn with_client(client: Client) -> Self {
            Self { client }
        }
    }

    struct ReqwestResponse(reqwest::Response);

    #[async_trait]
    impl FetchResponse for ReqwestResponse {
        fn status(&self) -> u16 {
            self.0.status().as_u16()
        }

        fn header(&self, name: &str) -> Option<String> {
            self.0
                .headers()
                .get(name)
                .and_then(|v| v.to_str().ok())
                .map(str::to_owned)
        }

        async fn bytes(self: Box<Self>) -> Result<Bytes> {
            Ok(self.0.bytes().await?)
        }
    }

    #[async_trait]
    impl Fetch for ReqwestFetch {
        async fn fetch(&self, url: &str, options: FetchOptions) -> Result<Box<dyn FetchResponse>> {
            let mut request = match options.method {
                Method::Get => self.client.get(url),
                Method::Head => self.client.head(url),
            };
            for (name, value) in &options.headers {
                request = request.header(name.as_str(), value.as_str());
            }

            let resp = request.send().await?;
            Ok(Box::new(ReqwestResponse(resp)))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn options_builder() {
        let options = FetchOptions::get().header("Range", "bytes=0-9");
        assert_eq!(options.method, Method::Get);
        assert_eq!(options.headers.get("Range").map(String::as_str), Some("bytes=0-9"));

        let options = FetchOptions::head();
        assert_eq!(options.method, Method::Head);
        assert!(options.headers.is_empty());
    }
}
