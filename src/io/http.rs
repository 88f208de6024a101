use async_trait::async_trait;
use bytes::Bytes;
use std::sync::Arc;

use super::fetch::{Fetch, FetchOptions};
use super::{ByteSource, State};
use crate::error::{Error, Result};
use anyhow::anyhow;

/// HTTP Range source for remote audio files
///
/// Every read is an independent request through the injected [`Fetch`];
/// no connection state is held between reads.
pub struct RemoteSource {
    fetch: Arc<dyn Fetch>,
    url: String,
    size: u64,
    state: State,
}

impl RemoteSource {
    /// Create a source for `url`. No request is sent until `open`.
    pub fn new(url: impl Into<String>, fetch: Arc<dyn Fetch>) -> Self {
        Self {
            fetch,
            url: url.into(),
            size: 0,
            state: State::Created,
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

#[async_trait]
impl ByteSource for RemoteSource {
    /// Send a HEAD request to get the file size
    ///
    /// A response without a usable `Content-Length` leaves the size at 0.
    async fn open(&mut self) -> Result<()> {
        if !self.state.begin_open()? {
            return Ok(());
        }

        let resp = self
            .fetch
            .fetch(&self.url, FetchOptions::head())
            .await
            .map_err(|e| Error::unavailable(&self.url, e))?;

        let status = resp.status();
        if status >= 400 {
            return Err(Error::unavailable(
                &self.url,
                anyhow!("HTTP request failed with status: {}", status),
            ));
        }

        self.size = match resp.header("content-length") {
            Some(value) => value.trim().parse().unwrap_or(0),
            None => {
                tracing::warn!(url = %self.url, "remote server did not return Content-Length");
                0
            }
        };
        self.state = State::Open;
        tracing::debug!(url = %self.url, size = self.size, "opened remote source");
        Ok(())
    }

    async fn read(&mut self, length: usize, position: u64) -> Result<Bytes> {
        self.state.ensure_open()?;
        if length == 0 {
            return Ok(Bytes::new());
        }

        let Some(end) = position.checked_add(length as u64 - 1) else {
            return Err(Error::read(position, length, anyhow!("range overflows")));
        };
        let range = format!("bytes={}-{}", position, end);
        tracing::trace!(url = %self.url, %range, "remote read");

        let resp = self
            .fetch
            .fetch(&self.url, FetchOptions::get().header("Range", range))
            .await
            .map_err(|e| Error::read(position, length, e))?;

        // 200 vs 206 is not checked; the body is trusted as the window
        let status = resp.status();
        if status >= 400 {
            return Err(Error::read(
                position,
                length,
                anyhow!("HTTP request failed with status: {}", status),
            ));
        }

        resp.bytes()
            .await
            .map_err(|e| Error::read(position, length, e))
    }

    async fn close(&mut self) {
        self.state = State::Closed;
    }

    fn size(&self) -> u64 {
        self.size
    }
}
