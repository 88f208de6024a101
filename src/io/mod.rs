mod blob;
mod fetch;
mod http;
mod local;

pub use blob::{Blob, BlobSource};
#[cfg(feature = "http")]
pub use fetch::ReqwestFetch;
pub use fetch::{Fetch, FetchOptions, FetchResponse, Method};
pub use http::RemoteSource;
pub use local::LocalSource;

use async_trait::async_trait;
use bytes::Bytes;

use crate::error::{Error, Result};

/// Trait for random access reading from a data source
///
/// A source is opened once, read any number of times, then closed.
/// Reads are issued one at a time; each returns the window
/// `[position, position + length)` or a shorter one if the backend
/// clamps at the end of the resource.
#[async_trait]
pub trait ByteSource: Send + Sync {
    /// Acquire the underlying resource and discover its size
    async fn open(&mut self) -> Result<()>;

    /// Read `length` bytes starting at `position`
    async fn read(&mut self, length: usize, position: u64) -> Result<Bytes>;

    /// Release the underlying resource. Safe to call more than once.
    async fn close(&mut self);

    /// Total size of the data source, valid once `open` has returned
    fn size(&self) -> u64;
}

#[async_trait]
impl<S: ByteSource + ?Sized> ByteSource for &mut S {
    async fn open(&mut self) -> Result<()> {
        (**self).open().await
    }

    async fn read(&mut self, length: usize, position: u64) -> Result<Bytes> {
        (**self).read(length, position).await
    }

    async fn close(&mut self) {
        (**self).close().await
    }

    fn size(&self) -> u64 {
        (**self).size()
    }
}

#[async_trait]
impl<S: ByteSource + ?Sized> ByteSource for Box<S> {
    async fn open(&mut self) -> Result<()> {
        (**self).open().await
    }

    async fn read(&mut self, length: usize, position: u64) -> Result<Bytes> {
        (**self).read(length, position).await
    }

    async fn close(&mut self) {
        (**self).close().await
    }

    fn size(&self) -> u64 {
        (**self).size()
    }
}

/// Where a source is in its open -> read -> close lifecycle
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub(crate) enum State {
    #[default]
    Created,
    Open,
    Closed,
}

impl State {
    pub(crate) fn ensure_open(self) -> Result<()> {
        match self {
            State::Open => Ok(()),
            State::Created => Err(Error::NotOpen),
            State::Closed => Err(Error::Closed),
        }
    }

    /// Returns `true` when `open` still has work to do.
    pub(crate) fn begin_open(self) -> Result<bool> {
        match self {
            State::Created => Ok(true),
            State::Open => Ok(false),
            State::Closed => Err(Error::Closed),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lifecycle_transitions() {
        assert!(matches!(State::Created.ensure_open(), Err(Error::NotOpen)));
        assert!(State::Open.ensure_open().is_ok());
        assert!(matches!(State::Closed.ensure_open(), Err(Error::Closed)));

        assert!(State::Created.begin_open().unwrap());
        assert!(!State::Open.begin_open().unwrap());
        assert!(matches!(State::Closed.begin_open(), Err(Error::Closed)));
    }
}
