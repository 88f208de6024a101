use super::{ByteSource, State};
use crate::error::{Error, Result};
use async_trait::async_trait;
use bytes::Bytes;
use std::sync::Arc;

/// A binary object that is already resident in memory
///
/// `slice` follows the clamping rules of a browser `Blob.slice`: bounds past
/// the end are pulled back to the end, so the result may be short.
#[async_trait]
pub trait Blob: Send + Sync {
    fn size(&self) -> u64;

    /// Materialize `[start, end)` as owned bytes
    async fn slice(&self, start: u64, end: u64) -> anyhow::Result<Bytes>;
}

fn clamp(len: usize, start: u64, end: u64) -> (usize, usize) {
    let end = end.min(len as u64) as usize;
    let start = (start.min(end as u64)) as usize;
    (start, end)
}

#[async_trait]
impl Blob for Bytes {
    fn size(&self) -> u64 {
        self.len() as u64
    }

    async fn slice(&self, start: u64, end: u64) -> anyhow::Result<Bytes> {
        let (start, end) = clamp(self.len(), start, end);
        Ok(Bytes::slice(self, start..end))
    }
}

#[async_trait]
impl Blob for Vec<u8> {
    fn size(&self) -> u64 {
        self.len() as u64
    }

    async fn slice(&self, start: u64, end: u64) -> anyhow::Result<Bytes> {
        let (start, end) = clamp(self.len(), start, end);
        Ok(Bytes::copy_from_slice(&self[start..end]))
    }
}

#[async_trait]
impl<B: Blob + ?Sized> Blob for Arc<B> {
    fn size(&self) -> u64 {
        (**self).size()
    }

    async fn slice(&self, start: u64, end: u64) -> anyhow::Result<Bytes> {
        (**self).slice(start, end).await
    }
}

/// Source over an in-memory [`Blob`]
pub struct BlobSource<B> {
    blob: B,
    size: u64,
    state: State,
}

impl<B: Blob> BlobSource<B> {
    pub fn new(blob: B) -> Self {
        Self {
            blob,
            size: 0,
            state: State::Created,
        }
    }

    pub fn into_inner(self) -> B {
        self.blob
    }
}

#[async_trait]
impl<B: Blob> ByteSource for BlobSource<B> {
    async fn open(&mut self) -> Result<()> {
        if self.state.begin_open()? {
            self.size = self.blob.size();
            self.state = State::Open;
            tracing::debug!(size = self.size, "opened blob source");
        }
        Ok(())
    }

    async fn read(&mut self, length: usize, position: u64) -> Result<Bytes> {
        self.state.ensure_open()?;
        let end = position.saturating_add(length as u64);
        self.blob
            .slice(position, end)
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

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::bail;

    struct Aborted;

    #[async_trait]
    impl Blob for Aborted {
        fn size(&self) -> u64 {
            32
        }

        async fn slice(&self, _start: u64, _end: u64) -> anyhow::Result<Bytes> {
            bail!("read aborted")
        }
    }

    #[tokio::test]
    async fn reads_slices() {
        let data: Vec<u8> = (0..=255).collect();
        let mut source = BlobSource::new(Bytes::from(data.clone()));
        assert!(matches!(source.read(1, 0).await, Err(Error::NotOpen)));

        source.open().await.unwrap();
        assert_eq!(source.size(), 256);
        assert_eq!(&source.read(16, 32).await.unwrap()[..], &data[32..48]);
        // clamped at the end
        assert_eq!(&source.read(16, 250).await.unwrap()[..], &data[250..]);
        assert!(source.read(16, 300).await.unwrap().is_empty());

        source.close().await;
        source.close().await;
        assert!(matches!(source.read(1, 0).await, Err(Error::Closed)));
    }

    #[tokio::test]
    async fn vec_blob_matches_bytes_blob() {
        let data: Vec<u8> = (0..100).collect();
        let mut source = BlobSource::new(data.clone());
        source.open().await.unwrap();
        assert_eq!(&source.read(10, 45).await.unwrap()[..], &data[45..55]);
    }

    #[tokio::test]
    async fn materialization_failure_is_read_error() {
        let mut source = BlobSource::new(Aborted);
        source.open().await.unwrap();
        let err = source.read(8, 0).await.unwrap_err();
        assert!(matches!(err, Error::Read { position: 0, length: 8, .. }));
    }
}
