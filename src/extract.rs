//! High-level entry points: pick a source, open it, parse, close.

use std::path::Path;
use std::sync::Arc;

use crate::error::Result;
use crate::io::{Blob, BlobSource, ByteSource, Fetch, LocalSource, RemoteSource};
use crate::tag::{Id3Parser, Id3Tag, TagParser};

/// Parse tags from a caller-supplied source.
///
/// The source is opened here and always closed before returning,
/// whether parsing succeeded or not.
pub async fn from_reader<S: ByteSource>(source: S) -> Result<Option<Id3Tag>> {
    from_reader_with(source, &Id3Parser).await
}

/// Like [`from_reader`], with a custom [`TagParser`].
pub async fn from_reader_with<S, P>(mut source: S, parser: &P) -> Result<Option<Id3Tag>>
where
    S: ByteSource,
    P: TagParser + ?Sized,
{
    let result = match source.open().await {
        Ok(()) => parser.parse(&mut source).await,
        Err(e) => Err(e),
    };
    source.close().await;
    result
}

/// Parse tags from a file on the local filesystem.
pub async fn from_path(path: impl AsRef<Path>) -> Result<Option<Id3Tag>> {
    from_reader(LocalSource::new(path.as_ref())).await
}

/// Parse tags from an HTTP(S) URL using Range requests.
///
/// Requires the `http` feature; without it this fails with
/// [`Error::UnsupportedEnvironment`](crate::Error::UnsupportedEnvironment)
/// before any I/O. Use [`from_url_with`] to supply a transport.
pub async fn from_url(url: &str) -> Result<Option<Id3Tag>> {
    #[cfg(feature = "http")]
    {
        let fetch = crate::io::ReqwestFetch::new()
            .map_err(|e| crate::Error::UnsupportedEnvironment(format!("HTTP client unavailable: {:#}", e)))?;
        from_url_with(url, Arc::new(fetch)).await
    }

    #[cfg(not(feature = "http"))]
    {
        let _ = url;
        Err(crate::Error::UnsupportedEnvironment(
            "no HTTP client compiled in; enable the `http` feature or use from_url_with".to_string(),
        ))
    }
}

/// Parse tags from an HTTP(S) URL through the given transport.
pub async fn from_url_with(url: &str, fetch: Arc<dyn Fetch>) -> Result<Option<Id3Tag>> {
    from_reader(RemoteSource::new(url, fetch)).await
}

/// Parse tags from an in-memory blob.
pub async fn from_file<B: Blob>(blob: B) -> Result<Option<Id3Tag>> {
    from_reader(BlobSource::new(blob)).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Error;
    use async_trait::async_trait;
    use bytes::Bytes;

    /// Records lifecycle calls; fails reads when asked to
    #[derive(Default)]
    struct Recorder {
        opened: bool,
        closes: usize,
        fail_open: bool,
        fail_read: bool,
    }

    #[async_trait]
    impl ByteSource for Recorder {
        async fn open(&mut self) -> Result<()> {
            if self.fail_open {
                return Err(Error::unavailable("recorder", anyhow::anyhow!("gone")));
            }
            self.opened = true;
            Ok(())
        }

        async fn read(&mut self, length: usize, position: u64) -> Result<Bytes> {
            if self.fail_read {
                return Err(Error::read(position, length, anyhow::anyhow!("reset")));
            }
            Ok(Bytes::from(vec![0u8; length]))
        }

        async fn close(&mut self) {
            self.closes += 1;
        }

        fn size(&self) -> u64 {
            4096
        }
    }

    #[tokio::test]
    async fn closes_after_success() {
        let mut recorder = Recorder::default();
        assert!(from_reader(&mut recorder).await.unwrap().is_none());
        assert!(recorder.opened);
        assert_eq!(recorder.closes, 1);
    }

    #[tokio::test]
    async fn closes_after_read_failure() {
        let mut recorder = Recorder {
            fail_read: true,
            ..Default::default()
        };
        let err = from_reader(&mut recorder).await.unwrap_err();
        assert!(matches!(err, Error::Read { .. }));
        assert_eq!(recorder.closes, 1);
    }

    #[tokio::test]
    async fn open_failure_propagates() {
        let mut recorder = Recorder {
            fail_open: true,
            ..Default::default()
        };
        let err = from_reader(&mut recorder).await.unwrap_err();
        assert!(matches!(err, Error::SourceUnavailable { .. }));
        assert_eq!(recorder.closes, 1);
    }

    #[tokio::test]
    async fn missing_path_is_unavailable() {
        let dir = tempfile::tempdir().unwrap();
        let err = from_path(dir.path().join("nope.mp3")).await.unwrap_err();
        assert!(matches!(err, Error::SourceUnavailable { .. }));
    }

    #[tokio::test]
    async fn empty_blob_has_no_tag() {
        assert!(from_file(Bytes::new()).await.unwrap().is_none());
    }
}
