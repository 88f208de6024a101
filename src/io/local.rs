use super::{ByteSource, State};
use crate::error::{Error, Result};
use anyhow::anyhow;
use async_trait::async_trait;
use bytes::Bytes;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Local file source with random access support
///
/// The handle is acquired by `open` and released by `close`, or when the
/// source is dropped, whichever comes first.
pub struct LocalSource {
    path: PathBuf,
    file: Option<Arc<std::fs::File>>,
    size: u64,
    state: State,
}

impl LocalSource {
    /// Create a source for `path`. No I/O happens until `open`.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            file: None,
            size: 0,
            state: State::Created,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl ByteSource for LocalSource {
    async fn open(&mut self) -> Result<()> {
        if !self.state.begin_open()? {
            return Ok(());
        }

        let location = self.path.display().to_string();
        let file = tokio::fs::File::open(&self.path)
            .await
            .map_err(|e| Error::unavailable(&location, e))?;
        let size = file
            .metadata()
            .await
            .map_err(|e| Error::unavailable(&location, e))?
            .len();

        self.file = Some(Arc::new(file.into_std().await));
        self.size = size;
        self.state = State::Open;
        tracing::debug!(path = %location, size, "opened local source");
        Ok(())
    }

    async fn read(&mut self, length: usize, position: u64) -> Result<Bytes> {
        self.state.ensure_open()?;
        let file = self.file.clone().ok_or(Error::NotOpen)?;

        if length == 0 {
            return Ok(Bytes::new());
        }
        if position >= self.size {
            return Err(Error::read(
                position,
                length,
                anyhow!("position is beyond end of file ({} bytes)", self.size),
            ));
        }

        // Clamp to what the file actually holds
        let len = (self.size - position).min(length as u64) as usize;
        tracing::trace!(position, len, "local read");

        let buf = tokio::task::spawn_blocking(move || {
            let mut buf = vec![0u8; len];
            read_exact_at(&file, position, &mut buf).map(|_| buf)
        })
        .await
        .map_err(|e| Error::read(position, length, e))?
        .map_err(|e| Error::read(position, length, e))?;

        Ok(Bytes::from(buf))
    }

    async fn close(&mut self) {
        if self.file.take().is_some() {
            tracing::debug!(path = %self.path.display(), "closed local source");
        }
        self.state = State::Closed;
    }

    fn size(&self) -> u64 {
        self.size
    }
}

fn read_exact_at(file: &std::fs::File, offset: u64, buf: &mut [u8]) -> std::io::Result<()> {
    #[cfg(unix)]
    {
        use std::os::unix::fs::FileExt;
        file.read_exact_at(buf, offset)
    }

    #[cfg(windows)]
    {
        use std::os::windows::fs::FileExt;
        let mut filled = 0;
        while filled < buf.len() {
            let n = file.seek_read(&mut buf[filled..], offset + filled as u64)?;
            if n == 0 {
                return Err(std::io::ErrorKind::UnexpectedEof.into());
            }
            filled += n;
        }
        Ok(())
    }

    #[cfg(not(any(unix, windows)))]
    {
        use std::io::{Read, Seek, SeekFrom};
        let mut file = file;
        file.seek(SeekFrom::Start(offset))?;
        file.read_exact(buf)
    }
}
