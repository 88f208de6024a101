use thiserror::Error;

/// Errors raised while opening, reading, or materializing data from a source.
///
/// A missing tag or a missing image is not an error; those resolve to `None`.
#[derive(Debug, Error)]
pub enum Error {
    /// The resource could not be reached or does not exist at `open` time.
    #[error("source unavailable: {location}")]
    SourceUnavailable {
        location: String,
        #[source]
        source: anyhow::Error,
    },

    /// The transport failed while reading a window.
    #[error("failed to read {length} bytes at offset {position}")]
    Read {
        position: u64,
        length: usize,
        #[source]
        source: anyhow::Error,
    },

    /// `read` was called before `open`.
    #[error("source has not been opened")]
    NotOpen,

    /// The source was used after `close`.
    #[error("source has already been closed")]
    Closed,

    /// The environment cannot supply the requested backend.
    #[error("unsupported environment: {0}")]
    UnsupportedEnvironment(String),

    /// Turning image bytes into a data URL failed.
    #[error("failed to materialize image data")]
    ImageDecode(#[source] anyhow::Error),

    /// The tag region was found but could not be decoded.
    #[error("malformed tag")]
    Parse(#[from] id3::Error),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

impl Error {
    pub(crate) fn unavailable(location: impl Into<String>, source: impl Into<anyhow::Error>) -> Self {
        Error::SourceUnavailable {
            location: location.into(),
            source: source.into(),
        }
    }

    pub(crate) fn read(position: u64, length: usize, source: impl Into<anyhow::Error>) -> Self {
        Error::Read {
            position,
            length,
            source: source.into(),
        }
    }
}
