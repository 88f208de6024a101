//! # rid3
//!
//! Read ID3 tags from local files, HTTP URLs using Range requests, or
//! in-memory blobs.
//!
//! Tags occupy a few small regions of an audio file (a header, a 128-byte
//! trailer) that may be hundreds of megabytes in total. Every backend here
//! implements the same random-access [`ByteSource`] contract, so the tag
//! parser fetches only the windows it needs: a local file is read with
//! positioned reads, a remote file with one Range request per window.
//!
//! ## Features
//!
//! - Local files, HTTP/HTTPS URLs and in-memory blobs behind one trait
//! - Pluggable HTTP transport through [`Fetch`] (`reqwest` by default)
//! - ID3v2.2/2.3/2.4 and ID3v1/1.1
//! - Embedded cover art as `data:` URLs
//!
//! ## Example
//!
//! ```no_run
//! #[tokio::main]
//! async fn main() -> rid3::Result<()> {
//!     if let Some(tag) = rid3::from_url("https://example.com/track.mp3").await? {
//!         println!("{:?} - {:?}", tag.artist(), tag.title());
//!
//!         if let Some(url) = rid3::get_image_data_url(&tag, 0).await? {
//!             println!("cover: {} chars", url.len());
//!         }
//!     }
//!
//!     Ok(())
//! }
//! ```

pub mod error;
pub mod extract;
pub mod image;
pub mod io;
pub mod tag;

pub use error::{Error, Result};
pub use extract::{from_file, from_path, from_reader, from_reader_with, from_url, from_url_with};
pub use image::get_image_data_url;
#[cfg(feature = "http")]
pub use io::ReqwestFetch;
pub use io::{
    Blob, BlobSource, ByteSource, Fetch, FetchOptions, FetchResponse, LocalSource, Method, RemoteSource,
};
pub use tag::{Id3Parser, Id3Tag, Id3TagV1, Id3TagV2, Image, TagParser};
