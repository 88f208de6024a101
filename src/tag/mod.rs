//! ID3 tag model and tag location.
//!
//! ## Architecture
//!
//! - [`structures`]: the tag model ([`Id3Tag`] and friends) and fixed-layout headers
//! - [`parser`]: the [`TagParser`] seam and the default [`Id3Parser`]
//!
//! The parser only ever sees a [`ByteSource`](crate::io::ByteSource); it has
//! no idea whether bytes come from disk, HTTP, or memory.
//!
//! ## Supported Tags
//!
//! - ID3v2.2, v2.3 and v2.4 at the start of the file (frames decoded by the `id3` crate)
//! - ID3v1 and ID3v1.1 in the last 128 bytes
//!
//! When both are present the ID3v2 tag wins.

mod parser;
mod structures;

pub use parser::{Id3Parser, TagParser};
pub use structures::*;
