use byteorder::{BigEndian, ReadBytesExt};
use bytes::Bytes;
use std::io::Cursor;

/// A parsed tag, either the fixed-layout ID3v1 trailer or an ID3v2 header tag
#[derive(Debug, Clone, PartialEq)]
pub enum Id3Tag {
    V1(Id3TagV1),
    V2(Id3TagV2),
}

impl Id3Tag {
    /// Embedded images, or `None` when this kind of tag cannot carry any
    pub fn images(&self) -> Option<&[Image]> {
        match self {
            Id3Tag::V1(_) => None,
            Id3Tag::V2(tag) => Some(&tag.images),
        }
    }

    pub fn title(&self) -> Option<&str> {
        match self {
            Id3Tag::V1(tag) => non_empty(&tag.title),
            Id3Tag::V2(tag) => tag.title.as_deref(),
        }
    }

    pub fn artist(&self) -> Option<&str> {
        match self {
            Id3Tag::V1(tag) => non_empty(&tag.artist),
            Id3Tag::V2(tag) => tag.artist.as_deref(),
        }
    }

    pub fn album(&self) -> Option<&str> {
        match self {
            Id3Tag::V1(tag) => non_empty(&tag.album),
            Id3Tag::V2(tag) => tag.album.as_deref(),
        }
    }
}

fn non_empty(s: &str) -> Option<&str> {
    (!s.is_empty()).then_some(s)
}

/// ID3v1 / ID3v1.1 tag (last 128 bytes of the file)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Id3TagV1 {
    pub title: String,
    pub artist: String,
    pub album: String,
    pub year: String,
    pub comment: String,
    /// Only present in ID3v1.1
    pub track: Option<u8>,
    pub genre: u8,
}

impl Id3TagV1 {
    pub const SIGNATURE: &'static [u8] = b"TAG";
    pub const SIZE: usize = 128;

    /// Parse a 128-byte trailer. Returns `None` if it does not start with `TAG`.
    pub fn from_bytes(data: &[u8]) -> Option<Self> {
        if data.len() < Self::SIZE || &data[0..3] != Self::SIGNATURE {
            return None;
        }

        let comment = &data[97..127];
        // v1.1 steals the last two comment bytes: a zero then the track number
        let (comment, track) = if comment[28] == 0 && comment[29] != 0 {
            (&comment[..28], Some(comment[29]))
        } else {
            (comment, None)
        };

        Some(Self {
            title: latin1(&data[3..33]),
            artist: latin1(&data[33..63]),
            album: latin1(&data[63..93]),
            year: latin1(&data[93..97]),
            comment: latin1(comment),
            track,
            genre: data[127],
        })
    }
}

/// Decode an ISO-8859-1 field, stopping at the first NUL and trimming padding
fn latin1(field: &[u8]) -> String {
    let end = field.iter().position(|&b| b == 0).unwrap_or(field.len());
    let s: String = field[..end].iter().map(|&b| b as char).collect();
    s.trim_end().to_string()
}

/// ID3v2 tag with the commonly used text fields and all embedded pictures
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Id3TagV2 {
    /// (major, revision), e.g. `(4, 0)` for ID3v2.4.0
    pub version: (u8, u8),
    pub title: Option<String>,
    pub artist: Option<String>,
    pub album: Option<String>,
    pub album_artist: Option<String>,
    pub year: Option<i32>,
    pub genre: Option<String>,
    pub track: Option<u32>,
    pub disc: Option<u32>,
    pub comments: Vec<Comment>,
    pub images: Vec<Image>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Comment {
    pub language: String,
    pub description: String,
    pub text: String,
}

/// An embedded picture (APIC / PIC frame)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Image {
    pub mime: String,
    /// Picture type as named by the decoder, e.g. `CoverFront`
    pub kind: String,
    pub description: String,
    pub data: Bytes,
}

/// ID3v2 header - 10 bytes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TagHeader {
    pub major: u8,
    pub revision: u8,
    pub flags: u8,
    /// Size of the tag excluding header and footer
    pub size: u32,
}

impl TagHeader {
    pub const SIGNATURE: &'static [u8] = b"ID3";
    pub const SIZE: usize = 10;

    const FLAG_FOOTER: u8 = 0x10;

    /// Parse a header. Returns `None` for anything that is not a plausible ID3v2 header.
    pub fn from_bytes(data: &[u8]) -> Option<Self> {
        if data.len() < Self::SIZE || &data[0..3] != Self::SIGNATURE {
            return None;
        }

        let mut cursor = Cursor::new(&data[3..]);
        let major = cursor.read_u8().ok()?;
        let revision = cursor.read_u8().ok()?;
        let flags = cursor.read_u8().ok()?;
        let raw = cursor.read_u32::<BigEndian>().ok()?;

        if !(2..=4).contains(&major) || revision == 0xFF {
            return None;
        }
        // Every size byte must have its top bit clear
        if raw & 0x8080_8080 != 0 {
            return None;
        }

        Some(Self {
            major,
            revision,
            flags,
            size: unsynchsafe(raw),
        })
    }

    pub fn has_footer(&self) -> bool {
        self.major == 4 && self.flags & Self::FLAG_FOOTER != 0
    }

    /// Total bytes occupied by the tag, header and footer included
    pub fn total_len(&self) -> u64 {
        let footer = if self.has_footer() { Self::SIZE } else { 0 };
        (Self::SIZE + footer) as u64 + self.size as u64
    }
}

fn unsynchsafe(raw: u32) -> u32 {
    ((raw & 0x7F00_0000) >> 3) | ((raw & 0x007F_0000) >> 2) | ((raw & 0x0000_7F00) >> 1) | (raw & 0x7F)
}
