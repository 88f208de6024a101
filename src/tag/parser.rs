//! Locating and decoding tags through a [`ByteSource`].
//!
//! ## Parsing Strategy
//!
//! Tags live in small regions of otherwise large files:
//! 1. Read the 10-byte ID3v2 header at offset 0
//! 2. If present, read exactly the tag region it describes and decode it
//! 3. Otherwise read the 128-byte ID3v1 trailer at the end of the file
//!
//! At most two reads are issued per strategy, so a remote source
//! costs a handful of Range requests regardless of file size.

use async_trait::async_trait;
use std::io::Cursor;

use id3::TagLike;

use crate::error::Result;
use crate::io::ByteSource;

use super::structures::*;

/// Turns an opened [`ByteSource`] into a tag
///
/// Returns `Ok(None)` when the source carries no recognizable tag.
#[async_trait]
pub trait TagParser: Send + Sync {
    async fn parse(&self, source: &mut dyn ByteSource) -> Result<Option<Id3Tag>>;
}

/// Default parser for ID3v2.2-2.4 and ID3v1/1.1
///
/// Frame decoding is done by the `id3` crate; this type only decides which
/// windows of the source to fetch.
#[derive(Debug, Default, Clone, Copy)]
pub struct Id3Parser;

impl Id3Parser {
    pub fn new() -> Self {
        Self
    }

    /// Read and decode an ID3v2 tag at the start of the source.
    pub async fn parse_v2(&self, source: &mut dyn ByteSource) -> Result<Option<Id3TagV2>> {
        if source.size() < TagHeader::SIZE as u64 {
            return Ok(None);
        }

        let head = source.read(TagHeader::SIZE, 0).await?;
        let Some(header) = TagHeader::from_bytes(&head) else {
            return Ok(None);
        };
        tracing::debug!(
            version = %format_args!("2.{}.{}", header.major, header.revision),
            size = header.size,
            "found ID3v2 header"
        );

        let len = usize::try_from(header.total_len()).map_err(|_| {
            id3::Error::new(id3::ErrorKind::Parsing, "tag too large to address")
        })?;
        let region = source.read(len, 0).await?;
        let Some(tag) = settle(id3::Tag::read_from2(Cursor::new(&region[..])))? else {
            return Ok(None);
        };

        Ok(Some(convert_v2(&tag, &header)))
    }

    /// Read an ID3v1 trailer from the last 128 bytes of the source.
    pub async fn parse_v1(&self, source: &mut dyn ByteSource) -> Result<Option<Id3TagV1>> {
        let size = source.size();
        if size < Id3TagV1::SIZE as u64 {
            return Ok(None);
        }

        let trailer = source
            .read(Id3TagV1::SIZE, size - Id3TagV1::SIZE as u64)
            .await?;
        let tag = Id3TagV1::from_bytes(&trailer);
        if tag.is_some() {
            tracing::debug!("found ID3v1 trailer");
        }
        Ok(tag)
    }
}

#[async_trait]
impl TagParser for Id3Parser {
    async fn parse(&self, source: &mut dyn ByteSource) -> Result<Option<Id3Tag>> {
        if let Some(tag) = self.parse_v2(source).await? {
            return Ok(Some(Id3Tag::V2(tag)));
        }
        Ok(self.parse_v1(source).await?.map(Id3Tag::V1))
    }
}

/// Absent tags become `None`; a decode that failed part way keeps what it got.
fn settle(decoded: std::result::Result<id3::Tag, id3::Error>) -> Result<Option<id3::Tag>> {
    match decoded {
        Ok(tag) => Ok(Some(tag)),
        Err(id3::Error {
            kind: id3::ErrorKind::NoTag,
            ..
        }) => Ok(None),
        Err(id3::Error {
            partial_tag: Some(tag),
            description,
            ..
        }) => {
            tracing::warn!(%description, "ID3v2 tag decoded partially");
            Ok(Some(tag))
        }
        Err(e) => Err(e.into()),
    }
}

fn convert_v2(tag: &id3::Tag, header: &TagHeader) -> Id3TagV2 {
    Id3TagV2 {
        version: (header.major, header.revision),
        title: tag.title().map(str::to_owned),
        artist: tag.artist().map(str::to_owned),
        album: tag.album().map(str::to_owned),
        album_artist: tag.album_artist().map(str::to_owned),
        year: tag.year(),
        genre: tag.genre().map(str::to_owned),
        track: tag.track(),
        disc: tag.disc(),
        comments: tag
            .comments()
            .map(|c| Comment {
                language: c.lang.clone(),
                description: c.description.clone(),
                text: c.text.clone(),
            })
            .collect(),
        images: tag
            .pictures()
            .map(|p| Image {
                mime: p.mime_type.clone(),
                kind: format!("{:?}", p.picture_type),
                description: p.description.clone(),
                data: p.data.clone().into(),
            })
            .collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io::BlobSource;
    use bytes::Bytes;
    use id3::frame::{Content, Frame, Picture, PictureType};

    fn v2_file(pictures: usize) -> Vec<u8> {
        let mut tag = id3::Tag::new();
        tag.set_title("Song");
        tag.set_artist("Band");
        tag.set_album("Record");
        tag.set_year(2004);
        tag.set_track(3);
        for i in 0..pictures {
            let picture = Picture {
                mime_type: "image/png".to_string(),
                picture_type: if i == 0 {
                    PictureType::CoverFront
                } else {
                    PictureType::Other
                },
                description: format!("picture {}", i),
                data: vec![i as u8; 17],
            };
            tag.add_frame(Frame::with_content("APIC", Content::Picture(picture)));
        }

        let mut file = Vec::new();
        tag.write_to(&mut file, id3::Version::Id3v23).unwrap();
        // pretend audio
        file.extend(std::iter::repeat_n(0xFFu8, 4096));
        file
    }

    fn v1_file() -> Vec<u8> {
        let mut file = vec![0xFFu8; 2048];
        let mut trailer = vec![0u8; 128];
        trailer[0..3].copy_from_slice(b"TAG");
        trailer[3..8].copy_from_slice(b"Tune!");
        trailer[126] = 9;
        file.extend(trailer);
        file
    }

    async fn parse(data: Vec<u8>) -> Option<Id3Tag> {
        let mut source = BlobSource::new(Bytes::from(data));
        source.open().await.unwrap();
        Id3Parser.parse(&mut source).await.unwrap()
    }

    #[tokio::test]
    async fn decodes_v2_with_pictures() {
        let Some(Id3Tag::V2(tag)) = parse(v2_file(2)).await else {
            panic!("expected an ID3v2 tag");
        };
        assert_eq!(tag.version, (3, 0));
        assert_eq!(tag.title.as_deref(), Some("Song"));
        assert_eq!(tag.artist.as_deref(), Some("Band"));
        assert_eq!(tag.album.as_deref(), Some("Record"));
        assert_eq!(tag.year, Some(2004));
        assert_eq!(tag.track, Some(3));
        assert_eq!(tag.images.len(), 2);
        assert_eq!(tag.images[0].mime, "image/png");
        assert_eq!(tag.images[0].kind, "CoverFront");
        assert_eq!(&tag.images[1].data[..], &[1u8; 17]);
    }

    #[tokio::test]
    async fn falls_back_to_v1() {
        let Some(Id3Tag::V1(tag)) = parse(v1_file()).await else {
            panic!("expected an ID3v1 tag");
        };
        assert_eq!(tag.title, "Tune!");
        assert_eq!(tag.track, Some(9));
    }

    #[test]
    fn partial_decode_keeps_partial_tag() {
        let mut partial = id3::Tag::new();
        partial.set_title("Half");
        let mut err = id3::Error::new(id3::ErrorKind::Parsing, "frame body truncated");
        err.partial_tag = Some(partial);

        let tag = settle(Err(err)).unwrap().unwrap();
        assert_eq!(tag.title(), Some("Half"));
    }

    #[test]
    fn decode_failure_without_partial_tag_is_parse_error() {
        let err = id3::Error::new(id3::ErrorKind::Parsing, "frame body truncated");
        assert!(matches!(settle(Err(err)), Err(crate::Error::Parse(_))));

        let err = id3::Error::new(id3::ErrorKind::NoTag, "no tag");
        assert!(settle(Err(err)).unwrap().is_none());
    }

    #[tokio::test]
    async fn untagged_sources_yield_none() {
        assert!(parse(vec![0u8; 4096]).await.is_none());
        assert!(parse(vec![0u8; 4]).await.is_none());
        assert!(parse(Vec::new()).await.is_none());
    }
}
