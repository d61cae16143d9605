use crate::atom::walk;
use crate::boxes::FourCC;
use crate::known_boxes::KnownBox;
use crate::parser::{ParseError, Result};
use crate::util::Source;
use byteorder::{BigEndian, ByteOrder};
use serde::Serialize;
use std::io::{self, Read, Write};

/// Type indicator + locale preceding every value inside a `data` atom.
pub const DATA_SUBHEADER_SIZE: usize = 8;

/// iTunes-introduced metadata, collected from `moov.udta.meta.ilst`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ITunesMetadata {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>, // ©nam
    #[serde(skip_serializing_if = "Option::is_none")]
    pub artist: Option<String>, // ©ART
    #[serde(skip_serializing_if = "Option::is_none")]
    pub album_artist: Option<String>, // aART
    #[serde(skip_serializing_if = "Option::is_none")]
    pub album: Option<String>, // ©alb
    /// ID3v1 genre index, plus one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub genre: Option<u16>, // gnre
    #[serde(skip_serializing_if = "Option::is_none")]
    pub custom_genre: Option<String>, // ©gen
    #[serde(skip_serializing_if = "Option::is_none")]
    pub release_date: Option<String>, // ©day
    #[serde(skip_serializing_if = "Option::is_none")]
    pub track: Option<u16>, // trkn.0
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tracks: Option<u16>, // trkn.1
    #[serde(skip_serializing_if = "Option::is_none")]
    pub disk: Option<u16>, // disk.0
    #[serde(skip_serializing_if = "Option::is_none")]
    pub disks: Option<u16>, // disk.1
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tv_show: Option<String>, // tvsh
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tv_episode_id: Option<String>, // tven
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tv_season: Option<u32>, // tvsn
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tv_episode: Option<u32>, // tves
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>, // desc
    #[serde(skip_serializing_if = "Option::is_none")]
    pub long_description: Option<String>, // ldes
    #[serde(skip_serializing_if = "Option::is_none")]
    pub series_description: Option<String>, // sdes
    #[serde(skip_serializing_if = "Option::is_none")]
    pub encoder: Option<String>, // ©too
    /// 9 is a movie, 10 a TV show.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub media_kind: Option<u8>, // stik
    /// 0 standard definition, 1 for 720p, 2 for 1080p.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hd_video: Option<u8>, // hdvd
    #[serde(skip_serializing_if = "Option::is_none")]
    pub country_id: Option<u32>, // sfID
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content_id: Option<u32>, // cnID
    #[serde(skip_serializing_if = "Option::is_none")]
    pub artist_id: Option<u32>, // atID
    #[serde(skip_serializing_if = "Option::is_none")]
    pub playlist_id: Option<u64>, // plID
    #[serde(skip)]
    pub cover_art: Option<Vec<u8>>, // covr
}

fn text(data: &[u8]) -> Option<String> {
    Some(String::from_utf8_lossy(data).into_owned())
}

impl ITunesMetadata {
    /// Records the value of one item atom. `data` is the payload of its `data` atom with the
    /// 8-byte type/locale prefix already removed.
    ///
    /// Fixed-size values must have exactly their expected size, except `hdvd` which is taken at
    /// any width. Unknown types are ignored.
    pub fn set(&mut self, typ: FourCC, data: &[u8]) -> Result<()> {
        let expected = match KnownBox::from(typ) {
            KnownBox::Genre => 2,
            KnownBox::TrackNumber => 8,
            KnownBox::DiskNumber => 6,
            KnownBox::TvSeason
            | KnownBox::TvEpisodeNumber
            | KnownBox::CountryId
            | KnownBox::ContentId
            | KnownBox::ArtistId => 4,
            KnownBox::MediaKind => 1,
            KnownBox::PlaylistId => 8,
            _ => data.len(),
        };
        if expected != data.len() {
            return Err(ParseError::MetadataSize { typ, expected, actual: data.len() });
        }

        match KnownBox::from(typ) {
            KnownBox::Name => self.name = text(data),
            KnownBox::Artist => self.artist = text(data),
            KnownBox::AlbumArtist => self.album_artist = text(data),
            KnownBox::Album => self.album = text(data),
            KnownBox::Genre => self.genre = Some(BigEndian::read_u16(data)),
            KnownBox::CustomGenre => self.custom_genre = text(data),
            KnownBox::ReleaseDate => self.release_date = text(data),
            KnownBox::TrackNumber => {
                // [reserved u16][track u16][total u16][reserved u16]
                self.track = Some(BigEndian::read_u16(&data[2..4]));
                self.tracks = Some(BigEndian::read_u16(&data[4..6]));
            }
            KnownBox::DiskNumber => {
                self.disk = Some(BigEndian::read_u16(&data[2..4]));
                self.disks = Some(BigEndian::read_u16(&data[4..6]));
            }
            KnownBox::TvShow => self.tv_show = text(data),
            KnownBox::TvEpisodeId => self.tv_episode_id = text(data),
            KnownBox::TvSeason => self.tv_season = Some(BigEndian::read_u32(data)),
            KnownBox::TvEpisodeNumber => self.tv_episode = Some(BigEndian::read_u32(data)),
            KnownBox::Description => self.description = text(data),
            KnownBox::LongDescription => self.long_description = text(data),
            KnownBox::SeriesDescription => self.series_description = text(data),
            KnownBox::Encoder => self.encoder = text(data),
            KnownBox::MediaKind => self.media_kind = Some(data[0]),
            // any width, only the low byte carries the value
            KnownBox::HdVideo => self.hd_video = data.last().copied(),
            KnownBox::CountryId => self.country_id = Some(BigEndian::read_u32(data)),
            KnownBox::ContentId => self.content_id = Some(BigEndian::read_u32(data)),
            KnownBox::ArtistId => self.artist_id = Some(BigEndian::read_u32(data)),
            KnownBox::PlaylistId => self.playlist_id = Some(BigEndian::read_u64(data)),
            KnownBox::CoverArt => self.cover_art = Some(data.to_vec()),
            _ => log::debug!("ignoring metadata item {typ}"),
        }
        Ok(())
    }

    /// Collects the metadata of `source`, walking into every item atom with a nested visitor
    /// that picks up its `data` child.
    pub fn read<S: Source>(&mut self, source: S) -> Result<()> {
        walk(source, |_, item| {
            let typ = match item.typ() {
                Some(t) if KnownBox::from(t).is_itunes_metadata_container() => t,
                _ => return Ok(()),
            };
            item.walk(|_, a| {
                if a.is(b"data") {
                    let data = read_payload(a)?;
                    self.set(typ, value(typ, &data)?)?;
                }
                Ok(())
            })
        })
    }

    /// Same as [`ITunesMetadata::read`], but visits every `data` atom in a single walk and
    /// looks up which item it belongs to in its ancestor chain.
    pub fn read_uplooking<S: Source>(&mut self, source: S) -> Result<()> {
        walk(source, |ancestors, a| {
            if !a.is(b"data") {
                return Ok(());
            }
            match ancestors.last() {
                Some(parent) => {
                    let data = read_payload(a)?;
                    self.set(parent.typ, value(parent.typ, &data)?)
                }
                None => Ok(()),
            }
        })
    }

    /// Reads `source` into a fresh record.
    pub fn from_source<S: Source>(source: S) -> Result<Self> {
        let mut meta = ITunesMetadata::default();
        meta.read(source)?;
        Ok(meta)
    }
}

fn read_payload<R: Read + ?Sized>(a: &mut R) -> Result<Vec<u8>> {
    let mut data = Vec::new();
    a.read_to_end(&mut data)?;
    Ok(data)
}

// Strips the type/locale prefix of a `data` payload.
fn value(typ: FourCC, data: &[u8]) -> Result<&[u8]> {
    data.get(DATA_SUBHEADER_SIZE..).ok_or(ParseError::MetadataSize {
        typ,
        expected: DATA_SUBHEADER_SIZE,
        actual: data.len(),
    })
}

/// Streams the first cover image of `source` into `wr`. `data` atoms too short to hold the
/// type/locale prefix are passed over.
///
/// Returns the number of bytes copied.
///
/// Nothing is buffered: if reading fails halfway, `wr` has already received a prefix of the
/// image.
pub fn copy_cover<S: Source, W: Write + ?Sized>(source: S, wr: &mut W) -> Result<u64> {
    let mut copied = None;
    walk(source, |_, covr| {
        if !covr.is(b"covr") || copied.is_some() {
            return Ok(());
        }
        covr.walk(|_, a| {
            if !a.is(b"data") || copied.is_some() {
                return Ok(());
            }
            if a.remaining() < DATA_SUBHEADER_SIZE as u64 {
                log::debug!("skipping {} byte cover data atom at {}", a.size(), a.start());
                return Ok(());
            }
            let mut sub = [0u8; DATA_SUBHEADER_SIZE];
            a.must_read(&mut sub)?;
            copied = Some(io::copy(a, &mut *wr)?);
            Ok(())
        })
    })?;
    Ok(copied.unwrap_or(0))
}
