use crate::boxes::FourCC;

/// Typed view over the atoms the walker and extractors care about.
///
/// Anything not in this list becomes `KnownBox::Unknown(fourcc)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KnownBox {
    // File-level / top-level
    Ftyp,
    Moov,
    Mdat,
    Free,
    Skip,
    Wide,

    // moov / trak
    Mvhd,
    Trak,
    Tkhd,
    Mdia,
    Udta,

    // udta / meta
    Meta,
    Hdlr,
    Ilst,
    Data,

    // iTunes metadata items (each wraps a `data` atom)
    Name,
    Artist,
    AlbumArtist,
    Album,
    Genre,
    CustomGenre,
    ReleaseDate,
    TrackNumber,
    DiskNumber,
    TvShow,
    TvEpisodeId,
    TvSeason,
    TvEpisodeNumber,
    Description,
    LongDescription,
    SeriesDescription,
    Encoder,
    MediaKind,
    HdVideo,
    CountryId,
    ContentId,
    ArtistId,
    PlaylistId,
    CoverArt,

    // Anything else
    Unknown(FourCC),
}

impl From<FourCC> for KnownBox {
    fn from(cc: FourCC) -> Self {
        match &cc.0 {
            b"ftyp" => KnownBox::Ftyp,
            b"moov" => KnownBox::Moov,
            b"mdat" => KnownBox::Mdat,
            b"free" => KnownBox::Free,
            b"skip" => KnownBox::Skip,
            b"wide" => KnownBox::Wide,

            b"mvhd" => KnownBox::Mvhd,
            b"trak" => KnownBox::Trak,
            b"tkhd" => KnownBox::Tkhd,
            b"mdia" => KnownBox::Mdia,
            b"udta" => KnownBox::Udta,

            b"meta" => KnownBox::Meta,
            b"hdlr" => KnownBox::Hdlr,
            b"ilst" => KnownBox::Ilst,
            b"data" => KnownBox::Data,

            b"\xa9nam" => KnownBox::Name,
            b"\xa9ART" => KnownBox::Artist,
            b"aART" => KnownBox::AlbumArtist,
            b"\xa9alb" => KnownBox::Album,
            b"gnre" => KnownBox::Genre,
            b"\xa9gen" => KnownBox::CustomGenre,
            b"\xa9day" => KnownBox::ReleaseDate,
            b"trkn" => KnownBox::TrackNumber,
            b"disk" => KnownBox::DiskNumber,
            b"tvsh" => KnownBox::TvShow,
            b"tven" => KnownBox::TvEpisodeId,
            b"tvsn" => KnownBox::TvSeason,
            b"tves" => KnownBox::TvEpisodeNumber,
            b"desc" => KnownBox::Description,
            b"ldes" => KnownBox::LongDescription,
            b"sdes" => KnownBox::SeriesDescription,
            b"\xa9too" => KnownBox::Encoder,
            b"stik" => KnownBox::MediaKind,
            b"hdvd" => KnownBox::HdVideo,
            b"sfID" => KnownBox::CountryId,
            b"cnID" => KnownBox::ContentId,
            b"atID" => KnownBox::ArtistId,
            b"plID" => KnownBox::PlaylistId,
            b"covr" => KnownBox::CoverArt,

            _ => KnownBox::Unknown(cc),
        }
    }
}

impl KnownBox {
    /// Does this box *contain* child boxes (container semantics)?
    ///
    /// Only the atoms on the path to the iTunes item list are descended into by default.
    /// Everything else, `mdia` included, is treated as a leaf unless a visitor overrides it.
    pub fn is_container(&self) -> bool {
        matches!(
            self,
            KnownBox::Moov | KnownBox::Trak | KnownBox::Udta | KnownBox::Meta | KnownBox::Ilst
        ) || self.is_itunes_metadata_container()
    }

    /// Is this an iTunes item atom, i.e. a container with a `data` atom inside?
    pub fn is_itunes_metadata_container(&self) -> bool {
        matches!(
            self,
            KnownBox::Name
                | KnownBox::Artist
                | KnownBox::AlbumArtist
                | KnownBox::Album
                | KnownBox::Genre
                | KnownBox::CustomGenre
                | KnownBox::ReleaseDate
                | KnownBox::TrackNumber
                | KnownBox::DiskNumber
                | KnownBox::TvShow
                | KnownBox::TvEpisodeId
                | KnownBox::TvSeason
                | KnownBox::TvEpisodeNumber
                | KnownBox::Description
                | KnownBox::LongDescription
                | KnownBox::SeriesDescription
                | KnownBox::Encoder
                | KnownBox::MediaKind
                | KnownBox::HdVideo
                | KnownBox::CountryId
                | KnownBox::ContentId
                | KnownBox::ArtistId
                | KnownBox::PlaylistId
                | KnownBox::CoverArt
        )
    }

    pub fn full_name(&self) -> &'static str {
        match self {
            KnownBox::Ftyp => "File Type Box",
            KnownBox::Moov => "Movie Box",
            KnownBox::Mdat => "Media Data Box",
            KnownBox::Free => "Free Space Box",
            KnownBox::Skip => "Skip Box",
            KnownBox::Wide => "Wide Box",
            KnownBox::Mvhd => "Movie Header Box",
            KnownBox::Trak => "Track Box",
            KnownBox::Tkhd => "Track Header Box",
            KnownBox::Mdia => "Media Box",
            KnownBox::Udta => "User Data Box",
            KnownBox::Meta => "Meta Box",
            KnownBox::Hdlr => "Handler Reference Box",
            KnownBox::Ilst => "Item List Box",
            KnownBox::Data => "Data Box",
            KnownBox::Name => "Name",
            KnownBox::Artist => "Artist",
            KnownBox::AlbumArtist => "Album Artist",
            KnownBox::Album => "Album",
            KnownBox::Genre => "Genre",
            KnownBox::CustomGenre => "Custom Genre",
            KnownBox::ReleaseDate => "Release Date",
            KnownBox::TrackNumber => "Track Number",
            KnownBox::DiskNumber => "Disk Number",
            KnownBox::TvShow => "TV Show",
            KnownBox::TvEpisodeId => "TV Episode ID",
            KnownBox::TvSeason => "TV Season",
            KnownBox::TvEpisodeNumber => "TV Episode Number",
            KnownBox::Description => "Description",
            KnownBox::LongDescription => "Long Description",
            KnownBox::SeriesDescription => "Series Description",
            KnownBox::Encoder => "Encoder",
            KnownBox::MediaKind => "Media Kind",
            KnownBox::HdVideo => "HD Video",
            KnownBox::CountryId => "iTunes Country ID",
            KnownBox::ContentId => "iTunes Content ID",
            KnownBox::ArtistId => "iTunes Artist ID",
            KnownBox::PlaylistId => "iTunes Playlist ID",
            KnownBox::CoverArt => "Cover Art",
            KnownBox::Unknown(_) => "Unknown Box",
        }
    }
}
