mod common;

use common::{atom, concat, item, meta};
use mp4walk::{FourCC, Forward, ITunesMetadata, ParseError, Seekable, copy_cover};
use std::io::Cursor;

/// `ftyp` followed by `moov.udta.meta.ilst`, with `meta` ending the file.
fn tagged_file(items: &[Vec<u8>]) -> Vec<u8> {
    let ilst = atom(b"ilst", &concat(items));
    let meta = meta(&concat(&[atom(b"hdlr", &[0u8; 25]), ilst]));
    let moov = atom(b"moov", &concat(&[atom(b"mvhd", &[0u8; 100]), atom(b"udta", &meta)]));
    concat(&[atom(b"ftyp", b"M4A \0\0\0\0"), moov])
}

fn track_number(track: u16, total: u16) -> Vec<u8> {
    concat(&[
        0u16.to_be_bytes().to_vec(),
        track.to_be_bytes().to_vec(),
        total.to_be_bytes().to_vec(),
        0u16.to_be_bytes().to_vec(),
    ])
}

#[test]
fn name_from_bare_item_list() {
    let data = atom(b"ilst", &item(b"\xa9nam", b"Song Title"));
    let meta = ITunesMetadata::from_source(Seekable::new(Cursor::new(data))).expect("read failed");
    assert_eq!(meta.name.as_deref(), Some("Song Title"));
    assert_eq!(meta.artist, None);
}

#[test]
fn track_number_and_total() {
    let data = atom(b"ilst", &item(b"trkn", &track_number(5, 12)));
    let meta = ITunesMetadata::from_source(Forward(Cursor::new(data))).expect("read failed");
    assert_eq!(meta.track, Some(5));
    assert_eq!(meta.tracks, Some(12));
}

#[test]
fn disk_number_and_total() {
    let data = atom(b"ilst", &item(b"disk", &[0, 0, 0, 2, 0, 3]));
    let meta = ITunesMetadata::from_source(Seekable::new(Cursor::new(data))).expect("read failed");
    assert_eq!(meta.disk, Some(2));
    assert_eq!(meta.disks, Some(3));
}

#[test]
fn full_tree_with_meta_at_end_of_file() {
    let data = tagged_file(&[
        item(b"\xa9nam", b"Pilot"),
        item(b"\xa9ART", b"Someone"),
        item(b"aART", b"Various"),
        item(b"\xa9alb", b"Season One"),
        item(b"gnre", &[0, 18]),
        item(b"\xa9day", b"2009-04-01"),
        item(b"tvsh", b"The Show"),
        item(b"tven", b"S01E01"),
        item(b"tvsn", &1u32.to_be_bytes()),
        item(b"tves", &1u32.to_be_bytes()),
        item(b"desc", b"Short"),
        item(b"ldes", b"Longer description"),
        item(b"\xa9too", b"Lavf58"),
        item(b"stik", &[10]),
        item(b"hdvd", &[2]),
        item(b"cnID", &123_456u32.to_be_bytes()),
        item(b"plID", &9_876_543_210u64.to_be_bytes()),
    ]);

    for forward in [false, true] {
        let meta = if forward {
            ITunesMetadata::from_source(Forward(Cursor::new(data.clone())))
        } else {
            ITunesMetadata::from_source(Seekable::new(Cursor::new(data.clone())))
        }
        .expect("read failed");

        assert_eq!(meta.name.as_deref(), Some("Pilot"));
        assert_eq!(meta.artist.as_deref(), Some("Someone"));
        assert_eq!(meta.album_artist.as_deref(), Some("Various"));
        assert_eq!(meta.album.as_deref(), Some("Season One"));
        assert_eq!(meta.genre, Some(18));
        assert_eq!(meta.release_date.as_deref(), Some("2009-04-01"));
        assert_eq!(meta.tv_show.as_deref(), Some("The Show"));
        assert_eq!(meta.tv_episode_id.as_deref(), Some("S01E01"));
        assert_eq!(meta.tv_season, Some(1));
        assert_eq!(meta.tv_episode, Some(1));
        assert_eq!(meta.description.as_deref(), Some("Short"));
        assert_eq!(meta.long_description.as_deref(), Some("Longer description"));
        assert_eq!(meta.encoder.as_deref(), Some("Lavf58"));
        assert_eq!(meta.media_kind, Some(10));
        assert_eq!(meta.hd_video, Some(2));
        assert_eq!(meta.content_id, Some(123_456));
        assert_eq!(meta.playlist_id, Some(9_876_543_210));
        assert_eq!(meta.series_description, None);
    }
}

#[test]
fn uplooking_matches_nested_read() {
    let data = tagged_file(&[
        item(b"\xa9nam", b"Song Title"),
        item(b"trkn", &track_number(3, 9)),
        item(b"\xa9gen", b"Ambient"),
        item(b"atID", &42u32.to_be_bytes()),
    ]);

    let mut nested = ITunesMetadata::default();
    nested.read(Seekable::new(Cursor::new(data.clone()))).expect("read failed");

    let mut uplooking = ITunesMetadata::default();
    uplooking.read_uplooking(Forward(Cursor::new(data))).expect("uplooking read failed");

    assert_eq!(nested, uplooking);
    assert_eq!(uplooking.custom_genre.as_deref(), Some("Ambient"));
    assert_eq!(uplooking.artist_id, Some(42));
}

#[test]
fn wrong_sized_genre_is_rejected() {
    let data = atom(b"ilst", &item(b"gnre", &[0, 1, 2]));
    let err = ITunesMetadata::from_source(Seekable::new(Cursor::new(data))).unwrap_err();
    match err {
        ParseError::MetadataSize { typ, expected, actual } => {
            assert_eq!(typ, FourCC(*b"gnre"));
            assert_eq!(expected, 2);
            assert_eq!(actual, 3);
        }
        other => panic!("unexpected error {other:?}"),
    }
}

#[test]
fn data_atom_without_subheader_is_rejected() {
    let data = atom(b"ilst", &atom(b"\xa9nam", &atom(b"data", &[0, 0, 0, 1])));
    let err = ITunesMetadata::from_source(Seekable::new(Cursor::new(data))).unwrap_err();
    assert!(matches!(err, ParseError::MetadataSize { expected: 8, actual: 4, .. }));
}

#[test]
fn set_ignores_unknown_items() {
    let mut meta = ITunesMetadata::default();
    meta.set(FourCC(*b"xxxx"), b"whatever").expect("unknown items are not errors");
    assert_eq!(meta, ITunesMetadata::default());
}

#[test]
fn json_omits_missing_fields_and_cover() {
    let mut meta = ITunesMetadata::default();
    meta.set(FourCC(*b"tvsh"), b"The Show").unwrap();
    meta.set(FourCC(*b"covr"), &[0xFF, 0xD8]).unwrap();

    let json = serde_json::to_value(&meta).unwrap();
    assert_eq!(json, serde_json::json!({ "tv_show": "The Show" }));
    assert_eq!(meta.cover_art.as_deref(), Some(&[0xFF, 0xD8][..]));
}

fn cover(images: &[&[u8]]) -> Vec<u8> {
    let datas: Vec<Vec<u8>> = images
        .iter()
        .map(|img| {
            let mut payload = vec![0, 0, 0, 13, 0, 0, 0, 0];
            payload.extend_from_slice(img);
            atom(b"data", &payload)
        })
        .collect();
    atom(b"covr", &concat(&datas))
}

#[test]
fn copy_cover_writes_only_the_first_image() {
    let first: Vec<u8> = (0..5000u32).map(|i| (i % 256) as u8).collect();
    let second = vec![0xEE; 300];
    let data = tagged_file(&[item(b"\xa9nam", b"x"), cover(&[first.as_slice(), second.as_slice()])]);

    for forward in [false, true] {
        let mut out = Vec::new();
        let n = if forward {
            copy_cover(Forward(Cursor::new(data.clone())), &mut out)
        } else {
            copy_cover(Seekable::new(Cursor::new(data.clone())), &mut out)
        }
        .expect("copy failed");
        assert_eq!(n, first.len() as u64);
        assert_eq!(out, first);
    }
}

#[test]
fn copy_cover_without_cover_writes_nothing() {
    let data = tagged_file(&[item(b"\xa9nam", b"x")]);
    let mut out = Vec::new();
    let n = copy_cover(Seekable::new(Cursor::new(data)), &mut out).expect("copy failed");
    assert_eq!(n, 0);
    assert!(out.is_empty());
}

#[test]
fn copy_cover_passes_over_empty_data_atom() {
    let image = b"\x89PNG image bytes".to_vec();
    let mut payload = vec![0, 0, 0, 14, 0, 0, 0, 0];
    payload.extend_from_slice(&image);
    let covr = atom(b"covr", &concat(&[atom(b"data", &[]), atom(b"data", &payload)]));
    let data = atom(b"ilst", &covr);

    let mut out = Vec::new();
    let n = copy_cover(Seekable::new(Cursor::new(data)), &mut out).expect("copy failed");
    assert_eq!(n, image.len() as u64);
    assert_eq!(out, image);
}

#[test]
fn hd_video_flag_accepts_any_width() {
    let mut meta = ITunesMetadata::default();
    meta.set(FourCC::from(b"hdvd"), &[0, 0, 0, 2]).expect("hdvd is not size checked");
    assert_eq!(meta.hd_video, Some(2));

    meta.set(FourCC::from(b"hdvd"), &[1]).unwrap();
    assert_eq!(meta.hd_video, Some(1));
}
