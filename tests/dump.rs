mod common;

use common::{atom, concat};
use mp4walk::{FourCC, Seekable, dump};
use std::io::Cursor;

fn sample() -> Vec<u8> {
    let moov = atom(b"moov", &atom(b"trak", &atom(b"tkhd", &[0u8; 8])));
    concat(&[atom(b"ftyp", b"isom"), moov])
}

#[test]
fn dump_lists_every_atom_in_order() {
    let entries = dump(Seekable::new(Cursor::new(sample()))).expect("dump failed");
    let lines: Vec<String> = entries.iter().map(|e| e.to_string()).collect();
    assert_eq!(
        lines,
        vec![
            "[] ftyp (0 + 12)",
            "[] moov (12 + 32)",
            "[moov] trak (20 + 24)",
            "[moov trak] tkhd (28 + 16)",
        ]
    );
}

#[test]
fn dump_entry_details() {
    let entries = dump(Seekable::new(Cursor::new(sample()))).expect("dump failed");
    let tkhd = &entries[3];
    assert_eq!(tkhd.path, vec![FourCC(*b"moov"), FourCC(*b"trak")]);
    assert_eq!(tkhd.typ, FourCC(*b"tkhd"));
    assert_eq!(tkhd.header, "00000010746b6864");
    assert!(!tkhd.container);
    assert_eq!(tkhd.full_name, "Track Header Box");
    assert!(entries[1].container);
}

#[test]
fn dump_serializes_paths_as_strings() {
    let entries = dump(Seekable::new(Cursor::new(sample()))).expect("dump failed");
    let json = serde_json::to_value(&entries[2]).unwrap();
    assert_eq!(json["path"], serde_json::json!(["moov"]));
    assert_eq!(json["typ"], "trak");
    assert_eq!(json["offset"], 20);
    assert_eq!(json["size"], 24);
    assert_eq!(json["header"], "000000187472616b");
}
