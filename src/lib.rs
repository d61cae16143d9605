pub mod api;
pub mod atom;
pub mod boxes;
pub mod headers;
pub mod itunes;
pub mod known_boxes;
pub mod parser;
pub mod util;

pub use api::{DumpEntry, dump};
pub use atom::{Atom, walk};
pub use boxes::{AtomHeader, FourCC, type_path};
pub use headers::{FixedFloat32, Mvhd, Tkhd};
pub use itunes::{ITunesMetadata, copy_cover};
pub use known_boxes::KnownBox;
pub use parser::{ParseError, Result, read_atom_header};
pub use util::{Forward, Seekable, Source};
