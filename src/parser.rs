use crate::atom::{Atom, UNBOUNDED};
use crate::boxes::{AtomHeader, FourCC};
use crate::known_boxes::KnownBox;
use crate::util::Source;
use byteorder::{BigEndian, ByteOrder};
use std::rc::Rc;

#[derive(thiserror::Error, Debug)]
pub enum ParseError {
    #[error("io: {0}")]
    Io(#[from] std::io::Error),
    /// Nothing at all was left where the next atom header was expected.
    #[error("end of stream")]
    EndOfStream,
    #[error("truncated: expected {expected} bytes, got {actual}")]
    Truncated { expected: usize, actual: usize },
    #[error("invalid size {size} for '{typ}' atom with a {header_len} byte header")]
    InvalidSize { typ: FourCC, size: u64, header_len: u64 },
    #[error("metadata {typ} wrong size: expected {expected} bytes, got {actual}")]
    MetadataSize { typ: FourCC, expected: usize, actual: usize },
}

pub type Result<T> = std::result::Result<T, ParseError>;

pub const MINIMAL_HEADER_SIZE: u64 = 8;
pub const EXTENDED_SIZE_SIZE: u64 = 8;
pub const META_SUBHEADER_SIZE: u64 = 4;

/// Decodes the next atom header from `reader` and binds the resulting atom to it.
///
/// `start` is the offset the header begins at and `extent` the bytes left in the parent,
/// `None` when the parent is unbounded. The header is never read past `extent`. A size field of
/// 0 stretches the atom over the whole extent; a size field of 1 is followed by a 64-bit size.
/// `meta` carries 4 extra version/flags bytes which are read here and added to its size.
///
/// Returns [`ParseError::EndOfStream`] when the stream ends right where the header should begin.
/// Running dry anywhere later in the header, or hitting the end of the parent inside it, is
/// [`ParseError::Truncated`].
pub fn read_atom_header<'r, S: Source + ?Sized>(
    reader: &'r mut S,
    start: u64,
    extent: Option<u64>,
    ancestors: Rc<[AtomHeader]>,
) -> Result<Atom<'r, S>> {
    // the header has to fit in what is left of the parent
    let limit = extent.unwrap_or(UNBOUNDED);
    let mut atom = Atom::pending(reader, start, MINIMAL_HEADER_SIZE.min(limit), ancestors);

    let mut base = [0u8; MINIMAL_HEADER_SIZE as usize];
    atom.must_read(&mut base)?;
    atom.raw_header.extend_from_slice(&base);

    let typ = FourCC([base[4], base[5], base[6], base[7]]);
    atom.typ = Some(typ);
    atom.container = KnownBox::from(typ).is_container();

    let mut size = u64::from(BigEndian::read_u32(&base[0..4]));
    let mut header_len = MINIMAL_HEADER_SIZE;
    if size == 1 {
        atom.size = (MINIMAL_HEADER_SIZE + EXTENDED_SIZE_SIZE).min(limit);
        let mut ext = [0u8; EXTENDED_SIZE_SIZE as usize];
        mid_header(atom.must_read(&mut ext), ext.len())?;
        atom.raw_header.extend_from_slice(&ext);
        size = BigEndian::read_u64(&ext);
        header_len += EXTENDED_SIZE_SIZE;
    }

    if size == 0 {
        match extent {
            Some(remaining) => size = remaining,
            None => {
                size = UNBOUNDED;
                atom.open_ended = true;
            }
        }
    }
    if size < header_len {
        return Err(ParseError::InvalidSize { typ, size, header_len });
    }

    // containers with an additional implicit header
    if KnownBox::from(typ) == KnownBox::Meta {
        atom.size = (header_len + META_SUBHEADER_SIZE).min(limit);
        let mut sub = [0u8; META_SUBHEADER_SIZE as usize];
        mid_header(atom.must_read(&mut sub), sub.len())?;
        atom.raw_header.extend_from_slice(&sub);
        size = size.saturating_add(META_SUBHEADER_SIZE);
    }
    atom.size = size;

    Ok(atom)
}

// Once the first header byte is in, running dry is a truncation, not a clean end.
fn mid_header(res: Result<()>, expected: usize) -> Result<()> {
    match res {
        Err(ParseError::EndOfStream) => Err(ParseError::Truncated { expected, actual: 0 }),
        other => other,
    }
}
