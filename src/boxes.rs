use serde::{Serialize, Serializer};
use std::fmt;

/// A four byte atom type code.
///
/// Codes are not guaranteed to be ASCII: iTunes tag atoms start with `0xA9` (©).
#[derive(Copy, Clone, Eq, PartialEq, Hash)]
pub struct FourCC(pub [u8; 4]);

impl FourCC {
    pub fn from_str(s: &str) -> Option<Self> {
        let b = s.as_bytes();
        if b.len() == 4 {
            Some(FourCC([b[0], b[1], b[2], b[3]]))
        } else {
            None
        }
    }

    /// Renders printable ASCII as is, `0xA9` as `©` and anything else as `.`.
    pub fn as_str_lossy(&self) -> String {
        self.0
            .iter()
            .map(|&c| match c {
                32..=126 => c as char,
                0xA9 => '©',
                _ => '.',
            })
            .collect()
    }
}

impl fmt::Debug for FourCC {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str_lossy())
    }
}

impl fmt::Display for FourCC {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str_lossy())
    }
}

impl From<&[u8; 4]> for FourCC {
    fn from(code: &[u8; 4]) -> Self {
        FourCC(*code)
    }
}

impl Serialize for FourCC {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.as_str_lossy())
    }
}

/// Immutable snapshot of an atom, as reported in ancestor chains.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AtomHeader {
    pub start: u64,       // stream offset of the header
    pub size: u64,        // outer size, header included
    pub typ: FourCC,
    pub header_size: u64, // 8, 16, plus 4 for `meta`
    pub container: bool,
}

/// Maps an ancestor chain to its type codes, outermost first.
pub fn type_path(ancestors: &[AtomHeader]) -> Vec<FourCC> {
    ancestors.iter().map(|a| a.typ).collect()
}
