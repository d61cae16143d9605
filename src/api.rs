use crate::{
    atom::walk,
    boxes::{FourCC, type_path},
    known_boxes::KnownBox,
    parser::Result,
    util::Source,
};
use serde::Serialize;
use std::fmt;

/// A JSON-serializable record of one visited atom.
///
/// The `Display` form is the one-line dump format: `[moov trak] tkhd (start + size)`.
#[derive(Debug, Clone, Serialize)]
pub struct DumpEntry {
    /// Types of the enclosing atoms, outermost first
    pub path: Vec<FourCC>,
    /// Four-character type code
    pub typ: FourCC,
    /// Absolute byte offset of the atom header
    pub offset: u64,
    /// Total size including header and payload
    pub size: u64,
    /// Raw header bytes, hex encoded
    pub header: String,
    /// Whether the walker descends into this atom
    pub container: bool,
    /// Human-readable type name (e.g. "Movie Header Box")
    pub full_name: String,
}

impl fmt::Display for DumpEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let path: Vec<String> = self.path.iter().map(FourCC::to_string).collect();
        write!(f, "[{}] {} ({} + {})", path.join(" "), self.typ, self.offset, self.size)
    }
}

/// Walks `source` and records every atom visited, in traversal order.
///
/// Payloads are never read, so this works as well on a forward-only stream as on a file.
///
/// ```no_run
/// use mp4walk::{Seekable, dump};
/// use std::fs::File;
///
/// let entries = dump(Seekable::new(File::open("video.mp4")?))?;
/// for e in &entries {
///     println!("{e}");
/// }
/// # Ok::<(), anyhow::Error>(())
/// ```
pub fn dump<S: Source>(source: S) -> Result<Vec<DumpEntry>> {
    let mut entries = Vec::new();
    walk(source, |ancestors, a| {
        if let Some(typ) = a.typ() {
            entries.push(DumpEntry {
                path: type_path(ancestors),
                typ,
                offset: a.start(),
                size: a.size(),
                header: hex::encode(a.raw_header()),
                container: a.container,
                full_name: KnownBox::from(typ).full_name().to_string(),
            });
        }
        Ok(())
    })?;
    Ok(entries)
}
