use crate::boxes::{AtomHeader, FourCC};
use crate::parser::{MINIMAL_HEADER_SIZE, ParseError, Result, read_atom_header};
use crate::util::Source;
use std::io::{self, Read};
use std::rc::Rc;

/// Size of a pseudo-atom whose end cannot be measured; read until the stream runs dry.
pub const UNBOUNDED: u64 = u64::MAX;

/// Callback applied to every atom of a traversal.
///
/// It receives the ancestor chain (outermost first, the root pseudo-atom excluded) and the atom
/// itself, positioned right after its header. It may:
///
/// 1. return `Ok(())` to continue the traversal,
/// 2. return an error, aborting the whole traversal,
/// 3. read the atom's payload through its [`Read`] implementation,
/// 4. set [`Atom::skip`] or override [`Atom::container`],
/// 5. start a nested walk on the atom, possibly with a different visitor.
pub type Visitor<'v, S> = dyn FnMut(&[AtomHeader], &mut Atom<'_, S>) -> Result<()> + 'v;

/// A node of the atom hierarchy, bound to the traversal's stream.
///
/// An atom only lives for the duration of its own visit; the stream handle is borrowed from the
/// parent, so while a child is alive nothing else can move the cursor.
pub struct Atom<'r, S: ?Sized> {
    start: u64,
    pub(crate) size: u64,
    pub(crate) raw_header: Vec<u8>,
    pub(crate) typ: Option<FourCC>,
    /// Has atoms within. Initially taken from [`crate::KnownBox::is_container`].
    pub container: bool,
    /// Discard the rest of this atom instead of descending into it.
    pub skip: bool,
    consumed: u64, // bytes of this atom read so far, header included
    pub(crate) open_ended: bool,
    ancestors: Rc<[AtomHeader]>,
    reader: &'r mut S,
}

impl<'r, S: Source + ?Sized> Atom<'r, S> {
    /// An atom whose header is about to be read. `size` is a provisional read bound.
    pub(crate) fn pending(
        reader: &'r mut S,
        start: u64,
        size: u64,
        ancestors: Rc<[AtomHeader]>,
    ) -> Self {
        Atom {
            start,
            size,
            raw_header: Vec::new(),
            typ: None,
            container: false,
            skip: false,
            consumed: 0,
            open_ended: false,
            ancestors,
            reader,
        }
    }

    /// Top-level rest-of-stream pseudo-atom.
    ///
    /// Its size is measured when the source can seek, otherwise it is [`UNBOUNDED`].
    pub fn root(reader: &'r mut S) -> Result<Self> {
        let (start, len) = reader.bounds()?;
        let mut root = Atom::pending(reader, start, len.unwrap_or(UNBOUNDED), Rc::from(Vec::new()));
        root.container = true;
        Ok(root)
    }

    pub fn start(&self) -> u64 {
        self.start
    }

    /// Outer size, header included.
    pub fn size(&self) -> u64 {
        self.size
    }

    /// `None` only for the root pseudo-atom.
    pub fn typ(&self) -> Option<FourCC> {
        self.typ
    }

    pub fn is(&self, code: &[u8; 4]) -> bool {
        self.typ == Some(FourCC::from(code))
    }

    /// Header bytes exactly as read.
    pub fn raw_header(&self) -> &[u8] {
        &self.raw_header
    }

    pub fn header_size(&self) -> u64 {
        self.raw_header.len() as u64
    }

    pub fn consumed(&self) -> u64 {
        self.consumed
    }

    pub fn remaining(&self) -> u64 {
        self.size.saturating_sub(self.consumed)
    }

    /// Enclosing atoms, outermost first.
    pub fn ancestors(&self) -> &[AtomHeader] {
        &self.ancestors
    }

    /// Snapshot of this atom for ancestor chains. `None` for the root.
    pub fn header(&self) -> Option<AtomHeader> {
        self.typ.map(|typ| AtomHeader {
            start: self.start,
            size: self.size,
            typ,
            header_size: self.header_size(),
            container: self.container,
        })
    }

    /// Reads exactly `buf.len()` bytes of this atom.
    ///
    /// Fails with [`ParseError::EndOfStream`] when no byte at all was available and with
    /// [`ParseError::Truncated`] when only part of the buffer could be filled.
    pub fn must_read(&mut self, buf: &mut [u8]) -> Result<()> {
        let mut filled = 0;
        while filled < buf.len() {
            match self.read(&mut buf[filled..]) {
                Ok(0) => break,
                Ok(n) => filled += n,
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(e.into()),
            }
        }
        match filled {
            n if n == buf.len() => Ok(()),
            0 => Err(ParseError::EndOfStream),
            actual => Err(ParseError::Truncated { expected: buf.len(), actual }),
        }
    }

    /// Recursively traverses the atoms within this one, pre-order, applying `visitor` to each.
    ///
    /// Leaves are marked skipped and yield nothing. The sibling loop runs while the declared
    /// extent has bytes left; each child's size is charged to this atom before the visitor sees
    /// the child, and whatever the visitor leaves unread of a skipped child is discarded, so the
    /// next header is always read from the right place. A child claiming more than what is left
    /// of its (non-root) parent is clamped to the parent's end.
    pub fn walk<F>(&mut self, mut visitor: F) -> Result<()>
    where
        F: FnMut(&[AtomHeader], &mut Atom<'_, S>) -> Result<()>,
    {
        self.walk_with(&mut visitor)
    }

    fn walk_with(&mut self, visitor: &mut Visitor<'_, S>) -> Result<()> {
        if !self.container {
            self.skip = true;
        }
        if self.skip {
            return Ok(());
        }

        let chain: Rc<[AtomHeader]> = match self.header() {
            Some(me) => self.ancestors.iter().cloned().chain(Some(me)).collect(),
            None => Rc::clone(&self.ancestors),
        };

        while self.consumed < self.size {
            let extent = (self.size != UNBOUNDED).then(|| self.size - self.consumed);
            let next = read_atom_header(
                &mut *self.reader,
                self.start + self.consumed,
                extent,
                Rc::clone(&chain),
            );
            let mut child = match next {
                Ok(child) => child,
                // only a stream that may end anywhere ends cleanly between two headers
                Err(ParseError::EndOfStream) if self.typ.is_none() || self.size == UNBOUNDED => {
                    break;
                }
                Err(ParseError::EndOfStream) => {
                    return Err(ParseError::Truncated {
                        expected: MINIMAL_HEADER_SIZE as usize,
                        actual: 0,
                    });
                }
                Err(e) => return Err(e),
            };

            // Top-level atoms keep their declared size, the stream itself bounds them.
            let bound = extent.filter(|_| self.typ.is_some());
            if let Some(left) = bound.filter(|&left| child.size > left) {
                log::warn!(
                    "{} at {} claims {} bytes but only {} remain in its parent, clamping",
                    child.typ.map(|t| t.to_string()).unwrap_or_default(),
                    child.start,
                    child.size,
                    left,
                );
                child.size = left;
            }
            self.consumed = self.consumed.saturating_add(child.size).min(self.size);

            log::debug!(
                "visit {:?} {} at {} size {}",
                crate::boxes::type_path(&chain),
                child.typ.map(|t| t.to_string()).unwrap_or_default(),
                child.start,
                child.size
            );

            // The stream sits right after the child's header. The visitor may read from it,
            // walk it, or flip its skip/container flags.
            visitor(&chain[..], &mut child)?;

            // The stream is somewhere after the child's header. For a container it should be
            // on a grandchild boundary, if the visitor read anything at all.
            child.walk_with(visitor)?;

            if child.skip {
                child.discard_rest()?;
            }
        }

        Ok(())
    }

    // Moves the stream to this atom's end.
    fn discard_rest(&mut self) -> Result<()> {
        if self.open_ended {
            let n = io::copy(self, &mut io::sink())?;
            log::trace!("drained {n} bytes to end of stream");
            return Ok(());
        }
        let count = self.remaining();
        if count > 0 {
            log::trace!("skipping {count} bytes");
            self.reader.skip(count)?;
            self.consumed = self.size;
        }
        Ok(())
    }
}

/// Reads part of the atom, but no further than its declared end.
impl<S: Read + ?Sized> Read for Atom<'_, S> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let remain = self.size.saturating_sub(self.consumed);
        if remain == 0 {
            return Ok(0);
        }
        let len = buf.len().min(usize::try_from(remain).unwrap_or(usize::MAX));
        let n = self.reader.read(&mut buf[..len])?;
        self.consumed += n as u64;
        Ok(n)
    }
}

/// Recursively applies `visitor` to the atoms of `source`.
///
/// A stream that ends exactly where the next top-level header could begin finishes the
/// traversal successfully. Running dry inside an atom, and every visitor error, is returned
/// as is.
///
/// ```no_run
/// use mp4walk::{Seekable, type_path, walk};
/// use std::fs::File;
///
/// let file = File::open("song.m4a")?;
/// walk(Seekable::new(file), |ancestors, atom| {
///     println!("{:?} {:?} ({} + {})", type_path(ancestors), atom.typ(), atom.start(), atom.size());
///     Ok(())
/// })?;
/// # Ok::<(), anyhow::Error>(())
/// ```
pub fn walk<S, F>(mut source: S, visitor: F) -> Result<()>
where
    S: Source,
    F: FnMut(&[AtomHeader], &mut Atom<'_, S>) -> Result<()>,
{
    let mut root = Atom::root(&mut source)?;
    root.walk(visitor)
}
