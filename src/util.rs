use std::io::{self, Read, Seek, SeekFrom};

/// Scratch buffer size for simulating a seek with reads.
pub const SKIP_BUFFER_LEN: usize = 1 << 16;

/// A byte stream the walker can traverse.
///
/// Every traversal owns exactly one source; atoms borrow it in turn, so only the atom currently
/// being visited can move the cursor.
pub trait Source: Read {
    /// Advances the stream by `count` bytes. `count == 0` is a no-op.
    fn skip(&mut self, count: u64) -> io::Result<()>;

    /// Current offset and, when it can be measured, the number of bytes left in the stream.
    fn bounds(&mut self) -> io::Result<(u64, Option<u64>)>;
}

impl<S: Source + ?Sized> Source for &mut S {
    fn skip(&mut self, count: u64) -> io::Result<()> {
        (**self).skip(count)
    }

    fn bounds(&mut self) -> io::Result<(u64, Option<u64>)> {
        (**self).bounds()
    }
}

/// A source with random access, e.g. a `File` or a `Cursor`.
///
/// Skips are relative seeks, checked against the stream's end so that a truncated file fails the
/// same way it would when read forward.
#[derive(Debug)]
pub struct Seekable<R> {
    inner: R,
    end: Option<u64>,
}

impl<R> Seekable<R> {
    pub fn new(inner: R) -> Self {
        Seekable { inner, end: None }
    }

    pub fn get_ref(&self) -> &R {
        &self.inner
    }

    pub fn into_inner(self) -> R {
        self.inner
    }
}

impl<R: Read> Read for Seekable<R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.inner.read(buf)
    }
}

impl<R: Read + Seek> Seekable<R> {
    fn end(&mut self) -> io::Result<u64> {
        if let Some(end) = self.end {
            return Ok(end);
        }
        let pos = self.inner.stream_position()?;
        let end = self.inner.seek(SeekFrom::End(0))?;
        self.inner.seek(SeekFrom::Start(pos))?;
        self.end = Some(end);
        Ok(end)
    }
}

impl<R: Read + Seek> Source for Seekable<R> {
    fn skip(&mut self, count: u64) -> io::Result<()> {
        if count == 0 {
            return Ok(());
        }
        let end = self.end()?;
        let pos = self.inner.stream_position()?;
        let target = pos.saturating_add(count);
        if target > end {
            self.inner.seek(SeekFrom::Start(end))?;
            return Err(io::Error::new(
                io::ErrorKind::UnexpectedEof,
                format!("stream ended with {} bytes left to skip", target - end),
            ));
        }
        self.inner.seek(SeekFrom::Start(target))?;
        Ok(())
    }

    fn bounds(&mut self) -> io::Result<(u64, Option<u64>)> {
        let pos = self.inner.stream_position()?;
        let end = self.end()?;
        Ok((pos, Some(end.saturating_sub(pos))))
    }
}

/// A forward-only source, e.g. stdin or a socket. Skips are done by reading.
#[derive(Debug)]
pub struct Forward<R>(pub R);

impl<R: Read> Read for Forward<R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.0.read(buf)
    }
}

impl<R: Read> Source for Forward<R> {
    fn skip(&mut self, count: u64) -> io::Result<()> {
        discard(&mut self.0, count)
    }

    fn bounds(&mut self) -> io::Result<(u64, Option<u64>)> {
        Ok((0, None))
    }
}

/// Reads and drops exactly `count` bytes. Running out of input first is an error.
pub fn discard<R: Read + ?Sized>(r: &mut R, mut count: u64) -> io::Result<()> {
    if count == 0 {
        return Ok(());
    }
    let mut buf = vec![0u8; count.min(SKIP_BUFFER_LEN as u64) as usize];
    while count > 0 {
        let want = count.min(buf.len() as u64) as usize;
        match r.read(&mut buf[..want]) {
            Ok(0) => {
                return Err(io::Error::new(
                    io::ErrorKind::UnexpectedEof,
                    format!("stream ended with {count} bytes left to skip"),
                ));
            }
            Ok(n) => count -= n as u64,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        }
    }
    Ok(())
}
