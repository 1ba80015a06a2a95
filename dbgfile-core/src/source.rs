//! Random-access byte sources and the bounded section views built on them.

use std::io::{self, Read, Seek, SeekFrom};
use std::path::Path;
use std::sync::Arc;

/// An immutable, randomly addressable sequence of bytes.
///
/// Reads are positional: implementations must not keep a cursor that one
/// reader could move under another.
pub trait ByteSource: Send + Sync {
    /// Reads up to `buf.len()` bytes starting at `offset`. Returns 0 at or
    /// past the end of the source.
    fn read_at(&self, buf: &mut [u8], offset: u64) -> io::Result<usize>;

    /// Total length of the source in bytes.
    fn len(&self) -> io::Result<u64>;

    /// Fills `buf` from `offset`, failing with `UnexpectedEof` on a short read.
    fn read_exact_at(&self, mut buf: &mut [u8], mut offset: u64) -> io::Result<()> {
        while !buf.is_empty() {
            match self.read_at(buf, offset) {
                Ok(0) => break,
                Ok(n) => {
                    buf = &mut buf[n..];
                    offset += n as u64;
                }
                Err(e) if e.kind() == io::ErrorKind::Interrupted => {}
                Err(e) => return Err(e),
            }
        }
        if buf.is_empty() {
            Ok(())
        } else {
            Err(io::Error::new(
                io::ErrorKind::UnexpectedEof,
                "failed to fill whole buffer",
            ))
        }
    }
}

fn read_slice_at(data: &[u8], buf: &mut [u8], offset: u64) -> io::Result<usize> {
    let Ok(start) = usize::try_from(offset) else {
        return Ok(0);
    };
    let Some(tail) = data.get(start..) else {
        return Ok(0);
    };
    let n = tail.len().min(buf.len());
    buf[..n].copy_from_slice(&tail[..n]);
    Ok(n)
}

impl ByteSource for Vec<u8> {
    fn read_at(&self, buf: &mut [u8], offset: u64) -> io::Result<usize> {
        read_slice_at(self, buf, offset)
    }

    fn len(&self) -> io::Result<u64> {
        Ok(self.as_slice().len() as u64)
    }
}

impl ByteSource for Box<[u8]> {
    fn read_at(&self, buf: &mut [u8], offset: u64) -> io::Result<usize> {
        read_slice_at(self, buf, offset)
    }

    fn len(&self) -> io::Result<u64> {
        Ok(<[u8]>::len(self) as u64)
    }
}

impl ByteSource for &'static [u8] {
    fn read_at(&self, buf: &mut [u8], offset: u64) -> io::Result<usize> {
        read_slice_at(self, buf, offset)
    }

    fn len(&self) -> io::Result<u64> {
        Ok(<[u8]>::len(self) as u64)
    }
}

#[cfg(any(unix, windows))]
impl ByteSource for std::fs::File {
    #[cfg(unix)]
    fn read_at(&self, buf: &mut [u8], offset: u64) -> io::Result<usize> {
        std::os::unix::fs::FileExt::read_at(self, buf, offset)
    }

    // seek_read moves the OS cursor, but every read here passes its own offset.
    #[cfg(windows)]
    fn read_at(&self, buf: &mut [u8], offset: u64) -> io::Result<usize> {
        std::os::windows::fs::FileExt::seek_read(self, buf, offset)
    }

    fn len(&self) -> io::Result<u64> {
        Ok(self.metadata()?.len())
    }
}

/// Opens `path` as a shared byte source.
///
/// Targets without positional file reads get the whole file in memory.
pub(crate) fn open_path(path: &Path) -> io::Result<Arc<dyn ByteSource>> {
    #[cfg(any(unix, windows))]
    let source: Arc<dyn ByteSource> = Arc::new(std::fs::File::open(path)?);
    #[cfg(not(any(unix, windows)))]
    let source: Arc<dyn ByteSource> = Arc::new(std::fs::read(path)?);
    Ok(source)
}

/// A bounded window `[offset, offset + len)` onto a shared [`ByteSource`].
///
/// Cloning is cheap; clones share the source but nothing else.
#[derive(Clone)]
pub struct SectionData {
    source: Arc<dyn ByteSource>,
    offset: u64,
    len: u64,
}

impl SectionData {
    pub fn new(source: Arc<dyn ByteSource>, offset: u64, len: u64) -> Self {
        Self {
            source,
            offset,
            len,
        }
    }

    /// An empty window, used for sections that occupy no file space.
    pub fn empty(source: Arc<dyn ByteSource>) -> Self {
        Self::new(source, 0, 0)
    }

    pub fn len(&self) -> u64 {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Reads at `off` relative to the start of the window without touching
    /// any cursor.
    pub fn read_at(&self, buf: &mut [u8], off: u64) -> io::Result<usize> {
        if off >= self.len {
            return Ok(0);
        }
        let Some(start) = self.offset.checked_add(off) else {
            return Ok(0);
        };
        let remaining = self.len - off;
        let want = buf.len().min(usize::try_from(remaining).unwrap_or(usize::MAX));
        self.source.read_at(&mut buf[..want], start)
    }

    /// Reads the whole window into memory.
    pub fn to_vec(&self) -> io::Result<Vec<u8>> {
        let available = self.source.len()?.saturating_sub(self.offset);
        if self.len > available {
            return Err(io::Error::new(
                io::ErrorKind::UnexpectedEof,
                "section extends past the end of the source",
            ));
        }
        let len = usize::try_from(self.len)
            .map_err(|_| io::Error::new(io::ErrorKind::InvalidInput, "section too large"))?;
        let mut buf = vec![0u8; len];
        self.source.read_exact_at(&mut buf, self.offset)?;
        Ok(buf)
    }

    /// Returns a fresh reader positioned at the start of the window.
    pub fn open(&self) -> SectionReader {
        SectionReader {
            data: self.clone(),
            pos: 0,
        }
    }
}

impl std::fmt::Debug for SectionData {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SectionData")
            .field("offset", &self.offset)
            .field("len", &self.len)
            .finish_non_exhaustive()
    }
}

/// A seekable reader over a [`SectionData`] window with its own cursor.
#[derive(Debug, Clone)]
pub struct SectionReader {
    data: SectionData,
    pos: u64,
}

impl Read for SectionReader {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let n = self.data.read_at(buf, self.pos)?;
        self.pos += n as u64;
        Ok(n)
    }
}

impl Seek for SectionReader {
    fn seek(&mut self, pos: SeekFrom) -> io::Result<u64> {
        let (base, delta) = match pos {
            SeekFrom::Start(n) => {
                self.pos = n;
                return Ok(n);
            }
            SeekFrom::End(n) => (self.data.len, n),
            SeekFrom::Current(n) => (self.pos, n),
        };
        match base.checked_add_signed(delta) {
            Some(n) => {
                self.pos = n;
                Ok(n)
            }
            None => Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                "invalid seek to a negative or overflowing position",
            )),
        }
    }
}
