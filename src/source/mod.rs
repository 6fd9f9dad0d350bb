// Random-access byte sources
//
// Every traversal reads through a `Source`: a byte-addressable view with a
// size known up front. Two backings exist, a file and an in-memory buffer,
// and both behave identically so tests can swap one for the other.

mod file;
mod memory;

pub use file::FileSource;
pub use memory::MemorySource;

use crate::error::{Error, Result};

/// Uniform read/seek abstraction over a file or a buffer
pub trait Source {
    /// Total number of bytes in the source
    fn size(&self) -> u64;

    /// Current read position
    fn position(&self) -> u64;

    /// Move to an absolute offset, which must lie within `[0, size]`
    fn seek(&mut self, offset: u64) -> Result<()>;

    /// Read up to `buf.len()` bytes. Returns 0 at end of data.
    fn read(&mut self, buf: &mut [u8]) -> Result<usize>;

    /// Name used in diagnostics
    fn name(&self) -> &str {
        "memory"
    }

    /// Bytes left between the current position and the end
    fn remaining(&self) -> u64 {
        self.size().saturating_sub(self.position())
    }

    /// Fill `buf` completely or fail with `UnexpectedEof`
    fn read_exact(&mut self, buf: &mut [u8]) -> Result<()> {
        let start = self.position();
        let mut filled = 0;
        while filled < buf.len() {
            let n = self.read(&mut buf[filled..])?;
            if n == 0 {
                return Err(Error::UnexpectedEof {
                    offset: start,
                    wanted: buf.len(),
                });
            }
            filled += n;
        }
        Ok(())
    }

    /// Read a single byte
    fn read_byte(&mut self) -> Result<u8> {
        let mut b = [0u8; 1];
        self.read_exact(&mut b)?;
        Ok(b[0])
    }

    /// Read `len` bytes into a fresh buffer
    ///
    /// The length is checked against what remains before allocating, so a
    /// bogus length never triggers a huge allocation.
    fn read_vec(&mut self, len: u64) -> Result<Vec<u8>> {
        if len > self.remaining() {
            return Err(Error::UnexpectedEof {
                offset: self.position(),
                wanted: usize::try_from(len).unwrap_or(usize::MAX),
            });
        }
        let mut buf = vec![0u8; len as usize];
        self.read_exact(&mut buf)?;
        Ok(buf)
    }

    /// Saturating forward skip, clamped to the end of the source.
    /// Returns the number of bytes actually skipped.
    fn skip(&mut self, n: u64) -> Result<u64> {
        let from = self.position();
        let to = from.saturating_add(n).min(self.size());
        self.seek(to)?;
        Ok(to - from)
    }

    /// Move back `n` bytes, failing with `OutOfRange` before offset 0
    fn rewind_by(&mut self, n: u64) -> Result<()> {
        let pos = self.position();
        match pos.checked_sub(n) {
            Some(target) => self.seek(target),
            None => Err(Error::OutOfRange {
                offset: 0,
                size: self.size(),
            }),
        }
    }
}

impl<S: Source + ?Sized> Source for &mut S {
    fn size(&self) -> u64 {
        (**self).size()
    }

    fn position(&self) -> u64 {
        (**self).position()
    }

    fn seek(&mut self, offset: u64) -> Result<()> {
        (**self).seek(offset)
    }

    fn read(&mut self, buf: &mut [u8]) -> Result<usize> {
        (**self).read(buf)
    }

    fn name(&self) -> &str {
        (**self).name()
    }
}

/// Bounded, borrowed view over a chunk's payload
#[derive(Debug, Clone, Copy)]
pub struct DataWindow<'a> {
    /// Source offset of the first payload byte
    pub start: u64,
    pub bytes: &'a [u8],
}

impl<'a> DataWindow<'a> {
    pub fn new(start: u64, bytes: &'a [u8]) -> Self {
        DataWindow { start, bytes }
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Offset one past the last payload byte
    pub fn end(&self) -> u64 {
        self.start + self.bytes.len() as u64
    }

    /// Reader confined to the window
    pub fn cursor(&self) -> std::io::Cursor<&'a [u8]> {
        std::io::Cursor::new(self.bytes)
    }
}
