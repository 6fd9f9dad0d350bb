use std::borrow::Cow;

use super::Source;
use crate::error::{Error, Result};

/// In-memory source over an owned or borrowed buffer
#[derive(Debug, Clone)]
pub struct MemorySource<'a> {
    data: Cow<'a, [u8]>,
    position: u64,
}

impl MemorySource<'static> {
    pub fn new(data: Vec<u8>) -> Self {
        MemorySource {
            data: Cow::Owned(data),
            position: 0,
        }
    }
}

impl<'a> MemorySource<'a> {
    pub fn from_slice(data: &'a [u8]) -> Self {
        MemorySource {
            data: Cow::Borrowed(data),
            position: 0,
        }
    }
}

impl Source for MemorySource<'_> {
    fn size(&self) -> u64 {
        self.data.len() as u64
    }

    fn position(&self) -> u64 {
        self.position
    }

    fn seek(&mut self, offset: u64) -> Result<()> {
        if offset > self.size() {
            return Err(Error::OutOfRange {
                offset,
                size: self.size(),
            });
        }
        self.position = offset;
        Ok(())
    }

    fn read(&mut self, buf: &mut [u8]) -> Result<usize> {
        let start = self.position as usize;
        let n = buf.len().min(self.data.len().saturating_sub(start));
        buf[..n].copy_from_slice(&self.data[start..start + n]);
        self.position += n as u64;
        Ok(n)
    }
}
