// ASF object framing
//
// Every object starts with a GUID and a u64 LE size. The size counts the
// 24-byte header itself, and objects are never padded.

use crate::error::{Error, Result};
use crate::source::{DataWindow, Source};

use super::guid::Guid;

pub const OBJECT_HEADER_SIZE: u64 = 24;

/// Header of one ASF object
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ObjectHeader {
    pub guid: Guid,
    /// Declared size including the header
    pub size: u64,
    /// Offset of the GUID
    pub start: u64,
}

impl ObjectHeader {
    /// Read and validate the header at the current position.
    ///
    /// Returns `None` if fewer than 24 bytes remain.
    pub fn read<S: Source + ?Sized>(source: &mut S) -> Result<Option<Self>> {
        let start = source.position();
        if source.remaining() < OBJECT_HEADER_SIZE {
            return Ok(None);
        }
        let mut buffer = [0u8; OBJECT_HEADER_SIZE as usize];
        source.read_exact(&mut buffer)?;

        let mut guid = [0u8; Guid::LEN];
        guid.copy_from_slice(&buffer[..16]);
        let mut size = [0u8; 8];
        size.copy_from_slice(&buffer[16..]);
        let header = ObjectHeader {
            guid: Guid(guid),
            size: u64::from_le_bytes(size),
            start,
        };
        header.validate(source.size())?;
        Ok(Some(header))
    }

    fn validate(&self, source_size: u64) -> Result<()> {
        if self.size < OBJECT_HEADER_SIZE {
            return Err(Error::corrupt(
                self.guid,
                self.start,
                format!("object size {} is smaller than its header", self.size),
            ));
        }
        match self.start.checked_add(self.size) {
            Some(end) if end <= source_size => Ok(()),
            _ => Err(Error::corrupt(
                self.guid,
                self.start,
                format!("object size {} runs past end of source ({})", self.size, source_size),
            )),
        }
    }

    pub fn payload_len(&self) -> u64 {
        self.size - OBJECT_HEADER_SIZE
    }

    pub fn data_start(&self) -> u64 {
        self.start + OBJECT_HEADER_SIZE
    }

    pub fn end(&self) -> u64 {
        self.start + self.size
    }

    /// Read the payload of an object whose header was just consumed
    pub fn read_payload<S: Source + ?Sized>(&self, source: &mut S) -> Result<Vec<u8>> {
        source.read_vec(self.payload_len())
    }

    pub fn window<'a>(&self, data: &'a [u8]) -> DataWindow<'a> {
        DataWindow::new(self.data_start(), data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::asf::guid;
    use crate::source::MemorySource;

    fn object(guid: Guid, payload: &[u8]) -> Vec<u8> {
        let mut out = guid.0.to_vec();
        out.extend_from_slice(&(payload.len() as u64 + 24).to_le_bytes());
        out.extend_from_slice(payload);
        out
    }

    #[test]
    fn reads_header() {
        let bytes = object(guid::DATA, &[0u8; 10]);
        let mut src = MemorySource::new(bytes);
        let header = ObjectHeader::read(&mut src).unwrap().unwrap();
        assert_eq!(header.guid, guid::DATA);
        assert_eq!(header.size, 34);
        assert_eq!(header.payload_len(), 10);
        assert_eq!(src.position(), 24);
        assert_eq!(header.read_payload(&mut src).unwrap().len(), 10);
    }

    #[test]
    fn short_source_yields_none() {
        let mut src = MemorySource::new(vec![0u8; 23]);
        assert!(ObjectHeader::read(&mut src).unwrap().is_none());
    }

    #[test]
    fn undersized_and_oversized_are_corrupt() {
        let mut tiny = guid::DATA.0.to_vec();
        tiny.extend_from_slice(&10u64.to_le_bytes());
        assert!(matches!(
            ObjectHeader::read(&mut MemorySource::new(tiny)),
            Err(Error::CorruptHeader { .. })
        ));

        let mut huge = guid::DATA.0.to_vec();
        huge.extend_from_slice(&1000u64.to_le_bytes());
        assert!(matches!(
            ObjectHeader::read(&mut MemorySource::new(huge)),
            Err(Error::CorruptHeader { .. })
        ));
    }
}
