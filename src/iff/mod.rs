// IFF-style chunk framing
//
// Chunk layout:
// - Identifier: 4 ASCII bytes
// - Size: 32-bit big-endian unsigned. IFF counts the payload only,
//   RealMedia counts the whole chunk including these 8 bytes.
// - Payload: `size` bytes. IFF adds one pad byte when `size` is odd.
//
// A file starts with a FORM header: "FORM" + size + form type.

use crate::diagnostics::DiagnosticSink;
use crate::error::{Error, Result};
use crate::source::{DataWindow, Source};

pub const CHUNK_HEADER_SIZE: u64 = 8;
pub const FORM_HEADER_SIZE: u64 = 12;

pub const FORM: ChunkId = ChunkId(*b"FORM");

const TARGET: &str = "chunkscope::iff";

/// Four-character chunk identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ChunkId(pub [u8; 4]);

impl ChunkId {
    pub fn as_bytes(&self) -> &[u8; 4] {
        &self.0
    }
}

impl std::fmt::Display for ChunkId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for &b in &self.0 {
            if b.is_ascii_graphic() || b == b' ' {
                write!(f, "{}", b as char)?;
            } else {
                write!(f, "\\x{:02X}", b)?;
            }
        }
        Ok(())
    }
}

/// What the size field of a chunk header counts
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SizeField {
    /// Payload bytes only (IFF, AIFF)
    Payload,
    /// Header plus payload (RealMedia)
    WholeChunk,
}

/// Decoded chunk header
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChunkHeader {
    pub id: ChunkId,
    /// Declared payload length
    pub size: u64,
    /// Offset of the identifier
    pub start: u64,
}

impl ChunkHeader {
    /// Read the header at the current position.
    ///
    /// Returns `Ok(None)` when fewer than 8 bytes remain, which is the normal
    /// end of a chunk walk. A size running past the end of the source is
    /// corruption and fails with `CorruptHeader`.
    pub fn read<S: Source + ?Sized>(source: &mut S, field: SizeField) -> Result<Option<Self>> {
        match Self::read_unchecked(source, field)? {
            Some(header) => {
                header.validate(source.size())?;
                Ok(Some(header))
            }
            None => Ok(None),
        }
    }

    /// Read the header without checking the declared size.
    ///
    /// Traversals that recognise misaligned signatures use this, since the
    /// size field of a shifted header is garbage. A whole-chunk size smaller
    /// than the header itself is still `CorruptHeader`.
    pub fn read_unchecked<S: Source + ?Sized>(source: &mut S, field: SizeField) -> Result<Option<Self>> {
        let start = source.position();
        if source.remaining() < CHUNK_HEADER_SIZE {
            return Ok(None);
        }

        let mut buffer = [0u8; 8];
        source.read_exact(&mut buffer)?;

        let id = ChunkId([buffer[0], buffer[1], buffer[2], buffer[3]]);
        let declared = u32::from_be_bytes([buffer[4], buffer[5], buffer[6], buffer[7]]) as u64;
        let size = match field {
            SizeField::Payload => declared,
            SizeField::WholeChunk => declared.checked_sub(CHUNK_HEADER_SIZE).ok_or_else(|| {
                Error::corrupt(id, start, format!("declared size {} is smaller than the chunk header", declared))
            })?,
        };

        Ok(Some(ChunkHeader { id, size, start }))
    }

    /// Fail with `CorruptHeader` if the payload cannot fit in `source_size`
    pub fn validate(&self, source_size: u64) -> Result<()> {
        if self.data_end() > source_size {
            return Err(Error::corrupt(
                self.id,
                self.start,
                format!(
                    "declared size {} runs past end of source ({} bytes remain)",
                    self.size,
                    source_size.saturating_sub(self.data_start())
                ),
            ));
        }
        Ok(())
    }

    pub fn data_start(&self) -> u64 {
        self.start + CHUNK_HEADER_SIZE
    }

    pub fn data_end(&self) -> u64 {
        self.data_start() + self.size
    }

    /// Read the payload; the source must sit at `data_start()`
    pub fn read_data<S: Source + ?Sized>(&self, source: &mut S) -> Result<Vec<u8>> {
        source.read_vec(self.size)
    }

    pub fn window<'a>(&self, data: &'a [u8]) -> DataWindow<'a> {
        DataWindow::new(self.data_start(), data)
    }
}

/// Skip the pad byte after an odd-sized chunk, unless already at the end
pub fn ensure_on_equal_boundary<S: Source + ?Sized>(
    source: &mut S,
    header: &ChunkHeader,
    sink: &mut dyn DiagnosticSink,
) -> Result<()> {
    if header.size % 2 == 1 && source.position() < source.size() {
        sink.debug(TARGET, "Skipping byte because on odd boundary");
        source.skip(1)?;
    }
    Ok(())
}

/// FORM header at the start of an IFF file
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IffFileHeader {
    pub form_type: ChunkId,
    /// Declared FORM size
    pub size: u64,
}

impl IffFileHeader {
    /// Read and validate the FORM header at offset 0.
    ///
    /// `accepted` lists the form types this dialect understands. Anything
    /// else is a `CorruptHeader`.
    pub fn read<S: Source + ?Sized>(source: &mut S, accepted: &[ChunkId]) -> Result<Self> {
        source.seek(0)?;
        if source.size() < FORM_HEADER_SIZE {
            return Err(Error::corrupt(
                "FORM",
                0,
                format!("file too short for a FORM header ({} bytes)", source.size()),
            ));
        }

        let mut buffer = [0u8; 12];
        source.read_exact(&mut buffer)?;

        let magic = ChunkId([buffer[0], buffer[1], buffer[2], buffer[3]]);
        if magic != FORM {
            return Err(Error::corrupt(magic, 0, "not an IFF file, FORM magic missing"));
        }

        let size = u32::from_be_bytes([buffer[4], buffer[5], buffer[6], buffer[7]]) as u64;
        let form_type = ChunkId([buffer[8], buffer[9], buffer[10], buffer[11]]);
        if !accepted.contains(&form_type) {
            return Err(Error::corrupt(
                form_type,
                8,
                format!("unsupported form type {}", form_type),
            ));
        }

        Ok(IffFileHeader { form_type, size })
    }

    /// Bytes declared after the form type
    pub fn remaining_bytes(&self) -> u64 {
        self.size.saturating_sub(4)
    }
}
