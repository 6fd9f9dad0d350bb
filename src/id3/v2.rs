// ID3v2 tag implementation

use std::io::Read;

use serde::Serialize;

use crate::error::{DecodeError, DecodeResult};
use crate::source::{DataWindow, Source};
use crate::tag::{serialize_base64, TagContribution};
use crate::utils::encoding::{decode_text, TextEncoding};
use crate::utils::io::parse_synchsafe;

/// ID3v2 header structure
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Id3v2Header {
    pub version: (u8, u8),
    pub flags: u8,
    /// Tag size excluding the 10-byte header (and footer)
    pub size: u32,
}

/// ID3v2 tag structure
#[derive(Debug, Clone, Serialize)]
pub struct Id3v2Tag {
    pub header: Id3v2Header,
    pub frames: Vec<Id3Frame>,
}

/// ID3v2 frame structure
#[derive(Debug, Clone, Serialize)]
pub struct Id3Frame {
    pub frame_id: String,
    pub size: u32,
    pub flags: u16,
    #[serde(serialize_with = "serialize_base64")]
    pub data: Vec<u8>,
}

impl Id3v2Header {
    pub const HEADER_SIZE: usize = 10;
    const ID: [u8; 3] = [b'I', b'D', b'3'];
    const FLAG_FOOTER: u8 = 0x10;

    /// Parse a header from its 10 raw bytes
    pub fn parse(buffer: &[u8; Self::HEADER_SIZE]) -> Option<Self> {
        // Check for ID3 identifier
        if buffer[0..3] != Self::ID {
            return None;
        }

        let version = (buffer[3], buffer[4]);
        let flags = buffer[5];
        let size = parse_synchsafe([buffer[6], buffer[7], buffer[8], buffer[9]]);

        Some(Id3v2Header {
            version,
            flags,
            size,
        })
    }

    /// Read ID3v2 header from reader
    pub fn read<R: Read>(reader: &mut R) -> std::io::Result<Option<Self>> {
        let mut buffer = [0u8; Self::HEADER_SIZE];
        reader.read_exact(&mut buffer)?;
        Ok(Self::parse(&buffer))
    }

    /// Whole tag length on disk: header, body and optional footer
    pub fn total_size(&self) -> u64 {
        let footer = if self.flags & Self::FLAG_FOOTER != 0 { 10 } else { 0 };
        Self::HEADER_SIZE as u64 + self.size as u64 + footer
    }

    /// Check for an ID3v2 tag at the current position of `source`.
    ///
    /// On a match the source is left just past the tag and the header is
    /// returned. Otherwise the position is restored.
    pub fn skip_leading<S: Source + ?Sized>(source: &mut S) -> crate::error::Result<Option<Self>> {
        let start = source.position();
        if source.remaining() < Self::HEADER_SIZE as u64 {
            return Ok(None);
        }
        let mut buffer = [0u8; Self::HEADER_SIZE];
        source.read_exact(&mut buffer)?;
        match Self::parse(&buffer) {
            Some(header) => {
                source.seek(start)?;
                source.skip(header.total_size())?;
                Ok(Some(header))
            }
            None => {
                source.seek(start)?;
                Ok(None)
            }
        }
    }
}

impl Id3v2Tag {
    /// Read ID3v2 tag from reader.
    ///
    /// `available` is the number of bytes the reader can deliver, header
    /// included. Frames are bounded by it as well as by the declared tag
    /// size, so a bogus size never drives an allocation.
    pub fn read<R: Read>(reader: &mut R, available: usize) -> std::io::Result<Option<Self>> {
        let header = match Id3v2Header::read(reader)? {
            Some(h) => h,
            None => return Ok(None),
        };

        let frame_header_size = if header.version.0 == 2 { 6 } else { 10 };
        let mut frames = Vec::new();
        let mut remaining = (header.size as usize).min(available.saturating_sub(Id3v2Header::HEADER_SIZE));

        while remaining >= frame_header_size {
            let frame = match Id3Frame::read(reader, header.version, remaining)? {
                Some(f) => f,
                None => break,
            };
            remaining -= frame.size as usize + frame_header_size;
            frames.push(frame);
        }

        Ok(Some(Id3v2Tag { header, frames }))
    }

    /// First text value of `frame_id`
    pub fn text(&self, frame_id: &str) -> Option<String> {
        self.frames
            .iter()
            .find(|f| f.frame_id == frame_id)
            .and_then(|f| f.text())
    }
}

impl Id3Frame {
    /// Read ID3v2 frame from reader.
    ///
    /// Returns `None` on padding or when the declared frame does not fit in
    /// the `remaining` tag bytes.
    pub fn read<R: Read>(reader: &mut R, version: (u8, u8), remaining: usize) -> std::io::Result<Option<Self>> {
        let (frame_id, size, flags, header_size) = if version.0 == 2 {
            // ID3v2.2: 3-char id, 24-bit size, no flags
            let mut buffer = [0u8; 6];
            reader.read_exact(&mut buffer)?;
            if buffer.iter().all(|&b| b == 0) {
                return Ok(None);
            }
            let id = String::from_utf8_lossy(&buffer[0..3]).to_string();
            let size = ((buffer[3] as u32) << 16) | ((buffer[4] as u32) << 8) | (buffer[5] as u32);
            (id, size, 0u16, 6usize)
        } else {
            let mut buffer = [0u8; 10];
            reader.read_exact(&mut buffer)?;

            // Check for padding (all zeros)
            if buffer.iter().all(|&b| b == 0) {
                return Ok(None);
            }

            let id = String::from_utf8_lossy(&buffer[0..4]).to_string();

            // Frame size parsing depends on version
            let size = if version.0 >= 4 {
                // ID3v2.4 uses synchsafe integers
                parse_synchsafe([buffer[4], buffer[5], buffer[6], buffer[7]])
            } else {
                // ID3v2.3 uses regular integers
                u32::from_be_bytes([buffer[4], buffer[5], buffer[6], buffer[7]])
            };

            let flags = ((buffer[8] as u16) << 8) | (buffer[9] as u16);
            (id, size, flags, 10usize)
        };

        if size as usize + header_size > remaining {
            return Ok(None);
        }

        // Read frame data
        let mut data = vec![0u8; size as usize];
        reader.read_exact(&mut data)?;

        Ok(Some(Id3Frame {
            frame_id,
            size,
            flags,
            data,
        }))
    }

    /// Decoded value of a text (T***) frame
    pub fn text(&self) -> Option<String> {
        if !self.frame_id.starts_with('T') || self.data.is_empty() {
            return None;
        }
        let encoding = TextEncoding::from_byte(self.data[0]);
        Some(
            decode_text(&self.data[1..], encoding)
                .trim_end_matches('\0')
                .to_string(),
        )
    }
}

/// Tag decoder for chunks holding an ID3v2 block
pub fn decode_id3_chunk(window: &DataWindow<'_>) -> DecodeResult<TagContribution> {
    let mut cursor = window.cursor();
    match Id3v2Tag::read(&mut cursor, window.len())? {
        Some(tag) => Ok(TagContribution::Id3v2(tag)),
        None => Err(DecodeError::Invalid("chunk does not start with an ID3v2 header".into())),
    }
}
