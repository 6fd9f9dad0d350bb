// FLAC metadata blocks
//
// Each block starts with a 4-byte header: one bit last-block flag, seven
// bits block type, then a 24-bit big-endian payload length.

use serde::Serialize;

use crate::error::{DecodeError, DecodeResult, Error, Result};
use crate::source::{DataWindow, Source};

/// FLAC file signature
pub const FLAC_SIGNATURE: &[u8; 4] = b"fLaC";

pub const BLOCK_HEADER_SIZE: u64 = 4;

const STREAM_INFO_LENGTH: usize = 34;

/// FLAC metadata block types
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlacMetadataBlockType {
    StreamInfo,
    Padding,
    Application,
    SeekTable,
    VorbisComment,
    CueSheet,
    Picture,
    Reserved(u8),
    Invalid,
}

impl FlacMetadataBlockType {
    pub fn from_byte(byte: u8) -> Self {
        match byte {
            0 => FlacMetadataBlockType::StreamInfo,
            1 => FlacMetadataBlockType::Padding,
            2 => FlacMetadataBlockType::Application,
            3 => FlacMetadataBlockType::SeekTable,
            4 => FlacMetadataBlockType::VorbisComment,
            5 => FlacMetadataBlockType::CueSheet,
            6 => FlacMetadataBlockType::Picture,
            127 => FlacMetadataBlockType::Invalid,
            other => FlacMetadataBlockType::Reserved(other),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            FlacMetadataBlockType::StreamInfo => "STREAMINFO",
            FlacMetadataBlockType::Padding => "PADDING",
            FlacMetadataBlockType::Application => "APPLICATION",
            FlacMetadataBlockType::SeekTable => "SEEKTABLE",
            FlacMetadataBlockType::VorbisComment => "VORBIS_COMMENT",
            FlacMetadataBlockType::CueSheet => "CUESHEET",
            FlacMetadataBlockType::Picture => "PICTURE",
            FlacMetadataBlockType::Reserved(_) => "RESERVED",
            FlacMetadataBlockType::Invalid => "INVALID",
        }
    }
}

/// FLAC metadata block header
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FlacMetadataBlockHeader {
    pub is_last: bool,
    pub block_type: FlacMetadataBlockType,
    pub length: u32,
    /// Offset of the header
    pub start: u64,
}

impl FlacMetadataBlockHeader {
    /// Read a block header at the current position and check that the
    /// payload fits in the source
    pub fn read<S: Source + ?Sized>(source: &mut S) -> Result<Self> {
        let start = source.position();
        let mut buffer = [0u8; BLOCK_HEADER_SIZE as usize];
        source.read_exact(&mut buffer)?;

        let is_last = (buffer[0] & 0x80) != 0;
        let block_type = FlacMetadataBlockType::from_byte(buffer[0] & 0x7F);

        // Length is big-endian 24-bit
        let length = ((buffer[1] as u32) << 16) | ((buffer[2] as u32) << 8) | (buffer[3] as u32);

        let header = FlacMetadataBlockHeader {
            is_last,
            block_type,
            length,
            start,
        };
        if block_type == FlacMetadataBlockType::Invalid {
            return Err(Error::corrupt(block_type.name(), start, "invalid metadata block type 127"));
        }
        if header.data_end() > source.size() {
            return Err(Error::corrupt(
                block_type.name(),
                start,
                format!("block length {} runs past end of source ({})", length, source.size()),
            ));
        }
        Ok(header)
    }

    pub fn data_start(&self) -> u64 {
        self.start + BLOCK_HEADER_SIZE
    }

    pub fn data_end(&self) -> u64 {
        self.data_start() + self.length as u64
    }

    pub fn window<'a>(&self, data: &'a [u8]) -> DataWindow<'a> {
        DataWindow::new(self.data_start(), data)
    }
}

/// STREAMINFO block fields
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StreamInfo {
    pub min_block_size: u16,
    pub max_block_size: u16,
    pub min_frame_size: u32,
    pub max_frame_size: u32,
    pub sample_rate: u32,
    pub channels: u8,
    pub bits_per_sample: u8,
    /// Samples per channel, 0 when unknown
    pub total_samples: u64,
    pub md5: [u8; 16],
}

/// Decoded contribution of a structural FLAC block
#[derive(Debug, Clone, PartialEq)]
pub enum FlacBlock {
    StreamInfo(StreamInfo),
}

pub fn decode_stream_info(window: &DataWindow<'_>) -> DecodeResult<FlacBlock> {
    let b = window.bytes;
    if b.len() < STREAM_INFO_LENGTH {
        return Err(DecodeError::Invalid(format!(
            "STREAMINFO block too short ({} bytes)",
            b.len()
        )));
    }
    let u24 = |at: usize| ((b[at] as u32) << 16) | ((b[at + 1] as u32) << 8) | b[at + 2] as u32;

    // 20 bits rate, 3 bits channels - 1, 5 bits bits-per-sample - 1, 36 bits samples
    let packed = u64::from_be_bytes([b[10], b[11], b[12], b[13], b[14], b[15], b[16], b[17]]);
    let sample_rate = (packed >> 44) as u32;
    let channels = ((packed >> 41) & 0x07) as u8 + 1;
    let bits_per_sample = ((packed >> 36) & 0x1F) as u8 + 1;
    let total_samples = packed & 0x0F_FFFF_FFFF;

    let mut md5 = [0u8; 16];
    md5.copy_from_slice(&b[18..34]);

    if sample_rate == 0 {
        return Err(DecodeError::Invalid("sample rate is zero".into()));
    }

    Ok(FlacBlock::StreamInfo(StreamInfo {
        min_block_size: u16::from_be_bytes([b[0], b[1]]),
        max_block_size: u16::from_be_bytes([b[2], b[3]]),
        min_frame_size: u24(4),
        max_frame_size: u24(7),
        sample_rate,
        channels,
        bits_per_sample,
        total_samples,
        md5,
    }))
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::source::MemorySource;

    pub(crate) fn stream_info(rate: u32, channels: u8, bits: u8, samples: u64) -> Vec<u8> {
        let mut out = Vec::new();
        out.extend_from_slice(&4096u16.to_be_bytes());
        out.extend_from_slice(&4096u16.to_be_bytes());
        out.extend_from_slice(&[0, 0, 16, 0, 0x30, 0]);
        let packed = ((rate as u64) << 44)
            | (((channels - 1) as u64) << 41)
            | (((bits - 1) as u64) << 36)
            | samples;
        out.extend_from_slice(&packed.to_be_bytes());
        out.extend_from_slice(&[0xAA; 16]);
        out
    }

    #[test]
    fn block_header_fields() {
        let mut bytes = vec![0x84, 0, 0, 3];
        bytes.extend_from_slice(b"abc");
        let header = FlacMetadataBlockHeader::read(&mut MemorySource::new(bytes)).unwrap();
        assert!(header.is_last);
        assert_eq!(header.block_type, FlacMetadataBlockType::VorbisComment);
        assert_eq!(header.length, 3);
        assert_eq!(header.data_end(), 7);
    }

    #[test]
    fn block_overrun_is_corrupt() {
        let bytes = vec![0x01, 0, 1, 0, 0, 0];
        assert!(matches!(
            FlacMetadataBlockHeader::read(&mut MemorySource::new(bytes)),
            Err(Error::CorruptHeader { .. })
        ));
    }

    #[test]
    fn stream_info_packed_fields() {
        let payload = stream_info(44_100, 2, 16, 441_000);
        let FlacBlock::StreamInfo(info) = decode_stream_info(&DataWindow::new(8, &payload)).unwrap();
        assert_eq!(info.sample_rate, 44_100);
        assert_eq!(info.channels, 2);
        assert_eq!(info.bits_per_sample, 16);
        assert_eq!(info.total_samples, 441_000);
        assert_eq!(info.max_frame_size, 0x3000);
    }
}
