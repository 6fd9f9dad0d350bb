// Vorbis header packets
//
// Packet 0 is the identification header, packet 1 the comment header. Both
// start with a packet type byte followed by "vorbis".

use serde::Serialize;

use crate::error::{DecodeError, DecodeResult};
use crate::metrics::VorbisBitrates;
use crate::source::DataWindow;
use crate::tag::TagContribution;
use crate::utils::io::{read_le_i32, read_le_u32, read_u8};

pub use crate::flac::vorbis::VorbisComment;

const VORBIS: &[u8; 6] = b"vorbis";
pub const PACKET_IDENTIFICATION: u8 = 0x01;
pub const PACKET_COMMENT: u8 = 0x03;

/// Identification header length: 7 byte preamble plus 23 bytes of fields
const IDENTIFICATION_LENGTH: usize = 30;

/// Fields of the Vorbis identification header
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct VorbisIdentification {
    pub version: u32,
    pub channels: u8,
    pub sample_rate: u32,
    pub maximum_bitrate: i32,
    pub nominal_bitrate: i32,
    pub minimum_bitrate: i32,
}

impl VorbisIdentification {
    pub fn bitrates(&self) -> VorbisBitrates {
        VorbisBitrates {
            maximum: self.maximum_bitrate,
            nominal: self.nominal_bitrate,
            minimum: self.minimum_bitrate,
        }
    }

    pub fn encoding_type(&self) -> String {
        format!("Ogg Vorbis v{}", self.version + 1)
    }
}

fn check_preamble(bytes: &[u8], packet_type: u8) -> DecodeResult<()> {
    if bytes.len() < 7 || bytes[0] != packet_type || &bytes[1..7] != VORBIS {
        return Err(DecodeError::Invalid(format!(
            "not a Vorbis header packet of type {}",
            packet_type
        )));
    }
    Ok(())
}

pub fn decode_identification(window: &DataWindow<'_>) -> DecodeResult<VorbisIdentification> {
    check_preamble(window.bytes, PACKET_IDENTIFICATION)?;
    if window.len() < IDENTIFICATION_LENGTH {
        return Err(DecodeError::Truncated);
    }
    let mut cursor = &window.bytes[7..];
    let identification = VorbisIdentification {
        version: read_le_u32(&mut cursor)?,
        channels: read_u8(&mut cursor)?,
        sample_rate: read_le_u32(&mut cursor)?,
        maximum_bitrate: read_le_i32(&mut cursor)?,
        nominal_bitrate: read_le_i32(&mut cursor)?,
        minimum_bitrate: read_le_i32(&mut cursor)?,
    };
    if identification.sample_rate == 0 {
        return Err(DecodeError::Invalid("sample rate is zero".into()));
    }
    Ok(identification)
}

/// Tag decoder for the comment header packet
pub fn decode_comment_packet(window: &DataWindow<'_>) -> DecodeResult<TagContribution> {
    check_preamble(window.bytes, PACKET_COMMENT)?;
    let mut cursor = &window.bytes[7..];
    let comment = VorbisComment::read(&mut cursor, window.len())?;
    Ok(TagContribution::VorbisComment(comment))
}
