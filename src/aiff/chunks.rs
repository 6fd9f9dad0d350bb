// AIFF chunk decoders
//
// Each decoder sees only its chunk's payload and returns an `AiffChunk`.
// The traversal folds that into the header record.

use std::io::Read;

use crate::error::{DecodeError, DecodeResult};
use crate::header::{AiffComment, ApplicationData, AudioHeader};
use crate::source::DataWindow;
use crate::utils::encoding::decode_latin1;
use crate::utils::io::{read_be_u16, read_be_u32, read_bytes, read_u8, parse_extended_f80};

/// Size of a plain AIFF COMM payload; AIFC appends compression info
const COMMON_CHUNK_SIZE: usize = 18;

/// Decoded contribution of one structural chunk
#[derive(Debug, Clone, PartialEq)]
pub enum AiffChunk {
    FormatVersion(u32),
    Application(ApplicationData),
    Common(CommonChunk),
    Comments(Vec<AiffComment>),
    Name(String),
    Author(String),
    Copyright(String),
    Annotation(String),
}

/// Decoder output plus whatever the decoder had to tolerate
#[derive(Debug, Clone, PartialEq)]
pub struct DecodedChunk {
    pub chunk: AiffChunk,
    pub warnings: Vec<String>,
}

impl From<AiffChunk> for DecodedChunk {
    fn from(chunk: AiffChunk) -> Self {
        DecodedChunk {
            chunk,
            warnings: Vec::new(),
        }
    }
}

/// COMM chunk fields
#[derive(Debug, Clone, PartialEq)]
pub struct CommonChunk {
    pub channels: u16,
    pub sample_frames: u32,
    pub sample_size: u16,
    pub sample_rate: f64,
    pub compression_type: Option<String>,
    pub compression_name: Option<String>,
}

/// Read a Pascal string (length byte, text, pad to even total length).
/// A pad byte cut off by the end of the chunk is only a warning.
fn read_pstring<R: Read>(reader: &mut R, warnings: &mut Vec<String>) -> std::io::Result<String> {
    let len = read_u8(reader)? as usize;
    let bytes = read_bytes(reader, len)?;
    let text = decode_latin1(&bytes);
    if len % 2 == 0 && read_u8(reader).is_err() {
        // Count byte plus even text is odd, so a pad byte should follow
        warnings.push(format!("pad byte missing after string \"{}\"", text));
    }
    Ok(text)
}

pub fn decode_common(window: &DataWindow<'_>) -> DecodeResult<DecodedChunk> {
    if window.len() < COMMON_CHUNK_SIZE {
        return Err(DecodeError::Invalid(format!(
            "COMM chunk too short ({} bytes)",
            window.len()
        )));
    }
    let mut cursor = window.cursor();
    let channels = read_be_u16(&mut cursor)?;
    let sample_frames = read_be_u32(&mut cursor)?;
    let sample_size = read_be_u16(&mut cursor)?;
    let mut rate = [0u8; 10];
    cursor.read_exact(&mut rate)?;
    let sample_rate = parse_extended_f80(rate);

    if !(sample_rate.is_finite() && sample_rate >= 0.0) {
        return Err(DecodeError::Invalid(format!("invalid sample rate {}", sample_rate)));
    }

    let mut warnings = Vec::new();
    let (compression_type, compression_name) = if window.len() >= COMMON_CHUNK_SIZE + 4 {
        let mut kind = [0u8; 4];
        cursor.read_exact(&mut kind)?;
        let name = match read_pstring(&mut cursor, &mut warnings) {
            Ok(name) => Some(name),
            Err(e) => {
                warnings.push(format!("compression name unreadable: {}", e));
                None
            }
        };
        (Some(decode_latin1(&kind)), name)
    } else {
        (None, None)
    };

    Ok(DecodedChunk {
        chunk: AiffChunk::Common(CommonChunk {
            channels,
            sample_frames,
            sample_size,
            sample_rate,
            compression_type,
            compression_name,
        }),
        warnings,
    })
}

pub fn decode_format_version(window: &DataWindow<'_>) -> DecodeResult<DecodedChunk> {
    let mut cursor = window.cursor();
    Ok(AiffChunk::FormatVersion(read_be_u32(&mut cursor)?).into())
}

pub fn decode_application(window: &DataWindow<'_>) -> DecodeResult<DecodedChunk> {
    let mut cursor = window.cursor();
    let mut signature = [0u8; 4];
    cursor.read_exact(&mut signature)?;

    // Apple II and Macintosh application chunks carry a Pascal-string name
    let mut warnings = Vec::new();
    let text = match &signature {
        b"pdos" | b"stoc" => read_pstring(&mut cursor, &mut warnings)?,
        _ => String::new(),
    };

    Ok(DecodedChunk {
        chunk: AiffChunk::Application(ApplicationData {
            signature: decode_latin1(&signature),
            text,
            length: window.len() - 4,
        }),
        warnings,
    })
}

pub fn decode_comments(window: &DataWindow<'_>) -> DecodeResult<DecodedChunk> {
    let mut cursor = window.cursor();
    let mut warnings = Vec::new();
    let count = read_be_u16(&mut cursor)?;
    let mut comments = Vec::with_capacity(count as usize);
    for _ in 0..count {
        let timestamp = read_be_u32(&mut cursor)?;
        let marker_id = read_be_u16(&mut cursor)? as i16;
        let len = read_be_u16(&mut cursor)? as usize;
        let text = decode_latin1(&read_bytes(&mut cursor, len)?);
        if len % 2 == 1 && read_u8(&mut cursor).is_err() {
            warnings.push(format!("pad byte missing after comment \"{}\"", text));
        }
        comments.push(AiffComment {
            timestamp,
            marker_id,
            text,
        });
    }
    Ok(DecodedChunk {
        chunk: AiffChunk::Comments(comments),
        warnings,
    })
}

pub fn decode_name(window: &DataWindow<'_>) -> DecodeResult<DecodedChunk> {
    Ok(AiffChunk::Name(decode_latin1(window.bytes)).into())
}

pub fn decode_author(window: &DataWindow<'_>) -> DecodeResult<DecodedChunk> {
    Ok(AiffChunk::Author(decode_latin1(window.bytes)).into())
}

pub fn decode_copyright(window: &DataWindow<'_>) -> DecodeResult<DecodedChunk> {
    Ok(AiffChunk::Copyright(decode_latin1(window.bytes)).into())
}

pub fn decode_annotation(window: &DataWindow<'_>) -> DecodeResult<DecodedChunk> {
    Ok(AiffChunk::Annotation(decode_latin1(window.bytes)).into())
}

impl AiffChunk {
    /// Fold this chunk into the header record
    pub fn apply(self, header: &mut AudioHeader) {
        match self {
            AiffChunk::Common(common) => {
                header.channels = Some(common.channels);
                header.bits_per_sample = Some(common.sample_size);
                header.no_of_samples = Some(common.sample_frames as u64);
                header.sample_rate = Some(common.sample_rate.round() as u32);
                if common.sample_rate > 0.0 {
                    header.precise_length = Some(common.sample_frames as f64 / common.sample_rate);
                }
                header.encoding_type = Some(match &common.compression_name {
                    Some(name) if !name.is_empty() => name.clone(),
                    _ => match common.compression_type.as_deref() {
                        Some(kind) => kind.to_string(),
                        None => "Not Compressed".to_string(),
                    },
                });
                let details = header.aiff_mut();
                details.compression_type = common.compression_type;
                details.compression_name = common.compression_name;
            }
            AiffChunk::FormatVersion(timestamp) => header.aiff_mut().format_version = Some(timestamp),
            AiffChunk::Application(app) => header.aiff_mut().applications.push(app),
            AiffChunk::Comments(comments) => header.aiff_mut().comments.extend(comments),
            AiffChunk::Name(text) => header.aiff_mut().name = Some(text),
            AiffChunk::Author(text) => header.aiff_mut().author = Some(text),
            AiffChunk::Copyright(text) => header.aiff_mut().copyright = Some(text),
            AiffChunk::Annotation(text) => header.aiff_mut().annotations.push(text),
        }
    }
}
