// ASF object decoders
//
// Structural decoders return an `AsfObject` that the traversal folds into the
// header record. Tag decoders return a `TagContribution`.

use std::io::Read;

use chrono::{DateTime, Utc};
use serde::Serialize;

use super::guid::{self, Guid};
use crate::error::{DecodeError, DecodeResult};
use crate::header::AudioHeader;
use crate::source::DataWindow;
use crate::tag::{serialize_base64, TagContribution};
use crate::utils::encoding::decode_utf16le_fixed;
use crate::utils::io::{read_bytes, read_le_u16, read_le_u32, read_le_u64, read_u8};

/// FILETIME counts 100 ns ticks from 1601-01-01
const FILETIME_TICKS_PER_SECOND: u64 = 10_000_000;
const FILETIME_UNIX_EPOCH_SECONDS: i64 = 11_644_473_600;

const FLAG_BROADCAST: u32 = 0x01;
const FLAG_SEEKABLE: u32 = 0x02;
const STREAM_NUMBER_MASK: u16 = 0x7F;
const STREAM_ENCRYPTED: u16 = 0x8000;

/// Decoded contribution of one structural object
#[derive(Debug, Clone, PartialEq)]
pub enum AsfObject {
    FileProperties(FileProperties),
    /// `None` for streams that do not carry audio
    StreamProperties(Option<AudioStream>),
    LanguageList(Vec<String>),
}

#[derive(Debug, Clone, PartialEq)]
pub struct FileProperties {
    pub file_id: Guid,
    pub file_size: u64,
    pub creation_time: Option<DateTime<Utc>>,
    pub data_packets: u64,
    pub play_duration: u64,
    pub send_duration: u64,
    pub preroll: u64,
    pub flags: u32,
    pub min_packet_size: u32,
    pub max_packet_size: u32,
    pub max_bitrate: u32,
}

/// WAVEFORMATEX fields of an audio stream
#[derive(Debug, Clone, PartialEq)]
pub struct AudioStream {
    pub stream_number: u16,
    pub encrypted: bool,
    pub format_tag: u16,
    pub channels: u16,
    pub sample_rate: u32,
    pub average_bytes_per_second: u32,
    pub block_align: u16,
    pub bits_per_sample: u16,
}

impl AudioStream {
    /// Codec name for the WAVEFORMATEX format tag
    pub fn codec_name(&self) -> String {
        match self.format_tag {
            0x0001 => "PCM".to_string(),
            0x000A => "WMA Voice".to_string(),
            0x0160 => "WMA Version 1".to_string(),
            0x0161 => "WMA".to_string(),
            0x0162 => "WMA Pro".to_string(),
            0x0163 => "WMA Lossless".to_string(),
            other => format!("Unknown codec 0x{:04X}", other),
        }
    }
}

/// Content description object (the classic five text fields)
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ContentDescription {
    pub title: String,
    pub author: String,
    pub copyright: String,
    pub description: String,
    pub rating: String,
}

/// Which object a metadata container came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MetadataKind {
    ExtendedContent,
    Metadata,
    MetadataLibrary,
}

/// Typed value of a metadata descriptor
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum MetadataValue {
    String(String),
    Binary(#[serde(serialize_with = "serialize_base64")] Vec<u8>),
    Bool(bool),
    DWord(u32),
    QWord(u64),
    Word(u16),
    Guid(Guid),
    Unknown {
        type_code: u16,
        #[serde(serialize_with = "serialize_base64")]
        data: Vec<u8>,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MetadataDescriptor {
    pub name: String,
    pub language_index: u16,
    pub stream_number: u16,
    pub value: MetadataValue,
}

/// Descriptors of an extended content description, metadata or metadata
/// library object
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MetadataContainer {
    pub kind: MetadataKind,
    pub descriptors: Vec<MetadataDescriptor>,
    /// Size mismatches tolerated while reading
    pub warnings: Vec<String>,
}

impl MetadataContainer {
    pub fn get(&self, name: &str) -> Option<&MetadataValue> {
        self.descriptors.iter().find(|d| d.name == name).map(|d| &d.value)
    }
}

fn filetime_to_utc(ticks: u64) -> Option<DateTime<Utc>> {
    if ticks == 0 {
        return None;
    }
    let secs = (ticks / FILETIME_TICKS_PER_SECOND) as i64 - FILETIME_UNIX_EPOCH_SECONDS;
    let nanos = ((ticks % FILETIME_TICKS_PER_SECOND) * 100) as u32;
    DateTime::from_timestamp(secs, nanos)
}

pub fn decode_file_properties(window: &DataWindow<'_>) -> DecodeResult<AsfObject> {
    let mut cursor = window.cursor();
    let file_id = Guid::read(&mut cursor)?;
    let file_size = read_le_u64(&mut cursor)?;
    let creation_time = filetime_to_utc(read_le_u64(&mut cursor)?);
    let data_packets = read_le_u64(&mut cursor)?;
    let play_duration = read_le_u64(&mut cursor)?;
    let send_duration = read_le_u64(&mut cursor)?;
    let preroll = read_le_u64(&mut cursor)?;
    let flags = read_le_u32(&mut cursor)?;
    let min_packet_size = read_le_u32(&mut cursor)?;
    let max_packet_size = read_le_u32(&mut cursor)?;
    let max_bitrate = read_le_u32(&mut cursor)?;

    Ok(AsfObject::FileProperties(FileProperties {
        file_id,
        file_size,
        creation_time,
        data_packets,
        play_duration,
        send_duration,
        preroll,
        flags,
        min_packet_size,
        max_packet_size,
        max_bitrate,
    }))
}

pub fn decode_stream_properties(window: &DataWindow<'_>) -> DecodeResult<AsfObject> {
    let mut cursor = window.cursor();
    let stream_type = Guid::read(&mut cursor)?;
    let _error_correction = Guid::read(&mut cursor)?;
    let _time_offset = read_le_u64(&mut cursor)?;
    let type_data_len = read_le_u32(&mut cursor)?;
    let _error_correction_len = read_le_u32(&mut cursor)?;
    let flags = read_le_u16(&mut cursor)?;
    let _reserved = read_le_u32(&mut cursor)?;

    if stream_type != guid::AUDIO_MEDIA {
        return Ok(AsfObject::StreamProperties(None));
    }
    if type_data_len < 16 {
        return Err(DecodeError::Invalid(format!(
            "audio stream type data too short ({} bytes)",
            type_data_len
        )));
    }

    Ok(AsfObject::StreamProperties(Some(AudioStream {
        stream_number: flags & STREAM_NUMBER_MASK,
        encrypted: flags & STREAM_ENCRYPTED != 0,
        format_tag: read_le_u16(&mut cursor)?,
        channels: read_le_u16(&mut cursor)?,
        sample_rate: read_le_u32(&mut cursor)?,
        average_bytes_per_second: read_le_u32(&mut cursor)?,
        block_align: read_le_u16(&mut cursor)?,
        bits_per_sample: read_le_u16(&mut cursor)?,
    })))
}

pub fn decode_language_list(window: &DataWindow<'_>) -> DecodeResult<AsfObject> {
    let mut cursor = window.cursor();
    let count = read_le_u16(&mut cursor)?;
    let mut languages = Vec::with_capacity(count as usize);
    for _ in 0..count {
        let len = read_u8(&mut cursor)? as usize;
        languages.push(decode_utf16le_fixed(&read_bytes(&mut cursor, len)?));
    }
    Ok(AsfObject::LanguageList(languages))
}

pub fn decode_content_description(window: &DataWindow<'_>) -> DecodeResult<TagContribution> {
    let mut cursor = window.cursor();
    let mut lengths = [0usize; 5];
    for len in lengths.iter_mut() {
        *len = read_le_u16(&mut cursor)? as usize;
    }
    let mut fields = Vec::with_capacity(5);
    for len in lengths {
        fields.push(decode_utf16le_fixed(&read_bytes(&mut cursor, len)?));
    }
    let mut fields = fields.into_iter();
    let mut next = || fields.next().unwrap_or_default();

    Ok(TagContribution::AsfContentDescription(ContentDescription {
        title: next(),
        author: next(),
        copyright: next(),
        description: next(),
        rating: next(),
    }))
}

pub fn decode_extended_content(window: &DataWindow<'_>) -> DecodeResult<TagContribution> {
    decode_metadata_records(window, MetadataKind::ExtendedContent)
}

pub fn decode_metadata(window: &DataWindow<'_>) -> DecodeResult<TagContribution> {
    decode_metadata_records(window, MetadataKind::Metadata)
}

pub fn decode_metadata_library(window: &DataWindow<'_>) -> DecodeResult<TagContribution> {
    decode_metadata_records(window, MetadataKind::MetadataLibrary)
}

/// Shared record layout of the three metadata objects.
///
/// Extended content records carry the name before the type and a u16 data
/// length. The other two carry language index and stream number first, a
/// u32 data length, and the name after the length fields.
fn decode_metadata_records(window: &DataWindow<'_>, kind: MetadataKind) -> DecodeResult<TagContribution> {
    let extended = kind == MetadataKind::ExtendedContent;
    let mut cursor = window.cursor();
    let count = read_le_u16(&mut cursor)?;
    let mut container = MetadataContainer {
        kind,
        descriptors: Vec::with_capacity(count as usize),
        warnings: Vec::new(),
    };

    for _ in 0..count {
        let (language_index, stream_number) = if extended {
            (0, 0)
        } else {
            (read_le_u16(&mut cursor)?, read_le_u16(&mut cursor)?)
        };
        let name_len = read_le_u16(&mut cursor)? as usize;
        let mut name = if extended {
            decode_utf16le_fixed(&read_bytes(&mut cursor, name_len)?)
        } else {
            String::new()
        };
        let type_code = read_le_u16(&mut cursor)?;
        let data_len = if extended {
            read_le_u16(&mut cursor)? as usize
        } else {
            read_le_u32(&mut cursor)? as usize
        };
        if !extended {
            name = decode_utf16le_fixed(&read_bytes(&mut cursor, name_len)?);
        }
        let data = read_bytes(&mut cursor, data_len)?;
        let value = decode_value(&name, type_code, data, extended, &mut container.warnings);

        container.descriptors.push(MetadataDescriptor {
            name,
            language_index,
            stream_number,
            value,
        });
    }

    Ok(TagContribution::AsfMetadata(container))
}

fn decode_value(
    name: &str,
    type_code: u16,
    data: Vec<u8>,
    extended: bool,
    warnings: &mut Vec<String>,
) -> MetadataValue {
    let expect = |width: usize, warnings: &mut Vec<String>| {
        if data.len() != width {
            warnings.push(format!(
                "{}: type {} declares {} bytes, expected {}",
                name,
                type_code,
                data.len(),
                width
            ));
        }
    };
    match type_code {
        0 => MetadataValue::String(decode_utf16le_fixed(&data)),
        1 => MetadataValue::Binary(data),
        2 => {
            expect(if extended { 4 } else { 2 }, warnings);
            MetadataValue::Bool(data.iter().any(|&b| b != 0))
        }
        3 => {
            expect(4, warnings);
            MetadataValue::DWord(le_value(&data) as u32)
        }
        4 => {
            expect(8, warnings);
            MetadataValue::QWord(le_value(&data))
        }
        5 => {
            expect(2, warnings);
            MetadataValue::Word(le_value(&data) as u16)
        }
        6 => {
            expect(Guid::LEN, warnings);
            let mut bytes = [0u8; Guid::LEN];
            let n = data.len().min(Guid::LEN);
            bytes[..n].copy_from_slice(&data[..n]);
            MetadataValue::Guid(Guid(bytes))
        }
        _ => {
            warnings.push(format!("{}: unknown value type {}", name, type_code));
            MetadataValue::Unknown { type_code, data }
        }
    }
}

/// Little-endian integer from up to eight bytes
fn le_value(data: &[u8]) -> u64 {
    data.iter()
        .take(8)
        .enumerate()
        .fold(0u64, |acc, (i, &b)| acc | (b as u64) << (8 * i))
}

/// Fixed part of a header extension payload: reserved GUID, reserved u16,
/// then the byte length of the nested objects
pub const HEADER_EXTENSION_PREFIX: usize = 22;

/// Byte length of the nested objects declared by a header extension prefix
pub fn header_extension_data_size<R: Read>(reader: &mut R) -> std::io::Result<u32> {
    let _reserved = Guid::read(reader)?;
    let _reserved_field = read_le_u16(reader)?;
    read_le_u32(reader)
}

impl AsfObject {
    /// Fold this object into the header record
    pub fn apply(self, header: &mut AudioHeader) {
        match self {
            AsfObject::FileProperties(props) => {
                let details = header.asf_mut();
                details.file_size = Some(props.file_size);
                details.creation_time = props.creation_time;
                details.data_packets = Some(props.data_packets);
                details.play_duration = Some(props.play_duration);
                details.send_duration = Some(props.send_duration);
                details.preroll = Some(props.preroll);
                details.broadcast = props.flags & FLAG_BROADCAST != 0;
                details.seekable = props.flags & FLAG_SEEKABLE != 0;
                details.max_bitrate = Some(props.max_bitrate);
            }
            AsfObject::StreamProperties(stream) => {
                header.asf_mut().stream_count += 1;
                let stream = match stream {
                    Some(stream) if header.sample_rate.is_none() => stream,
                    _ => return,
                };
                header.encoding_type = Some(stream.codec_name());
                header.channels = Some(stream.channels);
                header.sample_rate = Some(stream.sample_rate);
                header.bits_per_sample = Some(stream.bits_per_sample);
                header.asf_mut().average_bytes_per_second = Some(stream.average_bytes_per_second);
            }
            AsfObject::LanguageList(languages) => header.asf_mut().languages = languages,
        }
    }
}
