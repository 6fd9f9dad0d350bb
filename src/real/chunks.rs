// RealMedia chunk decoders

use std::io::Read;

use serde::Serialize;

use crate::error::DecodeResult;
use crate::header::AudioHeader;
use crate::source::DataWindow;
use crate::tag::TagContribution;
use crate::utils::encoding::decode_latin1;
use crate::utils::io::{read_be_u16, read_be_u32, read_bytes};

/// Decoded contribution of one structural chunk
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RealChunk {
    Properties(FileProperties),
    /// Object version this reader has no layout for
    UnsupportedVersion(u16),
}

/// PROP chunk fields, object version 0
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FileProperties {
    /// Bits per second
    pub max_bit_rate: u32,
    /// Bits per second
    pub avg_bit_rate: u32,
    pub max_packet_size: u32,
    pub avg_packet_size: u32,
    pub packet_count: u32,
    /// Milliseconds
    pub duration: u32,
    /// Milliseconds
    pub preroll: u32,
    pub index_offset: u32,
    pub data_offset: u32,
    pub stream_count: u16,
    pub flags: u16,
}

impl FileProperties {
    /// Fold the rates and duration into the header record
    pub fn apply(&self, header: &mut AudioHeader) {
        let max_kbps = self.max_bit_rate / 1000;
        let avg_kbps = self.avg_bit_rate / 1000;
        header.bit_rate = Some(avg_kbps);
        header.precise_length = Some(self.duration as f64 / 1000.0);
        header.variable_bit_rate = max_kbps != avg_kbps;
    }
}

pub fn decode_properties(window: &DataWindow<'_>) -> DecodeResult<RealChunk> {
    let mut cursor = window.cursor();
    let version = read_be_u16(&mut cursor)?;
    if version != 0 {
        return Ok(RealChunk::UnsupportedVersion(version));
    }

    Ok(RealChunk::Properties(FileProperties {
        max_bit_rate: read_be_u32(&mut cursor)?,
        avg_bit_rate: read_be_u32(&mut cursor)?,
        max_packet_size: read_be_u32(&mut cursor)?,
        avg_packet_size: read_be_u32(&mut cursor)?,
        packet_count: read_be_u32(&mut cursor)?,
        duration: read_be_u32(&mut cursor)?,
        preroll: read_be_u32(&mut cursor)?,
        index_offset: read_be_u32(&mut cursor)?,
        data_offset: read_be_u32(&mut cursor)?,
        stream_count: read_be_u16(&mut cursor)?,
        flags: read_be_u16(&mut cursor)?,
    }))
}

/// CONT chunk text
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RealContent {
    pub title: String,
    pub artist: String,
    pub copyright: String,
    pub comment: String,
}

fn read_string<R: Read>(reader: &mut R) -> std::io::Result<String> {
    let len = read_be_u16(reader)? as usize;
    Ok(decode_latin1(&read_bytes(reader, len)?))
}

/// Decode a CONT chunk.
///
/// Many writers leave the title slot empty and shift every field one place
/// along, so an empty title takes the author slot and the artist takes the
/// copyright slot.
pub fn decode_content(window: &DataWindow<'_>) -> DecodeResult<TagContribution> {
    let mut cursor = window.cursor();
    let _version = read_be_u16(&mut cursor)?;
    let title = read_string(&mut cursor)?;
    let author = read_string(&mut cursor)?;
    let copyright = read_string(&mut cursor)?;
    let comment = read_string(&mut cursor)?;

    let content = if title.is_empty() {
        RealContent {
            title: author,
            artist: copyright.clone(),
            copyright,
            comment,
        }
    } else {
        RealContent {
            title,
            artist: author,
            copyright,
            comment,
        }
    };
    Ok(TagContribution::RealContent(content))
}
