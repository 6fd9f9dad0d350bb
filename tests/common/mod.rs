//! Byte builders shared by the integration tests

#![allow(dead_code)]

use std::io::Write;

use chunkscope::asf::guid::{self, Guid};
use tempfile::NamedTempFile;

// ============================================================================
// IFF / AIFF
// ============================================================================

/// Chunk with its big-endian size and a pad byte after odd payloads
pub fn chunk(id: &[u8; 4], payload: &[u8]) -> Vec<u8> {
    let mut out = unpadded_chunk(id, payload);
    if payload.len() % 2 == 1 {
        out.push(0);
    }
    out
}

/// Chunk written without the pad byte an odd payload needs
pub fn unpadded_chunk(id: &[u8; 4], payload: &[u8]) -> Vec<u8> {
    let mut out = id.to_vec();
    out.extend_from_slice(&(payload.len() as u32).to_be_bytes());
    out.extend_from_slice(payload);
    out
}

pub fn form(form_type: &[u8; 4], body: &[u8]) -> Vec<u8> {
    let mut out = b"FORM".to_vec();
    out.extend_from_slice(&(body.len() as u32 + 4).to_be_bytes());
    out.extend_from_slice(form_type);
    out.extend_from_slice(body);
    out
}

/// COMM payload for 16-bit stereo at 44.1 kHz
pub fn comm(frames: u32) -> Vec<u8> {
    let mut out = Vec::new();
    out.extend_from_slice(&2u16.to_be_bytes());
    out.extend_from_slice(&frames.to_be_bytes());
    out.extend_from_slice(&16u16.to_be_bytes());
    out.extend_from_slice(&[0x40, 0x0E, 0xAC, 0x44, 0, 0, 0, 0, 0, 0]);
    out
}

/// ID3v2.3 tag holding a single TIT2 frame. Its length is 21 + title bytes.
pub fn id3_tag(title: &str) -> Vec<u8> {
    let mut frame = b"TIT2".to_vec();
    frame.extend_from_slice(&(title.len() as u32 + 1).to_be_bytes());
    frame.extend_from_slice(&[0, 0, 0]);
    frame.extend_from_slice(title.as_bytes());
    let mut tag = b"ID3\x03\x00\x00\x00\x00".to_vec();
    tag.push((frame.len() >> 7) as u8);
    tag.push((frame.len() & 0x7F) as u8);
    tag.extend_from_slice(&frame);
    tag
}

// ============================================================================
// ASF
// ============================================================================

pub fn object(guid: Guid, payload: &[u8]) -> Vec<u8> {
    let mut out = guid.0.to_vec();
    out.extend_from_slice(&(payload.len() as u64 + 24).to_le_bytes());
    out.extend_from_slice(payload);
    out
}

pub fn header_object(children: &[Vec<u8>]) -> Vec<u8> {
    let mut payload = (children.len() as u32).to_le_bytes().to_vec();
    payload.extend_from_slice(&[1, 2]);
    for child in children {
        payload.extend_from_slice(child);
    }
    object(guid::HEADER, &payload)
}

/// File properties with play duration in 100ns units and preroll in ms
pub fn file_properties(play: u64, preroll: u64) -> Vec<u8> {
    let mut payload = vec![0u8; 16];
    payload.extend_from_slice(&0u64.to_le_bytes());
    payload.extend_from_slice(&0u64.to_le_bytes());
    payload.extend_from_slice(&1u64.to_le_bytes());
    payload.extend_from_slice(&play.to_le_bytes());
    payload.extend_from_slice(&play.to_le_bytes());
    payload.extend_from_slice(&preroll.to_le_bytes());
    payload.extend_from_slice(&2u32.to_le_bytes());
    payload.extend_from_slice(&[0u8; 12]);
    object(guid::FILE_PROPERTIES, &payload)
}

/// WMA v2 stereo stream
pub fn audio_stream(rate: u32, avg_bytes: u32) -> Vec<u8> {
    let mut payload = guid::AUDIO_MEDIA.0.to_vec();
    payload.extend_from_slice(&[0u8; 16]);
    payload.extend_from_slice(&0u64.to_le_bytes());
    payload.extend_from_slice(&18u32.to_le_bytes());
    payload.extend_from_slice(&0u32.to_le_bytes());
    payload.extend_from_slice(&1u16.to_le_bytes());
    payload.extend_from_slice(&0u32.to_le_bytes());
    payload.extend_from_slice(&0x0161u16.to_le_bytes());
    payload.extend_from_slice(&2u16.to_le_bytes());
    payload.extend_from_slice(&rate.to_le_bytes());
    payload.extend_from_slice(&avg_bytes.to_le_bytes());
    payload.extend_from_slice(&4u16.to_le_bytes());
    payload.extend_from_slice(&16u16.to_le_bytes());
    payload.extend_from_slice(&0u16.to_le_bytes());
    object(guid::STREAM_PROPERTIES, &payload)
}

fn utf16z(text: &str) -> Vec<u8> {
    let mut out: Vec<u8> = text.encode_utf16().flat_map(|u| u.to_le_bytes()).collect();
    out.extend_from_slice(&[0, 0]);
    out
}

/// Content description with only a title and an author
pub fn content_description(title: &str, author: &str) -> Vec<u8> {
    let fields = [utf16z(title), utf16z(author), Vec::new(), Vec::new(), Vec::new()];
    let mut payload = Vec::new();
    for field in &fields {
        payload.extend_from_slice(&(field.len() as u16).to_le_bytes());
    }
    for field in &fields {
        payload.extend_from_slice(field);
    }
    object(guid::CONTENT_DESCRIPTION, &payload)
}

/// Extended content description with string-valued descriptors
pub fn extended_content(entries: &[(&str, &str)]) -> Vec<u8> {
    let mut payload = (entries.len() as u16).to_le_bytes().to_vec();
    for (name, value) in entries {
        let name = utf16z(name);
        let value = utf16z(value);
        payload.extend_from_slice(&(name.len() as u16).to_le_bytes());
        payload.extend_from_slice(&name);
        payload.extend_from_slice(&0u16.to_le_bytes());
        payload.extend_from_slice(&(value.len() as u16).to_le_bytes());
        payload.extend_from_slice(&value);
    }
    object(guid::EXTENDED_CONTENT_DESCRIPTION, &payload)
}

// ============================================================================
// Ogg Vorbis
// ============================================================================

pub const OGG_BOS: u8 = 0x02;
pub const OGG_EOS: u8 = 0x04;

pub fn page(granule: i64, sequence: u32, header_type: u8, packets: &[&[u8]]) -> Vec<u8> {
    let mut lacing = Vec::new();
    let mut body = Vec::new();
    for packet in packets {
        let mut left = packet.len();
        while left >= 255 {
            lacing.push(255);
            left -= 255;
        }
        lacing.push(left as u8);
        body.extend_from_slice(packet);
    }
    let mut out = b"OggS".to_vec();
    out.push(0);
    out.push(header_type);
    out.extend_from_slice(&granule.to_le_bytes());
    out.extend_from_slice(&1u32.to_le_bytes());
    out.extend_from_slice(&sequence.to_le_bytes());
    out.extend_from_slice(&0u32.to_le_bytes());
    out.push(lacing.len() as u8);
    out.extend_from_slice(&lacing);
    out.extend_from_slice(&body);
    out
}

pub fn vorbis_identification(channels: u8, rate: u32, max: i32, nominal: i32, min: i32) -> Vec<u8> {
    let mut out = vec![1];
    out.extend_from_slice(b"vorbis");
    out.extend_from_slice(&0u32.to_le_bytes());
    out.push(channels);
    out.extend_from_slice(&rate.to_le_bytes());
    out.extend_from_slice(&max.to_le_bytes());
    out.extend_from_slice(&nominal.to_le_bytes());
    out.extend_from_slice(&min.to_le_bytes());
    out.push(0xB8);
    out.push(0x01);
    out
}

/// Vorbis comment body, as used by FLAC blocks and Ogg comment packets
pub fn comment_block(vendor: &str, entries: &[&str]) -> Vec<u8> {
    let mut out = (vendor.len() as u32).to_le_bytes().to_vec();
    out.extend_from_slice(vendor.as_bytes());
    out.extend_from_slice(&(entries.len() as u32).to_le_bytes());
    for entry in entries {
        out.extend_from_slice(&(entry.len() as u32).to_le_bytes());
        out.extend_from_slice(entry.as_bytes());
    }
    out
}

pub fn vorbis_comment_packet(entries: &[&str]) -> Vec<u8> {
    let mut out = vec![3];
    out.extend_from_slice(b"vorbis");
    out.extend(comment_block("Xiph.Org libVorbis", entries));
    out.push(0x01);
    out
}

/// Three-page stream: identification, comment plus setup, one audio page
pub fn ogg_stream(rate: u32, nominal: i32, final_granule: i64, audio: usize) -> Vec<u8> {
    let mut bytes = page(0, 0, OGG_BOS, &[&vorbis_identification(2, rate, 0, nominal, 0)]);
    bytes.extend(page(0, 1, 0, &[&vorbis_comment_packet(&["TITLE=Tune"]), b"setup"]));
    bytes.extend(page(final_granule, 2, OGG_EOS, &[&vec![0x11; audio]]));
    bytes
}

// ============================================================================
// FLAC
// ============================================================================

pub fn flac_block(block_type: u8, last: bool, payload: &[u8]) -> Vec<u8> {
    let len = payload.len() as u32;
    let mut out = vec![
        block_type | if last { 0x80 } else { 0 },
        (len >> 16) as u8,
        (len >> 8) as u8,
        len as u8,
    ];
    out.extend_from_slice(payload);
    out
}

pub fn stream_info(rate: u32, channels: u8, bits: u8, samples: u64) -> Vec<u8> {
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

// ============================================================================
// RealMedia
// ============================================================================

/// Chunk whose size field counts its own 8-byte header
pub fn real_chunk(id: &[u8; 4], payload: &[u8]) -> Vec<u8> {
    let mut out = id.to_vec();
    out.extend_from_slice(&(payload.len() as u32 + 8).to_be_bytes());
    out.extend_from_slice(payload);
    out
}

pub fn rmf_header(header_count: u32) -> Vec<u8> {
    let mut payload = 0u16.to_be_bytes().to_vec();
    payload.extend_from_slice(&0u32.to_be_bytes());
    payload.extend_from_slice(&header_count.to_be_bytes());
    real_chunk(b".RMF", &payload)
}

pub fn real_properties(max_bps: u32, avg_bps: u32, duration_ms: u32) -> Vec<u8> {
    let mut out = 0u16.to_be_bytes().to_vec();
    for value in [max_bps, avg_bps, 640, 320, 1000, duration_ms, 0, 0, 0] {
        out.extend_from_slice(&value.to_be_bytes());
    }
    out.extend_from_slice(&1u16.to_be_bytes());
    out.extend_from_slice(&0u16.to_be_bytes());
    out
}

pub fn real_content(title: &str, author: &str, copyright: &str, comment: &str) -> Vec<u8> {
    let mut out = 0u16.to_be_bytes().to_vec();
    for field in [title, author, copyright, comment] {
        out.extend_from_slice(&(field.len() as u16).to_be_bytes());
        out.extend_from_slice(field.as_bytes());
    }
    out
}

// ============================================================================
// Files
// ============================================================================

/// Write `bytes` to a temporary file that lives as long as the handle
pub fn temp_file(bytes: &[u8]) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(bytes).unwrap();
    file.flush().unwrap();
    file
}
