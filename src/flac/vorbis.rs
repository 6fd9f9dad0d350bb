// Vorbis comment block
//
// Shared by FLAC (VORBIS_COMMENT metadata block) and Ogg Vorbis (comment
// header packet). All lengths are little-endian u32.

use std::io::Read;

use serde::Serialize;

use crate::error::DecodeResult;
use crate::source::DataWindow;
use crate::tag::TagContribution;
use crate::utils::io::{read_bytes, read_le_u32};

/// Vorbis comment structure
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct VorbisComment {
    pub vendor_string: String,
    pub comments: Vec<(String, String)>,
}

impl VorbisComment {
    /// Read a comment block. `limit` bounds the up-front allocation for the
    /// comment list.
    pub fn read<R: Read>(reader: &mut R, limit: usize) -> std::io::Result<Self> {
        let vendor_length = read_le_u32(reader)? as usize;
        let vendor_string = String::from_utf8_lossy(&read_bytes(reader, vendor_length)?).into_owned();

        let comment_count = read_le_u32(reader)? as usize;
        let mut comments = Vec::with_capacity(comment_count.min(limit / 4));
        for _ in 0..comment_count {
            let comment_length = read_le_u32(reader)? as usize;
            let comment = String::from_utf8_lossy(&read_bytes(reader, comment_length)?).into_owned();

            // FIELD=value; entries without a separator are dropped
            if let Some((field, value)) = comment.split_once('=') {
                comments.push((field.to_string(), value.to_string()));
            }
        }

        Ok(VorbisComment {
            vendor_string,
            comments,
        })
    }

    /// First value for a field, compared case-insensitively
    pub fn get(&self, field: &str) -> Option<&str> {
        self.comments
            .iter()
            .find(|(f, _)| f.eq_ignore_ascii_case(field))
            .map(|(_, v)| v.as_str())
    }
}

/// Common Vorbis comment field names
pub struct VorbisFields;

impl VorbisFields {
    pub const TITLE: &'static str = "TITLE";
    pub const ARTIST: &'static str = "ARTIST";
    pub const ALBUM: &'static str = "ALBUM";
    pub const DATE: &'static str = "DATE";
    pub const TRACKNUMBER: &'static str = "TRACKNUMBER";
    pub const GENRE: &'static str = "GENRE";
}

/// Tag decoder for a FLAC VORBIS_COMMENT block
pub fn decode_vorbis_comment_block(window: &DataWindow<'_>) -> DecodeResult<TagContribution> {
    let comment = VorbisComment::read(&mut window.cursor(), window.len())?;
    Ok(TagContribution::VorbisComment(comment))
}
