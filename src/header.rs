// Audio header record
//
// Filled incrementally while a traversal walks the container, then finalized
// by the metrics pass. Plain data: no behaviour beyond a few accessors.

use chrono::{DateTime, Utc};
use serde::Serialize;

/// Container dialect a header was read from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ContainerFormat {
    Aiff,
    Aifc,
    Asf,
    OggVorbis,
    Flac,
    Real,
}

impl ContainerFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            ContainerFormat::Aiff => "AIFF",
            ContainerFormat::Aifc => "AIFC",
            ContainerFormat::Asf => "ASF",
            ContainerFormat::OggVorbis => "Ogg Vorbis",
            ContainerFormat::Flac => "FLAC",
            ContainerFormat::Real => "RealMedia",
        }
    }
}

impl std::fmt::Display for ContainerFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Encoding parameters accumulated during a traversal
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct AudioHeader {
    pub format: Option<ContainerFormat>,
    pub encoding_type: Option<String>,
    pub sample_rate: Option<u32>,
    pub channels: Option<u16>,
    pub bits_per_sample: Option<u16>,
    /// Sample frames per channel, when the container declares it
    pub no_of_samples: Option<u64>,
    pub audio_data_start: Option<u64>,
    pub audio_data_end: Option<u64>,
    pub audio_data_length: Option<u64>,
    /// Track length in seconds
    pub precise_length: Option<f64>,
    /// Kilobits per second
    pub bit_rate: Option<u32>,
    pub variable_bit_rate: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub aiff: Option<AiffDetails>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub asf: Option<AsfDetails>,
}

impl AudioHeader {
    pub fn new(format: ContainerFormat) -> Self {
        AudioHeader {
            format: Some(format),
            ..Default::default()
        }
    }

    /// Track length rounded to whole seconds
    pub fn track_length(&self) -> Option<u64> {
        self.precise_length.map(|secs| secs.round().max(0.0) as u64)
    }

    /// Record where the audio payload lives
    pub fn set_audio_data(&mut self, start: u64, length: u64) {
        self.audio_data_start = Some(start);
        self.audio_data_end = Some(start + length);
        self.audio_data_length = Some(length);
    }

    pub(crate) fn aiff_mut(&mut self) -> &mut AiffDetails {
        self.aiff.get_or_insert_with(AiffDetails::default)
    }

    pub(crate) fn asf_mut(&mut self) -> &mut AsfDetails {
        self.asf.get_or_insert_with(AsfDetails::default)
    }
}

/// Text and auxiliary chunks found in AIFF/AIFC files
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct AiffDetails {
    /// AIFC format version timestamp (FVER)
    pub format_version: Option<u32>,
    pub compression_type: Option<String>,
    pub compression_name: Option<String>,
    pub name: Option<String>,
    pub author: Option<String>,
    pub copyright: Option<String>,
    pub annotations: Vec<String>,
    pub comments: Vec<AiffComment>,
    pub applications: Vec<ApplicationData>,
}

/// One entry of a COMT chunk
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AiffComment {
    /// Seconds since 1904-01-01
    pub timestamp: u32,
    pub marker_id: i16,
    pub text: String,
}

/// APPL chunk payload
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ApplicationData {
    pub signature: String,
    /// Decoded text for `pdos`/`stoc` style signatures, otherwise empty
    pub text: String,
    pub length: usize,
}

/// Properties only ASF files carry
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct AsfDetails {
    pub file_size: Option<u64>,
    pub creation_time: Option<DateTime<Utc>>,
    pub data_packets: Option<u64>,
    /// 100-nanosecond units
    pub play_duration: Option<u64>,
    pub send_duration: Option<u64>,
    /// Milliseconds
    pub preroll: Option<u64>,
    pub broadcast: bool,
    pub seekable: bool,
    pub max_bitrate: Option<u32>,
    /// Average byte rate of the first audio stream
    pub average_bytes_per_second: Option<u32>,
    pub stream_count: u32,
    pub languages: Vec<String>,
}
