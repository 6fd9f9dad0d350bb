// FLAC PICTURE block implementation

use std::io::Read;

use serde::Serialize;

use crate::error::DecodeResult;
use crate::source::DataWindow;
use crate::tag::{serialize_base64, TagContribution};
use crate::utils::io::{read_be_u32, read_bytes};

/// Picture types according to FLAC specification
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PictureType {
    Other,
    FileIcon,
    OtherFileIcon,
    CoverFront,
    CoverBack,
    LeafletPage,
    Media,
    LeadArtist,
    Artist,
    Conductor,
    Band,
    Composer,
    Lyricist,
    RecordingLocation,
    DuringRecording,
    DuringPerformance,
    VideoScreenCapture,
    BrightColouredFish,
    Illustration,
    BandLogo,
    PublisherLogo,
}

impl PictureType {
    pub fn from_u32(value: u32) -> Self {
        match value {
            1 => PictureType::FileIcon,
            2 => PictureType::OtherFileIcon,
            3 => PictureType::CoverFront,
            4 => PictureType::CoverBack,
            5 => PictureType::LeafletPage,
            6 => PictureType::Media,
            7 => PictureType::LeadArtist,
            8 => PictureType::Artist,
            9 => PictureType::Conductor,
            10 => PictureType::Band,
            11 => PictureType::Composer,
            12 => PictureType::Lyricist,
            13 => PictureType::RecordingLocation,
            14 => PictureType::DuringRecording,
            15 => PictureType::DuringPerformance,
            16 => PictureType::VideoScreenCapture,
            17 => PictureType::BrightColouredFish,
            18 => PictureType::Illustration,
            19 => PictureType::BandLogo,
            20 => PictureType::PublisherLogo,
            _ => PictureType::Other,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            PictureType::Other => "Other",
            PictureType::FileIcon => "File Icon",
            PictureType::OtherFileIcon => "Other File Icon",
            PictureType::CoverFront => "Cover (front)",
            PictureType::CoverBack => "Cover (back)",
            PictureType::LeafletPage => "Leaflet page",
            PictureType::Media => "Media",
            PictureType::LeadArtist => "Lead artist",
            PictureType::Artist => "Artist",
            PictureType::Conductor => "Conductor",
            PictureType::Band => "Band",
            PictureType::Composer => "Composer",
            PictureType::Lyricist => "Lyricist",
            PictureType::RecordingLocation => "Recording Location",
            PictureType::DuringRecording => "During recording",
            PictureType::DuringPerformance => "During performance",
            PictureType::VideoScreenCapture => "Video screen capture",
            PictureType::BrightColouredFish => "Bright coloured fish",
            PictureType::Illustration => "Illustration",
            PictureType::BandLogo => "Band logo",
            PictureType::PublisherLogo => "Publisher logo",
        }
    }
}

impl Serialize for PictureType {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

/// FLAC PICTURE block structure
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FlacPicture {
    pub picture_type: PictureType,
    pub mime_type: String,
    pub description: String,
    pub width: u32,
    pub height: u32,
    pub depth: u32,
    pub colors: u32,
    #[serde(serialize_with = "serialize_base64")]
    pub data: Vec<u8>,
}

impl FlacPicture {
    /// Read a PICTURE block payload. All integers are big-endian u32.
    pub fn read<R: Read>(reader: &mut R) -> std::io::Result<Self> {
        let picture_type = PictureType::from_u32(read_be_u32(reader)?);

        let mime_length = read_be_u32(reader)? as usize;
        let mime_type = String::from_utf8_lossy(&read_bytes(reader, mime_length)?).into_owned();

        let desc_length = read_be_u32(reader)? as usize;
        let description = String::from_utf8_lossy(&read_bytes(reader, desc_length)?).into_owned();

        let width = read_be_u32(reader)?;
        let height = read_be_u32(reader)?;
        let depth = read_be_u32(reader)?;
        let colors = read_be_u32(reader)?;

        let data_length = read_be_u32(reader)? as usize;
        let data = read_bytes(reader, data_length)?;

        Ok(FlacPicture {
            picture_type,
            mime_type,
            description,
            width,
            height,
            depth,
            colors,
            data,
        })
    }
}

/// Tag decoder for a PICTURE block
pub fn decode_picture_block(window: &DataWindow<'_>) -> DecodeResult<TagContribution> {
    let picture = FlacPicture::read(&mut window.cursor())?;
    Ok(TagContribution::Picture(picture))
}
