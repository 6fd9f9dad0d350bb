// Tag aggregate and chunk summaries

use serde::{Serialize, Serializer};

use crate::asf::decoders::{ContentDescription, MetadataContainer};
use crate::asf::guid::Guid;
use crate::flac::FlacPicture;
use crate::id3::Id3v2Tag;
use crate::iff::ChunkId;
use crate::ogg::VorbisComment;
use crate::real::RealContent;

/// Identifier of a chunk, object, block or packet
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Identifier {
    FourCc(ChunkId),
    Guid(Guid),
    Named(&'static str),
}

impl std::fmt::Display for Identifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Identifier::FourCc(id) => write!(f, "{}", id),
            Identifier::Guid(guid) => match guid.name() {
                Some(name) => write!(f, "{} ({})", name, guid),
                None => write!(f, "{}", guid),
            },
            Identifier::Named(name) => f.write_str(name),
        }
    }
}

impl Serialize for Identifier {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Diagnostic record of one chunk seen during traversal
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChunkSummary {
    pub id: Identifier,
    /// Offset of the chunk header
    pub offset: u64,
    pub header_size: u64,
    /// Declared payload length
    pub size: u64,
}

impl ChunkSummary {
    pub fn new(id: Identifier, offset: u64, header_size: u64, size: u64) -> Self {
        ChunkSummary {
            id,
            offset,
            header_size,
            size,
        }
    }

    pub fn data_start(&self) -> u64 {
        self.offset + self.header_size
    }

    /// Offset one past the payload (padding excluded)
    pub fn end(&self) -> u64 {
        self.data_start() + self.size
    }
}

/// Half-open byte range `[start, end)` in the source
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ByteRange {
    pub start: u64,
    pub end: u64,
}

/// Something a tag-bearing chunk contributed
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TagContribution {
    Id3v2(Id3v2Tag),
    VorbisComment(VorbisComment),
    Picture(FlacPicture),
    AsfContentDescription(ContentDescription),
    AsfMetadata(MetadataContainer),
    RealContent(RealContent),
}

/// Tag contributions plus the diagnostic chunk list of one traversal
#[derive(Debug, Clone, Default, Serialize)]
pub struct TagAggregate {
    pub contributions: Vec<TagContribution>,
    /// Byte range of the primary tag, once one has been captured
    pub tag_location: Option<ByteRange>,
    pub chunk_summaries: Vec<ChunkSummary>,
    /// Set when the first tag signature was found off the even boundary
    pub incorrectly_aligned_tag: bool,
}

impl TagAggregate {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether the primary tag has already been taken
    pub fn has_primary_tag(&self) -> bool {
        self.tag_location.is_some()
    }

    /// Capture the primary tag. Later calls are ignored.
    pub(crate) fn capture_primary(&mut self, contribution: TagContribution, range: ByteRange) -> bool {
        if self.has_primary_tag() {
            return false;
        }
        self.contributions.push(contribution);
        self.tag_location = Some(range);
        true
    }

    pub(crate) fn add(&mut self, contribution: TagContribution) {
        self.contributions.push(contribution);
    }

    pub(crate) fn add_summary(&mut self, summary: ChunkSummary) {
        self.chunk_summaries.push(summary);
    }

    /// Flag a misaligned tag. Only counts while no tag has been captured,
    /// and only the first occurrence changes state. Returns whether it did.
    pub(crate) fn flag_misaligned(&mut self) -> bool {
        if self.has_primary_tag() || self.incorrectly_aligned_tag {
            return false;
        }
        self.incorrectly_aligned_tag = true;
        true
    }

    pub fn id3v2(&self) -> Option<&Id3v2Tag> {
        self.contributions.iter().find_map(|c| match c {
            TagContribution::Id3v2(tag) => Some(tag),
            _ => None,
        })
    }

    pub fn vorbis_comment(&self) -> Option<&VorbisComment> {
        self.contributions.iter().find_map(|c| match c {
            TagContribution::VorbisComment(comment) => Some(comment),
            _ => None,
        })
    }

    pub fn pictures(&self) -> impl Iterator<Item = &FlacPicture> {
        self.contributions.iter().filter_map(|c| match c {
            TagContribution::Picture(picture) => Some(picture),
            _ => None,
        })
    }

    pub fn asf_content_description(&self) -> Option<&ContentDescription> {
        self.contributions.iter().find_map(|c| match c {
            TagContribution::AsfContentDescription(d) => Some(d),
            _ => None,
        })
    }

    pub fn asf_metadata(&self) -> impl Iterator<Item = &MetadataContainer> {
        self.contributions.iter().filter_map(|c| match c {
            TagContribution::AsfMetadata(m) => Some(m),
            _ => None,
        })
    }

    pub fn real_content(&self) -> Option<&RealContent> {
        self.contributions.iter().find_map(|c| match c {
            TagContribution::RealContent(content) => Some(content),
            _ => None,
        })
    }
}

/// Header record plus tag aggregate of one file
#[derive(Debug, Clone, Serialize)]
pub struct AudioFileInfo {
    pub header: crate::header::AudioHeader,
    pub tag: TagAggregate,
}

/// Serialize binary payloads as base64 text
pub(crate) fn serialize_base64<S: Serializer>(data: &[u8], serializer: S) -> Result<S::Ok, S::Error> {
    use base64::Engine;
    serializer.serialize_str(&base64::engine::general_purpose::STANDARD.encode(data))
}
