//! Chunkscope - structural metadata extraction for chunked audio containers
//!
//! Walks AIFF/AIFC (IFF chunks), ASF/WMA (GUID objects), Ogg Vorbis (pages),
//! FLAC (metadata blocks) and RealMedia (chunks), producing an [`AudioHeader`] with the encoding
//! parameters and a [`TagAggregate`] with the tag blocks found plus a summary
//! of every chunk seen.
//!
//! ```no_run
//! let info = chunkscope::read_path("song.aiff", &chunkscope::ReadOptions::default())?;
//! println!("{:?} kbps", info.header.bit_rate);
//! # Ok::<(), chunkscope::Error>(())
//! ```

use std::path::Path;

pub mod aiff;
pub mod asf;
pub mod diagnostics;
pub mod dispatch;
pub mod error;
pub mod flac;
pub mod header;
pub mod id3;
pub mod iff;
pub mod metrics;
pub mod ogg;
pub mod real;
pub mod source;
pub mod tag;
pub mod utils;

pub use diagnostics::{DiagnosticSink, LogSink, NullSink, RecordingSink};
pub use error::{Error, Result};
pub use header::{AudioHeader, ContainerFormat};
pub use source::{DataWindow, FileSource, MemorySource, Source};
pub use tag::{AudioFileInfo, ChunkSummary, Identifier, TagAggregate, TagContribution};

/// Files no larger than this cannot hold a meaningful audio file
pub const MINIMUM_SIZE_FOR_VALID_AUDIO_FILE: u64 = 100;

/// Options for the path and source entry points
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReadOptions {
    /// Sources of this size or smaller fail with `FileTooSmall`
    pub min_file_size: u64,
    /// Keep tag contributions in the result. Chunk summaries are always kept.
    pub read_tag: bool,
}

impl Default for ReadOptions {
    fn default() -> Self {
        ReadOptions {
            min_file_size: MINIMUM_SIZE_FOR_VALID_AUDIO_FILE,
            read_tag: true,
        }
    }
}

fn sniff(prefix: &[u8]) -> Option<ContainerFormat> {
    if prefix.len() >= 12 && &prefix[0..4] == b"FORM" {
        return match &prefix[8..12] {
            b"AIFF" => Some(ContainerFormat::Aiff),
            b"AIFC" => Some(ContainerFormat::Aifc),
            _ => None,
        };
    }
    if prefix.len() >= asf::Guid::LEN && prefix[..asf::Guid::LEN] == asf::guid::HEADER.0 {
        return Some(ContainerFormat::Asf);
    }
    if prefix.len() >= 4 && &prefix[0..4] == ogg::OGG_SIGNATURE {
        return Some(ContainerFormat::OggVorbis);
    }
    if prefix.len() >= 4 && &prefix[0..4] == flac::FLAC_SIGNATURE {
        return Some(ContainerFormat::Flac);
    }
    if prefix.len() >= 4 && &prefix[0..4] == real::RMF_SIGNATURE {
        return Some(ContainerFormat::Real);
    }
    None
}

fn read_prefix<S: Source + ?Sized>(source: &mut S) -> Result<Vec<u8>> {
    let len = source.remaining().min(16);
    source.read_vec(len)
}

/// Identify the container from its magic bytes.
///
/// An ID3v2 tag in front of an Ogg or FLAC stream is looked past. The source
/// is left at offset 0.
pub fn detect_format<S: Source + ?Sized>(source: &mut S) -> Result<Option<ContainerFormat>> {
    source.seek(0)?;
    let mut format = sniff(&read_prefix(source)?);
    if format.is_none() {
        source.seek(0)?;
        if id3::Id3v2Header::skip_leading(source)?.is_some() {
            format = sniff(&read_prefix(source)?)
                .filter(|f| matches!(f, ContainerFormat::OggVorbis | ContainerFormat::Flac));
        }
    }
    source.seek(0)?;
    Ok(format)
}

/// Run the traversal for `format`
pub fn read_source<S: Source + ?Sized>(
    source: &mut S,
    format: ContainerFormat,
    sink: &mut dyn DiagnosticSink,
) -> Result<AudioFileInfo> {
    match format {
        ContainerFormat::Aiff | ContainerFormat::Aifc => aiff::read(source, sink),
        ContainerFormat::Asf => asf::read(source, sink),
        ContainerFormat::OggVorbis => ogg::read(source, sink),
        ContainerFormat::Flac => flac::read(source, sink),
        ContainerFormat::Real => real::read(source, sink),
    }
}

/// Check the size, sniff the format and run its traversal
pub fn read_with<S: Source + ?Sized>(
    source: &mut S,
    options: &ReadOptions,
    sink: &mut dyn DiagnosticSink,
) -> Result<AudioFileInfo> {
    if source.size() <= options.min_file_size {
        return Err(Error::FileTooSmall {
            size: source.size(),
            minimum: options.min_file_size,
        });
    }
    let format = detect_format(source)?.ok_or(Error::UnknownFormat)?;
    let mut info = read_source(source, format, sink)?;
    if !options.read_tag {
        info.tag.contributions.clear();
        info.tag.tag_location = None;
    }
    Ok(info)
}

/// Open `path`, read it, and close it again on every exit path.
/// Diagnostics go to the `log` facade.
pub fn read_path<P: AsRef<Path>>(path: P, options: &ReadOptions) -> Result<AudioFileInfo> {
    let mut source = FileSource::open(path)?;
    read_with(&mut source, options, &mut LogSink)
}
