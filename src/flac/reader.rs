// FLAC traversal
//
// Start -> LocateStream -> ReadNextBlock (until the last-block flag) -> Done
//
// The audio frames run from the end of the last metadata block to the end of
// the file and are never read.

use super::metadata::{
    decode_stream_info, FlacBlock, FlacMetadataBlockHeader, FlacMetadataBlockType, BLOCK_HEADER_SIZE,
    FLAC_SIGNATURE,
};
use super::picture::decode_picture_block;
use super::vorbis::decode_vorbis_comment_block;
use crate::diagnostics::DiagnosticSink;
use crate::dispatch::{ChunkAction, DecoderTable};
use crate::error::{Error, Result};
use crate::header::{AudioHeader, ContainerFormat};
use crate::id3::Id3v2Header;
use crate::metrics::iff_bit_rate;
use crate::source::Source;
use crate::tag::{AudioFileInfo, ByteRange, ChunkSummary, Identifier, TagAggregate};

const TARGET: &str = "chunkscope::flac";

static FLAC_BLOCK_ENTRIES: [(FlacMetadataBlockType, ChunkAction<FlacBlock>); 3] = [
    (FlacMetadataBlockType::StreamInfo, ChunkAction::Decode(decode_stream_info)),
    (FlacMetadataBlockType::VorbisComment, ChunkAction::Tag(decode_vorbis_comment_block)),
    (FlacMetadataBlockType::Picture, ChunkAction::SecondaryTag(decode_picture_block)),
];

/// Identifier table for FLAC metadata blocks
pub static FLAC_BLOCKS: DecoderTable<FlacMetadataBlockType, FlacBlock> = DecoderTable::new(&FLAC_BLOCK_ENTRIES);

fn signature_at<S: Source + ?Sized>(source: &mut S, offset: u64) -> Result<bool> {
    if offset + 4 > source.size() {
        return Ok(false);
    }
    source.seek(offset)?;
    let mut signature = [0u8; 4];
    source.read_exact(&mut signature)?;
    Ok(&signature == FLAC_SIGNATURE)
}

/// Position the source just past `fLaC`, tolerating a leading ID3v2 tag.
/// Returns the offset of the signature.
fn find_stream<S: Source + ?Sized>(
    source: &mut S,
    tag: &mut TagAggregate,
    sink: &mut dyn DiagnosticSink,
) -> Result<u64> {
    if signature_at(source, 0)? {
        return Ok(0);
    }
    source.seek(0)?;
    if let Some(id3) = Id3v2Header::skip_leading(source)? {
        let offset = source.position();
        sink.warn(TARGET, &format!("FLAC file contains an ID3v2 tag, stream starts at {}", offset));
        tag.add_summary(ChunkSummary::new(
            Identifier::Named("ID3"),
            0,
            Id3v2Header::HEADER_SIZE as u64,
            id3.total_size() - Id3v2Header::HEADER_SIZE as u64,
        ));
        if signature_at(source, offset)? {
            return Ok(offset);
        }
    }

    source.seek(0)?;
    let mut found = [0u8; 4];
    let n = source.read(&mut found)?;
    Err(Error::NoContainerHeaderFound {
        found: String::from_utf8_lossy(&found[..n]).into_owned(),
    })
}

/// Read the STREAMINFO parameters and tag blocks of a FLAC source
pub fn read<S: Source + ?Sized>(source: &mut S, sink: &mut dyn DiagnosticSink) -> Result<AudioFileInfo> {
    sink.debug(TARGET, &format!("Reading FLAC file {} size:{}", source.name(), source.size()));
    let mut header = AudioHeader::new(ContainerFormat::Flac);
    let mut tag = TagAggregate::new();

    let stream_start = find_stream(source, &mut tag, sink)?;
    tag.add_summary(ChunkSummary::new(Identifier::Named("fLaC"), stream_start, 4, 0));

    let mut first = true;
    loop {
        if source.remaining() < BLOCK_HEADER_SIZE {
            return Err(Error::corrupt(
                "fLaC",
                source.position(),
                "metadata ended without a last-block flag",
            ));
        }
        let block = FlacMetadataBlockHeader::read(source)?;
        if first && block.block_type != FlacMetadataBlockType::StreamInfo {
            sink.warn(
                TARGET,
                &format!("First metadata block is {} not STREAMINFO", block.block_type.name()),
            );
        }
        first = false;
        read_block(source, &block, &mut header, &mut tag, sink)?;
        source.seek(block.data_end())?;
        if block.is_last {
            break;
        }
    }

    let audio_start = source.position();
    header.set_audio_data(audio_start, source.size() - audio_start);
    header.bit_rate = iff_bit_rate(header.audio_data_length, header.precise_length);
    Ok(AudioFileInfo { header, tag })
}

fn read_block<S: Source + ?Sized>(
    source: &mut S,
    block: &FlacMetadataBlockHeader,
    header: &mut AudioHeader,
    tag: &mut TagAggregate,
    sink: &mut dyn DiagnosticSink,
) -> Result<()> {
    let name = block.block_type.name();
    sink.debug(
        TARGET,
        &format!("Reading {} block at {} length {}", name, block.start, block.length),
    );
    tag.add_summary(ChunkSummary::new(
        Identifier::Named(name),
        block.start,
        BLOCK_HEADER_SIZE,
        block.length as u64,
    ));

    match FLAC_BLOCKS.lookup(&block.block_type) {
        Some(ChunkAction::Decode(decoder)) => {
            let data = source.read_vec(block.length as u64)?;
            let FlacBlock::StreamInfo(info) =
                decoder(&block.window(&data)).map_err(|e| Error::decode_failed(name, block.start, e))?;
            header.sample_rate = Some(info.sample_rate);
            header.channels = Some(info.channels as u16);
            header.bits_per_sample = Some(info.bits_per_sample as u16);
            header.encoding_type = Some(format!("FLAC {} bits", info.bits_per_sample));
            if info.total_samples > 0 {
                header.no_of_samples = Some(info.total_samples);
                header.precise_length = Some(info.total_samples as f64 / info.sample_rate as f64);
            }
        }
        Some(ChunkAction::Tag(decoder)) => {
            if tag.has_primary_tag() {
                sink.warn(
                    TARGET,
                    &format!("Ignoring {} block at {} because already have one", name, block.start),
                );
            } else {
                let data = source.read_vec(block.length as u64)?;
                let contribution =
                    decoder(&block.window(&data)).map_err(|e| Error::decode_failed(name, block.start, e))?;
                tag.capture_primary(
                    contribution,
                    ByteRange {
                        start: block.data_start(),
                        end: block.data_end(),
                    },
                );
            }
        }
        Some(ChunkAction::SecondaryTag(decoder)) => {
            let data = source.read_vec(block.length as u64)?;
            let contribution =
                decoder(&block.window(&data)).map_err(|e| Error::decode_failed(name, block.start, e))?;
            tag.add(contribution);
        }
        _ => sink.debug(TARGET, &format!("Skipping {} block", name)),
    }
    Ok(())
}
