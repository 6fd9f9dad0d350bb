// AIFF traversal
//
// Start -> ReadFileHeader -> ReadNextChunk (loop) -> Done
//
// One walk fills both the header record and the tag aggregate. The loop ends
// when the position reaches the end of the source or fewer than 8 bytes are
// left for a chunk header.

use super::chunks::{
    decode_annotation, decode_application, decode_author, decode_comments, decode_common,
    decode_copyright, decode_format_version, decode_name, DecodedChunk,
};
use super::{ids, AIFC, AIFF};
use crate::diagnostics::DiagnosticSink;
use crate::dispatch::{ChunkAction, DecoderTable, Misalignment};
use crate::error::{Error, Result};
use crate::header::{AudioHeader, ContainerFormat};
use crate::id3::v2::decode_id3_chunk;
use crate::iff::{ensure_on_equal_boundary, ChunkHeader, ChunkId, IffFileHeader, SizeField, CHUNK_HEADER_SIZE};
use crate::metrics::iff_bit_rate;
use crate::source::Source;
use crate::tag::{AudioFileInfo, ByteRange, ChunkSummary, Identifier, TagAggregate};

const TARGET: &str = "chunkscope::aiff";

static AIFF_CHUNK_ENTRIES: [(ChunkId, ChunkAction<DecodedChunk>); 13] = [
    (ids::FORMAT_VERSION, ChunkAction::Decode(decode_format_version)),
    (ids::APPLICATION, ChunkAction::Decode(decode_application)),
    (ids::COMMON, ChunkAction::Decode(decode_common)),
    (ids::COMMENTS, ChunkAction::Decode(decode_comments)),
    (ids::NAME, ChunkAction::Decode(decode_name)),
    (ids::AUTHOR, ChunkAction::Decode(decode_author)),
    (ids::COPYRIGHT, ChunkAction::Decode(decode_copyright)),
    (ids::ANNOTATION, ChunkAction::Decode(decode_annotation)),
    (ids::SOUND, ChunkAction::AudioData),
    (ids::TAG, ChunkAction::Tag(decode_id3_chunk)),
    (ids::TAG_LOWERCASE, ChunkAction::Tag(decode_id3_chunk)),
    (ids::CORRUPT_TAG_LATE, ChunkAction::Misaligned(Misalignment::Late)),
    (ids::CORRUPT_TAG_EARLY, ChunkAction::Misaligned(Misalignment::Early)),
];

/// Identifier table for AIFF/AIFC chunks
pub static AIFF_CHUNKS: DecoderTable<ChunkId, DecodedChunk> = DecoderTable::new(&AIFF_CHUNK_ENTRIES);

enum Step {
    Continue,
    Done,
}

/// Read the encoding parameters and tag of an AIFF or AIFC source
pub fn read<S: Source + ?Sized>(source: &mut S, sink: &mut dyn DiagnosticSink) -> Result<AudioFileInfo> {
    sink.debug(TARGET, &format!("Reading AIFF file {} size:{}", source.name(), source.size()));

    let file_header = IffFileHeader::read(source, &[AIFF, AIFC])?;
    let format = if file_header.form_type == AIFC {
        ContainerFormat::Aifc
    } else {
        ContainerFormat::Aiff
    };
    if file_header.size + 8 != source.size() {
        sink.info(
            TARGET,
            &format!(
                "FORM size {} does not match file size {}",
                file_header.size + 8,
                source.size()
            ),
        );
    }

    let mut header = AudioHeader::new(format);
    let mut tag = TagAggregate::new();

    while source.position() < source.size() {
        match read_chunk(source, &mut header, &mut tag, sink)? {
            Step::Continue => {}
            Step::Done => break,
        }
    }

    header.bit_rate = iff_bit_rate(header.audio_data_length, header.precise_length);
    Ok(AudioFileInfo { header, tag })
}

/// Process the chunk at the current position
fn read_chunk<S: Source + ?Sized>(
    source: &mut S,
    header: &mut AudioHeader,
    tag: &mut TagAggregate,
    sink: &mut dyn DiagnosticSink,
) -> Result<Step> {
    let chunk = match ChunkHeader::read_unchecked(source, SizeField::Payload)? {
        Some(chunk) => chunk,
        None => {
            sink.debug(TARGET, "Fewer than 8 bytes left, no more chunks");
            return Ok(Step::Done);
        }
    };
    let action = AIFF_CHUNKS.lookup(&chunk.id);

    // Shifted signatures carry a garbage size, so handle them before validation
    if let Some(ChunkAction::Misaligned(shift)) = action {
        let real_start = match shift {
            Misalignment::Late => chunk.start - 1,
            Misalignment::Early => chunk.start + 1,
        };
        sink.warn(
            TARGET,
            &format!(
                "Found corrupt ID3 chunk starting at odd location {} (read as {} at {})",
                real_start, chunk.id, chunk.start
            ),
        );
        if tag.flag_misaligned() {
            sink.info(TARGET, "First metadata tag is misaligned");
        }
        source.rewind_by(shift.rewind(CHUNK_HEADER_SIZE))?;
        return Ok(Step::Continue);
    }

    chunk.validate(source.size())?;
    sink.debug(
        TARGET,
        &format!(
            "Reading chunk {} starting at {} size incl header {}",
            chunk.id,
            chunk.start,
            chunk.size + CHUNK_HEADER_SIZE
        ),
    );
    tag.add_summary(ChunkSummary::new(
        Identifier::FourCc(chunk.id),
        chunk.start,
        CHUNK_HEADER_SIZE,
        chunk.size,
    ));

    match action {
        Some(ChunkAction::Decode(decoder)) => {
            let data = chunk.read_data(source)?;
            let decoded = decoder(&chunk.window(&data))
                .map_err(|e| Error::decode_failed(chunk.id, chunk.start, e))?;
            for warning in &decoded.warnings {
                sink.warn(TARGET, &format!("{} at {}: {}", chunk.id, chunk.start, warning));
            }
            decoded.chunk.apply(header);
        }
        Some(ChunkAction::AudioData) => {
            // Only the size matters here, the samples are never read
            header.set_audio_data(chunk.data_start(), chunk.size);
            source.skip(chunk.size)?;
        }
        Some(ChunkAction::Tag(decoder)) => {
            if tag.has_primary_tag() {
                sink.warn(
                    TARGET,
                    &format!(
                        "Ignoring ID3 tag because already have one: {} at {}",
                        chunk.id, chunk.start
                    ),
                );
                source.skip(chunk.size)?;
            } else {
                let data = chunk.read_data(source)?;
                let contribution = decoder(&chunk.window(&data))
                    .map_err(|e| Error::decode_failed(chunk.id, chunk.start, e))?;
                tag.capture_primary(
                    contribution,
                    ByteRange {
                        start: chunk.data_start(),
                        end: chunk.data_end(),
                    },
                );
            }
        }
        Some(ChunkAction::SecondaryTag(decoder)) => {
            let data = chunk.read_data(source)?;
            let contribution = decoder(&chunk.window(&data))
                .map_err(|e| Error::decode_failed(chunk.id, chunk.start, e))?;
            tag.add(contribution);
        }
        Some(ChunkAction::Misaligned(_)) | Some(ChunkAction::Container) | None => {
            sink.debug(TARGET, &format!("Skipping chunk {} size {}", chunk.id, chunk.size));
            source.skip(chunk.size)?;
        }
    }

    ensure_on_equal_boundary(source, &chunk, sink)?;
    Ok(Step::Continue)
}
