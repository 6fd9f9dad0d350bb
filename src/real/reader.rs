// RealMedia traversal
//
// Start -> ReadFileHeader -> ReadNextChunk (loop) -> Done
//
// The walk ends when fewer than 8 bytes remain. DATA packets are never read.

use super::chunks::{decode_content, decode_properties, RealChunk};
use super::ids;
use crate::diagnostics::DiagnosticSink;
use crate::dispatch::{ChunkAction, DecoderTable};
use crate::error::{Error, Result};
use crate::header::{AudioHeader, ContainerFormat};
use crate::iff::{ChunkHeader, ChunkId, SizeField, CHUNK_HEADER_SIZE};
use crate::source::Source;
use crate::tag::{AudioFileInfo, ByteRange, ChunkSummary, Identifier, TagAggregate};

const TARGET: &str = "chunkscope::real";

static REAL_CHUNK_ENTRIES: [(ChunkId, ChunkAction<RealChunk>); 3] = [
    (ids::PROPERTIES, ChunkAction::Decode(decode_properties)),
    (ids::CONTENT, ChunkAction::Tag(decode_content)),
    (ids::DATA, ChunkAction::AudioData),
];

/// Identifier table for RealMedia chunks
pub static REAL_CHUNKS: DecoderTable<ChunkId, RealChunk> = DecoderTable::new(&REAL_CHUNK_ENTRIES);

/// Read the file properties and content tag of a RealMedia source
pub fn read<S: Source + ?Sized>(source: &mut S, sink: &mut dyn DiagnosticSink) -> Result<AudioFileInfo> {
    sink.debug(TARGET, &format!("Reading RealMedia file {} size:{}", source.name(), source.size()));
    source.seek(0)?;

    let mut header = AudioHeader::new(ContainerFormat::Real);
    let mut tag = TagAggregate::new();

    let file_header = ChunkHeader::read(source, SizeField::WholeChunk)?
        .ok_or_else(|| Error::corrupt(ids::FILE_HEADER, 0, "file too short for a file header"))?;
    if file_header.id != ids::FILE_HEADER {
        return Err(Error::corrupt(file_header.id, 0, "not a RealMedia file, .RMF header missing"));
    }
    summarize(&file_header, &mut tag);
    source.seek(file_header.data_end())?;

    while let Some(chunk) = ChunkHeader::read(source, SizeField::WholeChunk)? {
        read_chunk(source, &chunk, &mut header, &mut tag, sink)?;
        source.seek(chunk.data_end())?;
    }

    if source.remaining() > 0 {
        sink.debug(
            TARGET,
            &format!("Ignoring {} trailing bytes at {}", source.remaining(), source.position()),
        );
    }
    if header.precise_length.is_none() {
        sink.warn(TARGET, "No usable PROP chunk, length and bit rate unknown");
    }
    Ok(AudioFileInfo { header, tag })
}

fn summarize(chunk: &ChunkHeader, tag: &mut TagAggregate) {
    tag.add_summary(ChunkSummary::new(
        Identifier::FourCc(chunk.id),
        chunk.start,
        CHUNK_HEADER_SIZE,
        chunk.size,
    ));
}

fn read_chunk<S: Source + ?Sized>(
    source: &mut S,
    chunk: &ChunkHeader,
    header: &mut AudioHeader,
    tag: &mut TagAggregate,
    sink: &mut dyn DiagnosticSink,
) -> Result<()> {
    sink.debug(
        TARGET,
        &format!("Reading chunk {} at {} size {}", chunk.id, chunk.start, chunk.size),
    );
    summarize(chunk, tag);

    match REAL_CHUNKS.lookup(&chunk.id) {
        Some(ChunkAction::Decode(decoder)) => {
            let data = chunk.read_data(source)?;
            match decoder(&chunk.window(&data)).map_err(|e| Error::decode_failed(chunk.id, chunk.start, e))? {
                RealChunk::Properties(props) => props.apply(header),
                RealChunk::UnsupportedVersion(version) => sink.warn(
                    TARGET,
                    &format!("{} at {} has unsupported object version {}", chunk.id, chunk.start, version),
                ),
            }
        }
        Some(ChunkAction::AudioData) => header.set_audio_data(chunk.data_start(), chunk.size),
        Some(ChunkAction::Tag(decoder)) => {
            if tag.has_primary_tag() {
                sink.warn(
                    TARGET,
                    &format!("Ignoring {} at {} because already have one", chunk.id, chunk.start),
                );
            } else {
                let data = chunk.read_data(source)?;
                let contribution =
                    decoder(&chunk.window(&data)).map_err(|e| Error::decode_failed(chunk.id, chunk.start, e))?;
                tag.capture_primary(
                    contribution,
                    ByteRange {
                        start: chunk.data_start(),
                        end: chunk.data_end(),
                    },
                );
            }
        }
        _ => sink.debug(TARGET, &format!("Skipping {} chunk", chunk.id)),
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diagnostics::{NullSink, RecordingSink};
    use crate::real::chunks::tests::{content_payload, properties_payload};
    use crate::source::MemorySource;

    fn chunk(id: &[u8; 4], payload: &[u8]) -> Vec<u8> {
        let mut out = id.to_vec();
        out.extend_from_slice(&(payload.len() as u32 + 8).to_be_bytes());
        out.extend_from_slice(payload);
        out
    }

    fn file_header() -> Vec<u8> {
        let mut payload = 0u16.to_be_bytes().to_vec();
        payload.extend_from_slice(&0u32.to_be_bytes());
        payload.extend_from_slice(&4u32.to_be_bytes());
        chunk(b".RMF", &payload)
    }

    #[test]
    fn walks_every_chunk() {
        let mut bytes = file_header();
        bytes.extend(chunk(b"PROP", &properties_payload(64_000, 64_000, 30_000)));
        bytes.extend(chunk(b"MDPR", &[0u8; 41]));
        bytes.extend(chunk(b"CONT", &content_payload(["Song", "Band", "", ""])));
        let data_start = bytes.len() as u64 + 8;
        bytes.extend(chunk(b"DATA", &[0u8; 301]));
        bytes.extend(chunk(b"INDX", &[0u8; 12]));
        let size = bytes.len() as u64;

        let mut src = MemorySource::new(bytes);
        let info = read(&mut src, &mut NullSink).unwrap();
        assert_eq!(src.position(), size);
        assert_eq!(info.header.format, Some(ContainerFormat::Real));
        assert_eq!(info.header.bit_rate, Some(64));
        assert_eq!(info.header.precise_length, Some(30.0));
        assert!(!info.header.variable_bit_rate);
        assert_eq!(info.header.audio_data_start, Some(data_start));
        assert_eq!(info.header.audio_data_length, Some(301));
        assert_eq!(info.tag.real_content().unwrap().title, "Song");

        let ids: Vec<String> = info.tag.chunk_summaries.iter().map(|s| s.id.to_string()).collect();
        assert_eq!(ids, [".RMF", "PROP", "MDPR", "CONT", "DATA", "INDX"]);
        // No padding after the odd MDPR and DATA payloads
        assert_eq!(info.tag.chunk_summaries[3].offset, info.tag.chunk_summaries[2].end());
    }

    #[test]
    fn first_content_chunk_wins() {
        let mut bytes = file_header();
        bytes.extend(chunk(b"CONT", &content_payload(["First", "", "", ""])));
        bytes.extend(chunk(b"CONT", &content_payload(["Second", "", "", ""])));

        let mut sink = RecordingSink::new();
        let info = read(&mut MemorySource::new(bytes), &mut sink).unwrap();
        assert_eq!(info.tag.contributions.len(), 1);
        assert_eq!(info.tag.real_content().unwrap().title, "First");
        assert_eq!(sink.count_containing("because already have one"), 1);
        assert_eq!(sink.count_containing("No usable PROP chunk"), 1);
    }

    #[test]
    fn missing_file_header_is_corrupt() {
        let bytes = chunk(b"PROP", &properties_payload(1, 1, 1));
        match read(&mut MemorySource::new(bytes), &mut NullSink) {
            Err(Error::CorruptHeader { id, offset, .. }) => {
                assert_eq!(id, "PROP");
                assert_eq!(offset, 0);
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn chunk_overrunning_source_is_corrupt() {
        let mut bytes = file_header();
        let prop_start = bytes.len() as u64;
        bytes.extend_from_slice(b"PROP");
        bytes.extend_from_slice(&500u32.to_be_bytes());
        bytes.extend_from_slice(&[0u8; 20]);
        match read(&mut MemorySource::new(bytes), &mut NullSink) {
            Err(Error::CorruptHeader { id, offset, .. }) => {
                assert_eq!(id, "PROP");
                assert_eq!(offset, prop_start);
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn truncated_properties_name_chunk() {
        let mut bytes = file_header();
        let prop_start = bytes.len() as u64;
        bytes.extend(chunk(b"PROP", &[0u8; 10]));
        match read(&mut MemorySource::new(bytes), &mut NullSink) {
            Err(Error::ChunkDecodeFailed { id, offset, .. }) => {
                assert_eq!(id, "PROP");
                assert_eq!(offset, prop_start);
            }
            other => panic!("unexpected {:?}", other),
        }
    }
}
