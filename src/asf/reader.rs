// ASF traversal
//
// Start -> ReadHeaderObject -> ReadNextObject (bounded by the header) ->
// ReadNextObject (top level) -> Done
//
// The header object's children are walked with the same framing, recursing
// into the header extension. Whatever follows the header (data object,
// indices) is walked at top level.

use super::decoders::{
    decode_content_description, decode_extended_content, decode_file_properties, decode_language_list,
    decode_metadata, decode_metadata_library, decode_stream_properties, header_extension_data_size, AsfObject,
    HEADER_EXTENSION_PREFIX,
};
use super::guid::{self, Guid};
use super::object::{ObjectHeader, OBJECT_HEADER_SIZE};
use crate::diagnostics::DiagnosticSink;
use crate::dispatch::{ChunkAction, DecoderTable};
use crate::error::{Error, Result};
use crate::header::{AudioHeader, ContainerFormat};
use crate::metrics::{asf_bit_rate, asf_duration};
use crate::source::Source;
use crate::tag::{AudioFileInfo, ByteRange, ChunkSummary, Identifier, TagAggregate};
use crate::utils::io::read_le_u32;

const TARGET: &str = "chunkscope::asf";

/// Object count and two reserved bytes after the header object's header
const HEADER_OBJECT_PREFIX: u64 = 6;

static ASF_OBJECT_ENTRIES: [(Guid, ChunkAction<AsfObject>); 9] = [
    (guid::FILE_PROPERTIES, ChunkAction::Decode(decode_file_properties)),
    (guid::STREAM_PROPERTIES, ChunkAction::Decode(decode_stream_properties)),
    (guid::LANGUAGE_LIST, ChunkAction::Decode(decode_language_list)),
    (guid::CONTENT_DESCRIPTION, ChunkAction::Tag(decode_content_description)),
    (guid::EXTENDED_CONTENT_DESCRIPTION, ChunkAction::SecondaryTag(decode_extended_content)),
    (guid::METADATA, ChunkAction::SecondaryTag(decode_metadata)),
    (guid::METADATA_LIBRARY, ChunkAction::SecondaryTag(decode_metadata_library)),
    (guid::HEADER_EXTENSION, ChunkAction::Container),
    (guid::DATA, ChunkAction::AudioData),
];

/// Identifier table for ASF objects
pub static ASF_OBJECTS: DecoderTable<Guid, AsfObject> = DecoderTable::new(&ASF_OBJECT_ENTRIES);

/// Mutable state threaded through the object walk
struct Walk<'a> {
    header: AudioHeader,
    tag: TagAggregate,
    sink: &'a mut dyn DiagnosticSink,
}

/// Read the encoding parameters and tag of an ASF (WMA) source
pub fn read<S: Source + ?Sized>(source: &mut S, sink: &mut dyn DiagnosticSink) -> Result<AudioFileInfo> {
    sink.debug(TARGET, &format!("Reading ASF file {} size:{}", source.name(), source.size()));
    source.seek(0)?;

    let top = match ObjectHeader::read(source)? {
        Some(top) => top,
        None => return Err(Error::corrupt("ASF", 0, "file too short for an ASF header object")),
    };
    if top.guid != guid::HEADER {
        return Err(Error::corrupt(top.guid, 0, "not an ASF file, header object missing"));
    }
    if top.payload_len() < HEADER_OBJECT_PREFIX {
        return Err(Error::corrupt(top.guid, 0, "header object too short"));
    }
    let mut prefix = [0u8; HEADER_OBJECT_PREFIX as usize];
    source.read_exact(&mut prefix)?;
    let declared_children = read_le_u32(&mut &prefix[..])?;

    let mut walk = Walk {
        header: AudioHeader::new(ContainerFormat::Asf),
        tag: TagAggregate::new(),
        sink,
    };
    walk.tag.add_summary(ChunkSummary::new(
        Identifier::Guid(top.guid),
        top.start,
        OBJECT_HEADER_SIZE,
        top.payload_len(),
    ));

    let children = walk.objects(source, top.end())?;
    if children != declared_children as usize {
        walk.sink.info(
            TARGET,
            &format!(
                "Header object declares {} children but holds {}",
                declared_children, children
            ),
        );
    }

    let size = source.size();
    walk.objects(source, size)?;

    let Walk { mut header, tag, .. } = walk;
    if let Some(asf) = header.asf.as_ref() {
        if let Some(play) = asf.play_duration {
            header.precise_length = Some(asf_duration(play, asf.preroll.unwrap_or(0)));
        }
        header.bit_rate = asf_bit_rate(asf.average_bytes_per_second, asf.max_bitrate);
    }
    Ok(AudioFileInfo { header, tag })
}

impl Walk<'_> {
    /// Walk objects from the current position up to `end`, returning how
    /// many were read
    fn objects<S: Source + ?Sized>(&mut self, source: &mut S, end: u64) -> Result<usize> {
        let mut count = 0;
        while source.position() + OBJECT_HEADER_SIZE <= end {
            let object = match ObjectHeader::read(source)? {
                Some(object) => object,
                None => break,
            };
            if object.end() > end {
                return Err(Error::corrupt(
                    object.guid,
                    object.start,
                    format!("object size {} runs past enclosing object end {}", object.size, end),
                ));
            }
            self.object(source, &object)?;
            source.seek(object.end())?;
            count += 1;
        }
        if source.position() < end {
            self.sink.debug(
                TARGET,
                &format!("Skipping {} trailing bytes", end - source.position()),
            );
            source.seek(end)?;
        }
        Ok(count)
    }

    fn object<S: Source + ?Sized>(&mut self, source: &mut S, object: &ObjectHeader) -> Result<()> {
        let id = Identifier::Guid(object.guid);
        self.sink.debug(
            TARGET,
            &format!("Reading object {} at {} size {}", id, object.start, object.size),
        );
        self.tag.add_summary(ChunkSummary::new(
            id,
            object.start,
            OBJECT_HEADER_SIZE,
            object.payload_len(),
        ));

        match ASF_OBJECTS.lookup(&object.guid) {
            Some(ChunkAction::Decode(decoder)) => {
                let data = object.read_payload(source)?;
                let decoded = decoder(&object.window(&data))
                    .map_err(|e| Error::decode_failed(object.guid, object.start, e))?;
                decoded.apply(&mut self.header);
            }
            Some(ChunkAction::AudioData) => {
                self.header.set_audio_data(object.data_start(), object.payload_len());
            }
            Some(ChunkAction::Tag(decoder)) => {
                if self.tag.has_primary_tag() {
                    self.sink.warn(
                        TARGET,
                        &format!("Ignoring {} because already have one", id),
                    );
                } else {
                    let data = object.read_payload(source)?;
                    let contribution = decoder(&object.window(&data))
                        .map_err(|e| Error::decode_failed(object.guid, object.start, e))?;
                    self.tag.capture_primary(
                        contribution,
                        ByteRange {
                            start: object.data_start(),
                            end: object.end(),
                        },
                    );
                }
            }
            Some(ChunkAction::SecondaryTag(decoder)) => {
                let data = object.read_payload(source)?;
                let contribution = decoder(&object.window(&data))
                    .map_err(|e| Error::decode_failed(object.guid, object.start, e))?;
                self.tag.add(contribution);
            }
            Some(ChunkAction::Container) => {
                if object.payload_len() < HEADER_EXTENSION_PREFIX as u64 {
                    return Err(Error::corrupt(object.guid, object.start, "header extension too short"));
                }
                let mut prefix = [0u8; HEADER_EXTENSION_PREFIX];
                source.read_exact(&mut prefix)?;
                let data_size = header_extension_data_size(&mut &prefix[..])?;
                let nested_start = source.position();
                let nested_end = (nested_start + data_size as u64).min(object.end());
                if nested_start + data_size as u64 > object.end() {
                    self.sink.warn(
                        TARGET,
                        &format!("{} data size {} exceeds the object, clamping", id, data_size),
                    );
                }
                self.objects(source, nested_end)?;
            }
            Some(ChunkAction::Misaligned(_)) | None => {
                self.sink.debug(TARGET, &format!("Skipping object {}", id));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diagnostics::{NullSink, RecordingSink};
    use crate::source::MemorySource;

    fn object(guid: Guid, payload: &[u8]) -> Vec<u8> {
        let mut out = guid.0.to_vec();
        out.extend_from_slice(&(payload.len() as u64 + 24).to_le_bytes());
        out.extend_from_slice(payload);
        out
    }

    fn header_object(children: &[Vec<u8>]) -> Vec<u8> {
        let mut payload = (children.len() as u32).to_le_bytes().to_vec();
        payload.extend_from_slice(&[1, 2]);
        for child in children {
            payload.extend_from_slice(child);
        }
        object(guid::HEADER, &payload)
    }

    fn file_properties(play: u64, preroll: u64) -> Vec<u8> {
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

    fn audio_stream(rate: u32, avg_bytes: u32) -> Vec<u8> {
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

    #[test]
    fn walks_header_and_data() {
        let header = header_object(&[file_properties(60_000_000, 3000), audio_stream(44_100, 16_000)]);
        let header_len = header.len() as u64;
        let mut bytes = header;
        bytes.extend(object(guid::DATA, &[0u8; 100]));

        let info = read(&mut MemorySource::new(bytes), &mut NullSink).unwrap();
        assert_eq!(info.header.format, Some(ContainerFormat::Asf));
        assert_eq!(info.header.sample_rate, Some(44_100));
        assert_eq!(info.header.channels, Some(2));
        assert_eq!(info.header.encoding_type.as_deref(), Some("WMA"));
        assert_eq!(info.header.precise_length, Some(3.0));
        assert_eq!(info.header.bit_rate, Some(128));
        assert_eq!(info.header.audio_data_start, Some(header_len + 24));
        assert_eq!(info.header.audio_data_length, Some(100));
        assert_eq!(info.header.asf.unwrap().stream_count, 1);
        // header, two children, data
        assert_eq!(info.tag.chunk_summaries.len(), 4);
    }

    #[test]
    fn header_extension_children_are_walked() {
        let mut lang = 1u16.to_le_bytes().to_vec();
        lang.push(6);
        lang.extend_from_slice(&[b'e', 0, b'n', 0, 0, 0]);
        let nested = object(guid::LANGUAGE_LIST, &lang);

        let mut ext = guid::HEADER_EXTENSION_RESERVED.0.to_vec();
        ext.extend_from_slice(&6u16.to_le_bytes());
        ext.extend_from_slice(&(nested.len() as u32).to_le_bytes());
        ext.extend_from_slice(&nested);
        let bytes = header_object(&[object(guid::HEADER_EXTENSION, &ext)]);

        let info = read(&mut MemorySource::new(bytes), &mut NullSink).unwrap();
        assert_eq!(info.header.asf.unwrap().languages, vec!["en".to_string()]);
        assert_eq!(info.tag.chunk_summaries.len(), 3);
        assert!(info.tag.chunk_summaries[2].id.to_string().starts_with("Language List"));
    }

    #[test]
    fn unknown_objects_are_summarized() {
        let unknown = Guid([0xAB; 16]);
        let bytes = header_object(&[object(unknown, &[1, 2, 3])]);
        let mut sink = RecordingSink::new();
        let info = read(&mut MemorySource::new(bytes), &mut sink).unwrap();
        assert_eq!(info.tag.chunk_summaries[1].id, Identifier::Guid(unknown));
        assert_eq!(info.tag.chunk_summaries[1].size, 3);
        assert_eq!(sink.count_containing("Skipping object"), 1);
    }

    #[test]
    fn child_overrunning_header_is_corrupt() {
        let mut child = object(guid::LANGUAGE_LIST, &[0u8; 4]);
        // claim 8 more bytes than the header object holds
        child[16..24].copy_from_slice(&36u64.to_le_bytes());
        let mut bytes = header_object(&[child]);
        bytes.extend_from_slice(&[0u8; 8]);
        assert!(matches!(
            read(&mut MemorySource::new(bytes), &mut NullSink),
            Err(Error::CorruptHeader { .. })
        ));
    }

    #[test]
    fn rejects_non_asf() {
        let bytes = object(guid::DATA, &[0u8; 8]);
        assert!(matches!(
            read(&mut MemorySource::new(bytes), &mut NullSink),
            Err(Error::CorruptHeader { .. })
        ));
    }
}
