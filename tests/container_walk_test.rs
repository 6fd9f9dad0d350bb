//! End-to-end traversal tests over files written to disk
//!
//! Each container is assembled byte by byte, written to a temporary file and
//! read back through the path entry point.

mod common;

use chunkscope::asf::{guid, MetadataKind, MetadataValue};
use chunkscope::{
    detect_format, read_path, read_with, ContainerFormat, FileSource, Identifier, MemorySource, ReadOptions,
    RecordingSink, Source,
};
use common::*;

// ============================================================================
// AIFF
// ============================================================================

#[test]
fn aiff_summaries_reconstruct_the_file() {
    let mut body = chunk(b"COMM", &comm(44_100));
    body.extend(chunk(b"NAME", b"odd"));
    body.extend(chunk(b"SSND", &vec![0u8; 176_400]));
    body.extend(chunk(b"ANNO", b"seven b"));
    body.extend(chunk(b"XXXX", &[1, 2, 3, 4]));
    let bytes = form(b"AIFF", &body);
    let file = temp_file(&bytes);

    let info = read_path(file.path(), &ReadOptions::default()).unwrap();
    let summaries = &info.tag.chunk_summaries;
    assert_eq!(summaries.len(), 5);

    // Every chunk starts where the previous one ended, plus its pad byte
    let mut expected = 12;
    for summary in summaries {
        assert_eq!(summary.offset, expected);
        assert_eq!(summary.header_size, 8);
        expected = summary.end() + summary.size % 2;
    }
    assert_eq!(expected, bytes.len() as u64);
    assert_eq!(summaries[4].id.to_string(), "XXXX");
}

#[test]
fn aiff_cd_quality_bit_rate() {
    let mut body = chunk(b"COMM", &comm(44_100));
    body.extend(chunk(b"SSND", &vec![0u8; 176_400]));
    let file = temp_file(&form(b"AIFF", &body));

    let info = read_path(file.path(), &ReadOptions::default()).unwrap();
    let header = &info.header;
    assert_eq!(header.format, Some(ContainerFormat::Aiff));
    assert_eq!(header.sample_rate, Some(44_100));
    assert_eq!(header.channels, Some(2));
    assert_eq!(header.bits_per_sample, Some(16));
    assert_eq!(header.precise_length, Some(1.0));
    assert_eq!(header.track_length(), Some(1));
    assert_eq!(header.audio_data_length, Some(176_400));
    assert_eq!(header.bit_rate, Some(1411));
    assert_eq!(header.encoding_type.as_deref(), Some("Not Compressed"));
}

#[test]
fn aiff_first_id3_tag_wins() {
    let mut body = chunk(b"COMM", &comm(100));
    body.extend(chunk(b"ID3 ", &id3_tag("First")));
    body.extend(chunk(b"SSND", &vec![0u8; 64]));
    body.extend(chunk(b"ID3 ", &id3_tag("Again")));
    let bytes = form(b"AIFF", &body);

    let mut sink = RecordingSink::new();
    let info = read_with(&mut MemorySource::new(bytes), &ReadOptions::default(), &mut sink).unwrap();

    assert_eq!(info.tag.id3v2().unwrap().text("TIT2").as_deref(), Some("First"));
    assert_eq!(info.tag.contributions.len(), 1);
    let location = info.tag.tag_location.unwrap();
    assert_eq!(location.start, 12 + 26 + 8);
    assert_eq!(location.end - location.start, id3_tag("First").len() as u64);

    let tag_chunks = info
        .tag
        .chunk_summaries
        .iter()
        .filter(|s| s.id.to_string() == "ID3 ")
        .count();
    assert_eq!(tag_chunks, 2);
    assert_eq!(sink.count_containing("already have one"), 1);
    assert!(!info.tag.incorrectly_aligned_tag);
}

#[test]
fn aiff_repeated_misaligned_tags_flag_once() {
    // Odd APPL chunks written without their pad byte push each ID3 chunk
    // one byte before where the walk expects it
    let mut body = chunk(b"COMM", &comm(100));
    body.extend(unpadded_chunk(b"APPL", b"abcde"));
    body.extend(chunk(b"ID3 ", &id3_tag("One")));
    body.extend(unpadded_chunk(b"APPL", b"fghij"));
    body.extend(chunk(b"ID3 ", &id3_tag("Two")));
    let bytes = form(b"AIFF", &body);

    let mut sink = RecordingSink::new();
    let info = read_with(&mut MemorySource::new(bytes), &ReadOptions::default(), &mut sink).unwrap();

    assert!(info.tag.incorrectly_aligned_tag);
    assert_eq!(info.tag.id3v2().unwrap().text("TIT2").as_deref(), Some("One"));
    assert_eq!(sink.count_containing("odd location"), 2);
    assert_eq!(sink.count_containing("First metadata tag is misaligned"), 1);
    assert_eq!(sink.count_containing("already have one"), 1);
}

#[test]
fn aiff_early_signature_resyncs_forward() {
    let mut body = chunk(b"COMM", &comm(100));
    body.push(0);
    body.extend(chunk(b"ID3 ", &id3_tag("Early")));
    body.extend_from_slice(&[0u8; 40]);
    let bytes = form(b"AIFF", &body);

    let mut sink = RecordingSink::new();
    let info = read_with(&mut MemorySource::new(bytes), &ReadOptions::default(), &mut sink).unwrap();
    assert!(info.tag.incorrectly_aligned_tag);
    assert_eq!(info.tag.id3v2().unwrap().text("TIT2").as_deref(), Some("Early"));
    assert_eq!(sink.count_containing("odd location"), 1);
}

#[test]
fn aiff_without_tags_when_not_requested() {
    let mut body = chunk(b"COMM", &comm(100));
    body.extend(chunk(b"ID3 ", &id3_tag("Skip")));
    body.extend(chunk(b"SSND", &vec![0u8; 100]));
    let file = temp_file(&form(b"AIFC", &body));

    let options = ReadOptions {
        read_tag: false,
        ..ReadOptions::default()
    };
    let info = read_path(file.path(), &options).unwrap();
    assert_eq!(info.header.format, Some(ContainerFormat::Aifc));
    assert!(info.tag.contributions.is_empty());
    assert!(info.tag.tag_location.is_none());
    assert_eq!(info.tag.chunk_summaries.len(), 3);
}

// ============================================================================
// ASF
// ============================================================================

#[test]
fn asf_header_children_and_primary_description() {
    let header = header_object(&[
        file_properties(60_000_000, 3000),
        audio_stream(44_100, 16_000),
        content_description("Title", "Author"),
        content_description("Other", "Someone"),
        extended_content(&[("WM/AlbumTitle", "Album")]),
    ]);
    let header_len = header.len() as u64;
    let mut bytes = header;
    bytes.extend(object(guid::DATA, &[0u8; 200]));
    let file = temp_file(&bytes);

    let info = read_path(file.path(), &ReadOptions::default()).unwrap();
    assert_eq!(info.header.format, Some(ContainerFormat::Asf));
    assert_eq!(info.header.precise_length, Some(3.0));
    assert_eq!(info.header.bit_rate, Some(128));
    assert_eq!(info.header.audio_data_start, Some(header_len + 24));

    let description = info.tag.asf_content_description().unwrap();
    assert_eq!(description.title, "Title");
    assert_eq!(description.author, "Author");
    assert_eq!(info.tag.contributions.len(), 2);

    let extended: Vec<_> = info.tag.asf_metadata().collect();
    assert_eq!(extended.len(), 1);
    assert_eq!(extended[0].kind, MetadataKind::ExtendedContent);
    assert_eq!(
        extended[0].get("WM/AlbumTitle"),
        Some(&MetadataValue::String("Album".to_string()))
    );

    // header, five children, data
    let summaries = &info.tag.chunk_summaries;
    assert_eq!(summaries.len(), 7);
    assert_eq!(summaries[0].id, Identifier::Guid(guid::HEADER));
    assert_eq!(summaries[6].end(), bytes.len() as u64);
}

// ============================================================================
// Ogg Vorbis
// ============================================================================

#[test]
fn ogg_duration_is_granule_over_rate() {
    let bytes = ogg_stream(44_100, 128_000, 441_000, 300);
    let file = temp_file(&bytes);

    let mut source = FileSource::open(file.path()).unwrap();
    assert_eq!(detect_format(&mut source).unwrap(), Some(ContainerFormat::OggVorbis));
    assert_eq!(source.position(), 0);

    let info = read_path(file.path(), &ReadOptions::default()).unwrap();
    assert_eq!(info.header.precise_length, Some(10.0));
    assert_eq!(info.header.bit_rate, Some(128));
    assert!(info.header.variable_bit_rate);
    assert_eq!(info.tag.vorbis_comment().unwrap().get("title"), Some("Tune"));

    let pages = &info.tag.chunk_summaries;
    assert_eq!(pages.len(), 3);
    assert!(pages.iter().all(|p| p.id == Identifier::Named("OggS")));
    assert_eq!(pages[2].end(), bytes.len() as u64);
}

#[test]
fn ogg_long_stream_uses_the_last_page() {
    let mut bytes = page(0, 0, OGG_BOS, &[&vorbis_identification(1, 48_000, 0, 0, 0)]);
    bytes.extend(page(0, 1, 0, &[&vorbis_comment_packet(&[]), b"setup"]));
    for sequence in 2..10u32 {
        bytes.extend(page(sequence as i64 * 48_000, sequence, 0, &[&[0x22; 500]]));
    }
    bytes.extend(page(960_000, 10, OGG_EOS, &[&[0x22; 17]]));

    let info = read_with(&mut MemorySource::new(bytes), &ReadOptions::default(), &mut RecordingSink::new()).unwrap();
    assert_eq!(info.header.precise_length, Some(20.0));
    assert_eq!(info.header.channels, Some(1));
}

// ============================================================================
// FLAC
// ============================================================================

#[test]
fn flac_blocks_and_audio_region() {
    let mut bytes = b"fLaC".to_vec();
    bytes.extend(flac_block(0, false, &stream_info(44_100, 2, 16, 441_000)));
    bytes.extend(flac_block(4, false, &comment_block("ref", &["ARTIST=Someone"])));
    bytes.extend(flac_block(1, true, &[0u8; 20]));
    let audio_start = bytes.len() as u64;
    bytes.extend_from_slice(&vec![0u8; 1_764_000]);
    let file = temp_file(&bytes);

    let info = read_path(file.path(), &ReadOptions::default()).unwrap();
    assert_eq!(info.header.format, Some(ContainerFormat::Flac));
    assert_eq!(info.header.precise_length, Some(10.0));
    assert_eq!(info.header.audio_data_start, Some(audio_start));
    assert_eq!(info.header.audio_data_length, Some(1_764_000));
    assert_eq!(info.header.bit_rate, Some(1411));
    assert_eq!(info.tag.vorbis_comment().unwrap().get("ARTIST"), Some("Someone"));
    assert_eq!(info.tag.chunk_summaries[0].id, Identifier::Named("fLaC"));
}

// ============================================================================
// RealMedia
// ============================================================================

#[test]
fn real_properties_and_content() {
    let mut bytes = rmf_header(5);
    bytes.extend(real_chunk(b"PROP", &real_properties(96_000, 80_000, 185_500)));
    bytes.extend(real_chunk(b"MDPR", &[0u8; 47]));
    bytes.extend(real_chunk(b"CONT", &real_content("", "Song", "Band", "note")));
    let data_start = bytes.len() as u64 + 8;
    bytes.extend(real_chunk(b"DATA", &vec![0u8; 4000]));
    let file = temp_file(&bytes);

    let info = read_path(file.path(), &ReadOptions::default()).unwrap();
    assert_eq!(info.header.format, Some(ContainerFormat::Real));
    assert_eq!(info.header.bit_rate, Some(80));
    assert_eq!(info.header.precise_length, Some(185.5));
    assert_eq!(info.header.track_length(), Some(186));
    assert!(info.header.variable_bit_rate);
    assert_eq!(info.header.audio_data_start, Some(data_start));
    assert_eq!(info.header.audio_data_length, Some(4000));

    let content = info.tag.real_content().unwrap();
    assert_eq!(content.title, "Song");
    assert_eq!(content.artist, "Band");
    assert_eq!(content.comment, "note");

    let summaries = &info.tag.chunk_summaries;
    assert_eq!(summaries.len(), 5);
    assert_eq!(summaries[0].id.to_string(), ".RMF");
    for pair in summaries.windows(2) {
        assert_eq!(pair[1].offset, pair[0].end());
    }
    assert_eq!(summaries[4].end(), bytes.len() as u64);
}
