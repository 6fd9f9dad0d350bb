// Ogg Vorbis traversal
//
// Start -> LocateStream -> ScanLastPage -> ReadIdentification ->
// ReadComment -> Done

use super::page::{find_last_granule, locate_stream_start, OggPageHeader, Packet, PacketReader};
use super::vorbis::{decode_comment_packet, decode_identification};
use crate::diagnostics::DiagnosticSink;
use crate::error::{Error, Result};
use crate::header::{AudioHeader, ContainerFormat};
use crate::metrics::{granule_duration, ogg_bit_rate};
use crate::source::{DataWindow, Source};
use crate::tag::{AudioFileInfo, ByteRange, ChunkSummary, Identifier, TagAggregate};

const TARGET: &str = "chunkscope::ogg";

/// Vorbis only decodes to 16 bit output
const VORBIS_BITS_PER_SAMPLE: u16 = 16;

const PAGE: Identifier = Identifier::Named("OggS");

/// Read the encoding parameters and comment header of an Ogg Vorbis source
pub fn read<S: Source + ?Sized>(source: &mut S, sink: &mut dyn DiagnosticSink) -> Result<AudioFileInfo> {
    sink.debug(TARGET, &format!("Reading Ogg file {} size:{}", source.name(), source.size()));
    let mut tag = TagAggregate::new();

    let start = locate_stream_start(source)?;
    if let Some(id3) = start.leading_tag {
        sink.warn(
            TARGET,
            &format!("Ogg stream starts at {} after an ID3v2 tag", start.offset),
        );
        tag.add_summary(ChunkSummary::new(
            Identifier::Named("ID3"),
            0,
            crate::id3::Id3v2Header::HEADER_SIZE as u64,
            id3.total_size() - crate::id3::Id3v2Header::HEADER_SIZE as u64,
        ));
    }

    let last = find_last_granule(source)?;
    sink.debug(
        TARGET,
        &format!(
            "Last page at {} has granule position {}",
            last.start, last.granule_position
        ),
    );

    let mut packets = PacketReader::new(start.offset);
    let identification = match packets.next_packet(source)? {
        Some(packet) => packet,
        None => return Err(Error::corrupt("OggS", start.offset, "stream holds no packets")),
    };
    let id = decode_identification(&packet_window(&identification))
        .map_err(|e| Error::decode_failed("vorbis identification", identification.data_start, e))?;
    if !packets.pages().first().is_some_and(|page| page.is_bos()) {
        sink.warn(TARGET, "First page is not flagged as beginning of stream");
    }

    let mut header = AudioHeader::new(ContainerFormat::OggVorbis);
    header.channels = Some(id.channels as u16);
    header.sample_rate = Some(id.sample_rate);
    header.bits_per_sample = Some(VORBIS_BITS_PER_SAMPLE);
    header.encoding_type = Some(id.encoding_type());
    header.precise_length = granule_duration(last.granule_position as u64, id.sample_rate);

    match packets.next_packet(source)? {
        Some(comment) => {
            let contribution = decode_comment_packet(&packet_window(&comment))
                .map_err(|e| Error::decode_failed("vorbis comment", comment.data_start, e))?;
            tag.capture_primary(
                contribution,
                ByteRange {
                    start: comment.first_page,
                    end: comment.end,
                },
            );
        }
        None => sink.warn(TARGET, "No comment header after identification header"),
    }

    summarize_pages(&mut tag, packets.pages(), &last);

    let (bit_rate, vbr) = ogg_bit_rate(id.bitrates(), source.size(), header.precise_length.unwrap_or(0.0));
    header.bit_rate = Some(bit_rate);
    header.variable_bit_rate = vbr;
    Ok(AudioFileInfo { header, tag })
}

fn packet_window(packet: &Packet) -> DataWindow<'_> {
    DataWindow::new(packet.data_start, &packet.data)
}

/// Summaries for the pages read forward, plus the last page when the
/// forward read did not reach it
fn summarize_pages(tag: &mut TagAggregate, pages: &[OggPageHeader], last: &OggPageHeader) {
    for page in pages.iter().chain(std::iter::once(last)) {
        if tag.chunk_summaries.iter().any(|s| s.id == PAGE && s.offset == page.start) {
            continue;
        }
        tag.add_summary(ChunkSummary::new(PAGE, page.start, page.header_len(), page.data_len()));
    }
}
