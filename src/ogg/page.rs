// Ogg page framing
//
// Page header layout (27 fixed bytes, then the segment table):
//   0  capture pattern "OggS"
//   4  version
//   5  header type (1 = continuation, 2 = first page, 4 = last page)
//   6  granule position (i64 LE)
//  14  bitstream serial
//  18  page sequence
//  22  CRC
//  26  segment count N, followed by N lacing values

use std::collections::VecDeque;

use crate::error::{Error, Result};
use crate::id3::Id3v2Header;
use crate::source::Source;

use super::{OGG_HEADER_TYPE_BOS, OGG_HEADER_TYPE_CONTINUATION, OGG_HEADER_TYPE_EOS, OGG_SIGNATURE};

pub const PAGE_HEADER_FIXED_LENGTH: usize = 27;
const SEGMENT_COUNT_OFFSET: u64 = 26;
const CAPTURE_PATTERN_LENGTH: u64 = 4;

/// Granule value meaning "no packet finishes on this page"
const GRANULE_UNSET: i64 = -1;

/// Ogg page header
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OggPageHeader {
    /// Offset of the capture pattern
    pub start: u64,
    pub version: u8,
    pub header_type: u8,
    pub granule_position: i64,
    pub bitstream_serial: u32,
    pub page_sequence: u32,
    pub crc: u32,
    pub segment_table: Vec<u8>,
}

impl OggPageHeader {
    /// Read the page header at the current position
    pub fn read<S: Source + ?Sized>(source: &mut S) -> Result<Self> {
        let start = source.position();
        let mut fixed = [0u8; PAGE_HEADER_FIXED_LENGTH];
        source.read_exact(&mut fixed)?;
        let segment_table = source.read_vec(fixed[SEGMENT_COUNT_OFFSET as usize] as u64)?;

        let mut raw = fixed.to_vec();
        raw.extend_from_slice(&segment_table);
        Self::parse(&raw, start)
    }

    /// Parse a complete header (fixed part plus segment table)
    pub fn parse(raw: &[u8], start: u64) -> Result<Self> {
        if raw.len() < PAGE_HEADER_FIXED_LENGTH || &raw[0..4] != OGG_SIGNATURE {
            return Err(Error::corrupt(
                String::from_utf8_lossy(&raw[..raw.len().min(4)]),
                start,
                "missing Ogg capture pattern",
            ));
        }
        let count = raw[SEGMENT_COUNT_OFFSET as usize] as usize;
        if raw.len() < PAGE_HEADER_FIXED_LENGTH + count {
            return Err(Error::corrupt("OggS", start, "segment table truncated"));
        }

        let le_u32 = |at: usize| u32::from_le_bytes([raw[at], raw[at + 1], raw[at + 2], raw[at + 3]]);
        let mut granule = [0u8; 8];
        granule.copy_from_slice(&raw[6..14]);

        Ok(OggPageHeader {
            start,
            version: raw[4],
            header_type: raw[5],
            granule_position: i64::from_le_bytes(granule),
            bitstream_serial: le_u32(14),
            page_sequence: le_u32(18),
            crc: le_u32(22),
            segment_table: raw[PAGE_HEADER_FIXED_LENGTH..PAGE_HEADER_FIXED_LENGTH + count].to_vec(),
        })
    }

    /// Header length including the segment table
    pub fn header_len(&self) -> u64 {
        (PAGE_HEADER_FIXED_LENGTH + self.segment_table.len()) as u64
    }

    /// Payload length from the segment table
    pub fn data_len(&self) -> u64 {
        self.segment_table.iter().map(|&x| x as u64).sum()
    }

    pub fn end(&self) -> u64 {
        self.start + self.header_len() + self.data_len()
    }

    pub fn is_continuation(&self) -> bool {
        self.header_type & OGG_HEADER_TYPE_CONTINUATION != 0
    }

    pub fn is_bos(&self) -> bool {
        self.header_type & OGG_HEADER_TYPE_BOS != 0
    }

    pub fn is_eos(&self) -> bool {
        self.header_type & OGG_HEADER_TYPE_EOS != 0
    }
}

/// Where the Ogg stream begins, and the ID3v2 tag in front of it if any
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StreamStart {
    pub offset: u64,
    pub leading_tag: Option<Id3v2Header>,
}

fn capture_pattern_at<S: Source + ?Sized>(source: &mut S, offset: u64) -> Result<bool> {
    if offset + CAPTURE_PATTERN_LENGTH > source.size() {
        return Ok(false);
    }
    source.seek(offset)?;
    let mut pattern = [0u8; 4];
    source.read_exact(&mut pattern)?;
    Ok(&pattern == OGG_SIGNATURE)
}

/// Find the first page, tolerating an ID3v2 tag in front of the stream
pub fn locate_stream_start<S: Source + ?Sized>(source: &mut S) -> Result<StreamStart> {
    if capture_pattern_at(source, 0)? {
        return Ok(StreamStart {
            offset: 0,
            leading_tag: None,
        });
    }

    source.seek(0)?;
    if let Some(tag) = Id3v2Header::skip_leading(source)? {
        let offset = source.position();
        if capture_pattern_at(source, offset)? {
            return Ok(StreamStart {
                offset,
                leading_tag: Some(tag),
            });
        }
    }

    source.seek(0)?;
    let mut found = [0u8; 4];
    let n = source.read(&mut found)?;
    Err(Error::NoContainerHeaderFound {
        found: String::from_utf8_lossy(&found[..n]).into_owned(),
    })
}

/// Scan backwards from the end of the source for the last page and return
/// its header.
///
/// Starting two bytes before the end, look for the final byte of the capture
/// pattern. On a candidate, step back and verify the other three bytes; on a
/// match read the full page header there and stop. Each step moves back two
/// bytes from wherever the probe left the position. Fails with
/// `NoSetupBlock` when no page is found before offset 4, or when the last
/// page's granule position is unset.
pub fn find_last_granule<S: Source + ?Sized>(source: &mut S) -> Result<OggPageHeader> {
    if source.size() < 2 {
        return Err(Error::NoSetupBlock);
    }
    source.seek(source.size() - 2)?;

    while source.position() >= CAPTURE_PATTERN_LENGTH {
        if source.read_byte()? == OGG_SIGNATURE[3] {
            source.rewind_by(CAPTURE_PATTERN_LENGTH)?;
            let mut ogg = [0u8; 3];
            source.read_exact(&mut ogg)?;
            if ogg == OGG_SIGNATURE[..3] {
                source.rewind_by(3)?;
                let page_start = source.position();

                source.seek(page_start + SEGMENT_COUNT_OFFSET)?;
                let segments = source.read_byte()? as usize;
                source.seek(page_start)?;
                let raw = source.read_vec((PAGE_HEADER_FIXED_LENGTH + segments) as u64)?;
                let page = OggPageHeader::parse(&raw, page_start)?;

                if page.granule_position == GRANULE_UNSET || page.granule_position < 0 {
                    return Err(Error::NoSetupBlock);
                }
                return Ok(page);
            }
        }
        source.rewind_by(2)?;
    }
    Err(Error::NoSetupBlock)
}

/// One packet put back together from its lacing values
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Packet {
    pub data: Vec<u8>,
    /// Start of the page the packet begins on
    pub first_page: u64,
    /// Offset of the packet's first payload byte
    pub data_start: u64,
    /// End of the page the packet completes on
    pub end: u64,
}

/// Forward packet reader over consecutive pages
#[derive(Debug)]
pub struct PacketReader {
    next_page: u64,
    ready: VecDeque<Packet>,
    partial: Vec<u8>,
    /// Page start and payload offset of the packet being assembled
    partial_start: Option<(u64, u64)>,
    pages: Vec<OggPageHeader>,
}

impl PacketReader {
    pub fn new(start: u64) -> Self {
        PacketReader {
            next_page: start,
            ready: VecDeque::new(),
            partial: Vec::new(),
            partial_start: None,
            pages: Vec::new(),
        }
    }

    /// Next complete packet, or `None` once the pages run out
    pub fn next_packet<S: Source + ?Sized>(&mut self, source: &mut S) -> Result<Option<Packet>> {
        loop {
            if let Some(packet) = self.ready.pop_front() {
                return Ok(Some(packet));
            }
            if self.next_page >= source.size() {
                return Ok(None);
            }
            source.seek(self.next_page)?;
            let page = OggPageHeader::read(source)?;
            let body = source.read_vec(page.data_len())?;
            self.next_page = source.position();
            self.split(&page, &body);
            self.pages.push(page);
        }
    }

    fn split(&mut self, page: &OggPageHeader, body: &[u8]) {
        // A fresh page cannot complete a packet left open by the previous one
        if !page.is_continuation() && !self.partial.is_empty() {
            self.partial.clear();
            self.partial_start = None;
        }
        let mut offset = 0;
        for &lace in &page.segment_table {
            let lace = lace as usize;
            let data_start = page.start + page.header_len() + offset as u64;
            self.partial_start.get_or_insert((page.start, data_start));
            self.partial.extend_from_slice(&body[offset..offset + lace]);
            offset += lace;
            if lace < 255 {
                let (first_page, data_start) = self.partial_start.take().unwrap_or((page.start, data_start));
                self.ready.push_back(Packet {
                    data: std::mem::take(&mut self.partial),
                    first_page,
                    data_start,
                    end: page.end(),
                });
            }
        }
    }

    /// Headers of every page read so far, in file order
    pub fn pages(&self) -> &[OggPageHeader] {
        &self.pages
    }
}
