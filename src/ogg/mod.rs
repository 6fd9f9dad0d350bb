// Ogg Vorbis support
//
// OGG File Structure:
// - optional ID3v2 tag in front of the stream (tolerated)
// - OGG pages: "OggS", version, header type, granule position, serial,
//   sequence, CRC, segment count N, N lacing values, payload
//
// Vorbis Structure:
// 1. Identification Header (packet 0)
// 2. Comment Header (packet 1) - Contains Vorbis Comment
// 3. Setup Header (packet 2)
// 4. Audio Data
//
// Track length needs the granule position of the last page, found by
// scanning backwards from the end of the file.

pub mod page;
pub mod reader;
pub mod vorbis;

pub use page::{find_last_granule, locate_stream_start, OggPageHeader, PacketReader};
pub use reader::read;
pub use vorbis::{VorbisComment, VorbisIdentification};

// OGG signature
pub const OGG_SIGNATURE: &[u8; 4] = b"OggS";

// OGG page header types
pub(crate) const OGG_HEADER_TYPE_CONTINUATION: u8 = 0x01;
pub(crate) const OGG_HEADER_TYPE_BOS: u8 = 0x02; // Beginning of Stream
pub(crate) const OGG_HEADER_TYPE_EOS: u8 = 0x04; // End of Stream
