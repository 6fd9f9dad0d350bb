// AIFF / AIFC support
//
// AIFF File Structure:
// - FORM header: "FORM" + size (BE u32) + form type ("AIFF" or "AIFC")
// - Chunks (8-byte header + payload, padded to even length)
//   - COMM: channels, sample frames, sample size, 80-bit sample rate
//           (AIFC adds compression type and name)
//   - SSND: audio data
//   - FVER: AIFC format version
//   - NAME / AUTH / (c)  / ANNO: Latin-1 text
//   - COMT: timestamped comments
//   - APPL: application specific data
//   - "ID3 ": embedded ID3v2 tag
//
// Some encoders write the ID3 chunk straight after an odd-length chunk
// without the pad byte. Reading on the even boundary then sees the header
// shifted by one byte: "D3 \0" (we are one byte late) or "\0ID3" (one byte
// early). Those signatures are recognised and the walk re-synchronises.

pub mod chunks;
pub mod reader;

pub use chunks::{AiffChunk, CommonChunk, DecodedChunk};
pub use reader::read;

use crate::iff::ChunkId;

pub const AIFF: ChunkId = ChunkId(*b"AIFF");
pub const AIFC: ChunkId = ChunkId(*b"AIFC");

/// Chunk identifiers
pub mod ids {
    use crate::iff::ChunkId;

    pub const FORMAT_VERSION: ChunkId = ChunkId(*b"FVER");
    pub const APPLICATION: ChunkId = ChunkId(*b"APPL");
    pub const COMMON: ChunkId = ChunkId(*b"COMM");
    pub const COMMENTS: ChunkId = ChunkId(*b"COMT");
    pub const NAME: ChunkId = ChunkId(*b"NAME");
    pub const AUTHOR: ChunkId = ChunkId(*b"AUTH");
    pub const COPYRIGHT: ChunkId = ChunkId(*b"(c) ");
    pub const ANNOTATION: ChunkId = ChunkId(*b"ANNO");
    pub const SOUND: ChunkId = ChunkId(*b"SSND");
    pub const TAG: ChunkId = ChunkId(*b"ID3 ");
    pub const TAG_LOWERCASE: ChunkId = ChunkId(*b"id3 ");
    pub const CORRUPT_TAG_LATE: ChunkId = ChunkId(*b"D3 \0");
    pub const CORRUPT_TAG_EARLY: ChunkId = ChunkId(*b"\0ID3");
}
