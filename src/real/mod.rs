// RealMedia support
//
// RealMedia File Structure:
// - Flat run of chunks: 4-byte id + size (BE u32, counts the 8 header bytes
//   too) + payload. No padding.
// - Every payload starts with a 16-bit object version.
//   - .RMF: file header, always first
//   - PROP: file properties (bit rates, packet counts, duration in ms)
//   - MDPR: one per media stream
//   - CONT: title, author, copyright, comment
//   - DATA: interleaved packets
//   - INDX: seek index

pub mod chunks;
pub mod reader;

pub use chunks::{FileProperties, RealChunk, RealContent};
pub use reader::read;

pub const RMF_SIGNATURE: &[u8; 4] = b".RMF";

/// Chunk identifiers
pub mod ids {
    use crate::iff::ChunkId;

    pub const FILE_HEADER: ChunkId = ChunkId(*b".RMF");
    pub const PROPERTIES: ChunkId = ChunkId(*b"PROP");
    pub const MEDIA_PROPERTIES: ChunkId = ChunkId(*b"MDPR");
    pub const CONTENT: ChunkId = ChunkId(*b"CONT");
    pub const DATA: ChunkId = ChunkId(*b"DATA");
    pub const INDEX: ChunkId = ChunkId(*b"INDX");
}
