// ID3v2 tag handling
//
// ID3v2 blocks show up inside AIFF "ID3 " chunks and as a leading tag in
// front of Ogg and FLAC streams. The engine only needs the header (for the
// tag length) and a flat frame list.

pub mod v2;

pub use v2::{Id3Frame, Id3v2Header, Id3v2Tag};
