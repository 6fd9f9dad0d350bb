// FLAC support
//
// "fLaC" signature, then metadata blocks up to the one with the last-block
// flag, then audio frames. An ID3v2 tag in front of the signature is
// tolerated.

pub mod metadata;
pub mod picture;
pub mod reader;
pub mod vorbis;

pub use metadata::{FlacMetadataBlockHeader, FlacMetadataBlockType, StreamInfo, FLAC_SIGNATURE};
pub use picture::{FlacPicture, PictureType};
pub use reader::read;
pub use vorbis::{VorbisComment, VorbisFields};
