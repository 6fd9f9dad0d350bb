// Identifier -> decoder dispatch
//
// Each dialect keeps a static table mapping identifiers to what the traversal
// should do with the chunk. Decoders are plain functions with one uniform
// shape: they get the bounded data window and return a contribution.

use crate::error::DecodeResult;
use crate::source::DataWindow;
use crate::tag::TagContribution;

/// Structural decoder producing a dialect-specific contribution
pub type ChunkDecoder<C> = fn(&DataWindow<'_>) -> DecodeResult<C>;

/// Tag-bearing decoder
pub type TagDecoder = fn(&DataWindow<'_>) -> DecodeResult<TagContribution>;

/// Which way a tag signature is shifted from the expected boundary
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Misalignment {
    /// Header read one byte after the tag really starts
    Late,
    /// Header read one byte before the tag really starts
    Early,
}

impl Misalignment {
    /// Bytes to move back, after a header of `header_size` was consumed,
    /// to land on the real tag start
    pub fn rewind(self, header_size: u64) -> u64 {
        match self {
            Misalignment::Late => header_size + 1,
            Misalignment::Early => header_size - 1,
        }
    }
}

/// What to do with a recognised identifier
pub enum ChunkAction<C> {
    /// Read the payload and fold the result into the header record
    Decode(ChunkDecoder<C>),
    /// Record offset and length, never read the payload
    AudioData,
    /// Tag chunk; the first one seen wins
    Tag(TagDecoder),
    /// Tag chunk that does not compete for the primary slot
    SecondaryTag(TagDecoder),
    /// Known signature of a tag written off the even boundary
    Misaligned(Misalignment),
    /// Holds a nested run of chunks to walk
    Container,
}

/// Static identifier table for one dialect
pub struct DecoderTable<K: 'static, C: 'static> {
    entries: &'static [(K, ChunkAction<C>)],
}

impl<K: PartialEq, C> DecoderTable<K, C> {
    pub const fn new(entries: &'static [(K, ChunkAction<C>)]) -> Self {
        DecoderTable { entries }
    }

    /// Action for `id`, or `None` to summarize and skip
    pub fn lookup(&self, id: &K) -> Option<&ChunkAction<C>> {
        self.entries
            .iter()
            .find(|(key, _)| key == id)
            .map(|(_, action)| action)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::DecodeError;

    fn length_of(window: &DataWindow<'_>) -> DecodeResult<usize> {
        if window.is_empty() {
            return Err(DecodeError::Invalid("empty".into()));
        }
        Ok(window.len())
    }

    static ENTRIES: [([u8; 4], ChunkAction<usize>); 3] = [
        (*b"LENG", ChunkAction::Decode(length_of)),
        (*b"DATA", ChunkAction::AudioData),
        (*b"D3 \0", ChunkAction::Misaligned(Misalignment::Late)),
    ];

    static TABLE: DecoderTable<[u8; 4], usize> = DecoderTable::new(&ENTRIES);

    #[test]
    fn lookup_by_identifier() {
        assert!(matches!(TABLE.lookup(b"DATA"), Some(ChunkAction::AudioData)));
        assert!(TABLE.lookup(b"NONE").is_none());
        match TABLE.lookup(b"LENG") {
            Some(ChunkAction::Decode(decode)) => {
                let bytes = [1, 2, 3];
                assert_eq!(decode(&DataWindow::new(0, &bytes)), Ok(3));
                assert!(decode(&DataWindow::new(0, &[])).is_err());
            }
            _ => panic!("expected decoder"),
        }
        assert!(matches!(TABLE.lookup(b"D3 \0"), Some(ChunkAction::Misaligned(Misalignment::Late))));
    }

    #[test]
    fn misalignment_rewind() {
        assert_eq!(Misalignment::Late.rewind(8), 9);
        assert_eq!(Misalignment::Early.rewind(8), 7);
    }
}
