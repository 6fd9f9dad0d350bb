// ASF GUIDs
//
// On disk a GUID is 16 bytes: Data1 (u32 LE), Data2 (u16 LE), Data3 (u16 LE),
// then 8 raw bytes. `Guid` keeps the on-disk byte order.

use std::io::Read;

/// 16-byte object identifier in on-disk order
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Guid(pub [u8; 16]);

impl Guid {
    pub const LEN: usize = 16;

    /// Build from the canonical `D1-D2-D3-D4` parts
    pub const fn new(d1: u32, d2: u16, d3: u16, d4: [u8; 8]) -> Self {
        let a = d1.to_le_bytes();
        let b = d2.to_le_bytes();
        let c = d3.to_le_bytes();
        Guid([
            a[0], a[1], a[2], a[3], b[0], b[1], c[0], c[1], d4[0], d4[1], d4[2], d4[3], d4[4], d4[5],
            d4[6], d4[7],
        ])
    }

    pub fn read<R: Read>(reader: &mut R) -> std::io::Result<Self> {
        let mut bytes = [0u8; Self::LEN];
        reader.read_exact(&mut bytes)?;
        Ok(Guid(bytes))
    }

    /// Human name for the GUIDs this crate knows about
    pub fn name(&self) -> Option<&'static str> {
        KNOWN.iter().find(|(guid, _)| guid == self).map(|(_, name)| *name)
    }
}

impl std::fmt::Display for Guid {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let b = &self.0;
        let d1 = u32::from_le_bytes([b[0], b[1], b[2], b[3]]);
        let d2 = u16::from_le_bytes([b[4], b[5]]);
        let d3 = u16::from_le_bytes([b[6], b[7]]);
        write!(
            f,
            "{:08X}-{:04X}-{:04X}-{:02X}{:02X}-{:02X}{:02X}{:02X}{:02X}{:02X}{:02X}",
            d1, d2, d3, b[8], b[9], b[10], b[11], b[12], b[13], b[14], b[15]
        )
    }
}

impl std::fmt::Debug for Guid {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Guid({})", self)
    }
}

impl serde::Serialize for Guid {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

pub const HEADER: Guid = Guid::new(0x75B2_2630, 0x668E, 0x11CF, [0xA6, 0xD9, 0x00, 0xAA, 0x00, 0x62, 0xCE, 0x6C]);
pub const DATA: Guid = Guid::new(0x75B2_2636, 0x668E, 0x11CF, [0xA6, 0xD9, 0x00, 0xAA, 0x00, 0x62, 0xCE, 0x6C]);
pub const FILE_PROPERTIES: Guid =
    Guid::new(0x8CAB_DCA1, 0xA947, 0x11CF, [0x8E, 0xE4, 0x00, 0xC0, 0x0C, 0x20, 0x53, 0x65]);
pub const STREAM_PROPERTIES: Guid =
    Guid::new(0xB7DC_0791, 0xA9B7, 0x11CF, [0x8E, 0xE6, 0x00, 0xC0, 0x0C, 0x20, 0x53, 0x65]);
pub const AUDIO_MEDIA: Guid =
    Guid::new(0xF869_9E40, 0x5B4D, 0x11CF, [0xA8, 0xFD, 0x00, 0x80, 0x5F, 0x5C, 0x44, 0x2B]);
pub const CONTENT_DESCRIPTION: Guid =
    Guid::new(0x75B2_2633, 0x668E, 0x11CF, [0xA6, 0xD9, 0x00, 0xAA, 0x00, 0x62, 0xCE, 0x6C]);
pub const EXTENDED_CONTENT_DESCRIPTION: Guid =
    Guid::new(0xD2D0_A440, 0xE307, 0x11D2, [0x97, 0xF0, 0x00, 0xA0, 0xC9, 0x5E, 0xA8, 0x50]);
pub const HEADER_EXTENSION: Guid =
    Guid::new(0x5FBF_03B5, 0xA92E, 0x11CF, [0x8E, 0xE3, 0x00, 0xC0, 0x0C, 0x20, 0x53, 0x65]);
pub const METADATA: Guid = Guid::new(0xC5F8_CBEA, 0x5BAF, 0x4877, [0x84, 0x67, 0xAA, 0x8C, 0x44, 0xFA, 0x4C, 0xCA]);
pub const METADATA_LIBRARY: Guid =
    Guid::new(0x4423_1C94, 0x9498, 0x49D1, [0xA1, 0x41, 0x1D, 0x13, 0x4E, 0x45, 0x70, 0x54]);
pub const LANGUAGE_LIST: Guid =
    Guid::new(0x7C43_46A9, 0xEFE0, 0x4BFC, [0xB2, 0x29, 0x39, 0x3E, 0xDE, 0x41, 0x5C, 0x85]);
pub const HEADER_EXTENSION_RESERVED: Guid =
    Guid::new(0xABD3_D211, 0xA9BA, 0x11CF, [0x8E, 0xE6, 0x00, 0xC0, 0x0C, 0x20, 0x53, 0x65]);

static KNOWN: [(Guid, &str); 12] = [
    (HEADER, "Header"),
    (DATA, "Data"),
    (FILE_PROPERTIES, "File Properties"),
    (STREAM_PROPERTIES, "Stream Properties"),
    (AUDIO_MEDIA, "Audio Media"),
    (CONTENT_DESCRIPTION, "Content Description"),
    (EXTENDED_CONTENT_DESCRIPTION, "Extended Content Description"),
    (HEADER_EXTENSION, "Header Extension"),
    (METADATA, "Metadata"),
    (METADATA_LIBRARY, "Metadata Library"),
    (LANGUAGE_LIST, "Language List"),
    (HEADER_EXTENSION_RESERVED, "Header Extension Reserved"),
];
