// Encoding utilities

use encoding_rs::{UTF_16BE, UTF_16LE, UTF_8, WINDOWS_1252};

/// Text encoding types
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TextEncoding {
    Iso8859_1 = 0,
    Utf16 = 1,
    Utf16BE = 2,
    Utf8 = 3,
}

impl TextEncoding {
    pub fn from_byte(byte: u8) -> Self {
        match byte {
            1 => TextEncoding::Utf16,
            2 => TextEncoding::Utf16BE,
            3 => TextEncoding::Utf8,
            _ => TextEncoding::Iso8859_1,
        }
    }
}

/// Decode text with specified encoding
pub fn decode_text(data: &[u8], encoding: TextEncoding) -> String {
    match encoding {
        TextEncoding::Iso8859_1 => WINDOWS_1252.decode(data).0.to_string(),
        TextEncoding::Utf16 => {
            // Detect BOM
            if data.len() >= 2 {
                if data[0..2] == [0xFF, 0xFE] {
                    UTF_16LE.decode(&data[2..]).0.to_string()
                } else if data[0..2] == [0xFE, 0xFF] {
                    UTF_16BE.decode(&data[2..]).0.to_string()
                } else {
                    UTF_16LE.decode(data).0.to_string()
                }
            } else {
                String::new()
            }
        }
        TextEncoding::Utf16BE => UTF_16BE.decode(data).0.to_string(),
        TextEncoding::Utf8 => UTF_8.decode(data).0.to_string(),
    }
}

/// Decode a fixed-size UTF-16LE field, dropping the trailing terminator
pub fn decode_utf16le_fixed(data: &[u8]) -> String {
    let text = UTF_16LE.decode_without_bom_handling(data).0;
    text.trim_end_matches('\0').to_string()
}

/// Decode a Latin-1 text chunk, dropping trailing NUL padding
pub fn decode_latin1(data: &[u8]) -> String {
    decode_text(data, TextEncoding::Iso8859_1)
        .trim_end_matches('\0')
        .to_string()
}
