//! Little-endian primitive decoders shared by [`crate::buffer::BufferReader`]
//! and [`crate::reader::JazelleReader`]. Unlike the VAX float path these are
//! plain fixed-width integer reads; they exist as free functions so both the
//! byte-cursor reader and the bulk bank decoders can call them without
//! depending on each other.

use std::convert::TryInto;

use smallstr::SmallString;

/// A small fixed-capacity string for the format's many 8-byte name fields
/// (`rectype`, `format`, `context`, `segment`, `usrnam`), avoiding a heap
/// allocation per field.
pub(crate) type FlexString = SmallString<[u8; 8]>;

pub(crate) fn read_i16(input: &[u8]) -> i16 {
    i16::from_le_bytes(input.try_into().unwrap())
}

pub(crate) fn read_u16(input: &[u8]) -> u16 {
    u16::from_le_bytes(input.try_into().unwrap())
}

pub(crate) fn read_i32(input: &[u8]) -> i32 {
    i32::from_le_bytes(input.try_into().unwrap())
}

pub(crate) fn read_u32(input: &[u8]) -> u32 {
    u32::from_le_bytes(input.try_into().unwrap())
}

pub(crate) fn read_i64(input: &[u8]) -> i64 {
    i64::from_le_bytes(input.try_into().unwrap())
}

pub(crate) fn read_u64(input: &[u8]) -> u64 {
    u64::from_le_bytes(input.try_into().unwrap())
}

/// Interprets a fixed-width field as right-trimmed ASCII, substituting `?`
/// for any byte outside the printable ASCII range rather than failing.
pub(crate) fn read_fixed_ascii(input: &[u8]) -> String {
    read_cleaned(input).trim_end().to_string()
}

/// Same cleanup as [`read_fixed_ascii`], but for the format's many 8-byte
/// name fields, returned as a [`FlexString`] instead of a heap-allocated
/// `String`.
pub(crate) fn read_flex_ascii(input: &[u8]) -> FlexString {
    FlexString::from(read_cleaned(input).trim_end())
}

fn read_cleaned(input: &[u8]) -> String {
    let cleaned: Vec<u8> = input
        .iter()
        .map(|&b| if b.is_ascii() { b } else { b'?' })
        .collect();
    // `cleaned` is ASCII by construction, so this can't fail.
    String::from_utf8(cleaned).unwrap()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn little_endian_round_trip() {
        assert_eq!(read_i32(&42i32.to_le_bytes()), 42);
        assert_eq!(read_u16(&1000u16.to_le_bytes()), 1000);
        assert_eq!(read_i64(&(-7i64).to_le_bytes()), -7);
    }

    #[test]
    fn trims_trailing_spaces_and_substitutes_invalid_bytes() {
        assert_eq!(read_fixed_ascii(b"MINIDST "), "MINIDST");
        assert_eq!(read_fixed_ascii(&[b'A', 0xFF, b'B', b' ']), "A?B");
    }
}
