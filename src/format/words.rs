//! Word-level codec helpers.
//!
//! Everything in an SLBF file is measured in 16-bit words. On disk each word
//! is big-endian; 32-bit values occupy two consecutive words with the
//! least-significant word first. ASCII text is packed two characters per
//! word, first character in the high byte, with the spare low byte of an
//! odd-length string left zero.

use byteorder::{BigEndian, ByteOrder};

/// Serialize a word sequence to big-endian bytes.
pub fn words_to_bytes(words: &[u16]) -> Vec<u8> {
    let mut bytes = vec![0u8; words.len() * 2];
    BigEndian::write_u16_into(words, &mut bytes);
    bytes
}

/// Parse big-endian bytes back into words. The byte count must be even.
pub fn bytes_to_words(bytes: &[u8]) -> Result<Vec<u16>, String> {
    if bytes.len() % 2 != 0 {
        return Err(format!(
            "byte length {} is not a whole number of 16-bit words",
            bytes.len()
        ));
    }
    let mut words = vec![0u16; bytes.len() / 2];
    BigEndian::read_u16_into(bytes, &mut words);
    Ok(words)
}

/// Low word of a 32-bit value.
pub fn u32_lo(value: u32) -> u16 {
    value as u16
}

/// High word of a 32-bit value.
pub fn u32_hi(value: u32) -> u16 {
    (value >> 16) as u16
}

/// Reassemble a 32-bit value from its low and high words.
pub fn u32_from_words(lo: u16, hi: u16) -> u32 {
    ((hi as u32) << 16) | lo as u32
}

/// Append a 32-bit value as two words, low word first.
pub fn push_u32(words: &mut Vec<u16>, value: u32) {
    words.push(u32_lo(value));
    words.push(u32_hi(value));
}

/// Read a 32-bit value stored at `idx` (low word) and `idx + 1` (high word).
/// The caller is responsible for bounds.
pub fn read_u32(words: &[u16], idx: usize) -> u32 {
    u32_from_words(words[idx], words[idx + 1])
}

/// Pack an ASCII string two characters per word, high byte first. The lone
/// final character of an odd-length string lands in the low byte of the last
/// word, with a zero high byte.
pub fn pack_str(s: &str) -> Result<Vec<u16>, String> {
    if !s.is_ascii() {
        return Err(format!("string {:?} contains non-ASCII characters", s));
    }
    let bytes = s.as_bytes();
    let mut words = Vec::with_capacity((bytes.len() + 1) / 2);
    let mut pairs = bytes.chunks_exact(2);
    for pair in &mut pairs {
        words.push(((pair[0] as u16) << 8) | pair[1] as u16);
    }
    if let [last] = pairs.remainder() {
        words.push(*last as u16);
    }
    Ok(words)
}

/// Unpack words produced by [`pack_str`]. Zero bytes are padding and are
/// skipped; non-ASCII bytes are a format error.
pub fn unpack_str(words: &[u16]) -> Result<String, String> {
    let mut s = String::with_capacity(words.len() * 2);
    for &w in words {
        let hi = (w >> 8) as u8;
        let lo = (w & 0xff) as u8;
        if hi >= 0x80 || lo >= 0x80 {
            return Err(format!("packed word {:#06x} is not ASCII", w));
        }
        if hi != 0 {
            s.push(hi as char);
        }
        if lo != 0 {
            s.push(lo as char);
        }
    }
    Ok(s)
}
