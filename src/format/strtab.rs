//! Packed-word string tables.
//!
//! A string table is a run of packed ASCII entries, each terminated by a
//! zero word, with a zero word at offset 0 so that name offset 0 always
//! resolves to the empty string. Strings are referenced by the word offset
//! of their first word.

use crate::format::words::{pack_str, unpack_str};

#[derive(Debug)]
pub struct StringTable {
    words: Vec<u16>,
}

impl StringTable {
    pub fn new() -> StringTable {
        StringTable { words: vec![0] }
    }

    /// Rebuild a table from its wire words, restoring the leading and
    /// trailing zero words if the input lacks them.
    pub fn from_words(words: &[u16]) -> StringTable {
        let mut w = Vec::with_capacity(words.len() + 2);
        if words.first() != Some(&0) {
            w.push(0);
        }
        w.extend_from_slice(words);
        if w.last() != Some(&0) {
            w.push(0);
        }
        StringTable { words: w }
    }

    pub fn size_words(&self) -> u32 {
        self.words.len() as u32
    }

    /// Decode the entry starting at `offset`.
    pub fn string_at(&self, offset: u32) -> Result<String, String> {
        let start = offset as usize;
        if start >= self.words.len() {
            return Err(format!("string offset {} is out of range", offset));
        }
        let mut end = start;
        while self.words[end] != 0 {
            end += 1;
            if end >= self.words.len() {
                return Err(format!("unterminated string at offset {}", offset));
            }
        }
        unpack_str(&self.words[start..end])
    }

    /// Return the offset of `s`, appending it first if the table does not
    /// already contain it.
    pub fn intern(&mut self, s: &str) -> Result<u32, String> {
        let packed = pack_str(s)?;
        let mut entry: Vec<u16> = Vec::new();
        let mut offset = 0usize;
        for i in 0..self.words.len() {
            if self.words[i] == 0 {
                if entry == packed {
                    return Ok(offset as u32);
                }
                entry.clear();
                offset = i + 1;
            } else {
                entry.push(self.words[i]);
            }
        }
        let offset = self.words.len() as u32;
        self.words.extend_from_slice(&packed);
        self.words.push(0);
        Ok(offset)
    }

    pub fn serialize_words(&self) -> Vec<u16> {
        self.words.clone()
    }
}

impl Default for StringTable {
    fn default() -> StringTable {
        StringTable::new()
    }
}
