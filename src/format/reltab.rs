//! Relocation records and the relocation table section.
//!
//! A relocation table is linked to the program section it patches; each
//! record names a word offset inside that section and the symbol whose value
//! belongs there (as two words, low word first).

use crate::format::words::{push_u32, read_u32};
use crate::format::REL_ENTRY_WORDS;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Relocation {
    /// Word offset of the patch site inside the linked section.
    pub offset: u32,
    /// Index of the referenced symbol in the container's symbol table.
    pub symbol: u32,
}

#[derive(Debug)]
pub struct RelocTable {
    relocs: Vec<Relocation>,
}

impl RelocTable {
    pub fn new() -> RelocTable {
        RelocTable { relocs: Vec::new() }
    }

    pub fn len(&self) -> usize {
        self.relocs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.relocs.is_empty()
    }

    pub fn relocs(&self) -> &[Relocation] {
        &self.relocs
    }

    pub fn relocs_mut(&mut self) -> &mut [Relocation] {
        &mut self.relocs
    }

    pub fn push(&mut self, reloc: Relocation) {
        self.relocs.push(reloc);
    }

    pub fn size_words(&self) -> u32 {
        (self.relocs.len() * REL_ENTRY_WORDS as usize) as u32
    }

    pub fn serialize_words(&self) -> Vec<u16> {
        let mut out = Vec::with_capacity(self.size_words() as usize);
        for reloc in &self.relocs {
            push_u32(&mut out, reloc.offset);
            push_u32(&mut out, reloc.symbol);
        }
        out
    }

    pub fn deserialize(words: &[u16]) -> Result<RelocTable, String> {
        let entry = REL_ENTRY_WORDS as usize;
        if words.len() % entry != 0 {
            return Err(format!(
                "relocation table length {} is not a whole number of 4-word records",
                words.len()
            ));
        }
        let mut tab = RelocTable::new();
        for chunk in words.chunks_exact(entry) {
            tab.push(Relocation { offset: read_u32(chunk, 0), symbol: read_u32(chunk, 2) });
        }
        Ok(tab)
    }
}

impl Default for RelocTable {
    fn default() -> RelocTable {
        RelocTable::new()
    }
}
