//! Section headers and section payloads.

use crate::format::hashtab::HashTable;
use crate::format::reltab::RelocTable;
use crate::format::strtab::StringTable;
use crate::format::symtab::SymbolTable;
use crate::format::words::{push_u32, read_u32};
use crate::format::{
    SHDR_WORDS, SHT_HASHTAB, SHT_INVALID, SHT_NOBITS, SHT_PROGDAT, SHT_RELTAB, SHT_STRTAB,
    SHT_SYMTAB,
};

/// One 16-word section header. `offset` and `size` are derived from the
/// payloads at serialization time; the in-memory values only carry meaning
/// on a freshly deserialized container.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SectionHeader {
    /// Name offset into the section-name string table.
    pub name: u32,
    pub sh_type: u16,
    /// Load address of the first word, for program sections.
    pub addr: u32,
    /// Word offset of the body in the file.
    pub offset: u32,
    /// Body size in words.
    pub size: u32,
    /// Index of a related section (string table for SYMTAB, patched section
    /// for RELTAB).
    pub link: u32,
    pub flags: u16,
    pub align: u16,
    /// Record size in words, for table sections.
    pub entry_size: u16,
}

impl SectionHeader {
    pub fn new(
        name: u32,
        sh_type: u16,
        addr: u32,
        link: u32,
        flags: u16,
        align: u16,
        entry_size: u16,
    ) -> SectionHeader {
        SectionHeader { name, sh_type, addr, offset: 0, size: 0, link, flags, align, entry_size }
    }

    /// The all-zero header of the mandatory null section 0.
    pub fn null() -> SectionHeader {
        SectionHeader::new(0, SHT_INVALID, 0, 0, 0, 0, 0)
    }

    pub fn serialize_words(&self, out: &mut Vec<u16>) {
        push_u32(out, self.name);
        out.push(self.sh_type);
        push_u32(out, self.addr);
        push_u32(out, self.offset);
        push_u32(out, self.size);
        push_u32(out, self.link);
        out.push(self.flags);
        out.push(self.align);
        out.push(self.entry_size);
        out.push(0);
        out.push(0);
    }

    pub fn deserialize(words: &[u16]) -> Result<SectionHeader, String> {
        if words.len() != SHDR_WORDS as usize {
            return Err(format!("section header has {} words, expected 16", words.len()));
        }
        Ok(SectionHeader {
            name: read_u32(words, 0),
            sh_type: words[2],
            addr: read_u32(words, 3),
            offset: read_u32(words, 5),
            size: read_u32(words, 7),
            link: read_u32(words, 9),
            flags: words[11],
            align: words[12],
            entry_size: words[13],
        })
    }
}

/// A section body. Program data and the null section carry raw words; the
/// bookkeeping sections carry their decoded form.
#[derive(Debug)]
pub enum Section {
    Raw(Vec<u16>),
    Strings(StringTable),
    Symbols(SymbolTable),
    Hash(HashTable),
    Relocs(RelocTable),
}

impl Section {
    pub fn size_words(&self) -> u32 {
        match self {
            Section::Raw(words) => words.len() as u32,
            Section::Strings(tab) => tab.size_words(),
            Section::Symbols(tab) => tab.size_words(),
            Section::Hash(tab) => tab.size_words(),
            Section::Relocs(tab) => tab.size_words(),
        }
    }

    pub fn serialize_words(&self) -> Vec<u16> {
        match self {
            Section::Raw(words) => words.clone(),
            Section::Strings(tab) => tab.serialize_words(),
            Section::Symbols(tab) => tab.serialize_words(),
            Section::Hash(tab) => tab.serialize_words(),
            Section::Relocs(tab) => tab.serialize_words(),
        }
    }

    /// Decode a body according to the declared section type. NOBITS is
    /// handled by the container (its body is absent from the file).
    pub fn deserialize(sh_type: u16, words: &[u16]) -> Result<Section, String> {
        match sh_type {
            SHT_INVALID | SHT_PROGDAT | SHT_NOBITS => Ok(Section::Raw(words.to_vec())),
            SHT_STRTAB => Ok(Section::Strings(StringTable::from_words(words))),
            SHT_SYMTAB => Ok(Section::Symbols(SymbolTable::deserialize(words)?)),
            SHT_HASHTAB => Ok(Section::Hash(HashTable::deserialize(words)?)),
            SHT_RELTAB => Ok(Section::Relocs(RelocTable::deserialize(words)?)),
            _ => Err(format!("unknown section type {}", sh_type)),
        }
    }

    pub fn as_raw(&self) -> Option<&Vec<u16>> {
        match self {
            Section::Raw(words) => Some(words),
            _ => None,
        }
    }

    pub fn as_raw_mut(&mut self) -> Option<&mut Vec<u16>> {
        match self {
            Section::Raw(words) => Some(words),
            _ => None,
        }
    }

    pub fn as_strings(&self) -> Option<&StringTable> {
        match self {
            Section::Strings(tab) => Some(tab),
            _ => None,
        }
    }

    pub fn as_strings_mut(&mut self) -> Option<&mut StringTable> {
        match self {
            Section::Strings(tab) => Some(tab),
            _ => None,
        }
    }

    pub fn as_symbols(&self) -> Option<&SymbolTable> {
        match self {
            Section::Symbols(tab) => Some(tab),
            _ => None,
        }
    }

    pub fn as_symbols_mut(&mut self) -> Option<&mut SymbolTable> {
        match self {
            Section::Symbols(tab) => Some(tab),
            _ => None,
        }
    }

    pub fn as_hash(&self) -> Option<&HashTable> {
        match self {
            Section::Hash(tab) => Some(tab),
            _ => None,
        }
    }

    pub fn as_hash_mut(&mut self) -> Option<&mut HashTable> {
        match self {
            Section::Hash(tab) => Some(tab),
            _ => None,
        }
    }

    pub fn as_relocs(&self) -> Option<&RelocTable> {
        match self {
            Section::Relocs(tab) => Some(tab),
            _ => None,
        }
    }

    pub fn as_relocs_mut(&mut self) -> Option<&mut RelocTable> {
        match self {
            Section::Relocs(tab) => Some(tab),
            _ => None,
        }
    }
}
