//! The SLBF container: a file header plus parallel lists of section headers
//! and section bodies.
//!
//! Body offsets and sizes in the section headers are derived while
//! serializing; callers never maintain them by hand. Deserialization
//! validates the magic, version, section types, and declared bounds, and
//! reconstructs NOBITS bodies as zero-filled raw sections of their declared
//! size.

use crate::format::hashtab::HashTable;
use crate::format::reltab::{RelocTable, Relocation};
use crate::format::section::{Section, SectionHeader};
use crate::format::strtab::StringTable;
use crate::format::symtab::{Symbol, SymbolTable};
use crate::format::words::{
    bytes_to_words, push_u32, read_u32, u32_hi, u32_lo, words_to_bytes,
};
use crate::format::{
    section_type_name, HASH_ENTRY_WORDS, HDR_WORDS, SECT_ABS, SHDR_WORDS, SHT_NOBITS,
    SHT_RELTAB, SLBF_MAGIC, SLBF_MAGIC_WORDS, SYM_ENTRY_WORDS, SYM_LOCAL, VERSION_CURRENT,
};

/// Rebuild the hash buckets once more than this fraction of them is in use.
const MAX_LOAD_FACTOR: f64 = 0.75;
/// Bucket count multiplier on rebuild.
const BUCKET_GROWTH: f64 = 1.5;

/// The decoded file header. `shoff` is only meaningful on a freshly
/// deserialized container; serialization recomputes it.
#[derive(Debug)]
pub struct FileHeader {
    pub kind: u16,
    /// Symbol-table index of the entry symbol, for executables.
    pub entry: u32,
    /// Word offset of the section-header table.
    pub shoff: u32,
    pub shnum: u16,
    /// Index of the section-name string table.
    pub shstrtab: u16,
    /// Index of the symbol table.
    pub symtab: u16,
    /// Index of the symbol hash table.
    pub hashtab: u16,
}

#[derive(Debug)]
pub struct Container {
    pub header: FileHeader,
    headers: Vec<SectionHeader>,
    sections: Vec<Section>,
}

impl Container {
    fn empty(kind: u16) -> Container {
        Container {
            header: FileHeader {
                kind,
                entry: 0,
                shoff: 0,
                shnum: 0,
                shstrtab: 0,
                symtab: 0,
                hashtab: 0,
            },
            headers: Vec::new(),
            sections: Vec::new(),
        }
    }

    /// Build the standard object skeleton: null section 0, section-name
    /// string table, symbol hash table, symbol table and its string table,
    /// plus the permanent null symbol (which never gets a hash entry).
    pub fn new_object(kind: u16) -> Result<Container, String> {
        let mut c = Container::empty(kind);
        c.add_section(SectionHeader::null(), Section::Raw(Vec::new()));

        let mut shstrtab = StringTable::new();
        let name = shstrtab.intern("@shstrtab")?;
        let hdr = SectionHeader::new(name, crate::format::SHT_STRTAB, 0, 0, 0, 0, 0);
        c.header.shstrtab = c.add_section(hdr, Section::Strings(shstrtab));

        let name = c.shstrtab_mut()?.intern("@hashtab")?;
        let hdr = SectionHeader::new(name, crate::format::SHT_HASHTAB, 0, 0, 0, 0, HASH_ENTRY_WORDS);
        c.header.hashtab = c.add_section(hdr, Section::Hash(HashTable::new(4, 1)?));

        let name = c.shstrtab_mut()?.intern("@symtab")?;
        let hdr = SectionHeader::new(name, crate::format::SHT_SYMTAB, 0, 0, 0, 0, SYM_ENTRY_WORDS);
        let symtab_idx = c.add_section(hdr, Section::Symbols(SymbolTable::new()));
        c.header.symtab = symtab_idx;

        let name = c.shstrtab_mut()?.intern("@symstrtab")?;
        let hdr = SectionHeader::new(name, crate::format::SHT_STRTAB, 0, 0, 0, 0, 0);
        let symstrtab_idx = c.add_section(hdr, Section::Strings(StringTable::new()));
        c.section_header_mut(symtab_idx)?.link = symstrtab_idx as u32;

        c.add_symbol(Symbol::new(0, 0, SYM_LOCAL, SECT_ABS), false)?;
        Ok(c)
    }

    /// Append a section, returning its index.
    pub fn add_section(&mut self, header: SectionHeader, body: Section) -> u16 {
        self.headers.push(header);
        self.sections.push(body);
        self.header.shnum = self.headers.len() as u16;
        (self.headers.len() - 1) as u16
    }

    pub fn section_count(&self) -> u16 {
        self.headers.len() as u16
    }

    pub fn section(&self, idx: u16) -> Result<(&SectionHeader, &Section), String> {
        let i = idx as usize;
        if i >= self.headers.len() {
            return Err(format!("section index {} is out of range", idx));
        }
        Ok((&self.headers[i], &self.sections[i]))
    }

    pub fn section_header(&self, idx: u16) -> Result<&SectionHeader, String> {
        self.headers
            .get(idx as usize)
            .ok_or_else(|| format!("section index {} is out of range", idx))
    }

    pub fn section_header_mut(&mut self, idx: u16) -> Result<&mut SectionHeader, String> {
        let n = self.headers.len();
        self.headers
            .get_mut(idx as usize)
            .ok_or_else(|| format!("section index {} is out of range ({} sections)", idx, n))
    }

    pub fn section_body(&self, idx: u16) -> Result<&Section, String> {
        self.sections
            .get(idx as usize)
            .ok_or_else(|| format!("section index {} is out of range", idx))
    }

    pub fn section_body_mut(&mut self, idx: u16) -> Result<&mut Section, String> {
        let n = self.sections.len();
        self.sections
            .get_mut(idx as usize)
            .ok_or_else(|| format!("section index {} is out of range ({} sections)", idx, n))
    }

    // ── Typed accessors for the bookkeeping sections ────────────────────────

    pub fn shstrtab(&self) -> Result<&StringTable, String> {
        self.section_body(self.header.shstrtab)?
            .as_strings()
            .ok_or_else(|| "section-name table is not a string table".to_string())
    }

    pub fn shstrtab_mut(&mut self) -> Result<&mut StringTable, String> {
        let idx = self.header.shstrtab;
        self.section_body_mut(idx)?
            .as_strings_mut()
            .ok_or_else(|| "section-name table is not a string table".to_string())
    }

    pub fn symbol_table(&self) -> Result<&SymbolTable, String> {
        self.section_body(self.header.symtab)?
            .as_symbols()
            .ok_or_else(|| "symbol-table section does not hold symbols".to_string())
    }

    pub fn symbol_table_mut(&mut self) -> Result<&mut SymbolTable, String> {
        let idx = self.header.symtab;
        self.section_body_mut(idx)?
            .as_symbols_mut()
            .ok_or_else(|| "symbol-table section does not hold symbols".to_string())
    }

    pub fn hash_table(&self) -> Result<&HashTable, String> {
        self.section_body(self.header.hashtab)?
            .as_hash()
            .ok_or_else(|| "hash-table section does not hold a hash table".to_string())
    }

    pub fn hash_table_mut(&mut self) -> Result<&mut HashTable, String> {
        let idx = self.header.hashtab;
        self.section_body_mut(idx)?
            .as_hash_mut()
            .ok_or_else(|| "hash-table section does not hold a hash table".to_string())
    }

    pub fn symbol_strtab(&self) -> Result<&StringTable, String> {
        let link = self.section_header(self.header.symtab)?.link as u16;
        self.section_body(link)?
            .as_strings()
            .ok_or_else(|| "symbol string table is not a string table".to_string())
    }

    pub fn symbol_strtab_mut(&mut self) -> Result<&mut StringTable, String> {
        let link = self.section_header(self.header.symtab)?.link as u16;
        self.section_body_mut(link)?
            .as_strings_mut()
            .ok_or_else(|| "symbol string table is not a string table".to_string())
    }

    pub fn reloc_table(&self, idx: u16) -> Result<&RelocTable, String> {
        self.section_body(idx)?
            .as_relocs()
            .ok_or_else(|| format!("section {} is not a relocation table", idx))
    }

    pub fn reloc_table_mut(&mut self, idx: u16) -> Result<&mut RelocTable, String> {
        self.section_body_mut(idx)?
            .as_relocs_mut()
            .ok_or_else(|| format!("section {} is not a relocation table", idx))
    }

    pub fn raw_words(&self, idx: u16) -> Result<&Vec<u16>, String> {
        self.section_body(idx)?
            .as_raw()
            .ok_or_else(|| format!("section {} does not hold raw words", idx))
    }

    // ── Names ───────────────────────────────────────────────────────────────

    pub fn section_name(&self, idx: u16) -> Result<String, String> {
        let name = self.section_header(idx)?.name;
        self.shstrtab()?.string_at(name)
    }

    pub fn symbol_name(&self, id: u32) -> Result<String, String> {
        let name = self.symbol_table()?.get(id)?.name;
        self.symbol_strtab()?.string_at(name)
    }

    // ── Symbols ─────────────────────────────────────────────────────────────

    /// Look up a symbol by name. Only name-registered symbols participate;
    /// a stale chain entry whose symbol was since demoted is skipped.
    pub fn find_symbol(&self, name: &str) -> Result<Option<u32>, String> {
        let symtab = self.symbol_table()?;
        let hashtab = self.hash_table()?;
        hashtab.find(name, |id| {
            if symtab.is_named(id) {
                self.symbol_name(id).ok()
            } else {
                None
            }
        })
    }

    /// Turn a symbol into an anonymous local: it keeps its record but no
    /// longer resolves by name, and the next hash rebuild forgets it.
    pub fn demote_symbol(&mut self, id: u32) -> Result<(), String> {
        let symtab = self.symbol_table_mut()?;
        symtab.get_mut(id)?.visibility = crate::format::SYM_LOCAL;
        symtab.set_named(id, false);
        Ok(())
    }

    /// Append a symbol, returning its index. With `with_name` set the symbol
    /// is registered in the hash table under the name its record points at,
    /// and the growth invariant is re-established.
    pub fn add_symbol(&mut self, symbol: Symbol, with_name: bool) -> Result<u32, String> {
        let name = if with_name {
            Some(self.symbol_strtab()?.string_at(symbol.name)?)
        } else {
            None
        };
        let id = self.symbol_table_mut()?.push(symbol, with_name);
        if let Some(name) = name {
            self.hash_table_mut()?.insert(&name, id)?;
            self.rehash()?;
        }
        Ok(id)
    }

    /// Find `name`, creating a LOCAL/UNDEF symbol for it if absent, and
    /// record a relocation against it. This is the forward-reference path.
    pub fn reference_symbol(&mut self, name: &str, reltab: u16, offset: u32) -> Result<u32, String> {
        let id = match self.find_symbol(name)? {
            Some(id) => id,
            None => {
                let name_off = self.symbol_strtab_mut()?.intern(name)?;
                self.add_symbol(Symbol::new(name_off, 0, SYM_LOCAL, crate::format::SECT_UNDEF), true)?
            }
        };
        self.reloc_table_mut(reltab)?.push(Relocation { offset, symbol: id });
        Ok(id)
    }

    /// Keep the chain at least as long as the symbol table and grow the
    /// buckets when the load factor passes the threshold. A grow rebuilds
    /// from scratch, re-inserting the name-registered symbols in table
    /// order.
    fn rehash(&mut self) -> Result<(), String> {
        let symcount = self.symbol_table()?.len();
        self.hash_table_mut()?.ensure_chain_capacity(symcount);
        if self.hash_table()?.load_factor() <= MAX_LOAD_FACTOR {
            return Ok(());
        }
        let new_nbucket = (self.hash_table()?.nbucket() as f64 * BUCKET_GROWTH) as usize;
        let mut named = Vec::new();
        for id in 0..symcount as u32 {
            if self.symbol_table()?.is_named(id) {
                named.push((id, self.symbol_name(id)?));
            }
        }
        let hashtab = self.hash_table_mut()?;
        hashtab.rebuild_with_buckets(new_nbucket);
        for (id, name) in &named {
            hashtab.insert(name, *id)?;
        }
        Ok(())
    }

    /// Transition an undefined symbol to a defined one and immediately patch
    /// every relocation that references it.
    pub fn define_symbol(&mut self, id: u32, value: u32, section_ref: u16) -> Result<(), String> {
        {
            let symbol = self.symbol_table()?.get(id)?;
            if !symbol.is_undefined() {
                return Err(format!("cannot redefine symbol '{}'", self.symbol_name(id)?));
            }
            if symbol.is_extern() {
                return Err(format!(
                    "cannot locally define external symbol '{}'",
                    self.symbol_name(id)?
                ));
            }
        }
        {
            let symbol = self.symbol_table_mut()?.get_mut(id)?;
            symbol.value = value;
            symbol.section = section_ref;
        }
        let mut patches = Vec::new();
        for idx in 0..self.section_count() {
            let (hdr, body) = self.section(idx)?;
            if hdr.sh_type != SHT_RELTAB {
                continue;
            }
            let target = hdr.link as u16;
            if let Some(reltab) = body.as_relocs() {
                for reloc in reltab.relocs() {
                    if reloc.symbol == id {
                        patches.push((target, reloc.offset));
                    }
                }
            }
        }
        for (target, offset) in patches {
            self.patch_word_pair(target, offset, value)?;
        }
        Ok(())
    }

    /// Write `value` into a raw section as two words, low word first.
    pub fn patch_word_pair(&mut self, section: u16, offset: u32, value: u32) -> Result<(), String> {
        let name = self.section_name(section).unwrap_or_default();
        let words = self
            .section_body_mut(section)?
            .as_raw_mut()
            .ok_or_else(|| format!("relocated section '{}' does not hold raw words", name))?;
        let i = offset as usize;
        if i + 1 >= words.len() {
            return Err(format!(
                "relocation offset {} is out of range in section '{}' ({} words)",
                offset,
                name,
                words.len()
            ));
        }
        words[i] = u32_lo(value);
        words[i + 1] = u32_hi(value);
        Ok(())
    }

    // ── Wire form ───────────────────────────────────────────────────────────

    pub fn to_bytes(&self) -> Vec<u8> {
        let mut body: Vec<u16> = Vec::new();
        let mut fixed: Vec<SectionHeader> = Vec::with_capacity(self.headers.len());
        for (hdr, sec) in self.headers.iter().zip(&self.sections) {
            let mut h = hdr.clone();
            h.offset = HDR_WORDS as u32 + body.len() as u32;
            h.size = sec.size_words();
            if h.sh_type != SHT_NOBITS {
                body.extend(sec.serialize_words());
            }
            fixed.push(h);
        }
        let shoff = HDR_WORDS as u32 + body.len() as u32;

        let mut words: Vec<u16> = Vec::with_capacity(
            HDR_WORDS as usize + body.len() + fixed.len() * SHDR_WORDS as usize,
        );
        words.extend_from_slice(&SLBF_MAGIC_WORDS);
        words.push(self.header.kind);
        words.push(VERSION_CURRENT);
        push_u32(&mut words, self.header.entry);
        push_u32(&mut words, shoff);
        words.push(HDR_WORDS);
        words.push(SHDR_WORDS);
        words.push(self.header.shnum);
        words.push(self.header.shstrtab);
        words.push(self.header.symtab);
        words.push(self.header.hashtab);
        words.push(0);
        words.extend(body);
        for h in &fixed {
            h.serialize_words(&mut words);
        }
        words_to_bytes(&words)
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Container, String> {
        if bytes.len() < 2 * HDR_WORDS as usize {
            return Err(format!("file is too small to be an SLBF container ({} bytes)", bytes.len()));
        }
        if bytes[..SLBF_MAGIC.len()] != SLBF_MAGIC {
            return Err("bad magic, not an SLBF container".to_string());
        }
        let words = bytes_to_words(bytes)?;

        let kind = words[3];
        let version = words[4];
        if version != VERSION_CURRENT {
            return Err(format!("unsupported container version {}", version));
        }
        let entry = read_u32(&words, 5);
        let shoff = read_u32(&words, 7);
        let shnum = words[11];
        let shstrtab = words[12];
        let symtab = words[13];
        let hashtab = words[14];

        let mut c = Container::empty(kind);
        c.header.entry = entry;
        c.header.shoff = shoff;
        c.header.shstrtab = shstrtab;
        c.header.symtab = symtab;
        c.header.hashtab = hashtab;

        for i in 0..shnum {
            let base = shoff as usize + i as usize * SHDR_WORDS as usize;
            let end = base + SHDR_WORDS as usize;
            if end > words.len() {
                return Err(format!("section header {} lies outside the file", i));
            }
            let hdr = SectionHeader::deserialize(&words[base..end])?;
            let sec = if hdr.sh_type == SHT_NOBITS {
                Section::Raw(vec![0; hdr.size as usize])
            } else {
                let start = hdr.offset as usize;
                let stop = start + hdr.size as usize;
                if stop > words.len() {
                    return Err(format!(
                        "{} section {} declares {} words at offset {}, outside the file",
                        section_type_name(hdr.sh_type),
                        i,
                        hdr.size,
                        hdr.offset
                    ));
                }
                Section::deserialize(hdr.sh_type, &words[start..stop])?
            };
            c.add_section(hdr, sec);
        }

        // Name registration is not part of the wire form; restore it from
        // the hash table so lookups work on the read-back container.
        let ids = c.hash_table().map(|h| h.registered_ids()).unwrap_or_default();
        if let Ok(symtab) = c.symbol_table_mut() {
            for id in ids {
                symtab.set_named(id, true);
            }
        }
        Ok(c)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::format::{
        FT_OBJECT, SECT_UNDEF, SHT_HASHTAB, SHT_PROGDAT, SHT_STRTAB, SHT_SYMTAB, SYM_GLOBAL,
    };
    use std::io::{Read, Write};

    fn object_with_symbol(name: &str) -> (Container, u32) {
        let mut c = Container::new_object(FT_OBJECT).unwrap();
        let off = c.symbol_strtab_mut().unwrap().intern(name).unwrap();
        let id = c
            .add_symbol(Symbol::new(off, 0, SYM_GLOBAL, SECT_UNDEF), true)
            .unwrap();
        (c, id)
    }

    #[test]
    fn test_object_scaffold() {
        let c = Container::new_object(FT_OBJECT).unwrap();
        assert_eq!(c.section_count(), 5);
        assert_eq!(c.header.shstrtab, 1);
        assert_eq!(c.header.hashtab, 2);
        assert_eq!(c.header.symtab, 3);
        assert_eq!(c.section_header(1).unwrap().name, 1);
        assert_eq!(c.section_name(1).unwrap(), "@shstrtab");
        assert_eq!(c.section_name(2).unwrap(), "@hashtab");
        assert_eq!(c.section_name(3).unwrap(), "@symtab");
        assert_eq!(c.section_name(4).unwrap(), "@symstrtab");
        assert_eq!(c.section_header(3).unwrap().link, 4);
        assert_eq!(c.hash_table().unwrap().nbucket(), 4);
        // The null symbol is present but not hashed.
        assert_eq!(c.symbol_table().unwrap().len(), 1);
        let null = c.symbol_table().unwrap().get(0).unwrap().clone();
        assert!(null.is_local() && null.is_absolute());
        assert_eq!(c.find_symbol("").unwrap(), None);
    }

    #[test]
    fn test_add_and_find_symbol() {
        let (c, id) = object_with_symbol("main");
        assert_eq!(c.find_symbol("main").unwrap(), Some(id));
        assert_eq!(c.symbol_name(id).unwrap(), "main");
        assert_eq!(c.find_symbol("other").unwrap(), None);
    }

    #[test]
    fn test_rehash_preserves_lookups() {
        // 4 buckets and a 0.75 threshold force at least one rebuild here.
        let mut c = Container::new_object(FT_OBJECT).unwrap();
        let names: Vec<String> = (0..12).map(|i| format!("sym{}", i)).collect();
        let mut ids = Vec::new();
        for name in &names {
            let off = c.symbol_strtab_mut().unwrap().intern(name).unwrap();
            ids.push(c.add_symbol(Symbol::new(off, 0, SYM_GLOBAL, SECT_ABS), true).unwrap());
        }
        assert!(c.hash_table().unwrap().nbucket() > 4);
        assert!(c.hash_table().unwrap().nchain() >= c.symbol_table().unwrap().len());
        for (name, id) in names.iter().zip(&ids) {
            assert_eq!(c.find_symbol(name).unwrap(), Some(*id));
        }
    }

    #[test]
    fn test_define_symbol_patches_relocations() {
        let (mut c, id) = object_with_symbol("target");
        let name = c.shstrtab_mut().unwrap().intern("text").unwrap();
        let text = c.add_section(
            SectionHeader::new(name, SHT_PROGDAT, 0, 0, 0, 0, 0),
            Section::Raw(vec![0xaaaa; 6]),
        );
        let name = c.shstrtab_mut().unwrap().intern("@reltext").unwrap();
        let reltab = c.add_section(
            SectionHeader::new(name, SHT_RELTAB, 0, text as u32, 0, 0, 4),
            Section::Relocs(RelocTable::new()),
        );
        c.reference_symbol("target", reltab, 1).unwrap();
        c.reference_symbol("target", reltab, 4).unwrap();

        c.define_symbol(id, 0x0002_0100, text).unwrap();
        let words = c.raw_words(text).unwrap();
        assert_eq!(&words[1..3], &[0x0100, 0x0002]);
        assert_eq!(&words[4..6], &[0x0100, 0x0002]);
        assert_eq!(words[0], 0xaaaa);
        let sym = c.symbol_table().unwrap().get(id).unwrap().clone();
        assert_eq!(sym.value, 0x0002_0100);
        assert_eq!(sym.section, text);
    }

    #[test]
    fn test_define_symbol_rejects_redefinition_and_extern() {
        let (mut c, id) = object_with_symbol("twice");
        c.define_symbol(id, 1, SECT_ABS).unwrap();
        assert!(c.define_symbol(id, 2, SECT_ABS).is_err());

        let off = c.symbol_strtab_mut().unwrap().intern("ext").unwrap();
        let ext = c
            .add_symbol(Symbol::new(off, 0, crate::format::SYM_EXTERN, SECT_UNDEF), true)
            .unwrap();
        assert!(c.define_symbol(ext, 5, SECT_ABS).is_err());
    }

    #[test]
    fn test_reference_creates_undefined_local() {
        let mut c = Container::new_object(FT_OBJECT).unwrap();
        let name = c.shstrtab_mut().unwrap().intern("text").unwrap();
        let text = c.add_section(
            SectionHeader::new(name, SHT_PROGDAT, 0, 0, 0, 0, 0),
            Section::Raw(vec![0; 4]),
        );
        let name = c.shstrtab_mut().unwrap().intern("@reltext").unwrap();
        let reltab = c.add_section(
            SectionHeader::new(name, SHT_RELTAB, 0, text as u32, 0, 0, 4),
            Section::Relocs(RelocTable::new()),
        );
        let id = c.reference_symbol("later", reltab, 0).unwrap();
        let sym = c.symbol_table().unwrap().get(id).unwrap().clone();
        assert!(sym.is_local() && sym.is_undefined());
        // A second reference reuses the same symbol.
        assert_eq!(c.reference_symbol("later", reltab, 2).unwrap(), id);
        assert_eq!(c.reloc_table(reltab).unwrap().len(), 2);
    }

    #[test]
    fn test_bytes_round_trip() {
        let (mut c, id) = object_with_symbol("main");
        let name = c.shstrtab_mut().unwrap().intern("text").unwrap();
        let text = c.add_section(
            SectionHeader::new(name, SHT_PROGDAT, 0x100, 0, 0xef00, 1, 0),
            Section::Raw(vec![1, 2, 3]),
        );
        let name = c.shstrtab_mut().unwrap().intern("bss").unwrap();
        c.add_section(
            SectionHeader::new(name, SHT_NOBITS, 0x200, 0, 0, 1, 0),
            Section::Raw(vec![0; 8]),
        );
        c.define_symbol(id, 0x100, text).unwrap();

        let bytes = c.to_bytes();
        assert_eq!(&bytes[..6], b"SLBF\r\n");
        let back = Container::from_bytes(&bytes).unwrap();
        assert_eq!(back.header.kind, FT_OBJECT);
        assert_eq!(back.section_count(), c.section_count());
        assert_eq!(back.section_name(text).unwrap(), "text");
        assert_eq!(back.raw_words(text).unwrap(), &vec![1, 2, 3]);
        // NOBITS comes back zero-filled at its declared size.
        assert_eq!(back.raw_words(6).unwrap(), &vec![0; 8]);
        assert_eq!(back.section_header(6).unwrap().sh_type, SHT_NOBITS);
        assert_eq!(back.symbol_table().unwrap().len(), 2);
        assert_eq!(back.symbol_name(id).unwrap(), "main");
        // Re-serialization is byte-identical.
        assert_eq!(back.to_bytes(), bytes);
    }

    #[test]
    fn test_lookup_survives_round_trip() {
        let (mut c, id) = object_with_symbol("main");
        let off = c.symbol_strtab_mut().unwrap().intern("helper").unwrap();
        let helper = c
            .add_symbol(Symbol::new(off, 7, SYM_GLOBAL, SECT_ABS), true)
            .unwrap();

        let back = Container::from_bytes(&c.to_bytes()).unwrap();
        assert_eq!(back.find_symbol("main").unwrap(), Some(id));
        assert_eq!(back.find_symbol("helper").unwrap(), Some(helper));
        assert_eq!(back.find_symbol("absent").unwrap(), None);
        // The null symbol stays unregistered.
        assert!(!back.symbol_table().unwrap().is_named(0));
    }

    #[test]
    fn test_header_field_order() {
        let c = Container::new_object(FT_OBJECT).unwrap();
        let words = bytes_to_words(&c.to_bytes()).unwrap();
        assert_eq!(&words[..3], &SLBF_MAGIC_WORDS);
        assert_eq!(words[3], FT_OBJECT);
        assert_eq!(words[4], VERSION_CURRENT);
        assert_eq!(words[9], HDR_WORDS);
        assert_eq!(words[10], SHDR_WORDS);
        assert_eq!(words[11], 5);
        assert_eq!(&words[12..15], &[1, 3, 2]);
        // Section types round-trip through the header table.
        let shoff = read_u32(&words, 7) as usize;
        let types: Vec<u16> = (0..5).map(|i| words[shoff + i * 16 + 2]).collect();
        assert_eq!(types, vec![0, SHT_STRTAB, SHT_HASHTAB, SHT_SYMTAB, SHT_STRTAB]);
    }

    #[test]
    fn test_bad_magic_and_version_rejected() {
        let c = Container::new_object(FT_OBJECT).unwrap();
        let mut bytes = c.to_bytes();
        bytes[0] = b'X';
        assert!(Container::from_bytes(&bytes).is_err());
        let mut bytes = c.to_bytes();
        bytes[9] = 9; // version low byte
        assert!(Container::from_bytes(&bytes).is_err());
    }

    #[test]
    fn test_truncated_file_rejected() {
        let c = Container::new_object(FT_OBJECT).unwrap();
        let bytes = c.to_bytes();
        assert!(Container::from_bytes(&bytes[..bytes.len() - 8]).is_err());
        assert!(Container::from_bytes(&bytes[..10]).is_err());
    }

    #[test]
    fn test_file_round_trip_on_disk() {
        let (c, _) = object_with_symbol("disk");
        let bytes = c.to_bytes();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("t.mo");
        std::fs::File::create(&path).unwrap().write_all(&bytes).unwrap();
        let mut readback = Vec::new();
        std::fs::File::open(&path).unwrap().read_to_end(&mut readback).unwrap();
        let back = Container::from_bytes(&readback).unwrap();
        assert!(back.find_symbol("disk").unwrap().is_some());
    }
}
