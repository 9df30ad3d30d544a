//! Symbol records and the symbol table section.

use crate::format::words::{push_u32, read_u32};
use crate::format::{
    SECT_ABS, SECT_UNDEF, SYM_ENTRY_WORDS, SYM_EXTERN, SYM_GLOBAL, SYM_LOCAL, SYM_WEAK,
};

/// One 8-word symbol record: name offset into the linked string table, value
/// (an address once defined), visibility, and the section the symbol lives
/// in (or [`SECT_UNDEF`] / [`SECT_ABS`]).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Symbol {
    pub name: u32,
    pub value: u32,
    pub visibility: u16,
    pub section: u16,
}

impl Symbol {
    pub fn new(name: u32, value: u32, visibility: u16, section: u16) -> Symbol {
        Symbol { name, value, visibility, section }
    }

    pub fn is_local(&self) -> bool {
        self.visibility == SYM_LOCAL
    }

    pub fn is_global(&self) -> bool {
        self.visibility == SYM_GLOBAL
    }

    pub fn is_weak(&self) -> bool {
        self.visibility == SYM_WEAK
    }

    pub fn is_extern(&self) -> bool {
        self.visibility == SYM_EXTERN
    }

    pub fn is_undefined(&self) -> bool {
        self.section == SECT_UNDEF
    }

    pub fn is_absolute(&self) -> bool {
        self.section == SECT_ABS
    }

    pub fn serialize_words(&self, out: &mut Vec<u16>) {
        push_u32(out, self.name);
        push_u32(out, self.value);
        out.push(self.visibility);
        out.push(self.section);
        out.push(0);
        out.push(0);
    }

    pub fn deserialize(words: &[u16]) -> Result<Symbol, String> {
        if words.len() != SYM_ENTRY_WORDS as usize {
            return Err(format!("symbol record has {} words, expected 8", words.len()));
        }
        Ok(Symbol {
            name: read_u32(words, 0),
            value: read_u32(words, 2),
            visibility: words[4],
            section: words[5],
        })
    }
}

/// The symbol table section. Alongside the persisted records it tracks which
/// symbols were registered by name in the hash table; that flag drives hash
/// rebuilds and is never serialized.
#[derive(Debug)]
pub struct SymbolTable {
    symbols: Vec<Symbol>,
    named: Vec<bool>,
}

impl SymbolTable {
    pub fn new() -> SymbolTable {
        SymbolTable { symbols: Vec::new(), named: Vec::new() }
    }

    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }

    pub fn symbols(&self) -> &[Symbol] {
        &self.symbols
    }

    pub fn get(&self, id: u32) -> Result<&Symbol, String> {
        self.symbols
            .get(id as usize)
            .ok_or_else(|| format!("symbol index {} is out of range", id))
    }

    pub fn get_mut(&mut self, id: u32) -> Result<&mut Symbol, String> {
        let len = self.symbols.len();
        self.symbols
            .get_mut(id as usize)
            .ok_or_else(|| format!("symbol index {} is out of range ({} symbols)", id, len))
    }

    /// Append a symbol, returning its index.
    pub fn push(&mut self, symbol: Symbol, named: bool) -> u32 {
        self.symbols.push(symbol);
        self.named.push(named);
        (self.symbols.len() - 1) as u32
    }

    pub fn is_named(&self, id: u32) -> bool {
        self.named.get(id as usize).copied().unwrap_or(false)
    }

    pub fn set_named(&mut self, id: u32, named: bool) {
        if let Some(flag) = self.named.get_mut(id as usize) {
            *flag = named;
        }
    }

    pub fn size_words(&self) -> u32 {
        (self.symbols.len() * SYM_ENTRY_WORDS as usize) as u32
    }

    pub fn serialize_words(&self) -> Vec<u16> {
        let mut out = Vec::with_capacity(self.size_words() as usize);
        for sym in &self.symbols {
            sym.serialize_words(&mut out);
        }
        out
    }

    pub fn deserialize(words: &[u16]) -> Result<SymbolTable, String> {
        let entry = SYM_ENTRY_WORDS as usize;
        if words.len() % entry != 0 {
            return Err(format!(
                "symbol table length {} is not a whole number of 8-word records",
                words.len()
            ));
        }
        let mut tab = SymbolTable::new();
        for chunk in words.chunks_exact(entry) {
            tab.push(Symbol::deserialize(chunk)?, false);
        }
        Ok(tab)
    }
}

impl Default for SymbolTable {
    fn default() -> SymbolTable {
        SymbolTable::new()
    }
}
