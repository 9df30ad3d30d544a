//! The SLBF binary container format.
//!
//! An SLBF file is a flat sequence of 16-bit words. The file starts with a
//! 16-word header, followed by the section bodies in index order, followed by
//! the section-header table. All multi-word integers are stored with the
//! least-significant word first; each word is big-endian on disk.

pub mod container;
pub mod hashtab;
pub mod reltab;
pub mod section;
pub mod strtab;
pub mod symtab;
pub mod words;

pub use container::{Container, FileHeader};
pub use hashtab::HashTable;
pub use reltab::{RelocTable, Relocation};
pub use section::{Section, SectionHeader};
pub use strtab::StringTable;
pub use symtab::{Symbol, SymbolTable};

// ── File identification ─────────────────────────────────────────────────────

/// Magic bytes at the start of every SLBF file (three words).
pub const SLBF_MAGIC: [u8; 6] = *b"SLBF\r\n";
/// The magic as wire words.
pub const SLBF_MAGIC_WORDS: [u16; 3] = [0x534c, 0x4246, 0x0d0a];
/// The only container version this library reads and writes.
pub const VERSION_CURRENT: u16 = 1;

// ── File kinds ──────────────────────────────────────────────────────────────

pub const FT_INVALID: u16 = 0;
pub const FT_OBJECT: u16 = 1;
pub const FT_EXECUTABLE: u16 = 2;

// ── Section types ───────────────────────────────────────────────────────────

pub const SHT_INVALID: u16 = 0;
pub const SHT_PROGDAT: u16 = 1;
pub const SHT_NOBITS: u16 = 2;
pub const SHT_SYMTAB: u16 = 3;
pub const SHT_STRTAB: u16 = 4;
pub const SHT_RELTAB: u16 = 5;
pub const SHT_HASHTAB: u16 = 6;

// ── Symbol visibility ───────────────────────────────────────────────────────

pub const SYM_LOCAL: u16 = 0;
pub const SYM_GLOBAL: u16 = 1;
pub const SYM_WEAK: u16 = 2;
pub const SYM_EXTERN: u16 = 3;

// ── Reserved section references ─────────────────────────────────────────────

/// Section reference of an undefined symbol.
pub const SECT_UNDEF: u16 = 0;
/// Section reference of an absolute symbol (not tied to any section).
pub const SECT_ABS: u16 = 0xffff;

// ── Fixed record sizes, in words ────────────────────────────────────────────

pub const HDR_WORDS: u16 = 16;
pub const SHDR_WORDS: u16 = 16;
pub const SYM_ENTRY_WORDS: u16 = 8;
pub const REL_ENTRY_WORDS: u16 = 4;
/// One bucket or chain slot of a hash table (a 32-bit symbol index).
pub const HASH_ENTRY_WORDS: u16 = 2;

/// Human-readable name of a file kind, for diagnostics.
pub fn file_kind_name(kind: u16) -> &'static str {
    match kind {
        FT_OBJECT => "object",
        FT_EXECUTABLE => "executable",
        _ => "invalid",
    }
}

/// Human-readable name of a section type, for diagnostics.
pub fn section_type_name(sh_type: u16) -> &'static str {
    match sh_type {
        SHT_PROGDAT => "PROGDAT",
        SHT_NOBITS => "NOBITS",
        SHT_SYMTAB => "SYMTAB",
        SHT_STRTAB => "STRTAB",
        SHT_RELTAB => "RELTAB",
        SHT_HASHTAB => "HASHTAB",
        _ => "INVALID",
    }
}

/// Human-readable name of a symbol visibility, for diagnostics.
pub fn visibility_name(visibility: u16) -> &'static str {
    match visibility {
        SYM_LOCAL => "LOCAL",
        SYM_GLOBAL => "GLOBAL",
        SYM_WEAK => "WEAK",
        SYM_EXTERN => "EXTERN",
        _ => "UNKNOWN",
    }
}
