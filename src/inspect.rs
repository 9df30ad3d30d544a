//! Human-readable container dumps.

use crate::format::{
    file_kind_name, section_type_name, visibility_name, Container, SECT_ABS, SECT_UNDEF,
    SHT_RELTAB, VERSION_CURRENT,
};

fn symbol_section_name(container: &Container, section: u16) -> String {
    match section {
        SECT_UNDEF => "*UNDEF*".to_string(),
        SECT_ABS => "*ABS*".to_string(),
        idx => container
            .section_name(idx)
            .unwrap_or_else(|_| format!("#{}", idx)),
    }
}

/// Render the header, section table, symbols, and relocations of a
/// container as a multi-line report.
pub fn dump(container: &Container) -> Result<String, String> {
    let mut out = String::new();
    let hdr = &container.header;

    out.push_str("[HEADER]\n");
    out.push_str(&format!("  kind:     {} ({})\n", file_kind_name(hdr.kind), hdr.kind));
    out.push_str(&format!("  version:  {}\n", VERSION_CURRENT));
    out.push_str(&format!("  entry:    {}\n", hdr.entry));
    out.push_str(&format!("  sections: {} (header table at word {})\n", hdr.shnum, hdr.shoff));
    out.push_str(&format!(
        "  shstrtab: {}  symtab: {}  hashtab: {}\n",
        hdr.shstrtab, hdr.symtab, hdr.hashtab
    ));

    out.push_str("\n[SECTIONS]\n");
    out.push_str("  idx type     addr     size     link  align entsize name\n");
    for idx in 0..container.section_count() {
        let (sh, body) = container.section(idx)?;
        let name = container.section_name(idx)?;
        out.push_str(&format!(
            "  {:<3} {:<8} {:08x} {:08x} {:<5} {:<5} {:<7} {}\n",
            idx,
            section_type_name(sh.sh_type),
            sh.addr,
            body.size_words(),
            sh.link,
            sh.align,
            sh.entry_size,
            name
        ));
    }

    out.push_str("\n[SYMBOLS]\n");
    out.push_str("  idx value    vis     section      name\n");
    let symtab = container.symbol_table()?;
    for id in 0..symtab.len() as u32 {
        let sym = symtab.get(id)?;
        out.push_str(&format!(
            "  {:<3} {:08x} {:<7} {:<12} {}\n",
            id,
            sym.value,
            visibility_name(sym.visibility),
            symbol_section_name(container, sym.section),
            container.symbol_name(id)?
        ));
    }

    for idx in 0..container.section_count() {
        let (sh, body) = container.section(idx)?;
        if sh.sh_type != SHT_RELTAB {
            continue;
        }
        let target = container
            .section_name(sh.link as u16)
            .unwrap_or_else(|_| format!("#{}", sh.link));
        out.push_str(&format!(
            "\n[RELOCATIONS] {} -> {}\n",
            container.section_name(idx)?,
            target
        ));
        if let Some(tab) = body.as_relocs() {
            for reloc in tab.relocs() {
                let name = container.symbol_name(reloc.symbol).unwrap_or_default();
                out.push_str(&format!(
                    "  offset {:08x}  symbol {:<3} {}\n",
                    reloc.offset, reloc.symbol, name
                ));
            }
        }
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::format::{
        RelocTable, Relocation, Section, SectionHeader, Symbol, FT_OBJECT, SHT_PROGDAT,
        SYM_GLOBAL,
    };

    #[test]
    fn test_dump_lists_sections_and_symbols() {
        let mut c = Container::new_object(FT_OBJECT).unwrap();
        let off = c.shstrtab_mut().unwrap().intern("text").unwrap();
        let text = c.add_section(
            SectionHeader::new(off, SHT_PROGDAT, 0x40, 0, 0xef00, 1, 0),
            Section::Raw(vec![0; 4]),
        );
        let off = c.symbol_strtab_mut().unwrap().intern("main").unwrap();
        let id = c.add_symbol(Symbol::new(off, 0x40, SYM_GLOBAL, text), true).unwrap();
        let off = c.shstrtab_mut().unwrap().intern("@reltext").unwrap();
        let rt = c.add_section(
            SectionHeader::new(off, crate::format::SHT_RELTAB, 0, text as u32, 0, 0, 4),
            Section::Relocs(RelocTable::new()),
        );
        c.reloc_table_mut(rt).unwrap().push(Relocation { offset: 2, symbol: id });

        let report = dump(&c).unwrap();
        assert!(report.contains("[HEADER]"));
        assert!(report.contains("object"));
        assert!(report.contains("PROGDAT"));
        assert!(report.contains("text"));
        assert!(report.contains("GLOBAL"));
        assert!(report.contains("main"));
        assert!(report.contains("[RELOCATIONS] @reltext"));
        assert!(report.contains("symbol 1"));
    }
}
