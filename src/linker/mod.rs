//! Multi-object linker.
//!
//! Inputs are merged sequentially into a fresh output container. Each input
//! contributes in two phases: absolute symbols first, then its program
//! sections (with their section-scoped symbols and relocation tables).
//! Cross-file references through EXTERN symbols are staged in a pending map
//! and resolved once every input has been merged; a final patch pass writes
//! every relocated symbol's value into the output section words.

use std::collections::{HashMap, HashSet};

use crate::format::{
    Container, RelocTable, Relocation, Section, SectionHeader, Symbol, FT_EXECUTABLE, FT_OBJECT,
    SECT_ABS, SHT_NOBITS, SHT_PROGDAT, SHT_RELTAB, SYM_GLOBAL, SYM_LOCAL, SYM_WEAK,
};

/// Highest address a placed section may end at.
const ADDR_LIMIT: u64 = 0xffff_ffff;

#[derive(Clone, Copy, PartialEq, Eq)]
pub enum LinkMode {
    /// Produce a relocatable library container.
    Library,
    /// Produce an executable with a resolved entry symbol.
    Executable,
}

/// One input object, tagged with the name used in diagnostics.
pub struct LinkInput {
    pub name: String,
    pub container: Container,
}

/// Patch sites waiting for a named symbol to be defined by a later input:
/// symbol name to (output relocation table, record index) sites.
type PendingExterns = HashMap<String, Vec<(u16, usize)>>;

/// Link `inputs` in order. For [`LinkMode::Executable`] the `entry` symbol
/// must end up defined and GLOBAL; its symbol-table index is recorded in the
/// output header.
pub fn link(mode: LinkMode, entry: &str, inputs: &[LinkInput]) -> Result<Container, String> {
    let kind = match mode {
        LinkMode::Library => FT_OBJECT,
        LinkMode::Executable => FT_EXECUTABLE,
    };
    let mut out = Container::new_object(kind)?;
    let mut pending: PendingExterns = HashMap::new();

    for input in inputs {
        merge_input(&mut out, input, &mut pending)?;
    }

    resolve_pending(&mut out, &pending)?;
    patch_all_relocations(&mut out)?;

    if mode == LinkMode::Executable {
        let id = out
            .find_symbol(entry)?
            .ok_or_else(|| format!("entry symbol '{}' is not defined by any input", entry))?;
        if !out.symbol_table()?.get(id)?.is_global() {
            return Err(format!("entry symbol '{}' is not global", entry));
        }
        out.header.entry = id;
    }
    Ok(out)
}

/// Merge one input container into `out`.
fn merge_input(
    out: &mut Container,
    input: &LinkInput,
    pending: &mut PendingExterns,
) -> Result<(), String> {
    // Old symbol index -> output symbol index, for this input only. Symbols
    // deliberately left out (locals, demoted weaks) get no entry, which
    // silently drops the relocations that reference them.
    let mut remap: HashMap<u32, u32> = HashMap::new();
    // Relocation records already copied by the extern staging step, keyed by
    // (input relocation table, record index).
    let mut consumed: HashSet<(u16, usize)> = HashSet::new();

    merge_absolute_symbols(out, input, &mut remap)?;

    for idx in 0..input.container.section_count() {
        let sh_type = input.container.section_header(idx)?.sh_type;
        if sh_type != SHT_PROGDAT && sh_type != SHT_NOBITS {
            continue;
        }
        merge_program_section(out, input, idx, &mut remap, &mut consumed, pending)?;
    }
    Ok(())
}

/// Phase one: carry over the input's absolute symbols. Locals stay behind,
/// weak symbols that collide with an existing name are demoted and then also
/// dropped, global collisions are an error.
fn merge_absolute_symbols(
    out: &mut Container,
    input: &LinkInput,
    remap: &mut HashMap<u32, u32>,
) -> Result<(), String> {
    let count = input.container.symbol_table()?.len() as u32;
    for old_id in 0..count {
        let sym = input.container.symbol_table()?.get(old_id)?.clone();
        if !sym.is_absolute() {
            continue;
        }
        let name = input.container.symbol_name(old_id)?;
        let visibility = resolve_collision(out, &name, sym.visibility, &input.name)?;
        if visibility == SYM_LOCAL {
            continue;
        }
        let with_name = visibility == SYM_GLOBAL || visibility == SYM_WEAK;
        let name_off = out.symbol_strtab_mut()?.intern(&name)?;
        let new_id =
            out.add_symbol(Symbol::new(name_off, sym.value, visibility, SECT_ABS), with_name)?;
        remap.insert(old_id, new_id);
    }
    Ok(())
}

/// Phase two: place one PROGDAT/NOBITS section, rebase its symbols, and walk
/// its relocation table.
fn merge_program_section(
    out: &mut Container,
    input: &LinkInput,
    idx: u16,
    remap: &mut HashMap<u32, u32>,
    consumed: &mut HashSet<(u16, usize)>,
    pending: &mut PendingExterns,
) -> Result<(), String> {
    let in_hdr = input.container.section_header(idx)?.clone();
    let sect_name = input.container.section_name(idx)?;
    let words = input
        .container
        .raw_words(idx)?
        .clone();

    let (addr, shift) = place_section(out, in_hdr.addr, words.len() as u32, &sect_name, &input.name)?;
    let name_off = out.shstrtab_mut()?.intern(&sect_name)?;
    let mut new_hdr = SectionHeader::new(
        name_off,
        in_hdr.sh_type,
        addr,
        0,
        in_hdr.flags,
        in_hdr.align,
        in_hdr.entry_size,
    );
    new_hdr.size = words.len() as u32;
    let new_idx = out.add_section(new_hdr, Section::Raw(words));

    // Mirror the input's companion relocation table, if any, with an empty
    // one linked to the freshly placed section.
    let in_reltab = find_reloc_table(&input.container, idx)?;
    let out_reltab = match in_reltab {
        Some(rt_idx) => {
            let rt_name = input.container.section_name(rt_idx)?;
            let rt_hdr = input.container.section_header(rt_idx)?.clone();
            let name_off = out.shstrtab_mut()?.intern(&rt_name)?;
            let hdr = SectionHeader::new(
                name_off,
                SHT_RELTAB,
                0,
                new_idx as u32,
                rt_hdr.flags,
                rt_hdr.align,
                rt_hdr.entry_size,
            );
            Some(out.add_section(hdr, Section::Relocs(RelocTable::new())))
        }
        None => None,
    };

    // Symbols scoped to this section move with it; extern symbols hand their
    // relocation records to the pending map.
    let count = input.container.symbol_table()?.len() as u32;
    for old_id in 0..count {
        let sym = input.container.symbol_table()?.get(old_id)?.clone();
        if sym.section == idx {
            let name = input.container.symbol_name(old_id)?;
            let visibility = resolve_collision(out, &name, sym.visibility, &input.name)?;
            let with_name = visibility == SYM_GLOBAL || visibility == SYM_WEAK;
            let name_off = out.symbol_strtab_mut()?.intern(&name)?;
            let new_id = out.add_symbol(
                Symbol::new(name_off, sym.value.wrapping_add(shift), visibility, new_idx),
                with_name,
            )?;
            remap.insert(old_id, new_id);
        } else if sym.is_extern() {
            let (Some(rt_idx), Some(out_rt)) = (in_reltab, out_reltab) else {
                continue;
            };
            let name = input.container.symbol_name(old_id)?;
            let relocs: Vec<(usize, Relocation)> = input
                .container
                .reloc_table(rt_idx)?
                .relocs()
                .iter()
                .enumerate()
                .filter(|(_, r)| r.symbol == old_id)
                .map(|(i, r)| (i, r.clone()))
                .collect();
            for (rec_idx, reloc) in relocs {
                let sites = pending.entry(name.clone()).or_default();
                let out_tab = out.reloc_table_mut(out_rt)?;
                sites.push((out_rt, out_tab.len()));
                out_tab.push(Relocation { offset: reloc.offset, symbol: 0 });
                consumed.insert((rt_idx, rec_idx));
            }
        }
    }

    // Final walk: copy the remaining records whose symbols made it into the
    // output. Records referencing dropped symbols disappear here.
    if let (Some(rt_idx), Some(out_rt)) = (in_reltab, out_reltab) {
        let records: Vec<(usize, Relocation)> = input
            .container
            .reloc_table(rt_idx)?
            .relocs()
            .iter()
            .enumerate()
            .map(|(i, r)| (i, r.clone()))
            .collect();
        for (rec_idx, reloc) in records {
            if consumed.contains(&(rt_idx, rec_idx)) {
                continue;
            }
            if let Some(&new_id) = remap.get(&reloc.symbol) {
                out.reloc_table_mut(out_rt)?
                    .push(Relocation { offset: reloc.offset, symbol: new_id });
            }
        }
    }
    Ok(())
}

/// Apply the collision rules for a symbol about to enter the output. An
/// incoming WEAK loses to whatever is already there and is demoted to
/// LOCAL. An incoming GLOBAL overrides an existing WEAK (which is demoted
/// in place) but collides fatally with another GLOBAL.
fn resolve_collision(
    out: &mut Container,
    name: &str,
    visibility: u16,
    input_name: &str,
) -> Result<u16, String> {
    let existing = match out.find_symbol(name)? {
        Some(id) => id,
        None => return Ok(visibility),
    };
    match visibility {
        SYM_GLOBAL => {
            if out.symbol_table()?.get(existing)?.is_weak() {
                out.demote_symbol(existing)?;
                Ok(SYM_GLOBAL)
            } else {
                Err(format!(
                    "duplicate global symbol '{}' (while merging {})",
                    name, input_name
                ))
            }
        }
        SYM_WEAK => Ok(SYM_LOCAL),
        v => Ok(v),
    }
}

/// Find a placement for a section of `size` words starting at its requested
/// address, bumping it past any already placed section it overlaps. Returns
/// the final address and the total shift applied.
fn place_section(
    out: &Container,
    requested: u32,
    size: u32,
    sect_name: &str,
    input_name: &str,
) -> Result<(u32, u32), String> {
    let size = size as u64;
    let mut addr = requested as u64;
    'scan: loop {
        for idx in 0..out.section_count() {
            let (hdr, body) = out.section(idx)?;
            if hdr.sh_type != SHT_PROGDAT && hdr.sh_type != SHT_NOBITS {
                continue;
            }
            let placed_addr = hdr.addr as u64;
            let placed_size = body.size_words() as u64;
            if addr < placed_addr + placed_size && addr + size > placed_addr {
                addr = placed_addr + placed_size;
                if addr + size > ADDR_LIMIT {
                    return Err(format!(
                        "section '{}' from {} cannot be placed below the 32-bit address limit",
                        sect_name, input_name
                    ));
                }
                continue 'scan;
            }
        }
        break;
    }
    Ok((addr as u32, (addr - requested as u64) as u32))
}

/// Index of the relocation table linked to section `target`, if the input
/// carries one.
fn find_reloc_table(container: &Container, target: u16) -> Result<Option<u16>, String> {
    for idx in 0..container.section_count() {
        let hdr = container.section_header(idx)?;
        if hdr.sh_type == SHT_RELTAB && hdr.link == target as u32 {
            return Ok(Some(idx));
        }
    }
    Ok(None)
}

/// Point every staged extern site at the symbol that ended up defining its
/// name. A name no input defined is an error.
fn resolve_pending(out: &mut Container, pending: &PendingExterns) -> Result<(), String> {
    for (name, sites) in pending {
        let id = out
            .find_symbol(name)?
            .ok_or_else(|| format!("undefined external symbol '{}'", name))?;
        for &(rt_idx, rec_idx) in sites {
            let tab = out.reloc_table_mut(rt_idx)?;
            let records = tab.relocs_mut();
            if rec_idx >= records.len() {
                return Err(format!(
                    "stale relocation site {} in table {} for symbol '{}'",
                    rec_idx, rt_idx, name
                ));
            }
            records[rec_idx].symbol = id;
        }
    }
    Ok(())
}

/// Write every relocated symbol's value into the linked section words.
fn patch_all_relocations(out: &mut Container) -> Result<(), String> {
    let mut patches: Vec<(u16, u32, u32)> = Vec::new();
    for idx in 0..out.section_count() {
        let (hdr, body) = out.section(idx)?;
        if hdr.sh_type != SHT_RELTAB {
            continue;
        }
        let target = hdr.link as u16;
        if let Some(tab) = body.as_relocs() {
            for reloc in tab.relocs() {
                let value = out.symbol_table()?.get(reloc.symbol)?.value;
                patches.push((target, reloc.offset, value));
            }
        }
    }
    for (target, offset, value) in patches {
        out.patch_word_pair(target, offset, value)?;
    }
    Ok(())
}
