//! Flat memory-image export.
//!
//! Renders an executable container as a Logisim "v3.0 hex words addressed"
//! image: one line per PROGDAT section, ordered by ascending load address.

use crate::format::{Container, FT_EXECUTABLE, SHT_PROGDAT};

pub const IMAGE_HEADER: &str = "v3.0 hex words addressed";

/// Render the image, one string per output line (header line included).
pub fn export_flat(container: &Container) -> Result<Vec<String>, String> {
    if container.header.kind != FT_EXECUTABLE {
        return Err("input container is not an executable".to_string());
    }
    let mut rows: Vec<(u32, String)> = Vec::new();
    for idx in 0..container.section_count() {
        let (hdr, body) = container.section(idx)?;
        if hdr.sh_type != SHT_PROGDAT {
            continue;
        }
        let words = body
            .as_raw()
            .ok_or_else(|| format!("PROGDAT section {} does not hold raw words", idx))?;
        let rendered: Vec<String> = words.iter().map(|w| format!("{:04x}", w)).collect();
        rows.push((hdr.addr, format!("{:08x}: {}", hdr.addr, rendered.join(" "))));
    }
    rows.sort_by_key(|&(addr, _)| addr);

    let mut lines = Vec::with_capacity(rows.len() + 1);
    lines.push(IMAGE_HEADER.to_string());
    lines.extend(rows.into_iter().map(|(_, line)| line));
    Ok(lines)
}
