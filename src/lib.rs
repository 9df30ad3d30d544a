//! Toolchain library for the SLBF binary container format: a relocatable
//! object/executable container for a CPU addressing 16-bit words, plus a
//! multi-object linker and a flat memory-image exporter.
//!
//! The binaries in `src/bin/` (`slbf_ld`, `slbf_flat`, `slbf_dump`) are thin
//! front ends over these modules.

pub mod format;
pub mod image;
pub mod inspect;
pub mod linker;
