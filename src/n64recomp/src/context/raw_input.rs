// SPDX-License-Identifier: MIT

//! The shape the [`super::ContextBuilder`] expects its ELF-derived input in.
//!
//! These types intentionally know nothing about `object`/ELFIO/libelf: the
//! caller (`n64recomp-cli`) is responsible for turning whatever ELF crate it
//! uses into these plain structs. This is the seam §1 of the spec calls out
//! as "out of scope" for the core.

use crate::addresses::Vram;

/// One allocated-or-not ELF section, in section-index order.
#[derive(Debug, Clone)]
pub struct RawSection<'elf> {
    pub vram: Vram,
    pub allocated: bool,
    pub is_bss: bool,
    pub data: &'elf [u8],
}

/// Symbol classification as recovered from `st_info`. Anything else
/// (`SECTION`, `FILE`, `TLS`, ...) is represented as [`SymKind::Other`] and
/// is never admitted into the function table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SymKind {
    Function,
    NoType,
    Object,
    Other,
}

/// One `SHT_SYMTAB` entry, in symbol-table-index order. Index order matters:
/// it is the declaration-order tiebreak for aliased vrams (§3, "Function
/// index").
#[derive(Debug, Clone)]
pub struct RawSymbol {
    pub name: String,
    pub value: u32,
    pub size: u32,
    pub kind: SymKind,
    /// `None` for `SHN_UNDEF`/`SHN_ABS`/out-of-range indices.
    pub section_index: Option<usize>,
}
