// SPDX-License-Identifier: MIT

use std::sync::Arc;

use crate::addresses::{Rom, Size, Vram};
use crate::config::Endian;
use crate::policy::Policy;

use super::{ContextBuildError, FunctionIndex, FunctionRecord, RawSection, RawSymbol, SymKind};

/// Dummy size given to the entrypoint symbol when it has no `st_size`, large
/// enough to cover any real startup routine.
const ENTRYPOINT_DUMMY_SIZE: u32 = 0x50;

/// Builds a [`super::Context`] out of an already-parsed ELF's sections and
/// symbol table plus a caller-supplied [`Policy`].
///
/// This is a one-shot consuming builder: call [`Self::build`] once all
/// sections and the full symbol table have been added.
pub struct ContextBuilder<'elf> {
    entrypoint: Vram,
    endian: Endian,
    policy: Policy,
    sections: Vec<RawSection<'elf>>,
    symbols: Vec<RawSymbol>,
}

impl<'elf> ContextBuilder<'elf> {
    #[must_use]
    pub fn new(entrypoint: Vram, endian: Endian, policy: Policy) -> Self {
        Self {
            entrypoint,
            endian,
            policy,
            sections: Vec::new(),
            symbols: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_sections(mut self, sections: Vec<RawSection<'elf>>) -> Self {
        self.sections = sections;
        self
    }

    #[must_use]
    pub fn with_symbols(mut self, symbols: Vec<RawSymbol>) -> Self {
        self.symbols = symbols;
        self
    }

    pub fn build(self) -> Result<super::Context, ContextBuildError> {
        let Self { entrypoint, endian, policy, sections, symbols } = self;

        // Step 1: walk sections in index order, accumulating a flat ROM
        // image and recording each section's offset into it. Sections that
        // are bss or not allocated contribute no bytes but still need a
        // recorded starting offset (matching an empty slice of data).
        let mut rom: Vec<u8> = Vec::with_capacity(8 * 1024 * 1024);
        let mut section_rom_offsets = Vec::with_capacity(sections.len());

        for section in &sections {
            section_rom_offsets.push(Rom::new(rom.len() as u32));
            if !section.is_bss && section.allocated {
                rom.extend_from_slice(section.data);
            }
        }

        // Step 2: walk the symbol table, recovering entrypoint/unsized sizes,
        // applying the ignored/renamed rewrites, and admitting Function /
        // NoType / Object symbols (plus any ignored symbol regardless of
        // kind, since an ignored function may have lost its STT_FUNC type
        // after being turned into a hand-written stub upstream).
        let mut records = Vec::with_capacity(symbols.len());
        let mut index = FunctionIndex::new();
        let mut found_entrypoint = false;

        for symbol in symbols {
            let RawSymbol { mut name, value, mut size, mut kind, section_index } = symbol;
            let mut ignored = false;

            if size == 0 {
                if value == entrypoint.inner() && kind == SymKind::Function {
                    found_entrypoint = true;
                    size = ENTRYPOINT_DUMMY_SIZE;
                    name = "recomp_entrypoint".to_string();
                } else if let Some(unsized_size) = policy.unsized_size_of(&name) {
                    size = unsized_size;
                    kind = SymKind::Function;
                }
            }

            if policy.is_ignored(&name) {
                name = format!("{name}_recomp");
                ignored = true;
            }

            if !(ignored || matches!(kind, SymKind::Function | SymKind::NoType | SymKind::Object)) {
                continue;
            }

            if policy.is_renamed(&name) {
                name = format!("_{name}");
                ignored = false;
            }

            let vram = Vram::new(value);

            let (rom_offset, words) = match section_index {
                Some(section_index) => {
                    let section = sections.get(section_index).ok_or_else(|| {
                        ContextBuildError::SymbolSectionOutOfRange { symbol_name: name.clone(), section_index }
                    })?;
                    let section_rom_offset = section_rom_offsets[section_index];
                    let section_offset = Size::new(value.wrapping_sub(section.vram.inner()));

                    let num_instructions = if kind == SymKind::Function { size / 4 } else { 0 };
                    let byte_len = (num_instructions as usize) * 4;
                    let start = section_offset.inner() as usize;
                    let words = words_from_bytes(section.data.get(start..start + byte_len).unwrap_or(&[]), endian);

                    (rom_offset_add(section_rom_offset, section_offset), words)
                }
                None => (Rom::new(0), Arc::from(Vec::new())),
            };

            index.insert(vram, records.len());
            records.push(FunctionRecord::new(vram, rom_offset, words, name, ignored));
        }

        if !found_entrypoint {
            return Err(ContextBuildError::MissingEntrypoint { entrypoint });
        }

        Ok(super::Context::new(rom, section_rom_offsets, records, index))
    }
}

fn rom_offset_add(base: Rom, offset: Size) -> Rom {
    Rom::new(base.inner() + offset.inner())
}

fn words_from_bytes(bytes: &[u8], endian: Endian) -> Arc<[u32]> {
    bytes.chunks_exact(4).map(|c| endian.word_from_bytes(c)).collect()
}
