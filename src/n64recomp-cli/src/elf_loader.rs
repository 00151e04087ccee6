// SPDX-License-Identifier: MIT

//! Turns a parsed `object::read::elf::ElfFile32` into the plain
//! `RawSection`/`RawSymbol` shape `n64recomp::ContextBuilder` expects,
//! trimmed to what a statically-linked N64 executable needs: no GOT,
//! dynamic section, or `.reginfo` parsing, since none of that applies to a
//! final, non-relocatable binary (see DESIGN.md).

use std::path::Path;

use object::{elf, Object, ObjectSection, ObjectSymbol, SymbolKind, SymbolSection};

use n64recomp::addresses::Vram;
use n64recomp::config::Endian;
use n64recomp::context::{RawSection, RawSymbol, SymKind};

use crate::cli_error::CliError;
use crate::utils;

pub struct LoadedElf<'data> {
    pub endian: Endian,
    pub sections: Vec<RawSection<'data>>,
    pub symbols: Vec<RawSymbol>,
}

pub fn load<'data>(path: &Path, binary_data: &'data [u8]) -> Result<LoadedElf<'data>, CliError> {
    let file = object::File::parse(binary_data)
        .map_err(|source| CliError::ElfLoadFailed { path: path.to_path_buf(), source })?;

    let elf_file = match file {
        object::File::Elf32(elf_file) => elf_file,
        _ => return Err(CliError::WrongElfClass { path: path.to_path_buf() }),
    };

    if elf_file.endian() != object::Endianness::Big {
        return Err(CliError::WrongEndianness { path: path.to_path_buf() });
    }

    let has_symtab = elf_file
        .sections()
        .any(|section| section.elf_section_header().sh_type.get(elf_file.endian()) == elf::SHT_SYMTAB);
    if !has_symtab {
        return Err(CliError::NoSymbolTable { path: path.to_path_buf() });
    }

    let endian = utils::endian_to_endian(elf_file.endian());

    let mut sections = Vec::new();
    for section in elf_file.sections() {
        let header = section.elf_section_header();
        let sh_type = header.sh_type.get(elf_file.endian());
        let sh_flags = header.sh_flags.get(elf_file.endian());

        let is_bss = sh_type == elf::SHT_NOBITS;
        let allocated = sh_flags & elf::SHF_ALLOC != 0;
        let data = if is_bss { &[][..] } else { section.data().unwrap_or(&[]) };

        sections.push(RawSection { vram: Vram::new(section.address() as u32), allocated, is_bss, data });
    }

    let mut symbols = Vec::new();
    for symbol in elf_file.symbols() {
        let name = symbol.name().unwrap_or("").to_string();
        let value = symbol.address() as u32;
        let size = symbol.size() as u32;
        let kind = match symbol.kind() {
            SymbolKind::Text => SymKind::Function,
            SymbolKind::Unknown => SymKind::NoType,
            SymbolKind::Data => SymKind::Object,
            _ => SymKind::Other,
        };
        let section_index = match symbol.section() {
            SymbolSection::Section(index) => Some(index.0),
            _ => None,
        };

        symbols.push(RawSymbol { name, value, size, kind, section_index });
    }

    Ok(LoadedElf { endian, sections, symbols })
}
