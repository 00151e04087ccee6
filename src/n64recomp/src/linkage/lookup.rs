// SPDX-License-Identifier: MIT

use std::fmt::Write as _;
use std::path::Path;

use crate::addresses::Vram;
use crate::context::Context;

/// The `{vram, function-pointer}` table plus `get_entrypoint_address()` and
/// `get_rom_name()`, deterministically ordered by ascending vram with
/// symbol-table index as the tiebreak for aliased vrams.
#[must_use]
pub fn emit_lookup_table(context: &Context, entrypoint: Vram, elf_path: &Path) -> String {
    let mut indices: Vec<usize> = context.emittable_indices().collect();
    indices.sort_by_key(|&i| {
        let record = context.function(i).expect("emittable_indices yields valid indices");
        (record.vram().inner(), i)
    });

    let mut out = String::new();
    out.push_str("#include <stddef.h>\n#include \"recomp.h\"\n\n");
    out.push_str("const recomp_lookup_entry_t funcs[] = {\n");

    for index in &indices {
        let record = context.function(*index).expect("emittable_indices yields valid indices");
        let _ = writeln!(out, "    {{ 0x{:08X}u, {} }},", record.vram().inner(), record.name());
    }

    out.push_str("};\n");
    out.push_str("const size_t num_funcs = sizeof(funcs) / sizeof(funcs[0]);\n\n");

    let _ = writeln!(
        out,
        "gpr get_entrypoint_address(void) {{ return (gpr)(int32_t)0x{:08X}u; }}\n",
        entrypoint.inner()
    );

    let _ = writeln!(out, "const char* get_rom_name(void) {{ return \"{}\"; }}", rom_name(elf_path));

    out
}

fn rom_name(elf_path: &Path) -> String {
    elf_path.with_extension("z64").to_string_lossy().into_owned()
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use crate::addresses::{Rom, Vram};
    use crate::context::{FunctionIndex, FunctionRecord};

    use super::*;

    fn context_with(records: Vec<FunctionRecord>) -> Context {
        let mut index = FunctionIndex::new();
        for (i, record) in records.iter().enumerate() {
            index.insert(record.vram(), i);
        }
        Context::new(Vec::new(), Vec::new(), records, index)
    }

    #[test]
    fn entries_are_sorted_by_ascending_vram() {
        let records = vec![
            FunctionRecord::new(Vram::new(0x2000), Rom::new(0), Arc::from([0u32]), "func_high".to_string(), false),
            FunctionRecord::new(Vram::new(0x1000), Rom::new(0), Arc::from([0u32]), "func_low".to_string(), false),
        ];
        let context = context_with(records);

        let lookup = emit_lookup_table(&context, Vram::new(0x1000), Path::new("game.elf"));

        let low_pos = lookup.find("0x00001000u, func_low").unwrap();
        let high_pos = lookup.find("0x00002000u, func_high").unwrap();
        assert!(low_pos < high_pos);
    }

    #[test]
    fn entrypoint_and_rom_name_are_emitted() {
        let records = vec![FunctionRecord::new(Vram::new(0x1000), Rom::new(0), Arc::from([0u32]), "recomp_entrypoint".to_string(), false)];
        let context = context_with(records);

        let lookup = emit_lookup_table(&context, Vram::new(0x1000), Path::new("game.elf"));

        assert!(lookup.contains("return (gpr)(int32_t)0x00001000u;"));
        assert!(lookup.contains("return \"game.z64\";"));
    }
}
