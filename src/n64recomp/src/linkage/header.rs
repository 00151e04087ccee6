// SPDX-License-Identifier: MIT

use std::fmt::Write as _;

use crate::context::Context;

/// Forward-declaration header text: one `void NAME(...)` declaration per
/// emitted function, wrapped in a C-linkage guard so the generated sources
/// link cleanly from a C++ driver too.
#[must_use]
pub fn emit_header(context: &Context) -> String {
    let mut out = String::new();

    out.push_str("#include \"recomp.h\"\n\n");
    out.push_str("#ifdef __cplusplus\nextern \"C\" {\n#endif\n\n");

    let mut indices: Vec<usize> = context.emittable_indices().collect();
    indices.sort_by_key(|&i| {
        let record = context.function(i).expect("emittable_indices yields valid indices");
        (record.vram().inner(), i)
    });

    for index in indices {
        let record = context.function(index).expect("emittable_indices yields valid indices");
        let _ = writeln!(out, "void {}(uint8_t* restrict rdram, recomp_context* restrict ctx);", record.name());
    }

    out.push_str("\n#ifdef __cplusplus\n}\n#endif\n");
    out
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
    fn declares_only_emittable_functions() {
        let records = vec![
            FunctionRecord::new(Vram::new(0x1000), Rom::new(0), Arc::from([0u32]), "func_a".to_string(), false),
            FunctionRecord::new(Vram::new(0x1004), Rom::new(4), Arc::from([]), "stub_recomp".to_string(), true),
        ];
        let context = context_with(records);

        let header = emit_header(&context);

        assert!(header.contains("void func_a(uint8_t* restrict rdram, recomp_context* restrict ctx);"));
        assert!(!header.contains("stub_recomp"));
        assert!(header.starts_with("#include \"recomp.h\"\n"));
        assert!(header.contains("extern \"C\""));
    }

    #[test]
    fn declarations_are_sorted_by_ascending_vram() {
        let records = vec![
            FunctionRecord::new(Vram::new(0x2000), Rom::new(0), Arc::from([0u32]), "func_high".to_string(), false),
            FunctionRecord::new(Vram::new(0x1000), Rom::new(0), Arc::from([0u32]), "func_low".to_string(), false),
        ];
        let context = context_with(records);

        let header = emit_header(&context);

        let low_pos = header.find("void func_low(").unwrap();
        let high_pos = header.find("void func_high(").unwrap();
        assert!(low_pos < high_pos, "declarations must appear in ascending-vram order, matching the lookup table");
    }
}
