// SPDX-License-Identifier: MIT

use std::fmt::Write as _;

use rabbitizer::Instruction;

use crate::addresses::Vram;
use crate::analysis::{BasicBlock, FunctionAnalyzer, Terminator};
use crate::config::RecompConfig;
use crate::context::Context;
use crate::lowering;

use super::EmitError;

/// Emits one function's C source text.
///
/// Failure discards whatever had been written so far: nothing is ever
/// partially written for a function, matching §4.D.
pub fn recompile_function(
    context: &Context,
    config: &RecompConfig,
    function_index: usize,
) -> Result<String, EmitError> {
    let record = context
        .function(function_index)
        .unwrap_or_else(|| panic!("function index {function_index} out of range"));

    if record.words().is_empty() {
        return Err(EmitError::EmptyFunction { name: record.name().to_string() });
    }

    let instrs: Vec<Instruction> = record
        .words()
        .iter()
        .enumerate()
        .map(|(i, &word)| {
            let vram = Vram::new(record.vram().inner() + i as u32 * 4);
            Instruction::new(word, vram, config.instruction_flags())
        })
        .collect();

    let (blocks, analysis_errors) = FunctionAnalyzer::analyze(&instrs, record.vram(), context.function_index());
    for err in &analysis_errors {
        eprintln!("warning: {err}");
    }

    let func_start = record.vram();
    let func_end = record.vram_end();

    let mut body = String::new();
    let branch_targets = branch_target_set(&blocks);

    for block in &blocks {
        emit_block(&mut body, &instrs, record.words(), block, func_start, func_end, context, &branch_targets)?;
    }

    let mut out = String::new();
    let _ = writeln!(out, "void {}(uint8_t* restrict rdram, recomp_context* restrict ctx) {{", record.name());
    let _ = writeln!(out, "    int64_t tmp, tmp2;");
    out.push_str(&body);
    let _ = writeln!(out, "}}");

    Ok(out)
}

fn branch_target_set(blocks: &[BasicBlock]) -> std::collections::BTreeSet<usize> {
    let mut targets = std::collections::BTreeSet::new();
    for block in blocks {
        if let Terminator::BranchConditional { fallthrough, .. } = block.terminator() {
            targets.insert(fallthrough);
        }
    }
    // Every block start after the first is a target of *something* (that's
    // why the analyzer split there); labels are only worth emitting for
    // those, which `blocks` already enumerates via their own start index.
    for block in blocks.iter().skip(1) {
        targets.insert(block.start());
    }
    targets
}

fn emit_block(
    out: &mut String,
    instrs: &[Instruction],
    words: &[u32],
    block: &BasicBlock,
    func_start: Vram,
    func_end: Vram,
    context: &Context,
    branch_targets: &std::collections::BTreeSet<usize>,
) -> Result<(), EmitError> {
    if branch_targets.contains(&block.start()) {
        let label_vram = Vram::new(func_start.inner() + block.start() as u32 * 4);
        let _ = writeln!(out, "{}:", lowering::label_for(label_vram));
    }

    let has_delay_slot = matches!(
        block.terminator(),
        Terminator::BranchConditional { .. }
            | Terminator::BranchUnconditional { .. }
            | Terminator::Jump(_)
            | Terminator::Return
            | Terminator::Call { .. }
            | Terminator::TailCall { .. }
    );

    let (plain_end, control_index) = if has_delay_slot && block.len() >= 2 {
        (block.end() - 2, Some(block.end() - 2))
    } else if matches!(block.terminator(), Terminator::Syscall) {
        (block.end() - 1, Some(block.end() - 1))
    } else {
        (block.end(), None)
    };

    for i in block.start()..plain_end {
        let instr = &instrs[i];
        if lowering::is_control_transfer(instr) {
            return Err(EmitError::Lowering(crate::lowering::LoweringError::NestedBranchInDelaySlot {
                vram: Vram::new(func_start.inner() + i as u32 * 4),
            }));
        }
        lower_one(out, instrs, words, i, func_start, func_end, context)?;
    }

    if let Some(control_index) = control_index {
        if has_delay_slot {
            let delay_index = control_index + 1;
            let delay_instr = &instrs[delay_index];
            if lowering::is_control_transfer(delay_instr) {
                return Err(EmitError::Lowering(crate::lowering::LoweringError::NestedBranchInDelaySlot {
                    vram: Vram::new(func_start.inner() + delay_index as u32 * 4),
                }));
            }

            if let Terminator::BranchConditional { is_likely: true, .. } = block.terminator() {
                // The delay slot of a likely-branch only runs when the
                // branch is taken: guard it with the same condition.
                let control_vram = Vram::new(func_start.inner() + control_index as u32 * 4);
                let cond = lowering::branch_condition(&instrs[control_index], control_vram)?;
                let mut delay_out = String::new();
                lower_one(&mut delay_out, instrs, words, delay_index, func_start, func_end, context)?;
                let _ = writeln!(out, "    if ({cond}) {{");
                out.push_str(&delay_out);
                let _ = writeln!(out, "    }}");
            } else {
                lower_one(out, instrs, words, delay_index, func_start, func_end, context)?;
            }
        }
        lower_one(out, instrs, words, control_index, func_start, func_end, context)?;
    }

    Ok(())
}

fn lower_one(
    out: &mut String,
    instrs: &[Instruction],
    words: &[u32],
    index: usize,
    func_start: Vram,
    func_end: Vram,
    context: &Context,
) -> Result<(), EmitError> {
    let instr = &instrs[index];
    let vram = Vram::new(func_start.inner() + index as u32 * 4);
    let word = words[index];
    lowering::lower_instruction(instr, word, vram, func_start, func_end, context, out)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use crate::addresses::Rom;
    use crate::config::RecompConfigBuilder;
    use crate::context::{FunctionIndex, FunctionRecord};

    use super::*;

    fn context_with(words: &[u32], name: &str) -> Context {
        let record = FunctionRecord::new(Vram::new(0x1000), Rom::new(0), Arc::from(words.to_vec()), name.to_string(), false);
        let mut index = FunctionIndex::new();
        index.insert(record.vram(), 0);
        Context::new(Vec::new(), Vec::new(), vec![record], index)
    }

    #[test]
    fn delay_slot_is_emitted_before_the_return() {
        // jr $ra ; addiu $v0, $zero, 5 (delay slot)
        let words = [0x03E0_0008, 0x2402_0005];
        let context = context_with(&words, "test_func");
        let config = RecompConfigBuilder::new().build();

        let source = recompile_function(&context, &config, 0).unwrap();

        assert!(source.starts_with("void test_func(uint8_t* restrict rdram, recomp_context* restrict ctx) {\n"));
        let delay_pos = source.find("ctx->r2 = (int64_t)(int32_t)((uint32_t)0 + (int32_t)5);").unwrap();
        let return_pos = source.find("return;").unwrap();
        assert!(delay_pos < return_pos, "delay-slot instruction must precede the return it guards");
    }

    #[test]
    fn likely_branch_delay_slot_is_guarded_by_the_branch_condition() {
        // beql $v0, $v1, 1 ; addiu $v0, $v0, 1 (delay slot) ; addiu $v1, $v1, 2 (target)
        let words = [0x5043_0001, 0x2442_0001, 0x2463_0002];
        let context = context_with(&words, "guarded_add");
        let config = RecompConfigBuilder::new().build();

        let source = recompile_function(&context, &config, 0).unwrap();

        let guarded = "    if ((int64_t)ctx->r2 == (int64_t)ctx->r3) {\n    ctx->r2 = (int64_t)(int32_t)((uint32_t)ctx->r2 + (int32_t)1);\n    }\n";
        assert!(
            source.contains(guarded),
            "a branch-likely's delay slot must only run when the branch is taken, got:\n{source}"
        );

        let unguarded = "    ctx->r2 = (int64_t)(int32_t)((uint32_t)ctx->r2 + (int32_t)1);\n    if";
        assert!(!source.contains(unguarded), "the delay slot must not execute unconditionally");
    }

    #[test]
    fn ordinary_branch_delay_slot_stays_unguarded() {
        // beq $v0, $v1, 1 ; addiu $v0, $v0, 1 (delay slot) ; addiu $v1, $v1, 2 (target)
        let words = [0x1043_0001, 0x2442_0001, 0x2463_0002];
        let context = context_with(&words, "plain_branch");
        let config = RecompConfigBuilder::new().build();

        let source = recompile_function(&context, &config, 0).unwrap();

        assert!(!source.contains(" {\n    ctx->r2 = (int64_t)(int32_t)((uint32_t)ctx->r2 + (int32_t)1);\n    }\n"));
        let delay_pos = source.find("ctx->r2 = (int64_t)(int32_t)((uint32_t)ctx->r2 + (int32_t)1);").unwrap();
        let goto_pos = source.find("goto").unwrap();
        assert!(delay_pos < goto_pos, "a non-likely branch's delay slot always runs, unconditionally, before the branch");
    }

    #[test]
    fn empty_function_is_rejected() {
        let context = context_with(&[], "stub");
        let config = RecompConfigBuilder::new().build();

        let err = recompile_function(&context, &config, 0).unwrap_err();
        assert!(matches!(err, EmitError::EmptyFunction { name } if name == "stub"));
    }
}
