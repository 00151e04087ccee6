// SPDX-License-Identifier: MIT

use std::collections::{BTreeMap, BTreeSet};

use rabbitizer::registers::Gpr;
use rabbitizer::Instruction;

use crate::addresses::Vram;
use crate::context::FunctionIndex;

use super::{BasicBlock, Terminator};

/// Splits one function's decoded instructions into basic blocks.
///
/// Only needs the function's own vram range and the whole-binary
/// [`FunctionIndex`] (to classify in-function vs. cross-function control
/// transfers); it never looks at other functions' instruction bodies.
pub struct FunctionAnalyzer;

impl FunctionAnalyzer {
    /// Returns the ordered basic blocks plus any non-fatal findings
    /// (currently just branch targets that resolve to neither an
    /// in-function offset nor a known function vram).
    #[must_use]
    pub fn analyze(
        instrs: &[Instruction],
        vram_start: Vram,
        function_index: &FunctionIndex,
    ) -> (Vec<BasicBlock>, Vec<super::AnalysisError>) {
        assert!(!instrs.is_empty(), "analyze called on an empty instruction window");

        let vram_end = Vram::new(vram_start.inner() + instrs.len() as u32 * 4);

        let mut starts: BTreeSet<usize> = BTreeSet::new();
        starts.insert(0);
        // Keyed by the exclusive end index of the block this terminator closes.
        let mut terminators: BTreeMap<usize, Terminator> = BTreeMap::new();
        let mut errors = Vec::new();

        let index_of = |target: Vram| -> Option<usize> {
            if target >= vram_start && target < vram_end {
                Some(((target.inner() - vram_start.inner()) / 4) as usize)
            } else {
                None
            }
        };

        for (i, instr) in instrs.iter().enumerate() {
            let opcode = instr.opcode();
            let from = Vram::new(vram_start.inner() + i as u32 * 4);

            if opcode.is_branch() || opcode.is_branch_likely() {
                let Some(target) = instr.get_branch_vram_generic() else {
                    continue;
                };
                let end = i + 2;
                starts.insert(end.min(instrs.len()));

                match index_of(target) {
                    Some(target_index) => {
                        starts.insert(target_index);
                    }
                    None if function_index.contains(target) => {}
                    None => errors.push(super::AnalysisError::JumpTargetOutsideAnyFunction { from, target }),
                }

                let terminator = if opcode.is_branch_likely() || !instr.is_unconditional_branch() {
                    Terminator::BranchConditional {
                        target,
                        fallthrough: end.min(instrs.len()),
                        is_likely: opcode.is_branch_likely(),
                    }
                } else {
                    Terminator::BranchUnconditional { target }
                };
                terminators.insert(end.min(instrs.len()), terminator);
                continue;
            }

            if opcode.is_jump() {
                let end = i + 2;
                starts.insert(end.min(instrs.len()));

                if opcode.is_jump_with_address() {
                    let Some(target) = instr.get_instr_index_as_vram() else {
                        continue;
                    };

                    if opcode.does_link() {
                        terminators.insert(end.min(instrs.len()), Terminator::Call { target });
                        if !function_index.contains(target) && index_of(target).is_none() {
                            errors.push(super::AnalysisError::JumpTargetOutsideAnyFunction { from, target });
                        }
                    } else if let Some(target_index) = index_of(target) {
                        starts.insert(target_index);
                        terminators.insert(end.min(instrs.len()), Terminator::BranchUnconditional { target });
                    } else {
                        if !function_index.contains(target) {
                            errors.push(super::AnalysisError::JumpTargetOutsideAnyFunction { from, target });
                        }
                        terminators.insert(end.min(instrs.len()), Terminator::TailCall { target });
                    }
                } else {
                    let terminator = match instr.field_rs() {
                        Some(Gpr::ra) if !opcode.does_link() => Terminator::Return,
                        Some(reg) => Terminator::Jump(reg),
                        None => Terminator::Return,
                    };
                    terminators.insert(end.min(instrs.len()), terminator);
                }
                continue;
            }

            if is_trap_opcode(instr) {
                let end = i + 1;
                starts.insert(end.min(instrs.len()));
                terminators.insert(end.min(instrs.len()), Terminator::Syscall);
            }
        }

        starts.insert(instrs.len());

        let boundaries: Vec<usize> = starts.into_iter().collect();
        let mut blocks = Vec::with_capacity(boundaries.len().saturating_sub(1));

        for (label, window) in boundaries.windows(2).enumerate() {
            let (start, end) = (window[0], window[1]);
            if start >= end {
                continue;
            }
            let terminator = terminators.get(&end).copied().unwrap_or(Terminator::Fallthrough);
            blocks.push(BasicBlock::new(label, start, end - start, terminator));
        }

        (blocks, errors)
    }
}

/// `SYSCALL`/`BREAK` have no delay slot and terminate the block immediately.
fn is_trap_opcode(instr: &Instruction) -> bool {
    use rabbitizer::opcodes::Opcode;
    matches!(instr.opcode(), Opcode::core_syscall | Opcode::core_break)
}
