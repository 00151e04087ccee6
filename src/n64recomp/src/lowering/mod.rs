// SPDX-License-Identifier: MIT

//! Per-instruction C lowering: given one decoded MIPS III instruction,
//! produce the C statement(s) implementing it against `recomp_context`.
//!
//! Dispatch always switches on `instr.opcode()`'s real [`Opcode`] identity
//! (never on rendered mnemonic text), so pseudo-instruction expansion never
//! needs to be disabled or special-cased here.

mod alu;
mod control;
mod error;
mod fpu;
mod memory;
mod registers;

pub use error::LoweringError;

use rabbitizer::opcodes::Opcode;
use rabbitizer::Instruction;

use crate::addresses::Vram;
use crate::context::Context;

pub use control::label_for;
pub(crate) use control::branch_condition;

/// Lowers one instruction into its C statement(s), appending them to `out`.
///
/// `func_start`/`func_end` are the enclosing function's vram range, needed
/// to tell an in-function `J` (a `goto`) apart from a tail call.
pub fn lower_instruction(
    instr: &Instruction,
    word: u32,
    vram: Vram,
    func_start: Vram,
    func_end: Vram,
    context: &Context,
    out: &mut String,
) -> Result<(), LoweringError> {
    if alu::lower_alu(instr, word, out)? {
        return Ok(());
    }
    if memory::lower_memory(instr, out)? {
        return Ok(());
    }
    if control::lower_control(instr, vram, func_start, func_end, context, out)? {
        return Ok(());
    }
    if fpu::lower_fpu(instr, word, out)? {
        return Ok(());
    }

    Err(LoweringError::UnknownOpcode { mnemonic: format!("{:?}", instr.opcode()), vram })
}

/// Whether lowering `instr` would itself transfer control. A likely-branch
/// with one of these in its delay slot is illegal MIPS and the emitter
/// rejects it with [`LoweringError::NestedBranchInDelaySlot`].
#[must_use]
pub fn is_control_transfer(instr: &Instruction) -> bool {
    let opcode = instr.opcode();
    opcode.is_branch()
        || opcode.is_branch_likely()
        || opcode.is_jump()
        || matches!(opcode, Opcode::core_syscall | Opcode::core_break)
}

#[cfg(test)]
mod tests {
    use rabbitizer::InstructionFlags;

    use crate::context::{Context, FunctionIndex};

    use super::*;

    fn decode(word: u32) -> Instruction {
        let flags = InstructionFlags::new(rabbitizer::IsaVersion::MIPS_III).with_j_as_branch(false);
        Instruction::new(word, Vram::new(0x1000), flags)
    }

    #[test]
    fn dispatch_reaches_every_family() {
        let context = Context::new(Vec::new(), Vec::new(), Vec::new(), FunctionIndex::new());
        let func_start = Vram::new(0x1000);
        let func_end = Vram::new(0x2000);

        // addiu $v0, $zero, 5 -- alu
        let mut out = String::new();
        lower_instruction(&decode(0x2402_0005), 0x2402_0005, Vram::new(0x1000), func_start, func_end, &context, &mut out).unwrap();
        assert!(out.contains("ctx->r2"));

        // lw $v0, 0($v1) -- memory
        let mut out = String::new();
        lower_instruction(&decode(0x8C62_0000), 0x8C62_0000, Vram::new(0x1000), func_start, func_end, &context, &mut out).unwrap();
        assert!(out.contains("MEM_W"));

        // jr $ra -- control
        let mut out = String::new();
        lower_instruction(&decode(0x03E0_0008), 0x03E0_0008, Vram::new(0x1000), func_start, func_end, &context, &mut out).unwrap();
        assert_eq!(out, "    return;\n");
    }

    #[test]
    fn branches_and_traps_are_control_transfers() {
        assert!(is_control_transfer(&decode(0x1043_0001))); // beq
        assert!(is_control_transfer(&decode(0x0000_000C))); // syscall
        assert!(!is_control_transfer(&decode(0x2402_0005))); // addiu
    }
}
