// SPDX-License-Identifier: MIT

//! Branches, jumps, and the two trapping instructions (`SYSCALL`/`BREAK`).
//!
//! Branch-vs-jump sequencing (emitting the delay slot before the control
//! transfer) is the [`crate::emit`] module's job, since it owns block
//! boundaries; this module only ever produces the text for the one
//! instruction it was asked to lower.

use std::fmt::Write as _;

use rabbitizer::opcodes::Opcode;
use rabbitizer::Instruction;

use crate::addresses::Vram;
use crate::context::Context;

use super::registers::gpr_read;
use super::LoweringError;

pub(crate) fn label_for(vram: Vram) -> String {
    format!("L_{:08X}", vram.inner())
}

/// Lowers a branch/jump/trap instruction. Returns `Ok(None)` when `opcode`
/// isn't in this family so the dispatcher can try the next one.
pub(super) fn lower_control(
    instr: &Instruction,
    vram: Vram,
    func_start: Vram,
    func_end: Vram,
    context: &Context,
    out: &mut String,
) -> Result<bool, LoweringError> {
    let opcode = instr.opcode();

    if opcode.is_branch() || opcode.is_branch_likely() {
        let Some(target) = instr.get_branch_vram_generic() else {
            return Ok(false);
        };
        let cond = branch_condition(instr, vram)?;
        let _ = writeln!(out, "    if ({cond}) goto {};", label_for(target));
        return Ok(true);
    }

    if opcode.is_jump() {
        let return_addr = vram.inner().wrapping_add(8);

        if opcode.is_jump_with_address() {
            let Some(target) = instr.get_instr_index_as_vram() else {
                return Ok(false);
            };

            if opcode.does_link() {
                let _ = writeln!(out, "    ctx->r31 = (int64_t)(int32_t)0x{return_addr:08X}u;");
                match context.resolve_vram(target) {
                    Some(record) => {
                        let _ = writeln!(out, "    {}(rdram, ctx);", record.name());
                    }
                    None => {
                        let _ = writeln!(
                            out,
                            "    LOOKUP_FUNC((int32_t)0x{:08X}u)(rdram, ctx);",
                            target.inner()
                        );
                    }
                }
            } else if target >= func_start && target < func_end {
                let _ = writeln!(out, "    goto {};", label_for(target));
            } else {
                // Tail call: `J` to a vram outside this function.
                match context.resolve_vram(target) {
                    Some(record) => {
                        let _ = writeln!(out, "    {}(rdram, ctx);\n    return;", record.name());
                    }
                    None => {
                        let _ = writeln!(
                            out,
                            "    LOOKUP_FUNC((int32_t)0x{:08X}u)(rdram, ctx);\n    return;",
                            target.inner()
                        );
                    }
                }
            }
            return Ok(true);
        }

        // Register jump: `JR`/`JALR`.
        let rs = instr.field_rs().map(gpr_read).unwrap_or_else(|| "0".to_string());

        if opcode.does_link() {
            if let Some(dst) = instr.get_destination_gpr() {
                let _ = writeln!(
                    out,
                    "    ctx->r{} = (int64_t)(int32_t)0x{return_addr:08X}u;",
                    super::registers::gpr_index(dst)
                );
            }
            let _ = writeln!(out, "    LOOKUP_FUNC((int32_t)({rs}))(rdram, ctx);");
        } else if instr.field_rs() == Some(rabbitizer::registers::Gpr::ra) {
            let _ = writeln!(out, "    return;");
        } else {
            let _ = writeln!(out, "    LOOKUP_FUNC((int32_t)({rs}))(rdram, ctx);\n    return;");
        }
        return Ok(true);
    }

    match opcode {
        Opcode::core_syscall | Opcode::core_break => {
            let _ = writeln!(out, "    recomp_trap();");
            Ok(true)
        }
        Opcode::core_sync | Opcode::core_cache | Opcode::core_nop => {
            let _ = writeln!(out, "    (void)0;");
            Ok(true)
        }
        _ => Ok(false),
    }
}

/// The C boolean expression a branch's `if` is guarded by. Exposed to
/// [`crate::emit`] so a branch-likely's delay slot can be wrapped in the
/// exact same condition instead of re-deriving it.
pub(crate) fn branch_condition(instr: &Instruction, vram: Vram) -> Result<String, LoweringError> {
    let opcode = instr.opcode();
    let rs = instr.field_rs().map(gpr_read);
    let rt = instr.field_rt().map(gpr_read);

    let cond = match opcode {
        Opcode::core_beq | Opcode::core_beql => format!("(int64_t){} == (int64_t){}", rs.unwrap(), rt.unwrap()),
        Opcode::core_bne | Opcode::core_bnel => format!("(int64_t){} != (int64_t){}", rs.unwrap(), rt.unwrap()),
        Opcode::core_blez | Opcode::core_blezl => format!("(int64_t){} <= 0", rs.unwrap()),
        Opcode::core_bgtz | Opcode::core_bgtzl => format!("(int64_t){} > 0", rs.unwrap()),
        Opcode::core_bltz | Opcode::core_bltzl => format!("(int64_t){} < 0", rs.unwrap()),
        Opcode::core_bgez | Opcode::core_bgezl => format!("(int64_t){} >= 0", rs.unwrap()),
        Opcode::core_bltzal | Opcode::core_bltzall => format!("(int64_t){} < 0", rs.unwrap()),
        Opcode::core_bgezal | Opcode::core_bgezall => format!("(int64_t){} >= 0", rs.unwrap()),
        Opcode::core_bc1t | Opcode::core_bc1tl => "ctx->cop1c".to_string(),
        Opcode::core_bc1f | Opcode::core_bc1fl => "!ctx->cop1c".to_string(),
        other => {
            return Err(LoweringError::UnknownOpcode { mnemonic: format!("{other:?}"), vram })
        }
    };
    Ok(cond)
}

#[cfg(test)]
mod tests {
    use rabbitizer::{InstructionFlags, IsaVersion};

    use crate::context::{Context, FunctionIndex};

    use super::*;

    fn decode(word: u32, vram: u32) -> Instruction {
        let flags = InstructionFlags::new(IsaVersion::MIPS_III).with_j_as_branch(false);
        Instruction::new(word, Vram::new(vram), flags)
    }

    fn empty_context() -> Context {
        Context::new(Vec::new(), Vec::new(), Vec::new(), FunctionIndex::new())
    }

    #[test]
    fn label_for_formats_as_hex_vram() {
        assert_eq!(label_for(Vram::new(0x8000_1234)), "L_80001234");
    }

    #[test]
    fn jr_ra_lowers_to_return() {
        let instr = decode(0x03E0_0008, 0x1000);
        let context = empty_context();
        let mut out = String::new();
        assert!(lower_control(&instr, Vram::new(0x1000), Vram::new(0x1000), Vram::new(0x1010), &context, &mut out).unwrap());
        assert_eq!(out, "    return;\n");
    }

    #[test]
    fn jr_other_register_goes_through_lookup_and_returns() {
        // jr $v0
        let word = 0x0040_0008;
        let instr = decode(word, 0x1000);
        let context = empty_context();
        let mut out = String::new();
        assert!(lower_control(&instr, Vram::new(0x1000), Vram::new(0x1000), Vram::new(0x1010), &context, &mut out).unwrap());
        assert_eq!(out, "    LOOKUP_FUNC((int32_t)(ctx->r2))(rdram, ctx);\n    return;\n");
    }

    #[test]
    fn beq_lowers_to_conditional_goto() {
        // beq $v0, $v1, 2
        let word = 0x1043_0002;
        let instr = decode(word, 0x1000);
        let context = empty_context();
        let mut out = String::new();
        assert!(lower_control(&instr, Vram::new(0x1000), Vram::new(0x1000), Vram::new(0x1010), &context, &mut out).unwrap());
        assert_eq!(out, "    if ((int64_t)ctx->r2 == (int64_t)ctx->r3) goto L_0000100C;\n");
    }

    #[test]
    fn syscall_lowers_to_trap() {
        // syscall
        let word = 0x0000_000C;
        let instr = decode(word, 0x1000);
        let context = empty_context();
        let mut out = String::new();
        assert!(lower_control(&instr, Vram::new(0x1000), Vram::new(0x1000), Vram::new(0x1010), &context, &mut out).unwrap());
        assert_eq!(out, "    recomp_trap();\n");
    }
}
