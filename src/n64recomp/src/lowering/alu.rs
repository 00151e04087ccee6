// SPDX-License-Identifier: MIT

//! ALU instruction families: 32-bit integer ops (sign-extended into the
//! 64-bit register file), 64-bit ops, and the `MULT`/`DIV` family with
//! their paired `lo`/`hi` outputs.
//!
//! Trap-on-overflow variants (`ADD`, `ADDI`, `SUB`) are lowered identically
//! to their unsigned counterparts: the original tool never emitted overflow
//! checks, and this keeps that behavior rather than introducing a trap path
//! no existing recompiled game relies on.

use std::fmt::Write as _;

use rabbitizer::opcodes::Opcode;
use rabbitizer::Instruction;

use super::registers::{gpr_read, gpr_write_target, shift_amount};
use super::LoweringError;

/// Writes `dst = (int32_t)(<expr>);` or drops the statement entirely when
/// `dst` is `$zero`.
fn emit_write32(out: &mut String, dst: Option<String>, expr: &str) {
    if let Some(dst) = dst {
        let _ = writeln!(out, "    {dst} = (int64_t)(int32_t)({expr});");
    }
}

fn emit_write64(out: &mut String, dst: Option<String>, expr: &str) {
    if let Some(dst) = dst {
        let _ = writeln!(out, "    {dst} = (int64_t)({expr});");
    }
}

pub(super) fn lower_alu(
    instr: &Instruction,
    word: u32,
    out: &mut String,
) -> Result<bool, LoweringError> {
    let opcode = instr.opcode();

    let rs = instr.field_rs().map(gpr_read);
    let rt = instr.field_rt().map(gpr_read);
    let dst = instr.get_destination_gpr().and_then(gpr_write_target);
    let imm = instr.get_processed_immediate();
    let sa = shift_amount(word);

    match opcode {
        Opcode::core_addu | Opcode::core_add => {
            emit_write32(out, dst, &format!("(uint32_t){} + (uint32_t){}", rs.unwrap(), rt.unwrap()));
        }
        Opcode::core_addiu | Opcode::core_addi => {
            emit_write32(out, dst, &format!("(uint32_t){} + (int32_t){}", rs.unwrap(), imm.unwrap() as i32));
        }
        Opcode::core_subu | Opcode::core_sub => {
            emit_write32(out, dst, &format!("(uint32_t){} - (uint32_t){}", rs.unwrap(), rt.unwrap()));
        }
        Opcode::core_and => {
            emit_write32(out, dst, &format!("(uint32_t){} & (uint32_t){}", rs.unwrap(), rt.unwrap()));
        }
        Opcode::core_andi => {
            emit_write32(out, dst, &format!("(uint32_t){} & (uint32_t){}", rs.unwrap(), imm.unwrap() as u16 as u32));
        }
        Opcode::core_or => {
            emit_write32(out, dst, &format!("(uint32_t){} | (uint32_t){}", rs.unwrap(), rt.unwrap()));
        }
        Opcode::core_ori => {
            emit_write32(out, dst, &format!("(uint32_t){} | (uint32_t){}", rs.unwrap(), imm.unwrap() as u16 as u32));
        }
        Opcode::core_xor => {
            emit_write32(out, dst, &format!("(uint32_t){} ^ (uint32_t){}", rs.unwrap(), rt.unwrap()));
        }
        Opcode::core_xori => {
            emit_write32(out, dst, &format!("(uint32_t){} ^ (uint32_t){}", rs.unwrap(), imm.unwrap() as u16 as u32));
        }
        Opcode::core_nor => {
            emit_write32(out, dst, &format!("~((uint32_t){} | (uint32_t){})", rs.unwrap(), rt.unwrap()));
        }
        Opcode::core_lui => {
            emit_write32(out, dst, &format!("(uint32_t){} << 16", imm.unwrap() as u16 as u32));
        }
        Opcode::core_slt => {
            emit_write32(out, dst, &format!("(int64_t){} < (int64_t){}", rs.unwrap(), rt.unwrap()));
        }
        Opcode::core_slti => {
            emit_write32(out, dst, &format!("(int64_t){} < {}", rs.unwrap(), imm.unwrap() as i32));
        }
        Opcode::core_sltu => {
            emit_write32(out, dst, &format!("(uint64_t){} < (uint64_t){}", rs.unwrap(), rt.unwrap()));
        }
        Opcode::core_sltiu => {
            emit_write32(out, dst, &format!("(uint64_t){} < (uint32_t)(int32_t){}", rs.unwrap(), imm.unwrap() as i32));
        }
        Opcode::core_sll => {
            emit_write32(out, dst, &format!("(uint32_t){} << {sa}", rt.unwrap()));
        }
        Opcode::core_srl => {
            emit_write32(out, dst, &format!("(uint32_t){} >> {sa}", rt.unwrap()));
        }
        Opcode::core_sra => {
            emit_write32(out, dst, &format!("(int32_t){} >> {sa}", rt.unwrap()));
        }
        Opcode::core_sllv => {
            emit_write32(out, dst, &format!("(uint32_t){} << ((uint32_t){} & 0x1F)", rt.unwrap(), rs.unwrap()));
        }
        Opcode::core_srlv => {
            emit_write32(out, dst, &format!("(uint32_t){} >> ((uint32_t){} & 0x1F)", rt.unwrap(), rs.unwrap()));
        }
        Opcode::core_srav => {
            emit_write32(out, dst, &format!("(int32_t){} >> ((uint32_t){} & 0x1F)", rt.unwrap(), rs.unwrap()));
        }

        Opcode::core_daddu | Opcode::core_dadd => {
            emit_write64(out, dst, &format!("(uint64_t){} + (uint64_t){}", rs.unwrap(), rt.unwrap()));
        }
        Opcode::core_daddiu | Opcode::core_daddi => {
            emit_write64(out, dst, &format!("(uint64_t){} + (int64_t){}", rs.unwrap(), imm.unwrap() as i32 as i64));
        }
        Opcode::core_dsubu | Opcode::core_dsub => {
            emit_write64(out, dst, &format!("(uint64_t){} - (uint64_t){}", rs.unwrap(), rt.unwrap()));
        }
        Opcode::core_dsll => {
            emit_write64(out, dst, &format!("(uint64_t){} << {sa}", rt.unwrap()));
        }
        Opcode::core_dsrl => {
            emit_write64(out, dst, &format!("(uint64_t){} >> {sa}", rt.unwrap()));
        }
        Opcode::core_dsra => {
            emit_write64(out, dst, &format!("(int64_t){} >> {sa}", rt.unwrap()));
        }
        Opcode::core_dsll32 => {
            emit_write64(out, dst, &format!("(uint64_t){} << ({sa} + 32)", rt.unwrap()));
        }
        Opcode::core_dsrl32 => {
            emit_write64(out, dst, &format!("(uint64_t){} >> ({sa} + 32)", rt.unwrap()));
        }
        Opcode::core_dsra32 => {
            emit_write64(out, dst, &format!("(int64_t){} >> ({sa} + 32)", rt.unwrap()));
        }

        Opcode::core_mult => emit_mult32(out, &rs.unwrap(), &rt.unwrap(), true),
        Opcode::core_multu => emit_mult32(out, &rs.unwrap(), &rt.unwrap(), false),
        Opcode::core_div => emit_div32(out, &rs.unwrap(), &rt.unwrap(), true),
        Opcode::core_divu => emit_div32(out, &rs.unwrap(), &rt.unwrap(), false),
        Opcode::core_dmult => emit_mult64(out, &rs.unwrap(), &rt.unwrap(), true),
        Opcode::core_dmultu => emit_mult64(out, &rs.unwrap(), &rt.unwrap(), false),
        Opcode::core_ddiv => emit_div64(out, &rs.unwrap(), &rt.unwrap(), true),
        Opcode::core_ddivu => emit_div64(out, &rs.unwrap(), &rt.unwrap(), false),

        Opcode::core_mflo => emit_write64(out, dst, "ctx->lo"),
        Opcode::core_mfhi => emit_write64(out, dst, "ctx->hi"),
        Opcode::core_mtlo => {
            let _ = writeln!(out, "    ctx->lo = (int64_t){};", rs.unwrap());
        }
        Opcode::core_mthi => {
            let _ = writeln!(out, "    ctx->hi = (int64_t){};", rs.unwrap());
        }

        _ => return Ok(false),
    }

    Ok(true)
}

/// `MULT`/`MULTU`: 32x32 -> 64-bit product, `lo`/`hi` hold the sign-extended
/// low/high 32-bit halves.
fn emit_mult32(out: &mut String, rs: &str, rt: &str, signed: bool) {
    let ty = if signed { "int64_t" } else { "uint64_t" };
    let operand_ty = if signed { "int32_t" } else { "uint32_t" };
    let _ = writeln!(
        out,
        "    {{ {ty} prod = ({ty})({operand_ty}){rs} * ({ty})({operand_ty}){rt}; \
ctx->lo = (int64_t)(int32_t)(uint32_t)prod; ctx->hi = (int64_t)(int32_t)(uint32_t)(prod >> 32); }}"
    );
}

/// `DIV`/`DIVU`. Division by zero yields the MIPS-specified undefined
/// pattern rather than trapping.
fn emit_div32(out: &mut String, rs: &str, rt: &str, signed: bool) {
    if signed {
        let _ = writeln!(
            out,
            "    if ((int32_t){rt} == 0) {{ ctx->lo = -1; ctx->hi = (int64_t)(int32_t){rs}; }} \
else {{ ctx->lo = (int64_t)(int32_t)((int32_t){rs} / (int32_t){rt}); ctx->hi = (int64_t)(int32_t)((int32_t){rs} % (int32_t){rt}); }}"
        );
    } else {
        let _ = writeln!(
            out,
            "    if ((uint32_t){rt} == 0) {{ ctx->lo = 0xFFFFFFFF; ctx->hi = (int64_t)(int32_t)(uint32_t){rs}; }} \
else {{ ctx->lo = (int64_t)(int32_t)((uint32_t){rs} / (uint32_t){rt}); ctx->hi = (int64_t)(int32_t)((uint32_t){rs} % (uint32_t){rt}); }}"
        );
    }
}

/// `DMULT`/`DMULTU`: full 64x64 -> 128-bit product via a compiler `__int128`,
/// `lo`/`hi` hold the untruncated 64-bit halves.
fn emit_mult64(out: &mut String, rs: &str, rt: &str, signed: bool) {
    let wide_ty = if signed { "__int128" } else { "unsigned __int128" };
    let ty = if signed { "int64_t" } else { "uint64_t" };
    let _ = writeln!(
        out,
        "    {{ {wide_ty} prod = ({wide_ty})({ty}){rs} * ({wide_ty})({ty}){rt}; \
ctx->lo = (int64_t)(uint64_t)prod; ctx->hi = (int64_t)(uint64_t)(prod >> 64); }}"
    );
}

#[cfg(test)]
mod tests {
    use rabbitizer::{InstructionFlags, IsaVersion};

    use crate::addresses::Vram;

    use super::*;

    fn flags() -> rabbitizer::InstructionFlags {
        InstructionFlags::new(IsaVersion::MIPS_III).with_j_as_branch(false)
    }

    fn decode(word: u32) -> Instruction {
        Instruction::new(word, Vram::new(0x1000), flags())
    }

    #[test]
    fn addiu_writes_sign_extended_sum() {
        // addiu $v0, $zero, 5
        let instr = decode(0x2402_0005);
        let mut out = String::new();
        assert!(lower_alu(&instr, 0x2402_0005, &mut out).unwrap());
        assert_eq!(out, "    ctx->r2 = (int64_t)(int32_t)((uint32_t)0 + (int32_t)5);\n");
    }

    #[test]
    fn addu_reads_and_writes_through_ctx() {
        // addu $v0, $v0, $v1
        let word = 0x0043_1021;
        let instr = decode(word);
        let mut out = String::new();
        assert!(lower_alu(&instr, word, &mut out).unwrap());
        assert_eq!(out, "    ctx->r2 = (int64_t)(int32_t)((uint32_t)ctx->r2 + (uint32_t)ctx->r3);\n");
    }

    #[test]
    fn unrelated_opcode_is_not_handled() {
        // lw $v0, 4($v1) - a memory opcode, not an ALU one.
        let word = 0x8C62_0004;
        let instr = decode(word);
        let mut out = String::new();
        assert!(!lower_alu(&instr, word, &mut out).unwrap());
        assert!(out.is_empty());
    }

    #[test]
    fn divu_guards_division_by_zero() {
        let mut out = String::new();
        emit_div32(&mut out, "ctx->r2", "ctx->r3", false);
        assert!(out.contains("if ((uint32_t)ctx->r3 == 0)"));
        assert!(out.contains("ctx->lo = 0xFFFFFFFF"));
    }

    #[test]
    fn ddiv_guards_division_by_zero() {
        let mut out = String::new();
        emit_div64(&mut out, "ctx->r2", "ctx->r3", true);
        assert!(out.contains("if ((int64_t)ctx->r3 == 0)"));
        assert!(out.contains("ctx->lo = -1"));
    }
}

/// `DDIV`/`DDIVU`.
fn emit_div64(out: &mut String, rs: &str, rt: &str, signed: bool) {
    if signed {
        let _ = writeln!(
            out,
            "    if ((int64_t){rt} == 0) {{ ctx->lo = -1; ctx->hi = (int64_t){rs}; }} \
else {{ ctx->lo = (int64_t){rs} / (int64_t){rt}; ctx->hi = (int64_t){rs} % (int64_t){rt}; }}"
        );
    } else {
        let _ = writeln!(
            out,
            "    if ((uint64_t){rt} == 0) {{ ctx->lo = (int64_t)0xFFFFFFFFFFFFFFFFull; ctx->hi = (int64_t)(uint64_t){rs}; }} \
else {{ ctx->lo = (int64_t)((uint64_t){rs} / (uint64_t){rt}); ctx->hi = (int64_t)((uint64_t){rs} % (uint64_t){rt}); }}"
        );
    }
}
