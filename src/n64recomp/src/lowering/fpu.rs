// SPDX-License-Identifier: MIT

//! Coprocessor 1 (FPU). Operand register numbers come straight off the raw
//! word (see [`super::registers`]); the result must match a host IEEE-754
//! unit with round-to-nearest-even, which plain C `float`/`double`
//! arithmetic already gives us on every target this project cares about.

use std::fmt::Write as _;

use rabbitizer::opcodes::Opcode;
use rabbitizer::Instruction;

use super::registers::{fd_field, fmt_field, fpr_double, fpr_double_bits, fpr_single, fpr_single_bits, fs_field, ft_field, gpr_read, gpr_write_target, rt_field};
use super::LoweringError;

const FMT_DOUBLE: u32 = 17;

pub(super) fn lower_fpu(instr: &Instruction, word: u32, out: &mut String) -> Result<bool, LoweringError> {
    let opcode = instr.opcode();
    let fmt = fmt_field(word);
    let ft = ft_field(word);
    let fs = fs_field(word);
    let fd = fd_field(word);

    let operand = |idx: u32| if fmt == FMT_DOUBLE { fpr_double(idx) } else { fpr_single(idx) };
    let dst = operand(fd);
    let src1 = operand(fs);
    let src2 = operand(ft);

    match opcode {
        Opcode::core_add_s | Opcode::core_add_d => binop(out, &dst, &src1, &src2, "+"),
        Opcode::core_sub_s | Opcode::core_sub_d => binop(out, &dst, &src1, &src2, "-"),
        Opcode::core_mul_s | Opcode::core_mul_d => binop(out, &dst, &src1, &src2, "*"),
        Opcode::core_div_s | Opcode::core_div_d => binop(out, &dst, &src1, &src2, "/"),
        Opcode::core_sqrt_s => {
            let _ = writeln!(out, "    {dst} = sqrtf({src1});");
        }
        Opcode::core_sqrt_d => {
            let _ = writeln!(out, "    {dst} = sqrt({src1});");
        }
        Opcode::core_neg_s | Opcode::core_neg_d => {
            let _ = writeln!(out, "    {dst} = -{src1};");
        }
        Opcode::core_abs_s => {
            let _ = writeln!(out, "    {dst} = fabsf({src1});");
        }
        Opcode::core_abs_d => {
            let _ = writeln!(out, "    {dst} = fabs({src1});");
        }
        Opcode::core_mov_s | Opcode::core_mov_d => {
            let _ = writeln!(out, "    {dst} = {src1};");
        }

        Opcode::core_cvt_s_d => {
            let _ = writeln!(out, "    {} = (float)({});", fpr_single(fd), fpr_double(fs));
        }
        Opcode::core_cvt_s_w => {
            let _ = writeln!(out, "    {} = (float)(int32_t){};", fpr_single(fd), fpr_single_bits(fs));
        }
        Opcode::core_cvt_s_l => {
            let _ = writeln!(out, "    {} = (float)(int64_t){};", fpr_single(fd), fpr_double_bits(fs));
        }
        Opcode::core_cvt_d_s => {
            let _ = writeln!(out, "    {} = (double)({});", fpr_double(fd), fpr_single(fs));
        }
        Opcode::core_cvt_d_w => {
            let _ = writeln!(out, "    {} = (double)(int32_t){};", fpr_double(fd), fpr_single_bits(fs));
        }
        Opcode::core_cvt_d_l => {
            let _ = writeln!(out, "    {} = (double)(int64_t){};", fpr_double(fd), fpr_double_bits(fs));
        }
        Opcode::core_cvt_w_s => {
            let _ = writeln!(out, "    {} = (int32_t)lrintf({});", fpr_single_bits(fd), fpr_single(fs));
        }
        Opcode::core_cvt_w_d => {
            let _ = writeln!(out, "    {} = (int32_t)lrint({});", fpr_single_bits(fd), fpr_double(fs));
        }
        Opcode::core_cvt_l_s => {
            let _ = writeln!(out, "    {} = (int64_t)llrintf({});", fpr_double_bits(fd), fpr_single(fs));
        }
        Opcode::core_cvt_l_d => {
            let _ = writeln!(out, "    {} = (int64_t)llrint({});", fpr_double_bits(fd), fpr_double(fs));
        }

        Opcode::core_trunc_w_s => rounding_cvt(out, &fpr_single_bits(fd), &fpr_single(fs), "truncf"),
        Opcode::core_trunc_w_d => rounding_cvt(out, &fpr_single_bits(fd), &fpr_double(fs), "trunc"),
        Opcode::core_ceil_w_s => rounding_cvt(out, &fpr_single_bits(fd), &fpr_single(fs), "ceilf"),
        Opcode::core_ceil_w_d => rounding_cvt(out, &fpr_single_bits(fd), &fpr_double(fs), "ceil"),
        Opcode::core_floor_w_s => rounding_cvt(out, &fpr_single_bits(fd), &fpr_single(fs), "floorf"),
        Opcode::core_floor_w_d => rounding_cvt(out, &fpr_single_bits(fd), &fpr_double(fs), "floor"),
        Opcode::core_round_w_s => rounding_cvt(out, &fpr_single_bits(fd), &fpr_single(fs), "roundf"),
        Opcode::core_round_w_d => rounding_cvt(out, &fpr_single_bits(fd), &fpr_double(fs), "round"),

        Opcode::core_mtc1 => {
            let _ = writeln!(out, "    {} = (uint32_t){};", fpr_single_bits(fs), gpr_read_from_rt(instr, word));
        }
        Opcode::core_mfc1 => {
            if let Some(dst) = gpr_write_target(instr.get_destination_gpr().unwrap_or_else(|| rt_as_gpr(word))) {
                let _ = writeln!(out, "    {dst} = (int64_t)(int32_t){};", fpr_single_bits(fs));
            }
        }
        Opcode::core_dmtc1 => {
            let _ = writeln!(out, "    {} = (uint64_t){};", fpr_double_bits(fs), gpr_read_from_rt(instr, word));
        }
        Opcode::core_dmfc1 => {
            if let Some(dst) = gpr_write_target(instr.get_destination_gpr().unwrap_or_else(|| rt_as_gpr(word))) {
                let _ = writeln!(out, "    {dst} = (int64_t){};", fpr_double_bits(fs));
            }
        }
        Opcode::core_ctc1 => {
            // Only FCR31 (the control/status register) matters at runtime.
            let _ = writeln!(out, "    (void)({});", gpr_read_from_rt(instr, word));
        }
        Opcode::core_cfc1 => {
            if let Some(dst) = gpr_write_target(instr.get_destination_gpr().unwrap_or_else(|| rt_as_gpr(word))) {
                let _ = writeln!(out, "    {dst} = (int64_t)(int32_t)ctx->fcsr;");
            }
        }

        Opcode::core_lwc1 => load_store_fpu(out, instr, "MEM_W", &fpr_single_bits(ft_field(word)), true),
        Opcode::core_swc1 => load_store_fpu(out, instr, "MEM_W_STORE", &fpr_single_bits(ft_field(word)), false),
        Opcode::core_ldc1 => load_store_fpu(out, instr, "MEM_D", &fpr_double_bits(ft_field(word)), true),
        Opcode::core_sdc1 => load_store_fpu(out, instr, "MEM_D_STORE", &fpr_double_bits(ft_field(word)), false),

        _ => return lower_compare(instr, word, fmt, fs, ft, out),
    }

    Ok(true)
}

fn binop(out: &mut String, dst: &str, a: &str, b: &str, op: &str) {
    let _ = writeln!(out, "    {dst} = {a} {op} {b};");
}

fn rounding_cvt(out: &mut String, dst: &str, src: &str, func: &str) {
    let _ = writeln!(out, "    {dst} = (int32_t){func}({src});");
}

fn gpr_read_from_rt(instr: &Instruction, word: u32) -> String {
    instr.field_rt().map(gpr_read).unwrap_or_else(|| gpr_read(rt_as_gpr(word)))
}

fn rt_as_gpr(word: u32) -> rabbitizer::registers::Gpr {
    gpr_from_index(rt_field(word))
}

fn gpr_from_index(index: u32) -> rabbitizer::registers::Gpr {
    use rabbitizer::registers::Gpr;
    const TABLE: [Gpr; 32] = [
        Gpr::zero, Gpr::at, Gpr::v0, Gpr::v1, Gpr::a0, Gpr::a1, Gpr::a2, Gpr::a3, Gpr::t0, Gpr::t1,
        Gpr::t2, Gpr::t3, Gpr::t4, Gpr::t5, Gpr::t6, Gpr::t7, Gpr::s0, Gpr::s1, Gpr::s2, Gpr::s3,
        Gpr::s4, Gpr::s5, Gpr::s6, Gpr::s7, Gpr::t8, Gpr::t9, Gpr::k0, Gpr::k1, Gpr::gp, Gpr::sp,
        Gpr::fp, Gpr::ra,
    ];
    TABLE[index as usize & 0x1f]
}

fn load_store_fpu(out: &mut String, instr: &Instruction, macro_name: &str, fpu_field: &str, is_load: bool) {
    let rs = instr.field_rs().map(gpr_read).unwrap_or_else(|| "0".to_string());
    let imm = instr.get_processed_immediate().unwrap_or(0) as i32;
    let addr = if imm == 0 {
        format!("(uint32_t){rs}")
    } else if imm > 0 {
        format!("(uint32_t){rs} + {imm}")
    } else {
        format!("(uint32_t){rs} - {}", -imm)
    };

    if is_load {
        let _ = writeln!(out, "    {fpu_field} = {macro_name}(rdram, {addr});");
    } else {
        let _ = writeln!(out, "    {macro_name}(rdram, {addr}, {fpu_field});");
    }
}

fn lower_compare(
    instr: &Instruction,
    word: u32,
    fmt: u32,
    fs: u32,
    ft: u32,
    out: &mut String,
) -> Result<bool, LoweringError> {
    let opcode = instr.opcode();
    let a = if fmt == FMT_DOUBLE { fpr_double(fs) } else { fpr_single(fs) };
    let b = if fmt == FMT_DOUBLE { fpr_double(ft) } else { fpr_single(ft) };

    let cond = match opcode {
        Opcode::core_c_eq_s | Opcode::core_c_eq_d => format!("{a} == {b}"),
        Opcode::core_c_lt_s | Opcode::core_c_lt_d => format!("{a} < {b}"),
        Opcode::core_c_le_s | Opcode::core_c_le_d => format!("{a} <= {b}"),
        Opcode::core_c_ngt_s | Opcode::core_c_ngt_d => format!("!({a} > {b})"),
        Opcode::core_c_nge_s | Opcode::core_c_nge_d => format!("!({a} >= {b})"),
        Opcode::core_c_seq_s | Opcode::core_c_seq_d => format!("{a} == {b}"),
        Opcode::core_c_ueq_s | Opcode::core_c_ueq_d => format!("{a} == {b}"),
        Opcode::core_c_olt_s | Opcode::core_c_olt_d => format!("{a} < {b}"),
        Opcode::core_c_ult_s | Opcode::core_c_ult_d => format!("{a} < {b}"),
        Opcode::core_c_ole_s | Opcode::core_c_ole_d => format!("{a} <= {b}"),
        Opcode::core_c_ule_s | Opcode::core_c_ule_d => format!("{a} <= {b}"),
        _ => {
            let _ = word;
            return Ok(false);
        }
    };

    let _ = writeln!(out, "    ctx->cop1c = ({cond}) ? 1 : 0;");
    Ok(true)
}

#[cfg(test)]
mod tests {
    use rabbitizer::{InstructionFlags, IsaVersion};

    use super::*;

    fn decode(word: u32) -> Instruction {
        let flags = InstructionFlags::new(IsaVersion::MIPS_III).with_j_as_branch(false);
        Instruction::new(word, crate::addresses::Vram::new(0x1000), flags)
    }

    #[test]
    fn add_s_uses_single_precision_operands() {
        // add.s $f2, $f4, $f6 (fmt=S=16, fd=2, fs=4, ft=6)
        let word = (0x11 << 26) | (16 << 21) | (6 << 16) | (4 << 11) | (2 << 6) | 0;
        let instr = decode(word);
        let mut out = String::new();
        assert!(lower_fpu(&instr, word, &mut out).unwrap());
        assert_eq!(out, "    ctx->f2.fp32.f = ctx->f4.fp32.f + ctx->f6.fp32.f;\n");
    }

    #[test]
    fn add_d_masks_to_even_register_pair() {
        // add.d $f2, $f5, $f6 (fmt=D=17): fs=5 must be masked down to f4.
        let word = (0x11 << 26) | (17 << 21) | (6 << 16) | (5 << 11) | (2 << 6) | 0;
        let instr = decode(word);
        let mut out = String::new();
        assert!(lower_fpu(&instr, word, &mut out).unwrap());
        assert_eq!(out, "    ctx->f2.fp64.d = ctx->f4.fp64.d + ctx->f6.fp64.d;\n");
    }

    #[test]
    fn sqrt_s_calls_host_sqrtf() {
        // sqrt.s $f2, $f4 (fmt=S=16, fs=4, fd=2, funct=4)
        let word = (0x11 << 26) | (16 << 21) | (4 << 11) | (2 << 6) | 4;
        let instr = decode(word);
        let mut out = String::new();
        assert!(lower_fpu(&instr, word, &mut out).unwrap());
        assert_eq!(out, "    ctx->f2.fp32.f = sqrtf(ctx->f4.fp32.f);\n");
    }

    #[test]
    fn c_eq_s_sets_the_condition_flag() {
        // c.eq.s $f4, $f6 (fmt=S=16, fs=4, ft=6, funct=0x32)
        let word = (0x11 << 26) | (16 << 21) | (6 << 16) | (4 << 11) | 0x32;
        let instr = decode(word);
        let mut out = String::new();
        assert!(lower_fpu(&instr, word, &mut out).unwrap());
        assert_eq!(out, "    ctx->cop1c = (ctx->f4.fp32.f == ctx->f6.fp32.f) ? 1 : 0;\n");
    }
}
