// SPDX-License-Identifier: MIT

//! Register-name text and raw bitfield extraction.
//!
//! FPU operand fields (`fmt`/`ft`/`fs`/`fd`) are pulled directly out of the
//! 32-bit instruction word rather than through a GPR-typed accessor: the
//! decoder's register fields describe integer registers, and reusing them
//! for the FPU register file would silently produce the wrong name for
//! every coprocessor-1 instruction.

use rabbitizer::registers::Gpr;

/// `ctx->rN`, or the literal `"0"` for `$zero` so callers never need a
/// separate is-zero check before formatting a read.
#[must_use]
pub fn gpr_read(reg: Gpr) -> String {
    match gpr_index(reg) {
        0 => "0".to_string(),
        n => format!("ctx->r{n}"),
    }
}

/// `Some("ctx->rN")` for a write target, `None` when the write is to
/// `$zero` and should be dropped entirely.
#[must_use]
pub fn gpr_write_target(reg: Gpr) -> Option<String> {
    match gpr_index(reg) {
        0 => None,
        n => Some(format!("ctx->r{n}")),
    }
}

#[must_use]
pub fn gpr_index(reg: Gpr) -> u32 {
    match reg {
        Gpr::zero => 0,
        Gpr::at => 1,
        Gpr::v0 => 2,
        Gpr::v1 => 3,
        Gpr::a0 => 4,
        Gpr::a1 => 5,
        Gpr::a2 => 6,
        Gpr::a3 => 7,
        Gpr::t0 => 8,
        Gpr::t1 => 9,
        Gpr::t2 => 10,
        Gpr::t3 => 11,
        Gpr::t4 => 12,
        Gpr::t5 => 13,
        Gpr::t6 => 14,
        Gpr::t7 => 15,
        Gpr::s0 => 16,
        Gpr::s1 => 17,
        Gpr::s2 => 18,
        Gpr::s3 => 19,
        Gpr::s4 => 20,
        Gpr::s5 => 21,
        Gpr::s6 => 22,
        Gpr::s7 => 23,
        Gpr::t8 => 24,
        Gpr::t9 => 25,
        Gpr::k0 => 26,
        Gpr::k1 => 27,
        Gpr::gp => 28,
        Gpr::sp => 29,
        Gpr::fp => 30,
        Gpr::ra => 31,
    }
}

/// `ctx->f{n}.fp32.f`-style single-precision operand.
#[must_use]
pub fn fpr_single(index: u32) -> String {
    format!("ctx->f{index}.fp32.f")
}

/// `ctx->f{n}.fp32.u32`-style single-precision bit-pattern operand, used by
/// `MTC1`/`MFC1`.
#[must_use]
pub fn fpr_single_bits(index: u32) -> String {
    format!("ctx->f{index}.fp32.u32")
}

/// Double-precision operand. The VR4300 requires an even register number
/// for `fmt == D`; the odd half of the pair is never addressed directly.
#[must_use]
pub fn fpr_double(index: u32) -> String {
    format!("ctx->f{}.fp64.d", index & !1)
}

#[must_use]
pub fn fpr_double_bits(index: u32) -> String {
    format!("ctx->f{}.fp64.u64", index & !1)
}

#[must_use]
pub fn fmt_field(word: u32) -> u32 {
    (word >> 21) & 0x1f
}

#[must_use]
pub fn ft_field(word: u32) -> u32 {
    (word >> 16) & 0x1f
}

#[must_use]
pub fn fs_field(word: u32) -> u32 {
    (word >> 11) & 0x1f
}

#[must_use]
pub fn fd_field(word: u32) -> u32 {
    (word >> 6) & 0x1f
}

/// Shared bit range with `fd_field`: both occupy bits 10-6.
#[must_use]
pub fn shift_amount(word: u32) -> u32 {
    (word >> 6) & 0x1f
}

/// `rt` field (bits 20-16), read directly off the word for the handful of
/// coprocessor instructions (`MTC1`, `CFC1`, ...) that move to/from a GPR
/// but whose `rt` rabbitizer exposes only as a destination-GPR accessor
/// that isn't guaranteed populated for every COP1 sub-opcode.
#[must_use]
pub fn rt_field(word: u32) -> u32 {
    (word >> 16) & 0x1f
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_register_reads_as_literal_zero() {
        assert_eq!(gpr_read(Gpr::zero), "0");
        assert_eq!(gpr_write_target(Gpr::zero), None);
    }

    #[test]
    fn nonzero_register_reads_and_writes_through_ctx() {
        assert_eq!(gpr_read(Gpr::v0), "ctx->r2");
        assert_eq!(gpr_write_target(Gpr::ra), Some("ctx->r31".to_string()));
    }

    #[test]
    fn double_precision_operand_masks_to_even_register() {
        assert_eq!(fpr_double(5), "ctx->f4.fp64.d");
        assert_eq!(fpr_double_bits(4), "ctx->f4.fp64.u64");
    }

    #[test]
    fn single_precision_operand_keeps_exact_index() {
        assert_eq!(fpr_single(7), "ctx->f7.fp32.f");
        assert_eq!(fpr_single_bits(7), "ctx->f7.fp32.u32");
    }

    #[test]
    fn bitfields_extract_expected_ranges() {
        // fmt=17 (D), ft=2, fs=3, fd=1 packed into a COP1 word layout.
        let word = (17 << 21) | (2 << 16) | (3 << 11) | (1 << 6);
        assert_eq!(fmt_field(word), 17);
        assert_eq!(ft_field(word), 2);
        assert_eq!(fs_field(word), 3);
        assert_eq!(fd_field(word), 1);
        assert_eq!(shift_amount(word), 1);
        assert_eq!(rt_field(word), 2);
    }
}
