// SPDX-License-Identifier: MIT

//! Loads and stores. Byte-swapping is explicit in the emitted expression
//! (the host is assumed little-endian, guest memory is always big-endian);
//! the unaligned family (`LWL`/`LWR`/...) delegates its "patched bytes"
//! reconstruction to runtime helper macros declared in the hand-written
//! runtime header, rather than inlining the shuffle here.

use std::fmt::Write as _;

use rabbitizer::opcodes::Opcode;
use rabbitizer::Instruction;

use super::registers::{gpr_read, gpr_write_target};
use super::LoweringError;

fn addr_expr(rs: &str, imm: i32) -> String {
    if imm == 0 {
        format!("(uint32_t){rs}")
    } else if imm > 0 {
        format!("(uint32_t){rs} + {imm}")
    } else {
        format!("(uint32_t){rs} - {}", -imm)
    }
}

pub(super) fn lower_memory(instr: &Instruction, out: &mut String) -> Result<bool, LoweringError> {
    let opcode = instr.opcode();

    let rs = instr.field_rs().map(gpr_read);
    let dst = instr.get_destination_gpr().and_then(gpr_write_target);
    let rt_read = instr.field_rt().map(gpr_read);
    let imm = instr.get_processed_immediate().map(|v| v as i32);

    match opcode {
        Opcode::core_lb => load(out, dst, &addr_expr(&rs.unwrap(), imm.unwrap()), "int8_t", true),
        Opcode::core_lbu => load(out, dst, &addr_expr(&rs.unwrap(), imm.unwrap()), "uint8_t", false),
        Opcode::core_lh => load(out, dst, &addr_expr(&rs.unwrap(), imm.unwrap()), "int16_t", true),
        Opcode::core_lhu => load(out, dst, &addr_expr(&rs.unwrap(), imm.unwrap()), "uint16_t", false),
        Opcode::core_lw => load(out, dst, &addr_expr(&rs.unwrap(), imm.unwrap()), "int32_t", true),
        Opcode::core_lwu => load(out, dst, &addr_expr(&rs.unwrap(), imm.unwrap()), "uint32_t", false),
        Opcode::core_ld => load(out, dst, &addr_expr(&rs.unwrap(), imm.unwrap()), "int64_t", true),

        Opcode::core_sb => store(out, &rt_read.unwrap(), &addr_expr(&rs.unwrap(), imm.unwrap()), "uint8_t"),
        Opcode::core_sh => store(out, &rt_read.unwrap(), &addr_expr(&rs.unwrap(), imm.unwrap()), "uint16_t"),
        Opcode::core_sw => store(out, &rt_read.unwrap(), &addr_expr(&rs.unwrap(), imm.unwrap()), "uint32_t"),
        Opcode::core_sd => store(out, &rt_read.unwrap(), &addr_expr(&rs.unwrap(), imm.unwrap()), "uint64_t"),

        Opcode::core_lwl => unaligned(out, "LWL", &dst_or_rt(&dst, &rt_read), &addr_expr(&rs.unwrap(), imm.unwrap())),
        Opcode::core_lwr => unaligned(out, "LWR", &dst_or_rt(&dst, &rt_read), &addr_expr(&rs.unwrap(), imm.unwrap())),
        Opcode::core_swl => unaligned(out, "SWL", &dst_or_rt(&dst, &rt_read), &addr_expr(&rs.unwrap(), imm.unwrap())),
        Opcode::core_swr => unaligned(out, "SWR", &dst_or_rt(&dst, &rt_read), &addr_expr(&rs.unwrap(), imm.unwrap())),
        Opcode::core_ldl => unaligned(out, "LDL", &dst_or_rt(&dst, &rt_read), &addr_expr(&rs.unwrap(), imm.unwrap())),
        Opcode::core_ldr => unaligned(out, "LDR", &dst_or_rt(&dst, &rt_read), &addr_expr(&rs.unwrap(), imm.unwrap())),
        Opcode::core_sdl => unaligned(out, "SDL", &dst_or_rt(&dst, &rt_read), &addr_expr(&rs.unwrap(), imm.unwrap())),
        Opcode::core_sdr => unaligned(out, "SDR", &dst_or_rt(&dst, &rt_read), &addr_expr(&rs.unwrap(), imm.unwrap())),

        _ => return Ok(false),
    }

    Ok(true)
}

fn dst_or_rt(dst: &Option<String>, rt: &Option<String>) -> String {
    dst.clone().or_else(|| rt.clone()).expect("LWL/SWL-family always names a GPR operand")
}

/// Loads go through `MEM_<WIDTH>(rdram, addr)`, a runtime macro performing
/// the bounds-checked, byte-swapped read. `$zero` destinations still emit
/// the load: `LW $zero, N(rs)` is a legal (if useless) instruction and must
/// not silently skip a faulting access.
fn load(out: &mut String, dst: Option<String>, addr: &str, c_ty: &str, signed: bool) {
    let reader = match c_ty {
        "int8_t" | "uint8_t" => "MEM_B",
        "int16_t" | "uint16_t" => "MEM_H",
        "int32_t" | "uint32_t" => "MEM_W",
        "int64_t" => "MEM_D",
        _ => unreachable!(),
    };
    let ext = if signed { "int64_t" } else { "uint64_t" };
    let value = format!("({ext})({c_ty}){reader}(rdram, {addr})");

    match dst {
        Some(dst) => {
            let _ = writeln!(out, "    {dst} = (int64_t)({value});");
        }
        None => {
            let _ = writeln!(out, "    (void)({value});");
        }
    }
}

fn store(out: &mut String, value: &str, addr: &str, c_ty: &str) {
    let writer = match c_ty {
        "uint8_t" => "MEM_B_STORE",
        "uint16_t" => "MEM_H_STORE",
        "uint32_t" => "MEM_W_STORE",
        "uint64_t" => "MEM_D_STORE",
        _ => unreachable!(),
    };
    let _ = writeln!(out, "    {writer}(rdram, {addr}, ({c_ty}){value});");
}

fn unaligned(out: &mut String, mnemonic: &str, reg: &str, addr: &str) {
    let _ = writeln!(out, "    {mnemonic}(rdram, {addr}, {reg});");
}
