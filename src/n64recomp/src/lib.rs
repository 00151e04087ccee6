// SPDX-License-Identifier: MIT

//! Core of a static recompiler for MIPS III (N64) executables.
//!
//! This crate turns a pre-parsed ELF (sections + symbols, handed in by a
//! caller such as `n64recomp-cli`) into portable C source: one `.c` file per
//! function plus the cross-function linkage artifacts (a forward-declaration
//! header and a vram -> function-pointer lookup table).
//!
//! Instruction decoding itself is delegated to [`rabbitizer`]; this crate is
//! only concerned with what happens *after* a 32-bit word has been decoded:
//! control-flow reconstruction, per-instruction C lowering, and symbol
//! resolution across functions.

pub extern crate rabbitizer;

pub mod addresses;
pub mod analysis;
pub mod config;
pub mod context;
pub mod emit;
pub mod linkage;
pub mod lowering;
pub mod policy;

pub use context::{Context, ContextBuildError, ContextBuilder, FunctionRecord};
pub use emit::{recompile_function, EmitError};
pub use linkage::{emit_header, emit_lookup_table};
