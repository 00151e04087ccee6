// SPDX-License-Identifier: MIT

//! Turns an ELF's sections and symbol table (handed in as plain
//! [`RawSection`]/[`RawSymbol`] values, ELF-library-agnostic) into a
//! [`Context`]: a flat ROM image plus the admitted function/stub table and
//! its vram lookup index.

mod context_builder;
mod error;
mod function_index;
mod function_record;
mod raw_input;

#[allow(clippy::module_inception)]
mod context;

pub use context::Context;
pub use context_builder::ContextBuilder;
pub use error::ContextBuildError;
pub use function_index::FunctionIndex;
pub use function_record::FunctionRecord;
pub use raw_input::{RawSection, RawSymbol, SymKind};
