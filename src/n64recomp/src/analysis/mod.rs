// SPDX-License-Identifier: MIT

//! Reconstructs a function's control-flow graph from its decoded
//! instruction stream: where basic blocks start, how each one ends, and
//! which branch targets land outside the function entirely.

mod basic_block;
mod error;
mod function_analyzer;

pub use basic_block::{BasicBlock, Terminator};
pub use error::AnalysisError;
pub use function_analyzer::FunctionAnalyzer;
