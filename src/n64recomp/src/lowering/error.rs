// SPDX-License-Identifier: MIT

use std::fmt;

use crate::addresses::Vram;

#[derive(Debug, Clone)]
#[non_exhaustive]
pub enum LoweringError {
    /// No lowering rule covers this opcode. Carries the disassembled
    /// mnemonic purely for the error message; dispatch itself never
    /// switches on mnemonic text.
    UnknownOpcode { mnemonic: String, vram: Vram },
    /// The instruction occupying a likely-branch's delay slot is itself a
    /// branch or jump. Not legal MIPS; the original tool does not handle
    /// it either.
    NestedBranchInDelaySlot { vram: Vram },
}

impl fmt::Display for LoweringError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnknownOpcode { mnemonic, vram } => {
                write!(f, "no lowering rule for `{mnemonic}` at {vram}")
            }
            Self::NestedBranchInDelaySlot { vram } => {
                write!(f, "branch/jump at {vram} occupies another branch's delay slot")
            }
        }
    }
}

impl std::error::Error for LoweringError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_opcode_names_the_mnemonic() {
        let err = LoweringError::UnknownOpcode { mnemonic: "COP2".to_string(), vram: Vram::new(0x1000) };
        assert!(err.to_string().contains("COP2"));
    }

    #[test]
    fn nested_branch_in_delay_slot_explains_the_violation() {
        let err = LoweringError::NestedBranchInDelaySlot { vram: Vram::new(0x1000) };
        assert!(err.to_string().contains("delay slot"));
    }
}
