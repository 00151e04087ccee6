// SPDX-License-Identifier: MIT

mod endian;

pub use endian::Endian;

use rabbitizer::{InstructionFlags, IsaVersion};

use crate::policy::Policy;

/// Cross-cutting knobs shared by every component in the pipeline.
///
/// Built once by the driver and threaded through [`crate::ContextBuilder`],
/// the analyzer, and the lowerer. `endian` is kept as an explicit field
/// rather than assumed, even though this tool only ever targets big-endian
/// N64 images, to mirror how the broader MIPS-tooling ecosystem carries it.
#[derive(Debug, Clone)]
pub struct RecompConfig {
    endian: Endian,
    instruction_flags: InstructionFlags,
    policy: Policy,
}

impl RecompConfig {
    #[must_use]
    pub fn endian(&self) -> Endian {
        self.endian
    }

    #[must_use]
    pub fn instruction_flags(&self) -> InstructionFlags {
        self.instruction_flags
    }

    #[must_use]
    pub fn policy(&self) -> &Policy {
        &self.policy
    }
}

/// Consuming builder for [`RecompConfig`], following the same
/// `with_x(self, ...) -> Self` shape used throughout this codebase's config
/// layer.
#[derive(Debug, Clone)]
pub struct RecompConfigBuilder {
    endian: Endian,
    instruction_flags: InstructionFlags,
    policy: Policy,
}

impl RecompConfigBuilder {
    #[must_use]
    pub fn new() -> Self {
        Self {
            endian: Endian::Big,
            // The source does not check overflow on ADD/ADDI/SUB; J is
            // treated as an unconditional jump, never as a pseudo-branch.
            instruction_flags: InstructionFlags::new(IsaVersion::MIPS_III).with_j_as_branch(false),
            policy: Policy::default(),
        }
    }

    #[must_use]
    pub const fn with_endian(mut self, endian: Endian) -> Self {
        self.endian = endian;
        self
    }

    #[must_use]
    pub fn with_instruction_flags(mut self, instruction_flags: InstructionFlags) -> Self {
        self.instruction_flags = instruction_flags;
        self
    }

    #[must_use]
    pub fn with_policy(mut self, policy: Policy) -> Self {
        self.policy = policy;
        self
    }

    #[must_use]
    pub fn build(self) -> RecompConfig {
        RecompConfig {
            endian: self.endian,
            instruction_flags: self.instruction_flags,
            policy: self.policy,
        }
    }
}

impl Default for RecompConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_big_endian_mips_iii() {
        let config = RecompConfigBuilder::new().build();
        assert_eq!(config.endian(), Endian::Big);
    }

    #[test]
    fn with_endian_overrides_the_default() {
        let config = RecompConfigBuilder::new().with_endian(Endian::Little).build();
        assert_eq!(config.endian(), Endian::Little);
    }

    #[test]
    fn policy_threads_through_unchanged() {
        let policy = Policy::new(Default::default(), Default::default(), Default::default());
        let config = RecompConfigBuilder::new().with_policy(policy.clone()).build();
        assert!(!config.policy().is_ignored("anything"));
    }
}
