// SPDX-License-Identifier: MIT

//! External policy data handed to the [`crate::context::ContextBuilder`].
//!
//! None of the three tables below are computed by this crate: they are
//! opinions about *which* symbols exist in the guest OS / libc that a
//! caller supplies (see `n64recomp-cli`'s hard-coded tables, themselves a
//! straight port of the original tool's).

use std::collections::{HashMap, HashSet};

/// The three policy inputs to the [`crate::context::ContextBuilder`] bundled
/// together so a single value threads through [`crate::config::RecompConfig`].
#[derive(Debug, Clone, Default)]
pub struct Policy {
    ignored_names: HashSet<String>,
    renamed_names: HashSet<String>,
    unsized_names: HashMap<String, u32>,
}

impl Policy {
    #[must_use]
    pub fn new(
        ignored_names: HashSet<String>,
        renamed_names: HashSet<String>,
        unsized_names: HashMap<String, u32>,
    ) -> Self {
        Self {
            ignored_names,
            renamed_names,
            unsized_names,
        }
    }

    #[must_use]
    pub fn is_ignored(&self, name: &str) -> bool {
        self.ignored_names.contains(name)
    }

    #[must_use]
    pub fn is_renamed(&self, name: &str) -> bool {
        self.renamed_names.contains(name)
    }

    #[must_use]
    pub fn unsized_size_of(&self, name: &str) -> Option<u32> {
        self.unsized_names.get(name).copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_policy_treats_every_name_as_unknown() {
        let policy = Policy::default();
        assert!(!policy.is_ignored("osSendMesg"));
        assert!(!policy.is_renamed("memcpy"));
        assert_eq!(policy.unsized_size_of("sqrtf"), None);
    }

    #[test]
    fn policy_tables_are_looked_up_by_name() {
        let mut ignored = HashSet::new();
        ignored.insert("osSendMesg".to_string());
        let mut renamed = HashSet::new();
        renamed.insert("memcpy".to_string());
        let mut unsized_names = HashMap::new();
        unsized_names.insert("sqrtf".to_string(), 8);

        let policy = Policy::new(ignored, renamed, unsized_names);

        assert!(policy.is_ignored("osSendMesg"));
        assert!(!policy.is_ignored("memcpy"));
        assert!(policy.is_renamed("memcpy"));
        assert_eq!(policy.unsized_size_of("sqrtf"), Some(8));
        assert_eq!(policy.unsized_size_of("bzero"), None);
    }
}
