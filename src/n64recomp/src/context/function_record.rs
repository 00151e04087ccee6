// SPDX-License-Identifier: MIT

use std::sync::Arc;

use crate::addresses::{Rom, Vram};

/// One admitted symbol: a function body, a stub, or a bare name record for
/// an `STT_OBJECT`/`STT_NOTYPE` symbol kept only so its vram is
/// looked-up-able (§9, second Open Question).
///
/// Immutable after [`super::ContextBuilder::build`] returns.
#[derive(Debug, Clone)]
pub struct FunctionRecord {
    vram: Vram,
    rom_offset: Rom,
    words: Arc<[u32]>,
    name: String,
    ignored: bool,
}

impl FunctionRecord {
    pub(crate) fn new(
        vram: Vram,
        rom_offset: Rom,
        words: Arc<[u32]>,
        name: String,
        ignored: bool,
    ) -> Self {
        Self {
            vram,
            rom_offset,
            words,
            name,
            ignored,
        }
    }

    #[must_use]
    pub fn vram(&self) -> Vram {
        self.vram
    }

    #[must_use]
    pub fn rom_offset(&self) -> Rom {
        self.rom_offset
    }

    #[must_use]
    pub fn words(&self) -> &[u32] {
        &self.words
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// A hand-written `<name>_recomp` stub is expected to exist already;
    /// this record carries no body to emit.
    #[must_use]
    pub fn ignored(&self) -> bool {
        self.ignored
    }

    /// `true` for `STT_OBJECT`/stub entries that exist only to make a vram
    /// resolvable, never to be recompiled.
    #[must_use]
    pub fn is_emittable(&self) -> bool {
        !self.ignored && !self.words.is_empty()
    }

    /// One-past-the-last vram this function's instruction window covers.
    #[must_use]
    pub fn vram_end(&self) -> Vram {
        Vram::new(self.vram.inner() + self.words.len() as u32 * 4)
    }

    #[must_use]
    pub fn contains_vram(&self, vram: Vram) -> bool {
        vram >= self.vram && vram < self.vram_end()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record() -> FunctionRecord {
        FunctionRecord::new(Vram::new(0x1000), Rom::new(0x40), Arc::from(vec![0u32, 0u32, 0u32]), "func".to_string(), false)
    }

    #[test]
    fn vram_end_is_one_past_the_last_word() {
        let r = record();
        assert_eq!(r.vram_end(), Vram::new(0x1000 + 3 * 4));
    }

    #[test]
    fn contains_vram_is_half_open() {
        let r = record();
        assert!(r.contains_vram(Vram::new(0x1000)));
        assert!(r.contains_vram(Vram::new(0x1000 + 8)));
        assert!(!r.contains_vram(Vram::new(0x1000 + 12)));
        assert!(!r.contains_vram(Vram::new(0x0FFC)));
    }

    #[test]
    fn ignored_records_are_never_emittable() {
        let r = FunctionRecord::new(Vram::new(0x1000), Rom::new(0), Arc::from(vec![0u32]), "stub_recomp".to_string(), true);
        assert!(!r.is_emittable());
        assert!(r.ignored());
    }

    #[test]
    fn bodyless_records_are_never_emittable() {
        let r = FunctionRecord::new(Vram::new(0x1000), Rom::new(0), Arc::from(Vec::new()), "data_symbol".to_string(), false);
        assert!(!r.is_emittable());
    }

    #[test]
    fn a_real_function_body_is_emittable() {
        assert!(record().is_emittable());
    }
}
