// SPDX-License-Identifier: MIT

use std::fmt;

use crate::addresses::Vram;

/// Everything that can go wrong while turning [`super::RawSection`]s and
/// [`super::RawSymbol`]s into a [`super::Context`].
///
/// Mirrors the original tool's handful of `fprintf(stderr, ...); return 1;`
/// sites in `main()`: none of these are recoverable mid-build, so the
/// builder bails out the first time one is hit.
#[derive(Debug)]
#[non_exhaustive]
pub enum ContextBuildError {
    /// The requested entrypoint vram never matched a `STT_FUNC`/`STT_NOTYPE`
    /// symbol in the symbol table.
    MissingEntrypoint { entrypoint: Vram },
    /// A symbol's `st_shndx` pointed past the end of the section table.
    SymbolSectionOutOfRange { symbol_name: String, section_index: usize },
    /// Two admitted functions with different names claim the same vram and
    /// neither can be resolved as an alias (both have bodies).
    ConflictingDefinitions { vram: Vram, first: String, second: String },
}

impl fmt::Display for ContextBuildError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingEntrypoint { entrypoint } => {
                write!(f, "no symbol in the symbol table covers the entrypoint vram {entrypoint}")
            }
            Self::SymbolSectionOutOfRange { symbol_name, section_index } => {
                write!(
                    f,
                    "symbol `{symbol_name}` references section index {section_index}, which does not exist"
                )
            }
            Self::ConflictingDefinitions { vram, first, second } => {
                write!(
                    f,
                    "`{first}` and `{second}` both define a function body at vram {vram}"
                )
            }
        }
    }
}

impl std::error::Error for ContextBuildError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_entrypoint_mentions_the_symbol_table() {
        let err = ContextBuildError::MissingEntrypoint { entrypoint: Vram::new(0x8000_1000) };
        assert!(err.to_string().contains("symbol table"));
    }

    #[test]
    fn conflicting_definitions_names_both_symbols() {
        let err = ContextBuildError::ConflictingDefinitions {
            vram: Vram::new(0x1000),
            first: "foo".to_string(),
            second: "bar".to_string(),
        };
        let message = err.to_string();
        assert!(message.contains("foo"));
        assert!(message.contains("bar"));
    }
}
