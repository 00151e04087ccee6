// SPDX-License-Identifier: MIT

use std::fmt;
use std::path::PathBuf;

use n64recomp::{ContextBuildError, EmitError};

/// Fatal errors a run of this driver can end with. Wrong-arity/help/version
/// argument parsing is handled separately by `main` through clap's own
/// `Err` path (exit 0, usage line) and never reaches this type.
#[derive(Debug)]
#[non_exhaustive]
pub enum CliError {
    ElfLoadFailed { path: PathBuf, source: object::read::Error },
    WrongElfClass { path: PathBuf },
    WrongEndianness { path: PathBuf },
    NoSymbolTable { path: PathBuf },
    BadEntrypoint { text: String },
    ContextBuild(ContextBuildError),
    Emit { function_name: String, source: EmitError },
    Io { path: PathBuf, source: std::io::Error },
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ElfLoadFailed { path, source } => {
                write!(f, "failed to load elf file {}: {source}", path.display())
            }
            Self::WrongElfClass { path } => write!(f, "{}: incorrect elf class, expected ELFCLASS32", path.display()),
            Self::WrongEndianness { path } => {
                write!(f, "{}: incorrect endianness, expected big-endian", path.display())
            }
            Self::NoSymbolTable { path } => write!(f, "{}: no symbol table section found", path.display()),
            Self::BadEntrypoint { text } => write!(f, "invalid entrypoint value: {text}"),
            Self::ContextBuild(err) => write!(f, "{err}"),
            Self::Emit { function_name, source } => {
                write!(f, "error recompiling {function_name}: {source}")
            }
            Self::Io { path, source } => write!(f, "{}: {source}", path.display()),
        }
    }
}

impl std::error::Error for CliError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::ElfLoadFailed { source, .. } => Some(source),
            Self::ContextBuild(err) => Some(err),
            Self::Emit { source, .. } => Some(source),
            Self::Io { source, .. } => Some(source),
            Self::WrongElfClass { .. }
            | Self::WrongEndianness { .. }
            | Self::NoSymbolTable { .. }
            | Self::BadEntrypoint { .. } => None,
        }
    }
}

impl From<ContextBuildError> for CliError {
    fn from(err: ContextBuildError) -> Self {
        Self::ContextBuild(err)
    }
}

#[cfg(test)]
mod tests {
    use std::error::Error as _;

    use super::*;

    #[test]
    fn bad_entrypoint_names_the_offending_text() {
        let err = CliError::BadEntrypoint { text: "not-a-number".to_string() };
        assert!(err.to_string().contains("not-a-number"));
        assert!(err.source().is_none());
    }

    #[test]
    fn wrong_elf_class_names_the_path() {
        let err = CliError::WrongElfClass { path: PathBuf::from("game.elf") };
        let message = err.to_string();
        assert!(message.contains("game.elf"));
        assert!(message.contains("ELFCLASS32"));
    }

    #[test]
    fn context_build_errors_are_forwarded_with_a_source() {
        let err: CliError = ContextBuildError::MissingEntrypoint { entrypoint: n64recomp::addresses::Vram::new(0x1000) }.into();
        assert!(err.source().is_some());
    }
}
