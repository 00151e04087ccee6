// SPDX-License-Identifier: MIT

use std::fmt;

use crate::analysis::AnalysisError;
use crate::lowering::LoweringError;

#[derive(Debug, Clone)]
#[non_exhaustive]
pub enum EmitError {
    Lowering(LoweringError),
    /// Surfaced only if a caller chooses to treat analysis findings as
    /// fatal; [`recompile_function`](super::recompile_function) itself
    /// only logs them.
    Analysis(AnalysisError),
    /// The record at the requested index has no instructions to lower.
    EmptyFunction { name: String },
}

impl fmt::Display for EmitError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Lowering(e) => write!(f, "{e}"),
            Self::Analysis(e) => write!(f, "{e}"),
            Self::EmptyFunction { name } => write!(f, "`{name}` has no instructions to emit"),
        }
    }
}

impl std::error::Error for EmitError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Lowering(e) => Some(e),
            Self::Analysis(e) => Some(e),
            Self::EmptyFunction { .. } => None,
        }
    }
}

impl From<LoweringError> for EmitError {
    fn from(e: LoweringError) -> Self {
        Self::Lowering(e)
    }
}

impl From<AnalysisError> for EmitError {
    fn from(e: AnalysisError) -> Self {
        Self::Analysis(e)
    }
}
