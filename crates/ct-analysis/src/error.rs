//! Analysis-subsystem error type.

use thiserror::Error;

use ct_core::CtError;

/// Errors produced by `ct-analysis`.
///
/// Classification and detection never fail on data; only invalid model
/// parameters are rejected, at construction time.
#[derive(Debug, Error)]
pub enum AnalysisError {
    #[error("invalid model parameters: {0}")]
    Params(#[from] CtError),
}

pub type AnalysisResult<T> = Result<T, AnalysisError>;
