//! Framework error type.
//!
//! Sub-crates define their own error enums and wrap `CtError` as one variant
//! where a core failure (bad configuration, unparsable value) can surface.

use thiserror::Error;

/// The top-level error type for `ct-core`.
#[derive(Debug, Error)]
pub enum CtError {
    #[error("configuration error: {0}")]
    Config(String),

    #[error("parse error: {0}")]
    Parse(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Shorthand result type for all `ct-*` crates.
pub type CtResult<T> = Result<T, CtError>;
