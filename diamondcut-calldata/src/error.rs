//! Error types for diamondcut-calldata.
//!
//! Encoding is infallible; every variant here describes calldata that could
//! not have been produced by `encode_diamond_cut`.

use diamondcut_types::Selector;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CalldataError {
    /// Input is shorter than a function selector.
    #[error("calldata truncated: need {needed} more byte(s) for the selector")]
    Truncated { needed: usize },

    /// The leading four bytes are not the diamondCut selector.
    #[error("unexpected function selector {found} (expected {expected})")]
    WrongSelector { found: Selector, expected: Selector },

    /// The argument block does not decode as `(FacetCut[],address,bytes)`.
    #[error("malformed diamondCut arguments: {0}")]
    Abi(String),

    /// The action field is not Add, Replace or Remove.
    #[error("invalid facet cut action {code} in cut #{index}")]
    InvalidAction { index: usize, code: u8 },

    /// Hex text could not be decoded.
    #[error("invalid calldata hex: {0}")]
    Hex(String),
}

pub type CalldataResult<T> = Result<T, CalldataError>;
