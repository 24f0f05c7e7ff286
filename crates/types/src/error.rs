//! Error types for primitive parsing

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TypesError {
    #[error("Identifier must be 0x-prefixed: {0}")]
    MissingHexPrefix(String),

    #[error("Invalid hex in identifier: {0}")]
    InvalidHex(String),

    #[error("Identifier must be 20 or 32 bytes, got {0}")]
    InvalidLength(usize),
}

pub type Result<T> = std::result::Result<T, TypesError>;
