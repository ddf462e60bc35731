//! Error types for the tokenizer module

use std::io;
use thiserror::Error;

/// Result type for tokenizer operations
pub type TokenizerResult<T> = Result<T, TokenizerError>;

/// Errors that can occur while loading or using a tokenizer
#[derive(Error, Debug)]
pub enum TokenizerError {
    /// The tokenizer artifact is missing or corrupt
    #[error("Failed to load tokenizer: {0}")]
    Load(String),

    /// The backend could not encode the input text
    #[error("Tokenization failed: {0}")]
    Tokenization(String),

    /// The backend could not decode the token ids
    #[error("Decode failed: {0}")]
    Decode(String),

    /// IO error
    #[error("IO error: {0}")]
    IoError(#[from] io::Error),
}
