//! Per-request failures

use thiserror::Error;

use crate::tokenizer::TokenizerError;

/// Why a request ended in the literal `error` body
#[derive(Error, Debug)]
pub enum RouteError {
    /// No handler for this method and target
    #[error("No route for {method} {target}")]
    NotFound { method: String, target: String },

    /// Invalid JSON, non-UTF-8 body or missing field
    #[error("Malformed request: {0}")]
    Malformed(String),

    /// The tokenizer rejected the input
    #[error(transparent)]
    Tokenizer(#[from] TokenizerError),
}

impl From<serde_json::Error> for RouteError {
    fn from(error: serde_json::Error) -> Self {
        RouteError::Malformed(error.to_string())
    }
}

impl RouteError {
    /// Short label used in logs
    pub fn kind(&self) -> &'static str {
        match self {
            RouteError::NotFound { .. } => "not_found",
            RouteError::Malformed(_) => "malformed_request",
            RouteError::Tokenizer(TokenizerError::Tokenization(_)) => "tokenization_error",
            RouteError::Tokenizer(TokenizerError::Decode(_)) => "decode_error",
            RouteError::Tokenizer(_) => "tokenizer_error",
        }
    }
}
