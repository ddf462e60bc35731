//! Global error handling for tokserve
//!
//! This module provides a centralized error type that can represent errors
//! from all modules in the project. Only startup and listener failures travel
//! this far; per-request failures end at the router.

use std::io;
use thiserror::Error;

use crate::template::TemplateError;
use crate::tokenizer::TokenizerError;

/// Global error type for tokserve operations
#[derive(Error, Debug)]
pub enum ServiceError {
    /// Tokenizer-related errors
    #[error("Tokenizer error: {0}")]
    Tokenizer(#[from] TokenizerError),

    /// Prompt template errors
    #[error("Template error: {0}")]
    Template(#[from] TemplateError),

    /// Socket and file system errors
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// Invalid argument
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),
}

/// Specialized Result type for tokserve operations
pub type Result<T> = std::result::Result<T, ServiceError>;

/// Creates a ServiceError with a formatted message
#[macro_export]
macro_rules! error {
    ($error_type:ident, $($arg:tt)*) => {
        $crate::error::ServiceError::$error_type(format!($($arg)*))
    };
}

/// Returns an error result with a formatted message
#[macro_export]
macro_rules! bail {
    ($error_type:ident, $($arg:tt)*) => {
        return Err($crate::error!($error_type, $($arg)*))
    };
}

/// Ensures a condition is true, otherwise returns an error
#[macro_export]
macro_rules! ensure {
    ($cond:expr, $error_type:ident, $($arg:tt)*) => {
        if !($cond) {
            $crate::bail!($error_type, $($arg)*)
        }
    };
}
