//! Template configuration errors, raised at startup only

use std::io;
use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum TemplateError {
    /// A field the template cannot render without
    #[error("Template is missing required field `{0}`")]
    MissingField(&'static str),

    /// Fields are present but inconsistent
    #[error("Invalid template: {0}")]
    Invalid(String),

    #[error("Failed to read template file {}: {source}", .path.display())]
    Read { path: PathBuf, source: io::Error },

    #[error("Failed to parse template file {}: {source}", .path.display())]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },
}
