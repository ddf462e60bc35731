//! Chat prompt templating
//!
//! Every model family wraps user text in its own role markers before
//! tokenization. Instead of one hardcoded function per model the markers are
//! data: a [`TemplateConfig`] is built once at startup (from a [`Preset`] or a
//! JSON file) and rendering is a pure concatenation over it.

mod error;
mod preset;

pub use error::TemplateError;
pub use preset::Preset;

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

/// Opening and closing markers of one chat role
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RoleMarkers {
    /// Text before the role's content, role name and line breaks included
    pub open: String,
    /// Text after the role's content
    pub close: String,
}

impl RoleMarkers {
    pub fn new(open: impl Into<String>, close: impl Into<String>) -> Self {
        Self {
            open: open.into(),
            close: close.into(),
        }
    }

    fn is_empty(&self) -> bool {
        self.open.is_empty() && self.close.is_empty()
    }
}

/// Block of repeated placeholder tokens reserved for image embeddings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ImageBlock {
    pub start: String,
    pub placeholder: String,
    pub repeat: usize,
    pub end: String,
}

impl ImageBlock {
    fn write_to(&self, out: &mut String) {
        out.push_str(&self.start);
        for _ in 0..self.repeat {
            out.push_str(&self.placeholder);
        }
        out.push_str(&self.end);
    }

    fn rendered_len(&self) -> usize {
        self.start.len() + self.placeholder.len() * self.repeat + self.end.len()
    }
}

/// Data-driven chat template
///
/// Renders as
/// `{prefix}{system.open}{system_prompt}{system.close}{user.open}[image]{text}{user.close}{assistant_open}`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TemplateConfig {
    /// Text emitted once before everything else (e.g. `<|begin_of_text|>`)
    #[serde(default)]
    pub prefix: String,

    #[serde(default)]
    pub system: RoleMarkers,

    /// Fixed system instruction, may be empty
    #[serde(default)]
    pub system_prompt: String,

    pub user: RoleMarkers,

    /// Generation prompt that opens the assistant turn
    pub assistant_open: String,

    /// Only rendered when a request asks for an image prompt
    #[serde(default)]
    pub image: Option<ImageBlock>,
}

impl TemplateConfig {
    /// Load a template from a JSON file and validate it
    pub fn from_file(path: &Path) -> Result<Self, TemplateError> {
        let content = fs::read_to_string(path).map_err(|source| TemplateError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let template: TemplateConfig =
            serde_json::from_str(&content).map_err(|source| TemplateError::Parse {
                path: path.to_path_buf(),
                source,
            })?;

        template.validate()?;
        Ok(template)
    }

    /// Replace the system instruction
    pub fn with_system_prompt(mut self, system_prompt: impl Into<String>) -> Self {
        self.system_prompt = system_prompt.into();
        self
    }

    /// Check the template once, so that rendering never has to fail
    pub fn validate(&self) -> Result<(), TemplateError> {
        if !self.system_prompt.is_empty() && self.system.open.is_empty() {
            return Err(TemplateError::MissingField("system.open"));
        }

        let Some(image) = &self.image else {
            return Ok(());
        };

        if image.placeholder.is_empty() {
            return Err(TemplateError::MissingField("image.placeholder"));
        }
        if image.repeat == 0 {
            return Err(TemplateError::Invalid(
                "image.repeat must be at least 1".to_string(),
            ));
        }

        let fixed = [
            &self.prefix,
            &self.system.open,
            &self.system_prompt,
            &self.system.close,
            &self.user.open,
            &self.user.close,
            &self.assistant_open,
            &image.start,
            &image.end,
        ];
        if fixed.iter().any(|part| part.contains(&image.placeholder)) {
            return Err(TemplateError::Invalid(format!(
                "image placeholder {:?} also appears outside the image block",
                image.placeholder
            )));
        }

        Ok(())
    }

    /// Build the exact string handed to the tokenizer.
    ///
    /// `image_prompt` is ignored when the template has no image block.
    pub fn render(&self, text: &str, image_prompt: bool) -> String {
        let image = self.image.as_ref().filter(|_| image_prompt);

        let mut prompt = String::with_capacity(
            self.fixed_len() + text.len() + image.map_or(0, ImageBlock::rendered_len),
        );

        prompt.push_str(&self.prefix);
        if !self.system.is_empty() || !self.system_prompt.is_empty() {
            prompt.push_str(&self.system.open);
            prompt.push_str(&self.system_prompt);
            prompt.push_str(&self.system.close);
        }
        prompt.push_str(&self.user.open);
        if let Some(image) = image {
            image.write_to(&mut prompt);
        }
        prompt.push_str(text);
        prompt.push_str(&self.user.close);
        prompt.push_str(&self.assistant_open);

        prompt
    }

    /// True when rendering returns the text unchanged
    pub fn is_passthrough(&self) -> bool {
        self.fixed_len() == 0
    }

    fn fixed_len(&self) -> usize {
        self.prefix.len()
            + self.system.open.len()
            + self.system_prompt.len()
            + self.system.close.len()
            + self.user.open.len()
            + self.user.close.len()
            + self.assistant_open.len()
    }
}
