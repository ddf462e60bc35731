/*!
 * Configuration handling for tokserve
 */

use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;
use clap_complete::Shell;

use crate::error::Result;
use crate::router::WireNaming;
use crate::template::{Preset, TemplateConfig};
use crate::tokenizer::{HuggingFaceOptions, SpecialTokenOverrides, TokenId};
use crate::{bail, ensure};

/// Command-line arguments for tokserve
#[derive(Parser, Debug, Clone)]
#[clap(
    name = "tokserve",
    version = env!("CARGO_PKG_VERSION"),
    about = "Serve a pretrained tokenizer over HTTP",
    long_about = "Exposes encode/decode and the bos/eos ids of a pretrained tokenizer over HTTP, wrapping encoded text in a configurable chat prompt template."
)]
pub struct Args {
    /// Host to bind
    #[clap(long, default_value = "localhost")]
    pub host: String,

    /// Port to bind
    #[clap(long, default_value_t = 8080)]
    pub port: u16,

    /// tokenizer.json file, directory containing one, or HuggingFace Hub model id
    /// (defaults to the template's conventional directory)
    #[clap(long)]
    pub tokenizer: Option<String>,

    /// Built-in prompt template; the default `raw` encodes text as-is, without
    /// role markers or a generation prompt
    #[clap(long, value_enum, default_value_t = Preset::default())]
    pub template: Preset,

    /// JSON template file, replaces the built-in template
    #[clap(long)]
    pub template_file: Option<String>,

    /// Replace the template's system prompt
    #[clap(long)]
    pub system_prompt: Option<String>,

    /// Override the bos token id
    #[clap(long)]
    pub bos_id: Option<TokenId>,

    /// Override the bos token string
    #[clap(long)]
    pub bos_token: Option<String>,

    /// Override the eos token id
    #[clap(long)]
    pub eos_id: Option<TokenId>,

    /// Override the eos token string
    #[clap(long)]
    pub eos_token: Option<String>,

    /// Apply the template's suggested eos override (llama3: 128009 / <|eot_id|>)
    #[clap(long)]
    pub pin_preset_eos: bool,

    /// Encode without the tokenizer's post-processor (no automatic bos)
    #[clap(long)]
    pub no_add_special_tokens: bool,

    /// Drop special tokens from decoded text
    #[clap(long)]
    pub skip_special_tokens: bool,

    /// Case convention of JSON field names in responses
    #[clap(long, value_enum, default_value_t = WireNaming::default())]
    pub wire_naming: WireNaming,

    /// Seconds a request may take, body read included
    #[clap(long, default_value_t = 5)]
    pub read_timeout_secs: u64,

    /// Enable debug logging
    #[clap(short, long)]
    pub verbose: bool,

    /// Generate shell completions
    #[clap(long = "generate", value_enum)]
    pub generate: Option<Shell>,
}

/// Application configuration
#[derive(Clone, Debug)]
pub struct Config {
    /// Host to bind
    pub host: String,

    /// Port to bind
    pub port: u16,

    /// Tokenizer artifact (path or Hub id)
    pub tokenizer: String,

    /// Built-in template, used unless a template file is given
    pub preset: Preset,

    /// JSON template file
    pub template_file: Option<PathBuf>,

    /// System prompt replacing the template's
    pub system_prompt: Option<String>,

    /// Special token overrides applied on top of the tokenizer's own
    pub overrides: SpecialTokenOverrides,

    /// Encode/decode flags for the HuggingFace backend
    pub hf_options: HuggingFaceOptions,

    /// Response field naming
    pub wire_naming: WireNaming,

    /// Per-request timeout
    pub read_timeout: Duration,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: "localhost".to_string(),
            port: 8080,
            tokenizer: Preset::default().default_artifact().to_string(),
            preset: Preset::default(),
            template_file: None,
            system_prompt: None,
            overrides: SpecialTokenOverrides::default(),
            hf_options: HuggingFaceOptions::default(),
            wire_naming: WireNaming::default(),
            read_timeout: Duration::from_secs(5),
        }
    }
}

impl Config {
    /// Create configuration from command-line arguments
    pub fn from_args(args: Args) -> Self {
        let explicit = SpecialTokenOverrides {
            bos_id: args.bos_id,
            bos_token: args.bos_token,
            eos_id: args.eos_id,
            eos_token: args.eos_token,
        };
        let overrides = if args.pin_preset_eos {
            explicit.or(args.template.suggested_overrides())
        } else {
            explicit
        };

        Self {
            host: args.host,
            port: args.port,
            tokenizer: args
                .tokenizer
                .unwrap_or_else(|| args.template.default_artifact().to_string()),
            preset: args.template,
            template_file: args.template_file.map(PathBuf::from),
            system_prompt: args.system_prompt,
            overrides,
            hf_options: HuggingFaceOptions {
                add_special_tokens: !args.no_add_special_tokens,
                skip_special_tokens: args.skip_special_tokens,
            },
            wire_naming: args.wire_naming,
            read_timeout: Duration::from_secs(args.read_timeout_secs),
        }
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        ensure!(!self.host.is_empty(), Config, "host must not be empty");
        ensure!(
            !self.tokenizer.is_empty(),
            Config,
            "tokenizer artifact must not be empty"
        );
        ensure!(
            !self.read_timeout.is_zero(),
            InvalidArgument,
            "read timeout must be at least one second"
        );

        // Check if custom template file exists
        if let Some(path) = &self.template_file {
            if !path.is_file() {
                bail!(Config, "Template file not found: {}", path.display());
            }
        }

        Ok(())
    }

    /// Address to bind, as `host:port`
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Human-readable name of the template in use
    pub fn template_name(&self) -> String {
        match &self.template_file {
            Some(path) => path.display().to_string(),
            None => self.preset.to_string(),
        }
    }

    /// Build and validate the prompt template
    pub fn template(&self) -> Result<TemplateConfig> {
        let template = match &self.template_file {
            Some(path) => TemplateConfig::from_file(path)?,
            None => self.preset.template(),
        };

        let template = match &self.system_prompt {
            Some(prompt) => template.with_system_prompt(prompt.clone()),
            None => template,
        };

        template.validate()?;
        Ok(template)
    }
}
