//! Startup wiring: config in, ready-to-serve components out

use std::sync::Arc;

use tracing::{info, warn};

use crate::config::Config;
use crate::error::Result;
use crate::report::{StartupReport, SAMPLE_TEXT};
use crate::router::RequestRouter;
use crate::server::HttpServer;
use crate::template::TemplateConfig;
use crate::tokenizer::{HuggingFaceBackend, TokenizerAdapter, TokenizerBackend};

/// Tokenizer and template loaded once for the process lifetime
pub struct Service {
    config: Config,
    adapter: Arc<TokenizerAdapter>,
    template: Arc<TemplateConfig>,
}

impl Service {
    /// Validate the config, then load the template and the tokenizer artifact.
    ///
    /// Any error here is fatal for the process.
    pub fn load(config: Config) -> Result<Self> {
        config.validate()?;
        let backend = HuggingFaceBackend::load(&config.tokenizer, config.hf_options)?;
        Self::with_backend(config, Box::new(backend))
    }

    /// Same as [`Service::load`] with an already constructed backend
    pub fn with_backend(config: Config, backend: Box<dyn TokenizerBackend>) -> Result<Self> {
        let template = config.template()?;
        let adapter = TokenizerAdapter::new(backend, &config.overrides);

        if template.is_passthrough() {
            warn!(
                template = %config.template_name(),
                "Template adds no markers, text is encoded as-is (pass --template for a chat format)"
            );
        }

        let special = adapter.special_tokens();
        info!(
            bos_id = ?special.bos_id,
            bos_token = ?special.bos_token,
            eos_id = ?special.eos_id,
            eos_token = ?special.eos_token,
            vocab_size = adapter.vocab_size(),
            "Tokenizer ready"
        );

        Ok(Self {
            config,
            adapter: Arc::new(adapter),
            template: Arc::new(template),
        })
    }

    pub fn adapter(&self) -> &Arc<TokenizerAdapter> {
        &self.adapter
    }

    pub fn template(&self) -> &Arc<TemplateConfig> {
        &self.template
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Router over the shared adapter and template
    pub fn router(&self) -> RequestRouter {
        RequestRouter::new(
            self.adapter.clone(),
            self.template.clone(),
            self.config.wire_naming,
        )
    }

    /// HTTP server for this service
    pub fn http_server(&self) -> HttpServer {
        HttpServer::new(self.router(), self.config.read_timeout)
    }

    /// Summary of what is being served, with a templated sample encoding
    pub fn report(&self) -> StartupReport {
        let sample = match self.adapter.encode(&self.template.render(SAMPLE_TEXT, false)) {
            Ok(ids) => Some(ids),
            Err(e) => {
                warn!("Sample encoding failed: {}", e);
                None
            }
        };

        StartupReport {
            bind_addr: self.config.bind_addr(),
            artifact: self.config.tokenizer.clone(),
            template: if self.template.is_passthrough() {
                format!("{} (no template)", self.config.template_name())
            } else {
                self.config.template_name()
            },
            vocab_size: self.adapter.vocab_size(),
            special: self.adapter.special_tokens().clone(),
            sample,
        }
    }
}
