/*!
 * tokserve - Serve a pretrained tokenizer over HTTP
 *
 * Clients send raw text or token ids and get back token ids or decoded
 * text. Encoded text is first wrapped in a configurable chat prompt
 * template, so one server implementation covers every model family.
 */

pub mod config;
pub mod error;
pub mod report;
pub mod router;
pub mod server;
pub mod service;
pub mod template;
pub mod tokenizer;


// Re-export main components for easier access
pub use config::{Args, Config};
pub use error::{Result, ServiceError};
pub use report::StartupReport;
pub use router::{RequestRouter, ResponseBody, RouterResponse, WireNaming};
pub use server::HttpServer;
pub use service::Service;
pub use template::{Preset, TemplateConfig};
pub use tokenizer::{SpecialTokenInfo, SpecialTokenOverrides, TokenId, TokenizerAdapter};

/// Version of the library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
