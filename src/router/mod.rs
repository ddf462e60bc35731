//! Request routing for the tokenizer endpoints
//!
//! [`RequestRouter`] is a table from `(method, path)` to a handler function.
//! It works on plain bytes so the HTTP layer only moves data in and out.
//! Every outcome, failures included, becomes a [`RouterResponse`]: callers
//! always answer with status 200, and only the body tells success from
//! failure.

mod error;
pub mod types;

pub use error::RouteError;
pub use types::{DecodeRequest, EncodeRequest, WireField, WireNaming, ABSENT_ID, ERROR_BODY};

use std::sync::Arc;

use axum::http::Method;
use serde_json::Value;
use tracing::{debug, warn};

use crate::template::TemplateConfig;
use crate::tokenizer::TokenizerAdapter;
use types::wire_id;

/// Shared, read-only state available to every handler
pub struct RouteContext {
    pub adapter: Arc<TokenizerAdapter>,
    pub template: Arc<TemplateConfig>,
    pub naming: WireNaming,
}

/// Handler signature: context and raw body in, JSON payload out
pub type Handler = fn(&RouteContext, &[u8]) -> Result<Value, RouteError>;

struct Route {
    method: Method,
    path: &'static str,
    handler: Handler,
}

/// Body of a routed response
#[derive(Debug, Clone, PartialEq)]
pub enum ResponseBody {
    Json(Value),
    /// The literal `error` text
    Error,
}

impl ResponseBody {
    pub fn is_error(&self) -> bool {
        matches!(self, ResponseBody::Error)
    }

    /// Serialized body text
    pub fn render(&self) -> String {
        match self {
            ResponseBody::Json(value) => value.to_string(),
            ResponseBody::Error => ERROR_BODY.to_string(),
        }
    }
}

/// Result of dispatching one request
#[derive(Debug, Clone, PartialEq)]
pub struct RouterResponse {
    /// Value of the `type` response header: the lowercased request method
    pub kind: String,
    pub body: ResponseBody,
}

/// Maps method and path to the tokenizer operations
pub struct RequestRouter {
    routes: Vec<Route>,
    context: RouteContext,
}

impl RequestRouter {
    /// Router with the four tokenizer endpoints registered
    pub fn new(
        adapter: Arc<TokenizerAdapter>,
        template: Arc<TemplateConfig>,
        naming: WireNaming,
    ) -> Self {
        let mut router = Self {
            routes: Vec::new(),
            context: RouteContext {
                adapter,
                template,
                naming,
            },
        };

        router
            .route(Method::GET, "/bos_id", bos_id)
            .route(Method::GET, "/eos_id", eos_id)
            .route(Method::POST, "/encode", encode)
            .route(Method::POST, "/decode", decode);

        router
    }

    /// Register a handler, replacing any previous one for the same method and path
    pub fn route(&mut self, method: Method, path: &'static str, handler: Handler) -> &mut Self {
        self.routes.retain(|r| !(r.method == method && r.path == path));
        self.routes.push(Route {
            method,
            path,
            handler,
        });
        self
    }

    /// Run one request to completion.
    ///
    /// `target` is the request target as sent (path plus query, if any) and
    /// is matched exactly. Failures never escape: they are logged and turned
    /// into [`ResponseBody::Error`].
    pub fn dispatch(&self, method: &Method, target: &str, body: &[u8]) -> RouterResponse {
        let kind = method.as_str().to_ascii_lowercase();

        let result = match self
            .routes
            .iter()
            .find(|r| r.method == *method && r.path == target)
        {
            Some(route) => (route.handler)(&self.context, body),
            None => Err(RouteError::NotFound {
                method: method.to_string(),
                target: target.to_string(),
            }),
        };

        let body = match result {
            Ok(value) => {
                debug!(%method, path = target, response = %value, "Request handled");
                ResponseBody::Json(value)
            }
            Err(e) => {
                warn!(%method, path = target, kind = e.kind(), error = %e, "Request failed");
                ResponseBody::Error
            }
        };

        RouterResponse { kind, body }
    }
}

fn bos_id(ctx: &RouteContext, _body: &[u8]) -> Result<Value, RouteError> {
    Ok(ctx
        .naming
        .object(WireField::BosId, wire_id(ctx.adapter.bos_id())))
}

fn eos_id(ctx: &RouteContext, _body: &[u8]) -> Result<Value, RouteError> {
    Ok(ctx
        .naming
        .object(WireField::EosId, wire_id(ctx.adapter.eos_id())))
}

fn encode(ctx: &RouteContext, body: &[u8]) -> Result<Value, RouteError> {
    let request: EncodeRequest = serde_json::from_slice(body)?;

    let prompt = ctx.template.render(&request.text, request.image_prompt());
    debug!(image_prompt = request.image_prompt(), %prompt, "Rendered prompt");

    let token_ids = ctx.adapter.encode(&prompt)?;
    Ok(ctx.naming.object(WireField::TokenIds, token_ids))
}

fn decode(ctx: &RouteContext, body: &[u8]) -> Result<Value, RouteError> {
    let request: DecodeRequest = serde_json::from_slice(body)?;

    let text = ctx.adapter.decode(&request.token_ids)?;
    Ok(ctx.naming.object(WireField::Text, text))
}
