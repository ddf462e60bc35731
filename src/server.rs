//! HTTP server
//!
//! A thin axum layer in front of [`RequestRouter`]: a single fallback handler
//! reads the whole body and hands method, target and bytes to the router.
//! Status is always 200 and the `type` header carries the request method,
//! including for bodies that stall past the read timeout and for handler
//! panics.

use std::any::Any;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use axum::{
    body::{to_bytes, Body},
    extract::{Request, State},
    http::{header::CONTENT_TYPE, HeaderValue, Method, StatusCode},
    middleware::{self, Next},
    response::{IntoResponse, Response},
    Router,
};
use tokio::net::TcpListener;
use tokio::time::timeout;
use tower_http::{catch_panic::CatchPanicLayer, trace::TraceLayer};
use tracing::{error, info, warn};

use crate::error::Result;
use crate::router::{RequestRouter, ResponseBody, RouterResponse, ERROR_BODY};

/// Largest request body read before the request is treated as malformed
pub const MAX_BODY_BYTES: usize = 64 * 1024 * 1024;

/// Response header carrying the lowercased request method
pub const TYPE_HEADER: &str = "type";

const JSON_CONTENT_TYPE: &str = "application/json";
const ERROR_CONTENT_TYPE: &str = "text/plain; charset=utf-8";

#[derive(Clone)]
struct AppState {
    router: Arc<RequestRouter>,
    read_timeout: Duration,
}

/// Tokenizer HTTP server
pub struct HttpServer {
    state: AppState,
}

impl HttpServer {
    /// `read_timeout` bounds how long a request body may take to arrive
    pub fn new(router: RequestRouter, read_timeout: Duration) -> Self {
        Self {
            state: AppState {
                router: Arc::new(router),
                read_timeout,
            },
        }
    }

    /// Build the axum application
    pub fn app(&self) -> Router {
        Router::new()
            .fallback(dispatch)
            .with_state(self.state.clone())
            .layer(CatchPanicLayer::custom(panic_response))
            .layer(middleware::from_fn(tag_method))
            .layer(TraceLayer::new_for_http())
    }

    /// Bind `addr` and serve until Ctrl-C
    pub async fn run(self, addr: &str) -> Result<()> {
        let listener = TcpListener::bind(addr).await?;
        info!("Tokenizer server listening on http://{}", listener.local_addr()?);

        self.serve(listener, shutdown_signal()).await
    }

    /// Serve on an already bound listener until `shutdown` resolves
    pub async fn serve<F>(self, listener: TcpListener, shutdown: F) -> Result<()>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        axum::serve(listener, self.app())
            .with_graceful_shutdown(shutdown)
            .await?;

        info!("Tokenizer server stopped");
        Ok(())
    }
}

async fn dispatch(State(state): State<AppState>, request: Request) -> Response {
    let (parts, body) = request.into_parts();
    let target = parts
        .uri
        .path_and_query()
        .map_or_else(|| parts.uri.path(), |pq| pq.as_str());

    let routed = match timeout(state.read_timeout, to_bytes(body, MAX_BODY_BYTES)).await {
        Ok(Ok(bytes)) => state.router.dispatch(&parts.method, target, &bytes),
        Ok(Err(e)) => {
            warn!(method = %parts.method, path = target, error = %e, "Failed to read request body");
            error_for(&parts.method)
        }
        Err(_) => {
            warn!(
                method = %parts.method,
                path = target,
                timeout = ?state.read_timeout,
                "Request body not received in time"
            );
            error_for(&parts.method)
        }
    };

    into_response(routed)
}

fn error_for(method: &Method) -> RouterResponse {
    RouterResponse {
        kind: method.as_str().to_ascii_lowercase(),
        body: ResponseBody::Error,
    }
}

fn into_response(routed: RouterResponse) -> Response {
    let mut response = match routed.body {
        ResponseBody::Json(_) => body_response(routed.body.render(), JSON_CONTENT_TYPE),
        ResponseBody::Error => error_response(),
    };
    if let Ok(kind) = HeaderValue::from_str(&routed.kind) {
        response.headers_mut().insert(TYPE_HEADER, kind);
    }

    response
}

fn body_response(body: String, content_type: &'static str) -> Response {
    let mut response = (StatusCode::OK, body).into_response();
    response
        .headers_mut()
        .insert(CONTENT_TYPE, HeaderValue::from_static(content_type));
    response
}

fn error_response() -> Response {
    body_response(ERROR_BODY.to_string(), ERROR_CONTENT_TYPE)
}

/// Set `type` on responses produced outside the router, panics included
async fn tag_method(request: Request, next: Next) -> Response {
    let kind = request.method().as_str().to_ascii_lowercase();
    let mut response = next.run(request).await;

    if !response.headers().contains_key(TYPE_HEADER) {
        if let Ok(kind) = HeaderValue::from_str(&kind) {
            response.headers_mut().insert(TYPE_HEADER, kind);
        }
    }

    response
}

fn panic_response(panic: Box<dyn Any + Send + 'static>) -> Response<Body> {
    let message = panic
        .downcast_ref::<String>()
        .map(String::as_str)
        .or_else(|| panic.downcast_ref::<&str>().copied())
        .unwrap_or("unknown panic");
    error!(panic = message, "Request handler panicked");

    error_response()
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
