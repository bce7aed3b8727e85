//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create Axum Router with the proxy handler
//! - Wire up middleware (request ID, tracing, access log)
//! - Read a fresh config snapshot per request
//! - Dispatch reads to the route resolver and writes to the forwarder

use axum::{
    body::Body,
    extract::State,
    http::{Method, Request, StatusCode},
    middleware,
    response::{IntoResponse, Response},
    routing::any,
    Router,
};
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower_http::{
    request_id::{PropagateRequestIdLayer, SetRequestIdLayer},
    trace::TraceLayer,
};

use crate::auth::Authenticator;
use crate::config::ConfigStore;
use crate::http::request::{InboundRequest, UuidRequestId};
use crate::http::response::error_response;
use crate::http::write::forward_write;
use crate::observability::access_log::access_log;
use crate::remote::RemoteClient;
use crate::routing::RouteResolver;

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn ConfigStore>,
    pub authenticator: Arc<dyn Authenticator>,
    pub client: RemoteClient,
    pub resolver: Arc<RouteResolver>,
}

impl AppState {
    pub fn new(
        store: Arc<dyn ConfigStore>,
        authenticator: Arc<dyn Authenticator>,
        client: RemoteClient,
        app_root: impl Into<PathBuf>,
    ) -> Self {
        Self {
            store,
            authenticator,
            client,
            resolver: Arc::new(RouteResolver::new(app_root)),
        }
    }
}

/// HTTP server for the development proxy.
pub struct HttpServer {
    router: Router,
}

impl HttpServer {
    pub fn new(state: AppState) -> Self {
        Self {
            router: Self::build_router(state),
        }
    }

    /// Build the Axum router with all middleware layers.
    fn build_router(state: AppState) -> Router {
        Router::new()
            .route("/{*path}", any(proxy_handler))
            .route("/", any(proxy_handler))
            .with_state(state)
            .layer(middleware::from_fn(access_log))
            .layer(PropagateRequestIdLayer::x_request_id())
            .layer(TraceLayer::new_for_http())
            .layer(SetRequestIdLayer::x_request_id(UuidRequestId))
    }

    /// The fully layered router, for serving or in-process calls.
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    /// Run the server until `shutdown` fires.
    pub async fn run(self, listener: TcpListener, mut shutdown: broadcast::Receiver<()>) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(address = %addr, "HTTP server starting");

        let app = self.router.into_make_service_with_connect_info::<SocketAddr>();
        axum::serve(listener, app)
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
                tracing::info!("Shutdown signal received");
            })
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }
}

/// Main proxy handler.
async fn proxy_handler(State(state): State<AppState>, request: Request<Body>) -> Response {
    let (inbound, body) = InboundRequest::from_request(request);

    // Re-read on every request: a login or logout may have just changed it.
    let config = match state.store.read() {
        Ok(config) => config,
        Err(e) => {
            tracing::error!(error = %e, "Failed to read configuration");
            return (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()).into_response();
        }
    };

    tracing::debug!(method = %inbound.method, path = %inbound.path, "Proxying request");

    if inbound.method == Method::GET || inbound.method == Method::HEAD {
        return match state.resolver.resolve(&inbound, &config, &state.client).await {
            Ok(content) => content.into_response(),
            Err(e) => error_response(&e),
        };
    }

    match forward_write(&state, &config, inbound, body).await {
        Ok(response) => response,
        Err(fatal) => {
            tracing::error!(error = %fatal, "Credential exchange failed unexpectedly, exiting");
            std::process::exit(1);
        }
    }
}
