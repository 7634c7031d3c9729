//! HTTP server setup and the proxy handler.
//!
//! # Responsibilities
//! - Create the Axum Router with a universal wildcard route
//! - Wire up middleware (request ID, tracing)
//! - Hold the current configuration snapshot and swap it on reload
//! - Run the per-request pipeline: validate → filter → forward → relay

use std::sync::Arc;
use std::time::Instant;

use arc_swap::ArcSwap;
use axum::{
    body::Body,
    extract::State,
    http::{request::Parts, Request, Response},
    routing::any,
    Router,
};
use tokio::net::TcpListener;
use tokio::sync::{broadcast, mpsc};
use tower::ServiceBuilder;
use tower_http::{
    request_id::{PropagateRequestIdLayer, SetRequestIdLayer},
    trace::TraceLayer,
};

use crate::config::{DestinationPolicy, ProxyConfig, ProxySnapshot};
use crate::error::{error_chain, ProxyError};
use crate::http::request::build_outbound_request;
use crate::http::request_id::{request_id, UuidRequestId};
use crate::http::response::relay_response;
use crate::http::upstream::{HttpsUpstream, Upstream};
use crate::observability::metrics;
use crate::security::destination::resolve_destination;
use crate::security::headers::{resolve_allowed_headers, wants_full_log};

/// Application state injected into the handler.
pub struct AppState<U> {
    pub snapshot: Arc<ArcSwap<ProxySnapshot>>,
    pub upstream: Arc<U>,
}

impl<U> Clone for AppState<U> {
    fn clone(&self) -> Self {
        Self {
            snapshot: Arc::clone(&self.snapshot),
            upstream: Arc::clone(&self.upstream),
        }
    }
}

/// HTTP server for the proxy.
pub struct HttpServer {
    router: Router,
    snapshot: Arc<ArcSwap<ProxySnapshot>>,
}

impl HttpServer {
    /// Create a server forwarding over HTTPS.
    pub fn new(config: ProxyConfig) -> Self {
        let upstream = HttpsUpstream::new(&config.upstream);
        Self::with_upstream(config, upstream)
    }

    /// Create a server forwarding through the given upstream client.
    pub fn with_upstream<U: Upstream>(config: ProxyConfig, upstream: U) -> Self {
        let snapshot = ProxySnapshot::new(config);
        warn_on_empty_allow_list(&snapshot);

        let snapshot = Arc::new(ArcSwap::from_pointee(snapshot));
        let state = AppState {
            snapshot: Arc::clone(&snapshot),
            upstream: Arc::new(upstream),
        };

        Self {
            router: Self::build_router(state),
            snapshot,
        }
    }

    fn build_router<U: Upstream>(state: AppState<U>) -> Router {
        Router::new()
            .route("/{*path}", any(proxy_handler::<U>))
            .route("/", any(proxy_handler::<U>))
            .with_state(state)
            .layer(
                ServiceBuilder::new()
                    .layer(SetRequestIdLayer::x_request_id(UuidRequestId))
                    .layer(TraceLayer::new_for_http())
                    .layer(PropagateRequestIdLayer::x_request_id()),
            )
    }

    /// The router, for serving elsewhere or driving directly in tests.
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    /// The snapshot new requests currently see.
    pub fn snapshot(&self) -> Arc<ProxySnapshot> {
        self.snapshot.load_full()
    }

    /// Serve until `shutdown` fires, applying configs from `config_updates`.
    ///
    /// Listener and upstream client settings are fixed at startup; a reload
    /// replaces the forwarding policy only.
    pub async fn run(
        self,
        listener: TcpListener,
        mut config_updates: mpsc::UnboundedReceiver<ProxyConfig>,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(address = %addr, "HTTP server starting");

        let snapshot = Arc::clone(&self.snapshot);
        let mut reload_shutdown = shutdown.resubscribe();
        let reload = tokio::spawn(async move {
            loop {
                tokio::select! {
                    update = config_updates.recv() => match update {
                        Some(config) => apply_reload(&snapshot, config),
                        None => break,
                    },
                    _ = reload_shutdown.recv() => break,
                }
            }
        });

        axum::serve(listener, self.router)
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
            })
            .await?;

        if let Err(e) = reload.await {
            tracing::error!(error = %e, "Config reload task failed");
        }
        tracing::info!("HTTP server stopped");
        Ok(())
    }
}

fn apply_reload(snapshot: &ArcSwap<ProxySnapshot>, config: ProxyConfig) {
    let next = ProxySnapshot::new(config);
    warn_on_empty_allow_list(&next);
    tracing::info!(
        pass_headers = next.pass_headers.len(),
        allowed_destination_hosts = next.allowed_destination_hosts.len(),
        policy = ?next.policy(),
        "Configuration reloaded"
    );
    snapshot.store(Arc::new(next));
}

fn warn_on_empty_allow_list(snapshot: &ProxySnapshot) {
    if snapshot.policy() == DestinationPolicy::AllowList
        && snapshot.allowed_destination_hosts.is_empty()
    {
        tracing::warn!("No allowed destination hosts configured, every request will be rejected");
    }
}

/// Main proxy handler.
async fn proxy_handler<U: Upstream>(
    State(state): State<AppState<U>>,
    request: Request<Body>,
) -> Result<Response<Body>, ProxyError> {
    let start_time = Instant::now();
    // One snapshot for the whole request, even if a reload lands mid-flight.
    let snapshot = state.snapshot.load_full();

    let (parts, body) = request.into_parts();
    let method = parts.method.clone();
    let request_id = request_id(&parts.headers).to_string();

    tracing::debug!(
        request_id = %request_id,
        method = %method,
        path = %parts.uri.path(),
        "Proxying request"
    );

    let (destination, result) = match resolve_destination(&parts.headers, &snapshot) {
        Ok(destination) => {
            let result =
                forward(state.upstream.as_ref(), &snapshot, &parts, body, &destination).await;
            (Some(destination), result)
        }
        Err(e) => (None, Err(e)),
    };
    let destination = destination.as_deref().unwrap_or("none");

    let status = match &result {
        Ok(response) => response.status(),
        Err(e) if e.is_rejection() => {
            tracing::info!(request_id = %request_id, reason = %e, "Rejected request");
            e.status()
        }
        Err(e) => {
            tracing::error!(
                request_id = %request_id,
                destination = %destination,
                error = %error_chain(e),
                "Proxy request failed"
            );
            e.status()
        }
    };
    metrics::record_request(method.as_str(), status.as_u16(), destination, start_time);

    result
}

async fn forward<U: Upstream>(
    upstream: &U,
    snapshot: &ProxySnapshot,
    parts: &Parts,
    body: Body,
    destination: &str,
) -> Result<Response<Body>, ProxyError> {
    let full_log = wants_full_log(&parts.headers);
    let outbound = {
        let allowed = resolve_allowed_headers(&parts.headers, snapshot);
        build_outbound_request(parts, body, destination, &allowed)?
    };

    let response = upstream.send(outbound).await?;
    tracing::info!(destination = %destination, status = %response.status(), "Sent request");

    relay_response(response, destination, full_log).await
}
