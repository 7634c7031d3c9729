//! Shared utilities for integration tests.

use std::path::Path;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::body::{Body, Bytes};
use axum::http::{HeaderMap, Method, Request, Response, Uri};
use hyper::body::Body as HttpBody;
use toll_proxy::config::{DestinationPolicy, ProxyConfig};
use toll_proxy::http::{OutboundBody, Upstream};
use toll_proxy::ProxyError;

/// What the proxy sent upstream.
#[derive(Debug, Clone)]
pub struct Recorded {
    pub method: Method,
    pub uri: Uri,
    pub headers: HeaderMap,
    pub exact_length: Option<u64>,
    pub body: Bytes,
}

type Responder = dyn Fn(&Recorded) -> Result<Response<Body>, ProxyError> + Send + Sync;

/// In-process upstream that records every request and answers with `respond`.
#[derive(Clone)]
pub struct StubUpstream {
    calls: Arc<Mutex<Vec<Recorded>>>,
    respond: Arc<Responder>,
}

#[allow(dead_code)]
impl StubUpstream {
    pub fn new<F>(respond: F) -> Self
    where
        F: Fn(&Recorded) -> Result<Response<Body>, ProxyError> + Send + Sync + 'static,
    {
        Self {
            calls: Arc::new(Mutex::new(Vec::new())),
            respond: Arc::new(respond),
        }
    }

    /// Always answer `status` with `body` and the given headers.
    pub fn fixed(status: u16, headers: &'static [(&'static str, &'static str)], body: &'static str) -> Self {
        Self::new(move |_| {
            let mut builder = Response::builder().status(status);
            for (name, value) in headers {
                builder = builder.header(*name, *value);
            }
            Ok(builder.body(Body::from(body)).unwrap())
        })
    }

    /// Handle that keeps seeing calls after the stub is moved into a server.
    pub fn calls(&self) -> Arc<Mutex<Vec<Recorded>>> {
        Arc::clone(&self.calls)
    }
}

#[async_trait]
impl Upstream for StubUpstream {
    async fn send(&self, request: Request<OutboundBody>) -> Result<Response<Body>, ProxyError> {
        let (parts, body) = request.into_parts();
        let exact_length = body.size_hint().exact();
        let body = axum::body::to_bytes(Body::new(body), usize::MAX).await.unwrap();

        let recorded = Recorded {
            method: parts.method,
            uri: parts.uri,
            headers: parts.headers,
            exact_length,
            body,
        };
        let response = (self.respond)(&recorded);
        self.calls.lock().unwrap().push(recorded);
        response
    }
}

/// Allow-list config admitting `hosts` and forwarding `pass_headers`.
#[allow(dead_code)]
pub fn allow_list_config(hosts: &str, pass_headers: &str) -> ProxyConfig {
    let mut config = ProxyConfig::default();
    config.proxy.destination_policy = DestinationPolicy::AllowList;
    config.proxy.allowed_destination_hosts = hosts.into();
    config.proxy.pass_headers = pass_headers.into();
    config
}

#[allow(dead_code)]
pub fn open_config(pass_headers: &str) -> ProxyConfig {
    let mut config = ProxyConfig::default();
    config.proxy.destination_policy = DestinationPolicy::Open;
    config.proxy.pass_headers = pass_headers.into();
    config
}

/// Config file body admitting `hosts`.
#[allow(dead_code)]
pub fn allow_list_toml(hosts: &str) -> String {
    format!("[proxy]\nallowed_destination_hosts = \"{hosts}\"\n")
}

/// Save the way editors do: write a sibling temp file, then rename it over `path`.
#[allow(dead_code)]
pub fn save_by_rename(path: &Path, content: &str) {
    let tmp = path.with_extension("toml.tmp");
    std::fs::write(&tmp, content).unwrap();
    std::fs::rename(&tmp, path).unwrap();
}
