//! Outbound HTTPS client.
//!
//! The handler only needs "send a request, get a response". [`Upstream`] is
//! that seam; [`HttpsUpstream`] is the production implementation over a
//! pooled hyper client with a TLS connector.

use std::time::Duration;

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{Request, Response};
use hyper_tls::HttpsConnector;
use hyper_util::{
    client::legacy::{connect::HttpConnector, Client},
    rt::TokioExecutor,
};

use crate::config::schema::UpstreamConfig;
use crate::error::ProxyError;
use crate::http::request::OutboundBody;

/// Executes one outbound request. Implementations must not retry.
#[async_trait]
pub trait Upstream: Send + Sync + 'static {
    async fn send(&self, request: Request<OutboundBody>) -> Result<Response<Body>, ProxyError>;
}

/// hyper client speaking HTTPS to the destination.
#[derive(Clone)]
pub struct HttpsUpstream {
    client: Client<HttpsConnector<HttpConnector>, OutboundBody>,
}

impl HttpsUpstream {
    pub fn new(config: &UpstreamConfig) -> Self {
        let mut http = HttpConnector::new();
        http.enforce_http(false);
        http.set_connect_timeout(Some(Duration::from_secs(config.connect_secs)));

        let client = Client::builder(TokioExecutor::new())
            .build(HttpsConnector::new_with_connector(http));

        Self { client }
    }
}

#[async_trait]
impl Upstream for HttpsUpstream {
    async fn send(&self, request: Request<OutboundBody>) -> Result<Response<Body>, ProxyError> {
        let response = self
            .client
            .request(request)
            .await
            .map_err(|e| ProxyError::TransportFailure(Box::new(e)))?;

        Ok(response.map(Body::new))
    }
}
