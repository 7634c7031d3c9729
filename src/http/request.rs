//! Outbound request construction.
//!
//! # Responsibilities
//! - Rewrite the inbound target onto `https://<destination>` keeping path and query
//! - Copy the method and the allowed headers
//! - Attach the inbound body with its declared length, without reading it
//!
//! # Design Decisions
//! - The body is never buffered: the declared `Content-Length` is reported as
//!   an exact size hint so the client frames the request without measuring it
//! - No declared length means no body is forwarded

use std::fmt;
use std::pin::Pin;
use std::task::{Context, Poll};

use axum::body::{Body, Bytes};
use axum::http::request::Parts;
use axum::http::uri::Scheme;
use axum::http::{header, HeaderMap, Method, Request, Uri};
use hyper::body::{Body as HttpBody, Frame, SizeHint};

use crate::config::NameSet;
use crate::error::ProxyError;
use crate::security::headers::filter_headers;

/// Request body handed to the upstream client.
pub struct OutboundBody {
    inner: Option<Body>,
    length: u64,
}

impl OutboundBody {
    pub fn empty() -> Self {
        Self {
            inner: None,
            length: 0,
        }
    }

    /// Stream `body` through, trusting `length` as its exact size.
    pub fn with_declared_length(body: Body, length: u64) -> Self {
        Self {
            inner: Some(body),
            length,
        }
    }

    pub fn declared_length(&self) -> Option<u64> {
        self.inner.as_ref().map(|_| self.length)
    }
}

impl fmt::Debug for OutboundBody {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OutboundBody")
            .field("declared_length", &self.declared_length())
            .finish()
    }
}

impl HttpBody for OutboundBody {
    type Data = Bytes;
    type Error = axum::Error;

    fn poll_frame(
        self: Pin<&mut Self>,
        cx: &mut Context<'_>,
    ) -> Poll<Option<Result<Frame<Self::Data>, Self::Error>>> {
        match self.get_mut().inner.as_mut() {
            Some(body) => Pin::new(body).poll_frame(cx),
            None => Poll::Ready(None),
        }
    }

    fn is_end_stream(&self) -> bool {
        match &self.inner {
            Some(body) => self.length == 0 || body.is_end_stream(),
            None => true,
        }
    }

    fn size_hint(&self) -> SizeHint {
        SizeHint::with_exact(self.length)
    }
}

/// `Content-Length` as declared by the caller, if any.
pub fn declared_content_length(headers: &HeaderMap) -> Option<u64> {
    headers
        .get(header::CONTENT_LENGTH)?
        .to_str()
        .ok()?
        .trim()
        .parse()
        .ok()
}

/// `https://<destination>` followed by the inbound path and query.
pub fn outbound_uri(inbound: &Uri, destination: &str) -> Result<Uri, ProxyError> {
    let path_and_query = inbound
        .path_and_query()
        .map(|pq| pq.as_str())
        .unwrap_or("/");

    let uri = Uri::builder()
        .scheme(Scheme::HTTPS)
        .authority(destination)
        .path_and_query(path_and_query)
        .build()?;
    Ok(uri)
}

/// Build the request sent to the destination.
pub fn build_outbound_request(
    parts: &Parts,
    body: Body,
    destination: &str,
    allowed: &NameSet,
) -> Result<Request<OutboundBody>, ProxyError> {
    // CONNECT targets an authority, not a path; it has no https rewrite.
    if parts.method == Method::CONNECT {
        return Err(ProxyError::MalformedMethod(parts.method.to_string()));
    }

    let uri = outbound_uri(&parts.uri, destination)?;

    let body = match declared_content_length(&parts.headers) {
        Some(length) => OutboundBody::with_declared_length(body, length),
        None => OutboundBody::empty(),
    };

    let mut request = Request::builder()
        .method(parts.method.clone())
        .uri(uri)
        .body(body)?;
    *request.headers_mut() = filter_headers(&parts.headers, allowed);

    Ok(request)
}
