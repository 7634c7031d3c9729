//! Errors raised while proxying a single request.

use std::error::Error as StdError;
use std::fmt::Write;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

#[derive(Debug, thiserror::Error)]
pub enum ProxyError {
    #[error("no destination host header was supplied")]
    MissingDestination,

    #[error("destination host rejected: {0}")]
    InvalidDestination(&'static str),

    #[error("method `{0}` cannot be forwarded")]
    MalformedMethod(String),

    #[error("failed to build outbound request")]
    OutboundRequest(#[from] axum::http::Error),

    #[error("upstream transport failure")]
    TransportFailure(#[source] Box<dyn StdError + Send + Sync>),

    #[error("failed to read upstream response body")]
    ResponseBody(#[from] axum::Error),

    #[error("failed to build relayed response")]
    Relay(#[source] axum::http::Error),
}

impl ProxyError {
    pub fn status(&self) -> StatusCode {
        match self {
            ProxyError::MissingDestination | ProxyError::InvalidDestination(_) => {
                StatusCode::BAD_REQUEST
            }
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Rejections are expected traffic; everything else is a fault.
    pub fn is_rejection(&self) -> bool {
        self.status() == StatusCode::BAD_REQUEST
    }
}

/// `err` followed by each of its sources, separated by `: `.
pub fn error_chain(err: &dyn StdError) -> String {
    let mut chain = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        let _ = write!(chain, ": {cause}");
        source = cause.source();
    }
    chain
}

impl IntoResponse for ProxyError {
    fn into_response(self) -> Response {
        self.status().into_response()
    }
}
