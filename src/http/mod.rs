//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! Inbound request
//!     → server.rs (Axum router, request ID, trace span)
//!     → security/ (destination check, pass-header set)
//!     → request.rs (https URI, filtered headers, body with declared length)
//!     → upstream.rs (send once)
//!     → response.rs (status, content-length, content-type, body)
//!     → Send to client
//! ```

pub mod request;
pub mod request_id;
pub mod response;
pub mod server;
pub mod upstream;

pub use request::OutboundBody;
pub use server::HttpServer;
pub use upstream::{HttpsUpstream, Upstream};
