//! Forwarding HTTPS reverse proxy.
//!
//! Each request names its destination in `Toll-Proxed-Destination-Host`. The
//! proxy checks it, rewrites the request onto `https://<destination>`, keeps
//! only allow-listed headers, streams the body through, and relays the
//! destination's status, content headers and body back.

pub mod config;
pub mod error;
pub mod http;
pub mod lifecycle;
pub mod observability;
pub mod security;

pub use config::schema::ProxyConfig;
pub use error::ProxyError;
pub use http::HttpServer;
pub use lifecycle::Shutdown;
