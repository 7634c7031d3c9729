//! Security subsystem.
//!
//! # Data Flow
//! ```text
//! Incoming request:
//!     → destination.rs (exactly one destination header, allow-list check)
//!     → headers.rs (resolve pass-header set, drop everything else)
//!     → Pass to outbound request construction
//! ```
//!
//! # Design Decisions
//! - Fail closed: reject on any destination check failure
//! - Headers are forwarded only when explicitly allowed

pub mod destination;
pub mod headers;
