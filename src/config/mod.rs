//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML)
//!     → loader.rs (parse & deserialize)
//!     → validation.rs (semantic checks)
//!     → snapshot.rs (derived name sets, immutable)
//!     → shared via ArcSwap<ProxySnapshot> with the request handler
//!
//! On file change (--watch):
//!     watcher.rs detects change
//!     → loader.rs loads and validates
//!     → server swaps in a new snapshot
//!     → requests already in flight keep the snapshot they started with
//! ```

pub mod loader;
pub mod schema;
pub mod snapshot;
pub mod validation;
pub mod watcher;

pub use loader::{load_config, ConfigError};
pub use schema::{DestinationPolicy, ForwardingConfig, ListenerConfig, ProxyConfig};
pub use snapshot::{NameSet, ProxySnapshot};
pub use watcher::ConfigWatcher;
