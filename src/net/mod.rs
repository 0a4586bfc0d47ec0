//! Network layer subsystem.
//!
//! # Data Flow
//! ```text
//! ListenerConfig
//!     → listener.rs (bind, ephemeral port discovery)
//!     → tls.rs (optional rustls credentials)
//!     → handed to http::server for serving
//! ```

pub mod listener;
pub mod tls;

pub use listener::{bind, ListenerError};
pub use tls::{load_tls_config, TlsError};
