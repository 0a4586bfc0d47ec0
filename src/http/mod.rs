//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP/TLS connection (net)
//!     → server.rs (Axum setup, middleware)
//!     → params.rs (len / num parsing)
//!     → handlers.rs (generate, verify, count)
//!     → pages.rs (fan-out page rendering)
//!     → error.rs (failure → status code)
//! ```

pub mod error;
pub mod handlers;
pub mod pages;
pub mod params;
pub mod server;

pub use error::HandlerError;
pub use server::{build_handlers, AppState, HarnessServer};
