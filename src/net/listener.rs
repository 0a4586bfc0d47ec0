//! TCP listener binding.
//!
//! # Responsibilities
//! - Parse and bind the configured address
//! - Report the OS-chosen port when binding port 0

use std::net::SocketAddr;

use thiserror::Error;
use tokio::net::TcpListener;

/// Error type for listener operations.
#[derive(Debug, Error)]
pub enum ListenerError {
    /// The configured address does not parse.
    #[error("Invalid bind address {address:?}: {source}")]
    InvalidAddress {
        address: String,
        source: std::net::AddrParseError,
    },
    /// Failed to bind or query the socket.
    #[error("Failed to bind: {0}")]
    Bind(#[from] std::io::Error),
}

/// Bind a TCP listener to `address`.
pub async fn bind(address: &str) -> Result<(TcpListener, SocketAddr), ListenerError> {
    let addr: SocketAddr = address.parse().map_err(|source| ListenerError::InvalidAddress {
        address: address.to_string(),
        source,
    })?;

    let listener = TcpListener::bind(addr).await?;
    let local_addr = listener.local_addr()?;

    tracing::info!(
        address = %local_addr,
        requested = %addr,
        "Listener bound"
    );

    Ok((listener, local_addr))
}
