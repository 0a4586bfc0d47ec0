//! TLS credential loading.
//!
//! The harness never inspects the credentials; they are handed to the
//! transport as an opaque `RustlsConfig`.

use std::path::Path;

use axum_server::tls_rustls::RustlsConfig;
use thiserror::Error;

use crate::config::TlsConfig;

#[derive(Debug, Error)]
pub enum TlsError {
    #[error("Certificate file not found: {0}")]
    MissingCertificate(String),
    #[error("Private key file not found: {0}")]
    MissingKey(String),
    #[error("Failed to load TLS credentials: {0}")]
    Load(#[from] std::io::Error),
}

/// Load PEM certificate chain and key into a rustls server config.
pub async fn load_tls_config(config: &TlsConfig) -> Result<RustlsConfig, TlsError> {
    let cert_path = Path::new(&config.cert_path);
    let key_path = Path::new(&config.key_path);

    if !cert_path.exists() {
        return Err(TlsError::MissingCertificate(config.cert_path.clone()));
    }
    if !key_path.exists() {
        return Err(TlsError::MissingKey(config.key_path.clone()));
    }

    let rustls = RustlsConfig::from_pem_file(cert_path, key_path).await?;
    tracing::info!(cert = %config.cert_path, "TLS credentials loaded");
    Ok(rustls)
}
