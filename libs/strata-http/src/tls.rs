//! TLS helpers for the HTTP client.

use std::sync::Arc;

/// Get the crypto provider for TLS connections.
///
/// Uses the process-wide default provider when one is installed, otherwise
/// an aws-lc-rs provider that is NOT installed globally.
pub fn get_crypto_provider() -> Arc<rustls::crypto::CryptoProvider> {
    rustls::crypto::CryptoProvider::get_default()
        .cloned()
        .unwrap_or_else(|| Arc::new(rustls::crypto::aws_lc_rs::default_provider()))
}
