//! Backend client factory.
//!
//! Builds clients from application configuration so callers never construct
//! providers by hand.

use crate::client::PortariaApi;
use crate::legacy::LegacyStoreClient;
use crate::providers::HttpBackend;
use portaria_core::{AppConfig, AppResult};
use std::sync::Arc;

/// Create the backend client described by `config`.
///
/// # Errors
/// Returns a configuration error if the API URL is not a usable http(s) base.
pub fn create_client(config: &AppConfig) -> AppResult<Arc<dyn PortariaApi>> {
    config.validate()?;
    let backend = HttpBackend::with_base_url(&config.api_url)?;
    tracing::debug!("Using HTTP backend at {}", backend.base_url());
    Ok(Arc::new(backend))
}

/// Create the legacy store client, if one is configured.
pub fn create_legacy_client(config: &AppConfig) -> AppResult<Option<LegacyStoreClient>> {
    match &config.legacy {
        Some(legacy) => {
            config.validate()?;
            Ok(Some(LegacyStoreClient::new(legacy)?))
        }
        None => Ok(None),
    }
}
