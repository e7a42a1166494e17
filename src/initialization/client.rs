//! HTTP client initialization.

use std::sync::Arc;

use reqwest::ClientBuilder;

use crate::config::HttpConfig;
use crate::error_handling::InitializationError;

/// Maximum redirects followed per request.
const MAX_REDIRECTS: usize = 10;

/// Initializes the shared HTTP client.
///
/// Creates a `reqwest::Client` configured with:
/// - User-Agent header from the config
/// - Per-request timeout from the config
/// - Redirect following (up to 10 hops)
///
/// # Errors
///
/// Returns `InitializationError::HttpClientError` if client creation fails.
pub fn init_client(config: &HttpConfig) -> Result<Arc<reqwest::Client>, InitializationError> {
    let client = ClientBuilder::new()
        .timeout(config.timeout)
        .user_agent(config.user_agent.clone())
        .redirect(reqwest::redirect::Policy::limited(MAX_REDIRECTS))
        .build()?;
    Ok(Arc::new(client))
}
