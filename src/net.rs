//! Remote text fetching
//!
//! Plain HTTP GET with no retry and no timeout beyond the transport's own.
//! Transport errors and non-2xx statuses fail fast as `Network` errors.

use crate::error::{BundleError, BundleResult};
use tracing::debug;

/// Fetch `url` and return its body as text
pub async fn fetch_text(url: &str) -> BundleResult<String> {
    debug!("Fetching: {}", url);

    let target = url.to_string();
    // ureq is blocking; keep it off the async workers
    let result = tokio::task::spawn_blocking(move || -> Result<String, ureq::Error> {
        let mut response = ureq::get(&target).call()?;
        response.body_mut().read_to_string()
    })
    .await
    .map_err(|e| BundleError::Internal(format!("Fetch task failed: {}", e)))?;

    result.map_err(|e| BundleError::network(url, e))
}
