// SPDX-License-Identifier: MIT OR Apache-2.0

use std::time::Duration;

use curator_core::Manifest;
use thiserror::Error;

/// Failures of a single manifest fetch.
///
/// Always recoverable from the engine's point of view: the affected addon degrades to a
/// synthesized fallback manifest and reconciliation continues.
#[derive(Error, Debug)]
pub enum FetchError {
    #[error("manifest fetch timed out")]
    Timeout,

    /// Transport failure or a non-success status code.
    #[error("manifest fetch failed: {0}")]
    Http(String),

    /// The response body was not a usable manifest document.
    #[error("manifest response malformed: {0}")]
    Malformed(String),
}

/// Fetches a manifest document from an addon URL.
///
/// Implementations are not trusted to bound themselves; the engine wraps every call in
/// [`fetch_bounded`] with the configured timeout. There is no retry at any layer; retry policy
/// belongs to the caller, not the engine.
pub trait ManifestFetcher {
    fn fetch(&self, url: &str) -> impl Future<Output = Result<Manifest, FetchError>>;
}

/// Run one fetch under the engine's timeout.
///
/// Elapsing degrades to [`FetchError::Timeout`], the same failure a slow transport would
/// report, so callers have a single recovery path.
pub async fn fetch_bounded<F>(fetcher: &F, url: &str, limit: Duration) -> Result<Manifest, FetchError>
where
    F: ManifestFetcher,
{
    match tokio::time::timeout(limit, fetcher.fetch(url)).await {
        Ok(result) => result,
        Err(_) => Err(FetchError::Timeout),
    }
}

#[cfg(feature = "http")]
pub use http::HttpFetcher;

#[cfg(feature = "http")]
mod http {
    use std::time::Duration;

    use curator_core::Manifest;

    use super::{FetchError, ManifestFetcher};
    use crate::config::ReconcileConfig;

    /// HTTP manifest fetcher with a bounded per-request timeout.
    #[derive(Clone, Debug)]
    pub struct HttpFetcher {
        client: reqwest::Client,
        timeout: Duration,
    }

    impl HttpFetcher {
        /// Build a fetcher whose every request is bounded by `timeout`.
        pub fn new(timeout: Duration) -> Result<Self, FetchError> {
            let client = reqwest::Client::builder()
                .build()
                .map_err(|err| FetchError::Http(format!("failed to build http client: {err}")))?;
            Ok(Self { client, timeout })
        }

        /// Build a fetcher from the engine configuration.
        pub fn from_config(config: &ReconcileConfig) -> Result<Self, FetchError> {
            Self::new(config.fetch_timeout())
        }

        /// Prefix schemeless addon URLs; stored records sometimes hold the canonical form.
        fn request_url(url: &str) -> String {
            if url.starts_with("http://") || url.starts_with("https://") {
                url.to_string()
            } else {
                format!("https://{url}")
            }
        }
    }

    impl ManifestFetcher for HttpFetcher {
        async fn fetch(&self, url: &str) -> Result<Manifest, FetchError> {
            let response = self
                .client
                .get(Self::request_url(url))
                .timeout(self.timeout)
                .send()
                .await
                .map_err(|err| {
                    if err.is_timeout() {
                        FetchError::Timeout
                    } else {
                        FetchError::Http(err.to_string())
                    }
                })?;

            let response = response
                .error_for_status()
                .map_err(|err| FetchError::Http(err.to_string()))?;

            response
                .json::<Manifest>()
                .await
                .map_err(|err| FetchError::Malformed(err.to_string()))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::StaticFetcher;

    /// Stands in for a transport that never completes.
    struct HungFetcher;

    impl ManifestFetcher for HungFetcher {
        async fn fetch(&self, _url: &str) -> Result<Manifest, FetchError> {
            std::future::pending().await
        }
    }

    #[tokio::test]
    async fn bounded_fetch_times_out_hung_transport() {
        let result = fetch_bounded(&HungFetcher, "https://a.dev/manifest.json", Duration::from_millis(10)).await;
        assert!(matches!(result, Err(FetchError::Timeout)));
    }

    #[tokio::test]
    async fn bounded_fetch_passes_through_fast_results() {
        let fetcher =
            StaticFetcher::default().with("https://a.dev/manifest.json", Manifest::fallback("org.a", "A", None));

        let manifest = fetch_bounded(&fetcher, "https://a.dev/manifest.json", Duration::from_secs(5))
            .await
            .expect("fetches");
        assert_eq!(manifest.id, "org.a");
    }
}
