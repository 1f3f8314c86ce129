//! KFP HTTP Client
//!
//! A small, type-safe client for the `apis/v2beta1` REST surface of a
//! Kubeflow-Pipelines style service. It covers exactly what an end-to-end
//! check of one pipeline needs:
//! - Locate a pipeline by display name
//! - Trigger a run with a parameter set
//! - Watch the run until it reaches a terminal state
//!
//! # Example
//!
//! ```no_run
//! use kfp_client::{KfpClient, WatchConfig};
//! use kfp_core::ParameterSet;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let client = KfpClient::new("https://ds-pipeline.example.com", "sha256~token");
//!
//!     let pipeline_id = client.locate_pipeline("InstructLab").await?;
//!     let run = client
//!         .trigger_run(&pipeline_id, "InstructLab", ParameterSet::new())
//!         .await?;
//!     let report = client.wait_for_run(&run.run_id, WatchConfig::default()).await?;
//!
//!     println!("Run {} finished after {} polls", report.run_id, report.polls);
//!     Ok(())
//! }
//! ```

pub mod error;
mod pipelines;
mod runs;
pub mod watcher;

// Re-export commonly used types
pub use error::{ClientError, Result};
pub use watcher::{RunStatusSource, RunWatcher, WatchConfig, WatchReport};

use reqwest::{Client, RequestBuilder, Url};
use serde::de::DeserializeOwned;

/// HTTP client for the pipeline service API
///
/// Every request carries `Authorization: Bearer <token>`. The client holds
/// no mutable state and is cheap to clone; clones share one connection pool.
#[derive(Clone)]
pub struct KfpClient {
    /// Base URL of the service (e.g., "https://ds-pipeline.example.com")
    base_url: String,
    /// Pre-obtained bearer token
    token: String,
    /// HTTP client instance
    client: Client,
}

impl std::fmt::Debug for KfpClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KfpClient")
            .field("base_url", &self.base_url)
            .field("token", &"<redacted>")
            .finish()
    }
}

impl KfpClient {
    /// Create a new client
    ///
    /// # Arguments
    /// * `base_url` - The base URL of the pipeline service
    /// * `token` - Bearer token sent with every request
    ///
    /// # Example
    /// ```
    /// use kfp_client::KfpClient;
    ///
    /// let client = KfpClient::new("http://localhost:8888", "token");
    /// ```
    pub fn new(base_url: impl Into<String>, token: impl Into<String>) -> Self {
        Self::with_client(base_url, token, Client::new())
    }

    /// Create a new client with a custom HTTP client
    ///
    /// This allows you to configure request timeouts, proxies, TLS settings, etc.
    ///
    /// # Example
    /// ```
    /// use kfp_client::KfpClient;
    /// use reqwest::Client;
    /// use std::time::Duration;
    ///
    /// let http_client = Client::builder()
    ///     .timeout(Duration::from_secs(30))
    ///     .build()
    ///     .unwrap();
    ///
    /// let client = KfpClient::with_client("http://localhost:8888", "token", http_client);
    /// ```
    pub fn with_client(
        base_url: impl Into<String>,
        token: impl Into<String>,
        client: Client,
    ) -> Self {
        let base_url = base_url.into();
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            token: token.into(),
            client,
        }
    }

    /// Get the base URL of the service
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}/apis/v2beta1/{}", self.base_url, path)
    }

    /// URL of one item of a collection, with `id` escaped as a single segment
    fn item_url(&self, collection: &str, id: &str) -> Result<Url> {
        let mut url =
            Url::parse(&self.url(collection)).map_err(|e| ClientError::InvalidUrl(e.to_string()))?;
        url.path_segments_mut()
            .map_err(|_| ClientError::InvalidUrl(self.base_url.clone()))?
            .push(id);
        Ok(url)
    }

    fn get(&self, path: &str) -> RequestBuilder {
        self.client.get(self.url(path)).bearer_auth(&self.token)
    }

    fn get_item(&self, collection: &str, id: &str) -> Result<RequestBuilder> {
        Ok(self
            .client
            .get(self.item_url(collection, id)?)
            .bearer_auth(&self.token))
    }

    fn post(&self, path: &str) -> RequestBuilder {
        self.client.post(self.url(path)).bearer_auth(&self.token)
    }

    // =============================================================================
    // Response Handlers
    // =============================================================================

    /// Handle an API response and deserialize its JSON body
    ///
    /// Non-success statuses become [`ClientError::Api`]. A body that cannot be
    /// read is a transport failure; a body that is not the expected JSON is a
    /// [`ClientError::Decode`] tagged with `operation`.
    async fn handle_response<T: DeserializeOwned>(
        &self,
        operation: &'static str,
        response: reqwest::Response,
    ) -> Result<T> {
        let status = response.status();

        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(ClientError::api_error(status.as_u16(), error_text));
        }

        let body = response.bytes().await?;
        serde_json::from_slice(&body).map_err(|e| ClientError::decode(operation, e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_creation() {
        let client = KfpClient::new("http://localhost:8888", "t");
        assert_eq!(client.base_url(), "http://localhost:8888");
    }

    #[test]
    fn test_client_trims_trailing_slash() {
        let client = KfpClient::new("http://localhost:8888/", "t");
        assert_eq!(client.base_url(), "http://localhost:8888");
        assert_eq!(
            client.url("runs/abc"),
            "http://localhost:8888/apis/v2beta1/runs/abc"
        );
    }

    #[test]
    fn test_item_url_escapes_id() {
        let client = KfpClient::new("http://localhost:8888/", "t");
        assert_eq!(
            client.item_url("runs", "a/b?x").unwrap().as_str(),
            "http://localhost:8888/apis/v2beta1/runs/a%2Fb%3Fx"
        );
        assert_eq!(
            client.item_url("runs", "r-42").unwrap().as_str(),
            "http://localhost:8888/apis/v2beta1/runs/r-42"
        );
        assert!(matches!(
            KfpClient::new("not a url", "t").item_url("runs", "r-42"),
            Err(ClientError::InvalidUrl(_))
        ));
    }

    #[test]
    fn test_client_with_custom_client() {
        let client = KfpClient::with_client("http://localhost:8888", "t", Client::new());
        assert_eq!(client.base_url(), "http://localhost:8888");
    }

    #[test]
    fn test_debug_redacts_token() {
        let client = KfpClient::new("http://localhost:8888", "sha256~secret");
        let debug = format!("{:?}", client);
        assert!(!debug.contains("sha256~secret"));
        assert!(debug.contains("<redacted>"));
    }
}
