use thiserror::Error;

pub mod types;
pub mod utils;

#[derive(Debug, Error)]
pub enum CoreError {
    #[error("network error: {0}")]
    Network(String),
    #[error("parse error: {0}")]
    Parse(String),
    #[error("remote data API is not configured")]
    NotConfigured,
}

/// Read-through client for the hosted data API (PostgREST-style `/rest/v1/<table>`).
pub mod remote {
    use super::*;
    use tracing::{debug, warn};

    #[derive(Clone, Debug)]
    pub struct HostedDataClient {
        http: reqwest::Client,
        base_url: String,
        api_key: String,
    }

    impl HostedDataClient {
        pub fn new(base_url: impl Into<String>, api_key: impl Into<String>) -> Self {
            Self::with_client(reqwest::Client::new(), base_url, api_key)
        }

        pub fn with_client(http: reqwest::Client, base_url: impl Into<String>, api_key: impl Into<String>) -> Self {
            let base_url = base_url.into().trim_end_matches('/').to_string();
            Self { http, base_url, api_key: api_key.into() }
        }

        pub fn table_url(&self, table: &str) -> String {
            format!("{}/rest/v1/{}", self.base_url, table)
        }

        /// Fetch every row of `table` and return the JSON body as sent by the remote.
        ///
        /// The key goes out both as the `apikey` header and as a bearer token.
        /// A non-2xx status with a JSON body is passed through unchanged.
        pub async fn fetch_table(&self, table: &str) -> Result<serde_json::Value, CoreError> {
            if self.base_url.is_empty() {
                return Err(CoreError::NotConfigured);
            }
            let url = self.table_url(table);
            debug!(%url, "fetching hosted data");
            let resp = self
                .http
                .get(&url)
                .header("apikey", &self.api_key)
                .bearer_auth(&self.api_key)
                .send()
                .await
                .map_err(|e| CoreError::Network(e.to_string()))?;
            let status = resp.status();
            if !status.is_success() {
                warn!(%url, status = status.as_u16(), "hosted data API returned non-success status");
            }
            let json = resp
                .json::<serde_json::Value>()
                .await
                .map_err(|e| CoreError::Parse(e.to_string()))?;
            Ok(json)
        }
    }
}
