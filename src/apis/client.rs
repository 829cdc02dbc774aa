/// Shared HTTP client wrapper for provider API calls
use crate::errors::CoreError;
use reqwest::Client;
use std::time::Duration;

/// Thin wrapper around `reqwest::Client` with a fixed per-request timeout
#[derive(Debug)]
pub struct HttpClient {
    client: Client,
}

impl HttpClient {
    pub fn new(timeout_secs: u64) -> Result<Self, CoreError> {
        if timeout_secs == 0 {
            return Err(CoreError::validation("timeout_secs", "must be greater than zero"));
        }

        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .map_err(|e| {
                CoreError::validation("http_client", format!("failed to build client: {}", e))
            })?;

        Ok(Self { client })
    }

    pub fn client(&self) -> &Client {
        &self.client
    }
}
