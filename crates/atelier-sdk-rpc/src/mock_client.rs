use std::collections::HashMap;
use std::sync::Mutex;

use serde::{de::DeserializeOwned, Serialize};
use serde_json::Value;
use thiserror::Error;

use crate::LedgerRpcClient;

/// Errors produced by [`MockRpcClient`].
#[derive(Debug, Error)]
pub enum MockClientError {
    #[error("no mock response configured for {0}")]
    MissingResponse(String),

    #[error("invalid mock request or response: {0}")]
    Json(#[from] serde_json::Error),
}

/// A ledger RPC client with canned responses, recording every request it
/// receives.
#[derive(Debug, Default)]
pub struct MockRpcClient {
    requests: Mutex<Vec<(String, Value)>>,
    responses: HashMap<String, String>,
}

impl MockRpcClient {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers the canned response body for a full endpoint URL.
    pub fn mock_response(&mut self, url: &str, response: &str) {
        self.responses.insert(url.to_string(), response.to_string());
    }

    /// Every request made so far, as `(url, body)` pairs.
    pub fn requests(&self) -> Vec<(String, Value)> {
        self.requests.lock().expect("poisoned").clone()
    }
}

impl LedgerRpcClient for MockRpcClient {
    type Error = MockClientError;

    fn base_url(&self) -> &str {
        "http://ledger.example.com"
    }

    async fn make_post_request<R, B>(&self, endpoint: &str, body: B) -> Result<R, Self::Error>
    where
        B: Serialize + Send,
        R: DeserializeOwned + Send,
    {
        let url = format!("{}/{}", self.base_url(), endpoint);
        self.requests
            .lock()
            .expect("poisoned")
            .push((url.clone(), serde_json::to_value(body)?));

        let response = self
            .responses
            .get(&url)
            .ok_or_else(|| MockClientError::MissingResponse(url.clone()))?;
        Ok(serde_json::from_str(response)?)
    }
}
