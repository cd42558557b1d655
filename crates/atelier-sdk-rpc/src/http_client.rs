use reqwest::Client;
use serde::{de::DeserializeOwned, Serialize};

use crate::LedgerRpcClient;

/// A ledger RPC client backed by an HTTP node endpoint.
#[derive(Debug, Clone)]
pub struct HttpRpcClient {
    base_url: String,
    client: Client,
}

impl HttpRpcClient {
    pub fn new(base_url: String) -> Self {
        Self {
            base_url,
            client: Client::new(),
        }
    }

    pub fn mainnet() -> Self {
        Self::new("https://rpc.atelier.market".to_string())
    }

    pub fn testnet() -> Self {
        Self::new("https://rpc.testnet.atelier.market".to_string())
    }
}

impl LedgerRpcClient for HttpRpcClient {
    type Error = reqwest::Error;

    fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn make_post_request<R, B>(&self, endpoint: &str, body: B) -> Result<R, Self::Error>
    where
        B: Serialize + Send,
        R: DeserializeOwned + Send,
    {
        let url = format!("{}/{}", self.base_url(), endpoint);
        let res = self.client.post(&url).json(&body).send().await?;
        res.json::<R>().await
    }
}
