use async_trait::async_trait;
use reqwest::{header::ACCEPT, Client};
use serde_json::Value;

use crate::config::Config;
use crate::constants::ACCEPT_GEO_JSON;
use crate::error::GatewayError;

/// Single outbound fetch of JSON data from the weather API.
///
/// Implementations never panic on bad input; every failure comes back as a
/// [`GatewayError`] which callers treat as "no data".
#[async_trait]
pub trait Gateway: Send + Sync {
    async fn fetch(&self, url: &str) -> Result<Value, GatewayError>;
}

/// Gateway backed by a shared reqwest client
#[derive(Debug, Clone)]
pub struct HttpGateway {
    client: Client,
}

impl HttpGateway {
    /// Creates a gateway with the configured user agent and timeout
    pub fn new(config: &Config) -> anyhow::Result<Self> {
        let client = Client::builder()
            .user_agent(config.user_agent.as_str())
            .timeout(config.timeout)
            .build()?;

        Ok(Self { client })
    }
}

#[async_trait]
impl Gateway for HttpGateway {
    async fn fetch(&self, url: &str) -> Result<Value, GatewayError> {
        let response = self
            .client
            .get(url)
            .header(ACCEPT, ACCEPT_GEO_JSON)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(GatewayError::Status(response.status().as_u16()));
        }

        let body = response.bytes().await?;
        serde_json::from_slice(&body).map_err(|e| GatewayError::Payload(e.to_string()))
    }
}
