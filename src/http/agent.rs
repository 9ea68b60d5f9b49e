use anyhow::{Context, Result};
use async_trait::async_trait;
use log::debug;
use reqwest::Client;

use super::{ApiRequest, ApiResponse};

/// Sends a fully built request and returns the raw response.
///
/// Transport failures are returned as-is; status codes are not interpreted here.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait HttpAgent: Send + Sync {
    async fn send(&self, request: ApiRequest) -> Result<ApiResponse>;
}

/// Default agent backed by reqwest, with a persistent cookie store.
#[derive(Clone)]
pub struct ReqwestAgent {
    client: Client,
}

impl ReqwestAgent {
    /// Builds a reqwest client that keeps cookies across requests.
    pub fn new(user_agent: &str) -> Result<Self> {
        let client = Client::builder()
            .user_agent(user_agent)
            .cookie_store(true)
            .build()
            .context("Failed to build HTTP client")?;
        Ok(Self { client })
    }

    /// Wraps an existing reqwest client. Its cookie policy is left as configured.
    pub fn from_client(client: Client) -> Self {
        Self { client }
    }

    pub fn inner(&self) -> &Client {
        &self.client
    }
}

#[async_trait]
impl HttpAgent for ReqwestAgent {
    #[tracing::instrument(skip(self, request))]
    async fn send(&self, request: ApiRequest) -> Result<ApiResponse> {
        debug!("{} {}...", request.method, request.url);
        let mut builder = self
            .client
            .request(request.method, request.url)
            .headers(request.headers);
        if let Some(body) = request.body {
            builder = builder.body(body);
        }

        let response = builder.send().await?;
        let status = response.status().as_u16();
        let body = response.text().await?;
        debug!("Received HTTP {} ({} bytes)", status, body.len());

        Ok(ApiResponse { status, body })
    }
}
