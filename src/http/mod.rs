//! Transport layer: request/response values and the pluggable HTTP agent.

mod agent;

use reqwest::Method;
use reqwest::Url;
use reqwest::header::HeaderMap;

pub use agent::{HttpAgent, ReqwestAgent};

#[cfg(test)]
pub use agent::MockHttpAgent;

/// An outgoing request, built fresh for every call.
#[derive(Debug, Clone)]
pub struct ApiRequest {
    pub method: Method,
    pub url: Url,
    pub headers: HeaderMap,
    pub body: Option<String>,
}

impl ApiRequest {
    pub fn new(method: Method, url: Url, body: Option<String>) -> Self {
        Self {
            method,
            url,
            headers: HeaderMap::new(),
            body,
        }
    }
}

/// A raw response as returned by the agent, before JSON decoding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiResponse {
    pub status: u16,
    pub body: String,
}

impl ApiResponse {
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// The most recently completed request/response pair.
#[derive(Debug, Clone)]
pub struct Exchange {
    pub request: ApiRequest,
    pub response: ApiResponse,
}
