use anyhow::{Context, Result};
use reqwest::header::{
    ACCEPT_CHARSET, AUTHORIZATION, CONTENT_TYPE, HeaderMap, HeaderName, HeaderValue,
};

/// Scheme prefix of the `Authorization` header.
pub const AUTH_SCHEME: &str = "ShippoToken";

/// Header carrying the pinned API version.
pub const API_VERSION_HEADER: HeaderName = HeaderName::from_static("shippo-api-version");

/// Precomputed header values applied to every outgoing request.
#[derive(Debug, Clone)]
pub struct HeaderInjector {
    authorization: HeaderValue,
    api_version: Option<HeaderValue>,
}

impl HeaderInjector {
    pub fn new(token: &str, api_version: Option<&str>) -> Result<Self> {
        let mut authorization = HeaderValue::from_str(&format!("{} {}", AUTH_SCHEME, token))
            .context("API token contains characters not allowed in a header")?;
        authorization.set_sensitive(true);

        let api_version = api_version
            .map(|v| {
                HeaderValue::from_str(v)
                    .with_context(|| format!("Invalid API version: {:?}", v))
            })
            .transpose()?;

        Ok(Self {
            authorization,
            api_version,
        })
    }

    pub fn apply(&self, headers: &mut HeaderMap) {
        headers.insert(AUTHORIZATION, self.authorization.clone());
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.insert(ACCEPT_CHARSET, HeaderValue::from_static("utf-8"));
        if let Some(version) = &self.api_version {
            headers.insert(API_VERSION_HEADER, version.clone());
        }
    }
}
