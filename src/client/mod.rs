//! Shippo API client.
//!
//! [`Client`] injects authentication headers, dispatches requests through an
//! [`HttpAgent`] and decodes the JSON responses. Collection endpoints can be
//! walked with [`Client::get_all`] and asynchronous jobs awaited with
//! [`Client::poll`].
//!
//! Request methods take `&mut self` because every call records the last
//! exchange. Sharing a client between tasks needs external synchronization.

mod decode;
mod headers;
mod paginate;
mod poll;
mod uri;

use anyhow::{Context, Result};
use log::debug;
use reqwest::{Method, Url};
use serde::Serialize;
use serde_json::Value;

use crate::config::Config;
use crate::http::{ApiRequest, Exchange, HttpAgent, ReqwestAgent};

pub use decode::decode;
pub use headers::{API_VERSION_HEADER, AUTH_SCHEME, HeaderInjector};
pub use poll::{INITIAL_POLL_WAIT, POLL_IN_PROGRESS};
pub use uri::build_uri;

pub struct Client<A: HttpAgent = ReqwestAgent> {
    agent: A,
    config: Config,
    base_url: Url,
    headers: HeaderInjector,
    last_exchange: Option<Exchange>,
}

impl Client<ReqwestAgent> {
    /// Creates a client with the default reqwest agent. No request is sent.
    pub fn new(config: Config) -> Result<Self> {
        let agent = ReqwestAgent::new(&config.user_agent)?;
        Self::with_agent(config, agent)
    }

    /// Shorthand for a client with the default configuration.
    pub fn from_token(token: impl Into<String>) -> Result<Self> {
        Self::new(Config::new(token))
    }
}

impl<A: HttpAgent> Client<A> {
    /// Creates a client that sends requests through `agent`.
    pub fn with_agent(config: Config, agent: A) -> Result<Self> {
        let base_url = uri::parse_base(&config.api_url)?;
        let headers = HeaderInjector::new(&config.token, config.api_version.as_deref())?;
        debug!(
            "Shippo client for {} using token {}",
            base_url,
            config.masked_token()
        );

        Ok(Self {
            agent,
            config,
            base_url,
            headers,
            last_exchange: None,
        })
    }

    pub fn token(&self) -> &str {
        &self.config.token
    }

    pub fn api_version(&self) -> Option<&str> {
        self.config.api_version.as_deref()
    }

    pub fn debug(&self) -> bool {
        self.config.debug
    }

    pub fn set_debug(&mut self, debug: bool) {
        self.config.debug = debug;
    }

    pub fn agent(&self) -> &A {
        &self.agent
    }

    /// The last request/response pair, if any request has completed.
    pub fn last_exchange(&self) -> Option<&Exchange> {
        self.last_exchange.as_ref()
    }

    /// Builds the absolute URL for `path` relative to the API origin.
    pub fn uri(&self, path: &str, params: &[(&str, &str)]) -> Result<Url> {
        build_uri(&self.base_url, path, params)
    }

    #[tracing::instrument(skip(self))]
    pub async fn get(&mut self, path: &str, params: &[(&str, &str)]) -> Result<Value> {
        let url = self.uri(path, params)?;
        self.dispatch(Method::GET, url, None).await
    }

    #[tracing::instrument(skip(self))]
    pub async fn delete(&mut self, path: &str, params: &[(&str, &str)]) -> Result<Value> {
        let url = self.uri(path, params)?;
        self.dispatch(Method::DELETE, url, None).await
    }

    /// Sends `body` as a JSON document.
    #[tracing::instrument(skip(self, body))]
    pub async fn post<T: Serialize + ?Sized>(&mut self, path: &str, body: &T) -> Result<Value> {
        self.send_json(Method::POST, path, body).await
    }

    /// Sends `body` as a JSON document.
    #[tracing::instrument(skip(self, body))]
    pub async fn put<T: Serialize + ?Sized>(&mut self, path: &str, body: &T) -> Result<Value> {
        self.send_json(Method::PUT, path, body).await
    }

    async fn send_json<T: Serialize + ?Sized>(
        &mut self,
        method: Method,
        path: &str,
        body: &T,
    ) -> Result<Value> {
        let url = self.uri(path, &[])?;
        let payload = serde_json::to_string(body).context("Failed to serialize request body")?;
        self.dispatch(method, url, Some(payload)).await
    }

    /// Applies headers, sends the request, records the exchange and decodes it.
    async fn dispatch(&mut self, method: Method, url: Url, body: Option<String>) -> Result<Value> {
        let mut request = ApiRequest::new(method, url, body);
        self.headers.apply(&mut request.headers);

        if self.config.debug {
            debug!(
                "Request: {} {} headers={:?} body={}",
                request.method,
                request.url,
                request.headers,
                request.body.as_deref().unwrap_or("")
            );
        }

        let response = self.agent.send(request.clone()).await?;

        if self.config.debug {
            debug!("Response: HTTP {} body={}", response.status, response.body);
        }

        let exchange = self.last_exchange.insert(Exchange { request, response });
        Ok(decode(&exchange.response)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ApiError;
    use crate::http::{ApiResponse, MockHttpAgent};
    use reqwest::header::{ACCEPT_CHARSET, AUTHORIZATION, CONTENT_TYPE};
    use serde_json::json;

    fn config() -> Config {
        Config::new("test_token").with_api_url("https://api.example.test/")
    }

    fn client_with(agent: MockHttpAgent) -> Client<MockHttpAgent> {
        Client::with_agent(config(), agent).unwrap()
    }

    #[test]
    fn test_construction_does_not_send() {
        let mut agent = MockHttpAgent::new();
        agent.expect_send().never();

        let client = client_with(agent);
        assert_eq!(client.token(), "test_token");
        assert_eq!(client.api_version(), None);
        assert!(!client.debug());
        assert!(client.last_exchange().is_none());
    }

    #[test]
    fn test_default_agent_construction() {
        let client = Client::from_token("test_token").unwrap();
        assert_eq!(
            client.uri("shipments/", &[]).unwrap().as_str(),
            "https://api.goshippo.com/shipments/"
        );
    }

    #[test]
    fn test_construction_rejects_bad_base_url() {
        let result = Client::with_agent(
            Config::new("t").with_api_url("::nope"),
            MockHttpAgent::new(),
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_set_debug() {
        let mut client = client_with(MockHttpAgent::new());
        client.set_debug(true);
        assert!(client.debug());
        client.set_debug(false);
        assert!(!client.debug());
    }

    #[tokio::test]
    async fn test_get_returns_decoded_body() {
        let mut agent = MockHttpAgent::new();
        agent
            .expect_send()
            .withf(|req| {
                req.method == Method::GET
                    && req.url.as_str() == "https://api.example.test/addresses/?results=5"
                    && req.body.is_none()
            })
            .times(1)
            .returning(|_| Ok(ApiResponse::new(200, r#"{"object_id": "a1", "zip": "94117"}"#)));

        let mut client = client_with(agent);
        let value = client.get("addresses/", &[("results", "5")]).await.unwrap();

        assert_eq!(value, json!({"object_id": "a1", "zip": "94117"}));
    }

    #[tokio::test]
    async fn test_delete_uses_delete_verb() {
        let mut agent = MockHttpAgent::new();
        agent
            .expect_send()
            .withf(|req| req.method == Method::DELETE && req.url.path() == "/webhooks/w1")
            .times(1)
            .returning(|_| Ok(ApiResponse::new(200, "{}")));

        let mut client = client_with(agent);
        let value = client.delete("webhooks/w1", &[]).await.unwrap();
        assert_eq!(value, json!({}));
    }

    #[tokio::test]
    async fn test_post_and_put_send_json_body() {
        let payload = json!({"name": "Mr Hippo", "street1": "215 Clayton St.", "validate": true});
        let expected = serde_json::to_string(&payload).unwrap();

        let mut agent = MockHttpAgent::new();
        let expected_post = expected.clone();
        agent
            .expect_send()
            .withf(move |req| {
                req.method == Method::POST
                    && req.url.query().is_none()
                    && req.body.as_deref() == Some(expected_post.as_str())
            })
            .times(1)
            .returning(|req| Ok(ApiResponse::new(201, req.body.unwrap())));
        let expected_put = expected.clone();
        agent
            .expect_send()
            .withf(move |req| {
                req.method == Method::PUT && req.body.as_deref() == Some(expected_put.as_str())
            })
            .times(1)
            .returning(|req| Ok(ApiResponse::new(200, req.body.unwrap())));

        let mut client = client_with(agent);
        assert_eq!(client.post("addresses/", &payload).await.unwrap(), payload);
        assert_eq!(client.put("addresses/a1", &payload).await.unwrap(), payload);
    }

    #[tokio::test]
    async fn test_every_verb_carries_headers() {
        let mut agent = MockHttpAgent::new();
        agent
            .expect_send()
            .withf(|req| {
                req.headers[AUTHORIZATION] == "ShippoToken test_token"
                    && req.headers[CONTENT_TYPE] == "application/json"
                    && req.headers[ACCEPT_CHARSET] == "utf-8"
                    && req.headers[API_VERSION_HEADER] == "2018-02-08"
            })
            .times(4)
            .returning(|_| Ok(ApiResponse::new(200, "{}")));

        let mut client =
            Client::with_agent(config().with_api_version("2018-02-08"), agent).unwrap();
        client.get("a/", &[]).await.unwrap();
        client.delete("a/", &[]).await.unwrap();
        client.post("a/", &json!({})).await.unwrap();
        client.put("a/", &json!({})).await.unwrap();
    }

    #[tokio::test]
    async fn test_version_header_absent_when_not_configured() {
        let mut agent = MockHttpAgent::new();
        agent
            .expect_send()
            .withf(|req| !req.headers.contains_key(API_VERSION_HEADER))
            .times(1)
            .returning(|_| Ok(ApiResponse::new(200, "{}")));

        let mut client = client_with(agent);
        client.get("a/", &[]).await.unwrap();
    }

    #[tokio::test]
    async fn test_http_failure_carries_status() {
        let mut agent = MockHttpAgent::new();
        agent
            .expect_send()
            .returning(|_| Ok(ApiResponse::new(400, r#"{"zip": ["required"]}"#)));

        let mut client = client_with(agent);
        let err = client.post("addresses/", &json!({})).await.unwrap_err();

        match err.downcast_ref::<ApiError>() {
            Some(ApiError::Http { status, text }) => {
                assert_eq!(*status, 400);
                assert_eq!(text, r#"{"zip": ["required"]}"#);
            }
            other => panic!("Expected HTTP error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_non_json_body_is_unparsable_for_any_status() {
        for status in [200, 404, 500] {
            let mut agent = MockHttpAgent::new();
            agent
                .expect_send()
                .returning(move |_| Ok(ApiResponse::new(status, "<h1>Server Error</h1>")));

            let mut client = client_with(agent);
            let err = client.get("a/", &[]).await.unwrap_err();
            let api = err.downcast_ref::<ApiError>().unwrap();
            assert!(matches!(api, ApiError::UnparsableContent { .. }));
            assert_eq!(api.code(), crate::error::UNPARSABLE_CONTENT_CODE);
        }
    }

    #[tokio::test]
    async fn test_transport_error_propagates_unclassified() {
        let mut agent = MockHttpAgent::new();
        agent
            .expect_send()
            .returning(|_| Err(anyhow::anyhow!("connection refused")));

        let mut client = client_with(agent);
        let err = client.get("a/", &[]).await.unwrap_err();

        assert!(err.downcast_ref::<ApiError>().is_none());
        assert_eq!(err.to_string(), "connection refused");
        assert!(client.last_exchange().is_none());
    }

    #[tokio::test]
    async fn test_last_exchange_tracks_most_recent_call() {
        let mut agent = MockHttpAgent::new();
        let mut seq = mockall::Sequence::new();
        agent
            .expect_send()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| Ok(ApiResponse::new(200, r#"{"first": true}"#)));
        agent
            .expect_send()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| Ok(ApiResponse::new(404, r#"{"detail": "Not found."}"#)));

        let mut client = client_with(agent);
        client.get("first/", &[]).await.unwrap();
        let exchange = client.last_exchange().unwrap();
        assert_eq!(exchange.request.url.path(), "/first/");
        assert_eq!(exchange.response.body, r#"{"first": true}"#);

        client
            .post("second/", &json!({"k": "v"}))
            .await
            .unwrap_err();
        let exchange = client.last_exchange().unwrap();
        assert_eq!(exchange.request.method, Method::POST);
        assert_eq!(exchange.request.url.path(), "/second/");
        assert_eq!(exchange.request.body.as_deref(), Some(r#"{"k":"v"}"#));
        assert_eq!(
            exchange.request.headers[AUTHORIZATION],
            "ShippoToken test_token"
        );
        assert_eq!(exchange.response.status, 404);
    }

    #[test_log::test(tokio::test)]
    async fn test_debug_mode_still_decodes() {
        let mut agent = MockHttpAgent::new();
        agent
            .expect_send()
            .returning(|_| Ok(ApiResponse::new(200, r#"{"ok": 1}"#)));

        let mut client = Client::with_agent(config().with_debug(true), agent).unwrap();
        let value = client.post("a/", &json!({"x": 1})).await.unwrap();
        assert_eq!(value, json!({"ok": 1}));
    }
}
