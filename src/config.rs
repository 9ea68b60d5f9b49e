use std::time::Duration;

/// Default API origin. Paths passed to the client are relative to it.
pub const DEFAULT_API_URL: &str = "https://api.goshippo.com/";

/// Default wall-clock budget for [`Client::poll`](crate::Client::poll).
pub const DEFAULT_POLL_MAX_WAIT: Duration = Duration::from_secs(70);

/// Client configuration.
///
/// Only the token is required; everything else has a default.
#[derive(Debug, Clone)]
pub struct Config {
    pub token: String,
    pub api_version: Option<String>,
    pub debug: bool,
    pub api_url: String,
    pub user_agent: String,
    pub poll_max_wait: Duration,
}

impl Config {
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: token.into(),
            api_version: None,
            debug: false,
            api_url: DEFAULT_API_URL.to_string(),
            user_agent: format!("shippo-rust/{}", env!("CARGO_PKG_VERSION")),
            poll_max_wait: DEFAULT_POLL_MAX_WAIT,
        }
    }

    pub fn with_api_version(mut self, version: impl Into<String>) -> Self {
        self.api_version = Some(version.into());
        self
    }

    pub fn with_debug(mut self, debug: bool) -> Self {
        self.debug = debug;
        self
    }

    /// Overrides the API origin (used for staging hosts and tests).
    pub fn with_api_url(mut self, api_url: impl Into<String>) -> Self {
        self.api_url = api_url.into();
        self
    }

    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    pub fn with_poll_max_wait(mut self, max_wait: Duration) -> Self {
        self.poll_max_wait = max_wait;
        self
    }

    /// Token with everything but the edges masked, for log output.
    pub fn masked_token(&self) -> String {
        let token = &self.token;
        if token.len() <= 12 || !token.is_ascii() {
            return "*********".to_string();
        }
        format!("{}*********{}", &token[..8], &token[token.len() - 4..])
    }
}
