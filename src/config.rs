//! Runtime configuration: environment variables with CLI overrides.

/// Default backend URL for local development.
pub const DEFAULT_URL: &str = "http://localhost:17020/api/v1";

/// Resolved client configuration.
#[derive(Clone, Debug)]
pub struct Config {
    /// Base URL of the hosted backend (auth and store share it).
    pub base_url: String,
    /// Publishable API key sent on unauthenticated auth calls.
    pub api_key: Option<String>,
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        Self {
            base_url: std::env::var("TASKDECK_URL").unwrap_or_else(|_| DEFAULT_URL.to_string()),
            api_key: std::env::var("TASKDECK_API_KEY").ok(),
        }
    }

    /// Apply CLI overrides on top of the environment.
    pub fn with_overrides(mut self, url: Option<String>, api_key: Option<String>) -> Self {
        if let Some(url) = url {
            self.base_url = url;
        }
        if let Some(key) = api_key {
            self.api_key = Some(key);
        }
        self
    }
}
