use super::error::{LiveDaoError, LiveResult};

/// Runtime configuration describing how to reach the live store.
#[derive(Debug, Clone)]
pub struct LiveConfig {
    /// Root URL of the tree store, without a trailing slash.
    pub base_url: String,
    /// Optional auth token appended to every request.
    pub auth_token: Option<String>,
}

impl LiveConfig {
    /// Construct a configuration from an explicit base URL.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            auth_token: None,
        }
    }

    /// Attach an auth token to the configuration.
    pub fn with_auth_token(mut self, token: impl Into<String>) -> Self {
        self.auth_token = Some(token.into());
        self
    }

    /// Build a configuration by reading the expected environment variables.
    pub fn from_env() -> LiveResult<Self> {
        let base_url = std::env::var("LIVE_BASE_URL").map_err(|_| LiveDaoError::MissingEnvVar {
            var: "LIVE_BASE_URL",
        })?;

        let mut config = Self::new(base_url);
        if let Ok(token) = std::env::var("LIVE_AUTH_TOKEN") {
            config = config.with_auth_token(token);
        }

        Ok(config)
    }
}
