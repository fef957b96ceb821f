use serde::{Deserialize, Serialize};
use url::Url;

use super::ConfigError;
use crate::provider::{google, ProviderEndpoints};
use crate::transport::TransportOptions;

/// Strategy configuration, as read from `config.toml`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StrategyConfig {
    #[serde(default)]
    pub client_id: String,
    #[serde(default)]
    pub client_secret: String,
    pub redirect_uri: Option<String>,
    pub scope: Option<String>,
    pub state: Option<String>,
    pub access_type: Option<String>,
    pub approval_prompt: Option<String>,
    /// Transport overrides merged into both outbound calls.
    #[serde(default)]
    pub context_options: TransportOptions,
    /// Treat a user-info payload without `id` as a failure.
    #[serde(default = "default_require_uid")]
    pub require_uid: bool,
    #[serde(default)]
    pub endpoints: ProviderEndpoints,
}

fn default_require_uid() -> bool {
    true
}

impl Default for StrategyConfig {
    fn default() -> Self {
        Self {
            client_id: String::new(),
            client_secret: String::new(),
            redirect_uri: None,
            scope: None,
            state: None,
            access_type: None,
            approval_prompt: None,
            context_options: TransportOptions::default(),
            require_uid: default_require_uid(),
            endpoints: ProviderEndpoints::default(),
        }
    }
}

impl StrategyConfig {
    pub fn new(client_id: impl Into<String>, client_secret: impl Into<String>) -> Self {
        Self {
            client_id: client_id.into(),
            client_secret: client_secret.into(),
            ..Default::default()
        }
    }

    /// Value of an optional pass-through key, if set and non-empty.
    pub fn optional(&self, key: &str) -> Option<&str> {
        let value = match key {
            "redirect_uri" => &self.redirect_uri,
            "scope" => &self.scope,
            "state" => &self.state,
            "access_type" => &self.access_type,
            "approval_prompt" => &self.approval_prompt,
            _ => return None,
        };
        value.as_deref().filter(|v| !v.is_empty())
    }

    pub fn redirect_uri(&self) -> &str {
        self.optional("redirect_uri").unwrap_or_default()
    }

    pub fn scope(&self) -> String {
        self.optional("scope")
            .map(str::to_string)
            .unwrap_or_else(google::default_scope)
    }

    /// Fills `redirect_uri` and `scope` when absent. `strategy_url` is the
    /// public URL the host mounts the strategy at.
    pub fn apply_defaults(&mut self, strategy_url: &str) {
        if self.optional("redirect_uri").is_none() {
            let mut base = strategy_url.to_string();
            if !base.ends_with('/') {
                base.push('/');
            }
            self.redirect_uri = Some(format!("{}{}", base, google::CALLBACK_PATH));
        }
        if self.optional("scope").is_none() {
            self.scope = Some(google::default_scope());
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.client_id.is_empty() {
            return Err(ConfigError::MissingKey("client_id"));
        }
        if self.client_secret.is_empty() {
            return Err(ConfigError::MissingKey("client_secret"));
        }

        for (key, url) in self.endpoints.urls() {
            parse_url(key, url)?;
        }
        if let Some(redirect_uri) = self.optional("redirect_uri") {
            parse_url("redirect_uri", redirect_uri)?;
        }

        Ok(())
    }
}

fn parse_url(key: &str, value: &str) -> Result<Url, ConfigError> {
    Url::parse(value).map_err(|source| ConfigError::InvalidUrl {
        key: key.to_string(),
        source,
    })
}
