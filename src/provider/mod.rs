pub mod google;

use serde::{Deserialize, Serialize};

/// The three provider URLs a strategy talks to. Defaults to Google's.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProviderEndpoints {
    pub authorize_url: String,
    pub token_url: String,
    pub userinfo_url: String,
}

impl Default for ProviderEndpoints {
    fn default() -> Self {
        Self {
            authorize_url: google::AUTH_URL.to_string(),
            token_url: google::TOKEN_URL.to_string(),
            userinfo_url: google::USERINFO_URL.to_string(),
        }
    }
}

impl ProviderEndpoints {
    pub fn urls(&self) -> [(&'static str, &str); 3] {
        [
            ("authorize_url", &self.authorize_url),
            ("token_url", &self.token_url),
            ("userinfo_url", &self.userinfo_url),
        ]
    }
}
