pub mod client;

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

pub use client::{ReqwestTransport, REQUEST_TIMEOUT};

pub const DEFAULT_USER_AGENT: &str = concat!("gsignin/", env!("CARGO_PKG_VERSION"));

/// Caller-supplied overrides for outbound requests (the `context_options`
/// config key). Unset fields fall back to [`TransportOptions::defaults`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TransportOptions {
    /// Skips TLS certificate validation. Unsafe; only for local test providers.
    pub danger_accept_invalid_certs: Option<bool>,
    pub proxy: Option<String>,
    pub user_agent: Option<String>,
    pub headers: BTreeMap<String, String>,
}

impl TransportOptions {
    pub fn defaults() -> Self {
        Self {
            danger_accept_invalid_certs: Some(false),
            proxy: None,
            user_agent: Some(DEFAULT_USER_AGENT.to_string()),
            headers: BTreeMap::new(),
        }
    }

    /// Overlays `self` on `base`: set fields win, headers merge key by key.
    pub fn merged_over(&self, base: &TransportOptions) -> TransportOptions {
        let mut headers = base.headers.clone();
        headers.extend(self.headers.iter().map(|(k, v)| (k.clone(), v.clone())));

        TransportOptions {
            danger_accept_invalid_certs: self
                .danger_accept_invalid_certs
                .or(base.danger_accept_invalid_certs),
            proxy: self.proxy.clone().or_else(|| base.proxy.clone()),
            user_agent: self.user_agent.clone().or_else(|| base.user_agent.clone()),
            headers,
        }
    }

    pub fn accepts_invalid_certs(&self) -> bool {
        self.danger_accept_invalid_certs.unwrap_or(false)
    }
}

/// What came back from the provider, kept verbatim for diagnostics.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    pub headers: BTreeMap<String, String>,
    pub body: String,
}

#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    #[error("Failed to build HTTP client: {0}")]
    Client(#[source] reqwest::Error),

    #[error("Invalid proxy URL '{url}': {source}")]
    Proxy {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("Invalid request header '{0}'")]
    Header(String),

    #[error("Request to {url} timed out after {secs}s")]
    Timeout { url: String, secs: u64 },

    #[error("Request to {url} failed: {source}")]
    Request {
        url: String,
        #[source]
        source: reqwest::Error,
    },
}

/// The outbound HTTP collaborator. Both calls block until a response arrives
/// or the fixed timeout elapses.
pub trait HttpTransport {
    fn post_form(
        &self,
        url: &str,
        form: &[(&str, &str)],
        options: &TransportOptions,
    ) -> Result<HttpResponse, TransportError>;

    fn get(
        &self,
        url: &str,
        query: &[(&str, &str)],
        options: &TransportOptions,
    ) -> Result<HttpResponse, TransportError>;
}
