use url::Url;

use crate::config::{ConfigError, StrategyConfig};
use crate::provider::google::OPTIONAL_KEYS;

/// A `302 Found` pointing the browser at the provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Redirect {
    pub status: u16,
    pub location: Url,
}

/// Authorization query parameters, in order. Setting an existing key
/// replaces its value in place.
fn authorization_params(config: &StrategyConfig) -> Vec<(&'static str, String)> {
    let mut params: Vec<(&'static str, String)> = vec![
        ("client_id", config.client_id.clone()),
        ("redirect_uri", config.redirect_uri().to_string()),
        ("response_type", "code".to_string()),
        ("scope", config.scope()),
    ];

    for &key in OPTIONAL_KEYS {
        let Some(value) = config.optional(key) else {
            continue;
        };
        match params.iter_mut().find(|(existing, _)| *existing == key) {
            Some(slot) => slot.1 = value.to_string(),
            None => params.push((key, value.to_string())),
        }
    }

    params
}

/// Fails with `MissingKey("redirect_uri")` unless a redirect URI was
/// configured or derived by [`StrategyConfig::apply_defaults`].
pub fn build_authorization_url(config: &StrategyConfig) -> Result<Url, ConfigError> {
    if config.optional("redirect_uri").is_none() {
        return Err(ConfigError::MissingKey("redirect_uri"));
    }

    let mut url =
        Url::parse(&config.endpoints.authorize_url).map_err(|source| ConfigError::InvalidUrl {
            key: "authorize_url".to_string(),
            source,
        })?;

    {
        let mut query = url.query_pairs_mut();
        for (key, value) in authorization_params(config) {
            query.append_pair(key, &value);
        }
    }

    Ok(url)
}

pub fn redirect(config: &StrategyConfig) -> Result<Redirect, ConfigError> {
    let location = build_authorization_url(config)?;
    tracing::info!(
        endpoint = %config.endpoints.authorize_url,
        has_state = config.optional("state").is_some(),
        "redirecting to provider for authorization"
    );
    Ok(Redirect {
        status: 302,
        location,
    })
}
