use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::profile::{ProfileMap, ProfileValue};

/// Query parameters of the inbound callback request.
pub type CallbackQuery = BTreeMap<String, String>;

/// Token endpoint payload. Only `access_token` decides success.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TokenResponse {
    #[serde(default, deserialize_with = "lenient_string")]
    pub access_token: Option<String>,
    #[serde(default, deserialize_with = "lenient_seconds")]
    pub expires_in: Option<i64>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub refresh_token: Option<String>,
}

impl TokenResponse {
    pub fn access_token(&self) -> Option<&str> {
        self.access_token.as_deref().filter(|t| is_present(t))
    }

    pub fn refresh_token(&self) -> Option<&str> {
        self.refresh_token.as_deref().filter(|t| is_present(t))
    }
}

fn is_present(value: &str) -> bool {
    !value.is_empty() && value != "0"
}

fn lenient_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::String(s) => Some(s),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    })
}

fn lenient_seconds<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::Number(n) => n.as_i64().or_else(|| n.as_f64().map(|f| f as i64)),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    })
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Credentials {
    pub token: String,
    /// ISO-8601, e.g. `2026-10-19T12:00:00+00:00`. A missing `expires_in`
    /// counts as 0; `None` only when the sum overflows.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expires: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,
}

/// Normalized identity handed to the host on success.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AuthResult {
    pub uid: String,
    pub info: ProfileMap,
    pub credentials: Credentials,
    pub raw: ProfileMap,
}

impl AuthResult {
    pub fn info_str(&self, key: &str) -> Option<&str> {
        self.info.get(key).and_then(ProfileValue::as_str)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AuthErrorCode {
    /// The provider redirected back without an authorization code.
    #[serde(rename = "oauth2callback_error")]
    Oauth2Callback,
    AccessTokenError,
    UserinfoError,
}

impl AuthErrorCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            AuthErrorCode::Oauth2Callback => "oauth2callback_error",
            AuthErrorCode::AccessTokenError => "access_token_error",
            AuthErrorCode::UserinfoError => "userinfo_error",
        }
    }
}

impl fmt::Display for AuthErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Failure handed to the host's error callback, with raw diagnostics.
#[derive(Debug, Clone, PartialEq, Serialize, thiserror::Error)]
#[error("{code}: {}", .message.as_deref().unwrap_or("authentication failed"))]
pub struct AuthError {
    pub code: AuthErrorCode,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    pub raw: Value,
}

impl AuthError {
    pub fn new(code: AuthErrorCode, raw: Value) -> Self {
        Self {
            code,
            message: None,
            raw,
        }
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn token_response_accepts_numeric_strings() {
        let parsed: TokenResponse =
            serde_json::from_value(json!({"access_token": "t", "expires_in": "3599"})).unwrap();
        assert_eq!(parsed.access_token(), Some("t"));
        assert_eq!(parsed.expires_in, Some(3599));
        assert_eq!(parsed.refresh_token(), None);
    }

    #[test]
    fn empty_access_token_is_absent() {
        let parsed: TokenResponse =
            serde_json::from_value(json!({"access_token": "", "expires_in": 3600})).unwrap();
        assert_eq!(parsed.access_token(), None);

        let parsed: TokenResponse =
            serde_json::from_value(json!({"access_token": null})).unwrap();
        assert_eq!(parsed.access_token(), None);
    }

    #[test]
    fn auth_error_serializes_as_mapping() {
        let err = AuthError::new(AuthErrorCode::AccessTokenError, json!({"response": ""}))
            .with_message("Failed when attempting to obtain access token");

        assert_eq!(
            serde_json::to_value(&err).unwrap(),
            json!({
                "code": "access_token_error",
                "message": "Failed when attempting to obtain access token",
                "raw": {"response": ""}
            })
        );
        assert_eq!(
            err.to_string(),
            "access_token_error: Failed when attempting to obtain access token"
        );
    }

    #[test]
    fn callback_error_omits_message() {
        let err = AuthError::new(AuthErrorCode::Oauth2Callback, json!({"error": "access_denied"}));
        let value = serde_json::to_value(&err).unwrap();
        assert_eq!(value["code"], "oauth2callback_error");
        assert!(value.get("message").is_none());
    }
}
