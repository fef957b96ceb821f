use chrono::{DateTime, SecondsFormat, TimeDelta, Utc};
use serde_json::{json, Value};

use super::profile::{map_profile, ProfileMap, ProfileValue};
use super::types::{AuthError, AuthErrorCode, AuthResult, CallbackQuery, Credentials, TokenResponse};
use super::AuthCallbacks;
use crate::config::StrategyConfig;
use crate::provider::google::PROFILE_MAPPING;
use crate::transport::{HttpResponse, HttpTransport, TransportError};

pub const ACCESS_TOKEN_ERROR_MESSAGE: &str = "Failed when attempting to obtain access token";
pub const USERINFO_ERROR_MESSAGE: &str = "Failed when attempting to query for user information";
pub const MISSING_UID_MESSAGE: &str = "User information response did not contain an id";

/// Token endpoint result that passed validation.
struct GrantedToken {
    access_token: String,
    expires_in: Option<i64>,
    refresh_token: Option<String>,
}

/// Runs the callback half of the flow: code -> token -> profile -> result.
///
/// Holds nothing but borrowed config and transport; every invocation works on
/// its own locals, and the two outbound calls are strictly sequential.
pub struct CallbackExchanger<'a, T: HttpTransport + ?Sized> {
    config: &'a StrategyConfig,
    transport: &'a T,
}

impl<'a, T: HttpTransport + ?Sized> CallbackExchanger<'a, T> {
    pub fn new(config: &'a StrategyConfig, transport: &'a T) -> Self {
        Self { config, transport }
    }

    /// Dispatches the outcome to exactly one of the host's callbacks.
    pub fn run<C: AuthCallbacks + ?Sized>(&self, query: &CallbackQuery, callbacks: &mut C) {
        match self.exchange(query) {
            Ok(result) => callbacks.on_success(result),
            Err(error) => callbacks.on_error(error),
        }
    }

    #[tracing::instrument(skip_all, fields(provider = "google"))]
    pub fn exchange(&self, query: &CallbackQuery) -> Result<AuthResult, AuthError> {
        let Some(code) = query.get("code").filter(|code| !code.is_empty()) else {
            tracing::warn!(
                params = query.len(),
                error = query.get("error").map(String::as_str).unwrap_or_default(),
                "callback arrived without an authorization code"
            );
            return Err(AuthError::new(
                AuthErrorCode::Oauth2Callback,
                json!(query),
            ));
        };

        let token = self.exchange_token(code)?;
        let (profile, response) = self.fetch_profile(&token.access_token)?;
        let result = self.build_result(token, profile, &response, Utc::now())?;

        tracing::info!(uid = %result.uid, "user authenticated");
        Ok(result)
    }

    fn exchange_token(&self, code: &str) -> Result<GrantedToken, AuthError> {
        let form = [
            ("code", code),
            ("client_id", self.config.client_id.as_str()),
            ("client_secret", self.config.client_secret.as_str()),
            ("redirect_uri", self.config.redirect_uri()),
            ("grant_type", "authorization_code"),
        ];

        tracing::debug!(endpoint = %self.config.endpoints.token_url, "exchanging authorization code");

        let response = self
            .transport
            .post_form(
                &self.config.endpoints.token_url,
                &form,
                &self.config.context_options,
            )
            .map_err(|e| transport_failure(AuthErrorCode::AccessTokenError, &e))?;

        let parsed = match serde_json::from_str::<Value>(&response.body) {
            Ok(Value::Object(fields)) if !fields.is_empty() => {
                serde_json::from_value::<TokenResponse>(Value::Object(fields)).ok()
            }
            _ => None,
        };

        let Some(tokens) = parsed else {
            return Err(response_failure(AuthErrorCode::AccessTokenError, &response));
        };
        let Some(access_token) = tokens.access_token().map(str::to_string) else {
            return Err(response_failure(AuthErrorCode::AccessTokenError, &response));
        };

        tracing::debug!(
            status = response.status,
            expires_in = tokens.expires_in,
            has_refresh_token = tokens.refresh_token().is_some(),
            "access token granted"
        );

        Ok(GrantedToken {
            refresh_token: tokens.refresh_token().map(str::to_string),
            expires_in: tokens.expires_in,
            access_token,
        })
    }

    fn fetch_profile(&self, access_token: &str) -> Result<(ProfileMap, HttpResponse), AuthError> {
        tracing::debug!(endpoint = %self.config.endpoints.userinfo_url, "fetching user info");

        let response = self
            .transport
            .get(
                &self.config.endpoints.userinfo_url,
                &[("access_token", access_token)],
                &self.config.context_options,
            )
            .map_err(|e| transport_failure(AuthErrorCode::UserinfoError, &e))?;

        let body = response.body.trim();
        if body.is_empty() || body == "0" {
            return Err(response_failure(AuthErrorCode::UserinfoError, &response));
        }

        match serde_json::from_str::<Value>(body).map(ProfileValue::from) {
            Ok(ProfileValue::Map(profile)) => Ok((profile, response)),
            _ => Err(response_failure(AuthErrorCode::UserinfoError, &response)),
        }
    }

    fn build_result(
        &self,
        token: GrantedToken,
        profile: ProfileMap,
        response: &HttpResponse,
        now: DateTime<Utc>,
    ) -> Result<AuthResult, AuthError> {
        let uid = profile
            .get("id")
            .and_then(ProfileValue::to_scalar_string)
            .filter(|id| !id.is_empty());

        let uid = match uid {
            Some(uid) => uid,
            None if self.config.require_uid => {
                tracing::warn!(status = response.status, "user info has no id");
                return Err(AuthError::new(
                    AuthErrorCode::UserinfoError,
                    response_diagnostics(response),
                )
                .with_message(MISSING_UID_MESSAGE));
            }
            None => String::new(),
        };

        let mut envelope = ProfileMap::new();
        for (from_key, to_path) in PROFILE_MAPPING {
            map_profile(&profile, from_key, to_path, &mut envelope);
        }
        let info = match envelope.remove("info") {
            Some(ProfileValue::Map(info)) => info,
            _ => ProfileMap::new(),
        };

        Ok(AuthResult {
            uid,
            info,
            credentials: Credentials {
                token: token.access_token,
                expires: expires_at(now, token.expires_in.unwrap_or(0)),
                refresh_token: token.refresh_token,
            },
            raw: profile,
        })
    }
}

/// `now + expires_in`, ISO-8601 with a numeric offset.
pub fn expires_at(now: DateTime<Utc>, expires_in: i64) -> Option<String> {
    let expires = now.checked_add_signed(TimeDelta::try_seconds(expires_in)?)?;
    Some(expires.to_rfc3339_opts(SecondsFormat::Secs, false))
}

fn response_diagnostics(response: &HttpResponse) -> Value {
    json!({
        "response": response.body,
        "headers": response.headers,
        "status": response.status,
    })
}

fn failure_message(code: AuthErrorCode) -> &'static str {
    match code {
        AuthErrorCode::UserinfoError => USERINFO_ERROR_MESSAGE,
        _ => ACCESS_TOKEN_ERROR_MESSAGE,
    }
}

fn response_failure(code: AuthErrorCode, response: &HttpResponse) -> AuthError {
    tracing::warn!(code = %code, status = response.status, "provider returned an unusable response");
    AuthError::new(code, response_diagnostics(response)).with_message(failure_message(code))
}

fn transport_failure(code: AuthErrorCode, error: &TransportError) -> AuthError {
    tracing::warn!(code = %code, error = %error, "provider request failed");
    AuthError::new(
        code,
        json!({
            "response": "",
            "headers": {},
            "error": error.to_string(),
        }),
    )
    .with_message(failure_message(code))
}
