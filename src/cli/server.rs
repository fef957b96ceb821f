use anyhow::{Context, Result};
use serde::Serialize;
use tiny_http::{Header, Method, Response, Server};
use url::Url;

use crate::auth::{self, AuthCallbacks, AuthError, AuthResult, CallbackExchanger, CallbackQuery};
use crate::config::StrategyConfig;
use crate::provider::google::CALLBACK_PATH;
use crate::transport::HttpTransport;

/// Response produced for one inbound request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reply {
    pub status: u16,
    pub headers: Vec<(&'static str, String)>,
    pub body: String,
    /// Set once a callback has been fully handled.
    pub completed_callback: bool,
}

impl Reply {
    fn text(status: u16, body: &str) -> Self {
        Self {
            status,
            headers: vec![("Content-Type", "text/plain; charset=utf-8".to_string())],
            body: body.to_string(),
            completed_callback: false,
        }
    }

    fn json<S: Serialize>(status: u16, value: &S) -> Self {
        match serde_json::to_string_pretty(value) {
            Ok(body) => Self {
                status,
                headers: vec![("Content-Type", "application/json".to_string())],
                body,
                completed_callback: true,
            },
            Err(e) => {
                tracing::error!(error = %e, "failed to serialize callback outcome");
                Self {
                    completed_callback: true,
                    ..Self::text(500, "Failed to serialize authentication outcome")
                }
            }
        }
    }

    fn into_response(self) -> Response<std::io::Cursor<Vec<u8>>> {
        let mut response = Response::from_string(self.body).with_status_code(self.status);
        for (name, value) in self.headers {
            if let Ok(header) = Header::from_bytes(name.as_bytes(), value.as_bytes()) {
                response.add_header(header);
            }
        }
        response
    }
}

/// Turns the strategy outcome into the HTTP reply.
#[derive(Default)]
struct ReplyCollector {
    reply: Option<Reply>,
}

impl AuthCallbacks for ReplyCollector {
    fn on_success(&mut self, result: AuthResult) {
        self.reply = Some(Reply::json(200, &result));
    }

    fn on_error(&mut self, error: AuthError) {
        self.reply = Some(Reply::json(400, &error));
    }
}

/// Mounts the strategy at the path of its strategy URL:
/// `<path>` redirects, `<path>oauth2callback` handles the provider callback.
pub struct Host<'a, T: HttpTransport + ?Sized> {
    config: &'a StrategyConfig,
    transport: &'a T,
    strategy_path: String,
}

impl<'a, T: HttpTransport + ?Sized> Host<'a, T> {
    pub fn new(config: &'a StrategyConfig, transport: &'a T, strategy_url: &str) -> Result<Self> {
        let url = Url::parse(strategy_url)
            .with_context(|| format!("Invalid strategy URL '{}'", strategy_url))?;
        let mut strategy_path = url.path().to_string();
        if !strategy_path.ends_with('/') {
            strategy_path.push('/');
        }

        Ok(Self {
            config,
            transport,
            strategy_path,
        })
    }

    pub fn strategy_path(&self) -> &str {
        &self.strategy_path
    }

    pub fn route(&self, method: &Method, request_url: &str) -> Reply {
        let parsed = match Url::parse(&format!("http://localhost{}", request_url)) {
            Ok(parsed) => parsed,
            Err(_) => return Reply::text(400, "Malformed request URL"),
        };

        let path = parsed.path();
        let is_request = path == self.strategy_path
            || path == self.strategy_path.trim_end_matches('/');
        let is_callback = path == format!("{}{}", self.strategy_path, CALLBACK_PATH);

        if !is_request && !is_callback {
            return Reply::text(404, "Not found");
        }
        if *method != Method::Get {
            return Reply::text(405, "Method not allowed");
        }

        if is_request {
            return match auth::redirect(self.config) {
                Ok(redirect) => Reply {
                    status: redirect.status,
                    headers: vec![("Location", redirect.location.to_string())],
                    body: String::new(),
                    completed_callback: false,
                },
                Err(e) => {
                    tracing::error!(error = %e, "could not build authorization URL");
                    Reply::text(500, "Strategy is misconfigured")
                }
            };
        }

        let query: CallbackQuery = parsed.query_pairs().into_owned().collect();
        let mut collector = ReplyCollector::default();
        CallbackExchanger::new(self.config, self.transport).run(&query, &mut collector);

        collector
            .reply
            .unwrap_or_else(|| Reply::text(500, "No authentication outcome"))
    }
}

/// Serves requests one at a time until the listener closes, or after the
/// first handled callback when `once` is set.
pub fn run<T: HttpTransport + ?Sized>(server: &Server, host: &Host<'_, T>, once: bool) -> Result<()> {
    for request in server.incoming_requests() {
        let reply = host.route(request.method(), request.url());
        let completed = reply.completed_callback;

        tracing::debug!(
            method = %request.method(),
            path = %request.url().split('?').next().unwrap_or_default(),
            status = reply.status,
            "handled request"
        );

        if let Err(e) = request.respond(reply.into_response()) {
            tracing::warn!(error = %e, "failed to write response");
        }

        if once && completed {
            break;
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transport::ReqwestTransport;

    fn config() -> StrategyConfig {
        let mut config = StrategyConfig::new("client-123", "secret");
        config.state = Some("opaque".to_string());
        config.apply_defaults("http://localhost:8484/google/");
        config
    }

    #[test]
    fn strategy_path_gets_trailing_slash() {
        let config = config();
        let transport = ReqwestTransport::new();
        let host = Host::new(&config, &transport, "http://localhost:8484/auth/google").unwrap();
        assert_eq!(host.strategy_path(), "/auth/google/");
    }

    #[test]
    fn request_path_redirects_to_provider() {
        let config = config();
        let transport = ReqwestTransport::new();
        let host = Host::new(&config, &transport, "http://localhost:8484/google/").unwrap();

        for path in ["/google/", "/google"] {
            let reply = host.route(&Method::Get, path);
            assert_eq!(reply.status, 302);
            assert!(!reply.completed_callback);

            let location = &reply
                .headers
                .iter()
                .find(|(name, _)| *name == "Location")
                .unwrap()
                .1;
            let url = Url::parse(location).unwrap();
            let pairs: CallbackQuery = url.query_pairs().into_owned().collect();
            assert_eq!(pairs["client_id"], "client-123");
            assert_eq!(pairs["state"], "opaque");
            assert_eq!(
                pairs["redirect_uri"],
                "http://localhost:8484/google/oauth2callback"
            );
        }
    }

    #[test]
    fn callback_without_code_answers_with_error_json() {
        let config = config();
        let transport = ReqwestTransport::new();
        let host = Host::new(&config, &transport, "http://localhost:8484/google/").unwrap();

        let reply = host.route(&Method::Get, "/google/oauth2callback?error=access_denied");
        assert_eq!(reply.status, 400);
        assert!(reply.completed_callback);

        let body: serde_json::Value = serde_json::from_str(&reply.body).unwrap();
        assert_eq!(body["code"], "oauth2callback_error");
        assert_eq!(body["raw"]["error"], "access_denied");
    }

    #[test]
    fn unknown_paths_and_methods_are_rejected() {
        let config = config();
        let transport = ReqwestTransport::new();
        let host = Host::new(&config, &transport, "http://localhost:8484/google/").unwrap();

        assert_eq!(host.route(&Method::Get, "/favicon.ico").status, 404);
        assert_eq!(host.route(&Method::Post, "/google/").status, 405);
    }
}
