#![allow(dead_code)]

use std::collections::BTreeMap;
use std::io::Read;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use gsignin::StrategyConfig;
use tiny_http::{Response, Server};

#[derive(Debug, Clone)]
pub struct Recorded {
    pub method: String,
    pub path: String,
    pub query: BTreeMap<String, String>,
    pub form: BTreeMap<String, String>,
    pub content_type: Option<String>,
    pub user_agent: Option<String>,
    pub client_tag: Option<String>,
}

/// Canned reply for one provider endpoint.
#[derive(Clone)]
pub struct Canned {
    pub status: u16,
    pub body: &'static str,
    pub delay: Option<Duration>,
}

impl Canned {
    pub fn ok(body: &'static str) -> Self {
        Self {
            status: 200,
            body,
            delay: None,
        }
    }
}

pub struct FakeProvider {
    pub base_url: String,
    handle: JoinHandle<Vec<Recorded>>,
}

impl FakeProvider {
    /// Serves `/token` and `/userinfo` on a random local port, stopping after
    /// `expected` requests or 10s of inactivity.
    pub fn spawn(token: Canned, userinfo: Canned, expected: usize) -> Self {
        let server = Server::http("127.0.0.1:0").unwrap();
        let addr = server.server_addr().to_ip().unwrap();

        let handle = thread::spawn(move || {
            let mut recorded = Vec::new();
            while recorded.len() < expected {
                let mut request = match server.recv_timeout(Duration::from_secs(10)) {
                    Ok(Some(request)) => request,
                    _ => break,
                };

                let url = url::Url::parse(&format!("http://localhost{}", request.url())).unwrap();
                let mut body = String::new();
                request.as_reader().read_to_string(&mut body).unwrap();
                let header = |name: &'static str| {
                    request
                        .headers()
                        .iter()
                        .find(|h| h.field.equiv(name))
                        .map(|h| h.value.as_str().to_string())
                };

                recorded.push(Recorded {
                    method: request.method().to_string(),
                    path: url.path().to_string(),
                    query: url.query_pairs().into_owned().collect(),
                    form: url::form_urlencoded::parse(body.as_bytes())
                        .into_owned()
                        .collect(),
                    content_type: header("Content-Type"),
                    user_agent: header("User-Agent"),
                    client_tag: header("X-Client-Tag"),
                });

                let canned = match url.path() {
                    "/token" => token.clone(),
                    "/userinfo" => userinfo.clone(),
                    _ => Canned {
                        status: 404,
                        body: "",
                        delay: None,
                    },
                };
                if let Some(delay) = canned.delay {
                    thread::sleep(delay);
                }
                let response = Response::from_string(canned.body).with_status_code(canned.status);
                let _ = request.respond(response);
            }
            recorded
        });

        Self {
            base_url: format!("http://{}", addr),
            handle,
        }
    }

    pub fn config(&self) -> StrategyConfig {
        let mut config = StrategyConfig::new("client-123", "secret-456");
        config.endpoints.token_url = format!("{}/token", self.base_url);
        config.endpoints.userinfo_url = format!("{}/userinfo", self.base_url);
        config.apply_defaults("http://localhost:8484/google/");
        config
    }

    pub fn finish(self) -> Vec<Recorded> {
        self.handle.join().unwrap()
    }
}

pub fn query(pairs: &[(&str, &str)]) -> BTreeMap<String, String> {
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}
