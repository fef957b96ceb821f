use std::collections::BTreeMap;
use std::time::Duration;

use reqwest::blocking::{Client, RequestBuilder};
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};

use super::{HttpResponse, HttpTransport, TransportError, TransportOptions};

pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(5);

/// Blocking `reqwest` transport. A client is built per call since options
/// can differ between calls; no connection reuse is needed.
#[derive(Debug, Clone, Copy, Default)]
pub struct ReqwestTransport;

impl ReqwestTransport {
    pub fn new() -> Self {
        Self
    }

    fn client(&self, options: &TransportOptions) -> Result<Client, TransportError> {
        let options = options.merged_over(&TransportOptions::defaults());

        let mut builder = Client::builder().timeout(REQUEST_TIMEOUT);

        if let Some(user_agent) = &options.user_agent {
            builder = builder.user_agent(user_agent.clone());
        }

        if options.accepts_invalid_certs() {
            tracing::warn!(
                "TLS certificate verification is DISABLED via context_options; \
                 never use this against a real provider"
            );
            builder = builder.danger_accept_invalid_certs(true);
        }

        if let Some(proxy_url) = &options.proxy {
            let proxy =
                reqwest::Proxy::all(proxy_url.as_str()).map_err(|source| TransportError::Proxy {
                    url: proxy_url.clone(),
                    source,
                })?;
            builder = builder.proxy(proxy);
        }

        let mut headers = HeaderMap::new();
        for (key, value) in &options.headers {
            let header_name = HeaderName::from_bytes(key.as_bytes())
                .map_err(|_| TransportError::Header(key.clone()))?;
            let header_value =
                HeaderValue::from_str(value).map_err(|_| TransportError::Header(key.clone()))?;
            headers.insert(header_name, header_value);
        }

        builder
            .default_headers(headers)
            .build()
            .map_err(TransportError::Client)
    }

    fn send(url: &str, request: RequestBuilder) -> Result<HttpResponse, TransportError> {
        let response = request.send().map_err(|e| request_error(url, e))?;

        let status = response.status().as_u16();
        let mut headers: BTreeMap<String, String> = BTreeMap::new();
        for (name, value) in response.headers() {
            let value = String::from_utf8_lossy(value.as_bytes()).into_owned();
            headers
                .entry(name.as_str().to_string())
                .and_modify(|existing| {
                    existing.push_str(", ");
                    existing.push_str(&value);
                })
                .or_insert(value);
        }

        let body = response.text().map_err(|e| request_error(url, e))?;

        tracing::debug!(url, status, bytes = body.len(), "provider responded");

        Ok(HttpResponse {
            status,
            headers,
            body,
        })
    }
}

fn request_error(url: &str, source: reqwest::Error) -> TransportError {
    if source.is_timeout() {
        TransportError::Timeout {
            url: url.to_string(),
            secs: REQUEST_TIMEOUT.as_secs(),
        }
    } else {
        TransportError::Request {
            url: url.to_string(),
            source,
        }
    }
}

impl HttpTransport for ReqwestTransport {
    fn post_form(
        &self,
        url: &str,
        form: &[(&str, &str)],
        options: &TransportOptions,
    ) -> Result<HttpResponse, TransportError> {
        let client = self.client(options)?;
        Self::send(url, client.post(url).form(form))
    }

    fn get(
        &self,
        url: &str,
        query: &[(&str, &str)],
        options: &TransportOptions,
    ) -> Result<HttpResponse, TransportError> {
        let client = self.client(options)?;
        Self::send(url, client.get(url).query(query))
    }
}
