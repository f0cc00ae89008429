//! Executes `HttpRequest` values against the network.
//!
//! `Transport` is the I/O seam: `ApiClient` never talks to a socket directly.
//! Non-2xx statuses are returned as data so the wrapper can classify them;
//! only failures without any response surface as `TransportError`.

use std::time::Duration;

use thiserror::Error;

use crate::http::{HttpMethod, HttpRequest, HttpResponse};

#[derive(Debug, Error)]
pub enum TransportError {
    /// No valid response came back: refused, DNS, timeout, or a reply that
    /// is not HTTP.
    #[error("no response: {0}")]
    NoResponse(String),

    /// The request could not be built.
    #[error("invalid request: {0}")]
    Request(String),
}

pub trait Transport {
    fn execute(&self, request: &HttpRequest) -> Result<HttpResponse, TransportError>;
}

impl<T: Transport + ?Sized> Transport for &T {
    fn execute(&self, request: &HttpRequest) -> Result<HttpResponse, TransportError> {
        (**self).execute(request)
    }
}

/// Blocking transport backed by a `ureq` agent with a global timeout.
#[derive(Debug, Clone)]
pub struct UreqTransport {
    agent: ureq::Agent,
}

impl UreqTransport {
    pub fn new(timeout: Duration) -> Self {
        let agent = ureq::Agent::config_builder()
            .http_status_as_error(false)
            .timeout_global(Some(timeout))
            .build()
            .new_agent();
        Self { agent }
    }
}

impl Transport for UreqTransport {
    fn execute(&self, request: &HttpRequest) -> Result<HttpResponse, TransportError> {
        let url = request.path.as_str();
        let body = request.body.as_deref();
        let headers = request.headers.as_slice();

        let result = match request.method {
            HttpMethod::Get => with_headers(self.agent.get(url), headers).call(),
            HttpMethod::Delete => with_headers(self.agent.delete(url), headers).call(),
            HttpMethod::Post => send(with_headers(self.agent.post(url), headers), body),
            HttpMethod::Put => send(with_headers(self.agent.put(url), headers), body),
            HttpMethod::Patch => send(with_headers(self.agent.patch(url), headers), body),
        };
        let mut response = result.map_err(classify)?;

        let status = response.status().as_u16();
        let headers = response
            .headers()
            .iter()
            .filter_map(|(k, v)| Some((k.as_str().to_string(), v.to_str().ok()?.to_string())))
            .collect();
        let body = response
            .body_mut()
            .read_to_string()
            .map_err(|e| TransportError::NoResponse(e.to_string()))?;

        Ok(HttpResponse {
            status,
            headers,
            body,
        })
    }
}

fn with_headers<B>(
    mut builder: ureq::RequestBuilder<B>,
    headers: &[(String, String)],
) -> ureq::RequestBuilder<B> {
    for (name, value) in headers {
        builder = builder.header(name.as_str(), value.as_str());
    }
    builder
}

fn send(
    builder: ureq::RequestBuilder<ureq::typestate::WithBody>,
    body: Option<&str>,
) -> Result<ureq::http::Response<ureq::Body>, ureq::Error> {
    match body {
        Some(body) => builder.send(body.as_bytes()),
        None => builder.send_empty(),
    }
}

/// Only failures before anything is sent are request errors.
fn classify(err: ureq::Error) -> TransportError {
    match err {
        ureq::Error::BadUri(_) | ureq::Error::Http(_) => TransportError::Request(err.to_string()),
        other => TransportError::NoResponse(other.to_string()),
    }
}
