//! The I/O seam between the assembler and an HTTP client.
//!
//! `Client` only ever hands a finished `HttpRequest` to a `Transport` and gets
//! back an `HttpResponse`. `UreqTransport` is the default and the only
//! implementation that touches the network; tests swap in a recording fake.

use log::warn;
use ureq::typestate::{WithBody, WithoutBody};
use ureq::{Agent, Body, RequestBuilder};

use crate::error::{Error, Result};
use crate::http::{HttpMethod, HttpRequest, HttpResponse};

/// Performs one blocking round trip.
pub trait Transport: Send + Sync {
    fn send(&self, request: &HttpRequest) -> Result<HttpResponse>;
}

/// Blocking transport backed by a shared `ureq::Agent`.
///
/// The agent owns the connection pool and is reused across calls. Status
/// codes are never turned into errors, and the timeout comes from each
/// request rather than from the agent.
#[derive(Debug, Clone)]
pub struct UreqTransport {
    agent: Agent,
}

impl UreqTransport {
    pub fn new() -> Self {
        let agent = Agent::config_builder()
            .http_status_as_error(false)
            .build()
            .new_agent();
        Self { agent }
    }

    /// Wrap an agent the caller configured. `http_status_as_error` should be
    /// off, otherwise non-2xx responses surface as `TransportError`.
    pub fn with_agent(agent: Agent) -> Self {
        Self { agent }
    }
}

impl Default for UreqTransport {
    fn default() -> Self {
        Self::new()
    }
}

impl Transport for UreqTransport {
    fn send(&self, request: &HttpRequest) -> Result<HttpResponse> {
        let url = request.url.as_str();
        let sent = match request.method {
            HttpMethod::Get => send_without_body(self.agent.get(url), request),
            HttpMethod::Delete => send_without_body(self.agent.delete(url), request),
            HttpMethod::Head => send_without_body(self.agent.head(url), request),
            HttpMethod::Options => send_without_body(self.agent.options(url), request),
            HttpMethod::Trace => send_without_body(self.agent.trace(url), request),
            HttpMethod::Post => send_with_body(self.agent.post(url), request),
            HttpMethod::Put => send_with_body(self.agent.put(url), request),
            HttpMethod::Patch => send_with_body(self.agent.patch(url), request),
        };

        let mut response = sent.map_err(|e| {
            warn!("{} {} failed: {e}", request.method, request.url);
            Error::TransportError(e)
        })?;

        let status = response.status().as_u16();
        let headers = response
            .headers()
            .iter()
            .map(|(name, value)| {
                (
                    name.as_str().to_string(),
                    String::from_utf8_lossy(value.as_bytes()).into_owned(),
                )
            })
            .collect();

        let body = response
            .body_mut()
            .with_config()
            .limit(u64::MAX)
            .read_to_vec()
            .map_err(|e| {
                warn!("{} {} body read failed: {e}", request.method, request.url);
                Error::BodyReadError(e)
            })?;

        Ok(HttpResponse { status, headers, body })
    }
}

type Sent = std::result::Result<ureq::http::Response<Body>, ureq::Error>;

fn send_without_body(builder: RequestBuilder<WithoutBody>, request: &HttpRequest) -> Sent {
    let builder = prepare(builder, request);
    match &request.body {
        Some(body) => builder.force_send_body().send(body.as_slice()),
        None => builder.call(),
    }
}

fn send_with_body(builder: RequestBuilder<WithBody>, request: &HttpRequest) -> Sent {
    let builder = prepare(builder, request);
    match &request.body {
        Some(body) => builder.send(body.as_slice()),
        None => builder.send_empty(),
    }
}

fn prepare<B>(mut builder: RequestBuilder<B>, request: &HttpRequest) -> RequestBuilder<B> {
    for (name, value) in &request.headers {
        builder = builder.header(name.as_str(), value.as_str());
    }
    builder.config().timeout_global(Some(request.timeout)).build()
}
