//! Request assembler.
//!
//! # Design
//! `Client` turns a URL, a method and an ordered slice of `RequestOption`s
//! into one `HttpRequest`, then hands it to its `Transport`. Assembly is a
//! pure function of the config and the options (`build`), so every merge
//! rule is testable without a server.
//!
//! Options are applied strictly in caller order:
//! - query and body entries are upserted per key, later wins;
//! - a body option sets `Content-Type` to the form type, and a later header
//!   option may replace it;
//! - header entries replace any header of the same name (case-insensitive);
//! - cookies accumulate and are folded into one `Cookie` header;
//! - a timeout option replaces the client default for this call only.

use std::time::Duration;

use log::{debug, trace};
use ureq::http::{HeaderName, HeaderValue};

use crate::config::ClientConfig;
use crate::error::{Error, Result};
use crate::http::{HttpMethod, HttpRequest, HttpResponse};
use crate::options::{Cookie, RequestOption};
use crate::transport::{Transport, UreqTransport};

pub const FORM_CONTENT_TYPE: &str = "application/x-www-form-urlencoded";

/// Blocking client that assembles and sends one request per call.
///
/// Holds no per-call state; a single `Client` can be shared across threads.
#[derive(Debug, Clone)]
pub struct Client<T = UreqTransport> {
    config: ClientConfig,
    transport: T,
}

impl Client<UreqTransport> {
    pub fn new(config: ClientConfig) -> Self {
        Self::with_transport(config, UreqTransport::new())
    }
}

impl Default for Client<UreqTransport> {
    fn default() -> Self {
        Self::new(ClientConfig::default())
    }
}

impl<T: Transport> Client<T> {
    pub fn with_transport(config: ClientConfig, transport: T) -> Self {
        Self { config, transport }
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Plain GET without options.
    pub fn get(&self, url: &str) -> Result<HttpResponse> {
        self.execute(url, HttpMethod::Get, &[])
    }

    /// Plain POST without options; sends an empty body.
    pub fn post(&self, url: &str) -> Result<HttpResponse> {
        self.execute(url, HttpMethod::Post, &[])
    }

    pub fn get_with(&self, url: &str, options: &[RequestOption]) -> Result<HttpResponse> {
        self.execute(url, HttpMethod::Get, options)
    }

    pub fn post_with(&self, url: &str, options: &[RequestOption]) -> Result<HttpResponse> {
        self.execute(url, HttpMethod::Post, options)
    }

    pub fn put(&self, url: &str, options: &[RequestOption]) -> Result<HttpResponse> {
        self.execute(url, HttpMethod::Put, options)
    }

    pub fn delete(&self, url: &str, options: &[RequestOption]) -> Result<HttpResponse> {
        self.execute(url, HttpMethod::Delete, options)
    }

    pub fn patch(&self, url: &str, options: &[RequestOption]) -> Result<HttpResponse> {
        self.execute(url, HttpMethod::Patch, options)
    }

    pub fn custom_request(
        &self,
        url: &str,
        method: HttpMethod,
        options: &[RequestOption],
    ) -> Result<HttpResponse> {
        self.execute(url, method, options)
    }

    /// Assemble the request and perform the round trip.
    ///
    /// Any status code counts as success here. Errors are never retried.
    pub fn execute(
        &self,
        url: &str,
        method: HttpMethod,
        options: &[RequestOption],
    ) -> Result<HttpResponse> {
        let request = self.build(url, method, options)?;
        debug!(
            "{} {} (timeout {:?}, body {} bytes)",
            request.method,
            request.url,
            request.timeout,
            request.body.as_ref().map_or(0, Vec::len)
        );
        let response = self.transport.send(&request)?;
        debug!("{} {} -> {}", request.method, request.url, response.status);
        Ok(response)
    }

    /// Assemble the outgoing request without sending it.
    pub fn build(
        &self,
        url: &str,
        method: HttpMethod,
        options: &[RequestOption],
    ) -> Result<HttpRequest> {
        let mut assembly = Assembly::new(&self.config);
        for option in options {
            trace!("applying {} option", option.kind());
            assembly.apply(option);
        }
        assembly.finish(url, method)
    }
}

/// In-progress request owned by a single `build` call.
struct Assembly {
    query: Vec<(String, String)>,
    form: Option<Vec<(String, String)>>,
    headers: Vec<(String, String)>,
    cookies: Vec<Cookie>,
    timeout: Duration,
}

impl Assembly {
    fn new(config: &ClientConfig) -> Self {
        let mut headers = Vec::new();
        upsert_header(&mut headers, "User-Agent", config.user_agent.clone());
        for (name, value) in &config.default_headers {
            upsert_header(&mut headers, name, value.clone());
        }
        Self {
            query: Vec::new(),
            form: None,
            headers,
            cookies: Vec::new(),
            timeout: config.timeout,
        }
    }

    fn apply(&mut self, option: &RequestOption) {
        match option {
            RequestOption::Query(params) => {
                for (key, value) in params {
                    upsert(&mut self.query, key, value.coerce());
                }
            }
            RequestOption::Body(params) => {
                let form = self.form.get_or_insert_with(Vec::new);
                for (key, value) in params {
                    upsert(form, key, value.coerce());
                }
                upsert_header(&mut self.headers, "Content-Type", FORM_CONTENT_TYPE.to_string());
            }
            RequestOption::Headers(params) => {
                for (name, value) in params {
                    upsert_header(&mut self.headers, name, value.coerce());
                }
            }
            RequestOption::Cookies(cookies) => self.cookies.extend(cookies.iter().cloned()),
            RequestOption::Timeout(timeout) => self.timeout = *timeout,
        }
    }

    fn finish(mut self, url: &str, method: HttpMethod) -> Result<HttpRequest> {
        if !self.cookies.is_empty() {
            for cookie in &self.cookies {
                cookie.validate()?;
            }
            let pairs: Vec<String> = self.cookies.iter().map(Cookie::pair).collect();
            let mut cookie_header = pairs.join("; ");
            if let Some((_, existing)) = self
                .headers
                .iter()
                .find(|(name, _)| name.eq_ignore_ascii_case("Cookie"))
            {
                cookie_header = format!("{existing}; {cookie_header}");
            }
            upsert_header(&mut self.headers, "Cookie", cookie_header);
        }

        for (name, value) in &self.headers {
            validate_header(name, value)?;
        }

        Ok(HttpRequest {
            method,
            url: append_query(url, &encode_pairs(&self.query)),
            headers: self.headers,
            body: self.form.map(|pairs| encode_pairs(&pairs).into_bytes()),
            timeout: self.timeout,
        })
    }
}

fn upsert(entries: &mut Vec<(String, String)>, key: &str, value: String) {
    match entries.iter_mut().find(|(k, _)| k == key) {
        Some(entry) => entry.1 = value,
        None => entries.push((key.to_string(), value)),
    }
}

fn upsert_header(headers: &mut Vec<(String, String)>, name: &str, value: String) {
    match headers.iter_mut().find(|(k, _)| k.eq_ignore_ascii_case(name)) {
        Some(entry) => entry.1 = value,
        None => headers.push((name.to_string(), value)),
    }
}

fn validate_header(name: &str, value: &str) -> Result<()> {
    HeaderName::from_bytes(name.as_bytes()).map_err(|e| Error::InvalidHeader {
        name: name.to_string(),
        reason: e.to_string(),
    })?;
    HeaderValue::from_str(value).map_err(|e| Error::InvalidHeader {
        name: name.to_string(),
        reason: e.to_string(),
    })?;
    Ok(())
}

/// `application/x-www-form-urlencoded` encoding; spaces become `+`.
pub fn encode_pairs(pairs: &[(String, String)]) -> String {
    form_urlencoded::Serializer::new(String::new())
        .extend_pairs(pairs.iter().map(|(k, v)| (k.as_str(), v.as_str())))
        .finish()
}

/// Append an encoded query to `url`, after any query it already has. The
/// fragment is dropped since it is never sent.
fn append_query(url: &str, query: &str) -> String {
    let base = match url.find('#') {
        Some(idx) => &url[..idx],
        None => url,
    };
    if query.is_empty() {
        return base.to_string();
    }
    let separator = match base.find('?') {
        None => "?",
        Some(_) if base.ends_with('?') || base.ends_with('&') => "",
        Some(_) => "&",
    };
    format!("{base}{separator}{query}")
}
