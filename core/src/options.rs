//! Request-shaping options passed positionally to a call.
//!
//! # Design
//! A call takes an ordered slice of `RequestOption`s. Each variant is one
//! labeled bundle (query params, body params, headers, cookies, timeout).
//! The same kind may appear more than once; the assembler merges entries per
//! key with the later one winning.

use std::collections::BTreeMap;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::value::Value;

/// Name → value mapping used by query, body and header options.
pub type Params = BTreeMap<String, Value>;

/// One bundle of request-shaping data.
#[derive(Debug, Clone, PartialEq)]
#[non_exhaustive]
pub enum RequestOption {
    /// Appended to the URL's query string.
    Query(Params),
    /// Form-encoded into the request body.
    Body(Params),
    /// Set on the request, replacing any header with the same name.
    Headers(Params),
    /// Sent in the `Cookie` header of this request only.
    Cookies(Vec<Cookie>),
    /// Overrides the client's default timeout for this request.
    Timeout(Duration),
}

impl RequestOption {
    pub fn query<K, V>(pairs: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<Value>,
    {
        RequestOption::Query(collect_params(pairs))
    }

    pub fn body<K, V>(pairs: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<Value>,
    {
        RequestOption::Body(collect_params(pairs))
    }

    pub fn headers<K, V>(pairs: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<Value>,
    {
        RequestOption::Headers(collect_params(pairs))
    }

    pub fn cookies(cookies: impl IntoIterator<Item = Cookie>) -> Self {
        RequestOption::Cookies(cookies.into_iter().collect())
    }

    pub fn timeout(timeout: Duration) -> Self {
        RequestOption::Timeout(timeout)
    }

    /// Short label for logging.
    pub(crate) fn kind(&self) -> &'static str {
        match self {
            RequestOption::Query(_) => "query",
            RequestOption::Body(_) => "body",
            RequestOption::Headers(_) => "headers",
            RequestOption::Cookies(_) => "cookies",
            RequestOption::Timeout(_) => "timeout",
        }
    }
}

fn collect_params<K, V>(pairs: impl IntoIterator<Item = (K, V)>) -> Params
where
    K: Into<String>,
    V: Into<Value>,
{
    pairs.into_iter().map(|(k, v)| (k.into(), v.into())).collect()
}

/// A cookie attached to a single outgoing request.
///
/// Only `name=value` goes on the wire. The attributes mirror what a
/// `Set-Cookie` header carries so callers can pass cookies they received
/// without stripping them first.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Cookie {
    pub name: String,
    pub value: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub domain: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_age: Option<i64>,
    #[serde(default)]
    pub secure: bool,
    #[serde(default)]
    pub http_only: bool,
}

impl Cookie {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
            ..Default::default()
        }
    }

    pub fn with_path(mut self, path: impl Into<String>) -> Self {
        self.path = Some(path.into());
        self
    }

    pub fn with_domain(mut self, domain: impl Into<String>) -> Self {
        self.domain = Some(domain.into());
        self
    }

    /// The `name=value` pair as it appears in a `Cookie` request header.
    pub fn pair(&self) -> String {
        format!("{}={}", self.name, self.value)
    }

    /// Check that the pair can go on the wire without splitting into, or
    /// smuggling in, other cookies.
    ///
    /// The name must be a non-empty HTTP token. The value may be wrapped in a
    /// single pair of double quotes; inside them only cookie-octets are allowed.
    pub fn validate(&self) -> Result<()> {
        let invalid = |reason| Error::InvalidCookie {
            name: self.name.clone(),
            reason,
        };
        if self.name.is_empty() {
            return Err(invalid("empty name"));
        }
        if !self.name.bytes().all(is_token_byte) {
            return Err(invalid("name is not an HTTP token"));
        }
        let value = self
            .value
            .strip_prefix('"')
            .and_then(|v| v.strip_suffix('"'))
            .unwrap_or(&self.value);
        if !value.bytes().all(is_cookie_octet) {
            return Err(invalid("value contains bytes outside the cookie-octet set"));
        }
        Ok(())
    }
}

fn is_token_byte(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b"!#$%&'*+-.^_`|~".contains(&b)
}

fn is_cookie_octet(b: u8) -> bool {
    matches!(b, 0x21 | 0x23..=0x2b | 0x2d..=0x3a | 0x3c..=0x5b | 0x5d..=0x7e)
}
