//! Error types for the request assembler.
//!
//! # Design
//! Transport failures and body-read failures both wrap `ureq::Error` but are
//! kept as separate variants: the first means no response arrived, the second
//! means a response arrived and its body could not be fully drained. Non-2xx
//! statuses are never errors here; status interpretation belongs to the
//! caller.

use thiserror::Error;

/// Errors returned by `Client` and `HttpResponse` operations.
#[derive(Debug, Error)]
pub enum Error {
    /// A loosely-typed value had no canonical text form (null, array, object).
    #[error("unsupported value kind: {kind}")]
    UnsupportedValueKind { kind: &'static str },

    /// A header name or value could not be put on the wire.
    #[error("invalid header {name:?}: {reason}")]
    InvalidHeader { name: String, reason: String },

    /// A cookie name is not an HTTP token, or its value has bytes outside the
    /// cookie-octet set (`;`, `"`, `\`, whitespace, controls, non-ASCII).
    #[error("invalid cookie {name:?}: {reason}")]
    InvalidCookie { name: String, reason: &'static str },

    /// The round trip failed before a response was received: DNS, connect,
    /// TLS, or the request timeout elapsed.
    #[error("transport error: {0}")]
    TransportError(#[source] ureq::Error),

    /// A response arrived but its body could not be read to the end.
    #[error("failed to read response body: {0}")]
    BodyReadError(#[source] ureq::Error),

    /// The response body is not valid JSON for the requested type.
    #[error("failed to decode response body: {0}")]
    DecodeError(#[from] serde_json::Error),
}

/// A `Result` alias where the `Err` case is [`Error`].
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// True when the round trip gave up because the request timeout elapsed.
    pub fn is_timeout(&self) -> bool {
        matches!(
            self,
            Error::TransportError(ureq::Error::Timeout(_))
                | Error::BodyReadError(ureq::Error::Timeout(_))
        )
    }
}
