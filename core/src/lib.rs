//! Blocking HTTP request helpers with loosely-typed parameters.
//!
//! # Overview
//! A call takes a URL, a method and an ordered list of `RequestOption`s
//! (query params, form body params, headers, cookies, timeout). The options
//! are merged into one `HttpRequest`, sent through a `Transport` (by default
//! a shared `ureq::Agent`), and the whole response body is returned.
//!
//! ```no_run
//! use std::time::Duration;
//! use formreq_core::{Client, RequestOption};
//!
//! let client = Client::default();
//! let resp = client.post_with(
//!     "https://example.test/api",
//!     &[
//!         RequestOption::body([("name", "a")]),
//!         RequestOption::timeout(Duration::from_secs(5)),
//!     ],
//! )?;
//! println!("{} {}", resp.status, resp.text());
//! # Ok::<(), formreq_core::Error>(())
//! ```
//!
//! # Design
//! - `Client::build` is pure; `Client::execute` adds the round trip.
//! - Values are coerced to text by `Value::coerce`; floats use six
//!   fractional digits.
//! - Timeouts are per call. The client default never changes after
//!   construction.
//! - Status codes are data, not errors.

pub mod client;
pub mod config;
pub mod error;
pub mod http;
pub mod options;
pub mod transport;
pub mod value;

pub use client::{Client, FORM_CONTENT_TYPE};
pub use config::ClientConfig;
pub use error::{Error, Result};
pub use http::{HttpMethod, HttpRequest, HttpResponse};
pub use options::{Cookie, Params, RequestOption};
pub use transport::{Transport, UreqTransport};
pub use value::{coerce_json, Value};
