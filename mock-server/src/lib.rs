use std::{collections::BTreeMap, time::Duration};

use axum::{
    body::Bytes,
    extract::Path,
    http::{header, HeaderMap, Method, StatusCode, Uri},
    routing::{any, get},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tokio::net::TcpListener;

/// Everything the server saw about one request.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct Echo {
    pub method: String,
    pub path: String,
    pub query: String,
    pub headers: BTreeMap<String, String>,
    pub cookie: Option<String>,
    pub body: String,
    /// Decoded body when it was sent as `application/x-www-form-urlencoded`.
    pub form: BTreeMap<String, String>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ErrorBody {
    pub status: u16,
    pub error: String,
}

pub fn app() -> Router {
    Router::new()
        .route("/echo", any(echo))
        .route("/query", get(query))
        .route("/status/{code}", any(status))
        .route("/stall", any(stall))
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    axum::serve(listener, app()).await
}

async fn echo(method: Method, uri: Uri, headers: HeaderMap, body: Bytes) -> Json<Echo> {
    let is_form = headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|ct| ct.starts_with("application/x-www-form-urlencoded"));
    let form = if is_form {
        form_urlencoded::parse(&body).into_owned().collect()
    } else {
        BTreeMap::new()
    };
    let cookie = headers
        .get(header::COOKIE)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);

    Json(Echo {
        method: method.to_string(),
        path: uri.path().to_string(),
        query: uri.query().unwrap_or_default().to_string(),
        headers: headers
            .iter()
            .map(|(k, v)| {
                (
                    k.as_str().to_string(),
                    String::from_utf8_lossy(v.as_bytes()).into_owned(),
                )
            })
            .collect(),
        cookie,
        body: String::from_utf8_lossy(&body).into_owned(),
        form,
    })
}

/// Raw query string as plain text.
async fn query(uri: Uri) -> String {
    uri.query().unwrap_or_default().to_string()
}

/// Responds with the requested status and a JSON error body.
async fn status(Path(code): Path<u16>) -> (StatusCode, Json<ErrorBody>) {
    let status = StatusCode::from_u16(code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    let body = ErrorBody {
        status: status.as_u16(),
        error: status.canonical_reason().unwrap_or("unknown").to_string(),
    };
    (status, Json(body))
}

/// Never answers within any sensible client timeout.
async fn stall() -> StatusCode {
    tokio::time::sleep(Duration::from_secs(3600)).await;
    StatusCode::NO_CONTENT
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn echo_serializes_to_json() {
        let echo = Echo {
            method: "GET".to_string(),
            path: "/echo".to_string(),
            query: "q=go".to_string(),
            headers: BTreeMap::new(),
            cookie: None,
            body: String::new(),
            form: BTreeMap::new(),
        };
        let json = serde_json::to_value(&echo).unwrap();
        assert_eq!(json["method"], "GET");
        assert_eq!(json["query"], "q=go");
        assert!(json["cookie"].is_null());
    }

    #[test]
    fn error_body_shape() {
        let body = ErrorBody {
            status: 500,
            error: "Internal Server Error".to_string(),
        };
        let json = serde_json::to_string(&body).unwrap();
        assert_eq!(json, r#"{"status":500,"error":"Internal Server Error"}"#);
    }
}
