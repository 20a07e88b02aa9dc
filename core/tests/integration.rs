//! End-to-end calls against the live mock server.
//!
//! # Design
//! Starts the mock server on a random port, then drives the real `Client`
//! (ureq transport) against its echo, status and stall routes. Checks that
//! assembled requests arrive as expected and that failures surface as the
//! right error variants.

use std::io::{Read, Write};
use std::net::SocketAddr;
use std::time::{Duration, Instant};

use formreq_core::{Client, ClientConfig, Cookie, Error, HttpMethod, RequestOption, Value};
use mock_server::Echo;

/// Spawn the mock server on a background thread and return its address.
fn spawn_server() -> SocketAddr {
    let _ = env_logger::builder().is_test(true).try_init();

    let std_listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = std_listener.local_addr().unwrap();
    std_listener.set_nonblocking(true).unwrap();

    std::thread::spawn(move || {
        let rt = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .unwrap();
        rt.block_on(async {
            let listener = tokio::net::TcpListener::from_std(std_listener).unwrap();
            mock_server::run(listener).await
        })
        .unwrap();
    });

    addr
}

#[test]
fn query_params_reach_the_server() {
    let addr = spawn_server();
    let client = Client::default();

    let resp = client
        .execute(
            &format!("http://{addr}/query"),
            HttpMethod::Get,
            &[RequestOption::query([("q", "go")])],
        )
        .unwrap();

    assert_eq!(resp.status, 200);
    assert!(resp.text().contains("q=go"), "body was {:?}", resp.text());
}

#[test]
fn form_body_reaches_the_server() {
    let addr = spawn_server();
    let client = Client::default();

    let resp = client
        .execute(
            &format!("http://{addr}/echo"),
            HttpMethod::Post,
            &[RequestOption::body([("name", Value::from("a")), ("id", Value::from(42))])],
        )
        .unwrap();

    let echo: Echo = resp.parse().unwrap();
    assert_eq!(echo.method, "POST");
    assert_eq!(echo.form.get("name").map(String::as_str), Some("a"));
    assert_eq!(echo.form.get("id").map(String::as_str), Some("42"));
    assert_eq!(
        echo.headers.get("content-type").map(String::as_str),
        Some("application/x-www-form-urlencoded")
    );
}

#[test]
fn stalled_server_times_out() {
    let addr = spawn_server();
    let client = Client::default();

    let started = Instant::now();
    let err = client
        .execute(
            &format!("http://{addr}/stall"),
            HttpMethod::Get,
            &[RequestOption::timeout(Duration::from_millis(50))],
        )
        .unwrap_err();

    assert!(matches!(err, Error::TransportError(_)), "got {err:?}");
    assert!(started.elapsed() < Duration::from_secs(2), "took {:?}", started.elapsed());
}

#[test]
fn config_timeout_applies_without_option() {
    let addr = spawn_server();
    let client = Client::new(ClientConfig::default().with_timeout(Duration::from_millis(50)));

    let started = Instant::now();
    let err = client.get(&format!("http://{addr}/stall")).unwrap_err();

    assert!(matches!(err, Error::TransportError(_)), "got {err:?}");
    assert!(started.elapsed() < Duration::from_secs(2));
}

#[test]
fn server_error_is_still_a_response() {
    let addr = spawn_server();
    let client = Client::default();

    let resp = client.get(&format!("http://{addr}/status/500")).unwrap();

    assert_eq!(resp.status, 500);
    assert!(!resp.is_success());
    assert!(!resp.bytes().is_empty());
    assert_eq!(resp.lookup("error").unwrap(), Some(serde_json::json!("Internal Server Error")));
}

#[test]
fn headers_and_cookies_reach_the_server() {
    let addr = spawn_server();
    let client = Client::default();

    let resp = client
        .get_with(
            &format!("http://{addr}/echo"),
            &[
                RequestOption::headers([
                    ("X-Trace", Value::from("abc")),
                    ("X-Attempt", Value::from(1)),
                ]),
                RequestOption::cookies([
                    Cookie::new("session", "s1"),
                    Cookie::new("theme", "dark"),
                ]),
            ],
        )
        .unwrap();

    let echo: Echo = resp.parse().unwrap();
    assert_eq!(echo.headers.get("x-trace").map(String::as_str), Some("abc"));
    assert_eq!(echo.headers.get("x-attempt").map(String::as_str), Some("1"));
    assert_eq!(echo.cookie.as_deref(), Some("session=s1; theme=dark"));
}

#[test]
fn every_helper_sends_its_method() {
    let addr = spawn_server();
    let client = Client::default();
    let url = format!("http://{addr}/echo");
    let opts = [RequestOption::body([("k", "v")])];

    let sent = [
        ("PUT", client.put(&url, &opts).unwrap()),
        ("PATCH", client.patch(&url, &opts).unwrap()),
        ("DELETE", client.delete(&url, &opts).unwrap()),
        ("POST", client.post(&url).unwrap()),
        ("GET", client.get(&url).unwrap()),
    ];

    for (method, resp) in sent {
        let echo: Echo = resp.parse().unwrap();
        assert_eq!(echo.method, method);
        if method == "POST" || method == "GET" {
            assert!(echo.body.is_empty(), "{method}: unexpected body");
        } else {
            assert_eq!(echo.form.get("k").map(String::as_str), Some("v"), "{method}: form");
        }
    }
}

#[test]
fn refused_connection_is_a_transport_error() {
    let addr = {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        listener.local_addr().unwrap()
    };
    let client = Client::new(ClientConfig::default().with_timeout(Duration::from_secs(2)));

    let err = client.get(&format!("http://{addr}/echo")).unwrap_err();
    assert!(matches!(err, Error::TransportError(_)), "got {err:?}");
}

/// Accept one connection, promise a 100-byte body, send 5 bytes and hang up.
fn spawn_truncating_server() -> SocketAddr {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();

    std::thread::spawn(move || {
        let (mut stream, _) = listener.accept().unwrap();
        let mut buf = [0u8; 4096];
        let mut seen = Vec::new();
        while !seen.windows(4).any(|w| w == b"\r\n\r\n") {
            let n = stream.read(&mut buf).unwrap();
            if n == 0 {
                return;
            }
            seen.extend_from_slice(&buf[..n]);
        }
        stream
            .write_all(b"HTTP/1.1 200 OK\r\nContent-Length: 100\r\n\r\nhello")
            .unwrap();
        stream.flush().unwrap();
    });

    addr
}

#[test]
fn truncated_body_is_a_body_read_error() {
    let addr = spawn_truncating_server();
    let client = Client::new(ClientConfig::default().with_timeout(Duration::from_secs(5)));

    let err = client.get(&format!("http://{addr}/")).unwrap_err();
    assert!(matches!(err, Error::BodyReadError(_)), "got {err:?}");
}

#[test]
fn invalid_header_fails_before_sending() {
    let client = Client::default();

    // Port 9 is discard; the request must never get that far.
    let err = client
        .get_with("http://127.0.0.1:9/", &[RequestOption::headers([("bad header", "x")])])
        .unwrap_err();
    assert!(matches!(err, Error::InvalidHeader { .. }), "got {err:?}");
}
