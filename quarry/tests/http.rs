mod common;

use std::net::SocketAddr;
use std::sync::Arc;

use common::Fixture;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;

async fn start(fixture: Fixture) -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let addr = listener.local_addr().expect("local addr");
    let (tmp, dashboard) = fixture.into_parts();
    tokio::spawn(async move {
        // The database directory lives as long as the server does.
        let _tmp = tmp;
        quarry::http::serve(listener, Arc::new(dashboard))
            .await
            .expect("serve");
    });
    addr
}

async fn send_raw(addr: SocketAddr, request: String) -> (u16, String, String) {
    let mut stream = tokio::net::TcpStream::connect(addr)
        .await
        .expect("connect server");
    stream
        .write_all(request.as_bytes())
        .await
        .expect("write request");
    let mut response = String::new();
    stream
        .read_to_string(&mut response)
        .await
        .expect("read response");
    let (head, body) = response
        .split_once("\r\n\r\n")
        .expect("http response separator");
    let status = head
        .lines()
        .next()
        .and_then(|line| line.split_whitespace().nth(1))
        .and_then(|s| s.parse::<u16>().ok())
        .expect("status");
    (status, head.to_string(), body.to_string())
}

async fn get(addr: SocketAddr, path: &str) -> (u16, String, String) {
    send_raw(
        addr,
        format!("GET {path} HTTP/1.1\r\nHost: {addr}\r\nConnection: close\r\n\r\n"),
    )
    .await
}

async fn post(addr: SocketAddr, path: &str, content_type: &str, body: &str) -> (u16, String, String) {
    send_raw(
        addr,
        format!(
            "POST {path} HTTP/1.1\r\nHost: {addr}\r\nContent-Type: {content_type}\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
            body.len()
        ),
    )
    .await
}

fn vendors() -> Fixture {
    Fixture::with_cookies(&[("snacks", "Acme", 4), ("drinks", "Globex", 6)])
}

#[tokio::test]
async fn index_without_question_is_blank() {
    let addr = start(vendors()).await;
    let (status, head, body) = get(addr, "/").await;
    assert_eq!(status, 200);
    assert!(head.to_lowercase().contains("content-type: text/html"));
    assert!(body.contains("Generate Report"));
    assert!(!body.contains("<img"));
    assert!(!body.contains("<table"));
}

#[tokio::test]
async fn form_submission_renders_report() {
    let addr = start(vendors()).await;
    let (status, _, body) = post(
        addr,
        "/",
        "application/x-www-form-urlencoded",
        "question=Show+me+vendor+distribution",
    )
    .await;
    assert_eq!(status, 200);
    assert!(body.contains("<img src=\"data:image/png;base64,"));
    assert!(body.contains("Total number of cookies: 10"));
    assert!(body.contains("<td>Globex</td><td>6</td>"));
}

#[tokio::test]
async fn question_in_query_string_renders_report() {
    let addr = start(vendors()).await;
    let (status, _, body) = get(addr, "/?question=classification").await;
    assert_eq!(status, 200);
    assert!(body.contains("Proportion chart"));
}

#[tokio::test]
async fn json_api_returns_payload() {
    let addr = start(vendors()).await;
    let (status, _, body) = post(
        addr,
        "/api/report",
        "application/json",
        r#"{"question": "Show me vendor distribution"}"#,
    )
    .await;
    assert_eq!(status, 200);
    let json: serde_json::Value = serde_json::from_str(&body).expect("json body");
    assert_eq!(json["chart_kind"], "comparison");
    assert_eq!(json["insights"][0], "Total number of cookies: 10");
    assert_eq!(json["table"]["rows"][1][0], "Globex");
}

#[tokio::test]
async fn json_api_reports_failures() {
    let addr = start(Fixture::with_sql("CREATE TABLE biscuits(id INT);")).await;
    let (status, _, body) = post(addr, "/api/report", "application/json", r#"{"question": "vendor"}"#).await;
    assert_eq!(status, 422);
    let json: serde_json::Value = serde_json::from_str(&body).expect("json body");
    assert!(json["error"].as_str().unwrap().contains("no such table"));

    let (status, _, _) = post(addr, "/api/report", "application/json", r#"{"question": ""}"#).await;
    assert_eq!(status, 204);
}

#[tokio::test]
async fn health_check() {
    let addr = start(vendors()).await;
    let (status, _, body) = get(addr, "/health").await;
    assert_eq!(status, 200);
    assert_eq!(body, "ok");
}
