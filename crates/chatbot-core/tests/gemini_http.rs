use std::sync::Arc;

use chatbot_core::{CompletionError, CompletionService, Conversation, GeminiClient, Message};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::task::JoinHandle;

fn header_end(buf: &[u8]) -> Option<usize> {
    buf.windows(4).position(|w| w == b"\r\n\r\n")
}

/// Read one HTTP/1.1 request: headers, then as many body bytes as Content-Length says
async fn read_request(socket: &mut TcpStream) -> String {
    let mut buf = Vec::new();
    let mut chunk = [0u8; 1024];
    loop {
        let n = socket.read(&mut chunk).await.unwrap();
        if n == 0 {
            break;
        }
        buf.extend_from_slice(&chunk[..n]);

        if let Some(end) = header_end(&buf) {
            let head = String::from_utf8_lossy(&buf[..end]).to_lowercase();
            let body_len = head
                .lines()
                .find_map(|line| line.strip_prefix("content-length:"))
                .and_then(|v| v.trim().parse::<usize>().ok())
                .unwrap_or(0);
            if buf.len() >= end + 4 + body_len {
                break;
            }
        }
    }
    String::from_utf8_lossy(&buf).into_owned()
}

/// Answer exactly one request with a canned response; the handle yields the raw request
async fn serve_once(status: &'static str, body: &'static str) -> (String, JoinHandle<String>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    let handle = tokio::spawn(async move {
        let (mut socket, _) = listener.accept().await.unwrap();
        let request = read_request(&mut socket).await;
        let response = format!(
            "HTTP/1.1 {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
            status,
            body.len(),
            body
        );
        socket.write_all(response.as_bytes()).await.unwrap();
        let _ = socket.shutdown().await;
        request
    });

    (format!("http://{}", addr), handle)
}

#[tokio::test]
async fn posts_prompt_and_returns_reply_text() {
    let (base_url, server) = serve_once(
        "200 OK",
        r#"{"candidates":[{"content":{"role":"model","parts":[{"text":"hi there"}]},"finishReason":"STOP"}]}"#,
    )
    .await;
    let client = GeminiClient::with_base_url("test-key", "test-model", &base_url);

    let reply = client.complete("hello").await.unwrap();
    assert_eq!(reply, "hi there");

    let request = server.await.unwrap();
    assert!(request.starts_with("POST /v1beta/models/test-model:generateContent HTTP/1.1"));
    assert!(request.to_lowercase().contains("x-goog-api-key: test-key"));
    assert!(request.contains(r#""parts":[{"text":"hello"}]"#));
}

#[tokio::test]
async fn error_envelope_becomes_rejection() {
    let (base_url, server) = serve_once(
        "400 Bad Request",
        r#"{"error":{"code":400,"message":"API key not valid. Please pass a valid API key.","status":"INVALID_ARGUMENT"}}"#,
    )
    .await;
    let client = GeminiClient::with_base_url("bad-key", "test-model", &base_url);

    let err = client.complete("hello").await.unwrap_err();
    server.await.unwrap();

    match err {
        CompletionError::Rejected { status, message } => {
            assert_eq!(status, 400);
            assert_eq!(message, "API key not valid. Please pass a valid API key.");
        }
        other => panic!("expected rejection, got {other:?}"),
    }
}

#[tokio::test]
async fn unparseable_body_is_malformed() {
    let (base_url, server) = serve_once("200 OK", "not json").await;
    let client = GeminiClient::with_base_url("k", "m", &base_url);

    let err = client.complete("hello").await.unwrap_err();
    server.await.unwrap();

    assert!(matches!(err, CompletionError::Malformed(_)));
}

#[tokio::test]
async fn refused_connection_is_network_error() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let client = GeminiClient::with_base_url("k", "m", &format!("http://{}", addr));
    let err = client.complete("hello").await.unwrap_err();

    assert!(matches!(err, CompletionError::Network(_)));
}

#[tokio::test]
async fn server_failure_drops_the_turn() {
    let (base_url, server) = serve_once(
        "500 Internal Server Error",
        r#"{"error":{"code":500,"message":"internal","status":"INTERNAL"}}"#,
    )
    .await;
    let conversation = Conversation::new(Arc::new(GeminiClient::with_base_url(
        "k", "m", &base_url,
    )));
    conversation.edit_input(|input| input.set("c"));

    conversation.submit_input().await;
    server.await.unwrap();

    assert_eq!(conversation.transcript(), Vec::<Message>::new());
    assert!(!conversation.is_busy());
    assert!(conversation.input().is_empty());
}
