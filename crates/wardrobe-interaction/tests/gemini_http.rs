//! Exercises GeminiImageAgent against a local HTTP listener serving canned replies.

use std::sync::Arc;

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use tokio::task::JoinHandle;
use wardrobe_core::ImageBackend;
use wardrobe_core::image::ImageArtifact;
use wardrobe_core::operation::TransformCall;
use wardrobe_core::outcome::{EditFailure, classify};
use wardrobe_interaction::GeminiImageAgent;

/// Accepts one connection, records the raw request and answers with `status` + `body`.
async fn serve_once(status: &'static str, body: String) -> (String, JoinHandle<String>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    let handle = tokio::spawn(async move {
        let (mut socket, _) = listener.accept().await.unwrap();
        let mut buffer = Vec::new();
        let mut chunk = [0u8; 4096];

        let header_end = loop {
            let n = socket.read(&mut chunk).await.unwrap();
            assert!(n > 0, "client closed before sending headers");
            buffer.extend_from_slice(&chunk[..n]);
            if let Some(pos) = find(&buffer, b"\r\n\r\n") {
                break pos + 4;
            }
        };

        let headers = String::from_utf8_lossy(&buffer[..header_end]).to_lowercase();
        let content_length = headers
            .lines()
            .find_map(|line| line.strip_prefix("content-length:"))
            .map(|value| value.trim().parse::<usize>().unwrap())
            .unwrap_or(0);

        while buffer.len() < header_end + content_length {
            let n = socket.read(&mut chunk).await.unwrap();
            if n == 0 {
                break;
            }
            buffer.extend_from_slice(&chunk[..n]);
        }

        let response = format!(
            "HTTP/1.1 {status}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
            body.len()
        );
        socket.write_all(response.as_bytes()).await.unwrap();
        socket.shutdown().await.unwrap();

        String::from_utf8_lossy(&buffer).into_owned()
    });

    (format!("http://{addr}/v1beta/models"), handle)
}

fn find(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    haystack
        .windows(needle.len())
        .position(|window| window == needle)
}

fn call() -> TransformCall {
    let image = ImageArtifact::new("portrait.png", "image/png", vec![0x89u8, b'P', b'N', b'G'])
        .unwrap();
    TransformCall {
        image: Arc::new(image),
        instruction: "Change my outfit to: a red coat".to_string(),
    }
}

#[tokio::test]
async fn test_successful_image_reply() {
    let body = r#"{"candidates":[{"content":{"parts":[{"inlineData":{"mimeType":"image/png","data":"iVBORw0KGgo="}}]},"finishReason":"STOP"}]}"#;
    let (base_url, server) = serve_once("200 OK", body.to_string()).await;

    let agent = GeminiImageAgent::new("test-key", "test-model").with_base_url(&base_url);
    let reply = agent.transform(call()).await.unwrap();
    let image = classify(reply).unwrap();
    assert_eq!(image.mime_type(), "image/png");
    assert_eq!(image.len(), 8);

    let request = server.await.unwrap();
    assert!(request.starts_with("POST /v1beta/models/test-model:generateContent?key=test-key "));
    assert!(request.contains("\"inlineData\""));
    assert!(request.contains("\"responseModalities\":[\"IMAGE\",\"TEXT\"]"));
    assert!(request.contains("Change my outfit to: a red coat"));
}

#[tokio::test]
async fn test_blocked_reply_classifies_as_blocked() {
    let body = r#"{"promptFeedback":{"blockReason":"SAFETY","blockReasonMessage":"Unsafe prompt"}}"#;
    let (base_url, server) = serve_once("200 OK", body.to_string()).await;

    let agent = GeminiImageAgent::new("k", "m").with_base_url(base_url);
    let reply = agent.transform(call()).await.unwrap();
    assert_eq!(
        classify(reply).unwrap_err(),
        EditFailure::Blocked {
            reason: "SAFETY".to_string(),
            message: Some("Unsafe prompt".to_string()),
        }
    );
    server.await.unwrap();
}

#[tokio::test]
async fn test_quota_status_is_transport_error() {
    let body = r#"{"error":{"code":429,"message":"You exceeded your current quota","status":"RESOURCE_EXHAUSTED"}}"#;
    let (base_url, server) = serve_once("429 Too Many Requests", body.to_string()).await;

    let agent = GeminiImageAgent::new("secret-key", "m").with_base_url(base_url);
    let err = agent.transform(call()).await.unwrap_err();
    assert_eq!(err.status_code, Some(429));
    assert!(err.is_quota());
    assert!(err.is_retryable);
    assert!(!err.message.contains("secret-key"));
    server.await.unwrap();
}

#[tokio::test]
async fn test_connection_refused_is_transport_error() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let agent = GeminiImageAgent::new("secret-key", "m")
        .with_base_url(format!("http://{addr}/v1beta/models"));
    let err = agent.transform(call()).await.unwrap_err();
    assert_eq!(err.status_code, None);
    assert!(err.message.starts_with("Gemini API request failed"));
    assert!(!err.message.contains("secret-key"));
}
