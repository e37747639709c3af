#![cfg(not(target_arch = "wasm32"))]

use brick_placer::{
    PlacerError,
    config::UploadConfig,
    upload::{BrickRecord, UploadClient},
};
use tokio::{
    io::{AsyncReadExt, AsyncWriteExt},
    net::TcpListener,
    task::JoinHandle,
};

/// A captured HTTP request: request line plus body.
struct Captured {
    request_line: String,
    content_type: Option<String>,
    body: String,
}

/// Accept one connection, answer it with `status` and return what was sent.
async fn serve_once(status: &'static str, reply: &'static str) -> (String, JoinHandle<Captured>) {
    let response = format!(
        "HTTP/1.1 {}\r\ncontent-type: text/plain\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{}",
        status,
        reply.len(),
        reply
    );
    serve_raw(response).await
}

/// Accept one connection and write `response` verbatim.
async fn serve_raw(response: String) -> (String, JoinHandle<Captured>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let base_url = format!("http://{}", listener.local_addr().unwrap());

    let handle = tokio::spawn(async move {
        let (mut socket, _) = listener.accept().await.unwrap();
        let mut raw = Vec::new();
        let mut buf = [0u8; 1024];
        let (head_len, content_length) = loop {
            let n = socket.read(&mut buf).await.unwrap();
            assert!(n > 0, "connection closed before the request was complete");
            raw.extend_from_slice(&buf[..n]);
            if let Some(end) = raw.windows(4).position(|w| w == b"\r\n\r\n") {
                let head = String::from_utf8_lossy(&raw[..end]).to_string();
                let length = header(&head, "content-length")
                    .map(|v| v.parse::<usize>().unwrap())
                    .unwrap_or(0);
                break (end + 4, length);
            }
        };
        while raw.len() < head_len + content_length {
            let n = socket.read(&mut buf).await.unwrap();
            raw.extend_from_slice(&buf[..n]);
        }

        let head = String::from_utf8_lossy(&raw[..head_len]).to_string();
        socket.write_all(response.as_bytes()).await.unwrap();
        socket.shutdown().await.unwrap();

        Captured {
            request_line: head.lines().next().unwrap_or_default().to_string(),
            content_type: header(&head, "content-type"),
            body: String::from_utf8_lossy(&raw[head_len..head_len + content_length]).to_string(),
        }
    });

    (base_url, handle)
}

fn header(head: &str, name: &str) -> Option<String> {
    head.lines().skip(1).find_map(|line| {
        let (key, value) = line.split_once(':')?;
        key.trim()
            .eq_ignore_ascii_case(name)
            .then(|| value.trim().to_string())
    })
}

fn client_for(base_url: String) -> UploadClient {
    UploadClient::new(&UploadConfig {
        base_url: Some(base_url),
        ..UploadConfig::default()
    })
    .unwrap()
}

#[tokio::test]
async fn posts_records_as_json_array_to_the_upload_path() {
    let (base_url, server) = serve_once("200 OK", "stored").await;
    let records = vec![
        BrickRecord {
            x: -1.0,
            y: 1.0,
            z: 0.0,
            rotated: false,
        },
        BrickRecord {
            x: 0.5,
            y: 2.0,
            z: 1.5,
            rotated: true,
        },
    ];

    let receipt = client_for(base_url).upload(&records).await.unwrap();
    assert_eq!(receipt.status, 200);
    assert_eq!(receipt.body, "stored");

    let captured = server.await.unwrap();
    assert_eq!(captured.request_line, "POST /api/upload HTTP/1.1");
    assert_eq!(captured.content_type.as_deref(), Some("application/json"));
    let sent: serde_json::Value = serde_json::from_str(&captured.body).unwrap();
    assert_eq!(
        sent,
        serde_json::json!([
            { "x": -1.0, "y": 1.0, "z": 0.0, "rotated": false },
            { "x": 0.5, "y": 2.0, "z": 1.5, "rotated": true },
        ])
    );
}

#[tokio::test]
async fn empty_layout_is_still_posted() {
    let (base_url, server) = serve_once("201 Created", "").await;
    let receipt = client_for(base_url).upload(&[]).await.unwrap();
    assert_eq!(receipt.status, 201);
    assert_eq!(server.await.unwrap().body, "[]");
}

#[tokio::test]
async fn error_status_is_reported_with_the_response_body() {
    let (base_url, server) = serve_once("500 Internal Server Error", "disk full").await;
    let err = client_for(base_url).upload(&[]).await.unwrap_err();
    match err {
        PlacerError::Rejected { status, body } => {
            assert_eq!(status, 500);
            assert_eq!(body, "disk full");
        }
        other => panic!("unexpected error: {}", other),
    }
    server.await.unwrap();
}

#[tokio::test]
async fn error_status_wins_over_a_truncated_body() {
    // Announces more body than it sends, then hangs up.
    let response =
        "HTTP/1.1 503 Service Unavailable\r\ncontent-length: 100\r\nconnection: close\r\n\r\npartial"
            .to_string();
    let (base_url, server) = serve_raw(response).await;
    let err = client_for(base_url).upload(&[]).await.unwrap_err();
    assert!(
        matches!(err, PlacerError::Rejected { status: 503, .. }),
        "{}",
        err
    );
    server.await.unwrap();
}

#[tokio::test]
async fn unreachable_service_is_a_transport_error() {
    // Bind and drop to get a port nobody listens on.
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let base_url = format!("http://{}", listener.local_addr().unwrap());
    drop(listener);

    let err = client_for(base_url).upload(&[]).await.unwrap_err();
    assert!(matches!(err, PlacerError::Transport(_)), "{}", err);
}
