//! Gemini client against a local canned HTTP server.

use cardputer_ecu::bundle::{ApiError, BundleGenerator, GeminiClient, ProjectBundle};
use cardputer_ecu::config::GeneratorConfig;
use serde_json::{json, Value};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use tokio::task::JoinHandle;

/// Serve one request with `status` and `body`; yields the raw request text
async fn serve_once(status: &'static str, body: Value) -> (String, JoinHandle<String>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let endpoint = format!("http://{}/v1beta", listener.local_addr().unwrap());

    let handle = tokio::spawn(async move {
        let (mut socket, _) = listener.accept().await.unwrap();
        let request = read_request(&mut socket).await;

        let body = body.to_string();
        let response = format!(
            "HTTP/1.1 {status}\r\nContent-Type: application/json\r\n\
             Content-Length: {}\r\nConnection: close\r\n\r\n{body}",
            body.len()
        );
        socket.write_all(response.as_bytes()).await.unwrap();
        socket.shutdown().await.ok();
        request
    });

    (endpoint, handle)
}

async fn read_request(socket: &mut tokio::net::TcpStream) -> String {
    let mut data = Vec::new();
    let mut buf = [0u8; 4096];
    loop {
        let n = socket.read(&mut buf).await.unwrap();
        if n == 0 {
            break;
        }
        data.extend_from_slice(&buf[..n]);

        let text = String::from_utf8_lossy(&data);
        if let Some(header_end) = text.find("\r\n\r\n") {
            let content_length = text[..header_end]
                .lines()
                .find_map(|l| {
                    let (name, value) = l.split_once(':')?;
                    name.eq_ignore_ascii_case("content-length")
                        .then(|| value.trim().parse::<usize>().ok())
                        .flatten()
                })
                .unwrap_or(0);
            if data.len() >= header_end + 4 + content_length {
                break;
            }
        }
    }
    String::from_utf8_lossy(&data).into_owned()
}

fn config(endpoint: String, key_env: &str) -> GeneratorConfig {
    GeneratorConfig {
        endpoint,
        model: "test-model".to_string(),
        api_key_env: key_env.to_string(),
        timeout_secs: 10,
        ..Default::default()
    }
}

fn sample() -> ProjectBundle {
    ProjectBundle {
        ino: "#include <M5Cardputer.h>\nvoid setup() {}\nvoid loop() {}\n".to_string(),
        platformio: "[env:m5stack-stamps3]\nlib_deps = m5stack/M5Cardputer\n".to_string(),
        workflow: "name: PlatformIO CI\non: [push]\n".to_string(),
    }
}

#[tokio::test]
async fn generates_bundle_from_candidate_text() {
    std::env::set_var("CARDPUTER_TEST_KEY_OK", "secret-key");
    let text = serde_json::to_string(&sample()).unwrap();
    let (endpoint, server) = serve_once(
        "200 OK",
        json!({ "candidates": [{ "content": { "role": "model", "parts": [{ "text": text }] } }] }),
    )
    .await;

    let client = GeminiClient::from_config(&config(endpoint, "CARDPUTER_TEST_KEY_OK")).unwrap();
    let bundle = client.generate("M5Stack Cardputer").await.unwrap();
    assert_eq!(bundle, sample());

    let request = server.await.unwrap();
    assert!(request.starts_with("POST /v1beta/models/test-model:generateContent"));
    assert!(request.to_ascii_lowercase().contains("x-goog-api-key: secret-key"));
    assert!(request.contains("\"responseMimeType\":\"application/json\""));
    assert!(request.contains("M5Stack Cardputer"));
}

#[tokio::test]
async fn server_error_message_is_reported() {
    std::env::set_var("CARDPUTER_TEST_KEY_DENIED", "bad-key");
    let (endpoint, server) = serve_once(
        "403 Forbidden",
        json!({ "error": { "code": 403, "message": "API key not valid" } }),
    )
    .await;

    let client = GeminiClient::from_config(&config(endpoint, "CARDPUTER_TEST_KEY_DENIED")).unwrap();
    let err = client.generate("M5Stack Cardputer").await.unwrap_err();
    assert!(matches!(err, ApiError::Server(403, ref m) if m == "API key not valid"));
    server.await.unwrap();
}

#[tokio::test]
async fn incomplete_bundle_is_rejected() {
    std::env::set_var("CARDPUTER_TEST_KEY_PARTIAL", "secret-key");
    let (endpoint, server) = serve_once(
        "200 OK",
        json!({ "candidates": [{ "content": { "parts": [{ "text": "{\"ino\":\"x\"}" }] } }] }),
    )
    .await;

    let client =
        GeminiClient::from_config(&config(endpoint, "CARDPUTER_TEST_KEY_PARTIAL")).unwrap();
    let err = client.generate("M5Stack Cardputer").await.unwrap_err();
    assert!(matches!(err, ApiError::Schema(_)));
    server.await.unwrap();
}

#[tokio::test]
async fn unreachable_endpoint_is_request_error() {
    std::env::set_var("CARDPUTER_TEST_KEY_OFFLINE", "secret-key");
    // Bind then drop so nothing is listening on the port
    let addr = TcpListener::bind("127.0.0.1:0").await.unwrap().local_addr().unwrap();

    let offline = config(format!("http://{addr}"), "CARDPUTER_TEST_KEY_OFFLINE");
    let client = GeminiClient::from_config(&offline).unwrap();
    let err = client.generate("M5Stack Cardputer").await.unwrap_err();
    assert!(matches!(err, ApiError::Request(_)));
}
