//! End-to-end API tests against a mocked analysis provider.

use std::time::Duration;

use axum::body::{to_bytes, Body};
use axum::http::{header, Request, StatusCode};
use axum::Router;
use futures_util::StreamExt;
use serde_json::Value;
use tokio_tungstenite::tungstenite::Message as WsMessage;
use tower::ServiceExt;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use vidova_api::{create_router, ApiConfig, AppState};

const BOUNDARY: &str = "vidova-test-boundary";

/// Mount upload, file-state and classification mocks that accept any
/// video and return a Safe verdict.
async fn mount_safe_provider(server: &MockServer) {
    Mock::given(method("POST"))
        .and(path("/upload/v1beta/files"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "file": {
                "name": "files/e2e",
                "uri": "https://provider/files/e2e",
                "mimeType": "video/mp4",
                "state": "ACTIVE"
            }
        })))
        .mount(server)
        .await;

    Mock::given(method("GET"))
        .and(path("/v1beta/files/e2e"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "name": "files/e2e",
            "uri": "https://provider/files/e2e",
            "mimeType": "video/mp4",
            "state": "ACTIVE"
        })))
        .mount(server)
        .await;

    Mock::given(method("POST"))
        .and(path("/v1beta/models/gemini-2.0-flash:generateContent"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "candidates": [{
                "content": {
                    "parts": [{
                        "text": "```json\n{\"sensitivity\": \"Safe\", \"reason\": \"nothing of note\"}\n```"
                    }]
                }
            }]
        })))
        .mount(server)
        .await;
}

/// Guards the provider env vars; concurrent tests each point the
/// analysis client at their own mock server.
static PROVIDER_ENV: std::sync::Mutex<()> = std::sync::Mutex::new(());

async fn build_app(provider_url: &str, media_root: &std::path::Path) -> Router {
    let config = ApiConfig {
        database_url: "sqlite::memory:".to_string(),
        media_root: media_root.display().to_string(),
        jwt_secret: "integration-test-secret".to_string(),
        ..ApiConfig::default()
    };

    // The client captures the base URL at construction, so the lock
    // only needs to span set_var and AppState::new.
    let (state, worker_pool) = {
        let _guard = PROVIDER_ENV.lock().unwrap();
        std::env::set_var("GEMINI_API_KEY", "test-key");
        std::env::set_var("GEMINI_BASE_URL", provider_url);
        AppState::new(config).await.expect("state")
    };
    tokio::spawn(worker_pool.run());
    create_router(state)
}

async fn json_body(response: axum::response::Response) -> Value {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

fn json_request(uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn authed_get(uri: &str, token: &str) -> Request<Body> {
    Request::builder()
        .method("GET")
        .uri(uri)
        .header(header::AUTHORIZATION, format!("Bearer {token}"))
        .body(Body::empty())
        .unwrap()
}

fn multipart_upload(token: &str, filename: &str, title: &str, data: &[u8]) -> Request<Body> {
    let mut body = Vec::new();
    body.extend_from_slice(
        format!(
            "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"title\"\r\n\r\n{title}\r\n"
        )
        .as_bytes(),
    );
    body.extend_from_slice(
        format!(
            "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"video\"; \
             filename=\"{filename}\"\r\nContent-Type: video/mp4\r\n\r\n"
        )
        .as_bytes(),
    );
    body.extend_from_slice(data);
    body.extend_from_slice(format!("\r\n--{BOUNDARY}--\r\n").as_bytes());

    Request::builder()
        .method("POST")
        .uri("/api/videos/upload")
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={BOUNDARY}"),
        )
        .header(header::AUTHORIZATION, format!("Bearer {token}"))
        .body(Body::from(body))
        .unwrap()
}

async fn register(app: &Router, username: &str, email: &str, role: Option<&str>) -> String {
    let mut body = serde_json::json!({
        "username": username,
        "email": email,
        "password": "hunter2",
    });
    if let Some(role) = role {
        body["role"] = Value::String(role.to_string());
    }
    let response = app
        .clone()
        .oneshot(json_request("/api/auth/register", body))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    json_body(response).await["token"].as_str().unwrap().to_string()
}

/// Walks the whole surface in one pass: auth, upload, the async
/// verdict landing in the listing, range streaming, and admin reset.
#[tokio::test]
async fn upload_flow_end_to_end() {
    let server = MockServer::start().await;
    mount_safe_provider(&server).await;
    let media_dir = tempfile::tempdir().unwrap();
    let app = build_app(&server.uri(), media_dir.path()).await;

    // Liveness surface
    let response = app
        .clone()
        .oneshot(Request::get("/").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    assert_eq!(&bytes[..], b"API is running");

    let response = app
        .clone()
        .oneshot(Request::get("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(json_body(response).await["status"], "healthy");

    // Listing requires a token
    let response = app
        .clone()
        .oneshot(Request::get("/api/videos").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    // Register and inspect the session
    let token = register(&app, "alice", "alice@example.com", None).await;

    let response = app
        .clone()
        .oneshot(authed_get("/api/auth/me", &token))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let me = json_body(response).await;
    assert_eq!(me["username"], "alice");
    assert!(me.get("password_hash").is_none());

    // Duplicate registration is rejected
    let response = app
        .clone()
        .oneshot(json_request(
            "/api/auth/register",
            serde_json::json!({
                "username": "alice2",
                "email": "alice@example.com",
                "password": "hunter2",
            }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    // Login round trip
    let response = app
        .clone()
        .oneshot(json_request(
            "/api/auth/login",
            serde_json::json!({ "email": "alice@example.com", "password": "hunter2" }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = app
        .clone()
        .oneshot(json_request(
            "/api/auth/login",
            serde_json::json!({ "email": "alice@example.com", "password": "wrong" }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    // Reject a non-video upload before any disk or provider work
    let response = app
        .clone()
        .oneshot(multipart_upload(&token, "notes.txt", "notes", b"plain text"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    // Accept a video; the record is created in Processing
    let video_bytes: Vec<u8> = (0..1000u32).map(|i| (i % 251) as u8).collect();
    let response = app
        .clone()
        .oneshot(multipart_upload(&token, "clip.mp4", "My clip", &video_bytes))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    let record = json_body(response).await;
    assert_eq!(record["title"], "My clip");
    assert_eq!(record["status"], "Processing");
    assert_eq!(record["sensitivity"], "Unchecked");
    let video_id = record["id"].as_str().unwrap().to_string();

    // The verdict lands asynchronously; poll the listing for it
    let mut completed = None;
    for _ in 0..100 {
        let response = app
            .clone()
            .oneshot(authed_get("/api/videos", &token))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let videos = json_body(response).await;
        let video = &videos.as_array().unwrap()[0];
        if video["status"] == "Completed" {
            completed = Some(video.clone());
            break;
        }
        tokio::time::sleep(Duration::from_millis(50)).await;
    }
    let completed = completed.expect("video never reached Completed");
    assert_eq!(completed["sensitivity"], "Safe");

    // Detail view joins the uploader
    let response = app
        .clone()
        .oneshot(authed_get(&format!("/api/videos/{video_id}"), &token))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let detail = json_body(response).await;
    assert_eq!(detail["uploader_username"], "alice");

    // Range request returns exactly the requested window
    let mut request = authed_get(&format!("/api/videos/stream/{video_id}"), &token);
    request
        .headers_mut()
        .insert(header::RANGE, "bytes=0-99".parse().unwrap());
    let response = app.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::PARTIAL_CONTENT);
    assert_eq!(
        response.headers()[header::CONTENT_RANGE],
        "bytes 0-99/1000"
    );
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    assert_eq!(bytes.len(), 100);
    assert_eq!(&bytes[..], &video_bytes[..100]);

    // Unsatisfiable range
    let mut request = authed_get(&format!("/api/videos/stream/{video_id}"), &token);
    request
        .headers_mut()
        .insert(header::RANGE, "bytes=5000-".parse().unwrap());
    let response = app.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::RANGE_NOT_SATISFIABLE);

    // No Range header streams the full file
    let response = app
        .clone()
        .oneshot(authed_get(&format!("/api/videos/stream/{video_id}"), &token))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    assert_eq!(bytes.len(), 1000);

    // Reset is admin-only
    let response = app
        .clone()
        .oneshot(
            Request::post("/api/admin/reset")
                .header(header::AUTHORIZATION, format!("Bearer {token}"))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let admin_token = register(&app, "root", "root@example.com", Some("admin")).await;
    let response = app
        .clone()
        .oneshot(
            Request::post("/api/admin/reset")
                .header(header::AUTHORIZATION, format!("Bearer {admin_token}"))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let reset = json_body(response).await;
    assert_eq!(reset["deleted_records"], 1);
    assert_eq!(reset["deleted_files"], 1);

    // Library is empty afterwards, accounts survive
    let response = app
        .clone()
        .oneshot(authed_get("/api/videos", &token))
        .await
        .unwrap();
    let videos = json_body(response).await;
    assert!(videos.as_array().unwrap().is_empty());

    let response = app.oneshot(authed_get("/api/auth/me", &token)).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

/// A client connected to /ws receives each terminal outcome as a
/// `video_processed` frame carrying the finished record.
#[tokio::test]
async fn ws_feed_pushes_video_processed_event() {
    let server = MockServer::start().await;
    mount_safe_provider(&server).await;
    let media_dir = tempfile::tempdir().unwrap();
    let app = build_app(&server.uri(), media_dir.path()).await;

    // Serve the router on a real port so a websocket can connect
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let serve_app = app.clone();
    tokio::spawn(async move {
        axum::serve(listener, serve_app).await.unwrap();
    });

    let (mut socket, _) = tokio_tungstenite::connect_async(format!("ws://{addr}/ws"))
        .await
        .expect("websocket connect");
    // Let the server register the subscription before the work starts
    tokio::time::sleep(Duration::from_millis(50)).await;

    let token = register(&app, "watcher", "watcher@example.com", None).await;
    let response = app
        .clone()
        .oneshot(multipart_upload(
            &token,
            "clip.mp4",
            "Live clip",
            b"moving pictures",
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    let video_id = json_body(response).await["id"]
        .as_str()
        .unwrap()
        .to_string();

    // First text frame is the terminal event; pings may interleave
    let frame = tokio::time::timeout(Duration::from_secs(10), async {
        loop {
            match socket.next().await {
                Some(Ok(WsMessage::Text(text))) => {
                    break serde_json::from_str::<Value>(&text).unwrap();
                }
                Some(Ok(_)) => continue,
                other => panic!("websocket ended before the event arrived: {other:?}"),
            }
        }
    })
    .await
    .expect("no event within 10s");

    assert_eq!(frame["event"], "video_processed");
    assert_eq!(frame["video"]["id"], video_id.as_str());
    assert_eq!(frame["video"]["status"], "Completed");
    assert_eq!(frame["video"]["sensitivity"], "Safe");

    socket.close(None).await.ok();
}
