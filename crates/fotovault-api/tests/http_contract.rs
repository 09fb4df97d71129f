//! Contract tests for [`ApiClient`] against an in-process album server.
//!
//! The double implements the five endpoints with the real wire shapes and
//! records what it saw (bearer headers, multipart fields, decoded filenames)
//! so the tests can assert on the requests as well as the responses.

use std::sync::{Arc, Mutex};

use axum::extract::{Multipart, Path, State};
use axum::http::{header, HeaderMap, StatusCode};
use axum::response::IntoResponse;
use axum::routing::{delete, get, post};
use axum::{Json, Router};
use serde_json::json;

use fotovault_api::{AlbumApi, ApiClient, ApiError, Url};

#[derive(Default)]
struct Recorded {
    auth_headers: Vec<Option<String>>,
    uploads: Vec<(String, String, usize)>,
    deletes: Vec<String>,
}

type Shared = Arc<Mutex<Recorded>>;

fn auth_header(headers: &HeaderMap) -> Option<String> {
    headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string)
}

async fn register(Json(body): Json<serde_json::Value>) -> impl IntoResponse {
    if body["username"] == "taken" {
        return (
            StatusCode::CONFLICT,
            Json(json!({ "message": "username taken" })),
        );
    }
    (StatusCode::OK, Json(json!({ "message": "registered" })))
}

async fn login(Json(body): Json<serde_json::Value>) -> impl IntoResponse {
    if body["username"] == "alice" && body["password"] == "secret" {
        (
            StatusCode::OK,
            Json(json!({ "access_token": "abc", "message": "ok" })),
        )
    } else {
        (
            StatusCode::UNAUTHORIZED,
            Json(json!({ "message": "bad credentials" })),
        )
    }
}

async fn list_files(State(state): State<Shared>, headers: HeaderMap) -> impl IntoResponse {
    let auth = auth_header(&headers);
    state.lock().unwrap().auth_headers.push(auth.clone());

    match auth.as_deref() {
        Some("Bearer abc") => (
            StatusCode::OK,
            Json(json!({
                "files": [
                    {
                        "filename": "IMG_1.jpg",
                        "size": 2048,
                        "upload_time": 1_700_000_000.0,
                        "preview_url": "/previews/aaa.jpg"
                    },
                    {
                        "filename": "IMG_2.jpg",
                        "size": 4096,
                        "upload_time": 1_700_000_100.0,
                        "preview_url": "/previews/bbb.jpg"
                    }
                ]
            })),
        )
            .into_response(),
        // A 2xx that is not JSON at all, to exercise decode failures.
        Some("Bearer garbled") => (StatusCode::OK, "definitely not json").into_response(),
        _ => (
            StatusCode::UNAUTHORIZED,
            Json(json!({ "message": "token expired" })),
        )
            .into_response(),
    }
}

async fn upload(
    State(state): State<Shared>,
    headers: HeaderMap,
    mut multipart: Multipart,
) -> impl IntoResponse {
    state.lock().unwrap().auth_headers.push(auth_header(&headers));

    while let Some(field) = multipart.next_field().await.unwrap() {
        let name = field.name().unwrap_or_default().to_string();
        let filename = field.file_name().unwrap_or_default().to_string();
        let bytes = field.bytes().await.unwrap();
        state
            .lock()
            .unwrap()
            .uploads
            .push((name, filename.clone(), bytes.len()));

        return (
            StatusCode::OK,
            Json(json!({
                "message": "uploaded",
                "filename": filename,
                "preview_url": format!("/previews/{filename}")
            })),
        );
    }

    (
        StatusCode::BAD_REQUEST,
        Json(json!({ "message": "no file field" })),
    )
}

async fn delete_file(
    State(state): State<Shared>,
    Path(filename): Path<String>,
) -> impl IntoResponse {
    state.lock().unwrap().deletes.push(filename.clone());

    if filename == "missing.jpg" {
        return (
            StatusCode::NOT_FOUND,
            Json(json!({ "message": "file not found" })),
        );
    }
    (
        StatusCode::OK,
        Json(json!({ "message": "deleted", "filename": filename })),
    )
}

/// Bind the double on an ephemeral port and return its base URL plus the
/// recording handle.
async fn spawn_server() -> (Url, Shared) {
    let recorded: Shared = Arc::default();

    let app = Router::new()
        .route("/api/register", post(register))
        .route("/api/login", post(login))
        .route("/api/files", get(list_files))
        .route("/api/upload", post(upload))
        .route("/api/files/{filename}", delete(delete_file))
        .with_state(recorded.clone());

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    let base = Url::parse(&format!("http://{addr}/api")).unwrap();
    (base, recorded)
}

fn client_for(base: &Url) -> ApiClient {
    let mut image_base = base.clone();
    image_base.set_path("/");
    ApiClient::new(base.clone(), image_base).unwrap()
}

#[tokio::test]
async fn unauthenticated_calls_never_touch_the_network() {
    // Nothing listens here; if a request were attempted we would see a
    // Transport error instead of Unauthenticated.
    let base = Url::parse("http://127.0.0.1:9/api").unwrap();
    let client = client_for(&base);

    assert!(matches!(
        client.list_files().await,
        Err(ApiError::Unauthenticated)
    ));
    assert!(matches!(
        client.upload_file(vec![1, 2, 3], "a.jpg").await,
        Err(ApiError::Unauthenticated)
    ));
    assert!(matches!(
        client.delete_file("a.jpg").await,
        Err(ApiError::Unauthenticated)
    ));
}

#[tokio::test]
async fn connection_failure_is_a_transport_error() {
    let base = Url::parse("http://127.0.0.1:9/api").unwrap();
    let client = client_for(&base);
    client.set_token(Some("abc".into()));

    assert!(matches!(
        client.list_files().await,
        Err(ApiError::Transport(_))
    ));
}

#[tokio::test]
async fn login_stores_the_token_and_list_sends_it_as_bearer() {
    let (base, recorded) = spawn_server().await;
    let client = client_for(&base);

    let message = client.login("alice", "secret").await.unwrap();
    assert_eq!(message, "ok");
    assert!(client.has_token());

    let files = client.list_files().await.unwrap();
    assert_eq!(files.len(), 2);
    assert_eq!(files[0].filename, "IMG_1.jpg");
    assert_eq!(files[0].size, 2048);
    assert_eq!(files[1].preview_url, "/previews/bbb.jpg");

    let seen = recorded.lock().unwrap();
    assert_eq!(seen.auth_headers, vec![Some("Bearer abc".to_string())]);
}

#[tokio::test]
async fn bad_credentials_surface_the_server_message() {
    let (base, _recorded) = spawn_server().await;
    let client = client_for(&base);

    match client.login("alice", "wrong").await {
        Err(ApiError::Server { status, message }) => {
            assert_eq!(status, 401);
            assert_eq!(message, "bad credentials");
        }
        other => panic!("expected server error, got {other:?}"),
    }
    assert!(!client.has_token());
}

#[tokio::test]
async fn expired_token_yields_a_server_error_with_the_message() {
    let (base, _recorded) = spawn_server().await;
    let client = client_for(&base);
    client.set_token(Some("stale".into()));

    match client.list_files().await {
        Err(ApiError::Server { status, message }) => {
            assert_eq!(status, 401);
            assert_eq!(message, "token expired");
        }
        other => panic!("expected server error, got {other:?}"),
    }
}

#[tokio::test]
async fn undecodable_success_body_is_a_server_error() {
    let (base, _recorded) = spawn_server().await;
    let client = client_for(&base);
    client.set_token(Some("garbled".into()));

    match client.list_files().await {
        Err(ApiError::Server { status, message }) => {
            assert_eq!(status, 200);
            assert!(message.starts_with("malformed response"));
        }
        other => panic!("expected server error, got {other:?}"),
    }
}

#[tokio::test]
async fn upload_sends_a_multipart_file_field() {
    let (base, recorded) = spawn_server().await;
    let client = client_for(&base);
    client.set_token(Some("abc".into()));

    let bytes = vec![0xFFu8; 512];
    let response = client.upload_file(bytes, "IMG_123_1.jpg").await.unwrap();
    assert_eq!(response.filename, "IMG_123_1.jpg");
    assert_eq!(response.preview_url, "/previews/IMG_123_1.jpg");

    let seen = recorded.lock().unwrap();
    assert_eq!(
        seen.uploads,
        vec![("file".to_string(), "IMG_123_1.jpg".to_string(), 512)]
    );
    assert_eq!(seen.auth_headers, vec![Some("Bearer abc".to_string())]);
}

#[tokio::test]
async fn delete_escapes_the_filename_in_the_path() {
    let (base, recorded) = spawn_server().await;
    let client = client_for(&base);
    client.set_token(Some("abc".into()));

    let message = client.delete_file("my photo.jpg").await.unwrap();
    assert_eq!(message, "deleted");

    // The server decodes the escaped segment back to the original name.
    let seen = recorded.lock().unwrap();
    assert_eq!(seen.deletes, vec!["my photo.jpg".to_string()]);
}

#[tokio::test]
async fn delete_of_a_missing_file_reports_the_server_message() {
    let (base, _recorded) = spawn_server().await;
    let client = client_for(&base);
    client.set_token(Some("abc".into()));

    match client.delete_file("missing.jpg").await {
        Err(ApiError::Server { status, message }) => {
            assert_eq!(status, 404);
            assert_eq!(message, "file not found");
        }
        other => panic!("expected server error, got {other:?}"),
    }
}

#[tokio::test]
async fn register_conflict_surfaces_the_server_message() {
    let (base, _recorded) = spawn_server().await;
    let client = client_for(&base);

    assert_eq!(client.register("bob", "pw").await.unwrap(), "registered");

    match client.register("taken", "pw").await {
        Err(ApiError::Server { status, message }) => {
            assert_eq!(status, 409);
            assert_eq!(message, "username taken");
        }
        other => panic!("expected server error, got {other:?}"),
    }
}
