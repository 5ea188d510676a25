//! API integration tests against in-memory backends.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use serde_json::Value;
use tower::ServiceExt;

use vup_api::{create_router, ApiConfig, AppState, RecordStore, StorageBackend};
use vup_firestore::InMemoryVideoRepository;
use vup_media::{MediaResult, ToolCommand, ToolOutput, ToolRunner};
use vup_storage::InMemoryObjectStore;
use vup_worker::{
    IntakeService, PipelineContext, PipelineCoordinator, WorkerConfig, WorkerPool,
};

const BOUNDARY: &str = "vup-test-boundary";

/// Every tool invocation fails, so background runs end quickly.
struct FailingRunner;

#[async_trait]
impl ToolRunner for FailingRunner {
    async fn run(&self, _cmd: &ToolCommand) -> MediaResult<ToolOutput> {
        Ok(ToolOutput {
            exit_code: Some(1),
            ..Default::default()
        })
    }
}

struct TestApp {
    router: Router,
    pool: Arc<WorkerPool>,
    _work_dir: tempfile::TempDir,
}

fn test_app() -> TestApp {
    let work_dir = tempfile::tempdir().unwrap();
    let worker = WorkerConfig {
        pool_size: 2,
        work_dir: work_dir.path().to_path_buf(),
        ..Default::default()
    };
    let ctx = PipelineContext::new(
        Arc::new(FailingRunner),
        Arc::new(InMemoryObjectStore::new()),
        Arc::new(InMemoryVideoRepository::new()),
        worker,
    );
    let pool = Arc::new(WorkerPool::start(2, PipelineCoordinator::new(ctx.clone())));

    let config = ApiConfig {
        storage_backend: StorageBackend::Memory,
        record_store: RecordStore::Memory,
        metrics_enabled: false,
        ..Default::default()
    };
    let state = AppState::new(config, IntakeService::new(ctx, pool.clone()));

    TestApp {
        router: create_router(state, None),
        pool,
        _work_dir: work_dir,
    }
}

/// Encode an optional `(filename, bytes)` file part plus text fields as
/// multipart/form-data.
fn multipart(file: Option<(&str, Vec<u8>)>, fields: &[(&str, &str)]) -> Body {
    let mut body = Vec::new();
    if let Some((filename, bytes)) = file {
        body.extend_from_slice(
            format!(
                "--{}\r\nContent-Disposition: form-data; name=\"file\"; filename=\"{}\"\r\n\
                 Content-Type: application/octet-stream\r\n\r\n",
                BOUNDARY, filename
            )
            .as_bytes(),
        );
        body.extend_from_slice(&bytes);
        body.extend_from_slice(b"\r\n");
    }
    for (name, value) in fields {
        body.extend_from_slice(
            format!(
                "--{}\r\nContent-Disposition: form-data; name=\"{}\"\r\n\r\n{}\r\n",
                BOUNDARY, name, value
            )
            .as_bytes(),
        );
    }
    body.extend_from_slice(format!("--{}--\r\n", BOUNDARY).as_bytes());
    Body::from(body)
}

fn upload(body: Body) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/api/videos")
        .header(
            "content-type",
            format!("multipart/form-data; boundary={}", BOUNDARY),
        )
        .body(body)
        .unwrap()
}

fn valid_upload() -> Request<Body> {
    upload(multipart(
        Some(("holiday.mp4", vec![1u8; 32])),
        &[
            ("title", "Holiday"),
            ("owner_id", "owner-1"),
            ("visibility", "private"),
        ],
    ))
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

async fn body_json(response: axum::response::Response) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn test_health_endpoint() {
    let app = test_app();
    let response = app.router.oneshot(get("/health")).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert!(response.headers().get("x-request-id").is_some());
    assert_eq!(body_json(response).await["status"], "healthy");
}

#[tokio::test]
async fn test_ready_reflects_pool_state() {
    let app = test_app();

    let response = app.router.clone().oneshot(get("/ready")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["status"], "ready");

    app.pool.shutdown(Duration::from_secs(1)).await;

    let response = app.router.oneshot(get("/ready")).await.unwrap();
    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    let json = body_json(response).await;
    assert_eq!(json["checks"]["workers"]["status"], "error");
}

#[tokio::test]
async fn test_upload_returns_created_video() {
    let app = test_app();
    let response = app.router.oneshot(valid_upload()).await.unwrap();

    assert_eq!(response.status(), StatusCode::CREATED);
    let json = body_json(response).await;
    assert_eq!(json["status"], "uploaded");
    assert_eq!(json["title"], "Holiday");
    assert_eq!(json["visibility"], "private");
    assert_eq!(json["original_filename"], "holiday.mp4");
    assert!(json["source_key"].as_str().unwrap().starts_with("video_"));
    assert_eq!(json["segments"].as_array().unwrap().len(), 0);
}

#[tokio::test]
async fn test_upload_rejects_unknown_extension() {
    let app = test_app();
    let response = app
        .router
        .oneshot(upload(multipart(
            Some(("notes.txt", b"hello".to_vec())),
            &[("title", "Notes"), ("owner_id", "owner-1")],
        )))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["detail"], "Invalid video file format");
}

#[tokio::test]
async fn test_upload_requires_file() {
    let app = test_app();
    let response = app
        .router
        .oneshot(upload(multipart(
            None,
            &[("title", "No file"), ("owner_id", "owner-1")],
        )))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["detail"], "Video file is required");
}

#[tokio::test]
async fn test_upload_rejects_unknown_visibility() {
    let app = test_app();
    let response = app
        .router
        .oneshot(upload(multipart(
            Some(("a.mp4", vec![1u8; 4])),
            &[
                ("title", "Clip"),
                ("owner_id", "owner-1"),
                ("visibility", "secret"),
            ],
        )))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_get_delete_lifecycle() {
    let app = test_app();

    let created = body_json(app.router.clone().oneshot(valid_upload()).await.unwrap()).await;
    let id = created["id"].as_str().unwrap().to_string();
    let uri = format!("/api/videos/{}", id);

    let response = app.router.clone().oneshot(get(&uri)).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["id"], id.as_str());

    let response = app
        .router
        .clone()
        .oneshot(
            Request::builder()
                .method("DELETE")
                .uri(&uri)
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    // The background run finishing does not bring the video back
    app.pool.shutdown(Duration::from_secs(5)).await;
    let response = app.router.oneshot(get(&uri)).await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_unknown_video_is_not_found() {
    let app = test_app();
    let response = app.router.oneshot(get("/api/videos/missing")).await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert!(body_json(response).await["detail"].is_string());
}

#[tokio::test]
async fn test_upload_after_shutdown_is_unavailable() {
    let app = test_app();
    app.pool.shutdown(Duration::from_secs(1)).await;

    let response = app.router.oneshot(valid_upload()).await.unwrap();
    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
}
