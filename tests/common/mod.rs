#![allow(dead_code)]

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::body::Body;
use axum::extract::State;
use axum::http::{header, HeaderMap, Request, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use http_body_util::BodyExt;
use serde_json::{json, Value};
use tokio::net::TcpListener;
use url::Url;

use guestbook::models::{CreatedAt, Entry, NewEntry};
use guestbook::store::{EntryStore, StoreError};

/// In-memory `EntryStore` that records every call.
#[derive(Default)]
pub struct MemoryStore {
    entries: Mutex<Vec<Entry>>,
    submitted: Mutex<Vec<NewEntry>>,
    fetches: AtomicUsize,
    reject_with: Mutex<Option<String>>,
    fail_reads: AtomicBool,
    fail_writes: AtomicBool,
}

impl MemoryStore {
    pub fn with_entries(entries: Vec<Entry>) -> Self {
        Self {
            entries: Mutex::new(entries),
            ..Self::default()
        }
    }

    pub fn submitted(&self) -> Vec<NewEntry> {
        self.submitted.lock().unwrap().clone()
    }

    pub fn fetches(&self) -> usize {
        self.fetches.load(Ordering::SeqCst)
    }

    /// Make subsequent writes fail with a backend-provided message.
    pub fn reject_with(&self, message: Option<&str>) {
        *self.reject_with.lock().unwrap() = message.map(str::to_string);
    }

    pub fn fail_reads(&self, fail: bool) {
        self.fail_reads.store(fail, Ordering::SeqCst);
    }

    pub fn fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }
}

#[async_trait]
impl EntryStore for MemoryStore {
    async fn fetch_entries(&self) -> Result<Vec<Entry>, StoreError> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        if self.fail_reads.load(Ordering::SeqCst) {
            return Err(StoreError::Status(StatusCode::SERVICE_UNAVAILABLE));
        }
        Ok(self.entries.lock().unwrap().clone())
    }

    async fn submit_entry(&self, entry: &NewEntry) -> Result<(), StoreError> {
        self.submitted.lock().unwrap().push(entry.clone());

        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(StoreError::Status(StatusCode::BAD_GATEWAY));
        }
        if let Some(message) = self.reject_with.lock().unwrap().clone() {
            return Err(StoreError::Rejected {
                status: StatusCode::BAD_REQUEST,
                message,
            });
        }

        self.entries.lock().unwrap().push(Entry {
            name: entry.name.clone(),
            message: entry.message.clone(),
            created_at: CreatedAt::Text(chrono::Utc::now().to_rfc3339()),
        });
        Ok(())
    }
}

pub fn entry(name: &str, message: &str) -> Entry {
    Entry {
        name: name.to_string(),
        message: message.to_string(),
        created_at: CreatedAt::Text("2025-11-03T12:34:56".to_string()),
    }
}

pub struct TestApp {
    pub router: Router,
    pub store: Arc<MemoryStore>,
}

impl TestApp {
    pub fn new() -> Self {
        Self::with_store(MemoryStore::default())
    }

    pub fn with_store(store: MemoryStore) -> Self {
        let store = Arc::new(store);
        let router = guestbook::build_app(store.clone());
        Self { router, store }
    }

    /// Send a request through the app and return the response.
    pub async fn request(&self, req: Request<Body>) -> Response {
        send(&self.router, req).await
    }

    pub async fn get(&self, uri: &str) -> Response {
        get_page(&self.router, uri).await
    }

    pub async fn post_form(&self, uri: &str, body: &str) -> Response {
        post_form(&self.router, uri, body).await
    }
}

pub async fn send(router: &Router, req: Request<Body>) -> Response {
    tower::ServiceExt::oneshot(router.clone(), req)
        .await
        .unwrap()
}

pub async fn get_page(router: &Router, uri: &str) -> Response {
    let req = Request::builder().uri(uri).body(Body::empty()).unwrap();
    send(router, req).await
}

/// Send a POST form request.
pub async fn post_form(router: &Router, uri: &str, body: &str) -> Response {
    let req = Request::builder()
        .uri(uri)
        .method("POST")
        .header("content-type", "application/x-www-form-urlencoded")
        .body(Body::from(body.to_string()))
        .unwrap();
    send(router, req).await
}

/// Read the full response body as a String.
pub async fn body_string(resp: Response) -> String {
    let bytes = resp.into_body().collect().await.unwrap().to_bytes();
    String::from_utf8(bytes.to_vec()).unwrap()
}

/// Assert that a response is a redirect to the given location.
pub fn assert_redirect(resp: &Response, expected_location: &str) {
    assert!(
        resp.status().is_redirection(),
        "Expected redirect, got {}",
        resp.status()
    );
    let location = resp
        .headers()
        .get("location")
        .expect("Redirect should have location header")
        .to_str()
        .unwrap();
    assert_eq!(location, expected_location);
}

/// A write request as seen by the stub backend.
#[derive(Debug, Clone)]
pub struct RecordedPost {
    pub content_type: Option<String>,
    pub body: Value,
}

/// Stub of the external backend, behaving like the reference Flask app
/// except that new entries are appended rather than prepended.
#[derive(Default)]
pub struct Backend {
    pub entries: Mutex<Vec<Value>>,
    pub posts: Mutex<Vec<RecordedPost>>,
    pub fail_reads: AtomicBool,
    /// Forced response for the next writes: status and raw body.
    pub reject: Mutex<Option<(StatusCode, String)>>,
}

impl Backend {
    pub fn reject(&self, status: StatusCode, body: &str) {
        *self.reject.lock().unwrap() = Some((status, body.to_string()));
    }

    pub fn posts(&self) -> Vec<RecordedPost> {
        self.posts.lock().unwrap().clone()
    }
}

async fn backend_list(State(backend): State<Arc<Backend>>) -> Response {
    if backend.fail_reads.load(Ordering::SeqCst) {
        return (StatusCode::INTERNAL_SERVER_ERROR, "boom").into_response();
    }
    Json(Value::Array(backend.entries.lock().unwrap().clone())).into_response()
}

async fn backend_create(
    State(backend): State<Arc<Backend>>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    let content_type = headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);
    backend.posts.lock().unwrap().push(RecordedPost {
        content_type,
        body: body.clone(),
    });

    if let Some((status, raw)) = backend.reject.lock().unwrap().clone() {
        return (status, [(header::CONTENT_TYPE, "application/json")], raw).into_response();
    }

    let name = body["name"].as_str().unwrap_or("Anonymous").trim().to_string();
    let message = body["message"].as_str().unwrap_or("").trim().to_string();
    if message.is_empty() {
        return (StatusCode::BAD_REQUEST, Json(json!({"error": "Message is required"}))).into_response();
    }

    let now = chrono::Utc::now();
    let created = json!({
        "id": now.timestamp_millis(),
        "name": name,
        "message": message,
        "createdAt": now.naive_utc().format("%Y-%m-%dT%H:%M:%S%.6f").to_string(),
    });
    backend.entries.lock().unwrap().push(created.clone());
    (StatusCode::CREATED, Json(created)).into_response()
}

/// Serve a stub backend on an ephemeral port and return its base URL.
pub async fn spawn_backend(backend: Arc<Backend>) -> Url {
    let router = Router::new()
        .route("/api/entries", get(backend_list).post(backend_create))
        .with_state(backend);

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });

    Url::parse(&format!("http://{addr}")).unwrap()
}
