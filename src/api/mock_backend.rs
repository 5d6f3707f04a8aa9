//! In-process stand-in for the REST backend and the object store, for client tests.

use axum::body::Bytes;
use axum::extract::{Path, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post, put};
use axum::{Json, Router};
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

#[derive(Clone, Debug, PartialEq)]
pub(crate) struct StoredObject {
    pub content_type: String,
    pub bytes: Vec<u8>,
}

#[derive(Clone)]
pub(crate) struct MockBackend {
    base_url: String,
    banners: Arc<Mutex<Vec<Value>>>,
    pages: Arc<Mutex<HashMap<String, Value>>>,
    navigation: Arc<Mutex<Value>>,
    objects: Arc<Mutex<HashMap<String, StoredObject>>>,
    next_id: Arc<AtomicUsize>,
}

fn ok(data: Value) -> Json<Value> {
    Json(json!({"success": true, "data": data}))
}

fn missing() -> Response {
    (
        StatusCode::NOT_FOUND,
        Json(json!({"success": false, "message": "Not found"})),
    )
        .into_response()
}

impl MockBackend {
    pub const TOKEN: &'static str = "secret";

    pub async fn start() -> Self {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("bind mock backend");
        let addr = listener.local_addr().expect("mock backend address");

        let backend = Self {
            base_url: format!("http://{addr}/api"),
            banners: Arc::default(),
            pages: Arc::default(),
            navigation: Arc::new(Mutex::new(json!([]))),
            objects: Arc::default(),
            next_id: Arc::new(AtomicUsize::new(1)),
        };

        let app = Router::new()
            .route("/api/banner", get(list_banners).post(create_banner))
            .route(
                "/api/banner/:id",
                get(get_banner).put(update_banner).delete(delete_banner),
            )
            .route("/api/council", post(create_council))
            .route("/api/council/title/:title", get(council_by_title))
            .route("/api/onlineApply", get(list_online_apply))
            .route("/api/onlineApply/step/:id", put(update_step))
            .route("/api/navigation", get(get_navigation).put(put_navigation))
            .route("/api/upload/presign", post(presign))
            .route("/bucket/:name", put(put_object))
            .route("/api/:page", get(get_page).post(put_page).put(put_page))
            .with_state(backend.clone());

        tokio::spawn(async move {
            axum::serve(listener, app).await.expect("mock backend crashed");
        });

        backend
    }

    pub fn base_url(&self) -> String {
        self.base_url.clone()
    }

    pub fn object(&self, name: &str) -> Option<StoredObject> {
        self.objects.lock().ok()?.get(name).cloned()
    }
}

async fn list_banners(State(b): State<MockBackend>) -> Json<Value> {
    ok(Value::Array(b.banners.lock().unwrap().clone()))
}

async fn get_banner(State(b): State<MockBackend>, Path(id): Path<String>) -> Response {
    let banners = b.banners.lock().unwrap();
    match banners.iter().find(|v| v["_id"] == id.as_str()) {
        Some(v) => ok(v.clone()).into_response(),
        None => missing(),
    }
}

async fn create_banner(State(b): State<MockBackend>, Json(mut body): Json<Value>) -> Json<Value> {
    let id = format!("b{}", b.next_id.fetch_add(1, Ordering::SeqCst));
    body["_id"] = json!(id);
    b.banners.lock().unwrap().push(body.clone());
    ok(body)
}

async fn update_banner(
    State(b): State<MockBackend>,
    Path(id): Path<String>,
    Json(mut body): Json<Value>,
) -> Response {
    let mut banners = b.banners.lock().unwrap();
    let Some(slot) = banners.iter_mut().find(|v| v["_id"] == id.as_str()) else {
        return missing();
    };
    body["_id"] = json!(id);
    *slot = body.clone();
    ok(body).into_response()
}

async fn delete_banner(State(b): State<MockBackend>, Path(id): Path<String>) -> Json<Value> {
    b.banners.lock().unwrap().retain(|v| v["_id"] != id.as_str());
    ok(json!({"deleted": id}))
}

async fn create_council(Json(body): Json<Value>) -> Json<Value> {
    if body["title"] == "Duplicate" {
        return Json(json!({"success": false, "message": "Title already exists"}));
    }
    ok(body)
}

async fn council_by_title(Path(title): Path<String>) -> Response {
    match title.as_str() {
        "Advisory Council" => ok(json!({
            "_id": "c1",
            "title": "Advisory Council",
            "members": [{"name": "Dr. A", "designation": "Chair", "image": ""}]
        }))
        .into_response(),
        "boom" => (StatusCode::INTERNAL_SERVER_ERROR, "database unavailable").into_response(),
        _ => missing(),
    }
}

async fn list_online_apply(headers: HeaderMap) -> Response {
    let expected = format!("Bearer {}", MockBackend::TOKEN);
    let authorized = headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        == Some(expected.as_str());
    if !authorized {
        return StatusCode::UNAUTHORIZED.into_response();
    }
    ok(json!([{"_id": "oa1", "title": "Apply", "steps": []}])).into_response()
}

async fn update_step(Path(id): Path<String>, Json(mut body): Json<Value>) -> Json<Value> {
    body["_id"] = json!(id);
    ok(body)
}

async fn get_navigation(State(b): State<MockBackend>) -> Json<Value> {
    ok(b.navigation.lock().unwrap().clone())
}

async fn put_navigation(State(b): State<MockBackend>, Json(body): Json<Value>) -> Json<Value> {
    *b.navigation.lock().unwrap() = body.clone();
    ok(body)
}

async fn get_page(State(b): State<MockBackend>, Path(page): Path<String>) -> Json<Value> {
    ok(b.pages.lock().unwrap().get(&page).cloned().unwrap_or(Value::Null))
}

async fn put_page(
    State(b): State<MockBackend>,
    Path(page): Path<String>,
    Json(body): Json<Value>,
) -> Json<Value> {
    b.pages.lock().unwrap().insert(page, body.clone());
    ok(body)
}

async fn presign(State(b): State<MockBackend>, Json(body): Json<Value>) -> Response {
    let filename = body["filename"].as_str().unwrap_or_default().to_string();
    if body["contentType"].as_str().unwrap_or_default().is_empty() {
        return (StatusCode::BAD_REQUEST, "contentType required").into_response();
    }
    if filename.starts_with("expired") {
        return StatusCode::UNAUTHORIZED.into_response();
    }
    let origin = b.base_url.trim_end_matches("/api");
    let bucket = if filename.starts_with("reject") {
        "closed-bucket"
    } else {
        "bucket"
    };
    Json(json!({
        "uploadUrl": format!("{origin}/{bucket}/{filename}"),
        "publicUrl": format!("https://cdn.test/{filename}")
    }))
    .into_response()
}

async fn put_object(
    State(b): State<MockBackend>,
    Path(name): Path<String>,
    headers: HeaderMap,
    body: Bytes,
) -> StatusCode {
    let content_type = headers
        .get("content-type")
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_string();
    b.objects.lock().unwrap().insert(
        name,
        StoredObject {
            content_type,
            bytes: body.to_vec(),
        },
    );
    StatusCode::OK
}
