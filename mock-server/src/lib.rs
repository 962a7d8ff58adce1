use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use axum::{
    extract::{Path, Query, Request, State},
    http::{header, HeaderMap, Method, StatusCode, Uri},
    middleware::{self, Next},
    response::{IntoResponse, Response},
    routing::{any, get},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use tokio::{net::TcpListener, sync::RwLock};

pub const API_KEY_HEADER: &str = "x-api-key";

/// Method and path of every route `app()` serves.
pub const ROUTES: &[(&str, &str)] = &[
    ("ANY", "/echo"),
    ("GET, POST", "/api/v2/model/{model}"),
    ("GET, PUT, DELETE", "/api/v2/model/{model}/{id}"),
    ("GET", "/status/{code}"),
    ("GET", "/text"),
    ("GET", "/binary"),
    ("GET", "/large/{size}"),
];

/// What `/echo` saw of the incoming request.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct EchoedRequest {
    pub method: String,
    pub path: String,
    pub query: Vec<(String, String)>,
    pub headers: BTreeMap<String, String>,
    pub body: String,
}

#[derive(Debug, Default)]
pub struct Store {
    next_id: u64,
    models: HashMap<String, BTreeMap<u64, Value>>,
}

pub type Db = Arc<RwLock<Store>>;

type HandlerError = (StatusCode, Json<Value>);

fn error(status: StatusCode, message: &str) -> HandlerError {
    (status, Json(json!({ "error": message })))
}

pub fn app() -> Router {
    let db: Db = Arc::new(RwLock::new(Store::default()));
    Router::new()
        .route("/echo", any(echo))
        .route("/api/v2/model/{model}", get(list_records).post(create_record))
        .route(
            "/api/v2/model/{model}/{id}",
            get(get_record).put(update_record).delete(delete_record),
        )
        .route("/status/{code}", get(status))
        .route("/text", get(text))
        .route("/binary", get(binary))
        .route("/large/{size}", get(large))
        .layer(middleware::from_fn(require_api_key))
        .with_state(db)
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    axum::serve(listener, app()).await
}

async fn require_api_key(request: Request, next: Next) -> Response {
    let present = request
        .headers()
        .get(API_KEY_HEADER)
        .is_some_and(|key| !key.is_empty());
    if !present {
        return error(StatusCode::UNAUTHORIZED, "missing x-api-key header").into_response();
    }
    next.run(request).await
}

async fn echo(
    method: Method,
    uri: Uri,
    Query(query): Query<Vec<(String, String)>>,
    headers: HeaderMap,
    body: String,
) -> Json<EchoedRequest> {
    let headers = headers
        .iter()
        .filter_map(|(name, value)| {
            value
                .to_str()
                .ok()
                .map(|v| (name.as_str().to_string(), v.to_string()))
        })
        .collect();
    Json(EchoedRequest {
        method: method.to_string(),
        path: uri.path().to_string(),
        query,
        headers,
        body,
    })
}

async fn list_records(State(db): State<Db>, Path(model): Path<String>) -> Json<Vec<Value>> {
    let store = db.read().await;
    let records = store
        .models
        .get(&model)
        .map(|records| records.values().cloned().collect())
        .unwrap_or_default();
    Json(records)
}

async fn create_record(
    State(db): State<Db>,
    Path(model): Path<String>,
    Json(mut fields): Json<Map<String, Value>>,
) -> (StatusCode, Json<Value>) {
    let mut store = db.write().await;
    store.next_id += 1;
    let id = store.next_id;
    fields.insert("id".to_string(), json!(id));
    let record = Value::Object(fields);
    store
        .models
        .entry(model)
        .or_default()
        .insert(id, record.clone());
    (StatusCode::CREATED, Json(record))
}

async fn get_record(
    State(db): State<Db>,
    Path((model, id)): Path<(String, u64)>,
) -> Result<Json<Value>, HandlerError> {
    let store = db.read().await;
    store
        .models
        .get(&model)
        .and_then(|records| records.get(&id))
        .cloned()
        .map(Json)
        .ok_or_else(|| error(StatusCode::NOT_FOUND, "record not found"))
}

async fn update_record(
    State(db): State<Db>,
    Path((model, id)): Path<(String, u64)>,
    Json(fields): Json<Map<String, Value>>,
) -> Result<Json<Value>, HandlerError> {
    let mut store = db.write().await;
    let record = store
        .models
        .get_mut(&model)
        .and_then(|records| records.get_mut(&id))
        .and_then(Value::as_object_mut)
        .ok_or_else(|| error(StatusCode::NOT_FOUND, "record not found"))?;
    for (key, value) in fields {
        if key != "id" {
            record.insert(key, value);
        }
    }
    Ok(Json(Value::Object(record.clone())))
}

async fn delete_record(
    State(db): State<Db>,
    Path((model, id)): Path<(String, u64)>,
) -> Result<StatusCode, HandlerError> {
    let mut store = db.write().await;
    store
        .models
        .get_mut(&model)
        .and_then(|records| records.remove(&id))
        .map(|_| StatusCode::NO_CONTENT)
        .ok_or_else(|| error(StatusCode::NOT_FOUND, "record not found"))
}

async fn status(Path(code): Path<u16>) -> HandlerError {
    match StatusCode::from_u16(code) {
        Ok(status) => {
            let reason = status.canonical_reason().unwrap_or("unknown status");
            error(status, reason)
        }
        Err(_) => error(StatusCode::BAD_REQUEST, "invalid status code"),
    }
}

async fn text() -> &'static str {
    "oops"
}

/// Bytes that are not valid UTF-8.
async fn binary() -> impl IntoResponse {
    (
        [(header::CONTENT_TYPE, "application/octet-stream")],
        b"\xff\xfeoops".to_vec(),
    )
}

/// A `{"name": "aaa..."}` object padded to at least `size` bytes.
async fn large(Path(size): Path<usize>) -> impl IntoResponse {
    let padding = "a".repeat(size.saturating_sub(r#"{"name":""}"#.len()));
    (
        [(header::CONTENT_TYPE, "application/json")],
        format!(r#"{{"name":"{padding}"}}"#),
    )
}
