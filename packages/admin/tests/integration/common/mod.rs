use std::collections::BTreeMap;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::extract::{Path, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use serde_json::{Value, json};
use tempfile::TempDir;

use admin::config::ApiConfig;
use admin::entity::{AssetBacked, AssetFields, Record};
use admin::repository::{ApiClient, Repository};
use admin::session::{Session, SessionContext};
use admin::workflow::SaveOrchestrator;
use common::retry::RetryPolicy;
use common::storage::filesystem::FilesystemObjectStore;
use common::storage::{ObjectPath, ObjectStore, PublicUrlScheme, StorageError};

pub const BUCKET: &str = "finalproject";
pub const PUBLIC_BASE: &str = "http://storage.test/storage/v1/object/public";
pub const TOKEN: &str = "test-token";

/// In-memory stand-in for the LMS REST API.
#[derive(Default)]
pub struct Backend {
    records: Mutex<BTreeMap<(String, i32), Value>>,
    next_id: AtomicU32,
    calls: Mutex<Vec<String>>,
    last_auth: Mutex<Option<String>>,
    /// Number of upcoming PUTs to answer with 503.
    pub fail_puts: AtomicU32,
    pub fail_posts: AtomicBool,
    pub fail_deletes: AtomicBool,
}

impl Backend {
    fn log(&self, call: String, headers: &HeaderMap) {
        self.calls.lock().unwrap().push(call);
        *self.last_auth.lock().unwrap() = headers
            .get("authorization")
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
    }
}

fn error(status: StatusCode, message: &str) -> Response {
    (status, Json(json!({ "message": message }))).into_response()
}

async fn create_record(
    State(backend): State<Arc<Backend>>,
    Path(kind): Path<String>,
    headers: HeaderMap,
    Json(mut body): Json<Value>,
) -> Response {
    backend.log(format!("POST /{kind}"), &headers);
    if backend.fail_posts.load(Ordering::SeqCst) {
        return error(StatusCode::INTERNAL_SERVER_ERROR, "database unavailable");
    }
    if body["code"] == "DUP" {
        return error(StatusCode::UNPROCESSABLE_ENTITY, "Course code already exists");
    }

    let id = backend.next_id.fetch_add(1, Ordering::SeqCst) as i32 + 1;
    body["id"] = json!(id);
    backend
        .records
        .lock()
        .unwrap()
        .insert((kind.clone(), id), body.clone());

    // The real API nests the created record under its kind for some endpoints.
    let mut envelope = serde_json::Map::new();
    envelope.insert("message".into(), json!("created"));
    envelope.insert(kind, body);
    (StatusCode::CREATED, Json(Value::Object(envelope))).into_response()
}

async fn list_records(
    State(backend): State<Arc<Backend>>,
    Path(kind): Path<String>,
    headers: HeaderMap,
) -> Response {
    backend.log(format!("GET /{kind}"), &headers);
    let rows: Vec<Value> = backend
        .records
        .lock()
        .unwrap()
        .iter()
        .filter(|((k, _), _)| *k == kind)
        .map(|(_, v)| v.clone())
        .collect();
    Json(json!({ "data": rows })).into_response()
}

async fn get_record(
    State(backend): State<Arc<Backend>>,
    Path((kind, id)): Path<(String, i32)>,
    headers: HeaderMap,
) -> Response {
    backend.log(format!("GET /{kind}/{id}"), &headers);
    match backend.records.lock().unwrap().get(&(kind, id)) {
        Some(record) => Json(record.clone()).into_response(),
        None => error(StatusCode::NOT_FOUND, "not found"),
    }
}

/// `GET /{kind}/{id}/{relation}`: child records whose `{kind}Id` is `id`.
/// Children are stored under the singular relation name (`users` -> `user`).
async fn list_related(
    State(backend): State<Arc<Backend>>,
    Path((kind, id, relation)): Path<(String, i32, String)>,
    headers: HeaderMap,
) -> Response {
    backend.log(format!("GET /{kind}/{id}/{relation}"), &headers);
    let child = relation.trim_end_matches('s');
    let parent_key = format!("{kind}Id");
    let rows: Vec<Value> = backend
        .records
        .lock()
        .unwrap()
        .iter()
        .filter(|((k, _), v)| k == child && v[&parent_key] == id)
        .map(|(_, v)| v.clone())
        .collect();
    Json(rows).into_response()
}

async fn update_record(
    State(backend): State<Arc<Backend>>,
    Path((kind, id)): Path<(String, i32)>,
    headers: HeaderMap,
    Json(patch): Json<Value>,
) -> Response {
    backend.log(format!("PUT /{kind}/{id}"), &headers);
    let pending = backend.fail_puts.load(Ordering::SeqCst);
    if pending > 0 {
        backend.fail_puts.store(pending - 1, Ordering::SeqCst);
        return error(StatusCode::SERVICE_UNAVAILABLE, "try again");
    }

    let mut records = backend.records.lock().unwrap();
    let Some(Value::Object(record)) = records.get_mut(&(kind, id)) else {
        return error(StatusCode::NOT_FOUND, "not found");
    };
    if let Value::Object(fields) = patch {
        record.extend(fields);
    }
    Json(json!({ "message": "updated" })).into_response()
}

async fn delete_record(
    State(backend): State<Arc<Backend>>,
    Path((kind, id)): Path<(String, i32)>,
    headers: HeaderMap,
) -> Response {
    backend.log(format!("DELETE /{kind}/{id}"), &headers);
    if backend.fail_deletes.load(Ordering::SeqCst) {
        return error(StatusCode::INTERNAL_SERVER_ERROR, "delete failed");
    }
    match backend.records.lock().unwrap().remove(&(kind, id)) {
        Some(_) => Json(json!({ "message": "deleted" })).into_response(),
        None => error(StatusCode::NOT_FOUND, "not found"),
    }
}

/// Object store wrapper that records calls and can be told to fail uploads.
pub struct RecordingStore {
    inner: FilesystemObjectStore,
    pub uploads: Mutex<Vec<ObjectPath>>,
    pub removals: Mutex<Vec<ObjectPath>>,
    pub fail_uploads: AtomicBool,
    pub fail_removes: AtomicBool,
}

impl RecordingStore {
    pub fn uploaded(&self) -> Vec<ObjectPath> {
        self.uploads.lock().unwrap().clone()
    }

    pub fn removed(&self) -> Vec<ObjectPath> {
        self.removals.lock().unwrap().clone()
    }

    /// Put an object in the bucket without recording it as an upload.
    pub async fn put_unrecorded(&self, path: &ObjectPath, data: &[u8]) -> String {
        self.inner
            .upload(path, data, None)
            .await
            .expect("Failed to seed object")
    }
}

#[async_trait]
impl ObjectStore for RecordingStore {
    fn url_scheme(&self) -> &PublicUrlScheme {
        self.inner.url_scheme()
    }

    async fn upload(
        &self,
        path: &ObjectPath,
        data: &[u8],
        content_type: Option<&str>,
    ) -> Result<String, StorageError> {
        self.uploads.lock().unwrap().push(path.clone());
        if self.fail_uploads.load(Ordering::SeqCst) {
            return Err(StorageError::Rejected {
                status: 500,
                message: "bucket unavailable".into(),
            });
        }
        self.inner.upload(path, data, content_type).await
    }

    async fn remove(&self, paths: &[ObjectPath]) -> Result<(), StorageError> {
        self.removals.lock().unwrap().extend(paths.iter().cloned());
        if self.fail_removes.load(Ordering::SeqCst) {
            return Err(StorageError::Backend("remove failed".into()));
        }
        self.inner.remove(paths).await
    }

    async fn get(&self, path: &ObjectPath) -> Result<Vec<u8>, StorageError> {
        self.inner.get(path).await
    }

    async fn exists(&self, path: &ObjectPath) -> Result<bool, StorageError> {
        self.inner.exists(path).await
    }
}

/// A fake backend on a random port plus a temp-dir bucket.
pub struct TestApp {
    pub addr: SocketAddr,
    pub backend: Arc<Backend>,
    pub store: Arc<RecordingStore>,
    pub api: ApiClient,
    _bucket_dir: TempDir,
}

impl TestApp {
    pub async fn spawn() -> Self {
        Self::spawn_with_session(SessionContext::in_memory(Session {
            token: TOKEN.into(),
            username: Some("admin".into()),
        }))
        .await
    }

    pub async fn spawn_with_session(session: SessionContext) -> Self {
        let backend = Arc::new(Backend::default());
        let router = Router::new()
            .route("/api/{kind}", get(list_records).post(create_record))
            .route(
                "/api/{kind}/{id}",
                get(get_record).put(update_record).delete(delete_record),
            )
            .route("/api/{kind}/{id}/{relation}", get(list_related))
            .with_state(Arc::clone(&backend));

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind to random port");
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });

        let bucket_dir = tempfile::tempdir().expect("Failed to create bucket dir");
        let inner = FilesystemObjectStore::new(
            bucket_dir.path().to_path_buf(),
            1024 * 1024,
            PublicUrlScheme::new(PUBLIC_BASE, BUCKET),
        )
        .await
        .expect("Failed to create filesystem store");
        let store = Arc::new(RecordingStore {
            inner,
            uploads: Mutex::default(),
            removals: Mutex::default(),
            fail_uploads: AtomicBool::new(false),
            fail_removes: AtomicBool::new(false),
        });

        let config = ApiConfig {
            base_url: format!("http://{addr}/api"),
            timeout_secs: 5,
        };
        let api = ApiClient::new(&config, Arc::new(session)).expect("Failed to build client");

        Self {
            addr,
            backend,
            store,
            api,
            _bucket_dir: bucket_dir,
        }
    }

    pub fn repo<E: Record>(&self) -> Arc<dyn Repository<E>> {
        Arc::new(self.api.repository::<E>())
    }

    pub fn orchestrator<E>(&self) -> SaveOrchestrator<E>
    where
        E: AssetBacked,
        E::Draft: AssetFields,
        E::Patch: AssetFields,
    {
        self.orchestrator_with_retry(RetryPolicy::immediate(3))
    }

    pub fn orchestrator_with_retry<E>(&self, retry: RetryPolicy) -> SaveOrchestrator<E>
    where
        E: AssetBacked,
        E::Draft: AssetFields,
        E::Patch: AssetFields,
    {
        let store: Arc<dyn ObjectStore> = self.store.clone();
        SaveOrchestrator::new(self.repo::<E>(), store, retry)
    }

    /// Calls received by the backend, e.g. `"PUT /course/1"`.
    pub fn calls(&self) -> Vec<String> {
        self.backend.calls.lock().unwrap().clone()
    }

    pub fn last_auth(&self) -> Option<String> {
        self.backend.last_auth.lock().unwrap().clone()
    }

    pub fn record(&self, kind: &str, id: i32) -> Option<Value> {
        self.backend
            .records
            .lock()
            .unwrap()
            .get(&(kind.to_string(), id))
            .cloned()
    }

    /// Insert a record directly, bypassing the API.
    pub fn seed(&self, kind: &str, mut record: Value) -> i32 {
        let id = self.backend.next_id.fetch_add(1, Ordering::SeqCst) as i32 + 1;
        record["id"] = json!(id);
        self.backend
            .records
            .lock()
            .unwrap()
            .insert((kind.to_string(), id), record);
        id
    }

    /// Merge `fields` into a stored record without going through the API.
    pub fn backend_patch(&self, kind: &str, id: i32, fields: Value) {
        let mut records = self.backend.records.lock().unwrap();
        if let (Some(Value::Object(record)), Value::Object(fields)) =
            (records.get_mut(&(kind.to_string(), id)), fields)
        {
            record.extend(fields);
        }
    }

    pub fn fail_next_puts(&self, n: u32) {
        self.backend.fail_puts.store(n, Ordering::SeqCst);
    }

    pub fn fail_posts(&self) {
        self.backend.fail_posts.store(true, Ordering::SeqCst);
    }

    pub fn fail_deletes(&self) {
        self.backend.fail_deletes.store(true, Ordering::SeqCst);
    }

    pub fn fail_uploads(&self) {
        self.store.fail_uploads.store(true, Ordering::SeqCst);
    }

    pub fn fail_removes(&self) {
        self.store.fail_removes.store(true, Ordering::SeqCst);
    }

    /// Object path behind a public URL produced by the test bucket.
    pub fn path_of(&self, url: &str) -> ObjectPath {
        self.store
            .path_from_url(url)
            .unwrap_or_else(|| panic!("{url} is not a bucket URL"))
    }

    pub fn course_seed(&self, image: &str) -> i32 {
        self.seed(
            "course",
            json!({
                "code": "RS101",
                "name": "Rust",
                "description": "Systems programming",
                "image": image,
            }),
        )
    }
}
