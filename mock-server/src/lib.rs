use std::{collections::HashMap, sync::Arc, time::Duration};

use axum::{
    extract::{Path, Query, Request, State},
    http::{HeaderMap, StatusCode},
    middleware::{self, Next},
    response::{IntoResponse, Response},
    routing::{get, post, MethodRouter},
    Json, Router,
};
use serde::Deserialize;
use serde_json::{json, Value};
use tokio::{net::TcpListener, sync::RwLock};
use tracing::{debug, info};
use uuid::Uuid;

pub const CLIENT_ID: &str = "mock-client-id";
pub const CLIENT_SECRET: &str = "mock-client-secret";
pub const ACCOUNT_TOKEN: &str = "mock-account-token";

/// Runtime knobs for the mock API.
#[derive(Clone, Debug)]
pub struct MockConfig {
    pub client_id: String,
    pub client_secret: String,
    /// Delay applied before every response.
    pub latency: Duration,
}

impl Default for MockConfig {
    fn default() -> Self {
        Self {
            client_id: CLIENT_ID.to_string(),
            client_secret: CLIENT_SECRET.to_string(),
            latency: Duration::ZERO,
        }
    }
}

/// Records keyed by collection name (`projects`, `rfis`, `folders`, ...).
#[derive(Clone, Debug)]
pub struct Store {
    collections: HashMap<String, Vec<Value>>,
    account_tokens: Vec<String>,
}

impl Store {
    pub fn empty() -> Self {
        Self {
            collections: HashMap::new(),
            account_tokens: vec![ACCOUNT_TOKEN.to_string()],
        }
    }

    /// A small construction account with two projects and their records.
    pub fn seeded() -> Self {
        let mut store = Self::empty();
        store.insert("projects", json!({"id": "p1", "name": "Roof", "number": "2024-001", "status": "active"}));
        store.insert("projects", json!({"id": "p2", "name": "Foundation", "number": "2024-002", "status": "closed"}));
        store.insert("rfis", json!({"id": "r1", "project_id": "p1", "number": "1", "subject": "Flashing detail", "status": "open"}));
        store.insert("rfis", json!({"id": "r2", "project_id": "p1", "number": "2", "subject": "Parapet height", "status": "closed"}));
        store.insert("rfis", json!({"id": "r3", "project_id": "p2", "number": "1", "subject": "Rebar spacing", "status": "open"}));
        store.insert("submittals", json!({"id": "s1", "project_id": "p1", "number": "07 31 13-1", "name": "Shingle samples", "status": "pending"}));
        store.insert("specification-sections", json!({"id": "sp1", "project_id": "p1", "number": "07 31 13", "name": "Asphalt Shingles"}));
        store.insert("drawings", json!({"id": "d1", "project_id": "p1", "number": "A-501", "name": "Roof Plan", "discipline": "Architectural"}));
        store.insert("contacts", json!({"id": "c1", "first_name": "Dana", "last_name": "Reyes", "email": "dana@example.com", "vendor_id": "v1"}));
        store.insert("vendors", json!({"id": "v1", "name": "Acme Roofing", "email": "office@acme.example"}));
        store.insert("folders", json!({
            "id": "f-root", "project_id": "p1", "name": "Root", "parent_id": null,
            "folders": [{"id": "f-drawings", "name": "Drawings"}, {"id": "f-photos", "name": "Photos"}],
            "files": [{"id": "file-1", "name": "readme.txt", "folder_id": "f-root", "size": 12}]
        }));
        store.insert("folders", json!({
            "id": "f-drawings", "project_id": "p1", "name": "Drawings", "parent_id": "f-root",
            "folders": [{"id": "f-archive", "name": "Archive"}],
            "files": [{"id": "file-2", "name": "A-501.pdf", "folder_id": "f-drawings", "size": 204800}]
        }));
        store.insert("folders", json!({
            "id": "f-archive", "project_id": "p1", "name": "Archive", "parent_id": "f-drawings",
            "folders": [], "files": []
        }));
        store.insert("folders", json!({
            "id": "f-photos", "project_id": "p1", "name": "Photos", "parent_id": "f-root",
            "folders": [],
            "files": [{"id": "file-3", "name": "site.jpg", "folder_id": "f-photos", "size": 48213}]
        }));
        for folder in store.collection("folders").to_vec() {
            for file in folder["files"].as_array().cloned().unwrap_or_default() {
                store.insert("files", file);
            }
        }
        store
    }

    pub fn insert(&mut self, collection: &str, record: Value) {
        self.collections.entry(collection.to_string()).or_default().push(record);
    }

    fn collection(&self, name: &str) -> &[Value] {
        self.collections.get(name).map(Vec::as_slice).unwrap_or(&[])
    }

    fn find(&self, collection: &str, id: &str) -> Option<&Value> {
        self.collection(collection)
            .iter()
            .find(|record| record["id"].as_str() == Some(id))
    }
}

pub type Db = Arc<RwLock<Store>>;

#[derive(Clone)]
pub struct AppState {
    db: Db,
    config: Arc<MockConfig>,
}

/// Error rendered as `{"error": "..."}`.
pub struct ApiFailure {
    status: StatusCode,
    message: String,
}

impl ApiFailure {
    fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }
}

impl IntoResponse for ApiFailure {
    fn into_response(self) -> Response {
        (self.status, Json(json!({ "error": self.message }))).into_response()
    }
}

#[derive(Debug, Deserialize)]
struct PageParams {
    page: Option<usize>,
    per_page: Option<usize>,
}

/// Whether an endpoint needs the `Project-Id` header or merely filters by it.
#[derive(Clone, Copy)]
enum ProjectScope {
    Required,
    Optional,
}

pub fn app() -> Router {
    app_with(Store::seeded(), MockConfig::default())
}

pub fn app_with(store: Store, config: MockConfig) -> Router {
    let state = AppState {
        db: Arc::new(RwLock::new(store)),
        config: Arc::new(config),
    };
    let account = Router::new()
        .route("/projects", list_route("projects", None))
        .route("/projects/{id}", show_route("projects", None))
        .route("/rfis", list_route("rfis", Some(ProjectScope::Required)))
        .route("/rfis/{id}", show_route("rfis", Some(ProjectScope::Required)))
        .route("/submittals", list_route("submittals", Some(ProjectScope::Required)))
        .route("/submittals/{id}", show_route("submittals", Some(ProjectScope::Required)))
        .route(
            "/specification-sections",
            list_route("specification-sections", Some(ProjectScope::Required)),
        )
        .route(
            "/specification-sections/{id}",
            show_route("specification-sections", Some(ProjectScope::Required)),
        )
        .route("/drawings", list_route("drawings", Some(ProjectScope::Required)))
        .route("/drawings/{id}", show_route("drawings", Some(ProjectScope::Required)))
        .route("/contacts", list_route("contacts", Some(ProjectScope::Optional)))
        .route("/contacts/{id}", show_route("contacts", Some(ProjectScope::Optional)))
        .route("/vendors", list_route("vendors", Some(ProjectScope::Optional)))
        .route("/vendors/{id}", show_route("vendors", Some(ProjectScope::Optional)))
        .route("/files/{id}", show_route("files", None))
        .route("/folders/{id}", show_route("folders", None))
        .route("/folders/{id}/files", get(folder_files))
        .route("/root-folder", get(root_folder))
        .route_layer(middleware::from_fn_with_state(state.clone(), require_account_token));

    Router::new()
        .merge(account)
        .route("/link/token/create", post(create_link_token))
        .route("/link/token/exchange", post(exchange_public_token))
        .layer(middleware::from_fn_with_state(state.clone(), require_client_credentials))
        .with_state(state)
}

fn list_route(collection: &'static str, scope: Option<ProjectScope>) -> MethodRouter<AppState> {
    get(move |s: State<AppState>, h: HeaderMap, q: Query<PageParams>| list(s, h, q, collection, scope))
}

fn show_route(collection: &'static str, scope: Option<ProjectScope>) -> MethodRouter<AppState> {
    get(move |s: State<AppState>, h: HeaderMap, p: Path<String>| show(s, h, p, collection, scope))
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    run_with(listener, app()).await
}

pub async fn run_with(listener: TcpListener, app: Router) -> Result<(), std::io::Error> {
    if let Ok(addr) = listener.local_addr() {
        info!(%addr, "mock Agave API listening");
    }
    axum::serve(listener, app).await
}

async fn require_client_credentials(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Result<Response, ApiFailure> {
    if !state.config.latency.is_zero() {
        tokio::time::sleep(state.config.latency).await;
    }
    let headers = request.headers();
    let id = header(headers, "Client-Id");
    let secret = header(headers, "Client-Secret");
    if id != Some(state.config.client_id.as_str()) || secret != Some(state.config.client_secret.as_str()) {
        debug!(path = %request.uri().path(), "rejecting request with bad client credentials");
        return Err(ApiFailure::new(StatusCode::UNAUTHORIZED, "invalid client credentials"));
    }
    if header(headers, "API-Version").is_none() {
        return Err(ApiFailure::new(StatusCode::BAD_REQUEST, "API-Version header is required"));
    }
    Ok(next.run(request).await)
}

async fn require_account_token(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Result<Response, ApiFailure> {
    let token = header(request.headers(), "Account-Token")
        .ok_or_else(|| ApiFailure::new(StatusCode::UNAUTHORIZED, "Account-Token header is required"))?;
    let known = state.db.read().await.account_tokens.iter().any(|t| t == token);
    if !known {
        return Err(ApiFailure::new(StatusCode::UNAUTHORIZED, "unknown account token"));
    }
    Ok(next.run(request).await)
}

fn header<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .filter(|v| !v.is_empty())
}

fn project_filter(headers: &HeaderMap, scope: Option<ProjectScope>) -> Result<Option<String>, ApiFailure> {
    let project_id = header(headers, "Project-Id").map(str::to_string);
    match (scope, project_id) {
        (Some(ProjectScope::Required), None) => Err(ApiFailure::new(
            StatusCode::BAD_REQUEST,
            "Project-Id header is required",
        )),
        (Some(_), project_id) => Ok(project_id),
        (None, _) => Ok(None),
    }
}

fn belongs_to(record: &Value, project_id: Option<&str>) -> bool {
    match (project_id, record.get("project_id").and_then(Value::as_str)) {
        (Some(wanted), Some(actual)) => wanted == actual,
        _ => true,
    }
}

async fn list(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(params): Query<PageParams>,
    collection: &'static str,
    scope: Option<ProjectScope>,
) -> Result<Json<Value>, ApiFailure> {
    let project_id = project_filter(&headers, scope)?;
    let page = params.page.unwrap_or(1).max(1);
    let per_page = params.per_page.unwrap_or(100).clamp(1, 1000);

    let db = state.db.read().await;
    let matching: Vec<&Value> = db
        .collection(collection)
        .iter()
        .filter(|record| belongs_to(record, project_id.as_deref()))
        .collect();
    let total = matching.len();
    let data: Vec<Value> = matching
        .into_iter()
        .skip((page - 1).saturating_mul(per_page))
        .take(per_page)
        .cloned()
        .collect();
    let next_page = (page.saturating_mul(per_page) < total).then(|| page + 1);

    Ok(Json(json!({
        "data": data,
        "pagination": {
            "page": page,
            "per_page": per_page,
            "total_count": total,
            "next_page": next_page,
        }
    })))
}

async fn show(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<String>,
    collection: &'static str,
    scope: Option<ProjectScope>,
) -> Result<Json<Value>, ApiFailure> {
    let project_id = project_filter(&headers, scope)?;
    let db = state.db.read().await;
    db.find(collection, &id)
        .filter(|record| belongs_to(record, project_id.as_deref()))
        .cloned()
        .map(Json)
        .ok_or_else(|| ApiFailure::new(StatusCode::NOT_FOUND, format!("{collection} {id} not found")))
}

async fn folder_files(State(state): State<AppState>, Path(id): Path<String>) -> Result<Json<Value>, ApiFailure> {
    let db = state.db.read().await;
    let folder = db
        .find("folders", &id)
        .ok_or_else(|| ApiFailure::new(StatusCode::NOT_FOUND, format!("folder {id} not found")))?;
    Ok(Json(json!({ "data": folder["files"].clone() })))
}

async fn root_folder(State(state): State<AppState>, headers: HeaderMap) -> Result<Json<Value>, ApiFailure> {
    let project_id = project_filter(&headers, Some(ProjectScope::Required))?.unwrap_or_default();
    let db = state.db.read().await;
    db.collection("folders")
        .iter()
        .find(|folder| folder["project_id"].as_str() == Some(project_id.as_str()) && folder["parent_id"].is_null())
        .cloned()
        .map(Json)
        .ok_or_else(|| ApiFailure::new(StatusCode::NOT_FOUND, format!("no root folder for project {project_id}")))
}

#[derive(Debug, Deserialize)]
pub struct CreateLinkToken {
    pub reference_id: String,
}

#[derive(Debug, Deserialize)]
pub struct ExchangePublicToken {
    pub public_token: String,
}

async fn create_link_token(Json(input): Json<CreateLinkToken>) -> Result<Json<Value>, ApiFailure> {
    if input.reference_id.trim().is_empty() {
        return Err(ApiFailure::new(StatusCode::BAD_REQUEST, "reference_id is required"));
    }
    Ok(Json(json!({
        "link_token": format!("link-{}", Uuid::new_v4()),
        "reference_id": input.reference_id,
    })))
}

/// Public tokens are accepted when they start with `public-`; each exchange
/// mints a fresh account token that later account-scoped calls accept.
async fn exchange_public_token(
    State(state): State<AppState>,
    Json(input): Json<ExchangePublicToken>,
) -> Result<Json<Value>, ApiFailure> {
    if !input.public_token.starts_with("public-") {
        return Err(ApiFailure::new(StatusCode::BAD_REQUEST, "invalid public token"));
    }
    let account_token = format!("acct-{}", Uuid::new_v4());
    state.db.write().await.account_tokens.push(account_token.clone());
    Ok(Json(json!({ "account_token": account_token })))
}
