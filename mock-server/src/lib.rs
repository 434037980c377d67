//! In-memory imitation of the Raindrop REST routes, mounted under `/rest/v1`.
//!
//! Types here are defined independently from `raindrop-core` so integration
//! tests catch schema drift between the client and the wire format.

use std::{collections::BTreeMap, sync::Arc};

use axum::{
    extract::{Path, Query, Request, State},
    http::{header, StatusCode},
    middleware::{self, Next},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use serde_json::{json, Value};
use tokio::{net::TcpListener, sync::RwLock};
use url::Url;
use uuid::Uuid;

/// Collection id the service uses for "Unsorted".
pub const UNSORTED: i64 = -1;
/// Collection id the service uses for "Trash".
pub const TRASH: i64 = -99;

const DEFAULT_PERPAGE: usize = 25;
const MAX_PERPAGE: usize = 50;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ref {
    #[serde(rename = "$id")]
    pub id: i64,
}

fn unsorted() -> Ref {
    Ref { id: UNSORTED }
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct Collection {
    #[serde(rename = "_id", default)]
    pub id: i64,
    #[serde(default)]
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent: Option<Ref>,
    #[serde(default)]
    pub public: bool,
    #[serde(default)]
    pub view: String,
    #[serde(default)]
    pub color: String,
    #[serde(default)]
    pub count: i64,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct Highlight {
    #[serde(rename = "_id", default)]
    pub id: String,
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub color: String,
    #[serde(default)]
    pub note: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub link: String,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Raindrop {
    #[serde(rename = "_id", default)]
    pub id: i64,
    #[serde(default)]
    pub link: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub excerpt: String,
    #[serde(default)]
    pub cover: String,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub important: bool,
    #[serde(default = "unsorted")]
    pub collection: Ref,
    #[serde(default)]
    pub highlights: Vec<Highlight>,
}

#[derive(Deserialize)]
pub struct IdList {
    #[serde(default)]
    pub ids: Vec<i64>,
}

#[derive(Deserialize)]
pub struct RaindropList {
    #[serde(default)]
    pub items: Vec<Value>,
}

#[derive(Deserialize)]
pub struct BulkUpdate {
    #[serde(default)]
    pub ids: Vec<i64>,
    #[serde(default)]
    pub important: Option<bool>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub cover: Option<String>,
    #[serde(default)]
    pub collection: Option<Ref>,
}

#[derive(Deserialize)]
pub struct LinkBody {
    pub link: String,
}

#[derive(Debug, Default, Deserialize)]
pub struct ListParams {
    pub sort: Option<String>,
    pub page: Option<usize>,
    pub perpage: Option<usize>,
    pub search: Option<String>,
}

#[derive(Default)]
pub struct Store {
    next_id: i64,
    collections: BTreeMap<i64, Collection>,
    raindrops: BTreeMap<i64, Raindrop>,
}

impl Store {
    fn allocate_id(&mut self) -> i64 {
        self.next_id += 1;
        self.next_id
    }

    fn count_in(&self, collection_id: i64) -> i64 {
        self.raindrops
            .values()
            .filter(|r| r.collection.id == collection_id)
            .count() as i64
    }

    fn with_count(&self, collection: &Collection) -> Collection {
        Collection {
            count: self.count_in(collection.id),
            ..collection.clone()
        }
    }
}

pub type Db = Arc<RwLock<Store>>;

type Reply = (StatusCode, Json<Value>);

pub fn app() -> Router {
    let db: Db = Arc::new(RwLock::new(Store::default()));
    let api = Router::new()
        .route(
            "/collections/",
            get(list_root_collections).delete(delete_collections),
        )
        .route("/collections/childrens", get(list_child_collections))
        .route("/collection/", post(create_collection))
        .route(
            "/collection/{id}",
            get(get_collection)
                .put(update_collection)
                .delete(delete_collection),
        )
        .route("/raindrop/", post(create_raindrop))
        .route("/raindrop/suggest/", post(suggest_for_link))
        .route(
            "/raindrop/{id}",
            get(get_raindrop).put(update_raindrop).delete(delete_raindrop),
        )
        .route("/raindrop/{id}/suggest/", get(suggest_for_raindrop))
        .route(
            "/raindrops/{collection_id}",
            get(list_raindrops)
                .post(create_raindrops)
                .put(update_raindrops)
                .delete(delete_raindrops),
        )
        .route("/highlights", get(list_all_highlights))
        .route("/highlights/{collection_id}", get(list_collection_highlights))
        .layer(middleware::from_fn(require_bearer))
        .with_state(db);
    Router::new().nest("/rest/v1", api)
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    axum::serve(listener, app()).await
}

async fn require_bearer(request: Request, next: Next) -> Response {
    let authorized = request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .is_some_and(|token| !token.trim().is_empty());
    if !authorized {
        return failure(StatusCode::UNAUTHORIZED, "Unauthorized").into_response();
    }
    next.run(request).await
}

fn failure(status: StatusCode, message: &str) -> Reply {
    (
        status,
        Json(json!({ "result": false, "errorMessage": message })),
    )
}

fn not_found() -> Reply {
    failure(StatusCode::NOT_FOUND, "Not found")
}

fn item<T: Serialize>(value: &T) -> Reply {
    (StatusCode::OK, Json(json!({ "result": true, "item": value })))
}

fn items<T: Serialize>(values: &[T], count: usize) -> Reply {
    (
        StatusCode::OK,
        Json(json!({ "result": true, "items": values, "count": count })),
    )
}

fn modified(count: usize) -> Reply {
    (StatusCode::OK, Json(json!({ "result": true, "modified": count })))
}

/// Overlay the keys of `patch` onto `record`, keeping the record's id.
fn merge<T: Serialize + DeserializeOwned>(record: &T, patch: Value) -> Result<T, Reply> {
    let mut current = serde_json::to_value(record)
        .map_err(|_| failure(StatusCode::INTERNAL_SERVER_ERROR, "encode failed"))?;
    if let (Some(target), Value::Object(fields)) = (current.as_object_mut(), patch) {
        for (key, value) in fields {
            if key != "_id" {
                target.insert(key, value);
            }
        }
    }
    serde_json::from_value(current).map_err(|e| failure(StatusCode::BAD_REQUEST, &e.to_string()))
}

/// Host of `link`; scheme-less links are read as https.
fn host_of(link: &str) -> String {
    [link.to_string(), format!("https://{link}")]
        .iter()
        .find_map(|candidate| Url::parse(candidate).ok()?.host_str().map(str::to_owned))
        .unwrap_or_default()
}

/// One page of `all`, sized by `perpage` and capped at `MAX_PERPAGE`.
fn page_of<T>(all: Vec<T>, params: &ListParams) -> Vec<T> {
    let perpage = params.perpage.unwrap_or(DEFAULT_PERPAGE).min(MAX_PERPAGE);
    let skip = params.page.unwrap_or(0).saturating_mul(perpage);
    all.into_iter().skip(skip).take(perpage).collect()
}

fn assign_highlight_ids(raindrop: &mut Raindrop) {
    for highlight in &mut raindrop.highlights {
        if highlight.id.is_empty() {
            highlight.id = Uuid::new_v4().simple().to_string();
        }
    }
}

// --- collections ---

async fn list_root_collections(State(db): State<Db>) -> Reply {
    let store = db.read().await;
    let roots: Vec<Collection> = store
        .collections
        .values()
        .filter(|c| c.parent.is_none())
        .map(|c| store.with_count(c))
        .collect();
    items(&roots, roots.len())
}

async fn list_child_collections(State(db): State<Db>) -> Reply {
    let store = db.read().await;
    let children: Vec<Collection> = store
        .collections
        .values()
        .filter(|c| c.parent.is_some())
        .map(|c| store.with_count(c))
        .collect();
    items(&children, children.len())
}

async fn get_collection(State(db): State<Db>, Path(id): Path<i64>) -> Reply {
    let store = db.read().await;
    match store.collections.get(&id) {
        Some(collection) => item(&store.with_count(collection)),
        None => not_found(),
    }
}

async fn create_collection(State(db): State<Db>, Json(mut input): Json<Collection>) -> Reply {
    let mut store = db.write().await;
    if let Some(parent) = input.parent {
        if !store.collections.contains_key(&parent.id) {
            return failure(StatusCode::BAD_REQUEST, "parent collection not found");
        }
    }
    input.id = store.allocate_id();
    input.count = 0;
    store.collections.insert(input.id, input.clone());
    item(&input)
}

async fn update_collection(
    State(db): State<Db>,
    Path(id): Path<i64>,
    Json(patch): Json<Value>,
) -> Reply {
    let mut store = db.write().await;
    let Some(current) = store.collections.get(&id) else {
        return not_found();
    };
    let updated = match merge(current, patch) {
        Ok(updated) => updated,
        Err(reply) => return reply,
    };
    store.collections.insert(id, updated.clone());
    item(&store.with_count(&updated))
}

async fn delete_collection(State(db): State<Db>, Path(id): Path<i64>) -> Reply {
    let mut store = db.write().await;
    if store.collections.remove(&id).is_none() {
        return not_found();
    }
    for raindrop in store.raindrops.values_mut() {
        if raindrop.collection.id == id {
            raindrop.collection.id = TRASH;
        }
    }
    (StatusCode::OK, Json(json!({ "result": true })))
}

async fn delete_collections(State(db): State<Db>, Json(input): Json<IdList>) -> Reply {
    let mut store = db.write().await;
    let removed = input
        .ids
        .iter()
        .filter(|id| store.collections.remove(*id).is_some())
        .count();
    modified(removed)
}

// --- raindrops ---

async fn get_raindrop(State(db): State<Db>, Path(id): Path<i64>) -> Reply {
    let store = db.read().await;
    match store.raindrops.get(&id) {
        Some(raindrop) => item(raindrop),
        None => not_found(),
    }
}

fn insert_raindrop(store: &mut Store, patch: Value, collection: Option<i64>) -> Result<Raindrop, Reply> {
    let mut raindrop: Raindrop = serde_json::from_value(patch)
        .map_err(|e| failure(StatusCode::BAD_REQUEST, &e.to_string()))?;
    if raindrop.link.trim().is_empty() {
        return Err(failure(StatusCode::BAD_REQUEST, "link is required"));
    }
    if let Some(collection) = collection {
        if raindrop.collection.id == UNSORTED {
            raindrop.collection.id = collection;
        }
    }
    raindrop.id = store.allocate_id();
    assign_highlight_ids(&mut raindrop);
    store.raindrops.insert(raindrop.id, raindrop.clone());
    Ok(raindrop)
}

async fn create_raindrop(State(db): State<Db>, Json(input): Json<Value>) -> Reply {
    let mut store = db.write().await;
    match insert_raindrop(&mut store, input, None) {
        Ok(raindrop) => item(&raindrop),
        Err(reply) => reply,
    }
}

async fn update_raindrop(
    State(db): State<Db>,
    Path(id): Path<i64>,
    Json(patch): Json<Value>,
) -> Reply {
    let mut store = db.write().await;
    let Some(current) = store.raindrops.get(&id) else {
        return not_found();
    };
    let mut updated = match merge(current, patch) {
        Ok(updated) => updated,
        Err(reply) => return reply,
    };
    assign_highlight_ids(&mut updated);
    store.raindrops.insert(id, updated.clone());
    item(&updated)
}

async fn delete_raindrop(State(db): State<Db>, Path(id): Path<i64>) -> Reply {
    let mut store = db.write().await;
    match store.raindrops.remove(&id) {
        Some(_) => (StatusCode::OK, Json(json!({ "result": true }))),
        None => not_found(),
    }
}

fn in_collection(raindrop: &Raindrop, collection_id: i64) -> bool {
    if collection_id == 0 {
        raindrop.collection.id != TRASH
    } else {
        raindrop.collection.id == collection_id
    }
}

fn matches_search(raindrop: &Raindrop, search: &str) -> bool {
    let needle = search.to_lowercase();
    raindrop.title.to_lowercase().contains(&needle)
        || raindrop.link.to_lowercase().contains(&needle)
        || raindrop.tags.iter().any(|t| t.to_lowercase() == needle)
}

async fn list_raindrops(
    State(db): State<Db>,
    Path(collection_id): Path<i64>,
    Query(params): Query<ListParams>,
) -> Reply {
    let store = db.read().await;
    let mut found: Vec<Raindrop> = store
        .raindrops
        .values()
        .filter(|r| in_collection(r, collection_id))
        .filter(|r| params.search.as_deref().map_or(true, |s| matches_search(r, s)))
        .cloned()
        .collect();

    match params.sort.as_deref() {
        Some("title") => found.sort_by(|a, b| a.title.cmp(&b.title)),
        Some("-title") => found.sort_by(|a, b| b.title.cmp(&a.title)),
        Some("created") => found.sort_by_key(|r| r.id),
        // Newest first is the service default.
        _ => found.sort_by_key(|r| std::cmp::Reverse(r.id)),
    }

    let total = found.len();
    items(&page_of(found, &params), total)
}

async fn create_raindrops(
    State(db): State<Db>,
    Path(collection_id): Path<i64>,
    Json(input): Json<RaindropList>,
) -> Reply {
    let mut store = db.write().await;
    let mut created = Vec::with_capacity(input.items.len());
    for entry in input.items {
        match insert_raindrop(&mut store, entry, Some(collection_id)) {
            Ok(raindrop) => created.push(raindrop),
            Err(reply) => return reply,
        }
    }
    items(&created, created.len())
}

async fn update_raindrops(
    State(db): State<Db>,
    Path(collection_id): Path<i64>,
    Json(input): Json<BulkUpdate>,
) -> Reply {
    let mut store = db.write().await;
    let mut count = 0;
    for raindrop in store.raindrops.values_mut() {
        if !in_collection(raindrop, collection_id) {
            continue;
        }
        if !input.ids.is_empty() && !input.ids.contains(&raindrop.id) {
            continue;
        }
        if let Some(important) = input.important {
            raindrop.important = important;
        }
        for tag in &input.tags {
            if !raindrop.tags.contains(tag) {
                raindrop.tags.push(tag.clone());
            }
        }
        if let Some(cover) = &input.cover {
            raindrop.cover = cover.clone();
        }
        if let Some(collection) = input.collection {
            raindrop.collection = collection;
        }
        count += 1;
    }
    modified(count)
}

async fn delete_raindrops(
    State(db): State<Db>,
    Path(collection_id): Path<i64>,
    Json(input): Json<IdList>,
) -> Reply {
    let mut store = db.write().await;
    let before = store.raindrops.len();
    store.raindrops.retain(|id, raindrop| {
        !(in_collection(raindrop, collection_id) && input.ids.contains(id))
    });
    modified(before - store.raindrops.len())
}

// --- suggestions ---

fn suggestions(store: &Store, link: &str) -> Value {
    let host = host_of(link).to_lowercase();
    let labels: Vec<&str> = host.split('.').filter(|l| !l.is_empty() && *l != "www").collect();
    let tags: Vec<String> = match labels.split_last() {
        Some((_, names)) if !names.is_empty() => names.iter().map(|l| l.to_string()).collect(),
        _ => labels.iter().map(|l| l.to_string()).collect(),
    };

    let mut collections: Vec<Ref> = Vec::new();
    for raindrop in store.raindrops.values() {
        if host_of(&raindrop.link).eq_ignore_ascii_case(&host)
            && raindrop.collection.id > 0
            && !collections.contains(&raindrop.collection)
        {
            collections.push(raindrop.collection);
        }
    }
    json!({ "collections": collections, "tags": tags })
}

async fn suggest_for_link(State(db): State<Db>, Json(input): Json<LinkBody>) -> Reply {
    if input.link.trim().is_empty() {
        return failure(StatusCode::BAD_REQUEST, "link is required");
    }
    let store = db.read().await;
    item(&suggestions(&store, &input.link))
}

async fn suggest_for_raindrop(State(db): State<Db>, Path(id): Path<i64>) -> Reply {
    let store = db.read().await;
    match store.raindrops.get(&id) {
        Some(raindrop) => item(&suggestions(&store, &raindrop.link)),
        None => not_found(),
    }
}

// --- highlights ---

fn highlights(store: &Store, collection_id: i64, params: &ListParams) -> Reply {
    let all: Vec<Highlight> = store
        .raindrops
        .values()
        .filter(|r| in_collection(r, collection_id))
        .flat_map(|r| {
            r.highlights.iter().map(move |h| Highlight {
                link: r.link.clone(),
                ..h.clone()
            })
        })
        .collect();
    let total = all.len();
    items(&page_of(all, params), total)
}

async fn list_all_highlights(State(db): State<Db>, Query(params): Query<ListParams>) -> Reply {
    highlights(&*db.read().await, 0, &params)
}

async fn list_collection_highlights(
    State(db): State<Db>,
    Path(collection_id): Path<i64>,
    Query(params): Query<ListParams>,
) -> Reply {
    highlights(&*db.read().await, collection_id, &params)
}
