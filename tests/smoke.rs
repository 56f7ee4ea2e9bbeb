// ABOUTME: End-to-end smoke test for gysd against a mock gYS API.
// ABOUTME: Covers collect/persist/list, retention across backends, import, and restore replay.

use std::path::Path;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::extract::{Path as UrlPath, State};
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};
use gysd_core::RETENTION_CAP;
use gysd_engine::{BackupManager, GysdConfig};
use gysd_remote::{HttpApi, QueryCache};
use gysd_store::{DismissalKey, DocStore, SlotStore};
use serde_json::{Value, json};

/// In-memory stand-in for the gYS REST API. Collections are served as JSON
/// arrays; accepted creates are appended and recorded for assertions.
#[derive(Default)]
struct MockGys {
    products: Mutex<Vec<Value>>,
    clients: Mutex<Vec<Value>>,
    sales: Mutex<Vec<Value>>,
    categories: Mutex<Vec<Value>>,
    company: Mutex<Option<Value>>,
    created: Mutex<Vec<(String, Value)>>,
}

impl MockGys {
    fn collection(&self, name: &str) -> Option<&Mutex<Vec<Value>>> {
        match name {
            "products" => Some(&self.products),
            "clients" => Some(&self.clients),
            "sales" => Some(&self.sales),
            "categories" => Some(&self.categories),
            _ => None,
        }
    }

    fn created_for(&self, name: &str) -> Vec<Value> {
        self.created
            .lock()
            .unwrap()
            .iter()
            .filter(|(resource, _)| resource == name)
            .map(|(_, record)| record.clone())
            .collect()
    }
}

async fn get_company(State(state): State<Arc<MockGys>>) -> Result<Json<Value>, StatusCode> {
    state
        .company
        .lock()
        .unwrap()
        .clone()
        .map(Json)
        .ok_or(StatusCode::NOT_FOUND)
}

async fn get_collection(
    State(state): State<Arc<MockGys>>,
    UrlPath(resource): UrlPath<String>,
) -> Result<Json<Value>, StatusCode> {
    let collection = state.collection(&resource).ok_or(StatusCode::NOT_FOUND)?;
    Ok(Json(Value::Array(collection.lock().unwrap().clone())))
}

async fn post_record(
    State(state): State<Arc<MockGys>>,
    UrlPath(resource): UrlPath<String>,
    Json(record): Json<Value>,
) -> Result<StatusCode, StatusCode> {
    let collection = state.collection(&resource).ok_or(StatusCode::NOT_FOUND)?;
    collection.lock().unwrap().push(record.clone());
    state.created.lock().unwrap().push((resource, record));
    Ok(StatusCode::CREATED)
}

/// Serve the mock API on an ephemeral port and return its base URL.
async fn serve_mock(state: Arc<MockGys>) -> String {
    let app = Router::new()
        .route("/api/company", get(get_company))
        .route("/api/{resource}", get(get_collection).post(post_record))
        .with_state(state);

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    format!("http://{}", addr)
}

fn make_manager(dir: &Path, base_url: &str, doc_cap: usize) -> Arc<BackupManager> {
    let config = GysdConfig {
        api_url: base_url.to_string(),
        data_dir: dir.to_path_buf(),
        interval: Duration::from_secs(300),
        agent: "gysd-smoke".to_string(),
    };
    let slots = Arc::new(SlotStore::new(dir.join("slots.json")));
    let docs = Arc::new(DocStore::open_with_cap(&dir.join("snapshots.db"), doc_cap).unwrap());
    Arc::new(BackupManager::new(
        &config,
        Arc::new(HttpApi::new(base_url)),
        Arc::new(QueryCache::new()),
        slots,
        docs,
        DismissalKey::new(dir.join("dismissed")),
    ))
}

#[tokio::test]
async fn collect_persist_list_round_trip() {
    let state = Arc::new(MockGys::default());
    *state.products.lock().unwrap() = vec![
        json!({"id": 1, "name": "Ledger", "price": 12.5}),
        json!({"id": 2, "name": "Stamp", "price": 1.0}),
    ];
    *state.company.lock().unwrap() = Some(json!({"name": "Acme HQ"}));

    let base_url = serve_mock(Arc::clone(&state)).await;
    let dir = tempfile::TempDir::new().unwrap();
    let manager = make_manager(dir.path(), &base_url, RETENTION_CAP);

    assert!(manager.persist(gysd_core::Trigger::Manual).await);

    let snapshots = manager.list().await;
    assert_eq!(snapshots.len(), 1);

    let snapshot = &snapshots[0];
    assert_eq!(snapshot.schema_version, "1.0.0");
    assert_eq!(snapshot.origin.agent, "gysd-smoke");
    assert_eq!(snapshot.origin.trigger, gysd_core::Trigger::Manual);
    assert_eq!(
        snapshot.entities.products,
        *state.products.lock().unwrap(),
        "products must match the API verbatim"
    );
    assert!(snapshot.entities.clients.is_empty());
    assert_eq!(snapshot.entities.company, Some(json!({"name": "Acme HQ"})));
}

#[tokio::test]
async fn retention_differs_per_backend_but_the_catalog_unions() {
    let base_url = serve_mock(Arc::new(MockGys::default())).await;
    let dir = tempfile::TempDir::new().unwrap();
    // Document store with an effectively unbounded cap.
    let manager = make_manager(dir.path(), &base_url, 1000);

    for timestamp in 1..=12 {
        let raw = format!(
            r#"{{"timestamp": {}, "entities": {{"products": [], "clients": [], "sales": [], "categories": []}}}}"#,
            timestamp
        );
        assert!(manager.import_json(&raw).await);
    }

    // The slot store is capped at ten and keeps the newest. Export consults
    // only that store, so the two evicted timestamps are not exportable even
    // though the catalog still lists them.
    let status = manager.status().await;
    assert_eq!(status.slot_count, RETENTION_CAP);
    let out = dir.path().join("out");
    assert!(manager.export_to_file(2, &out).is_err());
    assert!(manager.export_to_file(3, &out).is_ok());

    let merged = manager.list().await;
    let timestamps: Vec<i64> = merged.iter().map(|s| s.timestamp).collect();
    assert_eq!(
        timestamps,
        (1..=12).rev().collect::<Vec<i64>>(),
        "catalog is the union of both backends"
    );
    assert_eq!(status.newest_timestamp, 12);
    assert!(status.has_backups);
}

#[tokio::test]
async fn imported_file_shows_up_in_the_catalog() {
    let base_url = serve_mock(Arc::new(MockGys::default())).await;
    let dir = tempfile::TempDir::new().unwrap();
    let manager = make_manager(dir.path(), &base_url, RETENTION_CAP);

    let file_path = dir.path().join("handoff.json");
    std::fs::write(
        &file_path,
        r#"{"timestamp": 5000, "entities": {"products": [{"id": 1, "name": "X"}], "clients": [], "sales": [], "categories": []}}"#,
    )
    .unwrap();

    assert!(manager.import_from_file(&file_path).await);

    let snapshots = manager.list().await;
    let imported = snapshots
        .iter()
        .find(|s| s.timestamp == 5000)
        .expect("imported snapshot should be listed");
    assert_eq!(imported.entities.products[0]["name"], json!("X"));
}

#[tokio::test]
async fn restore_replays_records_through_the_api() {
    let state = Arc::new(MockGys::default());
    let base_url = serve_mock(Arc::clone(&state)).await;
    let dir = tempfile::TempDir::new().unwrap();
    let manager = make_manager(dir.path(), &base_url, RETENTION_CAP);

    manager
        .import_json(
            r#"{"timestamp": 7000, "entities": {
                "products": [{"id": 1, "name": "Ledger"}, {"id": 2, "name": "Stamp"}],
                "clients": [{"id": 9, "name": "Acme"}],
                "sales": [],
                "categories": [{"id": 3, "name": "Stationery"}],
                "company": {"name": "Acme HQ"}
            }}"#,
        )
        .await;

    // A missing timestamp fails fast and must not touch the API.
    assert!(!manager.restore(999).await);
    assert!(state.created.lock().unwrap().is_empty());

    assert!(manager.restore(7000).await);

    assert_eq!(state.created_for("products").len(), 2);
    assert_eq!(state.created_for("products")[1]["name"], json!("Stamp"));
    assert_eq!(state.created_for("clients").len(), 1);
    assert_eq!(state.created_for("sales").len(), 0);
    assert_eq!(state.created_for("categories").len(), 1);
    assert!(
        state.created_for("company").is_empty(),
        "the company profile is never replayed"
    );
}
