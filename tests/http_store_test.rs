//! HttpStreakStore against an in-process document service.

use axum::body::Bytes;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::get;
use axum::Router;
use daystreak::{HttpStreakStore, StoreError, StreakRecord, StreakStore, UserId};
use reqwest::Url;
use std::collections::{BTreeMap, HashMap};
use std::str::FromStr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

#[derive(Clone, Default)]
struct DocumentService {
    documents: Arc<Mutex<HashMap<String, Bytes>>>,
    attempts: Arc<AtomicUsize>,
}

async fn get_document(
    State(service): State<DocumentService>,
    Path(id): Path<String>,
) -> impl IntoResponse {
    service.attempts.fetch_add(1, Ordering::SeqCst);
    match service.documents.lock().unwrap().get(&id) {
        Some(body) => (StatusCode::OK, body.clone()).into_response(),
        None => StatusCode::NOT_FOUND.into_response(),
    }
}

async fn put_document(
    State(service): State<DocumentService>,
    Path(id): Path<String>,
    body: Bytes,
) -> StatusCode {
    service.attempts.fetch_add(1, Ordering::SeqCst);
    service.documents.lock().unwrap().insert(id, body);
    StatusCode::NO_CONTENT
}

async fn failing(State(service): State<DocumentService>) -> StatusCode {
    service.attempts.fetch_add(1, Ordering::SeqCst);
    StatusCode::INTERNAL_SERVER_ERROR
}

async fn locked(State(service): State<DocumentService>) -> StatusCode {
    service.attempts.fetch_add(1, Ordering::SeqCst);
    StatusCode::UNAUTHORIZED
}

/// Fails the first two requests, then behaves like the healthy service.
async fn flaky_get(
    State(service): State<DocumentService>,
    Path(id): Path<String>,
) -> axum::response::Response {
    if service.attempts.load(Ordering::SeqCst) < 2 {
        service.attempts.fetch_add(1, Ordering::SeqCst);
        return StatusCode::SERVICE_UNAVAILABLE.into_response();
    }
    get_document(State(service), Path(id)).await.into_response()
}

async fn spawn_service(service: DocumentService) -> Url {
    let app = Router::new()
        .route("/streaks/:id", get(get_document).put(put_document))
        .route("/down/streaks/:id", get(failing).put(failing))
        .route("/locked/streaks/:id", get(locked).put(locked))
        .route("/flaky/streaks/:id", get(flaky_get))
        .with_state(service);

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    Url::parse(&format!("http://{}", addr)).unwrap()
}

fn user(id: &str) -> UserId {
    UserId::from_str(id).unwrap()
}

fn record() -> StreakRecord {
    StreakRecord {
        current_streak: 2,
        longest_streak: 4,
        last_active_date: "2024-01-02".to_string(),
        history: BTreeMap::from([
            ("2024-01-01".to_string(), true),
            ("2024-01-02".to_string(), true),
        ]),
    }
}

#[tokio::test]
async fn test_missing_document_is_none() {
    let base = spawn_service(DocumentService::default()).await;
    let store = HttpStreakStore::new(base, Duration::ZERO);

    assert_eq!(store.get_snapshot(&user("alice")).await.unwrap(), None);
}

#[tokio::test]
async fn test_put_then_get() {
    let service = DocumentService::default();
    let base = spawn_service(service.clone()).await;
    let store = HttpStreakStore::new(base, Duration::ZERO);

    store.put_snapshot(&user("alice"), &record()).await.unwrap();
    let loaded = store.get_snapshot(&user("alice")).await.unwrap();
    assert_eq!(loaded, Some(record()));

    let raw = service.documents.lock().unwrap().get("alice").cloned().unwrap();
    let json: serde_json::Value = serde_json::from_slice(&raw).unwrap();
    assert_eq!(json["currentStreak"], 2);
    assert_eq!(json["lastActiveDate"], "2024-01-02");
    assert_eq!(json["history"]["2024-01-01"], true);
}

#[tokio::test]
async fn test_document_without_history_decodes() {
    let service = DocumentService::default();
    service.documents.lock().unwrap().insert(
        "alice".to_string(),
        Bytes::from_static(
            br#"{"currentStreak":1,"longestStreak":1,"lastActiveDate":"2024-01-02T08:30:00.000Z"}"#,
        ),
    );
    let base = spawn_service(service).await;
    let store = HttpStreakStore::new(base, Duration::ZERO);

    let loaded = store.get_snapshot(&user("alice")).await.unwrap().unwrap();
    assert!(loaded.history.is_empty());
    assert_eq!(loaded.last_active_date, "2024-01-02T08:30:00.000Z");
}

#[tokio::test]
async fn test_undecodable_document_is_corrupt() {
    let service = DocumentService::default();
    service
        .documents
        .lock()
        .unwrap()
        .insert("alice".to_string(), Bytes::from_static(b"<html>oops</html>"));
    let base = spawn_service(service.clone()).await;
    let store = HttpStreakStore::new(base, Duration::from_secs(5));

    let err = store.get_snapshot(&user("alice")).await.unwrap_err();
    assert!(matches!(err, StoreError::Corrupt { ref user, .. } if user == "alice"));
    // Decoding failures are not retried.
    assert_eq!(service.attempts.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_server_error_is_unavailable() {
    let service = DocumentService::default();
    let base = spawn_service(service.clone()).await;
    let store = HttpStreakStore::new(base.join("down/").unwrap(), Duration::ZERO);

    assert!(matches!(
        store.get_snapshot(&user("alice")).await,
        Err(StoreError::StorageUnavailable(_))
    ));
    assert!(matches!(
        store.put_snapshot(&user("alice"), &record()).await,
        Err(StoreError::StorageUnavailable(_))
    ));
    assert!(service.attempts.load(Ordering::SeqCst) >= 2);
}

#[tokio::test]
async fn test_unauthorized_is_not_retried() {
    let service = DocumentService::default();
    let base = spawn_service(service.clone()).await;
    let store = HttpStreakStore::new(base.join("locked/").unwrap(), Duration::from_secs(5));

    assert_eq!(
        store.get_snapshot(&user("alice")).await,
        Err(StoreError::NotAuthenticated)
    );
    assert_eq!(service.attempts.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_transient_failures_are_retried() {
    let service = DocumentService::default();
    service.documents.lock().unwrap().insert(
        "alice".to_string(),
        Bytes::from(serde_json::to_vec(&record()).unwrap()),
    );
    let base = spawn_service(service.clone()).await;
    let store = HttpStreakStore::new(base.join("flaky/").unwrap(), Duration::from_secs(30));

    let loaded = store.get_snapshot(&user("alice")).await.unwrap();
    assert_eq!(loaded, Some(record()));
    assert_eq!(service.attempts.load(Ordering::SeqCst), 3);
}

#[tokio::test]
async fn test_unreachable_service_is_unavailable() {
    // Bind and drop to get a port nothing listens on.
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let base = Url::parse(&format!("http://{}", addr)).unwrap();
    let store = HttpStreakStore::new(base, Duration::ZERO);
    assert!(matches!(
        store.get_snapshot(&user("alice")).await,
        Err(StoreError::StorageUnavailable(_))
    ));
}
