//! End-to-end breaker behavior against a mock upstream.

use circuit_guard::{
    Breaker, BreakerConfig, BreakerError, MemoryStore, RecordStore, RequestSpec,
};
use std::sync::Arc;
use std::time::{Duration, SystemTime, UNIX_EPOCH};
use wiremock::matchers::method;
use wiremock::{Mock, MockServer, ResponseTemplate};

fn now_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap()
        .as_millis() as u64
}

fn window_millis(breaker: &Breaker) -> u64 {
    breaker.config().fault_window.as_millis() as u64
}

async fn mount_upstream(server: &MockServer, status: u16, body: &str) {
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(status).set_body_string(body))
        .mount(server)
        .await;
}

#[tokio::test]
async fn allows_requests_through_and_passes_the_response_back() {
    let server = MockServer::start().await;
    mount_upstream(&server, 200, "Oh yeah! it worked").await;

    let breaker = Breaker::new("geo");
    let response = breaker.run(RequestSpec::get(server.uri())).await.unwrap();

    assert_eq!(response.status().as_u16(), 200);
    assert_eq!(response.text().unwrap(), "Oh yeah! it worked");
}

#[tokio::test]
async fn success_leaves_the_record_untouched() {
    let server = MockServer::start().await;
    mount_upstream(&server, 200, "Oh yeah! it worked").await;

    let store = Arc::new(MemoryStore::new());
    let breaker = Breaker::new("geo").with_store(store.clone());

    // One existing fault, old enough that the window clause is idle.
    let mut seeded = breaker.setup().await.unwrap();
    seeded.consecutive_faults = 1;
    seeded.fault_count = 1;
    seeded.fault_timestamp = now_millis() - window_millis(&breaker) - 5_000;
    store.set("geo", seeded.clone()).await.unwrap();

    breaker.run(RequestSpec::get(server.uri())).await.unwrap();

    // Counters only reset via window-driven restoration, never on a bare
    // successful call.
    let record = store.get("geo").await.unwrap().unwrap();
    assert_eq!(record, seeded);
}

#[tokio::test]
async fn failed_request_rejects_with_status_and_body() {
    let server = MockServer::start().await;
    mount_upstream(&server, 403, "It all went wrong").await;

    let breaker = Breaker::new("geo");
    let err = breaker
        .run(RequestSpec::get(server.uri()))
        .await
        .unwrap_err();

    assert_eq!(err.to_string(), "403: It all went wrong");
    assert_eq!(err.status_code(), Some(403));
}

#[tokio::test]
async fn first_fault_increments_the_record_without_tripping() {
    let server = MockServer::start().await;
    mount_upstream(&server, 403, "It all went wrong").await;

    let store = Arc::new(MemoryStore::new());
    let breaker = Breaker::new("geo").with_store(store.clone());

    breaker
        .run(RequestSpec::get(server.uri()))
        .await
        .unwrap_err();

    let record = store.get("geo").await.unwrap().unwrap();
    assert_eq!(record.consecutive_faults, 1);
    assert_eq!(record.fault_count, 1);
    assert!(record.fault_timestamp > 0);
    assert!(!record.tripped);
    assert_eq!(record.trip_timestamp, 0);
}

#[tokio::test]
async fn trips_after_too_many_consecutive_faults() {
    let server = MockServer::start().await;
    mount_upstream(&server, 403, "It all went wrong").await;

    let store = Arc::new(MemoryStore::new());
    let breaker = Breaker::with_config(
        "geo",
        BreakerConfig::default().with_consecutive_fault_limit(2),
    )
    .with_store(store.clone());

    // One fault already on the books.
    let mut seeded = breaker.setup().await.unwrap();
    seeded.consecutive_faults = 1;
    seeded.fault_count = 1;
    seeded.fault_timestamp = now_millis();
    store.set("geo", seeded).await.unwrap();

    breaker
        .run(RequestSpec::get(server.uri()))
        .await
        .unwrap_err();

    let record = store.get("geo").await.unwrap().unwrap();
    assert_eq!(record.fault_count, 2);
    assert_eq!(record.consecutive_faults, 2);
    assert!(record.tripped);
    assert!(record.trip_timestamp > 0);
}

#[tokio::test]
async fn trips_on_a_fault_inside_the_active_window() {
    let server = MockServer::start().await;
    mount_upstream(&server, 403, "It all went wrong").await;

    let store = Arc::new(MemoryStore::new());
    let breaker = Breaker::new("geo").with_store(store.clone());

    // Previous faults still inside the window, consecutive limit not reached.
    let mut seeded = breaker.setup().await.unwrap();
    seeded.fault_count = breaker.config().windowed_fault_limit - 1;
    seeded.fault_timestamp = now_millis() - window_millis(&breaker) + 75;
    store.set("geo", seeded).await.unwrap();

    breaker
        .run(RequestSpec::get(server.uri()))
        .await
        .unwrap_err();

    let record = store.get("geo").await.unwrap().unwrap();
    assert_eq!(record.fault_count, breaker.config().windowed_fault_limit);
    assert!(record.tripped);
    assert!(record.trip_timestamp > 0);
}

#[tokio::test]
async fn fails_fast_while_tripped_without_touching_the_upstream() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(403).set_body_string("It all went wrong"))
        .expect(0)
        .mount(&server)
        .await;

    let store = Arc::new(MemoryStore::new());
    let breaker = Breaker::new("geo").with_store(store.clone());

    let mut seeded = breaker.setup().await.unwrap();
    seeded.consecutive_faults = 3;
    seeded.fault_count = 3;
    seeded.fault_timestamp = now_millis();
    seeded.tripped = true;
    seeded.trip_timestamp = now_millis();
    store.set("geo", seeded).await.unwrap();

    let err = breaker
        .run(RequestSpec::get(server.uri()))
        .await
        .unwrap_err();

    assert!(err.is_tripped());
    assert_eq!(err.to_string(), "Circuit: geo is tripped");
    server.verify().await;
}

#[tokio::test]
async fn restores_the_record_once_the_window_has_expired() {
    let server = MockServer::start().await;
    mount_upstream(&server, 200, "Oh yeah! it worked").await;

    let store = Arc::new(MemoryStore::new());
    let breaker = Breaker::new("geo").with_store(store.clone());

    let stale = now_millis() - window_millis(&breaker) - 100;
    let mut seeded = breaker.setup().await.unwrap();
    seeded.fault_count = 5;
    seeded.consecutive_faults = 3;
    seeded.tripped = true;
    seeded.trip_timestamp = stale;
    seeded.fault_timestamp = stale;
    store.set("geo", seeded).await.unwrap();

    let response = breaker.run(RequestSpec::get(server.uri())).await.unwrap();
    assert_eq!(response.status().as_u16(), 200);
    assert_eq!(response.text().unwrap(), "Oh yeah! it worked");

    let record = store.get("geo").await.unwrap().unwrap();
    assert_eq!(record.fault_count, 0);
    assert_eq!(record.consecutive_faults, 0);
    assert!(!record.tripped);
    assert_eq!(record.trip_timestamp, 0);
}

#[tokio::test]
async fn times_out_slow_requests_and_records_the_fault() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string("Oh yeah! it worked")
                .set_delay(Duration::from_millis(100)),
        )
        .mount(&server)
        .await;

    let store = Arc::new(MemoryStore::new());
    let breaker = Breaker::with_config(
        "geo",
        BreakerConfig::default().with_request_timeout(Duration::from_millis(50)),
    )
    .with_store(store.clone());

    let err = breaker
        .run(RequestSpec::get(server.uri()))
        .await
        .unwrap_err();

    assert_eq!(err.to_string(), "Request timed out");
    assert_eq!(err.status_code(), Some(500));

    let record = store.get("geo").await.unwrap().unwrap();
    assert_eq!(record.consecutive_faults, 1);
    assert_eq!(record.fault_count, 1);
    assert!(record.fault_timestamp > 0);
    assert!(!record.tripped);
}

#[tokio::test]
async fn connection_refused_counts_as_a_fault() {
    let store = Arc::new(MemoryStore::new());
    let breaker = Breaker::new("geo").with_store(store.clone());

    // Port 9 (discard) is a safe nothing-listens target.
    let err = breaker
        .run(RequestSpec::get("http://127.0.0.1:9/"))
        .await
        .unwrap_err();
    assert!(matches!(err, BreakerError::Http(_)));

    let record = store.get("geo").await.unwrap().unwrap();
    assert_eq!(record.consecutive_faults, 1);
    assert_eq!(record.fault_count, 1);
}

#[tokio::test]
async fn auto_provisions_the_record_on_first_run() {
    let server = MockServer::start().await;
    mount_upstream(&server, 200, "Oh yeah! it worked").await;

    let store = Arc::new(MemoryStore::new());
    let breaker = Breaker::new("geo").with_store(store.clone());

    assert!(store.get("geo").await.unwrap().is_none());
    breaker.run(RequestSpec::get(server.uri())).await.unwrap();

    let record = store.get("geo").await.unwrap().unwrap();
    assert_eq!(record.consecutive_faults, 0);
    assert!(!record.tripped);
    assert_eq!(record.config, *breaker.config());
}
