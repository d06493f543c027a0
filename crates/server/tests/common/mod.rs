//! Common test utilities for API testing with mocks.
//!
//! Provides an in-process router over in-memory stores and the mock device
//! driver, so the full HTTP surface can be exercised without a handset.

use std::sync::Arc;
use std::time::Duration;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use serde_json::Value;
use tower::ServiceExt;

use herald_core::{
    testing::MockDriver, Config, ContactStore, Dispatcher, EventBus, Policy, PolicyStore,
    QuotaLedger, QuotaStore, RunStore, SqliteContactStore, SqlitePolicyStore, SqliteQuotaStore,
    SqliteRunStore,
};
use herald_server::{api::create_router, state::AppState};

/// Re-export fixtures for test convenience
pub use herald_core::testing::fixtures;

/// Test fixture wiring the router to controllable dependencies.
pub struct TestFixture {
    /// The Axum router for testing
    pub router: Router,
    /// Contact store handle for direct seeding
    pub contacts: Arc<SqliteContactStore>,
    /// Mock device driver - inject failures, inspect sends
    pub driver: Arc<MockDriver>,
    /// Dispatcher handle, for waiting out background workers
    pub dispatcher: Arc<Dispatcher>,
}

/// Response from a test request
#[derive(Debug)]
pub struct TestResponse {
    pub status: StatusCode,
    pub body: Value,
    pub raw_body: String,
    pub content_type: Option<String>,
}

impl TestFixture {
    /// Create a new test fixture with the given policy pre-saved.
    pub async fn with_policy(policy: Policy) -> Self {
        let contacts = Arc::new(SqliteContactStore::in_memory().unwrap());
        let policy_store = Arc::new(SqlitePolicyStore::in_memory().unwrap());
        policy_store.save(&policy).unwrap();
        let quota_store = Arc::new(SqliteQuotaStore::in_memory().unwrap());
        let quota =
            Arc::new(QuotaLedger::new(Arc::clone(&quota_store) as Arc<dyn QuotaStore>).unwrap());
        let runs = Arc::new(SqliteRunStore::in_memory().unwrap());
        let driver = Arc::new(MockDriver::new());
        let events = EventBus::new(64, Duration::from_millis(100));

        let dispatcher = Arc::new(Dispatcher::new(
            Arc::clone(&contacts) as Arc<dyn ContactStore>,
            Arc::clone(&policy_store) as Arc<dyn PolicyStore>,
            Arc::clone(&quota),
            Arc::clone(&driver) as Arc<dyn herald_core::DeviceDriver>,
            Arc::clone(&runs) as Arc<dyn RunStore>,
            events,
        ));

        let state = Arc::new(AppState::new(
            Config::default(),
            Arc::clone(&contacts) as Arc<dyn ContactStore>,
            Arc::clone(&policy_store) as Arc<dyn PolicyStore>,
            quota,
            Arc::clone(&runs) as Arc<dyn RunStore>,
            Arc::clone(&driver) as Arc<dyn herald_core::DeviceDriver>,
            Arc::clone(&dispatcher),
        ));

        let router = create_router(state);

        Self {
            router,
            contacts,
            driver,
            dispatcher,
        }
    }

    /// Create a new test fixture with a zero-delay policy.
    pub async fn new() -> Self {
        Self::with_policy(Policy {
            delay_seconds: 0,
            ..Policy::default()
        })
        .await
    }

    /// Wait until the dispatch worker has fully settled.
    pub async fn wait_dispatch_idle(&self) {
        let start = std::time::Instant::now();
        loop {
            let record = self.dispatcher.status().await;
            if record.status.is_terminal() && !self.dispatcher.is_running() {
                return;
            }
            assert!(
                start.elapsed() < Duration::from_secs(5),
                "dispatch did not settle, status {:?}",
                record.status
            );
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
    }

    /// Send a GET request to the test server.
    pub async fn get(&self, path: &str) -> TestResponse {
        self.request("GET", path, None).await
    }

    /// Send a POST request with JSON body.
    pub async fn post(&self, path: &str, body: Value) -> TestResponse {
        self.request("POST", path, Some(body)).await
    }

    /// Send a POST request with an empty body.
    pub async fn post_empty(&self, path: &str) -> TestResponse {
        self.request("POST", path, None).await
    }

    /// Send a PUT request with JSON body.
    pub async fn put(&self, path: &str, body: Value) -> TestResponse {
        self.request("PUT", path, Some(body)).await
    }

    /// Send a DELETE request.
    pub async fn delete(&self, path: &str) -> TestResponse {
        self.request("DELETE", path, None).await
    }

    /// Upload a file as multipart/form-data under the field name "file".
    pub async fn post_file(&self, path: &str, contents: &str) -> TestResponse {
        let boundary = "herald-test-boundary";
        let body = format!(
            "--{boundary}\r\nContent-Disposition: form-data; name=\"file\"; filename=\"contacts.csv\"\r\nContent-Type: text/csv\r\n\r\n{contents}\r\n--{boundary}--\r\n"
        );

        let request = Request::builder()
            .method("POST")
            .uri(path)
            .header(
                "Content-Type",
                format!("multipart/form-data; boundary={boundary}"),
            )
            .body(Body::from(body))
            .unwrap();

        self.send(request).await
    }

    /// Send a request to the test server.
    async fn request(&self, method: &str, path: &str, body: Option<Value>) -> TestResponse {
        let mut request_builder = Request::builder().method(method).uri(path);

        let body = if let Some(json_body) = body {
            request_builder = request_builder.header("Content-Type", "application/json");
            Body::from(serde_json::to_vec(&json_body).unwrap())
        } else {
            Body::empty()
        };

        self.send(request_builder.body(body).unwrap()).await
    }

    async fn send(&self, request: Request<Body>) -> TestResponse {
        let response = self
            .router
            .clone()
            .oneshot(request)
            .await
            .expect("Failed to send request");

        let status = response.status();
        let content_type = response
            .headers()
            .get("content-type")
            .and_then(|v| v.to_str().ok())
            .map(String::from);
        let body_bytes = response
            .into_body()
            .collect()
            .await
            .expect("Failed to collect body")
            .to_bytes();

        let raw_body = String::from_utf8_lossy(&body_bytes).into_owned();
        let body: Value = if body_bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&body_bytes).unwrap_or(Value::Null)
        };

        TestResponse {
            status,
            body,
            raw_body,
            content_type,
        }
    }
}

/// Helper to assert a response has expected status.
#[macro_export]
macro_rules! assert_status {
    ($response:expr, $status:expr) => {
        assert_eq!(
            $response.status, $status,
            "Expected status {:?}, got {:?}. Body: {}",
            $status, $response.status, $response.raw_body
        );
    };
}
