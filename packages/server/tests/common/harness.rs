//! Test harness for driving the HTTP surface in-process.
//!
//! Each test gets its own store, mock notifier and mock clock; nothing is
//! shared between tests and no socket is opened.

use axum::{
    body::{to_bytes, Body},
    http::{header::CONTENT_TYPE, Method, Request, StatusCode},
    Router,
};
use serde_json::Value;
use server_core::domains::auth::OtpSettings;
use server_core::kernel::{MockClock, MockNotifier, TestDependencies};
use server_core::server::build_app;
use test_context::AsyncTestContext;
use tower::ServiceExt;

/// Test harness that wires the router to mocks.
///
/// # Example using test-context
///
/// ```ignore
/// use test_context::test_context;
///
/// #[test_context(TestHarness)]
/// #[tokio::test]
/// async fn my_test(ctx: &TestHarness) {
///     let (status, body) = ctx.send_sms("+15551234567").await;
///     // ... test code
/// }
/// ```
pub struct TestHarness {
    pub app: Router,
    /// Records every outbound SMS; can be switched to fail
    pub notifier: MockNotifier,
    /// Advance this instead of sleeping
    pub clock: MockClock,
}

impl AsyncTestContext for TestHarness {
    async fn setup() -> Self {
        // Run tests with: RUST_LOG=debug cargo test -- --nocapture
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_test_writer()
            .try_init();

        Self::with_settings(OtpSettings::default())
    }

    async fn teardown(self) {
        // Store is dropped with the router
    }
}

impl TestHarness {
    pub fn with_settings(settings: OtpSettings) -> Self {
        let test_deps = TestDependencies::with_settings(settings);
        Self {
            app: build_app(test_deps.deps),
            notifier: test_deps.notifier,
            clock: test_deps.clock,
        }
    }

    /// Send a raw request body to `path` and decode the JSON response
    pub async fn post_raw(&self, path: &str, body: &str) -> (StatusCode, Value) {
        let request = Request::builder()
            .method(Method::POST)
            .uri(path)
            .header(CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .expect("request should build");

        self.call(request).await
    }

    pub async fn post_json(&self, path: &str, body: Value) -> (StatusCode, Value) {
        self.post_raw(path, &body.to_string()).await
    }

    pub async fn get(&self, path: &str) -> (StatusCode, Value) {
        let request = Request::builder()
            .method(Method::GET)
            .uri(path)
            .body(Body::empty())
            .expect("request should build");

        self.call(request).await
    }

    pub async fn send_sms(&self, phone_number: &str) -> (StatusCode, Value) {
        self.post_json(
            "/send-sms",
            serde_json::json!({ "phone_number": phone_number }),
        )
        .await
    }

    pub async fn verify_code(&self, phone_number: &str, code: &str) -> (StatusCode, Value) {
        self.post_json(
            "/verify-code",
            serde_json::json!({ "phone_number": phone_number, "code": code }),
        )
        .await
    }

    /// Code from the most recent SMS to `phone_number`
    pub fn last_code(&self, phone_number: &str) -> String {
        self.notifier
            .last_code_for(phone_number)
            .expect("an SMS with a code should have been sent")
    }

    async fn call(&self, request: Request<Body>) -> (StatusCode, Value) {
        let response = self
            .app
            .clone()
            .oneshot(request)
            .await
            .expect("router is infallible");

        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("body should be readable");
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or(Value::Null)
        };
        (status, body)
    }
}
