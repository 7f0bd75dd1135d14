//! The retrying HTTP client.
//!
//! # Responsibilities
//! - Hold the transport and the current retry configuration
//! - Let callers change the configuration between calls
//! - Provide GET/POST helpers over `execute`
//!
//! # Design Decisions
//! - Configuration lives in an `ArcSwap`; every call takes one snapshot, so a
//!   change never affects a call already in flight
//! - Clones share both the transport pool and the configuration

use std::sync::Arc;
use std::time::Duration;

use arc_swap::ArcSwap;
use http::header::CONTENT_TYPE;

use crate::config::{ClientConfig, RetrySettings};
use crate::error::Result;
use crate::http::context::Context;
use crate::http::request::{ReplayBody, Request};
use crate::http::response::Response;
use crate::http::transport::{HyperTransport, Transport};
use crate::resilience::backoff::BackoffPolicy;
use crate::resilience::executor::{RetryConfig, RetryExecutor};
use crate::resilience::retries::RetryPolicy;

/// HTTP client that retries failed requests.
#[derive(Clone)]
pub struct RetryClient {
    transport: Arc<dyn Transport>,
    config: Arc<ArcSwap<RetryConfig>>,
}

impl RetryClient {
    /// Create a client on the default hyper transport with default retry settings.
    pub fn new() -> Self {
        Self::with_transport(HyperTransport::new())
    }

    /// Create a client with default retry settings on the given transport.
    pub fn with_transport<T>(transport: T) -> Self
    where
        T: Transport + 'static,
    {
        Self::with_config(transport, RetryConfig::default())
    }

    /// Create a client with an explicit transport and retry configuration.
    pub fn with_config<T>(transport: T, config: RetryConfig) -> Self
    where
        T: Transport + 'static,
    {
        Self {
            transport: Arc::new(transport),
            config: Arc::new(ArcSwap::from_pointee(config)),
        }
    }

    /// Create a client from a loaded configuration file.
    pub fn from_settings(settings: &ClientConfig) -> Self {
        Self::with_config(
            HyperTransport::from_config(&settings.transport),
            RetryConfig::from_settings(&settings.retry),
        )
    }

    /// Snapshot of the configuration the next call will use.
    pub fn config(&self) -> Arc<RetryConfig> {
        self.config.load_full()
    }

    /// Replace the whole retry configuration.
    pub fn set_config(&self, config: RetryConfig) {
        self.config.store(Arc::new(config));
    }

    /// Replace the retry configuration from a config file section.
    pub fn apply_settings(&self, settings: &RetrySettings) {
        self.set_config(RetryConfig::from_settings(settings));
        tracing::debug!(
            wait_min_ms = settings.wait_min_ms,
            wait_max_ms = settings.wait_max_ms,
            max_retries = settings.max_retries,
            "Retry configuration updated"
        );
    }

    pub fn set_retry_wait_min(&self, wait: Duration) {
        self.update(|config| config.wait_min = wait);
    }

    pub fn set_retry_wait_max(&self, wait: Duration) {
        self.update(|config| config.wait_max = wait);
    }

    pub fn set_retry_max(&self, max_retries: u32) {
        self.update(|config| config.max_retries = max_retries);
    }

    pub fn set_retry_policy<P>(&self, policy: P)
    where
        P: RetryPolicy + 'static,
    {
        let policy: Arc<dyn RetryPolicy> = Arc::new(policy);
        self.update(|config| config.retry_policy = policy.clone());
    }

    pub fn set_backoff_policy<B>(&self, backoff: B)
    where
        B: BackoffPolicy + 'static,
    {
        let backoff: Arc<dyn BackoffPolicy> = Arc::new(backoff);
        self.update(|config| config.backoff = backoff.clone());
    }

    fn update<F>(&self, f: F)
    where
        F: Fn(&mut RetryConfig),
    {
        self.config.rcu(|current| {
            let mut next = RetryConfig::clone(current);
            f(&mut next);
            next
        });
    }

    /// Issue a request, retrying according to the current configuration.
    pub async fn execute(&self, request: Request) -> Result<Response> {
        RetryExecutor::new(self.config.load_full(), self.transport.clone())
            .execute(request)
            .await
    }

    /// GET `target` without cancellation.
    pub async fn get(&self, target: &str) -> Result<Response> {
        let request = Request::new(Context::background(), "GET", target, None)?;
        self.execute(request).await
    }

    /// POST `body` to `target` with the given content type, without cancellation.
    pub async fn post(
        &self,
        target: &str,
        content_type: &str,
        body: Option<ReplayBody>,
    ) -> Result<Response> {
        let mut request = Request::new(Context::background(), "POST", target, body)?;
        request.set_header(CONTENT_TYPE.as_str(), content_type)?;
        self.execute(request).await
    }
}

impl Default for RetryClient {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Mutex;

    use async_trait::async_trait;
    use http::{HeaderMap, StatusCode};

    use crate::error::{Error, TransportError};
    use crate::http::request::RequestBody;
    use crate::http::response::full;
    use crate::resilience::backoff::ConstantBackoff;
    use crate::resilience::executor::{DEFAULT_RETRY_MAX, DEFAULT_RETRY_WAIT_MAX, DEFAULT_RETRY_WAIT_MIN};
    use crate::resilience::retries::{AttemptOutcome, RetryDecision};

    /// Always answers with the same status and remembers request headers.
    struct FixedStatus {
        status: StatusCode,
        calls: AtomicU32,
        headers: Mutex<Vec<HeaderMap>>,
    }

    impl FixedStatus {
        fn new(status: StatusCode) -> Arc<Self> {
            Arc::new(Self {
                status,
                calls: AtomicU32::new(0),
                headers: Mutex::new(Vec::new()),
            })
        }
    }

    #[async_trait]
    impl Transport for FixedStatus {
        async fn send(&self, request: http::Request<RequestBody>) -> std::result::Result<Response, TransportError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.headers.lock().unwrap().push(request.headers().clone());
            let mut response = Response::new(full("ok"));
            *response.status_mut() = self.status;
            Ok(response)
        }
    }

    #[test]
    fn test_default_configuration() {
        let client = RetryClient::with_transport(FixedStatus::new(StatusCode::OK));
        let config = client.config();
        assert_eq!(config.wait_min, DEFAULT_RETRY_WAIT_MIN);
        assert_eq!(config.wait_max, DEFAULT_RETRY_WAIT_MAX);
        assert_eq!(config.max_retries, DEFAULT_RETRY_MAX);
    }

    #[tokio::test(start_paused = true)]
    async fn test_setters_apply_to_next_call() {
        let transport = FixedStatus::new(StatusCode::SERVICE_UNAVAILABLE);
        let client = RetryClient::with_transport(transport.clone());
        client.set_retry_wait_min(Duration::from_millis(10));
        client.set_retry_wait_max(Duration::from_millis(20));

        let err = client.get("http://example.com/").await.unwrap_err();
        assert!(err.is_exhausted());
        assert_eq!(transport.calls.load(Ordering::SeqCst), DEFAULT_RETRY_MAX + 1);

        client.set_retry_max(1);
        let err = client.get("http://example.com/").await.unwrap_err();
        assert_eq!(err.to_string(), "GET http://example.com/ giving up after 2 attempts");
        assert_eq!(transport.calls.load(Ordering::SeqCst), DEFAULT_RETRY_MAX + 1 + 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_clones_share_configuration() {
        let transport = FixedStatus::new(StatusCode::SERVICE_UNAVAILABLE);
        let client = RetryClient::with_transport(transport.clone());
        let clone = client.clone();

        client.set_retry_max(0);
        assert!(clone.get("http://example.com/").await.unwrap_err().is_exhausted());
        assert_eq!(transport.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_custom_policies() {
        let transport = FixedStatus::new(StatusCode::NOT_FOUND);
        let client = RetryClient::with_transport(transport.clone());
        client.set_retry_max(2);
        client.set_backoff_policy(ConstantBackoff);
        client.set_retry_policy(|outcome: &AttemptOutcome| match outcome {
            Ok(response) if response.status() == StatusCode::NOT_FOUND => RetryDecision::retry(),
            _ => RetryDecision::stop(),
        });

        let err = client.get("http://example.com/missing").await.unwrap_err();
        assert!(err.is_exhausted());
        assert_eq!(transport.calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_post_sets_content_type() {
        let transport = FixedStatus::new(StatusCode::CREATED);
        let client = RetryClient::with_transport(transport.clone());

        let response = client
            .post("http://example.com/items", "application/json", Some(r#"{"id":1}"#.into()))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::CREATED);
        let headers = transport.headers.lock().unwrap();
        assert_eq!(headers[0][CONTENT_TYPE], "application/json");
    }

    #[tokio::test]
    async fn test_invalid_target_is_rejected_before_sending() {
        let transport = FixedStatus::new(StatusCode::OK);
        let client = RetryClient::with_transport(transport.clone());

        let err = client.get("::not a url::").await.unwrap_err();
        assert!(matches!(err, Error::InvalidUrl(_)));
        assert_eq!(transport.calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_apply_settings() {
        let client = RetryClient::with_transport(FixedStatus::new(StatusCode::OK));
        client.apply_settings(&RetrySettings {
            wait_min_ms: 5,
            wait_max_ms: 50,
            max_retries: 1,
            ..RetrySettings::default()
        });

        let config = client.config();
        assert_eq!(config.wait_min, Duration::from_millis(5));
        assert_eq!(config.wait_max, Duration::from_millis(50));
        assert_eq!(config.max_retries, 1);
    }
}
