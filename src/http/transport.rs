//! The transport collaborator.
//!
//! # Responsibilities
//! - Send exactly one HTTP request and return the response or a failure
//! - Own connection pooling, DNS and timeouts (not the retry layer's concern)
//!
//! # Design Decisions
//! - Object-safe trait so the client can hold any transport behind an `Arc`
//! - Default implementation is the hyper-util legacy pooled client

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use http_body_util::BodyExt;
use hyper_util::{
    client::legacy::{connect::HttpConnector, Client},
    rt::TokioExecutor,
};

use crate::config::TransportConfig;
use crate::error::TransportError;
use crate::http::request::RequestBody;
use crate::http::response::Response;

/// Sends a single HTTP request.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn send(&self, request: http::Request<RequestBody>) -> Result<Response, TransportError>;
}

#[async_trait]
impl<T> Transport for Arc<T>
where
    T: Transport + ?Sized,
{
    async fn send(&self, request: http::Request<RequestBody>) -> Result<Response, TransportError> {
        (**self).send(request).await
    }
}

/// Pooled HTTP/1.1 and HTTP/2 transport backed by hyper.
#[derive(Clone)]
pub struct HyperTransport {
    client: Client<HttpConnector, RequestBody>,
}

impl HyperTransport {
    /// Create a transport with default pool settings.
    pub fn new() -> Self {
        Self::from_config(&TransportConfig::default())
    }

    /// Create a transport from configuration.
    pub fn from_config(config: &TransportConfig) -> Self {
        let mut connector = HttpConnector::new();
        connector.set_connect_timeout(Some(Duration::from_secs(config.connect_secs)));
        connector.set_nodelay(config.tcp_nodelay);

        let client = Client::builder(TokioExecutor::new())
            .pool_idle_timeout(Duration::from_secs(config.pool_idle_secs))
            .pool_max_idle_per_host(config.pool_max_idle_per_host)
            .build(connector);

        tracing::debug!(
            connect_secs = config.connect_secs,
            pool_idle_secs = config.pool_idle_secs,
            pool_max_idle_per_host = config.pool_max_idle_per_host,
            "HTTP transport initialized"
        );

        Self { client }
    }
}

impl Default for HyperTransport {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Transport for HyperTransport {
    async fn send(&self, request: http::Request<RequestBody>) -> Result<Response, TransportError> {
        let response = self
            .client
            .request(request)
            .await
            .map_err(|e| Arc::new(e) as TransportError)?;

        let (parts, body) = response.into_parts();
        let body = body.map_err(Into::into).boxed_unsync();
        Ok(Response::from_parts(parts, body))
    }
}
