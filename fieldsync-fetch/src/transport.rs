//! HTTP transport.
//!
//! [`Transport`] is the seam between the executor and the network: it takes a
//! fully prepared request and returns a status and body, or a
//! [`TransportError`]. [`ReqwestTransport`] is the production implementation;
//! tests substitute scripted transports.

use std::sync::Arc;

use async_trait::async_trait;
use reqwest::header::HeaderMap;
use reqwest::{Client, Method};
use tokio::sync::Semaphore;
use tracing::{debug, instrument, warn};
use url::Url;

use crate::error::TransportError;
use crate::settings::ClientSettings;

/// User agent string for FieldSync.
pub const USER_AGENT: &str = concat!("FieldSync/", env!("CARGO_PKG_VERSION"));

// ============================================================================
// Request / Response
// ============================================================================

/// A request ready to put on the wire.
#[derive(Debug, Clone)]
pub struct HttpRequest {
    /// HTTP method.
    pub method: Method,
    /// Absolute URL including query.
    pub url: Url,
    /// Headers, authorization included when required.
    pub headers: HeaderMap,
    /// Encoded body.
    pub body: Option<Vec<u8>>,
}

/// A response as received.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    /// Status code.
    pub status: u16,
    /// Raw body bytes.
    pub body: Vec<u8>,
}

impl HttpResponse {
    /// Creates a response.
    pub fn new(status: u16, body: impl Into<Vec<u8>>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }
}

// ============================================================================
// Transport Trait
// ============================================================================

/// Sends prepared requests.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Sends one request and returns whatever the server answered.
    ///
    /// Non-2xx statuses are responses, not errors.
    async fn send(&self, request: &HttpRequest) -> Result<HttpResponse, TransportError>;
}

#[async_trait]
impl<T: Transport + ?Sized> Transport for Arc<T> {
    async fn send(&self, request: &HttpRequest) -> Result<HttpResponse, TransportError> {
        (**self).send(request).await
    }
}

// ============================================================================
// Reqwest Transport
// ============================================================================

/// Transport backed by `reqwest`.
///
/// Caps in-flight requests per client; extra callers queue here. Each call
/// is a single exchange: waiting out connectivity gaps is the executor's job.
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    inner: Client,
    permits: Arc<Semaphore>,
}

impl ReqwestTransport {
    /// Creates a transport from client settings.
    pub fn new(settings: &ClientSettings) -> Result<Self, TransportError> {
        let client = Client::builder()
            .timeout(settings.timeout())
            .connect_timeout(settings.connect_timeout())
            .pool_max_idle_per_host(settings.max_concurrent_requests)
            .user_agent(settings.user_agent.as_deref().unwrap_or(USER_AGENT))
            .build()
            .map_err(|e| TransportError::Other(format!("failed to build HTTP client: {e}")))?;

        Ok(Self::with_client(client, settings))
    }

    /// Creates a transport around an existing reqwest client.
    pub fn with_client(client: Client, settings: &ClientSettings) -> Self {
        Self {
            inner: client,
            permits: Arc::new(Semaphore::new(settings.max_concurrent_requests.max(1))),
        }
    }

    async fn send_once(&self, request: &HttpRequest) -> Result<HttpResponse, TransportError> {
        let mut builder = self
            .inner
            .request(request.method.clone(), request.url.clone())
            .headers(request.headers.clone());
        if let Some(body) = &request.body {
            builder = builder.body(body.clone());
        }

        let response = builder.send().await?;
        let status = response.status().as_u16();
        let body = response.bytes().await?;
        Ok(HttpResponse::new(status, body.to_vec()))
    }
}

#[async_trait]
impl Transport for ReqwestTransport {
    #[instrument(skip(self, request), fields(method = %request.method, url = %request.url))]
    async fn send(&self, request: &HttpRequest) -> Result<HttpResponse, TransportError> {
        let _permit = self
            .permits
            .acquire()
            .await
            .map_err(|_| TransportError::Other("transport is shut down".to_string()))?;

        match self.send_once(request).await {
            Ok(response) => {
                debug!(status = response.status, "Response received");
                Ok(response)
            }
            Err(e) => {
                warn!(error = %e, "Transport failure");
                Err(e)
            }
        }
    }
}
