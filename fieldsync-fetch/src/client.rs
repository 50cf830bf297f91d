//! Request executor.
//!
//! [`SyncClient`] turns a [`RequestDescriptor`] into a typed result. Each
//! call resolves the URL and headers once, then loops: wait for a rate
//! limiter slot, dispatch, classify, decode on success, and on a retryable
//! failure sleep for the policy's delay and go again. Cancellation is
//! checked at every suspension point and is never retried.
//!
//! A host that cannot be reached at all is polled within the attempt for up
//! to the connectivity window. Every poll takes its own limiter slot. A
//! connection lost mid-exchange is not polled, since the server may already
//! have acted on the request; it goes to the retry policy instead.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use reqwest::header::{ACCEPT, AUTHORIZATION, CONTENT_TYPE, HeaderMap, HeaderValue};
use serde::de::DeserializeOwned;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{debug, instrument, warn};
use url::Url;

use crate::auth::{CredentialProvider, NoCredentials};
use crate::decode::decode;
use crate::error::{SyncError, TransportError};
use crate::rate_limit::RateLimiter;
use crate::request::RequestDescriptor;
use crate::retry::{Classification, RetryPolicy, RetryState};
use crate::settings::ClientSettings;
use crate::transport::{HttpRequest, HttpResponse, ReqwestTransport, Transport};

const JSON: &str = "application/json";

/// Pause between connection attempts while waiting for connectivity.
const CONNECTIVITY_POLL: Duration = Duration::from_secs(1);

// ============================================================================
// Execute Trait
// ============================================================================

/// Runs request descriptors to typed results.
///
/// Repository code is written against this trait so it can be exercised
/// without a network.
pub trait Execute: Send + Sync {
    /// Executes `request`, retrying transient failures.
    fn execute<T>(
        &self,
        request: &RequestDescriptor,
        cancel: &CancellationToken,
    ) -> impl Future<Output = Result<T, SyncError>> + Send
    where
        T: DeserializeOwned + Send;
}

// ============================================================================
// Attempt Record
// ============================================================================

/// Record of a single dispatch attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttemptRecord {
    /// 1-based attempt number.
    pub attempt: u32,
    /// What the attempt amounted to.
    pub classification: Classification,
    /// Delay before the next attempt, if one followed.
    pub retry_delay: Option<Duration>,
    /// Time from slot request to classification.
    pub duration: Duration,
}

// ============================================================================
// Execution Report
// ============================================================================

/// The outcome of one logical call.
#[derive(Debug)]
pub struct ExecutionReport<T> {
    /// The decoded value or the terminal error.
    pub result: Result<T, SyncError>,
    /// Every dispatch attempt, in order.
    pub attempts: Vec<AttemptRecord>,
    /// Total time including retry delays.
    pub duration: Duration,
}

impl<T> ExecutionReport<T> {
    /// Returns true if the call succeeded.
    pub fn is_success(&self) -> bool {
        self.result.is_ok()
    }

    /// Number of retries scheduled.
    pub fn retries(&self) -> usize {
        self.attempts
            .iter()
            .filter(|a| a.retry_delay.is_some())
            .count()
    }

    /// The delays slept between attempts.
    pub fn retry_delays(&self) -> Vec<Duration> {
        self.attempts.iter().filter_map(|a| a.retry_delay).collect()
    }

    /// Discards the attempt log.
    pub fn into_result(self) -> Result<T, SyncError> {
        self.result
    }

    fn failed(error: SyncError, attempts: Vec<AttemptRecord>, start: Instant) -> Self {
        Self {
            result: Err(error),
            attempts,
            duration: start.elapsed(),
        }
    }
}

// ============================================================================
// Sync Client
// ============================================================================

/// Executes requests against one backend.
///
/// Cloning is cheap and clones share the rate limiter and transport, so
/// pacing holds across every clone.
#[derive(Clone)]
pub struct SyncClient {
    base_url: String,
    transport: Arc<dyn Transport>,
    credentials: Arc<dyn CredentialProvider>,
    limiter: Arc<RateLimiter>,
    retry: RetryPolicy,
    connectivity_wait: Duration,
}

impl std::fmt::Debug for SyncClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SyncClient")
            .field("base_url", &self.base_url)
            .field("min_interval", &self.limiter.min_interval())
            .field("retry", &self.retry)
            .finish_non_exhaustive()
    }
}

impl SyncClient {
    /// Creates a client with the reqwest transport.
    pub fn new(
        settings: &ClientSettings,
        credentials: impl CredentialProvider + 'static,
    ) -> Result<Self, TransportError> {
        Self::builder(settings.clone())
            .credentials(credentials)
            .build()
    }

    /// Starts a builder from `settings`.
    pub fn builder(settings: ClientSettings) -> SyncClientBuilder {
        SyncClientBuilder::new(settings)
    }

    /// The base address.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// The retry policy.
    pub fn retry_policy(&self) -> &RetryPolicy {
        &self.retry
    }

    /// Executes `request` and returns the result with its attempt log.
    #[instrument(skip(self, request, cancel), fields(verb = %request.verb(), path = %request.path()))]
    pub async fn execute_with_report<T: DeserializeOwned>(
        &self,
        request: &RequestDescriptor,
        cancel: &CancellationToken,
    ) -> ExecutionReport<T> {
        let start = Instant::now();
        let mut attempts = Vec::new();

        let http = match self.prepare(request).await {
            Ok(http) => http,
            Err(error) => {
                debug!(error = %error, "Request not dispatched");
                return ExecutionReport::failed(error, attempts, start);
            }
        };

        let mut state = RetryState::new(&self.retry, request);
        loop {
            let attempt = state.begin_attempt();
            let attempt_start = Instant::now();
            debug!(attempt, "Dispatching request");

            let classification = match self.attempt::<T>(&http, cancel).await {
                Ok(value) => {
                    attempts.push(AttemptRecord {
                        attempt,
                        classification: Classification::Success,
                        retry_delay: None,
                        duration: attempt_start.elapsed(),
                    });
                    debug!(attempt, "Request succeeded");
                    return ExecutionReport {
                        result: Ok(value),
                        attempts,
                        duration: start.elapsed(),
                    };
                }
                Err(classification) => classification,
            };

            let retry_delay = state.next_delay(&classification);
            attempts.push(AttemptRecord {
                attempt,
                classification: classification.clone(),
                retry_delay,
                duration: attempt_start.elapsed(),
            });

            let Some(delay) = retry_delay else {
                debug!(attempt, classification = %classification, "Request failed");
                // Attempts only fail with non-success classifications.
                let error = classification
                    .into_error()
                    .unwrap_or_else(|| SyncError::InvalidResponse("unclassified failure".into()));
                return ExecutionReport::failed(error, attempts, start);
            };

            warn!(
                attempt,
                classification = %classification,
                delay_ms = delay.as_millis(),
                "Request failed, retrying"
            );

            tokio::select! {
                biased;
                () = cancel.cancelled() => {
                    debug!(attempt, "Cancelled during retry delay");
                    return ExecutionReport::failed(SyncError::CANCELLED, attempts, start);
                }
                () = tokio::time::sleep(delay) => {}
            }
        }
    }

    /// One dispatch: slot, send, classify, decode.
    async fn attempt<T: DeserializeOwned>(
        &self,
        http: &HttpRequest,
        cancel: &CancellationToken,
    ) -> Result<T, Classification> {
        let response = tokio::select! {
            biased;
            () = cancel.cancelled() => return Err(Classification::Cancelled),
            sent = self.dispatch(http) => sent.map_err(|e| Classification::from_transport(&e))?,
        };

        let status = Classification::from_status(response.status);
        if !status.is_success() {
            return Err(status);
        }

        decode(response.status, &response.body).map_err(|e| {
            warn!(status = response.status, error = %e, "Response could not be decoded");
            Classification::DecodingFailed
        })
    }

    async fn dispatch(&self, http: &HttpRequest) -> Result<HttpResponse, TransportError> {
        let started = Instant::now();
        loop {
            self.limiter.wait_for_slot().await;
            match self.transport.send(http).await {
                Err(TransportError::Unreachable(reason))
                    if started.elapsed() + CONNECTIVITY_POLL < self.connectivity_wait =>
                {
                    debug!(%reason, "No connectivity, waiting");
                    tokio::time::sleep(CONNECTIVITY_POLL).await;
                }
                sent => return sent,
            }
        }
    }

    async fn prepare(&self, request: &RequestDescriptor) -> Result<HttpRequest, SyncError> {
        let url = self.endpoint_url(request)?;

        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static(JSON));
        if !request.verb().is_read() {
            headers.insert(CONTENT_TYPE, HeaderValue::from_static(JSON));
        }
        if request.auth_required() {
            let Some(token) = self.credentials.bearer_token().await else {
                return Err(SyncError::Unauthorized);
            };
            let mut value = HeaderValue::from_str(&format!("Bearer {token}")).map_err(|_| {
                SyncError::InvalidRequest("bearer token contains invalid characters".into())
            })?;
            value.set_sensitive(true);
            headers.insert(AUTHORIZATION, value);
        }

        Ok(HttpRequest {
            method: request.verb().as_method(),
            url,
            headers,
            body: request.body().map(<[u8]>::to_vec),
        })
    }

    /// Joins the base address and the descriptor path, collapsing repeated
    /// separators, and appends the query.
    fn endpoint_url(&self, request: &RequestDescriptor) -> Result<Url, SyncError> {
        let base = self.base_url.trim().trim_end_matches('/');
        let segments: Vec<&str> = request
            .path()
            .split('/')
            .filter(|segment| !segment.is_empty())
            .collect();
        if let Some(dot) = segments.iter().find(|s| is_dot_segment(s)) {
            return Err(SyncError::InvalidRequest(format!(
                "path segment '{dot}' would leave {}",
                request.path()
            )));
        }
        let path = segments.join("/");
        let joined = if path.is_empty() {
            base.to_string()
        } else {
            format!("{base}/{path}")
        };

        let mut url =
            Url::parse(&joined).map_err(|e| SyncError::InvalidUrl(format!("{joined}: {e}")))?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(SyncError::InvalidUrl(format!(
                "{joined}: unsupported scheme"
            )));
        }

        if !request.query().is_empty() {
            url.query_pairs_mut().extend_pairs(
                request
                    .query()
                    .iter()
                    .map(|(k, v)| (k.as_str(), v.as_str())),
            );
        }
        Ok(url)
    }
}

/// `.` or `..`, including percent-encoded spellings the URL parser resolves.
fn is_dot_segment(segment: &str) -> bool {
    let decoded = segment.to_ascii_lowercase().replace("%2e", ".");
    matches!(decoded.as_str(), "." | "..")
}

impl Execute for SyncClient {
    async fn execute<T>(
        &self,
        request: &RequestDescriptor,
        cancel: &CancellationToken,
    ) -> Result<T, SyncError>
    where
        T: DeserializeOwned + Send,
    {
        self.execute_with_report(request, cancel).await.into_result()
    }
}

// ============================================================================
// Builder
// ============================================================================

/// Builder for a [`SyncClient`].
pub struct SyncClientBuilder {
    settings: ClientSettings,
    transport: Option<Arc<dyn Transport>>,
    credentials: Arc<dyn CredentialProvider>,
    limiter: Option<Arc<RateLimiter>>,
}

impl SyncClientBuilder {
    /// Creates a builder from `settings`.
    pub fn new(settings: ClientSettings) -> Self {
        Self {
            settings,
            transport: None,
            credentials: Arc::new(NoCredentials),
            limiter: None,
        }
    }

    /// Uses `transport` instead of building a reqwest transport.
    #[must_use]
    pub fn transport(mut self, transport: impl Transport + 'static) -> Self {
        self.transport = Some(Arc::new(transport));
        self
    }

    /// Sets the credential provider.
    #[must_use]
    pub fn credentials(mut self, credentials: impl CredentialProvider + 'static) -> Self {
        self.credentials = Arc::new(credentials);
        self
    }

    /// Shares an existing rate limiter, e.g. across clients for one backend.
    #[must_use]
    pub fn rate_limiter(mut self, limiter: Arc<RateLimiter>) -> Self {
        self.limiter = Some(limiter);
        self
    }

    /// Overrides the retry policy from the settings.
    #[must_use]
    pub fn retry_policy(mut self, retry: RetryPolicy) -> Self {
        self.settings.retry = retry;
        self
    }

    /// Builds the client.
    ///
    /// Fails only when the reqwest transport cannot be built.
    pub fn build(self) -> Result<SyncClient, TransportError> {
        let transport = match self.transport {
            Some(transport) => transport,
            None => Arc::new(ReqwestTransport::new(&self.settings)?),
        };
        let limiter = self
            .limiter
            .unwrap_or_else(|| Arc::new(RateLimiter::new(self.settings.min_interval())));

        let connectivity_wait = self.settings.connectivity_wait();
        Ok(SyncClient {
            base_url: self.settings.base_url,
            transport,
            credentials: self.credentials,
            limiter,
            retry: self.settings.retry,
            connectivity_wait,
        })
    }
}

// ============================================================================
// Tests
// ============================================================================
