// Lint configuration for this crate
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::missing_errors_doc)]

//! # FieldSync Fetch
//!
//! Request execution against the FieldSync backend.
//!
//! ## Pieces
//!
//! - [`request`] - Immutable request descriptors and list queries
//! - [`rate_limit`] - Minimum spacing between dispatched requests
//! - [`retry`] - Outcome classification and bounded retry policy
//! - [`decode`] - Envelope-tolerant, key-normalizing response decoding
//! - [`transport`] - The network seam and its reqwest implementation
//! - [`auth`] - Bearer token providers
//! - [`client`] - [`SyncClient`], the executor tying the above together
//! - [`paginate`] - Walks multi-page collections
//!
//! ## Example
//!
//! ```ignore
//! use fieldsync_fetch::{CancellationToken, ClientSettings, RequestDescriptor, SyncClient, EnvToken};
//!
//! let client = SyncClient::new(&ClientSettings::default(), EnvToken::default())?;
//! let task: serde_json::Value = client
//!     .execute_with_report(&RequestDescriptor::get("obj/task/123").build(), &CancellationToken::new())
//!     .await
//!     .into_result()?;
//! ```

pub mod auth;
pub mod client;
pub mod decode;
pub mod error;
pub mod paginate;
pub mod rate_limit;
pub mod request;
pub mod retry;
pub mod settings;
pub mod transport;

// Errors
pub use error::{DecodeError, NetworkCause, SyncError, TransportError};

// Requests
pub use request::{HttpVerb, ListQuery, RequestBuilder, RequestDescriptor, SortOrder};

// Execution
pub use auth::{CredentialProvider, EnvToken, NoCredentials, StaticToken};
pub use client::{AttemptRecord, Execute, ExecutionReport, SyncClient, SyncClientBuilder};
pub use decode::{Envelope, NoContent};
pub use paginate::{DEFAULT_PAGE_SIZE, ListPage, PageCursor, fetch_all};
pub use rate_limit::RateLimiter;
pub use retry::{Classification, RetryPolicy};
pub use settings::ClientSettings;
pub use transport::{HttpRequest, HttpResponse, ReqwestTransport, Transport};

pub use tokio_util::sync::CancellationToken;
