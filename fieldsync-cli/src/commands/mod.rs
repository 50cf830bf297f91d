//! CLI command implementations.

pub mod args;
pub mod config;
pub mod kinds;
pub mod read;
pub mod write;

use anyhow::Result;
use fieldsync_fetch::{CancellationToken, SyncClient};
use fieldsync_repo::Repository;
use tracing::{debug, warn};

use crate::config::Config;

/// A connected repository plus the token that cancels its calls.
pub struct Session {
    /// Repository over the configured backend.
    pub repo: Repository<SyncClient>,
    /// Cancelled on Ctrl-C.
    pub cancel: CancellationToken,
}

impl Session {
    /// Builds the client from `config` and arms Ctrl-C cancellation.
    pub fn connect(config: &Config) -> Result<Self> {
        let client = SyncClient::builder(config.client.clone())
            .credentials(config.credentials())
            .build()?;
        debug!(base_url = %client.base_url(), "Connected");

        let cancel = CancellationToken::new();
        let on_interrupt = cancel.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                warn!("Interrupted, cancelling");
                on_interrupt.cancel();
            }
        });

        Ok(Self {
            repo: Repository::new(client),
            cancel,
        })
    }
}
