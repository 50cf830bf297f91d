//! Fake executor for repository tests.

use std::collections::VecDeque;
use std::sync::Mutex;

use fieldsync_fetch::decode::decode;
use fieldsync_fetch::{CancellationToken, Execute, RequestDescriptor, SyncError};
use serde::de::DeserializeOwned;
use serde_json::Value;

/// Replays canned `(status, body)` replies through the real decoder and
/// records every descriptor. A `null` body stands for an empty one; once
/// the script runs out every call gets an empty 204.
pub(crate) struct FakeExecutor {
    replies: Mutex<VecDeque<Result<(u16, Value), SyncError>>>,
    seen: Mutex<Vec<RequestDescriptor>>,
}

impl FakeExecutor {
    pub(crate) fn new(replies: Vec<Result<(u16, Value), SyncError>>) -> Self {
        Self {
            replies: Mutex::new(replies.into()),
            seen: Mutex::new(Vec::new()),
        }
    }

    pub(crate) fn seen(&self) -> Vec<RequestDescriptor> {
        self.seen.lock().unwrap().clone()
    }
}

impl Execute for FakeExecutor {
    async fn execute<T>(
        &self,
        request: &RequestDescriptor,
        _cancel: &CancellationToken,
    ) -> Result<T, SyncError>
    where
        T: DeserializeOwned + Send,
    {
        self.seen.lock().unwrap().push(request.clone());
        let reply = self
            .replies
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or(Ok((204, Value::Null)));
        let (status, body) = reply?;
        let bytes = if body.is_null() {
            Vec::new()
        } else {
            body.to_string().into_bytes()
        };
        decode(status, &bytes).map_err(|_| SyncError::DecodingFailed)
    }
}
