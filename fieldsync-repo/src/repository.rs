//! Repository operations by entity kind.
//!
//! Every operation is one descriptor handed to the executor. Retries,
//! pacing, and decoding all happen below this layer; pagination is the
//! shared driver from `fieldsync-fetch`.

use std::num::NonZeroU32;

use fieldsync_core::EntityKind;
use fieldsync_fetch::paginate::{self, DEFAULT_PAGE_SIZE, ListPage, PageCursor};
use fieldsync_fetch::{
    CancellationToken, Execute, ListQuery, NoContent, RequestDescriptor, SyncError,
};
use futures::future::try_join_all;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use crate::collection::Collection;
use crate::patch::PatchSet;

/// Body returned by a create call.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Created {
    /// Server status label, usually `success`.
    #[serde(default)]
    pub status: Option<String>,
    /// Identifier of the new object.
    pub id: String,
}

// ============================================================================
// Repository
// ============================================================================

/// Entity operations over any executor.
#[derive(Debug, Clone)]
pub struct Repository<E> {
    executor: E,
    page_size: NonZeroU32,
}

impl<E: Execute> Repository<E> {
    /// Wraps `executor`.
    pub fn new(executor: E) -> Self {
        Self {
            executor,
            page_size: DEFAULT_PAGE_SIZE,
        }
    }

    /// Sets the page size used by [`list_all`](Self::list_all).
    #[must_use]
    pub fn with_page_size(mut self, page_size: NonZeroU32) -> Self {
        self.page_size = page_size;
        self
    }

    /// The underlying executor.
    pub fn executor(&self) -> &E {
        &self.executor
    }

    /// The page size used by [`list_all`](Self::list_all).
    pub fn page_size(&self) -> NonZeroU32 {
        self.page_size
    }

    /// Typed operations for entity `T`.
    pub fn collection<T: fieldsync_core::Entity>(&self) -> Collection<'_, E, T> {
        Collection::new(self)
    }

    /// Fetches one object.
    #[instrument(skip(self, cancel), fields(kind = %kind))]
    pub async fn get<T>(
        &self,
        kind: EntityKind,
        id: &str,
        cancel: &CancellationToken,
    ) -> Result<T, SyncError>
    where
        T: DeserializeOwned + Send,
    {
        let request = RequestDescriptor::get(kind.object_path(checked_id(id)?)).build();
        self.executor.execute(&request, cancel).await
    }

    /// Fetches several objects concurrently, in the order of `ids`.
    ///
    /// The first failure fails the whole call.
    pub async fn get_many<T>(
        &self,
        kind: EntityKind,
        ids: &[String],
        cancel: &CancellationToken,
    ) -> Result<Vec<T>, SyncError>
    where
        T: DeserializeOwned + Send,
    {
        try_join_all(ids.iter().map(|id| self.get(kind, id, cancel))).await
    }

    /// Fetches one page of a collection.
    #[instrument(skip(self, query, cancel), fields(kind = %kind, offset = cursor.offset()))]
    pub async fn list<T>(
        &self,
        kind: EntityKind,
        query: &ListQuery,
        cursor: PageCursor,
        cancel: &CancellationToken,
    ) -> Result<ListPage<T>, SyncError>
    where
        T: DeserializeOwned + Send,
    {
        let request =
            query.to_request(kind.collection_path(), cursor.offset(), cursor.page_size())?;
        self.executor.execute(&request, cancel).await
    }

    /// Fetches every object matching `query`.
    #[instrument(skip(self, query, cancel), fields(kind = %kind))]
    pub async fn list_all<T>(
        &self,
        kind: EntityKind,
        query: &ListQuery,
        cancel: &CancellationToken,
    ) -> Result<Vec<T>, SyncError>
    where
        T: DeserializeOwned + Send,
    {
        paginate::fetch_all(self.page_size, cancel, |cursor| async move {
            let page: ListPage<T> = self.list(kind, query, cursor, cancel).await?;
            Ok(page.results)
        })
        .await
    }

    /// Creates an object and returns its server-assigned id.
    #[instrument(skip(self, body, cancel), fields(kind = %kind))]
    pub async fn create<B>(
        &self,
        kind: EntityKind,
        body: &B,
        cancel: &CancellationToken,
    ) -> Result<String, SyncError>
    where
        B: Serialize + ?Sized,
    {
        let request = RequestDescriptor::post(kind.collection_path())
            .json_body(body)?
            .build();
        let created: Created = self.executor.execute(&request, cancel).await?;
        debug!(id = %created.id, "Created");
        Ok(created.id)
    }

    /// Applies `changes` to one object.
    #[instrument(skip(self, changes, cancel), fields(kind = %kind, fields = changes.len()))]
    pub async fn patch(
        &self,
        kind: EntityKind,
        id: &str,
        changes: &PatchSet,
        cancel: &CancellationToken,
    ) -> Result<(), SyncError> {
        let request = RequestDescriptor::patch(kind.object_path(checked_id(id)?))
            .json_body(changes)?
            .build();
        let NoContent = self.executor.execute(&request, cancel).await?;
        Ok(())
    }

    /// Marks one object deleted, leaving it on the server.
    pub async fn soft_delete(
        &self,
        kind: EntityKind,
        id: &str,
        cancel: &CancellationToken,
    ) -> Result<(), SyncError> {
        self.patch(kind, id, &PatchSet::soft_delete(), cancel).await
    }

    /// Removes one object from the server.
    #[instrument(skip(self, cancel), fields(kind = %kind))]
    pub async fn hard_delete(
        &self,
        kind: EntityKind,
        id: &str,
        cancel: &CancellationToken,
    ) -> Result<(), SyncError> {
        let request = RequestDescriptor::delete(kind.object_path(checked_id(id)?)).build();
        let NoContent = self.executor.execute(&request, cancel).await?;
        Ok(())
    }

    /// Triggers the backend workflow `name` with `payload`.
    #[instrument(skip(self, payload, cancel))]
    pub async fn run_workflow<B>(
        &self,
        name: &str,
        payload: &B,
        cancel: &CancellationToken,
    ) -> Result<(), SyncError>
    where
        B: Serialize + ?Sized,
    {
        let request = RequestDescriptor::post(format!("wf/{}", checked_segment(name, "workflow name")?))
            .json_body(payload)?
            .build();
        let NoContent = self.executor.execute(&request, cancel).await?;
        Ok(())
    }
}

fn checked_id(id: &str) -> Result<&str, SyncError> {
    checked_segment(id, "object id")
}

/// Rejects values that would change the shape of the path.
fn checked_segment<'a>(value: &'a str, what: &str) -> Result<&'a str, SyncError> {
    let value = value.trim();
    if value.is_empty() {
        return Err(SyncError::InvalidRequest(format!("{what} is empty")));
    }
    if value.contains(['/', '\\', '?', '#', '%']) {
        return Err(SyncError::InvalidRequest(format!(
            "{what} contains a reserved character"
        )));
    }
    if matches!(value, "." | "..") {
        return Err(SyncError::InvalidRequest(format!(
            "{what} is a dot segment"
        )));
    }
    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::FakeExecutor;
    use fieldsync_fetch::HttpVerb;
    use serde_json::{Value, json};

    fn repo(replies: Vec<Result<(u16, Value), SyncError>>) -> Repository<FakeExecutor> {
        Repository::new(FakeExecutor::new(replies))
    }

    #[tokio::test]
    async fn test_get_builds_object_path() {
        let repo = repo(vec![Ok((200, json!({"response": {"_id": "p1", "Name": "Roof"}})))]);

        let value: Value = repo
            .get(EntityKind::Project, "p1", &CancellationToken::new())
            .await
            .unwrap();

        assert_eq!(value["name"], "Roof");
        let seen = repo.executor().seen();
        assert_eq!(seen[0].verb(), HttpVerb::Get);
        assert_eq!(seen[0].path(), "obj/project/p1");
    }

    #[tokio::test]
    async fn test_invalid_ids_are_not_sent() {
        let repo = repo(Vec::new());
        let cancel = CancellationToken::new();

        for id in ["", " ", "a/b", "x?y"] {
            let result: Result<Value, _> = repo.get(EntityKind::Task, id, &cancel).await;
            assert!(matches!(result, Err(SyncError::InvalidRequest(_))), "{id:?}");
        }
        assert!(repo.executor().seen().is_empty());
    }

    #[tokio::test]
    async fn test_dot_segment_ids_are_not_sent() {
        let repo = repo(Vec::new());
        let cancel = CancellationToken::new();

        for id in ["..", ".", "%2e%2e", "%2E", "a%2fb", "..\\x"] {
            let result = repo.hard_delete(EntityKind::Task, id, &cancel).await;
            assert!(matches!(result, Err(SyncError::InvalidRequest(_))), "{id:?}");
        }
        let result = repo.run_workflow("..", &json!({}), &cancel).await;
        assert!(matches!(result, Err(SyncError::InvalidRequest(_))));
        assert!(repo.executor().seen().is_empty());
    }

    #[tokio::test]
    async fn test_list_passes_cursor_and_query() {
        let repo = repo(vec![Ok((200, json!({"response": {"cursor": 50, "results": [], "remaining": 0}})))]);
        let cursor = PageCursor::first(NonZeroU32::new(50).unwrap())
            .advance()
            .unwrap();

        let page: ListPage<Value> = repo
            .list(EntityKind::InventoryItem, &ListQuery::new(), cursor, &CancellationToken::new())
            .await
            .unwrap();

        assert_eq!(page.cursor, 50);
        let seen = repo.executor().seen();
        assert_eq!(seen[0].path(), "obj/inventoryitem");
        assert_eq!(seen[0].query_value("cursor"), Some("50"));
        assert_eq!(seen[0].query_value("limit"), Some("50"));
    }

    #[tokio::test]
    async fn test_list_all_walks_pages() {
        let page = |ids: std::ops::Range<u32>| {
            let results: Vec<Value> = ids.map(|i| json!({"_id": i.to_string()})).collect();
            Ok((200, json!({"response": {"cursor": 0, "results": results}})))
        };
        let repo = repo(vec![page(0..2), page(2..4), page(4..5)])
            .with_page_size(NonZeroU32::new(2).unwrap());

        let all: Vec<Value> = repo
            .list_all(EntityKind::Note, &ListQuery::new(), &CancellationToken::new())
            .await
            .unwrap();

        assert_eq!(all.len(), 5);
        let offsets: Vec<_> = repo
            .executor()
            .seen()
            .iter()
            .map(|r| r.query_value("cursor").unwrap().to_string())
            .collect();
        assert_eq!(offsets, ["0", "2", "4"]);
    }

    #[tokio::test]
    async fn test_create_returns_id() {
        let repo = repo(vec![Ok((200, json!({"status": "success", "id": "n9"})))]);

        let id = repo
            .create(EntityKind::Note, &json!({"body": "Gate code 1234"}), &CancellationToken::new())
            .await
            .unwrap();

        assert_eq!(id, "n9");
        let seen = repo.executor().seen();
        assert_eq!(seen[0].verb(), HttpVerb::Post);
        assert_eq!(seen[0].path(), "obj/note");
        assert_eq!(seen[0].body(), Some(br#"{"body":"Gate code 1234"}"#.as_slice()));
    }

    #[tokio::test]
    async fn test_patch_and_deletes() {
        let repo = repo(vec![
            Ok((204, Value::Null)),
            Ok((200, json!({}))),
            Ok((204, Value::Null)),
        ]);
        let cancel = CancellationToken::new();
        let changes = PatchSet::builder().set("title", "Done").build().unwrap();

        repo.patch(EntityKind::Task, "t1", &changes, &cancel).await.unwrap();
        repo.soft_delete(EntityKind::Task, "t1", &cancel).await.unwrap();
        repo.hard_delete(EntityKind::Task, "t1", &cancel).await.unwrap();

        let seen = repo.executor().seen();
        assert_eq!(seen[0].verb(), HttpVerb::Patch);
        assert_eq!(seen[0].body(), Some(br#"{"title":"Done"}"#.as_slice()));
        assert_eq!(seen[1].verb(), HttpVerb::Patch);
        assert_eq!(seen[1].body(), Some(br#"{"deleted":true}"#.as_slice()));
        assert_eq!(seen[2].verb(), HttpVerb::Delete);
        assert!(seen.iter().all(|r| r.path() == "obj/task/t1"));
    }

    #[tokio::test]
    async fn test_run_workflow() {
        let repo = repo(vec![Ok((200, json!({"status": "success"})))]);

        repo.run_workflow(
            "notify-customer",
            &json!({"appointment": "a1"}),
            &CancellationToken::new(),
        )
        .await
        .unwrap();

        let seen = repo.executor().seen();
        assert_eq!(seen[0].path(), "wf/notify-customer");
        assert!(seen[0].auth_required());
    }

    #[tokio::test]
    async fn test_get_many_keeps_order_and_fails_fast() {
        let repo = repo(vec![
            Ok((200, json!({"response": {"_id": "a"}}))),
            Ok((200, json!({"response": {"_id": "b"}}))),
        ]);
        let ids = vec!["a".to_string(), "b".to_string()];

        let values: Vec<Value> = repo
            .get_many(EntityKind::Customer, &ids, &CancellationToken::new())
            .await
            .unwrap();
        assert_eq!(values[0]["_id"], "a");
        assert_eq!(values[1]["_id"], "b");

        let failing = Repository::new(FakeExecutor::new(vec![Err(SyncError::HttpError(404))]));
        let result: Result<Vec<Value>, _> = failing
            .get_many(EntityKind::Customer, &ids, &CancellationToken::new())
            .await;
        assert_eq!(result.unwrap_err(), SyncError::HttpError(404));
    }

    #[tokio::test]
    async fn test_errors_pass_through_unchanged() {
        let repo = repo(vec![Err(SyncError::RateLimited)]);
        let result = repo
            .hard_delete(EntityKind::Invoice, "i1", &CancellationToken::new())
            .await;
        assert_eq!(result.unwrap_err(), SyncError::RateLimited);
    }
}
