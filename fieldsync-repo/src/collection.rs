//! Typed per-entity operations.

use std::marker::PhantomData;

use fieldsync_core::Entity;
use fieldsync_fetch::paginate::{ListPage, PageCursor};
use fieldsync_fetch::{CancellationToken, Execute, ListQuery, SyncError};

use crate::patch::PatchSet;
use crate::repository::Repository;

/// Repository operations bound to entity type `T`.
///
/// The entity kind comes from `T::KIND`, so a `Collection<Task>` can only
/// ever address task endpoints.
pub struct Collection<'r, E, T> {
    repo: &'r Repository<E>,
    _entity: PhantomData<fn() -> T>,
}

impl<'r, E: Execute, T: Entity> Collection<'r, E, T> {
    pub(crate) fn new(repo: &'r Repository<E>) -> Self {
        Self {
            repo,
            _entity: PhantomData,
        }
    }

    /// Fetches one entity.
    pub async fn get(&self, id: &str, cancel: &CancellationToken) -> Result<T, SyncError> {
        self.repo.get(T::KIND, id, cancel).await
    }

    /// Fetches one page.
    pub async fn list(
        &self,
        query: &ListQuery,
        cursor: PageCursor,
        cancel: &CancellationToken,
    ) -> Result<ListPage<T>, SyncError> {
        self.repo.list(T::KIND, query, cursor, cancel).await
    }

    /// Fetches every entity matching `query`.
    pub async fn list_all(
        &self,
        query: &ListQuery,
        cancel: &CancellationToken,
    ) -> Result<Vec<T>, SyncError> {
        self.repo.list_all(T::KIND, query, cancel).await
    }

    /// Creates `entity` and returns it with the server-assigned id.
    pub async fn create(&self, mut entity: T, cancel: &CancellationToken) -> Result<T, SyncError> {
        let id = self.repo.create(T::KIND, &entity, cancel).await?;
        entity.set_id(id);
        Ok(entity)
    }

    /// Applies `changes`.
    pub async fn patch(
        &self,
        id: &str,
        changes: &PatchSet,
        cancel: &CancellationToken,
    ) -> Result<(), SyncError> {
        self.repo.patch(T::KIND, id, changes, cancel).await
    }

    /// Marks an entity deleted.
    pub async fn soft_delete(&self, id: &str, cancel: &CancellationToken) -> Result<(), SyncError> {
        self.repo.soft_delete(T::KIND, id, cancel).await
    }

    /// Removes an entity.
    pub async fn hard_delete(&self, id: &str, cancel: &CancellationToken) -> Result<(), SyncError> {
        self.repo.hard_delete(T::KIND, id, cancel).await
    }
}
