//! # Entity Store
//!
//! Client-side cache of one entity kind's list.
//!
//! The cached list always reflects the last successful backend load, except
//! transiently after a local delete and before the follow-up refresh. Every
//! successful mutation triggers a refresh; a failed refresh leaves the cache
//! untouched and is reported through the receipt instead of failing the
//! mutation.

use std::sync::Arc;

use mec_core::{AdminBackend, EntityKind, FieldMap, Record, RecordId};

use crate::error::{ConsoleError, MutationKind};

/// Result of a successful mutation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MutationReceipt {
    /// Success text from the backend, if it sent one.
    pub message: Option<String>,
    /// Failure of the follow-up refresh. The mutation itself succeeded.
    pub refresh_error: Option<ConsoleError>,
}

impl MutationReceipt {
    /// Whether the cache was reloaded after the mutation.
    pub fn refreshed(&self) -> bool {
        self.refresh_error.is_none()
    }

    /// The backend's success text, or `fallback`.
    pub fn message_or(&self, fallback: impl Into<String>) -> String {
        self.message.clone().unwrap_or_else(|| fallback.into())
    }
}

/// Cached list of one entity kind.
#[derive(Clone)]
pub struct EntityStore {
    kind: EntityKind,
    backend: Arc<dyn AdminBackend>,
    records: Vec<Record>,
    loading: bool,
    loaded: bool,
}

impl std::fmt::Debug for EntityStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EntityStore")
            .field("kind", &self.kind)
            .field("backend", &self.backend.backend_name())
            .field("records", &self.records.len())
            .field("loaded", &self.loaded)
            .finish()
    }
}

impl EntityStore {
    /// An empty, unloaded store.
    pub fn new(kind: EntityKind, backend: Arc<dyn AdminBackend>) -> Self {
        Self {
            kind,
            backend,
            records: Vec::new(),
            loading: false,
            loaded: false,
        }
    }

    /// The entity kind.
    pub fn kind(&self) -> EntityKind {
        self.kind
    }

    pub(crate) fn backend(&self) -> Arc<dyn AdminBackend> {
        Arc::clone(&self.backend)
    }

    /// Cached records in backend order.
    pub fn records(&self) -> &[Record] {
        &self.records
    }

    /// Identifiers of the cached records.
    pub fn ids(&self) -> Vec<RecordId> {
        self.records.iter().map(|r| r.id.clone()).collect()
    }

    /// One cached record.
    pub fn get(&self, id: &RecordId) -> Option<&Record> {
        self.records.iter().find(|r| &r.id == id)
    }

    /// Whether a backend call that changes or reloads the cache is in
    /// flight.
    pub fn is_loading(&self) -> bool {
        self.loading
    }

    /// Whether at least one load has succeeded.
    pub fn is_loaded(&self) -> bool {
        self.loaded
    }

    /// Replace the cache with the backend's current list.
    ///
    /// # Errors
    ///
    /// [`ConsoleError::Fetch`]; the cache keeps its previous contents.
    pub async fn refresh(&mut self) -> Result<&[Record], ConsoleError> {
        self.loading = true;
        let result = self.backend.fetch_list(self.kind).await;
        self.loading = false;
        match result {
            Ok(records) => {
                tracing::debug!(kind = %self.kind, count = records.len(), "store refreshed");
                self.records = records;
                self.loaded = true;
                Ok(&self.records)
            }
            Err(source) => {
                tracing::warn!(kind = %self.kind, error = %source, "store refresh failed");
                Err(ConsoleError::Fetch {
                    kind: self.kind,
                    source,
                })
            }
        }
    }

    /// Load one record from the backend without touching the cache.
    pub async fn fetch_one(&self, id: &RecordId) -> Result<Record, ConsoleError> {
        self.backend
            .fetch_record(self.kind, id)
            .await
            .map_err(|source| ConsoleError::Fetch {
                kind: self.kind,
                source,
            })
    }

    async fn refresh_after(&mut self, message: Option<String>) -> MutationReceipt {
        let refresh_error = self.refresh().await.err();
        MutationReceipt {
            message,
            refresh_error,
        }
    }

    fn mutation_error(
        &self,
        operation: MutationKind,
    ) -> impl FnOnce(mec_core::BackendError) -> ConsoleError {
        let kind = self.kind;
        move |source| {
            tracing::warn!(%kind, %operation, error = %source, "mutation failed");
            ConsoleError::Mutation {
                kind,
                operation,
                source,
            }
        }
    }

    /// Create a record, then refresh.
    pub async fn create(&mut self, payload: &FieldMap) -> Result<MutationReceipt, ConsoleError> {
        self.loading = true;
        let result = self.backend.create_record(self.kind, payload).await;
        self.loading = false;
        let ack = result.map_err(self.mutation_error(MutationKind::Create))?;
        tracing::info!(kind = %self.kind, "record created");
        Ok(self.refresh_after(ack.message).await)
    }

    /// Update a record with a full or partial payload, then refresh.
    pub async fn update(
        &mut self,
        id: &RecordId,
        payload: &FieldMap,
    ) -> Result<MutationReceipt, ConsoleError> {
        self.loading = true;
        let result = self.backend.update_record(self.kind, id, payload).await;
        self.loading = false;
        let ack = result.map_err(self.mutation_error(MutationKind::Update))?;
        tracing::info!(kind = %self.kind, %id, "record updated");
        Ok(self.refresh_after(ack.message).await)
    }

    /// Delete a record: evict it from the cache, then refresh.
    ///
    /// Returns the evicted record (if it was cached) so the caller can
    /// release the assets it held.
    pub async fn delete(
        &mut self,
        id: &RecordId,
    ) -> Result<(Option<Record>, MutationReceipt), ConsoleError> {
        self.loading = true;
        let result = self.backend.delete_record(self.kind, id).await;
        self.loading = false;
        let ack = result.map_err(self.mutation_error(MutationKind::Delete))?;
        let evicted = self
            .records
            .iter()
            .position(|r| &r.id == id)
            .map(|index| self.records.remove(index));
        tracing::info!(kind = %self.kind, %id, "record deleted");
        Ok((evicted, self.refresh_after(ack.message).await))
    }

    /// Delete several records in one backend call, then refresh.
    ///
    /// All-or-nothing from the console's point of view: on failure the
    /// cache is untouched.
    pub async fn delete_many(
        &mut self,
        ids: &[RecordId],
    ) -> Result<(Vec<Record>, MutationReceipt), ConsoleError> {
        self.loading = true;
        let result = self.backend.delete_records(self.kind, ids).await;
        self.loading = false;
        let ack = result.map_err(self.mutation_error(MutationKind::BulkDelete))?;
        let (evicted, kept): (Vec<Record>, Vec<Record>) = std::mem::take(&mut self.records)
            .into_iter()
            .partition(|r| ids.contains(&r.id));
        self.records = kept;
        tracing::info!(kind = %self.kind, count = ids.len(), "records deleted");
        Ok((evicted, self.refresh_after(ack.message).await))
    }
}
