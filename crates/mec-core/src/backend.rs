//! # Admin Backend Interface
//!
//! Defines the `AdminBackend` trait that abstracts over the remote admin API.
//! The console's stores, form sessions and dashboard never perform I/O
//! themselves; every suspension point is one call on this trait.
//!
//! ## Architecture
//!
//! Production deployments use the reqwest implementation in `mec-api-client`.
//! Tests and local development use [`MockAdminBackend`](crate::MockAdminBackend).
//! Transport, authentication and encoding are the implementation's concern;
//! callers only see typed results and [`BackendError`].

use async_trait::async_trait;

use crate::entity::EntityKind;
use crate::error::BackendError;
use crate::identity::{AssetUrl, RecordId};
use crate::record::{Ack, FieldMap, Record};
use crate::summary::DashboardSummary;

/// A media file to upload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssetUpload {
    /// File name reported to the storage backend.
    pub file_name: String,
    /// MIME type, if known.
    pub content_type: Option<String>,
    /// File contents.
    pub bytes: Vec<u8>,
}

impl AssetUpload {
    /// Construct an upload from a name and contents.
    pub fn new(file_name: impl Into<String>, bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            file_name: file_name.into(),
            content_type: None,
            bytes: bytes.into(),
        }
    }

    /// Attach a MIME type.
    pub fn with_content_type(mut self, content_type: impl Into<String>) -> Self {
        self.content_type = Some(content_type.into());
        self
    }
}

/// Collaborator interface to the remote admin API.
///
/// Implementations must be `Send + Sync` so they can be shared across
/// async tasks behind an `Arc`. The trait is object-safe to support
/// runtime backend selection (mock vs. live).
#[async_trait]
pub trait AdminBackend: Send + Sync {
    /// Fetch every record of a kind, in backend order.
    async fn fetch_list(&self, kind: EntityKind) -> Result<Vec<Record>, BackendError>;

    /// Fetch one record by identifier.
    async fn fetch_record(&self, kind: EntityKind, id: &RecordId)
        -> Result<Record, BackendError>;

    /// Create a record from a payload.
    async fn create_record(&self, kind: EntityKind, payload: &FieldMap)
        -> Result<Ack, BackendError>;

    /// Update a record; the payload may be partial.
    async fn update_record(
        &self,
        kind: EntityKind,
        id: &RecordId,
        payload: &FieldMap,
    ) -> Result<Ack, BackendError>;

    /// Delete one record.
    async fn delete_record(&self, kind: EntityKind, id: &RecordId) -> Result<Ack, BackendError>;

    /// Delete several records in one call (bulk delete).
    async fn delete_records(&self, kind: EntityKind, ids: &[RecordId])
        -> Result<Ack, BackendError>;

    /// Upload one media file. A successful upload reports at least one URL;
    /// the asset is persisted remotely from that point on.
    async fn upload_asset(&self, file: &AssetUpload) -> Result<Vec<AssetUrl>, BackendError>;

    /// Delete previously uploaded assets.
    async fn delete_assets(&self, urls: &[AssetUrl]) -> Result<Ack, BackendError>;

    /// Fetch the combined dashboard summary.
    async fn fetch_dashboard_summary(&self) -> Result<DashboardSummary, BackendError>;

    /// Human-readable name of this implementation (e.g. "MockAdminBackend").
    fn backend_name(&self) -> &str;
}
