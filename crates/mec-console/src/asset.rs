//! # Asset Coordinator
//!
//! Owns every call that uploads or releases media, and keeps the form
//! buffer's slots consistent with what is stored remotely.
//!
//! ## Lifecycle
//!
//! An uploaded file is persisted as soon as the upload call succeeds, before
//! the owning record is saved. Until then the reference is tracked by the
//! session as uncommitted. The coordinator releases references whenever
//! they stop being reachable from a record or a buffer:
//!
//! - replaced by a second upload into the same slot,
//! - held by a group instance the user removes,
//! - uploaded during a session that is discarded,
//! - held by a record that is deleted.
//!
//! A removed group instance may hold a reference the stored record still
//! owns. That release waits for the submit that drops it from the record;
//! discarding the session cancels it.
//!
//! Releases that happen as a side effect are best effort: a failure is
//! logged and reported in a [`ReleaseReport`], never turned into an error of
//! the operation that triggered it.

use std::sync::Arc;

use mec_core::{AdminBackend, AssetUpload, AssetUrl, Record};

use crate::error::ConsoleError;
use crate::form::{FormSession, SlotKey};
use crate::schema::{FormSchema, GroupInstance};

/// Outcome of a best-effort release of several references.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReleaseReport {
    /// References deleted from storage.
    pub released: Vec<AssetUrl>,
    /// References that could not be deleted, with the failure.
    pub failed: Vec<ConsoleError>,
}

impl ReleaseReport {
    /// Whether every reference was released.
    pub fn is_clean(&self) -> bool {
        self.failed.is_empty()
    }

    fn merge(&mut self, other: ReleaseReport) {
        self.released.extend(other.released);
        self.failed.extend(other.failed);
    }
}

/// Uploads and releases media on behalf of form sessions and stores.
#[derive(Clone)]
pub struct AssetCoordinator {
    backend: Arc<dyn AdminBackend>,
}

impl std::fmt::Debug for AssetCoordinator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AssetCoordinator")
            .field("backend", &self.backend.backend_name())
            .finish()
    }
}

impl AssetCoordinator {
    /// Create a coordinator over a backend.
    pub fn new(backend: Arc<dyn AdminBackend>) -> Self {
        Self { backend }
    }

    /// Upload `file` and place its reference into `slot`.
    ///
    /// If the slot already held a reference, the new file is uploaded first
    /// and the old one is released afterwards. On upload failure the slot
    /// keeps its prior reference.
    ///
    /// # Errors
    ///
    /// [`ConsoleError::Form`] for an unknown slot or a session that is not
    /// open (checked before any network call), [`ConsoleError::Upload`] if
    /// the backend refuses the file or reports no URL.
    pub async fn upload(
        &self,
        session: &mut FormSession,
        slot: &SlotKey,
        file: &AssetUpload,
    ) -> Result<AssetUrl, ConsoleError> {
        if !session.is_open() {
            return Err(crate::FormError::NotOpen.into());
        }
        session.check_slot(slot)?;

        let mut urls = self
            .backend
            .upload_asset(file)
            .await
            .map_err(|source| ConsoleError::Upload { source })?
            .into_iter();
        let url = urls.next().ok_or_else(|| ConsoleError::Upload {
            source: mec_core::BackendError::transport("upload reported no URL"),
        })?;

        // One file per slot; anything else the backend stored is unowned.
        let extras: Vec<AssetUrl> = urls.collect();
        if !extras.is_empty() {
            let _ = self.release_many(&extras).await;
        }

        let previous = session.replace_asset(slot, Some(url.clone()))?;
        session.track_upload(url.clone());
        tracing::info!(%slot, %url, "asset uploaded");

        if let Some(previous) = previous {
            if previous != url {
                let report = self.release_many(std::slice::from_ref(&previous)).await;
                if report.is_clean() {
                    session.untrack(&previous);
                }
            }
        }
        Ok(url)
    }

    /// Release the reference held by `slot` and empty the slot.
    ///
    /// If the backend rejects the release the slot is emptied anyway, since
    /// the reference is no longer usable; if the backend is unreachable the
    /// slot keeps its reference so the release can be retried. Releasing an
    /// empty slot is a no-op.
    pub async fn release(
        &self,
        session: &mut FormSession,
        slot: &SlotKey,
    ) -> Result<Option<AssetUrl>, ConsoleError> {
        if !session.is_open() {
            return Err(crate::FormError::NotOpen.into());
        }
        let Some(url) = session.asset(slot)? else {
            return Ok(None);
        };

        match self.backend.delete_assets(std::slice::from_ref(&url)).await {
            Ok(_) => {
                session.replace_asset(slot, None)?;
                session.untrack(&url);
                tracing::info!(%slot, %url, "asset released");
                Ok(Some(url))
            }
            Err(source) => {
                if source.is_rejection() {
                    session.replace_asset(slot, None)?;
                    session.untrack(&url);
                }
                tracing::warn!(%slot, %url, error = %source, "asset release failed");
                Err(ConsoleError::AssetRelease { url, source })
            }
        }
    }

    /// Remove a group instance and release the references it held.
    ///
    /// Uploads made during this session are released at once. References
    /// the stored record still owns are queued on the session and released
    /// only after a submit commits the record without them.
    pub async fn remove_group_instance(
        &self,
        session: &mut FormSession,
        group: &str,
        index: usize,
    ) -> Result<(GroupInstance, ReleaseReport), ConsoleError> {
        let removed = session.remove_group_instance(group, index)?;
        let refs: Vec<AssetUrl> = session
            .schema()
            .group(group)
            .map(|spec| {
                spec.asset_fields
                    .iter()
                    .filter_map(|f| AssetUrl::from_optional(removed.get(f)))
                    .collect()
            })
            .unwrap_or_default();

        let (uploaded, owned): (Vec<AssetUrl>, Vec<AssetUrl>) =
            refs.into_iter().partition(|url| session.is_uncommitted(url));
        for url in owned {
            tracing::debug!(%group, %url, "release deferred until submit");
            session.defer_release(url);
        }
        let report = self.release_many(&uploaded).await;
        for url in &report.released {
            session.untrack(url);
        }
        Ok((removed, report))
    }

    /// Release the record-owned references a committed submit dropped.
    pub async fn release_superseded(&self, urls: &[AssetUrl]) -> ReleaseReport {
        if !urls.is_empty() {
            tracing::debug!(count = urls.len(), "releasing superseded references");
        }
        self.release_many(urls).await
    }

    /// Close a session without submitting and release the uploads no record
    /// owns.
    pub async fn discard(&self, session: &mut FormSession) -> ReleaseReport {
        let orphans = session.close();
        if !orphans.is_empty() {
            tracing::debug!(count = orphans.len(), "releasing uncommitted uploads");
        }
        self.release_many(&orphans).await
    }

    /// Release every reference a record holds according to its form schema.
    pub async fn release_record_assets(&self, schema: &FormSchema, record: &Record) -> ReleaseReport {
        self.release_many(&record_asset_refs(schema, record)).await
    }

    /// Release references one call each, collecting failures.
    pub async fn release_many(&self, urls: &[AssetUrl]) -> ReleaseReport {
        let mut report = ReleaseReport::default();
        for url in urls {
            report.merge(self.release_one(url).await);
        }
        report
    }

    async fn release_one(&self, url: &AssetUrl) -> ReleaseReport {
        match self.backend.delete_assets(std::slice::from_ref(url)).await {
            Ok(_) => ReleaseReport {
                released: vec![url.clone()],
                failed: Vec::new(),
            },
            Err(source) => {
                tracing::warn!(%url, error = %source, "asset release failed");
                ReleaseReport {
                    released: Vec::new(),
                    failed: vec![ConsoleError::AssetRelease {
                        url: url.clone(),
                        source,
                    }],
                }
            }
        }
    }
}

/// Asset references held by a stored record: its top-level slots plus the
/// asset fields of every group block.
pub fn record_asset_refs(schema: &FormSchema, record: &Record) -> Vec<AssetUrl> {
    let mut refs: Vec<AssetUrl> = schema
        .slots
        .iter()
        .filter_map(|slot| record.asset_field(slot.name))
        .collect();
    for spec in schema.groups.iter().filter(|g| !g.asset_fields.is_empty()) {
        for instance in spec.codec.decode(record.field(spec.name)) {
            refs.extend(
                spec.asset_fields
                    .iter()
                    .filter_map(|f| AssetUrl::from_optional(instance.get(f))),
            );
        }
    }
    refs
}
