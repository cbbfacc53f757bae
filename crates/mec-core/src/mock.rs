//! # Mock Admin Backend
//!
//! In-memory [`AdminBackend`] for tests and local development. Records are
//! kept per kind in insertion order, uploaded assets are tracked as live
//! until deleted, and any operation can be made to fail on demand.
//!
//! All operations are synchronous under a `parking_lot` mutex; the lock is
//! never held across an `.await`.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;
use serde_json::Value;
use uuid::Uuid;

use crate::backend::{AdminBackend, AssetUpload};
use crate::entity::EntityKind;
use crate::error::BackendError;
use crate::identity::{AssetUrl, RecordId};
use crate::record::{Ack, FieldMap, Record};
use crate::summary::{DashboardSummary, EnquiryCounts, ReviewCounts};

/// Operations of [`MockAdminBackend`] that can be counted and failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum MockOp {
    /// `fetch_list`
    FetchList,
    /// `fetch_record`
    FetchRecord,
    /// `create_record`
    Create,
    /// `update_record`
    Update,
    /// `delete_record`
    Delete,
    /// `delete_records`
    DeleteMany,
    /// `upload_asset`
    Upload,
    /// `delete_assets`
    DeleteAssets,
    /// `fetch_dashboard_summary`
    Dashboard,
}

#[derive(Debug, Default)]
struct MockState {
    records: BTreeMap<EntityKind, Vec<Record>>,
    live_assets: BTreeSet<AssetUrl>,
    released_assets: Vec<AssetUrl>,
    summary: Option<DashboardSummary>,
    failures: BTreeMap<MockOp, BackendError>,
    calls: BTreeMap<MockOp, usize>,
}

impl MockState {
    fn enter(&mut self, op: MockOp) -> Result<(), BackendError> {
        *self.calls.entry(op).or_default() += 1;
        match self.failures.get(&op) {
            Some(err) => Err(err.clone()),
            None => Ok(()),
        }
    }

    fn list_mut(&mut self, kind: EntityKind) -> &mut Vec<Record> {
        self.records.entry(kind).or_default()
    }

    fn count(&self, kind: EntityKind) -> u64 {
        self.records.get(&kind).map_or(0, |r| r.len() as u64)
    }

    fn computed_summary(&self) -> DashboardSummary {
        let unopened = self
            .records
            .get(&EntityKind::Enquiry)
            .map_or(0, |list| {
                list.iter()
                    .filter(|r| r.bool_field("is_opened") != Some(true))
                    .count() as u64
            });
        DashboardSummary {
            banners: self.count(EntityKind::Banner),
            clients: self.count(EntityKind::Client),
            projects: self.count(EntityKind::Project),
            works: self.count(EntityKind::Work),
            subscribers: self.count(EntityKind::Subscriber),
            reviews: ReviewCounts {
                total: self.count(EntityKind::Review),
            },
            enquiries: EnquiryCounts { unopened },
            ..DashboardSummary::default()
        }
    }
}

/// In-memory admin backend.
///
/// Cloning shares the underlying state, so a test can keep a handle for
/// inspection while the console owns another behind an `Arc`.
#[derive(Debug, Clone, Default)]
pub struct MockAdminBackend {
    state: Arc<Mutex<MockState>>,
}

impl MockAdminBackend {
    /// Create an empty backend.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append records to a kind's list.
    pub fn seed(&self, kind: EntityKind, records: impl IntoIterator<Item = Record>) {
        self.state.lock().list_mut(kind).extend(records);
    }

    /// Register an asset as live, as if it had been uploaded earlier.
    pub fn seed_asset(&self, url: AssetUrl) {
        self.state.lock().live_assets.insert(url);
    }

    /// Current records of a kind, in backend order.
    pub fn records(&self, kind: EntityKind) -> Vec<Record> {
        self.state
            .lock()
            .records
            .get(&kind)
            .cloned()
            .unwrap_or_default()
    }

    /// Whether an asset is still stored.
    pub fn is_live(&self, url: &AssetUrl) -> bool {
        self.state.lock().live_assets.contains(url)
    }

    /// Every asset still stored.
    pub fn live_assets(&self) -> Vec<AssetUrl> {
        self.state.lock().live_assets.iter().cloned().collect()
    }

    /// Every asset deleted so far, in deletion order.
    pub fn released_assets(&self) -> Vec<AssetUrl> {
        self.state.lock().released_assets.clone()
    }

    /// Serve a fixed dashboard summary instead of one computed from records.
    pub fn set_summary(&self, summary: DashboardSummary) {
        self.state.lock().summary = Some(summary);
    }

    /// Make every subsequent call of `op` fail with `error`.
    pub fn fail(&self, op: MockOp, error: BackendError) {
        self.state.lock().failures.insert(op, error);
    }

    /// Stop failing `op`.
    pub fn recover(&self, op: MockOp) {
        self.state.lock().failures.remove(&op);
    }

    /// How many times `op` has been called, failed calls included.
    pub fn calls(&self, op: MockOp) -> usize {
        self.state.lock().calls.get(&op).copied().unwrap_or(0)
    }

    /// Total calls across every operation.
    pub fn total_calls(&self) -> usize {
        self.state.lock().calls.values().sum()
    }
}

fn new_record_id() -> Result<RecordId, BackendError> {
    RecordId::new(Uuid::new_v4().simple().to_string())
        .map_err(|e| BackendError::transport(e.to_string()))
}

#[async_trait]
impl AdminBackend for MockAdminBackend {
    async fn fetch_list(&self, kind: EntityKind) -> Result<Vec<Record>, BackendError> {
        let mut state = self.state.lock();
        state.enter(MockOp::FetchList)?;
        Ok(state.records.get(&kind).cloned().unwrap_or_default())
    }

    async fn fetch_record(
        &self,
        kind: EntityKind,
        id: &RecordId,
    ) -> Result<Record, BackendError> {
        let mut state = self.state.lock();
        state.enter(MockOp::FetchRecord)?;
        state
            .list_mut(kind)
            .iter()
            .find(|r| &r.id == id)
            .cloned()
            .ok_or_else(|| BackendError::rejected(format!("{} not found", kind.label())))
    }

    async fn create_record(
        &self,
        kind: EntityKind,
        payload: &FieldMap,
    ) -> Result<Ack, BackendError> {
        let mut state = self.state.lock();
        state.enter(MockOp::Create)?;
        let mut fields = payload.clone();
        fields.insert(
            "createdAt".into(),
            Value::String(chrono::Utc::now().to_rfc3339()),
        );
        let record = Record::new(new_record_id()?, fields);
        tracing::debug!(%kind, id = %record.id, "mock backend created record");
        state.list_mut(kind).push(record);
        Ok(Ack::with_message(format!("{} added successfully", kind.label())))
    }

    async fn update_record(
        &self,
        kind: EntityKind,
        id: &RecordId,
        payload: &FieldMap,
    ) -> Result<Ack, BackendError> {
        let mut state = self.state.lock();
        state.enter(MockOp::Update)?;
        let record = state
            .list_mut(kind)
            .iter_mut()
            .find(|r| &r.id == id)
            .ok_or_else(|| BackendError::rejected(format!("{} not found", kind.label())))?;
        for (key, value) in payload {
            record.fields.insert(key.clone(), value.clone());
        }
        Ok(Ack::with_message(format!("{} updated successfully", kind.label())))
    }

    async fn delete_record(&self, kind: EntityKind, id: &RecordId) -> Result<Ack, BackendError> {
        let mut state = self.state.lock();
        state.enter(MockOp::Delete)?;
        let list = state.list_mut(kind);
        let before = list.len();
        list.retain(|r| &r.id != id);
        if list.len() == before {
            return Err(BackendError::rejected(format!("{} not found", kind.label())));
        }
        Ok(Ack::with_message(format!("{} deleted successfully", kind.label())))
    }

    async fn delete_records(
        &self,
        kind: EntityKind,
        ids: &[RecordId],
    ) -> Result<Ack, BackendError> {
        let mut state = self.state.lock();
        state.enter(MockOp::DeleteMany)?;
        let list = state.list_mut(kind);
        if let Some(missing) = ids.iter().find(|id| !list.iter().any(|r| &r.id == *id)) {
            return Err(BackendError::rejected(format!(
                "{} {missing} not found",
                kind.label()
            )));
        }
        list.retain(|r| !ids.contains(&r.id));
        Ok(Ack::with_message(format!(
            "{} {} deleted successfully",
            ids.len(),
            kind.collection()
        )))
    }

    async fn upload_asset(&self, file: &AssetUpload) -> Result<Vec<AssetUrl>, BackendError> {
        let mut state = self.state.lock();
        state.enter(MockOp::Upload)?;
        if file.bytes.is_empty() {
            return Err(BackendError::rejected("empty file"));
        }
        let url = AssetUrl::new(format!(
            "https://assets.mock/uploads/{}-{}",
            Uuid::new_v4().simple(),
            file.file_name
        ))
        .map_err(|e| BackendError::transport(e.to_string()))?;
        state.live_assets.insert(url.clone());
        Ok(vec![url])
    }

    async fn delete_assets(&self, urls: &[AssetUrl]) -> Result<Ack, BackendError> {
        let mut state = self.state.lock();
        state.enter(MockOp::DeleteAssets)?;
        if let Some(unknown) = urls.iter().find(|u| !state.live_assets.contains(*u)) {
            return Err(BackendError::rejected(format!("asset not found: {unknown}")));
        }
        for url in urls {
            state.live_assets.remove(url);
            state.released_assets.push(url.clone());
        }
        Ok(Ack::with_message("Images deleted successfully"))
    }

    async fn fetch_dashboard_summary(&self) -> Result<DashboardSummary, BackendError> {
        let mut state = self.state.lock();
        state.enter(MockOp::Dashboard)?;
        Ok(state.summary.unwrap_or_else(|| state.computed_summary()))
    }

    fn backend_name(&self) -> &str {
        "MockAdminBackend"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn payload(value: Value) -> FieldMap {
        match value {
            Value::Object(map) => map,
            _ => FieldMap::new(),
        }
    }

    #[tokio::test]
    async fn create_then_list_preserves_insertion_order() {
        let backend = MockAdminBackend::new();
        backend
            .create_record(EntityKind::Client, &payload(json!({"client_name": "A"})))
            .await
            .unwrap();
        backend
            .create_record(EntityKind::Client, &payload(json!({"client_name": "B"})))
            .await
            .unwrap();
        let list = backend.fetch_list(EntityKind::Client).await.unwrap();
        let names: Vec<_> = list.iter().filter_map(|r| r.str_field("client_name")).collect();
        assert_eq!(names, vec!["A", "B"]);
        assert!(backend.fetch_list(EntityKind::Work).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn injected_failure_is_counted_and_returned() {
        let backend = MockAdminBackend::new();
        backend.fail(MockOp::FetchList, BackendError::transport("offline"));
        let err = backend.fetch_list(EntityKind::Banner).await.unwrap_err();
        assert_eq!(err, BackendError::transport("offline"));
        assert_eq!(backend.calls(MockOp::FetchList), 1);

        backend.recover(MockOp::FetchList);
        assert!(backend.fetch_list(EntityKind::Banner).await.is_ok());
        assert_eq!(backend.calls(MockOp::FetchList), 2);
    }

    #[tokio::test]
    async fn upload_and_delete_assets_track_liveness() {
        let backend = MockAdminBackend::new();
        let urls = backend
            .upload_asset(&AssetUpload::new("hero.png", b"png".to_vec()))
            .await
            .unwrap();
        assert_eq!(urls.len(), 1);
        assert!(backend.is_live(&urls[0]));

        backend.delete_assets(&urls).await.unwrap();
        assert!(!backend.is_live(&urls[0]));
        assert_eq!(backend.released_assets(), urls);

        let again = backend.delete_assets(&urls).await.unwrap_err();
        assert!(again.is_rejection());
    }

    #[tokio::test]
    async fn empty_upload_is_rejected() {
        let backend = MockAdminBackend::new();
        let err = backend
            .upload_asset(&AssetUpload::new("empty.png", Vec::new()))
            .await
            .unwrap_err();
        assert_eq!(err.backend_message(), Some("empty file"));
        assert!(backend.live_assets().is_empty());
    }

    #[tokio::test]
    async fn bulk_delete_is_all_or_nothing() {
        let backend = MockAdminBackend::new();
        let a = Record::new(RecordId::new("a").unwrap(), FieldMap::new());
        let b = Record::new(RecordId::new("b").unwrap(), FieldMap::new());
        backend.seed(EntityKind::Subscriber, [a.clone(), b.clone()]);

        let missing = RecordId::new("zzz").unwrap();
        let err = backend
            .delete_records(EntityKind::Subscriber, &[a.id.clone(), missing])
            .await
            .unwrap_err();
        assert!(err.is_rejection());
        assert_eq!(backend.records(EntityKind::Subscriber).len(), 2);

        backend
            .delete_records(EntityKind::Subscriber, &[a.id.clone()])
            .await
            .unwrap();
        assert_eq!(backend.records(EntityKind::Subscriber), vec![b]);
    }

    #[tokio::test]
    async fn update_merges_partial_payload() {
        let backend = MockAdminBackend::new();
        let review = Record::new(
            RecordId::new("r1").unwrap(),
            payload(json!({"name": "Sam", "is_verified": false})),
        );
        backend.seed(EntityKind::Review, [review.clone()]);
        backend
            .update_record(EntityKind::Review, &review.id, &payload(json!({"is_verified": true})))
            .await
            .unwrap();
        let stored = backend.fetch_record(EntityKind::Review, &review.id).await.unwrap();
        assert_eq!(stored.bool_field("is_verified"), Some(true));
        assert_eq!(stored.str_field("name"), Some("Sam"));
    }

    #[tokio::test]
    async fn computed_summary_counts_unopened_enquiries() {
        let backend = MockAdminBackend::new();
        backend.seed(
            EntityKind::Enquiry,
            [
                Record::new(RecordId::new("e1").unwrap(), payload(json!({"is_opened": true}))),
                Record::new(RecordId::new("e2").unwrap(), payload(json!({"is_opened": false}))),
                Record::new(RecordId::new("e3").unwrap(), FieldMap::new()),
            ],
        );
        let summary = backend.fetch_dashboard_summary().await.unwrap();
        assert_eq!(summary.enquiries.unopened, 2);
        assert_eq!(summary.clients, 0);
    }

    #[test]
    fn backend_is_object_safe() {
        let backend: Arc<dyn AdminBackend> = Arc::new(MockAdminBackend::new());
        assert_eq!(backend.backend_name(), "MockAdminBackend");
    }
}
