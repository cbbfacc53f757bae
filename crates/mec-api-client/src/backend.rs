//! [`AdminBackend`] implementation over HTTP.
//!
//! Each trait method delegates to the typed endpoint call and maps
//! [`ApiError`](crate::ApiError) into [`BackendError`] at the boundary.

use async_trait::async_trait;
use mec_core::{
    Ack, AdminBackend, AssetUpload, AssetUrl, BackendError, DashboardSummary, EntityKind,
    FieldMap, Record, RecordId,
};

use crate::AdminApiClient;

#[async_trait]
impl AdminBackend for AdminApiClient {
    async fn fetch_list(&self, kind: EntityKind) -> Result<Vec<Record>, BackendError> {
        Ok(self.list_records(kind).await?)
    }

    async fn fetch_record(
        &self,
        kind: EntityKind,
        id: &RecordId,
    ) -> Result<Record, BackendError> {
        Ok(self.get_record(kind, id).await?)
    }

    async fn create_record(
        &self,
        kind: EntityKind,
        payload: &FieldMap,
    ) -> Result<Ack, BackendError> {
        Ok(AdminApiClient::create_record(self, kind, payload).await?)
    }

    async fn update_record(
        &self,
        kind: EntityKind,
        id: &RecordId,
        payload: &FieldMap,
    ) -> Result<Ack, BackendError> {
        Ok(AdminApiClient::update_record(self, kind, id, payload).await?)
    }

    async fn delete_record(&self, kind: EntityKind, id: &RecordId) -> Result<Ack, BackendError> {
        Ok(AdminApiClient::delete_record(self, kind, id).await?)
    }

    async fn delete_records(
        &self,
        kind: EntityKind,
        ids: &[RecordId],
    ) -> Result<Ack, BackendError> {
        Ok(AdminApiClient::delete_records(self, kind, ids).await?)
    }

    async fn upload_asset(&self, file: &AssetUpload) -> Result<Vec<AssetUrl>, BackendError> {
        Ok(self.upload(file).await?)
    }

    async fn delete_assets(&self, urls: &[AssetUrl]) -> Result<Ack, BackendError> {
        Ok(self.delete_uploads(urls).await?)
    }

    async fn fetch_dashboard_summary(&self) -> Result<DashboardSummary, BackendError> {
        Ok(self.dashboard_summary().await?)
    }

    fn backend_name(&self) -> &str {
        "AdminApiClient"
    }
}
