//! Record collection endpoints.
//!
//! One set of CRUD calls serves every entity kind; the kind only selects
//! the collection path segment.

use mec_core::{Ack, EntityKind, FieldMap, Record, RecordId};
use serde_json::json;

use crate::envelope::decode_list;
use crate::error::ApiError;
use crate::AdminApiClient;

impl AdminApiClient {
    /// List every record of a kind.
    ///
    /// Calls `GET {base_url}/{collection}`.
    pub async fn list_records(&self, kind: EntityKind) -> Result<Vec<Record>, ApiError> {
        let endpoint = format!("GET /{}", kind.collection());
        let url = self.url(kind.collection());

        let envelope = self.send(&endpoint, self.http.get(&url)).await?;
        decode_list(kind, envelope.data).map_err(|e| ApiError::Payload {
            endpoint,
            source: e,
        })
    }

    /// Get one record.
    ///
    /// Calls `GET {base_url}/{collection}/{id}`.
    pub async fn get_record(&self, kind: EntityKind, id: &RecordId) -> Result<Record, ApiError> {
        let endpoint = format!("GET /{}/{id}", kind.collection());
        let url = self.url(&format!("{}/{id}", kind.collection()));

        let envelope = self.send(&endpoint, self.http.get(&url)).await?;
        let data = envelope.data.unwrap_or_default();
        serde_json::from_value(data).map_err(|e| ApiError::Payload {
            endpoint,
            source: e,
        })
    }

    /// Create a record.
    ///
    /// Calls `POST {base_url}/{collection}`.
    pub async fn create_record(
        &self,
        kind: EntityKind,
        payload: &FieldMap,
    ) -> Result<Ack, ApiError> {
        let endpoint = format!("POST /{}", kind.collection());
        let url = self.url(kind.collection());

        let envelope = self.send(&endpoint, self.http.post(&url).json(payload)).await?;
        Ok(Ack {
            message: envelope.message,
        })
    }

    /// Update a record with a full or partial payload.
    ///
    /// Calls `PUT {base_url}/{collection}/{id}`.
    pub async fn update_record(
        &self,
        kind: EntityKind,
        id: &RecordId,
        payload: &FieldMap,
    ) -> Result<Ack, ApiError> {
        let endpoint = format!("PUT /{}/{id}", kind.collection());
        let url = self.url(&format!("{}/{id}", kind.collection()));

        let envelope = self.send(&endpoint, self.http.put(&url).json(payload)).await?;
        Ok(Ack {
            message: envelope.message,
        })
    }

    /// Delete one record.
    ///
    /// Calls `DELETE {base_url}/{collection}/{id}`.
    pub async fn delete_record(&self, kind: EntityKind, id: &RecordId) -> Result<Ack, ApiError> {
        let endpoint = format!("DELETE /{}/{id}", kind.collection());
        let url = self.url(&format!("{}/{id}", kind.collection()));

        let envelope = self.send(&endpoint, self.http.delete(&url)).await?;
        Ok(Ack {
            message: envelope.message,
        })
    }

    /// Delete several records in one call.
    ///
    /// Calls `POST {base_url}/{collection}/delete` with `{"ids": [...]}`.
    pub async fn delete_records(
        &self,
        kind: EntityKind,
        ids: &[RecordId],
    ) -> Result<Ack, ApiError> {
        let endpoint = format!("POST /{}/delete", kind.collection());
        let url = self.url(&format!("{}/delete", kind.collection()));

        let body = json!({ "ids": ids });
        let envelope = self.send(&endpoint, self.http.post(&url).json(&body)).await?;
        Ok(Ack {
            message: envelope.message,
        })
    }
}
