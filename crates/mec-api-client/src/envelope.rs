//! Response envelope of the admin API.
//!
//! Every endpoint answers `{success, message?, data?}`; the upload endpoint
//! answers `{success, files: [{url}]}` instead of `data`. Fields use
//! `#[serde(default)]` so that an endpoint omitting one still decodes.

use mec_core::{EntityKind, Record};
use serde::Deserialize;
use serde_json::Value;

/// The common response wrapper.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Envelope {
    /// Whether the operation succeeded.
    #[serde(default)]
    pub success: bool,
    /// Human-readable outcome text.
    #[serde(default)]
    pub message: Option<String>,
    /// Operation payload.
    #[serde(default)]
    pub data: Option<Value>,
    /// Stored files, upload endpoint only.
    #[serde(default)]
    pub files: Vec<UploadedFile>,
}

/// One stored file reported by the upload endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct UploadedFile {
    /// Public URL of the stored file.
    pub url: String,
}

/// Decode a list payload into records.
///
/// Accepts a bare array, or an object holding the array under the
/// collection name (`{"subscribers": [...]}`). Anything else is an empty
/// list.
pub fn decode_list(kind: EntityKind, data: Option<Value>) -> Result<Vec<Record>, serde_json::Error> {
    let items = match data {
        Some(Value::Array(items)) => items,
        Some(Value::Object(mut obj)) => match obj.remove(kind.collection()) {
            Some(Value::Array(items)) => items,
            _ => Vec::new(),
        },
        _ => Vec::new(),
    };
    items.into_iter().map(serde_json::from_value).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn list_accepts_array_or_wrapped_object() {
        let array = decode_list(
            EntityKind::Subscriber,
            Some(json!([{"_id": "s1"}, {"_id": "s2"}])),
        )
        .unwrap();
        let wrapped = decode_list(
            EntityKind::Subscriber,
            Some(json!({"subscribers": [{"_id": "s1"}, {"_id": "s2"}]})),
        )
        .unwrap();
        assert_eq!(array, wrapped);
        assert_eq!(array[1].id.as_str(), "s2");
    }

    #[test]
    fn unexpected_shapes_decode_to_empty() {
        assert!(decode_list(EntityKind::Banner, None).unwrap().is_empty());
        assert!(decode_list(EntityKind::Banner, Some(json!("nope")))
            .unwrap()
            .is_empty());
        assert!(decode_list(EntityKind::Banner, Some(json!({"items": []})))
            .unwrap()
            .is_empty());
    }

    #[test]
    fn records_without_id_are_an_error() {
        assert!(decode_list(EntityKind::Client, Some(json!([{"client_name": "x"}]))).is_err());
    }

    #[test]
    fn envelope_defaults_missing_fields() {
        let envelope: Envelope = serde_json::from_value(json!({"success": true})).unwrap();
        assert!(envelope.success);
        assert!(envelope.message.is_none());
        assert!(envelope.files.is_empty());
    }
}
