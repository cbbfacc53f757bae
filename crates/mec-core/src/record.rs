//! # Wire Records
//!
//! A [`Record`] is what the list and detail endpoints return: a
//! backend-assigned `_id` plus every other field, kept as raw JSON. The
//! console never inspects domain fields outside the form schemas.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::identity::{AssetUrl, RecordId};

/// JSON object body of a record or payload.
pub type FieldMap = Map<String, Value>;

/// A record as returned by the admin API.
///
/// Fields use `#[serde(flatten)]` so that any field the backend adds is kept
/// and round-trips unchanged.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record {
    /// Backend-assigned identifier.
    #[serde(rename = "_id", alias = "id")]
    pub id: RecordId,
    /// All remaining fields.
    #[serde(flatten)]
    pub fields: FieldMap,
}

impl Record {
    /// Construct a record from an identifier and field map.
    pub fn new(id: RecordId, fields: FieldMap) -> Self {
        Self { id, fields }
    }

    /// Raw access to one field.
    pub fn field(&self, name: &str) -> Option<&Value> {
        self.fields.get(name)
    }

    /// A string field, if present and a string.
    pub fn str_field(&self, name: &str) -> Option<&str> {
        self.fields.get(name).and_then(Value::as_str)
    }

    /// A boolean field, if present and a boolean.
    pub fn bool_field(&self, name: &str) -> Option<bool> {
        self.fields.get(name).and_then(Value::as_bool)
    }

    /// A field interpreted as an asset reference. Blank strings and
    /// non-strings are "no asset".
    pub fn asset_field(&self, name: &str) -> Option<AssetUrl> {
        self.str_field(name).and_then(AssetUrl::from_optional)
    }
}

/// Acknowledgement of a successful mutation: the optional `message` of a
/// `{success: true, message?}` envelope.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ack {
    /// Message supplied by the backend, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl Ack {
    /// Acknowledgement carrying a backend message.
    pub fn with_message(message: impl Into<String>) -> Self {
        Self {
            message: Some(message.into()),
        }
    }
}
