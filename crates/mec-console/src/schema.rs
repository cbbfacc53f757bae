//! # Form Schemas
//!
//! Declares, per entity kind, which scalar fields, repeatable groups and
//! asset slots its edit form has, and how each group maps between the edit
//! buffer and the wire.
//!
//! ## Group Codecs
//!
//! The buffer always holds a group as a list of [`GroupInstance`]s (string
//! fields by name). The wire shape varies per group:
//!
//! | Codec | Wire shape | Buffer instance |
//! |-------|-----------|-----------------|
//! | [`GroupCodec::Strings`] | `["a", "b"]` | `{value: "a"}` |
//! | [`GroupCodec::Keyed`] | `[{"name": "a"}]` | `{value: "a"}` |
//! | [`GroupCodec::Blocks`] | `[{"heading": .., "img": ..}]` | `{heading: .., img: ..}` |
//!
//! `decode` is total (anything unexpected decodes to blank strings or an
//! empty list) and `encode(decode(x))` returns `x` for well-formed input.

use std::collections::BTreeMap;

use mec_core::{EntityKind, Record};
use serde::Serialize;
use serde_json::{Map, Value};

/// Field name of the only field in single-value group instances.
pub const VALUE_FIELD: &str = "value";

/// How a scalar field is read from an existing record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScalarCodec {
    /// Copied as-is.
    Plain,
    /// A reference to a record of `target`; a populated `{_id, ...}`
    /// object collapses to its id string.
    Reference {
        /// Kind of the referenced record.
        target: EntityKind,
    },
}

/// Value type and create-mode default of a scalar field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScalarKind {
    /// Free text, default empty.
    Text,
    /// Boolean flag with its default.
    Flag {
        /// Value in create mode.
        default: bool,
    },
}

/// One scalar field of a form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScalarSpec {
    /// Field name in the buffer and on the wire.
    pub name: &'static str,
    /// Value type.
    pub kind: ScalarKind,
    /// Whether submit requires a non-blank value.
    pub required: bool,
    /// How the field is read from an existing record.
    pub codec: ScalarCodec,
}

impl ScalarSpec {
    fn text(name: &'static str) -> Self {
        Self {
            name,
            kind: ScalarKind::Text,
            required: true,
            codec: ScalarCodec::Plain,
        }
    }

    fn reference(name: &'static str, target: EntityKind) -> Self {
        Self {
            codec: ScalarCodec::Reference { target },
            ..Self::text(name)
        }
    }

    fn flag(name: &'static str, default: bool) -> Self {
        Self {
            name,
            kind: ScalarKind::Flag { default },
            required: false,
            codec: ScalarCodec::Plain,
        }
    }

    /// Kind of record this field refers to, for reference fields.
    pub fn reference_target(&self) -> Option<EntityKind> {
        match self.codec {
            ScalarCodec::Reference { target } => Some(target),
            ScalarCodec::Plain => None,
        }
    }

    /// Create-mode value.
    pub fn default_value(&self) -> Value {
        match self.kind {
            ScalarKind::Text => Value::String(String::new()),
            ScalarKind::Flag { default } => Value::Bool(default),
        }
    }

    /// Edit-mode value read from a record.
    pub fn decode(&self, record: &Record) -> Value {
        let raw = match record.field(self.name) {
            Some(v) if !v.is_null() => v,
            _ => return self.default_value(),
        };
        match (self.codec, raw) {
            (ScalarCodec::Reference { .. }, Value::Object(obj)) => obj
                .get("_id")
                .or_else(|| obj.get("id"))
                .cloned()
                .unwrap_or_else(|| self.default_value()),
            _ => raw.clone(),
        }
    }

    /// Whether a buffer value counts as "unset" for the required check.
    pub fn is_missing(value: &Value) -> bool {
        match value {
            Value::Null => true,
            Value::String(s) => s.trim().is_empty(),
            _ => false,
        }
    }
}

/// Wire shape of a repeatable group.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GroupCodec {
    /// Array of strings.
    Strings,
    /// Array of single-key objects.
    Keyed {
        /// The object key holding the value.
        key: &'static str,
    },
    /// Array of objects with a fixed set of string fields.
    Blocks {
        /// Field names of each block.
        fields: &'static [&'static str],
    },
}

impl GroupCodec {
    /// Field names of a buffer instance.
    pub fn fields(&self) -> &'static [&'static str] {
        match self {
            Self::Strings | Self::Keyed { .. } => &[VALUE_FIELD],
            Self::Blocks { fields } => *fields,
        }
    }

    /// Wire value to buffer instances.
    pub fn decode(&self, value: Option<&Value>) -> Vec<GroupInstance> {
        let Some(Value::Array(items)) = value else {
            return Vec::new();
        };
        items
            .iter()
            .map(|item| match self {
                Self::Strings => GroupInstance::single(text_of(Some(item))),
                Self::Keyed { key } => match item {
                    Value::Object(obj) => GroupInstance::single(text_of(obj.get(*key))),
                    other => GroupInstance::single(text_of(Some(other))),
                },
                Self::Blocks { fields } => {
                    let mut instance = GroupInstance::empty(fields);
                    if let Value::Object(obj) = item {
                        for field in fields.iter() {
                            instance.set(field, text_of(obj.get(*field)));
                        }
                    }
                    instance
                }
            })
            .collect()
    }

    /// Buffer instances to wire value.
    pub fn encode(&self, instances: &[GroupInstance]) -> Value {
        let items = instances
            .iter()
            .map(|instance| match self {
                Self::Strings => Value::String(instance.value().to_string()),
                Self::Keyed { key } => {
                    let mut obj = Map::new();
                    obj.insert((*key).to_string(), Value::String(instance.value().to_string()));
                    Value::Object(obj)
                }
                Self::Blocks { fields } => Value::Object(
                    fields
                        .iter()
                        .map(|f| ((*f).to_string(), Value::String(instance.get(f).to_string())))
                        .collect(),
                ),
            })
            .collect();
        Value::Array(items)
    }
}

fn text_of(value: Option<&Value>) -> String {
    match value {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
    }
}

/// What submit does with blank instances of a group.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryRule {
    /// Every instance must be non-blank.
    Required,
    /// Blank instances are dropped from the payload.
    DropBlank,
    /// Instances are sent as they are.
    Keep,
}

/// One repeatable group of a form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GroupSpec {
    /// Group name in the buffer and on the wire.
    pub name: &'static str,
    /// Wire mapping.
    pub codec: GroupCodec,
    /// Instances the group may not drop below while editing.
    pub min_instances: usize,
    /// Treatment of blank instances on submit.
    pub entry_rule: EntryRule,
    /// Block fields that hold asset references.
    pub asset_fields: &'static [&'static str],
}

impl GroupSpec {
    /// Whether `field` is one of this group's instance fields.
    pub fn has_field(&self, field: &str) -> bool {
        self.codec.fields().contains(&field)
    }

    /// Whether `field` holds an asset reference.
    pub fn is_asset_field(&self, field: &str) -> bool {
        self.asset_fields.contains(&field)
    }
}

/// One top-level asset slot of a form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SlotSpec {
    /// Slot name in the buffer and on the wire.
    pub name: &'static str,
    /// Whether submit requires a reference.
    pub required: bool,
}

/// Complete description of one entity kind's edit form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormSchema {
    /// The entity kind.
    pub kind: EntityKind,
    /// Scalar fields, in payload order.
    pub scalars: Vec<ScalarSpec>,
    /// Repeatable groups.
    pub groups: Vec<GroupSpec>,
    /// Top-level asset slots.
    pub slots: Vec<SlotSpec>,
}

const WORK_INFO_FIELDS: &[&str] = &["heading", "details", "img"];

impl FormSchema {
    /// The schema for a kind, or `None` for kinds without an edit form
    /// (reviews, subscribers, enquiries).
    pub fn for_kind(kind: EntityKind) -> Option<Self> {
        match kind {
            EntityKind::Banner => Some(Self::banner()),
            EntityKind::Client => Some(Self::client()),
            EntityKind::Project => Some(Self::project()),
            EntityKind::Work => Some(Self::work()),
            EntityKind::Review | EntityKind::Subscriber | EntityKind::Enquiry => None,
        }
    }

    /// Banner: text fields, an active flag and a required image.
    pub fn banner() -> Self {
        Self {
            kind: EntityKind::Banner,
            scalars: vec![
                ScalarSpec::text("name"),
                ScalarSpec::text("description"),
                ScalarSpec::text("position"),
                ScalarSpec::flag("is_active", true),
            ],
            groups: Vec::new(),
            slots: vec![SlotSpec {
                name: "img",
                required: true,
            }],
        }
    }

    /// Client: a name plus company, email and phone lists.
    pub fn client() -> Self {
        let list = |name, codec, entry_rule| GroupSpec {
            name,
            codec,
            min_instances: 1,
            entry_rule,
            asset_fields: &[],
        };
        Self {
            kind: EntityKind::Client,
            scalars: vec![ScalarSpec::text("client_name")],
            groups: vec![
                list(
                    "companies",
                    GroupCodec::Keyed { key: "name" },
                    EntryRule::Required,
                ),
                list("client_emails", GroupCodec::Strings, EntryRule::DropBlank),
                list("client_phones", GroupCodec::Strings, EntryRule::DropBlank),
            ],
            slots: Vec::new(),
        }
    }

    /// Project: text fields, client/work references and a required image.
    pub fn project() -> Self {
        Self {
            kind: EntityKind::Project,
            scalars: vec![
                ScalarSpec::text("project_name"),
                ScalarSpec::text("short_description"),
                ScalarSpec::text("project_url"),
                ScalarSpec::reference("client_id", EntityKind::Client),
                ScalarSpec::reference("work_id", EntityKind::Work),
            ],
            groups: Vec::new(),
            slots: vec![SlotSpec {
                name: "project_image",
                required: true,
            }],
        }
    }

    /// Work: a title plus heading/details/image blocks. Blocks may be
    /// removed down to none.
    pub fn work() -> Self {
        Self {
            kind: EntityKind::Work,
            scalars: vec![ScalarSpec::text("title")],
            groups: vec![GroupSpec {
                name: "info",
                codec: GroupCodec::Blocks {
                    fields: WORK_INFO_FIELDS,
                },
                min_instances: 0,
                entry_rule: EntryRule::Keep,
                asset_fields: &["img"],
            }],
            slots: Vec::new(),
        }
    }

    /// Look up a scalar field.
    pub fn scalar(&self, name: &str) -> Option<&ScalarSpec> {
        self.scalars.iter().find(|s| s.name == name)
    }

    /// Look up a group.
    pub fn group(&self, name: &str) -> Option<&GroupSpec> {
        self.groups.iter().find(|g| g.name == name)
    }

    /// Look up a top-level slot.
    pub fn slot(&self, name: &str) -> Option<&SlotSpec> {
        self.slots.iter().find(|s| s.name == name)
    }
}

/// Field shown as the label of a record offered as a reference choice.
pub fn label_field(kind: EntityKind) -> &'static str {
    match kind {
        EntityKind::Client => "client_name",
        EntityKind::Project => "project_name",
        EntityKind::Work => "title",
        EntityKind::Subscriber => "email",
        EntityKind::Banner | EntityKind::Review | EntityKind::Enquiry => "name",
    }
}

/// One instance of a repeatable group: string fields by name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct GroupInstance {
    fields: BTreeMap<String, String>,
}

impl GroupInstance {
    /// An instance with every listed field blank.
    pub fn empty(fields: &[&str]) -> Self {
        Self {
            fields: fields
                .iter()
                .map(|f| ((*f).to_string(), String::new()))
                .collect(),
        }
    }

    /// A single-value instance.
    pub fn single(value: impl Into<String>) -> Self {
        let mut fields = BTreeMap::new();
        fields.insert(VALUE_FIELD.to_string(), value.into());
        Self { fields }
    }

    /// A field's value; absent fields read as blank.
    pub fn get(&self, field: &str) -> &str {
        self.fields.get(field).map_or("", String::as_str)
    }

    /// The value of a single-value instance.
    pub fn value(&self) -> &str {
        self.get(VALUE_FIELD)
    }

    /// Set a field's value.
    pub fn set(&mut self, field: &str, value: impl Into<String>) {
        self.fields.insert(field.to_string(), value.into());
    }

    /// Whether every field is blank after trimming.
    pub fn is_blank(&self) -> bool {
        self.fields.values().all(|v| v.trim().is_empty())
    }

    /// Fields in name order.
    pub fn fields(&self) -> impl Iterator<Item = (&str, &str)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}
