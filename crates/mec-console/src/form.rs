//! # Form Session
//!
//! Holds the in-progress create/edit buffer for one entity instance.
//!
//! ## States
//!
//! ```text
//! Closed ──open()──▶ Open(Create | Edit(id)) ──begin_submit()──▶ Submitting
//!   ▲                   ▲                                           │
//!   │                   └──────────────── fail_submit() ────────────┤
//!   └──────────────────────────────────── complete_submit() ────────┘
//! ```
//!
//! Buffer mutations are pure and only allowed in `Open`. A failed submit
//! returns to `Open` with the buffer intact so the user can retry; a
//! successful one discards the buffer.
//!
//! ## Asset Ownership
//!
//! Slots are written only by the [`AssetCoordinator`](crate::AssetCoordinator)
//! (crate-private setters). The session remembers which references were
//! uploaded during its lifetime and not yet submitted, so that discarding
//! the session can release them instead of orphaning them.

use std::collections::BTreeMap;
use std::fmt;

use mec_core::{AssetUrl, EntityKind, FieldMap, Record, RecordId};
use serde::Serialize;
use serde_json::Value;

use crate::error::{ConsoleError, FormError, ValidationError};
use crate::schema::{EntryRule, FormSchema, GroupInstance, GroupSpec};

/// Whether the session creates a new record or edits an existing one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormMode {
    /// Submitting creates a record.
    Create,
    /// Submitting updates the record with this identifier.
    Edit(RecordId),
}

/// Lifecycle state of a [`FormSession`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionState {
    /// No buffer.
    Closed,
    /// Buffer open for editing.
    Open(FormMode),
    /// Payload handed to the store; buffer frozen.
    Submitting(FormMode),
}

/// Location of an asset slot: a top-level slot, or an asset field of one
/// group instance.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum SlotKey {
    /// Top-level slot such as a banner's `img`.
    Field(String),
    /// Asset field of a group instance, such as a work block's `img`.
    Block {
        /// Group name.
        group: String,
        /// Instance position.
        index: usize,
        /// Asset field name.
        field: String,
    },
}

impl SlotKey {
    /// A top-level slot.
    pub fn field(name: impl Into<String>) -> Self {
        Self::Field(name.into())
    }

    /// An asset field of a group instance.
    pub fn block(group: impl Into<String>, index: usize, field: impl Into<String>) -> Self {
        Self::Block {
            group: group.into(),
            index,
            field: field.into(),
        }
    }
}

impl fmt::Display for SlotKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Field(name) => write!(f, "{name}"),
            Self::Block {
                group,
                index,
                field,
            } => write!(f, "{group}[{index}].{field}"),
        }
    }
}

/// Backend-shaped body built from a buffer, ready for create/update.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Payload(FieldMap);

impl Payload {
    /// Wrap a field map.
    pub fn new(fields: FieldMap) -> Self {
        Self(fields)
    }

    /// The payload fields.
    pub fn as_map(&self) -> &FieldMap {
        &self.0
    }

    /// One payload field.
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.0.get(name)
    }

    /// Consume into the field map.
    pub fn into_map(self) -> FieldMap {
        self.0
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
struct FormBuffer {
    scalars: BTreeMap<String, Value>,
    groups: BTreeMap<String, Vec<GroupInstance>>,
    slots: BTreeMap<String, Option<AssetUrl>>,
}

/// The in-progress buffer of one entity form.
#[derive(Debug, Clone)]
pub struct FormSession {
    schema: FormSchema,
    state: SessionState,
    buffer: FormBuffer,
    uncommitted: Vec<AssetUrl>,
    superseded: Vec<AssetUrl>,
}

impl FormSession {
    /// A closed session for a schema.
    pub fn new(schema: FormSchema) -> Self {
        Self {
            schema,
            state: SessionState::Closed,
            buffer: FormBuffer::default(),
            uncommitted: Vec::new(),
            superseded: Vec::new(),
        }
    }

    /// A closed session for a kind's built-in schema.
    ///
    /// # Errors
    ///
    /// Returns [`FormError::NoForm`] for kinds without an edit form.
    pub fn for_kind(kind: EntityKind) -> Result<Self, FormError> {
        FormSchema::for_kind(kind)
            .map(Self::new)
            .ok_or(FormError::NoForm { kind })
    }

    /// The form schema.
    pub fn schema(&self) -> &FormSchema {
        &self.schema
    }

    /// Current lifecycle state.
    pub fn state(&self) -> &SessionState {
        &self.state
    }

    /// Create/edit mode while open or submitting.
    pub fn mode(&self) -> Option<&FormMode> {
        match &self.state {
            SessionState::Closed => None,
            SessionState::Open(mode) | SessionState::Submitting(mode) => Some(mode),
        }
    }

    /// Whether the buffer accepts edits.
    pub fn is_open(&self) -> bool {
        matches!(self.state, SessionState::Open(_))
    }

    /// Identifier of the record being edited.
    pub fn editing_id(&self) -> Option<&RecordId> {
        match self.mode() {
            Some(FormMode::Edit(id)) => Some(id),
            _ => None,
        }
    }

    /// Open the buffer: empty with defaults for `None`, copied from the
    /// record for `Some`.
    ///
    /// Create mode starts every group with one blank instance. Edit mode
    /// decodes each group from its wire shape and pads it to the group's
    /// minimum size.
    ///
    /// # Errors
    ///
    /// Returns [`FormError::AlreadyOpen`] unless the session is closed.
    pub fn open(&mut self, existing: Option<&Record>) -> Result<(), FormError> {
        if self.state != SessionState::Closed {
            return Err(FormError::AlreadyOpen);
        }

        let mut buffer = FormBuffer::default();
        for spec in &self.schema.scalars {
            let value = match existing {
                Some(record) => spec.decode(record),
                None => spec.default_value(),
            };
            buffer.scalars.insert(spec.name.to_string(), value);
        }
        for spec in &self.schema.groups {
            let blank = || GroupInstance::empty(spec.codec.fields());
            let mut instances = match existing {
                Some(record) => spec.codec.decode(record.field(spec.name)),
                None => vec![blank()],
            };
            while instances.len() < spec.min_instances {
                instances.push(blank());
            }
            buffer.groups.insert(spec.name.to_string(), instances);
        }
        for spec in &self.schema.slots {
            let current = existing.and_then(|record| record.asset_field(spec.name));
            buffer.slots.insert(spec.name.to_string(), current);
        }

        self.buffer = buffer;
        self.uncommitted.clear();
        self.superseded.clear();
        self.state = SessionState::Open(match existing {
            Some(record) => FormMode::Edit(record.id.clone()),
            None => FormMode::Create,
        });
        tracing::debug!(kind = %self.schema.kind, state = ?self.state, "form session opened");
        Ok(())
    }

    fn ensure_editable(&self) -> Result<(), FormError> {
        match self.state {
            SessionState::Open(_) => Ok(()),
            SessionState::Submitting(_) => Err(FormError::Submitting),
            SessionState::Closed => Err(FormError::NotOpen),
        }
    }

    fn group_spec(&self, group: &str) -> Result<&GroupSpec, FormError> {
        self.schema.group(group).ok_or_else(|| FormError::UnknownGroup {
            group: group.to_string(),
        })
    }

    fn instances_mut(&mut self, group: &str) -> &mut Vec<GroupInstance> {
        self.buffer.groups.entry(group.to_string()).or_default()
    }

    /// Current value of a scalar field.
    pub fn scalar(&self, name: &str) -> Option<&Value> {
        self.buffer.scalars.get(name)
    }

    /// Set a scalar field.
    pub fn set_scalar(&mut self, name: &str, value: impl Into<Value>) -> Result<(), FormError> {
        self.ensure_editable()?;
        if self.schema.scalar(name).is_none() {
            return Err(FormError::UnknownField {
                field: name.to_string(),
            });
        }
        self.buffer.scalars.insert(name.to_string(), value.into());
        Ok(())
    }

    /// Current instances of a group.
    pub fn group(&self, name: &str) -> Option<&[GroupInstance]> {
        self.buffer.groups.get(name).map(Vec::as_slice)
    }

    /// Set one field of one group instance. Asset fields are rejected; they
    /// change only through upload and release.
    pub fn set_group_field(
        &mut self,
        group: &str,
        index: usize,
        field: &str,
        value: impl Into<String>,
    ) -> Result<(), FormError> {
        self.ensure_editable()?;
        let spec = self.group_spec(group)?;
        if spec.is_asset_field(field) {
            return Err(FormError::AssetField {
                group: group.to_string(),
                field: field.to_string(),
            });
        }
        if !spec.has_field(field) {
            return Err(FormError::UnknownField {
                field: format!("{group}.{field}"),
            });
        }
        let instances = self.instances_mut(group);
        let len = instances.len();
        let instance = instances
            .get_mut(index)
            .ok_or_else(|| FormError::IndexOutOfRange {
                group: group.to_string(),
                index,
                len,
            })?;
        instance.set(field, value);
        Ok(())
    }

    /// Append a blank instance; returns its index.
    pub fn add_group_instance(&mut self, group: &str) -> Result<usize, FormError> {
        self.ensure_editable()?;
        let blank = GroupInstance::empty(self.group_spec(group)?.codec.fields());
        let instances = self.instances_mut(group);
        instances.push(blank);
        Ok(instances.len() - 1)
    }

    /// Remove the instance at `index`, keeping the others in order.
    ///
    /// The removed instance is returned so that any asset references it
    /// held can be released; prefer
    /// [`AssetCoordinator::remove_group_instance`](crate::AssetCoordinator::remove_group_instance)
    /// for groups with asset fields.
    ///
    /// # Errors
    ///
    /// [`FormError::IndexOutOfRange`] for a bad index,
    /// [`FormError::BelowMinimum`] if the group is already at its minimum.
    pub fn remove_group_instance(
        &mut self,
        group: &str,
        index: usize,
    ) -> Result<GroupInstance, FormError> {
        self.ensure_editable()?;
        let min = self.group_spec(group)?.min_instances;
        let instances = self.instances_mut(group);
        if index >= instances.len() {
            return Err(FormError::IndexOutOfRange {
                group: group.to_string(),
                index,
                len: instances.len(),
            });
        }
        if instances.len() <= min {
            return Err(FormError::BelowMinimum {
                group: group.to_string(),
                min,
            });
        }
        Ok(instances.remove(index))
    }

    /// Validate that a slot exists in the schema and the buffer.
    pub(crate) fn check_slot(&self, slot: &SlotKey) -> Result<(), FormError> {
        let unknown = || FormError::UnknownSlot {
            slot: slot.to_string(),
        };
        match slot {
            SlotKey::Field(name) => self.schema.slot(name).map(|_| ()).ok_or_else(unknown),
            SlotKey::Block {
                group,
                index,
                field,
            } => {
                let spec = self.schema.group(group).ok_or_else(unknown)?;
                if !spec.is_asset_field(field) {
                    return Err(unknown());
                }
                let len = self.group(group).map_or(0, <[GroupInstance]>::len);
                if *index >= len {
                    return Err(FormError::IndexOutOfRange {
                        group: group.clone(),
                        index: *index,
                        len,
                    });
                }
                Ok(())
            }
        }
    }

    /// The reference a slot currently holds.
    pub fn asset(&self, slot: &SlotKey) -> Result<Option<AssetUrl>, FormError> {
        self.check_slot(slot)?;
        Ok(match slot {
            SlotKey::Field(name) => self.buffer.slots.get(name).cloned().flatten(),
            SlotKey::Block {
                group,
                index,
                field,
            } => self
                .group(group)
                .and_then(|instances| instances.get(*index))
                .and_then(|instance| AssetUrl::from_optional(instance.get(field))),
        })
    }

    /// Put `url` (or nothing) into a slot; returns what the slot held.
    pub(crate) fn replace_asset(
        &mut self,
        slot: &SlotKey,
        url: Option<AssetUrl>,
    ) -> Result<Option<AssetUrl>, FormError> {
        self.ensure_editable()?;
        let previous = self.asset(slot)?;
        match slot {
            SlotKey::Field(name) => {
                self.buffer.slots.insert(name.clone(), url);
            }
            SlotKey::Block {
                group,
                index,
                field,
            } => {
                let text = url.map(String::from).unwrap_or_default();
                if let Some(instance) = self.instances_mut(group).get_mut(*index) {
                    instance.set(field, text);
                }
            }
        }
        Ok(previous)
    }

    /// Every reference the buffer currently holds.
    pub fn asset_refs(&self) -> Vec<AssetUrl> {
        let mut refs: Vec<AssetUrl> = self.buffer.slots.values().flatten().cloned().collect();
        for spec in &self.schema.groups {
            for instance in self.group(spec.name).unwrap_or_default() {
                refs.extend(
                    spec.asset_fields
                        .iter()
                        .filter_map(|f| AssetUrl::from_optional(instance.get(f))),
                );
            }
        }
        refs
    }

    pub(crate) fn track_upload(&mut self, url: AssetUrl) {
        self.uncommitted.push(url);
    }

    pub(crate) fn untrack(&mut self, url: &AssetUrl) {
        self.uncommitted.retain(|u| u != url);
    }

    /// References uploaded during this session and not yet submitted.
    pub fn uncommitted_uploads(&self) -> &[AssetUrl] {
        &self.uncommitted
    }

    /// Whether `url` was uploaded during this session and is not yet
    /// submitted.
    pub fn is_uncommitted(&self, url: &AssetUrl) -> bool {
        self.uncommitted.contains(url)
    }

    /// Queue a record-owned reference that left the buffer. It is released
    /// only once a submit commits the record without it.
    pub(crate) fn defer_release(&mut self, url: AssetUrl) {
        if !self.superseded.contains(&url) {
            self.superseded.push(url);
        }
    }

    /// Record-owned references queued for release after the next
    /// successful submit.
    pub fn pending_releases(&self) -> &[AssetUrl] {
        &self.superseded
    }

    /// Build the backend payload from the buffer.
    ///
    /// Scalars are copied, groups are filtered by their [`EntryRule`] and
    /// re-encoded to wire shape, and slots are written as URL strings
    /// (blank when empty). Calling it twice without a mutation in between
    /// yields equal payloads.
    ///
    /// # Errors
    ///
    /// [`ConsoleError::Validation`] when a required scalar, group entry or
    /// asset is missing; [`ConsoleError::Form`] when the session is closed.
    pub fn build_payload(&self) -> Result<Payload, ConsoleError> {
        if self.state == SessionState::Closed {
            return Err(FormError::NotOpen.into());
        }

        let mut fields = FieldMap::new();
        for spec in &self.schema.scalars {
            let value = self
                .buffer
                .scalars
                .get(spec.name)
                .cloned()
                .unwrap_or_else(|| spec.default_value());
            if spec.required && crate::schema::ScalarSpec::is_missing(&value) {
                return Err(ValidationError::MissingField {
                    field: spec.name.to_string(),
                }
                .into());
            }
            fields.insert(spec.name.to_string(), value);
        }

        for spec in &self.schema.groups {
            let instances = self.group(spec.name).unwrap_or_default();
            let kept: Vec<GroupInstance> = match spec.entry_rule {
                EntryRule::Required => {
                    if let Some(index) = instances.iter().position(GroupInstance::is_blank) {
                        return Err(ValidationError::BlankGroupEntry {
                            group: spec.name.to_string(),
                            index,
                        }
                        .into());
                    }
                    instances.to_vec()
                }
                EntryRule::DropBlank => instances
                    .iter()
                    .filter(|i| !i.is_blank())
                    .cloned()
                    .collect(),
                EntryRule::Keep => instances.to_vec(),
            };
            fields.insert(spec.name.to_string(), spec.codec.encode(&kept));
        }

        for spec in &self.schema.slots {
            let current = self.buffer.slots.get(spec.name).cloned().flatten();
            if spec.required && current.is_none() {
                return Err(ValidationError::MissingAsset {
                    slot: spec.name.to_string(),
                }
                .into());
            }
            let text = current.map(String::from).unwrap_or_default();
            fields.insert(spec.name.to_string(), Value::String(text));
        }

        Ok(Payload(fields))
    }

    /// Validate, build the payload and freeze the buffer.
    ///
    /// On a validation failure the session stays `Open` and no state changes.
    pub fn begin_submit(&mut self) -> Result<(FormMode, Payload), ConsoleError> {
        let mode = match &self.state {
            SessionState::Open(mode) => mode.clone(),
            SessionState::Submitting(_) => return Err(FormError::Submitting.into()),
            SessionState::Closed => return Err(FormError::NotOpen.into()),
        };
        let payload = self.build_payload()?;
        self.state = SessionState::Submitting(mode.clone());
        Ok((mode, payload))
    }

    /// The backend accepted the submit: asset ownership passes to the
    /// record and the buffer is discarded. Returns the record-owned
    /// references the committed record no longer holds; the caller is
    /// responsible for releasing them.
    pub fn complete_submit(&mut self) -> Result<Vec<AssetUrl>, FormError> {
        if !matches!(self.state, SessionState::Submitting(_)) {
            return Err(FormError::NotSubmitting);
        }
        self.state = SessionState::Closed;
        self.buffer = FormBuffer::default();
        self.uncommitted.clear();
        Ok(std::mem::take(&mut self.superseded))
    }

    /// The backend refused the submit: reopen with the buffer intact.
    pub fn fail_submit(&mut self) -> Result<(), FormError> {
        match std::mem::replace(&mut self.state, SessionState::Closed) {
            SessionState::Submitting(mode) => {
                self.state = SessionState::Open(mode);
                Ok(())
            }
            other => {
                self.state = other;
                Err(FormError::NotSubmitting)
            }
        }
    }

    /// Close without submitting. Returns the uploads that no record owns;
    /// the caller is responsible for releasing them. Deferred releases are
    /// dropped, since the stored record still holds those references.
    pub fn close(&mut self) -> Vec<AssetUrl> {
        self.state = SessionState::Closed;
        self.buffer = FormBuffer::default();
        self.superseded.clear();
        std::mem::take(&mut self.uncommitted)
    }
}
