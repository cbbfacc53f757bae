//! # Entity Screen
//!
//! Controller for one entity kind's admin screen. Composes the store, the
//! form session, the selection set and the asset coordinator, and turns
//! every outcome into exactly one notification.
//!
//! Every method also returns its typed result, so callers can branch on
//! the outcome without parsing notification text. A failure never leaves
//! the screen unusable: the cache and buffer keep their prior state and the
//! next action can proceed.

use std::sync::Arc;

use mec_core::{AdminBackend, AssetUpload, AssetUrl, EntityKind, FieldMap, Record, RecordId};
use serde::Serialize;
use serde_json::Value;

use crate::asset::{AssetCoordinator, ReleaseReport};
use crate::error::{ConsoleError, FormError};
use crate::form::{FormMode, FormSession, SlotKey};
use crate::notify::{ConfirmGate, Notifier};
use crate::schema::{label_field, GroupInstance};
use crate::selection::SelectionSet;
use crate::store::{EntityStore, MutationReceipt};

/// A record offered as the value of a reference field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReferenceOption {
    /// Identifier written into the field.
    pub id: RecordId,
    /// Text shown for the choice; the id when the record has no label.
    pub label: String,
}

/// One entity kind's list, editor and bulk-selection state.
pub struct EntityScreen {
    kind: EntityKind,
    store: EntityStore,
    form: Option<FormSession>,
    selection: SelectionSet,
    assets: AssetCoordinator,
    notifier: Arc<dyn Notifier>,
    confirm: Arc<dyn ConfirmGate>,
}

impl std::fmt::Debug for EntityScreen {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EntityScreen")
            .field("kind", &self.kind)
            .field("store", &self.store)
            .field("form", &self.form.as_ref().map(FormSession::state))
            .field("selection", &self.selection.len())
            .finish()
    }
}

impl EntityScreen {
    /// A screen for `kind` over `backend`.
    pub fn new(
        kind: EntityKind,
        backend: Arc<dyn AdminBackend>,
        notifier: Arc<dyn Notifier>,
        confirm: Arc<dyn ConfirmGate>,
    ) -> Self {
        Self {
            kind,
            store: EntityStore::new(kind, Arc::clone(&backend)),
            form: FormSession::for_kind(kind).ok(),
            selection: SelectionSet::new(),
            assets: AssetCoordinator::new(backend),
            notifier,
            confirm,
        }
    }

    /// The entity kind.
    pub fn kind(&self) -> EntityKind {
        self.kind
    }

    /// The cached list.
    pub fn store(&self) -> &EntityStore {
        &self.store
    }

    /// Cached records in backend order.
    pub fn records(&self) -> &[Record] {
        self.store.records()
    }

    /// The bulk selection.
    pub fn selection(&self) -> &SelectionSet {
        &self.selection
    }

    /// The form session, for kinds that have one.
    pub fn form(&self) -> Option<&FormSession> {
        self.form.as_ref()
    }

    /// Mutable access to the form session for buffer edits.
    pub fn form_mut(&mut self) -> Result<&mut FormSession, ConsoleError> {
        let kind = self.kind;
        self.form
            .as_mut()
            .ok_or(ConsoleError::Form(FormError::NoForm { kind }))
    }

    fn fail<T>(&self, err: ConsoleError) -> Result<T, ConsoleError> {
        self.notifier.notify_failure(&err.user_message());
        Err(err)
    }

    fn after_refresh(&mut self, receipt: &MutationReceipt) {
        self.selection.retain(&self.store.ids());
        if let Some(err) = &receipt.refresh_error {
            self.notifier.notify_failure(&err.user_message());
        }
    }

    fn report_releases(&self, report: &ReleaseReport) {
        if let Some(err) = report.failed.first() {
            self.notifier.notify_failure(&err.user_message());
        }
    }

    // -- Listing ------------------------------------------------------------

    /// Load the list.
    pub async fn mount(&mut self) -> Result<(), ConsoleError> {
        match self.store.refresh().await.map(|_| ()) {
            Ok(()) => {
                self.selection.retain(&self.store.ids());
                Ok(())
            }
            Err(err) => self.fail(err),
        }
    }

    /// Load one record. Viewing an enquiry that has not been opened marks
    /// it opened; a failure to mark is logged and does not fail the view.
    pub async fn view(&mut self, id: &RecordId) -> Result<Record, ConsoleError> {
        let mut record = match self.store.fetch_one(id).await {
            Ok(record) => record,
            Err(err) => return self.fail(err),
        };

        if self.kind == EntityKind::Enquiry && record.bool_field("is_opened") != Some(true) {
            let mut mark = FieldMap::new();
            mark.insert("is_opened".into(), Value::Bool(true));
            mark.insert(
                "opened_at".into(),
                Value::String(chrono::Utc::now().to_rfc3339()),
            );
            match self.store.update(id, &mark).await {
                Ok(receipt) => {
                    self.selection.retain(&self.store.ids());
                    record.fields.extend(mark);
                    if let Some(err) = receipt.refresh_error {
                        tracing::warn!(%id, error = %err, "refresh after marking enquiry failed");
                    }
                }
                Err(err) => {
                    tracing::warn!(%id, error = %err, "failed to mark enquiry opened");
                }
            }
        }
        Ok(record)
    }

    // -- Editing ------------------------------------------------------------

    /// Open an empty create form.
    pub fn open_create(&mut self) -> Result<(), ConsoleError> {
        let result = self
            .form_mut()
            .and_then(|form| form.open(None).map_err(ConsoleError::from));
        result.or_else(|err| self.fail(err))
    }

    /// Open an edit form pre-filled from the cached record, loading it from
    /// the backend if it is not cached.
    pub async fn open_edit(&mut self, id: &RecordId) -> Result<(), ConsoleError> {
        let record = match self.store.get(id) {
            Some(record) => record.clone(),
            None => match self.store.fetch_one(id).await {
                Ok(record) => record,
                Err(err) => return self.fail(err),
            },
        };
        let result = self
            .form_mut()
            .and_then(|form| form.open(Some(&record)).map_err(ConsoleError::from));
        result.or_else(|err| self.fail(err))
    }

    /// Choices for a reference field of the form, such as a project's
    /// `client_id`: every record of the referenced kind, in backend order.
    ///
    /// # Errors
    ///
    /// [`FormError::UnknownField`] if `field` is not a reference field,
    /// [`ConsoleError::Fetch`] if the referenced list cannot be loaded.
    pub async fn reference_options(
        &self,
        field: &str,
    ) -> Result<Vec<ReferenceOption>, ConsoleError> {
        let target = self
            .form
            .as_ref()
            .and_then(|form| form.schema().scalar(field))
            .and_then(|spec| spec.reference_target());
        let Some(target) = target else {
            return self.fail(
                FormError::UnknownField {
                    field: field.to_string(),
                }
                .into(),
            );
        };

        let mut store = EntityStore::new(target, self.store.backend());
        let records = match store.refresh().await {
            Ok(records) => records,
            Err(err) => return self.fail(err),
        };
        let label = label_field(target);
        Ok(records
            .iter()
            .map(|record| ReferenceOption {
                id: record.id.clone(),
                label: record
                    .str_field(label)
                    .filter(|s| !s.trim().is_empty())
                    .unwrap_or(record.id.as_str())
                    .to_string(),
            })
            .collect())
    }

    /// Upload a file into a slot of the open form.
    pub async fn upload(
        &mut self,
        slot: &SlotKey,
        file: &AssetUpload,
    ) -> Result<AssetUrl, ConsoleError> {
        let kind = self.kind;
        let Some(form) = self.form.as_mut() else {
            return self.fail(FormError::NoForm { kind }.into());
        };
        match self.assets.upload(form, slot, file).await {
            Ok(url) => {
                self.notifier.notify_success("Image uploaded successfully!");
                Ok(url)
            }
            Err(err) => self.fail(err),
        }
    }

    /// Release the asset held by a slot of the open form.
    pub async fn release(&mut self, slot: &SlotKey) -> Result<Option<AssetUrl>, ConsoleError> {
        let kind = self.kind;
        let Some(form) = self.form.as_mut() else {
            return self.fail(FormError::NoForm { kind }.into());
        };
        match self.assets.release(form, slot).await {
            Ok(released) => {
                if released.is_some() {
                    self.notifier.notify_success("Image deleted successfully");
                }
                Ok(released)
            }
            Err(err) => self.fail(err),
        }
    }

    /// Remove a group instance of the open form, releasing any assets it
    /// held.
    pub async fn remove_group_instance(
        &mut self,
        group: &str,
        index: usize,
    ) -> Result<GroupInstance, ConsoleError> {
        let kind = self.kind;
        let Some(form) = self.form.as_mut() else {
            return self.fail(FormError::NoForm { kind }.into());
        };
        match self.assets.remove_group_instance(form, group, index).await {
            Ok((removed, report)) => {
                self.report_releases(&report);
                Ok(removed)
            }
            Err(err) => self.fail(err),
        }
    }

    /// Submit the open form: create or update, then refresh the list.
    ///
    /// A validation failure makes no network call. A backend failure
    /// reopens the form with the buffer intact.
    pub async fn submit(&mut self) -> Result<MutationReceipt, ConsoleError> {
        let kind = self.kind;
        let Some(form) = self.form.as_mut() else {
            return self.fail(FormError::NoForm { kind }.into());
        };
        let (mode, payload) = match form.begin_submit() {
            Ok(submission) => submission,
            Err(err) => return self.fail(err),
        };

        let payload = payload.into_map();
        let (result, verb) = match &mode {
            FormMode::Create => (self.store.create(&payload).await, "added"),
            FormMode::Edit(id) => (self.store.update(id, &payload).await, "updated"),
        };

        match result {
            Ok(receipt) => {
                let superseded = match self.form.as_mut() {
                    Some(form) => form.complete_submit()?,
                    None => Vec::new(),
                };
                self.notifier.notify_success(
                    &receipt.message_or(format!("{} {verb} successfully", kind.label())),
                );
                self.after_refresh(&receipt);
                let report = self.assets.release_superseded(&superseded).await;
                self.report_releases(&report);
                Ok(receipt)
            }
            Err(err) => {
                if let Some(form) = self.form.as_mut() {
                    form.fail_submit()?;
                }
                self.fail(err)
            }
        }
    }

    /// Close the form without submitting and release uploads no record owns.
    pub async fn cancel(&mut self) -> ReleaseReport {
        match self.form.as_mut() {
            Some(form) => self.assets.discard(form).await,
            None => ReleaseReport::default(),
        }
    }

    // -- Deletion -----------------------------------------------------------

    async fn release_deleted(&self, records: &[Record]) {
        let Some(form) = self.form.as_ref() else {
            return;
        };
        let mut report = ReleaseReport::default();
        for record in records {
            let released = self
                .assets
                .release_record_assets(form.schema(), record)
                .await;
            report.released.extend(released.released);
            report.failed.extend(released.failed);
        }
        self.report_releases(&report);
    }

    /// Delete one record after confirmation, then release its assets.
    ///
    /// Returns `Ok(None)` when the user declines. An asset release failure
    /// does not undo the deletion; it is reported as a separate failure
    /// notification after the success notification.
    pub async fn delete(&mut self, id: &RecordId) -> Result<Option<MutationReceipt>, ConsoleError> {
        let prompt = format!(
            "Are you sure you want to delete this {}?",
            self.kind.label().to_lowercase()
        );
        if !self.confirm.confirm(&prompt) {
            return Ok(None);
        }

        let cached = self.store.get(id).cloned();
        match self.store.delete(id).await {
            Ok((evicted, receipt)) => {
                self.selection.forget(id);
                self.notifier.notify_success(&receipt.message_or(format!(
                    "{} deleted successfully",
                    self.kind.label()
                )));
                self.after_refresh(&receipt);
                let deleted: Vec<Record> = evicted.or(cached).into_iter().collect();
                self.release_deleted(&deleted).await;
                Ok(Some(receipt))
            }
            Err(err) => self.fail(err),
        }
    }

    /// Delete every selected record in one call after confirmation.
    ///
    /// # Errors
    ///
    /// [`ConsoleError::NoSelection`] if nothing is selected (no prompt is
    /// shown and no call is made).
    pub async fn bulk_delete(&mut self) -> Result<Option<MutationReceipt>, ConsoleError> {
        if self.selection.is_empty() {
            return self.fail(ConsoleError::NoSelection { kind: self.kind });
        }
        let prompt = format!(
            "Are you sure you want to delete selected {}?",
            self.kind.collection()
        );
        if !self.confirm.confirm(&prompt) {
            return Ok(None);
        }

        let ids = self.selection.ids();
        match self.store.delete_many(&ids).await {
            Ok((evicted, receipt)) => {
                self.selection.clear();
                self.notifier.notify_success(&receipt.message_or(format!(
                    "Selected {} deleted successfully",
                    self.kind.collection()
                )));
                self.after_refresh(&receipt);
                self.release_deleted(&evicted).await;
                Ok(Some(receipt))
            }
            Err(err) => self.fail(err),
        }
    }

    // -- Selection ----------------------------------------------------------

    /// Toggle one record's selection. Returns whether it is now selected.
    pub fn toggle_select(&mut self, id: &RecordId) -> bool {
        self.selection.toggle(id)
    }

    /// Select every cached record, or clear if all are already selected.
    pub fn toggle_all(&mut self) {
        let ids = self.store.ids();
        if self.selection.is_all_selected(&ids) {
            self.selection.select_all(None);
        } else {
            self.selection.select_all(Some(&ids));
        }
    }

    /// Whether the "select all" checkbox is checked.
    pub fn is_all_selected(&self) -> bool {
        self.selection.is_all_selected(&self.store.ids())
    }

    // -- Flags --------------------------------------------------------------

    /// Negate a boolean field of a cached record with a partial update.
    pub async fn toggle_flag(
        &mut self,
        id: &RecordId,
        field: &str,
    ) -> Result<MutationReceipt, ConsoleError> {
        let current = match self.store.get(id) {
            Some(record) => record.bool_field(field).unwrap_or(false),
            None => match self.store.fetch_one(id).await {
                Ok(record) => record.bool_field(field).unwrap_or(false),
                Err(err) => return self.fail(err),
            },
        };
        let mut payload = FieldMap::new();
        payload.insert(field.to_string(), Value::Bool(!current));

        match self.store.update(id, &payload).await {
            Ok(receipt) => {
                self.notifier.notify_success(&receipt.message_or(format!(
                    "{} updated successfully",
                    self.kind.label()
                )));
                self.after_refresh(&receipt);
                Ok(receipt)
            }
            Err(err) => self.fail(err),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::notify::{NoticeLevel, RecordingNotifier, StaticConfirm};
    use mec_core::{BackendError, MockAdminBackend, MockOp};
    use serde_json::json;

    fn record(value: Value) -> Record {
        serde_json::from_value(value).unwrap()
    }

    fn screen(
        kind: EntityKind,
        mock: &MockAdminBackend,
        confirm: StaticConfirm,
    ) -> (EntityScreen, Arc<RecordingNotifier>, Arc<StaticConfirm>) {
        let notifier = Arc::new(RecordingNotifier::new());
        let confirm = Arc::new(confirm);
        let screen = EntityScreen::new(
            kind,
            Arc::new(mock.clone()),
            notifier.clone(),
            confirm.clone(),
        );
        (screen, notifier, confirm)
    }

    #[tokio::test]
    async fn kinds_without_form_reject_editing() {
        let mock = MockAdminBackend::new();
        let (mut screen, notifier, _) = screen(EntityKind::Review, &mock, StaticConfirm::accept());
        assert!(screen.form().is_none());
        assert!(screen.open_create().is_err());
        assert_eq!(
            notifier.messages(NoticeLevel::Failure),
            vec!["Review records have no edit form"]
        );
    }

    #[tokio::test]
    async fn project_references_list_clients_and_works() {
        let mock = MockAdminBackend::new();
        mock.seed(
            EntityKind::Client,
            [
                record(json!({"_id": "c1", "client_name": "Acme"})),
                record(json!({"_id": "c2", "client_name": " "})),
            ],
        );
        mock.seed(EntityKind::Work, [record(json!({"_id": "w1", "title": "Branding"}))]);
        let (screen, notifier, _) = screen(EntityKind::Project, &mock, StaticConfirm::accept());

        let clients = screen.reference_options("client_id").await.unwrap();
        assert_eq!(
            clients,
            vec![
                ReferenceOption {
                    id: RecordId::new("c1").unwrap(),
                    label: "Acme".into()
                },
                ReferenceOption {
                    id: RecordId::new("c2").unwrap(),
                    label: "c2".into()
                },
            ]
        );
        let works = screen.reference_options("work_id").await.unwrap();
        assert_eq!(works[0].label, "Branding");

        assert!(screen.reference_options("project_name").await.is_err());
        assert_eq!(
            notifier.messages(NoticeLevel::Failure),
            vec!["Unknown field: project_name"]
        );
    }

    #[tokio::test]
    async fn reference_load_failure_is_reported() {
        let mock = MockAdminBackend::new();
        mock.fail(MockOp::FetchList, BackendError::transport("offline"));
        let (screen, notifier, _) = screen(EntityKind::Project, &mock, StaticConfirm::accept());

        let err = screen.reference_options("client_id").await.unwrap_err();
        assert!(matches!(
            err,
            ConsoleError::Fetch {
                kind: EntityKind::Client,
                ..
            }
        ));
        assert_eq!(
            notifier.messages(NoticeLevel::Failure),
            vec!["Failed to fetch clients"]
        );
    }

    #[tokio::test]
    async fn declined_delete_makes_no_call() {
        let mock = MockAdminBackend::new();
        mock.seed(EntityKind::Client, [record(json!({"_id": "c1"}))]);
        let (mut screen, _, confirm) = screen(EntityKind::Client, &mock, StaticConfirm::decline());
        screen.mount().await.unwrap();

        let outcome = screen.delete(&RecordId::new("c1").unwrap()).await.unwrap();
        assert!(outcome.is_none());
        assert_eq!(mock.calls(MockOp::Delete), 0);
        assert_eq!(
            confirm.prompts(),
            vec!["Are you sure you want to delete this client?"]
        );
    }

    #[tokio::test]
    async fn toggle_flag_negates_field() {
        let mock = MockAdminBackend::new();
        mock.seed(
            EntityKind::Review,
            [record(json!({"_id": "r1", "is_verified": false}))],
        );
        let (mut screen, notifier, _) = screen(EntityKind::Review, &mock, StaticConfirm::accept());
        screen.mount().await.unwrap();

        let id = RecordId::new("r1").unwrap();
        screen.toggle_flag(&id, "is_verified").await.unwrap();
        assert_eq!(
            screen.store().get(&id).unwrap().bool_field("is_verified"),
            Some(true)
        );
        assert_eq!(
            notifier.last().map(|n| n.message),
            Some("Review updated successfully".to_string())
        );
    }

    #[tokio::test]
    async fn viewing_an_enquiry_marks_it_opened() {
        let mock = MockAdminBackend::new();
        mock.seed(
            EntityKind::Enquiry,
            [record(json!({"_id": "e1", "name": "Dee", "is_opened": false}))],
        );
        let (mut screen, _, _) = screen(EntityKind::Enquiry, &mock, StaticConfirm::accept());
        let id = RecordId::new("e1").unwrap();

        let viewed = screen.view(&id).await.unwrap();
        assert_eq!(viewed.bool_field("is_opened"), Some(true));
        assert!(viewed.str_field("opened_at").is_some());
        assert_eq!(mock.records(EntityKind::Enquiry)[0].bool_field("is_opened"), Some(true));

        // Already opened: no second update.
        screen.view(&id).await.unwrap();
        assert_eq!(mock.calls(MockOp::Update), 1);
    }

    #[tokio::test]
    async fn failed_marking_does_not_fail_view() {
        let mock = MockAdminBackend::new();
        mock.seed(EntityKind::Enquiry, [record(json!({"_id": "e1"}))]);
        mock.fail(MockOp::Update, BackendError::transport("offline"));
        let (mut screen, notifier, _) = screen(EntityKind::Enquiry, &mock, StaticConfirm::accept());

        let viewed = screen.view(&RecordId::new("e1").unwrap()).await.unwrap();
        assert_eq!(viewed.bool_field("is_opened"), None);
        assert!(notifier.notices().is_empty());
    }

    #[tokio::test]
    async fn toggle_all_selects_then_clears() {
        let mock = MockAdminBackend::new();
        mock.seed(
            EntityKind::Subscriber,
            [record(json!({"_id": "s1"})), record(json!({"_id": "s2"}))],
        );
        let (mut screen, _, _) = screen(EntityKind::Subscriber, &mock, StaticConfirm::accept());
        assert!(!screen.is_all_selected());

        screen.mount().await.unwrap();
        screen.toggle_all();
        assert!(screen.is_all_selected());
        screen.toggle_all();
        assert!(screen.selection().is_empty());
    }
}
