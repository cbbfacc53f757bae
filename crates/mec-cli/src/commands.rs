//! # Subcommands
//!
//! Each subcommand drives one [`EntityScreen`] (or the dashboard
//! aggregator) against the configured backend.
//!
//! Screen operations report their own failures through the notifier, so
//! a failed screen call only turns into [`EXIT_FAILURE`] here. Errors
//! returned as `Err` are local problems: unreadable files, malformed
//! edits, broken output.

use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use clap::Subcommand;

use mec_api_client::assets::read_upload;
use mec_console::{
    ConfirmGate, ConsoleError, DashboardAggregator, DashboardSnapshot, EntityScreen, Notifier,
    StaticConfirm,
};
use mec_core::{AdminBackend, AssetUrl, EntityKind, RecordId};

use crate::edit::{apply_field_edits, EditArgs};

/// Exit code of a successful command.
pub const EXIT_OK: u8 = 0;
/// Exit code of a command whose backend operation failed.
pub const EXIT_FAILURE: u8 = 1;

/// Console subcommands.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// List every record of a kind.
    List {
        /// Entity kind (banner, client, project, work, review, subscriber, enquiry).
        kind: EntityKind,
    },

    /// Show one record. Showing an unopened enquiry marks it opened.
    Show {
        /// Entity kind.
        kind: EntityKind,
        /// Record identifier.
        id: RecordId,
    },

    /// List the choices for a reference field, e.g. a project's `client_id`.
    Options {
        /// Entity kind that owns the field.
        kind: EntityKind,
        /// Reference field name.
        field: String,
    },

    /// Create a record (banner, client, project, work).
    Create {
        /// Entity kind.
        kind: EntityKind,
        #[command(flatten)]
        edits: EditArgs,
    },

    /// Update a record; unspecified fields keep their current values.
    Update {
        /// Entity kind.
        kind: EntityKind,
        /// Record identifier.
        id: RecordId,
        #[command(flatten)]
        edits: EditArgs,
    },

    /// Delete one record and release the media it referenced.
    Delete {
        /// Entity kind.
        kind: EntityKind,
        /// Record identifier.
        id: RecordId,
        /// Skip the confirmation prompt.
        #[arg(short, long)]
        yes: bool,
    },

    /// Delete several records in a single call.
    DeleteMany {
        /// Entity kind.
        kind: EntityKind,
        /// Record identifiers.
        #[arg(required = true)]
        ids: Vec<RecordId>,
        /// Skip the confirmation prompt.
        #[arg(short, long)]
        yes: bool,
    },

    /// Flip a boolean field, e.g. a review's `is_verified`.
    Toggle {
        /// Entity kind.
        kind: EntityKind,
        /// Record identifier.
        id: RecordId,
        /// Boolean field name.
        field: String,
    },

    /// Print dashboard counts.
    Dashboard,

    /// Upload a media file and print its URL.
    Upload {
        /// File to upload.
        path: PathBuf,
    },

    /// Delete an uploaded media file.
    Release {
        /// URL returned by a previous upload.
        url: AssetUrl,
    },
}

/// Collaborators shared by every command.
pub struct Session {
    /// The admin backend.
    pub backend: Arc<dyn AdminBackend>,
    /// Where notifications go.
    pub notifier: Arc<dyn Notifier>,
    /// Asked before destructive actions unless `--yes` is given.
    pub confirm: Arc<dyn ConfirmGate>,
}

impl Session {
    fn screen(&self, kind: EntityKind, assume_yes: bool) -> EntityScreen {
        let confirm: Arc<dyn ConfirmGate> = if assume_yes {
            Arc::new(StaticConfirm::accept())
        } else {
            Arc::clone(&self.confirm)
        };
        EntityScreen::new(
            kind,
            Arc::clone(&self.backend),
            Arc::clone(&self.notifier),
            confirm,
        )
    }
}

/// Execute a subcommand, writing results to `out`.
pub async fn run_command<W: Write>(command: Command, session: &Session, out: &mut W) -> Result<u8> {
    tracing::debug!(backend = session.backend.backend_name(), ?command, "running command");
    match command {
        Command::List { kind } => cmd_list(session, kind, out).await,
        Command::Show { kind, id } => cmd_show(session, kind, &id, out).await,
        Command::Options { kind, field } => cmd_options(session, kind, &field, out).await,
        Command::Create { kind, edits } => {
            let mut screen = session.screen(kind, false);
            let Ok(()) = screen.open_create() else {
                return Ok(EXIT_FAILURE);
            };
            edit_and_submit(&mut screen, &edits).await
        }
        Command::Update { kind, id, edits } => {
            if edits.is_empty() {
                bail!("nothing to update: pass --set, --add, --remove or --upload");
            }
            let mut screen = session.screen(kind, false);
            let Ok(()) = screen.open_edit(&id).await else {
                return Ok(EXIT_FAILURE);
            };
            edit_and_submit(&mut screen, &edits).await
        }
        Command::Delete { kind, id, yes } => cmd_delete(session, kind, &id, yes, out).await,
        Command::DeleteMany { kind, ids, yes } => {
            cmd_delete_many(session, kind, &ids, yes, out).await
        }
        Command::Toggle { kind, id, field } => {
            let mut screen = session.screen(kind, false);
            match screen.toggle_flag(&id, &field).await {
                Ok(_) => Ok(EXIT_OK),
                Err(_) => Ok(EXIT_FAILURE),
            }
        }
        Command::Dashboard => cmd_dashboard(session, out).await,
        Command::Upload { path } => cmd_upload(session, &path, out).await,
        Command::Release { url } => cmd_release(session, url).await,
    }
}

// -- Listing ----------------------------------------------------------------

async fn cmd_list<W: Write>(session: &Session, kind: EntityKind, out: &mut W) -> Result<u8> {
    let mut screen = session.screen(kind, false);
    let Ok(()) = screen.mount().await else {
        return Ok(EXIT_FAILURE);
    };
    for record in screen.records() {
        writeln!(out, "{}", serde_json::to_string(record)?)?;
    }
    Ok(EXIT_OK)
}

async fn cmd_show<W: Write>(
    session: &Session,
    kind: EntityKind,
    id: &RecordId,
    out: &mut W,
) -> Result<u8> {
    let mut screen = session.screen(kind, false);
    let Ok(record) = screen.view(id).await else {
        return Ok(EXIT_FAILURE);
    };
    writeln!(out, "{}", serde_json::to_string_pretty(&record)?)?;
    Ok(EXIT_OK)
}

async fn cmd_options<W: Write>(
    session: &Session,
    kind: EntityKind,
    field: &str,
    out: &mut W,
) -> Result<u8> {
    let screen = session.screen(kind, false);
    let Ok(options) = screen.reference_options(field).await else {
        return Ok(EXIT_FAILURE);
    };
    for option in options {
        writeln!(out, "{}\t{}", option.id, option.label)?;
    }
    Ok(EXIT_OK)
}

// -- Editing ----------------------------------------------------------------

/// Apply edits to the open form and submit it. On any failure the form is
/// discarded so that files uploaded for it are released.
async fn edit_and_submit(screen: &mut EntityScreen, edits: &EditArgs) -> Result<u8> {
    let submitted = match apply_edits(screen, edits).await {
        Ok(true) => screen.submit().await.is_ok(),
        Ok(false) => false,
        Err(e) => {
            discard(screen).await;
            return Err(e);
        }
    };
    if submitted {
        Ok(EXIT_OK)
    } else {
        discard(screen).await;
        Ok(EXIT_FAILURE)
    }
}

/// Returns `Ok(false)` when a screen operation failed and was reported.
async fn apply_edits(screen: &mut EntityScreen, edits: &EditArgs) -> Result<bool> {
    // Highest index first so earlier positions stay valid.
    let mut removals = edits.remove.clone();
    removals.sort_by(|a, b| a.0.cmp(&b.0).then(b.1.cmp(&a.1)));
    for (group, index) in &removals {
        if screen.remove_group_instance(group, *index).await.is_err() {
            return Ok(false);
        }
    }

    apply_field_edits(screen.form_mut()?, edits)?;

    for (slot, path) in &edits.upload {
        let file = read_upload(path)
            .await
            .with_context(|| format!("cannot read {}", path.display()))?;
        if screen.upload(slot, &file).await.is_err() {
            return Ok(false);
        }
    }
    Ok(true)
}

async fn discard(screen: &mut EntityScreen) {
    let report = screen.cancel().await;
    for err in &report.failed {
        tracing::warn!(error = %err, "upload left behind after cancelled edit");
    }
}

// -- Deletion ---------------------------------------------------------------

async fn cmd_delete<W: Write>(
    session: &Session,
    kind: EntityKind,
    id: &RecordId,
    yes: bool,
    out: &mut W,
) -> Result<u8> {
    let mut screen = session.screen(kind, yes);
    // Loaded first so the deleted record's media can be released.
    let Ok(()) = screen.mount().await else {
        return Ok(EXIT_FAILURE);
    };
    match screen.delete(id).await {
        Ok(Some(_)) => Ok(EXIT_OK),
        Ok(None) => {
            writeln!(out, "Cancelled.")?;
            Ok(EXIT_OK)
        }
        Err(_) => Ok(EXIT_FAILURE),
    }
}

async fn cmd_delete_many<W: Write>(
    session: &Session,
    kind: EntityKind,
    ids: &[RecordId],
    yes: bool,
    out: &mut W,
) -> Result<u8> {
    let mut screen = session.screen(kind, yes);
    let Ok(()) = screen.mount().await else {
        return Ok(EXIT_FAILURE);
    };
    for id in ids {
        if screen.store().get(id).is_none() {
            bail!("no {} with id {id}", kind.label().to_lowercase());
        }
        if !screen.selection().contains(id) {
            screen.toggle_select(id);
        }
    }
    match screen.bulk_delete().await {
        Ok(Some(_)) => Ok(EXIT_OK),
        Ok(None) => {
            writeln!(out, "Cancelled.")?;
            Ok(EXIT_OK)
        }
        Err(_) => Ok(EXIT_FAILURE),
    }
}

// -- Dashboard --------------------------------------------------------------

async fn cmd_dashboard<W: Write>(session: &Session, out: &mut W) -> Result<u8> {
    let mut aggregator = DashboardAggregator::new(Arc::clone(&session.backend));
    let view = aggregator.snapshot().await;
    let Some(snapshot) = view.snapshot() else {
        session.notifier.notify_failure("Failed to load dashboard");
        return Ok(EXIT_FAILURE);
    };
    write_dashboard(snapshot, out)?;
    Ok(EXIT_OK)
}

fn write_dashboard<W: Write>(snapshot: &DashboardSnapshot, out: &mut W) -> std::io::Result<()> {
    for card in snapshot.cards() {
        writeln!(out, "{:<20} {:>8}", card.label, card.value)?;
    }
    writeln!(out)?;
    writeln!(out, "{:<20} {:>8} {:>11}", "", "current", "last month")?;
    for row in snapshot.comparison() {
        writeln!(
            out,
            "{:<20} {:>8} {:>11}",
            row.label, row.current, row.last_month
        )?;
    }
    writeln!(out, "(last month values are placeholders)")
}

// -- Media ------------------------------------------------------------------

async fn cmd_upload<W: Write>(session: &Session, path: &Path, out: &mut W) -> Result<u8> {
    let file = read_upload(path)
        .await
        .with_context(|| format!("cannot read {}", path.display()))?;
    match session.backend.upload_asset(&file).await {
        Ok(urls) if !urls.is_empty() => {
            session.notifier.notify_success("Image uploaded successfully!");
            for url in urls {
                writeln!(out, "{url}")?;
            }
            Ok(EXIT_OK)
        }
        Ok(_) => {
            session.notifier.notify_failure("Image upload failed!");
            Ok(EXIT_FAILURE)
        }
        Err(source) => {
            let err = ConsoleError::Upload { source };
            tracing::debug!(error = %err, "upload failed");
            session.notifier.notify_failure(&err.user_message());
            Ok(EXIT_FAILURE)
        }
    }
}

async fn cmd_release(session: &Session, url: AssetUrl) -> Result<u8> {
    match session.backend.delete_assets(std::slice::from_ref(&url)).await {
        Ok(_) => {
            session.notifier.notify_success("Image deleted successfully");
            Ok(EXIT_OK)
        }
        Err(source) => {
            let err = ConsoleError::AssetRelease { url, source };
            tracing::debug!(error = %err, "release failed");
            session.notifier.notify_failure(&err.user_message());
            Ok(EXIT_FAILURE)
        }
    }
}
