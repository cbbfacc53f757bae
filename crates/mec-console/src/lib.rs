#![deny(missing_docs)]

//! # mec-console -- Entity Lifecycle and Media-Asset Coordination
//!
//! The engine behind every entity screen of the admin console: list
//! caching, create/edit buffers with repeatable sub-fields, media upload
//! and release, bulk selection, and dashboard aggregation.
//!
//! ## Architecture
//!
//! ```text
//!                  ┌────────────── EntityScreen ──────────────┐
//!                  │                                          │
//!   EntityStore ◀──┤  FormSession ◀── AssetCoordinator        │──▶ Notifier
//!   (cached list)  │  (buffer)        (upload / release)      │──▶ ConfirmGate
//!                  │  SelectionSet                            │
//!                  └──────────────────────────────────────────┘
//!                                    │
//!                          Arc<dyn AdminBackend>
//!
//!   DashboardAggregator ──▶ Arc<dyn AdminBackend>
//! ```
//!
//! Components are independent and own their state; [`EntityScreen`]
//! composes them for one entity kind. Only the store, the coordinator and
//! the aggregator perform I/O, always through [`mec_core::AdminBackend`].
//!
//! ## Asset Ownership
//!
//! An upload is persisted remotely before the record that will reference
//! it is saved. The coordinator releases a reference as soon as nothing can
//! reach it any more: replaced in its slot, removed with its group
//! instance, abandoned with a discarded session, or left behind by a
//! deleted record. A reference the stored record still owns is released
//! only after the submit that drops it succeeds.

pub mod asset;
pub mod dashboard;
pub mod error;
pub mod form;
pub mod notify;
pub mod schema;
pub mod screen;
pub mod selection;
pub mod store;

pub use asset::{record_asset_refs, AssetCoordinator, ReleaseReport};
pub use dashboard::{Comparison, DashboardAggregator, DashboardSnapshot, DashboardView, MetricCard};
pub use error::{ConsoleError, FormError, MutationKind, ValidationError};
pub use form::{FormMode, FormSession, Payload, SessionState, SlotKey};
pub use notify::{
    ConfirmGate, Notice, NoticeLevel, Notifier, RecordingNotifier, StaticConfirm, TracingNotifier,
};
pub use schema::{FormSchema, GroupInstance, VALUE_FIELD};
pub use screen::{EntityScreen, ReferenceOption};
pub use selection::SelectionSet;
pub use store::{EntityStore, MutationReceipt};
