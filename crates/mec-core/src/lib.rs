#![deny(missing_docs)]

//! # mec-core -- Foundational Types for the MEC Admin Console
//!
//! This crate defines the types that every other crate in the workspace
//! depends on. It has no internal crate dependencies.
//!
//! ## Design Principles
//!
//! 1. **Newtype wrappers for backend identifiers.** A [`RecordId`] is not an
//!    [`AssetUrl`]; neither can be constructed empty.
//!
//! 2. **Records are opaque.** A [`Record`] is an identifier plus a JSON field
//!    map. Only the console's form schemas interpret individual fields.
//!
//! 3. **One collaborator seam.** Everything the console needs from the remote
//!    admin API goes through the [`AdminBackend`] trait. The HTTP
//!    implementation lives in `mec-api-client`; [`MockAdminBackend`] serves
//!    tests and local development.
//!
//! 4. **Structured errors.** [`BackendError`] and [`IdentityError`] are
//!    `thiserror` enums; nothing outside tests calls `.unwrap()`.

pub mod backend;
pub mod entity;
pub mod error;
pub mod identity;
pub mod mock;
pub mod record;
pub mod summary;

// Re-export primary types at crate root for ergonomic imports.
pub use backend::{AdminBackend, AssetUpload};
pub use entity::EntityKind;
pub use error::{BackendError, IdentityError};
pub use identity::{AssetUrl, RecordId};
pub use mock::{MockAdminBackend, MockOp};
pub use record::{Ack, FieldMap, Record};
pub use summary::{AdminCounts, DashboardSummary, EnquiryCounts, ReviewCounts};
