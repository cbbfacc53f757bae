//! # Console Error Hierarchy
//!
//! Every operation of the engine returns one of these. Nothing here is
//! displayed directly: [`ConsoleError::user_message`] produces the text a
//! notification adapter shows, preferring the backend's own message.

use mec_core::{AssetUrl, BackendError, EntityKind};
use thiserror::Error;

/// Which mutation failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MutationKind {
    /// Record creation.
    Create,
    /// Full or partial record update.
    Update,
    /// Single record deletion.
    Delete,
    /// Deletion of every selected record in one call.
    BulkDelete,
}

impl std::fmt::Display for MutationKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Create => write!(f, "create"),
            Self::Update => write!(f, "update"),
            Self::Delete => write!(f, "delete"),
            Self::BulkDelete => write!(f, "bulk delete"),
        }
    }
}

/// A required value is missing from the form buffer. Raised before any
/// network call is made.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// A required scalar field is unset or blank.
    #[error("{field} is required")]
    MissingField {
        /// The scalar field name.
        field: String,
    },

    /// A required asset slot holds no reference.
    #[error("please upload an image for {slot} first")]
    MissingAsset {
        /// The slot name.
        slot: String,
    },

    /// An instance of a group whose entries are all required is blank.
    #[error("{group} entry {} must not be blank", .index + 1)]
    BlankGroupEntry {
        /// The group name.
        group: String,
        /// Zero-based position of the blank instance.
        index: usize,
    },
}

/// The caller broke the form-buffer contract (wrong state, unknown name,
/// index out of range). These never involve the backend.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FormError {
    /// The entity kind has no create/edit form.
    #[error("{} records have no edit form", .kind.label())]
    NoForm {
        /// The entity kind.
        kind: EntityKind,
    },

    /// No session is open.
    #[error("form session is not open")]
    NotOpen,

    /// A session is already open; close or submit it first.
    #[error("form session is already open")]
    AlreadyOpen,

    /// The buffer is frozen while a submit is in flight.
    #[error("form session is submitting")]
    Submitting,

    /// No submit is in flight.
    #[error("form session is not submitting")]
    NotSubmitting,

    /// The schema has no scalar field with this name.
    #[error("unknown field: {field}")]
    UnknownField {
        /// The requested field.
        field: String,
    },

    /// The schema has no group with this name.
    #[error("unknown group: {group}")]
    UnknownGroup {
        /// The requested group.
        group: String,
    },

    /// The schema has no asset slot at this location.
    #[error("unknown asset slot: {slot}")]
    UnknownSlot {
        /// The requested slot, rendered.
        slot: String,
    },

    /// Asset fields are written only through the asset coordinator.
    #[error("{group}.{field} holds an asset reference; use upload/release")]
    AssetField {
        /// The group name.
        group: String,
        /// The field name.
        field: String,
    },

    /// Instance index past the end of the group.
    #[error("{group} has {len} entries, no entry at index {index}")]
    IndexOutOfRange {
        /// The group name.
        group: String,
        /// The requested index.
        index: usize,
        /// Current group size.
        len: usize,
    },

    /// Removing would leave the group below its minimum size.
    #[error("{group} cannot have fewer than {min} entries")]
    BelowMinimum {
        /// The group name.
        group: String,
        /// Minimum instance count.
        min: usize,
    },
}

/// Top-level error type for console operations.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConsoleError {
    /// Loading a list or record failed. The cache is untouched.
    #[error("failed to load {kind}: {source}")]
    Fetch {
        /// The entity kind being loaded.
        kind: EntityKind,
        /// The backend failure.
        source: BackendError,
    },

    /// A create, update or delete failed. Buffer and cache are untouched.
    #[error("{operation} of {kind} failed: {source}")]
    Mutation {
        /// The entity kind.
        kind: EntityKind,
        /// The failed operation.
        operation: MutationKind,
        /// The backend failure.
        source: BackendError,
    },

    /// Uploading a media file failed. The slot keeps its prior reference.
    #[error("asset upload failed: {source}")]
    Upload {
        /// The backend failure.
        source: BackendError,
    },

    /// Releasing an uploaded asset failed.
    #[error("failed to release asset {url}: {source}")]
    AssetRelease {
        /// The reference that could not be released.
        url: AssetUrl,
        /// The backend failure.
        source: BackendError,
    },

    /// The dashboard summary could not be loaded.
    #[error("dashboard summary unavailable: {source}")]
    Dashboard {
        /// The backend failure.
        source: BackendError,
    },

    /// A required field or asset is missing.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// A bulk action was attempted with nothing selected.
    #[error("no {kind} selected")]
    NoSelection {
        /// The entity kind.
        kind: EntityKind,
    },

    /// The form-buffer contract was violated.
    #[error(transparent)]
    Form(#[from] FormError),
}

impl ConsoleError {
    /// Text for a user-facing failure notification: the backend message when
    /// one was supplied, a generic message for the operation otherwise.
    pub fn user_message(&self) -> String {
        match self {
            Self::Fetch { kind, source } => source
                .backend_message()
                .map(str::to_string)
                .unwrap_or_else(|| format!("Failed to fetch {}", kind.collection())),
            Self::Mutation {
                kind,
                operation,
                source,
            } => source
                .backend_message()
                .map(str::to_string)
                .unwrap_or_else(|| match operation {
                    MutationKind::Create | MutationKind::Update => "Operation failed".to_string(),
                    MutationKind::Delete => {
                        format!("Failed to delete {}", kind.label().to_lowercase())
                    }
                    MutationKind::BulkDelete => format!("Failed to delete {}", kind.collection()),
                }),
            Self::Upload { .. } => "Image upload failed!".to_string(),
            Self::AssetRelease { .. } => "Failed to delete image".to_string(),
            Self::Dashboard { .. } => "Failed to load dashboard".to_string(),
            Self::Validation(err) => capitalize(&err.to_string()),
            Self::NoSelection { kind } => format!(
                "Please select at least one {} to delete.",
                kind.label().to_lowercase()
            ),
            Self::Form(err) => capitalize(&err.to_string()),
        }
    }
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn user_message_prefers_backend_message() {
        let err = ConsoleError::Mutation {
            kind: EntityKind::Client,
            operation: MutationKind::Create,
            source: BackendError::rejected("Client already exists"),
        };
        assert_eq!(err.user_message(), "Client already exists");
    }

    #[test]
    fn user_message_falls_back_per_operation() {
        let transport = BackendError::transport("timeout");
        let create = ConsoleError::Mutation {
            kind: EntityKind::Work,
            operation: MutationKind::Update,
            source: transport.clone(),
        };
        assert_eq!(create.user_message(), "Operation failed");

        let delete = ConsoleError::Mutation {
            kind: EntityKind::Review,
            operation: MutationKind::Delete,
            source: transport.clone(),
        };
        assert_eq!(delete.user_message(), "Failed to delete review");

        let fetch = ConsoleError::Fetch {
            kind: EntityKind::Project,
            source: transport,
        };
        assert_eq!(fetch.user_message(), "Failed to fetch projects");
    }

    #[test]
    fn validation_messages_are_capitalised() {
        let err = ConsoleError::from(ValidationError::MissingAsset { slot: "img".into() });
        assert_eq!(err.user_message(), "Please upload an image for img first");

        let err = ConsoleError::from(ValidationError::BlankGroupEntry {
            group: "companies".into(),
            index: 1,
        });
        assert_eq!(err.user_message(), "Companies entry 2 must not be blank");
    }

    #[test]
    fn no_selection_message_names_the_kind() {
        let err = ConsoleError::NoSelection {
            kind: EntityKind::Subscriber,
        };
        assert_eq!(
            err.user_message(),
            "Please select at least one subscriber to delete."
        );
    }

    #[test]
    fn form_errors_render_context() {
        let err = FormError::BelowMinimum {
            group: "companies".into(),
            min: 1,
        };
        assert_eq!(err.to_string(), "companies cannot have fewer than 1 entries");
        let err = FormError::IndexOutOfRange {
            group: "info".into(),
            index: 4,
            len: 2,
        };
        assert_eq!(err.to_string(), "info has 2 entries, no entry at index 4");
        let err = FormError::NoForm {
            kind: EntityKind::Enquiry,
        };
        assert_eq!(err.to_string(), "Enquiry records have no edit form");
    }
}
