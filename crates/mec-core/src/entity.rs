//! # Entity Kinds
//!
//! The record kinds managed by the console. One definition, exhaustive
//! `match` everywhere.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::IdentityError;

/// A managed record kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntityKind {
    /// Home-page banner with an image and display position.
    Banner,
    /// Client with companies, emails and phone numbers.
    Client,
    /// Portfolio project linked to a client and a work category.
    Project,
    /// Work category made of heading/details/image blocks.
    Work,
    /// Customer review, verified by an administrator.
    Review,
    /// Newsletter subscriber.
    Subscriber,
    /// Contact-form enquiry.
    Enquiry,
}

impl EntityKind {
    /// Every kind, in navigation order.
    pub const ALL: [EntityKind; 7] = [
        Self::Banner,
        Self::Client,
        Self::Project,
        Self::Work,
        Self::Review,
        Self::Subscriber,
        Self::Enquiry,
    ];

    /// Collection path segment used by the admin API.
    pub fn collection(&self) -> &'static str {
        match self {
            Self::Banner => "banners",
            Self::Client => "clients",
            Self::Project => "projects",
            Self::Work => "works",
            Self::Review => "reviews",
            Self::Subscriber => "subscribers",
            Self::Enquiry => "enquiries",
        }
    }

    /// Capitalised singular noun for user-facing messages.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Banner => "Banner",
            Self::Client => "Client",
            Self::Project => "Project",
            Self::Work => "Work",
            Self::Review => "Review",
            Self::Subscriber => "Subscriber",
            Self::Enquiry => "Enquiry",
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.collection())
    }
}

impl std::str::FromStr for EntityKind {
    type Err = IdentityError;

    /// Accepts the singular or plural lowercase name (`client`, `clients`).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.trim().to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|k| k.collection() == lower || k.label().eq_ignore_ascii_case(&lower))
            .ok_or_else(|| IdentityError::UnknownEntityKind(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_singular_and_plural() {
        assert_eq!("client".parse::<EntityKind>().unwrap(), EntityKind::Client);
        assert_eq!("clients".parse::<EntityKind>().unwrap(), EntityKind::Client);
        assert_eq!("Enquiries".parse::<EntityKind>().unwrap(), EntityKind::Enquiry);
        assert_eq!("work".parse::<EntityKind>().unwrap(), EntityKind::Work);
        assert!("blog".parse::<EntityKind>().is_err());
    }

    #[test]
    fn display_is_collection_path() {
        for kind in EntityKind::ALL {
            assert_eq!(kind.to_string(), kind.collection());
            assert_eq!(kind.collection().parse::<EntityKind>().unwrap(), kind);
        }
    }

    #[test]
    fn serde_uses_lowercase_singular() {
        assert_eq!(
            serde_json::to_string(&EntityKind::Subscriber).unwrap(),
            r#""subscriber""#
        );
    }
}
