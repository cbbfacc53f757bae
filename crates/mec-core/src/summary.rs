//! # Dashboard Summary
//!
//! The combined count summary returned by the dashboard endpoint. Every
//! field defaults to zero, whether absent or `null`, so that a summary
//! missing a domain still decodes.

use serde::{Deserialize, Deserializer, Serialize};

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Review counts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReviewCounts {
    /// All reviews.
    #[serde(default, deserialize_with = "null_as_default")]
    pub total: u64,
}

/// Enquiry counts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnquiryCounts {
    /// Enquiries not yet opened by an administrator.
    #[serde(default, deserialize_with = "null_as_default")]
    pub unopened: u64,
}

/// Administrator account counts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdminCounts {
    /// All administrator accounts.
    #[serde(default, deserialize_with = "null_as_default")]
    pub total: u64,
    /// Accounts with super-admin rights.
    #[serde(default, deserialize_with = "null_as_default")]
    pub superadmin: u64,
}

/// Point-in-time counts across every entity domain.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DashboardSummary {
    /// Blog posts.
    #[serde(default, deserialize_with = "null_as_default")]
    pub blogs: u64,
    /// Banners.
    #[serde(default, deserialize_with = "null_as_default")]
    pub banners: u64,
    /// Clients.
    #[serde(default, deserialize_with = "null_as_default")]
    pub clients: u64,
    /// Projects.
    #[serde(default, deserialize_with = "null_as_default")]
    pub projects: u64,
    /// Work categories.
    #[serde(default, deserialize_with = "null_as_default")]
    pub works: u64,
    /// Newsletter subscribers.
    #[serde(default, deserialize_with = "null_as_default")]
    pub subscribers: u64,
    /// Review counts.
    #[serde(default, deserialize_with = "null_as_default")]
    pub reviews: ReviewCounts,
    /// Enquiry counts.
    #[serde(default, deserialize_with = "null_as_default")]
    pub enquiries: EnquiryCounts,
    /// Administrator counts.
    #[serde(default, deserialize_with = "null_as_default")]
    pub admins: AdminCounts,
}
