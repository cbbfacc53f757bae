//! # Dashboard Aggregator
//!
//! Loads the combined count summary and derives the dashboard's display
//! values. The summary is fetched in one call and fails as a unit.
//!
//! On failure the last good snapshot is kept and reported as stale; the
//! caller never sees an error, only [`DashboardView::Stale`] or
//! [`DashboardView::Empty`].

use std::sync::Arc;

use chrono::{DateTime, Utc};
use mec_core::{AdminBackend, DashboardSummary};
use serde::Serialize;

use crate::error::ConsoleError;

/// One dashboard count card.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct MetricCard {
    /// Card title.
    pub label: &'static str,
    /// Current count.
    pub value: u64,
}

/// One charted metric with its "last month" value.
///
/// `last_month` is a placeholder: `value` minus a fixed per-metric offset,
/// floored at zero. There is no historical data behind it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Comparison {
    /// Metric name.
    pub label: &'static str,
    /// Current count.
    pub current: u64,
    /// Placeholder previous-period count.
    pub last_month: u64,
}

// Placeholder offsets for the month-over-month chart. Not business data;
// replace with a historical snapshot query when one exists.
const SUBSCRIBERS_OFFSET: u64 = 5;
const CLIENTS_OFFSET: u64 = 2;
const PROJECTS_OFFSET: u64 = 1;
const REVIEWS_OFFSET: u64 = 3;

/// A successfully loaded summary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DashboardSnapshot {
    /// The counts.
    pub summary: DashboardSummary,
    /// When the summary was loaded.
    pub fetched_at: DateTime<Utc>,
}

impl DashboardSnapshot {
    /// Snapshot of `summary` taken now.
    pub fn new(summary: DashboardSummary) -> Self {
        Self {
            summary,
            fetched_at: Utc::now(),
        }
    }

    /// The nine count cards, in display order.
    pub fn cards(&self) -> [MetricCard; 9] {
        let s = &self.summary;
        let card = |label: &'static str, value: u64| MetricCard { label, value };
        [
            card("Blogs", s.blogs),
            card("Banners", s.banners),
            card("Clients", s.clients),
            card("Unopened Enquiries", s.enquiries.unopened),
            card("Reviews", s.reviews.total),
            card("Subscribers", s.subscribers),
            card("Admins", s.admins.total),
            card("Projects", s.projects),
            card("Works", s.works),
        ]
    }

    /// The four charted metrics with placeholder previous values.
    pub fn comparison(&self) -> [Comparison; 4] {
        let s = &self.summary;
        let compare = |label: &'static str, current: u64, offset: u64| Comparison {
            label,
            current,
            last_month: current.saturating_sub(offset),
        };
        [
            compare("Subscribers", s.subscribers, SUBSCRIBERS_OFFSET),
            compare("Clients", s.clients, CLIENTS_OFFSET),
            compare("Projects", s.projects, PROJECTS_OFFSET),
            compare("Reviews", s.reviews.total, REVIEWS_OFFSET),
        ]
    }
}

/// What the dashboard can show after a refresh.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DashboardView<'a> {
    /// Nothing has ever loaded.
    Empty,
    /// The refresh succeeded.
    Fresh(&'a DashboardSnapshot),
    /// The refresh failed; this is the last good snapshot.
    Stale(&'a DashboardSnapshot),
}

impl<'a> DashboardView<'a> {
    /// The snapshot to render, if any.
    pub fn snapshot(&self) -> Option<&'a DashboardSnapshot> {
        match self {
            Self::Empty => None,
            Self::Fresh(s) | Self::Stale(s) => Some(s),
        }
    }

    /// Whether the data shown is out of date.
    pub fn is_stale(&self) -> bool {
        matches!(self, Self::Stale(_))
    }
}

/// Keeps the last good dashboard snapshot.
pub struct DashboardAggregator {
    backend: Arc<dyn AdminBackend>,
    last: Option<DashboardSnapshot>,
    last_error: Option<ConsoleError>,
}

impl std::fmt::Debug for DashboardAggregator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DashboardAggregator")
            .field("backend", &self.backend.backend_name())
            .field("last", &self.last)
            .field("last_error", &self.last_error)
            .finish()
    }
}

impl DashboardAggregator {
    /// An aggregator with no snapshot.
    pub fn new(backend: Arc<dyn AdminBackend>) -> Self {
        Self {
            backend,
            last: None,
            last_error: None,
        }
    }

    /// Load a fresh summary. Never fails: on error the previous snapshot is
    /// kept and returned as stale.
    pub async fn snapshot(&mut self) -> DashboardView<'_> {
        match self.backend.fetch_dashboard_summary().await {
            Ok(summary) => {
                self.last_error = None;
                let snapshot = self.last.insert(DashboardSnapshot::new(summary));
                tracing::debug!(fetched_at = %snapshot.fetched_at, "dashboard refreshed");
                DashboardView::Fresh(snapshot)
            }
            Err(source) => {
                tracing::warn!(
                    error = %source,
                    has_snapshot = self.last.is_some(),
                    "dashboard refresh failed"
                );
                self.last_error = Some(ConsoleError::Dashboard { source });
                match &self.last {
                    Some(snapshot) => DashboardView::Stale(snapshot),
                    None => DashboardView::Empty,
                }
            }
        }
    }

    /// The last good snapshot, if any.
    pub fn last(&self) -> Option<&DashboardSnapshot> {
        self.last.as_ref()
    }

    /// Failure of the most recent refresh, cleared by a successful one.
    pub fn last_error(&self) -> Option<&ConsoleError> {
        self.last_error.as_ref()
    }
}
