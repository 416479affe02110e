//! Reporter trust scores.
//!
//! A reporter's trust is the share of their reviewed reports that led to
//! action. Reports a moderator judged "no action" count against it; cancelled
//! reviews do not count at all.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{Error, Result};
use crate::ids::ReporterId;
use crate::review::Tier;

/// Counters kept per reporter.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrustRecord {
    /// Reports filed and not cancelled.
    pub total_filed: u64,
    /// Reports a moderator finished reviewing.
    pub total_confirmed: u64,
    /// Reviewed reports that led to action.
    pub accurate_count: u64,
}

impl TrustRecord {
    /// `100 × accurate / confirmed`, or `None` before the first review.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn percentage(&self) -> Option<f64> {
        (self.total_confirmed > 0)
            .then(|| 100.0 * self.accurate_count as f64 / self.total_confirmed as f64)
    }
}

/// Trust records for every reporter seen so far.
#[derive(Debug, Default)]
pub struct TrustTracker {
    records: HashMap<ReporterId, TrustRecord>,
}

impl TrustTracker {
    /// Creates an empty tracker.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Counts a report that was filed.
    pub fn record_filed(&mut self, reporter: ReporterId) {
        self.records.entry(reporter).or_default().total_filed += 1;
    }

    /// Counts a finished review of one of `reporter`'s reports.
    pub fn record_review(&mut self, reporter: ReporterId, tier: Tier) {
        let record = self.records.entry(reporter).or_default();
        record.total_confirmed += 1;
        if !tier.is_no_action() {
            record.accurate_count += 1;
        }
        debug!(%reporter, ?tier, confirmed = record.total_confirmed, "trust updated");
    }

    /// The record for `reporter`; all zeros if never seen.
    #[must_use]
    pub fn record(&self, reporter: ReporterId) -> TrustRecord {
        self.records.get(&reporter).copied().unwrap_or_default()
    }

    /// Trust percentage for `reporter`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::TrustUndefined`] if none of the reporter's reports has
    /// been reviewed yet.
    pub fn percentage(&self, reporter: ReporterId) -> Result<f64> {
        self.record(reporter)
            .percentage()
            .ok_or(Error::TrustUndefined(reporter))
    }

    /// One-line summary shown to moderators.
    #[must_use]
    pub fn summary(&self, reporter: ReporterId) -> String {
        let record = self.record(reporter);
        match record.percentage() {
            Some(pct) => format!(
                "Trust score for {reporter}: {pct:.1}% ({} of {} reviewed reports confirmed, {} filed).",
                record.accurate_count, record.total_confirmed, record.total_filed
            ),
            None => format!(
                "Trust score for {reporter}: no confirmed reports yet ({} filed).",
                record.total_filed
            ),
        }
    }
}
