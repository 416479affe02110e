//! Pending reports awaiting review.
//!
//! Reports are grouped by reporter, oldest first. Human reports are pulled by
//! category; automatic reports live under [`ReporterId::Automatic`] and are
//! only reachable through [`ReviewLane::Automatic`].
//!
//! A moderator who pulls a report claims it, so that two moderators never
//! judge the same report at once. The claim is released if the review is
//! cancelled, and the report is removed when the review completes.

use std::collections::{BTreeMap, VecDeque};

use tracing::debug;

use crate::error::{Error, Result};
use crate::ids::{ReportId, ReporterId, UserId};
use crate::report::Report;
use crate::taxonomy::Category;

/// Where a moderator pulls the next report from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ReviewLane {
    /// Human reports flagged with this category.
    Category(Category),
    /// Reports filed by the automatic flagging pipeline.
    Automatic,
}

impl ReviewLane {
    /// All lanes in menu order: the five categories, then automatic.
    pub const ALL: [Self; 6] = [
        Self::Category(Category::Fraud),
        Self::Category(Category::VerbalAbuse),
        Self::Category(Category::Harassment),
        Self::Category(Category::SensitiveContent),
        Self::Category(Category::Other),
        Self::Automatic,
    ];

    /// Menu label.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Category(category) => category.label(),
            Self::Automatic => "Automatic reports",
        }
    }
}

#[derive(Debug, Clone)]
struct Entry {
    report: Report,
    claimed_by: Option<UserId>,
}

/// Pending reports keyed by reporter.
///
/// A reporter key exists only while it has at least one pending report.
#[derive(Debug, Default)]
pub struct ReportQueue {
    lanes: BTreeMap<ReporterId, VecDeque<Entry>>,
}

impl ReportQueue {
    /// Creates an empty queue.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a report to its reporter's sequence.
    pub fn enqueue(&mut self, report: Report) {
        debug!(report = %report.id, reporter = %report.reporter, "report queued");
        self.lanes.entry(report.reporter).or_default().push_back(Entry {
            report,
            claimed_by: None,
        });
    }

    /// Finds the first unclaimed human report flagged with the category at
    /// `index`, scanning reporters in order and each reporter oldest first.
    #[must_use]
    pub fn peek_by_category(&self, index: usize) -> Option<(ReporterId, &Report)> {
        self.lanes
            .iter()
            .filter(|(reporter, _)| !reporter.is_automatic())
            .flat_map(|(reporter, entries)| entries.iter().map(move |e| (*reporter, e)))
            .find(|(_, entry)| entry.claimed_by.is_none() && entry.report.flags.is_set(index))
            .map(|(reporter, entry)| (reporter, &entry.report))
    }

    /// The oldest unclaimed automatic report.
    #[must_use]
    pub fn peek_automatic(&self) -> Option<&Report> {
        self.lanes
            .get(&ReporterId::Automatic)?
            .iter()
            .find(|entry| entry.claimed_by.is_none())
            .map(|entry| &entry.report)
    }

    /// The next unclaimed report in `lane`.
    #[must_use]
    pub fn peek(&self, lane: ReviewLane) -> Option<&Report> {
        match lane {
            ReviewLane::Category(category) => self
                .peek_by_category(category.index())
                .map(|(_, report)| report),
            ReviewLane::Automatic => self.peek_automatic(),
        }
    }

    /// Claims the next report in `lane` for `moderator` and returns a copy.
    pub fn pull(&mut self, lane: ReviewLane, moderator: UserId) -> Option<Report> {
        let id = self.peek(lane)?.id;
        self.claim(id, moderator).ok()
    }

    /// Claims a specific report for `moderator` and returns a copy.
    ///
    /// Claiming a report the moderator already holds succeeds again.
    ///
    /// # Errors
    ///
    /// Returns an error if the report is not queued or another moderator
    /// already holds it.
    pub fn claim(&mut self, id: ReportId, moderator: UserId) -> Result<Report> {
        let entry = self.entry_mut(id).ok_or(Error::ReportNotQueued(id))?;
        match entry.claimed_by {
            Some(holder) if holder != moderator => Err(Error::AlreadyClaimed {
                report: id,
                moderator: holder,
            }),
            _ => {
                entry.claimed_by = Some(moderator);
                debug!(report = %id, %moderator, "report claimed");
                Ok(entry.report.clone())
            }
        }
    }

    /// Releases a claim. Returns `true` if the report was claimed.
    pub fn release(&mut self, id: ReportId) -> bool {
        self.entry_mut(id)
            .and_then(|entry| entry.claimed_by.take())
            .is_some()
    }

    /// Removes the oldest report of `reporter`.
    ///
    /// The reporter's key is dropped when its sequence empties.
    pub fn dequeue(&mut self, reporter: ReporterId) -> Option<Report> {
        let entries = self.lanes.get_mut(&reporter)?;
        let entry = entries.pop_front();
        if entries.is_empty() {
            self.lanes.remove(&reporter);
        }
        entry.map(|entry| entry.report)
    }

    /// Removes one specific report of `reporter`.
    ///
    /// The reporter's key is dropped when its sequence empties.
    ///
    /// # Errors
    ///
    /// Returns an error if the report is not queued under `reporter`.
    pub fn remove(&mut self, reporter: ReporterId, id: ReportId) -> Result<Report> {
        let entries = self
            .lanes
            .get_mut(&reporter)
            .ok_or(Error::ReportNotQueued(id))?;
        let position = entries
            .iter()
            .position(|entry| entry.report.id == id)
            .ok_or(Error::ReportNotQueued(id))?;
        let entry = entries.remove(position).ok_or(Error::ReportNotQueued(id))?;
        if entries.is_empty() {
            self.lanes.remove(&reporter);
        }
        debug!(report = %id, %reporter, "report removed from queue");
        Ok(entry.report)
    }

    /// Who, if anyone, is reviewing a queued report.
    #[must_use]
    pub fn claimed_by(&self, id: ReportId) -> Option<UserId> {
        self.entries()
            .find(|e| e.report.id == id)
            .and_then(|e| e.claimed_by)
    }

    /// Number of pending reports from `reporter`.
    #[must_use]
    pub fn pending_for(&self, reporter: ReporterId) -> usize {
        self.lanes.get(&reporter).map_or(0, VecDeque::len)
    }

    /// Returns `true` if `reporter` has a key in the queue.
    #[must_use]
    pub fn contains_reporter(&self, reporter: ReporterId) -> bool {
        self.lanes.contains_key(&reporter)
    }

    /// Total number of pending reports.
    #[must_use]
    pub fn len(&self) -> usize {
        self.lanes.values().map(VecDeque::len).sum()
    }

    /// Returns `true` if nothing is pending.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lanes.is_empty()
    }

    fn entries(&self) -> impl Iterator<Item = &Entry> {
        self.lanes.values().flatten()
    }

    fn entry_mut(&mut self, id: ReportId) -> Option<&mut Entry> {
        self.lanes
            .values_mut()
            .flatten()
            .find(|entry| entry.report.id == id)
    }
}
