//! Error types for the core library.

use thiserror::Error;

use crate::ids::{ReportId, ReporterId, UserId};

/// Errors that can occur in core operations.
///
/// None of these are fatal; they describe bookkeeping requests the current
/// state cannot satisfy.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    /// The report is not (or no longer) in the queue.
    #[error("Report {0} is not queued")]
    ReportNotQueued(ReportId),

    /// Another moderator is already reviewing the report.
    #[error("Report {report} is already claimed by moderator {moderator}")]
    AlreadyClaimed {
        /// The contested report.
        report: ReportId,
        /// The moderator holding the claim.
        moderator: UserId,
    },

    /// The reporter has no confirmed reports, so no trust score exists.
    #[error("Trust score for {0} is undefined: no confirmed reports")]
    TrustUndefined(ReporterId),
}

/// Result type alias using our Error type.
pub type Result<T> = std::result::Result<T, Error>;
