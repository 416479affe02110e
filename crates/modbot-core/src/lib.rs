//! # modbot-core
//!
//! Report and review dialogues for a chat moderation bot.
//!
//! This crate provides:
//! - **Reporting** - the step-by-step dialogue a user follows to report a message
//! - **Review** - the moderator decision tree that ends in an enforcement tier
//! - **Report queue** - pending reports per reporter, with review claims
//! - **Trust scores** - how often a reporter's reports were confirmed
//! - **Automatic reports** - combining classifier scores into a report decision
//! - **Dispatcher** - routing of inbound messages to the open dialogues
//!
//! Everything here is synchronous and transport-agnostic: the host resolves
//! message links through [`MessageResolver`] and delivers the returned lines.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![forbid(unsafe_code)]

pub mod dispatch;
mod error;
pub mod ids;
pub mod keywords;
pub mod message;
pub mod queue;
pub mod report;
pub mod review;
pub mod scoring;
pub mod taxonomy;
pub mod trust;

pub use dispatch::{Dispatch, Dispatcher, ModerationEvent};
pub use error::{Error, Result};
pub use ids::{
    Actor, ChannelId, GuildId, MessageId, ReportId, ReportIdGenerator, ReporterId, UserId,
};
pub use message::{MessageDirectory, MessageLink, MessageResolver, ResolveError, ResolvedMessage};
pub use queue::{ReportQueue, ReviewLane};
pub use report::{Report, ReportSession, ReportState};
pub use review::{ReviewSession, ReviewState, Tier};
pub use scoring::{
    AutoFlagger, Backend, CategoryScores, LogisticModel, MaxScoreModel, ToxicityModel, Verdict,
};
pub use taxonomy::{Category, CategoryFlags, ReportReason};
pub use trust::{TrustRecord, TrustTracker};
