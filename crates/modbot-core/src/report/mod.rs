//! The user-facing reporting flow.
//!
//! A reporter walks through:
//!
//! ```text
//! Start → AwaitingMessageRef → MessageIdentified → FirstPrompt
//!       → {Fraud | VerbalAbuse | Harassment | SensitiveContent | Other}
//!       → BlockChoice → Complete
//! ```
//!
//! [`Answer::read`] and [`Answer::next_state`] are the pure transitions for
//! every question state; only the link step needs a resolver.
//!
//! `cancel` from any non-terminal state jumps straight to `Complete` with the
//! report marked cancelled; cancelled reports are never queued.

mod model;
mod session;

pub use model::{Answer, Report, ReportState};
pub use session::ReportSession;
