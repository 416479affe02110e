//! The moderator-facing review flow.
//!
//! ```text
//! Start → ChooseBackend → ChooseLane ─┬→ CannotReview
//!                                     ├→ Categorize → category question
//!                                     └→ category question
//! category question → … → Complete(tier)
//! ```
//!
//! The category questions form a decision tree whose leaves are enforcement
//! [`Tier`]s; [`next_state`] is that tree as a pure function. `cancel` from
//! any non-terminal state ends in `Cancelled` and leaves the queue as it was.

mod model;
mod session;

pub use model::{ReviewState, Tier, next_state};
pub use session::ReviewSession;
