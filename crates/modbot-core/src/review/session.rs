//! The moderator review dialogue.

use std::fmt::Write;

use tracing::{debug, info};

use super::model::{ReviewState, Tier, next_state};
use crate::ids::{ReporterId, UserId};
use crate::keywords::{self, INVALID_ACTION};
use crate::queue::{ReportQueue, ReviewLane};
use crate::report::Report;
use crate::scoring::Backend;
use crate::taxonomy::{Category, category_menu, numbered_menu, select};
use crate::trust::TrustTracker;

const GREETING: &str = "Thank you for starting the review process.";

const BACKEND_PROMPT: &str =
    "Which classifier scores should be shown? Please respond with the corresponding number.";

const LANE_PROMPT: &str =
    "Which reports would you like to review? Please respond with the corresponding number.";

const CATEGORIZE_PROMPT: &str = "This report was filed automatically. \
    Under which category should this message fall? Please respond with the corresponding number.";

const NOTHING_TO_REVIEW: &str = "No available unreviewed reports or reports in progress.";

const CANCELLED: &str = "Review cancelled.";

/// One moderator's review of one queued report.
///
/// Created on the `review` keyword in the moderator channel. Pulling a report
/// claims it in the [`ReportQueue`]; cancelling releases the claim. Removing
/// the judged report once a tier is decided is left to the caller.
#[derive(Debug, Clone)]
pub struct ReviewSession {
    moderator: UserId,
    state: ReviewState,
    backend: Option<Backend>,
    selected: Option<Report>,
}

impl ReviewSession {
    /// Opens a session for `moderator`.
    #[must_use]
    pub const fn new(moderator: UserId) -> Self {
        Self {
            moderator,
            state: ReviewState::Start,
            backend: None,
            selected: None,
        }
    }

    /// The reviewing moderator.
    #[must_use]
    pub const fn moderator(&self) -> UserId {
        self.moderator
    }

    /// Current state.
    #[must_use]
    pub const fn state(&self) -> ReviewState {
        self.state
    }

    /// Backend whose scores are shown, once chosen.
    #[must_use]
    pub const fn backend(&self) -> Option<Backend> {
        self.backend
    }

    /// Returns `true` once a tier has been decided.
    #[must_use]
    pub const fn is_complete(&self) -> bool {
        matches!(self.state, ReviewState::Complete(_))
    }

    /// Returns `true` if the moderator cancelled.
    #[must_use]
    pub const fn is_cancelled(&self) -> bool {
        matches!(self.state, ReviewState::Cancelled)
    }

    /// Returns `true` if the chosen lane was empty.
    #[must_use]
    pub const fn cannot_review(&self) -> bool {
        matches!(self.state, ReviewState::CannotReview)
    }

    /// Returns `true` once the dialogue is over for any reason.
    #[must_use]
    pub const fn is_finished(&self) -> bool {
        self.state.is_terminal()
    }

    /// The decided tier.
    #[must_use]
    pub const fn selected_tier(&self) -> Option<Tier> {
        match self.state {
            ReviewState::Complete(tier) => Some(tier),
            _ => None,
        }
    }

    /// Returns `true` if the review ended in tier 0.
    #[must_use]
    pub const fn no_action(&self) -> bool {
        matches!(self.state, ReviewState::Complete(Tier::NoAction))
    }

    /// Who filed the report under review.
    #[must_use]
    pub fn reporter(&self) -> Option<ReporterId> {
        self.selected.as_ref().map(|report| report.reporter)
    }

    /// The report under review, once pulled.
    #[must_use]
    pub const fn selected_report(&self) -> Option<&Report> {
        self.selected.as_ref()
    }

    /// Feeds one message from the moderator into the dialogue.
    ///
    /// Pulling a report claims it in `queue`; cancelling releases the claim.
    /// `trust` is only read, to show the reporter's record.
    pub fn handle_message(
        &mut self,
        input: &str,
        queue: &mut ReportQueue,
        trust: &TrustTracker,
    ) -> Vec<String> {
        if self.is_finished() {
            return Vec::new();
        }

        if keywords::matches(input, keywords::CANCEL) {
            if let Some(report) = &self.selected {
                queue.release(report.id);
            }
            debug!(moderator = %self.moderator, from = ?self.state, "review cancelled");
            self.state = ReviewState::Cancelled;
            return vec![CANCELLED.to_string()];
        }

        let before = self.state;
        let lines = match self.state {
            ReviewState::Start => {
                self.state = ReviewState::ChooseBackend;
                vec![GREETING.to_string(), backend_menu()]
            }
            ReviewState::ChooseBackend => self.choose_backend(input),
            ReviewState::ChooseLane => self.choose_lane(input, queue, trust),
            ReviewState::Categorize => self.categorize(input),
            ReviewState::Complete(_) | ReviewState::Cancelled | ReviewState::CannotReview => {
                Vec::new()
            }
            question => self.answer(question, input),
        };

        if before != self.state {
            debug!(moderator = %self.moderator, from = ?before, to = ?self.state, "review transition");
        }
        lines
    }

    fn choose_backend(&mut self, input: &str) -> Vec<String> {
        let Some(backend) = select(&Backend::ALL, input) else {
            return vec![INVALID_ACTION.to_string(), backend_menu()];
        };
        self.backend = Some(backend);
        self.state = ReviewState::ChooseLane;
        vec![lane_menu()]
    }

    fn choose_lane(
        &mut self,
        input: &str,
        queue: &mut ReportQueue,
        trust: &TrustTracker,
    ) -> Vec<String> {
        let Some(lane) = select(&ReviewLane::ALL, input) else {
            return vec![INVALID_ACTION.to_string(), lane_menu()];
        };
        let Some(report) = queue.pull(lane, self.moderator) else {
            debug!(moderator = %self.moderator, lane = lane.label(), "nothing to review");
            self.state = ReviewState::CannotReview;
            return vec![NOTHING_TO_REVIEW.to_string()];
        };

        info!(moderator = %self.moderator, report = %report.id, reporter = %report.reporter, "review started");
        let mut lines = self.present(&report, trust);
        self.state = report
            .flags
            .iter()
            .next()
            .map_or(ReviewState::Categorize, ReviewState::for_category);
        lines.push(self.current_prompt());
        self.selected = Some(report);
        lines
    }

    fn categorize(&mut self, input: &str) -> Vec<String> {
        let Some(category) = Category::from_selector(input) else {
            return vec![INVALID_ACTION.to_string(), category_menu(CATEGORIZE_PROMPT)];
        };
        self.state = ReviewState::for_category(category);
        vec![self.current_prompt()]
    }

    fn answer(&mut self, question: ReviewState, input: &str) -> Vec<String> {
        let Some(next) = next_state(question, input) else {
            return vec![INVALID_ACTION.to_string(), self.current_prompt()];
        };
        self.state = next;
        if let ReviewState::Complete(tier) = next {
            if let Some(report) = &self.selected {
                info!(moderator = %self.moderator, report = %report.id, ?tier, "review decided");
            }
            return vec![tier.outcome_text().to_string()];
        }
        vec![self.current_prompt()]
    }

    fn current_prompt(&self) -> String {
        match self.state {
            ReviewState::Categorize => category_menu(CATEGORIZE_PROMPT),
            state => state.prompt().unwrap_or_default(),
        }
    }

    fn present(&self, report: &Report, trust: &TrustTracker) -> Vec<String> {
        let content = report
            .message
            .as_ref()
            .map_or_else(|| "(message unavailable)".to_string(), |m| m.quoted());

        let mut details = format!(
            "Report {} filed by {} at {}.",
            report.id,
            report.reporter_name,
            report.filed_at.format("%Y-%m-%d %H:%M UTC")
        );
        if let Some(reason) = &report.reason {
            let _ = write!(details, "\nReason: {}", reason.describe());
        }
        if !report.is_automatic() {
            let block = if report.block_author { "yes" } else { "no" };
            let _ = write!(details, "\nReporter blocked the author: {block}");
        }

        let score = self.backend.map(|backend| match report.scores.get(&backend) {
            Some(p) => format!("{backend} abuse probability: {p:.2}"),
            None => format!("{backend} abuse probability: no score available"),
        });

        let mut lines = vec![
            "Below is the reported content:".to_string(),
            content,
            details,
            trust.summary(report.reporter),
        ];
        lines.extend(score);
        lines
    }
}

fn backend_menu() -> String {
    numbered_menu(BACKEND_PROMPT, Backend::ALL.map(Backend::label))
}

fn lane_menu() -> String {
    numbered_menu(LANE_PROMPT, ReviewLane::ALL.map(ReviewLane::label))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::collections::BTreeMap;

    use super::*;
    use crate::ids::{Actor, ChannelId, GuildId, MessageId, ReportId};
    use crate::message::{MessageLink, ResolvedMessage};
    use crate::taxonomy::{CategoryFlags, ReportReason, VerbalAbuseKind};

    const MOD: UserId = UserId(500);

    fn message(id: u64) -> ResolvedMessage {
        ResolvedMessage {
            link: MessageLink::new(GuildId(1), ChannelId(2), MessageId(id)),
            author: Actor::new(UserId(66), "mallory"),
            content: "you people are vermin".to_string(),
        }
    }

    fn queued(id: u64, category: Category) -> Report {
        let mut report = Report::new(ReportId(id), ReporterId::User(UserId(7)), "alice");
        report.message = Some(message(id));
        report.flags = CategoryFlags::only(category);
        report.reason = Some(ReportReason::VerbalAbuse(VerbalAbuseKind::Dehumanization));
        report
    }

    fn drive(
        session: &mut ReviewSession,
        queue: &mut ReportQueue,
        trust: &TrustTracker,
        inputs: &[&str],
    ) -> Vec<String> {
        inputs
            .iter()
            .flat_map(|input| session.handle_message(input, queue, trust))
            .collect()
    }

    #[test]
    fn test_start_offers_backends() {
        let mut queue = ReportQueue::new();
        let trust = TrustTracker::new();
        let mut session = ReviewSession::new(MOD);

        let lines = session.handle_message("review", &mut queue, &trust);
        assert_eq!(lines[0], GREETING);
        assert!(lines[1].contains("(1) Google Perspective"));
        assert!(lines[1].contains("(2) OpenAI Moderation"));
        assert_eq!(session.state(), ReviewState::ChooseBackend);
    }

    #[test]
    fn test_empty_lane_cannot_review() {
        let mut queue = ReportQueue::new();
        queue.enqueue(queued(1, Category::Fraud));
        let trust = TrustTracker::new();
        let mut session = ReviewSession::new(MOD);

        let lines = drive(&mut session, &mut queue, &trust, &["review", "1", "3"]);
        assert_eq!(lines.last().unwrap(), NOTHING_TO_REVIEW);
        assert!(session.cannot_review());
        assert!(!session.is_complete());
        assert_eq!(queue.len(), 1);
        assert_eq!(queue.claimed_by(ReportId(1)), None);
        assert!(session.handle_message("1", &mut queue, &trust).is_empty());
    }

    #[test]
    fn test_pull_presents_report_and_claims_it() {
        let mut queue = ReportQueue::new();
        let mut report = queued(1, Category::VerbalAbuse);
        report.scores = BTreeMap::from([(Backend::OpenAi, 0.81)]);
        queue.enqueue(report);
        let trust = TrustTracker::new();
        let mut session = ReviewSession::new(MOD);

        let lines = drive(&mut session, &mut queue, &trust, &["review", "2", "2"]);
        assert!(lines.contains(&"Below is the reported content:".to_string()));
        assert!(lines.contains(&"```mallory: you people are vermin```".to_string()));
        assert!(lines.iter().any(|l| l.contains("no confirmed reports yet")));
        assert!(lines.contains(&"OpenAI Moderation abuse probability: 0.81".to_string()));
        assert!(lines.last().unwrap().starts_with("What is the type of verbal abuse?"));
        assert_eq!(session.state(), ReviewState::VerbalAbuse);
        assert_eq!(queue.claimed_by(ReportId(1)), Some(MOD));
        assert_eq!(session.reporter(), Some(ReporterId::User(UserId(7))));
    }

    #[test]
    fn test_incitement_review_decides_ban() {
        let mut queue = ReportQueue::new();
        queue.enqueue(queued(1, Category::VerbalAbuse));
        let trust = TrustTracker::new();
        let mut session = ReviewSession::new(MOD);

        let lines = drive(&mut session, &mut queue, &trust, &["review", "1", "2", "4", "no"]);
        assert_eq!(lines.last().unwrap(), Tier::Ban.outcome_text());
        assert!(session.is_complete());
        assert_eq!(session.selected_tier(), Some(Tier::Ban));
        assert!(!session.no_action());
        // Removal is the caller's job.
        assert_eq!(queue.len(), 1);
    }

    #[test]
    fn test_invalid_answer_reprompts() {
        let mut queue = ReportQueue::new();
        queue.enqueue(queued(1, Category::Other));
        let trust = TrustTracker::new();
        let mut session = ReviewSession::new(MOD);

        drive(&mut session, &mut queue, &trust, &["review", "1", "5"]);
        assert_eq!(session.state(), ReviewState::Other);

        let lines = session.handle_message("perhaps", &mut queue, &trust);
        assert_eq!(lines[0], INVALID_ACTION);
        assert!(lines[1].contains("other violative category"));
        assert_eq!(session.state(), ReviewState::Other);

        let lines = drive(&mut session, &mut queue, &trust, &["no", "no"]);
        assert_eq!(lines.last().unwrap(), Tier::NoAction.outcome_text());
        assert!(session.no_action());
    }

    #[test]
    fn test_cancel_releases_claim() {
        let mut queue = ReportQueue::new();
        queue.enqueue(queued(1, Category::Fraud));
        let trust = TrustTracker::new();
        let mut session = ReviewSession::new(MOD);

        drive(&mut session, &mut queue, &trust, &["review", "1", "1"]);
        assert_eq!(queue.claimed_by(ReportId(1)), Some(MOD));

        let lines = session.handle_message("cancel", &mut queue, &trust);
        assert_eq!(lines, vec![CANCELLED.to_string()]);
        assert!(session.is_cancelled());
        assert_eq!(queue.claimed_by(ReportId(1)), None);
        assert_eq!(queue.len(), 1);
    }

    #[test]
    fn test_automatic_report_is_categorized_first() {
        let mut queue = ReportQueue::new();
        let scores = BTreeMap::from([(Backend::Perspective, 0.93)]);
        queue.enqueue(Report::automatic(ReportId(4), message(4), scores));
        let trust = TrustTracker::new();
        let mut session = ReviewSession::new(MOD);

        let lines = drive(&mut session, &mut queue, &trust, &["review", "1", "6"]);
        assert!(lines.contains(&"Google Perspective abuse probability: 0.93".to_string()));
        assert_eq!(session.state(), ReviewState::Categorize);

        let lines = session.handle_message("9", &mut queue, &trust);
        assert_eq!(lines[0], INVALID_ACTION);

        let lines = drive(&mut session, &mut queue, &trust, &["4", "1"]);
        assert_eq!(lines.last().unwrap(), Tier::BanCsam.outcome_text());
        assert_eq!(session.reporter(), Some(ReporterId::Automatic));
    }
}
