//! Routing of inbound messages to open dialogues.
//!
//! The [`Dispatcher`] owns every piece of shared moderation state: the open
//! report and review sessions keyed by user, the report queue and the trust
//! records. Hosts feed it direct messages and moderator-channel messages one
//! at a time and deliver the returned lines verbatim.

use std::collections::{BTreeMap, HashMap};

use tracing::{info, warn};

use crate::ids::{Actor, ReportId, ReportIdGenerator, ReporterId, UserId};
use crate::keywords;
use crate::message::{MessageLink, MessageResolver, ResolvedMessage};
use crate::queue::ReportQueue;
use crate::report::{Report, ReportSession};
use crate::review::{ReviewSession, Tier};
use crate::scoring::Backend;
use crate::taxonomy::Category;
use crate::trust::TrustTracker;

const REPORT_HELP: &str = "Use the `report` command to begin the reporting process.\n\
    Use the `cancel` command to cancel the report process.\n";

const REVIEW_HELP: &str = "Use the `review` command to begin the review process.\n\
    Use the `cancel` command to cancel the review process.\n\
    Use `trust <user id>` to see how often a reporter's reports were confirmed.\n";

const TRUST_USAGE: &str = "Usage: `trust <user id>` or `trust automatic`.";

const REVIEW_COMPLETE: &str = "Done. Review complete.";

/// Something the host should act on besides sending replies.
#[derive(Debug, Clone, PartialEq)]
pub enum ModerationEvent {
    /// A report was queued for review.
    ReportFiled {
        /// The new report.
        report: ReportId,
        /// Who filed it.
        reporter: ReporterId,
        /// The category chosen, if any.
        category: Option<Category>,
    },
    /// A reporter asked to block the author of the reported message.
    BlockRequested {
        /// The reporter.
        reporter: UserId,
        /// The author to block.
        author: UserId,
    },
    /// A moderator decided a tier.
    ReviewCompleted {
        /// The judged report.
        report: ReportId,
        /// Who filed it.
        reporter: ReporterId,
        /// The decision.
        tier: Tier,
        /// Who decided.
        moderator: UserId,
        /// The offending message, if known.
        message: Option<MessageLink>,
        /// Its author, if known.
        offender: Option<UserId>,
    },
    /// A moderator abandoned a review.
    ReviewCancelled {
        /// Who cancelled.
        moderator: UserId,
        /// The report that was under review, if one had been pulled.
        report: Option<ReportId>,
    },
}

/// Replies and events produced by one inbound message.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Dispatch {
    /// Lines to send back, in order.
    pub lines: Vec<String>,
    /// Side effects for the host.
    pub events: Vec<ModerationEvent>,
}

impl Dispatch {
    fn reply(lines: Vec<String>) -> Self {
        Self {
            lines,
            events: Vec::new(),
        }
    }

    /// Returns `true` if there is nothing to send or do.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty() && self.events.is_empty()
    }
}

/// Shared moderation state and the message router over it.
#[derive(Debug, Default)]
pub struct Dispatcher {
    reports: HashMap<UserId, ReportSession>,
    reviews: HashMap<UserId, ReviewSession>,
    queue: ReportQueue,
    trust: TrustTracker,
    ids: ReportIdGenerator,
}

impl Dispatcher {
    /// Creates a dispatcher with no open sessions and an empty queue.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Pending reports.
    #[must_use]
    pub const fn queue(&self) -> &ReportQueue {
        &self.queue
    }

    /// Reporter trust records.
    #[must_use]
    pub const fn trust(&self) -> &TrustTracker {
        &self.trust
    }

    /// The open report session of `user`, if any.
    #[must_use]
    pub fn report_session(&self, user: UserId) -> Option<&ReportSession> {
        self.reports.get(&user)
    }

    /// The open review session of `moderator`, if any.
    #[must_use]
    pub fn review_session(&self, moderator: UserId) -> Option<&ReviewSession> {
        self.reviews.get(&moderator)
    }

    /// Handles a direct message to the bot.
    ///
    /// Without an open session only `report` and `help` get a response.
    pub fn handle_direct_message<R>(&mut self, actor: &Actor, text: &str, resolver: &R) -> Dispatch
    where
        R: MessageResolver + ?Sized,
    {
        if keywords::matches(text, keywords::HELP) {
            return Dispatch::reply(vec![REPORT_HELP.to_string()]);
        }

        if !self.reports.contains_key(&actor.id) {
            if !keywords::matches(text, keywords::REPORT) {
                return Dispatch::default();
            }
            let session = ReportSession::new(self.ids.next_id(), actor);
            self.reports.insert(actor.id, session);
        }

        let Some(session) = self.reports.get_mut(&actor.id) else {
            return Dispatch::default();
        };
        let mut dispatch = Dispatch::reply(session.handle_message(text, resolver));

        if session.is_complete() {
            if let Some(session) = self.reports.remove(&actor.id) {
                if !session.is_cancelled() {
                    dispatch.events.extend(self.file(session.into_report()));
                }
            }
        }
        dispatch
    }

    fn file(&mut self, report: Report) -> Vec<ModerationEvent> {
        let mut events = vec![ModerationEvent::ReportFiled {
            report: report.id,
            reporter: report.reporter,
            category: report.flags.iter().next(),
        }];
        if let (true, Some(reporter), Some(message)) =
            (report.block_author, report.reporter.user(), &report.message)
        {
            events.push(ModerationEvent::BlockRequested {
                reporter,
                author: message.author.id,
            });
        }

        info!(
            report = %report.id,
            reporter = %report.reporter,
            reason = ?report.reason,
            "report filed"
        );
        self.trust.record_filed(report.reporter);
        self.queue.enqueue(report);
        events
    }

    /// Files a report on behalf of the automatic flagging pipeline.
    pub fn file_automatic_report(
        &mut self,
        message: ResolvedMessage,
        scores: BTreeMap<Backend, f64>,
    ) -> Dispatch {
        let report = Report::automatic(self.ids.next_id(), message, scores);
        Dispatch {
            lines: Vec::new(),
            events: self.file(report),
        }
    }

    /// Handles a message in the moderator channel.
    ///
    /// Without an open review only `review`, `trust <id>` and `help` get a
    /// response.
    pub fn handle_review_message(&mut self, moderator: &Actor, text: &str) -> Dispatch {
        if keywords::matches(text, keywords::HELP) {
            return Dispatch::reply(vec![REVIEW_HELP.to_string()]);
        }

        if !self.reviews.contains_key(&moderator.id) {
            if let Some(arg) = trust_argument(text) {
                return Dispatch::reply(vec![self.trust_summary(arg)]);
            }
            if !keywords::matches(text, keywords::REVIEW) {
                return Dispatch::default();
            }
            self.reviews
                .insert(moderator.id, ReviewSession::new(moderator.id));
        }

        let Some(session) = self.reviews.get_mut(&moderator.id) else {
            return Dispatch::default();
        };
        let mut dispatch =
            Dispatch::reply(session.handle_message(text, &mut self.queue, &self.trust));

        if !session.is_finished() {
            return dispatch;
        }
        let Some(session) = self.reviews.remove(&moderator.id) else {
            return dispatch;
        };

        if let (Some(tier), Some(report)) = (session.selected_tier(), session.selected_report()) {
            dispatch.events.push(self.close(&session, report, tier));
            dispatch.lines.push(REVIEW_COMPLETE.to_string());
        } else if session.is_cancelled() {
            info!(moderator = %moderator.id, "review cancelled");
            dispatch.events.push(ModerationEvent::ReviewCancelled {
                moderator: moderator.id,
                report: session.selected_report().map(|report| report.id),
            });
        }
        dispatch
    }

    fn close(&mut self, session: &ReviewSession, report: &Report, tier: Tier) -> ModerationEvent {
        if let Err(e) = self.queue.remove(report.reporter, report.id) {
            warn!(report = %report.id, error = %e, "judged report was no longer queued");
        }
        self.trust.record_review(report.reporter, tier);
        info!(
            report = %report.id,
            moderator = %session.moderator(),
            tier = tier.level(),
            "review complete"
        );

        ModerationEvent::ReviewCompleted {
            report: report.id,
            reporter: report.reporter,
            tier,
            moderator: session.moderator(),
            message: report.message.as_ref().map(|m| m.link),
            offender: report.message.as_ref().map(|m| m.author.id),
        }
    }

    fn trust_summary(&self, arg: Option<&str>) -> String {
        let reporter = match arg {
            Some(a) if keywords::matches(a, "automatic") => ReporterId::Automatic,
            Some(a) => match a.trim_start_matches("<@").trim_end_matches('>').parse() {
                Ok(id) => ReporterId::User(UserId(id)),
                Err(_) => return TRUST_USAGE.to_string(),
            },
            None => return TRUST_USAGE.to_string(),
        };
        self.trust.summary(reporter)
    }
}

/// `Some(arg)` if `text` is a `trust` command, with its optional argument.
fn trust_argument(text: &str) -> Option<Option<&str>> {
    let mut words = text.split_whitespace();
    let command = words.next()?;
    if !keywords::matches(command, keywords::TRUST) {
        return None;
    }
    let arg = words.next();
    match words.next() {
        Some(_) => Some(None),
        None => Some(arg),
    }
}
