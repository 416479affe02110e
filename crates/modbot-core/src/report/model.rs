//! Report data model.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};

use crate::ids::{ReportId, ReporterId};
use crate::keywords;
use crate::message::ResolvedMessage;
use crate::scoring::Backend;
use crate::taxonomy::{
    Category, CategoryFlags, FraudKind, HarassmentKind, ReportReason, SensitiveKind,
    VerbalAbuseKind, select,
};

/// States of the reporting dialogue, in the order they are visited.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ReportState {
    /// Session created, nothing said yet.
    #[default]
    Start,
    /// Waiting for a link to the offending message.
    AwaitingMessageRef,
    /// The link resolved; the message is echoed back next.
    MessageIdentified,
    /// Waiting for the category selector.
    FirstPrompt,
    /// Waiting for the fraud sub-reason.
    Fraud,
    /// Waiting for the verbal abuse sub-reason.
    VerbalAbuse,
    /// Waiting for the harassment sub-reason.
    Harassment,
    /// Waiting for the sensitive content sub-reason.
    SensitiveContent,
    /// Waiting for a free-text reason.
    Other,
    /// Waiting for yes/no on blocking the author.
    BlockChoice,
    /// Finished or cancelled.
    Complete,
}

impl ReportState {
    /// Returns `true` once the dialogue is over.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Complete)
    }
}

/// An accepted answer to one of the report questions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Answer {
    /// A top-level category, from [`ReportState::FirstPrompt`].
    Category(Category),
    /// A sub-reason or free-text reason.
    Reason(ReportReason),
    /// Whether to block the author, from [`ReportState::BlockChoice`].
    Block(bool),
}

impl Answer {
    /// Reads `input` as an answer to the question asked in `state`.
    ///
    /// Returns `None` if `state` asks no question or `input` is not one of
    /// its accepted answers. The link state is not covered; it needs a
    /// resolver.
    #[must_use]
    pub fn read(state: ReportState, input: &str) -> Option<Self> {
        match state {
            ReportState::FirstPrompt => Category::from_selector(input).map(Self::Category),
            ReportState::Fraud => select(&FraudKind::ALL, input)
                .map(ReportReason::Fraud)
                .map(Self::Reason),
            ReportState::VerbalAbuse => select(&VerbalAbuseKind::USER_MENU, input)
                .map(ReportReason::VerbalAbuse)
                .map(Self::Reason),
            ReportState::Harassment => select(&HarassmentKind::ALL, input)
                .map(ReportReason::Harassment)
                .map(Self::Reason),
            ReportState::SensitiveContent => select(&SensitiveKind::ALL, input)
                .map(ReportReason::SensitiveContent)
                .map(Self::Reason),
            ReportState::Other => {
                let text = input.trim();
                (!text.is_empty()).then(|| Self::Reason(ReportReason::Other(text.to_string())))
            }
            ReportState::BlockChoice => keywords::yes_no(input).map(Self::Block),
            ReportState::Start
            | ReportState::AwaitingMessageRef
            | ReportState::MessageIdentified
            | ReportState::Complete => None,
        }
    }

    /// The state this answer leads to.
    #[must_use]
    pub const fn next_state(&self) -> ReportState {
        match self {
            Self::Category(category) => follow_up_state(*category),
            Self::Reason(_) => ReportState::BlockChoice,
            Self::Block(_) => ReportState::Complete,
        }
    }
}

const fn follow_up_state(category: Category) -> ReportState {
    match category {
        Category::Fraud => ReportState::Fraud,
        Category::VerbalAbuse => ReportState::VerbalAbuse,
        Category::Harassment => ReportState::Harassment,
        Category::SensitiveContent => ReportState::SensitiveContent,
        Category::Other => ReportState::Other,
    }
}

/// A report on a single message.
#[derive(Debug, Clone)]
pub struct Report {
    /// Process-unique identifier.
    pub id: ReportId,
    /// Who filed it.
    pub reporter: ReporterId,
    /// Display name of the reporter.
    pub reporter_name: String,
    /// The reported message, once identified.
    pub message: Option<ResolvedMessage>,
    /// Exactly one flag is set for a completed user report; none for an
    /// automatic report.
    pub flags: CategoryFlags,
    /// The sub-reason the reporter chose.
    pub reason: Option<ReportReason>,
    /// Whether the reporter asked to block the author.
    pub block_author: bool,
    /// Whether the reporter cancelled.
    pub cancelled: bool,
    /// When the report was opened.
    pub filed_at: DateTime<Utc>,
    /// Combined abuse probability per scoring backend, when known.
    pub scores: BTreeMap<Backend, f64>,
}

impl Report {
    /// Creates an empty report for a human reporter.
    #[must_use]
    pub fn new(id: ReportId, reporter: ReporterId, reporter_name: impl Into<String>) -> Self {
        Self {
            id,
            reporter,
            reporter_name: reporter_name.into(),
            message: None,
            flags: CategoryFlags::none(),
            reason: None,
            block_author: false,
            cancelled: false,
            filed_at: Utc::now(),
            scores: BTreeMap::new(),
        }
    }

    /// Creates a report filed by the automatic flagging pipeline.
    #[must_use]
    pub fn automatic(
        id: ReportId,
        message: ResolvedMessage,
        scores: BTreeMap<Backend, f64>,
    ) -> Self {
        Self {
            message: Some(message),
            scores,
            ..Self::new(id, ReporterId::Automatic, "automatic flagging")
        }
    }

    /// Returns `true` if filed by the automatic pipeline.
    #[must_use]
    pub const fn is_automatic(&self) -> bool {
        self.reporter.is_automatic()
    }

    /// The highest score across backends, if any backend scored the message.
    #[must_use]
    pub fn max_score(&self) -> Option<(Backend, f64)> {
        self.scores
            .iter()
            .map(|(backend, score)| (*backend, *score))
            .max_by(|a, b| a.1.total_cmp(&b.1))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ids::{Actor, ChannelId, GuildId, MessageId, UserId};
    use crate::message::MessageLink;

    #[test]
    fn test_automatic_report() {
        let message = ResolvedMessage {
            link: MessageLink::new(GuildId(1), ChannelId(2), MessageId(3)),
            author: Actor::new(UserId(9), "mallory"),
            content: "spam".to_string(),
        };
        let scores = BTreeMap::from([(Backend::Perspective, 0.7), (Backend::OpenAi, 0.9)]);
        let report = Report::automatic(ReportId(1), message, scores);

        assert!(report.is_automatic());
        assert_eq!(report.flags.count(), 0);
        assert_eq!(report.max_score(), Some((Backend::OpenAi, 0.9)));
    }

    #[test]
    fn test_answers_drive_transitions() {
        let walk = |inputs: &[(ReportState, &str)]| {
            inputs
                .iter()
                .map(|(state, input)| Answer::read(*state, input).map(|a| a.next_state()))
                .collect::<Vec<_>>()
        };
        assert_eq!(
            walk(&[
                (ReportState::FirstPrompt, "3"),
                (ReportState::Harassment, "2"),
                (ReportState::BlockChoice, "yes"),
            ]),
            vec![
                Some(ReportState::Harassment),
                Some(ReportState::BlockChoice),
                Some(ReportState::Complete),
            ]
        );
        assert_eq!(
            Answer::read(ReportState::Harassment, "2"),
            Some(Answer::Reason(ReportReason::Harassment(
                HarassmentKind::PrivateInformation
            )))
        );
    }

    #[test]
    fn test_questionless_states_take_no_answer() {
        for state in [
            ReportState::Start,
            ReportState::AwaitingMessageRef,
            ReportState::MessageIdentified,
            ReportState::Complete,
        ] {
            assert_eq!(Answer::read(state, "1"), None);
        }
        assert_eq!(Answer::read(ReportState::Other, "  "), None);
        assert_eq!(Answer::read(ReportState::Fraud, "01"), None);
    }

    #[test]
    fn test_only_complete_is_terminal() {
        assert!(ReportState::Complete.is_terminal());
        assert!(!ReportState::BlockChoice.is_terminal());
    }
}
