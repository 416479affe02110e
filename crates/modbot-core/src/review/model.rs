//! Review states, enforcement tiers and the decision tree between them.

use std::fmt::Write;

use serde::{Deserialize, Serialize};

use crate::keywords;
use crate::taxonomy::{
    Category, FraudKind, HarassmentKind, SensitiveKind, VerbalAbuseKind, numbered_menu, select,
};

/// Enforcement outcome of a review, from least to most severe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Tier {
    /// Tier 0: not abusive; the reporter may dispute.
    NoAction,
    /// Tier 1: content removed, warning issued.
    Warning,
    /// Tier 2: content removed, one-day mute.
    DayMute,
    /// Tier 3: content removed, one-week mute.
    WeekMute,
    /// Tier 4: content removed, permanent ban, content retained.
    Ban,
    /// Tier 4 plus a report to NCMEC.
    BanCsam,
}

impl Tier {
    /// All tiers in discretionary-menu order (selectors 0 to 5).
    pub const ALL: [Self; 6] = [
        Self::NoAction,
        Self::Warning,
        Self::DayMute,
        Self::WeekMute,
        Self::Ban,
        Self::BanCsam,
    ];

    /// Numeric severity, 0 to 4.
    #[must_use]
    pub const fn level(self) -> u8 {
        match self {
            Self::NoAction => 0,
            Self::Warning => 1,
            Self::DayMute => 2,
            Self::WeekMute => 3,
            Self::Ban | Self::BanCsam => 4,
        }
    }

    /// Returns `true` for tier 0.
    #[must_use]
    pub const fn is_no_action(self) -> bool {
        matches!(self, Self::NoAction)
    }

    /// Label in the discretionary menu.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::NoAction => "Tier 0: Not abusive",
            Self::Warning => "Tier 1: Low risk abuse",
            Self::DayMute => "Tier 2: Medium risk abuse",
            Self::WeekMute => "Tier 3: High risk abuse",
            Self::Ban => "Tier 4: Illegal/immediate risk abuse",
            Self::BanCsam => "Tier 4: CSAM",
        }
    }

    /// What was done, as reported back to the moderator.
    #[must_use]
    pub const fn outcome_text(self) -> &'static str {
        match self {
            Self::NoAction => {
                "Notified reporter that the behavior is not abusive. Provided them with an option to dispute."
            }
            Self::Warning => "Removed content. Gave the offending user a warning.",
            Self::DayMute => "Removed content. Gave the offending user a one-day mute.",
            Self::WeekMute => "Removed content. Gave the offending user a one-week mute.",
            Self::Ban => {
                "Removed content. Permanently banned the offending user. \
                 Stored content securely as required by law."
            }
            Self::BanCsam => {
                "Removed content. Permanently banned the offending user. \
                 Stored content securely as required by law. Reported to NCMEC."
            }
        }
    }

    /// Parses a zero-based discretionary selector (`0` to `5`).
    #[must_use]
    pub fn from_selector(input: &str) -> Option<Self> {
        let input = input.trim();
        if input.len() != 1 {
            return None;
        }
        let index = input.chars().next()?.to_digit(10)?;
        Self::ALL.get(usize::try_from(index).ok()?).copied()
    }
}

impl std::fmt::Display for Tier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// States of the review dialogue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ReviewState {
    /// Session created, nothing said yet.
    #[default]
    Start,
    /// Waiting for the scoring backend to show.
    ChooseBackend,
    /// Waiting for the lane to pull a report from.
    ChooseLane,
    /// An automatic report was pulled; waiting for its category.
    Categorize,
    /// Waiting for the fraud type.
    Fraud,
    /// Waiting for the verbal abuse type.
    VerbalAbuse,
    /// Waiting for the harassment type.
    Harassment,
    /// Waiting for the sensitive content type.
    Sensitive,
    /// Does the content fit another violative category?
    Other,
    /// Discrimination question after low-severity verbal abuse.
    DiscriminateLow,
    /// Discrimination question after incitement.
    DiscriminateHigh,
    /// Discrimination question after a private-information threat.
    DiscriminateHarassment,
    /// Discrimination question after assault or self harm.
    DiscriminateSensitive,
    /// Does it encourage, incite or threaten violence?
    InciteViolence,
    /// Does it involve defamation or spreading fear?
    Defamation,
    /// Does it contain derogatory slurs?
    Derogatory,
    /// Is the content abusive at all?
    Abusive,
    /// Moderator picks the tier directly.
    Discretionary,
    /// A tier was decided.
    Complete(Tier),
    /// The moderator cancelled.
    Cancelled,
    /// The chosen lane had nothing to review.
    CannotReview,
}

const DISCRIMINATE_QUESTION: &str =
    "Does it discriminate based on inherited attributes and/or feature hate speech (yes/no)?";

impl ReviewState {
    /// Returns `true` once the dialogue is over.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Complete(_) | Self::Cancelled | Self::CannotReview)
    }

    /// The first question for a report in `category`.
    #[must_use]
    pub const fn for_category(category: Category) -> Self {
        match category {
            Category::Fraud => Self::Fraud,
            Category::VerbalAbuse => Self::VerbalAbuse,
            Category::Harassment => Self::Harassment,
            Category::SensitiveContent => Self::Sensitive,
            Category::Other => Self::Other,
        }
    }

    /// The question asked in a decision-tree state.
    ///
    /// Returns `None` for the selection and terminal states, whose prompts
    /// depend on the queue.
    #[must_use]
    pub fn prompt(self) -> Option<String> {
        let prompt = match self {
            Self::Fraud => {
                numbered_menu("What is the type of fraud?", FraudKind::ALL.map(FraudKind::label))
            }
            Self::VerbalAbuse => numbered_menu(
                "What is the type of verbal abuse? Please select the corresponding number.",
                VerbalAbuseKind::REVIEW_MENU.map(VerbalAbuseKind::label),
            ),
            Self::Harassment => numbered_menu(
                "What is the type of harassment or intimidation? Please select the corresponding number.",
                HarassmentKind::ALL.map(HarassmentKind::label),
            ),
            Self::Sensitive => numbered_menu(
                "What is the type of sensitive or disturbing content? Please select the corresponding number.",
                SensitiveKind::ALL.map(SensitiveKind::label),
            ),
            Self::Other => "Does the content fit into any other violative category (yes/no)?".to_string(),
            Self::DiscriminateLow
            | Self::DiscriminateHigh
            | Self::DiscriminateHarassment
            | Self::DiscriminateSensitive => DISCRIMINATE_QUESTION.to_string(),
            Self::InciteViolence => "Does it encourage, incite, or threaten violence (yes/no)?".to_string(),
            Self::Defamation => "Does it involve defamation or the spreading of fear (yes/no)?".to_string(),
            Self::Derogatory => "Does it contain derogatory slurs and other intentionally abusive \
                 language, including misgendering (yes/no)?"
                .to_string(),
            Self::Abusive => "Is the content abusive (yes/no)?".to_string(),
            Self::Discretionary => {
                let mut menu = String::from(
                    "How would this abuse be categorized? Please select the corresponding number.",
                );
                for (i, tier) in Tier::ALL.iter().enumerate() {
                    let _ = write!(menu, "\n({i}) {}", tier.label());
                }
                menu.push('\n');
                menu
            }
            Self::Start
            | Self::ChooseBackend
            | Self::ChooseLane
            | Self::Categorize
            | Self::Complete(_)
            | Self::Cancelled
            | Self::CannotReview => return None,
        };
        Some(prompt)
    }
}

/// The decision tree: where an answer leads from a question state.
///
/// Returns `None` when `input` is not an accepted answer for `state`, and for
/// states outside the tree.
#[must_use]
pub fn next_state(state: ReviewState, input: &str) -> Option<ReviewState> {
    use ReviewState as S;

    let by_answer = |yes: S, no: S| keywords::yes_no(input).map(|answer| if answer { yes } else { no });

    match state {
        S::Fraud => select(&FraudKind::ALL, input).map(|_| S::Complete(Tier::Warning)),
        S::VerbalAbuse => select(&VerbalAbuseKind::REVIEW_MENU, input).map(|kind| match kind {
            VerbalAbuseKind::CelebrationOfViolence
            | VerbalAbuseKind::DenialOfViolentEvent
            | VerbalAbuseKind::Dehumanization => S::DiscriminateLow,
            VerbalAbuseKind::IncitingViolence => S::DiscriminateHigh,
            VerbalAbuseKind::HateSpeech(_) => S::InciteViolence,
        }),
        S::Harassment => select(&HarassmentKind::ALL, input).map(|kind| match kind {
            HarassmentKind::PrivateInformation => S::DiscriminateHarassment,
            HarassmentKind::Sexual | HarassmentKind::Stalking => S::Complete(Tier::WeekMute),
        }),
        S::Sensitive => select(&SensitiveKind::ALL, input).map(|kind| match kind {
            SensitiveKind::Assault | SensitiveKind::SelfHarm => S::DiscriminateSensitive,
            SensitiveKind::Bestiality => S::Complete(Tier::Ban),
            SensitiveKind::ChildExploitation => S::Complete(Tier::BanCsam),
        }),
        S::Other => by_answer(S::Discretionary, S::Abusive),
        S::DiscriminateLow => by_answer(S::Defamation, S::Complete(Tier::Warning)),
        S::DiscriminateHigh => by_answer(S::Complete(Tier::Ban), S::Complete(Tier::Ban)),
        S::DiscriminateHarassment => by_answer(S::InciteViolence, S::Complete(Tier::WeekMute)),
        S::DiscriminateSensitive => by_answer(S::InciteViolence, S::Complete(Tier::Warning)),
        S::InciteViolence => by_answer(S::Complete(Tier::Ban), S::Defamation),
        S::Defamation => by_answer(S::Complete(Tier::WeekMute), S::Derogatory),
        S::Derogatory => by_answer(S::Complete(Tier::DayMute), S::Complete(Tier::Warning)),
        S::Abusive => by_answer(S::Complete(Tier::Warning), S::Complete(Tier::NoAction)),
        S::Discretionary => Tier::from_selector(input).map(S::Complete),
        S::Start
        | S::ChooseBackend
        | S::ChooseLane
        | S::Categorize
        | S::Complete(_)
        | S::Cancelled
        | S::CannotReview => None,
    }
}
