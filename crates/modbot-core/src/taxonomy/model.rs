//! Report categories and sub-reasons.

use serde::{Deserialize, Serialize};

/// Top-level report category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Category {
    /// Impersonation, scams and solicitation.
    Fraud,
    /// Violent language and hate speech.
    VerbalAbuse,
    /// Harassment and threats of violence.
    Harassment,
    /// Sensitive or disturbing content.
    SensitiveContent,
    /// Anything else, described in free text.
    Other,
}

impl Category {
    /// All categories in menu order.
    pub const ALL: [Self; 5] = [
        Self::Fraud,
        Self::VerbalAbuse,
        Self::Harassment,
        Self::SensitiveContent,
        Self::Other,
    ];

    /// Zero-based index, also the position in [`CategoryFlags`].
    #[must_use]
    pub const fn index(self) -> usize {
        match self {
            Self::Fraud => 0,
            Self::VerbalAbuse => 1,
            Self::Harassment => 2,
            Self::SensitiveContent => 3,
            Self::Other => 4,
        }
    }

    /// Parses a one-based menu selector (`"1"`..=`"5"`).
    #[must_use]
    pub fn from_selector(input: &str) -> Option<Self> {
        select(&Self::ALL, input)
    }

    /// Menu label.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Fraud => "Fraud",
            Self::VerbalAbuse => "Verbal Abuse",
            Self::Harassment => "Harassment/Threats of Violence",
            Self::SensitiveContent => "Sensitive/Disturbing Content",
            Self::Other => "Other",
        }
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Type of fraud.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FraudKind {
    /// Pretending to be someone else.
    Impersonation,
    /// Attempting to cheat someone out of money or data.
    Scam,
    /// Unsolicited selling or recruiting.
    Solicitation,
}

impl FraudKind {
    /// All kinds in menu order.
    pub const ALL: [Self; 3] = [Self::Impersonation, Self::Scam, Self::Solicitation];

    /// Menu label.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Impersonation => "Impersonation",
            Self::Scam => "Scam",
            Self::Solicitation => "Solicitation",
        }
    }
}

/// Group targeted by hate speech.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum HateTarget {
    /// Ethnicity, race or nationality.
    Ethnicity,
    /// Gender, sex or sexuality.
    Gender,
    /// Religion.
    Religion,
    /// Disability or health status.
    Disability,
    /// Another protected attribute.
    Other,
    /// Not specified (moderator menu).
    Unspecified,
}

impl HateTarget {
    /// Menu label.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Ethnicity => "Ethnicity/Race/Nationality",
            Self::Gender => "Gender/Sex/Sexuality",
            Self::Religion => "Religion",
            Self::Disability => "Disability/Health Status",
            Self::Other => "Other",
            Self::Unspecified => "Hate speech",
        }
    }
}

/// Type of verbal abuse.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum VerbalAbuseKind {
    /// Celebration of violent acts.
    CelebrationOfViolence,
    /// Denial of a violent event.
    DenialOfViolentEvent,
    /// Dehumanization.
    Dehumanization,
    /// Inciting or encouraging violence.
    IncitingViolence,
    /// Hate speech against a group.
    HateSpeech(HateTarget),
}

impl VerbalAbuseKind {
    /// Options offered to reporting users.
    pub const USER_MENU: [Self; 9] = [
        Self::CelebrationOfViolence,
        Self::DenialOfViolentEvent,
        Self::Dehumanization,
        Self::IncitingViolence,
        Self::HateSpeech(HateTarget::Ethnicity),
        Self::HateSpeech(HateTarget::Gender),
        Self::HateSpeech(HateTarget::Religion),
        Self::HateSpeech(HateTarget::Disability),
        Self::HateSpeech(HateTarget::Other),
    ];

    /// Options offered to moderators; hate speech is not broken down.
    pub const REVIEW_MENU: [Self; 5] = [
        Self::CelebrationOfViolence,
        Self::DenialOfViolentEvent,
        Self::Dehumanization,
        Self::IncitingViolence,
        Self::HateSpeech(HateTarget::Unspecified),
    ];

    /// Menu label.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::CelebrationOfViolence => "Celebration of violent acts",
            Self::DenialOfViolentEvent => "Denial of a violent event",
            Self::Dehumanization => "Dehumanization",
            Self::IncitingViolence => "Inciting or encouraging violence",
            Self::HateSpeech(target) => target.label(),
        }
    }
}

/// Type of harassment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum HarassmentKind {
    /// Sexual harassment.
    Sexual,
    /// Threatening to post or posting private information.
    PrivateInformation,
    /// Stalking or threats to injure.
    Stalking,
}

impl HarassmentKind {
    /// All kinds in menu order.
    pub const ALL: [Self; 3] = [Self::Sexual, Self::PrivateInformation, Self::Stalking];

    /// Menu label.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Sexual => "Sexual Harassment",
            Self::PrivateInformation => "Threatening to post or posting private info",
            Self::Stalking => "Stalking or threats to injure",
        }
    }
}

/// Type of sensitive or disturbing content.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SensitiveKind {
    /// Child exploitation.
    ChildExploitation,
    /// Assault.
    Assault,
    /// Bestiality.
    Bestiality,
    /// Self harm.
    SelfHarm,
}

impl SensitiveKind {
    /// All kinds in menu order.
    pub const ALL: [Self; 4] = [
        Self::ChildExploitation,
        Self::Assault,
        Self::Bestiality,
        Self::SelfHarm,
    ];

    /// Menu label.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::ChildExploitation => "Child Exploitation",
            Self::Assault => "Assault",
            Self::Bestiality => "Beastiality",
            Self::SelfHarm => "Self Harm",
        }
    }
}

/// The reason a reporter gave, scoped by category.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ReportReason {
    /// Fraud sub-reason.
    Fraud(FraudKind),
    /// Verbal abuse sub-reason.
    VerbalAbuse(VerbalAbuseKind),
    /// Harassment sub-reason.
    Harassment(HarassmentKind),
    /// Sensitive content sub-reason.
    SensitiveContent(SensitiveKind),
    /// Free-text explanation.
    Other(String),
}

impl ReportReason {
    /// The top-level category this reason belongs to.
    #[must_use]
    pub const fn category(&self) -> Category {
        match self {
            Self::Fraud(_) => Category::Fraud,
            Self::VerbalAbuse(_) => Category::VerbalAbuse,
            Self::Harassment(_) => Category::Harassment,
            Self::SensitiveContent(_) => Category::SensitiveContent,
            Self::Other(_) => Category::Other,
        }
    }

    /// Human-readable description.
    #[must_use]
    pub fn describe(&self) -> String {
        match self {
            Self::Fraud(kind) => format!("{}: {}", Category::Fraud, kind.label()),
            Self::VerbalAbuse(kind) => format!("{}: {}", Category::VerbalAbuse, kind.label()),
            Self::Harassment(kind) => format!("{}: {}", Category::Harassment, kind.label()),
            Self::SensitiveContent(kind) => {
                format!("{}: {}", Category::SensitiveContent, kind.label())
            }
            Self::Other(text) => format!("{}: \"{text}\"", Category::Other),
        }
    }
}

/// One flag per top-level category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct CategoryFlags([bool; 5]);

impl CategoryFlags {
    /// No category set.
    #[must_use]
    pub const fn none() -> Self {
        Self([false; 5])
    }

    /// Exactly `category` set.
    #[must_use]
    pub const fn only(category: Category) -> Self {
        let mut flags = [false; 5];
        flags[category.index()] = true;
        Self(flags)
    }

    /// Returns the raw array.
    #[must_use]
    pub const fn as_array(&self) -> [bool; 5] {
        self.0
    }

    /// Returns `true` if `category` is flagged.
    #[must_use]
    pub const fn contains(&self, category: Category) -> bool {
        self.0[category.index()]
    }

    /// Returns `true` if the category at `index` is flagged.
    ///
    /// Out-of-range indices are never flagged.
    #[must_use]
    pub fn is_set(&self, index: usize) -> bool {
        self.0.get(index).copied().unwrap_or(false)
    }

    /// Number of flagged categories.
    #[must_use]
    pub fn count(&self) -> usize {
        self.0.iter().filter(|flag| **flag).count()
    }

    /// Iterates over the flagged categories in menu order.
    pub fn iter(&self) -> impl Iterator<Item = Category> + '_ {
        Category::ALL
            .into_iter()
            .filter(|category| self.contains(*category))
    }
}

/// Picks an option by its one-based menu number.
///
/// Only a single digit is accepted; surrounding whitespace is ignored. Menus
/// never list more than nine options.
#[must_use]
pub fn select<T: Copy>(options: &[T], input: &str) -> Option<T> {
    let &[digit] = input.trim().as_bytes() else {
        return None;
    };
    if !digit.is_ascii_digit() {
        return None;
    }
    usize::from(digit - b'0')
        .checked_sub(1)
        .and_then(|i| options.get(i).copied())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_category_selector() {
        assert_eq!(Category::from_selector("1"), Some(Category::Fraud));
        assert_eq!(Category::from_selector(" 5 "), Some(Category::Other));
        assert_eq!(Category::from_selector("0"), None);
        assert_eq!(Category::from_selector("6"), None);
        assert_eq!(Category::from_selector("+2"), None);
        assert_eq!(Category::from_selector("two"), None);
        assert_eq!(Category::from_selector("01"), None);
        assert_eq!(Category::from_selector("0002"), None);
        assert_eq!(Category::from_selector("12"), None);
    }

    #[test]
    fn test_category_index_matches_menu_order() {
        for (position, category) in Category::ALL.into_iter().enumerate() {
            assert_eq!(category.index(), position);
        }
    }

    #[test]
    fn test_flags_only() {
        let flags = CategoryFlags::only(Category::VerbalAbuse);
        assert_eq!(flags.as_array(), [false, true, false, false, false]);
        assert_eq!(flags.count(), 1);
        assert!(flags.contains(Category::VerbalAbuse));
        assert!(!flags.is_set(7));
        assert_eq!(flags.iter().collect::<Vec<_>>(), vec![Category::VerbalAbuse]);
    }

    #[test]
    fn test_user_and_review_menus_share_prefix() {
        assert_eq!(
            VerbalAbuseKind::USER_MENU[..4],
            VerbalAbuseKind::REVIEW_MENU[..4]
        );
        assert_eq!(
            select(&VerbalAbuseKind::USER_MENU, "6"),
            Some(VerbalAbuseKind::HateSpeech(HateTarget::Gender))
        );
    }

    #[test]
    fn test_reason_category() {
        let reason = ReportReason::Harassment(HarassmentKind::Stalking);
        assert_eq!(reason.category(), Category::Harassment);
        assert_eq!(
            reason.describe(),
            "Harassment/Threats of Violence: Stalking or threats to injure"
        );
    }
}
