//! Identifiers for actors, reports and chat objects.

use std::sync::atomic::{AtomicU64, Ordering};

use serde::{Deserialize, Serialize};

macro_rules! snowflake {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        pub struct $name(pub u64);

        impl $name {
            /// Creates a new identifier.
            #[must_use]
            pub const fn new(id: u64) -> Self {
                Self(id)
            }

            /// Returns the underlying value.
            #[must_use]
            pub const fn get(self) -> u64 {
                self.0
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

snowflake!(
    /// A chat user (reporter, moderator or message author).
    UserId
);
snowflake!(
    /// A guild (server) the bot is a member of.
    GuildId
);
snowflake!(
    /// A channel inside a guild.
    ChannelId
);
snowflake!(
    /// A message inside a channel.
    MessageId
);
snowflake!(
    /// A report, unique for the lifetime of the process.
    ReportId
);

/// Who filed a report.
///
/// Automatic reports are filed by the bot itself when a classifier score
/// crosses the configured threshold. They share one reserved identity and are
/// only reachable through the automatic review lane.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum ReporterId {
    /// A human user.
    User(UserId),
    /// The bot's automatic flagging pipeline.
    Automatic,
}

impl ReporterId {
    /// Returns `true` for the automatic-report sentinel.
    #[must_use]
    pub const fn is_automatic(self) -> bool {
        matches!(self, Self::Automatic)
    }

    /// Returns the user behind this reporter, if any.
    #[must_use]
    pub const fn user(self) -> Option<UserId> {
        match self {
            Self::User(id) => Some(id),
            Self::Automatic => None,
        }
    }
}

impl From<UserId> for ReporterId {
    fn from(id: UserId) -> Self {
        Self::User(id)
    }
}

impl std::fmt::Display for ReporterId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::User(id) => write!(f, "user {id}"),
            Self::Automatic => f.write_str("automatic"),
        }
    }
}

/// Issues sequential report identifiers.
#[derive(Debug, Default)]
pub struct ReportIdGenerator {
    counter: AtomicU64,
}

impl ReportIdGenerator {
    /// Creates a generator starting at 1.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            counter: AtomicU64::new(0),
        }
    }

    /// Returns the next identifier.
    #[must_use]
    pub fn next_id(&self) -> ReportId {
        ReportId(self.counter.fetch_add(1, Ordering::Relaxed) + 1)
    }
}

/// A participant in a conversation, as seen by the dispatcher.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Actor {
    /// Stable identifier.
    pub id: UserId,
    /// Display name.
    pub name: String,
}

impl Actor {
    /// Creates a new actor.
    #[must_use]
    pub fn new(id: UserId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_report_ids_are_sequential() {
        let generator = ReportIdGenerator::new();
        assert_eq!(generator.next_id(), ReportId(1));
        assert_eq!(generator.next_id(), ReportId(2));
    }

    #[test]
    fn test_reporter_identity() {
        let user = ReporterId::from(UserId::new(7));
        assert!(!user.is_automatic());
        assert_eq!(user.user(), Some(UserId::new(7)));
        assert!(ReporterId::Automatic.is_automatic());
        assert_eq!(ReporterId::Automatic.user(), None);
        assert_eq!(user.to_string(), "user 7");
    }

    #[test]
    fn test_snowflake_serde_is_transparent_number() {
        let json = serde_json::to_string(&MessageId::new(42)).unwrap();
        assert_eq!(json, "42");
    }
}
