//! Resolving message links to message content.

use std::collections::HashMap;

use super::link::MessageLink;
use crate::ids::{Actor, ChannelId, GuildId, MessageId};

/// A message the bot can see.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedMessage {
    /// Where the message lives.
    pub link: MessageLink,
    /// Who wrote it.
    pub author: Actor,
    /// Its text.
    pub content: String,
}

impl ResolvedMessage {
    /// Renders the message as a code block, `author: content`.
    #[must_use]
    pub fn quoted(&self) -> String {
        format!("```{}: {}```", self.author.name, self.content)
    }
}

/// Why a link could not be resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum ResolveError {
    /// The bot is not a member of the guild.
    #[error("Unknown guild: {0}")]
    UnknownGuild(GuildId),
    /// The channel was deleted or never existed.
    #[error("Unknown channel: {0}")]
    UnknownChannel(ChannelId),
    /// The message was deleted or never existed.
    #[error("Unknown message: {0}")]
    UnknownMessage(MessageId),
}

impl ResolveError {
    /// Text shown to the reporting user.
    #[must_use]
    pub const fn user_message(&self) -> &'static str {
        match self {
            Self::UnknownGuild(_) => {
                "I cannot accept reports of messages from guilds that I'm not in. \
                 Please have the guild owner add me to the guild and try again."
            }
            Self::UnknownChannel(_) => {
                "It seems this channel was deleted or never existed. \
                 Please try again or say `cancel` to cancel."
            }
            Self::UnknownMessage(_) => {
                "It seems this message was deleted or never existed. \
                 Please try again or say `cancel` to cancel."
            }
        }
    }
}

/// Looks up messages by link.
///
/// Implemented by the chat transport. Lookups must not block indefinitely.
pub trait MessageResolver {
    /// Resolves `link` to the message it points at.
    ///
    /// # Errors
    ///
    /// Returns the first part of the link (guild, channel, message) that
    /// could not be found.
    fn resolve(&self, link: &MessageLink) -> Result<ResolvedMessage, ResolveError>;
}

impl<R: MessageResolver + ?Sized> MessageResolver for &R {
    fn resolve(&self, link: &MessageLink) -> Result<ResolvedMessage, ResolveError> {
        (**self).resolve(link)
    }
}

#[derive(Debug, Clone, Default)]
struct ChannelLog {
    name: String,
    messages: HashMap<MessageId, ResolvedMessage>,
}

/// In-memory guild/channel/message store.
///
/// Used by the console host and by tests in place of a live chat connection.
#[derive(Debug, Default)]
pub struct MessageDirectory {
    guilds: HashMap<GuildId, HashMap<ChannelId, ChannelLog>>,
    next_message: u64,
}

impl MessageDirectory {
    /// Creates an empty directory.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a guild. Existing guilds are left untouched.
    pub fn add_guild(&mut self, guild: GuildId) {
        self.guilds.entry(guild).or_default();
    }

    /// Registers a channel, creating the guild if needed.
    pub fn add_channel(&mut self, guild: GuildId, channel: ChannelId, name: impl Into<String>) {
        let log = self
            .guilds
            .entry(guild)
            .or_default()
            .entry(channel)
            .or_default();
        log.name = name.into();
    }

    /// Finds a channel id by name.
    #[must_use]
    pub fn channel_by_name(&self, guild: GuildId, name: &str) -> Option<ChannelId> {
        self.guilds
            .get(&guild)?
            .iter()
            .find(|(_, log)| log.name == name)
            .map(|(id, _)| *id)
    }

    /// Records a new message and returns it.
    ///
    /// # Errors
    ///
    /// Returns an error if the guild or channel is unknown.
    pub fn post(
        &mut self,
        guild: GuildId,
        channel: ChannelId,
        author: Actor,
        content: impl Into<String>,
    ) -> Result<ResolvedMessage, ResolveError> {
        let log = self
            .guilds
            .get_mut(&guild)
            .ok_or(ResolveError::UnknownGuild(guild))?
            .get_mut(&channel)
            .ok_or(ResolveError::UnknownChannel(channel))?;

        self.next_message += 1;
        let link = MessageLink::new(guild, channel, MessageId(self.next_message));
        let message = ResolvedMessage {
            link,
            author,
            content: content.into(),
        };
        log.messages.insert(link.message, message.clone());
        Ok(message)
    }

    /// Deletes a message. Returns the removed message, if it existed.
    pub fn delete(&mut self, link: &MessageLink) -> Option<ResolvedMessage> {
        self.guilds
            .get_mut(&link.guild)?
            .get_mut(&link.channel)?
            .messages
            .remove(&link.message)
    }
}

impl MessageResolver for MessageDirectory {
    fn resolve(&self, link: &MessageLink) -> Result<ResolvedMessage, ResolveError> {
        self.guilds
            .get(&link.guild)
            .ok_or(ResolveError::UnknownGuild(link.guild))?
            .get(&link.channel)
            .ok_or(ResolveError::UnknownChannel(link.channel))?
            .messages
            .get(&link.message)
            .cloned()
            .ok_or(ResolveError::UnknownMessage(link.message))
    }
}
