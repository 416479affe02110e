//! Message link parsing.

use url::Url;

use crate::ids::{ChannelId, GuildId, MessageId};

/// Base URL used when rendering links.
pub const LINK_BASE: &str = "https://discord.com/channels";

/// A reference to a message, as copied from the client's "Copy Message Link".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MessageLink {
    /// Guild the message was posted in.
    pub guild: GuildId,
    /// Channel the message was posted in.
    pub channel: ChannelId,
    /// The message itself.
    pub message: MessageId,
}

impl MessageLink {
    /// Creates a link from its parts.
    #[must_use]
    pub const fn new(guild: GuildId, channel: ChannelId, message: MessageId) -> Self {
        Self {
            guild,
            channel,
            message,
        }
    }

    /// Extracts a link from free text.
    ///
    /// Accepts full URLs (`https://discord.com/channels/1/2/3`) as well as bare
    /// `/1/2/3` paths, anywhere in the input. When a token holds more than
    /// three numeric path segments in a row, the last three are used.
    #[must_use]
    pub fn parse(input: &str) -> Option<Self> {
        input.split_whitespace().find_map(|token| {
            Url::parse(token).map_or_else(
                |_| find_triple(token.split('/')),
                |url| url.path_segments().and_then(find_triple),
            )
        })
    }

    /// Renders the canonical link.
    #[must_use]
    pub fn to_url(&self) -> String {
        format!("{LINK_BASE}/{}/{}/{}", self.guild, self.channel, self.message)
    }
}

impl std::fmt::Display for MessageLink {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.to_url())
    }
}

fn find_triple<'a>(segments: impl Iterator<Item = &'a str>) -> Option<MessageLink> {
    let ids: Vec<Option<u64>> = segments.map(parse_id).collect();
    ids.windows(3).rev().find_map(|window| match window {
        [Some(guild), Some(channel), Some(message)] => Some(MessageLink::new(
            GuildId(*guild),
            ChannelId(*channel),
            MessageId(*message),
        )),
        _ => None,
    })
}

fn parse_id(segment: &str) -> Option<u64> {
    if segment.is_empty() || !segment.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    segment.parse().ok()
}
