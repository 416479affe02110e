//! A line-oriented stand-in for a chat server.
//!
//! Each input line is one inbound message:
//!
//! ```text
//! @alice: report                  direct message from alice to the bot
//! #general mallory: some text     public message, scored for automatic reports
//! #mod carol: review              message in the moderator channel
//! /quit
//! ```
//!
//! Replies are rendered as `[bot -> @alice] ...` or `[bot -> #mod] ...`.

use std::collections::{HashMap, HashSet};
use std::time::Duration;

use modbot_core::{
    Actor, AutoFlagger, ChannelId, Dispatch, Dispatcher, GuildId, MessageDirectory, MessageLink,
    ModerationEvent, ReporterId, Tier, UserId,
};
use modbot_scoring::{Classifier, ClassifierClient, score_all};
use tracing::{debug, info};

use crate::config::BotConfig;

/// Shown for lines that match none of the accepted forms.
pub const USAGE: &str =
    "Usage: `@user: text` (direct message), `#channel user: text` (channel message), `/quit`";

const FIRST_USER_ID: u64 = 100;

/// One parsed input line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Input<'a> {
    /// A direct message to the bot.
    Direct {
        /// Sender name.
        user: &'a str,
        /// Message text.
        text: &'a str,
    },
    /// A message in a guild channel.
    Channel {
        /// Channel name, without `#`.
        channel: &'a str,
        /// Sender name.
        user: &'a str,
        /// Message text.
        text: &'a str,
    },
    /// Stop the console.
    Quit,
}

/// Parses one console line. Returns `None` for unrecognised input.
#[must_use]
pub fn parse_line(line: &str) -> Option<Input<'_>> {
    let line = line.trim();
    if line == "/quit" {
        return Some(Input::Quit);
    }

    if let Some(rest) = line.strip_prefix('@') {
        let (user, text) = split_sender(rest)?;
        return Some(Input::Direct { user, text });
    }

    let rest = line.strip_prefix('#')?;
    let (channel, rest) = rest.split_once(char::is_whitespace)?;
    let (user, text) = split_sender(rest)?;
    (!channel.is_empty()).then_some(Input::Channel {
        channel,
        user,
        text,
    })
}

fn split_sender(s: &str) -> Option<(&str, &str)> {
    let (user, text) = s.split_once(':')?;
    let user = user.trim();
    (!user.is_empty()).then(|| (user, text.trim()))
}

/// Console host state: the message store, the dispatcher and the classifiers.
pub struct Console<C = ClassifierClient> {
    dispatcher: Dispatcher,
    directory: MessageDirectory,
    guild: GuildId,
    public_channels: Vec<String>,
    mod_channel: String,
    users: HashMap<String, Actor>,
    banned: HashSet<UserId>,
    classifiers: Vec<C>,
    flagger: AutoFlagger,
    timeout: Duration,
}

impl<C: Classifier + Sync> Console<C> {
    /// Creates a console with the channels named in `config`.
    #[must_use]
    pub fn new(config: &BotConfig, classifiers: Vec<C>) -> Self {
        let guild = GuildId(config.guild_id);
        let mut directory = MessageDirectory::new();
        directory.add_guild(guild);

        let channels = config
            .public_channels
            .iter()
            .chain(std::iter::once(&config.mod_channel));
        for (id, name) in (1..).zip(channels) {
            directory.add_channel(guild, ChannelId(id), name.as_str());
        }

        Self {
            dispatcher: Dispatcher::new(),
            directory,
            guild,
            public_channels: config.public_channels.clone(),
            mod_channel: config.mod_channel.clone(),
            users: HashMap::new(),
            banned: HashSet::new(),
            classifiers,
            flagger: AutoFlagger::new(config.auto_report_threshold),
            timeout: config.request_timeout(),
        }
    }

    /// Handles one parsed line and returns the rendered output.
    pub async fn handle(&mut self, input: Input<'_>) -> Vec<String> {
        match input {
            Input::Direct { user, text } => {
                let actor = self.actor(user);
                let dispatch =
                    self.dispatcher
                        .handle_direct_message(&actor, text, &self.directory);
                self.render(&format!("@{user}"), dispatch)
            }
            Input::Channel { channel, user, text } if channel == self.mod_channel => {
                let actor = self.actor(user);
                let dispatch = self.dispatcher.handle_review_message(&actor, text);
                let target = format!("#{}", self.mod_channel);
                self.render(&target, dispatch)
            }
            Input::Channel { channel, user, text }
                if self.public_channels.iter().any(|c| c == channel) =>
            {
                self.public_message(channel, user, text).await
            }
            Input::Channel { channel, .. } => vec![format!("[bot] Unknown channel #{channel}")],
            Input::Quit => Vec::new(),
        }
    }

    async fn public_message(&mut self, channel: &str, user: &str, text: &str) -> Vec<String> {
        let actor = self.actor(user);
        if self.banned.contains(&actor.id) {
            return vec![format!("[bot] {user} is banned and cannot post")];
        }
        let Some(channel_id) = self.directory.channel_by_name(self.guild, channel) else {
            return vec![format!("[bot] Unknown channel #{channel}")];
        };
        let message = match self.directory.post(self.guild, channel_id, actor, text) {
            Ok(message) => message,
            Err(e) => return vec![format!("[bot] {e}")],
        };

        let mod_target = format!("[bot -> #{}]", self.mod_channel);
        let mut out = vec![
            format!("[#{channel}] {user}: {text} ({})", message.link),
            format!("{mod_target} Forwarded message:\n{user}: \"{text}\""),
        ];

        if self.classifiers.is_empty() {
            return out;
        }

        let outcomes = score_all(&self.classifiers, text, self.timeout).await;
        let verdict = self.flagger.evaluate(outcomes);
        let summary = self
            .classifiers
            .iter()
            .map(|c| {
                let backend = c.backend();
                verdict.probabilities.get(&backend).map_or_else(
                    || format!("{backend} no score"),
                    |p| format!("{backend} {p:.2}"),
                )
            })
            .collect::<Vec<_>>()
            .join(", ");
        out.push(format!("{mod_target} Evaluated: {summary}"));

        if verdict.flagged {
            info!(link = %message.link, "message reported automatically");
            let dispatch = self
                .dispatcher
                .file_automatic_report(message, verdict.probabilities);
            let target = format!("#{}", self.mod_channel);
            out.extend(self.render(&target, dispatch));
        }
        out
    }

    fn actor(&mut self, name: &str) -> Actor {
        let next = FIRST_USER_ID + self.users.len() as u64;
        self.users
            .entry(name.to_string())
            .or_insert_with(|| Actor::new(UserId(next), name))
            .clone()
    }

    fn name_of(&self, id: UserId) -> String {
        self.users
            .values()
            .find(|actor| actor.id == id)
            .map_or_else(|| id.to_string(), |actor| actor.name.clone())
    }

    fn reporter_name(&self, reporter: ReporterId) -> String {
        reporter
            .user()
            .map_or_else(|| "automatic flagging".to_string(), |id| self.name_of(id))
    }

    fn render(&mut self, target: &str, dispatch: Dispatch) -> Vec<String> {
        let mut out: Vec<String> = dispatch
            .lines
            .into_iter()
            .map(|line| format!("[bot -> {target}] {line}"))
            .collect();
        for event in dispatch.events {
            out.extend(self.apply(event));
        }
        out
    }

    fn apply(&mut self, event: ModerationEvent) -> Option<String> {
        match event {
            ModerationEvent::ReportFiled {
                report,
                reporter,
                category,
            } => {
                let category = category.map_or("uncategorized", |c| c.label());
                Some(format!(
                    "[bot -> #{}] New report {report} from {} awaiting review ({category}).",
                    self.mod_channel,
                    self.reporter_name(reporter)
                ))
            }
            ModerationEvent::BlockRequested { reporter, author } => Some(format!(
                "[bot] {} blocked {}",
                self.name_of(reporter),
                self.name_of(author)
            )),
            ModerationEvent::ReviewCompleted {
                tier,
                message,
                offender,
                ..
            } => self.enforce(tier, message, offender),
            ModerationEvent::ReviewCancelled { moderator, report } => {
                debug!(%moderator, ?report, "review cancelled");
                None
            }
        }
    }

    fn enforce(
        &mut self,
        tier: Tier,
        message: Option<MessageLink>,
        offender: Option<UserId>,
    ) -> Option<String> {
        if tier.is_no_action() {
            return None;
        }
        if let Some(link) = message {
            self.directory.delete(&link);
        }
        let offender = offender?;
        let name = self.name_of(offender);
        let action = match tier {
            Tier::NoAction => return None,
            Tier::Warning => "warned",
            Tier::DayMute => "muted for one day",
            Tier::WeekMute => "muted for one week",
            Tier::Ban | Tier::BanCsam => {
                self.banned.insert(offender);
                "banned"
            }
        };
        info!(%offender, ?tier, "enforcement applied");
        Some(format!("[bot] Removed the message; {name} was {action}"))
    }
}
