//! The reporting dialogue.

use std::fmt::Write;

use tracing::debug;

use super::model::{Answer, Report, ReportState};
use crate::ids::{Actor, ReportId, ReporterId};
use crate::keywords::{self, INVALID_ACTION};
use crate::message::{MessageLink, MessageResolver};
use crate::taxonomy::{
    Category, CategoryFlags, FraudKind, HarassmentKind, SensitiveKind, VerbalAbuseKind,
    category_menu, numbered_menu,
};

const GREETING: &str = "Thank you for starting the reporting process. \
    Say `help` at any time for more information.\n\n\
    Please copy paste the link to the message you want to report.\n\
    You can obtain this link by right-clicking the message and clicking `Copy Message Link`.";

const UNREADABLE_LINK: &str =
    "I'm sorry, I couldn't read that link. Please try again or say `cancel` to cancel.";

const CATEGORY_PROMPT: &str =
    "Why are you reporting this message? Please respond with the corresponding number. ";

const SUB_REASON_PROMPT: &str =
    "Select the type of harm. Please respond with the corresponding number. ";

const OTHER_PROMPT: &str = "Why is this message harmful?";

const BLOCK_PROMPT: &str = "Thank you for your report. Our 24/7 moderation team will review it shortly.\n\
    Would you like to block this user to prevent future interactions with them (yes/no)?\n";

const CANCELLED: &str = "Report cancelled.";
const CLOSED: &str = "Done. Report Closed.";

/// One user's reporting dialogue.
///
/// Created on the `report` keyword and fed every later direct message from
/// the same user until [`is_complete`](Self::is_complete) returns `true`.
#[derive(Debug, Clone)]
pub struct ReportSession {
    report: Report,
    state: ReportState,
}

impl ReportSession {
    /// Opens a session for `reporter`.
    #[must_use]
    pub fn new(id: ReportId, reporter: &Actor) -> Self {
        Self {
            report: Report::new(id, ReporterId::User(reporter.id), reporter.name.clone()),
            state: ReportState::Start,
        }
    }

    /// Current state.
    #[must_use]
    pub const fn state(&self) -> ReportState {
        self.state
    }

    /// Returns `true` once the report is finished or cancelled.
    #[must_use]
    pub const fn is_complete(&self) -> bool {
        self.state.is_terminal()
    }

    /// Returns `true` if the reporter cancelled.
    #[must_use]
    pub const fn is_cancelled(&self) -> bool {
        self.report.cancelled
    }

    /// Who is filing the report.
    #[must_use]
    pub const fn reporter(&self) -> ReporterId {
        self.report.reporter
    }

    /// Categories selected so far.
    #[must_use]
    pub const fn category_flags(&self) -> CategoryFlags {
        self.report.flags
    }

    /// The report being built.
    #[must_use]
    pub const fn report(&self) -> &Report {
        &self.report
    }

    /// Consumes the session, returning the report.
    #[must_use]
    pub fn into_report(self) -> Report {
        self.report
    }

    /// Feeds one message from the reporter into the dialogue.
    ///
    /// Returns the lines to send back, in order. Input the current state
    /// does not accept leaves the state unchanged. Once complete, further
    /// input is ignored.
    pub fn handle_message<R>(&mut self, input: &str, resolver: &R) -> Vec<String>
    where
        R: MessageResolver + ?Sized,
    {
        if self.is_complete() {
            return Vec::new();
        }

        if keywords::matches(input, keywords::CANCEL) {
            debug!(report = %self.report.id, from = ?self.state, "report cancelled");
            self.report.cancelled = true;
            self.state = ReportState::Complete;
            return vec![CANCELLED.to_string()];
        }

        let before = self.state;
        let lines = match self.state {
            ReportState::Start => {
                self.state = ReportState::AwaitingMessageRef;
                vec![GREETING.to_string()]
            }
            ReportState::AwaitingMessageRef => self.identify_message(input, resolver),
            ReportState::MessageIdentified => self.show_identified(),
            ReportState::Complete => Vec::new(),
            question => self.answer(question, input),
        };

        if before != self.state {
            debug!(report = %self.report.id, from = ?before, to = ?self.state, "report transition");
        }
        lines
    }

    fn identify_message<R>(&mut self, input: &str, resolver: &R) -> Vec<String>
    where
        R: MessageResolver + ?Sized,
    {
        let Some(link) = MessageLink::parse(input) else {
            return vec![UNREADABLE_LINK.to_string()];
        };

        match resolver.resolve(&link) {
            Ok(message) => {
                self.report.message = Some(message);
                self.state = ReportState::MessageIdentified;
                self.show_identified()
            }
            Err(e) => {
                debug!(report = %self.report.id, error = %e, "message link did not resolve");
                vec![e.user_message().to_string()]
            }
        }
    }

    fn show_identified(&mut self) -> Vec<String> {
        self.state = ReportState::FirstPrompt;
        let mut lines = Vec::with_capacity(3);
        if let Some(message) = &self.report.message {
            lines.push("I found this message:".to_string());
            lines.push(message.quoted());
        }
        lines.push(category_menu(CATEGORY_PROMPT));
        lines
    }

    fn answer(&mut self, question: ReportState, input: &str) -> Vec<String> {
        let Some(answer) = Answer::read(question, input) else {
            return self.reprompt(question);
        };

        self.state = answer.next_state();
        match answer {
            Answer::Category(category) => {
                self.report.flags = CategoryFlags::only(category);
                vec![sub_reason_prompt(category)]
            }
            Answer::Reason(reason) => {
                self.report.reason = Some(reason);
                vec![BLOCK_PROMPT.to_string()]
            }
            Answer::Block(block) => {
                self.report.block_author = block;
                vec![CLOSED.to_string()]
            }
        }
    }

    fn reprompt(&self, question: ReportState) -> Vec<String> {
        let mut lines = vec![INVALID_ACTION.to_string()];
        match question {
            ReportState::FirstPrompt => lines.push(category_menu(CATEGORY_PROMPT)),
            ReportState::BlockChoice => {}
            _ => {
                if let Some(category) = self.report.flags.iter().next() {
                    lines.push(sub_reason_prompt(category));
                }
            }
        }
        lines
    }
}

fn sub_reason_prompt(category: Category) -> String {
    match category {
        Category::Fraud => numbered_menu(SUB_REASON_PROMPT, FraudKind::ALL.map(FraudKind::label)),
        Category::VerbalAbuse => {
            let mut menu = format!("{SUB_REASON_PROMPT}\nViolent language concerning...");
            for (i, kind) in VerbalAbuseKind::USER_MENU.iter().enumerate() {
                if i == 4 {
                    menu.push_str("\nHate speech concerning...");
                }
                let _ = write!(menu, "\n({}) {}", i + 1, kind.label());
            }
            menu.push('\n');
            menu
        }
        Category::Harassment => {
            numbered_menu(SUB_REASON_PROMPT, HarassmentKind::ALL.map(HarassmentKind::label))
        }
        Category::SensitiveContent => {
            numbered_menu(SUB_REASON_PROMPT, SensitiveKind::ALL.map(SensitiveKind::label))
        }
        Category::Other => OTHER_PROMPT.to_string(),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::ids::{ChannelId, GuildId, UserId};
    use crate::message::MessageDirectory;
    use crate::taxonomy::{HateTarget, ReportReason};

    fn fixture() -> (MessageDirectory, String) {
        let mut dir = MessageDirectory::new();
        dir.add_channel(GuildId(1), ChannelId(2), "general");
        let posted = dir
            .post(
                GuildId(1),
                ChannelId(2),
                Actor::new(UserId(66), "mallory"),
                "you people should be hurt",
            )
            .unwrap();
        (dir, posted.link.to_url())
    }

    fn session() -> ReportSession {
        ReportSession::new(ReportId(1), &Actor::new(UserId(5), "alice"))
    }

    fn drive(session: &mut ReportSession, dir: &MessageDirectory, inputs: &[&str]) -> Vec<String> {
        let mut last = Vec::new();
        for input in inputs {
            last = session.handle_message(input, dir);
        }
        last
    }

    #[test]
    fn test_start_prompts_for_link() {
        let (dir, _) = fixture();
        let mut session = session();
        let lines = session.handle_message("report", &dir);
        assert_eq!(lines.len(), 1);
        assert!(lines[0].contains("Copy Message Link"));
        assert_eq!(session.state(), ReportState::AwaitingMessageRef);
    }

    #[test]
    fn test_valid_link_echoes_message_and_menu() {
        let (dir, link) = fixture();
        let mut session = session();
        session.handle_message("report", &dir);
        let lines = session.handle_message(&link, &dir);

        assert_eq!(lines[0], "I found this message:");
        assert_eq!(lines[1], "```mallory: you people should be hurt```");
        assert!(lines[2].contains("(5) Other"));
        assert_eq!(session.state(), ReportState::FirstPrompt);
    }

    #[test]
    fn test_bad_links_do_not_advance() {
        let (dir, _) = fixture();
        let mut session = session();
        session.handle_message("report", &dir);

        let lines = session.handle_message("no link here", &dir);
        assert_eq!(lines, vec![UNREADABLE_LINK.to_string()]);

        let lines = session.handle_message("https://discord.com/channels/9/2/1", &dir);
        assert!(lines[0].contains("guilds that I'm not in"));

        let lines = session.handle_message("https://discord.com/channels/1/9/1", &dir);
        assert!(lines[0].contains("channel was deleted"));

        let lines = session.handle_message("https://discord.com/channels/1/2/999", &dir);
        assert!(lines[0].contains("message was deleted"));

        assert_eq!(session.state(), ReportState::AwaitingMessageRef);
        assert!(!session.is_complete());
    }

    #[test]
    fn test_invalid_category_reprompts() {
        let (dir, link) = fixture();
        let mut session = session();
        let lines = drive(&mut session, &dir, &["report", &link, "7"]);
        assert_eq!(lines[0], INVALID_ACTION);
        assert_eq!(session.state(), ReportState::FirstPrompt);
        assert_eq!(session.category_flags().count(), 0);
    }

    #[test]
    fn test_verbal_abuse_flow() {
        let (dir, link) = fixture();
        let mut session = session();
        let lines = drive(&mut session, &dir, &["report", &link, "2", "6"]);
        assert!(lines[0].contains("(yes/no)"));
        assert_eq!(session.state(), ReportState::BlockChoice);
        assert_eq!(
            session.report().reason,
            Some(ReportReason::VerbalAbuse(VerbalAbuseKind::HateSpeech(
                HateTarget::Gender
            )))
        );

        let lines = session.handle_message("no", &dir);
        assert_eq!(lines, vec![CLOSED.to_string()]);
        assert!(session.is_complete());
        assert!(!session.is_cancelled());
        assert!(!session.report().block_author);
    }

    #[test]
    fn test_padded_selectors_rejected() {
        let (dir, link) = fixture();
        let mut session = session();
        let lines = drive(&mut session, &dir, &["report", &link, "02"]);
        assert_eq!(lines[0], INVALID_ACTION);
        assert_eq!(session.state(), ReportState::FirstPrompt);
        assert_eq!(session.category_flags().count(), 0);

        let lines = drive(&mut session, &dir, &["2", "004"]);
        assert_eq!(lines[0], INVALID_ACTION);
        assert_eq!(session.state(), ReportState::VerbalAbuse);
        assert_eq!(session.report().reason, None);
    }

    #[test]
    fn test_sub_reason_out_of_range_rejected() {
        let (dir, link) = fixture();
        let mut session = session();
        let lines = drive(&mut session, &dir, &["report", &link, "1", "4"]);
        assert_eq!(lines[0], INVALID_ACTION);
        assert_eq!(session.state(), ReportState::Fraud);
    }

    #[test]
    fn test_other_accepts_free_text() {
        let (dir, link) = fixture();
        let mut session = session();
        drive(&mut session, &dir, &["report", &link, "5"]);
        assert_eq!(session.state(), ReportState::Other);

        let lines = session.handle_message("   ", &dir);
        assert_eq!(lines[0], INVALID_ACTION);

        session.handle_message("it is spam about crypto", &dir);
        assert_eq!(session.state(), ReportState::BlockChoice);
        assert_eq!(
            session.report().reason,
            Some(ReportReason::Other("it is spam about crypto".to_string()))
        );
    }

    #[test]
    fn test_block_choice_rejects_other_input() {
        let (dir, link) = fixture();
        let mut session = session();
        drive(&mut session, &dir, &["report", &link, "3", "1"]);

        for answer in ["maybe", "YES", "y"] {
            let lines = session.handle_message(answer, &dir);
            assert_eq!(lines, vec![INVALID_ACTION.to_string()]);
            assert_eq!(session.state(), ReportState::BlockChoice);
        }

        session.handle_message("yes", &dir);
        assert!(session.report().block_author);
        assert!(session.is_complete());
    }

    #[test]
    fn test_cancel_mid_flow() {
        let (dir, link) = fixture();
        let mut session = session();
        let lines = drive(&mut session, &dir, &["report", &link, "4", "cancel"]);
        assert_eq!(lines, vec![CANCELLED.to_string()]);
        assert!(session.is_complete());
        assert!(session.is_cancelled());
    }

    #[test]
    fn test_input_after_completion_is_ignored() {
        let (dir, _) = fixture();
        let mut session = session();
        drive(&mut session, &dir, &["report", "cancel"]);
        assert!(session.handle_message("report", &dir).is_empty());
        assert_eq!(session.state(), ReportState::Complete);
    }
}
