//! Property tests for the reporting dialogue.

#![allow(clippy::unwrap_used)]

use proptest::prelude::*;

use modbot_core::{
    Actor, ChannelId, Dispatcher, GuildId, MessageDirectory, ReportId, ReportSession, ReportState,
    UserId,
};

const GUILD: GuildId = GuildId(1);
const CHANNEL: ChannelId = ChannelId(2);

fn directory() -> (MessageDirectory, String) {
    let mut directory = MessageDirectory::new();
    directory.add_guild(GUILD);
    directory.add_channel(GUILD, CHANNEL, "general");
    let link = directory
        .post(GUILD, CHANNEL, Actor::new(UserId(3), "mallory"), "text")
        .unwrap()
        .link
        .to_url();
    (directory, link)
}

/// Inputs that move a report forward, plus noise the dialogue must reject.
fn input() -> impl Strategy<Value = String> {
    prop_oneof![
        (1..=9u8).prop_map(|n| n.to_string()),
        Just("yes".to_string()),
        Just("no".to_string()),
        Just("0".to_string()),
        "[a-z ]{1,12}",
        Just("LINK".to_string()),
    ]
}

fn run(session: &mut ReportSession, directory: &MessageDirectory, link: &str, inputs: &[String]) {
    session.handle_message("report", directory);
    for input in inputs {
        if session.is_complete() {
            break;
        }
        let text = if input == "LINK" { link } else { input.as_str() };
        if text.trim().eq_ignore_ascii_case("cancel") {
            continue;
        }
        session.handle_message(text, directory);
    }
}

proptest! {
    #[test]
    fn test_cancel_from_any_reachable_state(inputs in prop::collection::vec(input(), 0..8)) {
        let (directory, link) = directory();
        let mut session = ReportSession::new(ReportId(1), &Actor::new(UserId(5), "alice"));
        run(&mut session, &directory, &link, &inputs);
        if !session.is_complete() {
            let lines = session.handle_message("cancel", &directory);
            prop_assert_eq!(lines, vec!["Report cancelled.".to_string()]);
            prop_assert_eq!(session.state(), ReportState::Complete);
            prop_assert!(session.is_cancelled());
        }
    }

    #[test]
    fn test_cancelled_reports_are_never_queued(inputs in prop::collection::vec(input(), 0..8)) {
        let (directory, link) = directory();
        let mut dispatcher = Dispatcher::new();
        let alice = Actor::new(UserId(5), "alice");

        dispatcher.handle_direct_message(&alice, "report", &directory);
        for input in &inputs {
            if dispatcher.report_session(alice.id).is_none() {
                break;
            }
            let text = if input == "LINK" { link.as_str() } else { input.as_str() };
            dispatcher.handle_direct_message(&alice, text, &directory);
        }
        let queued_before = dispatcher.queue().len();
        dispatcher.handle_direct_message(&alice, "cancel", &directory);
        prop_assert_eq!(dispatcher.queue().len(), queued_before);
    }

    #[test]
    fn test_block_choice_has_exactly_one_flag(inputs in prop::collection::vec(input(), 0..10)) {
        let (directory, link) = directory();
        let mut session = ReportSession::new(ReportId(1), &Actor::new(UserId(5), "alice"));
        session.handle_message("report", &directory);
        session.handle_message(&link, &directory);
        for input in &inputs {
            if session.state() == ReportState::BlockChoice {
                break;
            }
            session.handle_message(input, &directory);
        }
        if session.state() == ReportState::BlockChoice {
            prop_assert_eq!(session.category_flags().count(), 1);
            prop_assert!(session.report().reason.is_some());
        }
    }
}
