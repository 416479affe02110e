//! End-to-end report and review flows through the dispatcher.

#![allow(clippy::unwrap_used)]

use std::collections::BTreeMap;

use modbot_core::{
    Actor, Backend, Category, ChannelId, Dispatch, Dispatcher, GuildId, MessageDirectory,
    ModerationEvent, ReportState, ReporterId, Tier, UserId,
};

const GUILD: GuildId = GuildId(1_000);
const GENERAL: ChannelId = ChannelId(2_000);

struct World {
    dispatcher: Dispatcher,
    directory: MessageDirectory,
    reporter: Actor,
    moderator: Actor,
}

impl World {
    fn new() -> Self {
        let mut directory = MessageDirectory::new();
        directory.add_guild(GUILD);
        directory.add_channel(GUILD, GENERAL, "general");
        Self {
            dispatcher: Dispatcher::new(),
            directory,
            reporter: Actor::new(UserId(7), "alice"),
            moderator: Actor::new(UserId(900), "mod"),
        }
    }

    fn post(&mut self, content: &str) -> String {
        self.directory
            .post(GUILD, GENERAL, Actor::new(UserId(66), "mallory"), content)
            .unwrap()
            .link
            .to_url()
    }

    fn dm(&mut self, text: &str) -> Dispatch {
        self.dispatcher
            .handle_direct_message(&self.reporter, text, &self.directory)
    }

    fn review(&mut self, text: &str) -> Dispatch {
        self.dispatcher.handle_review_message(&self.moderator, text)
    }

    fn file(&mut self, link: &str, answers: &[&str]) {
        self.dm("report");
        self.dm(link);
        for answer in answers {
            self.dm(answer);
        }
    }
}

#[test]
fn test_verbal_abuse_report_is_filed() {
    let mut world = World::new();
    let link = world.post("they deserved it");

    let greeting = world.dm("report");
    assert!(greeting.lines[0].starts_with("Thank you for starting the reporting process."));

    let found = world.dm(&link);
    assert_eq!(found.lines[0], "I found this message:");
    assert_eq!(found.lines[1], "```mallory: they deserved it```");

    world.dm("2");
    let session = world.dispatcher.report_session(UserId(7)).unwrap();
    assert_eq!(session.state(), ReportState::VerbalAbuse);

    world.dm("4");
    let session = world.dispatcher.report_session(UserId(7)).unwrap();
    assert_eq!(session.state(), ReportState::BlockChoice);
    assert_eq!(
        session.category_flags().as_array(),
        [false, true, false, false, false]
    );
    assert!(!session.is_cancelled());

    let closed = world.dm("yes");
    assert_eq!(closed.lines, vec!["Done. Report Closed.".to_string()]);
    assert!(world.dispatcher.report_session(UserId(7)).is_none());
    assert_eq!(world.dispatcher.queue().len(), 1);

    let queued = world
        .dispatcher
        .queue()
        .peek_by_category(Category::VerbalAbuse.index())
        .unwrap()
        .1;
    assert!(queued.block_author);
    assert!(!queued.cancelled);
}

#[test]
fn test_incitement_review_bans_and_updates_trust() {
    let mut world = World::new();
    let link = world.post("go hurt them");
    world.file(&link, &["2", "4", "no"]);

    world.review("review");
    world.review("1");
    let pulled = world.review("2");
    assert!(pulled.lines.contains(&"Below is the reported content:".to_string()));

    world.review("4");
    let done = world.review("no");
    assert_eq!(
        done.lines,
        vec![
            Tier::Ban.outcome_text().to_string(),
            "Done. Review complete.".to_string()
        ]
    );
    assert!(matches!(
        done.events.as_slice(),
        [ModerationEvent::ReviewCompleted {
            tier: Tier::Ban,
            ..
        }]
    ));

    let reporter = ReporterId::User(UserId(7));
    let record = world.dispatcher.trust().record(reporter);
    assert_eq!(record.total_confirmed, 1);
    assert_eq!(record.accurate_count, 1);
    assert!((world.dispatcher.trust().percentage(reporter).unwrap() - 100.0).abs() < f64::EPSILON);
}

#[test]
fn test_empty_category_cannot_review() {
    let mut world = World::new();
    let link = world.post("buy my coin");
    world.file(&link, &["1", "2", "no"]);

    world.review("review");
    world.review("1");
    let reply = world.review("3");
    assert_eq!(
        reply.lines,
        vec!["No available unreviewed reports or reports in progress.".to_string()]
    );
    assert!(reply.events.is_empty());
    assert_eq!(world.dispatcher.queue().len(), 1);
    assert!(world.dispatcher.review_session(UserId(900)).is_none());
}

#[test]
fn test_report_leaves_queue_only_after_review() {
    let mut world = World::new();
    let link = world.post("send me your password");
    world.file(&link, &["1", "1", "no"]);

    let queue = world.dispatcher.queue();
    assert!(queue.peek_by_category(0).is_some());

    world.review("review");
    world.review("1");
    world.review("1");
    world.review("cancel");
    assert!(world.dispatcher.queue().peek_by_category(0).is_some());

    world.review("review");
    world.review("1");
    world.review("1");
    world.review("2");
    assert!(world.dispatcher.queue().peek_by_category(0).is_none());
    assert!(world.dispatcher.queue().is_empty());
}

#[test]
fn test_no_action_counts_against_trust() {
    let mut world = World::new();
    let link = world.post("i disagree with you");
    world.file(&link, &["5", "rude", "no"]);

    for text in ["review", "1", "5", "no", "no"] {
        world.review(text);
    }

    let reporter = ReporterId::User(UserId(7));
    let record = world.dispatcher.trust().record(reporter);
    assert_eq!((record.total_filed, record.total_confirmed, record.accurate_count), (1, 1, 0));
    assert!(world.dispatcher.trust().percentage(reporter).unwrap().abs() < f64::EPSILON);
}

#[test]
fn test_two_moderators_do_not_share_a_report() {
    let mut world = World::new();
    let link = world.post("scam");
    world.file(&link, &["1", "2", "no"]);

    let other = Actor::new(UserId(901), "other mod");
    world.review("review");
    world.review("1");
    world.review("1");

    world.dispatcher.handle_review_message(&other, "review");
    world.dispatcher.handle_review_message(&other, "1");
    let reply = world.dispatcher.handle_review_message(&other, "1");
    assert_eq!(
        reply.lines,
        vec!["No available unreviewed reports or reports in progress.".to_string()]
    );

    let done = world.review("1");
    assert_eq!(done.lines.last().unwrap(), "Done. Review complete.");
    assert!(world.dispatcher.queue().is_empty());
}

#[test]
fn test_automatic_report_review() {
    let mut world = World::new();
    let message = world
        .directory
        .post(GUILD, GENERAL, Actor::new(UserId(66), "mallory"), "awful slur")
        .unwrap();
    world
        .dispatcher
        .file_automatic_report(message, BTreeMap::from([(Backend::Perspective, 0.97)]));

    assert!(world.dispatcher.queue().peek_by_category(1).is_none());

    world.review("review");
    world.review("1");
    let pulled = world.review("6");
    assert!(
        pulled
            .lines
            .contains(&"Google Perspective abuse probability: 0.97".to_string())
    );

    for text in ["2", "5", "no", "yes"] {
        world.review(text);
    }

    let record = world.dispatcher.trust().record(ReporterId::Automatic);
    assert_eq!((record.total_filed, record.total_confirmed, record.accurate_count), (1, 1, 1));
    assert!(world.dispatcher.queue().is_empty());
}
