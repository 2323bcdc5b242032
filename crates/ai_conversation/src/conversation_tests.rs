use assert_matches::assert_matches;
use pretty_assertions::assert_eq;
use proptest::prelude::*;

use super::*;
use crate::turn::Role;

fn streaming() -> Conversation {
    let mut conversation = Conversation::new();
    conversation.append_user_turn("Build a counter").unwrap();
    conversation.begin_assistant_turn().unwrap();
    conversation
}

#[test]
fn appends_content_in_order() {
    let mut conversation = streaming();

    for fragment in ["Here", " is", " a counter"] {
        let applied = conversation.apply_delta(&Delta::content(fragment)).unwrap();
        assert_eq!(applied, Applied::Content);
    }

    assert!(conversation.end_turn());

    let last = conversation.last().unwrap();
    assert_eq!(last.content(), "Here is a counter");
    assert_eq!(last.role(), Role::Assistant);
    assert!(!last.is_in_progress());
}

#[test]
fn blank_user_turn_is_ignored() {
    let mut conversation = Conversation::new();

    assert!(!conversation.append_user_turn("").unwrap());
    assert!(!conversation.append_user_turn("  \n\t").unwrap());
    assert!(conversation.is_empty());
    assert_eq!(conversation.version(), 0);
}

#[test]
fn error_delta_replaces_content_and_ends_turn() {
    let mut conversation = streaming();
    conversation.apply_delta(&Delta::content("partial")).unwrap();

    let applied = conversation
        .apply_delta(&Delta::error("rate limited"))
        .unwrap();

    assert_eq!(applied, Applied::Error);
    assert_eq!(conversation.last().unwrap().content(), "rate limited");
    assert!(!conversation.is_streaming());

    // The turn is over, nothing may be appended anymore.
    assert_matches!(
        conversation.apply_delta(&Delta::content("late")),
        Err(Error::NoActiveTurn)
    );
    assert_eq!(conversation.last().unwrap().content(), "rate limited");
}

#[test]
fn heartbeat_does_not_bump_version() {
    let mut conversation = streaming();
    let version = conversation.version();

    assert_eq!(
        conversation.apply_delta(&Delta::Heartbeat).unwrap(),
        Applied::Ignored
    );
    assert_eq!(
        conversation
            .apply_delta(&Delta::Content(String::new()))
            .unwrap(),
        Applied::Ignored
    );
    assert_eq!(conversation.version(), version);
}

#[test]
fn apply_delta_without_active_turn_is_rejected() {
    let mut conversation = Conversation::new();
    assert_eq!(
        conversation.apply_delta(&Delta::content("x")).unwrap_err(),
        Error::NoActiveTurn
    );
}

#[test]
fn end_turn_is_idempotent() {
    let mut conversation = streaming();

    assert!(conversation.end_turn());
    let version = conversation.version();

    assert!(!conversation.end_turn());
    assert_eq!(conversation.version(), version);
}

#[test]
fn cannot_overlap_turns() {
    let mut conversation = streaming();

    assert_eq!(
        conversation.begin_assistant_turn().unwrap_err(),
        Error::TurnInProgress
    );
    assert_eq!(
        conversation.append_user_turn("again").unwrap_err(),
        Error::TurnInProgress
    );
    assert_eq!(conversation.len(), 2);
}

#[test]
fn replace_discards_previous_history() {
    let mut conversation = streaming();
    conversation.apply_delta(&Delta::content("old")).unwrap();
    conversation.end_turn();

    conversation
        .replace(vec![
            Turn::system("be brief"),
            Turn::user("hi"),
            Turn::assistant("hello"),
        ])
        .unwrap();

    let contents = conversation
        .turns()
        .iter()
        .map(Turn::content)
        .collect::<Vec<_>>();
    assert_eq!(contents, vec!["be brief", "hi", "hello"]);
}

#[test]
fn replace_is_rejected_while_streaming() {
    let mut conversation = streaming();
    let before = conversation.clone();

    assert_eq!(
        conversation.replace(vec![Turn::user("x")]).unwrap_err(),
        Error::TurnInProgress
    );
    assert_eq!(conversation, before);
}

#[test]
fn replace_rejects_in_progress_turns() {
    let snapshot = streaming().turns().to_vec();
    let mut conversation = Conversation::new();

    assert_eq!(
        conversation.replace(snapshot).unwrap_err(),
        Error::TurnInProgress
    );
    assert!(conversation.is_empty());
}

#[test]
fn system_prompt_seeds_conversation() {
    let conversation = Conversation::with_system("You write single page apps.");
    assert_eq!(conversation.len(), 1);
    assert_eq!(conversation.turns()[0].role(), Role::System);

    assert!(Conversation::with_system("   ").is_empty());
}

#[derive(Debug, Clone)]
enum Op {
    User(String),
    Begin,
    Delta(String),
    Fail(String),
    End,
}

fn op() -> impl Strategy<Value = Op> {
    prop_oneof![
        ".{0,8}".prop_map(Op::User),
        Just(Op::Begin),
        ".{0,8}".prop_map(Op::Delta),
        ".{0,8}".prop_map(Op::Fail),
        Just(Op::End),
    ]
}

proptest! {
    #[test]
    fn content_is_concatenation_of_fragments(fragments in prop::collection::vec(".{0,12}", 0..32)) {
        let mut conversation = streaming();
        let mut expected = String::new();

        for fragment in &fragments {
            let before = conversation.last().unwrap().content().to_owned();
            conversation.apply_delta(&Delta::content(fragment.clone())).unwrap();
            expected.push_str(fragment);

            let after = conversation.last().unwrap().content();
            prop_assert!(after.starts_with(&before));
            prop_assert_eq!(after, expected.as_str());
        }
    }

    #[test]
    fn at_most_one_turn_in_progress(ops in prop::collection::vec(op(), 0..64)) {
        let mut conversation = Conversation::new();

        for op in ops {
            // Errors are expected for out-of-order operations; the invariant
            // must hold either way.
            let _ = match op {
                Op::User(text) => conversation.append_user_turn(text).map(drop),
                Op::Begin => conversation.begin_assistant_turn(),
                Op::Delta(text) => conversation.apply_delta(&Delta::content(text)).map(drop),
                Op::Fail(text) => conversation.apply_delta(&Delta::error(text)).map(drop),
                Op::End => Ok(drop(conversation.end_turn())),
            };

            let active = conversation
                .turns()
                .iter()
                .filter(|turn| turn.is_in_progress())
                .count();
            prop_assert!(active <= 1);

            if active == 1 {
                prop_assert!(conversation.last().unwrap().is_in_progress());
            }
        }
    }
}
