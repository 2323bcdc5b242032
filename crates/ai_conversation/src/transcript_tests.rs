use assert_matches::assert_matches;
use indoc::indoc;
use pretty_assertions::assert_eq;

use super::*;
use crate::{Delta, Role};

#[test]
fn export_is_role_content_pairs() {
    let mut conversation = Conversation::with_system("sys");
    conversation.append_user_turn("Build a counter").unwrap();
    conversation.begin_assistant_turn().unwrap();
    conversation.apply_delta(&Delta::content("Done")).unwrap();
    conversation.end_turn();

    let json = to_json(&conversation).unwrap();
    assert_eq!(json, indoc! {r#"
        [
          {
            "role": "system",
            "content": "sys"
          },
          {
            "role": "user",
            "content": "Build a counter"
          },
          {
            "role": "assistant",
            "content": "Done"
          }
        ]"#});
}

#[test]
fn export_skips_streaming_turn() {
    let mut conversation = Conversation::new();
    conversation.append_user_turn("hi").unwrap();
    conversation.begin_assistant_turn().unwrap();
    conversation.apply_delta(&Delta::content("par")).unwrap();

    let turns = from_json(&to_json(&conversation).unwrap()).unwrap();
    assert_eq!(turns, vec![Turn::user("hi")]);
}

#[test]
fn import_parses_turns_as_ended() {
    let turns = from_json(
        r#"[{"role":"user","content":"a"},{"role":"assistant","content":"b"}]"#,
    )
    .unwrap();

    assert_eq!(turns.len(), 2);
    assert_eq!(turns[1].role(), Role::Assistant);
    assert!(turns.iter().all(|turn| !turn.is_in_progress()));
}

#[test]
fn import_rejects_unknown_fields() {
    assert_matches!(
        from_json(r#"[{"role":"user","content":"a","in_progress":true}]"#),
        Err(Error::Transcript(_))
    );
}

#[test]
fn import_rejects_unknown_roles_and_non_string_content() {
    assert_matches!(
        from_json(r#"[{"role":"tool","content":"a"}]"#),
        Err(Error::Transcript(_))
    );
    assert_matches!(
        from_json(r#"[{"role":"user","content":{"eval":"alert(1)"}}]"#),
        Err(Error::Transcript(_))
    );
}

#[test]
fn import_rejects_script_text() {
    assert_matches!(
        from_json("export default [{role: 'user', content: 'x'}]"),
        Err(Error::Transcript(_))
    );
}

#[test]
fn save_and_load_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("nested/chat.json");

    let mut conversation = Conversation::new();
    conversation.append_user_turn("hello").unwrap();
    save(&conversation, &path).unwrap();

    assert_eq!(load(&path).unwrap(), vec![Turn::user("hello")]);
}

#[test]
fn load_missing_file_is_io_error() {
    let dir = tempfile::tempdir().unwrap();
    assert_matches!(load(dir.path().join("missing.json")), Err(Error::Io(_)));
}
