use std::sync::Arc;

use indoc::indoc;
use pretty_assertions::assert_eq;

use super::*;

fn entry(index: usize, role: Role, markdown: &str, in_progress: bool) -> Entry {
    Entry {
        index,
        role,
        markdown: markdown.to_owned(),
        html: None,
        in_progress,
        loading: in_progress && markdown.is_empty(),
        preview: None,
    }
}

fn tree(entries: Vec<Entry>) -> ViewTree {
    ViewTree {
        version: 0,
        entries,
    }
}

fn output(trees: &[ViewTree]) -> String {
    let mut renderer = TerminalRenderer::new(vec![]).with_color(false);
    for tree in trees {
        renderer.render(tree).unwrap();
    }

    String::from_utf8(renderer.into_inner()).unwrap()
}

#[test]
fn streaming_writes_only_suffixes() {
    let user = entry(0, Role::User, "Build a page", false);
    let trees = [
        tree(vec![user.clone(), entry(1, Role::Assistant, "", true)]),
        tree(vec![user.clone(), entry(1, Role::Assistant, "Hel", true)]),
        tree(vec![user.clone(), entry(1, Role::Assistant, "Hello", true)]),
        tree(vec![user, entry(1, Role::Assistant, "Hello", false)]),
    ];

    assert_eq!(output(&trees), indoc! {"
        ## you
        Build a page

        ## assistant
        Hello
    "});
}

#[test]
fn rendering_same_tree_twice_writes_nothing_new() {
    let tree = tree(vec![entry(0, Role::User, "hi", false)]);

    assert_eq!(output(&[tree.clone()]), output(&[tree.clone(), tree]));
}

#[test]
fn replaced_content_is_rewritten() {
    let user = entry(0, Role::User, "q", false);
    let trees = [
        tree(vec![user.clone(), entry(1, Role::Assistant, "partial", true)]),
        tree(vec![user, entry(1, Role::Assistant, "overloaded", false)]),
    ];

    assert_eq!(output(&trees), indoc! {"
        ## you
        q

        ## assistant
        partial
        ---

        ## assistant
        overloaded
    "});
}

#[test]
fn preview_note_after_finalized_entry() {
    let mut reply = entry(0, Role::Assistant, "```js\na();\nb();\n```", false);
    reply.preview = Some(Arc::new(Preview::from_content(&reply.markdown)));

    assert_eq!(output(&[tree(vec![reply])]), indoc! {"
        ## assistant
        ```js
        a();
        b();
        ```
        [preview: js, 2 lines]
    "});
}

#[test]
fn recorder_keeps_every_tree() {
    let mut recorder = Recorder::new();
    let first = tree(vec![]);
    let second = tree(vec![entry(0, Role::User, "hi", false)]);

    recorder.render(&first).unwrap();
    recorder.render(&second).unwrap();

    assert_eq!(recorder.trees, vec![first, second.clone()]);
    assert_eq!(recorder.last(), Some(&second));
}
