use ai_conversation::Delta;
use ai_preview::Preview;
use pretty_assertions::assert_eq;
use proptest::prelude::*;

use super::*;

const REPLY: &str = "Try this:\n```html\n<p>hi</p>\n```";

fn conversation() -> Conversation {
    let mut conversation = Conversation::new();
    conversation.append_user_turn("Build a page").unwrap();
    conversation.begin_assistant_turn().unwrap();
    conversation
}

#[test]
fn loading_entry_before_first_delta() {
    let tree = Projector::new().project(&conversation(), &RenderCache::new());

    assert_eq!(tree.entries.len(), 2);
    assert_eq!(tree.entries[0].role, Role::User);
    assert!(!tree.entries[0].in_progress);

    let last = tree.last().unwrap();
    assert_eq!(last.role, Role::Assistant);
    assert!(last.in_progress);
    assert!(last.loading);
    assert!(tree.is_streaming());
}

#[test]
fn streaming_entry_has_no_preview() {
    let mut conversation = conversation();
    let mut cache = RenderCache::new();
    conversation.apply_delta(&Delta::content(REPLY)).unwrap();

    // Even if the content happens to be cached, nothing is shown mid-stream.
    cache.resolve(REPLY);

    let last = Projector::new().project(&conversation, &cache).entries[1].clone();
    assert!(!last.loading);
    assert_eq!(last.preview, None);
}

#[test]
fn finalized_entry_shows_cached_preview() {
    let mut conversation = conversation();
    let mut cache = RenderCache::new();
    conversation.apply_delta(&Delta::content(REPLY)).unwrap();
    conversation.end_turn();
    let stats = cache.stats();

    let tree = Projector::new().project(&conversation, &cache);
    assert_eq!(tree.entries[1].preview, None);
    assert_eq!(cache.stats(), stats);

    cache.resolve(REPLY);
    let tree = Projector::new().project(&conversation, &cache);
    assert_eq!(
        tree.entries[1].preview.as_deref(),
        Some(&Preview::from_content(REPLY))
    );
}

#[test]
fn html_is_rendered_on_request() {
    let mut conversation = Conversation::new();
    conversation
        .replace(vec![ai_conversation::Turn::assistant("**bold** <script>x</script>")])
        .unwrap();

    let tree = Projector::new().project(&conversation, &RenderCache::new());
    assert_eq!(tree.entries[0].html, None);

    let tree = Projector::new()
        .with_html(true)
        .project(&conversation, &RenderCache::new());
    let html = tree.entries[0].html.as_deref().unwrap();

    assert!(html.contains("<strong>bold</strong>"), "{html}");
    assert!(!html.contains("<script>"), "{html}");
}

#[test]
fn tree_tracks_conversation_version() {
    let mut conversation = conversation();
    let cache = RenderCache::new();
    let before = Projector::new().project(&conversation, &cache);

    conversation.apply_delta(&Delta::content("a")).unwrap();
    let after = Projector::new().project(&conversation, &cache);

    assert!(after.version > before.version);
    assert_ne!(before, after);
}

proptest! {
    #[test]
    fn projection_is_idempotent(fragments in prop::collection::vec(".{0,12}", 0..12), end in any::<bool>()) {
        let mut conversation = conversation();
        let mut cache = RenderCache::new();
        for fragment in &fragments {
            conversation.apply_delta(&Delta::content(fragment.as_str())).unwrap();
        }
        if end {
            conversation.end_turn();
            cache.resolve(conversation.turns()[1].content());
        }

        let projector = Projector::new().with_html(true);
        let stats = cache.stats();

        prop_assert_eq!(
            projector.project(&conversation, &cache),
            projector.project(&conversation, &cache)
        );
        prop_assert_eq!(cache.stats(), stats);
    }
}
