use ai_conversation::Turn;
use ai_llm::mock::MockProvider;
use ai_view::Recorder;
use assert_matches::assert_matches;
use indoc::indoc;

use super::*;
use crate::controller::Settings;

const REPLY: &str = indoc! {"
    Here you go:

    ```html
    <p>hi</p>
    ```
"};

fn controller(provider: MockProvider) -> Controller<MockProvider, Recorder> {
    Controller::new(provider, Recorder::new(), Settings::default())
}

#[tokio::test]
async fn preview_of_streamed_reply() {
    let tmp = tempfile::tempdir().unwrap();
    let path = tmp.path().join("out").join("preview.html");
    let mut controller = controller(MockProvider::new().with_chunks(&[REPLY]));

    controller
        .submit("Say hi", CancellationToken::new())
        .await
        .unwrap();
    write_preview(&controller, &path).unwrap();

    let page = fs::read_to_string(&path).unwrap();
    assert!(page.starts_with("<!DOCTYPE html>"));
    assert!(page.contains(r#"<iframe class="preview""#));
    assert!(page.contains("&lt;p&gt;hi&lt;/p&gt;"));
}

#[test]
fn preview_of_loaded_reply() {
    let tmp = tempfile::tempdir().unwrap();
    let path = tmp.path().join("preview.html");
    let mut controller = controller(MockProvider::new());

    controller
        .load(vec![Turn::user("Say hi"), Turn::assistant(REPLY)])
        .unwrap();
    assert!(controller.cache().is_empty());

    write_preview(&controller, &path).unwrap();
    assert!(fs::read_to_string(&path).unwrap().contains("srcdoc="));
}

#[test]
fn no_preview_without_code() {
    let tmp = tempfile::tempdir().unwrap();
    let path = tmp.path().join("preview.html");
    let mut controller = controller(MockProvider::new());

    controller
        .load(vec![Turn::user("Hi"), Turn::assistant("Hello there.")])
        .unwrap();

    assert_matches!(write_preview(&controller, &path), Err(Error::NoPreview));
    assert!(!path.exists());
}

#[test]
fn no_preview_without_reply() {
    let tmp = tempfile::tempdir().unwrap();
    let controller = controller(MockProvider::new());

    assert_matches!(
        write_preview(&controller, &tmp.path().join("preview.html")),
        Err(Error::NoPreview)
    );
}

#[test]
fn conversation_page() {
    let tmp = tempfile::tempdir().unwrap();
    let path = tmp.path().join("chat.html");
    let mut controller = controller(MockProvider::new());

    controller
        .load(vec![Turn::user("Make it *bold*"), Turn::assistant(REPLY)])
        .unwrap();
    write_html(&controller, &path).unwrap();

    let page = fs::read_to_string(&path).unwrap();
    assert!(page.contains("<em>bold</em>"));
    assert!(page.contains(r#"class="turn user""#));
    assert!(page.contains(r#"class="turn assistant""#));
}

#[tokio::test]
async fn transcript_roundtrip() {
    let tmp = tempfile::tempdir().unwrap();
    let path = tmp.path().join("chat.json");
    let mut controller = controller(MockProvider::new().with_chunks(&["Hel", "lo"]));

    controller.submit("Hi", CancellationToken::new()).await.unwrap();
    save_transcript(&controller, &path).unwrap();

    let turns = transcript::load(&path).unwrap();
    assert_eq!(turns, vec![Turn::user("Hi"), Turn::assistant("Hello")]);
}

#[tokio::test]
async fn interruptible_returns_output() {
    let cancel = CancellationToken::new();
    let output = interruptible(async { 42 }, &cancel).await;

    assert_eq!(output, 42);
    assert!(!cancel.is_cancelled());
}
