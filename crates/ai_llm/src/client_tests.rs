use pretty_assertions::assert_eq;

use super::*;

#[test]
fn parse_chunk_dialects() {
    let cases = [
        (
            "openai",
            r#"{"choices":[{"delta":{"content":"Hel"}}]}"#,
            Delta::content("Hel"),
        ),
        (
            "openai role-only chunk",
            r#"{"choices":[{"delta":{"role":"assistant"}}]}"#,
            Delta::Heartbeat,
        ),
        (
            "anthropic",
            r#"{"type":"content_block_delta","delta":{"type":"text_delta","text":"lo"}}"#,
            Delta::content("lo"),
        ),
        (
            "gemini",
            r#"{"candidates":[{"content":{"parts":[{"text":"a"},{"text":"b"}]}}]}"#,
            Delta::content("ab"),
        ),
        (
            "error object",
            r#"{"error":{"message":"overloaded"}}"#,
            Delta::error("overloaded"),
        ),
        ("error string", r#"{"error":"nope"}"#, Delta::error("nope")),
    ];

    for (name, data, expected) in cases {
        assert_eq!(parse_chunk(data), expected, "{name}");
    }
}

#[test]
fn parse_chunk_malformed() {
    let delta = parse_chunk("{not json");
    match delta {
        Delta::Error(message) => assert!(
            message.starts_with("Stream processing error: malformed frame:"),
            "{message}"
        ),
        other => panic!("expected error delta, got {other:?}"),
    }
}

#[test]
fn error_message_prefers_structured_body() {
    assert_eq!(
        error_message(r#"{"error":{"message":"bad key"}}"#),
        "bad key".to_owned()
    );
    assert_eq!(error_message("  plain failure\n"), "plain failure".to_owned());
}

#[test]
fn zero_idle_timeout_is_disabled() {
    let client = Client::new("http://localhost/".parse().unwrap())
        .with_idle_timeout(Some(Duration::ZERO));

    assert_eq!(client.idle_timeout, None);
}

#[test]
fn headers_include_token() {
    let client = Client::new("http://localhost/".parse().unwrap())
        .with_token(Token::new("abc").with_suffix(Some("s".to_owned())));

    let headers = client.build_headers().unwrap();
    assert_eq!(headers[AUTHORIZATION], "Bearer abc:s");
    assert_eq!(headers[CONTENT_TYPE], "application/json");
}
