use super::*;

use futures::{stream, StreamExt};
use serde_json::json;
use wiremock::matchers::{body_partial_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use crate::engine::FinishReason;

fn request(timeout: Duration) -> CompletionRequest {
    CompletionRequest {
        prompt: "### Отзывы".to_owned(),
        stop_sequences: vec!["}".to_owned()],
        max_tokens: 4096,
        temperature: 0.1,
        frequency_penalty: 0.5,
        timeout,
    }
}

fn sse(events: &[serde_json::Value]) -> String {
    events
        .iter()
        .map(|e| format!("data: {e}\n\n"))
        .collect()
}

async fn collect(parts: Vec<&'static [u8]>) -> Vec<Result<String, EngineError>> {
    let bytes = stream::iter(
        parts
            .into_iter()
            .map(|p| Ok::<_, reqwest::Error>(Bytes::from_static(p))),
    );
    SseTextStream::new(bytes).collect().await
}

#[test]
fn parse_line_reads_content() {
    match parse_line(br#"data: {"content":"Hello","stop":false}"#) {
        Line::Text { text, last } => {
            assert_eq!(text, "Hello");
            assert!(!last);
        }
        _ => panic!("expected text"),
    }
}

#[test]
fn parse_line_restores_server_side_stop_word() {
    match parse_line(br#"data: {"content":"]","stop":true,"stopping_word":"}"}"#) {
        Line::Text { text, last } => {
            assert_eq!(text, "]}");
            assert!(last);
        }
        _ => panic!("expected text"),
    }
}

#[test]
fn parse_line_skips_blank_and_comment_lines() {
    assert!(matches!(parse_line(b"\n"), Line::Skip));
    assert!(matches!(parse_line(b": keep-alive\n"), Line::Skip));
}

#[test]
fn parse_line_surfaces_error_events_and_garbage() {
    assert!(matches!(
        parse_line(br#"error: {"code":500,"message":"context overflow"}"#),
        Line::Error(EngineError::Stream(msg)) if msg.contains("context overflow")
    ));
    assert!(matches!(
        parse_line(b"data: {not json"),
        Line::Error(EngineError::Stream(_))
    ));
}

#[tokio::test]
async fn sse_stream_reassembles_utf8_split_across_reads() {
    let line = "data: {\"content\":\"Да\",\"stop\":false}\n\n".as_bytes();
    // Split inside the two-byte "Д".
    let split = line.iter().position(|b| *b == 0xD0).unwrap() + 1;
    let (first, second) = line.split_at(split);

    let items = collect(vec![first, second]).await;

    assert_eq!(items.len(), 1);
    assert_eq!(items[0].as_ref().unwrap(), "Да");
}

#[tokio::test]
async fn sse_stream_ends_after_stop_event_and_flushes_unterminated_tail() {
    let items = collect(vec![
        &b"data: {\"content\":\"a\"}\n\ndata: {\"content\":\"b\",\"stop\":true}\n\ndata: {\"content\":\"ignored\"}\n"[..],
    ])
    .await;
    let texts: Vec<String> = items.into_iter().map(Result::unwrap).collect();
    assert_eq!(texts, vec!["a", "b"]);

    let items = collect(vec![&b"data: {\"content\":\"tail\"}"[..]]).await;
    assert_eq!(items.len(), 1);
    assert_eq!(items[0].as_ref().unwrap(), "tail");
}

#[tokio::test]
async fn complete_streams_until_stop_sequence() {
    let server = MockServer::start().await;
    let body = sse(&[
        json!({"content": "{\"overallSentiment\": \"Положительные\"", "stop": false}),
        json!({"content": "", "stop": true, "stopping_word": "}"}),
    ]);
    Mock::given(method("POST"))
        .and(path("/completion"))
        .and(body_partial_json(json!({
            "stream": true,
            "seed": 1337,
            "n_predict": 4096,
            "stop": ["}"],
        })))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("content-type", "text/event-stream")
                .set_body_string(body),
        )
        .expect(1)
        .mount(&server)
        .await;

    let engine = LlamaServerEngine::new(&server.uri()).unwrap();
    let completion = engine.complete(&request(Duration::from_secs(5))).await.unwrap();

    assert_eq!(completion.text, "{\"overallSentiment\": \"Положительные\"}");
    assert_eq!(completion.finish, FinishReason::StopSequence);
}

#[tokio::test]
async fn complete_returns_empty_timeout_when_server_never_answers() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/completion"))
        .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_secs(10)))
        .mount(&server)
        .await;

    let engine = LlamaServerEngine::new(&server.uri()).unwrap();
    let completion = engine
        .complete(&request(Duration::from_millis(200)))
        .await
        .unwrap();

    assert_eq!(completion, Completion::timed_out(String::new()));
}

#[tokio::test]
async fn complete_maps_error_status() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(500).set_body_string("model crashed"))
        .mount(&server)
        .await;

    let engine = LlamaServerEngine::new(&server.uri()).unwrap();
    let err = engine
        .complete(&request(Duration::from_secs(5)))
        .await
        .unwrap_err();

    assert!(
        matches!(&err, EngineError::UnexpectedStatus { status: 500, body } if body == "model crashed"),
        "got: {err:?}"
    );
}

#[tokio::test]
async fn health_check_accepts_ready_server() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/health"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"status": "ok"})))
        .mount(&server)
        .await;

    let engine = LlamaServerEngine::new(&format!("{}/", server.uri())).unwrap();
    engine.health_check().await.unwrap();
}

#[tokio::test]
async fn health_check_rejects_loading_server() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/health"))
        .respond_with(ResponseTemplate::new(503).set_body_string("Loading model"))
        .mount(&server)
        .await;

    let engine = LlamaServerEngine::new(&server.uri()).unwrap();
    let err = engine.health_check().await.unwrap_err();

    assert!(
        matches!(&err, EngineError::Unhealthy { reason, .. } if reason.contains("Loading model")),
        "got: {err:?}"
    );
}
