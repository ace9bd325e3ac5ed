//! The completion relay served over HTTP, backed by the real OpenAI client
//! and the fake upstream.

use domain_completion::{
    CompletionService, DONE_MARKER, OpenAiClient, OpenAiConfig, SseDecoder, SseFrame,
    handlers::router,
};
use futures::StreamExt;
use serde_json::{Value, json};
use test_utils::{FakeOpenAi, FakeOpenAiServer, TEST_API_KEY, TestServer};

async fn relay(upstream: &FakeOpenAiServer, api_key: &str) -> TestServer {
    let config = OpenAiConfig::new(api_key)
        .with_base_url(upstream.base_url())
        .with_available_models(vec!["gpt-4o".to_string()]);
    let service = CompletionService::new(OpenAiClient::new(config).unwrap());
    TestServer::spawn(router(service)).await
}

async fn read_frames(response: reqwest::Response) -> Vec<SseFrame> {
    let mut decoder = SseDecoder::new();
    let mut frames = Vec::new();
    let mut body = response.bytes_stream();
    while let Some(chunk) = body.next().await {
        frames.extend(decoder.push(&chunk.unwrap()));
    }
    frames.extend(decoder.finish());
    frames
}

#[tokio::test]
async fn test_refund_policy_batched() {
    let upstream = FakeOpenAi::new().spawn().await;
    let server = relay(&upstream, TEST_API_KEY).await;

    let response = reqwest::Client::new()
        .post(server.url_for("/openai-completion/"))
        .json(&json!({"user_prompt": "What is the refund policy?", "stream_response": false}))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), reqwest::StatusCode::OK);
    let envelope: Value = response.json().await.unwrap();
    assert_eq!(envelope["error"], "");
    let content = envelope["results"]["message"]["content"].as_str().unwrap();
    assert!(!content.is_empty());
    assert_eq!(content, upstream.reply());
}

#[tokio::test]
async fn test_refund_policy_streamed() {
    let upstream = FakeOpenAi::new().spawn().await;
    let server = relay(&upstream, TEST_API_KEY).await;

    let response = reqwest::Client::new()
        .post(server.url_for("/openai-completion/"))
        .json(&json!({"user_prompt": "What is the refund policy?", "stream_response": true}))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), reqwest::StatusCode::OK);
    let frames = read_frames(response).await;

    let done_at = frames
        .iter()
        .position(|f| f.data == DONE_MARKER)
        .expect("stream should end with the done marker");
    assert_eq!(done_at, frames.len() - 1, "nothing may follow the done marker");
    assert!(done_at >= 1, "at least one chunk precedes the done marker");

    let text: String = frames[..done_at]
        .iter()
        .map(|f| {
            let chunk: Value = serde_json::from_str(&f.data).unwrap();
            chunk["content"].as_str().unwrap().to_string()
        })
        .collect();
    assert_eq!(text, upstream.reply());
}

#[tokio::test]
async fn test_upstream_reset_becomes_error_event() {
    let upstream = FakeOpenAi::new().failing_after(2).spawn().await;
    let server = relay(&upstream, TEST_API_KEY).await;

    let response = reqwest::Client::new()
        .post(server.url_for("/openai-completion/"))
        .json(&json!({"user_prompt": "hi", "stream_response": true}))
        .send()
        .await
        .unwrap();

    let frames = read_frames(response).await;
    let last = frames.last().expect("at least the error event");
    assert!(last.is_error());
    assert!(frames.iter().all(|f| !f.is_done()));
}

#[tokio::test]
async fn test_check_openai_with_invalid_key() {
    let upstream = FakeOpenAi::new().spawn().await;
    let server = relay(&upstream, "sk-wrong").await;

    let envelope: Value = reqwest::get(server.url_for("/check-openai/"))
        .await
        .unwrap()
        .json()
        .await
        .unwrap();

    assert_eq!(envelope, json!({"results": false, "params": "", "error": ""}));
}

#[tokio::test]
async fn test_invalid_key_completion_is_401_envelope() {
    let upstream = FakeOpenAi::new().spawn().await;
    let server = relay(&upstream, "sk-wrong").await;

    let response = reqwest::Client::new()
        .post(server.url_for("/openai-completion/"))
        .json(&json!({"user_prompt": "hi"}))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), reqwest::StatusCode::UNAUTHORIZED);
    let envelope: Value = response.json().await.unwrap();
    assert_eq!(envelope["results"], Value::Null);
    assert_eq!(envelope["params"]["user_prompt"], "hi");
    assert!(!envelope["error"].as_str().unwrap().is_empty());
}

#[tokio::test]
async fn test_available_llms_lists_default_first() {
    let upstream = FakeOpenAi::new().spawn().await;
    let server = relay(&upstream, TEST_API_KEY).await;

    let envelope: Value = reqwest::get(server.url_for("/available-llms/"))
        .await
        .unwrap()
        .json()
        .await
        .unwrap();

    let results = envelope["results"].as_object().unwrap();
    assert_eq!(results.len(), 2);
    assert_eq!(results["gpt-4o-mini"]["is_default"], true);
    assert_eq!(results["gpt-4o"]["is_default"], false);
}
