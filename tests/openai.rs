//! Chat completion tests against a mock HTTP server

use mockito::Matcher;
use parley::config::LlmConfig;
use parley::{Error, OpenAiGenerator, ResponseGenerator};

fn generator(base_url: &str) -> OpenAiGenerator {
    OpenAiGenerator::new(LlmConfig::new("sk-test").with_base_url(base_url)).unwrap()
}

#[tokio::test]
async fn test_generate_returns_trimmed_first_choice() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("POST", "/chat/completions")
        .match_header("authorization", "Bearer sk-test")
        .match_body(Matcher::Json(serde_json::json!({
            "model": "gpt-4o-mini",
            "messages": [{"role": "user", "content": "Hello"}]
        })))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(
            r#"{
                "id": "chatcmpl-1",
                "object": "chat.completion",
                "choices": [
                    {"index": 0, "message": {"role": "assistant", "content": "  Hi there\n"}, "finish_reason": "stop"},
                    {"index": 1, "message": {"role": "assistant", "content": "second"}, "finish_reason": "stop"}
                ]
            }"#,
        )
        .create_async()
        .await;

    let reply = generator(&server.url()).generate("Hello").await.unwrap();

    mock.assert_async().await;
    assert_eq!(reply, "Hi there");
}

#[tokio::test]
async fn test_each_call_is_single_turn() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("POST", "/chat/completions")
        .match_body(Matcher::PartialJson(serde_json::json!({
            "messages": [{"role": "user", "content": "second question"}]
        })))
        .with_status(200)
        .with_body(r#"{"choices":[{"message":{"content":"answer"}}]}"#)
        .expect(1)
        .create_async()
        .await;
    let first = server
        .mock("POST", "/chat/completions")
        .match_body(Matcher::PartialJson(serde_json::json!({
            "messages": [{"role": "user", "content": "first question"}]
        })))
        .with_status(200)
        .with_body(r#"{"choices":[{"message":{"content":"answer"}}]}"#)
        .expect(1)
        .create_async()
        .await;

    let generator = generator(&server.url());
    generator.generate("first question").await.unwrap();
    generator.generate("second question").await.unwrap();

    first.assert_async().await;
    mock.assert_async().await;
}

#[tokio::test]
async fn test_api_error_is_llm_error() {
    let mut server = mockito::Server::new_async().await;
    let _mock = server
        .mock("POST", "/chat/completions")
        .with_status(429)
        .with_body(r#"{"error":{"message":"Rate limit reached"}}"#)
        .create_async()
        .await;

    let err = generator(&server.url()).generate("Hello").await.unwrap_err();
    match err {
        Error::Llm(msg) => {
            assert!(msg.contains("429"), "{msg}");
            assert!(msg.contains("Rate limit reached"), "{msg}");
        }
        other => panic!("expected LLM error, got {other:?}"),
    }
}

#[tokio::test]
async fn test_empty_choices_is_error() {
    let mut server = mockito::Server::new_async().await;
    let _mock = server
        .mock("POST", "/chat/completions")
        .with_status(200)
        .with_body(r#"{"choices":[]}"#)
        .create_async()
        .await;

    let result = generator(&server.url()).generate("Hello").await;
    assert!(matches!(result, Err(Error::Llm(_))));
}

#[tokio::test]
async fn test_null_content_is_error() {
    let mut server = mockito::Server::new_async().await;
    let _mock = server
        .mock("POST", "/chat/completions")
        .with_status(200)
        .with_body(r#"{"choices":[{"message":{"role":"assistant","content":null}}]}"#)
        .create_async()
        .await;

    let result = generator(&server.url()).generate("Hello").await;
    assert!(matches!(result, Err(Error::Llm(_))));
}

#[test]
fn test_missing_key_fails_before_any_request() {
    let result = OpenAiGenerator::new(LlmConfig::new("  "));
    let err = result.err().unwrap();
    assert!(err.to_string().contains("OPENAI_API_KEY"));
}
