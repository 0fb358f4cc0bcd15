use pilot_llm::ollama::OllamaClient;
use pilot_llm::traits::{ChatRequest, LlmClient};
use serde_json::json;
use wiremock::matchers::{body_partial_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

async fn mount_tags(server: &MockServer, names: &[&str]) {
    let models: Vec<_> = names.iter().map(|n| json!({ "name": n })).collect();
    Mock::given(method("GET"))
        .and(path("/api/tags"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "models": models })))
        .mount(server)
        .await;
}

#[tokio::test]
async fn existing_model_is_not_pulled() {
    let server = MockServer::start().await;
    mount_tags(&server, &["llama3.2:3b"]).await;
    Mock::given(method("POST"))
        .and(path("/api/pull"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "status": "success" })))
        .expect(0)
        .mount(&server)
        .await;

    let client = OllamaClient::new(&server.uri(), "llama3.2:3b".into())
        .await
        .unwrap();
    assert_eq!(client.model_name(), "llama3.2:3b");
}

#[tokio::test]
async fn missing_model_is_pulled_then_chat_works() {
    let server = MockServer::start().await;
    mount_tags(&server, &[]).await;
    Mock::given(method("POST"))
        .and(path("/api/pull"))
        .and(body_partial_json(json!({ "model": "qwen2.5", "stream": false })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "status": "success" })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/chat"))
        .and(body_partial_json(json!({
            "model": "qwen2.5",
            "stream": false,
            "messages": [
                { "role": "system", "content": "sys" },
                { "role": "user", "content": "hi" }
            ]
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "model": "qwen2.5",
            "message": { "role": "assistant", "content": "hello" },
            "done": true,
            "prompt_eval_count": 4,
            "eval_count": 2
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = OllamaClient::new(&server.uri(), "qwen2.5".into())
        .await
        .unwrap();
    let resp = client
        .chat(ChatRequest::new("hi").with_system_prompt("sys"))
        .await
        .unwrap();
    assert_eq!(resp.content, "hello");
    assert_eq!(resp.usage.map(|u| u.total_tokens), Some(6));
}

#[tokio::test]
async fn unreachable_server_reports_how_to_start_it() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/tags"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let err = OllamaClient::new(&server.uri(), "m".into())
        .await
        .err()
        .unwrap();
    assert!(err.to_string().contains("ollama serve"));
}

#[tokio::test]
async fn tag_listing_is_retried_while_the_server_warms_up() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/tags"))
        .respond_with(ResponseTemplate::new(503))
        .up_to_n_times(1)
        .expect(1)
        .mount(&server)
        .await;
    mount_tags(&server, &["m"]).await;

    let client = OllamaClient::new(&server.uri(), "m".into())
        .await
        .unwrap();
    assert_eq!(client.model_name(), "m");
}

#[tokio::test]
async fn chat_is_sent_once_even_on_server_errors() {
    let server = MockServer::start().await;
    mount_tags(&server, &["m"]).await;
    Mock::given(method("POST"))
        .and(path("/api/chat"))
        .respond_with(ResponseTemplate::new(500).set_body_json(json!({ "error": "model crashed" })))
        .expect(1)
        .mount(&server)
        .await;

    let client = OllamaClient::new(&server.uri(), "m".into())
        .await
        .unwrap();
    let err = client.chat(ChatRequest::new("hi")).await.unwrap_err();
    assert!(err.to_string().contains("model crashed"), "{err}");
}
