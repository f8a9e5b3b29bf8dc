//! Non-streaming endpoints over real HTTP using wiremock.

use serde_json::json;
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use nlui_client::models::{LlmConfigUpdate, NewTarget};
use nlui_client::prelude::*;

fn test_token() -> String {
    "test-auth-token".to_string()
}

async fn client_for(server: &MockServer) -> NluiClient {
    NluiClient::new(ClientConfig::new(server.uri()).with_api_key(test_token()))
}

#[tokio::test]
async fn test_health_and_info() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/health"))
        .and(header("Authorization", format!("Bearer {}", test_token())))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"status": "ok", "tools": 12})))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/info"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"language": "en", "tools": 12})))
        .mount(&server)
        .await;

    let client = client_for(&server).await;
    let health = client.health().await.unwrap();
    assert!(health.is_ok());
    assert_eq!(health.tools, 12);
    assert_eq!(client.info().await.unwrap().language, "en");
}

#[tokio::test]
async fn test_stop_and_confirm() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/chat/stop"))
        .and(body_json(json!({"session_id": "s-1"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"message": "chat stopped"})))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/chat/confirm"))
        .and(body_json(json!({"session_id": "s-1", "approved": false})))
        .respond_with(
            ResponseTemplate::new(409).set_body_json(json!({"error": "no pending confirmation"})),
        )
        .mount(&server)
        .await;

    let client = client_for(&server).await;
    assert_eq!(client.stop_chat("s-1").await.unwrap().message, "chat stopped");

    let err = client.confirm_tool("s-1", false).await.unwrap_err();
    assert_eq!(err.status(), Some(409));
    assert!(!err.is_retryable());
}

#[tokio::test]
async fn test_conversation_crud() {
    let server = MockServer::start().await;
    let conversation = json!({
        "id": "c-1",
        "title": "Pets",
        "messages": [{"role": "user", "content": "list pets"}],
        "created_at": "2026-03-01T10:00:00Z",
        "updated_at": "2026-03-01T10:00:05Z"
    });

    Mock::given(method("POST"))
        .and(path("/api/conversations"))
        .and(body_json(json!({"title": "Pets"})))
        .respond_with(ResponseTemplate::new(201).set_body_json(conversation.clone()))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/conversations"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([conversation.clone()])))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/conversations/c-1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(conversation))
        .mount(&server)
        .await;
    Mock::given(method("DELETE"))
        .and(path("/api/conversations/c-1"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server).await;
    let created = client.create_conversation("Pets").await.unwrap();
    assert_eq!(created.id, "c-1");
    assert_eq!(client.list_conversations().await.unwrap().len(), 1);
    assert_eq!(client.get_conversation("c-1").await.unwrap().messages.len(), 1);
    client.delete_conversation("c-1").await.unwrap();
}

#[tokio::test]
async fn test_get_missing_conversation() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/conversations/nope"))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({"error": "not found"})))
        .mount(&server)
        .await;

    let err = client_for(&server)
        .await
        .get_conversation("nope")
        .await
        .unwrap_err();
    match err {
        ClientError::Status { status, message } => {
            assert_eq!(status, 404);
            assert_eq!(message, "not found");
        }
        other => panic!("unexpected: {:?}", other),
    }
}

#[tokio::test]
async fn test_message_deletion() {
    let server = MockServer::start().await;
    Mock::given(method("DELETE"))
        .and(path("/api/conversations/c-1/messages/3"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"message": "message deleted"})))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("DELETE"))
        .and(path("/api/conversations/c-1/messages/2/from"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"message": "messages deleted"})))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server).await;
    assert_eq!(
        client.delete_message("c-1", 3).await.unwrap().message,
        "message deleted"
    );
    assert_eq!(
        client.delete_messages_from("c-1", 2).await.unwrap().message,
        "messages deleted"
    );
}

#[tokio::test]
async fn test_targets() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/targets"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([{
            "name": "petstore",
            "base_url": "https://petstore3.swagger.io/api/v3",
            "spec": "https://petstore3.swagger.io/api/v3/openapi.json",
            "auth_type": "",
            "has_token": false,
            "description": "Pets",
            "tools": 19
        }])))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/targets"))
        .and(body_json(json!({
            "name": "github",
            "base_url": "https://api.github.com",
            "auth_type": "bearer",
            "auth_token": "ghp_test"
        })))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({
            "message": "target added", "name": "github", "tools": 40
        })))
        .mount(&server)
        .await;
    Mock::given(method("DELETE"))
        .and(path("/api/targets/my%20api"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "message": "target removed", "tools": 19
        })))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/targets/probe"))
        .and(body_json(json!({"base_url": "http://localhost:8080"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "found": true,
            "spec_url": "http://localhost:8080/openapi.json",
            "tools": 4,
            "endpoints": ["GET /pets"]
        })))
        .mount(&server)
        .await;

    let client = client_for(&server).await;
    let targets = client.list_targets().await.unwrap();
    assert_eq!(targets[0].tool_count, 19);

    let added = client
        .add_target(&NewTarget::new("github", "https://api.github.com").with_bearer_token("ghp_test"))
        .await
        .unwrap();
    assert_eq!(added.tools, 40);

    let removed = client.remove_target("my api").await.unwrap();
    assert_eq!(removed.message, "target removed");

    let probe = client.probe_target("http://localhost:8080").await.unwrap();
    assert!(probe.found);
    assert_eq!(probe.endpoints, vec!["GET /pets"]);
}

#[tokio::test]
async fn test_tools_and_conversation_tool_config() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/tools"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([{
            "name": "petstore__list_pets",
            "description": "List pets",
            "parameters": {"type": "object", "properties": {}}
        }])))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/tools/sources"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([{
            "name": "petstore",
            "tools": [{"name": "petstore__list_pets", "description": "List pets"}]
        }])))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/conversations/c-1/tools"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "enabled_sources": ["petstore"], "disabled_tools": []
        })))
        .mount(&server)
        .await;
    Mock::given(method("PUT"))
        .and(path("/api/conversations/c-1/tools"))
        .and(body_json(json!({
            "enabled_sources": ["petstore"],
            "disabled_tools": ["petstore__delete_pet"]
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "message": "tool configuration updated"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server).await;
    assert_eq!(client.list_tools().await.unwrap()[0].name, "petstore__list_pets");
    assert_eq!(client.list_tool_sources().await.unwrap()[0].tools.len(), 1);

    let mut config = client.conversation_tools("c-1").await.unwrap();
    assert_eq!(config.enabled_sources, vec!["petstore"]);
    config.disabled_tools.push("petstore__delete_pet".to_string());
    client.update_conversation_tools("c-1", &config).await.unwrap();
}

#[tokio::test]
async fn test_llm_configuration() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/config/llm"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "api_base": "https://api.openai.com/v1",
            "api_key": "sk-a...wxyz",
            "model": "gpt-4o",
            "stream": true,
            "language": "en"
        })))
        .mount(&server)
        .await;
    Mock::given(method("PUT"))
        .and(path("/api/config/llm"))
        .and(body_json(json!({
            "api_base": "http://localhost:11434/v1",
            "api_key": "",
            "model": "qwen2.5"
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "message": "LLM configuration updated"
        })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/config/llm/providers"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {"name": "Ollama", "api_base": "http://localhost:11434/v1", "models": ["qwen2.5"]}
        ])))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/config/llm/models"))
        .and(body_json(json!({"api_base": "http://localhost:11434/v1"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!(["qwen2.5", "llama3"])))
        .mount(&server)
        .await;

    let client = client_for(&server).await;
    assert_eq!(client.llm_config().await.unwrap().model, "gpt-4o");
    client
        .update_llm_config(&LlmConfigUpdate {
            api_base: "http://localhost:11434/v1".to_string(),
            api_key: String::new(),
            model: "qwen2.5".to_string(),
        })
        .await
        .unwrap();
    assert_eq!(client.llm_providers().await.unwrap()[0].name, "Ollama");
    assert_eq!(
        client
            .fetch_models("http://localhost:11434/v1", None)
            .await
            .unwrap(),
        vec!["qwen2.5", "llama3"]
    );
}

#[tokio::test]
async fn test_proxy_configuration() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/config/proxy"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"proxy": ""})))
        .mount(&server)
        .await;
    Mock::given(method("PUT"))
        .and(path("/api/config/proxy"))
        .and(body_json(json!({"proxy": "http://127.0.0.1:7890"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "message": "proxy configuration updated"
        })))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/config/proxy/test"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"status": "ok"})))
        .mount(&server)
        .await;

    let client = client_for(&server).await;
    assert_eq!(client.proxy_config().await.unwrap().proxy, "");
    client.update_proxy_config("http://127.0.0.1:7890").await.unwrap();
    assert!(client.test_proxy("http://127.0.0.1:7890").await.unwrap().is_ok());
}

#[tokio::test]
async fn test_connection_refused_is_transport_error() {
    let client = NluiClient::new(ClientConfig::new("http://127.0.0.1:1"));
    let err = client.health().await.unwrap_err();
    assert!(matches!(err, ClientError::Transport(_)), "got {:?}", err);
    assert!(err.is_retryable());
}
