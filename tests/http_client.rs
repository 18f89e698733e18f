use serde_json::json;
use std::time::Duration;
use wiremock::matchers::{body_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use wearchat::{BackendClient, BackendGateway, ChannelDirectory, ChatSession, GatewayError, Role};

async fn client_for(server: &MockServer) -> BackendClient {
    BackendClient::new(&format!("{}/api/v1", server.uri()), Duration::from_secs(5)).unwrap()
}

#[tokio::test]
async fn list_channels_decodes_payload() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v1/channels/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "channels": [
                {"id": "a", "name": "General", "created_at": "2024-05-01T10:00:00", "message_count": 4},
                {"id": "b", "name": "Sleep", "message_count": 0}
            ]
        })))
        .mount(&server)
        .await;

    let channels = client_for(&server).await.list_channels().await.unwrap();

    assert_eq!(channels.len(), 2);
    assert_eq!(channels[0].id, "a");
    assert_eq!(channels[0].message_count, 4);
    assert_eq!(channels[1].name, "Sleep");
}

#[tokio::test]
async fn absent_or_null_arrays_decode_as_empty() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v1/channels/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/v1/chat/history/a"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"channel_id": "a", "messages": null})))
        .mount(&server)
        .await;

    let client = client_for(&server).await;

    assert!(client.list_channels().await.unwrap().is_empty());
    assert!(client.get_history("a").await.unwrap().is_empty());
}

#[tokio::test]
async fn create_channel_posts_name() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/v1/channels/"))
        .and(body_json(json!({"name": "Sleep"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": "b", "name": "Sleep", "created_at": "2024-05-01T10:00:00", "message_count": 0
        })))
        .expect(1)
        .mount(&server)
        .await;

    let channel = client_for(&server).await.create_channel("Sleep").await.unwrap();

    assert_eq!(channel.id, "b");
    assert_eq!(channel.created_at.as_deref(), Some("2024-05-01T10:00:00"));
}

#[tokio::test]
async fn send_chat_message_posts_channel_and_message() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/v1/chat/message"))
        .and(body_json(json!({"channel_id": "a", "message": "steps today?"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "message": {
                "id": "m2", "role": "assistant", "content": "120 steps",
                "timestamp": "2024-05-01T10:00:01.000001", "tool_calls": null
            },
            "tool_calls": [
                {"tool_name": "get_steps", "arguments": {"date": "today"}, "result": "120"}
            ]
        })))
        .mount(&server)
        .await;

    let reply = client_for(&server)
        .await
        .send_chat_message("a", "steps today?")
        .await
        .unwrap();

    assert_eq!(reply.message.role, Role::Assistant);
    assert_eq!(reply.message.content, "120 steps");
    assert_eq!(reply.tool_calls[0].tool_name, "get_steps");
}

#[tokio::test]
async fn delete_and_clear_accept_any_success_body() {
    let server = MockServer::start().await;
    Mock::given(method("DELETE"))
        .and(path("/api/v1/channels/a"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"message": "Channel deleted successfully"})))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("DELETE"))
        .and(path("/api/v1/chat/history/a"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server).await;

    client.delete_channel("a").await.unwrap();
    client.clear_history("a").await.unwrap();
}

#[tokio::test]
async fn get_channel_fetches_one_record() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v1/channels/b"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": "b", "name": "Sleep", "created_at": "2024-05-01T10:00:00", "message_count": 3
        })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/v1/channels/missing"))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({"detail": "Channel not found"})))
        .mount(&server)
        .await;

    let client = client_for(&server).await;
    let channel = client.get_channel("b").await.unwrap();
    let err = client.get_channel("missing").await.unwrap_err();

    assert_eq!(channel.name, "Sleep");
    assert_eq!(channel.message_count, 3);
    assert_eq!(err, GatewayError::rejected(404, "Channel not found"));
}

#[tokio::test]
async fn non_success_status_maps_to_rejected_with_detail() {
    let server = MockServer::start().await;
    Mock::given(method("DELETE"))
        .and(path("/api/v1/channels/missing"))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({"detail": "Channel not found"})))
        .mount(&server)
        .await;

    let err = client_for(&server)
        .await
        .delete_channel("missing")
        .await
        .unwrap_err();

    assert_eq!(err, GatewayError::rejected(404, "Channel not found"));
}

#[tokio::test]
async fn malformed_payload_maps_to_malformed() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/v1/chat/message"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>oops</html>"))
        .mount(&server)
        .await;

    let err = client_for(&server)
        .await
        .send_chat_message("a", "hello")
        .await
        .unwrap_err();

    assert!(matches!(err, GatewayError::Malformed(_)));
}

#[tokio::test]
async fn unreachable_backend_maps_to_network_failure() {
    let server = MockServer::start().await;
    let uri = server.uri();
    drop(server);

    let client = BackendClient::new(&format!("{}/api/v1", uri), Duration::from_secs(2)).unwrap();

    let err = client.list_channels().await.unwrap_err();
    assert!(matches!(err, GatewayError::Network(_)));
    assert!(!client.is_backend_reachable().await);
}

#[tokio::test]
async fn slow_backend_maps_to_network_failure() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v1/graph/"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"mermaid": "graph TD"}))
                .set_delay(Duration::from_secs(3)),
        )
        .mount(&server)
        .await;

    let client = BackendClient::new(&format!("{}/api/v1", server.uri()), Duration::from_millis(200)).unwrap();

    let err = client.get_graph().await.unwrap_err();
    assert!(matches!(err, GatewayError::Network(_)));
}

#[tokio::test]
async fn health_reports_agent_state() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v1/health"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "status": "healthy", "timestamp": "2024-05-01T10:00:00", "agent_initialized": true
        })))
        .mount(&server)
        .await;

    let client = client_for(&server).await;

    assert!(client.is_backend_reachable().await);
    let health = client.health().await.unwrap();
    assert_eq!(health.status, "healthy");
    assert!(health.agent_initialized);
}

#[tokio::test]
async fn managers_over_http() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v1/channels/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "channels": [{"id": "a", "name": "General", "message_count": 0}]
        })))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/api/v1/chat/message"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "message": {"id": "m2", "role": "assistant", "content": "120 steps"},
            "tool_calls": []
        })))
        .mount(&server)
        .await;

    let gateway = std::sync::Arc::new(client_for(&server).await);
    let mut directory = ChannelDirectory::new(gateway.clone());
    let mut session = ChatSession::new(gateway);

    directory.refresh().await;
    assert_eq!(directory.active_channel_id(), Some("a"));

    assert!(session.send_message(directory.active_channel_id(), "steps today?").await);
    let messages = session.messages();
    assert_eq!(messages.len(), 2);
    assert_eq!((messages[0].role, messages[0].content.as_str()), (Role::User, "steps today?"));
    assert_eq!((messages[1].role, messages[1].content.as_str()), (Role::Assistant, "120 steps"));
}
