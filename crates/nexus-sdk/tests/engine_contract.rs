//! Client behavior against a stand-in engine over real HTTP.

use mockito::Matcher;
use nexus_sdk::{Envelope, Nexus, SdkError, SetOptions, TicketOptions};
use serde_json::{Value, json};

#[tokio::test]
async fn test_kv_get_404_is_absent() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("GET", "/kv/get")
        .match_query(Matcher::UrlEncoded("key".into(), "user:a@example.com".into()))
        .with_status(404)
        .with_body("Not found")
        .create_async()
        .await;

    let nexus = Nexus::new(server.url());
    let value: Option<Value> = nexus.kv.get("user:a@example.com").await.unwrap();

    assert_eq!(value, None);
    mock.assert_async().await;
}

#[tokio::test]
async fn test_kv_get_500_is_error() {
    let mut server = mockito::Server::new_async().await;
    let _mock = server
        .mock("GET", "/kv/get")
        .match_query(Matcher::Any)
        .with_status(500)
        .with_body("storage unavailable")
        .create_async()
        .await;

    let nexus = Nexus::new(server.url());
    let err = nexus.kv.get::<Value>("user:a@example.com").await.unwrap_err();

    match err {
        SdkError::EngineRequest { status, body } => {
            assert_eq!(status, 500);
            assert_eq!(body, "storage unavailable");
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[tokio::test]
async fn test_kv_round_trip_shapes() {
    let mut server = mockito::Server::new_async().await;
    let set = server
        .mock("POST", "/kv/set")
        .match_body(Matcher::Json(json!({
            "key": "session:1",
            "value": {"user": "ada"},
            "ttl": 60
        })))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"{"success":true}"#)
        .create_async()
        .await;
    let get = server
        .mock("GET", "/kv/get")
        .match_query(Matcher::UrlEncoded("key".into(), "session:1".into()))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"{"user":"ada"}"#)
        .create_async()
        .await;

    // Trailing slash must not produce `//kv/...`
    let nexus = Nexus::new(format!("{}/", server.url()));
    nexus
        .kv
        .set("session:1", &json!({"user": "ada"}), SetOptions { ttl: Some(60) })
        .await
        .unwrap();
    let value: Option<Value> = nexus.kv.get("session:1").await.unwrap();

    assert_eq!(value, Some(json!({"user": "ada"})));
    set.assert_async().await;
    get.assert_async().await;
}

#[tokio::test]
async fn test_ticket_and_publish() {
    let mut server = mockito::Server::new_async().await;
    let ticket = server
        .mock("POST", "/pubsub/ticket")
        .match_body(Matcher::Json(json!({"user_id": "ada", "channels": ["chat"]})))
        .with_status(200)
        .with_body(r#"{"ticket":"abc123"}"#)
        .create_async()
        .await;
    let publish = server
        .mock("POST", "/pubsub/publish")
        .match_body(Matcher::Json(json!({"channel": "chat", "data": "hello"})))
        .with_status(200)
        .with_body(r#"{"ok":true}"#)
        .create_async()
        .await;

    let nexus = Nexus::new(server.url());
    let issued = nexus
        .pubsub
        .create_ticket(&TicketOptions {
            user_id: "ada".into(),
            channels: vec!["chat".into()],
        })
        .await
        .unwrap();
    nexus.pubsub.publish("chat", "hello").await.unwrap();

    assert_eq!(issued, "abc123");
    let socket = nexus.pubsub.socket_url(&issued).unwrap();
    assert_eq!(socket.scheme(), "ws");
    assert_eq!(socket.path(), "/ws");
    assert_eq!(socket.query(), Some("ticket=abc123"));

    ticket.assert_async().await;
    publish.assert_async().await;
}

#[tokio::test]
async fn test_unreachable_engine_is_network_error() {
    let port = {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        listener.local_addr().unwrap().port()
    };
    let nexus = Nexus::new(format!("http://127.0.0.1:{port}"));

    let err = nexus.kv.get::<Value>("k").await.unwrap_err();
    assert!(matches!(err, SdkError::Network(_)));
}

#[test]
fn test_pushed_frame_decodes() {
    let envelope: Envelope<Value> =
        Envelope::parse(r#"{"channel":"chat","data":{"from":"ada","text":"hi"}}"#).unwrap();
    assert_eq!(envelope.data["text"], "hi");
}
