// ABOUTME: Tests for the Zulip transport against the in-process mock server
// ABOUTME: Covers unread grouping, send and flag requests, and error mapping

mod common;

use common::{MockZulip, BOT_USER_ID};
use guanaco::zulip::ZulipTransport;
use guanaco_core::{ChatTransport, Identity, TransportError};

#[tokio::test]
async fn test_unread_messages_grouped_by_stream_and_topic() {
    let zulip = MockZulip::start().await;
    zulip.add_unread(1, 42, "Discussion", "Hello", 7);
    zulip.add_unread(2, 42, "Discussion", "Anyone?", 8);
    zulip.add_unread(3, 42, "Random", "Hi", 7);
    zulip.add_unread(4, 43, "Discussion", "Other stream", 7);

    let transport = ZulipTransport::new(&zulip.config()).unwrap();
    let channels = transport.get_channels_with_unread().await.unwrap();

    assert_eq!(channels.len(), 3);
    let discussion = &channels["42/Discussion"];
    assert_eq!(discussion.messages().len(), 2);
    assert_eq!(discussion.last_message().content, "Anyone?");
    assert_eq!(
        discussion.last_message().sender,
        Identity::new("8", "zulip").unwrap()
    );
    assert!(channels.contains_key("43/Discussion"));
}

#[tokio::test]
async fn test_unread_query_parameters_and_auth() {
    let zulip = MockZulip::start().await;
    let transport = ZulipTransport::new(&zulip.config()).unwrap();

    let channels = transport.get_channels_with_unread().await.unwrap();
    assert!(channels.is_empty());

    let state = zulip.state.lock().unwrap();
    let query = &state.message_queries[0];
    assert_eq!(query["anchor"], "newest");
    assert_eq!(query["num_before"], "50");
    assert_eq!(query["num_after"], "0");
    let narrow: serde_json::Value = serde_json::from_str(&query["narrow"]).unwrap();
    assert_eq!(narrow[0]["operator"], "is");
    assert_eq!(narrow[0]["operand"], "unread");
    assert!(state.auth_headers[0].starts_with("Basic "));
}

#[tokio::test]
async fn test_send_channel_message_posts_stream_message() {
    let zulip = MockZulip::start().await;
    let transport = ZulipTransport::new(&zulip.config()).unwrap();

    transport
        .send_channel_message("Hello channel!", "general", "Discussion")
        .await
        .unwrap();

    let sent = zulip.sent();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0]["type"], "stream");
    assert_eq!(sent[0]["to"], "general");
    assert_eq!(sent[0]["topic"], "Discussion");
    assert_eq!(sent[0]["content"], "Hello channel!");
}

#[tokio::test]
async fn test_send_thread_message_uses_topic() {
    let zulip = MockZulip::start().await;
    let transport = ZulipTransport::new(&zulip.config()).unwrap();

    transport
        .send_thread_message("Hello thread!", "123", "Discussion")
        .await
        .unwrap();

    let sent = zulip.sent();
    assert_eq!(sent[0]["to"], "123");
    assert_eq!(sent[0]["topic"], "Discussion");
}

#[tokio::test]
async fn test_send_private_message_to_user_id() {
    let zulip = MockZulip::start().await;
    let transport = ZulipTransport::new(&zulip.config()).unwrap();

    let recipient = Identity::new("7", "zulip").unwrap();
    transport
        .send_private_message("Hello John!", &recipient)
        .await
        .unwrap();

    let sent = zulip.sent();
    assert_eq!(sent[0]["type"], "private");
    assert_eq!(sent[0]["to"], "[7]");
    assert_eq!(sent[0]["content"], "Hello John!");
}

#[tokio::test]
async fn test_mark_as_read_flags_every_message_in_channel() {
    let zulip = MockZulip::start().await;
    zulip.add_unread(10, 42, "Discussion", "one", 7);
    zulip.add_unread(11, 42, "Discussion", "two", 7);
    let transport = ZulipTransport::new(&zulip.config()).unwrap();

    let channels = transport.get_channels_with_unread().await.unwrap();
    transport
        .mark_as_read(&channels["42/Discussion"])
        .await
        .unwrap();

    let flags = zulip.flag_requests();
    assert_eq!(flags.len(), 1);
    assert_eq!(flags[0]["messages"], "[10,11]");
    assert_eq!(flags[0]["op"], "add");
    assert_eq!(flags[0]["flag"], "read");
    assert_eq!(zulip.unread_count(), 0);
}

#[tokio::test]
async fn test_error_result_becomes_transport_error() {
    let zulip = MockZulip::start().await;
    zulip.fail_sends("Stream 'nonexistent' does not exist");
    let transport = ZulipTransport::new(&zulip.config()).unwrap();

    let err = transport
        .send_channel_message("Hello!", "nonexistent", "Topic")
        .await
        .unwrap_err();

    let remote = err.downcast_ref::<TransportError>().expect("TransportError");
    assert_eq!(remote.platform, "zulip");
    assert_eq!(remote.message, "Stream 'nonexistent' does not exist");
}

#[tokio::test]
async fn test_unknown_endpoint_is_a_transport_error() {
    let zulip = MockZulip::start().await;
    let mut config = zulip.config();
    config.site = format!("{}/missing", zulip.url);
    let transport = ZulipTransport::new(&config).unwrap();

    let err = transport.get_channels_with_unread().await.unwrap_err();
    let remote = err.downcast_ref::<TransportError>().expect("TransportError");
    assert!(remote.message.contains("404"));
}

#[tokio::test]
async fn test_own_identity_comes_from_users_me() {
    let zulip = MockZulip::start().await;
    let transport = ZulipTransport::new(&zulip.config()).unwrap();

    let identity = transport.own_identity().await.unwrap();
    assert_eq!(identity.platform_id(), BOT_USER_ID.to_string());
    assert_eq!(identity.platform_name(), "zulip");
    assert_eq!(identity.display_name(), Some("Guanaco Bot"));
}

#[test]
fn test_transport_requires_api_key_and_site() {
    let mut config = guanaco::config::ZulipConfig::default();
    config.site = "https://chat.example.com".into();
    assert!(ZulipTransport::new(&config).is_err());

    config.api_key = Some("k".into());
    assert!(ZulipTransport::new(&config).is_ok());

    config.site = String::new();
    assert!(ZulipTransport::new(&config).is_err());
}
