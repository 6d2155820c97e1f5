//! Client tests against a scripted Bot API server.

use telegram::models::{InlineKeyboardButton, InlineKeyboardMarkup};
use telegram::{TelegramError, TelegramOptions, TelegramService};
use wiremock::matchers::{body_partial_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn service(server: &MockServer) -> TelegramService {
    TelegramService::new(TelegramOptions::new("TOKEN").with_api_base(server.uri()))
}

#[tokio::test]
async fn send_message_unwraps_result() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/botTOKEN/sendMessage"))
        .and(body_partial_json(serde_json::json!({
            "chat_id": -100,
            "text": "ok",
            "reply_to_message_id": 55,
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "ok": true,
            "result": {
                "message_id": 56,
                "chat": {"id": -100},
                "text": "ok"
            }
        })))
        .expect(1)
        .mount(&server)
        .await;

    let message = service(&server)
        .send_message(-100, "ok", Some(55))
        .await
        .unwrap();
    assert_eq!(message.message_id, 56);
}

#[tokio::test]
async fn api_error_carries_description() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/botTOKEN/deleteMessage"))
        .respond_with(ResponseTemplate::new(400).set_body_json(serde_json::json!({
            "ok": false,
            "description": "Bad Request: message to delete not found"
        })))
        .mount(&server)
        .await;

    let err = service(&server).delete_message(-100, 9).await.unwrap_err();
    match err {
        TelegramError::Api(description) => {
            assert!(description.contains("message to delete not found"));
        }
        other => panic!("expected Api error, got {other:?}"),
    }
}

#[tokio::test]
async fn edit_reply_markup_sends_keyboard() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/botTOKEN/editMessageReplyMarkup"))
        .and(body_partial_json(serde_json::json!({
            "chat_id": -100,
            "message_id": 7,
            "reply_markup": {
                "inline_keyboard": [
                    [{"text": "Approve", "callback_data": "approve:7"}],
                    [{"text": "Decline", "callback_data": "decline:7"}]
                ]
            }
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "ok": true,
            "result": {"message_id": 7, "chat": {"id": -100}}
        })))
        .expect(1)
        .mount(&server)
        .await;

    let markup = InlineKeyboardMarkup::rows(vec![
        InlineKeyboardButton::new("Approve", "approve:7"),
        InlineKeyboardButton::new("Decline", "decline:7"),
    ]);
    service(&server)
        .edit_message_reply_markup(-100, 7, &markup)
        .await
        .unwrap();
}

#[tokio::test]
async fn download_file_returns_raw_bytes() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/file/botTOKEN/documents/file_1.html"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(b"\nhello\n".to_vec()))
        .mount(&server)
        .await;

    let bytes = service(&server)
        .download_file("documents/file_1.html")
        .await
        .unwrap();
    assert_eq!(bytes, b"\nhello\n");
}

#[tokio::test]
async fn get_updates_deserializes_callback_queries() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/botTOKEN/getUpdates"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "ok": true,
            "result": [{
                "update_id": 12,
                "callback_query": {
                    "id": "cb1",
                    "data": "decline:31",
                    "message": {"message_id": 31, "chat": {"id": -100}}
                }
            }]
        })))
        .mount(&server)
        .await;

    let updates = service(&server).get_updates(Some(11), 0).await.unwrap();
    assert_eq!(updates.len(), 1);
    let query = updates[0].callback_query.as_ref().unwrap();
    assert_eq!(query.data.as_deref(), Some("decline:31"));
}
