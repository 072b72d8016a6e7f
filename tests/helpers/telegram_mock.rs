//! Mock Telegram API server for testing
//!
//! Simulates the Bot API endpoints used for delivering replies.

use serde_json::{json, Value};
use wiremock::{
    matchers::{method, path_regex},
    Mock, MockServer, ResponseTemplate,
};

pub const TEST_BOT_TOKEN: &str = "12345:test_token";

/// Mock Telegram API server
pub struct TelegramMockServer {
    pub server: MockServer,
}

impl TelegramMockServer {
    pub async fn new() -> Self {
        Self {
            server: MockServer::start().await,
        }
    }

    /// Bot pointed at the mock server
    pub fn bot(&self) -> teloxide::Bot {
        let url = self.server.uri().parse().expect("mock server uri is a url");
        teloxide::Bot::new(TEST_BOT_TOKEN).set_api_url(url)
    }

    /// Bot API method names are case-insensitive; teloxide sends e.g. `SendMessage`
    fn endpoint(name: &str) -> String {
        format!("(?i)^/bot{}/{}$", regex::escape(TEST_BOT_TOKEN), regex::escape(name))
    }

    fn message_result(chat_id: i64) -> Value {
        json!({
            "ok": true,
            "result": {
                "message_id": 123,
                "from": {
                    "id": 12345,
                    "is_bot": true,
                    "first_name": "TestBot",
                    "username": "carry_test_bot"
                },
                "chat": {
                    "id": chat_id,
                    "first_name": "Anna",
                    "type": "private"
                },
                "date": 1640995200,
                "text": "ok"
            }
        })
    }

    /// Successful sendMessage, expected exactly `times` times
    pub async fn expect_send_message(&self, chat_id: i64, times: u64) {
        Mock::given(method("POST"))
            .and(path_regex(Self::endpoint("sendMessage")))
            .respond_with(ResponseTemplate::new(200).set_body_json(Self::message_result(chat_id)))
            .expect(times)
            .mount(&self.server)
            .await;
    }

    /// Successful sendPhoto, expected exactly `times` times
    pub async fn expect_send_photo(&self, chat_id: i64, times: u64) {
        Mock::given(method("POST"))
            .and(path_regex(Self::endpoint("sendPhoto")))
            .respond_with(ResponseTemplate::new(200).set_body_json(Self::message_result(chat_id)))
            .expect(times)
            .mount(&self.server)
            .await;
    }

    /// sendMessage rejected by the API
    pub async fn reject_send_message(&self) {
        Mock::given(method("POST"))
            .and(path_regex(Self::endpoint("sendMessage")))
            .respond_with(ResponseTemplate::new(400).set_body_json(json!({
                "ok": false,
                "error_code": 400,
                "description": "Bad Request: chat not found"
            })))
            .mount(&self.server)
            .await;
    }

    pub async fn received_paths(&self) -> Vec<String> {
        self.server
            .received_requests()
            .await
            .unwrap_or_default()
            .into_iter()
            .map(|request| request.url.path().to_string())
            .collect()
    }
}
