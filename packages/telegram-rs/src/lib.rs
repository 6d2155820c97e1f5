// Minimal Telegram Bot API client covering what the guestbook pipeline
// consumes: send a document with inline controls, long-poll updates, delete
// messages, resolve and download files, reply to a message.
//
// https://core.telegram.org/bots/api

pub mod models;

use reqwest::{multipart, Client};
use serde::de::DeserializeOwned;
use serde_json::json;
use thiserror::Error;

use crate::models::{ApiResponse, FileInfo, InlineKeyboardMarkup, Message, Update};

/// Errors from Bot API calls.
#[derive(Debug, Error)]
pub enum TelegramError {
    /// Transport or response-decoding failure
    #[error("telegram request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The API answered with `ok: false`
    #[error("telegram API error: {0}")]
    Api(String),

    /// The API answered `ok: true` but the result was unusable
    #[error("unexpected telegram response: {0}")]
    UnexpectedResponse(&'static str),
}

pub type Result<T> = std::result::Result<T, TelegramError>;

const DEFAULT_API_BASE: &str = "https://api.telegram.org";

#[derive(Debug, Clone)]
pub struct TelegramOptions {
    pub bot_token: String,
    /// Override for tests; production uses the default Bot API host.
    pub api_base: String,
}

impl TelegramOptions {
    pub fn new(bot_token: impl Into<String>) -> Self {
        Self {
            bot_token: bot_token.into(),
            api_base: DEFAULT_API_BASE.to_string(),
        }
    }

    pub fn with_api_base(mut self, api_base: impl Into<String>) -> Self {
        self.api_base = api_base.into();
        self
    }
}

#[derive(Debug, Clone)]
pub struct TelegramService {
    options: TelegramOptions,
    client: Client,
}

impl TelegramService {
    pub fn new(options: TelegramOptions) -> Self {
        Self {
            options,
            client: Client::new(),
        }
    }

    fn method_url(&self, method: &str) -> String {
        format!(
            "{}/bot{}/{}",
            self.options.api_base, self.options.bot_token, method
        )
    }

    /// POST a JSON payload to a Bot API method and unwrap the envelope.
    async fn call<T: DeserializeOwned>(&self, method: &str, payload: serde_json::Value) -> Result<T> {
        let response = self
            .client
            .post(self.method_url(method))
            .json(&payload)
            .send()
            .await?;

        let status = response.status();
        let body: ApiResponse<T> = response.json().await?;
        if !body.ok {
            return Err(TelegramError::Api(
                body.description
                    .unwrap_or_else(|| format!("HTTP {}", status)),
            ));
        }
        body.result
            .ok_or(TelegramError::UnexpectedResponse("ok response without result"))
    }

    /// Send `content` as a named document with a text caption.
    pub async fn send_document(
        &self,
        chat_id: i64,
        caption: &str,
        file_name: &str,
        content: Vec<u8>,
    ) -> Result<Message> {
        let part = multipart::Part::bytes(content)
            .file_name(file_name.to_string())
            .mime_str("text/html")?;
        let form = multipart::Form::new()
            .text("chat_id", chat_id.to_string())
            .text("caption", caption.to_string())
            .part("document", part);

        let response = self
            .client
            .post(self.method_url("sendDocument"))
            .multipart(form)
            .send()
            .await?;

        let status = response.status();
        let body: ApiResponse<Message> = response.json().await?;
        if !body.ok {
            return Err(TelegramError::Api(
                body.description
                    .unwrap_or_else(|| format!("HTTP {}", status)),
            ));
        }
        body.result
            .ok_or(TelegramError::UnexpectedResponse("ok response without result"))
    }

    /// Edit a sent message in place to carry an inline keyboard.
    pub async fn edit_message_reply_markup(
        &self,
        chat_id: i64,
        message_id: i64,
        markup: &InlineKeyboardMarkup,
    ) -> Result<Message> {
        self.call(
            "editMessageReplyMarkup",
            json!({
                "chat_id": chat_id,
                "message_id": message_id,
                "reply_markup": markup,
            }),
        )
        .await
    }

    pub async fn send_message(
        &self,
        chat_id: i64,
        text: &str,
        reply_to_message_id: Option<i64>,
    ) -> Result<Message> {
        let mut payload = json!({
            "chat_id": chat_id,
            "text": text,
        });
        if let Some(reply_to) = reply_to_message_id {
            payload["reply_to_message_id"] = json!(reply_to);
        }
        self.call("sendMessage", payload).await
    }

    pub async fn delete_message(&self, chat_id: i64, message_id: i64) -> Result<()> {
        let _: bool = self
            .call(
                "deleteMessage",
                json!({
                    "chat_id": chat_id,
                    "message_id": message_id,
                }),
            )
            .await?;
        Ok(())
    }

    /// Long-poll for updates. Blocks server-side for up to `timeout_secs`.
    pub async fn get_updates(&self, offset: Option<i64>, timeout_secs: u64) -> Result<Vec<Update>> {
        let mut payload = json!({
            "timeout": timeout_secs,
            "allowed_updates": ["callback_query"],
        });
        if let Some(offset) = offset {
            payload["offset"] = json!(offset);
        }
        self.call("getUpdates", payload).await
    }

    /// Acknowledge a button press so the reviewer's client stops spinning.
    pub async fn answer_callback_query(&self, callback_query_id: &str) -> Result<()> {
        let _: bool = self
            .call(
                "answerCallbackQuery",
                json!({ "callback_query_id": callback_query_id }),
            )
            .await?;
        Ok(())
    }

    pub async fn get_file(&self, file_id: &str) -> Result<FileInfo> {
        self.call("getFile", json!({ "file_id": file_id })).await
    }

    /// Download raw file bytes for a `file_path` returned by `getFile`.
    pub async fn download_file(&self, file_path: &str) -> Result<Vec<u8>> {
        let url = format!(
            "{}/file/bot{}/{}",
            self.options.api_base, self.options.bot_token, file_path
        );
        let response = self.client.get(url).send().await?.error_for_status()?;
        let bytes = response.bytes().await?;
        Ok(bytes.to_vec())
    }
}
