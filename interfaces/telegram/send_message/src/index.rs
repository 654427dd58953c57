use reqwest::{Client, StatusCode};
use serde::Serialize;
use thiserror::Error;

pub const TELEGRAM_API_URL: &str = "https://api.telegram.org";

#[derive(Debug, Serialize)]
pub struct SendMessagePayload<'a> {
    pub chat_id: &'a str,
    pub text: &'a str,
    pub parse_mode: &'a str,
    pub disable_web_page_preview: bool,
}

impl<'a> SendMessagePayload<'a> {
    /// HTML-formatted text with link previews turned off.
    pub fn html(chat_id: &'a str, text: &'a str) -> Self {
        Self {
            chat_id,
            text,
            parse_mode: "HTML",
            disable_web_page_preview: true,
        }
    }
}

pub struct TelegramSendResult {
    pub body: String,
    pub status: StatusCode,
}

pub fn send_message_url(api_url: &str, token: &str) -> String {
    format!("{}/bot{token}/sendMessage", api_url.trim_end_matches('/'))
}

// The request URL embeds the bot token, so it is stripped from errors.
pub async fn send_message(
    client: &Client,
    api_url: &str,
    token: &str,
    payload: &SendMessagePayload<'_>,
) -> Result<TelegramSendResult, SendMessageError> {
    let response = client
        .post(send_message_url(api_url, token))
        .header("Content-Type", "application/json")
        .json(payload)
        .send()
        .await
        .map_err(|source| SendMessageError::RequestSend {
            source: source.without_url(),
        })?;

    let status = response.status();

    let body = response
        .text()
        .await
        .map_err(|source| SendMessageError::ResponseRead {
            source: source.without_url(),
        })?;

    Ok(TelegramSendResult { body, status })
}

#[derive(Debug, Error)]
pub enum SendMessageError {
    #[error("RequestSend: {source}")]
    RequestSend {
        source: reqwest::Error,
    },

    #[error("ResponseRead: {source}")]
    ResponseRead {
        source: reqwest::Error,
    },
}
