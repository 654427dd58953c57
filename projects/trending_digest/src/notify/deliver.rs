use async_trait::async_trait;
use interfaces_telegram_send_message::index::{
    send_message, SendMessageError, SendMessagePayload, TelegramSendResult, TELEGRAM_API_URL,
};
use reqwest::{Client, StatusCode};
use thiserror::Error;
use tracing::{error, info};

#[derive(Debug, Error)]
pub enum DeliverMessageError {
    #[error("SendMessage: {source}")]
    SendMessage {
        #[from]
        source: SendMessageError,
    },

    #[error("Rejected: HTTP {status}: {body}")]
    Rejected {
        status: StatusCode,
        body: String,
    },
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum MissingCredentialError {
    #[error("TELEGRAM_BOT_TOKEN is required to send messages")]
    Token,

    #[error("TELEGRAM_CHANNEL_ID is required to send messages")]
    ChatId,
}

/// Delivers one already-formatted message.
#[async_trait]
pub trait MessageSender: Send + Sync {
    async fn send(&self, text: &str) -> Result<(), DeliverMessageError>;
}

pub struct TelegramSender {
    client: Client,
    api_url: String,
    token: String,
    chat_id: String,
}

impl TelegramSender {
    /// Fails up front when either credential is missing or blank, before any
    /// message is attempted.
    pub fn new(
        client: Client,
        token: Option<String>,
        chat_id: Option<String>,
    ) -> Result<Self, MissingCredentialError> {
        let token = non_blank(token).ok_or(MissingCredentialError::Token)?;
        let chat_id = non_blank(chat_id).ok_or(MissingCredentialError::ChatId)?;

        Ok(Self {
            client,
            api_url: TELEGRAM_API_URL.to_string(),
            token,
            chat_id,
        })
    }

    /// Points the sender at another Bot API server.
    pub fn with_api_url(mut self, api_url: impl Into<String>) -> Self {
        self.api_url = api_url.into();
        self
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

#[async_trait]
impl MessageSender for TelegramSender {
    async fn send(&self, text: &str) -> Result<(), DeliverMessageError> {
        let payload = SendMessagePayload::html(&self.chat_id, text);
        let TelegramSendResult { body, status } =
            send_message(&self.client, &self.api_url, &self.token, &payload).await?;

        if status != StatusCode::OK {
            return Err(DeliverMessageError::Rejected { status, body });
        }

        Ok(())
    }
}

/// Dry-run sender: writes each message to the log instead of Telegram.
#[derive(Debug, Default)]
pub struct LogSender;

#[async_trait]
impl MessageSender for LogSender {
    async fn send(&self, text: &str) -> Result<(), DeliverMessageError> {
        info!("Dry run, message not sent:\n{text}");
        Ok(())
    }
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct DeliveryReport {
    pub sent: usize,
    pub failed: usize,
}

impl DeliveryReport {
    pub fn success(&self) -> bool {
        self.failed == 0
    }
}

/// Sends every message in order. A failed send is logged and counted; the
/// remaining messages are still attempted.
pub async fn deliver_all<I>(sender: &dyn MessageSender, messages: I) -> DeliveryReport
where
    I: IntoIterator<Item = String>,
{
    let mut report = DeliveryReport::default();

    for (index, message) in messages.into_iter().enumerate() {
        match sender.send(&message).await {
            Ok(()) => {
                info!("Sent part {} to Telegram", index + 1);
                report.sent += 1;
            }
            Err(err) => {
                error!("Error sending part {} to Telegram: {err}", index + 1);
                report.failed += 1;
            }
        }
    }

    report
}
