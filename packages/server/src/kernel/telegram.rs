//! Telegram-backed review channel: the adapter implementing the chat
//! capability, and the long-poll pump feeding reviewer decisions into the
//! moderation loop.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use telegram::models::{CallbackQuery, InlineKeyboardButton, InlineKeyboardMarkup};
use telegram::TelegramService;
use tokio::sync::mpsc;
use tracing::{debug, error, warn};

use crate::domains::guestbook::models::Submission;
use crate::domains::guestbook::moderation::{
    AttachmentRef, ControlActivation, ModerationEvent, ReviewAction, ReviewTicket,
};
use crate::kernel::traits::BaseReviewChannel;

/// Telegram caption limit. The caption is a convenience preview; the full
/// text always travels as the attachment.
const CAPTION_LIMIT: usize = 1024;

/// Server-side long-poll window for getUpdates.
const POLL_TIMEOUT_SECS: u64 = 30;

/// Back-off after a failed poll so a broken network does not spin the loop.
const POLL_RETRY_DELAY: Duration = Duration::from_secs(5);

// =============================================================================
// TelegramAdapter (implements BaseReviewChannel)
// =============================================================================

/// Wrapper around TelegramService that implements the review channel
/// capability against a fixed review chat.
pub struct TelegramAdapter {
    service: Arc<TelegramService>,
    chat_id: i64,
    scratch_dir: PathBuf,
}

impl TelegramAdapter {
    pub fn new(service: Arc<TelegramService>, chat_id: i64) -> Self {
        Self {
            service,
            chat_id,
            scratch_dir: std::env::temp_dir(),
        }
    }
}

#[async_trait]
impl BaseReviewChannel for TelegramAdapter {
    async fn post(&self, submission: &Submission) -> Result<ReviewTicket> {
        let content = submission.rendered_content();
        let caption: String = content.chars().take(CAPTION_LIMIT).collect();

        let message = self
            .service
            .send_document(
                self.chat_id,
                &caption,
                &submission.file_name(),
                content.into_bytes(),
            )
            .await
            .context("failed to send review message")?;

        // The controls carry the message's own id, so a later press
        // correlates back without any storage beyond the chat itself.
        let markup = InlineKeyboardMarkup::rows(vec![
            InlineKeyboardButton::new(
                "Approve",
                ReviewAction::Approve(message.message_id).encode(),
            ),
            InlineKeyboardButton::new(
                "Decline",
                ReviewAction::Decline(message.message_id).encode(),
            ),
        ]);
        self.service
            .edit_message_reply_markup(self.chat_id, message.message_id, &markup)
            .await
            .context("failed to attach review controls")?;

        Ok(ReviewTicket {
            message_id: message.message_id,
            label: submission.label.clone(),
        })
    }

    async fn withdraw(&self, message_id: i64) -> Result<()> {
        self.service
            .delete_message(self.chat_id, message_id)
            .await
            .context("failed to delete review message")
    }

    async fn fetch_attachment(&self, activation: &ControlActivation) -> Result<PathBuf> {
        let attachment = activation
            .attachment
            .as_ref()
            .context("activation carries no attachment")?;

        let file = self
            .service
            .get_file(&attachment.file_id)
            .await
            .context("failed to resolve attachment file")?;
        let file_path = file
            .file_path
            .context("attachment file has no download path")?;
        let bytes = self
            .service
            .download_file(&file_path)
            .await
            .context("failed to download attachment")?;

        let scratch = self
            .scratch_dir
            .join(format!("review-{}.html", activation.action.message_id()));
        tokio::fs::write(&scratch, &bytes)
            .await
            .with_context(|| format!("failed to write scratch file {}", scratch.display()))?;
        Ok(scratch)
    }

    async fn acknowledge(&self, message_id: i64, text: &str) -> Result<()> {
        self.service
            .send_message(self.chat_id, text, Some(message_id))
            .await
            .context("failed to reply with review outcome")?;
        Ok(())
    }
}

// =============================================================================
// TelegramUpdatePump
// =============================================================================

/// Long-polls the Bot API and forwards control activations to the moderation
/// loop, in arrival order.
pub struct TelegramUpdatePump {
    service: Arc<TelegramService>,
    chat_id: i64,
    events: mpsc::Sender<ModerationEvent>,
}

impl TelegramUpdatePump {
    pub fn new(
        service: Arc<TelegramService>,
        chat_id: i64,
        events: mpsc::Sender<ModerationEvent>,
    ) -> Self {
        Self {
            service,
            chat_id,
            events,
        }
    }

    /// Run until the moderation loop goes away.
    pub async fn run(self) {
        let mut offset: Option<i64> = None;
        loop {
            let updates = match self.service.get_updates(offset, POLL_TIMEOUT_SECS).await {
                Ok(updates) => updates,
                Err(error) => {
                    error!(error = %error, "getUpdates failed; backing off");
                    tokio::time::sleep(POLL_RETRY_DELAY).await;
                    continue;
                }
            };

            for update in updates {
                offset = Some(update.update_id + 1);
                let Some(query) = update.callback_query else {
                    continue;
                };

                // Clear the reviewer's client-side spinner no matter what the
                // press decodes to.
                if let Err(error) = self.service.answer_callback_query(&query.id).await {
                    debug!(error = %error, "answerCallbackQuery failed");
                }

                // Channel membership is the authorization model: only presses
                // from the review chat count.
                if query.message.as_ref().map(|message| message.chat.id) != Some(self.chat_id) {
                    warn!(query_id = %query.id, "ignoring callback from outside the review chat");
                    continue;
                }

                let Some(activation) = decode_callback(&query) else {
                    warn!(data = ?query.data, "ignoring undecodable callback payload");
                    continue;
                };

                if self
                    .events
                    .send(ModerationEvent::ControlActivated(activation))
                    .await
                    .is_err()
                {
                    // Moderation loop is gone; nothing left to pump for.
                    return;
                }
            }
        }
    }
}

/// Decode a button payload into a tagged action at the boundary. The callback
/// also carries the review message itself, whose document is the attachment
/// approval will download.
fn decode_callback(query: &CallbackQuery) -> Option<ControlActivation> {
    let action = ReviewAction::decode(query.data.as_deref()?)?;
    let attachment = query
        .message
        .as_ref()
        .and_then(|message| message.document.as_ref())
        .map(|document| AttachmentRef {
            file_id: document.file_id.clone(),
            file_name: document.file_name.clone(),
        });
    Some(ControlActivation { action, attachment })
}
