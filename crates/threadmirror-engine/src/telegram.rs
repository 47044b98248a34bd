//! Telegram transport backend.

#![cfg(feature = "telegram")]

use crate::transport::{DownloadDest, OutboundPayload, Transport, TransportError};
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use teloxide::net::Download;
use teloxide::prelude::*;
use teloxide::types::{ChatId, InputFile, MessageKind, ParseMode};
use teloxide::RequestError;
use threadmirror_core::types::{
    AttachmentInfo, AttachmentKind, MessageId, ReplyInfo, SourceEvent, SourceMessage, SpaceId,
    TopicId,
};
use tokio::sync::mpsc;
use tracing::{debug, warn};
use uuid::Uuid;

/// Telegram Bot API implementation of [`Transport`].
pub struct TelegramTransport {
    bot: Bot,
}

impl std::fmt::Debug for TelegramTransport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TelegramTransport").finish()
    }
}

impl TelegramTransport {
    /// Create a transport from a bot token.
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            bot: Bot::new(token),
        }
    }

    /// Access the underlying bot, e.g. for the event listener.
    pub fn bot(&self) -> &Bot {
        &self.bot
    }
}

#[async_trait]
impl Transport for TelegramTransport {
    async fn send_message(
        &self,
        space: SpaceId,
        payload: &OutboundPayload,
    ) -> Result<MessageId, TransportError> {
        let chat = ChatId(space.get());

        let sent = match &payload.attachment {
            Some(path) => {
                let mut request = self
                    .bot
                    .send_document(chat, InputFile::file(path.clone()))
                    .caption(payload.text.clone());
                if payload.html {
                    request = request.parse_mode(ParseMode::Html);
                }
                if let Some(topic) = payload.topic_anchor {
                    request = request.message_thread_id(topic.get() as i32);
                }
                if let Some(reply_to) = payload.reply_to {
                    request = request
                        .reply_to_message_id(teloxide::types::MessageId(reply_to.get() as i32));
                }
                request.await.map_err(map_send_error)?
            }
            None => {
                let mut request = self
                    .bot
                    .send_message(chat, payload.text.clone())
                    .disable_web_page_preview(payload.disable_link_preview);
                if payload.html {
                    request = request.parse_mode(ParseMode::Html);
                }
                if let Some(topic) = payload.topic_anchor {
                    request = request.message_thread_id(topic.get() as i32);
                }
                if let Some(reply_to) = payload.reply_to {
                    request = request
                        .reply_to_message_id(teloxide::types::MessageId(reply_to.get() as i32));
                }
                request.await.map_err(map_send_error)?
            }
        };

        Ok(MessageId::new(sent.id.0 as i64))
    }

    async fn edit_message(
        &self,
        space: SpaceId,
        message: MessageId,
        new_text: &str,
    ) -> Result<(), TransportError> {
        self.bot
            .edit_message_text(
                ChatId(space.get()),
                teloxide::types::MessageId(message.get() as i32),
                new_text,
            )
            .await
            .map_err(|e| TransportError::Edit(e.to_string()))?;
        Ok(())
    }

    async fn download_attachment(
        &self,
        message: &SourceMessage,
        dest: DownloadDest,
    ) -> Result<PathBuf, TransportError> {
        let meta = message
            .attachment
            .as_ref()
            .ok_or_else(|| TransportError::Download("message has no attachment".into()))?;

        let file = self
            .bot
            .get_file(meta.file_id.clone())
            .await
            .map_err(|e| TransportError::Download(e.to_string()))?;

        let path = match dest {
            DownloadDest::File(path) => path,
            DownloadDest::Dir(dir) => dir.join(remote_file_name(&file.path)),
        };

        let mut out = tokio::fs::File::create(&path)
            .await
            .map_err(|e| TransportError::Download(e.to_string()))?;
        self.bot
            .download_file(&file.path, &mut out)
            .await
            .map_err(|e| TransportError::Download(e.to_string()))?;

        Ok(path)
    }
}

/// Derive a local filename for an unnamed download from the remote file
/// path, falling back to a random name.
fn remote_file_name(remote_path: &str) -> String {
    Path::new(remote_path)
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| Uuid::new_v4().to_string())
}

fn map_send_error(error: RequestError) -> TransportError {
    match error {
        RequestError::RetryAfter(duration) => TransportError::RateLimited {
            retry_after_secs: duration.as_secs().max(1),
        },
        other => TransportError::Send(other.to_string()),
    }
}

/// Long-poll the Bot API for updates in `source_space` and forward them
/// as [`SourceEvent`]s until the receiver side goes away.
pub async fn run_event_listener(
    bot: Bot,
    source_space: SpaceId,
    tx: mpsc::Sender<SourceEvent>,
) {
    let mut offset: i32 = 0;

    loop {
        let updates = match bot.get_updates().offset(offset).timeout(30).await {
            Ok(updates) => updates,
            Err(e) => {
                warn!(error = %e, "polling failed, backing off");
                tokio::time::sleep(std::time::Duration::from_secs(5)).await;
                continue;
            }
        };

        for update in updates {
            offset = offset.max(update.id + 1);

            let event = match &update.kind {
                teloxide::types::UpdateKind::Message(msg)
                    if msg.chat.id.0 == source_space.get() =>
                {
                    convert_message(msg).map(SourceEvent::Message)
                }
                teloxide::types::UpdateKind::EditedMessage(msg)
                    if msg.chat.id.0 == source_space.get() =>
                {
                    Some(SourceEvent::Edited {
                        id: MessageId::new(msg.id.0 as i64),
                        new_text: msg
                            .text()
                            .or_else(|| msg.caption())
                            .unwrap_or_default()
                            .to_string(),
                    })
                }
                _ => None,
            };

            if let Some(event) = event {
                if tx.send(event).await.is_err() {
                    debug!("event receiver dropped, stopping listener");
                    return;
                }
            }
        }
    }
}

/// Convert a Telegram message into the engine's source model.
fn convert_message(msg: &teloxide::types::Message) -> Option<SourceMessage> {
    let text = msg
        .text()
        .or_else(|| msg.caption())
        .unwrap_or_default()
        .to_string();

    let reply = msg.reply_to_message().map(|replied| ReplyInfo {
        to_message_id: MessageId::new(replied.id.0 as i64),
        top_thread_id: msg.thread_id.map(|t| TopicId::new(t as i64)),
        to_topic_opener: matches!(replied.kind, MessageKind::ForumTopicCreated(_)),
    });

    let has_formatting = msg.entities().map_or(false, |e| !e.is_empty())
        || msg.caption_entities().map_or(false, |e| !e.is_empty());

    Some(SourceMessage {
        id: MessageId::new(msg.id.0 as i64),
        timestamp: msg.date,
        text,
        has_formatting,
        reply,
        attachment: extract_attachment(msg),
    })
}

/// Pull the first recognized attachment off a message.
fn extract_attachment(msg: &teloxide::types::Message) -> Option<AttachmentInfo> {
    if let Some(document) = msg.document() {
        return Some(AttachmentInfo {
            kind: AttachmentKind::Document,
            filename: document.file_name.clone(),
            file_id: document.file.id.clone(),
        });
    }
    if let Some(photos) = msg.photo() {
        // Largest size last.
        return photos.last().map(|photo| AttachmentInfo {
            kind: AttachmentKind::Photo,
            filename: None,
            file_id: photo.file.id.clone(),
        });
    }
    if let Some(sticker) = msg.sticker() {
        return Some(AttachmentInfo {
            kind: AttachmentKind::Sticker,
            filename: None,
            file_id: sticker.file.id.clone(),
        });
    }
    if let Some(voice) = msg.voice() {
        return Some(AttachmentInfo {
            kind: AttachmentKind::Voice,
            filename: None,
            file_id: voice.file.id.clone(),
        });
    }
    if let Some(audio) = msg.audio() {
        return Some(AttachmentInfo {
            kind: AttachmentKind::Audio,
            filename: audio.file_name.clone(),
            file_id: audio.file.id.clone(),
        });
    }
    if let Some(video) = msg.video() {
        return Some(AttachmentInfo {
            kind: AttachmentKind::Video,
            filename: video.file_name.clone(),
            file_id: video.file.id.clone(),
        });
    }
    None
}
