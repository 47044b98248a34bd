//! Transport client interface.
//!
//! The engine treats the messaging platform as an opaque client with a
//! small capability set: send, edit, download. Connection lifecycle,
//! authentication, and session persistence all live behind this trait.

use async_trait::async_trait;
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;
use threadmirror_core::types::{MessageId, SourceMessage, SpaceId, TopicId};

/// Errors surfaced by a transport backend.
#[derive(Debug, Error)]
pub enum TransportError {
    /// The platform asked us to back off before sending again.
    #[error("rate limited: retry after {retry_after_secs} seconds")]
    RateLimited {
        /// Seconds to wait before retrying.
        retry_after_secs: u64,
    },

    /// Attachment download failed.
    #[error("download failed: {0}")]
    Download(String),

    /// Send failed for any non-rate-limit reason.
    #[error("send failed: {0}")]
    Send(String),

    /// Edit failed.
    #[error("edit failed: {0}")]
    Edit(String),
}

impl TransportError {
    /// Whether this error is a transient backpressure signal.
    pub fn is_rate_limited(&self) -> bool {
        matches!(self, Self::RateLimited { .. })
    }

    /// Server-requested backoff, if any.
    pub fn retry_delay(&self) -> Option<Duration> {
        match self {
            Self::RateLimited { retry_after_secs } => {
                Some(Duration::from_secs(*retry_after_secs))
            }
            _ => None,
        }
    }
}

/// Outbound payload assembled by the delivery executor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutboundPayload {
    /// Body text. May be empty (stickers) or a placeholder (failed media).
    pub text: String,

    /// Replicated message to reply to, when the reply chain resolved.
    pub reply_to: Option<MessageId>,

    /// Target topic the message is anchored to.
    pub topic_anchor: Option<TopicId>,

    /// Local path of a relayed attachment to upload.
    pub attachment: Option<PathBuf>,

    /// Render the text as HTML (source carried formatting entities).
    pub html: bool,

    /// Suppress link previews on the replica.
    pub disable_link_preview: bool,
}

impl Default for OutboundPayload {
    fn default() -> Self {
        Self {
            text: String::new(),
            reply_to: None,
            topic_anchor: None,
            attachment: None,
            html: false,
            disable_link_preview: true,
        }
    }
}

/// Where the transport should materialize a downloaded attachment.
#[derive(Debug, Clone)]
pub enum DownloadDest {
    /// Write to this exact file path (original filename known).
    File(PathBuf),

    /// Let the backend pick a name inside this directory (unnamed media
    /// such as photos, voice notes, stickers).
    Dir(PathBuf),
}

/// The messaging-platform capability set consumed by the engine.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Send a message into the given space. Returns the id the platform
    /// assigned to the new message.
    async fn send_message(
        &self,
        space: SpaceId,
        payload: &OutboundPayload,
    ) -> Result<MessageId, TransportError>;

    /// Replace the text of a previously sent message.
    async fn edit_message(
        &self,
        space: SpaceId,
        message: MessageId,
        new_text: &str,
    ) -> Result<(), TransportError>;

    /// Fetch the attachment of a source message into local storage.
    /// Returns the path the content was written to.
    async fn download_attachment(
        &self,
        message: &SourceMessage,
        dest: DownloadDest,
    ) -> Result<PathBuf, TransportError>;
}
