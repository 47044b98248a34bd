//! Inbound message model.
//!
//! These types are what the transport layer hands to the engine for one
//! replication attempt. They are read-only from the engine's point of
//! view; the engine never mutates a source message.

use super::{MessageId, TopicId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// An event received from the source conversation space.
#[derive(Debug, Clone)]
pub enum SourceEvent {
    /// A new message appeared.
    Message(SourceMessage),

    /// An existing message was edited.
    Edited {
        /// Id of the edited source message.
        id: MessageId,
        /// The full new text.
        new_text: String,
    },
}

/// A message from the source conversation space.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceMessage {
    /// Message id, unique within the source space.
    pub id: MessageId,

    /// When the message was received.
    pub timestamp: DateTime<Utc>,

    /// Text content (or caption, for media messages). May be empty.
    pub text: String,

    /// Whether the text carries formatting entities that should be
    /// preserved as HTML on the target side.
    #[serde(default)]
    pub has_formatting: bool,

    /// Reply metadata, when the message references another message.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reply: Option<ReplyInfo>,

    /// Attached media, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub attachment: Option<AttachmentInfo>,
}

impl SourceMessage {
    /// Whether the attachment (if any) is a sticker. Stickers carry no
    /// meaningful caption, so their text is cleared on replication.
    pub fn is_sticker(&self) -> bool {
        matches!(
            self.attachment,
            Some(AttachmentInfo {
                kind: AttachmentKind::Sticker,
                ..
            })
        )
    }
}

impl Default for SourceMessage {
    fn default() -> Self {
        Self {
            id: MessageId::new(0),
            timestamp: Utc::now(),
            text: String::new(),
            has_formatting: false,
            reply: None,
            attachment: None,
        }
    }
}

/// Reply metadata on a source message.
///
/// Thread membership is encoded differently for a thread's opening
/// message than for its replies, which is why both the explicit top-id
/// and the opener flag are carried here. The classifier untangles them.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct ReplyInfo {
    /// Id of the message being replied to.
    pub to_message_id: MessageId,

    /// Explicit "top of thread" id from the reply header, when present.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub top_thread_id: Option<TopicId>,

    /// Whether the replied-to message is itself a thread opener.
    #[serde(default)]
    pub to_topic_opener: bool,
}

/// Metadata for media attached to a source message.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AttachmentInfo {
    /// What kind of media this is.
    pub kind: AttachmentKind,

    /// Original filename, when the platform provides one. Photos, voice
    /// notes, and stickers typically have none.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub filename: Option<String>,

    /// Opaque platform handle used to fetch the media content.
    pub file_id: String,
}

/// Kind of attached media.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AttachmentKind {
    /// Image/photo.
    Photo,

    /// Generic document/file.
    Document,

    /// Audio file.
    Audio,

    /// Voice note.
    Voice,

    /// Video file.
    Video,

    /// Sticker.
    Sticker,
}
