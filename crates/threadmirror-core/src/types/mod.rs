//! Shared type definitions.

mod identifiers;
mod message;

pub use identifiers::{MessageId, SpaceId, TopicId};
pub use message::{AttachmentInfo, AttachmentKind, ReplyInfo, SourceEvent, SourceMessage};
