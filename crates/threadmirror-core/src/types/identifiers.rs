//! Strongly-typed platform identifiers.
//!
//! All three are thin wrappers over the platform's integral ids. Keeping
//! them as distinct types prevents a source message id from being handed
//! to an API that expects a topic or a conversation space.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifier of a single message within a conversation space.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MessageId(i64);

impl MessageId {
    /// Create a new message ID.
    pub const fn new(id: i64) -> Self {
        Self(id)
    }

    /// Get the raw platform value.
    pub const fn get(self) -> i64 {
        self.0
    }
}

impl fmt::Display for MessageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<i64> for MessageId {
    fn from(id: i64) -> Self {
        Self(id)
    }
}

/// Identifier of a discussion topic within a conversation space.
///
/// A topic is identified by the id of its opening message, so a
/// [`MessageId`] converts into a `TopicId` when the message is known to
/// open a thread. Topic ids are only comparable within one space.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TopicId(i64);

impl TopicId {
    /// Create a new topic ID.
    pub const fn new(id: i64) -> Self {
        Self(id)
    }

    /// Get the raw platform value.
    pub const fn get(self) -> i64 {
        self.0
    }
}

impl fmt::Display for TopicId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<i64> for TopicId {
    fn from(id: i64) -> Self {
        Self(id)
    }
}

impl From<MessageId> for TopicId {
    fn from(id: MessageId) -> Self {
        Self(id.get())
    }
}

/// Identifier of a conversation space (group/channel).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SpaceId(i64);

impl SpaceId {
    /// Create a new space ID.
    pub const fn new(id: i64) -> Self {
        Self(id)
    }

    /// Get the raw platform value.
    pub const fn get(self) -> i64 {
        self.0
    }
}

impl fmt::Display for SpaceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<i64> for SpaceId {
    fn from(id: i64) -> Self {
        Self(id)
    }
}
