//! Per-route id mapping between source and replicated messages.

use std::collections::HashMap;
use threadmirror_core::types::MessageId;
use tracing::warn;

/// Table translating source message ids to the ids of their replicas in
/// the target space.
///
/// Each route owns exactly one `IdMapping`; the same source message can
/// map to different replica ids under different routes. An entry is
/// recorded exactly once, immediately after a successful send, and is
/// never removed for the lifetime of the process: a missing entry means
/// "never successfully replicated under this route", which is what both
/// reply resolution and edit propagation key off.
#[derive(Debug, Default)]
pub struct IdMapping {
    entries: HashMap<MessageId, MessageId>,
    soft_limit: Option<usize>,
    limit_warned: bool,
}

impl IdMapping {
    /// Create an empty mapping.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty mapping with a soft size limit. Crossing the
    /// limit logs a warning (once) but evicts nothing.
    pub fn with_soft_limit(limit: Option<usize>) -> Self {
        Self {
            entries: HashMap::new(),
            soft_limit: limit,
            limit_warned: false,
        }
    }

    /// Record that `source` was replicated as `replicated`.
    pub fn record(&mut self, source: MessageId, replicated: MessageId) {
        if let Some(previous) = self.entries.insert(source, replicated) {
            // Duplicate inbound ids are not expected from the transport.
            warn!(
                source = %source,
                previous = %previous,
                replicated = %replicated,
                "source message mapped twice, keeping latest"
            );
        }

        if let Some(limit) = self.soft_limit {
            if !self.limit_warned && self.entries.len() > limit {
                self.limit_warned = true;
                warn!(
                    entries = self.entries.len(),
                    limit, "id mapping exceeded its soft limit; memory will keep growing"
                );
            }
        }
    }

    /// Look up the replica id for a source message, if it was ever
    /// successfully replicated under this route.
    pub fn resolve(&self, source: MessageId) -> Option<MessageId> {
        self.entries.get(&source).copied()
    }

    /// Resolve a reply target: the replica of the message being replied
    /// to, when that parent was replicated under this route.
    ///
    /// `None` (no reply, or unmapped parent) means the replica is sent
    /// anchored to the route's target topic instead of as a reply;
    /// losing a reply link is preferable to dropping the message.
    pub fn resolve_reply(&self, reply_to: Option<MessageId>) -> Option<MessageId> {
        reply_to.and_then(|id| self.resolve(id))
    }

    /// Number of recorded entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the mapping is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
