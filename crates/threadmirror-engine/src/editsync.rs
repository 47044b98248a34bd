//! Edit propagation from source messages to their replicas.

use crate::mapping::IdMapping;
use crate::routes::Route;
use crate::transport::Transport;
use std::sync::Arc;
use threadmirror_core::types::{MessageId, SpaceId};
use tracing::{debug, warn};

/// Outcome of propagating one edit under one route.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditOutcome {
    /// The replica was updated.
    Edited,

    /// The source message was never replicated under this route; there
    /// is nothing to update. Not an error.
    Skipped,

    /// The transport rejected the edit. Logged, not retried; edits are
    /// best-effort.
    Failed,
}

/// Re-issues edited source text against the mapped replica.
pub struct EditSynchronizer {
    transport: Arc<dyn Transport>,
    target_space: SpaceId,
}

impl EditSynchronizer {
    /// Create a synchronizer editing replicas in `target_space`.
    pub fn new(transport: Arc<dyn Transport>, target_space: SpaceId) -> Self {
        Self {
            transport,
            target_space,
        }
    }

    /// Propagate an edit of `source` to its replica under `route`.
    pub async fn sync_edit(
        &self,
        route: &Route,
        mapping: &IdMapping,
        source: MessageId,
        new_text: &str,
    ) -> EditOutcome {
        let Some(replicated) = mapping.resolve(source) else {
            debug!(source = %source, route = %route, "edit for unmapped message, skipping");
            return EditOutcome::Skipped;
        };

        match self
            .transport
            .edit_message(self.target_space, replicated, new_text)
            .await
        {
            Ok(()) => {
                debug!(source = %source, replicated = %replicated, route = %route, "edit propagated");
                EditOutcome::Edited
            }
            Err(e) => {
                warn!(
                    source = %source,
                    replicated = %replicated,
                    route = %route,
                    error = %e,
                    "edit failed"
                );
                EditOutcome::Failed
            }
        }
    }
}
