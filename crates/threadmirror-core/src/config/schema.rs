//! Configuration schema definitions.

use crate::types::{SpaceId, TopicId};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Main ThreadMirror configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Source conversation space to mirror from.
    pub source_space: SpaceId,

    /// Target conversation space to mirror into.
    pub target_space: SpaceId,

    /// Replication routes: source topic (or the general stream) paired
    /// with a target topic. Each route runs its own pipeline.
    #[serde(default)]
    pub routes: Vec<RouteConfig>,

    /// Delivery behavior.
    #[serde(default)]
    pub delivery: DeliverySection,

    /// Media relay settings.
    #[serde(default)]
    pub relay: RelaySection,

    /// Id mapping settings.
    #[serde(default)]
    pub mapping: MappingSection,

    /// Logging settings.
    #[serde(default)]
    pub logging: LoggingSection,
}

/// One configured replication route.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RouteConfig {
    /// Source topic to mirror. Absent means the space's general,
    /// non-topic stream.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_topic: Option<TopicId>,

    /// Target topic the replicas are anchored to.
    pub target_topic: TopicId,
}

/// Delivery executor settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeliverySection {
    /// Cap on consecutive rate-limit retries per message. `None` retries
    /// for as long as the platform keeps asking us to wait.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_rate_limit_retries: Option<u32>,

    /// Timeout for a single send attempt, in seconds.
    #[serde(default = "default_send_timeout_secs")]
    pub send_timeout_secs: u64,
}

impl Default for DeliverySection {
    fn default() -> Self {
        Self {
            max_rate_limit_retries: None,
            send_timeout_secs: default_send_timeout_secs(),
        }
    }
}

fn default_send_timeout_secs() -> u64 {
    120
}

/// Media relay settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RelaySection {
    /// Scratch directory for transient attachment downloads. Defaults to
    /// a `threadmirror` subdirectory of the system temp dir.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scratch_dir: Option<PathBuf>,
}

/// Id mapping settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MappingSection {
    /// Soft cap on entries per route. Crossing it logs a warning but
    /// does not evict anything; reply resolution must keep working for
    /// the lifetime of a thread.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_entries: Option<usize>,
}

/// Logging settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LoggingSection {
    /// Tracing filter directive, e.g. `threadmirror=debug`. Overridden
    /// by `RUST_LOG` when that is set.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filter: Option<String>,
}
