//! Topic-scoped message replication engine.
//!
//! Mirrors messages from topics in a source conversation space into
//! corresponding topics in a target space, preserving reply structure and
//! propagating edits. One inbound event stream feeds any number of
//! independent route pipelines, each owning its own id mapping.

pub mod classifier;
pub mod delivery;
pub mod editsync;
pub mod engine;
pub mod error;
pub mod mapping;
pub mod relay;
pub mod routes;
pub mod transport;

#[cfg(feature = "telegram")]
pub mod telegram;

pub use delivery::{DeliveryConfig, DeliveryExecutor, DeliveryOutcome};
pub use editsync::{EditOutcome, EditSynchronizer};
pub use engine::{Engine, EngineConfig};
pub use error::BridgeError;
pub use mapping::IdMapping;
pub use relay::{MediaRelay, RelayOutcome, ScopedAttachment, MEDIA_UNAVAILABLE_TEXT};
pub use routes::{Route, RouteTable};
pub use transport::{DownloadDest, OutboundPayload, Transport, TransportError};

/// Result type for engine operations.
pub type Result<T> = std::result::Result<T, BridgeError>;
