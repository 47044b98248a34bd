//! Engine orchestration: event intake and per-route worker pipelines.
//!
//! One inbound event stream drives everything. Each configured route gets
//! a dedicated worker task that exclusively owns that route's id mapping,
//! so per-route delivery order is inherent (one in-flight delivery per
//! route at a time) and routes never contend on shared state. A
//! rate-limit wait therefore stalls only its own route; the other
//! pipelines keep draining their queues.

use crate::classifier;
use crate::delivery::{DeliveryConfig, DeliveryExecutor, DeliveryOutcome};
use crate::editsync::EditSynchronizer;
use crate::error::BridgeError;
use crate::mapping::IdMapping;
use crate::relay::{MediaRelay, RelayOutcome};
use crate::routes::{Route, RouteTable};
use crate::transport::Transport;
use crate::Result;
use std::path::PathBuf;
use std::sync::Arc;
use threadmirror_core::config::Config;
use threadmirror_core::types::{MessageId, SourceEvent, SourceMessage, SpaceId};
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

/// Engine settings, independent of the transport backend.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Target conversation space replicas are sent into.
    pub target_space: SpaceId,

    /// Scratch root for transient attachment downloads.
    pub scratch_root: PathBuf,

    /// Delivery executor settings.
    pub delivery: DeliveryConfig,

    /// Soft cap on id-mapping entries per route (warning only).
    pub mapping_soft_limit: Option<usize>,

    /// Depth of each route worker's queue. A route that backs up past
    /// this applies backpressure to the whole intake.
    pub queue_capacity: usize,
}

impl EngineConfig {
    /// Derive engine settings from the loaded configuration.
    pub fn from_config(config: &Config) -> Self {
        Self {
            target_space: config.target_space,
            scratch_root: config
                .relay
                .scratch_dir
                .clone()
                .unwrap_or_else(MediaRelay::default_scratch_root),
            delivery: DeliveryConfig {
                max_rate_limit_retries: config.delivery.max_rate_limit_retries,
                send_timeout: std::time::Duration::from_secs(config.delivery.send_timeout_secs),
            },
            mapping_soft_limit: config.mapping.max_entries,
            queue_capacity: 1024,
        }
    }
}

/// Work handed to a route worker.
enum WorkItem {
    /// Replicate a new source message.
    Deliver(Arc<SourceMessage>),

    /// Propagate an edit. Every worker receives it and consults its own
    /// mapping; unmapped edits are silent no-ops.
    Edit { id: MessageId, new_text: Arc<str> },
}

/// The replication engine.
///
/// Constructed from its collaborators explicitly: the route table, the
/// transport client, and the settings. [`Engine::run`] consumes the
/// engine and processes the event stream until it closes.
pub struct Engine {
    routes: RouteTable,
    transport: Arc<dyn Transport>,
    config: EngineConfig,
}

impl Engine {
    /// Create an engine over the given routes and transport.
    pub fn new(routes: RouteTable, transport: Arc<dyn Transport>, config: EngineConfig) -> Self {
        Self {
            routes,
            transport,
            config,
        }
    }

    /// Process source events until the stream closes, then drain and
    /// join the route workers.
    pub async fn run(self, mut events: mpsc::Receiver<SourceEvent>) -> Result<()> {
        if self.routes.is_empty() {
            return Err(BridgeError::Internal("no routes configured".into()));
        }

        let mut senders = Vec::with_capacity(self.routes.len());
        let mut joins = Vec::with_capacity(self.routes.len());

        for route in self.routes.routes() {
            let (tx, rx) = mpsc::channel(self.config.queue_capacity);
            let worker = RouteWorker::new(*route, rx, self.transport.clone(), &self.config);
            joins.push(tokio::spawn(worker.run()));
            senders.push(tx);
        }

        info!(routes = self.routes.len(), "replication engine started");

        while let Some(event) = events.recv().await {
            match event {
                SourceEvent::Message(message) => {
                    let topic = classifier::classify(&message);
                    let matched = self.routes.routes_for(topic);
                    if matched.is_empty() {
                        debug!(source = %message.id, topic = ?topic, "no route matches, skipping");
                        continue;
                    }

                    let message = Arc::new(message);
                    for route in matched {
                        if senders[route.index]
                            .send(WorkItem::Deliver(message.clone()))
                            .await
                            .is_err()
                        {
                            warn!(route = %route, source = %message.id, "route worker gone, message lost");
                        }
                    }
                }
                SourceEvent::Edited { id, new_text } => {
                    let new_text: Arc<str> = new_text.into();
                    for (index, tx) in senders.iter().enumerate() {
                        if tx
                            .send(WorkItem::Edit {
                                id,
                                new_text: new_text.clone(),
                            })
                            .await
                            .is_err()
                        {
                            warn!(route = %self.routes.routes()[index], source = %id, "route worker gone, edit lost");
                        }
                    }
                }
            }
        }

        // Close the queues so workers drain what is left and exit.
        drop(senders);
        for join in joins {
            if join.await.is_err() {
                warn!("route worker panicked");
            }
        }

        info!("replication engine stopped");
        Ok(())
    }
}

/// One route's pipeline: resolve reply, relay media, deliver, record the
/// mapping. Exclusively owns the route's [`IdMapping`].
struct RouteWorker {
    route: Route,
    rx: mpsc::Receiver<WorkItem>,
    transport: Arc<dyn Transport>,
    mapping: IdMapping,
    relay: MediaRelay,
    executor: DeliveryExecutor,
    editsync: EditSynchronizer,
}

impl RouteWorker {
    fn new(
        route: Route,
        rx: mpsc::Receiver<WorkItem>,
        transport: Arc<dyn Transport>,
        config: &EngineConfig,
    ) -> Self {
        Self {
            route,
            rx,
            transport: transport.clone(),
            mapping: IdMapping::with_soft_limit(config.mapping_soft_limit),
            relay: MediaRelay::new(config.scratch_root.clone()),
            executor: DeliveryExecutor::new(
                transport.clone(),
                config.target_space,
                config.delivery.clone(),
            ),
            editsync: EditSynchronizer::new(transport, config.target_space),
        }
    }

    async fn run(mut self) {
        info!("mirroring {}", self.route);

        while let Some(item) = self.rx.recv().await {
            match item {
                WorkItem::Deliver(message) => self.replicate(&message).await,
                WorkItem::Edit { id, new_text } => {
                    self.editsync
                        .sync_edit(&self.route, &self.mapping, id, &new_text)
                        .await;
                }
            }
        }

        debug!(route = %self.route, "route worker stopped");
    }

    async fn replicate(&mut self, message: &SourceMessage) {
        let reply_to = self
            .mapping
            .resolve_reply(message.reply.map(|r| r.to_message_id));

        let media = match message.attachment {
            Some(_) => Some(self.relay.relay(self.transport.as_ref(), message).await),
            None => None,
        };

        let outcome = self
            .executor
            .deliver(&self.route, message, reply_to, media.as_ref())
            .await;

        // Scratch storage goes away whatever happened to the send.
        if let Some(RelayOutcome::Attached(attachment)) = media {
            attachment.release().await;
        }

        if let DeliveryOutcome::Delivered(replicated) = outcome {
            self.mapping.record(message.id, replicated);
        }
    }
}
