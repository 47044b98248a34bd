//! Delivery executor: outbound payload assembly and rate-limit backoff.

use crate::relay::{RelayOutcome, MEDIA_UNAVAILABLE_TEXT};
use crate::routes::Route;
use crate::transport::{OutboundPayload, Transport, TransportError};
use std::sync::Arc;
use std::time::Duration;
use threadmirror_core::types::{MessageId, SourceMessage, SpaceId};
use tracing::{debug, info, warn};

/// Configuration for the delivery executor.
#[derive(Debug, Clone)]
pub struct DeliveryConfig {
    /// Cap on consecutive rate-limit retries for one message. `None`
    /// retries for as long as the platform keeps signaling backpressure,
    /// which matches how the platform expects well-behaved clients to
    /// act on a low-volume stream.
    pub max_rate_limit_retries: Option<u32>,

    /// Timeout for a single send attempt. A hung transport call drops
    /// the message instead of stalling its route forever.
    pub send_timeout: Duration,
}

impl Default for DeliveryConfig {
    fn default() -> Self {
        Self {
            max_rate_limit_retries: None,
            send_timeout: Duration::from_secs(120),
        }
    }
}

/// Result of a delivery attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeliveryOutcome {
    /// The replica was sent; this is its id in the target space.
    Delivered(MessageId),

    /// The message was dropped for this route: no mapping entry, no
    /// further processing. Only rate limiting is retried; every other
    /// transport error lands here immediately.
    Dropped,
}

/// Sends replicated messages through the transport, absorbing rate
/// limits by waiting exactly as long as the platform asks and retrying
/// the identical send.
pub struct DeliveryExecutor {
    transport: Arc<dyn Transport>,
    target_space: SpaceId,
    config: DeliveryConfig,
}

impl DeliveryExecutor {
    /// Create an executor sending into `target_space`.
    pub fn new(
        transport: Arc<dyn Transport>,
        target_space: SpaceId,
        config: DeliveryConfig,
    ) -> Self {
        Self {
            transport,
            target_space,
            config,
        }
    }

    /// Replicate `message` under `route`.
    ///
    /// `reply_to` is the already-resolved replica of the message's reply
    /// target; `media` is the relay outcome when the source carried an
    /// attachment. The caller records the mapping entry on success and
    /// releases the attachment afterwards on every path.
    pub async fn deliver(
        &self,
        route: &Route,
        message: &SourceMessage,
        reply_to: Option<MessageId>,
        media: Option<&RelayOutcome>,
    ) -> DeliveryOutcome {
        let payload = build_payload(route, message, reply_to, media);
        let mut rate_limit_retries = 0u32;

        loop {
            let attempt = self.transport.send_message(self.target_space, &payload);
            let result = match tokio::time::timeout(self.config.send_timeout, attempt).await {
                Ok(result) => result,
                Err(_) => {
                    warn!(
                        source = %message.id,
                        route = %route,
                        timeout_secs = self.config.send_timeout.as_secs(),
                        "send attempt timed out, dropping message"
                    );
                    return DeliveryOutcome::Dropped;
                }
            };

            match result {
                Ok(replicated) => {
                    debug!(
                        source = %message.id,
                        replicated = %replicated,
                        route = %route,
                        "message replicated"
                    );
                    return DeliveryOutcome::Delivered(replicated);
                }
                Err(TransportError::RateLimited { retry_after_secs }) => {
                    rate_limit_retries += 1;
                    if let Some(cap) = self.config.max_rate_limit_retries {
                        if rate_limit_retries > cap {
                            warn!(
                                source = %message.id,
                                route = %route,
                                retries = rate_limit_retries - 1,
                                "rate-limit retries exhausted, dropping message"
                            );
                            return DeliveryOutcome::Dropped;
                        }
                    }
                    info!(
                        source = %message.id,
                        route = %route,
                        wait_secs = retry_after_secs,
                        "rate limited, waiting before retry"
                    );
                    tokio::time::sleep(Duration::from_secs(retry_after_secs)).await;
                }
                Err(e) => {
                    warn!(
                        source = %message.id,
                        route = %route,
                        error = %e,
                        "delivery failed, dropping message"
                    );
                    return DeliveryOutcome::Dropped;
                }
            }
        }
    }
}

/// Assemble the outbound payload for one replication attempt.
///
/// Text precedence: failed media wins with the placeholder, stickers
/// send with an empty caption, everything else keeps the source text.
/// The replica is anchored to the route's target topic; the reply link
/// is attached only when the chain resolved.
fn build_payload(
    route: &Route,
    message: &SourceMessage,
    reply_to: Option<MessageId>,
    media: Option<&RelayOutcome>,
) -> OutboundPayload {
    let text = match media {
        Some(RelayOutcome::Unavailable) => MEDIA_UNAVAILABLE_TEXT.to_string(),
        _ if message.is_sticker() => String::new(),
        _ => message.text.clone(),
    };

    let attachment = match media {
        Some(RelayOutcome::Attached(attachment)) => Some(attachment.path().to_path_buf()),
        _ => None,
    };

    OutboundPayload {
        text,
        reply_to,
        topic_anchor: Some(route.target_topic),
        attachment,
        html: message.has_formatting,
        ..Default::default()
    }
}
