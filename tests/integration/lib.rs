//! Shared fixtures for integration tests: a scripted mock transport and
//! helpers for driving the engine over a fixed event sequence.

use async_trait::async_trait;
use std::collections::VecDeque;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, AtomicI64, Ordering};
use std::sync::{Arc, Mutex};
use threadmirror_core::types::{MessageId, ReplyInfo, SourceEvent, SourceMessage, SpaceId, TopicId};
use threadmirror_engine::{
    DeliveryConfig, DownloadDest, Engine, EngineConfig, OutboundPayload, RouteTable, Transport,
    TransportError,
};
use tokio::sync::mpsc;

/// Target space used by all fixtures.
pub const TARGET_SPACE: SpaceId = SpaceId::new(-100_222);

/// Scripted response for one send attempt.
#[derive(Debug, Clone)]
pub enum SendResponse {
    /// Succeed with the next sequential replica id.
    Ok,
    /// Signal backpressure for the given number of seconds.
    RateLimited(u64),
    /// Fail with a non-retriable transport error.
    Fail(&'static str),
}

/// A recorded edit call.
#[derive(Debug, Clone)]
pub struct EditRecord {
    pub message: MessageId,
    pub new_text: String,
}

/// Mock transport. Sends succeed with sequential ids starting at 9001
/// unless a script is installed; downloads write a dummy file unless
/// told to fail.
pub struct MockTransport {
    next_id: AtomicI64,
    script: Mutex<VecDeque<SendResponse>>,
    sends: Mutex<Vec<OutboundPayload>>,
    edits: Mutex<Vec<EditRecord>>,
    fail_downloads: AtomicBool,
}

impl MockTransport {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            next_id: AtomicI64::new(9000),
            script: Mutex::new(VecDeque::new()),
            sends: Mutex::new(Vec::new()),
            edits: Mutex::new(Vec::new()),
            fail_downloads: AtomicBool::new(false),
        })
    }

    /// Queue a scripted response for the next send attempt.
    pub fn script_send(&self, response: SendResponse) {
        self.script.lock().unwrap().push_back(response);
    }

    /// Make every download fail from now on.
    pub fn fail_downloads(&self) {
        self.fail_downloads.store(true, Ordering::SeqCst);
    }

    /// All payloads handed to `send_message`, in order.
    pub fn sent(&self) -> Vec<OutboundPayload> {
        self.sends.lock().unwrap().clone()
    }

    /// All recorded edit calls, in order.
    pub fn edits(&self) -> Vec<EditRecord> {
        self.edits.lock().unwrap().clone()
    }
}

#[async_trait]
impl Transport for MockTransport {
    async fn send_message(
        &self,
        _space: SpaceId,
        payload: &OutboundPayload,
    ) -> Result<MessageId, TransportError> {
        self.sends.lock().unwrap().push(payload.clone());

        let response = self
            .script
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or(SendResponse::Ok);
        match response {
            SendResponse::Ok => Ok(MessageId::new(
                self.next_id.fetch_add(1, Ordering::SeqCst) + 1,
            )),
            SendResponse::RateLimited(secs) => Err(TransportError::RateLimited {
                retry_after_secs: secs,
            }),
            SendResponse::Fail(reason) => Err(TransportError::Send(reason.into())),
        }
    }

    async fn edit_message(
        &self,
        _space: SpaceId,
        message: MessageId,
        new_text: &str,
    ) -> Result<(), TransportError> {
        self.edits.lock().unwrap().push(EditRecord {
            message,
            new_text: new_text.into(),
        });
        Ok(())
    }

    async fn download_attachment(
        &self,
        _message: &SourceMessage,
        dest: DownloadDest,
    ) -> Result<PathBuf, TransportError> {
        if self.fail_downloads.load(Ordering::SeqCst) {
            return Err(TransportError::Download("gone".into()));
        }
        let path = match dest {
            DownloadDest::File(path) => path,
            DownloadDest::Dir(dir) => dir.join("media.bin"),
        };
        tokio::fs::write(&path, b"media")
            .await
            .map_err(|e| TransportError::Download(e.to_string()))?;
        Ok(path)
    }
}

/// Drive the engine over the given events until completion.
pub async fn run_engine(
    transport: Arc<MockTransport>,
    routes: RouteTable,
    scratch: &Path,
    events: Vec<SourceEvent>,
) {
    let config = EngineConfig {
        target_space: TARGET_SPACE,
        scratch_root: scratch.to_path_buf(),
        delivery: DeliveryConfig::default(),
        mapping_soft_limit: None,
        queue_capacity: 64,
    };
    let engine = Engine::new(routes, transport, config);

    let (tx, rx) = mpsc::channel(64);
    for event in events {
        tx.send(event).await.unwrap();
    }
    drop(tx);

    engine.run(rx).await.unwrap();
}

/// A message inside a topic, optionally replying to another message.
pub fn topic_message(id: i64, topic: i64, reply_to: Option<i64>) -> SourceMessage {
    SourceMessage {
        id: MessageId::new(id),
        text: format!("message {id}"),
        reply: Some(ReplyInfo {
            to_message_id: reply_to
                .map(MessageId::new)
                .unwrap_or_else(|| MessageId::new(topic)),
            top_thread_id: Some(TopicId::new(topic)),
            to_topic_opener: reply_to.is_none(),
        }),
        ..Default::default()
    }
}

/// A message on the general, non-topic stream.
pub fn general_message(id: i64) -> SourceMessage {
    SourceMessage {
        id: MessageId::new(id),
        text: format!("message {id}"),
        ..Default::default()
    }
}
