//! End-to-end replication scenarios against the mock transport.

use threadmirror_core::types::{AttachmentInfo, AttachmentKind, MessageId, SourceEvent, TopicId};
use threadmirror_engine::{RouteTable, MEDIA_UNAVAILABLE_TEXT};
use threadmirror_integration_tests::{
    general_message, run_engine, topic_message, MockTransport, SendResponse,
};

fn single_route() -> RouteTable {
    RouteTable::new([(Some(TopicId::new(674)), TopicId::new(12))])
}

#[tokio::test]
async fn reply_chain_survives_replication() {
    let transport = MockTransport::new();
    let scratch = tempfile::tempdir().unwrap();

    run_engine(
        transport.clone(),
        single_route(),
        scratch.path(),
        vec![
            SourceEvent::Message(topic_message(100, 674, None)),
            SourceEvent::Message(topic_message(101, 674, Some(100))),
        ],
    )
    .await;

    let sent = transport.sent();
    assert_eq!(sent.len(), 2);
    // A opened the chain, B replies to A's replica.
    assert_eq!(sent[0].reply_to, None);
    assert_eq!(sent[0].topic_anchor, Some(TopicId::new(12)));
    assert_eq!(sent[1].reply_to, Some(MessageId::new(9001)));
}

#[tokio::test]
async fn unmapped_reply_falls_back_to_topic_root() {
    let transport = MockTransport::new();
    let scratch = tempfile::tempdir().unwrap();

    // 999 was never delivered, so C anchors to the target topic instead.
    run_engine(
        transport.clone(),
        single_route(),
        scratch.path(),
        vec![SourceEvent::Message(topic_message(200, 674, Some(999)))],
    )
    .await;

    let sent = transport.sent();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].reply_to, None);
    assert_eq!(sent[0].topic_anchor, Some(TopicId::new(12)));
}

#[tokio::test]
async fn edit_reaches_the_replica() {
    let transport = MockTransport::new();
    let scratch = tempfile::tempdir().unwrap();

    run_engine(
        transport.clone(),
        single_route(),
        scratch.path(),
        vec![
            SourceEvent::Message(topic_message(100, 674, None)),
            SourceEvent::Edited {
                id: MessageId::new(100),
                new_text: "updated".into(),
            },
        ],
    )
    .await;

    let edits = transport.edits();
    assert_eq!(edits.len(), 1);
    assert_eq!(edits[0].message, MessageId::new(9001));
    assert_eq!(edits[0].new_text, "updated");
}

#[tokio::test]
async fn edit_of_unreplicated_message_is_a_noop() {
    let transport = MockTransport::new();
    let scratch = tempfile::tempdir().unwrap();

    run_engine(
        transport.clone(),
        single_route(),
        scratch.path(),
        vec![SourceEvent::Edited {
            id: MessageId::new(555),
            new_text: "updated".into(),
        }],
    )
    .await;

    assert!(transport.edits().is_empty());
    assert!(transport.sent().is_empty());
}

#[tokio::test(start_paused = true)]
async fn rate_limited_send_waits_and_retries() {
    let transport = MockTransport::new();
    transport.script_send(SendResponse::RateLimited(3));
    transport.script_send(SendResponse::Ok);
    let scratch = tempfile::tempdir().unwrap();

    run_engine(
        transport.clone(),
        single_route(),
        scratch.path(),
        vec![SourceEvent::Message(topic_message(100, 674, None))],
    )
    .await;

    let sent = transport.sent();
    assert_eq!(sent.len(), 2);
    assert_eq!(sent[0], sent[1]);
}

#[tokio::test]
async fn dropped_message_leaves_no_mapping() {
    let transport = MockTransport::new();
    transport.script_send(SendResponse::Fail("forbidden"));
    let scratch = tempfile::tempdir().unwrap();

    // A is dropped, so B cannot resolve its reply and anchors instead.
    run_engine(
        transport.clone(),
        single_route(),
        scratch.path(),
        vec![
            SourceEvent::Message(topic_message(100, 674, None)),
            SourceEvent::Message(topic_message(101, 674, Some(100))),
            SourceEvent::Edited {
                id: MessageId::new(100),
                new_text: "updated".into(),
            },
        ],
    )
    .await;

    let sent = transport.sent();
    assert_eq!(sent.len(), 2);
    assert_eq!(sent[1].reply_to, None);
    // The edit of the dropped message goes nowhere.
    assert!(transport.edits().is_empty());
}

#[tokio::test]
async fn failed_download_sends_placeholder_text() {
    let transport = MockTransport::new();
    transport.fail_downloads();
    let scratch = tempfile::tempdir().unwrap();

    let mut message = topic_message(100, 674, None);
    message.text = "look at this".into();
    message.attachment = Some(AttachmentInfo {
        kind: AttachmentKind::Photo,
        filename: None,
        file_id: "photo-1".into(),
    });

    run_engine(
        transport.clone(),
        single_route(),
        scratch.path(),
        vec![SourceEvent::Message(message)],
    )
    .await;

    let sent = transport.sent();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].text, MEDIA_UNAVAILABLE_TEXT);
    assert!(sent[0].attachment.is_none());
}

#[tokio::test]
async fn sticker_caption_is_cleared_and_scratch_cleaned() {
    let transport = MockTransport::new();
    let scratch = tempfile::tempdir().unwrap();

    let mut message = topic_message(100, 674, None);
    message.text = "sticker caption".into();
    message.attachment = Some(AttachmentInfo {
        kind: AttachmentKind::Sticker,
        filename: None,
        file_id: "sticker-1".into(),
    });

    run_engine(
        transport.clone(),
        single_route(),
        scratch.path(),
        vec![SourceEvent::Message(message)],
    )
    .await;

    let sent = transport.sent();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].text, "");
    assert!(sent[0].attachment.is_some());

    // Transient storage is gone once delivery concluded.
    let mut entries = tokio::fs::read_dir(scratch.path()).await.unwrap();
    assert!(entries.next_entry().await.unwrap().is_none());
}

#[tokio::test]
async fn named_attachment_keeps_its_filename() {
    let transport = MockTransport::new();
    let scratch = tempfile::tempdir().unwrap();

    let mut message = topic_message(100, 674, None);
    message.attachment = Some(AttachmentInfo {
        kind: AttachmentKind::Document,
        filename: Some("report.pdf".into()),
        file_id: "doc-1".into(),
    });

    run_engine(
        transport.clone(),
        single_route(),
        scratch.path(),
        vec![SourceEvent::Message(message)],
    )
    .await;

    let sent = transport.sent();
    assert_eq!(sent.len(), 1);
    let path = sent[0].attachment.as_ref().unwrap();
    assert_eq!(path.file_name().unwrap().to_str(), Some("report.pdf"));
}

#[tokio::test]
async fn general_stream_routes_independently_of_topics() {
    let transport = MockTransport::new();
    let scratch = tempfile::tempdir().unwrap();

    let routes = RouteTable::new([
        (Some(TopicId::new(674)), TopicId::new(12)),
        (None, TopicId::new(5)),
    ]);

    run_engine(
        transport.clone(),
        routes,
        scratch.path(),
        vec![
            SourceEvent::Message(general_message(300)),
            SourceEvent::Message(topic_message(301, 674, None)),
            // A topic nobody bridges is silently skipped.
            SourceEvent::Message(topic_message(302, 999, None)),
        ],
    )
    .await;

    let sent = transport.sent();
    assert_eq!(sent.len(), 2);
    let mut anchors: Vec<_> = sent.iter().map(|p| p.topic_anchor).collect();
    anchors.sort();
    assert_eq!(anchors, vec![Some(TopicId::new(5)), Some(TopicId::new(12))]);
}

#[tokio::test]
async fn same_source_maps_separately_per_route() {
    let transport = MockTransport::new();
    let scratch = tempfile::tempdir().unwrap();

    // Two routes watch the same topic; each keeps its own mapping, so
    // the reply resolves to that route's own replica of message 100.
    let routes = RouteTable::new([
        (Some(TopicId::new(674)), TopicId::new(12)),
        (Some(TopicId::new(674)), TopicId::new(90)),
    ]);

    run_engine(
        transport.clone(),
        routes,
        scratch.path(),
        vec![
            SourceEvent::Message(topic_message(100, 674, None)),
            SourceEvent::Message(topic_message(101, 674, Some(100))),
        ],
    )
    .await;

    let sent = transport.sent();
    assert_eq!(sent.len(), 4);
    for payload in &sent {
        if payload.reply_to.is_some() {
            // Replies reference a replica of 100, never a source id.
            assert!(payload.reply_to.unwrap().get() > 9000);
        }
    }
    let replies = sent.iter().filter(|p| p.reply_to.is_some()).count();
    assert_eq!(replies, 2);
}
