//! Topic classification of inbound messages.

use threadmirror_core::types::{SourceMessage, TopicId};

/// Derive the logical topic of a source message from its reply metadata.
///
/// The platform encodes thread membership differently for a thread's
/// opening message than for its replies, so classification is a three-way
/// disambiguation, in this exact precedence order:
///
/// 1. no reply metadata at all: the message belongs to the general,
///    non-topic stream (`None`);
/// 2. the reply header carries an explicit top-of-thread id: that id is
///    the topic;
/// 3. the replied-to message is itself a topic opener: the topic is the
///    replied-to message's id;
/// 4. otherwise it is a plain reply with no topic marker: general stream.
pub fn classify(message: &SourceMessage) -> Option<TopicId> {
    let reply = message.reply.as_ref()?;

    if let Some(top) = reply.top_thread_id {
        return Some(top);
    }

    if reply.to_topic_opener {
        return Some(TopicId::from(reply.to_message_id));
    }

    None
}
