//! Route descriptors and the static route table.

use std::collections::HashMap;
use std::fmt;
use threadmirror_core::config::RouteConfig;
use threadmirror_core::types::TopicId;

/// One configured replication route: a source topic (or the general
/// stream) paired with a target topic. Immutable after construction; each
/// route owns exactly one pipeline and shares no state with the others.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Route {
    /// Position in the route table; used to address the route's worker.
    pub index: usize,

    /// Source topic to mirror. `None` means the general stream.
    pub source_topic: Option<TopicId>,

    /// Target topic the replicas are anchored to.
    pub target_topic: TopicId,
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.source_topic {
            Some(topic) => write!(f, "topic {} -> topic {}", topic, self.target_topic),
            None => write!(f, "general -> topic {}", self.target_topic),
        }
    }
}

/// Static table of configured routes, indexed by source topic.
///
/// Lookup never fails: a topic no route covers simply yields nothing,
/// and the message is skipped. More than one route may match the same
/// topic; all of them get the message.
#[derive(Debug, Clone, Default)]
pub struct RouteTable {
    routes: Vec<Route>,
    by_topic: HashMap<Option<TopicId>, Vec<usize>>,
}

impl RouteTable {
    /// Build a table from (source topic, target topic) pairs.
    pub fn new(pairs: impl IntoIterator<Item = (Option<TopicId>, TopicId)>) -> Self {
        let mut routes = Vec::new();
        let mut by_topic: HashMap<Option<TopicId>, Vec<usize>> = HashMap::new();

        for (source_topic, target_topic) in pairs {
            let index = routes.len();
            routes.push(Route {
                index,
                source_topic,
                target_topic,
            });
            by_topic.entry(source_topic).or_default().push(index);
        }

        Self { routes, by_topic }
    }

    /// Build a table from the configuration's route list.
    pub fn from_config(routes: &[RouteConfig]) -> Self {
        Self::new(routes.iter().map(|r| (r.source_topic, r.target_topic)))
    }

    /// All configured routes, in configuration order.
    pub fn routes(&self) -> &[Route] {
        &self.routes
    }

    /// Every route whose source topic matches the given topic, in
    /// configuration order.
    pub fn routes_for(&self, topic: Option<TopicId>) -> Vec<Route> {
        self.by_topic
            .get(&topic)
            .map(|indices| indices.iter().map(|&i| self.routes[i]).collect())
            .unwrap_or_default()
    }

    /// Number of configured routes.
    pub fn len(&self) -> usize {
        self.routes.len()
    }

    /// Whether the table is empty.
    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }
}
