//! Observable state store
//!
//! The store owns the one `ConfiguratorState` of the session. Readers borrow
//! it; writers go through `mutate`, which tags the write
//! with a topic, bumps the revision and queues a change notification for every
//! subscriber interested in that topic. Subscribers drain their queue once per
//! frame, so a burst of writes is seen as a list of changes rather than a
//! cascade of callbacks.

use super::ConfiguratorState;

/// Area of the state a write touched
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Topic {
    /// Model identity and asset paths
    Model,
    /// Quality tier and LOD mode
    Lod,
    Camera,
    Decal,
    /// Decal target, selected and outlined part
    Selection,
    /// Per-part colors
    Items,
    Material,
    Lights,
    /// Shadows, orbit and float toggles
    Scene,
}

impl Topic {
    pub const ALL: [Topic; 9] = [
        Topic::Model,
        Topic::Lod,
        Topic::Camera,
        Topic::Decal,
        Topic::Selection,
        Topic::Items,
        Topic::Material,
        Topic::Lights,
        Topic::Scene,
    ];
}

/// One notification delivered to a subscriber
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Change {
    pub topic: Topic,
    /// Store revision right after the write
    pub revision: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u32);

/// A queue for changes collected between drains
#[derive(Debug, Default)]
struct ChangeQueue {
    changes: Vec<Change>,
}

impl ChangeQueue {
    fn send(&mut self, change: Change) {
        // Coalesce repeated writes to the same topic into the latest one
        if let Some(existing) = self.changes.iter_mut().find(|c| c.topic == change.topic) {
            existing.revision = change.revision;
        } else {
            self.changes.push(change);
        }
    }

    fn drain(&mut self) -> Vec<Change> {
        std::mem::take(&mut self.changes)
    }

    fn is_empty(&self) -> bool {
        self.changes.is_empty()
    }
}

struct Subscriber {
    id: SubscriptionId,
    topics: Vec<Topic>,
    queue: ChangeQueue,
}

pub struct StateStore {
    state: ConfiguratorState,
    revision: u64,
    subscribers: Vec<Subscriber>,
    next_id: u32,
}

impl StateStore {
    pub fn new(state: ConfiguratorState) -> Self {
        Self {
            state,
            revision: 0,
            subscribers: Vec::new(),
            next_id: 0,
        }
    }

    /// Borrow the current state
    pub fn read(&self) -> &ConfiguratorState {
        &self.state
    }

    /// Deep copy of the current state
    #[cfg(test)]
    pub fn snapshot(&self) -> ConfiguratorState {
        self.state.clone()
    }

    /// Number of writes so far
    #[cfg(test)]
    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// Apply a write tagged with one topic
    pub fn mutate<R>(&mut self, topic: Topic, write: impl FnOnce(&mut ConfiguratorState) -> R) -> R {
        self.mutate_all(&[topic], write)
    }

    /// Apply a write that touches several areas at once
    ///
    /// Subscribers see every listed topic at the same revision.
    pub fn mutate_all<R>(
        &mut self,
        topics: &[Topic],
        write: impl FnOnce(&mut ConfiguratorState) -> R,
    ) -> R {
        let result = write(&mut self.state);
        self.revision += 1;
        for &topic in topics {
            let change = Change {
                topic,
                revision: self.revision,
            };
            for subscriber in &mut self.subscribers {
                if subscriber.topics.contains(&topic) {
                    subscriber.queue.send(change);
                }
            }
        }
        result
    }

    /// Register interest in some topics (an empty slice means all of them)
    pub fn subscribe(&mut self, topics: &[Topic]) -> SubscriptionId {
        let id = SubscriptionId(self.next_id);
        self.next_id += 1;
        let topics = if topics.is_empty() {
            Topic::ALL.to_vec()
        } else {
            topics.to_vec()
        };
        self.subscribers.push(Subscriber {
            id,
            topics,
            queue: ChangeQueue::default(),
        });
        id
    }

    #[cfg(test)]
    pub fn unsubscribe(&mut self, id: SubscriptionId) {
        self.subscribers.retain(|s| s.id != id);
    }

    /// Take every change queued for a subscriber since its last drain
    pub fn drain(&mut self, id: SubscriptionId) -> Vec<Change> {
        self.subscribers
            .iter_mut()
            .find(|s| s.id == id)
            .map(|s| s.queue.drain())
            .unwrap_or_default()
    }

    pub fn has_pending(&self, id: SubscriptionId) -> bool {
        self.subscribers
            .iter()
            .any(|s| s.id == id && !s.queue.is_empty())
    }
}
