//! Replaying failure handler with a bounded in-memory queue.

use crate::config::ConsumerConfig;
use crate::failure::FailureHandler;
use crate::message::Message;
use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::Mutex;
use tracing::{debug, warn};

/// Bookkeeping shared between `fail`, `ack` and `next_replay`.
#[derive(Debug, Default)]
struct ReplayState {
    /// How many times each message id has been replayed.
    /// An id in this map has been delivered at least once and is neither
    /// acknowledged nor abandoned yet.
    counters: HashMap<String, u64>,

    /// FIFO of replay candidates. Length never exceeds the capacity.
    queue: VecDeque<Message>,

    /// Ids currently sitting in `queue`; maintained exactly by
    /// enqueue/dequeue so an id is queued at most once at any instant.
    queued_ids: HashSet<String>,
}

/// Handler that replays failed messages a maximum number of times.
///
/// A `max_retries` of 0 means never give up on a message; in that mode no
/// per-id counters are kept. When the replay queue is full, `fail` rejects
/// the message instead of waiting for space: the counter entry is rolled
/// back and the caller gets `false`, so backpressure is always a visible,
/// non-blocking outcome.
pub struct RetryingFailureHandler {
    max_retries: u64,
    capacity: usize,
    state: Mutex<ReplayState>,
}

impl RetryingFailureHandler {
    /// Create a handler with default tunables; `open` overwrites them
    /// from configuration.
    pub fn new() -> Self {
        Self {
            max_retries: 10,
            capacity: 1024,
            state: Mutex::new(ReplayState::default()),
        }
    }

    /// Number of messages currently queued for replay.
    pub fn queued_len(&self) -> usize {
        self.state.lock().unwrap().queue.len()
    }
}

impl Default for RetryingFailureHandler {
    fn default() -> Self {
        Self::new()
    }
}

impl FailureHandler for RetryingFailureHandler {
    fn open(&mut self, config: &ConsumerConfig) {
        self.max_retries = config.max_retries;
        self.capacity = config.max_replay_queue_size;
    }

    fn fail(&self, message: Option<Message>) -> bool {
        let Some(message) = message else {
            return false;
        };
        let id = message.id().to_string();

        let mut state = self.state.lock().unwrap();

        if self.max_retries > 0 {
            let replays = state.counters.get(&id).copied().unwrap_or(0);
            if replays >= self.max_retries {
                debug!(
                    id = %id,
                    replays = replays,
                    max_retries = self.max_retries,
                    "Abandoning message, retry cap reached"
                );
                return false;
            }
        }

        if state.queued_ids.contains(&id) {
            // Already awaiting replay; count the failure but keep one copy.
            if self.max_retries > 0 {
                *state.counters.entry(id).or_insert(0) += 1;
            }
            return true;
        }

        if self.max_retries > 0 {
            *state.counters.entry(id.clone()).or_insert(0) += 1;
        }

        if state.queue.len() >= self.capacity {
            warn!(
                id = %id,
                capacity = self.capacity,
                "Replay queue full, rejecting message"
            );
            // Roll back so a future failure starts a fresh cycle.
            state.counters.remove(&id);
            return false;
        }

        state.queued_ids.insert(id);
        state.queue.push_back(message);
        true
    }

    fn ack(&self, id: &str) {
        self.state.lock().unwrap().counters.remove(id);
    }

    fn next_replay(&self) -> Option<Message> {
        let mut state = self.state.lock().unwrap();
        let message = state.queue.pop_front()?;
        state.queued_ids.remove(message.id());
        Some(message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::failure::FailureHandlerKind;

    fn handler(max_retries: u64, capacity: usize) -> RetryingFailureHandler {
        let config = ConsumerConfig::default()
            .with_failure_handler(FailureHandlerKind::Retry)
            .with_max_retries(max_retries)
            .with_max_replay_queue_size(capacity);

        let mut handler = RetryingFailureHandler::new();
        handler.open(&config);
        handler
    }

    fn msg(id: &str) -> Message {
        Message::new(id, vec![("key".to_string(), "value".to_string())])
    }

    #[test]
    fn test_fail_none_is_rejected() {
        let handler = handler(10, 16);
        assert!(!handler.fail(None));
    }

    #[test]
    fn test_replays_until_cap_then_abandons() {
        let handler = handler(3, 16);

        for _ in 0..3 {
            assert!(handler.fail(Some(msg("1-0"))));
            assert!(handler.next_replay().is_some());
        }

        // Fourth failure: cap reached, abandoned.
        assert!(!handler.fail(Some(msg("1-0"))));
        assert!(handler.next_replay().is_none());
    }

    #[test]
    fn test_ack_resets_counter() {
        let handler = handler(1, 16);

        assert!(handler.fail(Some(msg("1-0"))));
        handler.next_replay();
        assert!(!handler.fail(Some(msg("1-0"))));

        handler.ack("1-0");

        // Fresh failure cycle after acknowledgment.
        assert!(handler.fail(Some(msg("1-0"))));
    }

    #[test]
    fn test_unlimited_retries() {
        let handler = handler(0, 16);

        for _ in 0..100 {
            assert!(handler.fail(Some(msg("1-0"))));
            assert!(handler.next_replay().is_some());
        }
    }

    #[test]
    fn test_fifo_order() {
        let handler = handler(10, 16);

        handler.fail(Some(msg("1-0")));
        handler.fail(Some(msg("2-0")));
        handler.fail(Some(msg("3-0")));

        assert_eq!(handler.next_replay().unwrap().id(), "1-0");
        assert_eq!(handler.next_replay().unwrap().id(), "2-0");
        assert_eq!(handler.next_replay().unwrap().id(), "3-0");
        assert!(handler.next_replay().is_none());
    }

    #[test]
    fn test_empty_queue_returns_none() {
        let handler = handler(10, 16);
        assert!(handler.next_replay().is_none());
    }

    #[test]
    fn test_full_queue_rejects_and_rolls_back() {
        let handler = handler(10, 2);

        assert!(handler.fail(Some(msg("1-0"))));
        assert!(handler.fail(Some(msg("2-0"))));

        // Queue is at capacity: rejected, counter rolled back.
        assert!(!handler.fail(Some(msg("3-0"))));
        assert_eq!(handler.queued_len(), 2);

        // Draining frees a slot and the rejected id starts fresh.
        assert_eq!(handler.next_replay().unwrap().id(), "1-0");
        assert!(handler.fail(Some(msg("3-0"))));
    }

    #[test]
    fn test_duplicate_failure_queues_once() {
        let handler = handler(10, 16);

        assert!(handler.fail(Some(msg("1-0"))));
        assert!(handler.fail(Some(msg("1-0"))));

        assert_eq!(handler.queued_len(), 1);
        assert_eq!(handler.next_replay().unwrap().id(), "1-0");
        assert!(handler.next_replay().is_none());
    }

    #[test]
    fn test_duplicate_failure_still_counts_toward_cap() {
        let handler = handler(2, 16);

        // Two failures while the first copy is still queued.
        assert!(handler.fail(Some(msg("1-0"))));
        assert!(handler.fail(Some(msg("1-0"))));
        handler.next_replay();

        // Cap of 2 consumed; next failure is abandoned.
        assert!(!handler.fail(Some(msg("1-0"))));
    }
}
