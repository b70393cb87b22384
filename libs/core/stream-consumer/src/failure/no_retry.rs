//! Failure handler that never replays.

use crate::config::ConsumerConfig;
use crate::failure::FailureHandler;
use crate::message::Message;
use tracing::debug;

/// Handler that abandons every failed message immediately.
///
/// `fail` always returns `false`, leaving disposition entirely to the
/// caller; no counters or queues are kept.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoRetryFailureHandler;

impl FailureHandler for NoRetryFailureHandler {
    fn open(&mut self, _config: &ConsumerConfig) {}

    fn fail(&self, message: Option<Message>) -> bool {
        if let Some(message) = message {
            debug!(id = %message.id(), "Discarding failed message, replay disabled");
        }
        false
    }

    fn ack(&self, _id: &str) {}

    fn next_replay(&self) -> Option<Message> {
        None
    }
}
