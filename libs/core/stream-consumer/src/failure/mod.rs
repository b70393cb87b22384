//! Failure handling for delivered-but-failed messages.
//!
//! The host pipeline reports processing failures here; the handler decides
//! whether a message is replayed and hands replay candidates back out via
//! `next_replay`. Handlers keep all bookkeeping in memory — durability
//! across restarts comes from the store's own pending-entries tracking,
//! not from this state.

mod no_retry;
mod retry;

pub use no_retry::NoRetryFailureHandler;
pub use retry::RetryingFailureHandler;

use crate::config::ConsumerConfig;
use crate::message::Message;
use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumString};

/// Decides whether failed messages are replayed.
///
/// Implementations own their counters and queues per instance; `fail`,
/// `ack` and `next_replay` may be called from different workers and must
/// synchronize internally. None of the operations block.
pub trait FailureHandler: Send + Sync {
    /// Initialize the handler from configuration. Called once at startup,
    /// before the handler is shared.
    fn open(&mut self, config: &ConsumerConfig);

    /// Report a message as failed downstream.
    ///
    /// Returns `true` when a replay has been scheduled, `false` when the
    /// message is abandoned: nothing was passed in, its retry cap is
    /// reached, or the replay queue is full (backpressure). An abandoned
    /// message is the caller's to dispose of — typically by acknowledging
    /// it upstream so the store stops redelivering it.
    fn fail(&self, message: Option<Message>) -> bool;

    /// Report a message as successfully processed. Drops its retry counter;
    /// the only way stale counters are garbage-collected.
    fn ack(&self, id: &str);

    /// Take the next replay candidate, oldest first. Non-blocking; `None`
    /// when nothing is queued.
    fn next_replay(&self) -> Option<Message>;
}

/// Failure handler variants selectable from configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[derive(Display, AsRefStr, EnumString)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum FailureHandlerKind {
    /// Replay failed messages up to the configured retry cap.
    Retry,
    /// Never replay; every failure is abandoned immediately.
    NoRetry,
}

impl FailureHandlerKind {
    /// Build and initialize the handler this variant names.
    pub fn build(&self, config: &ConsumerConfig) -> Box<dyn FailureHandler> {
        let mut handler: Box<dyn FailureHandler> = match self {
            Self::Retry => Box::new(RetryingFailureHandler::new()),
            Self::NoRetry => Box::new(NoRetryFailureHandler),
        };
        handler.open(config);
        handler
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_serialization() {
        assert_eq!(FailureHandlerKind::Retry.to_string(), "retry");
        assert_eq!(FailureHandlerKind::NoRetry.as_ref(), "no_retry");
    }

    #[test]
    fn test_kind_deserialization() {
        let kind: FailureHandlerKind = "retry".parse().unwrap();
        assert_eq!(kind, FailureHandlerKind::Retry);

        let kind: FailureHandlerKind = "no_retry".parse().unwrap();
        assert_eq!(kind, FailureHandlerKind::NoRetry);

        assert!("bogus".parse::<FailureHandlerKind>().is_err());
    }

    #[test]
    fn test_build_selects_variant() {
        let config = ConsumerConfig::default();
        let msg = Message::new("1-0", vec![]);

        let retry = FailureHandlerKind::Retry.build(&config);
        assert!(retry.fail(Some(msg.clone())));

        let no_retry = FailureHandlerKind::NoRetry.build(&config);
        assert!(!no_retry.fail(Some(msg)));
    }
}
