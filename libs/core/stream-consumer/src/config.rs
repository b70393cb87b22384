//! Consumer configuration
//!
//! This module provides `ConsumerConfig` for configuring the stream client
//! and its failure handler.

use crate::failure::FailureHandlerKind;

/// Configuration for a stream consumer
#[derive(Debug, Clone)]
pub struct ConsumerConfig {
    /// Redis connection URL (redis:// or rediss://)
    pub connection_url: String,

    /// Stream key to consume from
    pub stream_key: String,

    /// Consumer group name
    pub group_name: String,

    /// Prefix for consumer identities; the instance id is appended to
    /// derive a unique member name within the group
    pub consumer_id_prefix: String,

    /// Maximum entries fetched per read
    pub max_entries_per_read: usize,

    /// Which failure handler to run
    pub failure_handler: FailureHandlerKind,

    /// Maximum times a failed message is replayed (0 = unlimited)
    pub max_retries: u64,

    /// Capacity of the in-memory replay queue
    pub max_replay_queue_size: usize,
}

impl ConsumerConfig {
    /// Create a new ConsumerConfig with explicit connection target,
    /// stream key and group name.
    pub fn new(
        connection_url: impl Into<String>,
        stream_key: impl Into<String>,
        group_name: impl Into<String>,
    ) -> Self {
        Self {
            connection_url: connection_url.into(),
            stream_key: stream_key.into(),
            group_name: group_name.into(),
            consumer_id_prefix: "consumer-".to_string(),
            max_entries_per_read: 10,
            failure_handler: FailureHandlerKind::Retry,
            max_retries: 10,
            max_replay_queue_size: 1024,
        }
    }

    /// Set the consumer ID prefix
    pub fn with_consumer_id_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.consumer_id_prefix = prefix.into();
        self
    }

    /// Set the maximum entries fetched per read
    pub fn with_max_entries_per_read(mut self, count: usize) -> Self {
        self.max_entries_per_read = count.max(1);
        self
    }

    /// Set the failure handler variant
    pub fn with_failure_handler(mut self, kind: FailureHandlerKind) -> Self {
        self.failure_handler = kind;
        self
    }

    /// Set the maximum replay count (0 = unlimited)
    pub fn with_max_retries(mut self, max_retries: u64) -> Self {
        self.max_retries = max_retries;
        self
    }

    /// Set the replay queue capacity
    pub fn with_max_replay_queue_size(mut self, capacity: usize) -> Self {
        self.max_replay_queue_size = capacity.max(1);
        self
    }

    /// Derive the consumer identity for a given instance id.
    ///
    /// Distinct instance ids yield distinct group members; the host pipeline
    /// is responsible for assigning each parallel consumer its own id.
    pub fn consumer_id(&self, instance_id: u32) -> String {
        format!("{}{}", self.consumer_id_prefix, instance_id)
    }
}

impl Default for ConsumerConfig {
    fn default() -> Self {
        Self::new("redis://127.0.0.1:6379", "stream:events", "consumers")
    }
}
