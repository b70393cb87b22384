//! Stream client for consumer-group reads and acknowledgments.
//!
//! One client owns one connection and one consumer identity within the
//! group. Reads are batched and non-blocking; every delivered entry must be
//! acknowledged through `commit_message` or it stays pending on the store
//! side and is eligible for redelivery.

use crate::config::ConsumerConfig;
use crate::error::{ConsumerError, Result};
use crate::message::Message;
use async_trait::async_trait;
use redis::aio::ConnectionManager;
use redis::RedisResult;
use tracing::{debug, error, info};

// Reply shape of XREADGROUP: [(stream, [(entry id, [(field, value)])])],
// nil when nothing is available.
type ReadGroupReply = Option<Vec<(String, Vec<(String, Vec<(String, String)>)>)>>;

/// Capability contract for a consumer-group stream client.
///
/// Lifecycle: `Disconnected →(connect)→ Connected →(disconnect)→
/// Disconnected`. Connecting twice without disconnecting is an error;
/// reading or acknowledging while disconnected is an error. Disconnecting
/// while a read is in flight is undefined behavior — callers issue
/// operations sequentially from one logical worker.
#[async_trait]
pub trait StreamClient: Send + Sync {
    /// Establish the connection and ensure the consumer group exists.
    async fn connect(&mut self) -> Result<()>;

    /// Read the next batch of entries not yet delivered to any consumer
    /// in the group. Never blocks; returns an empty batch when the stream
    /// has nothing new.
    async fn next_messages(&mut self) -> Result<Vec<Message>>;

    /// Acknowledge one entry against the group, removing it from the
    /// store's pending-entries bookkeeping.
    async fn commit_message(&mut self, id: &str) -> Result<()>;

    /// Release the connection. Safe to call when not connected.
    async fn disconnect(&mut self);
}

/// Redis Streams implementation of [`StreamClient`].
pub struct RedisStreamClient {
    config: ConsumerConfig,

    /// Derived from the configured prefix and the instance id so parallel
    /// consumers join the group under distinct member names.
    consumer_id: String,

    /// Present exactly while connected.
    conn: Option<ConnectionManager>,
}

impl RedisStreamClient {
    /// Create a client for the given instance. Performs no I/O.
    pub fn new(config: ConsumerConfig, instance_id: u32) -> Self {
        let consumer_id = config.consumer_id(instance_id);
        Self {
            config,
            consumer_id,
            conn: None,
        }
    }

    /// The consumer identity this client joins the group with.
    pub fn consumer_id(&self) -> &str {
        &self.consumer_id
    }

    /// Whether the client currently holds a connection.
    pub fn is_connected(&self) -> bool {
        self.conn.is_some()
    }

    /// Create the consumer group at the earliest offset, creating the
    /// stream as well if absent. A BUSYGROUP collision means the group is
    /// already there — the expected steady state on every restart.
    async fn ensure_consumer_group(&self, conn: &mut ConnectionManager) -> Result<()> {
        let created: RedisResult<()> = redis::cmd("XGROUP")
            .arg("CREATE")
            .arg(&self.config.stream_key)
            .arg(&self.config.group_name)
            .arg("0")
            .arg("MKSTREAM")
            .query_async(conn)
            .await;

        match created {
            Ok(()) => {
                info!(
                    stream = %self.config.stream_key,
                    group = %self.config.group_name,
                    "Created consumer group"
                );
                Ok(())
            }
            Err(e) if e.to_string().contains("BUSYGROUP") => {
                debug!(
                    stream = %self.config.stream_key,
                    group = %self.config.group_name,
                    "Consumer group already exists"
                );
                Ok(())
            }
            Err(e) => {
                error!(
                    stream = %self.config.stream_key,
                    group = %self.config.group_name,
                    error = %e,
                    "Consumer group setup failed"
                );
                Err(e.into())
            }
        }
    }
}

#[async_trait]
impl StreamClient for RedisStreamClient {
    async fn connect(&mut self) -> Result<()> {
        if self.conn.is_some() {
            return Err(ConsumerError::AlreadyConnected);
        }

        let client = redis::Client::open(self.config.connection_url.as_str())?;
        let mut conn = ConnectionManager::new(client).await?;

        // Group setup failures other than BUSYGROUP are fatal: the
        // connection is dropped and the error goes to the caller.
        self.ensure_consumer_group(&mut conn).await?;

        self.conn = Some(conn);
        info!(
            consumer_id = %self.consumer_id,
            stream = %self.config.stream_key,
            group = %self.config.group_name,
            "Stream client connected"
        );
        Ok(())
    }

    async fn next_messages(&mut self) -> Result<Vec<Message>> {
        let conn = self.conn.as_mut().ok_or(ConsumerError::NotConnected)?;

        let reply: ReadGroupReply = redis::cmd("XREADGROUP")
            .arg("GROUP")
            .arg(&self.config.group_name)
            .arg(&self.consumer_id)
            .arg("COUNT")
            .arg(self.config.max_entries_per_read)
            .arg("STREAMS")
            .arg(&self.config.stream_key)
            .arg(">") // Only entries never delivered to this group
            .query_async(conn)
            .await?;

        let mut messages = Vec::new();
        for (_stream, entries) in reply.unwrap_or_default() {
            for (id, fields) in entries {
                messages.push(Message::new(id, fields));
            }
        }

        if !messages.is_empty() {
            debug!(
                consumer_id = %self.consumer_id,
                count = messages.len(),
                "Read batch from stream"
            );
        }

        Ok(messages)
    }

    async fn commit_message(&mut self, id: &str) -> Result<()> {
        let conn = self.conn.as_mut().ok_or(ConsumerError::NotConnected)?;

        let _: i64 = redis::cmd("XACK")
            .arg(&self.config.stream_key)
            .arg(&self.config.group_name)
            .arg(id)
            .query_async(conn)
            .await?;

        debug!(id = %id, "Acknowledged entry");
        Ok(())
    }

    async fn disconnect(&mut self) {
        if self.conn.take().is_some() {
            info!(consumer_id = %self.consumer_id, "Stream client disconnected");
        }
    }
}
