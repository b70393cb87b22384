//! Stream Consumer
//!
//! A reliable Redis Streams consumer built on consumer groups.
//!
//! ## Features
//!
//! - **Consumer groups**: competing consumers partition one stream via
//!   distinct member identities
//! - **At-least-once delivery**: entries stay pending on the store until
//!   explicitly acknowledged
//! - **Idempotent group setup**: the group (and stream) are created on
//!   connect, tolerating restarts
//! - **Failure replay**: pluggable handlers decide whether failed messages
//!   are replayed, with bounded in-memory queuing
//!
//! ## Example
//!
//! ```ignore
//! use stream_consumer::{ConsumerConfig, RedisStreamClient, StreamClient};
//!
//! let config = ConsumerConfig::new("redis://localhost:6379", "orders:events", "order_workers");
//! let failures = config.failure_handler.build(&config);
//!
//! let mut client = RedisStreamClient::new(config, instance_id);
//! client.connect().await?;
//!
//! for message in client.next_messages().await? {
//!     match process(&message).await {
//!         Ok(()) => {
//!             client.commit_message(message.id()).await?;
//!             failures.ack(message.id());
//!         }
//!         Err(_) => {
//!             if !failures.fail(Some(message.clone())) {
//!                 // Abandoned: ack upstream so the store stops redelivering
//!                 client.commit_message(message.id()).await?;
//!             }
//!         }
//!     }
//! }
//!
//! client.disconnect().await;
//! ```

mod client;
mod config;
mod error;
mod failure;
mod message;

// Re-export main types
pub use client::{RedisStreamClient, StreamClient};
pub use config::ConsumerConfig;
pub use error::{ConsumerError, Result};
pub use failure::{
    FailureHandler, FailureHandlerKind, NoRetryFailureHandler, RetryingFailureHandler,
};
pub use message::Message;
