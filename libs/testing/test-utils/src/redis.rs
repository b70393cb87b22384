//! Redis test infrastructure
//!
//! Provides a `TestRedis` helper that creates a Redis container for testing,
//! with helpers for seeding and inspecting streams.

use redis::aio::MultiplexedConnection;
use redis::Client;
use testcontainers::runners::AsyncRunner;
use testcontainers::{ContainerAsync, ImageExt};
use testcontainers_modules::redis::Redis;

/// Test Redis wrapper that ensures proper cleanup
///
/// The container is automatically stopped and removed when this struct is
/// dropped. The connection string can be handed to any client that connects
/// by URL.
pub struct TestRedis {
    #[allow(dead_code)]
    container: ContainerAsync<Redis>,
    connection: MultiplexedConnection,
    pub connection_string: String,
}

impl TestRedis {
    /// Create a new test Redis instance
    ///
    /// Uses Redis 8 Alpine image by default.
    pub async fn new() -> Self {
        let redis_image = Redis::default().with_tag("8-alpine");

        let container = redis_image
            .start()
            .await
            .expect("Failed to start Redis container");

        let host_port = container
            .get_host_port_ipv4(6379)
            .await
            .expect("Failed to get Redis port");

        let connection_string = format!("redis://127.0.0.1:{}", host_port);

        let client = Client::open(connection_string.clone())
            .expect("Failed to create Redis client");

        let connection = client
            .get_multiplexed_async_connection()
            .await
            .expect("Failed to connect to Redis");

        tracing::info!(port = host_port, "Test Redis ready (Redis 8-alpine)");

        Self {
            container,
            connection,
            connection_string,
        }
    }

    /// Get a cloned connection (useful for raw commands in tests)
    pub fn connection(&self) -> MultiplexedConnection {
        self.connection.clone()
    }

    /// Get the connection string for clients that connect by URL
    pub fn connection_string(&self) -> &str {
        &self.connection_string
    }

    /// Append an entry to a stream, returning the store-assigned entry ID.
    pub async fn append(&self, stream_key: &str, fields: &[(&str, &str)]) -> String {
        let mut conn = self.connection();
        let mut cmd = redis::cmd("XADD");
        cmd.arg(stream_key).arg("*");
        for (field, value) in fields {
            cmd.arg(*field).arg(*value);
        }
        cmd.query_async(&mut conn)
            .await
            .expect("Failed to append stream entry")
    }

    /// Current length of a stream.
    pub async fn stream_len(&self, stream_key: &str) -> i64 {
        let mut conn = self.connection();
        redis::cmd("XLEN")
            .arg(stream_key)
            .query_async(&mut conn)
            .await
            .expect("Failed to read stream length")
    }
}

// Container is automatically cleaned up when TestRedis is dropped
impl Drop for TestRedis {
    fn drop(&mut self) {
        tracing::debug!("Cleaning up test Redis container");
    }
}
