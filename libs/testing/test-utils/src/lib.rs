//! Shared test utilities for stream testing
//!
//! This crate provides reusable test infrastructure:
//! - `TestRedis`: Redis container with automatic cleanup and stream helpers
//! - `TestDataBuilder`: Deterministic test data generation
//!
//! # Usage
//!
//! ```rust,ignore
//! use test_utils::{TestRedis, TestDataBuilder};
//!
//! #[tokio::test]
//! async fn my_stream_test() {
//!     let redis = TestRedis::new().await;
//!     let builder = TestDataBuilder::from_test_name("my_stream_test");
//!
//!     let stream_key = builder.name("stream", "events");
//!     let id = redis.append(&stream_key, &[("field", "value")]).await;
//!     assert!(!id.is_empty());
//! }
//! ```

mod redis;

pub use redis::TestRedis;

/// Builder for test data with deterministic randomization
///
/// This ensures tests are reproducible by deriving all generated names
/// from a seed.
pub struct TestDataBuilder {
    seed: u64,
}

impl TestDataBuilder {
    /// Create a new builder with a seed (for deterministic tests)
    pub fn new(seed: u64) -> Self {
        Self { seed }
    }

    /// Create from test name (generates seed from test name hash)
    ///
    /// This is the recommended way to create a builder: distinct tests get
    /// distinct stream keys and group names, so they can share one Redis.
    pub fn from_test_name(name: &str) -> Self {
        use std::collections::hash_map::DefaultHasher;
        use std::hash::{Hash, Hasher};

        let mut hasher = DefaultHasher::new();
        name.hash(&mut hasher);
        Self::new(hasher.finish())
    }

    /// Generate a unique name for testing
    ///
    /// # Arguments
    ///
    /// * `prefix` - The kind of resource (e.g., "stream", "group")
    /// * `suffix` - A unique identifier within the test (e.g., "events")
    pub fn name(&self, prefix: &str, suffix: &str) -> String {
        format!("test-{}-{}-{}", prefix, self.seed, suffix)
    }
}
