//! Consumer error types
//!
//! Connection and group-setup failures are propagated unchanged from the
//! store; illegal lifecycle transitions get their own variants so callers
//! can tell a programming error apart from a store outage.

use thiserror::Error;

/// Result type for consumer operations
pub type Result<T> = std::result::Result<T, ConsumerError>;

/// Stream consumer errors
#[derive(Error, Debug)]
pub enum ConsumerError {
    /// Redis connection or command error
    #[error("Redis error: {0}")]
    Redis(#[from] redis::RedisError),

    /// connect() called while a connection is already open
    #[error("client is already connected; call disconnect first")]
    AlreadyConnected,

    /// Read or acknowledgment attempted before connect()
    #[error("client is not connected")]
    NotConnected,

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lifecycle_errors_display() {
        assert!(ConsumerError::AlreadyConnected
            .to_string()
            .contains("already connected"));
        assert!(ConsumerError::NotConnected
            .to_string()
            .contains("not connected"));
    }
}
