//! Domain-specific error types for the MQTT benchmark
//!
//! This module provides structured error types using `thiserror` for
//! precise and ergonomic error handling throughout the application.

use thiserror::Error;

/// Main error type for the benchmark
#[derive(Error, Debug)]
pub enum BenchError {
    /// Configuration-related errors (CLI parsing, validation, etc.)
    #[error("Configuration error: {0}")]
    Config(String),

    /// Network transport errors (connect, refused, closed stream, etc.)
    #[error("Transport error: {0}")]
    Transport(String),

    /// MQTT protocol violations (malformed packets, unexpected replies)
    #[error("Protocol error: {0}")]
    Protocol(String),

    /// Run execution errors (lost workers, deadline exceeded, etc.)
    #[error("Test execution error: {0}")]
    TestExecution(String),

    /// Socket and runtime I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// URL parsing errors
    #[error("URL parse error: {0}")]
    UrlParse(#[from] url::ParseError),

    /// JSON serialization errors
    #[error("JSON serialization error: {0}")]
    JsonSerialization(#[from] serde_json::Error),
}

/// Result type using BenchError
pub type Result<T> = std::result::Result<T, BenchError>;

/// Helper trait for adding context to errors
pub trait ErrorContext<T> {
    fn with_config_context(self, msg: &str) -> Result<T>;
    fn with_transport_context(self, msg: &str) -> Result<T>;
    fn with_protocol_context(self, msg: &str) -> Result<T>;
}

impl<T, E> ErrorContext<T> for std::result::Result<T, E>
where
    E: std::fmt::Display,
{
    fn with_config_context(self, msg: &str) -> Result<T> {
        self.map_err(|e| BenchError::Config(format!("{}: {}", msg, e)))
    }

    fn with_transport_context(self, msg: &str) -> Result<T> {
        self.map_err(|e| BenchError::Transport(format!("{}: {}", msg, e)))
    }

    fn with_protocol_context(self, msg: &str) -> Result<T> {
        self.map_err(|e| BenchError::Protocol(format!("{}: {}", msg, e)))
    }
}

impl<T> ErrorContext<T> for Option<T> {
    fn with_config_context(self, msg: &str) -> Result<T> {
        self.ok_or_else(|| BenchError::Config(msg.to_string()))
    }

    fn with_transport_context(self, msg: &str) -> Result<T> {
        self.ok_or_else(|| BenchError::Transport(msg.to_string()))
    }

    fn with_protocol_context(self, msg: &str) -> Result<T> {
        self.ok_or_else(|| BenchError::Protocol(msg.to_string()))
    }
}

// Convenience constructors
impl BenchError {
    pub fn config<S: Into<String>>(msg: S) -> Self {
        BenchError::Config(msg.into())
    }

    pub fn transport<S: Into<String>>(msg: S) -> Self {
        BenchError::Transport(msg.into())
    }

    pub fn protocol<S: Into<String>>(msg: S) -> Self {
        BenchError::Protocol(msg.into())
    }

    pub fn execution<S: Into<String>>(msg: S) -> Self {
        BenchError::TestExecution(msg.into())
    }
}
