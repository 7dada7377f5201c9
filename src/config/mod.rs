//! Configuration management for the MQTT benchmark
//!
//! This module provides a layered approach to configuration:
//! - Core structures and enums
//! - CLI argument parsing
//! - Configuration validation
//! - Default value management

pub mod defaults;
pub mod parser;
pub mod validation;

use crate::errors::{ErrorContext, Result};
use crate::message::QoS;
use std::num::NonZeroUsize;
use std::time::Duration;
use tracing::info;
use url::Url;

/// Result rendering format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    /// Human-readable aggregate block (default)
    #[default]
    Text,
    /// `{"runs": [...], "totals": {...}}` document
    Json,
}

/// Broker endpoint and credentials
#[derive(Debug, Clone)]
pub struct BrokerConfig {
    pub url: String,
    pub username: Option<String>,
    pub password: Option<String>,
}

/// Client fleet configuration
#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub count: u32,
    pub start_delay: Duration,
    pub cpu: usize,
    pub deadline: Option<Duration>,
}

/// Per-client publish workload
#[derive(Debug, Clone)]
pub struct TestConfig {
    pub topic: String,
    pub qos: QoS,
    pub message_size: usize,
    pub message_count: u64,
    pub message_timeout: Duration,
    pub message_delay: Duration,
}

/// Output configuration
#[derive(Debug, Clone)]
pub struct OutputConfig {
    pub format: OutputFormat,
    pub quiet: bool,
    pub verbose: bool,
}

/// Main configuration structure
#[derive(Debug, Clone)]
pub struct Config {
    pub broker: BrokerConfig,
    pub client: ClientConfig,
    pub test: TestConfig,
    pub output: OutputConfig,
}

impl Config {
    /// Parse and validate configuration from command line arguments
    pub fn from_args() -> Result<Self> {
        let raw_config = parser::RawConfig::parse_from_args()?;
        let config = raw_config.try_into()?;
        validation::validate(&config)?;
        Ok(config)
    }

    /// Parsed broker endpoint
    pub fn broker_url(&self) -> Result<Url> {
        Url::parse(&self.broker.url)
            .with_config_context(&format!("Invalid broker URL '{}'", self.broker.url))
    }

    /// Worker threads for the benchmark runtime
    pub fn parallelism(&self) -> Result<NonZeroUsize> {
        NonZeroUsize::new(self.client.cpu).with_config_context("CPU count must be at least 1")
    }

    /// Expected number of publish attempts across the whole fleet
    pub fn expected_messages(&self) -> u64 {
        self.client.count as u64 * self.test.message_count
    }

    /// Log configuration summary
    pub fn log_summary(&self) {
        info!("MQTT Benchmark Configuration:");
        info!("   Broker:           {}", self.broker.url);
        info!("   Topic:            {}", self.test.topic);
        info!("   QoS:              {}", self.test.qos);
        info!("   Clients:          {}", self.client.count);
        info!("   Messages:         {} per client", self.test.message_count);
        info!("   Payload:          {} bytes", self.test.message_size);
        info!(
            "   Msg Timeout:      {}ms",
            self.test.message_timeout.as_millis()
        );
        info!(
            "   Msg Delay:        {}ms",
            self.test.message_delay.as_millis()
        );
        info!(
            "   Start Delay:      {}ms",
            self.client.start_delay.as_millis()
        );
        info!("   CPU:              {}", self.client.cpu);

        if let Some(deadline) = self.client.deadline {
            info!("   Deadline:         {}s", deadline.as_secs());
        }

        if self.broker.username.is_some() {
            info!("   Auth:             username/password");
        }
    }
}
