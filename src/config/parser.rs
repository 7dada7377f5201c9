//! Command-line argument parsing for benchmark configuration

use clap::{Parser, ValueEnum};
use std::time::Duration;

use super::defaults::Defaults;
use super::{BrokerConfig, ClientConfig, Config, OutputConfig, OutputFormat, TestConfig};
use crate::errors::{BenchError, Result};
use crate::message::QoS;

/// Output format for CLI
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormatArg {
    /// Human-readable summary
    Text,
    /// Tab-indented JSON document
    Json,
}

/// Raw configuration from command line arguments
#[derive(Parser, Debug, Clone)]
#[command(
    name = "mqtt-bench",
    version,
    about = "A concurrent MQTT publish benchmark that spawns many independent clients",
    long_about = None
)]
pub struct RawConfig {
    /// Broker endpoint
    #[arg(
        long = "broker",
        value_name = "URL",
        default_value = Defaults::BROKER,
        help = "MQTT broker endpoint as scheme://host:port"
    )]
    pub broker: String,

    /// Topic for outgoing messages
    #[arg(
        long = "topic",
        value_name = "TOPIC",
        default_value = Defaults::TOPIC,
        help = "MQTT topic for outgoing messages"
    )]
    pub topic: String,

    /// Broker username
    #[arg(
        long = "username",
        value_name = "USER",
        help = "MQTT username (omit if auth is disabled)"
    )]
    pub username: Option<String>,

    /// Broker password
    #[arg(
        long = "password",
        value_name = "PASS",
        help = "MQTT password (omit if auth is disabled)"
    )]
    pub password: Option<String>,

    /// QoS level
    #[arg(
        long = "qos",
        value_name = "LEVEL",
        default_value_t = Defaults::QOS,
        value_parser = clap::value_parser!(u8).range(0..=2),
        help = "QoS for published messages (0, 1 or 2)"
    )]
    pub qos: u8,

    /// Payload size
    #[arg(
        long = "size",
        value_name = "BYTES",
        default_value_t = Defaults::MESSAGE_SIZE,
        help = "Size of the message payload in bytes"
    )]
    pub size: usize,

    /// Messages per client
    #[arg(
        long = "count",
        value_name = "COUNT",
        default_value_t = Defaults::MESSAGE_COUNT,
        help = "Number of messages to send per client"
    )]
    pub count: u64,

    /// Publish timeout
    #[arg(
        long = "msgtimeout",
        value_name = "MS",
        default_value_t = Defaults::MESSAGE_TIMEOUT_MS,
        help = "Timeout (ms) for a single publish to be acknowledged"
    )]
    pub msg_timeout: u64,

    /// Delay between messages
    #[arg(
        long = "msgdelay",
        value_name = "MS",
        default_value_t = Defaults::MESSAGE_DELAY_MS,
        help = "Delay (ms) between two messages of the same client"
    )]
    pub msg_delay: u64,

    /// Delay between client starts
    #[arg(
        long = "delay",
        value_name = "MS",
        default_value_t = Defaults::START_DELAY_MS,
        help = "Delay (ms) between starting two clients"
    )]
    pub delay: u64,

    /// Number of concurrent clients
    #[arg(
        long = "clients",
        value_name = "COUNT",
        default_value_t = Defaults::CLIENT_COUNT,
        help = "Number of clients to start"
    )]
    pub clients: u32,

    /// Output format
    #[arg(
        long = "format",
        value_enum,
        default_value = "text",
        help = "Output format for the results"
    )]
    pub format: OutputFormatArg,

    /// Suppress per-client progress logs
    #[arg(long = "quiet", help = "Suppress per-client logs while running")]
    pub quiet: bool,

    /// Runtime worker threads
    #[arg(
        long = "cpu",
        value_name = "COUNT",
        default_value_t = Defaults::CPU,
        help = "Number of runtime worker threads"
    )]
    pub cpu: usize,

    /// Overall run deadline
    #[arg(
        long = "deadline",
        value_name = "SECONDS",
        help = "Abort the run if not every client has reported within this many seconds"
    )]
    pub deadline: Option<u64>,

    /// Enable verbose logging
    #[arg(short = 'v', long = "verbose", help = "Enable verbose logging")]
    pub verbose: bool,
}

impl RawConfig {
    /// Parse from command line arguments
    pub fn parse_from_args() -> Result<Self> {
        Ok(Self::parse())
    }
}

impl TryFrom<RawConfig> for Config {
    type Error = BenchError;

    fn try_from(raw: RawConfig) -> Result<Self> {
        let qos = QoS::try_from(raw.qos)?;

        let format = match raw.format {
            OutputFormatArg::Text => OutputFormat::Text,
            OutputFormatArg::Json => OutputFormat::Json,
        };

        // Empty credentials mean auth is disabled
        let username = raw.username.filter(|u| !u.is_empty());
        let password = raw.password.filter(|p| !p.is_empty());

        Ok(Config {
            broker: BrokerConfig {
                url: raw.broker,
                username,
                password,
            },
            client: ClientConfig {
                count: raw.clients,
                start_delay: Duration::from_millis(raw.delay),
                cpu: raw.cpu,
                deadline: raw.deadline.map(Duration::from_secs),
            },
            test: TestConfig {
                topic: raw.topic,
                qos,
                message_size: raw.size,
                message_count: raw.count,
                message_timeout: Duration::from_millis(raw.msg_timeout),
                message_delay: Duration::from_millis(raw.msg_delay),
            },
            output: OutputConfig {
                format,
                quiet: raw.quiet,
                verbose: raw.verbose,
            },
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_flag_values() {
        let raw = RawConfig::try_parse_from(["mqtt-bench"]).unwrap();
        let config = Config::try_from(raw).unwrap();

        assert_eq!(config.broker.url, "tcp://localhost:1883");
        assert_eq!(config.test.topic, "/test");
        assert_eq!(config.test.qos, QoS::AtLeastOnce);
        assert_eq!(config.test.message_size, 100);
        assert_eq!(config.test.message_count, 100);
        assert_eq!(config.test.message_timeout, Duration::from_millis(50));
        assert_eq!(config.test.message_delay, Duration::ZERO);
        assert_eq!(config.client.start_delay, Duration::from_millis(50));
        assert_eq!(config.client.count, 10);
        assert_eq!(config.client.cpu, 1);
        assert_eq!(config.client.deadline, None);
        assert_eq!(config.output.format, OutputFormat::Text);
        assert!(!config.output.quiet);
    }

    #[test]
    fn test_parse_full_flag_set() {
        let raw = RawConfig::try_parse_from([
            "mqtt-bench",
            "--broker",
            "tcp://broker.local:1884",
            "--topic",
            "bench/load",
            "--username",
            "alice",
            "--password",
            "secret",
            "--qos",
            "2",
            "--size",
            "512",
            "--count",
            "20",
            "--msgtimeout",
            "200",
            "--msgdelay",
            "5",
            "--delay",
            "0",
            "--clients",
            "4",
            "--format",
            "json",
            "--quiet",
            "--cpu",
            "2",
            "--deadline",
            "30",
        ])
        .unwrap();
        let config = Config::try_from(raw).unwrap();

        assert_eq!(config.broker.username.as_deref(), Some("alice"));
        assert_eq!(config.broker.password.as_deref(), Some("secret"));
        assert_eq!(config.test.qos, QoS::ExactlyOnce);
        assert_eq!(config.test.message_timeout, Duration::from_millis(200));
        assert_eq!(config.client.start_delay, Duration::ZERO);
        assert_eq!(config.client.deadline, Some(Duration::from_secs(30)));
        assert_eq!(config.output.format, OutputFormat::Json);
        assert!(config.output.quiet);
        assert_eq!(config.expected_messages(), 80);
    }

    #[test]
    fn test_reject_out_of_range_qos() {
        assert!(RawConfig::try_parse_from(["mqtt-bench", "--qos", "3"]).is_err());
    }

    #[test]
    fn test_empty_credentials_disable_auth() {
        let raw =
            RawConfig::try_parse_from(["mqtt-bench", "--username", "", "--password", ""]).unwrap();
        let config = Config::try_from(raw).unwrap();
        assert!(config.broker.username.is_none());
        assert!(config.broker.password.is_none());
    }
}
