//! Default values and configuration presets

#[cfg(test)]
use super::{BrokerConfig, ClientConfig, Config, OutputConfig, OutputFormat, TestConfig};
#[cfg(test)]
use crate::message::QoS;
#[cfg(test)]
use std::time::Duration;

/// Default configuration values
pub struct Defaults;

impl Defaults {
    pub const BROKER: &'static str = "tcp://localhost:1883";
    pub const TOPIC: &'static str = "/test";
    pub const QOS: u8 = 1;
    pub const MESSAGE_SIZE: usize = 100;
    pub const MESSAGE_COUNT: u64 = 100;
    pub const MESSAGE_TIMEOUT_MS: u64 = 50;
    pub const MESSAGE_DELAY_MS: u64 = 0;
    pub const START_DELAY_MS: u64 = 50;
    pub const CLIENT_COUNT: u32 = 10;
    pub const CPU: usize = 1;
}

#[cfg(test)]
impl Config {
    /// Default configuration against the given broker
    pub fn default_for_broker(broker_url: String) -> Self {
        Self {
            broker: BrokerConfig {
                url: broker_url,
                username: None,
                password: None,
            },
            client: ClientConfig {
                count: Defaults::CLIENT_COUNT,
                start_delay: Duration::from_millis(Defaults::START_DELAY_MS),
                cpu: Defaults::CPU,
                deadline: None,
            },
            test: TestConfig {
                topic: Defaults::TOPIC.to_string(),
                qos: QoS::AtLeastOnce,
                message_size: Defaults::MESSAGE_SIZE,
                message_count: Defaults::MESSAGE_COUNT,
                message_timeout: Duration::from_millis(Defaults::MESSAGE_TIMEOUT_MS),
                message_delay: Duration::from_millis(Defaults::MESSAGE_DELAY_MS),
            },
            output: OutputConfig {
                format: OutputFormat::Text,
                quiet: false,
                verbose: false,
            },
        }
    }

    /// Small, fast run (few clients, few messages, no start stagger)
    pub fn quick_test(broker_url: String) -> Self {
        let mut config = Self::default_for_broker(broker_url);

        config.client.count = 2;
        config.client.start_delay = Duration::ZERO;
        config.test.message_count = 5;
        config.output.quiet = true;

        config
    }
}
