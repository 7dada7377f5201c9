//! Application-wide constants and configuration values

use std::time::Duration;

// Client connection constants
pub const MAX_CLIENTS_LIMIT: u32 = 10_000;
pub const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);
pub const CLIENT_ID_PREFIX: &str = "mqtt-bench";

// Channel and buffer constants
pub const CHANNEL_BUFFER_SIZE: usize = 100;

// MQTT 3.1.1 protocol constants
pub const MQTT_PROTOCOL_NAME: &str = "MQTT";
pub const MQTT_PROTOCOL_LEVEL: u8 = 4;
pub const MQTT_KEEP_ALIVE_SECS: u16 = 0;
pub const MQTT_DEFAULT_PORT: u16 = 1883;
pub const MQTT_MAX_REMAINING_LENGTH: usize = 268_435_455;

// Performance constants
pub const DEBUG_LOG_INTERVAL: u64 = 100;
