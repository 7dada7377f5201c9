//! Configuration validation logic

use super::Config;
use crate::constants::{MAX_CLIENTS_LIMIT, MQTT_MAX_REMAINING_LENGTH};
use crate::errors::{BenchError, Result};

/// Validate the configuration
pub fn validate(config: &Config) -> Result<()> {
    validate_broker(config)?;
    validate_client_config(config)?;
    validate_topic(config)?;
    validate_payload(config)?;
    Ok(())
}

/// Validate broker endpoint and credentials
fn validate_broker(config: &Config) -> Result<()> {
    let url = config.broker_url()?;

    match url.scheme() {
        "tcp" | "mqtt" => {}
        scheme => {
            return Err(BenchError::config(format!(
                "Invalid broker scheme '{}'. Only 'tcp' and 'mqtt' are supported",
                scheme
            )));
        }
    }

    if url.host_str().is_none_or(str::is_empty) {
        return Err(BenchError::config(format!(
            "Broker URL '{}' has no host",
            config.broker.url
        )));
    }

    // MQTT 3.1.1 forbids a password without a username
    if config.broker.password.is_some() && config.broker.username.is_none() {
        return Err(BenchError::config("A password requires a username"));
    }

    Ok(())
}

/// Validate client fleet configuration
fn validate_client_config(config: &Config) -> Result<()> {
    if config.client.count == 0 {
        return Err(BenchError::config(
            "Number of clients must be greater than 0",
        ));
    }

    if config.client.count > MAX_CLIENTS_LIMIT {
        return Err(BenchError::config(format!(
            "Number of clients cannot exceed {}",
            MAX_CLIENTS_LIMIT
        )));
    }

    config.parallelism()?;

    if let Some(deadline) = config.client.deadline
        && deadline.is_zero()
    {
        return Err(BenchError::config("Deadline must be greater than 0"));
    }

    Ok(())
}

/// Validate publish topic
fn validate_topic(config: &Config) -> Result<()> {
    let topic = &config.test.topic;

    if topic.is_empty() {
        return Err(BenchError::config("Topic cannot be empty"));
    }

    if topic.contains(['+', '#']) {
        return Err(BenchError::config(format!(
            "Topic '{}' contains wildcards, which are not allowed when publishing",
            topic
        )));
    }

    if topic.contains('\0') {
        return Err(BenchError::config("Topic cannot contain NUL characters"));
    }

    if topic.len() > u16::MAX as usize {
        return Err(BenchError::config(format!(
            "Topic cannot exceed {} bytes",
            u16::MAX
        )));
    }

    Ok(())
}

/// Validate payload size against the MQTT packet limit
fn validate_payload(config: &Config) -> Result<()> {
    // topic length prefix + topic + packet id
    let overhead = 2 + config.test.topic.len() + 2;

    if config.test.message_size + overhead > MQTT_MAX_REMAINING_LENGTH {
        return Err(BenchError::config(format!(
            "Message size {} exceeds the MQTT packet limit of {} bytes",
            config.test.message_size,
            MQTT_MAX_REMAINING_LENGTH - overhead
        )));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn create_test_config() -> Config {
        Config::quick_test("tcp://localhost:1883".to_string())
    }

    #[test]
    fn test_validate_valid_config() {
        let config = create_test_config();
        assert!(validate(&config).is_ok());
    }

    #[test]
    fn test_validate_mqtt_scheme() {
        let mut config = create_test_config();
        config.broker.url = "mqtt://broker.example.com".to_string();
        assert!(validate(&config).is_ok());
    }

    #[test]
    fn test_validate_invalid_url() {
        let mut config = create_test_config();
        config.broker.url = "invalid-url".to_string();
        assert!(validate(&config).is_err());
    }

    #[test]
    fn test_validate_unsupported_scheme() {
        let mut config = create_test_config();
        config.broker.url = "ws://localhost:8080".to_string();
        assert!(validate(&config).is_err());
    }

    #[test]
    fn test_validate_zero_clients() {
        let mut config = create_test_config();
        config.client.count = 0;
        assert!(matches!(validate(&config), Err(BenchError::Config(_))));
    }

    #[test]
    fn test_validate_too_many_clients() {
        let mut config = create_test_config();
        config.client.count = MAX_CLIENTS_LIMIT + 1;
        assert!(validate(&config).is_err());
    }

    #[test]
    fn test_validate_zero_cpu() {
        let mut config = create_test_config();
        config.client.cpu = 0;
        assert!(validate(&config).is_err());
    }

    #[test]
    fn test_validate_zero_deadline() {
        let mut config = create_test_config();
        config.client.deadline = Some(Duration::ZERO);
        assert!(validate(&config).is_err());
    }

    #[test]
    fn test_validate_wildcard_topic() {
        let mut config = create_test_config();
        config.test.topic = "sensors/+/temp".to_string();
        assert!(validate(&config).is_err());

        config.test.topic = "sensors/#".to_string();
        assert!(validate(&config).is_err());
    }

    #[test]
    fn test_validate_empty_topic() {
        let mut config = create_test_config();
        config.test.topic = String::new();
        assert!(validate(&config).is_err());
    }

    #[test]
    fn test_validate_password_without_username() {
        let mut config = create_test_config();
        config.broker.password = Some("secret".to_string());
        assert!(validate(&config).is_err());

        config.broker.username = Some("alice".to_string());
        assert!(validate(&config).is_ok());
    }

    #[test]
    fn test_validate_oversized_payload() {
        let mut config = create_test_config();
        config.test.message_size = MQTT_MAX_REMAINING_LENGTH;
        assert!(validate(&config).is_err());
    }

    #[test]
    fn test_validate_zero_message_count_allowed() {
        let mut config = create_test_config();
        config.test.message_count = 0;
        assert!(validate(&config).is_ok());
    }
}
