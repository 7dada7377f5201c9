use std::time::Duration;
use tokio::time::Instant;

use crate::errors::{BenchError, Result};

/// MQTT delivery guarantee for a publish
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum QoS {
    AtMostOnce,
    #[default]
    AtLeastOnce,
    ExactlyOnce,
}

impl QoS {
    /// Wire level of this QoS (0, 1 or 2)
    #[inline]
    pub fn level(self) -> u8 {
        match self {
            QoS::AtMostOnce => 0,
            QoS::AtLeastOnce => 1,
            QoS::ExactlyOnce => 2,
        }
    }
}

impl TryFrom<u8> for QoS {
    type Error = BenchError;

    fn try_from(level: u8) -> Result<Self> {
        match level {
            0 => Ok(QoS::AtMostOnce),
            1 => Ok(QoS::AtLeastOnce),
            2 => Ok(QoS::ExactlyOnce),
            other => Err(BenchError::config(format!(
                "Invalid QoS level {}. Only 0, 1 and 2 are supported",
                other
            ))),
        }
    }
}

impl std::fmt::Display for QoS {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.level())
    }
}

/// A single publish attempt, alive only while it is in flight
#[derive(Debug)]
pub struct Message<'a> {
    pub topic: &'a str,
    pub qos: QoS,
    pub payload: &'a [u8],
    pub sent: Instant,
    pub delivered: Option<Instant>,
    pub error: bool,
}

impl<'a> Message<'a> {
    /// Stamp a new message as sent now
    #[inline]
    pub fn new(topic: &'a str, qos: QoS, payload: &'a [u8]) -> Self {
        Self {
            topic,
            qos,
            payload,
            sent: Instant::now(),
            delivered: None,
            error: false,
        }
    }

    /// Mark the broker acknowledgement (or local completion for QoS 0)
    #[inline]
    pub fn mark_delivered(&mut self) {
        self.delivered = Some(Instant::now());
    }

    #[inline]
    pub fn mark_failed(&mut self) {
        self.error = true;
    }

    /// Time between send and delivery, only for successful publishes
    #[inline]
    pub fn latency(&self) -> Option<Duration> {
        match (self.error, self.delivered) {
            (false, Some(delivered)) => Some(delivered.duration_since(self.sent)),
            _ => None,
        }
    }
}
