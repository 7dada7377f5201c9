//! Client module for the publish benchmark
//!
//! This module provides a modular approach to the client side of a run:
//! - Trait abstractions over the broker publish capability
//! - MQTT 3.1.1 transport implementation and its packet codec
//! - Client worker driving one simulated client's lifecycle
//! - Client manager spawning workers and collecting their results

pub mod manager;
pub mod mqtt;
pub mod packet;
pub mod worker;

#[cfg(test)]
pub mod testing;

// Re-export public types for easier access
pub use manager::ClientManager;
pub use mqtt::MqttConnector;
pub use worker::ClientWorker;

use crate::common::ClientId;
use crate::errors::Result;
use crate::message::QoS;

use async_trait::async_trait;

/// Opens broker sessions for client workers
///
/// A connector is shared by every worker of a run, so it only holds
/// read-only endpoint and credential data.
#[async_trait]
pub trait BrokerConnector: Send + Sync {
    /// Establish an authenticated session for the given client
    async fn connect(&self, client_id: ClientId) -> Result<Box<dyn BrokerSession>>;
}

/// A connected session owned by exactly one client worker
#[async_trait]
pub trait BrokerSession: Send {
    /// Publish one message and wait until the broker acknowledges it as
    /// required by `qos`. The caller bounds this with its own timeout.
    async fn publish(&mut self, topic: &str, payload: &[u8], qos: QoS) -> Result<()>;

    /// Close the session
    async fn disconnect(self: Box<Self>) -> Result<()>;
}
