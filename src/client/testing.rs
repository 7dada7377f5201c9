//! In-process broker doubles for worker and manager tests

use crate::client::{BrokerConnector, BrokerSession};
use crate::common::ClientId;
use crate::errors::{BenchError, Result};
use crate::message::QoS;

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;
use tokio::time::sleep;

/// How a scripted connection misbehaves
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Fault {
    #[default]
    None,
    /// `connect` returns an error
    Refuse,
    /// `connect` never completes
    Hang,
    /// every n-th publish returns an error
    FailEvery(u64),
    /// the first publish panics
    Panic,
}

/// Broker double with fixed publish latency and per-client faults
#[derive(Debug, Default)]
pub struct MockConnector {
    latency: Duration,
    latency_overrides: HashMap<ClientId, Duration>,
    faults: HashMap<ClientId, Fault>,
    default_fault: Fault,
    pub publishes: Arc<AtomicU64>,
    pub disconnects: Arc<AtomicU64>,
}

impl MockConnector {
    pub fn new(latency: Duration) -> Self {
        Self {
            latency,
            ..Default::default()
        }
    }

    pub fn with_latency_for(mut self, client_id: u32, latency: Duration) -> Self {
        self.latency_overrides.insert(ClientId::new(client_id), latency);
        self
    }

    pub fn with_fault_for(mut self, client_id: u32, fault: Fault) -> Self {
        self.faults.insert(ClientId::new(client_id), fault);
        self
    }

    pub fn with_fault(mut self, fault: Fault) -> Self {
        self.default_fault = fault;
        self
    }

    pub fn publish_count(&self) -> u64 {
        self.publishes.load(Ordering::SeqCst)
    }

    pub fn disconnect_count(&self) -> u64 {
        self.disconnects.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl BrokerConnector for MockConnector {
    async fn connect(&self, client_id: ClientId) -> Result<Box<dyn BrokerSession>> {
        let fault = self
            .faults
            .get(&client_id)
            .copied()
            .unwrap_or(self.default_fault);

        match fault {
            Fault::Refuse => Err(BenchError::transport("connection refused")),
            Fault::Hang => std::future::pending().await,
            _ => Ok(Box::new(MockSession {
                latency: self
                    .latency_overrides
                    .get(&client_id)
                    .copied()
                    .unwrap_or(self.latency),
                fault,
                attempts: 0,
                publishes: Arc::clone(&self.publishes),
                disconnects: Arc::clone(&self.disconnects),
            })),
        }
    }
}

struct MockSession {
    latency: Duration,
    fault: Fault,
    attempts: u64,
    publishes: Arc<AtomicU64>,
    disconnects: Arc<AtomicU64>,
}

#[async_trait]
impl BrokerSession for MockSession {
    async fn publish(&mut self, _topic: &str, _payload: &[u8], _qos: QoS) -> Result<()> {
        self.attempts += 1;
        self.publishes.fetch_add(1, Ordering::SeqCst);

        match self.fault {
            Fault::Panic => panic!("scripted publish panic"),
            Fault::FailEvery(n) if self.attempts % n == 0 => {
                Err(BenchError::transport("scripted publish failure"))
            }
            _ => {
                sleep(self.latency).await;
                Ok(())
            }
        }
    }

    async fn disconnect(self: Box<Self>) -> Result<()> {
        self.disconnects.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}
