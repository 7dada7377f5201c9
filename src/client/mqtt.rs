//! MQTT 3.1.1 broker transport over plain TCP

use crate::client::packet::{self, Connect, Packet};
use crate::client::{BrokerConnector, BrokerSession};
use crate::common::ClientId;
use crate::config::Config;
use crate::constants::*;
use crate::errors::{BenchError, ErrorContext, Result};
use crate::message::QoS;

use async_trait::async_trait;
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;
use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};
use tokio::time::timeout;
use tracing::debug;
use url::{Host, Url};
use uuid::Uuid;

/// Connects client workers to an MQTT broker
#[derive(Debug, Clone)]
pub struct MqttConnector {
    host: String,
    port: u16,
    username: Option<String>,
    password: Option<String>,
    connect_timeout: Duration,
}

impl MqttConnector {
    pub fn new(url: &Url, username: Option<String>, password: Option<String>) -> Result<Self> {
        let host = match url.host() {
            Some(Host::Domain(domain)) => domain.to_string(),
            Some(Host::Ipv4(addr)) => addr.to_string(),
            Some(Host::Ipv6(addr)) => addr.to_string(),
            None => {
                return Err(BenchError::config(format!(
                    "Broker URL '{}' has no host",
                    url
                )));
            }
        };

        Ok(Self {
            host,
            port: url.port().unwrap_or(MQTT_DEFAULT_PORT),
            username,
            password,
            connect_timeout: CONNECT_TIMEOUT,
        })
    }

    /// Build a connector from the broker section of the configuration
    pub fn from_config(config: &Config) -> Result<Self> {
        Self::new(
            &config.broker_url()?,
            config.broker.username.clone(),
            config.broker.password.clone(),
        )
    }

    /// Override the connect timeout
    #[cfg(test)]
    pub fn with_connect_timeout(mut self, connect_timeout: Duration) -> Self {
        self.connect_timeout = connect_timeout;
        self
    }

    /// Unique MQTT client identifier for a worker
    fn client_identifier(client_id: ClientId) -> String {
        let suffix = Uuid::new_v4().simple().to_string();
        format!("{}-{}-{}", CLIENT_ID_PREFIX, client_id.get(), &suffix[..8])
    }

    async fn open(&self, client_id: ClientId) -> Result<MqttSession> {
        let stream = TcpStream::connect((self.host.as_str(), self.port))
            .await
            .with_transport_context(&format!(
                "Failed to connect to {}:{}",
                self.host, self.port
            ))?;
        stream.set_nodelay(true)?;

        let mut session = MqttSession::new(stream);
        let identifier = Self::client_identifier(client_id);
        packet::encode_connect(
            &Connect {
                client_id: &identifier,
                username: self.username.as_deref(),
                password: self.password.as_deref(),
                keep_alive: MQTT_KEEP_ALIVE_SECS,
                clean_session: true,
            },
            &mut session.outgoing,
        )?;
        session.flush().await?;

        match session.read().await? {
            Packet::ConnAck { return_code: 0, .. } => {
                debug!("Client {} connected as {}", client_id, identifier);
                Ok(session)
            }
            Packet::ConnAck { return_code, .. } => Err(BenchError::transport(format!(
                "Broker refused connection: {}",
                packet::connack_reason(return_code)
            ))),
            other => Err(BenchError::protocol(format!(
                "Expected CONNACK, received {:?}",
                other
            ))),
        }
    }
}

#[async_trait]
impl BrokerConnector for MqttConnector {
    async fn connect(&self, client_id: ClientId) -> Result<Box<dyn BrokerSession>> {
        let session = timeout(self.connect_timeout, self.open(client_id))
            .await
            .map_err(|_| {
                BenchError::transport(format!(
                    "Timed out connecting to {}:{} after {:?}",
                    self.host, self.port, self.connect_timeout
                ))
            })??;
        Ok(Box::new(session))
    }
}

/// One client's connection to the broker
///
/// Unsent bytes and partially received frames live in the session, so a
/// publish cancelled by its timeout leaves the stream in a resumable state.
pub struct MqttSession {
    reader: OwnedReadHalf,
    writer: OwnedWriteHalf,
    /// Encoded packets not yet fully accepted by the socket
    outgoing: Vec<u8>,
    /// Bytes of `outgoing` already written
    sent: usize,
    /// Received bytes not yet decoded into a packet
    incoming: Vec<u8>,
    last_packet_id: u16,
}

impl MqttSession {
    fn new(stream: TcpStream) -> Self {
        let (read_half, write_half) = stream.into_split();
        Self {
            reader: read_half,
            writer: write_half,
            outgoing: Vec::new(),
            sent: 0,
            incoming: Vec::new(),
            last_packet_id: 0,
        }
    }

    /// Packet ids cycle through 1..=65535; zero is reserved
    fn next_packet_id(&mut self) -> u16 {
        self.last_packet_id = self.last_packet_id.checked_add(1).unwrap_or(1);
        self.last_packet_id
    }

    /// Write out everything queued, resuming where a cancelled call stopped
    async fn flush(&mut self) -> Result<()> {
        while self.sent < self.outgoing.len() {
            let written = self
                .writer
                .write(&self.outgoing[self.sent..])
                .await
                .with_transport_context("Failed to write to broker")?;
            if written == 0 {
                return Err(BenchError::transport("Broker stopped accepting data"));
            }
            self.sent += written;
        }
        self.outgoing.clear();
        self.sent = 0;
        Ok(())
    }

    /// Next packet from the broker, resuming a partially received frame
    async fn read(&mut self) -> Result<Packet> {
        loop {
            if let Some((packet, consumed)) = packet::parse_frame(&self.incoming)? {
                self.incoming.drain(..consumed);
                return Ok(packet);
            }

            let received = self
                .reader
                .read_buf(&mut self.incoming)
                .await
                .with_transport_context("Failed to read from broker")?;
            if received == 0 {
                return Err(BenchError::transport("Broker closed the connection"));
            }
        }
    }

    /// Read until the expected acknowledgement arrives
    async fn await_packet(&mut self, expected: Packet) -> Result<()> {
        loop {
            match self.read().await? {
                received if received == expected => return Ok(()),
                // Late PUBREC of an abandoned QoS 2 publish still gets its PUBREL
                Packet::PubRec(id) => {
                    debug!("Releasing abandoned QoS 2 publish {}", id);
                    packet::encode_pubrel(id, &mut self.outgoing)?;
                    self.flush().await?;
                }
                // Late acks of publishes that already timed out land here
                received => {
                    debug!("Skipping {:?} while waiting for {:?}", received, expected)
                }
            }
        }
    }
}

#[async_trait]
impl BrokerSession for MqttSession {
    async fn publish(&mut self, topic: &str, payload: &[u8], qos: QoS) -> Result<()> {
        // Finish whatever a timed-out publish left queued
        self.flush().await?;

        match qos {
            QoS::AtMostOnce => {
                packet::encode_publish(topic, payload, qos, None, &mut self.outgoing)?;
                self.flush().await
            }
            QoS::AtLeastOnce => {
                let id = self.next_packet_id();
                packet::encode_publish(topic, payload, qos, Some(id), &mut self.outgoing)?;
                self.flush().await?;
                self.await_packet(Packet::PubAck(id)).await
            }
            QoS::ExactlyOnce => {
                let id = self.next_packet_id();
                packet::encode_publish(topic, payload, qos, Some(id), &mut self.outgoing)?;
                self.flush().await?;
                self.await_packet(Packet::PubRec(id)).await?;

                packet::encode_pubrel(id, &mut self.outgoing)?;
                self.flush().await?;
                self.await_packet(Packet::PubComp(id)).await
            }
        }
    }

    async fn disconnect(self: Box<Self>) -> Result<()> {
        let mut session = *self;

        // A half-written frame cannot be followed by DISCONNECT
        if session.sent == 0 {
            session.outgoing.clear();
            packet::encode_disconnect(&mut session.outgoing)?;
            session.flush().await?;
        }

        session
            .writer
            .shutdown()
            .await
            .with_transport_context("Failed to close broker connection")
    }
}
