//! Client worker driving one simulated publisher

use crate::client::BrokerConnector;
use crate::common::ClientId;
use crate::config::TestConfig;
use crate::constants::DEBUG_LOG_INTERVAL;
use crate::message::Message;
use crate::metrics::{ClientMetrics, RunResults};

use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::time::{Instant, sleep, timeout};
use tracing::{debug, info, warn};

/// One client's lifecycle: connect, publish, disconnect, report
pub struct ClientWorker {
    client_id: ClientId,
    connector: Arc<dyn BrokerConnector>,
    settings: Arc<TestConfig>,
    quiet: bool,
}

impl ClientWorker {
    pub fn new(
        client_id: ClientId,
        connector: Arc<dyn BrokerConnector>,
        settings: Arc<TestConfig>,
        quiet: bool,
    ) -> Self {
        Self {
            client_id,
            connector,
            settings,
            quiet,
        }
    }

    /// Run to completion and hand the results to the collector
    pub async fn run(self, results_tx: mpsc::Sender<RunResults>) {
        let results = self.execute().await;
        if results_tx.send(results).await.is_err() {
            warn!(
                "Client {} finished after the results channel closed",
                self.client_id
            );
        }
    }

    /// Run to completion and return the results
    pub async fn execute(&self) -> RunResults {
        let start = Instant::now();

        let mut session = match self.connector.connect(self.client_id).await {
            Ok(session) => session,
            Err(e) => {
                if !self.quiet {
                    warn!("Client {} failed to connect: {}", self.client_id, e);
                }
                return RunResults::failed_client(self.client_id, start.elapsed());
            }
        };

        if !self.quiet {
            info!("Client {} is connected", self.client_id);
        }

        let settings = &*self.settings;
        let payload = vec![0u8; settings.message_size];
        let mut metrics = ClientMetrics::new(self.client_id);

        for _ in 0..settings.message_count {
            let mut message = Message::new(&settings.topic, settings.qos, &payload);

            match timeout(
                settings.message_timeout,
                session.publish(message.topic, message.payload, message.qos),
            )
            .await
            {
                Ok(Ok(())) => message.mark_delivered(),
                Ok(Err(e)) => {
                    message.mark_failed();
                    debug!("Client {} publish failed: {}", self.client_id, e);
                }
                Err(_) => {
                    message.mark_failed();
                    debug!(
                        "Client {} publish timed out after {:?}",
                        self.client_id, settings.message_timeout
                    );
                }
            }

            match message.latency() {
                Some(latency) => metrics.record_success(latency),
                None => metrics.record_failure(),
            }

            let attempted = metrics.total_attempted();
            if attempted % DEBUG_LOG_INTERVAL == 0 {
                debug!(
                    "Client {} attempted {} messages ({} failed)",
                    self.client_id, attempted, metrics.failures
                );
            }

            if !settings.message_delay.is_zero() {
                sleep(settings.message_delay).await;
            }
        }

        // Best effort, bounded like a publish
        match timeout(settings.message_timeout, session.disconnect()).await {
            Ok(Ok(())) => {}
            Ok(Err(e)) => debug!("Client {} disconnect failed: {}", self.client_id, e),
            Err(_) => debug!("Client {} disconnect timed out", self.client_id),
        }

        let results = metrics.into_results(start.elapsed());
        if !self.quiet {
            info!(
                "Client {} is done: {}/{} messages acknowledged",
                self.client_id, results.successes, results.total
            );
        }
        results
    }
}
