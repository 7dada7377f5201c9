//! Client manager for coordinating multiple benchmark clients

use crate::client::{BrokerConnector, ClientWorker};
use crate::common::ClientId;
use crate::config::Config;
use crate::constants::CHANNEL_BUFFER_SIZE;
use crate::errors::{BenchError, Result};
use crate::metrics::{BenchReport, RunResults, calculate_total_results};

use std::num::NonZeroUsize;
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::{Instant, sleep, timeout};
use tracing::{info, warn};

/// Client manager that spawns client workers and collects their results
pub struct ClientManager {
    config: Config,
    connector: Arc<dyn BrokerConnector>,
    parallelism: NonZeroUsize,
}

impl ClientManager {
    pub fn new(
        config: Config,
        connector: Arc<dyn BrokerConnector>,
        parallelism: NonZeroUsize,
    ) -> Self {
        Self {
            config,
            connector,
            parallelism,
        }
    }

    /// Run the benchmark on a dedicated runtime sized by `parallelism`
    pub fn run(&self) -> Result<BenchReport> {
        let runtime = tokio::runtime::Builder::new_multi_thread()
            .worker_threads(self.parallelism.get())
            .thread_name("mqtt-bench-worker")
            .enable_all()
            .build()?;

        runtime.block_on(self.run_benchmark())
    }

    /// Spawn every client, wait for all of them and aggregate their results
    pub async fn run_benchmark(&self) -> Result<BenchReport> {
        let client_count = self.config.client.count as usize;
        info!(
            "Starting benchmark with {} clients ({} messages each)",
            client_count, self.config.test.message_count
        );

        let start = Instant::now();
        let (results_tx, mut results_rx) = mpsc::channel(CHANNEL_BUFFER_SIZE);
        let mut handles = Vec::with_capacity(client_count);
        let mut runs = Vec::with_capacity(client_count);

        let collect =
            self.spawn_and_collect(results_tx, &mut results_rx, &mut handles, &mut runs);

        match self.config.client.deadline {
            None => collect.await?,
            Some(deadline) => {
                let outcome = timeout(deadline, collect).await;
                match outcome {
                    Ok(result) => result?,
                    Err(_) => {
                        for handle in &handles {
                            handle.abort();
                        }
                        warn!(
                            "Run deadline of {:?} exceeded, aborted {} unfinished clients",
                            deadline,
                            client_count - runs.len()
                        );
                        return Err(BenchError::execution(format!(
                            "Run deadline of {:?} exceeded: {} of {} clients reported",
                            deadline,
                            runs.len(),
                            client_count
                        )));
                    }
                }
            }
        }

        let total_run_time = start.elapsed();
        let totals = calculate_total_results(&runs, total_run_time);
        info!(
            "All {} clients completed in {:.3}s",
            client_count,
            total_run_time.as_secs_f64()
        );

        Ok(BenchReport::new(runs, totals))
    }

    /// Spawn clients with the configured stagger, then receive one result per client
    async fn spawn_and_collect(
        &self,
        results_tx: mpsc::Sender<RunResults>,
        results_rx: &mut mpsc::Receiver<RunResults>,
        handles: &mut Vec<JoinHandle<()>>,
        runs: &mut Vec<RunResults>,
    ) -> Result<()> {
        let client_count = self.config.client.count as usize;
        let start_delay = self.config.client.start_delay;
        let quiet = self.config.output.quiet;
        let settings = Arc::new(self.config.test.clone());

        for client_id_raw in 0..self.config.client.count {
            let client_id = ClientId::new(client_id_raw);
            if !quiet {
                info!("Starting client {}", client_id);
            }

            let worker = ClientWorker::new(
                client_id,
                Arc::clone(&self.connector),
                Arc::clone(&settings),
                quiet,
            );
            handles.push(tokio::spawn(worker.run(results_tx.clone())));

            // Stagger connection load on the broker
            if !start_delay.is_zero() {
                sleep(start_delay).await;
            }
        }
        drop(results_tx);

        while runs.len() < client_count {
            let res = results_rx.recv().await.ok_or_else(|| {
                BenchError::execution(format!(
                    "Results channel closed after {} of {} clients reported",
                    runs.len(),
                    client_count
                ))
            })?;
            info!(
                "CLIENT {} is completed ({}/{})",
                res.id,
                runs.len() + 1,
                client_count
            );
            runs.push(res);
        }

        Ok(())
    }
}
