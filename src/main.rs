mod client;
mod common;
mod config;
mod constants;
mod errors;
mod message;
mod metrics;

use client::{ClientManager, MqttConnector};
use config::Config;
use errors::Result;
use std::process;
use std::sync::Arc;
use tracing::{error, info};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

fn main() {
    // Initialize the application and run
    if let Err(e) = run() {
        error!("Application failed: {}", e);
        process::exit(1);
    }
}

/// Main application logic
fn run() -> Result<()> {
    // Parse and validate configuration
    let config = Config::from_args()?;

    // Initialize logging based on verbosity
    init_logging(&config);

    info!("MQTT Bench - MQTT Publish Benchmarking Tool");
    info!("Version: {}", env!("CARGO_PKG_VERSION"));

    config.log_summary();

    let connector = MqttConnector::from_config(&config)?;
    let client_manager =
        ClientManager::new(config.clone(), Arc::new(connector), config.parallelism()?);

    let report = client_manager.run().map_err(|e| {
        error!("Benchmark failed: {}", e);
        e
    })?;

    info!(
        "Benchmark completed: {}/{} publishes acknowledged",
        report.totals.successes,
        config.expected_messages()
    );

    report.print(config.output.format)
}

/// Initialize logging based on configuration
///
/// Logs go to stderr so the report on stdout stays machine readable.
fn init_logging(config: &Config) {
    let level = if config.output.verbose {
        "debug"
    } else {
        "info"
    };

    let subscriber = FmtSubscriber::builder()
        .with_env_filter(
            EnvFilter::from_default_env().add_directive(
                format!("mqtt_bench={}", level)
                    .parse()
                    .expect("Invalid filter directive"),
            ),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_thread_ids(false)
        .with_thread_names(false)
        .with_file(false)
        .with_line_number(false)
        .compact()
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .expect("Failed to set global default subscriber");

    if config.output.verbose {
        info!("Verbose logging enabled");
    }
}
