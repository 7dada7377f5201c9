//! Metrics collection and reporting for the MQTT benchmark
//!
//! This module provides a modular approach to metrics:
//! - Individual client timing samples and per-client results
//! - Aggregation of per-client results into run totals
//! - Text and JSON result rendering

pub mod aggregate;
pub mod client;
pub mod reporting;
pub mod stats;

// Re-export public types for easier access
pub use aggregate::calculate_total_results;
pub use client::{ClientMetrics, RunResults};
pub use reporting::BenchReport;
