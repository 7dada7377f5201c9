//! Result rendering and output formatting

use crate::config::OutputFormat;
use crate::errors::{BenchError, Result};
use crate::metrics::aggregate::TotalResults;
use crate::metrics::client::RunResults;

use serde::{Deserialize, Serialize};

/// Everything a run produced, in the shape of the JSON document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BenchReport {
    pub runs: Vec<RunResults>,
    pub totals: TotalResults,
}

/// Fixed three-decimal rendering, `NaN` where there is no data
fn fmt_value(value: Option<f64>) -> String {
    match value {
        Some(v) => format!("{:.3}", v),
        None => "NaN".to_string(),
    }
}

impl BenchReport {
    pub fn new(runs: Vec<RunResults>, totals: TotalResults) -> Self {
        Self { runs, totals }
    }

    /// Clients without a single successful publish
    pub fn failed_clients(&self) -> impl Iterator<Item = &RunResults> {
        self.runs.iter().filter(|res| res.is_failed())
    }

    /// Render in the requested format
    pub fn render(&self, format: OutputFormat) -> Result<String> {
        match format {
            OutputFormat::Text => Ok(self.render_text()),
            OutputFormat::Json => self.render_json(),
        }
    }

    /// Print the report to stdout
    pub fn print(&self, format: OutputFormat) -> Result<()> {
        println!("{}", self.render(format)?);
        Ok(())
    }

    /// `{"runs": [...], "totals": {...}}` pretty-printed with tabs
    pub fn render_json(&self) -> Result<String> {
        let mut out = Vec::new();
        let formatter = serde_json::ser::PrettyFormatter::with_indent(b"\t");
        let mut serializer = serde_json::Serializer::with_formatter(&mut out, formatter);
        self.serialize(&mut serializer)?;
        String::from_utf8(out)
            .map_err(|e| BenchError::execution(format!("JSON output is not UTF-8: {}", e)))
    }

    /// Failed client markers followed by the aggregate block
    pub fn render_text(&self) -> String {
        let totals = &self.totals;
        let mut out: String = self
            .failed_clients()
            .map(|res| format!("======= FAILED CLIENT {} =======\n", res.id))
            .collect();
        let clients = self.runs.len();
        let completed = clients - self.failed_clients().count();

        out.push_str(&format!(
            "========= TOTAL ({completed}/{clients}) =========\n\
             Total Ratio:                 {} ({}/{})\n\
             Total Runtime (sec):         {:.3}\n\
             Average Runtime (sec):       {:.3}\n\
             Msg time min (ms):           {}\n\
             Msg time max (ms):           {}\n\
             Msg time mean mean (ms):     {}\n\
             Msg time mean std (ms):      {}\n\
             Average Bandwidth (msg/sec): {:.3}\n\
             Total Bandwidth (msg/sec):   {:.3}",
            fmt_value(totals.ratio),
            totals.successes,
            totals.total,
            totals.total_run_time,
            totals.avg_run_time,
            fmt_value(totals.msg_time_min),
            fmt_value(totals.msg_time_max),
            fmt_value(totals.msg_time_mean_avg),
            fmt_value(totals.msg_time_mean_std),
            totals.avg_msgs_per_sec,
            totals.total_msgs_per_sec,
        ));

        out
    }
}
