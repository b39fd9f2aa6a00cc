//! Rendering captures and faults to stdout, and exporting history.

use std::io::{self, Write};
use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use brokerlens::types::{BrokerConnectivitySnapshot, BrokerQueuesSnapshot, ClusterSnapshot};
use brokerlens::{CapturedSnapshot, History, Observer, SnapshotFault};
use parking_lot::Mutex;
use serde::Serialize;
use serde_json::json;

use crate::settings::OutputFormat;

/// A one-line description of a snapshot.
pub trait Summarize {
    fn summary(&self) -> String;
}

impl Summarize for ClusterSnapshot {
    fn summary(&self) -> String {
        format!(
            "cluster {}: {} nodes ({} running, {} alarmed){}",
            self.cluster_name,
            self.nodes.len(),
            self.running_nodes().count(),
            self.alarmed_nodes().count(),
            if self.is_partitioned() { ", PARTITIONED" } else { "" }
        )
    }
}

impl Summarize for BrokerConnectivitySnapshot {
    fn summary(&self) -> String {
        let blocked = self.connections.iter().filter(|c| c.is_blocked()).count();
        format!(
            "cluster {}: {} connections ({} blocked), {} channels, {} consumers",
            self.cluster_name,
            self.connections.len(),
            blocked,
            self.total_channels(),
            self.total_consumers()
        )
    }
}

impl Summarize for BrokerQueuesSnapshot {
    fn summary(&self) -> String {
        format!(
            "cluster {}: {} queues, {} ready, {} unacked, {} unconsumed",
            self.cluster_name,
            self.queues.len(),
            self.total_ready(),
            self.total_unacknowledged(),
            self.unconsumed_queues().count()
        )
    }
}

/// Observer that writes every capture outcome as one line.
pub struct Printer<W> {
    format: OutputFormat,
    out: Mutex<W>,
}

impl Printer<io::Stdout> {
    pub fn stdout(format: OutputFormat) -> Self {
        Self::new(format, io::stdout())
    }
}

impl<W: Write> Printer<W> {
    pub fn new(format: OutputFormat, out: W) -> Self {
        Self {
            format,
            out: Mutex::new(out),
        }
    }

    #[cfg(test)]
    pub(crate) fn into_inner(self) -> W {
        self.out.into_inner()
    }

    fn write_line(&self, line: &str) {
        let mut out = self.out.lock();
        if let Err(err) = writeln!(out, "{}", line).and_then(|_| out.flush()) {
            tracing::warn!(error = %err, "Failed to write output");
        }
    }
}

impl<T, W> Observer<T> for Printer<W>
where
    T: Serialize + Summarize,
    W: Write + Send,
{
    fn on_snapshot(&self, captured: &Arc<CapturedSnapshot<T>>) {
        let line = match self.format {
            OutputFormat::Json => match serde_json::to_string(captured.as_ref()) {
                Ok(line) => line,
                Err(err) => {
                    tracing::warn!(error = %err, "Failed to serialize capture");
                    return;
                }
            },
            OutputFormat::Summary => format!(
                "{} {} {}",
                captured.timestamp_ms(),
                captured.id(),
                captured.snapshot().summary()
            ),
        };
        self.write_line(&line);
    }

    fn on_fault(&self, fault: &SnapshotFault) {
        let line = match self.format {
            OutputFormat::Json => json!({
                "fault": fault.reason(),
                "resource": fault.resource().map(|r| r.to_string()),
                "detail": fault.detail(),
            })
            .to_string(),
            OutputFormat::Summary => format!("FAULT {} ({})", fault.reason(), fault.detail()),
        };
        self.write_line(&line);
    }
}

#[derive(Serialize)]
struct Export<'a, T> {
    total_captured: u64,
    evicted: u64,
    captures: Vec<&'a CapturedSnapshot<T>>,
}

/// Write the retained history to `path` as pretty JSON.
pub fn export_history<T: Serialize>(history: &History<T>, path: &Path) -> Result<()> {
    let export = Export {
        total_captured: history.total_captured(),
        evicted: history.evicted(),
        captures: history.iter().map(|c| c.as_ref()).collect(),
    };

    let body = serde_json::to_string_pretty(&export)?;
    std::fs::write(path, body)
        .with_context(|| format!("Failed to write export to {}", path.display()))?;
    Ok(())
}
