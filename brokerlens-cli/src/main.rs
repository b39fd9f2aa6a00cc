use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use anyhow::{bail, Result};
use brokerlens::{
    BrokerApi, BrokerConnectivity, BrokerQueues, CancelToken, CaptureError, Cluster, Lens,
    ManagementClient, Observer, SnapshotKind,
};
use clap::Parser;
use serde::Serialize;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod duration;
mod output;
mod settings;

use output::{export_history, Printer, Summarize};
use settings::{LensKind, OutputFormat, Settings};

#[derive(Parser, Debug)]
#[command(name = "brokerlens")]
#[command(about = "Poll a RabbitMQ broker and print point-in-time snapshots")]
struct Args {
    /// Settings file (TOML, YAML or JSON)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Management API base URL
    #[arg(long)]
    endpoint: Option<String>,

    #[arg(short, long)]
    username: Option<String>,

    #[arg(short, long)]
    password: Option<String>,

    /// Restrict connections, channels and queues to one vhost
    #[arg(long)]
    vhost: Option<String>,

    /// Snapshot kind to capture
    #[arg(short, long, value_enum)]
    kind: Option<LensKind>,

    /// Time between captures (e.g., "5s", "500ms")
    #[arg(short, long)]
    interval: Option<String>,

    /// Stop after this many captures (0 runs until Ctrl-C)
    #[arg(short = 'n', long)]
    count: Option<u64>,

    /// Captures kept in history
    #[arg(long)]
    history: Option<usize>,

    /// Output format
    #[arg(short, long, value_enum)]
    format: Option<OutputFormat>,

    /// Export retained history to a JSON file on exit
    #[arg(short, long)]
    export: Option<PathBuf>,
}

impl Args {
    /// Flags take precedence over every other settings source.
    fn apply(self, settings: &mut Settings) {
        if let Some(endpoint) = self.endpoint {
            settings.client.endpoint = endpoint;
        }
        if let Some(username) = self.username {
            settings.client.username = username;
        }
        if let Some(password) = self.password {
            settings.client.password = password;
        }
        if let Some(vhost) = self.vhost {
            settings.client.vhost = Some(vhost);
        }
        if let Some(kind) = self.kind {
            settings.kind = kind;
        }
        if let Some(interval) = self.interval {
            settings.interval = interval;
        }
        if let Some(count) = self.count {
            settings.count = count;
        }
        if let Some(history) = self.history {
            settings.lens.history_capacity = history;
        }
        if let Some(format) = self.format {
            settings.format = format;
        }
    }
}

fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let args = Args::parse();
    let mut settings = Settings::load(args.config.as_deref())?;
    let export = args.export.clone();
    args.apply(&mut settings);

    let rt = tokio::runtime::Runtime::new()?;
    rt.block_on(run(settings, export))
}

async fn run(settings: Settings, export: Option<PathBuf>) -> Result<()> {
    let client = ManagementClient::from_config(&settings.client)?;
    info!(endpoint = client.endpoint(), kind = ?settings.kind, "Connecting");
    let api: Arc<dyn BrokerApi> = Arc::new(client);

    let cancel = CancelToken::new();
    {
        let cancel = cancel.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                cancel.cancel();
            }
        });
    }

    let export = export.as_deref();
    match settings.kind {
        LensKind::Cluster => poll(Cluster, api, &settings, &cancel, export).await,
        LensKind::Connectivity => {
            poll(BrokerConnectivity, api, &settings, &cancel, export).await
        }
        LensKind::Queues => poll(BrokerQueues, api, &settings, &cancel, export).await,
    }
}

async fn poll<K>(
    kind: K,
    api: Arc<dyn BrokerApi>,
    settings: &Settings,
    cancel: &CancelToken,
    export: Option<&Path>,
) -> Result<()>
where
    K: SnapshotKind,
    K::Snapshot: Serialize + Summarize,
{
    let printer: Arc<dyn Observer<K::Snapshot>> = Arc::new(Printer::stdout(settings.format));
    let lens = Lens::with_config(kind, api, &settings.lens);
    lens.register_observer(printer);

    let summary = capture_loop(&lens, settings.interval()?, settings.count, cancel).await;

    if let Some(path) = export {
        export_history(&lens.history(), path)?;
        info!(path = %path.display(), "Exported history");
    }

    if summary.captured == 0 && summary.faulted > 0 {
        bail!("No snapshot captured ({} faulted attempts)", summary.faulted);
    }
    Ok(())
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
struct LoopSummary {
    captured: u64,
    faulted: u64,
}

/// Capture every `interval` until `count` attempts have run (0 = no limit)
/// or `cancel` fires. Outcomes reach the lens's observers.
async fn capture_loop<K: SnapshotKind>(
    lens: &Lens<K>,
    interval: Duration,
    count: u64,
    cancel: &CancelToken,
) -> LoopSummary {
    let mut summary = LoopSummary::default();
    let mut timer = tokio::time::interval(interval);
    timer.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            _ = timer.tick() => {}
            _ = cancel.cancelled() => break,
        }

        match lens.take_snapshot(cancel).await {
            Ok(_) => summary.captured += 1,
            Err(CaptureError::Fault(_)) => summary.faulted += 1,
            Err(CaptureError::Cancelled) => break,
        }

        if count > 0 && summary.captured + summary.faulted >= count {
            break;
        }
    }

    if cancel.is_cancelled() {
        warn!("Interrupted");
    }
    summary
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use brokerlens::client::model::{
        ChannelInfo, ConnectionInfo, NodeInfo, Overview, QueueInfo,
    };
    use brokerlens::ClientError;
    use std::sync::atomic::{AtomicU64, Ordering};

    /// Fails every `fail_every`th overview request (0 never fails).
    struct FakeBroker {
        fail_every: u64,
        overview_calls: AtomicU64,
    }

    impl FakeBroker {
        fn new(fail_every: u64) -> Arc<Self> {
            Arc::new(Self {
                fail_every,
                overview_calls: AtomicU64::new(0),
            })
        }
    }

    #[async_trait]
    impl BrokerApi for FakeBroker {
        async fn overview(&self) -> Result<Overview, ClientError> {
            let n = self.overview_calls.fetch_add(1, Ordering::SeqCst) + 1;
            if self.fail_every > 0 && n % self.fail_every == 0 {
                return Err(ClientError::Timeout);
            }
            Ok(Overview {
                cluster_name: Some("prod".to_string()),
                ..Default::default()
            })
        }

        async fn nodes(&self) -> Result<Vec<NodeInfo>, ClientError> {
            Ok(vec![NodeInfo {
                name: "rabbit@a".to_string(),
                running: true,
                ..Default::default()
            }])
        }

        async fn connections(&self) -> Result<Vec<ConnectionInfo>, ClientError> {
            Ok(Vec::new())
        }

        async fn channels(&self) -> Result<Vec<ChannelInfo>, ClientError> {
            Ok(Vec::new())
        }

        async fn queues(&self) -> Result<Vec<QueueInfo>, ClientError> {
            Ok(vec![QueueInfo {
                name: "orders".to_string(),
                vhost: "/".to_string(),
                ..Default::default()
            }])
        }
    }

    #[test]
    fn flags_override_settings() {
        let args = Args::parse_from([
            "brokerlens",
            "--endpoint",
            "http://other:15672",
            "--kind",
            "queues",
            "--interval",
            "1s",
            "-n",
            "4",
            "--history",
            "12",
            "--format",
            "summary",
        ]);
        let mut settings = Settings::default();
        args.apply(&mut settings);

        assert_eq!(settings.client.endpoint, "http://other:15672");
        assert_eq!(settings.client.username, "guest");
        assert_eq!(settings.kind, LensKind::Queues);
        assert_eq!(settings.interval().unwrap(), Duration::from_secs(1));
        assert_eq!(settings.count, 4);
        assert_eq!(settings.lens.history_capacity, 12);
        assert_eq!(settings.format, OutputFormat::Summary);
    }

    #[test]
    fn absent_flags_leave_settings_alone() {
        let args = Args::parse_from(["brokerlens"]);
        let mut settings = Settings {
            count: 9,
            ..Default::default()
        };
        args.apply(&mut settings);
        assert_eq!(settings.count, 9);
        assert_eq!(settings.kind, LensKind::Cluster);
    }

    #[test]
    fn rejects_unknown_kind_flag() {
        assert!(Args::try_parse_from(["brokerlens", "--kind", "exchanges"]).is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn loop_stops_after_count_attempts() {
        let lens = Lens::new(Cluster, FakeBroker::new(2));

        let summary =
            capture_loop(&lens, Duration::from_secs(1), 5, &CancelToken::new()).await;

        assert_eq!(
            summary,
            LoopSummary {
                captured: 3,
                faulted: 2
            }
        );
        assert_eq!(lens.history().len(), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn loop_stops_on_cancel() {
        let lens = Lens::new(BrokerQueues, FakeBroker::new(0));
        let cancel = CancelToken::new();
        let trigger = cancel.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(2500)).await;
            trigger.cancel();
        });

        let summary = capture_loop(&lens, Duration::from_secs(1), 0, &cancel).await;

        // Ticks at 0s, 1s and 2s
        assert_eq!(summary.captured, 3);
        assert_eq!(summary.faulted, 0);
    }

    #[tokio::test(start_paused = true)]
    async fn export_writes_retained_history() {
        let lens = Lens::with_config(
            Cluster,
            FakeBroker::new(0),
            &brokerlens::LensConfig::default().with_history_capacity(2),
        );
        capture_loop(&lens, Duration::from_millis(10), 3, &CancelToken::new()).await;

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("history.json");
        export_history(&lens.history(), &path).unwrap();

        let value: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(value["total_captured"], 3);
        assert_eq!(value["evicted"], 1);
        let captures = value["captures"].as_array().unwrap();
        assert_eq!(captures.len(), 2);
        assert_eq!(captures[0]["snapshot"]["cluster_name"], "prod");
        assert!(captures[0]["id"].is_string());
    }

    #[tokio::test]
    async fn printer_writes_json_capture_lines() {
        let lens = Lens::new(Cluster, FakeBroker::new(0));
        let printer = Arc::new(Printer::new(OutputFormat::Json, Vec::new()));
        let observer: Arc<dyn Observer<brokerlens::types::ClusterSnapshot>> = printer.clone();
        lens.register_observer(observer);

        let captured = lens.take_snapshot(&CancelToken::none()).await.unwrap();
        drop(lens);

        let printer = Arc::try_unwrap(printer).ok().unwrap();
        let text = String::from_utf8(printer.into_inner()).unwrap();
        let value: serde_json::Value = serde_json::from_str(text.trim()).unwrap();
        assert_eq!(value["id"], captured.id().as_str());
        assert_eq!(value["snapshot"]["nodes"][0]["name"], "rabbit@a");
    }
}
