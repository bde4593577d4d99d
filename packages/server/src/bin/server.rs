//! Rangeline live shot server.
//!
//! Reads hits from the infrared target-grid sensor, routes them to active
//! live-grid sessions and relays them to WebSocket clients.
//!
//! Run with:
//! ```not_rust
//! cargo run --bin rangeline-server
//! cargo run --bin rangeline-server -- --serial-device /dev/ttyUSB0 --snapshot-dir ./snapshots
//! ```

use std::{path::PathBuf, sync::Arc, time::Duration};

use clap::Parser;
use rangeline_server::{
    domain::{SessionSnapshotStore, WireDecoder, scoring::ScoringConfig},
    infrastructure::{
        message_pusher::WebSocketMessagePusher,
        repository::{FileSnapshotStore, InMemorySnapshotStore, StaticMetadataLookup},
        sensor::{BackoffPolicy, SerialSensorFeed},
    },
    ui::{AppState, Server, shutdown_signal},
    usecase::{
        BroadcastHub, Heartbeat, LiveShotPipeline, SessionRouter, SessionStatisticsUseCase,
        SnapshotPersister,
    },
};
use rangeline_shared::{
    logger::setup_logger,
    time::{Clock, SystemClock},
};
use tokio::sync::mpsc;

/// Sensor frames buffered between the feed and the pipeline.
const SENSOR_CHANNEL_CAPACITY: usize = 1024;

#[derive(Parser, Debug)]
#[command(name = "rangeline-server")]
#[command(about = "Live shot pipeline and broadcast hub for the shooting range", long_about = None)]
struct Args {
    /// Host address to bind the server to
    #[arg(short = 'H', long, default_value = "127.0.0.1")]
    host: String,

    /// Port number to bind the server to
    #[arg(short = 'p', long, default_value = "8080")]
    port: u16,

    /// Sensor device to read hits from (no live input if omitted)
    #[arg(long)]
    serial_device: Option<PathBuf>,

    /// Directory for session snapshots (in-memory if omitted)
    #[arg(long)]
    snapshot_dir: Option<PathBuf>,

    /// Seconds between heartbeat pings
    #[arg(long, default_value = "30")]
    heartbeat_secs: u64,

    /// Sensor device units per millimeter on the target plane
    #[arg(long, default_value = "1.0")]
    units_per_mm: f64,

    /// Inner ring as a fraction of the engagement-area radius
    #[arg(long, default_value = "0.5")]
    inner_ratio: f64,

    /// Outer ring margin as a fraction of the target radius
    #[arg(long, default_value = "0.25")]
    outer_margin_ratio: f64,
}

#[tokio::main]
async fn main() {
    // Initialize tracing
    setup_logger(env!("CARGO_BIN_NAME"), "info");

    let args = Args::parse();

    if let Err(e) = run(args).await {
        tracing::error!("Server error: {}", e);
        std::process::exit(1);
    }
}

async fn run(args: Args) -> Result<(), Box<dyn std::error::Error>> {
    let scoring_config = ScoringConfig {
        inner_ratio: args.inner_ratio,
        outer_margin_ratio: args.outer_margin_ratio,
        units_per_millimeter: args.units_per_mm,
    };
    scoring_config.validate()?;
    if args.heartbeat_secs == 0 {
        return Err("--heartbeat-secs must be greater than zero".into());
    }

    // Initialize dependencies in order:
    // 1. Collaborators (snapshot store, metadata lookup, clock)
    // 2. Snapshot persister
    // 3. Router, hub and use cases
    // 4. Background tasks (heartbeat, sensor feed, pipeline)
    // 5. Server

    // 1. Collaborators
    let clock: Arc<dyn Clock> = Arc::new(SystemClock);
    let snapshot_store: Arc<dyn SessionSnapshotStore> = match &args.snapshot_dir {
        Some(dir) => Arc::new(FileSnapshotStore::open(dir).await?),
        None => {
            tracing::warn!("No --snapshot-dir given; session snapshots are kept in memory only");
            Arc::new(InMemorySnapshotStore::new())
        }
    };
    let metadata_lookup = Arc::new(StaticMetadataLookup::new());

    // 2. Snapshot persister
    let persister = SnapshotPersister::spawn(snapshot_store.clone());

    // 3. Router, hub and use cases
    let router = Arc::new(SessionRouter::new(
        persister.sink(),
        snapshot_store,
        metadata_lookup,
        clock.clone(),
    ));
    let hub = Arc::new(BroadcastHub::new(
        Arc::new(WebSocketMessagePusher::new()),
        clock.clone(),
    ));
    let statistics = Arc::new(SessionStatisticsUseCase::new(
        router.clone(),
        scoring_config,
    ));

    // 4. Background tasks
    let heartbeat = Heartbeat::spawn(hub.clone(), Duration::from_secs(args.heartbeat_secs));
    let live_input = match &args.serial_device {
        Some(device) => {
            let (events_tx, events_rx) = mpsc::channel(SENSOR_CHANNEL_CAPACITY);
            let pipeline = Arc::new(LiveShotPipeline::new(
                WireDecoder::new(clock.clone()),
                router.clone(),
                hub.clone(),
            ));
            let pipeline = pipeline.spawn(events_rx);
            let feed = SerialSensorFeed::new(device, BackoffPolicy::default()).spawn(events_tx);
            tracing::info!("Reading hits from '{}'", device.display());
            Some((feed, pipeline))
        }
        None => {
            tracing::warn!("No --serial-device given; only manual shots will be recorded");
            None
        }
    };

    // 5. Server
    let state = Arc::new(AppState::new(router, hub, statistics));
    let result = Server::new(state)
        .run(args.host, args.port, shutdown_signal())
        .await;

    // Shutdown: stop producers first, then drain the snapshot writer
    if let Some((feed, pipeline)) = live_input {
        feed.shutdown().await;
        pipeline.shutdown().await;
    }
    heartbeat.shutdown().await;
    persister.shutdown().await;
    tracing::info!("Server shutdown complete");

    result
}
