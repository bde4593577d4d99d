//! Rangeline operator console.
//!
//! Watches live shots and session events from the broadcast hub.
//!
//! Run with:
//! ```not_rust
//! cargo run --bin rangeline-console -- --events irShot,sessions
//! cargo run --bin rangeline-console -- --session S1 --lane 2
//! ```

use clap::Parser;
use rangeline_console::{ConsoleOptions, run_console};
use rangeline_shared::logger::setup_logger;

#[derive(Parser, Debug)]
#[command(name = "rangeline-console")]
#[command(about = "Operator console for the Rangeline broadcast hub", long_about = None)]
struct Args {
    /// WebSocket URL of the hub
    #[arg(short = 'u', long, default_value = "ws://127.0.0.1:8080/ws")]
    url: String,

    /// Topics to subscribe to on connect (comma separated)
    #[arg(short = 'e', long, value_delimiter = ',')]
    events: Vec<String>,

    /// Session to join on connect
    #[arg(short = 's', long)]
    session: Option<String>,

    /// Lane to join on connect
    #[arg(short = 'l', long)]
    lane: Option<String>,
}

#[tokio::main]
async fn main() {
    // Initialize tracing
    setup_logger(env!("CARGO_BIN_NAME"), "info");

    let args = Args::parse();
    let options = ConsoleOptions {
        url: args.url,
        events: args.events,
        session: args.session,
        lane: args.lane,
    };

    if let Err(e) = run_console(options).await {
        tracing::error!("Console error: {}", e);
        std::process::exit(1);
    }
}
