//! WebSocket chat relay server for the blog's global chat.
//!
//! Accepts identified connections, replays recent history to new joiners,
//! and broadcasts chat messages and presence counts to all connected clients.
//!
//! Run with:
//! ```not_rust
//! cargo run --bin server
//! cargo run --bin server -- --host 0.0.0.0 --port 3000 --history-capacity 100
//! ```

use clap::Parser;
use global_chat_rs::{
    common::logger::setup_logger,
    server::run_server,
};

#[derive(Parser, Debug)]
#[command(name = "server")]
#[command(about = "Single-room WebSocket chat relay with presence and history", long_about = None)]
struct Args {
    /// Host address to bind the server to
    #[arg(short = 'H', long, default_value = "127.0.0.1")]
    host: String,

    /// Port number to bind the server to
    #[arg(short = 'p', long, default_value = "8080")]
    port: u16,

    /// Number of recent messages replayed to new connections
    #[arg(long, default_value_t = global_chat_rs::server::history::DEFAULT_HISTORY_CAPACITY)]
    history_capacity: usize,
}

#[tokio::main]
async fn main() {
    // Initialize tracing
    setup_logger(env!("CARGO_BIN_NAME"), "info");

    let args = Args::parse();

    if let Err(e) = run_server(args.host, args.port, args.history_capacity).await {
        tracing::error!("Server error: {}", e);
        std::process::exit(1);
    }
}
