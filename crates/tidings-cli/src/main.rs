//! Tidings script replay binary.
//!
//! # Usage
//!
//! ```bash
//! # Replay a script as alice
//! tidings --user alice --script conversation.jsonl
//!
//! # Read the script from stdin, evicting typists idle for 5 seconds
//! cat conversation.jsonl | tidings --user alice --typing-idle-timeout-ms 5000
//! ```

use std::{io, path::PathBuf, time::Duration};

use clap::Parser;
use tidings_app::Runtime;
use tidings_cli::ScriptDriver;
use tidings_core::{Session, SystemEnv, TrackerConfig};
use tokio::io::{AsyncBufRead, BufReader};
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Tidings script replay
#[derive(Parser, Debug)]
#[command(name = "tidings")]
#[command(about = "Replay a chat event script and print what the conversation screen draws")]
#[command(version)]
struct Args {
    /// Local user the screen belongs to
    #[arg(short, long)]
    user: String,

    /// JSON-lines script to replay (defaults to stdin)
    #[arg(short, long)]
    script: Option<PathBuf>,

    /// Evict typists whose last start signal is older than this
    #[arg(long)]
    typing_idle_timeout_ms: Option<u64>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "info")]
    log_level: String,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&args.log_level));

    tracing_subscriber::registry().with(fmt::layer().with_writer(io::stderr)).with(filter).init();

    let reader: Box<dyn AsyncBufRead + Unpin + Send> = match &args.script {
        Some(path) => {
            tracing::info!(path = %path.display(), "replaying script");
            Box::new(BufReader::new(tokio::fs::File::open(path).await?))
        },
        None => {
            tracing::info!("replaying script from stdin");
            Box::new(BufReader::new(tokio::io::stdin()))
        },
    };

    let config = TrackerConfig {
        idle_timeout: args.typing_idle_timeout_ms.map(Duration::from_millis),
    };

    let env = SystemEnv::new();
    let driver = ScriptDriver::new(reader, io::stdout(), env.clone());
    let runtime = Runtime::new(driver, env, Session::new(args.user), config);

    runtime.run().await?;

    tracing::info!("script finished");
    Ok(())
}
