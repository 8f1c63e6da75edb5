//! Rock-paper-scissors round server.

use std::fs::OpenOptions;
use std::path::PathBuf;
use std::sync::Mutex;
use std::time::Duration;

use anyhow::Context;
use clap::Parser;
use rps_server::config::Config;
use rps_server::server;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[clap(name = "rps-server")]
#[clap(about = "Timed multiplayer rock-paper-scissors rounds over TCP")]
struct Cli {
    /// Interface to bind to (overrides RPS_BIND_ADDR)
    #[clap(short = 'H', long)]
    host: Option<String>,

    /// TCP port to listen on (overrides RPS_PORT)
    #[clap(short, long)]
    port: Option<u16>,

    /// Maximum simultaneous sessions (overrides RPS_MAX_CLIENTS)
    #[clap(long)]
    max_clients: Option<usize>,

    /// Round length in seconds (overrides RPS_ROUND_SECONDS)
    #[clap(long)]
    round_seconds: Option<u32>,

    /// Tick period in milliseconds (overrides RPS_TICK_MILLIS)
    #[clap(long)]
    tick_millis: Option<u64>,

    /// Enable debug logging
    #[clap(short, long)]
    debug: bool,

    /// Append logs to this file instead of stderr
    #[clap(long)]
    log_file: Option<PathBuf>,
}

impl Cli {
    fn apply(&self, config: &mut Config) {
        if let Some(host) = &self.host {
            config.bind_addr = host.clone();
        }
        if let Some(port) = self.port {
            config.port = port;
        }
        if let Some(max_clients) = self.max_clients {
            config.max_clients = max_clients;
        }
        if let Some(round_seconds) = self.round_seconds {
            config.round_seconds = round_seconds;
        }
        if let Some(tick_millis) = self.tick_millis {
            config.tick_interval = Duration::from_millis(tick_millis);
        }
    }
}

fn init_tracing(cli: &Cli) -> anyhow::Result<()> {
    let filter = if cli.debug {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };
    let builder = tracing_subscriber::fmt().with_env_filter(filter);

    match &cli.log_file {
        Some(path) => {
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .with_context(|| format!("cannot open log file {}", path.display()))?;
            builder.with_ansi(false).with_writer(Mutex::new(file)).init();
        }
        None => builder.init(),
    }

    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(&cli)?;

    let mut config = Config::from_env()?;
    cli.apply(&mut config);
    config.validate()?;

    info!(
        addr = %config.socket_addr_string(),
        max_clients = config.max_clients,
        round_seconds = config.round_seconds,
        "starting rps-server"
    );

    server::run(config).await
}
