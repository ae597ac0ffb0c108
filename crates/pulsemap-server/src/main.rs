use clap::Parser;
use pulsemap_server::cli::{Cli, Commands};
use pulsemap_server::config::ServerConfig;
use pulsemap_server::server::run_server;
use pulsemap_server::traffic::{run_simulation, TrafficConfig};
use std::net::SocketAddr;
use std::time::Duration;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Serve {
            port,
            address,
            keep_alive_secs,
            max_backlog,
            verbose,
        } => {
            init_logging(verbose);

            let config = ServerConfig {
                keep_alive_secs,
                max_backlog,
            };
            let addr: SocketAddr = format!("{}:{}", address, port).parse()?;

            run_server(config, addr).await?;
        }

        Commands::Simulate {
            target,
            batch_size,
            interval_ms,
            batches,
            verbose,
        } => {
            init_logging(verbose);

            let config = TrafficConfig {
                batch_size,
                interval: Duration::from_millis(interval_ms),
                batches,
            };

            run_simulation(&target, config).await?;
        }
    }

    Ok(())
}

fn init_logging(verbose: bool) {
    let filter = if verbose {
        "pulsemap_server=debug,tower_http=debug"
    } else {
        "pulsemap_server=info,tower_http=warn"
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| filter.into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}
