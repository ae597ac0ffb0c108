use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(name = "pulsemap-server")]
#[command(author, version, about = "PulseMap event ingestion and SSE fan-out server")]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Start the event server
    Serve {
        /// Listen port
        #[arg(short, long, default_value = "3000")]
        port: u16,

        /// Listen address
        #[arg(short, long, default_value = "127.0.0.1")]
        address: String,

        /// SSE keep-alive interval in seconds
        #[arg(long, default_value = "30")]
        keep_alive_secs: u64,

        /// Backlog events kept for replay (0 = unbounded)
        #[arg(long, default_value = "10000")]
        max_backlog: usize,

        /// Enable verbose logging
        #[arg(short, long)]
        verbose: bool,
    },

    /// Generate packet traffic against a running server
    Simulate {
        /// Target server base URL
        #[arg(short, long, default_value = "http://127.0.0.1:3000")]
        target: String,

        /// Events per burst
        #[arg(short, long, default_value = "30")]
        batch_size: usize,

        /// Milliseconds between bursts
        #[arg(short, long, default_value = "200")]
        interval_ms: u64,

        /// Number of bursts to send (0 = until interrupted)
        #[arg(long, default_value = "400")]
        batches: u64,

        /// Enable verbose logging
        #[arg(short, long)]
        verbose: bool,
    },
}
