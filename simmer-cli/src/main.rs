//! Simmer CLI: block until a service is ready

use anyhow::Result;
use clap::{ArgAction, Parser, Subcommand};
use simmer_core::Status;
use simmer_wait::{wait, HttpWaiter, TcpWaiter};
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod config;

const DEFAULT_INTERVAL: Duration = Duration::from_secs(3);
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(5 * 60);
const DEFAULT_IO_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Parser)]
#[command(name = "simmer")]
#[command(about = "Wait for a service to become available", long_about = None)]
#[command(version)]
struct Cli {
    /// Interval between checks (retries are actually paced by backoff)
    #[arg(short, long, global = true, value_parser = humantime::parse_duration)]
    interval: Option<Duration>,

    /// Timeout of all checks [default: 5m]
    #[arg(short, long, global = true, value_parser = humantime::parse_duration)]
    timeout: Option<Duration>,

    /// Config file with default durations
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, global = true, default_value = "info")]
    log_level: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Wait for an HTTP health check
    Http {
        /// URL to wait for
        url: String,

        /// Method to use
        #[arg(short, long, default_value = "GET")]
        method: String,

        /// Status to check for
        #[arg(short, long, default_value_t = 200)]
        status: u16,

        /// Content to check for
        #[arg(short, long)]
        content: Option<String>,

        /// Whether content is the complete expected response
        #[arg(long, default_value_t = true, action = ArgAction::Set)]
        complete: bool,
    },

    /// Wait for a TCP health check
    Tcp {
        /// host:port to wait for
        addr: String,

        /// Content to check for
        #[arg(short, long)]
        content: Option<String>,

        /// Write this to the connection before listening
        #[arg(short, long)]
        write: Option<String>,

        /// Timeout of read/write operations [default: 5s]
        #[arg(long, value_parser = humantime::parse_duration)]
        iotimeout: Option<Duration>,

        /// Whether content + EOF is the complete expected response
        #[arg(long, default_value_t = false, action = ArgAction::Set)]
        complete: bool,
    },
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let cli = Cli::parse();
    init_tracing(&cli.log_level)?;

    let file = match &cli.config {
        Some(path) => config::load(path)?,
        None => config::FileConfig::default(),
    };
    let interval = config::resolve(cli.interval, file.interval, DEFAULT_INTERVAL);
    let timeout = config::resolve(cli.timeout, file.timeout, DEFAULT_TIMEOUT);

    let cancel = CancellationToken::new();
    let ctrl_c = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::info!("received ctrl-c, cancelling");
            ctrl_c.cancel();
        }
    });

    let mut statuses = match cli.command {
        Commands::Http {
            url,
            method,
            status,
            content,
            complete,
        } => wait(
            HttpWaiter {
                method,
                url,
                expected_status: status,
                content,
                entire_content: complete,
            },
            interval,
            timeout,
            cancel,
        ),
        Commands::Tcp {
            addr,
            content,
            write,
            iotimeout,
            complete,
        } => wait(
            TcpWaiter {
                addr,
                content,
                write,
                io_timeout: config::resolve(iotimeout, file.iotimeout, DEFAULT_IO_TIMEOUT),
                entire_content: complete,
            },
            interval,
            timeout,
            cancel,
        ),
    };

    // The wait itself never exits the process; the terminal status decides
    // the exit code here.
    let mut exit = ExitCode::SUCCESS;
    while let Some(status) = statuses.recv().await {
        log_status(&status);
        if status.error.is_some() {
            exit = ExitCode::FAILURE;
        }
    }
    Ok(exit)
}

fn log_status(status: &Status) {
    match &status.error {
        Some(error) => tracing::error!(done = status.done, error = %error, "exiting"),
        None => tracing::info!(message = %status.message, done = status.done, "update"),
    }
}

fn init_tracing(level: &str) -> Result<()> {
    let filter = match level.to_lowercase().as_str() {
        "trace" => tracing::Level::TRACE,
        "debug" => tracing::Level::DEBUG,
        "info" => tracing::Level::INFO,
        "warn" => tracing::Level::WARN,
        "error" => tracing::Level::ERROR,
        _ => tracing::Level::INFO,
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_level(true),
        )
        .with(
            tracing_subscriber::EnvFilter::from_default_env().add_directive(filter.into()),
        )
        .init();

    Ok(())
}
