//! Command line entry point for the emulator test harness
//!
//! `harness daemon` runs a standalone trace daemon and logs what it receives.
//! `harness probe` checks whether an emulator on localhost is ready.

use std::net::SocketAddr;
use std::time::Duration;

use anyhow::Context;
use clap::{Parser, Subcommand};
use tokio::signal;

use harness::{EmulatorConfig, RetryPolicy, default_probes, wait_until_ready};
use harness::core::retry;
use shared::logging;
use trace_daemon::{DaemonConfig, DaemonError, TestDaemon};

/// Local emulator test harness
#[derive(Parser)]
#[command(name = "harness")]
#[command(about = "Trace daemon and readiness tooling for emulator-backed tests")]
pub struct Args {
    /// Log at debug level
    #[arg(long, short, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Run a trace daemon and log every received segment until Ctrl+C
    Daemon {
        /// Bind address (defaults to an ephemeral loopback port)
        #[arg(long)]
        bind: Option<SocketAddr>,

        /// Receive window in milliseconds
        #[arg(long, default_value = "500")]
        timeout_ms: u64,
    },

    /// Probe the default emulator endpoints until they are all ready
    Probe {
        /// Overall time to wait before giving up
        #[arg(long, default_value = "60")]
        timeout_secs: u64,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Missing .env is fine
    let _ = dotenv::dotenv();

    let args = Args::parse();
    logging::init_tracing(args.verbose);

    match args.command {
        Command::Daemon { bind, timeout_ms } => run_daemon(bind, Duration::from_millis(timeout_ms)).await,
        Command::Probe { timeout_secs } => run_probe(Duration::from_secs(timeout_secs)).await,
    }
}

async fn run_daemon(bind: Option<SocketAddr>, recv_timeout: Duration) -> anyhow::Result<()> {
    let mut builder = DaemonConfig::builder().recv_timeout(recv_timeout);
    if let Some(addr) = bind {
        builder = builder.bind_addr(addr).fallback_bind_addr(None);
    }

    let (ctx, daemon) = TestDaemon::start_with(builder.build())
        .await
        .context("failed to start trace daemon")?;
    logging::log_startup("daemon", &format!("trace daemon on {}", ctx.daemon_addr()));

    loop {
        tokio::select! {
            _ = signal::ctrl_c() => {
                logging::log_shutdown("daemon", "received Ctrl+C");
                break;
            }
            result = daemon.recv() => match result {
                Ok(segment) => tracing::info!(
                    name = %segment.name,
                    id = %segment.id,
                    trace_id = %segment.trace_id,
                    duration = ?segment.duration(),
                    "📥 Segment received"
                ),
                Err(DaemonError::Timeout(_)) => continue,
                Err(DaemonError::Closed) => break,
                Err(e) => logging::log_error("daemon", "segment decode", &e),
            }
        }
    }

    daemon.close().await;
    Ok(())
}

async fn run_probe(max_wait: Duration) -> anyhow::Result<()> {
    let config = EmulatorConfig::from_env();
    let policy = RetryPolicy {
        max_elapsed: max_wait,
        ..config.readiness_retry
    };
    let probes = default_probes(&config.endpoints, Duration::from_secs(2))?;
    logging::log_startup("probe", &format!("readiness check of {} services", probes.len()));

    let probes = &probes;
    let outcome = retry(&policy, || async move {
        let (ctx, daemon) = TestDaemon::start().await?;
        let outcome = wait_until_ready(probes, &ctx).await;
        daemon.close().await;
        outcome
    })
    .await;

    match outcome {
        Ok(()) => {
            logging::log_success("probe", "all emulator services ready");
            Ok(())
        }
        Err(exhausted) => {
            logging::log_error("probe", "readiness check", &exhausted.last_error);
            anyhow::bail!(
                "emulator not ready after {} attempts in {:?}",
                exhausted.attempts,
                exhausted.elapsed
            )
        }
    }
}
