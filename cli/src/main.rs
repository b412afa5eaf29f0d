//! juice-monitor: the command-line entry point for the Juice protocol monitor.
//!
//! # Usage
//!
//! ```text
//! juice-monitor
//! juice-monitor --config monitor.yaml
//! juice-monitor --once
//! ```
//!
//! Settings come from the optional YAML file, overridden by environment
//! variables. Log verbosity follows `RUST_LOG` (default `info`).

use std::path::PathBuf;
use std::process;

use clap::Parser;
use tokio::signal;
use tokio_util::sync::CancellationToken;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use juice_monitor_core::data::settings::{self, CONFIG_PATH_ENV};
use juice_monitor_core::{Monitor, MonitorOptions};

#[derive(Debug, Parser)]
#[command(name = "juice-monitor", version, about = "Watch JuiceSwap and JuiceDollar and alert on Telegram")]
struct Args {
    /// YAML settings file.
    #[arg(long, env = CONFIG_PATH_ENV)]
    config: Option<PathBuf>,

    /// Run one poll cycle and exit.
    #[arg(long)]
    once: bool,
}


#[tokio::main]
async fn main() {
    let args = Args::parse();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let settings = match settings::load(args.config.as_deref()) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("juice-monitor: {}", e);
            process::exit(1);
        }
    };
    info!(
        juiceswap = %settings.juiceswap_graphql_url,
        juicedollar = %settings.juicedollar_graphql_url,
        interval_ms = settings.poll_interval_ms,
        init_mode = settings.init_mode.as_str(),
        catch_up_policy = settings.catch_up_policy.as_str(),
        "starting juice monitor"
    );

    let mut options = MonitorOptions::from_settings(&settings);
    if args.once {
        options = options.once();
    }

    let cancel = CancellationToken::new();
    let monitor = match Monitor::connect(&settings, options, cancel.clone()) {
        Ok(m) => m,
        Err(e) => {
            eprintln!("juice-monitor: {}", e);
            process::exit(1);
        }
    };
    spawn_signal_handler(cancel);

    match monitor.run().await {
        Ok(summary) => info!(
            steady_cycles = summary.steady_cycles,
            alerts_sent = summary.health.alerts_sent,
            "goodbye"
        ),
        Err(e) => {
            error!(error = %e, "cannot load watermarks");
            process::exit(1);
        }
    }
}


/// Cancel `token` on SIGINT or SIGTERM.
fn spawn_signal_handler(token: CancellationToken) {
    tokio::spawn(async move {
        let ctrl_c = async {
            if let Err(e) = signal::ctrl_c().await {
                error!(error = %e, "cannot listen for SIGINT");
                std::future::pending::<()>().await;
            }
        };

        #[cfg(unix)]
        let term = async {
            match signal::unix::signal(signal::unix::SignalKind::terminate()) {
                Ok(mut sig) => {
                    sig.recv().await;
                }
                Err(e) => {
                    error!(error = %e, "cannot listen for SIGTERM");
                    std::future::pending::<()>().await;
                }
            }
        };
        #[cfg(not(unix))]
        let term = std::future::pending::<()>();

        tokio::select! {
            () = ctrl_c => info!("SIGINT received, shutting down"),
            () = term => info!("SIGTERM received, shutting down"),
        }
        token.cancel();
    });
}
