use std::net::SocketAddr;
use std::path::PathBuf;
use std::process;
use std::sync::Arc;

use anyhow::Context;
use chrono::NaiveDate;
use clap::Parser;
use tokio::net::TcpListener;
use tokio::signal;
#[macro_use]
extern crate log;

mod api;
mod features;
use api::AppState;
use features::{Clock, FixedClock, Store, SystemClock};

/// Read-only beneficiary, account and transaction queries over CSV data
#[derive(Parser, Debug)]
#[clap(author, version, about)]
struct Args {
    /// Directory holding beneficiaries.csv, accounts.csv and transactions.csv
    #[clap(long, env = "LEDGER_DATA_DIR", default_value = "data")]
    data_dir: PathBuf,

    /// Listening address
    #[clap(short, long, env = "LEDGER_ADDR", default_value = "127.0.0.1:8080")]
    addr: SocketAddr,

    /// Pin "today" (YYYY-MM-DD) instead of reading the wall clock
    #[clap(long, env = "LEDGER_AS_OF")]
    as_of: Option<NaiveDate>,
}

#[tokio::main]
async fn main() {
    env_logger::init();
    if let Err(e) = run(Args::parse()).await {
        error!("{e:#}");
        process::exit(1);
    }
}

async fn run(args: Args) -> anyhow::Result<()> {
    let store = Store::load(&args.data_dir)
        .with_context(|| format!("Unable to load data from {}", args.data_dir.display()))?;

    let clock: Arc<dyn Clock> = match args.as_of {
        Some(date) => {
            info!("Reference date pinned to {date}");
            Arc::new(FixedClock(date))
        }
        None => Arc::new(SystemClock),
    };

    let app = api::router(AppState {
        store: Arc::new(store),
        clock,
    });

    let listener = TcpListener::bind(args.addr)
        .await
        .with_context(|| format!("Unable to bind {}", args.addr))?;
    info!("Listening on {}", args.addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            warn!("Unable to listen for Ctrl+C: {e}");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                warn!("Unable to listen for SIGTERM: {e}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Shutdown signal received");
}
