use anyhow::{Context, Result};
use clap::Parser;
use sensordump::cli::Cli;
use sensordump::{commands, util};
use sensordump_io::StopFlag;

#[tokio::main]
async fn main() -> Result<()> {
    util::init_tracing();
    util::install_panic_hook();

    let cli = Cli::parse();
    let config = cli.resolve_config()?;

    // The capture loop is plain blocking IO; Ctrl+C only raises the flag and
    // the reader reports Stopped on its next read.
    let stop = StopFlag::new();
    let worker_stop = stop.clone();
    let mut job =
        tokio::task::spawn_blocking(move || commands::run(cli.command, config, worker_stop));

    tokio::select! {
        res = &mut job => return res.context("capture thread panicked")?,
        _ = tokio::signal::ctrl_c() => {
            tracing::info!("Ctrl+C received, finishing current line…");
            stop.raise();
        }
    }

    job.await.context("capture thread panicked")?
}
