use std::fs::{self, File};
use std::io::BufReader;

use anyhow::{Context, Result};
use sensordump_core::buffer_extract::AudioBuffers;
use sensordump_core::line_logger::LineLogger;
use sensordump_core::{CaptureConfig, CaptureContext, DumpDemux, DumpSummary, Termination};
use sensordump_io::{DecodePolicy, StopFlag};

use crate::cli::{Commands, InputArgs};

/// Run one subcommand to completion on the current (blocking) thread.
pub fn run(command: Commands, config: CaptureConfig, stop: StopFlag) -> Result<()> {
    match command {
        Commands::Dump { input, .. } => dump(&input, &config, stop).map(|_| ()),
        Commands::Log {
            input,
            output,
            lossy,
        } => {
            let output = output.unwrap_or_else(|| config.log_file.clone());
            let decode = if lossy {
                DecodePolicy::Lossy
            } else {
                DecodePolicy::Strict
            };
            log_lines(&input, &config, &output, decode, stop)
        }
        Commands::Extract { input, output } => {
            let output = output.unwrap_or_else(|| config.log_file.clone());
            extract(&input, &output)
        }
    }
}

pub fn dump(input: &InputArgs, config: &CaptureConfig, stop: StopFlag) -> Result<DumpSummary> {
    config.log_config();
    let source = input.open(config, DecodePolicy::Strict, stop)?;
    let mut ctx = CaptureContext::new(source, config.sink_factory());

    tracing::info!("Reading data dump...");
    let summary = DumpDemux::default()
        .run(&mut ctx)
        .context("data dump aborted")?;

    for section in &summary.sections {
        tracing::info!(
            sensor = section.sensor_id,
            records = section.records,
            file = %section.location.display(),
            "section written"
        );
    }
    match summary.termination {
        Termination::Completed => {}
        Termination::SourceClosed if !summary.session_started => {
            tracing::warn!("input ended before the data dump started")
        }
        other => tracing::warn!(termination = ?other, "data dump incomplete"),
    }
    Ok(summary)
}

fn log_lines(
    input: &InputArgs,
    config: &CaptureConfig,
    output: &std::path::Path,
    decode: DecodePolicy,
    stop: StopFlag,
) -> Result<()> {
    let mut source = input.open(config, decode, stop)?;
    let file = File::create(output).with_context(|| format!("Failed to create {}", output.display()))?;

    let mut logger = LineLogger::new(file);
    let summary = logger.run(&mut source)?;
    logger.into_inner()?;

    tracing::info!(
        rows = summary.rows,
        skipped = summary.skipped,
        file = %output.display(),
        "line log closed"
    );
    Ok(())
}

pub fn extract(input: &std::path::Path, output: &std::path::Path) -> Result<()> {
    let file = File::open(input).with_context(|| format!("Failed to open {}", input.display()))?;
    let buffers = AudioBuffers::extract(BufReader::new(file))?;

    if let Some(parent) = output.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    let out = File::create(output).with_context(|| format!("Failed to create {}", output.display()))?;
    let rows = buffers.write_csv(out)?;

    if buffers.left.len() != buffers.right.len() {
        tracing::warn!(
            left = buffers.left.len(),
            right = buffers.right.len(),
            "channel lengths differ, truncated to {rows}"
        );
    }
    tracing::info!(rows, "Data successfully written to {}", output.display());
    Ok(())
}
