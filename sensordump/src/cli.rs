use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use sensordump_core::{CaptureConfig, NamingPolicy};
use sensordump_io::{DecodePolicy, LineSource, SerialConfig, StopFlag, open_capture_file};

/// Voice-control board capture tools
///
/// Reads the text the board prints over its serial link (or a captured log)
/// and writes CSV files for offline analysis.
#[derive(Debug, Parser)]
#[command(name = "sensordump", version)]
pub struct Cli {
    /// TOML settings file
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Directory for per-sensor CSV files (overrides the config file)
    #[arg(long, global = true)]
    pub output_dir: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Split a QSPI data dump into one CSV per sensor section
    Dump {
        #[command(flatten)]
        input: InputArgs,

        /// What to do when a sensor section repeats within one dump
        #[arg(long, value_enum)]
        naming: Option<NamingArg>,
    },

    /// Copy every non-empty line into a one-column CSV until Ctrl+C
    Log {
        #[command(flatten)]
        input: InputArgs,

        /// Output CSV (defaults to the config's log_file)
        #[arg(long, short)]
        output: Option<PathBuf>,

        /// Replace invalid UTF-8 instead of skipping the line
        #[arg(long)]
        lossy: bool,
    },

    /// Pull audioBufferLeft/Right samples out of a debugger dump
    Extract {
        /// Text dump of the buffer variables
        #[arg(long, short)]
        input: PathBuf,

        /// Output CSV (defaults to the config's log_file)
        #[arg(long, short)]
        output: Option<PathBuf>,
    },
}

/// Where lines come from: a live serial port or a captured file.
#[derive(Debug, Clone, Args)]
pub struct InputArgs {
    /// Serial port (e.g., /dev/tty.usbmodem1103 for macOS or COM3 for Windows)
    #[arg(long, short, required_unless_present = "file", requires = "baudrate")]
    pub port: Option<String>,

    /// Baud rate (e.g., 115200)
    #[arg(long, short = 'b')]
    pub baudrate: Option<u32>,

    /// Replay a captured log instead of reading a port
    #[arg(long, short, conflicts_with = "port")]
    pub file: Option<PathBuf>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum NamingArg {
    Numbered,
    Overwrite,
    Append,
}

impl From<NamingArg> for NamingPolicy {
    fn from(arg: NamingArg) -> Self {
        match arg {
            NamingArg::Numbered => NamingPolicy::Numbered,
            NamingArg::Overwrite => NamingPolicy::Overwrite,
            NamingArg::Append => NamingPolicy::Append,
        }
    }
}

impl Cli {
    /// Config file (if any) with command-line overrides applied.
    pub fn resolve_config(&self) -> Result<CaptureConfig> {
        let mut config = match &self.config {
            Some(path) => CaptureConfig::load_from_file(path)?,
            None => CaptureConfig::default(),
        };
        if let Some(dir) = &self.output_dir {
            config.output_dir = dir.clone();
        }
        if let Commands::Dump {
            naming: Some(naming),
            ..
        } = &self.command
        {
            config.naming = (*naming).into();
        }
        Ok(config)
    }
}

impl InputArgs {
    pub fn open(
        &self,
        config: &CaptureConfig,
        decode: DecodePolicy,
        stop: StopFlag,
    ) -> Result<Box<dyn LineSource>> {
        if let Some(path) = &self.file {
            tracing::info!(file = %path.display(), "replaying capture");
            return Ok(Box::new(open_capture_file(path, decode, stop)?));
        }

        let port = self.port.as_deref().context("either --port or --file is required")?;
        let baud = self.baudrate.context("--baudrate is required with --port")?;
        let serial = SerialConfig::new(port, baud)
            .with_read_timeout(config.read_timeout())
            .with_decode(decode);
        Ok(Box::new(serial.open(stop)?))
    }
}
