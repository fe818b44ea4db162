// SPDX-License-Identifier: LGPL-3.0-or-later

//! `wavfilt` command-line front end.
//!
//! Every subcommand takes a WAV file, stores it in the media directory the
//! way an upload would, runs one service operation and prints the JSON
//! document the dashboard would receive. Failures print `{"error": ...}`
//! and exit non-zero.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use log::debug;
use serde::Serialize;
use wavfilt_dsp_units::misc::windows::WindowType;
use wavfilt_service::{FilterRequest, FilterService, ServiceConfig, ServiceError, UploadMetadata};

#[derive(Debug, Parser)]
#[command(name = "wavfilt", version, about = "Butterworth filter design and analysis for WAV files")]
struct Cli {
    /// Config file (overrides WAVFILT_CONFIG and ./wavfilt.toml).
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Media directory for stored originals and variants.
    #[arg(long, global = true)]
    media_root: Option<PathBuf>,

    /// Keep files in memory only; nothing is written to disk.
    #[arg(long, global = true)]
    memory: bool,

    /// Pretty-print JSON output.
    #[arg(long, global = true)]
    pretty: bool,

    /// More log output (-v debug, -vv trace).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Upload a file and print its metadata.
    Metadata { file: PathBuf },
    /// Apply a filter and store the filtered variant.
    Apply {
        file: PathBuf,
        #[command(flatten)]
        filter: FilterArgs,
    },
    /// Print frequency, impulse and time-domain plot data for a filter.
    Plot {
        file: PathBuf,
        #[command(flatten)]
        filter: FilterArgs,
    },
    /// Print the phase response of a filter designed for a file.
    Phase {
        file: PathBuf,
        #[command(flatten)]
        filter: FilterArgs,
    },
    /// Print the peak-normalized waveform of one channel.
    Waveform {
        file: PathBuf,
        #[arg(long, default_value_t = 0)]
        channel: usize,
    },
    /// Print the magnitude spectrum of one channel.
    Spectrum {
        file: PathBuf,
        #[arg(long, default_value_t = 0)]
        channel: usize,
        #[arg(long, value_enum, default_value_t = WindowArg::Hann)]
        window: WindowArg,
    },
    /// Copy a stored file out of the media directory.
    Fetch {
        name: String,
        /// Output path (stdout when absent).
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

#[derive(Debug, Args)]
struct FilterArgs {
    /// low, high, band or bandstop.
    #[arg(long)]
    filter_type: String,
    /// Cutoff in Hz, or `low,high` for band filters.
    #[arg(long)]
    cutoff: String,
    /// Filter order (default 2).
    #[arg(long)]
    order: Option<String>,
}

impl FilterArgs {
    fn request(&self) -> FilterRequest {
        FilterRequest::new(&self.filter_type, &self.cutoff, self.order.as_deref())
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum WindowArg {
    Hann,
    Hamming,
    Blackman,
    Rectangular,
}

impl From<WindowArg> for WindowType {
    fn from(w: WindowArg) -> Self {
        match w {
            WindowArg::Hann => WindowType::Hann,
            WindowArg::Hamming => WindowType::Hamming,
            WindowArg::Blackman => WindowType::Blackman,
            WindowArg::Rectangular => WindowType::Rectangular,
        }
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match run(&cli) {
        Ok(code) => code,
        Err(e) => {
            eprintln!("wavfilt: {e:#}");
            ExitCode::FAILURE
        }
    }
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();
}

fn run(cli: &Cli) -> Result<ExitCode> {
    let mut config = match &cli.config {
        Some(path) => ServiceConfig::load_from(path)?,
        None => ServiceConfig::load()?,
    };
    if let Some(root) = &cli.media_root {
        config.media_root = root.clone();
    }
    debug!("config: {config:?}");

    let service = if cli.memory {
        FilterService::in_memory(config)
    } else {
        let root = config.media_root.clone();
        FilterService::open(config)
            .with_context(|| format!("cannot open media directory {}", root.display()))?
    };

    let outcome = match &cli.command {
        Command::Metadata { file } => upload(&service, file).map(|m| to_json(&m, cli.pretty)),
        Command::Apply { file, filter } => upload(&service, file)
            .and_then(|m| Ok(service.apply(&m.filename, &filter.request())?))
            .map(|r| to_json(&r, cli.pretty)),
        Command::Plot { file, filter } => upload(&service, file)
            .and_then(|m| Ok(service.plot(&m.filename, &filter.request())?))
            .map(|r| to_json(&r, cli.pretty)),
        Command::Phase { file, filter } => upload(&service, file)
            .and_then(|m| Ok(service.phase(&m.filename, &filter.request())?))
            .map(|s| to_json(&s, cli.pretty)),
        Command::Waveform { file, channel } => upload(&service, file)
            .and_then(|m| Ok(service.waveform(&m.filename, *channel)?))
            .map(|s| to_json(&s, cli.pretty)),
        Command::Spectrum {
            file,
            channel,
            window,
        } => upload(&service, file)
            .and_then(|m| Ok(service.spectrum(&m.filename, *channel, (*window).into())?))
            .map(|s| to_json(&s, cli.pretty)),
        Command::Fetch { name, output } => {
            return fetch(&service, name, output.as_deref(), cli.pretty);
        }
    };

    match outcome {
        Ok(json) => {
            println!("{}", json?);
            Ok(ExitCode::SUCCESS)
        }
        Err(UploadError::Read(e)) => Err(e),
        Err(UploadError::Service(e)) => report(&e, cli.pretty),
    }
}

enum UploadError {
    Read(anyhow::Error),
    Service(ServiceError),
}

impl From<ServiceError> for UploadError {
    fn from(e: ServiceError) -> Self {
        Self::Service(e)
    }
}

fn upload(
    service: &FilterService,
    path: &Path,
) -> std::result::Result<UploadMetadata, UploadError> {
    let bytes = fs::read(path)
        .with_context(|| format!("cannot read {}", path.display()))
        .map_err(UploadError::Read)?;
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    Ok(service.upload(&name, &bytes)?)
}

fn fetch(service: &FilterService, name: &str, output: Option<&Path>, pretty: bool) -> Result<ExitCode> {
    let bytes = match service.fetch(name) {
        Ok(bytes) => bytes,
        Err(e) => return report(&e, pretty),
    };
    match output {
        Some(path) => {
            fs::write(path, &*bytes).with_context(|| format!("cannot write {}", path.display()))?
        }
        None => std::io::stdout()
            .lock()
            .write_all(&bytes)
            .context("cannot write to stdout")?,
    }
    Ok(ExitCode::SUCCESS)
}

/// Print the client-facing error body; the exit code carries the status
/// class (2 for 4xx, 1 otherwise).
fn report(e: &ServiceError, pretty: bool) -> Result<ExitCode> {
    println!("{}", to_json(&e.body(), pretty)?);
    Ok(if e.status() < 500 {
        ExitCode::from(2)
    } else {
        ExitCode::FAILURE
    })
}

fn to_json<T: Serialize>(value: &T, pretty: bool) -> Result<String> {
    let s = if pretty {
        serde_json::to_string_pretty(value)
    } else {
        serde_json::to_string(value)
    };
    s.context("cannot serialize response")
}
