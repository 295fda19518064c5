//! Command-line reader for embedded APK channel metadata

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use apk_channel::ChannelError;
use clap::Parser;
use tracing::{Level, debug};

#[derive(Parser)]
#[command(
    name = "apk-channel",
    about = "Read the distribution channel embedded in a packed APK",
    version,
    long_about = "Reads the distribution-channel metadata block that Packer Ng V2 \
style tooling appends to an APK, and prints the channel value on stdout. \
Exits non-zero when the file carries no channel."
)]
struct Cli {
    /// Set the logging level (diagnostics go to stderr)
    #[arg(short, long, value_enum, default_value = "warn")]
    log_level: LogLevel,

    /// Print the raw payload instead of the parsed channel value
    #[arg(long)]
    payload: bool,

    /// Packed APK file to read
    apk: PathBuf,
}

#[derive(clap::ValueEnum, Clone, Copy, Debug)]
enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

impl From<LogLevel> for Level {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Trace => Level::TRACE,
            LogLevel::Debug => Level::DEBUG,
            LogLevel::Info => Level::INFO,
            LogLevel::Warn => Level::WARN,
            LogLevel::Error => Level::ERROR,
        }
    }
}

const EXIT_USAGE: u8 = 2;

fn main() -> ExitCode {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_max_level(Level::from(cli.log_level))
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    if !has_apk_extension(&cli.apk) {
        eprintln!("error: not an APK file: {}", cli.apk.display());
        return ExitCode::from(EXIT_USAGE);
    }

    let result = if cli.payload {
        apk_channel::read_payload(&cli.apk).map(|bytes| {
            debug!("raw payload of {} bytes", bytes.len());
            String::from_utf8_lossy(&bytes).into_owned()
        })
    } else {
        apk_channel::read_channel(&cli.apk)
    };

    match result {
        Ok(value) => {
            println!("{value}");
            ExitCode::SUCCESS
        }
        Err(err) if err.is_not_found() => {
            eprintln!("no channel found in {}", cli.apk.display());
            ExitCode::FAILURE
        }
        Err(err) => {
            report_io_error(&err);
            ExitCode::FAILURE
        }
    }
}

fn has_apk_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("apk"))
}

fn report_io_error(err: &ChannelError) {
    eprintln!("error: {err}");
    // surface the underlying I/O cause when there is one
    if let Some(source) = std::error::Error::source(err) {
        eprintln!("caused by: {source}");
    }
}
