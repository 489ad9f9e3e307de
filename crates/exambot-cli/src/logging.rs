//! Tracing subscriber setup.
//!
//! Console output goes to stderr so `invoke` can keep stdout for its JSON
//! response. Setting `EXAMBOT_LOG_DIR` adds a daily rolling file.

use std::path::PathBuf;

use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, fmt};

const DEFAULT_FILTER: &str = "exambot=info";

pub fn init() {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

    let console_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false);

    let file_layer = log_dir().and_then(|dir| {
        match RollingFileAppender::builder()
            .rotation(Rotation::DAILY)
            .filename_prefix("exambot")
            .filename_suffix("log")
            .build(&dir)
        {
            Ok(appender) => Some(fmt::layer().with_writer(appender).with_ansi(false)),
            Err(err) => {
                eprintln!("Warning: file logging disabled ({}): {err}", dir.display());
                None
            }
        }
    });

    let _ = tracing_subscriber::registry()
        .with(env_filter)
        .with(console_layer)
        .with(file_layer)
        .try_init();
}

fn log_dir() -> Option<PathBuf> {
    std::env::var_os("EXAMBOT_LOG_DIR")
        .filter(|dir| !dir.is_empty())
        .map(PathBuf::from)
}
