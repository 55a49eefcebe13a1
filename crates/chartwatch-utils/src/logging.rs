//! Logging and tracing utilities

use std::fs::File;
use std::path::PathBuf;
use std::sync::Mutex;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

/// Options for [`init_tracing`]
#[derive(Debug, Clone, Default)]
pub struct LogOptions {
    /// Raise the default level from `info` to `debug`
    pub verbose: bool,

    /// Also write plain-text logs to this file (truncated on start-up)
    pub file: Option<PathBuf>,
}

impl LogOptions {
    fn default_directive(&self) -> &'static str {
        if self.verbose { "debug" } else { "info" }
    }
}

/// Initialize tracing subscriber
///
/// `RUST_LOG` always wins over the default level. When a log file is set, a
/// second non-ANSI layer mirrors the console output into it.
pub fn init_tracing(options: &LogOptions) -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(options.default_directive()));

    let file_layer = match &options.file {
        Some(path) => {
            if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                std::fs::create_dir_all(parent)?;
            }
            let file = File::create(path)?;
            Some(
                tracing_subscriber::fmt::layer()
                    .with_ansi(false)
                    .with_writer(Mutex::new(file)),
            )
        }
        None => None,
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .with(file_layer)
        .try_init()?;

    Ok(())
}
