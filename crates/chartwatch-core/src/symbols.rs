//! Stock symbol list

use std::path::Path;
use tracing::{info, warn};

const DEFAULT_SYMBOL: &str = "QBTS";

/// Load the symbols to watch
///
/// Reads one symbol per line from `file`. If the file does not exist, the
/// comma-separated `fallback` list is used instead. An empty or unreadable
/// source yields the default symbol.
pub async fn load_symbols(file: &Path, fallback: &str) -> Vec<String> {
    let symbols = match tokio::fs::read_to_string(file).await {
        Ok(content) => {
            info!("Loading symbols from {}", file.display());
            parse_symbols(content.lines())
        }
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => parse_symbols(fallback.split(',')),
        Err(e) => {
            warn!("Could not read {}: {}", file.display(), e);
            Vec::new()
        }
    };

    if symbols.is_empty() {
        vec![DEFAULT_SYMBOL.to_string()]
    } else {
        symbols
    }
}

fn parse_symbols<'a>(items: impl Iterator<Item = &'a str>) -> Vec<String> {
    items
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_uppercase)
        .collect()
}
