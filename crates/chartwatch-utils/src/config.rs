//! Configuration helpers shared by the binaries and the core crate

use std::path::Path;
use tracing::debug;

/// Load variables from a `.env` file into the process environment
///
/// With an explicit path the file must exist. Without one, `.env` is looked
/// up from the current directory upwards and silently skipped if absent.
/// Variables already set in the environment are never overwritten.
pub fn load_env_file(path: Option<&Path>) -> anyhow::Result<()> {
    match path {
        Some(path) => {
            dotenvy::from_path(path)?;
            debug!("Loaded environment from {}", path.display());
        }
        None => {
            if let Ok(found) = dotenvy::dotenv() {
                debug!("Loaded environment from {}", found.display());
            }
        }
    }
    Ok(())
}

/// Parse a boolean flag the way `.env` files usually spell them
///
/// Accepts `true`, `1`, `yes`, `on` (case-insensitive) as true; anything
/// else is false.
pub fn parse_bool(value: &str) -> bool {
    matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "true" | "1" | "yes" | "on"
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_parse_bool() {
        assert!(parse_bool("true"));
        assert!(parse_bool(" TRUE "));
        assert!(parse_bool("1"));
        assert!(parse_bool("Yes"));
        assert!(!parse_bool("false"));
        assert!(!parse_bool("0"));
        assert!(!parse_bool(""));
        assert!(!parse_bool("enabled"));
    }

    #[test]
    fn test_explicit_missing_file_is_error() {
        assert!(load_env_file(Some(Path::new("/no/such/.env"))).is_err());
    }

    #[test]
    fn test_explicit_file_loads() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "CHARTWATCH_UTILS_TEST_KEY=from-file").unwrap();

        load_env_file(Some(file.path())).unwrap();
        assert_eq!(
            std::env::var("CHARTWATCH_UTILS_TEST_KEY").as_deref(),
            Ok("from-file")
        );
    }
}
