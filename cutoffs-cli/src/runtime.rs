//! Process-level setup shared by both binaries

use anyhow::{anyhow, Result};
use chrono::Datelike;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Install the global tracing subscriber.
///
/// `RUST_LOG` wins when set; otherwise `info`, or `debug` with `--verbose`.
pub fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    // A second init (tests, embedding) keeps the first subscriber
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .try_init();
}

/// Result cache directory (~/.cache/cutoffs on all Unix platforms)
pub fn default_cache_dir() -> Result<PathBuf> {
    #[cfg(windows)]
    {
        let base = dirs::cache_dir()
            .ok_or_else(|| anyhow!("Could not determine local cache directory"))?;
        Ok(base.join("cutoffs"))
    }

    #[cfg(not(windows))]
    {
        // ~/.cache/cutoffs on macOS too, rather than ~/Library/Caches
        let home = dirs::home_dir()
            .ok_or_else(|| anyhow!("Could not determine home directory"))?;
        Ok(home.join(".cache").join("cutoffs"))
    }
}

/// The admission cycle a report with no explicit year belongs to
pub fn current_admission_year() -> i32 {
    chrono::Local::now().year()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cache_dir_is_namespaced() {
        if let Ok(dir) = default_cache_dir() {
            assert!(dir.ends_with("cutoffs"));
        }
    }

    #[test]
    fn test_admission_year_is_plausible() {
        assert!(current_admission_year() >= 2024);
    }

    #[test]
    fn test_init_tracing_twice_is_harmless() {
        init_tracing(false);
        init_tracing(true);
    }
}
