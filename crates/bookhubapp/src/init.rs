//! # Data Directory Resolution
//!
//! All persisted state lives in a single data directory, one JSON file per
//! store key plus an optional `bookhub.toml`.
//!
//! The directory is resolved in this order:
//! 1. An explicit override (the CLI's `--data` flag).
//! 2. The `BOOKHUB_DATA` environment variable, mainly used to isolate tests.
//! 3. The OS-appropriate data directory from the `directories` crate.
//!
//! [`initialize`] creates the directory if needed, loads configuration from
//! it, and builds a [`BookhubApi`] over an [`FsBackend`] rooted there.

use crate::api::BookhubApi;
use crate::config::BookhubConfig;
use crate::error::{BookhubError, Result};
use crate::store::fs_backend::FsBackend;
use directories::ProjectDirs;
use std::path::PathBuf;
use tracing::debug;

pub const DATA_ENV_VAR: &str = "BOOKHUB_DATA";

pub struct BookhubContext {
    pub api: BookhubApi<FsBackend>,
    pub config: BookhubConfig,
    pub data_dir: PathBuf,
}

/// Pick the data directory without touching the filesystem.
pub fn resolve_data_dir(data_override: Option<PathBuf>) -> Result<PathBuf> {
    if let Some(path) = data_override {
        return Ok(path);
    }
    if let Some(path) = std::env::var_os(DATA_ENV_VAR).filter(|p| !p.is_empty()) {
        return Ok(PathBuf::from(path));
    }
    ProjectDirs::from("com", "bookhub", "bookhub")
        .map(|dirs| dirs.data_dir().to_path_buf())
        .ok_or_else(|| BookhubError::Store("could not determine a data directory".to_string()))
}

/// Resolve the data directory, load configuration and rehydrate every store.
pub fn initialize(data_override: Option<PathBuf>) -> Result<BookhubContext> {
    let data_dir = resolve_data_dir(data_override)?;
    std::fs::create_dir_all(&data_dir)?;
    debug!(data_dir = %data_dir.display(), "using data directory");

    let config = BookhubConfig::load(&data_dir)?;
    let api = BookhubApi::new(FsBackend::new(data_dir.clone()), config.clone())?;

    Ok(BookhubContext {
        api,
        config,
        data_dir,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn explicit_override_wins() {
        let dir = TempDir::new().unwrap();
        let resolved = resolve_data_dir(Some(dir.path().to_path_buf())).unwrap();
        assert_eq!(resolved, dir.path());
    }

    #[test]
    fn initialize_creates_directory_and_seeds() {
        let dir = TempDir::new().unwrap();
        let data_dir = dir.path().join("nested").join("data");
        let ctx = initialize(Some(data_dir.clone())).unwrap();

        assert_eq!(ctx.data_dir, data_dir);
        assert!(data_dir.join("catalog.books.json").exists());
        assert!(!ctx.api.catalog().books().is_empty());
        assert!(ctx.api.current_user().is_none());
    }

    #[test]
    fn initialize_reads_config_file() {
        let dir = TempDir::new().unwrap();
        std::fs::write(
            dir.path().join("bookhub.toml"),
            "delivery_days = 3\nrole_policy = \"user-only\"\n",
        )
        .unwrap();
        let ctx = initialize(Some(dir.path().to_path_buf())).unwrap();
        assert_eq!(ctx.config.delivery_days, 3);
        assert_eq!(ctx.api.config().delivery_days, 3);
    }
}
