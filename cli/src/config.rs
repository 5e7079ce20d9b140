use anyhow::{Context, Result};
use directories::ProjectDirs;
use std::path::PathBuf;
use tracing::debug;

/// Overrides the platform data directory when set.
pub const DATA_DIR_ENV: &str = "MACROLOG_DATA_DIR";

pub struct Config {
    pub db_path: PathBuf,
    pub data_dir: PathBuf,
}

impl Config {
    pub fn load() -> Result<Self> {
        let data_dir = match std::env::var_os(DATA_DIR_ENV).filter(|v| !v.is_empty()) {
            Some(dir) => PathBuf::from(dir),
            None => ProjectDirs::from("", "", "macrolog")
                .context("Could not determine home directory")?
                .data_dir()
                .to_path_buf(),
        };
        Self::in_dir(data_dir)
    }

    /// Use `data_dir` for everything, creating it if needed.
    pub fn in_dir(data_dir: PathBuf) -> Result<Self> {
        std::fs::create_dir_all(&data_dir)
            .with_context(|| format!("Failed to create data directory: {}", data_dir.display()))?;

        let db_path = data_dir.join("macrolog.db");
        debug!(path = %db_path.display(), "using database");

        Ok(Config { db_path, data_dir })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_in_dir_creates_directory() {
        let tmp = tempfile::tempdir().unwrap();
        let dir = tmp.path().join("nested").join("macrolog");
        let config = Config::in_dir(dir.clone()).unwrap();

        assert!(dir.is_dir());
        assert_eq!(config.data_dir, dir);
        assert_eq!(config.db_path, dir.join("macrolog.db"));
    }

    #[test]
    fn test_in_dir_existing_directory() {
        let tmp = tempfile::tempdir().unwrap();
        let config = Config::in_dir(tmp.path().to_path_buf()).unwrap();
        assert!(config.db_path.starts_with(tmp.path()));
    }
}
