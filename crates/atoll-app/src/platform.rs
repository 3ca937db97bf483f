//! Platform directory resolution.
//!
//! Config and log locations follow OS conventions (XDG on Linux, Known
//! Folders on Windows, Library on macOS). Everything platform-specific stays
//! behind [`PlatformDirs`].

use std::io;
use std::path::{Path, PathBuf};

use atoll_config::CONFIG_FILE;

/// Failure to locate or create the generator's directories.
#[derive(Debug, thiserror::Error)]
pub enum PlatformError {
    #[error("no per-user config directory on this system")]
    NoConfigDir,
    #[error("cannot create generator directory: {0}")]
    Io(#[from] io::Error),
}

/// Where `atoll` keeps its config file and debug logs.
#[derive(Debug, Clone)]
pub struct PlatformDirs {
    pub config_dir: PathBuf,
    pub log_dir: PathBuf,
}

const APP_NAME: &str = "atoll";

impl PlatformDirs {
    /// `<os config dir>/atoll`. Nothing is created on disk.
    pub fn resolve() -> Result<Self, PlatformError> {
        dirs::config_dir()
            .map(|base| Self::resolve_with_root(&base))
            .ok_or(PlatformError::NoConfigDir)
    }

    /// `<root>/atoll`, for tests and sandboxed runs.
    pub fn resolve_with_root(root: &Path) -> Self {
        Self::from_config_dir(root.join(APP_NAME))
    }

    /// Use `config_dir` as given (the `--config` flag), logs beneath it.
    pub fn from_config_dir(config_dir: PathBuf) -> Self {
        Self {
            log_dir: config_dir.join("logs"),
            config_dir,
        }
    }

    /// Full path of `config.ron`.
    pub fn config_file(&self) -> PathBuf {
        self.config_dir.join(CONFIG_FILE)
    }

    pub fn create_dirs(&self) -> Result<(), PlatformError> {
        for dir in [&self.config_dir, &self.log_dir] {
            std::fs::create_dir_all(dir)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_with_root_layout() {
        let dirs = PlatformDirs::resolve_with_root(Path::new("base"));
        assert_eq!(dirs.config_dir, Path::new("base").join("atoll"));
        assert_eq!(dirs.log_dir, Path::new("base").join("atoll").join("logs"));
    }

    #[test]
    fn test_explicit_config_dir() {
        let dirs = PlatformDirs::from_config_dir(PathBuf::from("cfg"));
        assert_eq!(dirs.config_dir, PathBuf::from("cfg"));
        assert_eq!(dirs.log_dir, Path::new("cfg").join("logs"));
    }

    #[test]
    fn test_create_dirs_then_load_config() {
        let tmp = tempfile::tempdir().unwrap();
        let dirs = PlatformDirs::resolve_with_root(tmp.path());
        dirs.create_dirs().unwrap();
        assert!(dirs.log_dir.is_dir());

        atoll_config::Config::load_or_create(&dirs.config_dir).unwrap();
        assert!(dirs.config_file().is_file());
    }
}
