use std::env;
use std::path::{Path, PathBuf};

/// Data directory configuration.
///
/// Reads from the `ADVISOR_DATA_DIR` environment variable, falling back to
/// `$XDG_DATA_HOME/advisor` (or `~/.local/share/advisor`) when unset.
///
/// Expected layout:
///
/// ```text
/// <data_dir>/
///     courses.json          catalog records
///     degrees/*.json        one degree document per program
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataConfig {
    /// Root directory holding the catalog and degree documents.
    pub data_dir: PathBuf,
}

impl DataConfig {
    /// Environment variable that overrides the data directory.
    pub const ENV_VAR: &str = "ADVISOR_DATA_DIR";

    /// File name of the catalog inside the data directory.
    pub const CATALOG_FILE: &str = "courses.json";

    /// Directory name of the degree documents inside the data directory.
    pub const DEGREES_DIR: &str = "degrees";

    /// Build a config from the environment.
    ///
    /// Priority: `ADVISOR_DATA_DIR` env var, then [`default_data_dir`].
    pub fn from_env() -> Self {
        let data_dir = env::var_os(Self::ENV_VAR)
            .map(PathBuf::from)
            .unwrap_or_else(default_data_dir);
        Self { data_dir }
    }

    /// Build a config from an explicit directory (useful for tests and CLI flags).
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
        }
    }

    /// Path to the catalog JSON file.
    pub fn catalog_path(&self) -> PathBuf {
        self.data_dir.join(Self::CATALOG_FILE)
    }

    /// Path to the directory of degree documents.
    pub fn degrees_dir(&self) -> PathBuf {
        self.data_dir.join(Self::DEGREES_DIR)
    }

    /// Path to a named degree document (`<degrees_dir>/<file_name>`).
    pub fn degree_path(&self, file_name: impl AsRef<Path>) -> PathBuf {
        self.degrees_dir().join(file_name)
    }
}

impl Default for DataConfig {
    fn default() -> Self {
        Self::from_env()
    }
}

/// Return the default data directory.
///
/// Uses XDG layout: `$XDG_DATA_HOME/advisor` or `~/.local/share/advisor`.
pub fn default_data_dir() -> PathBuf {
    if let Some(xdg) = env::var_os("XDG_DATA_HOME") {
        return PathBuf::from(xdg).join("advisor");
    }
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".local")
        .join("share")
        .join("advisor")
}
