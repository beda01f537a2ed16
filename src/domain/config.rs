use std::{
    io,
    path::{Path, PathBuf},
};

use chrono::Days;
use serde::{Deserialize, Serialize};

/// Where a library keeps its tables, and its lending rules.
///
/// Read from `library.toml` in the library root. Every field has a default,
/// so a file holding only the version tag is a complete configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Versions", into = "Versions")]
pub struct Config {
    /// The books table, relative to the library root.
    pub books_file: PathBuf,

    /// The users table, relative to the library root.
    pub users_file: PathBuf,

    loan_period_days: u32,
    renewal_period_days: u32,
}

/// Reading or writing `library.toml` failed.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// The file could not be read or written.
    #[error("cannot access {}: {source}", path.display())]
    Io {
        /// The configuration file.
        path: PathBuf,
        /// The underlying failure.
        source: io::Error,
    },
    /// The file is not a valid configuration.
    #[error("malformed configuration in {}: {source}", path.display())]
    Parse {
        /// The configuration file.
        path: PathBuf,
        /// What the TOML parser objected to.
        source: toml::de::Error,
    },
    /// The configuration could not be rendered as TOML.
    #[error("cannot render configuration: {0}")]
    Render(#[from] toml::ser::Error),
}

const DEFAULT_PERIOD_DAYS: u32 = 14;

impl Default for Config {
    fn default() -> Self {
        Self {
            books_file: PathBuf::from("books.csv"),
            users_file: PathBuf::from("users.csv"),
            loan_period_days: DEFAULT_PERIOD_DAYS,
            renewal_period_days: DEFAULT_PERIOD_DAYS,
        }
    }
}

impl Config {
    /// The name of the configuration file inside a library root.
    pub const FILE_NAME: &'static str = "library.toml";

    /// Reads the configuration at `path`.
    ///
    /// # Errors
    ///
    /// Fails if the file cannot be read or does not parse.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        toml::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Writes the configuration to `path`, replacing any existing file.
    ///
    /// # Errors
    ///
    /// Fails if the file cannot be written.
    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })
    }

    /// The length of a new loan.
    #[must_use]
    pub fn loan_period(&self) -> Days {
        Days::new(u64::from(self.loan_period_days))
    }

    /// How far a renewal pushes the due date.
    #[must_use]
    pub fn renewal_period(&self) -> Days {
        Days::new(u64::from(self.renewal_period_days))
    }

    /// Sets the loan period, in days.
    pub const fn set_loan_period_days(&mut self, days: u32) {
        self.loan_period_days = days;
    }

    /// Sets the renewal period, in days.
    pub const fn set_renewal_period_days(&mut self, days: u32) {
        self.renewal_period_days = days;
    }
}

/// On-disk layouts of `library.toml`, keyed by `_version`.
#[derive(Debug, Serialize, Deserialize)]
#[serde(tag = "_version")]
enum Versions {
    #[serde(rename = "1")]
    V1(LayoutV1),
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(default)]
struct LayoutV1 {
    books_file: PathBuf,
    users_file: PathBuf,
    loan_period_days: u32,
    renewal_period_days: u32,
}

impl Default for LayoutV1 {
    fn default() -> Self {
        Config::default().into_layout()
    }
}

impl Config {
    fn into_layout(self) -> LayoutV1 {
        LayoutV1 {
            books_file: self.books_file,
            users_file: self.users_file,
            loan_period_days: self.loan_period_days,
            renewal_period_days: self.renewal_period_days,
        }
    }
}

impl From<Versions> for Config {
    fn from(versions: Versions) -> Self {
        let Versions::V1(layout) = versions;
        Self {
            books_file: layout.books_file,
            users_file: layout.users_file,
            loan_period_days: layout.loan_period_days,
            renewal_period_days: layout.renewal_period_days,
        }
    }
}

impl From<Config> for Versions {
    fn from(config: Config) -> Self {
        Self::V1(config.into_layout())
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    #[test]
    fn load_reads_valid_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(
            b"_version = \"1\"\nbooks_file = \"data/books.csv\"\nloan_period_days = 21\nrenewal_period_days = 7\n",
        )
        .unwrap();

        let config = Config::load(file.path()).unwrap();

        assert_eq!(config.books_file, PathBuf::from("data/books.csv"));
        assert_eq!(config.users_file, PathBuf::from("users.csv"));
        assert_eq!(config.loan_period(), Days::new(21));
        assert_eq!(config.renewal_period(), Days::new(7));
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let tmp = tempfile::tempdir().unwrap();
        let missing = tmp.path().join("missing.toml");

        assert!(matches!(
            Config::load(&missing),
            Err(ConfigError::Io { .. })
        ));
    }

    #[test]
    fn wrong_field_type_is_a_parse_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(b"_version = \"1\"\nloan_period_days = \"two weeks\"\n")
            .unwrap();

        assert!(matches!(
            Config::load(file.path()),
            Err(ConfigError::Parse { .. })
        ));
    }

    #[test]
    fn version_tag_alone_gives_defaults() {
        let config: Config = toml::from_str(r#"_version = "1""#).unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.loan_period(), Days::new(14));
    }

    #[test]
    fn unknown_version_is_rejected() {
        assert!(toml::from_str::<Config>(r#"_version = "7""#).is_err());
    }

    #[test]
    fn save_then_load() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join(Config::FILE_NAME);
        let mut config = Config::default();
        config.set_loan_period_days(28);

        config.save(&path).unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        assert!(content.contains("_version = \"1\""));
        assert_eq!(Config::load(&path).unwrap(), config);
    }
}
