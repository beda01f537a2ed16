//! Shared plumbing for the delimited tables.

use std::{
    fs::File,
    io,
    path::{Path, PathBuf},
};

use serde::{de, Deserialize, Deserializer};

/// Errors that can occur when reading or writing a table.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// The table file could not be opened, read or written.
    #[error("failed to access {}: {source}", path.display())]
    Io {
        /// The table file.
        path: PathBuf,
        /// The underlying failure.
        #[source]
        source: io::Error,
    },
    /// The table is not well-formed delimited text.
    #[error("failed to parse {}: {source}", path.display())]
    Csv {
        /// The table file.
        path: PathBuf,
        /// The underlying failure.
        #[source]
        source: csv::Error,
    },
    /// A row parsed, but its values are not a valid record.
    #[error("invalid record on line {line} of {}: {reason}", path.display())]
    InvalidRecord {
        /// The table file.
        path: PathBuf,
        /// The 1-based line number, counting the header.
        line: u64,
        /// What is wrong with the row.
        reason: String,
    },
}

impl StoreError {
    /// Wraps an I/O error with the table path it occurred on.
    pub fn io(path: &Path, source: io::Error) -> Self {
        Self::Io {
            path: path.to_path_buf(),
            source,
        }
    }

    /// Wraps a CSV error with the table path it occurred on.
    pub fn csv(path: &Path, source: csv::Error) -> Self {
        Self::Csv {
            path: path.to_path_buf(),
            source,
        }
    }
}

/// Opens a table for reading.
///
/// A missing file is an empty table, so `Ok(None)` is returned for it. Every
/// other failure is an error, including one on the first read: the header is
/// read here because `deserialize` drops a header error and yields no rows.
pub fn open(path: &Path) -> Result<Option<csv::Reader<File>>, StoreError> {
    match File::open(path) {
        Ok(file) => {
            let mut reader = csv::Reader::from_reader(file);
            reader.headers().map_err(|e| StoreError::csv(path, e))?;
            Ok(Some(reader))
        }
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            tracing::debug!("No table at {}, starting empty", path.display());
            Ok(None)
        }
        Err(e) => Err(StoreError::io(path, e)),
    }
}

/// Creates the parent directory of a table file if needed.
pub fn ensure_parent(path: &Path) -> Result<(), StoreError> {
    match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => {
            std::fs::create_dir_all(parent).map_err(|e| StoreError::io(path, e))
        }
        _ => Ok(()),
    }
}

/// Line number of the `index`th data row, counting the header as line 1.
pub fn line_of(index: usize) -> u64 {
    u64::try_from(index).map_or(u64::MAX, |index| index.saturating_add(2))
}

/// Deserialize a boolean cell.
///
/// Accepts `true`/`false` in any case (older tables were written as
/// `True`/`False`), as well as `yes`/`no` and `1`/`0`.
///
/// # Errors
///
/// Returns an error if the cell is none of the accepted spellings.
pub fn flag_from_string<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    let s = String::deserialize(deserializer)?;
    match s.trim().to_ascii_lowercase().as_str() {
        "true" | "yes" | "1" => Ok(true),
        "false" | "no" | "0" => Ok(false),
        _ => Err(de::Error::invalid_value(
            de::Unexpected::Str(&s),
            &"true or false",
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Deserialize)]
    struct Row {
        #[serde(deserialize_with = "flag_from_string")]
        flag: bool,
    }

    fn parse(input: &str) -> Result<Vec<bool>, csv::Error> {
        csv::Reader::from_reader(input.as_bytes())
            .deserialize::<Row>()
            .map(|row| row.map(|r| r.flag))
            .collect()
    }

    #[test]
    fn flags_accept_legacy_spellings() {
        let flags = parse("flag\nTrue\nFalse\ntrue\nNO\n1\n").unwrap();
        assert_eq!(flags, [true, false, true, false, true]);
    }

    #[test]
    fn flags_reject_other_values() {
        assert!(parse("flag\nmaybe\n").is_err());
    }

    #[test]
    fn missing_table_opens_as_none() {
        let tmp = tempfile::tempdir().unwrap();
        assert!(open(&tmp.path().join("absent.csv")).unwrap().is_none());
    }

    #[test]
    fn directory_in_place_of_table_is_an_error() {
        let tmp = tempfile::tempdir().unwrap();
        assert!(open(tmp.path()).is_err());
    }

    #[test]
    fn empty_file_opens_with_no_rows() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("empty.csv");
        std::fs::write(&path, "").unwrap();

        let mut reader = open(&path).unwrap().unwrap();
        assert_eq!(reader.records().count(), 0);
    }

    #[test]
    fn line_numbers_count_the_header() {
        assert_eq!(line_of(0), 2);
        assert_eq!(line_of(9), 11);
    }
}
