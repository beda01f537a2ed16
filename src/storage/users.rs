//! The users table
//!
//! Each row holds one [`User`] under the header
//! `user_name,user_type,user_phone,user_email,password`. The table is
//! append-only: registering a user adds a row and never rewrites earlier ones.

use std::{
    fs::{File, OpenOptions},
    io::{self, BufWriter, Read, Seek, SeekFrom, Write},
    path::{Path, PathBuf},
};

use serde::{Deserialize, Serialize};

use super::table::{self, StoreError};
use crate::domain::{Role, User};

/// Column names, in the order they are written.
pub const USER_COLUMNS: [&str; 5] = [
    "user_name",
    "user_type",
    "user_phone",
    "user_email",
    "password",
];

/// A handle to the users table file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserStore {
    path: PathBuf,
}

impl UserStore {
    /// Creates a handle for the table at `path`. Nothing is read yet.
    #[must_use]
    pub const fn new(path: PathBuf) -> Self {
        Self { path }
    }

    /// The location of the table.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Reads every user from the table, in registration order.
    ///
    /// A missing file is an empty table.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read, is not valid
    /// delimited text, or contains an unknown user type.
    pub fn load(&self) -> Result<Vec<User>, StoreError> {
        let Some(mut reader) = table::open(&self.path)? else {
            return Ok(Vec::new());
        };

        let users = reader
            .deserialize::<UserRecord>()
            .enumerate()
            .map(|(index, row)| {
                let record = row.map_err(|e| StoreError::csv(&self.path, e))?;
                User::try_from(record).map_err(|reason| StoreError::InvalidRecord {
                    path: self.path.clone(),
                    line: table::line_of(index),
                    reason,
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        tracing::debug!("Loaded {} users from {}", users.len(), self.path.display());
        Ok(users)
    }

    /// Appends one user to the end of the table.
    ///
    /// The header is written first if the file is missing or empty.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be opened or written to.
    pub fn append(&self, user: &User) -> Result<(), StoreError> {
        table::ensure_parent(&self.path)?;
        let mut file = OpenOptions::new()
            .create(true)
            .read(true)
            .append(true)
            .open(&self.path)
            .map_err(|e| StoreError::io(&self.path, e))?;
        let len = file
            .metadata()
            .map_err(|e| StoreError::io(&self.path, e))?
            .len();
        let is_empty = len == 0;

        // A hand-edited table may lack the final newline.
        if !is_empty {
            let terminated =
                ends_with_newline(&mut file, len).map_err(|e| StoreError::io(&self.path, e))?;
            if !terminated {
                file.write_all(b"\n")
                    .map_err(|e| StoreError::io(&self.path, e))?;
            }
        }

        let mut writer = csv::WriterBuilder::new()
            .has_headers(false)
            .from_writer(BufWriter::new(file));

        if is_empty {
            writer
                .write_record(USER_COLUMNS)
                .map_err(|e| StoreError::csv(&self.path, e))?;
        }
        writer
            .serialize(UserRecord::from(user))
            .map_err(|e| StoreError::csv(&self.path, e))?;
        writer.flush().map_err(|e| StoreError::io(&self.path, e))?;

        tracing::debug!("Appended user {} to {}", user.name, self.path.display());
        Ok(())
    }
}

fn ends_with_newline(file: &mut File, len: u64) -> io::Result<bool> {
    let mut last = [0_u8; 1];
    file.seek(SeekFrom::Start(len - 1))?;
    file.read_exact(&mut last)?;
    Ok(last[0] == b'\n')
}

/// A user as it appears in one row of the table.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
struct UserRecord {
    user_name: String,
    user_type: String,
    #[serde(default)]
    user_phone: String,
    #[serde(default)]
    user_email: String,
    password: String,
}

impl From<&User> for UserRecord {
    fn from(user: &User) -> Self {
        Self {
            user_name: user.name.clone(),
            user_type: user.role.as_str().to_string(),
            user_phone: user.phone.clone(),
            user_email: user.email.clone(),
            password: user.password.clone(),
        }
    }
}

impl TryFrom<UserRecord> for User {
    type Error = String;

    fn try_from(record: UserRecord) -> Result<Self, Self::Error> {
        let role: Role = record.user_type.parse().map_err(|e| format!("{e}"))?;
        Ok(Self::new(
            record.user_name,
            role,
            record.user_phone,
            record.user_email,
            record.password,
        ))
    }
}

#[cfg(test)]
mod tests {
    use tempfile::TempDir;

    use super::*;

    fn setup() -> (TempDir, UserStore) {
        let tmp = TempDir::new().expect("failed to create temp dir");
        let store = UserStore::new(tmp.path().join("users.csv"));
        (tmp, store)
    }

    fn user(name: &str, role: Role) -> User {
        User::new(
            name.to_string(),
            role,
            "555".to_string(),
            format!("{}@x.com", name.to_lowercase()),
            "pw1".to_string(),
        )
    }

    #[test]
    fn missing_file_is_empty_table() {
        let (_tmp, store) = setup();
        assert!(store.load().unwrap().is_empty());
    }

    #[test]
    fn append_writes_header_once() {
        let (_tmp, store) = setup();

        store.append(&user("Alice", Role::Member)).unwrap();
        store.append(&user("Bob", Role::Admin)).unwrap();

        let content = std::fs::read_to_string(store.path()).unwrap();
        assert_eq!(
            content,
            "user_name,user_type,user_phone,user_email,password\n\
             Alice,user,555,alice@x.com,pw1\n\
             Bob,admin,555,bob@x.com,pw1\n"
        );
    }

    #[test]
    fn append_then_load() {
        let (_tmp, store) = setup();
        let users = [user("Alice", Role::Member), user("Bob", Role::Admin)];
        for u in &users {
            store.append(u).unwrap();
        }

        assert_eq!(store.load().unwrap(), users);
    }

    #[test]
    fn append_keeps_existing_rows() {
        let (_tmp, store) = setup();
        std::fs::write(
            store.path(),
            "user_name,user_type,user_phone,user_email,password\nCarol,admin,1,c@x.com,secret\n",
        )
        .unwrap();

        store.append(&user("Alice", Role::Member)).unwrap();

        let names: Vec<_> = store
            .load()
            .unwrap()
            .iter()
            .map(|u| u.name().to_string())
            .collect();
        assert_eq!(names, ["Carol", "Alice"]);
    }

    #[test]
    fn directory_in_place_of_table_is_an_error() {
        let tmp = TempDir::new().unwrap();
        let store = UserStore::new(tmp.path().to_path_buf());

        assert!(matches!(store.load(), Err(StoreError::Csv { .. })));
        assert!(store.append(&user("Alice", Role::Member)).is_err());
    }

    #[test]
    fn append_after_row_without_trailing_newline() {
        let (_tmp, store) = setup();
        std::fs::write(
            store.path(),
            "user_name,user_type,user_phone,user_email,password\nCarol,admin,1,c@x.com,secret",
        )
        .unwrap();

        store.append(&user("Alice", Role::Member)).unwrap();

        let content = std::fs::read_to_string(store.path()).unwrap();
        assert!(content.ends_with("secret\nAlice,user,555,alice@x.com,pw1\n"));
        let names: Vec<_> = store
            .load()
            .unwrap()
            .iter()
            .map(|u| u.name().to_string())
            .collect();
        assert_eq!(names, ["Carol", "Alice"]);
    }

    #[test]
    fn unknown_user_type_is_rejected() {
        let (_tmp, store) = setup();
        std::fs::write(
            store.path(),
            "user_name,user_type,user_phone,user_email,password\nEve,clerk,1,e@x.com,pw\n",
        )
        .unwrap();

        assert!(matches!(
            store.load(),
            Err(StoreError::InvalidRecord { line: 2, .. })
        ));
    }
}
