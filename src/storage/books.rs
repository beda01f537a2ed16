//! The books table
//!
//! Each row holds one [`Book`]. The canonical header is
//! `book_id,book_title,book_author,availability,reserved,due_return,held_by`.
//! `due_return` is written as `YYYY-MM-DD` or left empty. `held_by` is
//! optional, so tables written without it still load.

use std::{
    fs::File,
    io::BufWriter,
    path::{Path, PathBuf},
};

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::table::{self, StoreError};
use crate::domain::{Book, BookId, BookStatus};

/// Column names, in the order they are written.
pub const BOOK_COLUMNS: [&str; 7] = [
    "book_id",
    "book_title",
    "book_author",
    "availability",
    "reserved",
    "due_return",
    "held_by",
];

/// A handle to the books table file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BookStore {
    path: PathBuf,
}

impl BookStore {
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

    /// Reads every book from the table, in stored order.
    ///
    /// A missing file is an empty table.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read, is not valid
    /// delimited text, or contains a row that is not a valid book.
    pub fn load(&self) -> Result<Vec<Book>, StoreError> {
        let Some(mut reader) = table::open(&self.path)? else {
            return Ok(Vec::new());
        };

        let books = reader
            .deserialize::<BookRecord>()
            .enumerate()
            .map(|(index, row)| {
                let record = row.map_err(|e| StoreError::csv(&self.path, e))?;
                Book::try_from(record).map_err(|reason| StoreError::InvalidRecord {
                    path: self.path.clone(),
                    line: table::line_of(index),
                    reason,
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        tracing::debug!("Loaded {} books from {}", books.len(), self.path.display());
        Ok(books)
    }

    /// Overwrites the table with a header followed by one row per book.
    ///
    /// Parent directories are created automatically if they don't exist.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be created or written to.
    pub fn save<'a, I>(&self, books: I) -> Result<(), StoreError>
    where
        I: IntoIterator<Item = &'a Book>,
    {
        table::ensure_parent(&self.path)?;
        let file = File::create(&self.path).map_err(|e| StoreError::io(&self.path, e))?;

        let mut writer = csv::WriterBuilder::new()
            .has_headers(false)
            .from_writer(BufWriter::new(file));

        writer
            .write_record(BOOK_COLUMNS)
            .map_err(|e| StoreError::csv(&self.path, e))?;

        let mut count = 0_usize;
        for book in books {
            writer
                .serialize(BookRecord::from(book))
                .map_err(|e| StoreError::csv(&self.path, e))?;
            count += 1;
        }

        writer.flush().map_err(|e| StoreError::io(&self.path, e))?;
        tracing::debug!("Saved {count} books to {}", self.path.display());
        Ok(())
    }
}

/// A book as it appears in one row of the table.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
struct BookRecord {
    book_id: String,
    book_title: String,
    #[serde(default)]
    book_author: Option<String>,
    #[serde(deserialize_with = "table::flag_from_string")]
    availability: bool,
    #[serde(deserialize_with = "table::flag_from_string")]
    reserved: bool,
    #[serde(default)]
    due_return: Option<NaiveDate>,
    #[serde(default)]
    held_by: Option<String>,
}

impl From<&Book> for BookRecord {
    fn from(book: &Book) -> Self {
        let (held_by, due_return) = match &book.status {
            BookStatus::Available => (None, None),
            BookStatus::Reserved { holder } => (holder.clone(), None),
            BookStatus::CheckedOut { holder, due } => (holder.clone(), *due),
        };

        Self {
            book_id: book.id.to_string(),
            book_title: book.title.clone(),
            book_author: book.author.clone(),
            availability: book.is_available(),
            reserved: book.is_reserved(),
            due_return,
            held_by,
        }
    }
}

impl TryFrom<BookRecord> for Book {
    type Error = String;

    fn try_from(record: BookRecord) -> Result<Self, Self::Error> {
        let id = BookId::new(record.book_id).map_err(|e| e.to_string())?;
        let holder = record.held_by.filter(|name| !name.is_empty());

        let status = match (record.availability, record.reserved, record.due_return) {
            (true, false, None) => BookStatus::Available,
            (true, true, None) => BookStatus::Reserved { holder },
            (true, _, Some(due)) => {
                return Err(format!(
                    "book {id} is marked available but is due back on {due}"
                ));
            }
            // Books that are out are loans whether or not the reserved flag
            // was written.
            (false, _, due) => BookStatus::CheckedOut { holder, due },
        };

        Ok(Self::with_status(
            id,
            record.book_title,
            record.book_author.filter(|author| !author.is_empty()),
            status,
        ))
    }
}
