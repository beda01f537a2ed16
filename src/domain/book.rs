use std::{fmt, ops::Deref, str::FromStr};

use chrono::NaiveDate;
use non_empty_string::NonEmptyString;

/// The identifier of a book in the catalog (an ISBN or a shelf code).
///
/// Identifiers are compared exactly. Surrounding whitespace is stripped on
/// construction, and an identifier must contain at least one other character.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct BookId(NonEmptyString);

impl BookId {
    /// Creates a new `BookId` from a string.
    ///
    /// # Errors
    ///
    /// Returns `InvalidBookIdError` if the string is empty or only whitespace.
    pub fn new(s: String) -> Result<Self, InvalidBookIdError> {
        let trimmed = s.trim();
        let id = if trimmed.len() == s.len() {
            s
        } else {
            trimmed.to_string()
        };
        NonEmptyString::new(id)
            .map(Self)
            .map_err(|_| InvalidBookIdError)
    }

    /// Returns the string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl TryFrom<String> for BookId {
    type Error = InvalidBookIdError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl TryFrom<&str> for BookId {
    type Error = InvalidBookIdError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        Self::new(value.to_string())
    }
}

impl FromStr for BookId {
    type Err = InvalidBookIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s.to_string())
    }
}

impl Deref for BookId {
    type Target = str;

    fn deref(&self) -> &Self::Target {
        self.0.as_str()
    }
}

impl fmt::Display for BookId {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Error returned when a book id is blank.
#[derive(Debug, Clone, Copy, thiserror::Error, PartialEq, Eq)]
#[error("book id must not be empty")]
pub struct InvalidBookIdError;

/// Where a book currently is in the circulation cycle.
///
/// Books move `Available → Reserved → CheckedOut → Available`, or straight
/// from `Available` to `CheckedOut` for a walk-up loan.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum BookStatus {
    /// On the shelf and free to reserve or borrow.
    #[default]
    Available,
    /// On hold for one user, not yet picked up.
    Reserved {
        /// The user the hold was placed for, if recorded.
        holder: Option<String>,
    },
    /// Out on loan.
    CheckedOut {
        /// The borrowing user, if recorded.
        holder: Option<String>,
        /// When the loan is due back.
        ///
        /// Older tables can carry loans without a due date; those can be
        /// returned but never renewed.
        due: Option<NaiveDate>,
    },
}

impl BookStatus {
    /// The user holding the reservation or loan, if any.
    #[must_use]
    pub fn holder(&self) -> Option<&str> {
        match self {
            Self::Available => None,
            Self::Reserved { holder } | Self::CheckedOut { holder, .. } => holder.as_deref(),
        }
    }
}

impl fmt::Display for BookStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Available => write!(f, "available"),
            Self::Reserved { .. } => write!(f, "reserved"),
            Self::CheckedOut { due: Some(due), .. } => write!(f, "checked out (due {due})"),
            Self::CheckedOut { due: None, .. } => write!(f, "checked out"),
        }
    }
}

/// A book held by the library.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Book {
    pub(crate) id: BookId,
    pub(crate) title: String,
    pub(crate) author: Option<String>,
    pub(crate) status: BookStatus,
}

impl Book {
    /// Construct a new, available [`Book`].
    #[must_use]
    pub fn new(id: BookId, title: String, author: Option<String>) -> Self {
        Self::with_status(id, title, author, BookStatus::Available)
    }

    /// Construct a [`Book`] in the given circulation state.
    ///
    /// An empty author is stored as no author, since the table cannot tell
    /// the two apart.
    #[must_use]
    pub fn with_status(
        id: BookId,
        title: String,
        author: Option<String>,
        status: BookStatus,
    ) -> Self {
        Self {
            id,
            title,
            author: author.filter(|author| !author.is_empty()),
            status,
        }
    }

    /// The identifier of this book.
    #[must_use]
    pub const fn id(&self) -> &BookId {
        &self.id
    }

    /// The title of this book.
    #[must_use]
    pub fn title(&self) -> &str {
        &self.title
    }

    /// The author of this book, if known.
    #[must_use]
    pub fn author(&self) -> Option<&str> {
        self.author.as_deref()
    }

    /// Where the book is in the circulation cycle.
    #[must_use]
    pub const fn status(&self) -> &BookStatus {
        &self.status
    }

    /// Whether the book is physically in the library.
    ///
    /// A reserved book is still on the shelf, so it counts as available here.
    #[must_use]
    pub const fn is_available(&self) -> bool {
        !matches!(self.status, BookStatus::CheckedOut { .. })
    }

    /// Whether a hold or loan is placed on the book.
    #[must_use]
    pub const fn is_reserved(&self) -> bool {
        !matches!(self.status, BookStatus::Available)
    }

    /// When the book is due back, if it is out on a dated loan.
    #[must_use]
    pub fn due_return(&self) -> Option<NaiveDate> {
        match &self.status {
            BookStatus::CheckedOut { due, .. } => *due,
            _ => None,
        }
    }

    /// The user holding the reservation or loan, if any.
    #[must_use]
    pub fn holder(&self) -> Option<&str> {
        self.status.holder()
    }

    /// `"Available"` when the book can be reserved right now, otherwise
    /// `"Not Available"`.
    #[must_use]
    pub const fn availability_status(&self) -> &'static str {
        if self.is_available() && !self.is_reserved() {
            "Available"
        } else {
            "Not Available"
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn book(status: BookStatus) -> Book {
        Book::with_status(
            BookId::try_from("001").unwrap(),
            "Dune".to_string(),
            None,
            status,
        )
    }

    #[test]
    fn book_id_strips_surrounding_whitespace() {
        let id = BookId::try_from("  978-0441013593 ").unwrap();
        assert_eq!(id.as_str(), "978-0441013593");
    }

    #[test]
    fn blank_book_id_is_rejected() {
        assert_eq!(BookId::try_from("   "), Err(InvalidBookIdError));
        assert_eq!(BookId::try_from(""), Err(InvalidBookIdError));
    }

    #[test]
    fn empty_author_is_no_author() {
        let id = BookId::try_from("001").unwrap();
        let book = Book::new(id, "Dune".to_string(), Some(String::new()));
        assert_eq!(book.author(), None);
    }

    #[test]
    fn flag_view_follows_status() {
        let due = NaiveDate::from_ymd_opt(2024, 3, 1).unwrap();

        let available = book(BookStatus::Available);
        assert!(available.is_available());
        assert!(!available.is_reserved());
        assert_eq!(available.due_return(), None);
        assert_eq!(available.availability_status(), "Available");

        let reserved = book(BookStatus::Reserved {
            holder: Some("Alice".to_string()),
        });
        assert!(reserved.is_available());
        assert!(reserved.is_reserved());
        assert_eq!(reserved.holder(), Some("Alice"));
        assert_eq!(reserved.availability_status(), "Not Available");

        let out = book(BookStatus::CheckedOut {
            holder: None,
            due: Some(due),
        });
        assert!(!out.is_available());
        assert!(out.is_reserved());
        assert_eq!(out.due_return(), Some(due));
        assert_eq!(out.availability_status(), "Not Available");
    }

    #[test]
    fn status_display() {
        let due = NaiveDate::from_ymd_opt(2024, 3, 1).unwrap();
        let status = BookStatus::CheckedOut {
            holder: None,
            due: Some(due),
        };
        assert_eq!(status.to_string(), "checked out (due 2024-03-01)");
    }
}
