use nonempty::NonEmpty;

use crate::domain::{Book, BookId, Capability, Session, User};

/// A fully resolved request from the command layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    /// Register a new user.
    Register(User),
    /// Log in with a name and password.
    Authenticate {
        /// The name to log in as.
        name: String,
        /// The password to check.
        password: String,
    },
    /// Search titles for a substring.
    Search {
        /// Case-insensitive title fragment.
        query: String,
    },
    /// List the whole catalog.
    ListBooks,
    /// Place a hold on a book.
    Reserve {
        /// The book to hold.
        book: BookId,
    },
    /// Extend a loan.
    Renew {
        /// The borrowed book.
        book: BookId,
    },
    /// Borrow a book.
    Checkout {
        /// The book to borrow.
        book: BookId,
    },
    /// Return a book or cancel a hold.
    Return {
        /// The book to return.
        book: BookId,
    },
    /// Add a book to the catalog.
    AddBook(Book),
    /// Remove a book from the catalog.
    DeleteBook {
        /// The id to remove.
        book: BookId,
    },
    /// List every registered user.
    ListUsers,
}

impl Action {
    /// The capability a session needs to perform this action.
    ///
    /// `None` for actions available before logging in.
    #[must_use]
    pub const fn capability(&self) -> Option<Capability> {
        match self {
            Self::Register(_) | Self::Authenticate { .. } => None,
            Self::Search { .. } => Some(Capability::Search),
            Self::ListBooks => Some(Capability::ListBooks),
            Self::Reserve { .. } => Some(Capability::Reserve),
            Self::Renew { .. } => Some(Capability::Renew),
            Self::Checkout { .. } => Some(Capability::Checkout),
            Self::Return { .. } => Some(Capability::Return),
            Self::AddBook(_) => Some(Capability::AddBook),
            Self::DeleteBook { .. } => Some(Capability::DeleteBook),
            Self::ListUsers => Some(Capability::ListUsers),
        }
    }
}

/// The successful result of an [`Action`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// The newly registered user.
    Registered(User),
    /// A session for the logged-in user.
    Authenticated(Session),
    /// Books matching a search or listing, in catalog order.
    Books(Vec<Book>),
    /// The book after a circulation change.
    Book(Book),
    /// Every catalog entry removed by a delete.
    Removed(NonEmpty<Book>),
    /// Every registered user, in registration order.
    Users(Vec<User>),
}
