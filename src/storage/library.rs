//! A filesystem backed library
//!
//! The [`Library`] ties the in-memory [`Catalog`] and [`Directory`] to their
//! tables on disk. Every operation checks the acting user's role, applies the
//! circulation rules, and writes the change out before returning: the books
//! table is rewritten in full, a registration appends one row to the users
//! table.

use std::{
    io,
    path::{Path, PathBuf},
};

use chrono::{Local, NaiveDate};

use crate::{
    domain::{
        catalog::Search, circulation, Action, AuthError, Book, BookId, Capability, Catalog,
        CirculationError, Config, ConfigError, Directory, DuplicateIdError, DuplicateNameError,
        NotFound, Outcome, Role, Session, User,
    },
    storage::{BookStore, StoreError, UserStore},
};

/// A library stored in a directory on disk.
#[derive(Debug)]
pub struct Library {
    /// The directory the tables and configuration live in.
    root: PathBuf,
    config: Config,
    catalog: Catalog,
    directory: Directory,
    books: BookStore,
    users: UserStore,
    clock: fn() -> NaiveDate,
}

impl Library {
    /// Opens the library stored at `root`.
    ///
    /// Settings are read from `library.toml` in the root if it exists;
    /// otherwise the defaults are used.
    ///
    /// # Errors
    ///
    /// Returns an error if `library.toml` exists but cannot be read or
    /// parsed, or if either table exists but cannot be loaded.
    pub fn open(root: PathBuf) -> Result<Self, Error> {
        let config = load_config(&root)?;
        Ok(Self::with_config(root, config)?)
    }

    /// Opens the library stored at `root` with explicit settings.
    ///
    /// # Errors
    ///
    /// Returns an error if either table exists but cannot be loaded.
    pub fn with_config(root: PathBuf, config: Config) -> Result<Self, StoreError> {
        let books = BookStore::new(root.join(&config.books_file));
        let users = UserStore::new(root.join(&config.users_file));

        let catalog = Catalog::from_books(books.load()?);
        let directory = Directory::from_users(users.load()?);

        tracing::debug!(
            "Opened library at {} with {} books and {} users",
            root.display(),
            catalog.len(),
            directory.len()
        );

        Ok(Self {
            root,
            config,
            catalog,
            directory,
            books,
            users,
            clock: today,
        })
    }

    /// Replaces the source of today's date, used for due dates.
    pub const fn set_clock(&mut self, clock: fn() -> NaiveDate) {
        self.clock = clock;
    }

    /// The directory the library is stored in.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// The settings in effect.
    #[must_use]
    pub const fn config(&self) -> &Config {
        &self.config
    }

    /// The books, as currently held in memory.
    #[must_use]
    pub const fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    /// The users, as currently held in memory.
    #[must_use]
    pub const fn directory(&self) -> &Directory {
        &self.directory
    }

    /// Performs a resolved action on behalf of `session`.
    ///
    /// Registration and login need no session. Every other action needs one
    /// whose user holds the matching [`Capability`].
    ///
    /// # Errors
    ///
    /// Returns whatever error the corresponding method returns, or
    /// [`Error::NotLoggedIn`] if the action needs a session and none was
    /// given.
    pub fn execute(
        &mut self,
        session: Option<&Session>,
        action: Action,
    ) -> Result<Outcome, Error> {
        let outcome = match action {
            Action::Register(user) => Outcome::Registered(self.register(user)?.clone()),
            Action::Authenticate { name, password } => {
                Outcome::Authenticated(self.authenticate(&name, &password)?)
            }
            Action::Search { query } => {
                let session = require(session, Capability::Search)?;
                Outcome::Books(self.search(session, &query)?.cloned().collect())
            }
            Action::ListBooks => {
                let session = require(session, Capability::ListBooks)?;
                Outcome::Books(self.books(session)?.cloned().collect())
            }
            Action::Reserve { book } => {
                let session = require(session, Capability::Reserve)?;
                Outcome::Book(self.reserve(session, &book)?.clone())
            }
            Action::Renew { book } => {
                let session = require(session, Capability::Renew)?;
                Outcome::Book(self.renew(session, &book)?.clone())
            }
            Action::Checkout { book } => {
                let session = require(session, Capability::Checkout)?;
                Outcome::Book(self.checkout(session, &book)?.clone())
            }
            Action::Return { book } => {
                let session = require(session, Capability::Return)?;
                Outcome::Book(self.return_book(session, &book)?.clone())
            }
            Action::AddBook(book) => {
                let session = require(session, Capability::AddBook)?;
                Outcome::Book(self.add_book(session, book)?.clone())
            }
            Action::DeleteBook { book } => {
                let session = require(session, Capability::DeleteBook)?;
                Outcome::Removed(self.delete_book(session, &book)?)
            }
            Action::ListUsers => {
                let session = require(session, Capability::ListUsers)?;
                Outcome::Users(self.users(session)?.cloned().collect())
            }
        };
        Ok(outcome)
    }

    /// Registers a new user and appends them to the users table.
    ///
    /// # Errors
    ///
    /// This method can fail if:
    ///
    /// - a user with the same name is already registered
    /// - the users table cannot be written to
    pub fn register(&mut self, user: User) -> Result<&User, Error> {
        if self.directory.find(&user.name).is_ok() {
            return Err(DuplicateNameError(user.name).into());
        }
        // On disk first, so a failed write leaves no user that can log in.
        self.users.append(&user)?;
        let user = self.directory.register(user)?;
        tracing::info!("Registered {} {}", user.role, user.name);
        Ok(user)
    }

    /// Checks a name and password and starts a session for that user.
    ///
    /// # Errors
    ///
    /// Returns an error if the name is unknown or the password is wrong.
    pub fn authenticate(&self, name: &str, password: &str) -> Result<Session, Error> {
        let user = self.directory.authenticate(name, password)?;
        Ok(user.session())
    }

    /// Books whose title contains `query`, ignoring case.
    ///
    /// # Errors
    ///
    /// Returns an error if the session may not search.
    pub fn search(&self, session: &Session, query: &str) -> Result<Search<'_>, Error> {
        authorize(&self.directory, session, Capability::Search)?;
        Ok(self.catalog.search(query))
    }

    /// Every book in the catalog.
    ///
    /// # Errors
    ///
    /// Returns an error if the session may not list books.
    pub fn books<'a>(
        &'a self,
        session: &Session,
    ) -> Result<impl ExactSizeIterator<Item = &'a Book> + Clone + use<'a>, Error> {
        authorize(&self.directory, session, Capability::ListBooks)?;
        Ok(self.catalog.books())
    }

    /// Books out on loan whose due date has passed.
    ///
    /// # Errors
    ///
    /// Returns an error if the session may not list books.
    pub fn overdue(&self, session: &Session) -> Result<Vec<&Book>, Error> {
        authorize(&self.directory, session, Capability::ListBooks)?;
        let today = (self.clock)();
        Ok(self
            .catalog
            .books()
            .filter(|book| circulation::is_overdue(book, today))
            .collect())
    }

    /// Places a hold on a book for the session's user.
    ///
    /// # Errors
    ///
    /// This method can fail if:
    ///
    /// - the session may not reserve books
    /// - the book does not exist
    /// - the book is already reserved or is out on loan
    /// - the books table cannot be written to
    pub fn reserve(&mut self, session: &Session, id: &BookId) -> Result<&Book, Error> {
        let user = authorize(&self.directory, session, Capability::Reserve)?;
        let book = self.catalog.find_mut(id)?;
        circulation::reserve(book, user)?;
        self.commit(id)
    }

    /// Lends a book to the session's user for the configured loan period.
    ///
    /// # Errors
    ///
    /// This method can fail if:
    ///
    /// - the session may not check out books
    /// - the book does not exist
    /// - the book is out on loan, or held for someone else
    /// - the books table cannot be written to
    pub fn checkout(&mut self, session: &Session, id: &BookId) -> Result<&Book, Error> {
        let user = authorize(&self.directory, session, Capability::Checkout)?;
        let book = self.catalog.find_mut(id)?;
        circulation::checkout(book, user, self.config.loan_period(), (self.clock)())?;
        self.commit(id)
    }

    /// Extends the session user's loan by the configured renewal period.
    ///
    /// # Errors
    ///
    /// This method can fail if:
    ///
    /// - the session may not renew books
    /// - the book does not exist
    /// - the book is not on a dated loan to this user
    /// - the books table cannot be written to
    pub fn renew(&mut self, session: &Session, id: &BookId) -> Result<&Book, Error> {
        let user = authorize(&self.directory, session, Capability::Renew)?;
        let book = self.catalog.find_mut(id)?;
        circulation::renew(book, user, self.config.renewal_period())?;
        self.commit(id)
    }

    /// Returns a book, or cancels a hold on it.
    ///
    /// Members can only return their own holds and loans. Admins can return
    /// any book.
    ///
    /// # Errors
    ///
    /// This method can fail if:
    ///
    /// - the session may not return books, or the book is held by another
    ///   member
    /// - the book does not exist
    /// - the book is neither reserved nor checked out
    /// - the books table cannot be written to
    pub fn return_book(&mut self, session: &Session, id: &BookId) -> Result<&Book, Error> {
        let user = authorize(&self.directory, session, Capability::Return)?;
        let book = self.catalog.find_mut(id)?;

        if user.role == Role::Member
            && book.holder().is_some_and(|holder| holder != user.name)
        {
            return Err(Error::PermissionDenied {
                role: user.role,
                capability: Capability::Return,
            });
        }

        circulation::return_book(book)?;
        self.commit(id)
    }

    /// Adds a book to the catalog.
    ///
    /// # Errors
    ///
    /// This method can fail if:
    ///
    /// - the session may not add books
    /// - a book with the same id is already in the catalog
    /// - the books table cannot be written to
    pub fn add_book(&mut self, session: &Session, book: Book) -> Result<&Book, Error> {
        authorize(&self.directory, session, Capability::AddBook)?;
        let id = book.id.clone();
        self.catalog.add(book)?;
        tracing::info!("Added book {id}");
        self.commit(&id)
    }

    /// Removes every book with the given id from the catalog.
    ///
    /// # Errors
    ///
    /// This method can fail if:
    ///
    /// - the session may not delete books
    /// - no book has this id
    /// - the books table cannot be written to
    pub fn delete_book(
        &mut self,
        session: &Session,
        id: &BookId,
    ) -> Result<nonempty::NonEmpty<Book>, Error> {
        authorize(&self.directory, session, Capability::DeleteBook)?;
        let removed = self.catalog.remove(id)?;
        tracing::info!("Deleted {} book(s) with id {id}", removed.len());
        self.books.save(self.catalog.books())?;
        Ok(removed)
    }

    /// Every registered user, in registration order.
    ///
    /// # Errors
    ///
    /// Returns an error if the session may not list users.
    pub fn users<'a>(
        &'a self,
        session: &Session,
    ) -> Result<impl ExactSizeIterator<Item = &'a User> + Clone + use<'a>, Error> {
        authorize(&self.directory, session, Capability::ListUsers)?;
        Ok(self.directory.users())
    }

    /// Writes the books table and returns the updated book.
    fn commit(&self, id: &BookId) -> Result<&Book, Error> {
        self.books.save(self.catalog.books())?;
        Ok(self.catalog.find(id)?)
    }
}

/// Resolves the session to its registered user and checks that the user's
/// role grants `capability`.
///
/// The stored role is what counts, not the one recorded in the session.
fn authorize<'a>(
    directory: &'a Directory,
    session: &Session,
    capability: Capability,
) -> Result<&'a User, Error> {
    let user = directory.find(&session.name)?;
    if user.role.permits(capability) {
        Ok(user)
    } else {
        Err(Error::PermissionDenied {
            role: user.role,
            capability,
        })
    }
}

fn require(session: Option<&Session>, capability: Capability) -> Result<&Session, Error> {
    session.ok_or(Error::NotLoggedIn(capability))
}

fn load_config(root: &Path) -> Result<Config, ConfigError> {
    let path = root.join(Config::FILE_NAME);
    match Config::load(&path) {
        Ok(config) => Ok(config),
        Err(ConfigError::Io { source, .. }) if source.kind() == io::ErrorKind::NotFound => {
            tracing::debug!("No {} in {}, using defaults", Config::FILE_NAME, root.display());
            Ok(Config::default())
        }
        Err(e) => Err(e),
    }
}

fn today() -> NaiveDate {
    Local::now().date_naive()
}

/// Errors returned by [`Library`] operations.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A book or user lookup found nothing.
    #[error(transparent)]
    NotFound(#[from] NotFound),
    /// The name or password was wrong.
    #[error(transparent)]
    Auth(#[from] AuthError),
    /// The book's circulation state does not allow this.
    #[error(transparent)]
    InvalidState(#[from] CirculationError),
    /// The action needs a logged-in user.
    #[error("log in to {0}")]
    NotLoggedIn(Capability),
    /// The user's role does not grant this capability.
    #[error("{role} accounts cannot {capability}")]
    PermissionDenied {
        /// The acting user's role.
        role: Role,
        /// What was attempted.
        capability: Capability,
    },
    /// The book id is already in the catalog.
    #[error(transparent)]
    DuplicateId(#[from] DuplicateIdError),
    /// The user name is already registered.
    #[error(transparent)]
    DuplicateName(#[from] DuplicateNameError),
    /// The change could not be written to disk.
    #[error("failed to save changes: {0}")]
    Persistence(#[from] StoreError),
    /// `library.toml` exists but is unusable.
    #[error(transparent)]
    Config(#[from] ConfigError),
}

/// The broad category of an [`Error`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// A book or user lookup found nothing.
    NotFound,
    /// The credentials were rejected.
    AuthFailure,
    /// The book's state does not allow the transition.
    InvalidState,
    /// The acting user may not do this.
    PermissionDenied,
    /// The id or name is already taken.
    Duplicate,
    /// Reading or writing a table failed.
    PersistenceFailure,
}

impl Error {
    /// The broad category of this error.
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::NotFound(_) => ErrorKind::NotFound,
            Self::Auth(_) => ErrorKind::AuthFailure,
            Self::InvalidState(_) => ErrorKind::InvalidState,
            Self::NotLoggedIn(_) | Self::PermissionDenied { .. } => ErrorKind::PermissionDenied,
            Self::DuplicateId(_) | Self::DuplicateName(_) => ErrorKind::Duplicate,
            Self::Persistence(_) | Self::Config(_) => ErrorKind::PersistenceFailure,
        }
    }
}
