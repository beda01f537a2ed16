//! Domain models for library circulation.
//!
//! This module contains the core domain types including books, users and
//! their roles, the circulation rules, and configuration. Nothing in here
//! touches the filesystem.

/// Book domain model and identifiers.
pub mod book;
pub use book::{Book, BookId, BookStatus, InvalidBookIdError};

/// Users, roles and capabilities.
pub mod user;
pub use user::{Capability, Role, Session, UnknownRoleError, User};

mod config;
pub use config::{Config, ConfigError};

/// In-memory collection of books.
pub mod catalog;
pub use catalog::{Catalog, DuplicateIdError};

/// The circulation state machine.
pub mod circulation;
pub use circulation::CirculationError;

/// In-memory collection of users.
pub mod directory;
pub use directory::{AuthError, Directory, DuplicateNameError};

/// Resolved actions and their outcomes.
pub mod action;
pub use action::{Action, Outcome};

/// A lookup by book id or user name found nothing.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum NotFound {
    /// No book with this id is in the catalog.
    #[error("book {0} not found")]
    Book(BookId),
    /// No user with this name is registered.
    #[error("user '{0}' not found")]
    User(String),
}
