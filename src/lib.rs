//! Plain-text Library Circulation
//!
//! Books and users are stored as delimited text tables in a directory.

pub mod domain;
pub use domain::{
    Action, AuthError, Book, BookId, BookStatus, Capability, Catalog, CirculationError, Config,
    Outcome, Role, Session, User,
};

/// Flat-file storage and the file-backed library facade.
pub mod storage;
pub use storage::{Error, ErrorKind, Library};
