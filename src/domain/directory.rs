//! In-memory collection of users
//!
//! The [`Directory`] keeps users in registration order. Users are only ever
//! appended; there is no update or delete path.

use thiserror::Error;

use crate::domain::{NotFound, User};

/// The registered users of the library, in registration order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Directory {
    users: Vec<User>,
}

/// Why a login attempt was refused.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AuthError {
    /// No user is registered under this name.
    #[error("user '{0}' not found, please register first")]
    UserNotFound(String),
    /// The user exists but the password does not match.
    #[error("incorrect password for user '{0}'")]
    IncorrectPassword(String),
}

/// Error returned when registering a name that is already taken.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("a user named '{0}' is already registered")]
pub struct DuplicateNameError(pub String);

impl Directory {
    /// Creates a directory from users in their stored order.
    ///
    /// Repeated names are kept as they are; lookups return the first match.
    #[must_use]
    pub const fn from_users(users: Vec<User>) -> Self {
        Self { users }
    }

    /// Registers a new user.
    ///
    /// # Errors
    ///
    /// Returns [`DuplicateNameError`] if a user with the same name is already
    /// registered.
    pub fn register(&mut self, user: User) -> Result<&User, DuplicateNameError> {
        if self.find(&user.name).is_ok() {
            return Err(DuplicateNameError(user.name));
        }
        self.users.push(user);
        Ok(&self.users[self.users.len() - 1])
    }

    /// Finds the first user registered under `name`.
    ///
    /// # Errors
    ///
    /// Returns [`NotFound::User`] if nobody has this name.
    pub fn find(&self, name: &str) -> Result<&User, NotFound> {
        self.users
            .iter()
            .find(|user| user.name == name)
            .ok_or_else(|| NotFound::User(name.to_string()))
    }

    /// Checks a name and password against the registered users.
    ///
    /// The first user with a matching name is checked; the password must
    /// match exactly.
    ///
    /// # Errors
    ///
    /// - [`AuthError::UserNotFound`] if nobody has this name
    /// - [`AuthError::IncorrectPassword`] if the password does not match
    pub fn authenticate(&self, name: &str, password: &str) -> Result<&User, AuthError> {
        let user = self
            .find(name)
            .map_err(|_| AuthError::UserNotFound(name.to_string()))?;

        if user.password_matches(password) {
            tracing::debug!("User {name} authenticated");
            Ok(user)
        } else {
            Err(AuthError::IncorrectPassword(name.to_string()))
        }
    }

    /// Every user, in registration order.
    pub fn users(&self) -> impl ExactSizeIterator<Item = &User> + Clone {
        self.users.iter()
    }

    /// The number of registered users.
    #[must_use]
    pub fn len(&self) -> usize {
        self.users.len()
    }

    /// Whether nobody is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.users.is_empty()
    }
}
