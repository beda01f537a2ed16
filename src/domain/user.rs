use std::{fmt, str::FromStr};

/// Something a user may ask the library to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Capability {
    /// Search the catalog by title.
    Search,
    /// List every book in the catalog.
    ListBooks,
    /// Place a hold on an available book.
    Reserve,
    /// Extend the due date of a borrowed book.
    Renew,
    /// Borrow a book.
    Checkout,
    /// Bring a book back, or cancel a hold.
    Return,
    /// Add a book to the catalog.
    AddBook,
    /// Remove a book from the catalog.
    DeleteBook,
    /// See every registered user.
    ListUsers,
}

impl fmt::Display for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Search => "search",
            Self::ListBooks => "list books",
            Self::Reserve => "reserve",
            Self::Renew => "renew",
            Self::Checkout => "check out",
            Self::Return => "return",
            Self::AddBook => "add books",
            Self::DeleteBook => "delete books",
            Self::ListUsers => "list users",
        };
        f.write_str(name)
    }
}

const MEMBER_CAPABILITIES: &[Capability] = &[
    Capability::Search,
    Capability::ListBooks,
    Capability::Reserve,
    Capability::Renew,
    Capability::Checkout,
    Capability::Return,
];

const ADMIN_CAPABILITIES: &[Capability] = &[
    Capability::Search,
    Capability::ListBooks,
    Capability::Reserve,
    Capability::Renew,
    Capability::Checkout,
    Capability::Return,
    Capability::AddBook,
    Capability::DeleteBook,
    Capability::ListUsers,
];

/// The role of a registered user.
///
/// An admin can do everything a member can, and also maintain the catalog
/// and see the user list.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Role {
    /// A regular library member. Stored as `user`.
    #[default]
    Member,
    /// A librarian. Stored as `admin`.
    Admin,
}

impl Role {
    /// The capabilities granted to this role.
    #[must_use]
    pub const fn capabilities(self) -> &'static [Capability] {
        match self {
            Self::Member => MEMBER_CAPABILITIES,
            Self::Admin => ADMIN_CAPABILITIES,
        }
    }

    /// Whether this role grants the given capability.
    #[must_use]
    pub fn permits(self, capability: Capability) -> bool {
        self.capabilities().contains(&capability)
    }

    /// The tag written to the users table.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Member => "user",
            Self::Admin => "admin",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = UnknownRoleError;

    /// Parses a role tag, ignoring case and surrounding whitespace.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "user" | "member" => Ok(Self::Member),
            "admin" => Ok(Self::Admin),
            _ => Err(UnknownRoleError(s.to_string())),
        }
    }
}

/// Error returned when a role tag is neither `user` nor `admin`.
#[derive(Debug, Clone, thiserror::Error, PartialEq, Eq)]
#[error("unknown user type '{0}': expected 'user' or 'admin'")]
pub struct UnknownRoleError(String);

/// A registered user of the library.
///
/// Users are created once at registration and never changed afterwards.
#[derive(Clone, PartialEq, Eq)]
pub struct User {
    pub(crate) name: String,
    pub(crate) role: Role,
    pub(crate) phone: String,
    pub(crate) email: String,
    pub(crate) password: String,
}

impl fmt::Debug for User {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("User")
            .field("name", &self.name)
            .field("role", &self.role)
            .field("phone", &self.phone)
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .finish()
    }
}

impl User {
    /// Construct a new [`User`].
    ///
    /// The password is kept in plaintext, exactly as the users table stores
    /// it.
    #[must_use]
    pub const fn new(
        name: String,
        role: Role,
        phone: String,
        email: String,
        password: String,
    ) -> Self {
        Self {
            name,
            role,
            phone,
            email,
            password,
        }
    }

    /// The name the user logs in with.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The user's role.
    #[must_use]
    pub const fn role(&self) -> Role {
        self.role
    }

    /// The user's phone number.
    #[must_use]
    pub fn phone(&self) -> &str {
        &self.phone
    }

    /// The user's email address.
    #[must_use]
    pub fn email(&self) -> &str {
        &self.email
    }

    pub(crate) fn password_matches(&self, password: &str) -> bool {
        self.password == password
    }

    /// A session acting as this user.
    #[must_use]
    pub fn session(&self) -> Session {
        Session {
            name: self.name.clone(),
            role: self.role,
        }
    }
}

/// The authenticated user an action is performed on behalf of.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    /// The user's name.
    pub name: String,
    /// The user's role at login.
    pub role: Role,
}

impl Session {
    /// Whether this session may perform the given capability.
    #[must_use]
    pub fn can(&self, capability: Capability) -> bool {
        self.role.permits(capability)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn debug_output_hides_password() {
        let user = User::new(
            "Alice".to_string(),
            Role::Member,
            "555".to_string(),
            "alice@x.com".to_string(),
            "hunter2".to_string(),
        );

        let rendered = format!("{user:?}");

        assert!(rendered.contains("Alice"));
        assert!(!rendered.contains("hunter2"));
    }

    #[test]
    fn admin_holds_every_member_capability() {
        for capability in Role::Member.capabilities() {
            assert!(Role::Admin.permits(*capability), "{capability}");
        }
    }

    #[test]
    fn member_cannot_maintain_catalog() {
        assert!(!Role::Member.permits(Capability::AddBook));
        assert!(!Role::Member.permits(Capability::DeleteBook));
        assert!(!Role::Member.permits(Capability::ListUsers));
        assert!(Role::Member.permits(Capability::Reserve));
    }

    #[test]
    fn role_tags() {
        assert_eq!("user".parse::<Role>().unwrap(), Role::Member);
        assert_eq!(" Admin ".parse::<Role>().unwrap(), Role::Admin);
        assert_eq!(Role::Member.to_string(), "user");
        assert!("clerk".parse::<Role>().is_err());
    }

    #[test]
    fn session_carries_role() {
        let user = User::new(
            "Alice".to_string(),
            Role::Admin,
            "555".to_string(),
            "a@x.com".to_string(),
            "pw1".to_string(),
        );
        let session = user.session();
        assert_eq!(session.name, "Alice");
        assert!(session.can(Capability::ListUsers));
    }
}
