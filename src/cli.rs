use std::path::{Path, PathBuf};

mod account;
mod catalog;
mod circulate;
mod listing;
mod terminal;

use circulation::{Action, BookId, Config, Library, Outcome, Session};
use clap::ArgAction;
use tracing::instrument;

/// Parse a book id from the command line.
fn parse_book_id(s: &str) -> Result<BookId, String> {
    s.parse().map_err(|e| format!("{e}"))
}

#[derive(Debug, clap::Parser)]
#[command(version, about)]
pub struct Cli {
    /// Verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    /// The directory holding the library tables
    #[arg(short, long, default_value = ".", global = true)]
    root: PathBuf,

    /// The user to act as
    #[arg(short, long, global = true)]
    user: Option<String>,

    /// The user's password (prompted for when omitted)
    #[arg(long, global = true)]
    password: Option<String>,

    #[command(subcommand)]
    command: Command,
}

impl Cli {
    pub fn run(self) -> anyhow::Result<()> {
        Self::setup_logging(self.verbose);

        let context = Context {
            root: self.root,
            user: self.user,
            password: self.password,
        };
        self.command.run(&context)
    }

    fn setup_logging(verbosity: u8) {
        use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

        let level = match verbosity {
            0 => tracing::Level::WARN,
            1 => tracing::Level::INFO,
            2 => tracing::Level::DEBUG,
            _ => tracing::Level::TRACE,
        };

        let filter = tracing_subscriber::EnvFilter::from_default_env().add_directive(level.into());

        let fmt_layer = tracing_subscriber::fmt::layer()
            .with_target(false)
            .with_thread_names(false)
            .with_line_number(false)
            .with_writer(std::io::stderr);

        tracing_subscriber::registry()
            .with(filter)
            .with(fmt_layer)
            .init();
    }
}

#[derive(Debug, clap::Parser)]
pub enum Command {
    /// Create a library in the root directory
    Init,

    /// Register a new user
    Register(account::Register),

    /// Check a name and password
    Login,

    /// Search book titles
    Search(listing::Search),

    /// List every book in the catalog
    Books(listing::Books),

    /// List loans past their due date
    Overdue(listing::Books),

    /// Place a hold on a book
    Reserve(circulate::Command),

    /// Borrow a book
    Checkout(circulate::Command),

    /// Extend a loan
    Renew(circulate::Command),

    /// Return a book or cancel a hold
    Return(circulate::Command),

    /// Add a book to the catalog (admin only)
    AddBook(catalog::AddBook),

    /// Remove a book from the catalog (admin only)
    DeleteBook(catalog::DeleteBook),

    /// List registered users (admin only)
    Users(listing::Users),
}

impl Command {
    fn run(self, context: &Context) -> anyhow::Result<()> {
        match self {
            Self::Init => init(&context.root)?,
            Self::Register(command) => command.run(context)?,
            Self::Login => account::login(context)?,
            Self::Search(command) => command.run(context)?,
            Self::Books(command) => command.run(context)?,
            Self::Overdue(command) => command.run_overdue(context)?,
            Self::Reserve(command) => command.run(context, circulate::Step::Reserve)?,
            Self::Checkout(command) => command.run(context, circulate::Step::Checkout)?,
            Self::Renew(command) => command.run(context, circulate::Step::Renew)?,
            Self::Return(command) => command.run(context, circulate::Step::Return)?,
            Self::AddBook(command) => command.run(context)?,
            Self::DeleteBook(command) => command.run(context)?,
            Self::Users(command) => command.run(context)?,
        }
        Ok(())
    }
}

/// Where the library lives and who is acting on it.
#[derive(Debug)]
pub struct Context {
    root: PathBuf,
    user: Option<String>,
    password: Option<String>,
}

impl Context {
    /// Opens the library at the root directory.
    pub fn open(&self) -> anyhow::Result<Library> {
        Ok(Library::open(self.root.clone())?)
    }

    /// The password from the command line, or prompted for interactively.
    fn password(&self, prompt: &str) -> anyhow::Result<String> {
        if let Some(password) = &self.password {
            return Ok(password.clone());
        }
        Ok(dialoguer::Password::new().with_prompt(prompt).interact()?)
    }

    /// Logs the `--user` in.
    pub fn login(&self, library: &mut Library) -> anyhow::Result<Session> {
        let Some(name) = &self.user else {
            anyhow::bail!("this command needs a user: pass --user NAME");
        };
        let password = self.password(&format!("Password for {name}"))?;

        match library.execute(
            None,
            Action::Authenticate {
                name: name.clone(),
                password,
            },
        )? {
            Outcome::Authenticated(session) => Ok(session),
            other => anyhow::bail!("unexpected outcome from login: {other:?}"),
        }
    }

    /// Runs an action against the library, logging in first if it needs a
    /// user.
    #[instrument(level = "debug", skip_all, fields(capability = ?action.capability()))]
    pub fn perform(&self, action: Action) -> anyhow::Result<Outcome> {
        let mut library = self.open()?;
        let session = if action.capability().is_some() {
            Some(self.login(&mut library)?)
        } else {
            None
        };
        Ok(library.execute(session.as_ref(), action)?)
    }
}

#[instrument]
fn init(root: &Path) -> anyhow::Result<()> {
    let config_path = root.join(Config::FILE_NAME);
    if config_path.exists() {
        anyhow::bail!(
            "Library already initialized (found existing {})",
            Config::FILE_NAME
        );
    }

    std::fs::create_dir_all(root)
        .map_err(|e| anyhow::anyhow!("Failed to create {}: {e}", root.display()))?;

    let config = Config::default();
    config
        .save(&config_path)
        .map_err(|e| anyhow::anyhow!("Failed to create {}: {e}", Config::FILE_NAME))?;

    println!("Initialized library in {}", root.display());
    println!("  Created: {}", Config::FILE_NAME);
    println!(
        "  Books will be kept in {}, users in {}",
        config.books_file.display(),
        config.users_file.display()
    );
    println!();
    println!("Next steps:");
    println!("  circ register NAME --type admin");
    println!("  circ --user NAME add-book --id 001 --title \"Dune\"");

    Ok(())
}
