//! Read-only views of the catalog and the user directory.

use anyhow::Context as _;
use circulation::{Action, Book, Outcome, User};
use clap::{Parser, ValueEnum};
use serde_json::json;

use super::{
    terminal::{self, Tone},
    Context,
};

/// Supported output formats.
#[derive(Copy, Clone, Debug, Eq, PartialEq, ValueEnum, Default)]
pub enum OutputFormat {
    #[default]
    Table,
    Json,
}

#[derive(Debug, Parser)]
pub struct Search {
    /// Text to look for in book titles (case-insensitive)
    query: String,

    /// Output format
    #[arg(long, value_enum, default_value_t)]
    output: OutputFormat,
}

impl Search {
    pub fn run(self, context: &Context) -> anyhow::Result<()> {
        let books = expect_books(context.perform(Action::Search { query: self.query })?)?;
        if books.is_empty() && self.output == OutputFormat::Table {
            println!("No matching books found.");
            return Ok(());
        }
        render_books(&books, self.output)
    }
}

#[derive(Debug, Parser)]
pub struct Books {
    /// Output format
    #[arg(long, value_enum, default_value_t)]
    output: OutputFormat,
}

impl Books {
    pub fn run(self, context: &Context) -> anyhow::Result<()> {
        let books = expect_books(context.perform(Action::ListBooks)?)?;
        if books.is_empty() && self.output == OutputFormat::Table {
            println!("The catalog is empty.");
            return Ok(());
        }
        render_books(&books, self.output)
    }

    pub fn run_overdue(self, context: &Context) -> anyhow::Result<()> {
        let mut library = context.open()?;
        let session = context.login(&mut library)?;
        let books: Vec<Book> = library.overdue(&session)?.into_iter().cloned().collect();

        if books.is_empty() && self.output == OutputFormat::Table {
            println!("{}", terminal::paint("Nothing is overdue.", Tone::Ok));
            return Ok(());
        }
        render_books(&books, self.output)
    }
}

#[derive(Debug, Parser)]
pub struct Users {
    /// Output format
    #[arg(long, value_enum, default_value_t)]
    output: OutputFormat,
}

impl Users {
    pub fn run(self, context: &Context) -> anyhow::Result<()> {
        let users = match context.perform(Action::ListUsers)? {
            Outcome::Users(users) => users,
            other => anyhow::bail!("unexpected outcome from listing users: {other:?}"),
        };

        match self.output {
            OutputFormat::Table => render_user_table(&users),
            OutputFormat::Json => render_user_json(&users)?,
        }
        Ok(())
    }
}

fn expect_books(outcome: Outcome) -> anyhow::Result<Vec<Book>> {
    match outcome {
        Outcome::Books(books) => Ok(books),
        other => anyhow::bail!("unexpected outcome from listing books: {other:?}"),
    }
}

fn render_books(books: &[Book], output: OutputFormat) -> anyhow::Result<()> {
    match output {
        OutputFormat::Table => {
            render_book_table(books);
            Ok(())
        }
        OutputFormat::Json => render_book_json(books),
    }
}

/// One line of the books table, before padding.
struct BookRow {
    id: String,
    title: String,
    author: String,
    status: String,
}

impl From<&Book> for BookRow {
    fn from(book: &Book) -> Self {
        let status = match (book.availability_status(), book.due_return()) {
            (status, Some(due)) => format!("{status} (due {due})"),
            (status, None) => status.to_string(),
        };
        Self {
            id: book.id().to_string(),
            title: book.title().to_string(),
            author: book.author().unwrap_or("-").to_string(),
            status,
        }
    }
}

fn render_book_table(books: &[Book]) {
    let rows: Vec<BookRow> = books.iter().map(BookRow::from).collect();

    let id_width = column_width("ID", rows.iter().map(|r| r.id.as_str()));
    let author_width = column_width("Author", rows.iter().map(|r| r.author.as_str()));
    let status_width = column_width("Status", rows.iter().map(|r| r.status.as_str()));

    // Title takes whatever the other columns leave over.
    let fixed = id_width + author_width + status_width + 6;
    let title_width = terminal::width().saturating_sub(fixed).max(10);
    let title_width = title_width.min(column_width("Title", rows.iter().map(|r| r.title.as_str())));

    println!(
        "{:<id_width$}  {:<title_width$}  {:<author_width$}  {}",
        "ID", "Title", "Author", "Status"
    );
    for row in rows {
        let status = if row.status.starts_with("Available") {
            terminal::paint(&row.status, Tone::Ok)
        } else {
            terminal::paint(&row.status, Tone::Warn)
        };
        println!(
            "{:<id_width$}  {:<title_width$}  {:<author_width$}  {status}",
            row.id,
            terminal::truncate(&row.title, title_width),
            row.author,
        );
    }
}

fn render_book_json(books: &[Book]) -> anyhow::Result<()> {
    let rows: Vec<_> = books
        .iter()
        .map(|book| {
            json!({
                "id": book.id().as_str(),
                "title": book.title(),
                "author": book.author(),
                "status": book.availability_status(),
                "available": book.is_available(),
                "reserved": book.is_reserved(),
                "due": book.due_return().as_ref().map(ToString::to_string),
                "held_by": book.holder(),
            })
        })
        .collect();

    serde_json::to_writer_pretty(std::io::stdout(), &rows)
        .context("failed to render json output")?;
    println!();
    Ok(())
}

fn render_user_table(users: &[User]) {
    if users.is_empty() {
        println!("No users registered.");
        return;
    }

    let name_width = column_width("Name", users.iter().map(User::name));
    let email_width = column_width("Email", users.iter().map(User::email));

    println!(
        "{:<name_width$}  {:<6}  {:<email_width$}  {}",
        "Name", "Type", "Email", "Phone"
    );
    for user in users {
        println!(
            "{:<name_width$}  {:<6}  {:<email_width$}  {}",
            user.name(),
            user.role().as_str(),
            user.email(),
            terminal::paint(user.phone(), Tone::Faint),
        );
    }
}

fn render_user_json(users: &[User]) -> anyhow::Result<()> {
    // Passwords never leave the library.
    let rows: Vec<_> = users
        .iter()
        .map(|user| {
            json!({
                "name": user.name(),
                "type": user.role().as_str(),
                "phone": user.phone(),
                "email": user.email(),
            })
        })
        .collect();

    serde_json::to_writer_pretty(std::io::stdout(), &rows)
        .context("failed to render json output")?;
    println!();
    Ok(())
}

fn column_width<'a>(header: &str, values: impl Iterator<Item = &'a str>) -> usize {
    values
        .map(|v| v.chars().count())
        .chain(std::iter::once(header.chars().count()))
        .max()
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;
    use circulation::{BookId, BookStatus};

    use super::*;

    #[test]
    fn column_width_covers_header_and_values() {
        assert_eq!(column_width("ID", ["001", "1234"].into_iter()), 4);
        assert_eq!(column_width("Author", ["Le Guin"].into_iter()), 7);
        assert_eq!(column_width("Status", std::iter::empty()), 6);
    }

    #[test]
    fn row_shows_due_date_for_loans() {
        let due = NaiveDate::from_ymd_opt(2024, 3, 1).unwrap();
        let book = Book::with_status(
            BookId::try_from("003").unwrap(),
            "Emma".to_string(),
            None,
            BookStatus::CheckedOut {
                holder: Some("Bob".to_string()),
                due: Some(due),
            },
        );

        let row = BookRow::from(&book);
        assert_eq!(row.author, "-");
        assert!(row.status.ends_with("(due 2024-03-01)"));
    }
}
