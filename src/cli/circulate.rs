use circulation::{Action, Book, BookId, Outcome};
use clap::Parser;

use super::{
    terminal::{self, Tone},
    Context,
};

/// Which way a book moves through circulation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    Reserve,
    Checkout,
    Renew,
    Return,
}

impl Step {
    const fn action(self, book: BookId) -> Action {
        match self {
            Self::Reserve => Action::Reserve { book },
            Self::Checkout => Action::Checkout { book },
            Self::Renew => Action::Renew { book },
            Self::Return => Action::Return { book },
        }
    }
}

#[derive(Debug, Parser)]
pub struct Command {
    /// The id of the book
    #[arg(value_parser = super::parse_book_id)]
    book: BookId,
}

impl Command {
    pub fn run(self, context: &Context, step: Step) -> anyhow::Result<()> {
        let book = match context.perform(step.action(self.book))? {
            Outcome::Book(book) => book,
            other => anyhow::bail!("unexpected outcome from {step:?}: {other:?}"),
        };
        println!("{}", terminal::paint(confirmation(step, &book), Tone::Ok));
        Ok(())
    }
}

fn confirmation(step: Step, book: &Book) -> String {
    let due = book
        .due_return()
        .map_or_else(String::new, |due| format!(", due back {due}"));
    match step {
        Step::Reserve => format!("Reserved {} ({})", book.id(), book.title()),
        Step::Checkout => format!("Checked out {} ({}){due}", book.id(), book.title()),
        Step::Renew => format!("Renewed {} ({}){due}", book.id(), book.title()),
        Step::Return => format!("Returned {} ({})", book.id(), book.title()),
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;
    use circulation::BookStatus;

    use super::*;

    #[test]
    fn checkout_confirmation_names_due_date() {
        let book = Book::with_status(
            BookId::try_from("001").unwrap(),
            "Dune".to_string(),
            None,
            BookStatus::CheckedOut {
                holder: Some("Alice".to_string()),
                due: NaiveDate::from_ymd_opt(2024, 1, 15),
            },
        );

        assert_eq!(
            confirmation(Step::Checkout, &book),
            "Checked out 001 (Dune), due back 2024-01-15"
        );
    }

    #[test]
    fn steps_map_to_actions() {
        let id = BookId::try_from("001").unwrap();
        assert_eq!(
            Step::Return.action(id.clone()),
            Action::Return { book: id }
        );
    }
}
