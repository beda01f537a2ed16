use circulation::{Action, Book, BookId, Outcome};
use clap::Parser;
use tracing::instrument;

use super::{
    terminal::{self, Tone},
    Context,
};

#[derive(Debug, Parser)]
pub struct AddBook {
    /// The id of the new book (an ISBN or shelf code)
    #[arg(long, value_parser = super::parse_book_id)]
    id: BookId,

    /// The title of the book
    #[arg(long)]
    title: String,

    /// The author of the book
    #[arg(long)]
    author: Option<String>,
}

impl AddBook {
    #[instrument(skip(context))]
    pub fn run(self, context: &Context) -> anyhow::Result<()> {
        let book = Book::new(self.id, self.title, self.author);
        let Outcome::Book(book) = context.perform(Action::AddBook(book))? else {
            anyhow::bail!("unexpected outcome from adding a book");
        };
        println!(
            "{}",
            terminal::paint(format!("Added {} ({})", book.id(), book.title()), Tone::Ok)
        );
        Ok(())
    }
}

#[derive(Debug, Parser)]
pub struct DeleteBook {
    /// The id of the book to remove
    #[arg(value_parser = super::parse_book_id)]
    id: BookId,
}

impl DeleteBook {
    #[instrument(skip(context))]
    pub fn run(self, context: &Context) -> anyhow::Result<()> {
        let Outcome::Removed(removed) = context.perform(Action::DeleteBook { book: self.id })?
        else {
            anyhow::bail!("unexpected outcome from deleting a book");
        };

        let first = removed.first();
        match removed.len() {
            1 => println!("Deleted {} ({})", first.id(), first.title()),
            n => println!(
                "Deleted {n} entries with id {} {}",
                first.id(),
                terminal::paint("(the table held duplicates)", Tone::Warn)
            ),
        }
        Ok(())
    }
}
