//! In-memory collection of books
//!
//! The [`Catalog`] knows nothing about the filesystem. It keeps books in the
//! order they were added (or loaded) and offers lookup, search and removal.

use nonempty::NonEmpty;
use thiserror::Error;

use crate::domain::{Book, BookId, NotFound};

/// The books held by the library, in catalog order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Catalog {
    books: Vec<Book>,
}

/// Error returned when adding a book whose id is already in the catalog.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("a book with id {0} is already in the catalog")]
pub struct DuplicateIdError(pub BookId);

impl Catalog {
    /// Creates a catalog from books in their stored order.
    ///
    /// Duplicate ids are kept as they are; lookups return the first match.
    #[must_use]
    pub const fn from_books(books: Vec<Book>) -> Self {
        Self { books }
    }

    /// The number of books in the catalog.
    #[must_use]
    pub fn len(&self) -> usize {
        self.books.len()
    }

    /// Whether the catalog holds no books.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.books.is_empty()
    }

    /// Every book, in catalog order.
    pub fn books(&self) -> impl ExactSizeIterator<Item = &Book> + Clone {
        self.books.iter()
    }

    /// Finds the first book with the given id.
    ///
    /// # Errors
    ///
    /// Returns [`NotFound::Book`] if no book has this id.
    pub fn find(&self, id: &BookId) -> Result<&Book, NotFound> {
        self.books
            .iter()
            .find(|book| &book.id == id)
            .ok_or_else(|| NotFound::Book(id.clone()))
    }

    /// Finds the first book with the given id, for mutation.
    ///
    /// # Errors
    ///
    /// Returns [`NotFound::Book`] if no book has this id.
    pub fn find_mut(&mut self, id: &BookId) -> Result<&mut Book, NotFound> {
        self.books
            .iter_mut()
            .find(|book| &book.id == id)
            .ok_or_else(|| NotFound::Book(id.clone()))
    }

    /// Appends a book to the end of the catalog.
    ///
    /// # Errors
    ///
    /// Returns [`DuplicateIdError`] if a book with the same id is already
    /// present.
    pub fn add(&mut self, book: Book) -> Result<(), DuplicateIdError> {
        if self.books.iter().any(|existing| existing.id == book.id) {
            return Err(DuplicateIdError(book.id));
        }
        self.books.push(book);
        Ok(())
    }

    /// Removes every book with the given id and returns them in catalog order.
    ///
    /// # Errors
    ///
    /// Returns [`NotFound::Book`] if no book has this id.
    pub fn remove(&mut self, id: &BookId) -> Result<NonEmpty<Book>, NotFound> {
        let (removed, kept): (Vec<_>, Vec<_>) = std::mem::take(&mut self.books)
            .into_iter()
            .partition(|book| &book.id == id);
        self.books = kept;

        NonEmpty::from_vec(removed).ok_or_else(|| NotFound::Book(id.clone()))
    }

    /// Books whose title contains `query`, ignoring case, in catalog order.
    ///
    /// The returned iterator is lazy and can be cloned to restart the search.
    /// An empty query matches every book.
    pub fn search<'a>(&'a self, query: &str) -> Search<'a> {
        Search {
            books: self.books.iter(),
            needle: query.to_lowercase(),
        }
    }
}

impl FromIterator<Book> for Catalog {
    fn from_iter<T: IntoIterator<Item = Book>>(iter: T) -> Self {
        Self::from_books(iter.into_iter().collect())
    }
}

/// A lazy, restartable title search over a [`Catalog`].
///
/// Returned by [`Catalog::search`].
#[derive(Debug, Clone)]
#[must_use = "searches are lazy and do nothing unless consumed"]
pub struct Search<'a> {
    books: std::slice::Iter<'a, Book>,
    needle: String,
}

impl<'a> Iterator for Search<'a> {
    type Item = &'a Book;

    fn next(&mut self) -> Option<Self::Item> {
        let needle = &self.needle;
        self.books
            .by_ref()
            .find(|book| book.title.to_lowercase().contains(needle.as_str()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn book(id: &str, title: &str) -> Book {
        Book::new(BookId::try_from(id).unwrap(), title.to_string(), None)
    }

    fn id(s: &str) -> BookId {
        BookId::try_from(s).unwrap()
    }

    fn catalog() -> Catalog {
        Catalog::from_books(vec![
            book("001", "Dune"),
            book("002", "The Hobbit by Tolkien"),
            book("003", "Children of Dune"),
        ])
    }

    #[test]
    fn find_returns_first_match() {
        let catalog = Catalog::from_books(vec![book("001", "First"), book("001", "Second")]);
        assert_eq!(catalog.find(&id("001")).unwrap().title(), "First");
    }

    #[test]
    fn find_missing_is_not_found() {
        assert_eq!(
            catalog().find(&id("999")),
            Err(NotFound::Book(id("999")))
        );
    }

    #[test]
    fn add_appends_in_order() {
        let mut catalog = catalog();
        catalog.add(book("004", "Emma")).unwrap();
        let ids: Vec<_> = catalog.books().map(|b| b.id().as_str()).collect();
        assert_eq!(ids, ["001", "002", "003", "004"]);
    }

    #[test]
    fn add_rejects_duplicate_id() {
        let mut catalog = catalog();
        let error = catalog.add(book("002", "Another")).unwrap_err();
        assert_eq!(error, DuplicateIdError(id("002")));
        assert_eq!(catalog.len(), 3);
    }

    #[test]
    fn remove_takes_every_match() {
        let mut catalog = Catalog::from_books(vec![
            book("001", "First"),
            book("002", "Keep"),
            book("001", "Second"),
        ]);

        let removed = catalog.remove(&id("001")).unwrap();

        assert_eq!(removed.len(), 2);
        assert_eq!(removed.head.title(), "First");
        assert_eq!(catalog.len(), 1);
        assert_eq!(catalog.books().next().unwrap().title(), "Keep");
    }

    #[test]
    fn remove_missing_leaves_catalog_intact() {
        let mut catalog = catalog();
        assert!(catalog.remove(&id("999")).is_err());
        assert_eq!(catalog.len(), 3);
    }

    #[test]
    fn search_is_case_insensitive() {
        let catalog = catalog();
        let titles: Vec<_> = catalog.search("tolkien").map(Book::title).collect();
        assert_eq!(titles, ["The Hobbit by Tolkien"]);
    }

    #[test]
    fn search_preserves_catalog_order() {
        let catalog = catalog();
        let ids: Vec<_> = catalog.search("DUNE").map(|b| b.id().as_str()).collect();
        assert_eq!(ids, ["001", "003"]);
    }

    #[test]
    fn search_without_matches_is_empty() {
        assert_eq!(catalog().search("silmarillion").count(), 0);
    }

    #[test]
    fn search_can_be_restarted() {
        let catalog = catalog();
        let search = catalog.search("dune");
        assert_eq!(search.clone().count(), 2);
        assert_eq!(search.count(), 2);
    }

    #[test]
    fn search_only_looks_at_titles() {
        let catalog = Catalog::from_books(vec![Book::new(
            id("001"),
            "Dune".to_string(),
            Some("Frank Herbert".to_string()),
        )]);
        assert_eq!(catalog.search("herbert").count(), 0);
    }
}
