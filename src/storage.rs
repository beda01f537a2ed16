pub mod books;
pub mod library;
mod table;
pub mod users;

pub use books::BookStore;
pub use library::{Error, ErrorKind, Library};
pub use table::StoreError;
pub use users::UserStore;
