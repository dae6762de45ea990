//! Persistence module split across logical submodules.

mod books;
mod connection;

use thiserror::Error;

pub use books::{create_book, delete_book, fetch_books, update_book};
pub use connection::ensure_schema;

#[cfg(test)]
pub(crate) use connection::create_tables;

/// Typed failures raised by the record store. The UI mostly cares about the
/// rendered message, but keeping the not-found case distinct lets callers
/// tell "the row vanished" apart from a genuine storage fault.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Book not found")]
    BookNotFound,
    #[error(transparent)]
    Sqlite(#[from] rusqlite::Error),
}
