use anyhow::{Context, Result};
use rusqlite::{params, Connection};

use super::StoreError;
use crate::models::Book;

/// Retrieve the complete set of books. Rowid order keeps the list stable
/// across refreshes without promising any particular ordering to callers.
pub fn fetch_books(conn: &Connection) -> Result<Vec<Book>> {
    let mut stmt = conn
        .prepare("SELECT id, title, description, image FROM books ORDER BY id")
        .context("failed to prepare book query")?;

    let books = stmt
        .query_map([], |row| {
            Ok(Book {
                id: row.get(0)?,
                title: row.get(1)?,
                description: row.get(2)?,
                image: row.get(3)?,
            })
        })
        .context("failed to iterate books")?
        .collect::<Result<Vec<_>, _>>()
        .context("failed to collect books")?;

    Ok(books)
}

/// Insert a new book row, returning the hydrated struct so the caller knows
/// the assigned id without a second query.
pub fn create_book(conn: &Connection, title: &str, description: &str, image: &str) -> Result<Book> {
    conn.execute(
        "INSERT INTO books (title, description, image) VALUES (?1, ?2, ?3)",
        params![title, description, image],
    )
    .map_err(StoreError::from)
    .context("failed to insert book")?;

    let id = conn.last_insert_rowid();
    Ok(Book {
        id,
        title: title.to_string(),
        description: description.to_string(),
        image: image.to_string(),
    })
}

/// Replace every editable field of an existing book. We surface an explicit
/// error when zero rows are touched so the UI can show a friendly message
/// instead of silently continuing.
pub fn update_book(
    conn: &Connection,
    id: i64,
    title: &str,
    description: &str,
    image: &str,
) -> Result<()> {
    let updated = conn
        .execute(
            "UPDATE books SET title = ?1, description = ?2, image = ?3 WHERE id = ?4",
            params![title, description, image, id],
        )
        .map_err(StoreError::from)
        .context("failed to update book")?;

    if updated == 0 {
        Err(StoreError::BookNotFound.into())
    } else {
        Ok(())
    }
}

/// Remove a book row. Like the update helper, a missing id is reported as an
/// error rather than treated as success.
pub fn delete_book(conn: &Connection, id: i64) -> Result<()> {
    let deleted = conn
        .execute("DELETE FROM books WHERE id = ?1", params![id])
        .map_err(StoreError::from)
        .context("failed to delete book")?;

    if deleted == 0 {
        Err(StoreError::BookNotFound.into())
    } else {
        Ok(())
    }
}
