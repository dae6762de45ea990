//! Domain models that mirror the SQLite schema and get passed throughout the
//! TUI. These types stay light-weight data holders so the persistence and
//! presentation layers can both clone them freely without worrying about
//! shared mutable state.

use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
/// In-memory representation of a book. The struct mirrors rows in the `books`
/// table one-to-one.
pub struct Book {
    /// Primary key from the SQLite store. Kept around even when the UI only
    /// needs display information because edit/delete flows bubble the id back
    /// to the persistence layer.
    pub id: i64,
    /// Title displayed in the list and the edit form.
    pub title: String,
    /// Free-form description shown as a clipped preview in the list.
    pub description: String,
    /// Optional cover image URL. Stored as raw text and empty when the user
    /// skipped the field.
    pub image: String,
}

impl fmt::Display for Book {
    /// Write the title to any formatter so the type plays nicely with Ratatui
    /// widgets that consume strings implicitly.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.title)
    }
}

impl Book {
    /// Return the image URL when one is actually stored. Blank and
    /// whitespace-only values count as "no image" so the open-link flow never
    /// hands garbage to the browser.
    pub fn image_url(&self) -> Option<&str> {
        let trimmed = self.image.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(trimmed)
        }
    }
}
