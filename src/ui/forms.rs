use anyhow::{anyhow, Result};
use ratatui::style::{Color, Style};
use ratatui::text::{Line, Span};

use crate::models::Book;

/// Internal representation of the add/edit book form fields.
#[derive(Default, Clone)]
pub(crate) struct BookForm {
    pub(crate) title: String,
    pub(crate) description: String,
    pub(crate) image: String,
    pub(crate) active: BookField,
    pub(crate) error: Option<String>,
}

/// Fields available within the book form.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub(crate) enum BookField {
    Title,
    Description,
    Image,
}

impl Default for BookField {
    fn default() -> Self {
        BookField::Title
    }
}

impl BookForm {
    /// Populate the form from an existing book when editing.
    pub(crate) fn from_book(book: &Book) -> Self {
        Self {
            title: book.title.clone(),
            description: book.description.clone(),
            image: book.image.clone(),
            active: BookField::Title,
            error: None,
        }
    }

    /// Move focus to the next field, wrapping back to the title.
    pub(crate) fn next_field(&mut self) {
        self.active = match self.active {
            BookField::Title => BookField::Description,
            BookField::Description => BookField::Image,
            BookField::Image => BookField::Title,
        };
    }

    /// Move focus to the previous field.
    pub(crate) fn prev_field(&mut self) {
        self.active = match self.active {
            BookField::Title => BookField::Image,
            BookField::Description => BookField::Title,
            BookField::Image => BookField::Description,
        };
    }

    /// Append a character to the active field, rejecting control characters.
    pub(crate) fn push_char(&mut self, ch: char) -> bool {
        if ch.is_control() {
            return false;
        }
        self.active_value_mut().push(ch);
        true
    }

    /// Remove the last character from the active field.
    pub(crate) fn backspace(&mut self) {
        self.active_value_mut().pop();
    }

    fn active_value_mut(&mut self) -> &mut String {
        match self.active {
            BookField::Title => &mut self.title,
            BookField::Description => &mut self.description,
            BookField::Image => &mut self.image,
        }
    }

    fn value(&self, field: BookField) -> &str {
        match field {
            BookField::Title => &self.title,
            BookField::Description => &self.description,
            BookField::Image => &self.image,
        }
    }

    /// Validate the inputs and return trimmed values ready for persistence.
    /// Title and description are required; the image URL may stay empty.
    pub(crate) fn parse_inputs(&self) -> Result<(String, String, String)> {
        let title = self.title.trim();
        if title.is_empty() {
            return Err(anyhow!("Title is required."));
        }
        let description = self.description.trim();
        if description.is_empty() {
            return Err(anyhow!("Description is required."));
        }
        let image = self.image.trim();
        Ok((
            title.to_string(),
            description.to_string(),
            image.to_string(),
        ))
    }

    /// Render a single line for the form widget.
    pub(crate) fn build_line(&self, field_name: &str, field: BookField) -> Line<'static> {
        let value = self.value(field);
        let is_active = self.active == field;

        let display = if value.is_empty() {
            match field {
                BookField::Image => "<optional>".to_string(),
                _ => "<required>".to_string(),
            }
        } else {
            value.to_string()
        };

        let style = if is_active {
            Style::default().fg(Color::Yellow)
        } else if value.is_empty() {
            Style::default().fg(Color::DarkGray)
        } else {
            Style::default()
        };

        Line::from(vec![
            Span::raw(format!("{field_name}: ")),
            Span::styled(display, style),
        ])
    }

    /// Return the character count for the requested field.
    pub(crate) fn value_len(&self, field: BookField) -> usize {
        self.value(field).chars().count()
    }
}

/// Snapshot of the book about to be removed, shown in the confirmation modal.
#[derive(Clone)]
pub(crate) struct ConfirmBookDelete {
    pub(crate) id: i64,
    pub(crate) title: String,
}

impl From<Book> for ConfirmBookDelete {
    fn from(book: Book) -> Self {
        Self {
            id: book.id,
            title: book.title,
        }
    }
}
