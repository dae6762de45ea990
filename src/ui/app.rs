use std::mem;

use anyhow::Result;
use crossterm::event::KeyCode;
use open::that as open_link;
use ratatui::layout::{Alignment, Constraint, Direction, Layout, Rect};
use ratatui::prelude::*;
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, List, ListItem, ListState, Paragraph, Wrap};
use ratatui::Frame;
use rusqlite::Connection;

use crate::db::{create_book, delete_book, fetch_books, update_book};
use crate::models::Book;

use super::forms::{BookField, BookForm, ConfirmBookDelete};
use super::helpers::{centered_rect, clip_text, surface_error};

/// Footer space reserved for status messages and instructions.
const FOOTER_HEIGHT: u16 = 3;

/// Fine-grained interaction modes layered over the book list. Keeping this
/// explicit makes it easy to reason about which rendering path runs and what
/// keyboard shortcuts should do.
enum Mode {
    Normal,
    AddingBook(BookForm),
    EditingBook { id: i64, form: BookForm },
    ConfirmDelete(ConfirmBookDelete),
}

/// Holds the footer message text plus its severity.
struct StatusMessage {
    text: String,
    kind: StatusKind,
}

/// Severity levels shown in the footer.
enum StatusKind {
    Info,
    Error,
}

impl StatusKind {
    fn style(&self) -> Style {
        match self {
            StatusKind::Info => Style::default().fg(Color::Green),
            StatusKind::Error => Style::default().fg(Color::Red),
        }
    }
}

/// Central application state shared across the TUI. The `books` vector is a
/// disposable display cache: the database stays the source of truth and the
/// cache is rebuilt wholesale after every successful mutation.
pub struct App {
    conn: Connection,
    books: Vec<Book>,
    selected: usize,
    mode: Mode,
    status: Option<StatusMessage>,
}

impl App {
    pub fn new(conn: Connection, books: Vec<Book>) -> Self {
        Self {
            conn,
            books,
            selected: 0,
            mode: Mode::Normal,
            status: None,
        }
    }

    pub fn handle_key(&mut self, code: KeyCode) -> Result<bool> {
        let mut exit = false;
        let mut mode = mem::replace(&mut self.mode, Mode::Normal);

        mode = match mode {
            Mode::Normal => self.handle_normal_key(code, &mut exit)?,
            Mode::AddingBook(form) => self.handle_add_book(code, form)?,
            Mode::EditingBook { id, form } => self.handle_edit_book(code, id, form)?,
            Mode::ConfirmDelete(confirm) => self.handle_confirm_delete(code, confirm)?,
        };

        self.mode = mode;
        Ok(exit)
    }

    fn handle_normal_key(&mut self, code: KeyCode, exit: &mut bool) -> Result<Mode> {
        match code {
            KeyCode::Char('q') | KeyCode::Esc => {
                *exit = true;
            }
            KeyCode::Up => self.move_selection(-1),
            KeyCode::Down => self.move_selection(1),
            KeyCode::Char('+') | KeyCode::Char('a') => {
                self.clear_status();
                return Ok(Mode::AddingBook(BookForm::default()));
            }
            KeyCode::Char('e') | KeyCode::Char('E') => {
                if let Some(book) = self.current_book().cloned() {
                    self.clear_status();
                    return Ok(Mode::EditingBook {
                        id: book.id,
                        form: BookForm::from_book(&book),
                    });
                } else {
                    self.set_status("No book selected to edit.", StatusKind::Error);
                }
            }
            KeyCode::Char('-') | KeyCode::Char('d') | KeyCode::Delete => {
                if let Some(book) = self.current_book().cloned() {
                    self.clear_status();
                    return Ok(Mode::ConfirmDelete(ConfirmBookDelete::from(book)));
                } else {
                    self.set_status("No book selected to delete.", StatusKind::Error);
                }
            }
            KeyCode::Char('o') | KeyCode::Char('O') => self.open_selected_image(),
            _ => {}
        }
        Ok(Mode::Normal)
    }

    fn handle_add_book(&mut self, code: KeyCode, mut form: BookForm) -> Result<Mode> {
        let mut keep_open = true;
        match code {
            KeyCode::Esc => {
                self.set_status("Add book cancelled.", StatusKind::Info);
                keep_open = false;
            }
            KeyCode::Tab => form.next_field(),
            KeyCode::BackTab => form.prev_field(),
            KeyCode::Backspace => form.backspace(),
            KeyCode::Enter => match self.save_new_book(&form) {
                Ok(_) => keep_open = false,
                Err(err) => {
                    let message = surface_error(&err);
                    form.error = Some(message.clone());
                    self.set_status(message, StatusKind::Error);
                }
            },
            KeyCode::Char(ch) => {
                if form.push_char(ch) {
                    form.error = None;
                }
            }
            _ => {}
        }

        if keep_open {
            Ok(Mode::AddingBook(form))
        } else {
            Ok(Mode::Normal)
        }
    }

    fn handle_edit_book(&mut self, code: KeyCode, id: i64, mut form: BookForm) -> Result<Mode> {
        let mut keep_open = true;
        match code {
            KeyCode::Esc => {
                self.set_status("Edit cancelled.", StatusKind::Info);
                keep_open = false;
            }
            KeyCode::Tab => form.next_field(),
            KeyCode::BackTab => form.prev_field(),
            KeyCode::Backspace => form.backspace(),
            KeyCode::Enter => match self.save_existing_book(id, &form) {
                Ok(_) => keep_open = false,
                Err(err) => {
                    let message = surface_error(&err);
                    form.error = Some(message.clone());
                    self.set_status(message, StatusKind::Error);
                }
            },
            KeyCode::Char(ch) => {
                if form.push_char(ch) {
                    form.error = None;
                }
            }
            _ => {}
        }

        if keep_open {
            Ok(Mode::EditingBook { id, form })
        } else {
            Ok(Mode::Normal)
        }
    }

    fn handle_confirm_delete(&mut self, code: KeyCode, confirm: ConfirmBookDelete) -> Result<Mode> {
        match code {
            KeyCode::Esc | KeyCode::Char('n') | KeyCode::Char('N') => {
                self.set_status("Deletion cancelled.", StatusKind::Info);
                Ok(Mode::Normal)
            }
            KeyCode::Enter | KeyCode::Char('y') | KeyCode::Char('Y') => {
                match self.perform_delete(&confirm) {
                    Ok(_) => Ok(Mode::Normal),
                    Err(err) => {
                        let message = surface_error(&err);
                        self.set_status(message, StatusKind::Error);
                        Ok(Mode::ConfirmDelete(confirm))
                    }
                }
            }
            _ => Ok(Mode::ConfirmDelete(confirm)),
        }
    }

    /// Validate the form and insert a new book. Validation happens before any
    /// store call, so a rejected submit leaves the database untouched.
    fn save_new_book(&mut self, form: &BookForm) -> Result<()> {
        let (title, description, image) = form.parse_inputs()?;
        let book = create_book(&self.conn, &title, &description, &image)?;
        self.reload_books(Some(book.id))?;
        self.set_status(format!("Added \"{}\".", book.title), StatusKind::Info);
        Ok(())
    }

    /// Validate the form and replace every field of an existing book.
    fn save_existing_book(&mut self, id: i64, form: &BookForm) -> Result<()> {
        let (title, description, image) = form.parse_inputs()?;
        update_book(&self.conn, id, &title, &description, &image)?;
        self.reload_books(Some(id))?;
        self.set_status(format!("Updated \"{title}\"."), StatusKind::Info);
        Ok(())
    }

    fn perform_delete(&mut self, confirm: &ConfirmBookDelete) -> Result<()> {
        delete_book(&self.conn, confirm.id)?;
        self.reload_books(None)?;
        self.set_status(format!("Deleted \"{}\".", confirm.title), StatusKind::Info);
        Ok(())
    }

    /// Discard the display cache and refetch the complete book set. When a
    /// mutation touched a specific book we re-seat the selection on it;
    /// otherwise the selection is clamped to the shrunken list.
    fn reload_books(&mut self, focus: Option<i64>) -> Result<()> {
        self.books = fetch_books(&self.conn)?;
        self.selected = match focus {
            Some(id) => self
                .books
                .iter()
                .position(|book| book.id == id)
                .unwrap_or(0),
            None => self.selected.min(self.books.len().saturating_sub(1)),
        };
        Ok(())
    }

    fn open_selected_image(&mut self) {
        let Some(book) = self.current_book() else {
            self.set_status("No book selected.", StatusKind::Error);
            return;
        };
        let Some(url) = book.image_url().map(str::to_string) else {
            self.set_status("This book has no image link.", StatusKind::Error);
            return;
        };
        match open_link(&url) {
            Ok(_) => self.set_status("Opened image link.", StatusKind::Info),
            Err(_) => self.set_status("Failed to open image link.", StatusKind::Error),
        }
    }

    fn move_selection(&mut self, delta: i64) {
        if self.books.is_empty() {
            return;
        }
        let last = self.books.len() as i64 - 1;
        let next = (self.selected as i64 + delta).clamp(0, last);
        self.selected = next as usize;
    }

    fn current_book(&self) -> Option<&Book> {
        self.books.get(self.selected)
    }

    fn set_status<S: Into<String>>(&mut self, text: S, kind: StatusKind) {
        self.status = Some(StatusMessage {
            text: text.into(),
            kind,
        });
    }

    fn clear_status(&mut self) {
        self.status = None;
    }

    pub(crate) fn draw(&self, frame: &mut Frame) {
        let area = frame.area();
        let footer_height = FOOTER_HEIGHT.min(area.height);

        let (content_area, footer_area) = if area.height > footer_height {
            let chunks = Layout::default()
                .direction(Direction::Vertical)
                .constraints([Constraint::Min(0), Constraint::Length(footer_height)])
                .split(area);
            (chunks[0], chunks[1])
        } else {
            (area, area)
        };

        self.draw_book_list(frame, content_area);

        if area.height >= footer_height {
            self.draw_footer(frame, footer_area);
        }

        match &self.mode {
            Mode::AddingBook(form) => self.draw_book_form(frame, area, "Add Book", form),
            Mode::EditingBook { form, .. } => self.draw_book_form(frame, area, "Edit Book", form),
            Mode::ConfirmDelete(confirm) => self.draw_confirm_delete(frame, area, confirm),
            Mode::Normal => {}
        }
    }

    fn draw_book_list(&self, frame: &mut Frame, area: Rect) {
        let block = Block::default()
            .borders(Borders::ALL)
            .title(format!("My Library ({} books)", self.books.len()));

        if self.books.is_empty() {
            let message = Paragraph::new(vec![
                Line::from(""),
                Line::from("Your library is empty."),
                Line::from("Press '+' to add a book."),
            ])
            .alignment(Alignment::Center)
            .block(block);
            frame.render_widget(message, area);
            return;
        }

        let preview_width = area.width.saturating_sub(4) as usize;
        let items: Vec<ListItem> = self
            .books
            .iter()
            .map(|book| {
                let mut title_spans = vec![Span::styled(
                    book.to_string(),
                    Style::default().add_modifier(Modifier::BOLD),
                )];
                if book.image_url().is_some() {
                    title_spans.push(Span::styled(
                        "  [image]",
                        Style::default().fg(Color::Blue),
                    ));
                }
                ListItem::new(vec![
                    Line::from(title_spans),
                    Line::from(Span::styled(
                        clip_text(&book.description, preview_width),
                        Style::default().fg(Color::DarkGray),
                    )),
                    Line::from(""),
                ])
            })
            .collect();

        let list = List::new(items)
            .block(block)
            .highlight_style(Style::default().fg(Color::Yellow))
            .highlight_symbol("> ");

        let mut state = ListState::default();
        state.select(Some(self.selected));
        frame.render_stateful_widget(list, area, &mut state);
    }

    fn draw_footer(&self, frame: &mut Frame, area: Rect) {
        let block = Block::default().borders(Borders::TOP);
        frame.render_widget(block.clone(), area);
        let inner = block.inner(area);

        let status_line = if let Some(status) = &self.status {
            Line::from(vec![Span::styled(status.text.clone(), status.kind.style())])
        } else {
            Line::from("")
        };

        let instructions = self.footer_instructions();

        let paragraph = Paragraph::new(vec![status_line, instructions]).wrap(Wrap { trim: true });
        frame.render_widget(paragraph, inner);
    }

    fn footer_instructions(&self) -> Line<'static> {
        let text = match self.mode {
            Mode::Normal => {
                "Up/Down select | + add | e edit | - delete | o open image | q quit"
            }
            Mode::AddingBook(_) | Mode::EditingBook { .. } => {
                "Enter save | Tab switch field | Esc cancel"
            }
            Mode::ConfirmDelete(_) => "Y confirm | N / Esc cancel",
        };
        Line::from(Span::styled(text, Style::default().fg(Color::Gray)))
    }

    fn draw_book_form(&self, frame: &mut Frame, area: Rect, title: &str, form: &BookForm) {
        let popup_area = centered_rect(70, 50, area);
        frame.render_widget(Clear, popup_area);

        let block = Block::default().title(title).borders(Borders::ALL);
        frame.render_widget(block.clone(), popup_area);
        let inner = block.inner(popup_area);

        let title_line = form.build_line("Title", BookField::Title);
        let description_line = form.build_line("Description", BookField::Description);
        let image_line = form.build_line("Image URL", BookField::Image);

        let mut lines = vec![title_line, description_line, image_line, Line::from("")];

        if let Some(error) = &form.error {
            lines.push(Line::from(Span::styled(
                error.clone(),
                Style::default().fg(Color::Red),
            )));
        } else {
            lines.push(Line::from(Span::styled(
                "Enter to save | Tab to switch | Esc to cancel",
                Style::default().fg(Color::Gray),
            )));
        }

        let paragraph = Paragraph::new(lines).wrap(Wrap { trim: true });
        frame.render_widget(paragraph, inner);

        let (prefix, row) = match form.active {
            BookField::Title => ("Title: ", 0),
            BookField::Description => ("Description: ", 1),
            BookField::Image => ("Image URL: ", 2),
        };
        // Long values wrap inside the paragraph; keep the cursor pinned to the
        // popup instead of letting it walk past the border.
        let cursor_x = (inner.x + prefix.len() as u16 + form.value_len(form.active) as u16)
            .min(inner.right().saturating_sub(1));
        frame.set_cursor_position((cursor_x, inner.y + row));
    }

    fn draw_confirm_delete(&self, frame: &mut Frame, area: Rect, confirm: &ConfirmBookDelete) {
        let popup_area = centered_rect(60, 30, area);
        frame.render_widget(Clear, popup_area);

        let block = Block::default()
            .title("Confirm Removal")
            .borders(Borders::ALL);
        frame.render_widget(block.clone(), popup_area);
        let inner = block.inner(popup_area);

        let lines = vec![
            Line::from(format!("Delete \"{}\"?", confirm.title)),
            Line::from("This cannot be undone."),
            Line::from(""),
            Line::from(Span::styled(
                "Press Y to confirm or N / Esc to cancel.",
                Style::default().fg(Color::Gray),
            )),
        ];

        let paragraph = Paragraph::new(lines)
            .alignment(Alignment::Left)
            .wrap(Wrap { trim: true });
        frame.render_widget(paragraph, inner);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::create_tables;

    fn test_app() -> App {
        let conn = Connection::open_in_memory().unwrap();
        create_tables(&conn).unwrap();
        let books = fetch_books(&conn).unwrap();
        App::new(conn, books)
    }

    fn type_str(app: &mut App, text: &str) {
        for ch in text.chars() {
            app.handle_key(KeyCode::Char(ch)).unwrap();
        }
    }

    fn stored_books(app: &App) -> Vec<Book> {
        fetch_books(&app.conn).unwrap()
    }

    #[test]
    fn add_flow_creates_book_and_refreshes_cache() {
        let mut app = test_app();

        app.handle_key(KeyCode::Char('+')).unwrap();
        assert!(matches!(app.mode, Mode::AddingBook(_)));

        type_str(&mut app, "Dune");
        app.handle_key(KeyCode::Tab).unwrap();
        type_str(&mut app, "A desert planet saga");
        app.handle_key(KeyCode::Enter).unwrap();

        assert!(matches!(app.mode, Mode::Normal));
        assert_eq!(app.books.len(), 1);
        assert_eq!(app.books[0].title, "Dune");
        assert_eq!(stored_books(&app), app.books);
    }

    #[test]
    fn blank_submit_is_rejected_without_store_call() {
        let mut app = test_app();

        app.handle_key(KeyCode::Char('+')).unwrap();
        type_str(&mut app, "   ");
        app.handle_key(KeyCode::Enter).unwrap();

        // Still composing, error surfaced, nothing persisted.
        match &app.mode {
            Mode::AddingBook(form) => assert!(form.error.is_some()),
            _ => panic!("expected the form to stay open"),
        }
        assert!(stored_books(&app).is_empty());
        assert!(app.books.is_empty());
    }

    #[test]
    fn cancelling_the_form_leaves_store_unchanged() {
        let mut app = test_app();

        app.handle_key(KeyCode::Char('+')).unwrap();
        type_str(&mut app, "Dune");
        app.handle_key(KeyCode::Esc).unwrap();

        assert!(matches!(app.mode, Mode::Normal));
        assert!(stored_books(&app).is_empty());
    }

    #[test]
    fn edit_flow_updates_fields_wholesale() {
        let mut app = test_app();
        let book = create_book(&app.conn, "Dune", "A desert planet saga", "").unwrap();
        app.reload_books(Some(book.id)).unwrap();

        app.handle_key(KeyCode::Char('e')).unwrap();
        // Form is pre-populated; extend the title and set an image URL.
        type_str(&mut app, " (revised)");
        app.handle_key(KeyCode::BackTab).unwrap();
        type_str(&mut app, "https://covers.example/dune.jpg");
        app.handle_key(KeyCode::Enter).unwrap();

        assert!(matches!(app.mode, Mode::Normal));
        let books = stored_books(&app);
        assert_eq!(books.len(), 1);
        assert_eq!(books[0].id, book.id);
        assert_eq!(books[0].title, "Dune (revised)");
        assert_eq!(books[0].image, "https://covers.example/dune.jpg");
    }

    #[test]
    fn delete_flow_requires_confirmation() {
        let mut app = test_app();
        let book = create_book(&app.conn, "Dune", "A desert planet saga", "").unwrap();
        app.reload_books(Some(book.id)).unwrap();

        app.handle_key(KeyCode::Char('-')).unwrap();
        assert!(matches!(app.mode, Mode::ConfirmDelete(_)));
        app.handle_key(KeyCode::Char('n')).unwrap();
        assert_eq!(stored_books(&app).len(), 1);

        app.handle_key(KeyCode::Char('-')).unwrap();
        app.handle_key(KeyCode::Char('y')).unwrap();
        assert!(stored_books(&app).is_empty());
        assert!(app.books.is_empty());
    }

    #[test]
    fn store_failure_keeps_edit_form_open() {
        let mut app = test_app();
        let book = create_book(&app.conn, "Dune", "A desert planet saga", "").unwrap();
        app.reload_books(Some(book.id)).unwrap();

        app.handle_key(KeyCode::Char('e')).unwrap();
        // Another writer removes the row while the form is open.
        delete_book(&app.conn, book.id).unwrap();
        app.handle_key(KeyCode::Enter).unwrap();

        match &app.mode {
            Mode::EditingBook { form, .. } => {
                assert_eq!(form.error.as_deref(), Some("Book not found"));
            }
            _ => panic!("expected the form to stay open after a store failure"),
        }
        // The cache is only refreshed on success, so it still shows the
        // snapshot from before the failure.
        assert_eq!(app.books.len(), 1);
        assert!(matches!(
            &app.status,
            Some(StatusMessage {
                kind: StatusKind::Error,
                ..
            })
        ));
    }

    #[test]
    fn failed_delete_keeps_cache_intact() {
        let mut app = test_app();
        let book = create_book(&app.conn, "Dune", "A desert planet saga", "").unwrap();
        app.reload_books(Some(book.id)).unwrap();

        app.handle_key(KeyCode::Char('-')).unwrap();
        delete_book(&app.conn, book.id).unwrap();
        app.handle_key(KeyCode::Char('y')).unwrap();

        assert!(matches!(app.mode, Mode::ConfirmDelete(_)));
        assert_eq!(app.books.len(), 1);
        assert!(matches!(
            &app.status,
            Some(StatusMessage {
                kind: StatusKind::Error,
                ..
            })
        ));
    }

    #[test]
    fn edit_with_no_books_surfaces_an_error() {
        let mut app = test_app();

        app.handle_key(KeyCode::Char('e')).unwrap();

        assert!(matches!(app.mode, Mode::Normal));
        assert!(matches!(
            &app.status,
            Some(StatusMessage {
                kind: StatusKind::Error,
                ..
            })
        ));
    }

    #[test]
    fn selection_follows_the_touched_book_after_refresh() {
        let mut app = test_app();
        create_book(&app.conn, "Dune", "A desert planet saga", "").unwrap();
        let second = create_book(&app.conn, "Hyperion", "Pilgrims tell their tales", "").unwrap();
        app.reload_books(Some(second.id)).unwrap();

        assert_eq!(app.selected, 1);

        app.handle_key(KeyCode::Char('-')).unwrap();
        app.handle_key(KeyCode::Enter).unwrap();

        // Selection clamps back onto the remaining book.
        assert_eq!(app.books.len(), 1);
        assert_eq!(app.selected, 0);
    }

    #[test]
    fn quit_key_requests_exit() {
        let mut app = test_app();
        assert!(app.handle_key(KeyCode::Char('q')).unwrap());
    }
}
