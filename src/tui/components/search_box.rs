//! # SearchBox Component
//!
//! Single-line query editor shown in the footer while searching.
//!
//! The buffer and cursor are internal state. `mode` decides which action the
//! parent dispatches on submit: a movie search that replaces the browse list,
//! or a multi-search across movies, shows and people.

use ratatui::Frame;
use ratatui::layout::{Position, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::widgets::{Block, Paragraph};
use unicode_width::UnicodeWidthStr;

use crate::tui::component::{Component, EventHandler};
use crate::tui::event::TuiEvent;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchMode {
    Movies,
    Everything,
}

/// High-level events emitted by the SearchBox
#[derive(Debug, Clone, PartialEq)]
pub enum SearchEvent {
    /// Enter pressed with the current query
    Submit(SearchMode, String),
    /// Esc pressed, leave search mode
    Cancel,
    ContentChanged,
}

pub struct SearchBox {
    pub buffer: String,
    pub mode: SearchMode,
    /// Byte offset of the cursor in `buffer`
    cursor: usize,
    /// Greyed out while the user navigates the list
    pub dimmed: bool,
}

impl SearchBox {
    pub fn new() -> Self {
        Self {
            buffer: String::new(),
            mode: SearchMode::Movies,
            cursor: 0,
            dimmed: true,
        }
    }

    /// Starts a fresh query in the given mode.
    pub fn open(&mut self, mode: SearchMode) {
        self.mode = mode;
        self.buffer.clear();
        self.cursor = 0;
        self.dimmed = false;
    }

    fn insert_str(&mut self, text: &str) {
        // Newlines in pasted text would end up in the query string
        let text: String = text.chars().filter(|c| !c.is_control()).collect();
        self.buffer.insert_str(self.cursor, &text);
        self.cursor += text.len();
    }

    fn prev_boundary(&self) -> usize {
        self.buffer[..self.cursor]
            .char_indices()
            .next_back()
            .map(|(i, _)| i)
            .unwrap_or(0)
    }

    fn next_boundary(&self) -> usize {
        self.buffer[self.cursor..]
            .chars()
            .next()
            .map(|c| self.cursor + c.len_utf8())
            .unwrap_or(self.buffer.len())
    }

    fn title(&self) -> &'static str {
        match self.mode {
            SearchMode::Movies => " Search movies ",
            SearchMode::Everything => " Search everything ",
        }
    }
}

impl Default for SearchBox {
    fn default() -> Self {
        Self::new()
    }
}

impl EventHandler for SearchBox {
    type Event = SearchEvent;

    fn handle_event(&mut self, event: &TuiEvent) -> Option<SearchEvent> {
        match event {
            TuiEvent::Submit => Some(SearchEvent::Submit(self.mode, self.buffer.trim().to_string())),
            TuiEvent::Escape => Some(SearchEvent::Cancel),
            TuiEvent::InputChar(c) => {
                self.insert_str(c.encode_utf8(&mut [0; 4]));
                Some(SearchEvent::ContentChanged)
            }
            TuiEvent::Paste(text) => {
                self.insert_str(text);
                Some(SearchEvent::ContentChanged)
            }
            TuiEvent::Backspace => {
                if self.cursor == 0 {
                    return None;
                }
                let start = self.prev_boundary();
                self.buffer.replace_range(start..self.cursor, "");
                self.cursor = start;
                Some(SearchEvent::ContentChanged)
            }
            TuiEvent::CursorLeft => {
                self.cursor = self.prev_boundary();
                None
            }
            TuiEvent::CursorRight => {
                self.cursor = self.next_boundary();
                None
            }
            TuiEvent::Home => {
                self.cursor = 0;
                None
            }
            TuiEvent::End => {
                self.cursor = self.buffer.len();
                None
            }
            _ => None,
        }
    }
}

impl Component for SearchBox {
    fn render(&mut self, frame: &mut Frame, area: Rect) {
        let style = if self.dimmed {
            Style::default().fg(Color::DarkGray)
        } else {
            Style::default()
        };
        let block = Block::bordered()
            .title(self.title())
            .border_style(style.add_modifier(Modifier::DIM));

        // Keep the cursor in view on narrow terminals by scrolling horizontally
        let inner_width = area.width.saturating_sub(2);
        let cursor_col = self.buffer[..self.cursor].width() as u16;
        let scroll = cursor_col.saturating_sub(inner_width.saturating_sub(1));

        let paragraph = Paragraph::new(self.buffer.as_str())
            .style(style)
            .scroll((0, scroll))
            .block(block);
        frame.render_widget(paragraph, area);

        if !self.dimmed {
            frame.set_cursor_position(Position::new(
                area.x + 1 + cursor_col - scroll,
                area.y + 1,
            ));
        }
    }
}
