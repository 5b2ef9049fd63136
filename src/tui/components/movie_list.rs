//! # MovieList Component
//!
//! Scrollable list of movies (or search hits) with a selection cursor and a
//! heart marker on favourites.
//!
//! Follows the persistent state + transient wrapper pattern:
//! - `MovieListState` lives in `TuiState`
//! - `MovieList` is created each frame with borrowed rows and state

use ratatui::Frame;
use ratatui::layout::{Alignment, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, List, ListItem, ListState, Padding, Paragraph};
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

use crate::tui::component::Component;

/// Rows left below the selection at which the next page is requested.
pub const LOAD_MORE_THRESHOLD: usize = 3;

/// One line of the list, already resolved from core data.
#[derive(Debug, Clone, PartialEq)]
pub struct ListRow {
    pub title: String,
    /// Right-aligned detail: release year, "person", "tv"...
    pub detail: String,
    pub favourite: bool,
}

/// Selection state that survives between frames.
#[derive(Debug, Default)]
pub struct MovieListState {
    pub selected: usize,
    pub list_state: ListState,
}

impl MovieListState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Moves the selection by `delta` rows, clamped to the list.
    pub fn move_by(&mut self, delta: isize, len: usize) {
        if len == 0 {
            self.selected = 0;
            return;
        }
        let target = self.selected as isize + delta;
        self.selected = target.clamp(0, len as isize - 1) as usize;
    }

    pub fn select_first(&mut self) {
        self.selected = 0;
    }

    pub fn select_last(&mut self, len: usize) {
        self.selected = len.saturating_sub(1);
    }

    /// Keeps the selection valid after the list shrank (e.g. an unfavourite).
    pub fn clamp(&mut self, len: usize) {
        self.selected = self.selected.min(len.saturating_sub(1));
    }

    /// Whether the selection is close enough to the end to load more.
    pub fn near_end(&self, len: usize) -> bool {
        len > 0 && len.saturating_sub(self.selected + 1) <= LOAD_MORE_THRESHOLD
    }
}

/// Transient render wrapper for the list.
pub struct MovieList<'a> {
    rows: &'a [ListRow],
    state: &'a mut MovieListState,
    title: String,
    empty_message: &'a str,
    footer: Option<&'a str>,
}

impl<'a> MovieList<'a> {
    pub fn new(rows: &'a [ListRow], state: &'a mut MovieListState, title: String) -> Self {
        Self {
            rows,
            state,
            title,
            empty_message: "Nothing here yet.",
            footer: None,
        }
    }

    pub fn empty_message(mut self, message: &'a str) -> Self {
        self.empty_message = message;
        self
    }

    /// Text shown under the last row, e.g. "Loading more..."
    pub fn footer(mut self, footer: Option<&'a str>) -> Self {
        self.footer = footer;
        self
    }
}

impl Component for MovieList<'_> {
    fn render(&mut self, frame: &mut Frame, area: Rect) {
        let mut block = Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::DarkGray))
            .title(format!(" {} ", self.title))
            .padding(Padding::horizontal(1));
        if let Some(footer) = self.footer {
            block = block.title_bottom(Line::from(format!(" {footer} ")).centered());
        }

        if self.rows.is_empty() {
            let empty = Paragraph::new(self.empty_message)
                .style(Style::default().fg(Color::DarkGray))
                .alignment(Alignment::Center)
                .block(block);
            frame.render_widget(empty, area);
            return;
        }

        self.state.clamp(self.rows.len());
        self.state.list_state.select(Some(self.state.selected));

        // borders + padding
        let inner_width = area.width.saturating_sub(4) as usize;
        let items: Vec<ListItem> = self
            .rows
            .iter()
            .enumerate()
            .map(|(i, row)| {
                let marker = if row.favourite { "♥ " } else { "  " };
                let fixed = marker.width() + 1 + row.detail.width();
                let title_width = inner_width.saturating_sub(fixed);
                let title = truncate_to_width(&row.title, title_width);
                let padding = title_width.saturating_sub(title.width());

                let style = if i == self.state.selected {
                    Style::default()
                        .fg(Color::White)
                        .add_modifier(Modifier::BOLD | Modifier::REVERSED)
                } else {
                    Style::default().fg(Color::Gray)
                };

                ListItem::new(Line::from(vec![
                    Span::styled(marker, style.fg(Color::Red)),
                    Span::styled(title, style),
                    Span::styled(" ".repeat(padding + 1), style),
                    Span::styled(row.detail.clone(), style.add_modifier(Modifier::DIM)),
                ]))
            })
            .collect();

        let list = List::new(items).block(block);
        frame.render_stateful_widget(list, area, &mut self.state.list_state);
    }
}

/// Cuts `s` to at most `max_width` terminal columns, ending in "…" when cut.
pub fn truncate_to_width(s: &str, max_width: usize) -> String {
    if s.width() <= max_width {
        return s.to_string();
    }
    if max_width == 0 {
        return String::new();
    }
    let mut out = String::new();
    let mut used = 0;
    for c in s.chars() {
        let w = c.width().unwrap_or(0);
        if used + w > max_width - 1 {
            break;
        }
        out.push(c);
        used += w;
    }
    out.push('…');
    out
}
