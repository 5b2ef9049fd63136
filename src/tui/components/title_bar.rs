//! # TitleBar Component
//!
//! Top status bar: the active page, the status message, the favourites count
//! and a spinner while a page is loading.
//!
//! TitleBar is purely presentational. It receives all data as props and has
//! no internal state:
//!
//! ```rust,ignore
//! let mut title_bar = TitleBar::new("Popular".into(), "Loading...".into(), 3, Some(frame));
//! title_bar.render(frame, area);
//! ```
//!
//! 1. **Loading**: `"cinedex | Popular | Loading page 2... ⠙ | ♥ 3"`
//! 2. **Status message**: `"cinedex | Popular | Popular · 40 movies | ♥ 3"`
//! 3. **No status**: `"cinedex | Popular | ♥ 3"`

use crate::tui::component::Component;
use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::{Color, Style};
use ratatui::text::{Line, Span};

const SPINNER: [&str; 10] = ["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"];

/// Top status bar component.
///
/// # Props
///
/// - `page_label`: What is on screen (e.g. "Popular", "Favourites")
/// - `status_message`: Transient status (e.g. "Loading page 2...")
/// - `favourites_count`: Number of favourites
/// - `spinner_frame`: `Some(frame)` while a fetch is in flight
pub struct TitleBar {
    pub page_label: String,
    pub status_message: String,
    pub favourites_count: usize,
    pub spinner_frame: Option<usize>,
}

impl TitleBar {
    pub fn new(
        page_label: String,
        status_message: String,
        favourites_count: usize,
        spinner_frame: Option<usize>,
    ) -> Self {
        Self {
            page_label,
            status_message,
            favourites_count,
            spinner_frame,
        }
    }

    fn text(&self) -> String {
        let mut text = format!("cinedex | {}", self.page_label);
        if !self.status_message.is_empty() {
            text.push_str(" | ");
            text.push_str(&self.status_message);
        }
        if let Some(frame) = self.spinner_frame {
            text.push(' ');
            text.push_str(SPINNER[frame % SPINNER.len()]);
        }
        text
    }
}

impl Component for TitleBar {
    fn render(&mut self, frame: &mut Frame, area: Rect) {
        let line = Line::from(vec![
            Span::raw(self.text()),
            Span::raw(" | "),
            Span::styled(
                format!("♥ {}", self.favourites_count),
                Style::default().fg(Color::Red),
            ),
        ]);
        frame.render_widget(line, area);
    }
}
