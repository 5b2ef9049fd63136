//! # GenreBar Component
//!
//! One-line strip of genres with the active one highlighted. Stateless; the
//! cycling logic lives in `next_genre` so the event loop can use it.

use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};

use crate::catalog::Genre;
use crate::core::aggregator::BrowseContext;
use crate::tui::component::Component;

pub struct GenreBar<'a> {
    pub genres: &'a [Genre],
    pub context: &'a BrowseContext,
}

impl<'a> GenreBar<'a> {
    pub fn new(genres: &'a [Genre], context: &'a BrowseContext) -> Self {
        Self { genres, context }
    }

    fn spans(&self) -> Vec<Span<'a>> {
        let active = Style::default()
            .fg(Color::Yellow)
            .add_modifier(Modifier::BOLD | Modifier::REVERSED);
        let inactive = Style::default().fg(Color::Gray);

        let popular_style = if matches!(self.context, BrowseContext::Popular) {
            active
        } else {
            inactive
        };
        let mut spans = vec![Span::styled(" Popular ", popular_style)];
        for genre in self.genres {
            let style = if *self.context == BrowseContext::Genre(genre.id) {
                active
            } else {
                inactive
            };
            spans.push(Span::raw(" "));
            spans.push(Span::styled(format!(" {} ", genre.name), style));
        }
        spans
    }
}

impl Component for GenreBar<'_> {
    fn render(&mut self, frame: &mut Frame, area: Rect) {
        let spans = self.spans();

        // Scroll so the highlighted genre stays on screen
        let mut offset = 0usize;
        let mut seen = 0usize;
        for span in &spans {
            let width = span.width();
            if span.style.add_modifier.contains(Modifier::REVERSED) {
                if seen + width > area.width as usize {
                    offset = seen + width - area.width as usize;
                }
                break;
            }
            seen += width;
        }
        let line = Line::from(spans);
        frame.render_widget(
            ratatui::widgets::Paragraph::new(line).scroll((0, offset as u16)),
            area,
        );
    }
}

/// The genre `g` (forward) or `G` (backward) switches to from `context`.
///
/// Popular sits before the first genre, so cycling wraps through it.
pub fn next_genre(genres: &[Genre], context: &BrowseContext, forward: bool) -> BrowseContext {
    if genres.is_empty() {
        return BrowseContext::Popular;
    }
    let current = match context {
        BrowseContext::Genre(id) => genres.iter().position(|g| g.id == *id),
        _ => None,
    };
    // Slot 0 is Popular, slots 1..=len are genres
    let slots = genres.len() + 1;
    let slot = current.map(|i| i + 1).unwrap_or(0);
    let next = if forward {
        (slot + 1) % slots
    } else {
        (slot + slots - 1) % slots
    };
    match next {
        0 => BrowseContext::Popular,
        n => BrowseContext::Genre(genres[n - 1].id),
    }
}
