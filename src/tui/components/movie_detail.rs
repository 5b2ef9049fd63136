//! # MovieDetail Component
//!
//! The movie page: headline facts, trailer link, wrapped overview, top billed
//! cast and crew, similar titles. Content is laid out as pre-wrapped lines
//! inside a `ScrollView` so the total height is known up front.
//!
//! Up/Down move a cursor over the cast list (Enter or `c` opens that person);
//! PageUp/PageDown and the mouse wheel scroll the page.

use ratatui::Frame;
use ratatui::layout::{Alignment, Position, Rect, Size};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Padding, Paragraph};
use tui_scrollview::{ScrollView, ScrollViewState, ScrollbarVisibility};

use crate::core::state::{MovieBundle, MovieDetailView};
use crate::tui::component::Component;

/// How many cast and crew members the page lists.
pub const TOP_BILLED: usize = 20;

#[derive(Default)]
pub struct MovieDetailState {
    pub scroll: ScrollViewState,
    pub cast_selected: usize,
    /// Set when the cast cursor moved, so the next render scrolls to it
    follow_cast: bool,
}

impl MovieDetailState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn move_cast(&mut self, delta: isize, cast_len: usize) {
        let len = cast_len.min(TOP_BILLED);
        if len == 0 {
            return;
        }
        let target = self.cast_selected as isize + delta;
        self.cast_selected = target.clamp(0, len as isize - 1) as usize;
        self.follow_cast = true;
    }

    /// Person id under the cast cursor.
    pub fn selected_cast_id(&self, view: &MovieDetailView) -> Option<u64> {
        view.bundle
            .as_ref()
            .and_then(|b| b.credits.cast.get(self.cast_selected))
            .map(|c| c.id)
    }
}

pub struct MovieDetail<'a> {
    view: &'a MovieDetailView,
    state: &'a mut MovieDetailState,
    favourite: bool,
}

impl<'a> MovieDetail<'a> {
    pub fn new(view: &'a MovieDetailView, state: &'a mut MovieDetailState, favourite: bool) -> Self {
        Self {
            view,
            state,
            favourite,
        }
    }
}

/// Lines of the page at `width` columns, plus the index of the first cast row.
fn page_lines(
    view: &MovieDetailView,
    bundle: &MovieBundle,
    favourite: bool,
    cast_selected: usize,
    width: u16,
) -> (Vec<Line<'static>>, usize) {
    let heading = Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD);
    let dim = Style::default().fg(Color::DarkGray);
    let details = &bundle.details;
    let mut lines = Vec::new();

    let mut title = vec![Span::styled(
        details.title.clone(),
        Style::default().add_modifier(Modifier::BOLD),
    )];
    if let Some(year) = details.summary().release_year() {
        title.push(Span::raw(format!(" ({year})")));
    }
    if favourite {
        title.push(Span::styled("  ♥", Style::default().fg(Color::Red)));
    }
    lines.push(Line::from(title));

    if let Some(tagline) = &details.tagline {
        lines.push(Line::styled(
            tagline.clone(),
            Style::default().add_modifier(Modifier::ITALIC),
        ));
    }

    let mut facts = vec![format!("★ {:.1} ({} votes)", details.vote_average, details.vote_count)];
    if let Some(runtime) = details.runtime.filter(|r| *r > 0) {
        facts.push(format!("{runtime} min"));
    }
    let genres = details.genre_names();
    if !genres.is_empty() {
        facts.push(genres);
    }
    if let Some(date) = &details.release_date {
        facts.push(format!("Released {date}"));
    }
    lines.push(Line::styled(facts.join(" · "), dim));

    match view.trailer().and_then(|t| t.youtube_url()) {
        Some(url) => lines.push(Line::from(vec![
            Span::raw("Trailer: "),
            Span::styled(url, Style::default().fg(Color::Blue).add_modifier(Modifier::UNDERLINED)),
        ])),
        None => lines.push(Line::styled("No trailer available", dim)),
    }

    lines.push(Line::raw(""));
    lines.push(Line::styled("Overview", heading));
    let overview = details.overview.as_deref().unwrap_or("No overview available.");
    for wrapped in textwrap::wrap(overview, width.max(1) as usize) {
        lines.push(Line::raw(wrapped.into_owned()));
    }

    lines.push(Line::raw(""));
    lines.push(Line::styled("Cast", heading));
    let cast_start = lines.len();
    if bundle.credits.cast.is_empty() {
        lines.push(Line::styled("No cast listed", dim));
    }
    for (i, member) in bundle.credits.cast.iter().take(TOP_BILLED).enumerate() {
        let style = if i == cast_selected {
            Style::default().add_modifier(Modifier::REVERSED)
        } else {
            Style::default()
        };
        let mut spans = vec![Span::styled(member.name.clone(), style)];
        if !member.character.is_empty() {
            spans.push(Span::styled(format!(" as {}", member.character), dim));
        }
        lines.push(Line::from(spans));
    }

    lines.push(Line::raw(""));
    lines.push(Line::styled("Crew", heading));
    if bundle.credits.crew.is_empty() {
        lines.push(Line::styled("No crew listed", dim));
    }
    for member in bundle.credits.crew.iter().take(TOP_BILLED) {
        lines.push(Line::from(vec![
            Span::styled(format!("{}: ", member.job), dim),
            Span::raw(member.name.clone()),
        ]));
    }

    lines.push(Line::raw(""));
    lines.push(Line::styled("Similar titles", heading));
    if bundle.similar.is_empty() {
        lines.push(Line::styled("Nothing similar found", dim));
    }
    for movie in &bundle.similar {
        let year = movie
            .release_year()
            .map(|y| format!(" ({y})"))
            .unwrap_or_default();
        lines.push(Line::raw(format!("• {}{}", movie.title, year)));
    }

    (lines, cast_start)
}

impl Component for MovieDetail<'_> {
    fn render(&mut self, frame: &mut Frame, area: Rect) {
        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::DarkGray))
            .title(" Movie ")
            .title_bottom(Line::from(" f Favourite  ↑↓ Cast  Enter Person  Esc Back ").centered())
            .padding(Padding::horizontal(1));
        let inner = block.inner(area);

        let Some(bundle) = &self.view.bundle else {
            let (text, style) = match &self.view.error {
                Some(error) => (format!("{error}. Press Esc to go back."), Style::default().fg(Color::Red)),
                None => ("Loading...".to_string(), Style::default().fg(Color::DarkGray)),
            };
            frame.render_widget(
                Paragraph::new(text).style(style).alignment(Alignment::Center).block(block),
                area,
            );
            return;
        };
        frame.render_widget(block, area);

        // One column for the scrollbar
        let content_width = inner.width.saturating_sub(1);
        let (lines, cast_start) = page_lines(
            self.view,
            bundle,
            self.favourite,
            self.state.cast_selected,
            content_width,
        );
        let total_height = lines.len() as u16;

        if self.state.follow_cast {
            self.state.follow_cast = false;
            let line = (cast_start + self.state.cast_selected) as u16;
            let offset = self.state.scroll.offset();
            if line < offset.y {
                self.state.scroll.set_offset(Position::new(0, line));
            } else if line >= offset.y + inner.height {
                self.state
                    .scroll
                    .set_offset(Position::new(0, line + 1 - inner.height));
            }
        }

        let mut scroll_view = ScrollView::new(Size::new(content_width, total_height))
            .vertical_scrollbar_visibility(ScrollbarVisibility::Automatic)
            .horizontal_scrollbar_visibility(ScrollbarVisibility::Never);
        scroll_view.render_widget(
            Paragraph::new(lines),
            Rect::new(0, 0, content_width, total_height),
        );
        frame.render_stateful_widget(scroll_view, inner, &mut self.state.scroll);
    }
}
