//! # PersonDetail Component
//!
//! Header with a person's facts and a clipped biography, and their movies in
//! a `MovieList` below it.

use ratatui::Frame;
use ratatui::layout::{Alignment, Constraint, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::Line;
use ratatui::widgets::{Block, Borders, Padding, Paragraph};

use crate::catalog::Person;
use crate::core::state::PersonView;
use crate::tui::component::Component;
use crate::tui::components::movie_list::{ListRow, MovieList, MovieListState};

/// Biography lines shown before clipping.
const BIO_LINES: usize = 6;

pub struct PersonDetail<'a> {
    view: &'a PersonView,
    rows: &'a [ListRow],
    list: &'a mut MovieListState,
}

impl<'a> PersonDetail<'a> {
    pub fn new(view: &'a PersonView, rows: &'a [ListRow], list: &'a mut MovieListState) -> Self {
        Self { view, rows, list }
    }
}

fn header_lines(person: &Person, width: u16) -> Vec<Line<'static>> {
    let dim = Style::default().fg(Color::DarkGray);
    let mut lines = vec![Line::styled(
        person.name.clone(),
        Style::default().add_modifier(Modifier::BOLD),
    )];

    let mut facts = Vec::new();
    if let Some(department) = &person.known_for_department {
        facts.push(format!("Known for {department}"));
    }
    if let Some(birthday) = &person.birthday {
        facts.push(format!("Born {birthday}"));
    }
    if let Some(place) = &person.place_of_birth {
        facts.push(place.clone());
    }
    facts.push(person.gender_label().to_string());
    lines.push(Line::styled(facts.join(" · "), dim));

    let biography = person.biography.as_deref().unwrap_or("No biography available.");
    let wrapped = textwrap::wrap(biography, width.max(1) as usize);
    let clipped = wrapped.len() > BIO_LINES;
    for (i, line) in wrapped.into_iter().take(BIO_LINES).enumerate() {
        if clipped && i == BIO_LINES - 1 {
            lines.push(Line::raw(format!("{line}…")));
        } else {
            lines.push(Line::raw(line.into_owned()));
        }
    }
    lines
}

impl Component for PersonDetail<'_> {
    fn render(&mut self, frame: &mut Frame, area: Rect) {
        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::DarkGray))
            .title(" Person ")
            .padding(Padding::horizontal(1));

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

        let inner_width = block.inner(area).width;
        let header = header_lines(&bundle.person, inner_width);
        let header_height = header.len() as u16 + 2;
        let [header_area, list_area] =
            Layout::vertical([Constraint::Length(header_height), Constraint::Min(0)]).areas(area);

        frame.render_widget(Paragraph::new(header).block(block), header_area);
        MovieList::new(self.rows, self.list, format!("Movies with {}", bundle.person.name))
            .empty_message("No movie credits.")
            .render(frame, list_area);
    }
}
