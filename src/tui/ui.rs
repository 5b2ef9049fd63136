use crate::catalog::SearchHit;
use crate::core::state::{App, View};
use crate::tui::component::Component;
use crate::tui::components::{
    GenreBar, ListRow, MovieDetail, MovieList, PersonDetail, TitleBar,
};
use crate::tui::{InputMode, TuiState};

use ratatui::Frame;
use ratatui::layout::{Alignment, Constraint, Layout, Rect};
use ratatui::style::{Color, Style};
use ratatui::widgets::{Block, Paragraph};

pub fn draw_ui(frame: &mut Frame, app: &App, tui: &mut TuiState, spinner_frame: usize) {
    use Constraint::{Length, Min};
    let error_height = if app.error.is_some() { 3 } else { 0 };
    let layout = Layout::vertical([Length(1), Length(1), Min(0), Length(error_height), Length(3)]);
    let [title_area, genre_area, main_area, error_area, footer_area] = layout.areas(frame.area());

    let busy = app.browse.is_fetching()
        || app.detail.as_ref().is_some_and(|d| d.bundle.is_none() && d.error.is_none())
        || app.person.as_ref().is_some_and(|p| p.bundle.is_none() && p.error.is_none())
        || app.search_hits.as_ref().is_some_and(|s| s.hits.is_none() && s.error.is_none());

    TitleBar::new(
        page_label(app),
        app.status_message.clone(),
        app.favourites.len(),
        busy.then_some(spinner_frame),
    )
    .render(frame, title_area);

    GenreBar::new(&app.genres, app.browse.context()).render(frame, genre_area);

    draw_main(frame, main_area, app, tui);

    if let Some(error) = &app.error {
        draw_error_banner(frame, error_area, error);
    }

    match tui.input_mode {
        InputMode::Search => {
            tui.search_box.dimmed = false;
            tui.search_box.render(frame, footer_area);
        }
        InputMode::Navigate => draw_help(frame, footer_area, app.view, tui.confirm_clear),
    }
}

fn draw_main(frame: &mut Frame, area: Rect, app: &App, tui: &mut TuiState) {
    let rows = list_rows(app);
    match app.view {
        View::Browse => {
            let empty = if app.browse.is_fetching() {
                "Loading..."
            } else {
                "No movies found."
            };
            let footer = if app.browse.current_results().is_empty() {
                None
            } else if app.browse.is_fetching() {
                Some("Loading more...")
            } else if !app.browse.has_more() {
                Some("End of results")
            } else {
                None
            };
            MovieList::new(&rows, &mut tui.movie_list, app.context_label())
                .empty_message(empty)
                .footer(footer)
                .render(frame, area);
        }
        View::Favourites => {
            MovieList::new(
                &rows,
                &mut tui.movie_list,
                format!("Favourites ({})", app.favourites.len()),
            )
            .empty_message("No favourites yet. Press f on a movie to add it.")
            .render(frame, area);
        }
        View::SearchHits => {
            let (title, empty) = match &app.search_hits {
                Some(view) => {
                    let empty = match (&view.hits, &view.error) {
                        (_, Some(error)) => error.as_str(),
                        (None, None) => "Searching...",
                        (Some(_), None) => "No results.",
                    };
                    (format!("Everything matching \"{}\"", view.query), empty)
                }
                None => ("Search".to_string(), "No results."),
            };
            MovieList::new(&rows, &mut tui.movie_list, title)
                .empty_message(empty)
                .render(frame, area);
        }
        View::MovieDetail => {
            if let Some(detail) = &app.detail {
                let favourite = app.favourites.is_favourite(detail.id);
                MovieDetail::new(detail, &mut tui.movie_detail, favourite).render(frame, area);
            }
        }
        View::Person => {
            if let Some(person) = &app.person {
                PersonDetail::new(person, &rows, &mut tui.movie_list).render(frame, area);
            }
        }
    }
}

/// Rows for whichever list the current view shows.
pub fn list_rows(app: &App) -> Vec<ListRow> {
    if app.view == View::SearchHits {
        return app
            .search_hits
            .as_ref()
            .and_then(|s| s.hits.as_ref())
            .map(|hits| hits.iter().map(|hit| hit_row(app, hit)).collect())
            .unwrap_or_default();
    }
    app.visible_movies()
        .into_iter()
        .map(|movie| ListRow {
            favourite: app.favourites.is_favourite(movie.id),
            detail: movie
                .release_year()
                .map(|y| y.to_string())
                .unwrap_or_default(),
            title: movie.title,
        })
        .collect()
}

fn hit_row(app: &App, hit: &SearchHit) -> ListRow {
    let detail = match hit {
        SearchHit::Movie(movie) => movie
            .release_year()
            .map(|y| format!("movie · {y}"))
            .unwrap_or_else(|| "movie".to_string()),
        SearchHit::Tv { .. } => "tv".to_string(),
        SearchHit::Person {
            known_for_department: Some(department),
            ..
        } => format!("person · {department}"),
        SearchHit::Person { .. } => "person".to_string(),
    };
    ListRow {
        title: hit.label().to_string(),
        detail,
        favourite: matches!(hit, SearchHit::Movie(m) if app.favourites.is_favourite(m.id)),
    }
}

fn page_label(app: &App) -> String {
    match app.view {
        View::Browse => app.context_label(),
        View::Favourites => "Favourites".to_string(),
        View::MovieDetail => "Movie".to_string(),
        View::Person => "Person".to_string(),
        View::SearchHits => "Search everything".to_string(),
    }
}

fn draw_error_banner(frame: &mut Frame, area: Rect, error: &str) {
    let banner = Paragraph::new(error)
        .style(Style::default().fg(Color::Red))
        .alignment(Alignment::Center)
        .block(Block::bordered().title(" ERROR ").border_style(Style::default().fg(Color::Red)));
    frame.render_widget(banner, area);
}

fn draw_help(frame: &mut Frame, area: Rect, view: View, confirm_clear: bool) {
    let text = match view {
        View::Favourites if confirm_clear => "Press x again to clear all favourites | any other key cancels",
        View::Favourites => "Enter Open  f Unfavourite  x Clear all  Tab Browse  / Search  q Quit",
        View::MovieDetail => "f Favourite  ↑↓ Cast  Enter/c Person  PgUp/PgDn Scroll  Esc Back",
        View::Person | View::SearchHits => "Enter Open  f Favourite  Esc Back  q Quit",
        View::Browse => {
            "/ Search  m Everything  g/G Genre  p Popular  f Favourite  Tab Favourites  r Retry  q Quit"
        }
    };
    let help = Paragraph::new(text)
        .style(Style::default().fg(Color::DarkGray))
        .block(Block::bordered().border_style(Style::default().fg(Color::DarkGray)));
    frame.render_widget(help, area);
}
