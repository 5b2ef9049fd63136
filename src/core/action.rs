//! # Actions
//!
//! Everything that can happen in cinedex becomes an `Action`.
//! User picks a genre? That's `Action::Browse(BrowseContext::Genre(id))`.
//! A page arrives? That's `Action::PageLoaded { ticket, result }`.
//!
//! The `update()` function takes the current state and an action, mutates
//! the state, and returns an `Effect` describing the I/O the adapter should
//! start. No side effects here. Fetches happen elsewhere.
//!
//! ```text
//! State + Action  →  update()  →  New State + Effect
//! ```

use log::{debug, info, warn};

use crate::catalog::{CatalogError, Genre, Movie, ResultPage, SearchHit};
use crate::core::aggregator::{BrowseContext, Completion, PageTicket};
use crate::core::state::{
    App, HistoryEntry, MovieBundle, MovieDetailView, PersonBundle, PersonView, SearchHitsView,
    View,
};

#[derive(Debug)]
pub enum Action {
    Quit,
    /// Switch the browse context and load its first page.
    Browse(BrowseContext),
    /// Free-text movie search. Blank queries are ignored.
    Search(String),
    /// Search movies, shows and people at once.
    MultiSearch(String),
    /// Scroll reached the end of the list, or the user asked to retry.
    LoadMore,
    PageLoaded {
        ticket: PageTicket,
        result: Result<ResultPage, CatalogError>,
    },
    RefreshGenres,
    GenresLoaded(Result<Vec<Genre>, CatalogError>),
    ToggleFavourite(Movie),
    ClearFavourites,
    ShowBrowse,
    ShowFavourites,
    OpenMovie(u64),
    MovieLoaded {
        id: u64,
        result: Result<MovieBundle, CatalogError>,
    },
    OpenPerson(u64),
    PersonLoaded {
        id: u64,
        result: Result<PersonBundle, CatalogError>,
    },
    SearchHitsLoaded {
        query: String,
        result: Result<Vec<SearchHit>, CatalogError>,
    },
    Back,
}

/// I/O requested by `update()`.
#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    None,
    Quit,
    FetchPage(PageTicket),
    FetchGenres,
    FetchMovie(u64),
    FetchPerson(u64),
    FetchSearchHits(String),
}

pub fn update(app: &mut App, action: Action) -> Effect {
    debug!("update: {:?}", action);
    match action {
        Action::Quit => Effect::Quit,

        Action::Browse(context) => {
            app.error = None;
            navigate_root(app, View::Browse);
            let ticket = app.browse.set_context(context);
            app.status_message = format!("Loading {}...", app.context_label());
            Effect::FetchPage(ticket)
        }

        Action::Search(query) => {
            let query = query.trim();
            if query.is_empty() {
                return Effect::None;
            }
            update(app, Action::Browse(BrowseContext::Search(query.to_string())))
        }

        Action::MultiSearch(query) => {
            let query = query.trim().to_string();
            if query.is_empty() {
                return Effect::None;
            }
            push_view(app, View::SearchHits);
            app.search_hits = Some(SearchHitsView {
                query: query.clone(),
                hits: None,
                error: None,
            });
            app.status_message = format!("Searching everything for \"{query}\"...");
            Effect::FetchSearchHits(query)
        }

        Action::LoadMore => match app.browse.fetch_next() {
            Some(ticket) => {
                app.status_message = format!("Loading page {}...", ticket.page);
                Effect::FetchPage(ticket)
            }
            None => Effect::None,
        },

        Action::PageLoaded { ticket, result } => {
            match app.browse.complete(ticket, result) {
                Completion::Appended { .. } => {
                    app.error = None;
                    app.status_message = format!(
                        "{} · {} movies",
                        app.context_label(),
                        app.browse.current_results().len()
                    );
                }
                Completion::Exhausted { .. } => {
                    app.error = None;
                    app.status_message = if app.browse.current_results().is_empty() {
                        format!("{} · no movies found", app.context_label())
                    } else {
                        format!(
                            "{} · all {} movies loaded",
                            app.context_label(),
                            app.browse.current_results().len()
                        )
                    };
                }
                Completion::Failed(failure) => {
                    app.error = Some(if app.browse.current_results().is_empty() {
                        "Failed to load movies...".to_string()
                    } else {
                        "Failed to load more movies. Press r to retry.".to_string()
                    });
                    app.status_message = failure.to_string();
                }
                Completion::Stale => {}
            }
            Effect::None
        }

        Action::RefreshGenres => Effect::FetchGenres,

        Action::GenresLoaded(result) => {
            match result {
                Ok(genres) => {
                    info!("Loaded {} genres", genres.len());
                    app.genres = genres;
                }
                // The genre bar just stays empty.
                Err(e) => warn!("Failed to load genres: {}", e),
            }
            Effect::None
        }

        Action::ToggleFavourite(movie) => {
            let title = movie.title.clone();
            app.status_message = if app.favourites.toggle(&movie) {
                format!("Added \"{title}\" to favourites")
            } else {
                format!("Removed \"{title}\" from favourites")
            };
            Effect::None
        }

        Action::ClearFavourites => {
            app.favourites.clear();
            app.status_message = "Favourites cleared".to_string();
            Effect::None
        }

        Action::ShowBrowse => {
            navigate_root(app, View::Browse);
            Effect::None
        }

        Action::ShowFavourites => {
            navigate_root(app, View::Favourites);
            app.status_message = format!("{} favourites", app.favourites.len());
            Effect::None
        }

        Action::OpenMovie(id) => {
            push_view(app, View::MovieDetail);
            app.detail = Some(MovieDetailView::loading(id));
            app.status_message = "Loading movie...".to_string();
            Effect::FetchMovie(id)
        }

        Action::MovieLoaded { id, result } => {
            let on_screen =
                app.view == View::MovieDetail && app.detail.as_ref().is_some_and(|d| d.id == id);
            let Some(detail) = app.pending_movie_mut(id) else {
                debug!("Dropping details for movie {} (no longer open)", id);
                return Effect::None;
            };
            let status = match result {
                Ok(bundle) => {
                    let title = bundle.details.title.clone();
                    detail.bundle = Some(bundle);
                    title
                }
                Err(e) => {
                    warn!("Failed to load movie {}: {}", id, e);
                    detail.error = Some("Failed to load movie details".to_string());
                    e.to_string()
                }
            };
            if on_screen {
                app.status_message = status;
            }
            Effect::None
        }

        Action::OpenPerson(id) => {
            push_view(app, View::Person);
            app.person = Some(PersonView::loading(id));
            app.status_message = "Loading person...".to_string();
            Effect::FetchPerson(id)
        }

        Action::PersonLoaded { id, result } => {
            let on_screen =
                app.view == View::Person && app.person.as_ref().is_some_and(|p| p.id == id);
            let Some(person) = app.pending_person_mut(id) else {
                debug!("Dropping person {} (no longer open)", id);
                return Effect::None;
            };
            let status = match result {
                Ok(bundle) => {
                    let name = bundle.person.name.clone();
                    person.bundle = Some(bundle);
                    name
                }
                Err(e) => {
                    warn!("Failed to load person {}: {}", id, e);
                    person.error = Some("Failed to load person".to_string());
                    e.to_string()
                }
            };
            if on_screen {
                app.status_message = status;
            }
            Effect::None
        }

        Action::SearchHitsLoaded { query, result } => {
            let on_screen = app.view == View::SearchHits
                && app.search_hits.as_ref().is_some_and(|s| s.query == query);
            let Some(view) = app.pending_search_mut(&query) else {
                return Effect::None;
            };
            let status = match result {
                Ok(hits) => {
                    let status = format!("{} results for \"{}\"", hits.len(), query);
                    view.hits = Some(hits);
                    status
                }
                Err(e) => {
                    view.error = Some("Failed to search...".to_string());
                    e.to_string()
                }
            };
            if on_screen {
                app.status_message = status;
            }
            Effect::None
        }

        Action::Back => {
            if let Some(previous) = app.history.pop() {
                leave_view(app);
                app.view = previous.view;
                match previous.view {
                    View::MovieDetail => app.detail = previous.detail,
                    View::Person => app.person = previous.person,
                    View::SearchHits => app.search_hits = previous.search_hits,
                    View::Browse | View::Favourites => {}
                }
            }
            Effect::None
        }
    }
}

/// Opens `view` on top of the current one. The current page moves onto the
/// back stack with its data.
fn push_view(app: &mut App, view: View) {
    let mut entry = HistoryEntry {
        view: app.view,
        detail: None,
        person: None,
        search_hits: None,
    };
    match app.view {
        View::MovieDetail => entry.detail = app.detail.take(),
        View::Person => entry.person = app.person.take(),
        View::SearchHits => entry.search_hits = app.search_hits.take(),
        View::Browse | View::Favourites => {}
    }
    app.history.push(entry);
    app.view = view;
}

/// Jumps to a top-level view, dropping the back stack.
fn navigate_root(app: &mut App, view: View) {
    app.history.clear();
    app.detail = None;
    app.person = None;
    app.search_hits = None;
    app.view = view;
}

/// Releases the page being left so late responses for it are ignored.
fn leave_view(app: &mut App) {
    match app.view {
        View::MovieDetail => app.detail = None,
        View::Person => app.person = None,
        View::SearchHits => app.search_hits = None,
        View::Browse | View::Favourites => {}
    }
}
