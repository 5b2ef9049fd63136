//! # TUI Adapter
//!
//! The ratatui-specific layer. Handles terminal I/O, renders the UI,
//! translates keyboard events into `core::Action` values and runs the
//! `Effect`s that `update()` returns.
//!
//! This is the only module that knows about ratatui and crossterm.
//!
//! ## Fetches
//!
//! Every fetch runs on a tokio task and reports back by sending an `Action`
//! over an mpsc channel. The loop drains the channel between frames, so all
//! state changes still happen on this thread, one `update()` at a time.
//!
//! ## Redraw Strategy
//!
//! - **Busy** (a fetch is in flight): draws every ~80ms to animate the spinner.
//! - **Idle**: sleeps up to 500ms and only redraws on input, a finished fetch
//!   or a favourites change.

mod component;
mod components;
mod event;
mod ui;

use log::{debug, info, warn};
use std::cell::Cell;
use std::io::stdout;
use std::rc::Rc;
use std::sync::{Arc, mpsc};

use crossterm::event::{
    DisableBracketedPaste, DisableMouseCapture, EnableBracketedPaste, EnableMouseCapture,
};
use crossterm::execute;

use crate::StartView;
use crate::catalog::{CatalogProvider, Movie, SearchHit, TmdbProvider};
use crate::core::action::{Action, Effect, update};
use crate::core::aggregator::{BrowseContext, fetch_page};
use crate::core::config::ResolvedConfig;
use crate::core::favourites::FavouritesStore;
use crate::core::state::{App, MovieBundle, PersonBundle, View};
use crate::core::storage::FileStorage;
use crate::tui::component::EventHandler;
use crate::tui::components::genre_bar::next_genre;
use crate::tui::components::{
    MovieDetailState, MovieListState, SearchBox, SearchEvent, SearchMode,
};
use crate::tui::event::{TuiEvent, poll_event_immediate, poll_event_timeout};

/// Rows moved by PageUp / PageDown in lists.
const PAGE_STEP: isize = 10;

/// Modal input mode: determines how keyboard events are interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputMode {
    /// Keys are commands (`/`, `f`, `g`...)
    Navigate,
    /// Keys edit the search box. Esc returns to Navigate.
    Search,
}

/// TUI-specific presentation state (not part of core business logic)
pub struct TuiState {
    pub movie_list: MovieListState,
    pub movie_detail: MovieDetailState,
    pub search_box: SearchBox,
    pub input_mode: InputMode,
    /// First `x` on the favourites page arms this, the second clears
    pub confirm_clear: bool,
    // What the list selection belongs to, see `sync_view`
    last_view: View,
    last_depth: usize,
    last_context: BrowseContext,
    selection_stack: Vec<(View, usize)>,
}

impl TuiState {
    pub fn new() -> Self {
        Self {
            movie_list: MovieListState::new(),
            movie_detail: MovieDetailState::new(),
            search_box: SearchBox::new(),
            input_mode: InputMode::Navigate,
            confirm_clear: false,
            last_view: View::Browse,
            last_depth: 0,
            last_context: BrowseContext::default(),
            selection_stack: Vec::new(),
        }
    }

    /// Keeps the list selection in step with navigation: opening a page
    /// saves the selection, going back restores it, switching the browse
    /// context or jumping to a top-level view starts at the top.
    pub fn sync_view(&mut self, app: &App) {
        let depth = app.history.len();
        let context_changed = *app.browse.context() != self.last_context;
        if app.view == self.last_view && depth == self.last_depth && !context_changed {
            return;
        }

        if depth > self.last_depth {
            self.selection_stack.push((self.last_view, self.movie_list.selected));
            self.movie_list.select_first();
            if app.view == View::MovieDetail {
                self.movie_detail = MovieDetailState::new();
            }
        } else {
            let mut restored = None;
            while self.selection_stack.len() > depth {
                restored = self.selection_stack.pop();
            }
            match restored {
                Some((view, selected)) if view == app.view && !context_changed => {
                    self.movie_list.selected = selected;
                }
                _ => self.movie_list.select_first(),
            }
        }

        self.last_view = app.view;
        self.last_depth = depth;
        self.last_context = app.browse.context().clone();
    }
}

impl Default for TuiState {
    fn default() -> Self {
        Self::new()
    }
}

struct TerminalModeGuard;

impl TerminalModeGuard {
    fn new() -> std::io::Result<Self> {
        execute!(stdout(), EnableMouseCapture, EnableBracketedPaste)?;
        info!("Terminal modes enabled (mouse, bracketed paste)");
        Ok(Self)
    }
}

impl Drop for TerminalModeGuard {
    fn drop(&mut self) {
        let _ = execute!(stdout(), DisableMouseCapture, DisableBracketedPaste);
    }
}

/// Build the catalog client from a resolved config.
pub fn build_catalog(config: &ResolvedConfig) -> Arc<dyn CatalogProvider> {
    let api_key = config.tmdb_api_key.clone().unwrap_or_default();
    Arc::new(
        TmdbProvider::new(api_key, Some(config.tmdb_base_url.clone()))
            .with_language(config.language.clone()),
    )
}

/// Load favourites from disk, or keep them in memory when no path is known.
pub fn build_favourites(config: &ResolvedConfig) -> FavouritesStore {
    match &config.favourites_path {
        Some(path) => {
            info!("Favourites file: {}", path.display());
            FavouritesStore::load(Box::new(FileStorage::new(path)))
        }
        None => {
            warn!("No home directory, favourites will not be saved");
            FavouritesStore::in_memory()
        }
    }
}

pub fn run(config: ResolvedConfig, start: StartView) -> std::io::Result<()> {
    let catalog = build_catalog(&config);
    let mut favourites = build_favourites(&config);

    // Favourites can change from any view; the subscription just asks for a redraw
    let favourites_changed = Rc::new(Cell::new(false));
    let flag = favourites_changed.clone();
    favourites.subscribe(move |event| {
        debug!("Favourites now {} (revision {})", event.favourites.len(), event.revision);
        flag.set(true);
    });

    let mut app = App::new(catalog, favourites, config.start_context.clone());
    if config.favourites_path.is_some() && !app.favourites.is_persistent() {
        app.status_message = "Favourites file unreadable, changes will not be saved".to_string();
    }
    let mut tui = TuiState::new();

    let mut terminal = ratatui::init();
    let _terminal_mode_guard = TerminalModeGuard::new();

    // Channel for actions from background tasks
    let (tx, rx) = mpsc::channel();

    let mut startup = vec![
        Action::RefreshGenres,
        Action::Browse(config.start_context.clone()),
    ];
    if start == StartView::Favourites {
        startup.push(Action::ShowFavourites);
    }
    for action in startup {
        let effect = update(&mut app, action);
        execute_effect(effect, &app, &tx);
    }

    let start_time = std::time::Instant::now();
    let mut needs_redraw = true;

    loop {
        tui.sync_view(&app);
        if favourites_changed.replace(false) {
            needs_redraw = true;
        }

        let busy = app.browse.is_fetching()
            || app.detail.as_ref().is_some_and(|d| d.bundle.is_none() && d.error.is_none())
            || app.person.as_ref().is_some_and(|p| p.bundle.is_none() && p.error.is_none());
        if busy {
            needs_redraw = true;
        }

        if needs_redraw {
            let spinner_frame = (start_time.elapsed().as_secs_f32() * 12.0) as usize;
            terminal.draw(|f| ui::draw_ui(f, &app, &mut tui, spinner_frame))?;
            needs_redraw = false;
        }

        let timeout = if busy {
            std::time::Duration::from_millis(80)
        } else {
            std::time::Duration::from_millis(500)
        };
        let first_event = poll_event_timeout(timeout);

        // Process first event + drain ALL pending events before next draw
        let mut should_quit = false;
        if first_event.is_some() {
            needs_redraw = true;
        }
        for event in first_event
            .into_iter()
            .chain(std::iter::from_fn(poll_event_immediate))
        {
            for action in handle_event(&mut app, &mut tui, event) {
                let effect = update(&mut app, action);
                if execute_effect(effect, &app, &tx) {
                    should_quit = true;
                }
                tui.sync_view(&app);
            }
            if should_quit {
                break;
            }
        }

        if should_quit {
            break;
        }

        // Handle background task actions (finished fetches)
        while let Ok(action) = rx.try_recv() {
            needs_redraw = true;
            let effect = update(&mut app, action);
            execute_effect(effect, &app, &tx);
        }
    }

    info!("cinedex exiting with {} favourites", app.favourites.len());
    ratatui::restore();
    Ok(())
}

/// What Enter / `f` act on in list views.
#[derive(Debug, Clone, PartialEq)]
enum Target {
    Movie(Movie),
    Person(u64),
    Tv(String),
}

fn selected_target(app: &App, index: usize) -> Option<Target> {
    if app.view == View::SearchHits {
        let hit = app.search_hits.as_ref()?.hits.as_ref()?.get(index)?;
        return Some(match hit {
            SearchHit::Movie(movie) => Target::Movie(movie.clone()),
            SearchHit::Person { id, .. } => Target::Person(*id),
            SearchHit::Tv { name, .. } => Target::Tv(name.clone()),
        });
    }
    app.visible_movies().into_iter().nth(index).map(Target::Movie)
}

fn list_len(app: &App) -> usize {
    ui::list_rows(app).len()
}

/// Translates one input event into the actions it stands for.
///
/// Selection, scrolling and search-box editing are handled here directly
/// since they are presentation state.
fn handle_event(app: &mut App, tui: &mut TuiState, event: TuiEvent) -> Vec<Action> {
    match event {
        TuiEvent::Resize => return Vec::new(),
        TuiEvent::ForceQuit => return vec![Action::Quit],
        _ => {}
    }

    if tui.input_mode == InputMode::Search {
        return match tui.search_box.handle_event(&event) {
            Some(SearchEvent::Submit(mode, query)) => {
                tui.input_mode = InputMode::Navigate;
                tui.search_box.dimmed = true;
                match mode {
                    SearchMode::Movies => vec![Action::Search(query)],
                    SearchMode::Everything => vec![Action::MultiSearch(query)],
                }
            }
            Some(SearchEvent::Cancel) => {
                tui.input_mode = InputMode::Navigate;
                tui.search_box.dimmed = true;
                Vec::new()
            }
            Some(SearchEvent::ContentChanged) | None => Vec::new(),
        };
    }

    // Any key other than a second `x` disarms the clear confirmation
    let armed = std::mem::take(&mut tui.confirm_clear);

    if app.view == View::MovieDetail {
        return handle_detail_event(app, tui, event);
    }

    let len = list_len(app);
    let mut actions = Vec::new();
    let mut moved = false;
    match event {
        TuiEvent::InputChar('q') => actions.push(Action::Quit),
        TuiEvent::InputChar('/') => {
            tui.search_box.open(SearchMode::Movies);
            tui.input_mode = InputMode::Search;
        }
        TuiEvent::InputChar('m') => {
            tui.search_box.open(SearchMode::Everything);
            tui.input_mode = InputMode::Search;
        }
        TuiEvent::InputChar('g') | TuiEvent::InputChar('G') => {
            let forward = event == TuiEvent::InputChar('g');
            let next = next_genre(&app.genres, app.browse.context(), forward);
            actions.push(Action::Browse(next));
        }
        TuiEvent::InputChar('p') => actions.push(Action::Browse(BrowseContext::Popular)),
        TuiEvent::InputChar('r') => {
            if app.view == View::Browse {
                actions.push(Action::LoadMore);
            }
        }
        TuiEvent::Tab => actions.push(if app.view == View::Favourites {
            Action::ShowBrowse
        } else {
            Action::ShowFavourites
        }),
        TuiEvent::InputChar('x') if app.view == View::Favourites && !app.favourites.is_empty() => {
            if armed {
                actions.push(Action::ClearFavourites);
            } else {
                tui.confirm_clear = true;
            }
        }
        TuiEvent::InputChar('f') => match selected_target(app, tui.movie_list.selected) {
            Some(Target::Movie(movie)) => actions.push(Action::ToggleFavourite(movie)),
            Some(_) => app.status_message = "Only movies can be favourites".to_string(),
            None => {}
        },
        TuiEvent::Submit => match selected_target(app, tui.movie_list.selected) {
            Some(Target::Movie(movie)) => actions.push(Action::OpenMovie(movie.id)),
            Some(Target::Person(id)) => actions.push(Action::OpenPerson(id)),
            Some(Target::Tv(name)) => {
                app.status_message = format!("\"{name}\" is a TV show, only movies have pages")
            }
            None => {}
        },
        TuiEvent::Escape | TuiEvent::Backspace => actions.push(Action::Back),
        TuiEvent::CursorUp | TuiEvent::InputChar('k') | TuiEvent::ScrollUp => {
            tui.movie_list.move_by(-1, len);
        }
        TuiEvent::CursorDown | TuiEvent::InputChar('j') | TuiEvent::ScrollDown => {
            tui.movie_list.move_by(1, len);
            moved = true;
        }
        TuiEvent::PageUp => tui.movie_list.move_by(-PAGE_STEP, len),
        TuiEvent::PageDown => {
            tui.movie_list.move_by(PAGE_STEP, len);
            moved = true;
        }
        TuiEvent::Home => tui.movie_list.select_first(),
        TuiEvent::End => {
            tui.movie_list.select_last(len);
            moved = true;
        }
        _ => {}
    }

    if moved && app.view == View::Browse && tui.movie_list.near_end(len) && app.browse.has_more() {
        actions.push(Action::LoadMore);
    }
    actions
}

fn handle_detail_event(app: &mut App, tui: &mut TuiState, event: TuiEvent) -> Vec<Action> {
    let Some(detail) = &app.detail else {
        return vec![Action::Back];
    };
    let cast_len = detail.bundle.as_ref().map_or(0, |b| b.credits.cast.len());
    match event {
        TuiEvent::InputChar('q') => vec![Action::Quit],
        TuiEvent::Escape | TuiEvent::Backspace => vec![Action::Back],
        TuiEvent::Tab => vec![Action::ShowFavourites],
        TuiEvent::InputChar('f') => match detail.summary() {
            Some(movie) => vec![Action::ToggleFavourite(movie)],
            None => Vec::new(),
        },
        TuiEvent::Submit | TuiEvent::InputChar('c') => tui
            .movie_detail
            .selected_cast_id(detail)
            .map(|id| vec![Action::OpenPerson(id)])
            .unwrap_or_default(),
        TuiEvent::CursorUp | TuiEvent::InputChar('k') => {
            tui.movie_detail.move_cast(-1, cast_len);
            Vec::new()
        }
        TuiEvent::CursorDown | TuiEvent::InputChar('j') => {
            tui.movie_detail.move_cast(1, cast_len);
            Vec::new()
        }
        TuiEvent::ScrollUp => {
            tui.movie_detail.scroll.scroll_up();
            Vec::new()
        }
        TuiEvent::ScrollDown => {
            tui.movie_detail.scroll.scroll_down();
            Vec::new()
        }
        TuiEvent::PageUp => {
            tui.movie_detail.scroll.scroll_page_up();
            Vec::new()
        }
        TuiEvent::PageDown => {
            tui.movie_detail.scroll.scroll_page_down();
            Vec::new()
        }
        TuiEvent::Home => {
            tui.movie_detail.scroll.scroll_to_top();
            Vec::new()
        }
        _ => Vec::new(),
    }
}

/// Starts the I/O an `Effect` asks for. Returns true on `Effect::Quit`.
fn execute_effect(effect: Effect, app: &App, tx: &mpsc::Sender<Action>) -> bool {
    let catalog = app.catalog.clone();
    let tx = tx.clone();
    match effect {
        Effect::None => {}
        Effect::Quit => return true,
        Effect::FetchPage(ticket) => {
            info!("Fetching page {} of {}", ticket.page, ticket.context);
            tokio::spawn(async move {
                let result = fetch_page(catalog.as_ref(), &ticket).await;
                send(&tx, Action::PageLoaded { ticket, result });
            });
        }
        Effect::FetchGenres => {
            tokio::spawn(async move {
                let result = catalog.genres().await;
                send(&tx, Action::GenresLoaded(result));
            });
        }
        Effect::FetchMovie(id) => {
            info!("Fetching movie {}", id);
            tokio::spawn(async move {
                let result = MovieBundle::fetch(catalog.as_ref(), id).await;
                send(&tx, Action::MovieLoaded { id, result });
            });
        }
        Effect::FetchPerson(id) => {
            info!("Fetching person {}", id);
            tokio::spawn(async move {
                let result = PersonBundle::fetch(catalog.as_ref(), id).await;
                send(&tx, Action::PersonLoaded { id, result });
            });
        }
        Effect::FetchSearchHits(query) => {
            info!("Multi-search for {:?}", query);
            tokio::spawn(async move {
                let result = catalog.multi_search(&query).await;
                send(&tx, Action::SearchHitsLoaded { query, result });
            });
        }
    }
    false
}

fn send(tx: &mpsc::Sender<Action>, action: Action) {
    if tx.send(action).is_err() {
        warn!("Failed to deliver fetch result: receiver dropped");
    }
}
