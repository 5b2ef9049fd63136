//! # Application State
//!
//! Core business state for cinedex. This module contains domain logic only -
//! no TUI-specific types. Presentation state lives in the `tui` module.
//!
//! ```text
//! App
//! ├── catalog: Arc<dyn CatalogProvider>   // movie metadata API
//! ├── favourites: FavouritesStore         // the one favourites instance
//! ├── browse: PagedAggregator             // popular / genre / search results
//! ├── genres: Vec<Genre>                  // genre bar
//! ├── view: View                          // what's on screen
//! ├── history: Vec<HistoryEntry>          // back stack, with the pages left
//! ├── detail: Option<MovieDetailView>     // open movie page
//! ├── person: Option<PersonView>          // open person page
//! ├── search_hits: Option<SearchHitsView> // multi-search results
//! ├── status_message: String              // status bar text
//! └── error: Option<String>               // error banner
//! ```
//!
//! State changes only happen through `update(state, action)` in action.rs.

use std::sync::Arc;

use crate::catalog::{
    CatalogError, CatalogProvider, Credits, Genre, Movie, MovieDetails, Person, SearchHit, Video,
    pick_trailer,
};
use crate::core::aggregator::{BrowseContext, PagedAggregator};
use crate::core::favourites::FavouritesStore;

/// Which page is on screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum View {
    Browse,
    Favourites,
    MovieDetail,
    Person,
    SearchHits,
}

/// Everything the movie page shows, fetched together.
#[derive(Debug, Clone)]
pub struct MovieBundle {
    pub details: MovieDetails,
    pub videos: Vec<Video>,
    pub credits: Credits,
    pub similar: Vec<Movie>,
}

impl MovieBundle {
    /// Fetches details, videos, credits and similar titles concurrently.
    pub async fn fetch(catalog: &dyn CatalogProvider, id: u64) -> Result<Self, CatalogError> {
        let (details, videos, credits, similar) = futures::try_join!(
            catalog.movie_details(id),
            catalog.movie_videos(id),
            catalog.movie_credits(id),
            catalog.similar(id, 1),
        )?;
        Ok(Self {
            details,
            videos,
            credits,
            similar: similar.results,
        })
    }
}

#[derive(Debug, Clone)]
pub struct PersonBundle {
    pub person: Person,
    pub movies: Vec<Movie>,
}

impl PersonBundle {
    pub async fn fetch(catalog: &dyn CatalogProvider, id: u64) -> Result<Self, CatalogError> {
        let (person, credits) = futures::try_join!(
            catalog.person(id),
            catalog.person_movie_credits(id),
        )?;
        Ok(Self {
            person,
            movies: credits.cast,
        })
    }
}

/// The open movie page. `bundle` is `None` while loading.
#[derive(Debug, Clone)]
pub struct MovieDetailView {
    pub id: u64,
    pub bundle: Option<MovieBundle>,
    pub error: Option<String>,
}

impl MovieDetailView {
    pub fn loading(id: u64) -> Self {
        Self {
            id,
            bundle: None,
            error: None,
        }
    }

    pub fn trailer(&self) -> Option<&Video> {
        self.bundle.as_ref().and_then(|b| pick_trailer(&b.videos))
    }

    /// The movie summary to store when the user favourites this page.
    pub fn summary(&self) -> Option<Movie> {
        self.bundle.as_ref().map(|b| b.details.summary())
    }
}

#[derive(Debug, Clone)]
pub struct PersonView {
    pub id: u64,
    pub bundle: Option<PersonBundle>,
    pub error: Option<String>,
}

impl PersonView {
    pub fn loading(id: u64) -> Self {
        Self {
            id,
            bundle: None,
            error: None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct SearchHitsView {
    pub query: String,
    pub hits: Option<Vec<SearchHit>>,
    pub error: Option<String>,
}

/// A page left by opening another one on top of it. The page's own data
/// travels with it so `Back` shows it as it was.
#[derive(Debug, Clone)]
pub struct HistoryEntry {
    pub view: View,
    pub detail: Option<MovieDetailView>,
    pub person: Option<PersonView>,
    pub search_hits: Option<SearchHitsView>,
}

pub struct App {
    pub catalog: Arc<dyn CatalogProvider>,
    pub favourites: FavouritesStore,
    pub browse: PagedAggregator,
    pub genres: Vec<Genre>,
    pub view: View,
    pub history: Vec<HistoryEntry>,
    pub detail: Option<MovieDetailView>,
    pub person: Option<PersonView>,
    pub search_hits: Option<SearchHitsView>,
    pub status_message: String,
    pub error: Option<String>,
}

impl App {
    /// Builds the app around an already-loaded favourites store.
    /// `initial` is the browse context loaded on start.
    pub fn new(
        catalog: Arc<dyn CatalogProvider>,
        favourites: FavouritesStore,
        initial: BrowseContext,
    ) -> Self {
        Self {
            catalog,
            favourites,
            browse: PagedAggregator::new(initial),
            genres: Vec::new(),
            view: View::Browse,
            history: Vec::new(),
            detail: None,
            person: None,
            search_hits: None,
            status_message: String::from("Welcome to cinedex!"),
            error: None,
        }
    }

    /// Looks up a genre name for the status line.
    pub fn genre_name(&self, id: u64) -> Option<&str> {
        self.genres
            .iter()
            .find(|g| g.id == id)
            .map(|g| g.name.as_str())
    }

    /// Human-readable label for the active browse context.
    pub fn context_label(&self) -> String {
        match self.browse.context() {
            BrowseContext::Popular => "Popular".to_string(),
            BrowseContext::Genre(id) => match self.genre_name(*id) {
                Some(name) => format!("Genre: {name}"),
                None => format!("Genre #{id}"),
            },
            BrowseContext::Search(query) => format!("Search: {query}"),
        }
    }

    /// The movie page still waiting for `id`, on screen or further back.
    pub fn pending_movie_mut(&mut self, id: u64) -> Option<&mut MovieDetailView> {
        std::iter::once(&mut self.detail)
            .chain(self.history.iter_mut().map(|e| &mut e.detail))
            .filter_map(Option::as_mut)
            .find(|d| d.id == id && d.bundle.is_none() && d.error.is_none())
    }

    /// The person page still waiting for `id`, on screen or further back.
    pub fn pending_person_mut(&mut self, id: u64) -> Option<&mut PersonView> {
        std::iter::once(&mut self.person)
            .chain(self.history.iter_mut().map(|e| &mut e.person))
            .filter_map(Option::as_mut)
            .find(|p| p.id == id && p.bundle.is_none() && p.error.is_none())
    }

    /// The multi-search page still waiting for `query`, on screen or further back.
    pub fn pending_search_mut(&mut self, query: &str) -> Option<&mut SearchHitsView> {
        std::iter::once(&mut self.search_hits)
            .chain(self.history.iter_mut().map(|e| &mut e.search_hits))
            .filter_map(Option::as_mut)
            .find(|s| s.query == query && s.hits.is_none() && s.error.is_none())
    }

    /// Movies shown by the list views.
    pub fn visible_movies(&self) -> Vec<Movie> {
        match self.view {
            View::Favourites => self.favourites.list(),
            View::Person => self
                .person
                .as_ref()
                .and_then(|p| p.bundle.as_ref())
                .map(|b| b.movies.clone())
                .unwrap_or_default(),
            View::SearchHits => self
                .search_hits
                .as_ref()
                .and_then(|s| s.hits.as_ref())
                .map(|hits| {
                    hits.iter()
                        .filter_map(|h| match h {
                            SearchHit::Movie(m) => Some(m.clone()),
                            _ => None,
                        })
                        .collect()
                })
                .unwrap_or_default(),
            View::Browse | View::MovieDetail => self.browse.current_results().to_vec(),
        }
    }
}
