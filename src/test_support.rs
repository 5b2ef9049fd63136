//! Test utilities shared across the crate.
//!
//! This module is only compiled during tests (`#[cfg(test)]`).

use std::cell::RefCell;
use std::rc::Rc;
use std::sync::Arc;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;

use crate::catalog::{
    CastMember, CatalogError, CatalogProvider, Credits, CrewMember, Genre, Movie, MovieDetails,
    Person, PersonCredits, ResultPage, SearchHit, Video,
};
use crate::core::aggregator::BrowseContext;
use crate::core::favourites::FavouritesStore;
use crate::core::storage::{FavouritesStorage, StorageError};
use crate::core::state::App;

pub fn movie(id: u64, title: &str) -> Movie {
    Movie {
        id,
        title: title.to_string(),
        poster_path: Some(format!("/poster{id}.jpg")),
        release_date: Some("2001-02-03".to_string()),
    }
}

/// A page with one movie per id, titled "Movie <id>".
pub fn page_of(page: u32, ids: &[u64]) -> ResultPage {
    ResultPage::new(
        page,
        ids.iter().map(|&id| movie(id, &format!("Movie {id}"))).collect(),
    )
}

pub fn details(id: u64) -> MovieDetails {
    MovieDetails {
        id,
        title: format!("Movie {id}"),
        tagline: Some("A tagline".to_string()),
        overview: Some("Something happens.".to_string()),
        poster_path: None,
        release_date: Some("1999-10-15".to_string()),
        runtime: Some(139),
        vote_average: 8.4,
        vote_count: 27000,
        genres: vec![Genre {
            id: 18,
            name: "Drama".to_string(),
        }],
    }
}

/// Scripted catalog. Page requests are answered from `pages` by page number
/// (an empty page when not scripted) and counted.
pub struct StubCatalog {
    pages: Vec<ResultPage>,
    fail_pages: bool,
    genres: Vec<Genre>,
    page_calls: AtomicUsize,
    requests: Mutex<Vec<String>>,
}

impl StubCatalog {
    pub fn new() -> Self {
        Self {
            pages: Vec::new(),
            fail_pages: false,
            genres: vec![
                Genre { id: 28, name: "Action".to_string() },
                Genre { id: 35, name: "Comedy".to_string() },
            ],
            page_calls: AtomicUsize::new(0),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn with_pages(mut self, pages: Vec<ResultPage>) -> Self {
        self.pages = pages;
        self
    }

    pub fn failing(mut self) -> Self {
        self.fail_pages = true;
        self
    }

    pub fn page_calls(&self) -> usize {
        self.page_calls.load(Ordering::SeqCst)
    }

    pub fn requests(&self) -> Vec<String> {
        self.requests.lock().map(|r| r.clone()).unwrap_or_default()
    }

    fn answer(&self, label: String, page: u32) -> Result<ResultPage, CatalogError> {
        self.page_calls.fetch_add(1, Ordering::SeqCst);
        if let Ok(mut requests) = self.requests.lock() {
            requests.push(label);
        }
        if self.fail_pages {
            return Err(CatalogError::Network("stub offline".to_string()));
        }
        Ok(self
            .pages
            .iter()
            .find(|p| p.page == page)
            .cloned()
            .unwrap_or_else(|| ResultPage::new(page, Vec::new())))
    }
}

#[async_trait]
impl CatalogProvider for StubCatalog {
    fn name(&self) -> &str {
        "stub"
    }

    async fn popular(&self, page: u32) -> Result<ResultPage, CatalogError> {
        self.answer(format!("popular:{page}"), page)
    }

    async fn discover_by_genre(&self, genre_id: u64, page: u32) -> Result<ResultPage, CatalogError> {
        self.answer(format!("genre:{genre_id}:{page}"), page)
    }

    async fn search(&self, query: &str, page: u32) -> Result<ResultPage, CatalogError> {
        self.answer(format!("search:{query}:{page}"), page)
    }

    async fn genres(&self) -> Result<Vec<Genre>, CatalogError> {
        Ok(self.genres.clone())
    }

    async fn movie_details(&self, id: u64) -> Result<MovieDetails, CatalogError> {
        Ok(details(id))
    }

    async fn movie_videos(&self, _id: u64) -> Result<Vec<Video>, CatalogError> {
        Ok(vec![Video {
            key: "abc123".to_string(),
            name: "Official Trailer".to_string(),
            site: "YouTube".to_string(),
            kind: "Trailer".to_string(),
            official: true,
        }])
    }

    async fn movie_credits(&self, _id: u64) -> Result<Credits, CatalogError> {
        Ok(Credits {
            cast: vec![CastMember {
                id: 287,
                name: "Brad Pitt".to_string(),
                character: "Tyler Durden".to_string(),
                profile_path: None,
            }],
            crew: vec![CrewMember {
                id: 7467,
                name: "David Fincher".to_string(),
                job: "Director".to_string(),
                department: "Directing".to_string(),
            }],
        })
    }

    async fn similar(&self, _id: u64, page: u32) -> Result<ResultPage, CatalogError> {
        Ok(page_of(page, &[900, 901]))
    }

    async fn person(&self, id: u64) -> Result<Person, CatalogError> {
        Ok(Person {
            id,
            name: "Brad Pitt".to_string(),
            biography: Some("An actor.".to_string()),
            birthday: Some("1963-12-18".to_string()),
            place_of_birth: Some("Shawnee, Oklahoma, USA".to_string()),
            known_for_department: Some("Acting".to_string()),
            gender: 2,
            popularity: 10.5,
        })
    }

    async fn person_movie_credits(&self, _id: u64) -> Result<PersonCredits, CatalogError> {
        Ok(PersonCredits {
            cast: vec![movie(550, "Fight Club")],
        })
    }

    async fn multi_search(&self, query: &str) -> Result<Vec<SearchHit>, CatalogError> {
        Ok(vec![SearchHit::Movie(movie(1, query))])
    }
}

/// Creates a test App with an in-memory favourites store and a StubCatalog.
pub fn test_app() -> App {
    App::new(
        Arc::new(StubCatalog::new()),
        FavouritesStore::in_memory(),
        BrowseContext::Popular,
    )
}

/// In-memory storage. Clones share the same slot, so a test can keep one
/// handle and inspect what the store wrote through another.
#[derive(Clone, Default)]
pub struct MemoryStorage {
    slot: Rc<RefCell<Option<String>>>,
    backup: Rc<RefCell<Option<String>>>,
    writes: Rc<RefCell<usize>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_value(value: impl Into<String>) -> Self {
        let storage = Self::default();
        *storage.slot.borrow_mut() = Some(value.into());
        storage
    }

    pub fn value(&self) -> Option<String> {
        self.slot.borrow().clone()
    }

    /// Whatever `set_aside` moved out of the slot.
    pub fn backup(&self) -> Option<String> {
        self.backup.borrow().clone()
    }

    /// Number of successful `set` calls.
    pub fn writes(&self) -> usize {
        *self.writes.borrow()
    }
}

impl FavouritesStorage for MemoryStorage {
    fn get(&self) -> Result<Option<String>, StorageError> {
        Ok(self.slot.borrow().clone())
    }

    fn set(&mut self, value: &str) -> Result<(), StorageError> {
        *self.slot.borrow_mut() = Some(value.to_string());
        *self.writes.borrow_mut() += 1;
        Ok(())
    }

    fn set_aside(&mut self) -> Result<(), StorageError> {
        *self.backup.borrow_mut() = self.slot.borrow_mut().take();
        Ok(())
    }
}
