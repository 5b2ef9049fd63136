use std::fmt;

use async_trait::async_trait;

use super::types::{
    Credits, Genre, MovieDetails, Person, PersonCredits, ResultPage, SearchHit, Video,
};

/// Errors that can occur while talking to the movie catalog.
/// The core collapses all of them into a single fetch-failed kind.
#[derive(Debug)]
pub enum CatalogError {
    /// Provider misconfigured (missing API key, bad URL).
    Config(String),
    /// Network-level failure (timeout, DNS, connection refused).
    Network(String),
    /// API returned an error response.
    Api { status: u16, message: String },
    /// Failed to decode the response body.
    Parse(String),
}

impl fmt::Display for CatalogError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CatalogError::Config(msg) => write!(f, "config error: {msg}"),
            CatalogError::Network(msg) => write!(f, "network error: {msg}"),
            CatalogError::Api { status, message } => {
                write!(f, "API error (HTTP {status}): {message}")
            }
            CatalogError::Parse(msg) => write!(f, "parse error: {msg}"),
        }
    }
}

impl std::error::Error for CatalogError {}

/// Read-only access to a movie metadata service.
///
/// Implementations do the HTTP call and JSON decode; callers only ever see
/// decoded values.
#[async_trait]
pub trait CatalogProvider: Send + Sync {
    /// Returns the name of the provider.
    fn name(&self) -> &str;

    async fn popular(&self, page: u32) -> Result<ResultPage, CatalogError>;

    async fn discover_by_genre(&self, genre_id: u64, page: u32) -> Result<ResultPage, CatalogError>;

    async fn search(&self, query: &str, page: u32) -> Result<ResultPage, CatalogError>;

    async fn genres(&self) -> Result<Vec<Genre>, CatalogError>;

    async fn movie_details(&self, id: u64) -> Result<MovieDetails, CatalogError>;

    async fn movie_videos(&self, id: u64) -> Result<Vec<Video>, CatalogError>;

    async fn movie_credits(&self, id: u64) -> Result<Credits, CatalogError>;

    async fn similar(&self, id: u64, page: u32) -> Result<ResultPage, CatalogError>;

    async fn person(&self, id: u64) -> Result<Person, CatalogError>;

    async fn person_movie_credits(&self, id: u64) -> Result<PersonCredits, CatalogError>;

    /// Movies, shows and people matching `query` in one list.
    async fn multi_search(&self, query: &str) -> Result<Vec<SearchHit>, CatalogError>;
}
