//! TMDB v3 provider.
//!
//! Every call is a `GET` with the API key passed as the `api_key` query
//! parameter. Error bodies look like
//! `{"status_code": 7, "status_message": "Invalid API key", "success": false}`.

use std::time::Duration;

use async_trait::async_trait;
use log::{debug, info, warn};
use serde::Deserialize;
use serde::de::DeserializeOwned;

use crate::catalog::types::{GenreList, SearchHitPage, VideoList};
use crate::catalog::{
    CatalogError, CatalogProvider, Credits, Genre, MovieDetails, Person, PersonCredits,
    ResultPage, SearchHit, Video,
};

pub const DEFAULT_TMDB_BASE_URL: &str = "https://api.themoviedb.org/3";

const REQUEST_TIMEOUT: Duration = Duration::from_secs(15);

/// Shape of TMDB's JSON error responses.
#[derive(Deserialize, Debug)]
struct TmdbErrorBody {
    status_message: String,
}

/// TMDB API provider
pub struct TmdbProvider {
    api_key: String,
    base_url: String,
    language: Option<String>,
    client: reqwest::Client,
}

impl TmdbProvider {
    /// Creates a new TMDB provider.
    ///
    /// # Arguments
    /// * `api_key` - TMDB v3 API key
    /// * `base_url` - Optional custom base URL (defaults to TMDB's API)
    pub fn new(api_key: String, base_url: Option<String>) -> Self {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .unwrap_or_else(|e| {
                warn!("Failed to build HTTP client with timeout, using defaults: {}", e);
                reqwest::Client::new()
            });
        Self {
            api_key,
            base_url: base_url
                .unwrap_or_else(|| DEFAULT_TMDB_BASE_URL.to_string())
                .trim_end_matches('/')
                .to_string(),
            language: None,
            client,
        }
    }

    /// Sets the `language` query parameter sent with every request (e.g. "en-US").
    pub fn with_language(mut self, language: Option<String>) -> Self {
        self.language = language;
        self
    }

    /// Sends a GET to `path` with the given query and decodes the JSON body.
    async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<T, CatalogError> {
        if self.api_key.trim().is_empty() {
            return Err(CatalogError::Config("TMDB API key is empty".to_string()));
        }

        let url = format!("{}{}", self.base_url, path);
        debug!("TMDB GET {} {:?}", url, query);

        let mut request = self
            .client
            .get(&url)
            .query(&[("api_key", self.api_key.as_str())])
            .query(query);
        if let Some(language) = &self.language {
            request = request.query(&[("language", language.as_str())]);
        }

        let response = request
            .send()
            .await
            .map_err(|e| CatalogError::Network(e.to_string()))?;

        let status = response.status();
        debug!("TMDB response status for {}: {}", path, status);

        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "unknown error".to_string());
            let message = serde_json::from_str::<TmdbErrorBody>(&body)
                .map(|b| b.status_message)
                .unwrap_or(body);
            warn!("TMDB API error on {}: {} - {}", path, status.as_u16(), message);
            return Err(CatalogError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| CatalogError::Network(e.to_string()))?;
        serde_json::from_slice(&body).map_err(|e| {
            warn!("Failed to decode TMDB response from {}: {}", path, e);
            CatalogError::Parse(e.to_string())
        })
    }

    async fn get_page(&self, path: &str, query: &[(&str, String)]) -> Result<ResultPage, CatalogError> {
        let page: ResultPage = self.get_json(path, query).await?;
        info!(
            "TMDB {}: page {} with {} results (total_pages={:?})",
            path,
            page.page,
            page.results.len(),
            page.total_pages
        );
        Ok(page)
    }
}

#[async_trait]
impl CatalogProvider for TmdbProvider {
    fn name(&self) -> &str {
        "tmdb"
    }

    async fn popular(&self, page: u32) -> Result<ResultPage, CatalogError> {
        self.get_page("/movie/popular", &[("page", page.to_string())])
            .await
    }

    async fn discover_by_genre(&self, genre_id: u64, page: u32) -> Result<ResultPage, CatalogError> {
        self.get_page(
            "/discover/movie",
            &[
                ("with_genres", genre_id.to_string()),
                ("page", page.to_string()),
            ],
        )
        .await
    }

    async fn search(&self, query: &str, page: u32) -> Result<ResultPage, CatalogError> {
        self.get_page(
            "/search/movie",
            &[("query", query.to_string()), ("page", page.to_string())],
        )
        .await
    }

    async fn genres(&self) -> Result<Vec<Genre>, CatalogError> {
        let list: GenreList = self.get_json("/genre/movie/list", &[]).await?;
        Ok(list.genres)
    }

    async fn movie_details(&self, id: u64) -> Result<MovieDetails, CatalogError> {
        self.get_json(&format!("/movie/{id}"), &[]).await
    }

    async fn movie_videos(&self, id: u64) -> Result<Vec<Video>, CatalogError> {
        let list: VideoList = self.get_json(&format!("/movie/{id}/videos"), &[]).await?;
        Ok(list.results)
    }

    async fn movie_credits(&self, id: u64) -> Result<Credits, CatalogError> {
        self.get_json(&format!("/movie/{id}/credits"), &[]).await
    }

    async fn similar(&self, id: u64, page: u32) -> Result<ResultPage, CatalogError> {
        self.get_page(&format!("/movie/{id}/similar"), &[("page", page.to_string())])
            .await
    }

    async fn person(&self, id: u64) -> Result<Person, CatalogError> {
        self.get_json(&format!("/person/{id}"), &[]).await
    }

    async fn person_movie_credits(&self, id: u64) -> Result<PersonCredits, CatalogError> {
        self.get_json(&format!("/person/{id}/movie_credits"), &[])
            .await
    }

    async fn multi_search(&self, query: &str) -> Result<Vec<SearchHit>, CatalogError> {
        let page: SearchHitPage = self
            .get_json("/search/multi", &[("query", query.to_string())])
            .await?;
        Ok(page.results)
    }
}
