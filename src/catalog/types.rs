use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

/// Deserializes TMDB's `""` placeholder for unknown strings as `None`.
fn empty_as_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let value: Option<String> = Option::deserialize(deserializer)?;
    Ok(value.filter(|s| !s.trim().is_empty()))
}

/// The minimal movie summary shown in list views and stored as a favourite.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct Movie {
    pub id: u64,
    #[serde(default)]
    pub title: String,
    #[serde(default, deserialize_with = "empty_as_none")]
    pub poster_path: Option<String>,
    #[serde(default, deserialize_with = "empty_as_none")]
    pub release_date: Option<String>,
}

impl Movie {
    /// Year component of `release_date`, if it parses as `YYYY-MM-DD`.
    pub fn release_year(&self) -> Option<i32> {
        self.release_date
            .as_deref()
            .and_then(|d| NaiveDate::parse_from_str(d, "%Y-%m-%d").ok())
            .map(|d| d.year())
    }
}

/// One page of a paged listing endpoint.
#[derive(Deserialize, Debug, Clone, PartialEq)]
pub struct ResultPage {
    #[serde(default = "first_page")]
    pub page: u32,
    #[serde(default)]
    pub results: Vec<Movie>,
    #[serde(default)]
    pub total_pages: Option<u32>,
}

fn first_page() -> u32 {
    1
}

impl ResultPage {
    pub fn new(page: u32, results: Vec<Movie>) -> Self {
        Self {
            page,
            results,
            total_pages: None,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }

    /// True when no further page can exist after this one.
    ///
    /// An empty page always ends the listing. `total_pages` is only a hint and
    /// is ignored when the API omits it.
    pub fn is_last(&self) -> bool {
        self.is_empty() || self.total_pages.is_some_and(|total| self.page >= total)
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct Genre {
    pub id: u64,
    pub name: String,
}

#[derive(Deserialize, Debug)]
pub(crate) struct GenreList {
    #[serde(default)]
    pub genres: Vec<Genre>,
}

#[derive(Deserialize, Debug, Clone, PartialEq)]
pub struct MovieDetails {
    pub id: u64,
    #[serde(default)]
    pub title: String,
    #[serde(default, deserialize_with = "empty_as_none")]
    pub tagline: Option<String>,
    #[serde(default, deserialize_with = "empty_as_none")]
    pub overview: Option<String>,
    #[serde(default, deserialize_with = "empty_as_none")]
    pub poster_path: Option<String>,
    #[serde(default, deserialize_with = "empty_as_none")]
    pub release_date: Option<String>,
    #[serde(default)]
    pub runtime: Option<u32>,
    #[serde(default)]
    pub vote_average: f32,
    #[serde(default)]
    pub vote_count: u32,
    #[serde(default)]
    pub genres: Vec<Genre>,
}

impl MovieDetails {
    /// The summary form used by the favourites store.
    pub fn summary(&self) -> Movie {
        Movie {
            id: self.id,
            title: self.title.clone(),
            poster_path: self.poster_path.clone(),
            release_date: self.release_date.clone(),
        }
    }

    pub fn genre_names(&self) -> String {
        self.genres
            .iter()
            .map(|g| g.name.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    }
}

#[derive(Deserialize, Debug, Clone, PartialEq)]
pub struct Video {
    pub key: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub site: String,
    #[serde(rename = "type", default)]
    pub kind: String,
    #[serde(default)]
    pub official: bool,
}

impl Video {
    pub fn youtube_url(&self) -> Option<String> {
        (self.site == "YouTube").then(|| format!("https://www.youtube.com/watch?v={}", self.key))
    }

    fn is_trailer(&self) -> bool {
        self.kind == "Trailer" && self.site == "YouTube"
    }
}

#[derive(Deserialize, Debug)]
pub(crate) struct VideoList {
    #[serde(default)]
    pub results: Vec<Video>,
}

/// Picks the trailer to show: official YouTube trailers first, then any
/// YouTube trailer.
pub fn pick_trailer(videos: &[Video]) -> Option<&Video> {
    videos
        .iter()
        .find(|v| v.is_trailer() && v.official)
        .or_else(|| videos.iter().find(|v| v.is_trailer()))
}

#[derive(Deserialize, Debug, Clone, PartialEq)]
pub struct CastMember {
    pub id: u64,
    pub name: String,
    #[serde(default)]
    pub character: String,
    #[serde(default, deserialize_with = "empty_as_none")]
    pub profile_path: Option<String>,
}

#[derive(Deserialize, Debug, Clone, PartialEq)]
pub struct CrewMember {
    pub id: u64,
    pub name: String,
    #[serde(default)]
    pub job: String,
    #[serde(default)]
    pub department: String,
}

#[derive(Deserialize, Debug, Clone, Default, PartialEq)]
pub struct Credits {
    #[serde(default)]
    pub cast: Vec<CastMember>,
    #[serde(default)]
    pub crew: Vec<CrewMember>,
}

#[derive(Deserialize, Debug, Clone, PartialEq)]
pub struct Person {
    pub id: u64,
    pub name: String,
    #[serde(default, deserialize_with = "empty_as_none")]
    pub biography: Option<String>,
    #[serde(default, deserialize_with = "empty_as_none")]
    pub birthday: Option<String>,
    #[serde(default, deserialize_with = "empty_as_none")]
    pub place_of_birth: Option<String>,
    #[serde(default, deserialize_with = "empty_as_none")]
    pub known_for_department: Option<String>,
    #[serde(default)]
    pub gender: u8,
    #[serde(default)]
    pub popularity: f32,
}

impl Person {
    /// TMDB gender codes: 1 female, 2 male, 3 non-binary, 0 unknown.
    pub fn gender_label(&self) -> &'static str {
        match self.gender {
            1 => "Female",
            2 => "Male",
            3 => "Non-binary",
            _ => "Not specified",
        }
    }
}

#[derive(Deserialize, Debug, Clone, Default, PartialEq)]
pub struct PersonCredits {
    #[serde(default)]
    pub cast: Vec<Movie>,
}

/// A row from `/search/multi`: a movie, a TV show or a person.
#[derive(Deserialize, Debug, Clone, PartialEq)]
#[serde(tag = "media_type", rename_all = "lowercase")]
pub enum SearchHit {
    Movie(Movie),
    Tv {
        id: u64,
        #[serde(default)]
        name: String,
    },
    Person {
        id: u64,
        #[serde(default)]
        name: String,
        #[serde(default, deserialize_with = "empty_as_none")]
        known_for_department: Option<String>,
    },
}

impl SearchHit {
    pub fn label(&self) -> &str {
        match self {
            SearchHit::Movie(m) => &m.title,
            SearchHit::Tv { name, .. } | SearchHit::Person { name, .. } => name,
        }
    }
}

#[derive(Deserialize, Debug)]
pub(crate) struct SearchHitPage {
    #[serde(default)]
    pub results: Vec<SearchHit>,
}
