pub mod provider;
pub mod providers;
pub mod types;

pub use provider::{CatalogError, CatalogProvider};
pub use providers::TmdbProvider;
pub use types::{
    CastMember, Credits, CrewMember, Genre, Movie, MovieDetails, Person, PersonCredits,
    ResultPage, SearchHit, Video, pick_trailer,
};
