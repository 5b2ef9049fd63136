//! # TUI Components
//!
//! All UI components for the terminal interface.
//!
//! ### Stateless Components (Props-Based Rendering)
//!
//! - `TitleBar`: top status line
//! - `GenreBar`: genre strip with the active genre highlighted
//!
//! ### Stateful Components
//!
//! - `SearchBox`: query editor, emits `SearchEvent`s
//! - `MovieList`: selectable list, state kept in `MovieListState`
//! - `MovieDetail`: scrollable movie page, state kept in `MovieDetailState`
//! - `PersonDetail`: person header plus their movies in a `MovieList`
//!
//! Stateful components follow the persistent state + transient wrapper
//! pattern: the `*State` lives in `TuiState`, the wrapper is built each
//! frame with borrowed props.
//!
//! ```text
//! components/
//! ├── mod.rs
//! ├── title_bar.rs
//! ├── genre_bar.rs
//! ├── search_box.rs
//! ├── movie_list.rs
//! ├── movie_detail.rs
//! └── person_detail.rs
//! ```

pub mod genre_bar;
pub mod movie_detail;
pub mod movie_list;
pub mod person_detail;
pub mod search_box;
mod title_bar;

pub use genre_bar::GenreBar;
pub use movie_detail::{MovieDetail, MovieDetailState};
pub use movie_list::{ListRow, MovieList, MovieListState};
pub use person_detail::PersonDetail;
pub use search_box::{SearchBox, SearchEvent, SearchMode};
pub use title_bar::TitleBar;
