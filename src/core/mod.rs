//! # Core Application Logic
//!
//! This module contains cinedex's business logic.
//! It knows nothing about any specific UI technology.
//!
//! ```text
//!                    ┌──────────────────────────────┐
//!                    │             CORE             │
//!                    │                              │
//!                    │  • FavouritesStore           │
//!                    │  • PagedAggregator           │
//!                    │  • State (app data)          │
//!                    │  • Action (events)           │
//!                    │  • update() (reducer)        │
//!                    │                              │
//!                    │  No network. No UI.          │
//!                    └──────────────┬───────────────┘
//!                                   │
//!                  ┌────────────────┴────────────────┐
//!                  ▼                                 ▼
//!           ┌────────────┐                    ┌────────────┐
//!           │    TUI     │                    │  catalog   │
//!           │  Adapter   │                    │   (TMDB)   │
//!           │ (ratatui)  │                    │            │
//!           └────────────┘                    └────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`favourites`]: the favourites store, with write-through persistence
//! - [`aggregator`]: incremental page loading for a browse context
//! - [`observer`]: subscription registry used by both
//! - [`state`]: The `App` struct, all application state in one place
//! - [`action`]: The `Action` enum, everything that can happen in the app

pub mod action;
pub mod aggregator;
pub mod config;
pub mod favourites;
pub mod observer;
pub mod state;
pub mod storage;
