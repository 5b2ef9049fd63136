//! cinedex library exports for testing

use clap::ValueEnum;

pub mod catalog;
pub mod core;
pub mod tui;

#[cfg(test)]
pub mod test_support;

/// Which page the TUI opens on.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum)]
pub enum StartView {
    #[default]
    Browse,
    Favourites,
}
