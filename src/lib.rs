//! Terminal browser for the dummyjson demo users and their posts.
//!
//! The [`loader`] module holds the fetch lifecycle and incremental reveal
//! logic for both screens and can be driven without a terminal; [`app`] and
//! [`ui`] wire the loaders to a ratatui front end.

pub mod api;
pub mod app;
pub mod config;
pub mod loader;
pub mod ui;
