// commitview: fetch a repository's commit history, cache it, and render it as HTML cards.

pub mod api;
pub mod cache;
pub mod cli;
pub mod config;
pub mod error;
pub mod logging;
pub mod render;
pub mod view;

pub use error::{Result, ViewError};
