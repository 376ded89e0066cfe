// Commits API module.
// Provides the commit record, endpoint layout, and HTTP client for the commits endpoint.

pub mod client;
pub mod endpoints;
pub mod types;

pub use client::{CommitSource, CommitsClient};
pub use endpoints::{ApiLayout, resolve_repository_identifier};
pub use types::{Commit, parse_commits};
