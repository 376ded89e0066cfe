// Commits API endpoint layout.
// Maps a deployment's URL scheme to page path segments and request descriptors.

use clap::ValueEnum;

/// URL scheme of the deployment serving the commits pages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum ApiLayout {
    /// Pages under `/repo/{name}/...`.
    Legacy,
    /// Pages under `/api/v1/repo/{name}/...`.
    #[default]
    V1,
}

impl ApiLayout {
    /// Path prefix shared by every repository route.
    pub fn repo_prefix(&self) -> &'static str {
        match self {
            ApiLayout::Legacy => "/repo",
            ApiLayout::V1 => "/api/v1/repo",
        }
    }

    /// Index of the repository name among the `/`-separated page path segments.
    pub fn identifier_segment(&self) -> usize {
        match self {
            ApiLayout::Legacy => 2,
            ApiLayout::V1 => 4,
        }
    }

    /// Request descriptor for a repository's commits JSON.
    pub fn commits_path(&self, repo: &str) -> String {
        format!("{}/{}/commits/json", self.repo_prefix(), repo)
    }
}

/// Extract the repository identifier from a page path.
///
/// No validation is done: a missing segment yields an empty identifier, which
/// turns into a request the server rejects.
pub fn resolve_repository_identifier(path: &str, layout: ApiLayout) -> String {
    path.split('/')
        .nth(layout.identifier_segment())
        .unwrap_or_default()
        .to_string()
}
