// Commits view coordinator.
// Paints a cached snapshot as soon as it is available, always revalidates against
// the server, and re-renders only when the refresh is newer and different.

use std::fmt;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use super::guard::{RenderGuard, Ticket, Verdict};
use crate::api::{ApiLayout, Commit, CommitSource, parse_commits, resolve_repository_identifier};
use crate::cache::KeyedCache;
use crate::error::Result;
use crate::render::{COMMITS_LIST_ID, CardStyle, RenderTarget, render_cards};

/// Which load path produced a result.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PathKind {
    Cache,
    Refresh,
}

impl fmt::Display for PathKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PathKind::Cache => write!(f, "cache"),
            PathKind::Refresh => write!(f, "refresh"),
        }
    }
}

/// How a load path ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PathOutcome {
    /// The path did not run.
    Skipped,
    /// The cache held no entry for the request.
    Miss,
    /// The target was re-rendered with this many commits.
    Rendered(usize),
    /// The result matched what was already displayed.
    Unchanged,
    /// A newer result had already been applied.
    Discarded,
    /// The path failed; the target kept its prior content.
    Failed(String),
}

/// Per-path outcome of one `load_commits` call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadReport {
    /// Request descriptor both paths used.
    pub request: String,
    pub cache: PathOutcome,
    pub refresh: PathOutcome,
}

impl LoadReport {
    /// Whether either path rendered.
    pub fn rendered(&self) -> bool {
        matches!(self.cache, PathOutcome::Rendered(_))
            || matches!(self.refresh, PathOutcome::Rendered(_))
    }

    fn outcome_mut(&mut self, path: PathKind) -> &mut PathOutcome {
        match path {
            PathKind::Cache => &mut self.cache,
            PathKind::Refresh => &mut self.refresh,
        }
    }
}

/// Result sent back by a load path.
struct PathMessage {
    path: PathKind,
    ticket: Ticket,
    /// `None` is a cache miss.
    body: Result<Option<Vec<u8>>>,
}

/// Loads a repository's commits and renders them into a mount point.
pub struct CommitsView<S, T> {
    source: Arc<S>,
    cache: Option<Arc<dyn KeyedCache>>,
    target: T,
    layout: ApiLayout,
    guard: RenderGuard,
}

impl<S: CommitSource, T: RenderTarget> CommitsView<S, T> {
    /// Create a view with no cache facility.
    pub fn new(source: S, target: T, layout: ApiLayout) -> Self {
        Self {
            source: Arc::new(source),
            cache: None,
            target,
            layout,
            guard: RenderGuard::new(),
        }
    }

    /// Use `cache` for cached snapshots and to store refreshed responses.
    pub fn with_cache(mut self, cache: Arc<dyn KeyedCache>) -> Self {
        self.cache = Some(cache);
        self
    }

    pub fn target(&self) -> &T {
        &self.target
    }

    pub fn into_target(self) -> T {
        self.target
    }

    /// Commits currently shown by the target, as far as this view knows.
    pub fn displayed(&self) -> Option<&[Commit]> {
        self.guard.displayed()
    }

    /// Repository identifier for a page path under this view's layout.
    pub fn resolve_repository_identifier(&self, path: &str) -> String {
        resolve_repository_identifier(path, self.layout)
    }

    /// Replace the mount point's content with one card per commit.
    pub fn render_commits(&mut self, commits: &[Commit]) -> Result<()> {
        self.render_commits_at(commits, &Utc::now())
    }

    /// Like [`Self::render_commits`], with relative times computed against `now`.
    pub fn render_commits_at(&mut self, commits: &[Commit], now: &DateTime<Utc>) -> Result<()> {
        let html = render_cards(commits, CardStyle::from(self.layout), now);
        self.target.replace_inner(COMMITS_LIST_ID, &html)?;
        debug!(count = commits.len(), "rendered commits");
        Ok(())
    }

    /// Load the commits of `repo`, rendering a cached snapshot and then the refreshed list.
    ///
    /// Both paths run concurrently. Path failures are logged and reported, never returned.
    pub async fn load_commits(&mut self, repo: &str) -> LoadReport {
        let request = self.layout.commits_path(repo);
        info!(%request, "loading commits");

        let mut report = LoadReport {
            request: request.clone(),
            cache: PathOutcome::Skipped,
            refresh: PathOutcome::Skipped,
        };
        let (tx, mut rx) = mpsc::unbounded_channel();

        match &self.cache {
            Some(cache) => {
                let ticket = self.guard.issue();
                let cache = Arc::clone(cache);
                let key = request.clone();
                let tx = tx.clone();
                report.cache = PathOutcome::Failed("cache lookup did not complete".to_string());
                tokio::task::spawn_blocking(move || {
                    let body = cache.get(&key);
                    let _ = tx.send(PathMessage {
                        path: PathKind::Cache,
                        ticket,
                        body,
                    });
                });
            }
            None => debug!("no cache facility, refreshing only"),
        }

        let ticket = self.guard.issue();
        let source = Arc::clone(&self.source);
        let key = request.clone();
        report.refresh = PathOutcome::Failed("refresh did not complete".to_string());
        tokio::spawn(async move {
            let body = source.fetch(&key).await.map(Some);
            let _ = tx.send(PathMessage {
                path: PathKind::Refresh,
                ticket,
                body,
            });
        });

        // Closes once both paths have reported or gone away
        while let Some(message) = rx.recv().await {
            let path = message.path;
            let outcome = self.apply(&request, message).await;
            *report.outcome_mut(path) = outcome;
        }

        info!(cache = ?report.cache, refresh = ?report.refresh, "load finished");
        report
    }

    async fn apply(&mut self, request: &str, message: PathMessage) -> PathOutcome {
        let PathMessage { path, ticket, body } = message;

        let body = match body {
            Ok(Some(body)) => body,
            Ok(None) => {
                debug!(%request, "cache miss");
                return PathOutcome::Miss;
            }
            Err(e) => {
                warn!(%path, %request, error = %e, "error fetching commits");
                return PathOutcome::Failed(e.to_string());
            }
        };

        let commits = match parse_commits(&body) {
            Ok(commits) => commits,
            Err(e) => {
                warn!(%path, %request, error = %e, "malformed commits payload");
                return PathOutcome::Failed(e.to_string());
            }
        };

        if path == PathKind::Refresh {
            self.store(request, body).await;
        }

        match self.guard.admit(ticket, &commits) {
            Verdict::Stale => {
                debug!(%path, "discarding result older than the displayed one");
                PathOutcome::Discarded
            }
            Verdict::Unchanged => {
                self.guard.record(ticket, commits);
                PathOutcome::Unchanged
            }
            Verdict::Render => match self.render_commits(&commits) {
                Ok(()) => {
                    let count = commits.len();
                    self.guard.record(ticket, commits);
                    PathOutcome::Rendered(count)
                }
                Err(e) => {
                    warn!(%path, error = %e, "failed to render commits");
                    PathOutcome::Failed(e.to_string())
                }
            },
        }
    }

    /// Write a refreshed body back to the cache, off the async worker.
    async fn store(&self, request: &str, body: Vec<u8>) {
        let Some(cache) = &self.cache else {
            return;
        };
        let cache = Arc::clone(cache);
        let key = request.to_string();
        match tokio::task::spawn_blocking(move || cache.put(&key, &body)).await {
            Ok(Ok(())) => {}
            Ok(Err(e)) => warn!(%request, error = %e, "failed to cache commits"),
            Err(e) => warn!(%request, error = %e, "cache write task failed"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::mpsc as std_mpsc;

    use tokio::sync::Notify;

    use crate::cache::MemoryCache;
    use crate::error::ViewError;
    use crate::render::HtmlDocument;

    const ALICE: &str = r#"[{"author":"alice","message":"fix bug","date":1700000000}]"#;
    const TWO: &str = r#"[
        {"author":"bob","message":"second","date":1700000100},
        {"author":"alice","message":"fix bug","date":1700000000}
    ]"#;
    const REQUEST: &str = "/api/v1/repo/widgets/commits/json";

    /// Serves a fixed body, or a fixed error, optionally held until a gate opens.
    struct FakeSource {
        body: std::result::Result<String, String>,
        gate: Option<Arc<Notify>>,
        calls: Arc<AtomicUsize>,
    }

    impl FakeSource {
        fn ok(body: &str) -> Self {
            Self {
                body: Ok(body.to_string()),
                gate: None,
                calls: Arc::new(AtomicUsize::new(0)),
            }
        }

        fn failing() -> Self {
            Self {
                body: Err("connection refused".to_string()),
                gate: None,
                calls: Arc::new(AtomicUsize::new(0)),
            }
        }

        fn gated(mut self, gate: Arc<Notify>) -> Self {
            self.gate = Some(gate);
            self
        }
    }

    impl CommitSource for FakeSource {
        async fn fetch(&self, _request: &str) -> Result<Vec<u8>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if let Some(gate) = &self.gate {
                gate.notified().await;
            }
            match &self.body {
                Ok(body) => Ok(body.clone().into_bytes()),
                Err(e) => Err(ViewError::Other(e.clone())),
            }
        }
    }

    /// Cache whose lookups block until released.
    struct GatedCache {
        inner: MemoryCache,
        release: Mutex<std_mpsc::Receiver<()>>,
    }

    impl KeyedCache for GatedCache {
        fn get(&self, key: &str) -> Result<Option<Vec<u8>>> {
            let _ = self.release.lock().unwrap().recv();
            self.inner.get(key)
        }

        fn put(&self, key: &str, body: &[u8]) -> Result<()> {
            self.inner.put(key, body)
        }
    }

    /// Cache that fails every operation.
    struct BrokenCache;

    impl KeyedCache for BrokenCache {
        fn get(&self, _key: &str) -> Result<Option<Vec<u8>>> {
            Err(ViewError::Other("cache unavailable".to_string()))
        }

        fn put(&self, _key: &str, _body: &[u8]) -> Result<()> {
            Err(ViewError::Other("cache unavailable".to_string()))
        }
    }

    /// Keeps every markup it was given, and runs a hook after each render.
    #[derive(Default)]
    struct RecordingTarget {
        renders: Vec<String>,
        on_render: Option<Box<dyn Fn() + Send>>,
    }

    impl RecordingTarget {
        fn notifying(notify: Arc<Notify>) -> Self {
            Self {
                renders: Vec::new(),
                on_render: Some(Box::new(move || notify.notify_one())),
            }
        }
    }

    impl RenderTarget for RecordingTarget {
        fn replace_inner(&mut self, id: &str, html: &str) -> Result<()> {
            assert_eq!(id, COMMITS_LIST_ID);
            self.renders.push(html.to_string());
            if let Some(hook) = &self.on_render {
                hook();
            }
            Ok(())
        }
    }

    fn seeded_cache(body: &str) -> Arc<MemoryCache> {
        let cache = Arc::new(MemoryCache::new());
        cache.put(REQUEST, body.as_bytes()).unwrap();
        cache
    }

    #[tokio::test]
    async fn test_renders_single_commit_into_page() {
        let mut view = CommitsView::new(
            FakeSource::ok(ALICE),
            HtmlDocument::page("widgets"),
            ApiLayout::V1,
        );

        let report = view.load_commits("widgets").await;
        assert_eq!(report.request, REQUEST);
        assert_eq!(report.cache, PathOutcome::Skipped);
        assert_eq!(report.refresh, PathOutcome::Rendered(1));

        let list = view.target().inner_html(COMMITS_LIST_ID).unwrap();
        assert_eq!(list.matches("card-title").count(), 1);
        assert!(list.contains("alice"));
        assert!(list.contains("fix bug"));
        assert!(list.contains(" ago"));
    }

    #[tokio::test]
    async fn test_no_cache_only_refreshes() {
        let source = FakeSource::ok(TWO);
        let calls = Arc::clone(&source.calls);
        let mut view = CommitsView::new(source, RecordingTarget::default(), ApiLayout::Legacy);

        let report = view.load_commits("widgets").await;
        assert_eq!(report.request, "/repo/widgets/commits/json");
        assert_eq!(report.cache, PathOutcome::Skipped);
        assert_eq!(report.refresh, PathOutcome::Rendered(2));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(view.target().renders.len(), 1);
    }

    #[tokio::test]
    async fn test_cache_miss_populates_cache() {
        let cache = Arc::new(MemoryCache::new());
        let mut view = CommitsView::new(FakeSource::ok(ALICE), RecordingTarget::default(), ApiLayout::V1)
            .with_cache(cache.clone());

        let report = view.load_commits("widgets").await;
        assert_eq!(report.cache, PathOutcome::Miss);
        assert_eq!(report.refresh, PathOutcome::Rendered(1));
        assert_eq!(cache.get(REQUEST).unwrap(), Some(ALICE.as_bytes().to_vec()));
    }

    #[tokio::test]
    async fn test_cached_snapshot_then_changed_refresh() {
        // The refresh answers only once the cached snapshot is on screen
        let painted = Arc::new(Notify::new());
        let cache = seeded_cache(ALICE);
        let source = FakeSource::ok(TWO).gated(painted.clone());
        let mut view = CommitsView::new(source, RecordingTarget::notifying(painted), ApiLayout::V1)
            .with_cache(cache.clone());

        let report = view.load_commits("widgets").await;
        assert_eq!(report.cache, PathOutcome::Rendered(1));
        assert_eq!(report.refresh, PathOutcome::Rendered(2));
        assert!(report.rendered());

        let renders = &view.target().renders;
        assert_eq!(renders.len(), 2);
        assert!(!renders[0].contains("bob"));
        assert!(renders[1].contains("bob"));
        assert_eq!(view.displayed().unwrap().len(), 2);
        assert_eq!(cache.get(REQUEST).unwrap(), Some(TWO.as_bytes().to_vec()));
    }

    #[tokio::test]
    async fn test_identical_refresh_is_not_rerendered() {
        let painted = Arc::new(Notify::new());
        let cache = seeded_cache(ALICE);
        let source = FakeSource::ok(ALICE).gated(painted.clone());
        let mut view = CommitsView::new(source, RecordingTarget::notifying(painted), ApiLayout::V1)
            .with_cache(cache);

        let report = view.load_commits("widgets").await;
        assert_eq!(report.cache, PathOutcome::Rendered(1));
        assert_eq!(report.refresh, PathOutcome::Unchanged);
        assert_eq!(view.target().renders.len(), 1);
    }

    #[tokio::test]
    async fn test_late_cache_snapshot_is_discarded() {
        // The cache lookup answers only once the refresh is on screen
        let (release, released) = std_mpsc::channel();
        let cache = Arc::new(GatedCache {
            inner: MemoryCache::new(),
            release: Mutex::new(released),
        });
        cache.put(REQUEST, ALICE.as_bytes()).unwrap();
        let target = RecordingTarget {
            renders: Vec::new(),
            on_render: Some(Box::new(move || {
                let _ = release.send(());
            })),
        };
        let mut view = CommitsView::new(FakeSource::ok(TWO), target, ApiLayout::V1).with_cache(cache);

        let report = view.load_commits("widgets").await;
        assert_eq!(report.refresh, PathOutcome::Rendered(2));
        assert_eq!(report.cache, PathOutcome::Discarded);
        assert_eq!(view.target().renders.len(), 1);
        assert!(view.target().renders[0].contains("bob"));
    }

    #[tokio::test]
    async fn test_refresh_failure_keeps_cached_render() {
        let cache = seeded_cache(ALICE);
        let mut view = CommitsView::new(
            FakeSource::failing(),
            HtmlDocument::page("widgets"),
            ApiLayout::V1,
        )
        .with_cache(cache);

        let report = view.load_commits("widgets").await;
        assert_eq!(report.cache, PathOutcome::Rendered(1));
        assert!(matches!(report.refresh, PathOutcome::Failed(ref e) if e.contains("connection refused")));

        let list = view.target().inner_html(COMMITS_LIST_ID).unwrap();
        assert!(list.contains("alice"));
    }

    #[tokio::test]
    async fn test_refresh_failure_without_cache_leaves_target_untouched() {
        let mut view = CommitsView::new(
            FakeSource::failing(),
            HtmlDocument::page("widgets"),
            ApiLayout::V1,
        );

        let report = view.load_commits("widgets").await;
        assert!(!report.rendered());
        assert_eq!(view.target().inner_html(COMMITS_LIST_ID).unwrap(), "");
    }

    #[tokio::test]
    async fn test_broken_cache_does_not_stop_refresh() {
        let mut view = CommitsView::new(FakeSource::ok(ALICE), RecordingTarget::default(), ApiLayout::V1)
            .with_cache(Arc::new(BrokenCache));

        let report = view.load_commits("widgets").await;
        assert!(matches!(report.cache, PathOutcome::Failed(_)));
        assert_eq!(report.refresh, PathOutcome::Rendered(1));
    }

    #[tokio::test]
    async fn test_malformed_payload_is_reported() {
        let cache = seeded_cache("not json");
        let mut view = CommitsView::new(
            FakeSource::ok("<html>500</html>"),
            RecordingTarget::default(),
            ApiLayout::V1,
        )
        .with_cache(cache.clone());

        let report = view.load_commits("widgets").await;
        assert!(matches!(report.cache, PathOutcome::Failed(_)));
        assert!(matches!(report.refresh, PathOutcome::Failed(_)));
        assert!(view.target().renders.is_empty());
        // An unparseable refresh does not overwrite the entry
        assert_eq!(cache.get(REQUEST).unwrap(), Some(b"not json".to_vec()));
    }

    #[tokio::test]
    async fn test_missing_mount_is_reported() {
        let mut view = CommitsView::new(
            FakeSource::ok(ALICE),
            HtmlDocument::new("<body></body>"),
            ApiLayout::V1,
        );

        let report = view.load_commits("widgets").await;
        assert!(matches!(report.refresh, PathOutcome::Failed(ref e) if e.contains("commits-list")));
        assert!(view.displayed().is_none());
    }

    #[tokio::test]
    async fn test_cache_round_trip_matches_direct_fetch() {
        let source = FakeSource::ok(TWO);
        let direct = parse_commits(&source.fetch(REQUEST).await.unwrap()).unwrap();

        let cache = Arc::new(MemoryCache::new());
        let mut view = CommitsView::new(source, RecordingTarget::default(), ApiLayout::V1)
            .with_cache(cache.clone());
        view.load_commits("widgets").await;

        let cached = parse_commits(&cache.get(REQUEST).unwrap().unwrap()).unwrap();
        assert_eq!(cached, direct);
        assert_eq!(view.displayed().unwrap(), direct.as_slice());
    }

    #[test]
    fn test_render_preserves_order_and_count() {
        let commits = parse_commits(TWO.as_bytes()).unwrap();
        let mut view = CommitsView::new(FakeSource::ok("[]"), HtmlDocument::page("widgets"), ApiLayout::Legacy);

        view.render_commits(&commits).unwrap();
        let list = view.target().inner_html(COMMITS_LIST_ID).unwrap();
        assert_eq!(list.matches("class=\"bg-white").count(), 2);
        assert!(list.find("bob").unwrap() < list.find("alice").unwrap());
    }

    #[test]
    fn test_render_empty_sequence() {
        let mut view = CommitsView::new(FakeSource::ok("[]"), HtmlDocument::page("widgets"), ApiLayout::V1);
        view.render_commits(&parse_commits(TWO.as_bytes()).unwrap()).unwrap();

        view.render_commits(&[]).unwrap();
        assert_eq!(view.target().inner_html(COMMITS_LIST_ID).unwrap(), "");
    }

    #[test]
    fn test_render_relative_time() {
        let now = DateTime::from_timestamp(1_700_000_000 + 3_600, 0).unwrap();
        let commits = parse_commits(ALICE.as_bytes()).unwrap();
        let mut view = CommitsView::new(FakeSource::ok("[]"), HtmlDocument::page("widgets"), ApiLayout::V1);

        view.render_commits_at(&commits, &now).unwrap();
        assert!(view.target().inner_html(COMMITS_LIST_ID).unwrap().contains("an hour ago"));
    }

    #[test]
    fn test_render_missing_mount_fails() {
        let mut view = CommitsView::new(FakeSource::ok("[]"), HtmlDocument::new("<p></p>"), ApiLayout::V1);
        assert!(matches!(view.render_commits(&[]), Err(ViewError::MountNotFound(_))));
    }

    #[test]
    fn test_resolve_uses_layout() {
        let view = CommitsView::new(FakeSource::ok("[]"), RecordingTarget::default(), ApiLayout::V1);
        assert_eq!(view.resolve_repository_identifier("/api/v1/repo/widgets/commits/all"), "widgets");
    }
}
